use clap::{Parser, Subcommand};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio_tungstenite::{connect_async, tungstenite::Message};

#[derive(Parser)]
#[command(name = "qa-relay-cli")]
#[command(about = "Command-line client for the qa-relay server", long_about = None)]
struct Cli {
    /// WebSocket endpoint of the relay.
    #[arg(short, long, default_value = "ws://localhost:8080/ws")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask one question and print the answer
    Ask {
        /// Question words, joined with spaces
        #[arg(required = true)]
        question: Vec<String>,
    },
    /// Check relay liveness
    Health {
        #[arg(long, default_value = "http://localhost:8080/health")]
        http_url: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Ask { question } => {
            let question = question.join(" ");
            let (mut ws, _) = connect_async(cli.url.as_str()).await?;

            ws.send(Message::text(question)).await?;

            while let Some(message) = ws.next().await {
                match message? {
                    Message::Text(text) => {
                        print_json(text.as_str().as_bytes())?;
                        break;
                    }
                    Message::Binary(bytes) => {
                        print_json(&bytes)?;
                        break;
                    }
                    Message::Close(frame) => {
                        eprintln!("Error: relay closed the connection: {:?}", frame);
                        return Ok(());
                    }
                    _ => {}
                }
            }

            let _ = ws.close(None).await;
        }
        Commands::Health { http_url } => {
            let res = reqwest::get(&http_url).await?;
            let status = res.status();
            if !status.is_success() {
                eprintln!("Error: relay returned status {}", status);
                return Ok(());
            }
            let json: Value = res.json().await?;
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
    }

    Ok(())
}

fn print_json(payload: &[u8]) -> Result<(), Box<dyn std::error::Error>> {
    let json: Value = serde_json::from_slice(payload)?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
