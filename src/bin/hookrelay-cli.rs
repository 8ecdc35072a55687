use std::path::PathBuf;

use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};

use hookrelay::Provider;

#[derive(Parser)]
#[command(name = "hookrelay-cli")]
#[command(about = "Sign payloads and send test deliveries to a hookrelay receiver", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the signature header value for a payload
    Sign {
        /// Shared secret
        #[arg(short, long)]
        secret: String,

        /// Payload given inline
        #[arg(short, long, conflicts_with = "file")]
        data: Option<String>,

        /// Payload read from a file
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// github, gitea, gogs or gitlab
        #[arg(short, long, default_value = "github")]
        provider: Provider,
    },
    /// POST a signed test delivery
    Send {
        /// Receiver url, e.g. http://localhost:5000/webhook
        #[arg(short, long, default_value = "http://localhost:5000/webhook")]
        url: String,

        #[arg(short, long)]
        secret: String,

        /// Event name to put in the event header
        #[arg(short, long, default_value = "ping")]
        event: String,

        /// JSON payload file; defaults to `{}`
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Delivery id; a random UUID when omitted
        #[arg(long)]
        delivery: Option<String>,

        #[arg(short, long, default_value = "github")]
        provider: Provider,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Sign {
            secret,
            data,
            file,
            provider,
        } => {
            let payload = read_payload(data, file)?;
            println!(
                "{}: {}",
                provider.headers().signature_display,
                provider.sign(secret.as_bytes(), &payload)
            );
        }
        Commands::Send {
            url,
            secret,
            event,
            file,
            delivery,
            provider,
        } => {
            let payload = read_payload(None, file)?;
            let delivery = delivery.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
            let names = provider.headers();

            let mut headers = HeaderMap::new();
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            headers.insert(
                names.signature,
                HeaderValue::from_str(&provider.sign(secret.as_bytes(), &payload))?,
            );
            headers.insert(names.event, HeaderValue::from_str(&event)?);
            headers.insert(names.delivery, HeaderValue::from_str(&delivery)?);

            let client = reqwest::Client::new();
            let res = client.post(&url).headers(headers).body(payload).send().await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

fn read_payload(
    data: Option<String>,
    file: Option<PathBuf>,
) -> Result<Vec<u8>, std::io::Error> {
    match (data, file) {
        (Some(data), _) => Ok(data.into_bytes()),
        (None, Some(path)) => std::fs::read(path),
        (None, None) => Ok(b"{}".to_vec()),
    }
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let body = res.text().await?;

    println!("Status: {}", status);
    match serde_json::from_str::<serde_json::Value>(&body) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", body),
    }
    Ok(())
}
