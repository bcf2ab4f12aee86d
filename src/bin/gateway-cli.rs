use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use serde_json::Value;

use wallet_gateway::session::{SessionCodec, SessionSecret, DEFAULT_SESSION_TTL};
use wallet_gateway::wallet::SESSION_COOKIE;

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Operator tooling for the wallet gateway", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a random session secret for `WALLET_SESSION_SECRET`
    GenSecret,
    /// Validate a session token and print its payload
    Inspect {
        #[arg(short, long, env = "WALLET_SESSION_SECRET", hide_env_values = true)]
        secret: String,
        token: String,
    },
    /// Ask a running gateway about a session cookie
    Session {
        #[arg(short, long, default_value = "http://localhost:8080")]
        url: String,
        #[arg(short, long)]
        cookie: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::GenSecret => {
            println!("{}", SessionSecret::generate_encoded());
        }
        Commands::Inspect { secret, token } => {
            let secret = SessionSecret::from_string(&secret)?;
            let codec = SessionCodec::new(&secret, DEFAULT_SESSION_TTL)?;
            match codec.validate(&token) {
                Ok(payload) => println!("{}", serde_json::to_string_pretty(&payload)?),
                Err(reason) => {
                    eprintln!("Error: {}", reason);
                    std::process::exit(1);
                }
            }
        }
        Commands::Session { url, cookie } => {
            let mut headers = HeaderMap::new();
            headers.insert(
                COOKIE,
                HeaderValue::from_str(&format!("{}={}", SESSION_COOKIE, cookie))?,
            );
            let res = reqwest::Client::new()
                .get(format!("{}/wallet/session", url.trim_end_matches('/')))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let json: Value = res.json().await?;
    if !status.is_success() {
        eprintln!("Error: gateway returned status {}", status);
    }
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
