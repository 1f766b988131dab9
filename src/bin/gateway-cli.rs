use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, SET_COOKIE};
use serde_json::json;

use bank_gateway::security::PayloadCipher;

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Management CLI for the banking gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a fresh Base64 256-bit encryption key
    Keygen,
    /// Log in and print the session cookies
    Login {
        #[arg(short, long)]
        subject: String,
        #[arg(short, long)]
        password: String,
    },
    /// Fetch the caller's profile envelope with an access token
    Profile {
        #[arg(short, long)]
        token: String,
        /// Decrypt the envelope with this Base64 key
        #[arg(short, long)]
        key: Option<String>,
    },
    /// Decrypt an envelope offline
    Decrypt {
        #[arg(short, long)]
        key: String,
        envelope: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Keygen => {
            println!("{}", PayloadCipher::generate_key());
        }
        Commands::Login { subject, password } => {
            let res = client
                .post(format!("{}/api/auth/login", cli.url))
                .json(&json!({ "subject": subject, "password": password }))
                .send()
                .await?;

            println!("Status: {}", res.status());
            for cookie in res.headers().get_all(SET_COOKIE) {
                println!("Set-Cookie: {}", cookie.to_str()?);
            }
            println!("{}", res.text().await?);
        }
        Commands::Profile { token, key } => {
            let mut headers = HeaderMap::new();
            headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", token))?);

            let res = client
                .get(format!("{}/api/user/profile", cli.url))
                .headers(headers)
                .send()
                .await?;

            let status = res.status();
            let body = res.text().await?;
            if !status.is_success() {
                eprintln!("Error: gateway returned status {}", status);
                eprintln!("Response: {}", body);
                return Ok(());
            }
            match key {
                Some(key) => print_decrypted(&key, &body)?,
                None => println!("{}", body),
            }
        }
        Commands::Decrypt { key, envelope } => {
            print_decrypted(&key, &envelope)?;
        }
    }

    Ok(())
}

fn print_decrypted(key: &str, envelope: &str) -> Result<(), Box<dyn std::error::Error>> {
    let cipher = PayloadCipher::from_base64(key)?;
    let text = cipher.try_decrypt(envelope)?;
    match serde_json::from_str::<serde_json::Value>(&text) {
        Ok(value) => println!("{}", serde_json::to_string_pretty(&value)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}
