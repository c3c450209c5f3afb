use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Operator CLI for the wallet gateway", long_about = None)]
struct Cli {
    #[arg(short, long, env = "GATEWAY_URL", default_value = "http://localhost:3001")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Service status and wallet address
    Health,
    /// Strategy catalogue
    Strategies,
    /// Wallet balance in ether
    Balance,
    /// Send ether from the gateway wallet and wait for confirmation
    Withdraw {
        /// Recipient address
        #[arg(long)]
        to: String,
        /// Amount in ether, e.g. 0.05
        #[arg(long)]
        amount: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let res = match cli.command {
        Commands::Health => client.get(format!("{}/health", base)).send().await?,
        Commands::Strategies => client.get(format!("{}/strategies", base)).send().await?,
        Commands::Balance => client.get(format!("{}/balance", base)).send().await?,
        Commands::Withdraw { to, amount } => {
            client
                .post(format!("{}/withdraw", base))
                .json(&json!({ "toAddress": to, "amountETH": amount }))
                .send()
                .await?
        }
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    match serde_json::from_str::<Value>(&text) {
        Ok(json) if status.is_success() => println!("{}", serde_json::to_string_pretty(&json)?),
        Ok(json) => {
            eprintln!("Error: gateway returned status {}", status);
            eprintln!("{}", serde_json::to_string_pretty(&json)?);
            std::process::exit(1);
        }
        Err(_) => {
            eprintln!("Error: gateway returned status {}", status);
            eprintln!("Response: {}", text);
            std::process::exit(1);
        }
    }
    Ok(())
}
