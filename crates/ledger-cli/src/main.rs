use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "ledger-cli")]
#[command(about = "CLI client for the proof-of-work ledger node")]
struct Cli {
    /// Node base URL (e.g. http://127.0.0.1:6060)
    #[arg(long, global = true, default_value = "http://127.0.0.1:6060")]
    node: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the node's full ledger snapshot
    Chain,
    /// Submit a transaction to the pending pool
    Submit {
        /// Sender
        #[arg(long)]
        sender: String,
        /// Recipient
        #[arg(long)]
        recipient: String,
        /// Amount (may be zero or negative)
        #[arg(long, allow_negative_numbers = true)]
        amount: f64,
    },
    /// Mine the pending pool into a new block
    Mine,
    /// Register one or more peer base URLs
    Register {
        /// Peer base URL (repeatable)
        #[arg(long = "peer", required = true)]
        peers: Vec<String>,
    },
    /// Reconcile against every registered peer
    Resolve,
}

#[derive(Serialize)]
struct Tx {
    sender: String,
    recipient: String,
    amount: f64,
}

#[derive(Serialize)]
struct Register {
    nodes: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .pretty()
        .init();

    let cli = Cli::parse();
    let node = cli.node.trim_end_matches('/');
    let client = reqwest::Client::new();

    let req = match cli.cmd {
        Command::Chain => client.get(format!("{node}/chain")),
        Command::Submit {
            sender,
            recipient,
            amount,
        } => client
            .post(format!("{node}/transactions/new"))
            .json(&Tx {
                sender,
                recipient,
                amount,
            }),
        Command::Mine => client.get(format!("{node}/mine")),
        Command::Register { peers } => client
            .post(format!("{node}/nodes/register"))
            .json(&Register { nodes: peers }),
        Command::Resolve => client.get(format!("{node}/nodes/resolve")),
    };

    debug!(?req, "sending request");
    let res = req.send().await?;
    let status = res.status();
    let body = res.text().await?;
    println!("status: {}", status);
    match serde_json::from_str::<serde_json::Value>(&body) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{body}"),
    }
    Ok(())
}
