//! MongoDB connectivity smoke test.
//!
//! Connects with the given URI, runs `ping`, lists the collections of the target database, and
//! disconnects. Exits non-zero with the error chain when any step fails.
use anyhow::{Context, Result};
use clap::Parser;
use std::time::Duration;
use studentdb::{logging, mongo::client};

#[derive(Parser)]
#[command(
    name = "studentdb-ping",
    about = "Check that the student records database is reachable"
)]
struct Cli {
    /// MongoDB connection string.
    #[arg(long, env = "MONGODB_URI")]
    uri: String,
    /// Database whose collections are listed after the ping.
    #[arg(long, env = "MONGODB_DATABASE", default_value = "studentdb")]
    database: String,
    /// Connect and server-selection timeout, in seconds.
    #[arg(long, default_value_t = 5)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    logging::init_tracing();
    if let Err(err) = run(Cli::parse()).await {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let client = client::connect(&cli.uri, Duration::from_secs(cli.timeout_secs))
        .await
        .context("failed to connect to MongoDB")?;

    let collections = client
        .database(&cli.database)
        .list_collection_names()
        .await
        .with_context(|| format!("failed to list collections in `{}`", cli.database));

    client::disconnect(client).await;

    let collections = collections?;
    println!("Connected to MongoDB; ping succeeded.");
    println!(
        "Database `{}` has {} collection(s): {}",
        cli.database,
        collections.len(),
        collections.join(", ")
    );
    Ok(())
}
