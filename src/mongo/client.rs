//! Connection lifecycle for the MongoDB driver: connect, ping, disconnect.

use mongodb::{Client, bson::doc, options::ClientOptions};
use std::time::Duration;

/// Name reported to the server in connection metadata.
const APP_NAME: &str = "studentdb";

/// Connect to MongoDB and confirm the deployment answers a `ping`.
///
/// Server selection and connection establishment are both bounded by `timeout`
/// so an unreachable deployment fails startup instead of hanging it.
pub async fn connect(uri: &str, timeout: Duration) -> mongodb::error::Result<Client> {
    let mut options = ClientOptions::parse(uri).await?;
    options.app_name = Some(APP_NAME.to_string());
    options.server_selection_timeout = Some(timeout);
    options.connect_timeout = Some(timeout);

    let client = Client::with_options(options)?;
    ping(&client).await?;
    tracing::info!("Successfully connected to MongoDB");
    Ok(client)
}

/// Run the `ping` admin command.
pub async fn ping(client: &Client) -> mongodb::error::Result<()> {
    client
        .database("admin")
        .run_command(doc! { "ping": 1 })
        .await?;
    Ok(())
}

/// Close the client's pools and background monitors.
pub async fn disconnect(client: Client) {
    client.shutdown().await;
    tracing::info!("Disconnected from MongoDB");
}
