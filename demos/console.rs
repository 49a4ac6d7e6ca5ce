//! Tails a server's console, renewing the websocket token whenever Wings asks for it.
//!
//! Run with tracing enabled:
//! ```sh
//! PTERODACTYL_HOST=https://panel.example.com PTERODACTYL_API_KEY=ptlc_... SERVER_ID=1a7ce997 RUST_LOG=info cargo run --example console --features tracing
//! ```

use futures::StreamExt as _;
use pterodactyl_client_sdk::Client;
use pterodactyl_client_sdk::ws::EventFilter;
use tokio::pin;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let host = std::env::var("PTERODACTYL_HOST")?;
    let server_id = std::env::var("SERVER_ID")?;
    let client = Client::from_env(&host)?;

    let mut console = client.websocket(&server_id).await?;
    console.connect().await?;
    console.request_logs().await?;
    console.request_stats().await?;

    let filter = EventFilter::builder()
        .exclude(vec!["token expiring".to_owned(), "token expired".to_owned()])
        .build();

    {
        let messages = console.listen(filter)?.take(200);
        pin!(messages);
        while let Some(message) = messages.next().await {
            info!(event = %message.event, args = ?message.args, "console");
        }
    }

    console.close().await;
    info!(state = ?console.state(), "closed");

    Ok(())
}
