//! Lists every server the API key can see, one page at a time.
//!
//! Run with tracing enabled:
//! ```sh
//! PTERODACTYL_HOST=https://panel.example.com PTERODACTYL_API_KEY=ptlc_... RUST_LOG=info,hyper_util=off,hyper=off,reqwest=off cargo run --example servers --features tracing
//! ```
//!
//! Optionally log to a file:
//! ```sh
//! LOG_FILE=servers.log PTERODACTYL_HOST=... PTERODACTYL_API_KEY=... RUST_LOG=info cargo run --example servers --features tracing
//! ```

use std::fs::File;

use futures::StreamExt as _;
use pterodactyl_client_sdk::Client;
use pterodactyl_client_sdk::types::ListRequest;
use tokio::pin;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Ok(path) = std::env::var("LOG_FILE") {
        let file = File::create(path)?;
        tracing_subscriber::registry()
            .with(EnvFilter::from_default_env())
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(file)
                    .with_ansi(false),
            )
            .init();
    } else {
        tracing_subscriber::fmt::init();
    }

    let host = std::env::var("PTERODACTYL_HOST")?;
    let client = Client::from_env(&host)?;

    let request = ListRequest::builder()
        .include(vec!["allocations".to_owned()])
        .per_page(25)
        .build();
    let mut servers = client.list_servers(&request).await?;
    info!(
        total = ?servers.item_count(),
        next = ?servers.next_page_link(),
        "first page fetched"
    );

    {
        let pages = servers.pages();
        pin!(pages);
        while let Some(page) = pages.next().await {
            match page {
                Ok(page) => {
                    for server in page.items() {
                        info!(
                            identifier = %server["attributes"]["identifier"],
                            name = %server["attributes"]["name"],
                            "server"
                        );
                    }
                }
                Err(e) => {
                    warn!(error = %e, "page fetch failed");
                    break;
                }
            }
        }
    }

    info!(page_requests = servers.page_requests(), "done");

    Ok(())
}
