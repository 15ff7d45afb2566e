//! Catalog Outbox Relay - Entry Point
//!
//! Background worker that re-drives pending integration events from the
//! outbox table onto the event bus.

#[tokio::main]
async fn main() -> eyre::Result<()> {
    catalog_outbox_relay::run().await
}
