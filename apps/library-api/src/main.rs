//! Library API Service - Entry Point
//!
//! HTTP producer that publishes library events to the Redis stream.

#[tokio::main]
async fn main() -> eyre::Result<()> {
    library_api::run().await
}
