//! Library Worker Service - Entry Point
//!
//! Background worker that consumes library events from the Redis stream.

#[tokio::main]
async fn main() -> eyre::Result<()> {
    library_worker::run().await
}
