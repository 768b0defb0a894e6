//! Binary entrypoint for the ticklist tool

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    ticklist::cli::run().await
}
