//! # Tally Dashboard Entry Point
//!
//! Boots the command layer against the configured backend and prints the
//! resolved session. The setup lives in `lib.rs` so tests can reach it.

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tally_dashboard::run().await?;
    Ok(())
}
