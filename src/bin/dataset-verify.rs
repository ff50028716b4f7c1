//! Dataset validation CLI tool
//!
//! Validates every sample directory under a dataset root, quarantines broken
//! samples and writes the aggregated error report.

#[cfg(feature = "cli")]
use dataset_verify::cli;

#[cfg(feature = "cli")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cli::main().await
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Please rebuild with --features cli");
    std::process::exit(1);
}
