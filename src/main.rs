use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use colored::*;

use vpnscope::cli::Cli;
use vpnscope::output::OutputWriter;
use vpnscope::sniffer::FingerprintEngine;
use vpnscope::transport::HttpTransport;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    if cli.target.is_empty() {
        eprintln!("{}", "Error: No target specified.".red());
        eprintln!("Example: vpnscope vpn.example.com");
        eprintln!("Run 'vpnscope --help' for more information.");
        std::process::exit(1);
    }

    let transport = HttpTransport::new(
        cli.timeout.unwrap_or(5000), // 5 second timeout default
        cli.strict_certs,
    )?;
    let engine = FingerprintEngine::new(Arc::new(transport), cli.parallel_targets.unwrap_or(10));

    let output_writer = OutputWriter::new(cli.output_format, cli.output_file, cli.verbose)?;

    let report = engine.scan(&cli.target).await?;
    output_writer.write(report)?;

    Ok(())
}
