use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "vpnscope")]
#[command(author = "VpnScope")]
#[command(version = "0.1.0")]
#[command(about = "VPN server fingerprinting scanner with confidence-scored detection", long_about = None)]
pub struct Cli {
    #[arg(help = "Target hostname or host:port. Can be specified multiple times.")]
    pub target: Vec<String>,

    #[arg(long, help = "Per-request timeout in milliseconds (default: 5000)")]
    pub timeout: Option<u64>,

    #[arg(long, help = "How many targets to fingerprint in parallel (default: 10)")]
    pub parallel_targets: Option<usize>,

    #[arg(
        long,
        help = "Reject invalid/self-signed TLS certificates (accepted by default, VPN appliances rarely carry trusted certs)"
    )]
    pub strict_certs: bool,

    #[arg(short = 'o', long, value_enum, default_value = "human", help = "Output format")]
    pub output_format: OutputFormat,

    #[arg(short = 'f', long, help = "Output file path")]
    pub output_file: Option<PathBuf>,

    #[arg(short, long, help = "Enable verbose output (include non-matching sniffers)")]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
pub enum OutputFormat {
    #[value(name = "human", help = "Human-readable output")]
    Human,
    #[value(name = "json", help = "JSON output")]
    Json,
    #[value(name = "csv", help = "CSV output")]
    Csv,
}
