//! VPN server fingerprinting: probe an HTTPS endpoint with
//! product-specific requests and report which VPN front-end answered,
//! with a confidence score and whatever version data the signature
//! incidentally reveals.

pub mod cli;
pub mod errors;
pub mod output;
pub mod sniffer;
pub mod transport;

pub use errors::ProbeError;
pub use sniffer::{registry, FingerprintEngine, Hit, Sniffer, SnifferOutcome, TargetReport};
pub use transport::{HttpTransport, ProbeRequest, ProbeResponse, Transport};
