pub mod detectors;
pub mod hit;
pub mod results;

use anyhow::Result;
use async_trait::async_trait;
use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::errors::ProbeError;
use crate::transport::Transport;
pub use hit::Hit;
pub use results::{MultiTargetReport, SnifferOutcome, SnifferReport, TargetReport};

/// A single heuristic probe against one VPN product's front-end behavior.
///
/// Sniffers carry no state between invocations; each call is a fresh probe,
/// safe to run concurrently against the same or different servers. The name
/// labels the sniffer in reports and is independent of any variant name the
/// returned Hit may carry.
///
/// `Ok(None)` (or a Hit with confidence <= 0.0) means the target answered
/// but is not this product; `Err` means the probe itself failed.
#[async_trait]
pub trait Sniffer: Send + Sync {
    fn name(&self) -> &'static str;

    async fn sniff(
        &self,
        transport: &dyn Transport,
        server: &str,
    ) -> Result<Option<Hit>, ProbeError>;
}

/// All sniffers in registration order. Order only affects presentation;
/// signatures have near-zero false-positive overlap so it never changes
/// which sniffers fire.
pub fn registry() -> Vec<Box<dyn Sniffer>> {
    vec![
        Box::new(detectors::anyconnect::AnyConnectSniffer),
        Box::new(detectors::juniper::JuniperNcSniffer),
        Box::new(detectors::globalprotect::GlobalProtectSniffer),
        Box::new(detectors::barracuda::BarracudaSniffer),
        Box::new(detectors::checkpoint::CheckPointSniffer),
        Box::new(detectors::sstp::SstpSniffer),
        Box::new(detectors::openvpn::OpenVpnSniffer),
        Box::new(detectors::fortinet::FortinetSniffer),
    ]
}

/// Runs every registered sniffer against one target and collects one
/// outcome per sniffer. A failed probe is recorded and never aborts the
/// remaining sniffers.
pub async fn scan_target(transport: &dyn Transport, target: &str) -> TargetReport {
    let start_time = chrono::Utc::now();
    let mut sniffers = Vec::new();

    for sniffer in registry() {
        let outcome = match sniffer.sniff(transport, target).await {
            Ok(Some(hit)) if hit.is_detected() => {
                info!(server = target, sniffer = sniffer.name(), details = %hit.details(), "detected");
                SnifferOutcome::Detected(hit)
            }
            Ok(_) => SnifferOutcome::NotDetected,
            Err(err) => {
                warn!(server = target, sniffer = sniffer.name(), %err, "probe failed");
                SnifferOutcome::Error(err.to_string())
            }
        };
        sniffers.push(SnifferReport {
            sniffer: sniffer.name().to_string(),
            outcome,
        });
    }

    TargetReport {
        target: target.to_string(),
        start_time,
        end_time: chrono::Utc::now(),
        sniffers,
    }
}

pub struct FingerprintEngine {
    transport: Arc<dyn Transport>,
    parallel_targets: usize,
}

impl FingerprintEngine {
    pub fn new(transport: Arc<dyn Transport>, parallel_targets: usize) -> Self {
        Self {
            transport,
            parallel_targets,
        }
    }

    pub async fn scan_target(&self, target: &str) -> TargetReport {
        scan_target(self.transport.as_ref(), target).await
    }

    pub async fn scan(&self, targets: &[String]) -> Result<MultiTargetReport> {
        let pb = ProgressBar::new(targets.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("⟦{spinner:.bright_magenta}⟧ [{elapsed_precise}] ⟨{bar:40.bright_green/bright_black}⟩ {pos}/{len} targets fingerprinted ({eta})")?
                .progress_chars("█▉▊▋▌▍▎▏ "),
        );

        let start_time = chrono::Utc::now();

        let semaphore = Arc::new(Semaphore::new(self.parallel_targets));
        let mut tasks = Vec::new();

        for target in targets {
            let transport = self.transport.clone();
            let semaphore = semaphore.clone();
            let pb = pb.clone();
            let target = target.clone();

            tasks.push(tokio::spawn(async move {
                let _permit = semaphore.acquire().await.unwrap();
                let report = scan_target(transport.as_ref(), &target).await;
                pb.inc(1);
                report
            }));
        }

        let target_reports: Vec<TargetReport> = join_all(tasks)
            .await
            .into_iter()
            .collect::<Result<Vec<_>, _>>()?;

        pb.finish_and_clear();
        let end_time = chrono::Utc::now();

        Ok(MultiTargetReport {
            target_spec: targets.join(","),
            start_time,
            end_time,
            total_targets: target_reports.len(),
            targets: target_reports,
        })
    }
}
