use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::sniffer::hit::Hit;

/// Per-sniffer outcome: detected with details, nothing, or a failed probe.
/// A probe failure is not a detection signal and is kept distinct so the
/// caller can tell "unreachable" from "reachable but not this product".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "detail")]
pub enum SnifferOutcome {
    Detected(Hit),
    NotDetected,
    Error(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnifferReport {
    pub sniffer: String,
    pub outcome: SnifferOutcome,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetReport {
    pub target: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub sniffers: Vec<SnifferReport>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiTargetReport {
    pub target_spec: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub total_targets: usize,
    pub targets: Vec<TargetReport>,
}

impl TargetReport {
    /// Positive hits ranked by confidence, highest first. Signatures are
    /// designed to be mutually exclusive in practice, so more than one
    /// entry here is worth a second look rather than a tie-break.
    pub fn detections(&self) -> Vec<(&str, &Hit)> {
        let mut hits: Vec<(&str, &Hit)> = self
            .sniffers
            .iter()
            .filter_map(|report| match &report.outcome {
                SnifferOutcome::Detected(hit) => Some((report.sniffer.as_str(), hit)),
                _ => None,
            })
            .collect();
        hits.sort_by(|a, b| b.1.confidence.total_cmp(&a.1.confidence));
        hits
    }

    pub fn errors(&self) -> Vec<(&str, &str)> {
        self.sniffers
            .iter()
            .filter_map(|report| match &report.outcome {
                SnifferOutcome::Error(message) => {
                    Some((report.sniffer.as_str(), message.as_str()))
                }
                _ => None,
            })
            .collect()
    }
}
