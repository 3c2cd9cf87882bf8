use serde::{Deserialize, Serialize};

/// One sniffer's belief that its target product is present.
///
/// Confidence is meaningful in (0.0, 1.0]; anything at or below zero is the
/// same as "did not match". A Hit is produced once per sniffer invocation
/// and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    pub confidence: f32,
    pub name: Option<String>,
    pub version: Option<String>,
    pub components: Option<Vec<String>>,
}

impl Default for Hit {
    fn default() -> Self {
        Self {
            confidence: 1.0,
            name: None,
            version: None,
            components: None,
        }
    }
}

impl Hit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence;
        self
    }

    /// Product/variant name when the sniffer distinguishes variants
    /// (e.g. "Cisco" vs "ocserv").
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn with_version(mut self, version: Option<String>) -> Self {
        self.version = version;
        self
    }

    pub fn with_components(mut self, components: Vec<String>) -> Self {
        self.components = Some(components);
        self
    }

    pub fn is_detected(&self) -> bool {
        self.confidence > 0.0
    }

    /// Human-readable summary: whichever of name, version, components
    /// (joined by "+") and sub-100% confidence are present, comma-separated.
    /// Absent fields are skipped without placeholder text.
    pub fn details(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        if let Some(name) = &self.name {
            parts.push(name.clone());
        }
        if let Some(version) = &self.version {
            parts.push(version.clone());
        }
        if let Some(components) = &self.components {
            if !components.is_empty() {
                parts.push(components.join("+"));
            }
        }
        if self.confidence < 1.0 {
            parts.push(format!("{:.0}%", self.confidence * 100.0));
        }
        parts.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_boundary() {
        assert!(!Hit::new().with_confidence(0.0).is_detected());
        assert!(!Hit::new().with_confidence(-1.0).is_detected());
        assert!(Hit::new().with_confidence(0.001).is_detected());
        assert!(Hit::new().is_detected());
    }

    #[test]
    fn test_details_full() {
        let hit = Hit::new()
            .with_name("Cisco")
            .with_version(Some("9.1(2)".to_string()))
            .with_components(vec!["portal".to_string(), "gateway".to_string()])
            .with_confidence(0.8);
        assert_eq!(hit.details(), "Cisco, 9.1(2), portal+gateway, 80%");
    }

    #[test]
    fn test_details_no_percentage_at_full_confidence() {
        let hit = Hit::new().with_name("ocserv");
        assert_eq!(hit.details(), "ocserv");
    }

    #[test]
    fn test_details_percentage_always_present_below_full() {
        let hit = Hit::new().with_confidence(0.2);
        assert_eq!(hit.details(), "20%");
        let hit = Hit::new().with_version(Some("8.1.3".to_string())).with_confidence(0.9);
        assert_eq!(hit.details(), "8.1.3, 90%");
    }

    #[test]
    fn test_details_skips_absent_fields() {
        let hit = Hit::new().with_version(Some("1.2".to_string()));
        assert_eq!(hit.details(), "1.2");
        assert!(!hit.details().contains(", ,"));

        let hit = Hit::new().with_components(Vec::new());
        assert_eq!(hit.details(), "");
    }
}
