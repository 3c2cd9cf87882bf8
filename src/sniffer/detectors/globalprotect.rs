use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;

use crate::errors::ProbeError;
use crate::sniffer::{Hit, Sniffer};
use crate::transport::{ProbeRequest, Transport};

const USER_AGENT: &str = "PAN GlobalProtect";
const PRELOGIN_MARKER: &str = "<prelogin-response>";
const SUCCESS_MARKER: &str = "<status>Success</status>";
// PAN-OS reports "1" when no real version is configured
const PLACEHOLDER_VERSION: &str = "1";

// (path, component) per prelogin endpoint
const ENDPOINTS: [(&str, &str); 2] = [
    ("/global-protect/prelogin.esp", "portal"),
    ("/ssl-vpn/prelogin.esp", "gateway"),
];

lazy_static! {
    static ref PANOS_VERSION_RE: Regex =
        Regex::new(r"<panos-version>([^<]+)</panos-version>").unwrap();
}

/// Both the portal and the gateway expose an unauthenticated prelogin
/// endpoint that answers XML when asked with the GlobalProtect user-agent.
pub struct GlobalProtectSniffer;

#[async_trait]
impl Sniffer for GlobalProtectSniffer {
    fn name(&self) -> &'static str {
        "PAN GlobalProtect"
    }

    async fn sniff(
        &self,
        transport: &dyn Transport,
        server: &str,
    ) -> Result<Option<Hit>, ProbeError> {
        let mut matched = false;
        let mut components = Vec::new();
        let mut version: Option<String> = None;

        for (path, component) in ENDPOINTS {
            let request = ProbeRequest::get(path).header("User-Agent", USER_AGENT);
            let response = transport.send(server, request).await?;

            let is_xml = response
                .header("content-type")
                .map_or(false, |ct| ct.contains("xml"));
            if !is_xml {
                continue;
            }
            let body = response.body_text();
            if !body.contains(PRELOGIN_MARKER) {
                continue;
            }

            matched = true;
            if body.contains(SUCCESS_MARKER) {
                components.push(component.to_string());
            }
            if version.is_none() {
                if let Some(captures) = PANOS_VERSION_RE.captures(&body) {
                    let value = captures[1].to_string();
                    if value != PLACEHOLDER_VERSION {
                        version = Some(value);
                    }
                }
            }
        }

        if !matched {
            return Ok(None);
        }
        Ok(Some(
            Hit::new()
                .with_version(version)
                .with_components(components),
        ))
    }
}
