use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;

use crate::errors::ProbeError;
use crate::sniffer::{Hit, Sniffer};
use crate::transport::{ProbeRequest, Transport};

const SESSION_COOKIE: &str = "SSLX_SSESHID";
const LOGON_PATH_PREFIX: &str = "/default/showLogon.do";

lazy_static! {
    static ref BANNER_RE: Regex = Regex::new(r"(\d+(?:-\d+)?) Barracuda Networks").unwrap();
}

/// Three tiers of certainty from a single GET /: the SSLX session cookie,
/// the showLogon.do landing page, or just the version banner in the body.
pub struct BarracudaSniffer;

#[async_trait]
impl Sniffer for BarracudaSniffer {
    fn name(&self) -> &'static str {
        "Barracuda"
    }

    async fn sniff(
        &self,
        transport: &dyn Transport,
        server: &str,
    ) -> Result<Option<Hit>, ProbeError> {
        let response = transport.send(server, ProbeRequest::get("/")).await?;

        let body = response.body_text();
        let version = BANNER_RE
            .captures(&body)
            .map(|captures| captures[1].to_string());

        let confidence = if response.cookies.iter().any(|(name, _)| name == SESSION_COOKIE) {
            1.0
        } else if response.final_path.starts_with(LOGON_PATH_PREFIX) {
            if version.is_some() {
                0.9
            } else {
                0.8
            }
        } else if version.is_some() {
            0.2
        } else {
            return Ok(None);
        };

        Ok(Some(
            Hit::new().with_confidence(confidence).with_version(version),
        ))
    }
}
