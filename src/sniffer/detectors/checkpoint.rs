use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;

use crate::errors::ProbeError;
use crate::sniffer::{Hit, Sniffer};
use crate::transport::{ProbeRequest, Transport};

// "GET /sslvpn/Login/Login" would also answer, but gives far too many
// false positives
const CCC_PATH: &str = "/clients/abc";
const CCC_REQUEST: &[u8] = b"(CCCclientRequest)";
const CCC_RESPONSE_PREFIX: &[u8] = b"(CCCserverResponse";
const TRAC_USER_AGENT: &str = "TRAC/986000125";

lazy_static! {
    static ref BANNER_RE: Regex =
        Regex::new(r"(\d+(?:-\d+)?) Check Point Software Technologies").unwrap();
}

/// The CCC handshake endpoint answers the TRAC client unauthenticated; the
/// root page version banner is a weak fallback signal.
pub struct CheckPointSniffer;

#[async_trait]
impl Sniffer for CheckPointSniffer {
    fn name(&self) -> &'static str {
        "Check Point"
    }

    async fn sniff(
        &self,
        transport: &dyn Transport,
        server: &str,
    ) -> Result<Option<Hit>, ProbeError> {
        let request =
            ProbeRequest::post(CCC_PATH, CCC_REQUEST).header("User-Agent", TRAC_USER_AGENT);
        let response = transport.send(server, request).await?;

        let mut confidence = 0.0;
        if response.body.starts_with(CCC_RESPONSE_PREFIX) {
            confidence = 1.0;
        }

        let response = transport.send(server, ProbeRequest::get("/")).await?;
        let body = response.body_text();
        let version = BANNER_RE
            .captures(&body)
            .map(|captures| captures[1].to_string());
        if confidence == 0.0 && version.is_some() {
            confidence = 0.2;
        }

        if confidence == 0.0 {
            return Ok(None);
        }
        Ok(Some(
            Hit::new().with_confidence(confidence).with_version(version),
        ))
    }
}
