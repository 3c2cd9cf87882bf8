use async_trait::async_trait;

use crate::errors::ProbeError;
use crate::sniffer::{Hit, Sniffer};
use crate::transport::{ProbeRequest, Transport};

const DANA_PATH: &str = "/dana-na";
const AUTH_PATH_PREFIX: &str = "/dana-na/auth/";
const COOKIE_PREFIX: &str = "DS";

/// Juniper mostly serves generic HTML; the reliable tell is the family of
/// DS* session cookies, with a redirect into /dana-na/auth/ as a weaker
/// secondary signal.
pub struct JuniperNcSniffer;

#[async_trait]
impl Sniffer for JuniperNcSniffer {
    fn name(&self) -> &'static str {
        "Juniper Network Connect"
    }

    async fn sniff(
        &self,
        transport: &dyn Transport,
        server: &str,
    ) -> Result<Option<Hit>, ProbeError> {
        let request = ProbeRequest::get(DANA_PATH).header("NCP-Version", "3");
        let response = transport.send(server, request).await?;

        let confidence = if response.has_cookie_prefixed(COOKIE_PREFIX) {
            1.0
        } else if response.final_path.starts_with(AUTH_PATH_PREFIX) {
            0.8
        } else {
            return Ok(None);
        };

        let version = response.header("ncp-version").map(str::to_string);
        Ok(Some(
            Hit::new().with_confidence(confidence).with_version(version),
        ))
    }
}
