use async_trait::async_trait;

use crate::errors::ProbeError;
use crate::sniffer::{Hit, Sniffer};
use crate::transport::{ProbeRequest, Transport};

const LOGIN_PATH: &str = "/remote/login";
const COOKIE_PREFIX: &str = "SVPNCOOKIE";
// templated Server banner when no real banner is configured; its presence
// actually strengthens the match
const PLACEHOLDER_SERVER: &str = "xxxxxxxx-xxxxx";

pub struct FortinetSniffer;

#[async_trait]
impl Sniffer for FortinetSniffer {
    fn name(&self) -> &'static str {
        "Fortinet"
    }

    async fn sniff(
        &self,
        transport: &dyn Transport,
        server: &str,
    ) -> Result<Option<Hit>, ProbeError> {
        let response = transport.send(server, ProbeRequest::get(LOGIN_PATH)).await?;

        let cookie_seen = response
            .headers_named("set-cookie")
            .any(|value| value.starts_with(COOKIE_PREFIX));
        if !cookie_seen {
            return Ok(None);
        }

        let hit = match response.header("server") {
            Some(PLACEHOLDER_SERVER) => Hit::new().with_confidence(1.0).with_version(None),
            banner => Hit::new()
                .with_confidence(0.9)
                .with_version(banner.map(str::to_string)),
        };
        Ok(Some(hit))
    }
}
