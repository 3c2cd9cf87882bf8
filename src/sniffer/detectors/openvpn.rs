use async_trait::async_trait;

use crate::errors::ProbeError;
use crate::sniffer::{Hit, Sniffer};
use crate::transport::{ProbeRequest, Transport};

const SESSION_COOKIE_PREFIX: &str = "openvpn_sess_";

/// OpenVPN Access Server names its web session cookies after itself.
pub struct OpenVpnSniffer;

#[async_trait]
impl Sniffer for OpenVpnSniffer {
    fn name(&self) -> &'static str {
        "OpenVPN"
    }

    async fn sniff(
        &self,
        transport: &dyn Transport,
        server: &str,
    ) -> Result<Option<Hit>, ProbeError> {
        let response = transport.send(server, ProbeRequest::get("/")).await?;

        if !response.has_cookie_prefixed(SESSION_COOKIE_PREFIX) {
            return Ok(None);
        }
        let version = response.header("server").map(str::to_string);
        Ok(Some(Hit::new().with_version(version)))
    }
}
