use async_trait::async_trait;

use crate::errors::ProbeError;
use crate::sniffer::{Hit, Sniffer};
use crate::transport::{ProbeRequest, Transport};

const TUNNEL_PATH: &str = "/CSCOSSLC/tunnel";
const OCSERV_REJECT_REASON: &str = "Cookie is not acceptable";

/// Cisco AnyConnect and OpenConnect ocserv share the CSTP tunnel endpoint.
///
/// A GET on the tunnel path makes Cisco answer with an `X-Reason` header.
/// ocserv up to 0.11.6 has a bug that leaks the X-Reason line into the body
/// instead; from 0.11.7 a CONNECT with a bogus session cookie is rejected
/// with "Cookie is not acceptable".
pub struct AnyConnectSniffer;

#[async_trait]
impl Sniffer for AnyConnectSniffer {
    fn name(&self) -> &'static str {
        "AnyConnect/OpenConnect"
    }

    async fn sniff(
        &self,
        transport: &dyn Transport,
        server: &str,
    ) -> Result<Option<Hit>, ProbeError> {
        let response = transport.send(server, ProbeRequest::get(TUNNEL_PATH)).await?;

        if response.header("x-reason").is_some() {
            let version = response.header("server").map(str::to_string);
            return Ok(Some(Hit::new().with_name("Cisco").with_version(version)));
        }
        if response.body.starts_with(b"X-Reason:") {
            return Ok(Some(
                Hit::new()
                    .with_name("ocserv")
                    .with_version(Some("0.8.0-0.11.6".to_string())),
            ));
        }

        let connect = ProbeRequest::custom("CONNECT", TUNNEL_PATH)
            .header("Cookie", "webvpn=")
            .headers_only();
        let response = transport.send(server, connect).await?;
        if response.header("x-reason").is_some()
            || response.reason.as_deref() == Some(OCSERV_REJECT_REASON)
        {
            return Ok(Some(
                Hit::new()
                    .with_name("ocserv")
                    .with_version(Some("0.11.7+".to_string())),
            ));
        }

        Ok(None)
    }
}
