use async_trait::async_trait;

use crate::errors::ProbeError;
use crate::sniffer::{Hit, Sniffer};
use crate::transport::{ProbeRequest, Transport};

// Fixed GUID path from MS-SSTP section 3.2.4.1
const SSTP_PATH: &str = "/sra_{BA195980-CD49-458b-9E23-C84EE0ADCD75}/";
const SSTP_METHOD: &str = "SSTP_DUPLEX_POST";
// u64::MAX: the server declares an effectively infinite duplex stream
const DUPLEX_CONTENT_LENGTH: &str = "18446744073709551615";
// stock IIS banner, not a real version
const PLACEHOLDER_SERVER: &str = "Microsoft-HTTPAPI/2.0";

/// An SSTP server accepts the duplex POST on its GUID path and announces an
/// endless body. Only status and headers are needed, so the response stream
/// is dropped unread.
pub struct SstpSniffer;

#[async_trait]
impl Sniffer for SstpSniffer {
    fn name(&self) -> &'static str {
        "SSTP"
    }

    async fn sniff(
        &self,
        transport: &dyn Transport,
        server: &str,
    ) -> Result<Option<Hit>, ProbeError> {
        let request = ProbeRequest::custom(SSTP_METHOD, SSTP_PATH).headers_only();
        let response = transport.send(server, request).await?;

        if response.status != 200 || response.header("content-length") != Some(DUPLEX_CONTENT_LENGTH)
        {
            return Ok(None);
        }

        let version = response
            .header("server")
            .filter(|banner| *banner != PLACEHOLDER_SERVER)
            .map(str::to_string);
        Ok(Some(Hit::new().with_version(version)))
    }
}
