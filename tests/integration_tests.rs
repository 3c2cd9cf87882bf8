use std::collections::HashMap;

use async_trait::async_trait;

use vpnscope::errors::ProbeError;
use vpnscope::sniffer::detectors::anyconnect::AnyConnectSniffer;
use vpnscope::sniffer::detectors::barracuda::BarracudaSniffer;
use vpnscope::sniffer::detectors::checkpoint::CheckPointSniffer;
use vpnscope::sniffer::detectors::fortinet::FortinetSniffer;
use vpnscope::sniffer::detectors::globalprotect::GlobalProtectSniffer;
use vpnscope::sniffer::detectors::juniper::JuniperNcSniffer;
use vpnscope::sniffer::detectors::openvpn::OpenVpnSniffer;
use vpnscope::sniffer::detectors::sstp::SstpSniffer;
use vpnscope::sniffer::{registry, scan_target, Sniffer, SnifferOutcome};
use vpnscope::transport::{ProbeRequest, ProbeResponse, Transport};

/// Canned-response transport keyed by (method, path). Unknown probes get a
/// generic 404, like any unrelated web server would answer.
struct MockTransport {
    responses: HashMap<(String, String), ProbeResponse>,
    fail_all: bool,
}

impl MockTransport {
    fn new() -> Self {
        Self {
            responses: HashMap::new(),
            fail_all: false,
        }
    }

    fn failing() -> Self {
        Self {
            responses: HashMap::new(),
            fail_all: true,
        }
    }

    fn respond(mut self, method: &str, path: &str, response: ProbeResponse) -> Self {
        self.responses
            .insert((method.to_string(), path.to_string()), response);
        self
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(
        &self,
        _server: &str,
        request: ProbeRequest,
    ) -> Result<ProbeResponse, ProbeError> {
        if self.fail_all {
            return Err(ProbeError::Connect("connection refused".to_string()));
        }
        Ok(self
            .responses
            .get(&(request.method.clone(), request.path.clone()))
            .cloned()
            .unwrap_or_else(|| ProbeResponse {
                status: 404,
                final_path: request.path.clone(),
                ..Default::default()
            }))
    }
}

fn xml_response(body: &str) -> ProbeResponse {
    ProbeResponse {
        status: 200,
        headers: vec![("content-type".to_string(), "application/xml".to_string())],
        body: body.as_bytes().to_vec(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_globalprotect_portal_detection() {
    let transport = MockTransport::new().respond(
        "GET",
        "/global-protect/prelogin.esp",
        xml_response(
            "<prelogin-response><status>Success</status>\
             <panos-version>8.1.3</panos-version></prelogin-response>",
        ),
    );

    let hit = GlobalProtectSniffer
        .sniff(&transport, "vpn.test")
        .await
        .unwrap()
        .expect("portal should be detected");

    assert_eq!(hit.confidence, 1.0);
    assert_eq!(hit.version.as_deref(), Some("8.1.3"));
    assert_eq!(hit.components, Some(vec!["portal".to_string()]));
}

#[tokio::test]
async fn test_globalprotect_placeholder_version_suppressed() {
    let transport = MockTransport::new().respond(
        "GET",
        "/global-protect/prelogin.esp",
        xml_response(
            "<prelogin-response><status>Success</status>\
             <panos-version>1</panos-version></prelogin-response>",
        ),
    );

    let hit = GlobalProtectSniffer
        .sniff(&transport, "vpn.test")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(hit.version, None);
}

#[tokio::test]
async fn test_globalprotect_needs_xml_content_type() {
    let transport = MockTransport::new().respond(
        "GET",
        "/global-protect/prelogin.esp",
        ProbeResponse {
            status: 200,
            headers: vec![("content-type".to_string(), "text/html".to_string())],
            body: b"<prelogin-response></prelogin-response>".to_vec(),
            ..Default::default()
        },
    );

    let hit = GlobalProtectSniffer
        .sniff(&transport, "vpn.test")
        .await
        .unwrap();
    assert!(hit.is_none());
}

fn sstp_response(server_banner: &str) -> ProbeResponse {
    ProbeResponse {
        status: 200,
        headers: vec![
            (
                "content-length".to_string(),
                "18446744073709551615".to_string(),
            ),
            ("server".to_string(), server_banner.to_string()),
        ],
        ..Default::default()
    }
}

#[tokio::test]
async fn test_sstp_placeholder_server_suppressed() {
    let transport = MockTransport::new().respond(
        "SSTP_DUPLEX_POST",
        "/sra_{BA195980-CD49-458b-9E23-C84EE0ADCD75}/",
        sstp_response("Microsoft-HTTPAPI/2.0"),
    );

    let hit = SstpSniffer
        .sniff(&transport, "vpn.test")
        .await
        .unwrap()
        .expect("SSTP should be detected");
    assert_eq!(hit.version, None);
    assert!(hit.is_detected());
}

#[tokio::test]
async fn test_sstp_real_server_banner_reported() {
    let transport = MockTransport::new().respond(
        "SSTP_DUPLEX_POST",
        "/sra_{BA195980-CD49-458b-9E23-C84EE0ADCD75}/",
        sstp_response("Foo/1.2"),
    );

    let hit = SstpSniffer
        .sniff(&transport, "vpn.test")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(hit.version.as_deref(), Some("Foo/1.2"));
}

#[tokio::test]
async fn test_sstp_requires_infinite_content_length() {
    let transport = MockTransport::new().respond(
        "SSTP_DUPLEX_POST",
        "/sra_{BA195980-CD49-458b-9E23-C84EE0ADCD75}/",
        ProbeResponse {
            status: 200,
            headers: vec![("content-length".to_string(), "1024".to_string())],
            ..Default::default()
        },
    );

    let hit = SstpSniffer.sniff(&transport, "vpn.test").await.unwrap();
    assert!(hit.is_none());
}

fn fortinet_response(server_banner: &str) -> ProbeResponse {
    ProbeResponse {
        status: 200,
        headers: vec![
            (
                "Set-Cookie".to_string(),
                "SVPNCOOKIE=; Path=/; Secure".to_string(),
            ),
            ("server".to_string(), server_banner.to_string()),
        ],
        ..Default::default()
    }
}

#[tokio::test]
async fn test_fortinet_placeholder_banner() {
    let transport =
        MockTransport::new().respond("GET", "/remote/login", fortinet_response("xxxxxxxx-xxxxx"));

    let hit = FortinetSniffer
        .sniff(&transport, "vpn.test")
        .await
        .unwrap()
        .expect("Fortinet should be detected");
    assert_eq!(hit.confidence, 1.0);
    assert_eq!(hit.version, None);
}

#[tokio::test]
async fn test_fortinet_real_banner() {
    let transport =
        MockTransport::new().respond("GET", "/remote/login", fortinet_response("FortiOS-7"));

    let hit = FortinetSniffer
        .sniff(&transport, "vpn.test")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(hit.confidence, 0.9);
    assert_eq!(hit.version.as_deref(), Some("FortiOS-7"));
}

#[tokio::test]
async fn test_juniper_ds_cookie_full_confidence() {
    let transport = MockTransport::new().respond(
        "GET",
        "/dana-na",
        ProbeResponse {
            status: 200,
            headers: vec![("NCP-Version".to_string(), "3".to_string())],
            cookies: vec![("DSID".to_string(), "abc".to_string())],
            ..Default::default()
        },
    );

    let hit = JuniperNcSniffer
        .sniff(&transport, "vpn.test")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(hit.confidence, 1.0);
    assert_eq!(hit.version.as_deref(), Some("3"));
}

#[tokio::test]
async fn test_juniper_auth_redirect_lower_confidence() {
    let transport = MockTransport::new().respond(
        "GET",
        "/dana-na",
        ProbeResponse {
            status: 200,
            final_path: "/dana-na/auth/url_default/welcome.cgi".to_string(),
            ..Default::default()
        },
    );

    let hit = JuniperNcSniffer
        .sniff(&transport, "vpn.test")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(hit.confidence, 0.8);
    assert_eq!(hit.version, None);
}

#[tokio::test]
async fn test_barracuda_confidence_tiers() {
    // session cookie wins outright
    let transport = MockTransport::new().respond(
        "GET",
        "/",
        ProbeResponse {
            status: 200,
            cookies: vec![("SSLX_SSESHID".to_string(), "x".to_string())],
            ..Default::default()
        },
    );
    let hit = BarracudaSniffer
        .sniff(&transport, "vpn.test")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(hit.confidence, 1.0);

    // logon page plus version banner
    let transport = MockTransport::new().respond(
        "GET",
        "/",
        ProbeResponse {
            status: 200,
            final_path: "/default/showLogon.do".to_string(),
            body: b"380-39 Barracuda Networks".to_vec(),
            ..Default::default()
        },
    );
    let hit = BarracudaSniffer
        .sniff(&transport, "vpn.test")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(hit.confidence, 0.9);
    assert_eq!(hit.version.as_deref(), Some("380-39"));

    // banner alone is a weak signal
    let transport = MockTransport::new().respond(
        "GET",
        "/",
        ProbeResponse {
            status: 200,
            body: b"powered by 42 Barracuda Networks".to_vec(),
            ..Default::default()
        },
    );
    let hit = BarracudaSniffer
        .sniff(&transport, "vpn.test")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(hit.confidence, 0.2);
    assert_eq!(hit.version.as_deref(), Some("42"));

    // plain web server does not match
    let transport = MockTransport::new();
    let hit = BarracudaSniffer.sniff(&transport, "vpn.test").await.unwrap();
    assert!(hit.is_none());
}

#[tokio::test]
async fn test_checkpoint_ccc_handshake() {
    let transport = MockTransport::new().respond(
        "POST",
        "/clients/abc",
        ProbeResponse {
            status: 200,
            body: b"(CCCserverResponse :protocol_version (100))".to_vec(),
            ..Default::default()
        },
    );

    let hit = CheckPointSniffer
        .sniff(&transport, "vpn.test")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(hit.confidence, 1.0);
}

#[tokio::test]
async fn test_checkpoint_banner_fallback() {
    let transport = MockTransport::new().respond(
        "GET",
        "/",
        ProbeResponse {
            status: 200,
            body: b"<title>80-10 Check Point Software Technologies</title>".to_vec(),
            ..Default::default()
        },
    );

    let hit = CheckPointSniffer
        .sniff(&transport, "vpn.test")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(hit.confidence, 0.2);
    assert_eq!(hit.version.as_deref(), Some("80-10"));
}

#[tokio::test]
async fn test_anyconnect_cisco_x_reason_header() {
    let transport = MockTransport::new().respond(
        "GET",
        "/CSCOSSLC/tunnel",
        ProbeResponse {
            status: 400,
            headers: vec![
                ("X-Reason".to_string(), "No session cookie".to_string()),
                ("server".to_string(), "Cisco-ASA/9.1".to_string()),
            ],
            ..Default::default()
        },
    );

    let hit = AnyConnectSniffer
        .sniff(&transport, "vpn.test")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(hit.name.as_deref(), Some("Cisco"));
    assert_eq!(hit.version.as_deref(), Some("Cisco-ASA/9.1"));
}

#[tokio::test]
async fn test_anyconnect_ocserv_header_in_body_bug() {
    let transport = MockTransport::new().respond(
        "GET",
        "/CSCOSSLC/tunnel",
        ProbeResponse {
            status: 401,
            body: b"X-Reason: Cookie is not acceptable".to_vec(),
            ..Default::default()
        },
    );

    let hit = AnyConnectSniffer
        .sniff(&transport, "vpn.test")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(hit.name.as_deref(), Some("ocserv"));
    assert_eq!(hit.version.as_deref(), Some("0.8.0-0.11.6"));
}

#[tokio::test]
async fn test_anyconnect_ocserv_connect_rejection() {
    let transport = MockTransport::new().respond(
        "CONNECT",
        "/CSCOSSLC/tunnel",
        ProbeResponse {
            status: 401,
            reason: Some("Cookie is not acceptable".to_string()),
            ..Default::default()
        },
    );

    let hit = AnyConnectSniffer
        .sniff(&transport, "vpn.test")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(hit.name.as_deref(), Some("ocserv"));
    assert_eq!(hit.version.as_deref(), Some("0.11.7+"));
}

#[tokio::test]
async fn test_openvpn_session_cookie() {
    let transport = MockTransport::new().respond(
        "GET",
        "/",
        ProbeResponse {
            status: 200,
            headers: vec![("server".to_string(), "OpenVPN-AS".to_string())],
            cookies: vec![("openvpn_sess_1a2b".to_string(), "x".to_string())],
            ..Default::default()
        },
    );

    let hit = OpenVpnSniffer
        .sniff(&transport, "vpn.test")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(hit.version.as_deref(), Some("OpenVPN-AS"));
}

#[test]
fn test_registry_order_and_labels() {
    let labels: Vec<&str> = registry().iter().map(|s| s.name()).collect();
    assert_eq!(
        labels,
        vec![
            "AnyConnect/OpenConnect",
            "Juniper Network Connect",
            "PAN GlobalProtect",
            "Barracuda",
            "Check Point",
            "SSTP",
            "OpenVPN",
            "Fortinet",
        ]
    );
}

#[tokio::test]
async fn test_scan_target_reports_every_sniffer_on_failure() {
    let transport = MockTransport::failing();
    let report = scan_target(&transport, "unreachable.test").await;

    assert_eq!(report.sniffers.len(), registry().len());
    for sniffer in &report.sniffers {
        assert!(
            matches!(sniffer.outcome, SnifferOutcome::Error(_)),
            "{} should report a probe error, not a detection verdict",
            sniffer.sniffer
        );
    }
    assert!(report.detections().is_empty());
    assert_eq!(report.errors().len(), registry().len());
}

#[tokio::test]
async fn test_scan_target_isolates_detections() {
    let transport =
        MockTransport::new().respond("GET", "/remote/login", fortinet_response("FortiOS-7"));
    let report = scan_target(&transport, "vpn.test").await;

    assert_eq!(report.sniffers.len(), registry().len());
    let detections = report.detections();
    assert_eq!(detections.len(), 1);
    assert_eq!(detections[0].0, "Fortinet");
    assert!(report.errors().is_empty());
}

#[tokio::test]
async fn test_json_output_round_trip() {
    use vpnscope::cli::OutputFormat;
    use vpnscope::output::OutputWriter;
    use vpnscope::sniffer::MultiTargetReport;

    let transport =
        MockTransport::new().respond("GET", "/remote/login", fortinet_response("FortiOS-7"));
    let target = scan_target(&transport, "vpn.test").await;
    let report = MultiTargetReport {
        target_spec: "vpn.test".to_string(),
        start_time: target.start_time,
        end_time: target.end_time,
        total_targets: 1,
        targets: vec![target],
    };

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.json");
    let writer = OutputWriter::new(OutputFormat::Json, Some(path.clone()), false).unwrap();
    writer.write(report).unwrap();

    let parsed: MultiTargetReport =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(parsed.total_targets, 1);
    assert_eq!(parsed.targets[0].target, "vpn.test");
    let detections = parsed.targets[0].detections();
    assert_eq!(detections[0].0, "Fortinet");
    assert_eq!(detections[0].1.confidence, 0.9);
}
