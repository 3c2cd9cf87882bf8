// One module per VPN product heuristic. Each sniffer issues one or two
// HTTPS requests to product-specific paths and inspects status, headers,
// cookies and body for that product's signature. Known templated default
// values ("placeholders") that products emit when unconfigured live next to
// the heuristic that suppresses them.

pub mod anyconnect;
pub mod barracuda;
pub mod checkpoint;
pub mod fortinet;
pub mod globalprotect;
pub mod juniper;
pub mod openvpn;
pub mod sstp;
