//! IP-to-ASN lookups against Team Cymru's DNS origin zones
//!
//! The address is turned into a reverse pointer name under
//! `origin.asn.cymru.com` (IPv4) or `origin6.asn.cymru.com` (IPv6) and its TXT
//! record is fetched with `dig`. Sample answer:
//!
//!   "15169 | 8.8.8.0/24 | US | arin | 2023-12-28"
//!
//! See <https://www.team-cymru.com/ip-asn-mapping> for the record layout.
//! No caching is performed: every call issues a fresh query.

use crate::error::{AppError, Result};
use crate::runner::CommandRunner;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Zone queried for IPv4 origins
pub const ORIGIN_ZONE_V4: &str = "origin.asn.cymru.com.";
/// Zone queried for IPv6 origins
pub const ORIGIN_ZONE_V6: &str = "origin6.asn.cymru.com.";

/// Autonomous System number
pub type AsNumber = u32;

/// Resolves IP addresses to their origin AS number through `dig`
pub struct AsnResolver<'a, R: CommandRunner + ?Sized> {
    runner: &'a R,
    dig_command: String,
}

impl<'a, R: CommandRunner + ?Sized> AsnResolver<'a, R> {
    /// Create a resolver that runs `dig_command` through `runner`
    pub fn new<S: Into<String>>(runner: &'a R, dig_command: S) -> Self {
        Self {
            runner,
            dig_command: dig_command.into(),
        }
    }

    /// Look up the origin ASN of `ip`.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if `ip` is not an IPv4/IPv6 literal (no query is made),
    /// `SubprocessFailure` if `dig` exits non-zero and `Parse` if the answer
    /// carries no usable AS number.
    pub async fn resolve(&self, ip: &str) -> Result<AsNumber> {
        let addr: IpAddr = ip
            .parse()
            .map_err(|_| AppError::invalid_input(format!("Invalid IP address: {}", ip)))?;

        let query = origin_query(addr);
        let output = self
            .runner
            .run(&self.dig_command, &["+short", query.as_str(), "TXT"])
            .await?;

        if !output.is_success() {
            return Err(AppError::subprocess(format!(
                "Failed to retrieve ASN for IP: {}",
                ip
            )));
        }

        parse_origin_txt(&output.stdout)
            .ok_or_else(|| AppError::parse(format!("Invalid ASN data format for IP: {}", ip)))
    }
}

/// Fully qualified TXT query name for `ip` in the Cymru origin zone
pub fn origin_query(ip: IpAddr) -> String {
    match ip {
        IpAddr::V4(ipv4) => format!("{}.{}", ipv4_reversed(ipv4), ORIGIN_ZONE_V4),
        IpAddr::V6(ipv6) => format!("{}.{}", ipv6_nibbles(ipv6), ORIGIN_ZONE_V6),
    }
}

/// Parse the first AS number out of a `dig +short` TXT answer.
///
/// Only the first record is considered. Returns `None` when the answer is
/// empty, has no `|`, or the first pipe-delimited field is not a single
/// number (multi-origin fields such as `1 23 456` included).
pub fn parse_origin_txt(answer: &str) -> Option<AsNumber> {
    let record = answer.trim().lines().next()?.trim().trim_matches('"');
    let (first, _) = record.split_once('|')?;
    first.trim().parse().ok()
}

fn ipv4_reversed(ip: Ipv4Addr) -> String {
    let o = ip.octets();
    format!("{}.{}.{}.{}", o[3], o[2], o[1], o[0])
}

/// Convert IPv6 address into reversed nibble format string
fn ipv6_nibbles(ip: Ipv6Addr) -> String {
    ip.octets()
        .iter()
        .rev()
        .flat_map(|octet| [octet & 0x0f, octet >> 4])
        .map(|nibble| format!("{:x}", nibble))
        .collect::<Vec<_>>()
        .join(".")
}
