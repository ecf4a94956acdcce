//! Client IP extraction for anonymous identities.
//!
//! Order: `cf-connecting-ip`, then `X-Forwarded-For` honoring the trusted proxy count,
//! then `X-Real-IP`, then the socket address. Every candidate must parse as an IP.

use axum::http::HeaderMap;
use std::net::{IpAddr, SocketAddr};

pub const UNKNOWN_IP: &str = "unknown";

fn header_ip(headers: &HeaderMap, name: &str) -> Option<IpAddr> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
}

/// Pick the client entry of an `X-Forwarded-For` chain `client, proxy1, proxy2, ...`.
///
/// With N trusted proxies the last N entries are theirs and the client sits just before
/// them. With none, or a chain too short to contain them, only the last entry is used.
fn from_forwarded_for(header_value: &str, trusted_proxy_count: usize) -> Option<IpAddr> {
    let ips: Vec<&str> = header_value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    let candidate = if trusted_proxy_count == 0 || ips.len() <= trusted_proxy_count {
        ips.last()
    } else {
        ips.get(ips.len() - trusted_proxy_count - 1)
    }?;

    candidate.parse().ok()
}

pub fn extract_client_ip(
    headers: &HeaderMap,
    socket_addr: Option<&SocketAddr>,
    trusted_proxy_count: usize,
) -> String {
    if let Some(ip) = header_ip(headers, "cf-connecting-ip") {
        return ip.to_string();
    }

    if let Some(ip) = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| from_forwarded_for(value, trusted_proxy_count))
    {
        return ip.to_string();
    }

    if let Some(ip) = header_ip(headers, "x-real-ip") {
        return ip.to_string();
    }

    socket_addr
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_IP.to_string())
}
