//! Client IP as seen through reverse proxies.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::HeaderMap;
use axum::http::request::Parts;

/// Best-effort client address: `X-Forwarded-For` first hop, then
/// `X-Real-IP`, then the socket peer. `None` when nothing usable is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub Option<String>);

impl ClientIp {
    /// Resolve from request headers and the optional socket peer.
    pub fn resolve(headers: &HeaderMap, peer: Option<SocketAddr>) -> Self {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .and_then(clean_ip);
        if forwarded.is_some() {
            return Self(forwarded);
        }

        let real = headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .and_then(clean_ip);
        if real.is_some() {
            return Self(real);
        }

        Self(peer.and_then(|addr| clean_ip(&addr.ip().to_string())))
    }
}

/// Trim and strip the IPv4-mapped IPv6 prefix.
fn clean_ip(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let ip = trimmed.strip_prefix("::ffff:").unwrap_or(trimmed);
    (!ip.is_empty()).then(|| ip.to_string())
}

impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        Ok(Self::resolve(&parts.headers, peer))
    }
}
