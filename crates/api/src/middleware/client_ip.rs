//! Client identity extractor.
//!
//! Review and like deduplication is keyed by the caller's IP address. Behind
//! a reverse proxy (`ORCHARD_TRUST_PROXY=true`) the first `X-Forwarded-For`
//! entry is used; otherwise the socket peer address.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{HeaderMap, request::Parts},
};

use crate::state::AppState;

const FORWARDED_FOR: &str = "x-forwarded-for";
const UNKNOWN: &str = "unknown";

/// The caller's IP address, as a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub String);

impl ClientIp {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromRequestParts<AppState> for ClientIp {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string());

        Ok(Self(resolve(
            &parts.headers,
            peer,
            state.config().trust_proxy,
        )))
    }
}

fn resolve(headers: &HeaderMap, peer: Option<String>, trust_proxy: bool) -> String {
    let forwarded = trust_proxy
        .then(|| headers.get(FORWARDED_FOR))
        .flatten()
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(String::from);

    forwarded
        .or(peer)
        .unwrap_or_else(|| UNKNOWN.to_string())
}
