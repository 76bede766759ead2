//! Caller context used to auto-fill `who` and `ip_address`
//!
//! The embedding application resolves the current actor and client address
//! and passes them in explicitly. Inside axum handlers `LogContext` can be
//! taken straight from the request:
//! ```ignore
//! async fn start_import(ctx: LogContext, State(db): State<DbConn>) -> Result<Json<Model>> {
//!     let log = ProgressLog::start(&db, &ctx, "Import", "Run").await?;
//!     Ok(Json(log.into_model()))
//! }
//! ```

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use http::request::Parts;
use serde::{Deserialize, Serialize};

/// Authenticated actor identity, inserted into request extensions by the
/// embedding application's auth layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor(pub String);

/// Who is driving a progress record and from where
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogContext {
    pub actor: Option<String>,
    pub client_ip: Option<String>,
}

impl LogContext {
    /// Context for background processes with no actor or request
    pub fn system() -> Self {
        Self::default()
    }

    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    pub fn with_client_ip(mut self, client_ip: impl Into<String>) -> Self {
        self.client_ip = Some(client_ip.into());
        self
    }
}

impl<S> FromRequestParts<S> for LogContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let actor = parts.extensions.get::<Actor>().map(|a| a.0.clone());

        let client_ip = forwarded_for(parts)
            .or_else(|| header_value(parts, "x-real-ip"))
            .or_else(|| {
                parts
                    .extensions
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip().to_string())
            });

        if client_ip.is_none() {
            tracing::trace!("No client address available for request");
        }

        Ok(Self { actor, client_ip })
    }
}

/// First hop of `X-Forwarded-For`, the original client
fn forwarded_for(parts: &Parts) -> Option<String> {
    header_value(parts, "x-forwarded-for")?
        .split(',')
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

fn header_value(parts: &Parts, name: &str) -> Option<String> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
