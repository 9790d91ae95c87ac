//! The seam between the bridge and a routing engine
//!
//! [`RoutingEngine`] is implemented by [`crate::core::native::NativeEngine`]
//! for libosrm, and by in-memory doubles in tests. Backends return the
//! engine's status together with its rendered JSON object; turning that into
//! a payload or an error is shared by every caller through
//! [`reply_into_payload`].

use serde_json::Value;

use crate::core::error::{Error, Result, UNKNOWN_ENGINE_ERROR};
use crate::core::point::Point;

/// Engine status of a single query, as reported by `osrm::Status`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    Error,
}

/// Raw engine answer: status plus the rendered JSON object
#[derive(Debug, Clone, PartialEq)]
pub struct EngineReply {
    pub status: Status,
    pub body: String,
}

impl EngineReply {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: Status::Ok,
            body: body.into(),
        }
    }

    pub fn error(body: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            body: body.into(),
        }
    }
}

/// A loaded routing engine.
///
/// Implementations must tolerate concurrent queries from several threads.
/// Empty `sources`/`destinations` mean "every coordinate".
pub trait RoutingEngine: Send + Sync {
    fn table(
        &self,
        coordinates: &[Point],
        sources: &[usize],
        destinations: &[usize],
    ) -> Result<EngineReply>;

    fn route(&self, coordinates: &[Point]) -> Result<EngineReply>;

    fn trip(&self, coordinates: &[Point]) -> Result<EngineReply>;
}

/// Map an engine reply onto the caller-facing outcome.
///
/// `Ok` hands back the serialized payload untouched. `Error` becomes
/// [`Error::Api`] carrying the payload's `message` field, or
/// [`UNKNOWN_ENGINE_ERROR`] when the payload has none.
pub fn reply_into_payload(reply: EngineReply) -> Result<String> {
    match reply.status {
        Status::Ok => Ok(reply.body),
        Status::Error => {
            let parsed = serde_json::from_str::<Value>(&reply.body).ok();
            let field = |name: &str| {
                parsed
                    .as_ref()
                    .and_then(|v| v.get(name))
                    .and_then(Value::as_str)
                    .map(str::to_string)
            };

            Err(Error::Api {
                code: field("code").unwrap_or_else(|| "Unknown".to_string()),
                message: field("message").unwrap_or_else(|| UNKNOWN_ENGINE_ERROR.to_string()),
            })
        }
    }
}
