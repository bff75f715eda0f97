//! Request context carrying the owner identity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Context for the current request.
///
/// The owner id comes from the upstream authentication layer; services
/// never derive it themselves. Every repository call made on behalf of the
/// request is scoped to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// Identity that owns everything the request may see or change.
    pub owner_id: String,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            request_time: Utc::now(),
        }
    }
}
