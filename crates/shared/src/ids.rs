//! Process-unique identifiers for in-flight exchanges.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static REQUEST_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Opaque identifier distinguishing concurrent HTTP exchanges.
///
/// Ids render as `REQ_<epoch-ms>_<sequence>`; the sequence keeps ids unique when
/// several requests are dispatched within the same millisecond.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Arc<str>);

impl RequestId {
    /// Generate a fresh id, unique within this process.
    #[must_use]
    pub fn generate() -> Self {
        let sequence = REQUEST_ID_COUNTER.fetch_add(1, Ordering::Relaxed);
        let epoch_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |duration| duration.as_millis());
        Self(Arc::from(format!("REQ_{epoch_ms}_{sequence}")))
    }

    /// Wrap an externally supplied id. Empty values are replaced by a generated id.
    #[must_use]
    pub fn from_external(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            Self::generate()
        } else {
            Self(Arc::from(trimmed))
        }
    }

    /// Borrow the identifier as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn generated_ids_are_unique() {
        let ids: HashSet<RequestId> = (0..256).map(|_| RequestId::generate()).collect();
        assert_eq!(ids.len(), 256);
    }

    #[test]
    fn generated_ids_use_request_prefix() {
        assert!(RequestId::generate().as_str().starts_with("REQ_"));
    }

    #[test]
    fn external_ids_are_trimmed_and_never_empty() {
        assert_eq!(RequestId::from_external("  abc ").as_str(), "abc");
        assert!(RequestId::from_external("   ").as_str().starts_with("REQ_"));
    }

    #[test]
    fn ids_serialize_as_plain_strings() -> Result<(), serde_json::Error> {
        let id = RequestId::from_external("REQ_1_7");
        assert_eq!(serde_json::to_string(&id)?, "\"REQ_1_7\"");

        let decoded: RequestId = serde_json::from_str("\"REQ_2_9\"")?;
        assert_eq!(decoded.as_str(), "REQ_2_9");
        Ok(())
    }
}
