use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Position ID — millisecond-epoch derived with an atomic sequence suffix.
///
/// The sequence counter keeps IDs unique even when two positions are opened
/// within the same millisecond.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PositionId(pub String);

static NEXT_SEQ: AtomicU64 = AtomicU64::new(0);

impl PositionId {
    pub fn generate() -> Self {
        let millis = Utc::now().timestamp_millis();
        let seq = NEXT_SEQ.fetch_add(1, Ordering::Relaxed);
        Self(format!("pos_{millis}_{seq}"))
    }

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PositionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn rapid_generation_stays_unique() {
        let ids: HashSet<PositionId> = (0..1000).map(|_| PositionId::generate()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn display_matches_inner() {
        let id = PositionId::new("pos_1_2");
        assert_eq!(id.to_string(), "pos_1_2");
    }
}
