//! Worker description model.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::pattern::PatternKind;

/// Identifier of a worker within a running set.
pub type WorkerId = u32;

/// Immutable description of one repeating worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerSpec {
    /// Unique id within the set passed to the runner.
    pub id: WorkerId,
    /// What the worker prints.
    pub pattern: PatternKind,
    /// Delay held after each emission.
    #[serde(rename = "pace_ms", with = "duration_ms")]
    pub pace: Duration,
}

impl WorkerSpec {
    /// Create a new worker description.
    pub const fn new(id: WorkerId, pattern: PatternKind, pace: Duration) -> Self {
        Self { id, pattern, pace }
    }

    /// The three workers of the classic demo: Counter and Alphabet at 10ms,
    /// Banner at 500ms.
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new(1, PatternKind::Counter, Duration::from_millis(10)),
            Self::new(2, PatternKind::Alphabet, Duration::from_millis(10)),
            Self::new(3, PatternKind::Banner, Duration::from_millis(500)),
        ]
    }
}

/// Serializes a `Duration` as whole milliseconds.
mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(pace: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(pace.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_demo() {
        let specs = WorkerSpec::defaults();
        assert_eq!(specs.len(), 3);
        assert_eq!(specs[0].pattern, PatternKind::Counter);
        assert_eq!(specs[1].pattern, PatternKind::Alphabet);
        assert_eq!(specs[2].pattern, PatternKind::Banner);
        assert_eq!(specs[2].pace, Duration::from_millis(500));
        let ids: Vec<WorkerId> = specs.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_json_form() {
        let spec: WorkerSpec =
            serde_json::from_str(r#"{"id": 7, "pattern": "banner", "pace_ms": 250}"#).unwrap();
        assert_eq!(spec, WorkerSpec::new(7, PatternKind::Banner, Duration::from_millis(250)));

        let value = serde_json::to_value(spec).unwrap();
        assert_eq!(value["pace_ms"], 250);
        assert_eq!(value["pattern"], "banner");
    }
}
