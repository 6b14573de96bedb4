//! Output patterns produced by workers.
//!
//! Each pattern is a pure function from an emission index to a line, so the
//! sequence a worker produces can be checked without running real time.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Width of every emitted line.
pub const LINE_WIDTH: usize = 4;

/// Number of distinct Counter values before it wraps.
const COUNTER_CYCLE: u64 = 10_000;

/// Number of letters Alphabet cycles through.
const ALPHABET_CYCLE: u64 = 26;

const BANNER_DASHES: &str = "----";
const BANNER_STARS: &str = "****";

/// Kind of repeating output a worker produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternKind {
    /// Zero-padded decimals `0000` through `9999`, then wraps.
    Counter,
    /// `AAAA` through `ZZZZ`, then wraps.
    Alphabet,
    /// Alternates `----` and `****`, starting with dashes.
    Banner,
}

impl PatternKind {
    /// All pattern kinds, in declaration order.
    pub const ALL: [Self; 3] = [Self::Counter, Self::Alphabet, Self::Banner];

    /// Name used in config files and worker descriptors.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Counter => "counter",
            Self::Alphabet => "alphabet",
            Self::Banner => "banner",
        }
    }

    /// Line produced at the given emission index.
    pub fn emission(self, index: u64) -> String {
        match self {
            Self::Counter => format!("{:04}", index % COUNTER_CYCLE),
            Self::Alphabet => {
                #[allow(clippy::cast_possible_truncation)]
                let offset = (index % ALPHABET_CYCLE) as u8;
                char::from(b'A' + offset).to_string().repeat(LINE_WIDTH)
            }
            Self::Banner => {
                if index % 2 == 0 {
                    BANNER_DASHES.to_string()
                } else {
                    BANNER_STARS.to_string()
                }
            }
        }
    }

    /// Number of emissions before the sequence repeats.
    pub const fn period(self) -> u64 {
        match self {
            Self::Counter => COUNTER_CYCLE,
            Self::Alphabet => ALPHABET_CYCLE,
            Self::Banner => 2,
        }
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when a pattern name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown pattern '{0}' (expected counter, alphabet or banner)")]
pub struct UnknownPattern(pub String);

impl FromStr for PatternKind {
    type Err = UnknownPattern;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "counter" => Ok(Self::Counter),
            "alphabet" => Ok(Self::Alphabet),
            "banner" => Ok(Self::Banner),
            _ => Err(UnknownPattern(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_is_zero_padded() {
        assert_eq!(PatternKind::Counter.emission(0), "0000");
        assert_eq!(PatternKind::Counter.emission(7), "0007");
        assert_eq!(PatternKind::Counter.emission(42), "0042");
        assert_eq!(PatternKind::Counter.emission(9999), "9999");
    }

    #[test]
    fn test_counter_covers_full_cycle() {
        for n in 0..COUNTER_CYCLE {
            let line = PatternKind::Counter.emission(n);
            assert_eq!(line.len(), LINE_WIDTH);
            assert_eq!(line.parse::<u64>().unwrap(), n);
        }
    }

    #[test]
    fn test_counter_wraps() {
        assert_eq!(PatternKind::Counter.emission(10_000), PatternKind::Counter.emission(0));
        assert_eq!(PatternKind::Counter.emission(10_001), "0001");
    }

    #[test]
    fn test_alphabet_cycle() {
        for k in 0..ALPHABET_CYCLE {
            let expected = char::from(b'A' + k as u8).to_string().repeat(4);
            assert_eq!(PatternKind::Alphabet.emission(k), expected);
        }
        assert_eq!(PatternKind::Alphabet.emission(25), "ZZZZ");
    }

    #[test]
    fn test_alphabet_wraps() {
        assert_eq!(PatternKind::Alphabet.emission(26), PatternKind::Alphabet.emission(0));
        assert_eq!(PatternKind::Alphabet.emission(27), "BBBB");
    }

    #[test]
    fn test_banner_alternates_starting_with_dashes() {
        let lines: Vec<String> = (0..6).map(|i| PatternKind::Banner.emission(i)).collect();
        assert_eq!(lines, vec!["----", "****", "----", "****", "----", "****"]);
    }

    #[test]
    fn test_emission_repeats_after_period() {
        for kind in PatternKind::ALL {
            for i in 0..5 {
                assert_eq!(kind.emission(i), kind.emission(i + kind.period()));
            }
        }
    }

    #[test]
    fn test_name_round_trip() {
        for kind in PatternKind::ALL {
            assert_eq!(kind.as_str().parse::<PatternKind>().unwrap(), kind);
            assert_eq!(kind.to_string(), kind.as_str());
        }
        assert_eq!(" Banner ".parse::<PatternKind>().unwrap(), PatternKind::Banner);
        assert!("spinner".parse::<PatternKind>().is_err());
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&PatternKind::Alphabet).unwrap();
        assert_eq!(json, "\"alphabet\"");
        let kind: PatternKind = serde_json::from_str("\"counter\"").unwrap();
        assert_eq!(kind, PatternKind::Counter);
    }
}
