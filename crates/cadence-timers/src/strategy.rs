//! Runtime selection of a timer strategy.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::blocking::BlockingTimer;
use crate::busy_wait::BusyWaitTimer;
use crate::timer::Timer;
use crate::worst_case::{DEFAULT_WORST_CASE_DELAY_US, WorstCaseTimer};

/// Which wait strategy a timer uses.
///
/// Deserializes from `{"kind": "busy_wait"}`, `{"kind": "blocking"}` or
/// `{"kind": "worst_case", "worst_case_delay_us": 150}`, and parses from the
/// command-line forms `busy_wait`, `blocking`, `worst_case` and
/// `worst_case:150`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimerStrategy {
    /// Spin until each deadline
    #[default]
    BusyWait,
    /// Sleep until each deadline
    Blocking,
    /// Sleep, then spin the final `worst_case_delay_us`
    WorstCase {
        /// Expected worst-case OS wake-up delay in microseconds
        #[serde(default = "default_worst_case_delay_us")]
        worst_case_delay_us: u64,
    },
}

fn default_worst_case_delay_us() -> u64 {
    DEFAULT_WORST_CASE_DELAY_US
}

impl TimerStrategy {
    /// Build a boxed timer on the monotonic clock.
    #[must_use]
    pub fn build(self) -> Box<dyn Timer> {
        match self {
            TimerStrategy::BusyWait => Box::new(BusyWaitTimer::new()),
            TimerStrategy::Blocking => Box::new(BlockingTimer::new()),
            TimerStrategy::WorstCase {
                worst_case_delay_us,
            } => Box::new(WorstCaseTimer::with_delay_us(worst_case_delay_us)),
        }
    }

    /// Short name of the strategy.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            TimerStrategy::BusyWait => "busy_wait",
            TimerStrategy::Blocking => "blocking",
            TimerStrategy::WorstCase { .. } => "worst_case",
        }
    }
}

impl fmt::Display for TimerStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimerStrategy::WorstCase {
                worst_case_delay_us,
            } => write!(f, "worst_case:{worst_case_delay_us}"),
            other => f.write_str(other.name()),
        }
    }
}

/// Error returned when a strategy name cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseStrategyError(String);

impl fmt::Display for ParseStrategyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown timer strategy '{}', expected busy_wait, blocking or worst_case[:<us>]",
            self.0
        )
    }
}

impl std::error::Error for ParseStrategyError {}

impl FromStr for TimerStrategy {
    type Err = ParseStrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, arg) = match s.split_once(':') {
            Some((name, arg)) => (name, Some(arg)),
            None => (s, None),
        };
        match (name.trim().to_ascii_lowercase().replace('-', "_").as_str(), arg) {
            ("busy_wait" | "busy", None) => Ok(TimerStrategy::BusyWait),
            ("blocking" | "block", None) => Ok(TimerStrategy::Blocking),
            ("worst_case", None) => Ok(TimerStrategy::WorstCase {
                worst_case_delay_us: DEFAULT_WORST_CASE_DELAY_US,
            }),
            ("worst_case", Some(us)) => us
                .trim()
                .parse()
                .map(|worst_case_delay_us| TimerStrategy::WorstCase {
                    worst_case_delay_us,
                })
                .map_err(|_parse| ParseStrategyError(s.to_string())),
            _ => Err(ParseStrategyError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        assert_eq!("busy_wait".parse(), Ok(TimerStrategy::BusyWait));
        assert_eq!("Blocking".parse(), Ok(TimerStrategy::Blocking));
        assert_eq!(
            "worst-case:250".parse(),
            Ok(TimerStrategy::WorstCase {
                worst_case_delay_us: 250
            })
        );
        assert_eq!(
            "worst_case".parse(),
            Ok(TimerStrategy::WorstCase {
                worst_case_delay_us: DEFAULT_WORST_CASE_DELAY_US
            })
        );
        assert!(matches!("sleepy".parse::<TimerStrategy>(), Err(ParseStrategyError(_))));
        assert!(matches!("worst_case:abc".parse::<TimerStrategy>(), Err(ParseStrategyError(_))));
        assert!(matches!("blocking:5".parse::<TimerStrategy>(), Err(ParseStrategyError(_))));
    }

    #[test]
    fn test_display_parses_back() {
        for strategy in [
            TimerStrategy::BusyWait,
            TimerStrategy::Blocking,
            TimerStrategy::WorstCase {
                worst_case_delay_us: 75,
            },
        ] {
            assert_eq!(strategy.to_string().parse(), Ok(strategy));
        }
    }

    #[test]
    fn test_build_produces_fresh_timer() {
        for strategy in [
            TimerStrategy::BusyWait,
            TimerStrategy::Blocking,
            TimerStrategy::default(),
        ] {
            let timer = strategy.build();
            assert_eq!(timer.frequency(), None);
            assert!(!timer.is_running());
        }
    }
}
