//! Exploration schedules
//!
//! A schedule gives the exploration rate for a trial. The policy is gated by
//! `epsilon = 1 - rate`: on a visited state it exploits when a uniform draw
//! falls below epsilon, and explores otherwise. Trials are counted from 1.

use serde::{Deserialize, Serialize};
use tracing::warn;

use smartcab_core::{Result, SmartcabError};

/// How the exploration rate evolves with the trial count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExplorationSchedule {
    /// Fixed rate for every trial
    Constant { rate: f64 },

    /// Straight line from `start` at trial 1 to `end` at trial `trials`, then flat
    Linear { start: f64, end: f64, trials: u32 },

    /// `start * decay^(trial - 1)`, never below `min`
    Exponential { start: f64, decay: f64, min: f64 },

    /// `scale / trial`, capped at 1
    Reciprocal { scale: f64 },
}

impl ExplorationSchedule {
    /// Exploration rate for `trial`, or `None` when the schedule cannot be
    /// evaluated there (reciprocal decay at trial 0).
    pub fn rate(&self, trial: u32) -> Option<f64> {
        let rate = match *self {
            ExplorationSchedule::Constant { rate } => rate,
            ExplorationSchedule::Linear { start, end, trials } => {
                if trials <= 1 || trial >= trials {
                    end
                } else {
                    let progress = f64::from(trial.saturating_sub(1)) / f64::from(trials - 1);
                    start + (end - start) * progress
                }
            }
            ExplorationSchedule::Exponential { start, decay, min } => {
                let exponent = i32::try_from(trial.saturating_sub(1)).unwrap_or(i32::MAX);
                (start * decay.powi(exponent)).max(min)
            }
            ExplorationSchedule::Reciprocal { scale } => {
                if trial == 0 {
                    return None;
                }
                scale / f64::from(trial)
            }
        };
        Some(rate.clamp(0.0, 1.0))
    }

    /// Exploitation gate for `trial`. Falls back to 0 (always explore) when
    /// the rate cannot be evaluated.
    pub fn epsilon(&self, trial: u32) -> f64 {
        match self.rate(trial) {
            Some(rate) => 1.0 - rate,
            None => {
                warn!("Exploration schedule undefined at trial {}, using epsilon 0", trial);
                0.0
            }
        }
    }

    /// Reject parameters outside their meaningful range
    pub fn validate(&self) -> Result<()> {
        let unit = |name: &str, v: f64| {
            if (0.0..=1.0).contains(&v) {
                Ok(())
            } else {
                Err(SmartcabError::Config(format!(
                    "exploration {name} must be within [0, 1], got {v}"
                )))
            }
        };

        match *self {
            ExplorationSchedule::Constant { rate } => unit("rate", rate),
            ExplorationSchedule::Linear { start, end, .. } => {
                unit("start", start)?;
                unit("end", end)
            }
            ExplorationSchedule::Exponential { start, decay, min } => {
                unit("start", start)?;
                unit("decay", decay)?;
                unit("min", min)
            }
            ExplorationSchedule::Reciprocal { scale } => {
                if scale >= 0.0 {
                    Ok(())
                } else {
                    Err(SmartcabError::Config(format!(
                        "exploration scale must be non-negative, got {scale}"
                    )))
                }
            }
        }
    }
}

impl Default for ExplorationSchedule {
    fn default() -> Self {
        ExplorationSchedule::Reciprocal { scale: 1.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant() {
        let schedule = ExplorationSchedule::Constant { rate: 0.2 };
        assert_eq!(schedule.rate(1), Some(0.2));
        assert_eq!(schedule.rate(500), Some(0.2));
        assert!((schedule.epsilon(3) - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_constant_zero_rate_always_exploits() {
        let schedule = ExplorationSchedule::Constant { rate: 0.0 };
        assert_eq!(schedule.epsilon(1), 1.0);
    }

    #[test]
    fn test_linear_decays_then_flattens() {
        let schedule = ExplorationSchedule::Linear {
            start: 1.0,
            end: 0.0,
            trials: 10,
        };
        assert_eq!(schedule.rate(1), Some(1.0));
        assert!((schedule.rate(9).unwrap() - 1.0 / 9.0).abs() < 1e-12);
        assert_eq!(schedule.rate(10), Some(0.0));
        assert_eq!(schedule.rate(50), Some(0.0));
    }

    #[test]
    fn test_linear_steps_are_even() {
        let schedule = ExplorationSchedule::Linear {
            start: 1.0,
            end: 0.1,
            trials: 10,
        };
        let rates: Vec<f64> = (1..=10).map(|t| schedule.rate(t).unwrap()).collect();

        assert!((rates[8] - 0.2).abs() < 1e-12);
        for pair in rates.windows(2) {
            assert!((pair[0] - pair[1] - 0.1).abs() < 1e-12, "uneven step in {rates:?}");
        }
    }

    #[test]
    fn test_linear_single_trial_is_end() {
        let schedule = ExplorationSchedule::Linear {
            start: 1.0,
            end: 0.3,
            trials: 1,
        };
        assert_eq!(schedule.rate(1), Some(0.3));
    }

    #[test]
    fn test_exponential_respects_floor() {
        let schedule = ExplorationSchedule::Exponential {
            start: 1.0,
            decay: 0.5,
            min: 0.1,
        };
        assert_eq!(schedule.rate(1), Some(1.0));
        assert_eq!(schedule.rate(2), Some(0.5));
        assert_eq!(schedule.rate(3), Some(0.25));
        assert_eq!(schedule.rate(20), Some(0.1));
    }

    #[test]
    fn test_reciprocal_is_non_increasing() {
        let schedule = ExplorationSchedule::default();
        let rates: Vec<f64> = (1..50).map(|t| schedule.rate(t).unwrap()).collect();
        assert_eq!(rates[0], 1.0);
        assert!(rates.windows(2).all(|w| w[1] <= w[0]));
    }

    #[test]
    fn test_reciprocal_guard_at_trial_zero() {
        let schedule = ExplorationSchedule::Reciprocal { scale: 1.0 };
        assert_eq!(schedule.rate(0), None);
        assert_eq!(schedule.epsilon(0), 0.0);
    }

    #[test]
    fn test_rates_are_clamped() {
        let schedule = ExplorationSchedule::Reciprocal { scale: 4.0 };
        assert_eq!(schedule.rate(2), Some(1.0));
        assert_eq!(schedule.rate(8), Some(0.5));
    }

    #[test]
    fn test_validate() {
        assert!(ExplorationSchedule::Constant { rate: 0.3 }.validate().is_ok());
        assert!(ExplorationSchedule::Constant { rate: 1.3 }.validate().is_err());
        assert!(ExplorationSchedule::Reciprocal { scale: -1.0 }
            .validate()
            .is_err());
        assert!(ExplorationSchedule::Exponential {
            start: 1.0,
            decay: 2.0,
            min: 0.0
        }
        .validate()
        .is_err());
    }

    #[test]
    fn test_deserialize_from_toml_style_json() {
        let schedule: ExplorationSchedule =
            serde_json::from_str(r#"{"kind": "linear", "start": 0.9, "end": 0.1, "trials": 50}"#)
                .unwrap();
        assert_eq!(
            schedule,
            ExplorationSchedule::Linear {
                start: 0.9,
                end: 0.1,
                trials: 50
            }
        );
    }
}
