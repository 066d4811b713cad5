//! Named calendar periods used to segment history and forecasts
//!
//! The default segmentation isolates the pandemic years as a structural
//! break and splits the forecast horizon into a short and a long phase:
//!
//! | Period           | Years     | Phase    |
//! |------------------|-----------|----------|
//! | Pre-Pandemic     | 2015–2019 | history  |
//! | Pandemic         | 2020–2022 | history  |
//! | Post-Pandemic    | 2023–2025 | history  |
//! | Forecast-Phase-1 | 2026–2030 | forecast |
//! | Forecast-Phase-2 | 2031–2035 | forecast |

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Whether a period holds observed or projected years
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodPhase {
    History,
    Forecast,
}

/// A named, inclusive range of years
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub name: String,
    pub start_year: i32,
    pub end_year: i32,
    pub phase: PeriodPhase,
}

impl Period {
    pub fn new(name: impl Into<String>, start_year: i32, end_year: i32, phase: PeriodPhase) -> Self {
        Self {
            name: name.into(),
            start_year,
            end_year,
            phase,
        }
    }

    pub fn contains(&self, year: i32) -> bool {
        (self.start_year..=self.end_year).contains(&year)
    }
}

/// Validated, contiguous and ascending list of periods
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Period>", into = "Vec<Period>")]
pub struct PeriodConfig {
    periods: Vec<Period>,
}

impl PeriodConfig {
    /// Validate and wrap a list of periods.
    ///
    /// Periods must be non-empty, uniquely named, ascending and contiguous
    /// (each one starting the year after the previous ends). History periods
    /// must all precede forecast periods.
    pub fn new(periods: Vec<Period>) -> Result<Self> {
        if periods.is_empty() {
            return Err(ForecastError::Config(
                "At least one period must be configured".to_string(),
            ));
        }

        let mut names = HashSet::new();
        for period in &periods {
            if period.name.trim().is_empty() {
                return Err(ForecastError::Config("Period names must not be empty".to_string()));
            }
            if !names.insert(period.name.as_str()) {
                return Err(ForecastError::Config(format!(
                    "Duplicate period name '{}'",
                    period.name
                )));
            }
            if period.start_year > period.end_year {
                return Err(ForecastError::Config(format!(
                    "Period '{}' starts after it ends ({} > {})",
                    period.name, period.start_year, period.end_year
                )));
            }
        }

        for pair in periods.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            if next.start_year != prev.end_year + 1 {
                return Err(ForecastError::Config(format!(
                    "Periods '{}' and '{}' are not contiguous ({} then {})",
                    prev.name, next.name, prev.end_year, next.start_year
                )));
            }
            if prev.phase == PeriodPhase::Forecast && next.phase == PeriodPhase::History {
                return Err(ForecastError::Config(format!(
                    "History period '{}' follows forecast period '{}'",
                    next.name, prev.name
                )));
            }
        }

        Ok(Self { periods })
    }

    /// Period containing `year`, or [`ForecastError::OutOfRange`]
    pub fn classify(&self, year: i32) -> Result<&Period> {
        self.periods
            .iter()
            .find(|p| p.contains(year))
            .ok_or(ForecastError::OutOfRange { year })
    }

    pub fn periods(&self) -> &[Period] {
        &self.periods
    }

    pub fn names(&self) -> Vec<&str> {
        self.periods.iter().map(|p| p.name.as_str()).collect()
    }

    /// First and last configured year
    pub fn span(&self) -> (i32, i32) {
        // non-empty by construction
        let first = self.periods[0].start_year;
        let last = self.periods[self.periods.len() - 1].end_year;
        (first, last)
    }

    /// Years covered by history-phase periods, if any
    pub fn history_window(&self) -> Option<(i32, i32)> {
        let mut history = self
            .periods
            .iter()
            .filter(|p| p.phase == PeriodPhase::History);
        let first = history.next()?;
        let last = history.last().unwrap_or(first);
        Some((first.start_year, last.end_year))
    }
}

impl Default for PeriodConfig {
    fn default() -> Self {
        Self {
            periods: vec![
                Period::new("Pre-Pandemic", 2015, 2019, PeriodPhase::History),
                Period::new("Pandemic", 2020, 2022, PeriodPhase::History),
                Period::new("Post-Pandemic", 2023, 2025, PeriodPhase::History),
                Period::new("Forecast-Phase-1", 2026, 2030, PeriodPhase::Forecast),
                Period::new("Forecast-Phase-2", 2031, 2035, PeriodPhase::Forecast),
            ],
        }
    }
}

impl TryFrom<Vec<Period>> for PeriodConfig {
    type Error = ForecastError;

    fn try_from(periods: Vec<Period>) -> Result<Self> {
        PeriodConfig::new(periods)
    }
}

impl From<PeriodConfig> for Vec<Period> {
    fn from(config: PeriodConfig) -> Self {
        config.periods
    }
}

/// Name of the period containing `year`
pub fn classify(year: i32, boundaries: &PeriodConfig) -> Result<&str> {
    boundaries.classify(year).map(|p| p.name.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_periods_are_valid() {
        let defaults = PeriodConfig::default();
        let rebuilt = PeriodConfig::new(defaults.periods().to_vec()).unwrap();

        assert_eq!(rebuilt, defaults);
        assert_eq!(defaults.span(), (2015, 2035));
        assert_eq!(defaults.history_window(), Some((2015, 2025)));
    }

    #[test]
    fn test_boundaries_are_inclusive() {
        let config = PeriodConfig::default();

        assert_eq!(classify(2019, &config).unwrap(), "Pre-Pandemic");
        assert_eq!(classify(2020, &config).unwrap(), "Pandemic");
        assert_eq!(classify(2025, &config).unwrap(), "Post-Pandemic");
        assert_eq!(classify(2026, &config).unwrap(), "Forecast-Phase-1");
        assert_eq!(classify(2035, &config).unwrap(), "Forecast-Phase-2");
    }

    #[test]
    fn test_out_of_range_is_an_error() {
        let config = PeriodConfig::default();

        assert!(matches!(
            config.classify(2014),
            Err(ForecastError::OutOfRange { year: 2014 })
        ));
        assert!(matches!(
            config.classify(2036),
            Err(ForecastError::OutOfRange { year: 2036 })
        ));
    }

    #[test]
    fn test_rejects_gaps_overlaps_and_inversions() {
        let gap = vec![
            Period::new("A", 2015, 2019, PeriodPhase::History),
            Period::new("B", 2021, 2025, PeriodPhase::History),
        ];
        let overlap = vec![
            Period::new("A", 2015, 2020, PeriodPhase::History),
            Period::new("B", 2020, 2025, PeriodPhase::History),
        ];
        let inverted = vec![Period::new("A", 2020, 2015, PeriodPhase::History)];
        let interleaved = vec![
            Period::new("A", 2015, 2019, PeriodPhase::Forecast),
            Period::new("B", 2020, 2025, PeriodPhase::History),
        ];
        let duplicate = vec![
            Period::new("A", 2015, 2019, PeriodPhase::History),
            Period::new("A", 2020, 2025, PeriodPhase::History),
        ];

        for periods in [gap, overlap, inverted, interleaved, duplicate, Vec::new()] {
            assert!(matches!(
                PeriodConfig::new(periods),
                Err(ForecastError::Config(_))
            ));
        }
    }

    #[test]
    fn test_history_window_without_history_periods() {
        let config =
            PeriodConfig::new(vec![Period::new("Only", 2026, 2035, PeriodPhase::Forecast)]).unwrap();
        assert_eq!(config.history_window(), None);
    }
}
