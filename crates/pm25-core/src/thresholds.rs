//! PM2.5 health categories.
//!
//! This module maps a PM2.5 concentration (µg/m³) onto a health category
//! with a fixed advisory text. Bounds are inclusive upper limits and follow
//! the US EPA 24-hour breakpoints.
//!
//! # Example
//!
//! ```
//! use pm25_core::{AqiCategory, Thresholds};
//!
//! let thresholds = Thresholds::default();
//! assert_eq!(thresholds.evaluate(12.0), AqiCategory::Good);
//! assert_eq!(thresholds.evaluate(40.0), AqiCategory::UnhealthyForSensitiveGroups);
//!
//! println!("{}", AqiCategory::Moderate.advisory());
//! ```

use core::fmt;

use serde::{Deserialize, Serialize};

/// Health category for a PM2.5 concentration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AqiCategory {
    /// 0 – 15.4 µg/m³.
    Good,
    /// Above 15.4 up to 35.4 µg/m³.
    Moderate,
    /// Above 35.4 up to 54.4 µg/m³.
    UnhealthyForSensitiveGroups,
    /// Above 54.4 µg/m³.
    Unhealthy,
}

impl AqiCategory {
    /// Short label for display.
    pub fn label(&self) -> &'static str {
        match self {
            AqiCategory::Good => "Good",
            AqiCategory::Moderate => "Moderate",
            AqiCategory::UnhealthyForSensitiveGroups => "Unhealthy for Sensitive Groups",
            AqiCategory::Unhealthy => "Unhealthy",
        }
    }

    /// Fixed health advisory for this category.
    pub fn advisory(&self) -> &'static str {
        match self {
            AqiCategory::Good => "Air quality is satisfactory. Enjoy your outdoor activities.",
            AqiCategory::Moderate => {
                "Air quality is acceptable. Unusually sensitive people should consider reducing prolonged outdoor exertion."
            }
            AqiCategory::UnhealthyForSensitiveGroups => {
                "Children, older adults and people with heart or lung disease should reduce prolonged outdoor exertion."
            }
            AqiCategory::Unhealthy => {
                "Everyone should reduce outdoor exertion. Sensitive groups should stay indoors and wear a mask outside."
            }
        }
    }
}

impl fmt::Display for AqiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Configuration for PM2.5 category bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Upper bound (inclusive) for Good.
    pub good_max: f64,
    /// Upper bound (inclusive) for Moderate.
    pub moderate_max: f64,
    /// Upper bound (inclusive) for Unhealthy for Sensitive Groups.
    pub sensitive_max: f64,
    // Above sensitive_max is Unhealthy
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            good_max: 15.4,
            moderate_max: 35.4,
            sensitive_max: 54.4,
        }
    }
}

/// Threshold evaluator for PM2.5 readings.
#[derive(Debug, Clone, Copy, Default)]
pub struct Thresholds {
    config: ThresholdConfig,
}

impl Thresholds {
    /// Create a new threshold evaluator with the given configuration.
    pub fn new(config: ThresholdConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    pub fn config(&self) -> &ThresholdConfig {
        &self.config
    }

    /// Evaluate the category for a concentration.
    ///
    /// Negative input falls into Good. NaN compares false against every
    /// bound and lands in Unhealthy; payload validation keeps NaN out.
    pub fn evaluate(&self, pm25: f64) -> AqiCategory {
        if pm25 <= self.config.good_max {
            AqiCategory::Good
        } else if pm25 <= self.config.moderate_max {
            AqiCategory::Moderate
        } else if pm25 <= self.config.sensitive_max {
            AqiCategory::UnhealthyForSensitiveGroups
        } else {
            AqiCategory::Unhealthy
        }
    }
}

/// Classify a concentration with the default bounds.
pub fn classify(pm25: f64) -> AqiCategory {
    Thresholds::default().evaluate(pm25)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_thresholds() {
        assert_eq!(classify(0.0), AqiCategory::Good);
        assert_eq!(classify(10.0), AqiCategory::Good);
        assert_eq!(classify(20.0), AqiCategory::Moderate);
        assert_eq!(classify(40.0), AqiCategory::UnhealthyForSensitiveGroups);
        assert_eq!(classify(80.0), AqiCategory::Unhealthy);
    }

    #[test]
    fn test_boundary_values() {
        assert_eq!(classify(15.4), AqiCategory::Good);
        assert_eq!(classify(15.40001), AqiCategory::Moderate);
        assert_eq!(classify(35.4), AqiCategory::Moderate);
        assert_eq!(classify(35.40001), AqiCategory::UnhealthyForSensitiveGroups);
        assert_eq!(classify(54.4), AqiCategory::UnhealthyForSensitiveGroups);
        assert_eq!(classify(54.40001), AqiCategory::Unhealthy);
    }

    #[test]
    fn test_negative_is_good() {
        assert_eq!(classify(-1.0), AqiCategory::Good);
    }

    #[test]
    fn test_custom_config() {
        let t = Thresholds::new(ThresholdConfig {
            good_max: 12.0,
            moderate_max: 35.0,
            sensitive_max: 55.0,
        });
        assert_eq!(t.evaluate(13.0), AqiCategory::Moderate);
        assert_eq!(t.evaluate(55.0), AqiCategory::UnhealthyForSensitiveGroups);
    }

    #[test]
    fn test_every_category_has_advisory() {
        for category in [
            AqiCategory::Good,
            AqiCategory::Moderate,
            AqiCategory::UnhealthyForSensitiveGroups,
            AqiCategory::Unhealthy,
        ] {
            assert!(!category.advisory().is_empty());
            assert_eq!(category.to_string(), category.label());
        }
    }
}
