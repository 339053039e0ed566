//! Visual styling utilities for the CLI.
//!
//! Colors follow the category of a concentration, so a value reads the same
//! everywhere it is printed: in the dashboard, the history table and the
//! forecast table.

use owo_colors::OwoColorize;

use pm25_core::series::{Direction, Tone, Trend};
use pm25_core::{AqiCategory, classify};

/// Bars used for sparklines, lowest first.
const SPARK_BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Paint `text` in the color of `category`.
fn paint(text: &str, category: AqiCategory) -> String {
    match category {
        AqiCategory::Good => format!("{}", text.green()),
        AqiCategory::Moderate => format!("{}", text.yellow()),
        // Orange (RGB: 255, 165, 0)
        AqiCategory::UnhealthyForSensitiveGroups => format!("{}", text.truecolor(255, 165, 0)),
        AqiCategory::Unhealthy => format!("{}", text.red()),
    }
}

/// Format a concentration with one decimal, colored by its category.
pub fn format_pm25_colored(pm25: f64, no_color: bool) -> String {
    let text = format!("{:.1}", pm25);
    if no_color {
        text
    } else {
        paint(&text, classify(pm25))
    }
}

/// Format a category label in its own color.
pub fn format_category(category: AqiCategory, no_color: bool) -> String {
    if no_color {
        category.label().to_string()
    } else {
        paint(category.label(), category)
    }
}

/// Format a trend as arrow plus signed delta: rising is a warning, falling
/// or steady is favorable.
pub fn format_trend(trend: &Trend, no_color: bool) -> String {
    let text = format!("{} {:+.1}", trend.direction.arrow(), trend.delta);
    if no_color {
        return text;
    }
    match trend.direction.tone() {
        Tone::Warning => format!("{}", text.red()),
        Tone::Favorable => format!("{}", text.green()),
    }
}

/// Bold heading.
pub fn heading(text: &str, no_color: bool) -> String {
    if no_color {
        text.to_string()
    } else {
        format!("{}", text.bold())
    }
}

/// Dimmed secondary text.
pub fn dim(text: &str, no_color: bool) -> String {
    if no_color {
        text.to_string()
    } else {
        format!("{}", text.dimmed())
    }
}

/// Warning text, for errors shown inline rather than aborting.
pub fn warning(text: &str, no_color: bool) -> String {
    if no_color {
        text.to_string()
    } else {
        format!("{}", text.yellow())
    }
}

/// Render values as a one-line bar chart scaled between their min and max.
pub fn sparkline(values: &[f64]) -> String {
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let span = max - min;
    let top = (SPARK_BARS.len() - 1) as f64;

    values
        .iter()
        .map(|&v| {
            let level = if span > 0.0 {
                ((v - min) / span * top).round() as usize
            } else {
                0
            };
            SPARK_BARS[level.min(SPARK_BARS.len() - 1)]
        })
        .collect()
}

/// Label for a trend direction in plain words.
pub fn direction_word(direction: Direction) -> &'static str {
    match direction {
        Direction::Up => "rising",
        Direction::Down => "falling",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pm25_no_color() {
        assert_eq!(format_pm25_colored(12.345, true), "12.3");
    }

    #[test]
    fn test_pm25_colored_contains_value() {
        let s = format_pm25_colored(40.0, false);
        assert!(s.contains("40.0"));
        assert_ne!(s, "40.0");
    }

    #[test]
    fn test_category_no_color() {
        assert_eq!(
            format_category(AqiCategory::UnhealthyForSensitiveGroups, true),
            "Unhealthy for Sensitive Groups"
        );
    }

    #[test]
    fn test_trend_format() {
        let up = pm25_core::series::trend(20.0, 25.0);
        assert_eq!(format_trend(&up, true), "↑ +5.0");
        let down = pm25_core::series::trend(20.0, 15.0);
        assert_eq!(format_trend(&down, true), "↓ -5.0");
    }

    #[test]
    fn test_sparkline_scales_to_range() {
        assert_eq!(sparkline(&[0.0, 7.0, 14.0]), "▁▅█");
        assert_eq!(sparkline(&[5.0, 5.0]), "▁▁");
        assert_eq!(sparkline(&[]), "");
    }

    #[test]
    fn test_direction_word() {
        assert_eq!(direction_word(Direction::Up), "rising");
        assert_eq!(direction_word(Direction::Down), "falling");
    }
}
