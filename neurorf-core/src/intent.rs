//! Intent extraction from the user's free-text request
//!
//! Picks out frequency tokens and an antenna family hint. The result only
//! feeds the prompt; it never stands in for fields the model must return.

use crate::antenna::AntennaKind;
use regex::Regex;
use serde::Serialize;

pub const DESIGN_ANTENNA: &str = "design_antenna";

/// Structured view of a design request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DesignIntent {
    pub intent: &'static str,
    pub raw: String,
    pub antenna_type: Option<AntennaKind>,
    pub frequencies_hz: Vec<f64>,
}

pub struct IntentParser {
    freq_re: Regex,
}

impl Default for IntentParser {
    fn default() -> Self {
        Self::new()
    }
}

impl IntentParser {
    pub fn new() -> Self {
        Self {
            freq_re: Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(ghz|mhz|khz|hz)\b")
                .expect("frequency pattern is valid"),
        }
    }

    /// Parse a request such as "Make an antenna for 2.4GHz and 5 GHz"
    pub fn parse(&self, request: &str) -> DesignIntent {
        let raw = request.trim().to_string();
        let lower = raw.to_lowercase();

        let mut antenna_type = None;
        if lower.contains("dipole") {
            antenna_type = Some(AntennaKind::Dipole);
        }
        if lower.contains("patch") || lower.contains("microstrip") {
            antenna_type = Some(AntennaKind::Patch);
        }

        DesignIntent {
            intent: DESIGN_ANTENNA,
            frequencies_hz: self.extract_frequencies(&raw),
            antenna_type,
            raw,
        }
    }

    /// All frequency tokens in order of appearance, converted to Hz
    pub fn extract_frequencies(&self, text: &str) -> Vec<f64> {
        self.freq_re
            .captures_iter(text)
            .filter_map(|caps| {
                let value: f64 = caps[1].parse().ok()?;
                let scale = match caps[2].to_lowercase().as_str() {
                    "ghz" => 1e9,
                    "mhz" => 1e6,
                    "khz" => 1e3,
                    _ => 1.0,
                };
                Some(value * scale)
            })
            .collect()
    }
}
