//! # Antenna Models
//!
//! Closed-form first-cut designs for the antenna kinds the agent can map a
//! model response onto. These are symbolic estimates; a full-wave solve in
//! the CAD tool is what a real run would rely on.

use crate::error::{self, Result};
use crate::materials;
use crate::physics;
use serde::Serialize;
use std::fmt;

/// Antenna family requested by the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AntennaKind {
    Dipole,
    Patch,
}

impl AntennaKind {
    /// Map a free-form `antenna_type` string onto a known family.
    ///
    /// Matches "dipole" and "patch" as case-insensitive substrings; anything
    /// else is built as a dipole.
    pub fn from_type_str(antenna_type: &str) -> Self {
        let lower = antenna_type.to_lowercase();
        if lower.contains("dipole") {
            AntennaKind::Dipole
        } else if lower.contains("patch") {
            AntennaKind::Patch
        } else {
            AntennaKind::Dipole
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AntennaKind::Dipole => "dipole",
            AntennaKind::Patch => "patch",
        }
    }
}

impl fmt::Display for AntennaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Dipole
// ============================================================================

/// Half-wave dipole with an end-effect correction factor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dipole {
    frequency_hz: f64,
    correction: f64,
}

impl Dipole {
    pub const END_EFFECT_CORRECTION: f64 = 0.95;

    pub fn new(frequency_hz: f64) -> Result<Self> {
        Self::with_correction(frequency_hz, Self::END_EFFECT_CORRECTION)
    }

    pub fn with_correction(frequency_hz: f64, correction: f64) -> Result<Self> {
        check_frequency(frequency_hz)?;
        if !correction.is_finite() || correction <= 0.0 {
            return Err(error::invalid_argument(format!(
                "correction factor must be positive, got {}",
                correction
            )));
        }
        Ok(Self { frequency_hz, correction })
    }

    pub fn design_params(&self) -> DipoleParams {
        let wavelength = physics::wavelength(self.frequency_hz);
        DipoleParams {
            frequency_hz: self.frequency_hz,
            wavelength_m: wavelength,
            length_m: wavelength / 2.0 * self.correction,
            radius_m: wavelength * 0.005,
            correction: self.correction,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DipoleParams {
    pub frequency_hz: f64,
    pub wavelength_m: f64,
    pub length_m: f64,
    pub radius_m: f64,
    pub correction: f64,
}

// ============================================================================
// Patch
// ============================================================================

/// Rectangular microstrip patch (TM10 width approximation)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Patch {
    frequency_hz: f64,
    eps_r: f64,
}

impl Patch {
    pub fn new(frequency_hz: f64) -> Result<Self> {
        let eps_r = materials::FR4.eps_r.unwrap_or(4.4);
        Self::on_substrate(frequency_hz, eps_r)
    }

    pub fn on_substrate(frequency_hz: f64, eps_r: f64) -> Result<Self> {
        check_frequency(frequency_hz)?;
        if !eps_r.is_finite() || eps_r < 1.0 {
            return Err(error::invalid_argument(format!(
                "relative permittivity must be >= 1, got {}",
                eps_r
            )));
        }
        Ok(Self { frequency_hz, eps_r })
    }

    pub fn design_params(&self) -> PatchParams {
        let width = physics::C / (2.0 * self.frequency_hz) * (2.0 / (1.0 + self.eps_r)).sqrt();
        PatchParams {
            frequency_hz: self.frequency_hz,
            eps_r: self.eps_r,
            width_m: width,
            // fringing shortens the resonant length
            length_m: width * 0.95,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PatchParams {
    pub frequency_hz: f64,
    pub eps_r: f64,
    pub width_m: f64,
    pub length_m: f64,
}

// ============================================================================
// Antenna
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Antenna {
    Dipole(Dipole),
    Patch(Patch),
}

/// Geometry parameters for either antenna family
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DesignParams {
    Dipole(DipoleParams),
    Patch(PatchParams),
}

impl DesignParams {
    pub fn frequency_hz(&self) -> f64 {
        match self {
            DesignParams::Dipole(p) => p.frequency_hz,
            DesignParams::Patch(p) => p.frequency_hz,
        }
    }

    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Quick analytical estimate, replaced by solver output in a real run
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PerformanceEstimate {
    pub resonant_freq_hz: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_impedance_ohm: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_gain_dbi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bandwidth_pct: Option<f64>,
}

impl Antenna {
    pub fn new(kind: AntennaKind, frequency_hz: f64) -> Result<Self> {
        Ok(match kind {
            AntennaKind::Dipole => Antenna::Dipole(Dipole::new(frequency_hz)?),
            AntennaKind::Patch => Antenna::Patch(Patch::new(frequency_hz)?),
        })
    }

    /// One antenna per requested frequency, in order
    pub fn for_frequencies(kind: AntennaKind, frequencies_hz: &[f64]) -> Result<Vec<Self>> {
        frequencies_hz.iter().map(|&f| Self::new(kind, f)).collect()
    }

    pub fn kind(&self) -> AntennaKind {
        match self {
            Antenna::Dipole(_) => AntennaKind::Dipole,
            Antenna::Patch(_) => AntennaKind::Patch,
        }
    }

    /// Display name used in reports
    pub fn name(&self) -> &'static str {
        match self {
            Antenna::Dipole(_) => "Dipole",
            Antenna::Patch(_) => "PatchAntenna",
        }
    }

    pub fn frequency_hz(&self) -> f64 {
        match self {
            Antenna::Dipole(d) => d.frequency_hz,
            Antenna::Patch(p) => p.frequency_hz,
        }
    }

    pub fn design_params(&self) -> DesignParams {
        match self {
            Antenna::Dipole(d) => DesignParams::Dipole(d.design_params()),
            Antenna::Patch(p) => DesignParams::Patch(p.design_params()),
        }
    }

    pub fn estimate(&self) -> PerformanceEstimate {
        match self {
            Antenna::Dipole(d) => PerformanceEstimate {
                resonant_freq_hz: d.frequency_hz,
                input_impedance_ohm: Some(73.0),
                estimated_gain_dbi: Some(2.15),
                bandwidth_pct: None,
            },
            Antenna::Patch(p) => PerformanceEstimate {
                resonant_freq_hz: p.frequency_hz,
                input_impedance_ohm: None,
                estimated_gain_dbi: None,
                bandwidth_pct: Some(2.0),
            },
        }
    }
}

fn check_frequency(frequency_hz: f64) -> Result<()> {
    if frequency_hz.is_finite() && frequency_hz > 0.0 {
        Ok(())
    } else {
        Err(error::invalid_frequency(frequency_hz))
    }
}
