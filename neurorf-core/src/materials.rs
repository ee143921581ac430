//! Substrate properties used when sizing geometry

use serde::Serialize;

/// Electrical properties of a conductor or dielectric
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Material {
    pub key: &'static str,
    pub name: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conductivity_s_m: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eps_r: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loss_tan: Option<f64>,
}

/// Default patch substrate
pub const FR4: Material = Material {
    key: "fr4",
    name: "FR4",
    conductivity_s_m: None,
    eps_r: Some(4.4),
    loss_tan: Some(0.02),
};
