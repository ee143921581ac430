//! Physical constants (SI units)

/// Speed of light in vacuum (m/s)
pub const C: f64 = 299_792_458.0;

/// Permeability of free space (H/m)
pub const MU0: f64 = 4e-7 * std::f64::consts::PI;

/// Permittivity of free space (F/m)
pub const EPS0: f64 = 1.0 / (MU0 * C * C);

/// Free-space wavelength in metres
pub fn wavelength(frequency_hz: f64) -> f64 {
    C / frequency_hz
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eps0_matches_reference() {
        assert!((EPS0 - 8.854_187_8e-12).abs() < 1e-18);
    }

    #[test]
    fn test_wavelength() {
        let lambda = wavelength(2.4e9);
        assert!((lambda - 0.124_913_524).abs() < 1e-9);
    }
}
