//! Code-unit and comoving-unit binding
//!
//! A simulation stores its fields in internal ("code") units. Once a loader
//! knows the physical size of those units it calls [`bind_code_units`] to
//! register the reserved `code_*` symbols in the dataset's registry.
//! Cosmological datasets additionally get comoving length symbols
//! (`Mpccm`, `kpccm`, ...) and the dimensionless Hubble parameter `h`.
//!
//! Rebinding always overwrites. Units built before a rebind keep the factors
//! of the registry snapshot they were parsed against.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::dimension::Dimension;
use crate::error::{Result, UnitError};
use crate::registry::{AtomicUnitDef, UnitRegistry, validate_factor};

/// Reserved simulation-native unit symbols
pub const CODE_UNIT_SYMBOLS: [&str; 9] = [
    "code_length",
    "code_mass",
    "code_time",
    "code_velocity",
    "code_density",
    "code_magnetic",
    "code_pressure",
    "code_metallicity",
    "code_temperature",
];

/// Length symbols that get a comoving `<sym>cm` counterpart
pub const COMOVING_BASES: [&str; 4] = ["m", "pc", "AU", "au"];

/// Symbol of the dimensionless Hubble parameter
pub const HUBBLE_SYMBOL: &str = "h";

/// Whether `symbol` is one of the reserved `code_*` symbols
pub fn is_code_symbol(symbol: &str) -> bool {
    CODE_UNIT_SYMBOLS.contains(&symbol)
}

/// Physical (CGS) size of a simulation's code units
///
/// Only length, mass and time are required. Missing scales are derived
/// dimensionally when the binder runs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CodeScales {
    /// Centimeters per code length
    pub length: f64,

    /// Grams per code mass
    pub mass: f64,

    /// Seconds per code time
    pub time: f64,

    /// cm/s per code velocity; defaults to length / time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub velocity: Option<f64>,

    /// g/cm³ per code density; defaults to mass / length³
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub density: Option<f64>,

    /// Ba per code pressure; defaults to mass / (length · time²)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure: Option<f64>,

    /// Kelvin per code temperature; defaults to 1
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,

    /// Gauss per code magnetic field; defaults to sqrt(4π · pressure)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub magnetic: Option<f64>,

    /// Metallicity scale; defaults to 1
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metallicity: Option<f64>,
}

impl CodeScales {
    /// Scales from the three required factors
    pub fn new(length: f64, mass: f64, time: f64) -> Self {
        Self {
            length,
            mass,
            time,
            velocity: None,
            density: None,
            pressure: None,
            temperature: None,
            magnetic: None,
            metallicity: None,
        }
    }

    pub fn with_velocity(mut self, velocity: f64) -> Self {
        self.velocity = Some(velocity);
        self
    }

    pub fn with_density(mut self, density: f64) -> Self {
        self.density = Some(density);
        self
    }

    pub fn with_pressure(mut self, pressure: f64) -> Self {
        self.pressure = Some(pressure);
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_magnetic(mut self, magnetic: f64) -> Self {
        self.magnetic = Some(magnetic);
        self
    }

    pub fn with_metallicity(mut self, metallicity: f64) -> Self {
        self.metallicity = Some(metallicity);
        self
    }

    /// Effective velocity scale
    pub fn velocity(&self) -> f64 {
        self.velocity.unwrap_or(self.length / self.time)
    }

    /// Effective density scale
    pub fn density(&self) -> f64 {
        self.density.unwrap_or(self.mass / self.length.powi(3))
    }

    /// Effective pressure scale
    pub fn pressure(&self) -> f64 {
        self.pressure
            .unwrap_or(self.mass / (self.length * self.time * self.time))
    }

    /// Effective temperature scale
    pub fn temperature(&self) -> f64 {
        self.temperature.unwrap_or(1.0)
    }

    /// Effective magnetic-field scale
    ///
    /// Derived from mass, length and time, not from an explicit pressure.
    pub fn magnetic(&self) -> f64 {
        self.magnetic.unwrap_or_else(|| {
            (4.0 * PI * self.mass / (self.length * self.time * self.time)).sqrt()
        })
    }

    /// Effective metallicity scale
    pub fn metallicity(&self) -> f64 {
        self.metallicity.unwrap_or(1.0)
    }

    /// Every `code_*` symbol with its dimension and CGS factor
    pub fn definitions(&self) -> [(&'static str, Dimension, f64); 9] {
        [
            ("code_length", Dimension::LENGTH, self.length),
            ("code_mass", Dimension::MASS, self.mass),
            ("code_time", Dimension::TIME, self.time),
            ("code_velocity", Dimension::VELOCITY, self.velocity()),
            ("code_density", Dimension::DENSITY, self.density()),
            ("code_magnetic", Dimension::MAGNETIC_FIELD, self.magnetic()),
            ("code_pressure", Dimension::PRESSURE, self.pressure()),
            ("code_metallicity", Dimension::DIMENSIONLESS, self.metallicity()),
            ("code_temperature", Dimension::TEMPERATURE, self.temperature()),
        ]
    }
}

/// Register (or rebind) every `code_*` symbol in `registry`
///
/// Fails with [`UnitError::InvalidScale`] if any factor is non-finite or
/// non-positive, in which case `registry` is left untouched.
pub fn bind_code_units(registry: &mut UnitRegistry, scales: &CodeScales) -> Result<()> {
    let definitions = scales.definitions();
    for (symbol, _, factor) in definitions {
        validate_factor(symbol, factor)?;
    }
    tracing::debug!(
        length = scales.length,
        mass = scales.mass,
        time = scales.time,
        "binding code units"
    );
    for (symbol, dimension, factor) in definitions {
        registry.insert(AtomicUnitDef::new(symbol, dimension, factor), true)?;
    }
    Ok(())
}

/// Register comoving length symbols for `redshift` and reset `h` to 1
///
/// Each `<sym>cm` has the factor of `<sym>` divided by `1 + redshift` and
/// accepts SI prefixes.
pub fn bind_comoving_units(registry: &mut UnitRegistry, redshift: f64) -> Result<()> {
    let scale = 1.0 + redshift;
    if !scale.is_finite() || scale <= 0.0 {
        return Err(UnitError::InvalidScale {
            symbol: "redshift".to_string(),
            factor: redshift,
        });
    }
    tracing::debug!(redshift, "binding comoving units");

    for base in COMOVING_BASES {
        let def = registry.lookup(base)?;
        let comoving = AtomicUnitDef::new(
            format!("{base}cm"),
            Dimension::LENGTH,
            def.cgs_factor / scale,
        )
        .prefixable();
        registry.insert(comoving, true)?;
    }

    registry.insert(
        AtomicUnitDef::new(HUBBLE_SYMBOL, Dimension::DIMENSIONLESS, 1.0),
        true,
    )
}

/// Rebind `h` to the simulation's dimensionless Hubble parameter
pub fn set_hubble_constant(registry: &mut UnitRegistry, hubble: f64) -> Result<()> {
    tracing::debug!(hubble, "setting hubble constant");
    registry.modify(HUBBLE_SYMBOL, hubble)
}

/// Bind comoving units for `redshift` and set `h` in one step
///
/// Both values are checked before anything is written, so a rejected
/// cosmology leaves `registry` as it was.
pub fn bind_cosmology(registry: &mut UnitRegistry, redshift: f64, hubble: f64) -> Result<()> {
    validate_factor(HUBBLE_SYMBOL, hubble)?;
    let mut next = registry.clone();
    bind_comoving_units(&mut next, redshift)?;
    set_hubble_constant(&mut next, hubble)?;
    *registry = next;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lut::CM_PER_PC;
    use crate::unit::Unit;

    fn bound(length: f64) -> UnitRegistry {
        let mut registry = UnitRegistry::new();
        bind_code_units(&mut registry, &CodeScales::new(length, 2.0, 4.0)).unwrap();
        registry
    }

    #[test]
    fn test_code_symbols_unbound_by_default() {
        let registry = UnitRegistry::new();
        for symbol in CODE_UNIT_SYMBOLS {
            assert!(!registry.resolves(symbol), "{symbol} should not resolve");
        }
        assert!(matches!(
            Unit::parse("code_length", &registry),
            Err(UnitError::UnknownSymbol { .. })
        ));
    }

    #[test]
    fn test_bind_registers_every_symbol() {
        let registry = bound(10.0);
        for symbol in CODE_UNIT_SYMBOLS {
            assert!(registry.contains(symbol), "{symbol} missing");
        }
    }

    #[test]
    fn test_derived_scales() {
        let registry = bound(10.0);
        assert_eq!(registry.lookup("code_velocity").unwrap().cgs_factor, 2.5);
        assert_eq!(registry.lookup("code_density").unwrap().cgs_factor, 2.0e-3);
        assert_eq!(registry.lookup("code_pressure").unwrap().cgs_factor, 2.0 / 160.0);
        assert_eq!(registry.lookup("code_temperature").unwrap().cgs_factor, 1.0);
        assert_eq!(registry.lookup("code_metallicity").unwrap().cgs_factor, 1.0);

        let magnetic = registry.lookup("code_magnetic").unwrap();
        assert_eq!(magnetic.dimension, Dimension::MAGNETIC_FIELD);
        let expected = (4.0 * PI * 2.0 / 160.0).sqrt();
        assert!((magnetic.cgs_factor - expected).abs() < 1e-15);
    }

    #[test]
    fn test_explicit_scales_win() {
        let scales = CodeScales::new(10.0, 2.0, 4.0)
            .with_velocity(7.0)
            .with_temperature(300.0);
        let mut registry = UnitRegistry::new();
        bind_code_units(&mut registry, &scales).unwrap();
        assert_eq!(registry.lookup("code_velocity").unwrap().cgs_factor, 7.0);
        assert_eq!(registry.lookup("code_temperature").unwrap().cgs_factor, 300.0);
    }

    #[test]
    fn test_rebind_keeps_old_snapshots() {
        let mut registry = bound(10.0);
        let before = Unit::parse("code_length", &registry).unwrap();

        bind_code_units(&mut registry, &CodeScales::new(20.0, 2.0, 4.0)).unwrap();
        let after = Unit::parse("code_length", &registry).unwrap();

        assert_eq!(before.cgs_value(), 10.0);
        assert_eq!(after.cgs_value(), 20.0);
    }

    #[test]
    fn test_invalid_scale_rejected() {
        let mut registry = UnitRegistry::new();
        let err = bind_code_units(&mut registry, &CodeScales::new(-1.0, 1.0, 1.0)).unwrap_err();
        assert!(matches!(err, UnitError::InvalidScale { .. }));
    }

    #[test]
    fn test_invalid_scale_leaves_registry_untouched() {
        let mut registry = bound(10.0);
        let err = bind_code_units(&mut registry, &CodeScales::new(2.0, -1.0, 1.0)).unwrap_err();
        assert!(matches!(err, UnitError::InvalidScale { ref symbol, .. } if symbol == "code_mass"));
        assert_eq!(registry.lookup("code_length").unwrap().cgs_factor, 10.0);
        assert_eq!(registry.lookup("code_mass").unwrap().cgs_factor, 2.0);
    }

    #[test]
    fn test_comoving_units() {
        let mut registry = UnitRegistry::new();
        bind_comoving_units(&mut registry, 1.0).unwrap();

        let pccm = registry.lookup("pccm").unwrap();
        assert_eq!(pccm.cgs_factor, CM_PER_PC / 2.0);

        let mpccm = Unit::parse("Mpccm", &registry).unwrap();
        let mpc = Unit::parse("Mpc", &registry).unwrap();
        assert!(mpccm.same_dimensions_as(&mpc));
        assert!((mpccm.cgs_value() * 2.0 / mpc.cgs_value() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_comoving_rejects_bad_redshift() {
        let mut registry = UnitRegistry::new();
        assert!(matches!(
            bind_comoving_units(&mut registry, -1.0),
            Err(UnitError::InvalidScale { .. })
        ));
    }

    #[test]
    fn test_hubble_constant() {
        let mut registry = UnitRegistry::new();
        bind_comoving_units(&mut registry, 0.0).unwrap();
        assert_eq!(registry.lookup("h").unwrap().cgs_factor, 1.0);

        set_hubble_constant(&mut registry, 0.7).unwrap();
        let unit = Unit::parse("Mpccm/h", &registry).unwrap();
        let mpc = Unit::parse("Mpc", &registry).unwrap();
        assert!((unit.cgs_value() * 0.7 / mpc.cgs_value() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_bind_cosmology_is_all_or_nothing() {
        let mut registry = UnitRegistry::new();
        bind_cosmology(&mut registry, 0.0, 0.7).unwrap();
        assert_eq!(registry.lookup("pccm").unwrap().cgs_factor, CM_PER_PC);

        assert!(matches!(
            bind_cosmology(&mut registry, 1.0, -0.5),
            Err(UnitError::InvalidScale { .. })
        ));
        assert!(bind_cosmology(&mut registry, -2.0, 0.5).is_err());
        assert_eq!(registry.lookup("pccm").unwrap().cgs_factor, CM_PER_PC);
        assert_eq!(registry.lookup("h").unwrap().cgs_factor, 0.7);
    }

    #[test]
    fn test_scales_from_json() {
        let scales: CodeScales =
            serde_json::from_str(r#"{"length": 3.0, "mass": 1.0, "time": 1.0, "velocity": 5.0}"#)
                .unwrap();
        assert_eq!(scales.velocity(), 5.0);
        assert_eq!(scales.density, None);
    }
}
