//! Built-in unit table
//!
//! CGS atomic units, common derived and astronomical symbols, and the SI
//! prefix table consulted when a symbol is not found verbatim.

use std::f64::consts::PI;

use crate::dimension::Dimension;

// =============================================================================
// Conversion constants (CGS)
// =============================================================================

/// Centimeters per meter
pub const CM_PER_M: f64 = 1.0e2;
/// Centimeters per parsec
pub const CM_PER_PC: f64 = 3.0856775809623245e18;
/// Centimeters per astronomical unit
pub const CM_PER_AU: f64 = 1.495978707e13;
/// Centimeters per light year
pub const CM_PER_LY: f64 = 9.4605284e17;
/// Centimeters per solar radius
pub const CM_PER_RSUN: f64 = 6.957e10;
/// Grams per kilogram
pub const G_PER_KG: f64 = 1.0e3;
/// Grams per solar mass
pub const G_PER_MSUN: f64 = 1.98841586e33;
/// Grams per atomic mass unit
pub const G_PER_AMU: f64 = 1.660538921e-24;
/// Seconds per minute
pub const S_PER_MIN: f64 = 60.0;
/// Seconds per hour
pub const S_PER_HR: f64 = 3600.0;
/// Seconds per day
pub const S_PER_DAY: f64 = 86400.0;
/// Seconds per year
pub const S_PER_YR: f64 = 31556926.0;
/// Ergs per joule
pub const ERG_PER_J: f64 = 1.0e7;
/// Ergs per electron volt
pub const ERG_PER_EV: f64 = 1.6021766208e-12;
/// Dynes per newton
pub const DYNE_PER_N: f64 = 1.0e5;
/// Baryes per pascal
pub const BA_PER_PA: f64 = 10.0;
/// Gauss per tesla
pub const GAUSS_PER_TESLA: f64 = 1.0e4;
/// Solar metallicity (mass fraction of metals)
pub const Z_SUN: f64 = 0.01295;

/// Entry of the built-in unit table
#[derive(Debug, Clone, Copy)]
pub struct BuiltinUnit {
    pub symbol: &'static str,
    pub cgs_factor: f64,
    pub dimension: Dimension,
    pub prefixable: bool,
}

const fn unit(
    symbol: &'static str,
    cgs_factor: f64,
    dimension: Dimension,
    prefixable: bool,
) -> BuiltinUnit {
    BuiltinUnit {
        symbol,
        cgs_factor,
        dimension,
        prefixable,
    }
}

/// The default registry contents
pub const DEFAULT_UNITS: &[BuiltinUnit] = &[
    // base CGS units
    unit("g", 1.0, Dimension::MASS, true),
    unit("cm", 1.0, Dimension::LENGTH, false),
    unit("s", 1.0, Dimension::TIME, true),
    unit("K", 1.0, Dimension::TEMPERATURE, true),
    unit("radian", 1.0, Dimension::ANGLE, false),
    unit("dimensionless", 1.0, Dimension::DIMENSIONLESS, false),
    // other length units
    unit("m", CM_PER_M, Dimension::LENGTH, true),
    unit("pc", CM_PER_PC, Dimension::LENGTH, true),
    unit("AU", CM_PER_AU, Dimension::LENGTH, true),
    unit("au", CM_PER_AU, Dimension::LENGTH, true),
    unit("ly", CM_PER_LY, Dimension::LENGTH, true),
    unit("Rsun", CM_PER_RSUN, Dimension::LENGTH, false),
    // other mass units
    unit("amu", G_PER_AMU, Dimension::MASS, true),
    unit("Msun", G_PER_MSUN, Dimension::MASS, false),
    // other time units
    unit("min", S_PER_MIN, Dimension::TIME, false),
    unit("hr", S_PER_HR, Dimension::TIME, false),
    unit("day", S_PER_DAY, Dimension::TIME, false),
    unit("yr", S_PER_YR, Dimension::TIME, true),
    // angles
    unit("degree", PI / 180.0, Dimension::ANGLE, false),
    unit("arcmin", PI / 10800.0, Dimension::ANGLE, false),
    unit("arcsec", PI / 648000.0, Dimension::ANGLE, true),
    unit("steradian", 1.0, Dimension::SOLID_ANGLE, false),
    // CGS derived
    unit("erg", 1.0, Dimension::ENERGY, true),
    unit("dyne", 1.0, Dimension::FORCE, true),
    unit("Hz", 1.0, Dimension::FREQUENCY, true),
    unit("ba", 1.0, Dimension::PRESSURE, true),
    unit("gauss", 1.0, Dimension::MAGNETIC_FIELD, true),
    unit("G", 1.0, Dimension::MAGNETIC_FIELD, true),
    unit("esu", 1.0, Dimension::CHARGE, true),
    unit("statC", 1.0, Dimension::CHARGE, true),
    // SI derived
    unit("J", ERG_PER_J, Dimension::ENERGY, true),
    unit("W", ERG_PER_J, Dimension::POWER, true),
    unit("N", DYNE_PER_N, Dimension::FORCE, true),
    unit("Pa", BA_PER_PA, Dimension::PRESSURE, true),
    unit("T", GAUSS_PER_TESLA, Dimension::MAGNETIC_FIELD, true),
    unit("eV", ERG_PER_EV, Dimension::ENERGY, true),
    // dimensionless
    unit("Zsun", Z_SUN, Dimension::DIMENSIONLESS, false),
    unit("h", 1.0, Dimension::DIMENSIONLESS, false),
];

/// SI prefixes and their multipliers
///
/// Two-letter prefixes come first so that `da` wins over `d`.
pub const SI_PREFIXES: &[(&str, f64)] = &[
    ("da", 1e1),
    ("Y", 1e24),
    ("Z", 1e21),
    ("E", 1e18),
    ("P", 1e15),
    ("T", 1e12),
    ("G", 1e9),
    ("M", 1e6),
    ("k", 1e3),
    ("h", 1e2),
    ("d", 1e-1),
    ("c", 1e-2),
    ("m", 1e-3),
    ("u", 1e-6),
    ("µ", 1e-6),
    ("μ", 1e-6),
    ("n", 1e-9),
    ("p", 1e-12),
    ("f", 1e-15),
    ("a", 1e-18),
    ("z", 1e-21),
    ("y", 1e-24),
];

/// Look up the multiplier for an SI prefix
pub fn prefix_multiplier(prefix: &str) -> Option<f64> {
    SI_PREFIXES
        .iter()
        .find(|(p, _)| *p == prefix)
        .map(|(_, factor)| *factor)
}
