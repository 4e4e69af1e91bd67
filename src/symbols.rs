//! Predefined unit quantities
//!
//! Each function returns a magnitude-1 [`Quantity`] in the default registry,
//! usable as a multiplicative unit tag:
//!
//! ```
//! use simunits::symbols::{kiloparsec, megayear};
//!
//! let distance = 8.2 * kiloparsec();
//! let age = 13.0 * megayear();
//! assert_eq!(distance.unit().to_string(), "kpc");
//! assert_eq!(age.value(), 13.0);
//! ```

use std::f64::consts::PI;

use crate::array::{Quantity, make_value};
use crate::dimension::Dimension;
use crate::error::Result;
use crate::lut::*;
use crate::registry::UnitRegistry;
use crate::unit::{Unit, UnitSpec};

fn predefined(symbol: &str, dimension: Dimension, cgs_factor: f64) -> Quantity {
    let registry = UnitRegistry::default_registry();
    Quantity::from_value(1.0, Unit::atomic(symbol, dimension, cgs_factor, &registry))
}

macro_rules! predefined_units {
    ($($name:ident => $symbol:literal, $dim:ident, $factor:expr;)*) => {
        $(
            #[doc = concat!("One `", $symbol, "`")]
            pub fn $name() -> Quantity {
                predefined($symbol, Dimension::$dim, $factor)
            }
        )*

        /// Every predefined quantity with its symbol
        pub fn all() -> Vec<(&'static str, Quantity)> {
            vec![$(($symbol, $name())),*]
        }
    };
}

predefined_units! {
    // length
    centimeter => "cm", LENGTH, 1.0;
    millimeter => "mm", LENGTH, CM_PER_M * 1e-3;
    meter => "m", LENGTH, CM_PER_M;
    kilometer => "km", LENGTH, CM_PER_M * 1e3;
    astronomical_unit => "AU", LENGTH, CM_PER_AU;
    light_year => "ly", LENGTH, CM_PER_LY;
    parsec => "pc", LENGTH, CM_PER_PC;
    kiloparsec => "kpc", LENGTH, CM_PER_PC * 1e3;
    megaparsec => "Mpc", LENGTH, CM_PER_PC * 1e6;
    solar_radius => "Rsun", LENGTH, CM_PER_RSUN;

    // mass
    gram => "g", MASS, 1.0;
    kilogram => "kg", MASS, G_PER_KG;
    atomic_mass_unit => "amu", MASS, G_PER_AMU;
    solar_mass => "Msun", MASS, G_PER_MSUN;

    // time
    second => "s", TIME, 1.0;
    minute => "min", TIME, S_PER_MIN;
    hour => "hr", TIME, S_PER_HR;
    day => "day", TIME, S_PER_DAY;
    year => "yr", TIME, S_PER_YR;
    kiloyear => "kyr", TIME, S_PER_YR * 1e3;
    megayear => "Myr", TIME, S_PER_YR * 1e6;
    gigayear => "Gyr", TIME, S_PER_YR * 1e9;

    // temperature and angle
    kelvin => "K", TEMPERATURE, 1.0;
    radian => "radian", ANGLE, 1.0;
    degree => "degree", ANGLE, PI / 180.0;
    arcminute => "arcmin", ANGLE, PI / 10800.0;
    arcsecond => "arcsec", ANGLE, PI / 648000.0;
    steradian => "steradian", SOLID_ANGLE, 1.0;

    // derived
    hertz => "Hz", FREQUENCY, 1.0;
    erg => "erg", ENERGY, 1.0;
    joule => "J", ENERGY, ERG_PER_J;
    electronvolt => "eV", ENERGY, ERG_PER_EV;
    kiloelectronvolt => "keV", ENERGY, ERG_PER_EV * 1e3;
    watt => "W", POWER, ERG_PER_J;
    dyne => "dyne", FORCE, 1.0;
    newton => "N", FORCE, DYNE_PER_N;
    barye => "ba", PRESSURE, 1.0;
    pascal => "Pa", PRESSURE, BA_PER_PA;
    gauss => "gauss", MAGNETIC_FIELD, 1.0;
    tesla => "T", MAGNETIC_FIELD, GAUSS_PER_TESLA;
    statcoulomb => "statC", CHARGE, 1.0;
    solar_metallicity => "Zsun", DIMENSIONLESS, Z_SUN;
}

/// A magnitude-1 quantity for any unit expression in the default registry
pub fn unit_quantity(spec: impl UnitSpec) -> Result<Quantity> {
    make_value(1.0, spec)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predefined_match_registry() {
        for (symbol, quantity) in all() {
            let looked_up = unit_quantity(symbol).unwrap();
            assert_eq!(quantity, looked_up, "{symbol} disagrees with the registry");
            assert_eq!(quantity.unit().to_string(), symbol);
            assert_eq!(quantity.value(), 1.0);
        }
    }

    #[test]
    fn test_scalar_times_unit() {
        let e = 3.0 * joule();
        assert_eq!(e.value(), 3.0);
        assert_eq!(e, make_value(3, "J").unwrap());
        assert_eq!(e.in_units("erg").unwrap().value(), 3.0e7);
    }

    #[test]
    fn test_unit_quantity_compound() {
        let flux = unit_quantity("erg/(cm**2*s)").unwrap();
        assert_eq!(flux.value(), 1.0);
        assert_eq!(flux.unit().to_string(), "erg/(cm**2*s)");
    }
}
