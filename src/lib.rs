//! Physical units for simulation post-processing
//!
//! Attaches units to scalars and arrays produced from simulation outputs,
//! checks dimensional consistency, and converts between unit systems,
//! including simulation-native ("code") units and cosmological comoving units.
//!
//! # Architecture
//!
//! ```text
//! Binder → UnitRegistry → Unit (parsed from strings) → UnitArray / Quantity
//! ```
//!
//! A [`UnitRegistry`] maps atomic symbols to a dimension and a CGS factor.
//! Unit strings such as `"erg/(cm**2*s)"` are parsed against a registry into
//! immutable [`Unit`] values. Payloads wrapped with a unit form a
//! [`UnitArray`] (or the scalar [`Quantity`]), whose arithmetic checks
//! dimensions and carries conversion factors along.
//!
//! # Example
//!
//! ```
//! use simunits::{make_value, symbols};
//!
//! let lengths = make_value(vec![1.0, 2.0, 3.0], "cm").unwrap();
//! let meters = lengths.in_units("m").unwrap();
//! assert_eq!(meters.unit().to_string(), "m");
//!
//! let energy = 3.0 * symbols::joule();
//! assert_eq!(energy, make_value(3, "J").unwrap());
//! ```

pub mod array;
pub mod binder;
pub mod dataset;
pub mod dimension;
pub mod error;
pub mod lut;
pub mod registry;
pub mod symbols;
pub mod unit;

// Re-exports
pub use array::{IntoPayload, Quantity, UnitArray, make_value, make_value_with};
pub use binder::{
    CODE_UNIT_SYMBOLS, CodeScales, bind_code_units, bind_comoving_units, bind_cosmology,
    is_code_symbol, set_hubble_constant,
};
pub use dataset::{Cosmology, Dataset, DatasetConfig};
pub use dimension::{Dimension, DimensionOp};
pub use error::{Result, UnitError};
pub use registry::{AtomicUnitDef, UnitRegistry};
pub use unit::{Unit, UnitExpr, UnitSpec};

/// Exact rational exponent used throughout the dimension and unit algebra
pub type Exponent = num_rational::Rational32;

/// Prelude for common imports
pub mod prelude {
    pub use super::array::{Quantity, UnitArray, make_value, make_value_with};
    pub use super::dimension::Dimension;
    pub use super::error::UnitError;
    pub use super::registry::UnitRegistry;
    pub use super::symbols;
    pub use super::unit::{Unit, UnitSpec};
}
