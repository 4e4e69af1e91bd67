//! Units
//!
//! A [`Unit`] is an immutable compound unit: a canonical expression over
//! atomic symbols, its dimension, its value in CGS base units, and the
//! registry snapshot it was built against.
//!
//! The dimension and CGS value are computed once, when the unit is parsed
//! or composed, and travel with the unit from then on. Multiplying two
//! units built from different registries therefore keeps the correct CGS
//! magnitude, even though the symbolic label is interpreted against the
//! left operand's registry.

pub mod expr;
pub mod lexer;
pub mod parser;

use std::fmt;
use std::ops::{Div, Mul};

pub use expr::UnitExpr;

use num_rational::Ratio;

use crate::Exponent;
use crate::binder::is_code_symbol;
use crate::dimension::Dimension;
use crate::error::{Result, UnitError};
use crate::registry::UnitRegistry;
use parser::MAX_EXPONENT;

/// Relative tolerance used when comparing CGS magnitudes
pub const CGS_RELATIVE_TOLERANCE: f64 = 1e-12;

/// Compare two CGS magnitudes with a relative tolerance
pub(crate) fn approx_eq(a: f64, b: f64) -> bool {
    a == b || (a - b).abs() <= CGS_RELATIVE_TOLERANCE * a.abs().max(b.abs())
}

/// Raise a CGS factor to a rational power
fn pow_factor(factor: f64, exponent: Exponent) -> f64 {
    if exponent.is_integer() {
        factor.powi(exponent.to_integer())
    } else {
        factor.powf(*exponent.numer() as f64 / *exponent.denom() as f64)
    }
}

/// Whether `exp * n` has a denominator and magnitude within `limit`
fn raised_within(exp: Exponent, n: Exponent, limit: i32) -> bool {
    let raised = Ratio::new(
        i64::from(*exp.numer()) * i64::from(*n.numer()),
        i64::from(*exp.denom()) * i64::from(*n.denom()),
    );
    let limit = i64::from(limit);
    *raised.denom() <= limit && raised.numer().abs() <= limit * raised.denom()
}

/// Immutable compound unit
#[derive(Clone)]
pub struct Unit {
    expr: UnitExpr,
    dimension: Dimension,
    cgs_value: f64,
    registry: UnitRegistry,
}

impl Unit {
    // =========================================================================
    // Construction
    // =========================================================================

    /// Parse a unit expression against a registry
    ///
    /// Fails with [`UnitError::Parse`] on malformed syntax and with
    /// [`UnitError::UnknownSymbol`] when a symbol does not resolve.
    pub fn parse(spec: &str, registry: &UnitRegistry) -> Result<Unit> {
        let expr = parser::parse_expr(spec)?;
        Self::from_expr(&expr, registry)
    }

    /// Resolve every symbol of an expression tree against a registry
    pub fn from_expr(expr: &UnitExpr, registry: &UnitRegistry) -> Result<Unit> {
        let (dimension, cgs_value) = evaluate(expr, registry)?;
        Ok(Unit {
            expr: expr.canonical(),
            dimension,
            cgs_value,
            registry: registry.clone(),
        })
    }

    /// The dimensionless unit with CGS value 1
    pub fn dimensionless(registry: &UnitRegistry) -> Unit {
        Unit {
            expr: UnitExpr::dimensionless(),
            dimension: Dimension::DIMENSIONLESS,
            cgs_value: 1.0,
            registry: registry.clone(),
        }
    }

    /// Build a unit from an already-resolved atomic definition
    pub(crate) fn atomic(
        symbol: &str,
        dimension: Dimension,
        cgs_value: f64,
        registry: &UnitRegistry,
    ) -> Unit {
        Unit {
            expr: UnitExpr::atom(symbol),
            dimension,
            cgs_value,
            registry: registry.clone(),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Canonical expression
    pub fn expr(&self) -> &UnitExpr {
        &self.expr
    }

    /// Physical dimension
    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    /// Value of one of this unit in CGS base units
    pub fn cgs_value(&self) -> f64 {
        self.cgs_value
    }

    /// Registry snapshot the unit was built against
    pub fn registry(&self) -> &UnitRegistry {
        &self.registry
    }

    /// Atomic symbols appearing in the unit, sorted
    pub fn symbols(&self) -> Vec<String> {
        self.expr.atoms().into_iter().map(|(s, _)| s).collect()
    }

    // =========================================================================
    // Algebra
    // =========================================================================

    /// Product of two units; the result keeps this unit's registry
    pub fn multiply(&self, other: &Unit) -> Unit {
        Unit {
            expr: self.expr.mul(&other.expr),
            dimension: self.dimension.mul(&other.dimension),
            cgs_value: self.cgs_value * other.cgs_value,
            registry: self.registry.clone(),
        }
    }

    /// Quotient of two units; the result keeps this unit's registry
    pub fn divide(&self, other: &Unit) -> Unit {
        Unit {
            expr: self.expr.div(&other.expr),
            dimension: self.dimension.div(&other.dimension),
            cgs_value: self.cgs_value / other.cgs_value,
            registry: self.registry.clone(),
        }
    }

    /// Raise to a rational power
    ///
    /// Fails with [`UnitError::ExponentOverflow`] when a symbol's exponent
    /// would leave the range the parser accepts.
    pub fn checked_pow(&self, n: Exponent) -> Result<Unit> {
        let symbols_ok = self
            .expr
            .atoms()
            .iter()
            .all(|(_, exp)| raised_within(*exp, n, MAX_EXPONENT));
        let dimension_ok = self
            .dimension
            .components()
            .all(|(_, exp)| raised_within(exp, n, i32::MAX));
        if !symbols_ok || !dimension_ok {
            return Err(UnitError::ExponentOverflow {
                unit: self.to_string(),
                power: n,
                limit: MAX_EXPONENT,
            });
        }
        Ok(Unit {
            expr: self.expr.pow(n).canonical(),
            dimension: self.dimension.pow(n),
            cgs_value: pow_factor(self.cgs_value, n),
            registry: self.registry.clone(),
        })
    }

    /// Raise to a rational power
    ///
    /// # Panics
    ///
    /// If [`Unit::checked_pow`] would fail.
    pub fn pow(&self, n: Exponent) -> Unit {
        match self.checked_pow(n) {
            Ok(unit) => unit,
            Err(err) => panic!("{err}"),
        }
    }

    /// Raise to an integer power, panicking like [`Unit::pow`]
    pub fn powi(&self, n: i32) -> Unit {
        self.pow(Exponent::from_integer(n))
    }

    pub fn checked_powi(&self, n: i32) -> Result<Unit> {
        self.checked_pow(Exponent::from_integer(n))
    }

    /// Square root
    pub fn sqrt(&self) -> Unit {
        self.pow(Exponent::new(1, 2))
    }

    /// Reciprocal
    pub fn recip(&self) -> Unit {
        self.powi(-1)
    }

    // =========================================================================
    // Predicates and conversion
    // =========================================================================

    /// Whether both units measure the same dimension, regardless of scale
    pub fn same_dimensions_as(&self, other: &Unit) -> bool {
        self.dimension == other.dimension
    }

    /// Whether the unit has no dimension
    pub fn is_dimensionless(&self) -> bool {
        self.dimension.is_dimensionless()
    }

    /// Whether every symbol of the unit is a reserved `code_*` symbol
    ///
    /// Vacuously true for the dimensionless unit.
    pub fn is_code_unit(&self) -> bool {
        let atoms = self.expr.atoms();
        atoms.iter().all(|(symbol, _)| is_code_symbol(symbol))
    }

    /// The equivalent unit written in base CGS symbols (`g`, `cm`, `s`, `K`, `radian`)
    ///
    /// The returned unit is the CGS reference for this dimension, so its CGS
    /// value is 1.
    pub fn get_cgs_equivalent(&self) -> Unit {
        let expr = UnitExpr::Product(
            self.dimension
                .components()
                .map(|(base, exp)| UnitExpr::atom_pow(base.cgs_symbol(), exp))
                .collect(),
        );
        Unit {
            expr: expr.canonical(),
            dimension: self.dimension,
            cgs_value: 1.0,
            registry: self.registry.clone(),
        }
    }

    /// Factor converting a value in this unit to a value in `target`
    pub fn conversion_factor_to(&self, target: &Unit) -> Result<f64> {
        if !self.same_dimensions_as(target) {
            return Err(UnitError::DimensionMismatch {
                op: "convert",
                left: self.to_string(),
                left_dim: self.dimension,
                right: target.to_string(),
                right_dim: target.dimension,
            });
        }
        Ok(self.cgs_value / target.cgs_value)
    }
}

/// Compute the dimension and CGS value of an expression tree
fn evaluate(expr: &UnitExpr, registry: &UnitRegistry) -> Result<(Dimension, f64)> {
    match expr {
        UnitExpr::Atomic { symbol, exponent } => {
            let def = registry.lookup(symbol)?;
            Ok((
                def.dimension.pow(*exponent),
                pow_factor(def.cgs_factor, *exponent),
            ))
        }
        UnitExpr::Product(factors) => {
            factors
                .iter()
                .try_fold((Dimension::DIMENSIONLESS, 1.0), |(dim, cgs), factor| {
                    let (d, c) = evaluate(factor, registry)?;
                    Ok((dim.mul(&d), cgs * c))
                })
        }
    }
}

impl PartialEq for Unit {
    /// Same dimension and same CGS value, however the units are spelled
    fn eq(&self, other: &Self) -> bool {
        self.same_dimensions_as(other) && approx_eq(self.cgs_value, other.cgs_value)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expr)
    }
}

impl fmt::Debug for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unit")
            .field("expr", &self.expr.to_string())
            .field("dimension", &self.dimension.to_string())
            .field("cgs_value", &self.cgs_value)
            .finish()
    }
}

impl Mul for &Unit {
    type Output = Unit;

    fn mul(self, rhs: &Unit) -> Unit {
        self.multiply(rhs)
    }
}

impl Mul for Unit {
    type Output = Unit;

    fn mul(self, rhs: Unit) -> Unit {
        self.multiply(&rhs)
    }
}

impl Div for &Unit {
    type Output = Unit;

    fn div(self, rhs: &Unit) -> Unit {
        self.divide(rhs)
    }
}

impl Div for Unit {
    type Output = Unit;

    fn div(self, rhs: Unit) -> Unit {
        self.divide(&rhs)
    }
}

// =============================================================================
// Unit specifications
// =============================================================================

/// Anything that can name a unit: a string to parse, or an existing unit
///
/// Existing units are returned unchanged and keep their own registry.
pub trait UnitSpec {
    /// Resolve into a unit, parsing against `registry` when needed
    fn into_unit(self, registry: &UnitRegistry) -> Result<Unit>;
}

impl UnitSpec for &str {
    fn into_unit(self, registry: &UnitRegistry) -> Result<Unit> {
        Unit::parse(self, registry)
    }
}

impl UnitSpec for String {
    fn into_unit(self, registry: &UnitRegistry) -> Result<Unit> {
        Unit::parse(&self, registry)
    }
}

impl UnitSpec for &String {
    fn into_unit(self, registry: &UnitRegistry) -> Result<Unit> {
        Unit::parse(self, registry)
    }
}

impl UnitSpec for Unit {
    fn into_unit(self, _registry: &UnitRegistry) -> Result<Unit> {
        Ok(self)
    }
}

impl UnitSpec for &Unit {
    fn into_unit(self, _registry: &UnitRegistry) -> Result<Unit> {
        Ok(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lut::CM_PER_PC;

    fn reg() -> UnitRegistry {
        UnitRegistry::new()
    }

    #[test]
    fn test_parse_dimension_and_value() {
        let u = Unit::parse("km/s", &reg()).unwrap();
        assert_eq!(u.dimension(), Dimension::VELOCITY);
        assert!(approx_eq(u.cgs_value(), 1e5));
        assert_eq!(u.to_string(), "km/s");
    }

    #[test]
    fn test_equivalent_spellings() {
        let r = reg();
        let w = Unit::parse("W", &r).unwrap();
        let kgm2s3 = Unit::parse("kg*m**2/s**3", &r).unwrap();
        assert_eq!(w, kgm2s3);
        assert_ne!(w.to_string(), kgm2s3.to_string());

        let erg = Unit::parse("erg", &r).unwrap();
        assert_eq!(erg, Unit::parse("g*cm**2/s**2", &r).unwrap());
        assert_ne!(erg, Unit::parse("J", &r).unwrap());
    }

    #[test]
    fn test_unknown_symbol() {
        let err = Unit::parse("code_length/s", &reg()).unwrap_err();
        assert!(matches!(err, UnitError::UnknownSymbol { symbol } if symbol == "code_length"));
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            Unit::parse("cm**", &reg()),
            Err(UnitError::Parse { .. })
        ));
    }

    #[test]
    fn test_multiply_divide_pow() {
        let r = reg();
        let cm = Unit::parse("cm", &r).unwrap();
        let s = Unit::parse("s", &r).unwrap();

        let area = cm.multiply(&cm);
        assert_eq!(area.dimension(), Dimension::AREA);
        assert_eq!(area.to_string(), "cm**2");

        let velocity = &cm / &s;
        assert_eq!(velocity.dimension(), Dimension::VELOCITY);

        let root = area.sqrt();
        assert_eq!(root, cm);
        assert_eq!(root.to_string(), "cm");

        assert_eq!(s.recip().dimension(), Dimension::FREQUENCY);
    }

    #[test]
    fn test_rational_units() {
        let gauss = Unit::parse("g**(1/2)/(cm**(1/2)*s)", &reg()).unwrap();
        assert_eq!(gauss, Unit::parse("gauss", &reg()).unwrap());
        assert_eq!(gauss.dimension(), Dimension::MAGNETIC_FIELD);
    }

    #[test]
    fn test_cgs_equivalent() {
        let r = reg();
        let mpc = Unit::parse("Mpc", &r).unwrap();
        let cgs = mpc.get_cgs_equivalent();
        assert_eq!(cgs.to_string(), "cm");
        assert_eq!(cgs.cgs_value(), 1.0);
        assert!(approx_eq(mpc.conversion_factor_to(&cgs).unwrap(), 1e6 * CM_PER_PC));

        let pressure = Unit::parse("Pa", &r).unwrap().get_cgs_equivalent();
        assert_eq!(pressure.to_string(), "g/(cm*s**2)");
    }

    #[test]
    fn test_conversion_factor_mismatch() {
        let r = reg();
        let cm = Unit::parse("cm", &r).unwrap();
        let g = Unit::parse("g", &r).unwrap();
        assert!(matches!(
            cm.conversion_factor_to(&g),
            Err(UnitError::DimensionMismatch { op: "convert", .. })
        ));
    }

    #[test]
    fn test_snapshot_survives_registry_mutation() {
        let mut r = reg();
        r.add("code_length", Dimension::LENGTH, 10.0).unwrap();
        let before = Unit::parse("code_length", &r).unwrap();

        r.modify("code_length", 20.0).unwrap();
        let after = Unit::parse("code_length", &r).unwrap();

        assert_eq!(before.cgs_value(), 10.0);
        assert_eq!(after.cgs_value(), 20.0);
        assert_eq!(before.registry().lookup("code_length").unwrap().cgs_factor, 10.0);
    }

    #[test]
    fn test_checked_pow_bounds_exponents() {
        let r = reg();
        let cm16 = Unit::parse("cm**16", &r).unwrap();
        assert!(matches!(
            cm16.checked_powi(2),
            Err(UnitError::ExponentOverflow { limit: 16, .. })
        ));
        assert!(cm16.checked_powi(-1).is_ok());

        // repeated squaring used to overflow the exponent arithmetic
        let mut unit = Unit::parse("cm", &r).unwrap();
        let mut steps = 0;
        while let Ok(next) = unit.checked_powi(2) {
            unit = next;
            steps += 1;
        }
        assert_eq!(steps, 4);
        assert_eq!(unit.to_string(), "cm**16");

        let root = Unit::parse("cm**(1/16)", &r).unwrap();
        assert!(root.checked_pow(Exponent::new(1, 2)).is_err());
    }

    #[test]
    #[should_panic(expected = "exponent range")]
    fn test_pow_past_range_panics() {
        let _ = Unit::parse("cm**16", &reg()).unwrap().powi(16);
    }

    #[test]
    fn test_code_unit_detection() {
        let mut r = reg();
        r.add("code_length", Dimension::LENGTH, 10.0).unwrap();
        r.add("code_time", Dimension::TIME, 2.0).unwrap();
        assert!(Unit::parse("code_length/code_time", &r).unwrap().is_code_unit());
        assert!(!Unit::parse("code_length/s", &r).unwrap().is_code_unit());
        assert!(Unit::dimensionless(&r).is_code_unit());
        assert!(Unit::parse("1", &r).unwrap().is_code_unit());
    }

    #[test]
    fn test_spec_passthrough() {
        let r = reg();
        let unit = Unit::parse("erg", &r).unwrap();
        let same = (&unit).into_unit(&UnitRegistry::empty()).unwrap();
        assert_eq!(same.to_string(), "erg");
        assert!(same.registry().same_snapshot(&r));
    }
}
