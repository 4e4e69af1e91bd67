//! Unit-carrying values
//!
//! `UnitArray<D>` pairs an ndarray payload with a [`Unit`]. The scalar
//! specialization [`Quantity`] is a zero-dimensional `UnitArray`.
//!
//! # Arithmetic rules
//!
//! - Addition and subtraction require matching dimensions. The result is
//!   expressed in the left operand's unit: the right payload is scaled by
//!   `rhs.cgs / lhs.cgs` before the numeric operation.
//! - Multiplication and division never fail. The result unit is the product
//!   or quotient of the operand units and keeps the left operand's registry.
//!   A dimensionless result whose CGS value is not 1 (e.g. `kg/g`) has the
//!   factor folded into the payload.
//! - Equality compares CGS-normalized payloads of same-dimension values.
//!
//! Payload broadcasting follows ndarray's co-broadcasting rules.

use std::fmt;
use std::ops::{Div, Mul, Neg};

use ndarray::{Array, Array1, DimMax, Dimension as NdDim, Ix0, Ix1, arr0};

use crate::Exponent;
use crate::error::{Result, UnitError};
use crate::registry::UnitRegistry;
use crate::unit::{Unit, UnitSpec, approx_eq};

// =============================================================================
// Payload coercion
// =============================================================================

/// Numeric data that can become a unit-carrying payload
pub trait IntoPayload {
    /// Dimensionality of the resulting array
    type Dim: NdDim;

    /// Coerce into an owned `f64` array
    fn into_payload(self) -> Array<f64, Self::Dim>;
}

macro_rules! scalar_payload {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IntoPayload for $ty {
                type Dim = Ix0;

                #[inline]
                fn into_payload(self) -> Array<f64, Ix0> {
                    arr0(self as f64)
                }
            }
        )*
    };
}

scalar_payload!(f64, f32, i32, i64, u32, u64);

impl IntoPayload for Vec<f64> {
    type Dim = Ix1;

    fn into_payload(self) -> Array1<f64> {
        Array1::from(self)
    }
}

impl IntoPayload for &[f64] {
    type Dim = Ix1;

    fn into_payload(self) -> Array1<f64> {
        Array1::from(self.to_vec())
    }
}

impl<const N: usize> IntoPayload for [f64; N] {
    type Dim = Ix1;

    fn into_payload(self) -> Array1<f64> {
        Array1::from(self.to_vec())
    }
}

impl<D: NdDim> IntoPayload for Array<f64, D> {
    type Dim = D;

    fn into_payload(self) -> Array<f64, D> {
        self
    }
}

/// Wrap data with a unit parsed against the default registry
///
/// # Example
///
/// ```
/// use simunits::make_value;
///
/// let r = make_value(vec![1.0, 2.0, 3.0], "cm").unwrap();
/// let m = r.in_units("m").unwrap();
/// assert!((m.payload()[0] - 0.01).abs() < 1e-15);
/// ```
pub fn make_value<P: IntoPayload>(data: P, spec: impl UnitSpec) -> Result<UnitArray<P::Dim>> {
    make_value_with(data, spec, &UnitRegistry::default_registry())
}

/// Wrap data with a unit parsed against `registry`
pub fn make_value_with<P: IntoPayload>(
    data: P,
    spec: impl UnitSpec,
    registry: &UnitRegistry,
) -> Result<UnitArray<P::Dim>> {
    let unit = spec.into_unit(registry)?;
    Ok(UnitArray::from_parts(data.into_payload(), unit))
}

// =============================================================================
// UnitArray
// =============================================================================

/// A numeric array with a physical unit
#[derive(Clone, Debug)]
pub struct UnitArray<D: NdDim = ndarray::IxDyn> {
    value: Array<f64, D>,
    unit: Unit,
}

/// A scalar with a physical unit
pub type Quantity = UnitArray<Ix0>;

impl<D: NdDim> UnitArray<D> {
    /// Wrap data with a unit parsed against the default registry
    pub fn new<P: IntoPayload<Dim = D>>(data: P, spec: impl UnitSpec) -> Result<Self> {
        make_value(data, spec)
    }

    /// Wrap data with a unit parsed against `registry`
    pub fn with_registry<P: IntoPayload<Dim = D>>(
        data: P,
        spec: impl UnitSpec,
        registry: &UnitRegistry,
    ) -> Result<Self> {
        make_value_with(data, spec, registry)
    }

    /// Wrap an array with an already-built unit
    pub fn from_parts(value: Array<f64, D>, unit: Unit) -> Self {
        Self { value, unit }
    }

    /// Multiplication/division result, folding dimensionless scale factors
    fn from_product(value: Array<f64, D>, unit: Unit) -> Self {
        if unit.is_dimensionless() && unit.cgs_value() != 1.0 {
            let factor = unit.cgs_value();
            let unit = Unit::dimensionless(unit.registry());
            Self::from_parts(value * factor, unit)
        } else {
            Self::from_parts(value, unit)
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The numeric payload in this value's unit
    #[inline]
    pub fn payload(&self) -> &Array<f64, D> {
        &self.value
    }

    /// Take the numeric payload, dropping the unit
    #[inline]
    pub fn into_payload(self) -> Array<f64, D> {
        self.value
    }

    /// Split into payload and unit
    pub fn into_parts(self) -> (Array<f64, D>, Unit) {
        (self.value, self.unit)
    }

    /// The unit
    #[inline]
    pub fn unit(&self) -> &Unit {
        &self.unit
    }

    /// Registry snapshot of the unit
    #[inline]
    pub fn registry(&self) -> &UnitRegistry {
        self.unit.registry()
    }

    /// Shape of the payload
    pub fn shape(&self) -> &[usize] {
        self.value.shape()
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.value.len()
    }

    /// Whether the payload has no elements
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    // =========================================================================
    // Conversion
    // =========================================================================

    /// Return a copy expressed in `target`
    ///
    /// String targets are parsed against this value's registry.
    pub fn in_units(&self, target: impl UnitSpec) -> Result<Self> {
        let target = target.into_unit(self.unit.registry())?;
        let factor = self.unit.conversion_factor_to(&target)?;
        tracing::trace!(from = %self.unit, to = %target, factor, "converting units");
        Ok(Self::from_parts(&self.value * factor, target))
    }

    /// Return a copy expressed in base CGS units
    pub fn in_cgs(&self) -> Self {
        let target = self.unit.get_cgs_equivalent();
        let factor = self.unit.cgs_value() / target.cgs_value();
        Self::from_parts(&self.value * factor, target)
    }

    /// Convert in place to `target`
    pub fn convert_to_units(&mut self, target: impl UnitSpec) -> Result<()> {
        let target = target.into_unit(self.unit.registry())?;
        let factor = self.unit.conversion_factor_to(&target)?;
        tracing::trace!(from = %self.unit, to = %target, factor, "converting units in place");
        self.value.mapv_inplace(|v| v * factor);
        self.unit = target;
        Ok(())
    }

    /// Convert in place to base CGS units
    pub fn convert_to_cgs(&mut self) {
        let target = self.unit.get_cgs_equivalent();
        let factor = self.unit.cgs_value() / target.cgs_value();
        self.value.mapv_inplace(|v| v * factor);
        self.unit = target;
    }

    /// Bare payload expressed in `target`
    pub fn to_value(&self, target: impl UnitSpec) -> Result<Array<f64, D>> {
        Ok(self.in_units(target)?.value)
    }

    // =========================================================================
    // Arithmetic
    // =========================================================================

    fn additive_factor<E: NdDim>(&self, rhs: &UnitArray<E>, op: &'static str) -> Result<f64> {
        if !self.unit.same_dimensions_as(&rhs.unit) {
            return Err(UnitError::DimensionMismatch {
                op,
                left: self.unit.to_string(),
                left_dim: self.unit.dimension(),
                right: rhs.unit.to_string(),
                right_dim: rhs.unit.dimension(),
            });
        }
        Ok(rhs.unit.cgs_value() / self.unit.cgs_value())
    }

    /// Add a same-dimension value, expressing the result in this unit
    pub fn try_add<E>(&self, rhs: &UnitArray<E>) -> Result<UnitArray<<D as DimMax<E>>::Output>>
    where
        D: DimMax<E>,
        E: NdDim,
    {
        let factor = self.additive_factor(rhs, "add")?;
        let scaled = &rhs.value * factor;
        Ok(UnitArray::from_parts(&self.value + &scaled, self.unit.clone()))
    }

    /// Subtract a same-dimension value, expressing the result in this unit
    pub fn try_sub<E>(&self, rhs: &UnitArray<E>) -> Result<UnitArray<<D as DimMax<E>>::Output>>
    where
        D: DimMax<E>,
        E: NdDim,
    {
        let factor = self.additive_factor(rhs, "subtract")?;
        let scaled = &rhs.value * factor;
        Ok(UnitArray::from_parts(&self.value - &scaled, self.unit.clone()))
    }

    /// Raise to an integer power
    ///
    /// # Panics
    ///
    /// If the unit's exponents leave the supported range, as [`Unit::pow`].
    pub fn powi(&self, n: i32) -> Self {
        Self::from_parts(self.value.mapv(|v| v.powi(n)), self.unit.powi(n))
    }

    /// Raise to a rational power, panicking like [`UnitArray::powi`]
    pub fn pow(&self, n: Exponent) -> Self {
        let exp = *n.numer() as f64 / *n.denom() as f64;
        Self::from_parts(self.value.mapv(|v| v.powf(exp)), self.unit.pow(n))
    }

    /// Raise to a rational power, failing on exponent overflow
    pub fn checked_pow(&self, n: Exponent) -> Result<Self> {
        let unit = self.unit.checked_pow(n)?;
        let exp = *n.numer() as f64 / *n.denom() as f64;
        Ok(Self::from_parts(self.value.mapv(|v| v.powf(exp)), unit))
    }

    /// Square root
    pub fn sqrt(&self) -> Self {
        Self::from_parts(self.value.mapv(f64::sqrt), self.unit.sqrt())
    }

    /// Whether all CGS-normalized elements agree within `rtol`
    pub fn allclose(&self, other: &UnitArray<D>, rtol: f64) -> bool {
        if !self.unit.same_dimensions_as(&other.unit) || self.value.shape() != other.value.shape()
        {
            return false;
        }
        let (a, b) = (self.unit.cgs_value(), other.unit.cgs_value());
        self.value.iter().zip(other.value.iter()).all(|(x, y)| {
            let (x, y) = (x * a, y * b);
            x == y || (x - y).abs() <= rtol * x.abs().max(y.abs())
        })
    }

    // =========================================================================
    // Reductions
    // =========================================================================

    fn scalar(&self, value: f64) -> Quantity {
        Quantity::from_value(value, self.unit.clone())
    }

    /// Sum of all elements
    pub fn sum(&self) -> Quantity {
        self.scalar(self.value.sum())
    }

    /// Mean of all elements, `None` when empty
    pub fn mean(&self) -> Option<Quantity> {
        self.value.mean().map(|m| self.scalar(m))
    }

    /// Largest element, `None` when empty
    pub fn max(&self) -> Option<Quantity> {
        self.value
            .iter()
            .copied()
            .reduce(f64::max)
            .map(|m| self.scalar(m))
    }

    /// Smallest element, `None` when empty
    pub fn min(&self) -> Option<Quantity> {
        self.value
            .iter()
            .copied()
            .reduce(f64::min)
            .map(|m| self.scalar(m))
    }
}

// =============================================================================
// Scalar specialization
// =============================================================================

impl UnitArray<Ix0> {
    /// Build a scalar quantity from a value and a unit
    pub fn from_value(value: f64, unit: Unit) -> Quantity {
        Self::from_parts(arr0(value), unit)
    }

    /// The scalar value in this quantity's unit
    #[inline]
    pub fn value(&self) -> f64 {
        self.value[()]
    }

    /// The scalar value expressed in `target`
    pub fn value_in(&self, target: impl UnitSpec) -> Result<f64> {
        Ok(self.in_units(target)?.value())
    }
}

// =============================================================================
// Operators
// =============================================================================

impl<'a, D, E> Mul<&'a UnitArray<E>> for &'a UnitArray<D>
where
    D: NdDim + DimMax<E>,
    E: NdDim,
{
    type Output = UnitArray<<D as DimMax<E>>::Output>;

    fn mul(self, rhs: &'a UnitArray<E>) -> Self::Output {
        UnitArray::from_product(&self.value * &rhs.value, self.unit.multiply(&rhs.unit))
    }
}

impl<D, E> Mul<UnitArray<E>> for UnitArray<D>
where
    D: NdDim + DimMax<E>,
    E: NdDim,
{
    type Output = UnitArray<<D as DimMax<E>>::Output>;

    fn mul(self, rhs: UnitArray<E>) -> Self::Output {
        &self * &rhs
    }
}

impl<'a, D, E> Div<&'a UnitArray<E>> for &'a UnitArray<D>
where
    D: NdDim + DimMax<E>,
    E: NdDim,
{
    type Output = UnitArray<<D as DimMax<E>>::Output>;

    fn div(self, rhs: &'a UnitArray<E>) -> Self::Output {
        UnitArray::from_product(&self.value / &rhs.value, self.unit.divide(&rhs.unit))
    }
}

impl<D, E> Div<UnitArray<E>> for UnitArray<D>
where
    D: NdDim + DimMax<E>,
    E: NdDim,
{
    type Output = UnitArray<<D as DimMax<E>>::Output>;

    fn div(self, rhs: UnitArray<E>) -> Self::Output {
        &self / &rhs
    }
}

/// Scaling by a bare number keeps the unit
impl<D: NdDim> Mul<f64> for UnitArray<D> {
    type Output = UnitArray<D>;

    fn mul(self, rhs: f64) -> Self::Output {
        UnitArray::from_parts(self.value * rhs, self.unit)
    }
}

impl<D: NdDim> Mul<f64> for &UnitArray<D> {
    type Output = UnitArray<D>;

    fn mul(self, rhs: f64) -> Self::Output {
        UnitArray::from_parts(&self.value * rhs, self.unit.clone())
    }
}

impl<D: NdDim> Div<f64> for UnitArray<D> {
    type Output = UnitArray<D>;

    fn div(self, rhs: f64) -> Self::Output {
        UnitArray::from_parts(self.value / rhs, self.unit)
    }
}

/// `3.0 * joule()` builds a value from a predefined unit quantity
impl<D: NdDim> Mul<UnitArray<D>> for f64 {
    type Output = UnitArray<D>;

    fn mul(self, rhs: UnitArray<D>) -> Self::Output {
        rhs * self
    }
}

impl<D: NdDim> Mul<&UnitArray<D>> for f64 {
    type Output = UnitArray<D>;

    fn mul(self, rhs: &UnitArray<D>) -> Self::Output {
        rhs * self
    }
}

/// `array * meter()` tags a bare array with a unit
impl<D: NdDim> Mul<Quantity> for Array<f64, D> {
    type Output = UnitArray<D>;

    fn mul(self, rhs: Quantity) -> Self::Output {
        let scale = rhs.value();
        UnitArray::from_parts(self * scale, rhs.unit)
    }
}

impl<D: NdDim> Neg for UnitArray<D> {
    type Output = UnitArray<D>;

    fn neg(self) -> Self::Output {
        UnitArray::from_parts(-self.value, self.unit)
    }
}

impl<D: NdDim> PartialEq for UnitArray<D> {
    /// Same dimension and equal CGS-normalized payloads
    fn eq(&self, other: &Self) -> bool {
        if !self.unit.same_dimensions_as(&other.unit) || self.value.shape() != other.value.shape()
        {
            return false;
        }
        let (a, b) = (self.unit.cgs_value(), other.unit.cgs_value());
        self.value
            .iter()
            .zip(other.value.iter())
            .all(|(x, y)| approx_eq(x * a, y * b))
    }
}

impl<D: NdDim> fmt::Display for UnitArray<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}
