//! Dimension algebra
//!
//! Every physical quantity has dimensions in the base quantities mass,
//! length, time, temperature and angle. A dimension is the vector of exact
//! rational exponents over that base set; "dimensionless" is the zero vector.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Exponent;

const fn int(n: i32) -> Exponent {
    Exponent::new_raw(n, 1)
}

const fn half(n: i32) -> Exponent {
    Exponent::new_raw(n, 2)
}

/// The base quantities a [`Dimension`] is expressed over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BaseDimension {
    Mass,
    Length,
    Time,
    Temperature,
    Angle,
}

impl BaseDimension {
    /// All base dimensions, in canonical order
    pub const ALL: [BaseDimension; 5] = [
        BaseDimension::Mass,
        BaseDimension::Length,
        BaseDimension::Time,
        BaseDimension::Temperature,
        BaseDimension::Angle,
    ];

    /// Atomic CGS symbol measuring this base quantity
    pub const fn cgs_symbol(self) -> &'static str {
        match self {
            BaseDimension::Mass => "g",
            BaseDimension::Length => "cm",
            BaseDimension::Time => "s",
            BaseDimension::Temperature => "K",
            BaseDimension::Angle => "radian",
        }
    }

    /// Short symbol used when displaying dimensions
    pub const fn symbol(self) -> &'static str {
        match self {
            BaseDimension::Mass => "M",
            BaseDimension::Length => "L",
            BaseDimension::Time => "T",
            BaseDimension::Temperature => "Θ",
            BaseDimension::Angle => "A",
        }
    }
}

/// Binary operations that combine two dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimensionOp {
    Multiply,
    Divide,
}

/// Physical dimension as a vector of rational exponents
///
/// Encodes the exponents of the base quantities:
/// - M: Mass (gram)
/// - L: Length (centimeter)
/// - T: Time (second)
/// - Θ: Temperature (kelvin)
/// - A: Angle (radian)
///
/// Exponents are rational so that square-root units such as the CGS gauss
/// (M^½ L^-½ T^-1) are representable exactly. Two dimensions are equal iff
/// every exponent matches exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimension {
    /// Mass exponent [M]
    pub mass: Exponent,
    /// Length exponent [L]
    pub length: Exponent,
    /// Time exponent [T]
    pub time: Exponent,
    /// Temperature exponent [Θ]
    pub temperature: Exponent,
    /// Angle exponent [A]
    pub angle: Exponent,
}

impl Dimension {
    // ==========================================================================
    // Base Dimensions
    // ==========================================================================

    /// Dimensionless (pure number)
    pub const DIMENSIONLESS: Self = Self::from_exponents(int(0), int(0), int(0), int(0), int(0));

    /// Mass [M] - gram
    pub const MASS: Self = Self::new(1, 0, 0, 0, 0);

    /// Length [L] - centimeter
    pub const LENGTH: Self = Self::new(0, 1, 0, 0, 0);

    /// Time [T] - second
    pub const TIME: Self = Self::new(0, 0, 1, 0, 0);

    /// Temperature [Θ] - kelvin
    pub const TEMPERATURE: Self = Self::new(0, 0, 0, 1, 0);

    /// Angle [A] - radian
    pub const ANGLE: Self = Self::new(0, 0, 0, 0, 1);

    // ==========================================================================
    // Common Derived Dimensions
    // ==========================================================================

    /// Area [L²]
    pub const AREA: Self = Self::new(0, 2, 0, 0, 0);

    /// Volume [L³]
    pub const VOLUME: Self = Self::new(0, 3, 0, 0, 0);

    /// Velocity [L T⁻¹]
    pub const VELOCITY: Self = Self::new(0, 1, -1, 0, 0);

    /// Acceleration [L T⁻²]
    pub const ACCELERATION: Self = Self::new(0, 1, -2, 0, 0);

    /// Frequency [T⁻¹] - hertz
    pub const FREQUENCY: Self = Self::new(0, 0, -1, 0, 0);

    /// Momentum [M L T⁻¹]
    pub const MOMENTUM: Self = Self::new(1, 1, -1, 0, 0);

    /// Force [M L T⁻²] - dyne
    pub const FORCE: Self = Self::new(1, 1, -2, 0, 0);

    /// Energy [M L² T⁻²] - erg
    pub const ENERGY: Self = Self::new(1, 2, -2, 0, 0);

    /// Power [M L² T⁻³] - erg/s
    pub const POWER: Self = Self::new(1, 2, -3, 0, 0);

    /// Pressure [M L⁻¹ T⁻²] - barye
    pub const PRESSURE: Self = Self::new(1, -1, -2, 0, 0);

    /// Mass density [M L⁻³]
    pub const DENSITY: Self = Self::new(1, -3, 0, 0, 0);

    /// Specific energy [L² T⁻²]
    pub const SPECIFIC_ENERGY: Self = Self::new(0, 2, -2, 0, 0);

    /// Magnetic field [M^½ L^-½ T⁻¹] - gauss
    pub const MAGNETIC_FIELD: Self =
        Self::from_exponents(half(1), half(-1), int(-1), int(0), int(0));

    /// Electric charge [M^½ L^(3/2) T⁻¹] - statcoulomb
    pub const CHARGE: Self = Self::from_exponents(half(1), half(3), int(-1), int(0), int(0));

    /// Solid angle [A²] - steradian
    pub const SOLID_ANGLE: Self = Self::new(0, 0, 0, 0, 2);

    // ==========================================================================
    // Constructors
    // ==========================================================================

    /// Create a dimension with integer exponents
    pub const fn new(mass: i32, length: i32, time: i32, temperature: i32, angle: i32) -> Self {
        Self::from_exponents(int(mass), int(length), int(time), int(temperature), int(angle))
    }

    /// Create a dimension with rational exponents
    pub const fn from_exponents(
        mass: Exponent,
        length: Exponent,
        time: Exponent,
        temperature: Exponent,
        angle: Exponent,
    ) -> Self {
        Self {
            mass,
            length,
            time,
            temperature,
            angle,
        }
    }

    /// Exponent of a single base quantity
    pub fn exponent(&self, base: BaseDimension) -> Exponent {
        match base {
            BaseDimension::Mass => self.mass,
            BaseDimension::Length => self.length,
            BaseDimension::Time => self.time,
            BaseDimension::Temperature => self.temperature,
            BaseDimension::Angle => self.angle,
        }
    }

    /// Base quantities with a non-zero exponent, in canonical order
    pub fn components(&self) -> impl Iterator<Item = (BaseDimension, Exponent)> + '_ {
        BaseDimension::ALL
            .into_iter()
            .map(|base| (base, self.exponent(base)))
            .filter(|(_, exp)| *exp.numer() != 0)
    }

    fn zip_with(&self, other: &Dimension, f: impl Fn(Exponent, Exponent) -> Exponent) -> Dimension {
        Dimension {
            mass: f(self.mass, other.mass),
            length: f(self.length, other.length),
            time: f(self.time, other.time),
            temperature: f(self.temperature, other.temperature),
            angle: f(self.angle, other.angle),
        }
    }

    fn map(&self, f: impl Fn(Exponent) -> Exponent) -> Dimension {
        Dimension {
            mass: f(self.mass),
            length: f(self.length),
            time: f(self.time),
            temperature: f(self.temperature),
            angle: f(self.angle),
        }
    }

    // ==========================================================================
    // Operations
    // ==========================================================================

    /// Combine two dimensions exponent-wise
    pub fn combine(&self, other: &Dimension, op: DimensionOp) -> Dimension {
        match op {
            DimensionOp::Multiply => self.mul(other),
            DimensionOp::Divide => self.div(other),
        }
    }

    /// Multiply dimensions (add exponents)
    ///
    /// Used when multiplying quantities: [A] × [B] = [A × B]
    pub fn mul(&self, other: &Dimension) -> Dimension {
        self.zip_with(other, |a, b| a + b)
    }

    /// Divide dimensions (subtract exponents)
    ///
    /// Used when dividing quantities: [A] / [B] = [A / B]
    pub fn div(&self, other: &Dimension) -> Dimension {
        self.zip_with(other, |a, b| a - b)
    }

    /// Reciprocal (negate all exponents)
    pub fn recip(&self) -> Dimension {
        self.map(|e| -e)
    }

    /// Raise to a rational power (scale all exponents)
    pub fn pow(&self, n: Exponent) -> Dimension {
        self.map(|e| e * n)
    }

    /// Raise to an integer power
    pub fn powi(&self, n: i32) -> Dimension {
        self.pow(int(n))
    }

    /// Square root (halve all exponents)
    pub fn sqrt(&self) -> Dimension {
        self.pow(half(1))
    }

    // ==========================================================================
    // Predicates
    // ==========================================================================

    /// Check if dimensionless (all exponents zero)
    pub fn is_dimensionless(&self) -> bool {
        self.components().next().is_none()
    }

    /// Check if dimensions are equal
    pub fn equals(&self, other: &Dimension) -> bool {
        self == other
    }

    /// Check if every exponent is an integer
    pub fn is_integral(&self) -> bool {
        BaseDimension::ALL
            .into_iter()
            .all(|base| self.exponent(base).is_integer())
    }

    // ==========================================================================
    // Named Dimension Detection
    // ==========================================================================

    /// Get the name of this dimension if it matches a known type
    pub fn name(&self) -> Option<&'static str> {
        const NAMED: [(Dimension, &str); 21] = [
            (Dimension::DIMENSIONLESS, "dimensionless"),
            (Dimension::MASS, "mass"),
            (Dimension::LENGTH, "length"),
            (Dimension::TIME, "time"),
            (Dimension::TEMPERATURE, "temperature"),
            (Dimension::ANGLE, "angle"),
            (Dimension::AREA, "area"),
            (Dimension::VOLUME, "volume"),
            (Dimension::VELOCITY, "velocity"),
            (Dimension::ACCELERATION, "acceleration"),
            (Dimension::FREQUENCY, "frequency"),
            (Dimension::MOMENTUM, "momentum"),
            (Dimension::FORCE, "force"),
            (Dimension::ENERGY, "energy"),
            (Dimension::POWER, "power"),
            (Dimension::PRESSURE, "pressure"),
            (Dimension::DENSITY, "density"),
            (Dimension::SPECIFIC_ENERGY, "specific energy"),
            (Dimension::MAGNETIC_FIELD, "magnetic field"),
            (Dimension::CHARGE, "charge"),
            (Dimension::SOLID_ANGLE, "solid angle"),
        ];
        NAMED
            .iter()
            .find(|(dim, _)| dim == self)
            .map(|(_, name)| *name)
    }
}

impl Default for Dimension {
    fn default() -> Self {
        Self::DIMENSIONLESS
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_dimensionless() {
            return write!(f, "1");
        }

        let mut num: Vec<String> = Vec::new();
        let mut den: Vec<String> = Vec::new();

        for (base, exp) in self.components() {
            let (parts, exp) = if *exp.numer() > 0 {
                (&mut num, exp)
            } else {
                (&mut den, -exp)
            };
            if exp == int(1) {
                parts.push(base.symbol().to_string());
            } else if exp.is_integer() {
                parts.push(format!("{}{}", base.symbol(), superscript(exp.to_integer())));
            } else {
                parts.push(format!("{}^({}/{})", base.symbol(), exp.numer(), exp.denom()));
            }
        }

        let num_str = if num.is_empty() {
            "1".to_string()
        } else {
            num.join(" ")
        };

        if den.is_empty() {
            write!(f, "{}", num_str)
        } else {
            write!(f, "{} / {}", num_str, den.join(" "))
        }
    }
}

/// Convert integer to superscript string
fn superscript(n: i32) -> String {
    let digits: String = n
        .unsigned_abs()
        .to_string()
        .chars()
        .map(|d| match d {
            '0' => '⁰',
            '1' => '¹',
            '2' => '²',
            '3' => '³',
            '4' => '⁴',
            '5' => '⁵',
            '6' => '⁶',
            '7' => '⁷',
            '8' => '⁸',
            '9' => '⁹',
            _ => d,
        })
        .collect();

    if n < 0 { format!("⁻{}", digits) } else { digits }
}
