//! Symbolic unit expressions
//!
//! A unit expression is a tree of atomic symbols raised to rational powers,
//! combined by multiplication. Division is multiplication by a negative
//! power. Canonicalization merges repeated symbols, drops zero exponents and
//! sorts symbols, giving one spelling per product of powers.

use std::collections::BTreeMap;
use std::fmt;

use crate::Exponent;

/// Symbol of the multiplicative identity
pub const DIMENSIONLESS_SYMBOL: &str = "dimensionless";

/// Expression tree over atomic unit symbols
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UnitExpr {
    /// A single symbol raised to a power
    Atomic { symbol: String, exponent: Exponent },
    /// Product of sub-expressions; the empty product is dimensionless
    Product(Vec<UnitExpr>),
}

impl UnitExpr {
    /// A bare symbol with exponent 1
    pub fn atom(symbol: impl Into<String>) -> Self {
        Self::Atomic {
            symbol: symbol.into(),
            exponent: Exponent::from_integer(1),
        }
    }

    /// A symbol raised to a power
    pub fn atom_pow(symbol: impl Into<String>, exponent: Exponent) -> Self {
        Self::Atomic {
            symbol: symbol.into(),
            exponent,
        }
    }

    /// The empty product
    pub fn dimensionless() -> Self {
        Self::Product(Vec::new())
    }

    /// Multiply two expressions, returning the canonical product
    pub fn mul(&self, other: &UnitExpr) -> UnitExpr {
        UnitExpr::Product(vec![self.clone(), other.clone()]).canonical()
    }

    /// Divide two expressions, returning the canonical quotient
    pub fn div(&self, other: &UnitExpr) -> UnitExpr {
        self.mul(&other.pow(Exponent::from_integer(-1)))
    }

    /// Raise every factor to the power `n`
    pub fn pow(&self, n: Exponent) -> UnitExpr {
        match self {
            Self::Atomic { symbol, exponent } => Self::Atomic {
                symbol: symbol.clone(),
                exponent: *exponent * n,
            },
            Self::Product(factors) => Self::Product(factors.iter().map(|f| f.pow(n)).collect()),
        }
    }

    fn collect_into(&self, acc: &mut BTreeMap<String, Exponent>) {
        match self {
            Self::Atomic { symbol, exponent } => {
                if symbol != DIMENSIONLESS_SYMBOL {
                    *acc.entry(symbol.clone()).or_insert(Exponent::from_integer(0)) += *exponent;
                }
            }
            Self::Product(factors) => {
                for factor in factors {
                    factor.collect_into(acc);
                }
            }
        }
    }

    /// Flattened, merged and sorted `(symbol, exponent)` pairs
    pub fn atoms(&self) -> Vec<(String, Exponent)> {
        let mut acc = BTreeMap::new();
        self.collect_into(&mut acc);
        acc.into_iter()
            .filter(|(_, exp)| *exp.numer() != 0)
            .collect()
    }

    /// Canonical form: a single atom, or a sorted product of distinct atoms
    pub fn canonical(&self) -> UnitExpr {
        let mut atoms: Vec<UnitExpr> = self
            .atoms()
            .into_iter()
            .map(|(symbol, exponent)| UnitExpr::Atomic { symbol, exponent })
            .collect();
        if atoms.len() == 1 {
            atoms.remove(0)
        } else {
            UnitExpr::Product(atoms)
        }
    }

    /// Whether the canonical form has no factors
    pub fn is_dimensionless(&self) -> bool {
        self.atoms().is_empty()
    }
}

fn write_power(f: &mut fmt::Formatter<'_>, symbol: &str, exp: Exponent) -> fmt::Result {
    if exp == Exponent::from_integer(1) {
        write!(f, "{}", symbol)
    } else if exp.is_integer() {
        write!(f, "{}**{}", symbol, exp.to_integer())
    } else {
        write!(f, "{}**({}/{})", symbol, exp.numer(), exp.denom())
    }
}

fn write_factors(f: &mut fmt::Formatter<'_>, factors: &[(String, Exponent)]) -> fmt::Result {
    for (i, (symbol, exp)) in factors.iter().enumerate() {
        if i > 0 {
            write!(f, "*")?;
        }
        write_power(f, symbol, *exp)?;
    }
    Ok(())
}

impl fmt::Display for UnitExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let atoms = self.atoms();
        if atoms.is_empty() {
            return write!(f, "{}", DIMENSIONLESS_SYMBOL);
        }

        let (num, den): (Vec<_>, Vec<_>) = atoms.into_iter().partition(|(_, e)| *e.numer() > 0);
        let den: Vec<(String, Exponent)> = den.into_iter().map(|(s, e)| (s, -e)).collect();

        if num.is_empty() {
            write!(f, "1")?;
        } else {
            write_factors(f, &num)?;
        }

        match den.len() {
            0 => Ok(()),
            1 => {
                write!(f, "/")?;
                write_factors(f, &den)
            }
            _ => {
                write!(f, "/(")?;
                write_factors(f, &den)?;
                write!(f, ")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn e(n: i32) -> Exponent {
        Exponent::from_integer(n)
    }

    #[test]
    fn test_merge_repeated_symbols() {
        let mpccm = UnitExpr::atom("Mpccm");
        let squared = mpccm.mul(&mpccm);
        assert_eq!(squared, UnitExpr::atom_pow("Mpccm", e(2)));
        assert_eq!(squared.to_string(), "Mpccm**2");
    }

    #[test]
    fn test_cancellation() {
        let cm = UnitExpr::atom("cm");
        let ratio = cm.div(&cm);
        assert!(ratio.is_dimensionless());
        assert_eq!(ratio.to_string(), "dimensionless");
    }

    #[test]
    fn test_display_ordering() {
        let expr = UnitExpr::Product(vec![
            UnitExpr::atom_pow("s", e(-3)),
            UnitExpr::atom("kg"),
            UnitExpr::atom_pow("m", e(2)),
        ]);
        assert_eq!(expr.to_string(), "kg*m**2/s**3");

        let flux = UnitExpr::Product(vec![
            UnitExpr::atom("erg"),
            UnitExpr::atom_pow("cm", e(-2)),
            UnitExpr::atom_pow("s", e(-1)),
        ]);
        assert_eq!(flux.to_string(), "erg/(cm**2*s)");

        assert_eq!(UnitExpr::atom_pow("s", e(-1)).to_string(), "1/s");
        assert_eq!(
            UnitExpr::atom_pow("cm", Exponent::new(1, 2)).to_string(),
            "cm**(1/2)"
        );
    }

    #[test]
    fn test_pow_distributes() {
        let expr = UnitExpr::Product(vec![UnitExpr::atom("g"), UnitExpr::atom_pow("cm", e(-3))]);
        let cubed = expr.pow(e(2)).canonical();
        assert_eq!(cubed.atoms(), vec![("cm".to_string(), e(-6)), ("g".to_string(), e(2))]);
    }

    #[test]
    fn test_dimensionless_symbol_is_identity() {
        let expr = UnitExpr::atom("dimensionless").mul(&UnitExpr::atom("K"));
        assert_eq!(expr, UnitExpr::atom("K"));
    }
}
