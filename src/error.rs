//! Unit errors
//!
//! Every failure in the unit layer is a programming or specification error
//! (a malformed unit string, a symbol missing from a registry, adding a
//! length to a mass). They are reported synchronously and never retried.

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

use crate::Exponent;
use crate::dimension::Dimension;

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, UnitError>;

/// Errors raised by registries, unit parsing and unit-aware arithmetic
#[derive(Debug, Error, Diagnostic)]
pub enum UnitError {
    /// Malformed unit expression
    #[error("cannot parse unit expression `{expr}`: {reason}")]
    #[diagnostic(
        code(U0001),
        help("Unit expressions combine symbols with `*`, `/`, `**` (or `^`) and parentheses, e.g. `erg/(cm**2*s)` or `cm**(1/2)`.")
    )]
    Parse {
        #[source_code]
        expr: String,
        reason: String,
        #[label("here")]
        span: SourceSpan,
    },

    /// Atomic symbol absent from the registry
    #[error("unknown unit symbol `{symbol}`")]
    #[diagnostic(
        code(U0002),
        help("Check the spelling and SI prefix. Code units (`code_*`) only resolve against a dataset registry after its code units are bound.")
    )]
    UnknownSymbol { symbol: String },

    /// Non-overwriting add of a symbol that already exists
    #[error("unit symbol `{symbol}` is already defined in this registry")]
    #[diagnostic(
        code(U0003),
        help("Use `UnitRegistry::replace` or `UnitRegistry::modify` to rebind an existing symbol.")
    )]
    DuplicateSymbol { symbol: String },

    /// Operation across incompatible dimensions
    #[error("cannot {op} `{left}` ({left_dim}) and `{right}` ({right_dim}): dimensions differ")]
    #[diagnostic(code(U0004))]
    DimensionMismatch {
        op: &'static str,
        left: String,
        left_dim: Dimension,
        right: String,
        right_dim: Dimension,
    },

    /// Registry symbol that is not atomic
    #[error("`{symbol}` is not a valid atomic unit symbol")]
    #[diagnostic(
        code(U0005),
        help("Atomic symbols may not contain operators, parentheses or whitespace.")
    )]
    InvalidSymbol { symbol: String },

    /// Conversion factor that cannot describe a physical scale
    #[error("invalid CGS factor {factor} for `{symbol}`: factors must be finite and positive")]
    #[diagnostic(code(U0006))]
    InvalidScale { symbol: String, factor: f64 },

    /// Power that pushes a unit exponent past the supported range
    #[error("raising `{unit}` to the power {power} leaves the exponent range ±{limit}")]
    #[diagnostic(code(U0008))]
    ExponentOverflow {
        unit: String,
        power: Exponent,
        limit: i32,
    },

    /// Registry import/export failure
    #[error("registry serialization failed: {0}")]
    #[diagnostic(code(U0007))]
    Serialization(#[from] serde_json::Error),
}

impl UnitError {
    pub(crate) fn parse(
        expr: impl Into<String>,
        reason: impl Into<String>,
        span: impl Into<SourceSpan>,
    ) -> Self {
        Self::Parse {
            expr: expr.into(),
            reason: reason.into(),
            span: span.into(),
        }
    }

    pub(crate) fn unknown_symbol(symbol: impl Into<String>) -> Self {
        Self::UnknownSymbol {
            symbol: symbol.into(),
        }
    }
}
