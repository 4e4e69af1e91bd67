//! Unit registry
//!
//! A registry maps atomic unit symbols to their dimension and CGS factor.
//! Lookups that miss fall back to stripping an SI prefix from the symbol.
//!
//! The symbol table sits behind an `Arc` and mutation is copy-on-write, so
//! cloning a registry takes a snapshot: a [`Unit`](crate::Unit) keeps the
//! registry state it was parsed against even if the dataset later rebinds
//! `code_length` or adds comoving units.

use std::fmt;
use std::sync::{Arc, OnceLock};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::dimension::Dimension;
use crate::error::{Result, UnitError};
use crate::lut::{DEFAULT_UNITS, SI_PREFIXES};

/// Definition of a single atomic unit symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtomicUnitDef {
    /// Symbol as written in unit expressions (no operators)
    pub symbol: String,
    /// Physical dimension
    pub dimension: Dimension,
    /// Value of one of this unit in CGS base units
    pub cgs_factor: f64,
    /// Whether SI prefixes may be applied to the symbol
    #[serde(default)]
    pub prefixable: bool,
}

impl AtomicUnitDef {
    /// Create a definition that does not accept SI prefixes
    pub fn new(symbol: impl Into<String>, dimension: Dimension, cgs_factor: f64) -> Self {
        Self {
            symbol: symbol.into(),
            dimension,
            cgs_factor,
            prefixable: false,
        }
    }

    /// Allow SI prefixes on this symbol
    pub fn prefixable(mut self) -> Self {
        self.prefixable = true;
        self
    }
}

/// Whether `c` may start an atomic symbol
pub(crate) fn is_symbol_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == 'µ' || c == 'μ'
}

/// Whether `c` may continue an atomic symbol
pub(crate) fn is_symbol_char(c: char) -> bool {
    is_symbol_start(c) || c.is_ascii_digit()
}

fn validate(def: &AtomicUnitDef) -> Result<()> {
    let mut chars = def.symbol.chars();
    let valid = chars.next().is_some_and(is_symbol_start) && chars.all(is_symbol_char);
    if !valid {
        return Err(UnitError::InvalidSymbol {
            symbol: def.symbol.clone(),
        });
    }
    validate_factor(&def.symbol, def.cgs_factor)
}

pub(crate) fn validate_factor(symbol: &str, factor: f64) -> Result<()> {
    if factor.is_finite() && factor > 0.0 {
        Ok(())
    } else {
        Err(UnitError::InvalidScale {
            symbol: symbol.to_string(),
            factor,
        })
    }
}

static DEFAULT_REGISTRY: OnceLock<UnitRegistry> = OnceLock::new();

/// Mutable table of atomic unit symbols
///
/// Registries are independent objects: each dataset owns its own instance,
/// populated from the built-in table and then extended by the code-unit
/// binder during loading.
#[derive(Clone)]
pub struct UnitRegistry {
    table: Arc<FxHashMap<String, AtomicUnitDef>>,
}

impl UnitRegistry {
    /// Create a registry pre-populated with the built-in unit table
    pub fn new() -> Self {
        let table = DEFAULT_UNITS
            .iter()
            .map(|u| {
                let def = AtomicUnitDef {
                    symbol: u.symbol.to_string(),
                    dimension: u.dimension,
                    cgs_factor: u.cgs_factor,
                    prefixable: u.prefixable,
                };
                (def.symbol.clone(), def)
            })
            .collect();
        Self {
            table: Arc::new(table),
        }
    }

    /// Create a registry with no symbols at all
    pub fn empty() -> Self {
        Self {
            table: Arc::new(FxHashMap::default()),
        }
    }

    /// The process-wide default registry
    ///
    /// Built once on first use and never mutated; the returned value is a
    /// snapshot, so mutating it does not affect later callers.
    pub fn default_registry() -> UnitRegistry {
        DEFAULT_REGISTRY.get_or_init(UnitRegistry::new).clone()
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Add an atomic symbol
    ///
    /// Fails with [`UnitError::DuplicateSymbol`] if the symbol exists.
    pub fn add(&mut self, symbol: &str, dimension: Dimension, cgs_factor: f64) -> Result<()> {
        self.insert(AtomicUnitDef::new(symbol, dimension, cgs_factor), false)
    }

    /// Add or rebind an atomic symbol
    pub fn replace(&mut self, symbol: &str, dimension: Dimension, cgs_factor: f64) -> Result<()> {
        self.insert(AtomicUnitDef::new(symbol, dimension, cgs_factor), true)
    }

    /// Insert a full definition, optionally overwriting an existing one
    pub fn insert(&mut self, def: AtomicUnitDef, overwrite: bool) -> Result<()> {
        validate(&def)?;
        if !overwrite && self.table.contains_key(&def.symbol) {
            return Err(UnitError::DuplicateSymbol { symbol: def.symbol });
        }
        tracing::debug!(
            symbol = %def.symbol,
            dimension = %def.dimension,
            cgs_factor = def.cgs_factor,
            overwrite,
            "registering unit symbol"
        );
        Arc::make_mut(&mut self.table).insert(def.symbol.clone(), def);
        Ok(())
    }

    /// Remove a symbol, returning its definition
    pub fn remove(&mut self, symbol: &str) -> Result<AtomicUnitDef> {
        if !self.table.contains_key(symbol) {
            return Err(UnitError::unknown_symbol(symbol));
        }
        tracing::debug!(symbol, "removing unit symbol");
        Arc::make_mut(&mut self.table)
            .remove(symbol)
            .ok_or_else(|| UnitError::unknown_symbol(symbol))
    }

    /// Rebind the CGS factor of an existing symbol, keeping its dimension
    pub fn modify(&mut self, symbol: &str, cgs_factor: f64) -> Result<()> {
        validate_factor(symbol, cgs_factor)?;
        let def = Arc::make_mut(&mut self.table)
            .get_mut(symbol)
            .ok_or_else(|| UnitError::unknown_symbol(symbol))?;
        tracing::debug!(symbol, old = def.cgs_factor, new = cgs_factor, "modifying unit symbol");
        def.cgs_factor = cgs_factor;
        Ok(())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Resolve a symbol, trying an exact match first and then SI prefixes
    pub fn lookup(&self, symbol: &str) -> Result<AtomicUnitDef> {
        if let Some(def) = self.table.get(symbol) {
            return Ok(def.clone());
        }

        for (prefix, multiplier) in SI_PREFIXES {
            let Some(rest) = symbol.strip_prefix(prefix) else {
                continue;
            };
            if let Some(base) = self.table.get(rest).filter(|def| def.prefixable) {
                return Ok(AtomicUnitDef {
                    symbol: symbol.to_string(),
                    dimension: base.dimension,
                    cgs_factor: base.cgs_factor * multiplier,
                    prefixable: false,
                });
            }
        }

        Err(UnitError::unknown_symbol(symbol))
    }

    /// Whether the symbol is defined verbatim (prefixes are not considered)
    pub fn contains(&self, symbol: &str) -> bool {
        self.table.contains_key(symbol)
    }

    /// Whether the symbol resolves, directly or through an SI prefix
    pub fn resolves(&self, symbol: &str) -> bool {
        self.lookup(symbol).is_ok()
    }

    /// Defined symbols, sorted
    pub fn symbols(&self) -> Vec<&str> {
        let mut symbols: Vec<&str> = self.table.keys().map(String::as_str).collect();
        symbols.sort_unstable();
        symbols
    }

    /// Number of verbatim symbols
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Whether the registry has no symbols
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Whether two registries share the same snapshot of the symbol table
    pub fn same_snapshot(&self, other: &UnitRegistry) -> bool {
        Arc::ptr_eq(&self.table, &other.table)
    }

    // =========================================================================
    // Import / Export
    // =========================================================================

    /// Export the symbol table as JSON, sorted by symbol
    pub fn to_json(&self) -> Result<String> {
        let mut defs: Vec<&AtomicUnitDef> = self.table.values().collect();
        defs.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        Ok(serde_json::to_string_pretty(&defs)?)
    }

    /// Build a registry from a JSON symbol table
    pub fn from_json(json: &str) -> Result<Self> {
        let defs: Vec<AtomicUnitDef> = serde_json::from_str(json)?;
        let mut registry = Self::empty();
        for def in defs {
            registry.insert(def, false)?;
        }
        Ok(registry)
    }
}

impl Default for UnitRegistry {
    fn default() -> Self {
        Self::default_registry()
    }
}

impl fmt::Debug for UnitRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnitRegistry")
            .field("symbols", &self.table.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lut::{CM_PER_PC, S_PER_YR};

    #[test]
    fn test_exact_lookup() {
        let reg = UnitRegistry::new();
        let g = reg.lookup("g").unwrap();
        assert_eq!(g.dimension, Dimension::MASS);
        assert_eq!(g.cgs_factor, 1.0);
    }

    #[test]
    fn test_prefix_lookup() {
        let reg = UnitRegistry::new();
        let kg = reg.lookup("kg").unwrap();
        assert_eq!(kg.dimension, Dimension::MASS);
        assert_eq!(kg.cgs_factor, 1e3);

        let mpc = reg.lookup("Mpc").unwrap();
        assert_eq!(mpc.cgs_factor, 1e6 * CM_PER_PC);

        let myr = reg.lookup("Myr").unwrap();
        assert_eq!(myr.cgs_factor, 1e6 * S_PER_YR);

        let dam = reg.lookup("dam").unwrap();
        assert_eq!(dam.cgs_factor, 1e3);
    }

    #[test]
    fn test_prefix_requires_prefixable_base() {
        let reg = UnitRegistry::new();
        // `Msun` is not prefixable, so `kMsun` must not resolve
        assert!(matches!(
            reg.lookup("kMsun"),
            Err(UnitError::UnknownSymbol { .. })
        ));
        // `min` matches verbatim before any prefix is tried
        assert_eq!(reg.lookup("min").unwrap().cgs_factor, 60.0);
    }

    #[test]
    fn test_unknown_symbol() {
        let reg = UnitRegistry::new();
        let err = reg.lookup("code_length").unwrap_err();
        assert!(matches!(err, UnitError::UnknownSymbol { symbol } if symbol == "code_length"));
    }

    #[test]
    fn test_duplicate_add() {
        let mut reg = UnitRegistry::new();
        let err = reg.add("g", Dimension::MASS, 2.0).unwrap_err();
        assert!(matches!(err, UnitError::DuplicateSymbol { .. }));

        reg.replace("g", Dimension::MASS, 2.0).unwrap();
        assert_eq!(reg.lookup("g").unwrap().cgs_factor, 2.0);
    }

    #[test]
    fn test_remove_and_modify() {
        let mut reg = UnitRegistry::new();
        reg.add("furlong", Dimension::LENGTH, 20116.8).unwrap();
        reg.modify("furlong", 20000.0).unwrap();
        assert_eq!(reg.lookup("furlong").unwrap().cgs_factor, 20000.0);

        let removed = reg.remove("furlong").unwrap();
        assert_eq!(removed.symbol, "furlong");
        assert!(matches!(
            reg.remove("furlong"),
            Err(UnitError::UnknownSymbol { .. })
        ));
        assert!(matches!(
            reg.modify("furlong", 1.0),
            Err(UnitError::UnknownSymbol { .. })
        ));
    }

    #[test]
    fn test_invalid_symbols_and_factors() {
        let mut reg = UnitRegistry::empty();
        for bad in ["cm/s", "a b", "", "2x", "m**2"] {
            assert!(
                matches!(reg.add(bad, Dimension::LENGTH, 1.0), Err(UnitError::InvalidSymbol { .. })),
                "accepted {bad:?}"
            );
        }
        assert!(matches!(
            reg.add("zero", Dimension::LENGTH, 0.0),
            Err(UnitError::InvalidScale { .. })
        ));
        assert!(matches!(
            reg.add("nan", Dimension::LENGTH, f64::NAN),
            Err(UnitError::InvalidScale { .. })
        ));
    }

    #[test]
    fn test_clone_is_snapshot() {
        let mut live = UnitRegistry::new();
        let snapshot = live.clone();
        assert!(live.same_snapshot(&snapshot));

        live.replace("code_length", Dimension::LENGTH, 3.0).unwrap();
        assert!(!live.same_snapshot(&snapshot));
        assert!(live.contains("code_length"));
        assert!(!snapshot.contains("code_length"));
    }

    #[test]
    fn test_default_registry_is_isolated() {
        let mut reg = UnitRegistry::default_registry();
        reg.add("widget", Dimension::DIMENSIONLESS, 1.0).unwrap();
        assert!(!UnitRegistry::default_registry().contains("widget"));
    }

    #[test]
    fn test_json_roundtrip() {
        let mut reg = UnitRegistry::empty();
        reg.insert(AtomicUnitDef::new("pc", Dimension::LENGTH, CM_PER_PC).prefixable(), false)
            .unwrap();
        reg.add("Msun", Dimension::MASS, 1.98841586e33).unwrap();

        let json = reg.to_json().unwrap();
        let restored = UnitRegistry::from_json(&json).unwrap();
        assert_eq!(restored.symbols(), vec!["Msun", "pc"]);
        assert_eq!(restored.lookup("kpc").unwrap().cgs_factor, 1e3 * CM_PER_PC);
    }

    #[test]
    fn test_json_rejects_garbage() {
        assert!(matches!(
            UnitRegistry::from_json("{not json"),
            Err(UnitError::Serialization(_))
        ));
    }
}
