//! Fuzz target for the unit-expression parser
//!
//! Feeds both raw strings and structured, plausible unit expressions to
//! `Unit::parse`. Every input must produce `Ok` or `Err`, never a panic.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use simunits::{Unit, UnitRegistry};

#[derive(Debug, Arbitrary)]
enum FuzzInput {
    /// Arbitrary text
    Raw(String),
    /// Expression assembled from unit-like fragments
    Structured(Vec<Fragment>),
}

#[derive(Debug, Arbitrary)]
enum Fragment {
    Symbol(Symbol),
    Operator(Operator),
    Exponent(i8),
    Rational { numer: i8, denom: i8 },
    Decimal { whole: u8, frac: u8 },
    Open,
    Close,
    Space,
}

#[derive(Debug, Arbitrary)]
enum Symbol {
    Known(u8),
    Prefixed { prefix: u8, base: u8 },
    Code(u8),
}

#[derive(Debug, Arbitrary)]
enum Operator {
    Star,
    Slash,
    Pow,
    Caret,
    Minus,
}

const SYMBOLS: &[&str] = &["g", "cm", "m", "s", "K", "erg", "J", "pc", "Msun", "yr", "h", "dimensionless"];
const PREFIXES: &[&str] = &["k", "M", "G", "m", "u", "µ", "da", "c"];
const CODE: &[&str] = &["code_length", "code_mass", "code_time", "code_magnetic"];

fn pick<'a>(table: &[&'a str], index: u8) -> &'a str {
    table[index as usize % table.len()]
}

impl Fragment {
    fn render(&self, out: &mut String) {
        match self {
            Fragment::Symbol(Symbol::Known(i)) => out.push_str(pick(SYMBOLS, *i)),
            Fragment::Symbol(Symbol::Prefixed { prefix, base }) => {
                out.push_str(pick(PREFIXES, *prefix));
                out.push_str(pick(SYMBOLS, *base));
            }
            Fragment::Symbol(Symbol::Code(i)) => out.push_str(pick(CODE, *i)),
            Fragment::Operator(op) => out.push_str(match op {
                Operator::Star => "*",
                Operator::Slash => "/",
                Operator::Pow => "**",
                Operator::Caret => "^",
                Operator::Minus => "-",
            }),
            Fragment::Exponent(n) => out.push_str(&n.to_string()),
            Fragment::Rational { numer, denom } => out.push_str(&format!("({numer}/{denom})")),
            Fragment::Decimal { whole, frac } => out.push_str(&format!("{whole}.{frac}")),
            Fragment::Open => out.push('('),
            Fragment::Close => out.push(')'),
            Fragment::Space => out.push(' '),
        }
    }
}

fuzz_target!(|input: FuzzInput| {
    let source = match input {
        FuzzInput::Raw(s) => s,
        FuzzInput::Structured(fragments) => {
            let mut s = String::new();
            for fragment in &fragments {
                fragment.render(&mut s);
            }
            s
        }
    };

    let registry = UnitRegistry::default_registry();
    if let Ok(unit) = Unit::parse(&source, &registry) {
        // a parsed unit must display as something that parses back
        let _ = Unit::parse(&unit.to_string(), &registry);
        let _ = unit.get_cgs_equivalent();
    }
});
