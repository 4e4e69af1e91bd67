//! Parser for unit expressions
//!
//! A recursive descent parser over the token stream from [`super::lexer`]:
//!
//! ```text
//! expr     := term (('*' | '/') term)*
//! term     := factor (('**' | '^') exponent)?
//! factor   := SYMBOL | '1' | '(' expr ')'
//! exponent := sign? NUMBER | '(' sign? NUMBER ('/' sign? NUMBER)? ')'
//! ```

use std::ops::Range;

use super::expr::UnitExpr;
use super::lexer::{Token, UnitToken, lex};
use crate::Exponent;
use crate::error::{Result, UnitError};

/// Largest denominator tried when turning a decimal exponent into a fraction
const MAX_DECIMAL_DENOMINATOR: i32 = 16;

/// Bound on the magnitude and denominator of any exponent in an expression
pub(crate) const MAX_EXPONENT: i32 = 16;

/// Most atomic factors accepted in one expression
const MAX_FACTORS: usize = 32;

/// Deepest parenthesis nesting accepted
const MAX_DEPTH: usize = 64;

fn exponent_in_range(exp: Exponent) -> bool {
    *exp.denom() <= MAX_EXPONENT && exp.numer().abs() <= MAX_EXPONENT * *exp.denom()
}

fn exponents_in_range(expr: &UnitExpr) -> bool {
    match expr {
        UnitExpr::Atomic { exponent, .. } => exponent_in_range(*exponent),
        UnitExpr::Product(factors) => factors.iter().all(exponents_in_range),
    }
}

fn count_atoms(expr: &UnitExpr) -> usize {
    match expr {
        UnitExpr::Atomic { .. } => 1,
        UnitExpr::Product(factors) => factors.iter().map(count_atoms).sum(),
    }
}

/// Parse a unit expression into an (uncanonicalized) expression tree
///
/// An empty or all-whitespace string parses to the dimensionless unit.
pub fn parse_expr(source: &str) -> Result<UnitExpr> {
    let tokens = lex(source)?;
    if tokens.is_empty() {
        return Ok(UnitExpr::dimensionless());
    }

    let mut parser = Parser {
        source,
        tokens: &tokens,
        pos: 0,
        depth: 0,
    };
    let expr = parser.parse_product()?;
    if let Some(token) = parser.peek() {
        return Err(parser.error(
            format!("expected `*` or `/`, found {}", token.kind.describe()),
            token.span.clone(),
        ));
    }
    if count_atoms(&expr) > MAX_FACTORS {
        return Err(UnitError::parse(
            source,
            format!("more than {MAX_FACTORS} unit factors"),
            0..source.len(),
        ));
    }
    tracing::trace!(source, %expr, "parsed unit expression");
    Ok(expr)
}

/// Parser state
struct Parser<'a> {
    source: &'a str,
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a Token> {
        let tokens = self.tokens;
        tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<UnitToken> {
        self.peek().map(|t| t.kind)
    }

    fn advance(&mut self) -> Option<&'a Token> {
        let token = self.peek();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eof_span(&self) -> Range<usize> {
        self.source.len()..self.source.len()
    }

    fn error(&self, reason: impl Into<String>, span: Range<usize>) -> UnitError {
        UnitError::parse(self.source, reason, span)
    }

    fn text(&self, token: &Token) -> &'a str {
        &self.source[token.span.clone()]
    }

    /// Consume a token of the given kind or fail
    fn expect(&mut self, kind: UnitToken) -> Result<&'a Token> {
        match self.advance() {
            Some(token) if token.kind == kind => Ok(token),
            Some(token) => Err(self.error(
                format!("expected {}, found {}", kind.describe(), token.kind.describe()),
                token.span.clone(),
            )),
            None => Err(self.error(
                format!("expected {}, found end of expression", kind.describe()),
                self.eof_span(),
            )),
        }
    }

    fn parse_product(&mut self) -> Result<UnitExpr> {
        let mut factors = vec![self.parse_term()?];

        loop {
            match self.peek_kind() {
                Some(UnitToken::Star) => {
                    self.advance();
                    factors.push(self.parse_term()?);
                }
                Some(UnitToken::Slash) => {
                    self.advance();
                    factors.push(self.parse_term()?.pow(Exponent::from_integer(-1)));
                }
                _ => break,
            }
        }

        Ok(if factors.len() == 1 {
            factors.remove(0)
        } else {
            UnitExpr::Product(factors)
        })
    }

    fn parse_term(&mut self) -> Result<UnitExpr> {
        let base = self.parse_factor()?;
        if self.peek_kind() == Some(UnitToken::Pow) {
            self.advance();
            let start = self.peek().map_or(self.source.len(), |t| t.span.start);
            let exponent = self.parse_exponent()?;
            let span = start..self.tokens[self.pos - 1].span.end;
            if !exponent_in_range(exponent) {
                return Err(self.error(
                    format!("exponent must lie within ±{MAX_EXPONENT}"),
                    span,
                ));
            }
            let raised = base.pow(exponent);
            if !exponents_in_range(&raised) {
                return Err(self.error(
                    format!("combined exponent exceeds ±{MAX_EXPONENT}"),
                    span,
                ));
            }
            if let Some(next) = self.peek().filter(|t| t.kind == UnitToken::Pow) {
                return Err(self.error(
                    "chained powers are not supported; parenthesize the base, e.g. `(cm**2)**3`",
                    next.span.clone(),
                ));
            }
            return Ok(raised);
        }
        Ok(base)
    }

    fn parse_factor(&mut self) -> Result<UnitExpr> {
        let Some(token) = self.advance() else {
            return Err(self.error("expected a unit, found end of expression", self.eof_span()));
        };

        match token.kind {
            UnitToken::Symbol => Ok(UnitExpr::atom(self.text(token))),
            UnitToken::Number => {
                let value: f64 = self
                    .text(token)
                    .parse()
                    .map_err(|_| self.error("invalid number", token.span.clone()))?;
                if value == 1.0 {
                    Ok(UnitExpr::dimensionless())
                } else {
                    Err(self.error(
                        "numeric factors other than 1 are not allowed in units",
                        token.span.clone(),
                    ))
                }
            }
            UnitToken::LParen => {
                if self.depth >= MAX_DEPTH {
                    return Err(self.error("parentheses nested too deeply", token.span.clone()));
                }
                self.depth += 1;
                let inner = self.parse_product()?;
                self.depth -= 1;
                self.expect(UnitToken::RParen)?;
                Ok(inner)
            }
            other => Err(self.error(
                format!("expected a unit, found {}", other.describe()),
                token.span.clone(),
            )),
        }
    }

    fn parse_exponent(&mut self) -> Result<Exponent> {
        if self.peek_kind() == Some(UnitToken::LParen) {
            self.advance();
            let numer = self.parse_signed_number()?;
            let exponent = if self.peek_kind() == Some(UnitToken::Slash) {
                self.advance();
                let denom_start = self.peek().map(|t| t.span.start).unwrap_or(self.source.len());
                let denom = self.parse_signed_number()?;
                let denom_span = denom_start..self.tokens[self.pos - 1].span.end;
                if !numer.is_integer() || !denom.is_integer() {
                    return Err(self.error("fractional exponents must use integers", denom_span));
                }
                if *denom.numer() == 0 {
                    return Err(self.error("exponent denominator is zero", denom_span));
                }
                numer / denom
            } else {
                numer
            };
            self.expect(UnitToken::RParen)?;
            Ok(exponent)
        } else {
            self.parse_signed_number()
        }
    }

    fn parse_signed_number(&mut self) -> Result<Exponent> {
        let negative = match self.peek_kind() {
            Some(UnitToken::Minus) => {
                self.advance();
                true
            }
            Some(UnitToken::Plus) => {
                self.advance();
                false
            }
            _ => false,
        };

        let token = self.expect(UnitToken::Number)?;
        let value = self.number_to_exponent(token)?;
        Ok(if negative { -value } else { value })
    }

    fn number_to_exponent(&self, token: &Token) -> Result<Exponent> {
        let text = self.text(token);
        if let Ok(n) = text.parse::<i32>() {
            return Ok(Exponent::from_integer(n));
        }

        let value: f64 = text
            .parse()
            .map_err(|_| self.error("invalid exponent", token.span.clone()))?;
        if value.fract() == 0.0 && value.abs() <= i32::MAX as f64 {
            return Ok(Exponent::from_integer(value as i32));
        }

        (1..=MAX_DECIMAL_DENOMINATOR)
            .find_map(|denom| {
                let scaled = value * denom as f64;
                let rounded = scaled.round();
                ((scaled - rounded).abs() < 1e-9 && rounded.abs() <= i32::MAX as f64)
                    .then(|| Exponent::new(rounded as i32, denom))
            })
            .ok_or_else(|| {
                self.error("exponent is not a simple rational number", token.span.clone())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atoms(source: &str) -> Vec<(String, Exponent)> {
        parse_expr(source).unwrap().atoms()
    }

    fn e(n: i32) -> Exponent {
        Exponent::from_integer(n)
    }

    #[test]
    fn test_chained_power_is_rejected_with_hint() {
        for source in ["cm**2**3", "cm^2^3", "s**(1/2)**2"] {
            match parse_expr(source) {
                Err(UnitError::Parse { reason, span, .. }) => {
                    assert!(reason.contains("chained powers"), "{source}: {reason}");
                    assert!(source[span.offset()..].starts_with(&['*', '^'][..]));
                }
                other => panic!("{source} should fail, got {other:?}"),
            }
        }
        assert_eq!(atoms("(cm**2)**3"), vec![("cm".to_string(), e(6))]);
    }

    #[test]
    fn test_parse_simple() {
        assert_eq!(atoms("cm"), vec![("cm".to_string(), e(1))]);
    }

    #[test]
    fn test_parse_compound() {
        assert_eq!(
            atoms("kg*m**2/s**3"),
            vec![
                ("kg".to_string(), e(1)),
                ("m".to_string(), e(2)),
                ("s".to_string(), e(-3)),
            ]
        );
    }

    #[test]
    fn test_division_is_left_associative() {
        // erg/s/cm**2 == erg/(s*cm**2)
        assert_eq!(atoms("erg/s/cm**2"), atoms("erg/(s*cm**2)"));
    }

    #[test]
    fn test_parenthesized_power() {
        assert_eq!(
            atoms("(g/cm**3)**2"),
            vec![("cm".to_string(), e(-6)), ("g".to_string(), e(2))]
        );
    }

    #[test]
    fn test_negative_and_rational_exponents() {
        assert_eq!(atoms("s**-1"), vec![("s".to_string(), e(-1))]);
        assert_eq!(atoms("s^-2"), vec![("s".to_string(), e(-2))]);
        assert_eq!(atoms("cm**(1/2)"), vec![("cm".to_string(), Exponent::new(1, 2))]);
        assert_eq!(atoms("cm**(-3/2)"), vec![("cm".to_string(), Exponent::new(-3, 2))]);
        assert_eq!(atoms("cm**0.5"), vec![("cm".to_string(), Exponent::new(1, 2))]);
        assert_eq!(atoms("cm**1.5"), vec![("cm".to_string(), Exponent::new(3, 2))]);
    }

    #[test]
    fn test_one_and_empty_are_dimensionless() {
        assert!(parse_expr("").unwrap().is_dimensionless());
        assert!(parse_expr("   ").unwrap().is_dimensionless());
        assert_eq!(atoms("1/s"), vec![("s".to_string(), e(-1))]);
    }

    #[test]
    fn test_malformed_expressions() {
        for bad in [
            "cm*", "*cm", "cm**", "(cm", "cm)", "cm s", "2*cm", "cm**(1/0)", "cm**x", "cm//s",
            "cm**(0.5/2)", "cm**0.123456", "cm**17", "(cm**8)**4", "cm**99999999999",
        ] {
            assert!(
                matches!(parse_expr(bad), Err(UnitError::Parse { .. })),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn test_error_points_at_token() {
        match parse_expr("cm s") {
            Err(UnitError::Parse { span, reason, .. }) => {
                assert_eq!(span.offset(), 3);
                assert!(reason.contains("expected `*` or `/`"));
            }
            other => panic!("unexpected result {other:?}"),
        }
    }
}
