//! Predicate expression language
//!
//! A small boolean/arithmetic language over record fields, used by the
//! filter and count commands:
//!
//! ```text
//! qual > 50
//! chrom == "chr1" and qual > 80
//! pos in 1000..=5000
//! len(ref) == 1 and len(alt) == 1
//! filter != PASS or info.DP < 10
//! id ~ "^rs[0-9]+$"
//! ```
//!
//! `and`/`&&`, `or`/`||` and `not`/`!` combine comparisons with
//! short-circuit evaluation; parentheses group. String literals may be
//! quoted or bare tokens. Comparisons against a missing value evaluate to
//! false, never error. Syntax problems and bad regexes are
//! `InvalidPredicate` errors raised at parse time, before any record is
//! processed.

use crate::app::models::{VcfHeader, VcfRecord};
use crate::app::services::query::field::FieldRef;
use crate::{Error, Result};
use regex::Regex;

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl CompareOp {
    fn apply_ord(self, ord: std::cmp::Ordering) -> bool {
        match self {
            CompareOp::Eq => ord.is_eq(),
            CompareOp::Ne => ord.is_ne(),
            CompareOp::Gt => ord.is_gt(),
            CompareOp::Ge => ord.is_ge(),
            CompareOp::Lt => ord.is_lt(),
            CompareOp::Le => ord.is_le(),
        }
    }
}

/// Literal operand of a comparison
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Number(f64),
    Text(String),
}

/// A parsed, evaluable predicate
#[derive(Debug, Clone)]
pub enum Predicate {
    /// Matches every record
    True,
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
    /// `field <op> literal`
    Compare {
        field: FieldRef,
        op: CompareOp,
        value: Literal,
    },
    /// `field in low..=high`, bounds inclusive
    InRange {
        field: FieldRef,
        low: f64,
        high: f64,
    },
    /// `len(field) <op> n`, allele-length checks
    Length {
        field: FieldRef,
        op: CompareOp,
        length: usize,
    },
    /// `field ~ "pattern"`, regex compiled at parse time
    Matches { field: FieldRef, pattern: Regex },
}

impl Predicate {
    /// Parse an expression. All syntax validation happens here.
    pub fn parse(expr: &str) -> Result<Predicate> {
        let tokens = tokenize(expr)?;
        let mut parser = Parser {
            expr,
            tokens,
            position: 0,
        };
        let predicate = parser.parse_or()?;
        if parser.position != parser.tokens.len() {
            return Err(Error::invalid_predicate(
                expr,
                format!("unexpected trailing input at token {}", parser.position + 1),
            ));
        }
        Ok(predicate)
    }

    /// Resolve and validate every field reference against the header.
    /// Fails fast, before stream processing begins.
    pub fn bind(self, header: &VcfHeader) -> Result<Predicate> {
        Ok(match self {
            Predicate::True => Predicate::True,
            Predicate::And(parts) => Predicate::And(
                parts
                    .into_iter()
                    .map(|p| p.bind(header))
                    .collect::<Result<_>>()?,
            ),
            Predicate::Or(parts) => Predicate::Or(
                parts
                    .into_iter()
                    .map(|p| p.bind(header))
                    .collect::<Result<_>>()?,
            ),
            Predicate::Not(inner) => Predicate::Not(Box::new(inner.bind(header)?)),
            Predicate::Compare { field, op, value } => Predicate::Compare {
                field: field.bind(header)?,
                op,
                value,
            },
            Predicate::InRange { field, low, high } => Predicate::InRange {
                field: field.bind(header)?,
                low,
                high,
            },
            Predicate::Length { field, op, length } => Predicate::Length {
                field: field.bind(header)?,
                op,
                length,
            },
            Predicate::Matches { field, pattern } => Predicate::Matches {
                field: field.bind(header)?,
                pattern,
            },
        })
    }

    /// Evaluate against one record, short-circuiting.
    ///
    /// A missing operand makes the comparison false; `!=` is a comparison
    /// too, so it is also false against a missing value.
    pub fn matches(&self, record: &VcfRecord) -> bool {
        match self {
            Predicate::True => true,
            Predicate::And(parts) => parts.iter().all(|p| p.matches(record)),
            Predicate::Or(parts) => parts.iter().any(|p| p.matches(record)),
            Predicate::Not(inner) => !inner.matches(record),
            Predicate::Compare { field, op, value } => match value {
                Literal::Number(number) => field
                    .number(record)
                    .and_then(|actual| actual.partial_cmp(number))
                    .map(|ord| op.apply_ord(ord))
                    .unwrap_or(false),
                Literal::Text(text) => field
                    .text(record)
                    .map(|actual| op.apply_ord(actual.cmp(text.as_str())))
                    .unwrap_or(false),
            },
            Predicate::InRange { field, low, high } => field
                .number(record)
                .map(|actual| actual >= *low && actual <= *high)
                .unwrap_or(false),
            Predicate::Length { field, op, length } => field
                .text(record)
                .map(|actual| op.apply_ord(actual.len().cmp(length)))
                .unwrap_or(false),
            Predicate::Matches { field, pattern } => field
                .text(record)
                .map(|actual| pattern.is_match(actual))
                .unwrap_or(false),
        }
    }
}

// -----------------------------------------------------------------------------
// Tokenizer
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Token {
    /// Field reference or bare string operand
    Ident(String),
    Number(f64),
    /// Quoted string operand
    Quoted(String),
    Op(CompareOp),
    Tilde,
    RangeOp,
    And,
    Or,
    Not,
    In,
    Len,
    LParen,
    RParen,
}

fn tokenize(expr: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = expr.char_indices().peekable();

    while let Some(&(_, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            '~' => {
                chars.next();
                tokens.push(Token::Tilde);
            }
            '"' | '\'' => {
                chars.next();
                let mut value = String::new();
                let mut closed = false;
                for (_, inner) in chars.by_ref() {
                    if inner == c {
                        closed = true;
                        break;
                    }
                    value.push(inner);
                }
                if !closed {
                    return Err(Error::invalid_predicate(expr, "unterminated string literal"));
                }
                tokens.push(Token::Quoted(value));
            }
            '=' | '!' | '<' | '>' | '&' | '|' => {
                tokens.push(lex_operator(expr, &mut chars)?);
            }
            '.' => {
                // `..=` range operator; a bare leading dot is the missing
                // sentinel, treated as a bare string operand.
                chars.next();
                if matches!(chars.peek(), Some(&(_, '.'))) {
                    chars.next();
                    match chars.peek() {
                        Some(&(_, '=')) => {
                            chars.next();
                            tokens.push(Token::RangeOp);
                        }
                        _ => {
                            return Err(Error::invalid_predicate(
                                expr,
                                "expected '..=' for inclusive range",
                            ));
                        }
                    }
                } else {
                    tokens.push(Token::Ident(lex_bare_token(&mut chars, ".")));
                }
            }
            c if c.is_ascii_digit() || c == '-' || c == '+' => {
                tokens.push(lex_number(expr, &mut chars)?);
            }
            c if is_ident_char(c) => {
                chars.next();
                let word = lex_bare_token(&mut chars, &c.to_string());
                tokens.push(keyword_or_ident(word));
            }
            other => {
                return Err(Error::invalid_predicate(
                    expr,
                    format!("unexpected character '{}'", other),
                ));
            }
        }
    }

    Ok(tokens)
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '[' | ']' | '-' | '/' | '*')
}

fn lex_bare_token(
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
    seed: &str,
) -> String {
    let mut word = seed.to_string();
    while let Some(&(_, c)) = chars.peek() {
        if is_ident_char(c) {
            word.push(c);
            chars.next();
        } else {
            break;
        }
    }
    word
}

fn keyword_or_ident(word: String) -> Token {
    match word.to_ascii_lowercase().as_str() {
        "and" => Token::And,
        "or" => Token::Or,
        "not" => Token::Not,
        "in" => Token::In,
        "len" | "length" => Token::Len,
        _ => Token::Ident(word),
    }
}

fn lex_operator(
    expr: &str,
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
) -> Result<Token> {
    let (_, first) = chars.next().expect("caller peeked");
    let second = chars.peek().map(|&(_, c)| c);

    let token = match (first, second) {
        ('=', Some('=')) => {
            chars.next();
            Token::Op(CompareOp::Eq)
        }
        ('!', Some('=')) => {
            chars.next();
            Token::Op(CompareOp::Ne)
        }
        ('>', Some('=')) => {
            chars.next();
            Token::Op(CompareOp::Ge)
        }
        ('<', Some('=')) => {
            chars.next();
            Token::Op(CompareOp::Le)
        }
        ('>', _) => Token::Op(CompareOp::Gt),
        ('<', _) => Token::Op(CompareOp::Lt),
        ('&', Some('&')) => {
            chars.next();
            Token::And
        }
        ('|', Some('|')) => {
            chars.next();
            Token::Or
        }
        ('!', _) => Token::Not,
        ('=', _) => {
            return Err(Error::invalid_predicate(expr, "use '==' for equality"));
        }
        (other, _) => {
            return Err(Error::invalid_predicate(
                expr,
                format!("unexpected character '{}'", other),
            ));
        }
    };
    Ok(token)
}

fn lex_number(
    expr: &str,
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
) -> Result<Token> {
    let mut text = String::new();
    if let Some(&(_, c)) = chars.peek() {
        if c == '-' || c == '+' {
            text.push(c);
            chars.next();
        }
    }

    let mut word_tail = false;
    while let Some(&(_, c)) = chars.peek() {
        if c.is_ascii_digit() {
            text.push(c);
            chars.next();
        } else if c == '.' {
            // Stop before `..=` so `1000..=5000` lexes as two numbers
            // around a range operator.
            let mut lookahead = chars.clone();
            lookahead.next();
            if matches!(lookahead.peek(), Some(&(_, '.'))) {
                break;
            }
            text.push(c);
            chars.next();
        } else if is_ident_char(c) {
            // Not a number after all (`0/1`, `1abc`); fall back to a
            // bare string operand.
            word_tail = true;
            text.push(c);
            chars.next();
        } else {
            break;
        }
    }

    if word_tail {
        return Ok(Token::Ident(text));
    }
    text.parse::<f64>()
        .map(Token::Number)
        .map_err(|_| Error::invalid_predicate(expr, format!("invalid number '{}'", text)))
}

// -----------------------------------------------------------------------------
// Parser
// -----------------------------------------------------------------------------

struct Parser<'a> {
    expr: &'a str,
    tokens: Vec<Token>,
    position: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    fn expect(&mut self, expected: &Token, what: &str) -> Result<()> {
        match self.next() {
            Some(ref token) if token == expected => Ok(()),
            _ => Err(Error::invalid_predicate(self.expr, format!("expected {}", what))),
        }
    }

    fn parse_or(&mut self) -> Result<Predicate> {
        let mut parts = vec![self.parse_and()?];
        while matches!(self.peek(), Some(Token::Or)) {
            self.next();
            parts.push(self.parse_and()?);
        }
        Ok(if parts.len() == 1 {
            parts.pop().expect("non-empty")
        } else {
            Predicate::Or(parts)
        })
    }

    fn parse_and(&mut self) -> Result<Predicate> {
        let mut parts = vec![self.parse_unary()?];
        while matches!(self.peek(), Some(Token::And)) {
            self.next();
            parts.push(self.parse_unary()?);
        }
        Ok(if parts.len() == 1 {
            parts.pop().expect("non-empty")
        } else {
            Predicate::And(parts)
        })
    }

    fn parse_unary(&mut self) -> Result<Predicate> {
        if matches!(self.peek(), Some(Token::Not)) {
            self.next();
            return Ok(Predicate::Not(Box::new(self.parse_unary()?)));
        }
        if matches!(self.peek(), Some(Token::LParen)) {
            self.next();
            let inner = self.parse_or()?;
            self.expect(&Token::RParen, "closing ')'")?;
            return Ok(inner);
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Predicate> {
        if matches!(self.peek(), Some(Token::Len)) {
            return self.parse_length();
        }

        let field = match self.next() {
            Some(Token::Ident(name)) => FieldRef::parse(&name)?,
            _ => {
                return Err(Error::invalid_predicate(
                    self.expr,
                    "expected a field reference",
                ));
            }
        };

        match self.next() {
            Some(Token::Op(op)) => {
                let value = self.parse_literal()?;
                if let Literal::Text(_) = value {
                    if !matches!(op, CompareOp::Eq | CompareOp::Ne) {
                        return Err(Error::invalid_predicate(
                            self.expr,
                            "ordering comparisons require a numeric literal",
                        ));
                    }
                }
                Ok(Predicate::Compare { field, op, value })
            }
            Some(Token::Tilde) => {
                let pattern_text = match self.next() {
                    Some(Token::Quoted(text)) | Some(Token::Ident(text)) => text,
                    _ => {
                        return Err(Error::invalid_predicate(
                            self.expr,
                            "expected a pattern after '~'",
                        ));
                    }
                };
                let pattern = Regex::new(&pattern_text).map_err(|e| {
                    Error::invalid_predicate(self.expr, format!("bad pattern: {}", e))
                })?;
                Ok(Predicate::Matches { field, pattern })
            }
            Some(Token::In) => {
                let low = self.parse_number("range start")?;
                self.expect(&Token::RangeOp, "'..=' between range bounds")?;
                let high = self.parse_number("range end")?;
                if low > high {
                    return Err(Error::invalid_predicate(
                        self.expr,
                        "range start exceeds range end",
                    ));
                }
                Ok(Predicate::InRange { field, low, high })
            }
            _ => Err(Error::invalid_predicate(
                self.expr,
                "expected a comparison operator",
            )),
        }
    }

    fn parse_length(&mut self) -> Result<Predicate> {
        self.next(); // consume `len`
        self.expect(&Token::LParen, "'(' after len")?;
        let field = match self.next() {
            Some(Token::Ident(name)) => FieldRef::parse(&name)?,
            _ => {
                return Err(Error::invalid_predicate(
                    self.expr,
                    "expected a field reference inside len()",
                ));
            }
        };
        self.expect(&Token::RParen, "closing ')' after len field")?;

        let op = match self.next() {
            Some(Token::Op(op)) => op,
            _ => {
                return Err(Error::invalid_predicate(
                    self.expr,
                    "expected a comparison operator after len()",
                ));
            }
        };
        let length = self.parse_number("length")?;
        if length < 0.0 || length.fract() != 0.0 {
            return Err(Error::invalid_predicate(
                self.expr,
                "length must be a non-negative integer",
            ));
        }
        Ok(Predicate::Length {
            field,
            op,
            length: length as usize,
        })
    }

    fn parse_literal(&mut self) -> Result<Literal> {
        match self.next() {
            Some(Token::Number(number)) => Ok(Literal::Number(number)),
            Some(Token::Quoted(text)) | Some(Token::Ident(text)) => Ok(Literal::Text(text)),
            _ => Err(Error::invalid_predicate(
                self.expr,
                "expected a literal operand",
            )),
        }
    }

    fn parse_number(&mut self, what: &str) -> Result<f64> {
        match self.next() {
            Some(Token::Number(number)) => Ok(number),
            _ => Err(Error::invalid_predicate(
                self.expr,
                format!("expected a numeric {}", what),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::services::vcf_parser::header::build_header;
    use crate::app::services::vcf_parser::record_parser::parse_record;

    fn header() -> VcfHeader {
        build_header(
            vec![],
            "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tNA001".to_string(),
        )
        .unwrap()
    }

    fn record(line: &str) -> VcfRecord {
        parse_record(line, 1, &header()).unwrap()
    }

    fn eval(expr: &str, line: &str) -> bool {
        Predicate::parse(expr)
            .unwrap()
            .bind(&header())
            .unwrap()
            .matches(&record(line))
    }

    const HIGH: &str = "chr1\t1000\trs11\tA\tG\t99.9\tPASS\tDP=14\tGT\t0/1";
    const LOW: &str = "chr2\t4000\t.\tT\tC\t12.1\tLOWQUAL\tDP=3\tGT\t1/1";
    const NOQUAL: &str = "chr3\t7000\t.\tT\tC\t.\tPASS\tDP=9\tGT\t0/0";

    #[test]
    fn test_numeric_comparisons() {
        assert!(eval("qual > 50", HIGH));
        assert!(!eval("qual > 50", LOW));
        assert!(eval("pos <= 1000", HIGH));
        assert!(eval("info.DP == 14", HIGH));
        assert!(eval("info.DP != 14", LOW));
    }

    #[test]
    fn test_missing_value_comparisons_are_false() {
        // Neither greater, less, equal nor not-equal to any threshold
        assert!(!eval("qual > 50", NOQUAL));
        assert!(!eval("qual < 50", NOQUAL));
        assert!(!eval("qual == 50", NOQUAL));
        assert!(!eval("qual != 50", NOQUAL));
    }

    #[test]
    fn test_string_comparisons() {
        assert!(eval("filter == \"PASS\"", HIGH));
        assert!(eval("filter != PASS", LOW));
        assert!(eval("chrom == chr1", HIGH));
        assert!(eval("sample.NA001.GT == \"0/1\"", HIGH));
    }

    #[test]
    fn test_boolean_connectives_and_grouping() {
        assert!(eval("chrom == chr1 and qual > 80", HIGH));
        assert!(!eval("chrom == chr1 and qual > 80", LOW));
        assert!(eval("chrom == chr9 or qual > 80", HIGH));
        assert!(eval("not (qual > 50)", LOW));
        assert!(eval("chrom == chr1 && qual > 80 || filter != PASS", LOW));
    }

    #[test]
    fn test_inclusive_range() {
        assert!(eval("pos in 1000..=5000", HIGH));
        assert!(eval("pos in 1000..=5000", LOW));
        assert!(!eval("pos in 1000..=5000", NOQUAL));
        assert!(!eval("qual in 0..=100", NOQUAL));
    }

    #[test]
    fn test_length_checks() {
        assert!(eval("len(ref) == 1 and len(alt) == 1", HIGH));
        assert!(!eval("len(ref) == 2", HIGH));
        assert!(eval("len(id) > 2", HIGH));
    }

    #[test]
    fn test_regex_match() {
        assert!(eval("id ~ \"^rs[0-9]+$\"", HIGH));
        assert!(!eval("id ~ \"^rs[0-9]+$\"", LOW));
        assert!(eval("chrom ~ \"^chr[12]$\"", LOW));
    }

    #[test]
    fn test_syntax_errors_fail_at_parse_time() {
        assert!(Predicate::parse("qual >").is_err());
        assert!(Predicate::parse("qual = 50").is_err());
        assert!(Predicate::parse("(qual > 50").is_err());
        assert!(Predicate::parse("qual > 50 extra").is_err());
        assert!(Predicate::parse("pos in 5000..=1000").is_err());
        assert!(Predicate::parse("id ~ \"[unclosed\"").is_err());
        assert!(Predicate::parse("chrom > chr1").is_err());
        assert!(Predicate::parse("len(ref) == 1.5").is_err());
    }

    #[test]
    fn test_unknown_field_fails_at_parse_time() {
        assert!(Predicate::parse("position > 50").is_err());
    }

    #[test]
    fn test_unknown_sample_fails_at_bind_time() {
        let predicate = Predicate::parse("sample.NA999.GT == \"0/1\"").unwrap();
        assert!(predicate.bind(&header()).is_err());
    }
}
