//! Formula tokenizer
//!
//! Splits a formula into a flat token stream of operators, parentheses,
//! numeric literals and cell references. A whole-cell `SUM(a:b)` is the
//! one supported function form and tokenizes to a single range token;
//! any other function use, including `SUM(...)` mixed with arithmetic,
//! is rejected up front.

use lazy_regex::regex;

use crate::error::{FormulaError, FormulaResult};
use valsheet_core::{CellAddress, CellRange};

/// A formula token
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Token {
    /// Numeric literal
    Number(f64),
    /// Cell reference (distinguished from a literal by its letter prefix)
    CellRef(CellAddress),
    /// A whole-formula SUM over a range
    SumRange(CellRange),
    Plus,
    Minus,
    Star,
    Slash,
    LeftParen,
    RightParen,
}

/// Tokenize a formula string, which must carry the leading '='
pub fn tokenize_formula(text: &str) -> FormulaResult<Vec<Token>> {
    let text = text.trim();
    let body = text
        .strip_prefix('=')
        .ok_or_else(|| FormulaError::NotAFormula(text.to_string()))?;
    tokenize_body(body)
}

/// Tokenize a formula body (the text after '=')
pub fn tokenize_body(body: &str) -> FormulaResult<Vec<Token>> {
    // Absolute-reference markers carry no meaning for evaluation.
    let body = body.replace('$', "");
    let body = body.trim();

    // Whole-formula SUM(ref:ref) form.
    let sum_range = regex!(r"^SUM\(\s*([A-Za-z]+\d+)\s*:\s*([A-Za-z]+\d+)\s*\)$"i);
    if let Some(caps) = sum_range.captures(body) {
        let start = CellAddress::parse(&caps[1])?;
        let end = CellAddress::parse(&caps[2])?;
        return Ok(vec![Token::SumRange(CellRange::new(start, end))]);
    }

    // Any other function-call shape: letters directly followed by an
    // open paren.
    if let Some(m) = regex!(r"[A-Za-z]+\(").find(body) {
        return Err(FormulaError::UnsupportedFunction(format!(
            "'{}' in '{}' (only a whole-cell SUM(range) is supported)",
            m.as_str().trim_end_matches('('),
            body
        )));
    }

    let mut tokens = Vec::new();
    let mut consumed = 0;

    // Operators, or an optional letter prefix followed by digits: the
    // letter prefix is what makes a match a cell reference rather than
    // a literal.
    let scan = regex!(r"[+\-*/()]|[A-Za-z]*\d+(?:\.\d+)?");
    for m in scan.find_iter(body) {
        // Everything the scanner skipped must be whitespace.
        let gap = &body[consumed..m.start()];
        if !gap.trim().is_empty() {
            return Err(FormulaError::Parse(format!(
                "unexpected '{}' in '{}'",
                gap.trim(),
                body
            )));
        }
        consumed = m.end();

        let text = m.as_str();
        let token = match text {
            "+" => Token::Plus,
            "-" => Token::Minus,
            "*" => Token::Star,
            "/" => Token::Slash,
            "(" => Token::LeftParen,
            ")" => Token::RightParen,
            _ if text.starts_with(|c: char| c.is_ascii_alphabetic()) => {
                Token::CellRef(CellAddress::parse(text)?)
            }
            _ => {
                let n: f64 = text.parse().map_err(|_| {
                    FormulaError::Parse(format!("invalid number literal '{}'", text))
                })?;
                Token::Number(n)
            }
        };
        tokens.push(token);
    }

    let tail = &body[consumed..];
    if !tail.trim().is_empty() {
        return Err(FormulaError::Parse(format!(
            "unexpected '{}' in '{}'",
            tail.trim(),
            body
        )));
    }

    if tokens.is_empty() {
        return Err(FormulaError::Parse("empty formula".into()));
    }

    Ok(tokens)
}
