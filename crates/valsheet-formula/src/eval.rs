//! Formula evaluator
//!
//! A two-stack operator-precedence evaluator: operators on one stack,
//! resolved values on the other, reduced shunting-yard style as tokens
//! stream through. Cell references resolve recursively, so a formula may
//! reference a formula that references a formula; a visiting set turns a
//! reference cycle into [`FormulaError::CircularReference`] instead of
//! unbounded recursion.

use ahash::AHashSet;

use crate::error::{FormulaError, FormulaResult};
use crate::token::{tokenize_formula, Token};
use valsheet_core::{CellAddress, CellRange, CellValue, Grid};

/// Source of raw cell contents for the evaluator
pub trait CellSource {
    /// The raw value stored at `addr`, `None` for never-written cells
    fn raw_value(&self, addr: CellAddress) -> Option<CellValue>;
}

impl CellSource for Grid {
    fn raw_value(&self, addr: CellAddress) -> Option<CellValue> {
        self.cell_at(addr).map(|c| c.value.clone())
    }
}

/// Evaluate a formula string (with its leading '=') against a cell source
pub fn evaluate_formula<S: CellSource>(src: &S, text: &str) -> FormulaResult<f64> {
    Evaluator::new(src).eval_text(text)
}

/// Evaluate the cell at `addr`, resolving formula chains recursively
pub fn evaluate_cell<S: CellSource>(src: &S, addr: CellAddress) -> FormulaResult<f64> {
    Evaluator::new(src).resolve(addr)
}

fn precedence(token: &Token) -> u8 {
    match token {
        Token::Plus | Token::Minus => 1,
        Token::Star | Token::Slash => 2,
        _ => 0,
    }
}

pub(crate) struct Evaluator<'a, S: CellSource> {
    src: &'a S,
    visiting: AHashSet<CellAddress>,
}

impl<'a, S: CellSource> Evaluator<'a, S> {
    pub(crate) fn new(src: &'a S) -> Self {
        Self {
            src,
            visiting: AHashSet::new(),
        }
    }

    pub(crate) fn eval_text(&mut self, text: &str) -> FormulaResult<f64> {
        let tokens = tokenize_formula(text)?;
        self.eval_tokens(&tokens)
    }

    /// Resolve a cell to a number: blanks read as 0, formulas evaluate
    /// recursively, text is an evaluation error.
    pub(crate) fn resolve(&mut self, addr: CellAddress) -> FormulaResult<f64> {
        if !self.visiting.insert(addr) {
            return Err(FormulaError::CircularReference(addr));
        }

        let result = match self.src.raw_value(addr) {
            None | Some(CellValue::Blank) => Ok(0.0),
            Some(CellValue::Number(n)) => Ok(n),
            Some(CellValue::Formula(text)) => self.eval_text(&text),
            Some(CellValue::Text(s)) => Err(FormulaError::Evaluation(format!(
                "cell {} holds text '{}'",
                addr, s
            ))),
        };

        self.visiting.remove(&addr);
        result
    }

    /// Sum a range, counting never-written and blank cells as 0
    pub(crate) fn sum_range(&mut self, range: CellRange) -> FormulaResult<f64> {
        let mut total = 0.0;
        for addr in range.cells() {
            match self.src.raw_value(addr) {
                None | Some(CellValue::Blank) => {}
                _ => total += self.resolve(addr)?,
            }
        }
        Ok(total)
    }

    fn eval_tokens(&mut self, tokens: &[Token]) -> FormulaResult<f64> {
        if let [Token::SumRange(range)] = tokens {
            return self.sum_range(*range);
        }

        let mut ops: Vec<Token> = Vec::new();
        let mut vals: Vec<f64> = Vec::new();
        // True while the next token should be a value; lets a leading
        // minus act as negation.
        let mut expect_operand = true;

        for &token in tokens {
            match token {
                Token::Number(n) => {
                    vals.push(n);
                    expect_operand = false;
                }
                Token::CellRef(addr) => {
                    vals.push(self.resolve(addr)?);
                    expect_operand = false;
                }
                Token::SumRange(_) => {
                    return Err(FormulaError::Parse(
                        "SUM is only supported as the whole formula".into(),
                    ));
                }
                Token::LeftParen => {
                    ops.push(token);
                    expect_operand = true;
                }
                Token::RightParen => {
                    loop {
                        match ops.pop() {
                            Some(Token::LeftParen) => break,
                            Some(op) => Self::apply(op, &mut vals)?,
                            None => {
                                return Err(FormulaError::Parse(
                                    "unbalanced closing parenthesis".into(),
                                ))
                            }
                        }
                    }
                    expect_operand = false;
                }
                Token::Minus if expect_operand => {
                    // Unary minus: evaluate as 0 - operand. Pushed without
                    // reducing so the subtraction binds to the operand only.
                    vals.push(0.0);
                    ops.push(Token::Minus);
                }
                op => {
                    if expect_operand {
                        return Err(FormulaError::Parse(format!(
                            "operator {:?} where a value was expected",
                            op
                        )));
                    }
                    while let Some(&top) = ops.last() {
                        if precedence(&top) >= precedence(&op) {
                            ops.pop();
                            Self::apply(top, &mut vals)?;
                        } else {
                            break;
                        }
                    }
                    ops.push(op);
                    expect_operand = true;
                }
            }
        }

        while let Some(op) = ops.pop() {
            if matches!(op, Token::LeftParen) {
                return Err(FormulaError::Parse("unbalanced opening parenthesis".into()));
            }
            Self::apply(op, &mut vals)?;
        }

        match vals.len() {
            1 => Ok(vals[0]),
            _ => Err(FormulaError::Parse("malformed expression".into())),
        }
    }

    fn apply(op: Token, vals: &mut Vec<f64>) -> FormulaResult<()> {
        let rhs = vals
            .pop()
            .ok_or_else(|| FormulaError::Parse("missing operand".into()))?;
        let lhs = vals
            .pop()
            .ok_or_else(|| FormulaError::Parse("missing operand".into()))?;

        let result = match op {
            Token::Plus => lhs + rhs,
            Token::Minus => lhs - rhs,
            Token::Star => lhs * rhs,
            Token::Slash => {
                if rhs == 0.0 {
                    return Err(FormulaError::DivisionByZero);
                }
                lhs / rhs
            }
            _ => return Err(FormulaError::Parse(format!("not an operator: {:?}", op))),
        };

        vals.push(result);
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use ahash::AHashMap;

    /// Map-backed cell source for tests
    pub(crate) struct MapSource(pub AHashMap<CellAddress, CellValue>);

    impl MapSource {
        pub fn new(entries: &[(&str, CellValue)]) -> Self {
            let mut map = AHashMap::new();
            for (addr, value) in entries {
                map.insert(CellAddress::parse(addr).unwrap(), value.clone());
            }
            Self(map)
        }
    }

    impl CellSource for MapSource {
        fn raw_value(&self, addr: CellAddress) -> Option<CellValue> {
            self.0.get(&addr).cloned()
        }
    }

    fn empty() -> MapSource {
        MapSource(AHashMap::new())
    }

    #[test]
    fn test_literal_arithmetic() {
        let src = empty();
        assert_eq!(evaluate_formula(&src, "=1+2").unwrap(), 3.0);
        assert_eq!(evaluate_formula(&src, "=1+2*3").unwrap(), 7.0);
        assert_eq!(evaluate_formula(&src, "=(1+2)*3").unwrap(), 9.0);
        assert_eq!(evaluate_formula(&src, "=10-4-3").unwrap(), 3.0);
        assert_eq!(evaluate_formula(&src, "=20/2/5").unwrap(), 2.0);
    }

    #[test]
    fn test_unary_minus() {
        let src = empty();
        assert_eq!(evaluate_formula(&src, "=-5").unwrap(), -5.0);
        assert_eq!(
            evaluate_formula(&src, "=(20.0/2)+(-3*(1+2))").unwrap(),
            1.0
        );
    }

    #[test]
    fn test_cell_reference_resolution() {
        let src = MapSource::new(&[
            ("C3", CellValue::Number(5.0)),
            ("D3", CellValue::formula("=C3*2")),
        ]);
        assert_eq!(evaluate_formula(&src, "=D3+1").unwrap(), 11.0);
    }

    #[test]
    fn test_recursive_formula_chain() {
        // Three formula hops deep, like a terminal-value cell referencing
        // a terminal cash flow referencing the last series cell.
        let src = MapSource::new(&[
            ("B2", CellValue::Number(8.0)),
            ("B3", CellValue::formula("=B2*2")),
            ("B4", CellValue::formula("=B3+B2")),
            ("B5", CellValue::formula("=B4/3")),
        ]);
        assert_eq!(evaluate_formula(&src, "=B5").unwrap(), 8.0);
    }

    #[test]
    fn test_blank_reference_reads_as_zero() {
        let src = empty();
        assert_eq!(evaluate_formula(&src, "=Z99+1").unwrap(), 1.0);
    }

    #[test]
    fn test_sum_range_with_blanks() {
        let src = MapSource::new(&[
            ("C5", CellValue::Number(1.0)),
            ("D5", CellValue::Blank),
            ("F5", CellValue::formula("=C5*3")),
        ]);
        // E5 was never written; blanks and holes count as zero.
        assert_eq!(evaluate_formula(&src, "=SUM(C5:F5)").unwrap(), 4.0);
    }

    #[test]
    fn test_division_by_zero_cell() {
        let src = MapSource::new(&[("A1", CellValue::Number(0.0))]);
        let err = evaluate_formula(&src, "=1/A1").unwrap_err();
        assert!(matches!(err, FormulaError::DivisionByZero));
    }

    #[test]
    fn test_circular_reference_detected() {
        let src = MapSource::new(&[
            ("A1", CellValue::formula("=B1")),
            ("B1", CellValue::formula("=A1")),
        ]);
        let err = evaluate_cell(&src, CellAddress::parse("A1").unwrap()).unwrap_err();
        assert!(matches!(err, FormulaError::CircularReference(_)));
    }

    #[test]
    fn test_self_reference_detected() {
        let src = MapSource::new(&[("A1", CellValue::formula("=A1+1"))]);
        let err = evaluate_cell(&src, CellAddress::parse("A1").unwrap()).unwrap_err();
        assert!(matches!(err, FormulaError::CircularReference(_)));
    }

    #[test]
    fn test_diamond_reference_is_not_a_cycle() {
        // A1 references B1 twice through different paths; that must not
        // trip cycle detection.
        let src = MapSource::new(&[
            ("B1", CellValue::Number(3.0)),
            ("C1", CellValue::formula("=B1*2")),
            ("A1", CellValue::formula("=B1+C1")),
        ]);
        assert_eq!(
            evaluate_cell(&src, CellAddress::parse("A1").unwrap()).unwrap(),
            9.0
        );
    }

    #[test]
    fn test_text_cell_is_an_error() {
        let src = MapSource::new(&[("A1", CellValue::Text("Revenue".into()))]);
        let err = evaluate_formula(&src, "=A1*2").unwrap_err();
        assert!(matches!(err, FormulaError::Evaluation(_)));
    }

    #[test]
    fn test_malformed_expression() {
        let src = empty();
        assert!(evaluate_formula(&src, "=1+").is_err());
        assert!(evaluate_formula(&src, "=(1+2").is_err());
        assert!(evaluate_formula(&src, "=1+2)").is_err());
        assert!(evaluate_formula(&src, "=*3").is_err());
    }
}
