//! Typed formula expressions
//!
//! Model builders construct formulas as trees rather than by string
//! templating: the same tree renders to the Excel grammar for the
//! workbook artifact and evaluates directly in-process, so construction
//! and rendering stay in one place and cannot drift apart.

use std::fmt;
use std::ops;

use crate::error::FormulaResult;
use crate::eval::{CellSource, Evaluator};
use valsheet_core::{CellAddress, CellRange};

/// Binary operators in the writer grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    fn precedence(&self) -> u8 {
        match self {
            BinaryOp::Add | BinaryOp::Sub => 1,
            BinaryOp::Mul | BinaryOp::Div => 2,
        }
    }

    fn symbol(&self) -> char {
        match self {
            BinaryOp::Add => '+',
            BinaryOp::Sub => '-',
            BinaryOp::Mul => '*',
            BinaryOp::Div => '/',
        }
    }
}

/// A formula expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Numeric literal
    Number(f64),
    /// Cell reference
    Ref(CellAddress),
    /// Binary operation
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// SUM over a range
    Sum(CellRange),
}

impl Expr {
    /// Numeric literal
    pub fn num(value: f64) -> Self {
        Expr::Number(value)
    }

    /// Cell reference by address
    pub fn cell(addr: CellAddress) -> Self {
        Expr::Ref(addr)
    }

    /// SUM over a range
    pub fn sum(range: CellRange) -> Self {
        Expr::Sum(range)
    }

    fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            Expr::Binary { op, .. } => op.precedence(),
            // Atoms never need parenthesizing
            _ => 3,
        }
    }

    /// Render to the writer grammar, without the leading '='
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out);
        out
    }

    /// Render as a full formula string with the leading '='
    pub fn to_formula(&self) -> String {
        format!("={}", self.render())
    }

    fn render_into(&self, out: &mut String) {
        match self {
            Expr::Number(n) => {
                out.push_str(&format!("{}", n));
            }
            Expr::Ref(addr) => out.push_str(&addr.to_a1_string()),
            Expr::Sum(range) => {
                out.push_str("SUM(");
                out.push_str(&range.to_a1_string());
                out.push(')');
            }
            Expr::Binary { op, lhs, rhs } => {
                // Parenthesize children exactly where losing them would
                // change how the grammar re-parses: lower-precedence
                // children on either side, equal precedence on the right
                // of the non-associative operators.
                let lhs_parens = lhs.precedence() < op.precedence();
                let rhs_parens = rhs.precedence() < op.precedence()
                    || (rhs.precedence() == op.precedence()
                        && matches!(op, BinaryOp::Sub | BinaryOp::Div));

                if lhs_parens {
                    out.push('(');
                }
                lhs.render_into(out);
                if lhs_parens {
                    out.push(')');
                }

                out.push(op.symbol());

                if rhs_parens {
                    out.push('(');
                }
                rhs.render_into(out);
                if rhs_parens {
                    out.push(')');
                }
            }
        }
    }

    /// Evaluate the tree directly against a cell source, bypassing the
    /// tokenizer; referenced cells still resolve recursively.
    pub fn eval<S: CellSource>(&self, src: &S) -> FormulaResult<f64> {
        let mut evaluator = Evaluator::new(src);
        self.eval_with(&mut evaluator)
    }

    fn eval_with<S: CellSource>(&self, evaluator: &mut Evaluator<S>) -> FormulaResult<f64> {
        match self {
            Expr::Number(n) => Ok(*n),
            Expr::Ref(addr) => evaluator.resolve(*addr),
            Expr::Sum(range) => evaluator.sum_range(*range),
            Expr::Binary { op, lhs, rhs } => {
                let lhs = lhs.eval_with(evaluator)?;
                let rhs = rhs.eval_with(evaluator)?;
                match op {
                    BinaryOp::Add => Ok(lhs + rhs),
                    BinaryOp::Sub => Ok(lhs - rhs),
                    BinaryOp::Mul => Ok(lhs * rhs),
                    BinaryOp::Div => {
                        if rhs == 0.0 {
                            Err(crate::error::FormulaError::DivisionByZero)
                        } else {
                            Ok(lhs / rhs)
                        }
                    }
                }
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

impl From<f64> for Expr {
    fn from(n: f64) -> Self {
        Expr::Number(n)
    }
}

impl From<CellAddress> for Expr {
    fn from(addr: CellAddress) -> Self {
        Expr::Ref(addr)
    }
}

impl ops::Add for Expr {
    type Output = Expr;
    fn add(self, rhs: Expr) -> Expr {
        Expr::binary(BinaryOp::Add, self, rhs)
    }
}

impl ops::Sub for Expr {
    type Output = Expr;
    fn sub(self, rhs: Expr) -> Expr {
        Expr::binary(BinaryOp::Sub, self, rhs)
    }
}

impl ops::Mul for Expr {
    type Output = Expr;
    fn mul(self, rhs: Expr) -> Expr {
        Expr::binary(BinaryOp::Mul, self, rhs)
    }
}

impl ops::Div for Expr {
    type Output = Expr;
    fn div(self, rhs: Expr) -> Expr {
        Expr::binary(BinaryOp::Div, self, rhs)
    }
}
