use cas_num::{Magnitude, Rational, Sign};
use cas_parser::parser::{
    ast::{AssignTarget, Expr, Literal},
    token::op::{BinOpKind, UnaryOpKind},
};
use crate::{
    error::{kind, Error, Result},
    keyword::Keyword,
};
use super::Interpreter;
use crate::node::NodeRef;

impl Interpreter {
    /// Converts a parsed expression into an unevaluated node tree.
    ///
    /// Operators become applications of keywords: `a - b` is `(add a (multiply -1 b))`, `a / b`
    /// is `(multiply a (power b -1))` and `a < b` is `(testlt a b)`.
    pub fn scan(&mut self, expr: &Expr) -> Result<NodeRef> {
        match expr {
            Expr::Literal(literal) => self.scan_literal(literal, Sign::Plus),
            Expr::Paren(paren) => self.scan(&paren.expr),
            Expr::Tensor(tensor) => {
                let elems = tensor.elements.iter()
                    .map(|element| self.scan(element))
                    .collect::<Result<Vec<_>>>()?;
                self.tensor_node(vec![elems.len()], elems)
            },
            Expr::Call(call) => {
                let mut items = vec![self.intern(&call.name.name)?];
                for arg in &call.args {
                    items.push(self.scan(arg)?);
                }
                self.list(&items)
            },
            Expr::Index(index) => {
                let mut items = vec![self.keyword(Keyword::Index), self.scan(&index.target)?];
                for i in &index.indices {
                    items.push(self.scan(i)?);
                }
                self.list(&items)
            },
            Expr::Unary(unary) => match unary.op.kind {
                UnaryOpKind::Neg => match &*unary.operand {
                    Expr::Literal(literal @ (Literal::Integer(_) | Literal::Float(_))) => {
                        self.scan_literal(literal, Sign::Minus)
                    },
                    operand => {
                        let operand = self.scan(operand)?;
                        let minus_one = self.consts.minus_one;
                        self.apply(Keyword::Multiply, &[minus_one, operand])
                    },
                },
                UnaryOpKind::Factorial => {
                    let operand = self.scan(&unary.operand)?;
                    self.apply(Keyword::Factorial, &[operand])
                },
            },
            Expr::Binary(binary) => {
                let lhs = self.scan(&binary.lhs)?;
                let rhs = self.scan(&binary.rhs)?;
                let minus_one = self.consts.minus_one;
                match binary.op.kind {
                    BinOpKind::Add => self.apply(Keyword::Add, &[lhs, rhs]),
                    BinOpKind::Sub => {
                        let rhs = self.apply(Keyword::Multiply, &[minus_one, rhs])?;
                        self.apply(Keyword::Add, &[lhs, rhs])
                    },
                    BinOpKind::Mul => self.apply(Keyword::Multiply, &[lhs, rhs]),
                    BinOpKind::Div => {
                        let rhs = self.apply(Keyword::Power, &[rhs, minus_one])?;
                        self.apply(Keyword::Multiply, &[lhs, rhs])
                    },
                    BinOpKind::Exp => self.apply(Keyword::Power, &[lhs, rhs]),
                    BinOpKind::Eq => self.apply(Keyword::Testeq, &[lhs, rhs]),
                    BinOpKind::Less => self.apply(Keyword::Testlt, &[lhs, rhs]),
                    BinOpKind::LessEq => self.apply(Keyword::Testle, &[lhs, rhs]),
                    BinOpKind::Greater => self.apply(Keyword::Testgt, &[lhs, rhs]),
                    BinOpKind::GreaterEq => self.apply(Keyword::Testge, &[lhs, rhs]),
                }
            },
            Expr::Assign(assign) => {
                let target = match &assign.target {
                    AssignTarget::Symbol(symbol) => self.intern(&symbol.name)?,
                    AssignTarget::Func(header) => {
                        let mut items = vec![self.intern(&header.name.name)?];
                        for param in &header.params {
                            items.push(self.intern(&param.name)?);
                        }
                        self.list(&items)?
                    },
                    AssignTarget::Index(index) => self.scan(&Expr::Index(index.clone()))?,
                };
                let value = self.scan(&assign.value)?;
                self.apply(Keyword::Setq, &[target, value])
            },
        }
    }

    fn scan_literal(&mut self, literal: &Literal, sign: Sign) -> Result<NodeRef> {
        let malformed = || Error::new(kind::InternalError { message: "malformed number literal" });
        match literal {
            Literal::Integer(int) => {
                let n = Magnitude::parse_decimal(&int.value).ok_or_else(malformed)?;
                self.rational_node(Rational::from_integer(sign, n))
            },
            Literal::Float(float) => {
                let d = float.value.parse::<f64>().map_err(|_| malformed())?;
                self.double_node(if sign == Sign::Minus { -d } else { d })
            },
            Literal::Symbol(symbol) => self.intern(&symbol.name),
            Literal::Str(s) => self.string_node(&s.value),
        }
    }
}

#[cfg(test)]
mod tests {
    use cas_parser::parser::{ast::Expr, Parser};
    use crate::Interpreter;

    fn prefix(source: &str) -> String {
        let mut interp = Interpreter::new();
        let expr = Parser::new(source).try_parse_full::<Expr>().unwrap();
        let p = interp.scan(&expr).unwrap();
        interp.prefix(p)
    }

    #[test]
    fn operators_become_applications() {
        assert_eq!(prefix("a - b"), "(add a (multiply -1 b))");
        assert_eq!(prefix("a / b"), "(multiply a (power b -1))");
        assert_eq!(prefix("-x^2"), "(multiply -1 (power x 2))");
        assert_eq!(prefix("n!"), "(factorial n)");
        assert_eq!(prefix("a <= b"), "(testle a b)");
    }

    #[test]
    fn negative_literals_are_numbers() {
        assert_eq!(prefix("-3"), "-3");
        assert_eq!(prefix("-2.5"), "-2.5");
    }

    #[test]
    fn calls_and_assignments() {
        assert_eq!(prefix("sin(x)"), "(sin x)");
        assert_eq!(prefix("f(x, y) = x*y"), "(setq (f x y) (multiply x y))");
        assert_eq!(prefix("A[1, 2] = 0"), "(setq (index A 1 2) 0)");
    }
}
