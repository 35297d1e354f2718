//! Linear text output of canonical expressions.
//!
//! [`Interpreter::display`] prints the usual infix notation, for example `x^2 + 2*x + 1`, and
//! [`Interpreter::prefix`] prints the tree structure itself, for example
//! `(add (power x 2) (multiply 2 x) 1)`. Printing never allocates nodes.

use crate::{
    error::Result,
    interp::Interpreter,
    keyword::Keyword,
    node::{Node, NodeRef},
};
use std::fmt::{self, Write};

/// Significant digits shown for doubles.
const DOUBLE_DIGITS: i32 = 6;

/// Formats a double with [`DOUBLE_DIGITS`] significant digits. Integral values keep a trailing
/// `.0` so they read back as doubles, and very large or small values use a power of ten.
pub fn format_double(d: f64) -> String {
    if d == 0.0 {
        return "0.0".to_string();
    }
    if !d.is_finite() {
        return d.to_string();
    }

    let mut exp = d.abs().log10().floor() as i32;
    if (-5..DOUBLE_DIGITS).contains(&exp) {
        let decimals = (DOUBLE_DIGITS - 1 - exp).max(0) as usize;
        return trim_zeros(format!("{:.*}", decimals, d));
    }

    let mut mantissa = trim_zeros(format!("{:.*}", (DOUBLE_DIGITS - 1) as usize, d / 10f64.powi(exp)));
    if mantissa.trim_start_matches('-').starts_with("10") {
        // the mantissa rounded up to the next power of ten
        exp += 1;
        mantissa = trim_zeros(format!("{:.*}", (DOUBLE_DIGITS - 1) as usize, d / 10f64.powi(exp)));
    }
    if exp < 0 {
        format!("{}*10^({})", mantissa, exp)
    } else {
        format!("{}*10^{}", mantissa, exp)
    }
}

/// Removes trailing zeros after the decimal point, keeping at least one digit after it.
fn trim_zeros(mut s: String) -> String {
    if s.contains('.') {
        while s.ends_with('0') {
            s.pop();
        }
    }
    if s.ends_with('.') {
        s.push('0');
    } else if !s.contains('.') {
        s.push_str(".0");
    }
    s
}

/// A factor of a printed product.
enum Factor {
    /// Printed as is.
    Plain(NodeRef),

    /// A power with a negative exponent, printed in the denominator with the exponent negated.
    Reciprocal(NodeRef),

    /// A numerator or denominator of the coefficient.
    Text(String),
}

impl Interpreter {
    /// Returns the infix text of an expression.
    pub fn display(&self, p: NodeRef) -> String {
        let mut out = String::new();
        // writing to a string cannot fail
        let _ = self.write_expr(&mut out, p);
        out
    }

    /// Returns the prefix text of an expression, showing its tree structure.
    pub fn prefix(&self, p: NodeRef) -> String {
        let mut out = String::new();
        let _ = self.write_prefix(&mut out, p);
        out
    }

    /// Pops an expression and pushes its infix text as a string.
    pub(crate) fn infixform(&mut self) -> Result<()> {
        let p = self.pop()?;
        let text = self.display(p);
        let p = self.string_node(&text)?;
        self.push(p)
    }

    /// Pops an expression and pushes its prefix text as a string.
    pub(crate) fn prefixform(&mut self) -> Result<()> {
        let p = self.pop()?;
        let text = self.prefix(p);
        let p = self.string_node(&text)?;
        self.push(p)
    }

    fn write_expr(&self, w: &mut impl Write, p: NodeRef) -> fmt::Result {
        if self.is_head(p, Keyword::Add) {
            for (i, term) in self.args(p).into_iter().enumerate() {
                let negative = self.is_negative_term(term);
                match (i, negative) {
                    (0, true) => w.write_char('-')?,
                    (0, false) => (),
                    (_, true) => w.write_str(" - ")?,
                    (_, false) => w.write_str(" + ")?,
                }
                self.write_term(w, term, negative)?;
            }
            return Ok(());
        }

        if self.is_negative_term(p) {
            w.write_char('-')?;
            return self.write_term(w, p, true);
        }
        self.write_term(w, p, false)
    }

    /// Writes a term of a sum. With `negate`, the absolute value of the coefficient is written.
    fn write_term(&self, w: &mut impl Write, p: NodeRef, negate: bool) -> fmt::Result {
        let (coeff, factors) = if self.is_head(p, Keyword::Multiply) || self.is_num(p) {
            self.split_term(p)
        } else {
            (self.consts.one, vec![p])
        };

        let mut numer = Vec::new();
        let mut denom = Vec::new();
        match self.node(coeff) {
            Node::Rational(r) => {
                let r = if negate { r.abs() } else { r.clone() };
                if !r.numer().is_one() || factors.is_empty() {
                    numer.push(Factor::Text(r.numer().to_string()));
                }
                if !r.denom().is_one() {
                    denom.push(Factor::Text(r.denom().to_string()));
                }
            },
            Node::Double(d) => {
                let d = if negate { d.abs() } else { *d };
                numer.push(Factor::Text(format_double(d)));
            },
            _ => (),
        }

        for factor in factors {
            if self.is_reciprocal(factor) {
                denom.push(Factor::Reciprocal(factor));
            } else {
                numer.push(Factor::Plain(factor));
            }
        }

        if numer.is_empty() {
            w.write_char('1')?;
        }
        self.write_factors(w, &numer)?;
        if denom.is_empty() {
            return Ok(());
        }

        w.write_char('/')?;
        let single = denom.len() == 1;
        if !single {
            w.write_char('(')?;
        }
        self.write_factors(w, &denom)?;
        if !single {
            w.write_char(')')?;
        }
        Ok(())
    }

    /// Returns `true` for a power with a negative numeric exponent that is not a power of minus
    /// one.
    fn is_reciprocal(&self, p: NodeRef) -> bool {
        self.is_head(p, Keyword::Power)
            && !self.is_minus_one(self.cadr(p))
            && self.is_negative_number(self.caddr(p))
    }

    fn write_factors(&self, w: &mut impl Write, factors: &[Factor]) -> fmt::Result {
        for (i, factor) in factors.iter().enumerate() {
            if i > 0 {
                w.write_char('*')?;
            }
            match factor {
                Factor::Plain(p) => self.write_factor(w, *p)?,
                Factor::Text(s) => w.write_str(s)?,
                Factor::Reciprocal(p) => {
                    let base = self.cadr(*p);
                    let expo = self.caddr(*p);
                    if self.is_minus_one(expo) {
                        self.write_factor(w, base)?;
                    } else {
                        self.write_base(w, base)?;
                        w.write_char('^')?;
                        match self.node(expo) {
                            Node::Rational(r) if r.abs().is_integer() => write!(w, "{}", r.abs())?,
                            Node::Rational(r) => write!(w, "({})", r.abs())?,
                            Node::Double(d) => write!(w, "{}", format_double(d.abs()))?,
                            _ => self.write_expr(w, expo)?,
                        }
                    }
                },
            }
        }
        Ok(())
    }

    fn write_factor(&self, w: &mut impl Write, p: NodeRef) -> fmt::Result {
        if self.is_head(p, Keyword::Add) || self.is_head(p, Keyword::Multiply) {
            w.write_char('(')?;
            self.write_expr(w, p)?;
            return w.write_char(')');
        }
        if self.is_head(p, Keyword::Power) {
            return self.write_power(w, p);
        }
        self.write_atom(w, p)
    }

    fn write_power(&self, w: &mut impl Write, p: NodeRef) -> fmt::Result {
        if self.is_imaginary_unit(p) {
            return w.write_char('i');
        }

        let base = self.cadr(p);
        let expo = self.caddr(p);
        if self.is_keyword(base, Keyword::Exp1) {
            w.write_str("exp(")?;
            self.write_expr(w, expo)?;
            return w.write_char(')');
        }

        self.write_base(w, base)?;
        w.write_char('^')?;
        let plain = (self.is_integer(expo) && !self.is_negative_number(expo))
            || self.is_symbol(expo)
            || self.is_keyword(expo, Keyword::Pi);
        if plain {
            self.write_atom(w, expo)
        } else {
            w.write_char('(')?;
            self.write_expr(w, expo)?;
            w.write_char(')')
        }
    }

    /// Writes the base of a power, in parentheses unless it is a symbol, a positive integer, a
    /// positive double or a function application.
    fn write_base(&self, w: &mut impl Write, p: NodeRef) -> fmt::Result {
        let plain = match self.node(p) {
            Node::Symbol(_) | Node::Keyword(_) | Node::Str(_) | Node::Tensor(_) => true,
            Node::Rational(r) => r.is_integer() && !r.is_negative(),
            Node::Double(d) => *d >= 0.0,
            Node::Cons { .. } => !matches!(
                self.head(p),
                Some(Keyword::Add | Keyword::Multiply | Keyword::Power | Keyword::Factorial)
            ),
            Node::Free => true,
        };
        if plain {
            self.write_atom(w, p)
        } else {
            w.write_char('(')?;
            self.write_expr(w, p)?;
            w.write_char(')')
        }
    }

    /// Writes numbers, names, strings, tensors and function applications.
    fn write_atom(&self, w: &mut impl Write, p: NodeRef) -> fmt::Result {
        match self.node(p) {
            Node::Rational(r) => write!(w, "{}", r),
            Node::Double(d) => w.write_str(&format_double(*d)),
            Node::Keyword(Keyword::Exp1) => w.write_str("exp(1)"),
            Node::Keyword(keyword) => w.write_str(keyword.name()),
            Node::Symbol(id) => w.write_str(self.symbols.name(*id)),
            Node::Str(s) => w.write_str(s),
            Node::Tensor(t) => self.write_tensor(w, &t.dims, &t.elems),
            Node::Cons { .. } => self.write_application(w, p),
            Node::Free => w.write_str("?"),
        }
    }

    fn write_tensor(&self, w: &mut impl Write, dims: &[usize], elems: &[NodeRef]) -> fmt::Result {
        w.write_char('(')?;
        let stride = elems.len() / dims[0].max(1);
        for i in 0..dims[0] {
            if i > 0 {
                w.write_char(',')?;
            }
            let chunk = &elems[i * stride..(i + 1) * stride];
            if dims.len() == 1 {
                self.write_expr(w, chunk[0])?;
            } else {
                self.write_tensor(w, &dims[1..], chunk)?;
            }
        }
        w.write_char(')')
    }

    fn write_application(&self, w: &mut impl Write, p: NodeRef) -> fmt::Result {
        let head = self.car(p);
        let args = self.args(p);
        match self.keyword_of(head) {
            Some(Keyword::Add | Keyword::Multiply) => {
                return self.write_expr(w, p);
            },
            Some(Keyword::Power) => return self.write_power(w, p),
            Some(Keyword::Index) if !args.is_empty() => {
                self.write_base(w, args[0])?;
                w.write_char('[')?;
                self.write_list(w, &args[1..])?;
                return w.write_char(']');
            },
            Some(Keyword::Factorial) if args.len() == 1 => {
                self.write_base(w, args[0])?;
                return w.write_char('!');
            },
            _ => (),
        }

        match self.name_of(head) {
            Some(name) => w.write_str(name)?,
            None => {
                w.write_char('(')?;
                self.write_expr(w, head)?;
                w.write_char(')')?;
            },
        }
        w.write_char('(')?;
        self.write_list(w, &args)?;
        w.write_char(')')
    }

    fn write_list(&self, w: &mut impl Write, items: &[NodeRef]) -> fmt::Result {
        for (i, &item) in items.iter().enumerate() {
            if i > 0 {
                w.write_char(',')?;
            }
            self.write_expr(w, item)?;
        }
        Ok(())
    }

    fn write_prefix(&self, w: &mut impl Write, p: NodeRef) -> fmt::Result {
        match self.node(p) {
            Node::Cons { .. } => {
                w.write_char('(')?;
                for (i, item) in self.items(p).into_iter().enumerate() {
                    if i > 0 {
                        w.write_char(' ')?;
                    }
                    self.write_prefix(w, item)?;
                }
                w.write_char(')')
            },
            Node::Keyword(keyword) => w.write_str(keyword.name()),
            Node::Str(s) => write!(w, "{:?}", s),
            Node::Tensor(t) => {
                w.write_str("(tensor")?;
                for &elem in &t.elems {
                    w.write_char(' ')?;
                    self.write_prefix(w, elem)?;
                }
                w.write_char(')')
            },
            _ => self.write_atom(w, p),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::Interpreter;
    use super::format_double;

    fn eval(source: &str) -> String {
        Interpreter::new().eval_str(source).unwrap()
    }

    #[test]
    fn doubles() {
        assert_eq!(format_double(2.0), "2.0");
        assert_eq!(format_double(0.75), "0.75");
        assert_eq!(format_double(-2.5), "-2.5");
        assert_eq!(format_double(3.14159265), "3.14159");
        assert_eq!(format_double(1.5e10), "1.5*10^10");
        assert_eq!(format_double(2e-7), "2.0*10^(-7)");
    }

    #[test]
    fn sums_and_products() {
        assert_eq!(eval("x^2 + 2*x + 1"), "x^2 + 2*x + 1");
        assert_eq!(eval("a - b"), "a - b");
        assert_eq!(eval("-a*b"), "-a*b");
        assert_eq!(eval("x/(2*y)"), "x/(2*y)");
        assert_eq!(eval("1/(x + 1)"), "1/(x + 1)");
        assert_eq!(eval("2/3*x"), "2*x/3");
    }

    #[test]
    fn special_forms() {
        assert_eq!(eval("sqrt(-1)"), "i");
        assert_eq!(eval("exp(x)"), "exp(x)");
        assert_eq!(eval("x^(1/2)"), "x^(1/2)");
        assert_eq!(eval("(1, 2)"), "(1,2)");
        assert_eq!(eval("((1, 2), (3, 4))"), "((1,2),(3,4))");
        assert_eq!(eval("f(x, y)"), "f(x,y)");
    }

    #[test]
    fn prefix_form() {
        let mut interp = Interpreter::new();
        assert_eq!(interp.eval_str("prefixform(x^2 + 1)").unwrap(), "(add (power x 2) 1)");
    }
}
