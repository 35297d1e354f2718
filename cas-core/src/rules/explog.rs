//! Exponentials, logarithms, square roots and the error function.

use crate::{
    error::{kind, Error, Result},
    interp::Interpreter,
    keyword::Keyword,
    node::NodeRef,
};

/// Below this magnitude `erf` sums its Taylor series, above it `erfc` uses a continued fraction.
const ERF_SERIES_LIMIT: f64 = 2.5;

/// `erf(x)` for doubles.
fn erf(x: f64) -> f64 {
    if x.abs() < ERF_SERIES_LIMIT {
        // 2/sqrt(pi) * sum (-1)^n x^(2n+1) / (n! (2n+1))
        let mut term = x;
        let mut sum = x;
        let x2 = x * x;
        for n in 1..100 {
            term *= -x2 / n as f64;
            let next = term / (2 * n + 1) as f64;
            sum += next;
            if next.abs() < 1e-17 * sum.abs() {
                break;
            }
        }
        2.0 / std::f64::consts::PI.sqrt() * sum
    } else {
        x.signum() * (1.0 - erfc(x.abs()))
    }
}

/// `erfc(x)` for doubles.
fn erfc(x: f64) -> f64 {
    if x < ERF_SERIES_LIMIT {
        return 1.0 - erf(x);
    }
    // exp(-x^2)/sqrt(pi) / (x + (1/2)/(x + 1/(x + (3/2)/(x + ...))))
    let mut t = x;
    for n in (1..=60).rev() {
        t = x + (n as f64 / 2.0) / t;
    }
    (-x * x).exp() / std::f64::consts::PI.sqrt() / t
}

impl Interpreter {
    /// Pops `x` and pushes `exp(x)`.
    pub(crate) fn exp(&mut self) -> Result<()> {
        let x = self.pop()?;
        let exp1 = self.keyword(Keyword::Exp1);
        self.push(exp1)?;
        self.push(x)?;
        self.power()
    }

    /// Pops `x` and pushes `x^(1/2)`.
    pub(crate) fn sqrt(&mut self) -> Result<()> {
        let half = self.fraction(1, 2)?;
        self.push(half)?;
        self.power()
    }

    /// Pops `x` and pushes its natural logarithm.
    pub(crate) fn log(&mut self) -> Result<()> {
        self.unary_rules(Keyword::Log, &[
            Self::log_of_zero,
            Self::log_of_double,
            Self::log_of_complex_double,
            Self::log_of_one,
            Self::log_of_exp,
            Self::log_of_negative,
            Self::log_of_fraction,
            Self::log_of_power,
            Self::log_of_product,
        ])
    }

    /// `log(0)` is undefined
    fn log_of_zero(&mut self, p: NodeRef) -> Result<Option<NodeRef>> {
        if self.is_zero(p) {
            return Err(Error::new(kind::LogOfZero));
        }
        Ok(None)
    }

    /// `log(-x) = log(x) + i*pi` for doubles
    fn log_of_double(&mut self, p: NodeRef) -> Result<Option<NodeRef>> {
        let Some(d) = self.double(p) else {
            return Ok(None);
        };
        if d > 0.0 {
            return self.double_node(d.ln()).map(Some);
        }
        self.complex_double(d.abs().ln(), std::f64::consts::PI).map(Some)
    }

    /// `log(z) = log(|z|) + i*arg(z)` for complex doubles
    fn log_of_complex_double(&mut self, p: NodeRef) -> Result<Option<NodeRef>> {
        let Some((a, b)) = self.complex_double_parts(p) else {
            return Ok(None);
        };
        self.complex_double(a.hypot(b).ln(), b.atan2(a)).map(Some)
    }

    /// `log(1) = 0`
    fn log_of_one(&mut self, p: NodeRef) -> Result<Option<NodeRef>> {
        Ok(self.is_one(p).then_some(self.consts.zero))
    }

    /// `log(e) = 1`
    /// `log(e^y) = y`
    fn log_of_exp(&mut self, p: NodeRef) -> Result<Option<NodeRef>> {
        if self.is_keyword(p, Keyword::Exp1) {
            return Ok(Some(self.consts.one));
        }
        if self.is_head(p, Keyword::Power) && self.is_keyword(self.cadr(p), Keyword::Exp1) {
            return Ok(Some(self.caddr(p)));
        }
        Ok(None)
    }

    /// `log(-x) = log(x) + i*pi` for rationals
    fn log_of_negative(&mut self, p: NodeRef) -> Result<Option<NodeRef>> {
        if !self.is_negative_number(p) {
            return Ok(None);
        }
        let q = self.neg_node(p)?;
        let log = self.call1(Self::log, q)?;
        let i = self.consts.imaginary_unit;
        let pi = self.keyword(Keyword::Pi);
        let i_pi = self.mul_nodes(i, pi)?;
        self.add_nodes(log, i_pi).map(Some)
    }

    /// `log(a/b) = log(a) - log(b)`
    fn log_of_fraction(&mut self, p: NodeRef) -> Result<Option<NodeRef>> {
        if !self.is_fraction(p) {
            return Ok(None);
        }
        let r = self.rational_value(p);
        let num = self.rational_node(r.numerator())?;
        let den = self.rational_node(r.denominator())?;
        let num = self.call1(Self::log, num)?;
        let den = self.call1(Self::log, den)?;
        self.sub_nodes(num, den).map(Some)
    }

    /// `log(a^b) = b*log(a)`
    fn log_of_power(&mut self, p: NodeRef) -> Result<Option<NodeRef>> {
        if !self.is_head(p, Keyword::Power) {
            return Ok(None);
        }
        let base = self.cadr(p);
        let expo = self.caddr(p);
        // log((-1)^r) = r*i*pi, the principal value
        if self.is_minus_one(base) {
            let i = self.consts.imaginary_unit;
            let pi = self.keyword(Keyword::Pi);
            let i_pi = self.mul_nodes(i, pi)?;
            return self.mul_nodes(expo, i_pi).map(Some);
        }
        let log = self.call1(Self::log, base)?;
        self.mul_nodes(expo, log).map(Some)
    }

    /// `log(a*b) = log(a) + log(b)`
    fn log_of_product(&mut self, p: NodeRef) -> Result<Option<NodeRef>> {
        if !self.is_head(p, Keyword::Multiply) {
            return Ok(None);
        }
        let factors = self.args(p);
        let n = factors.len();
        for factor in factors {
            self.push(factor)?;
            self.log()?;
        }
        self.add_terms(n)?;
        self.pop().map(Some)
    }

    /// Pops `x` and pushes `erf(x)`.
    pub(crate) fn erf(&mut self) -> Result<()> {
        self.unary_rules(Keyword::Erf, &[
            |interp, p| match interp.double(p) {
                Some(d) => interp.double_node(erf(d)).map(Some),
                None => Ok(None),
            },
            |interp, p| Ok(interp.is_zero(p).then_some(interp.consts.zero)),
            // erf(-x) = -erf(x)
            |interp, p| {
                if !interp.is_negative(p) {
                    return Ok(None);
                }
                let q = interp.neg_node(p)?;
                let q = interp.call1(Self::erf, q)?;
                interp.neg_node(q).map(Some)
            },
        ])
    }

    /// Pops `x` and pushes `erfc(x) = 1 - erf(x)`.
    pub(crate) fn erfc(&mut self) -> Result<()> {
        self.unary_rules(Keyword::Erfc, &[
            |interp, p| match interp.double(p) {
                Some(d) => interp.double_node(erfc(d)).map(Some),
                None => Ok(None),
            },
            |interp, p| Ok(interp.is_zero(p).then_some(interp.consts.one)),
        ])
    }
}

#[cfg(test)]
mod tests {
    use assert_float_eq::assert_float_relative_eq;
    use crate::{error::kind, Interpreter};
    use super::{erf, erfc};

    fn eval(source: &str) -> String {
        Interpreter::new().eval_str(source).unwrap()
    }

    #[test]
    fn logarithms() {
        assert_eq!(eval("log(1)"), "0");
        assert_eq!(eval("log(exp(1))"), "1");
        assert_eq!(eval("log(exp(x))"), "x");
        assert_eq!(eval("log(x^3)"), "3*log(x)");
        assert_eq!(eval("log(x*y)"), "log(x) + log(y)");
        assert_eq!(eval("log(1/2)"), "-log(2)");
        assert_eq!(eval("log(-1)"), "i*pi");
    }

    #[test]
    fn log_of_zero_fails() {
        let err = Interpreter::new().eval_str("log(0)").unwrap_err();
        assert!(err.is::<kind::LogOfZero>());
    }

    #[test]
    fn exponentials_and_roots() {
        assert_eq!(eval("exp(0)"), "1");
        assert_eq!(eval("exp(2)*exp(3)"), "exp(5)");
        assert_eq!(eval("sqrt(16)"), "4");
        assert_eq!(eval("sqrt(x^2)"), "(x^2)^(1/2)");
    }

    #[test]
    fn error_function() {
        assert_eq!(eval("erf(0)"), "0");
        assert_eq!(eval("erf(-x)"), "-erf(x)");
        assert_float_relative_eq!(erf(0.5), 0.520_499_877_813_046_5, 1e-12);
        assert_float_relative_eq!(erfc(3.0), 2.209_049_699_858_544e-5, 1e-9);
        assert_float_relative_eq!(erf(1.0) + erfc(1.0), 1.0, 1e-15);
    }
}
