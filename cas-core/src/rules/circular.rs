//! Circular functions and their inverses.
//!
//! Exact values are found by normalizing the argument to a number of degrees. Multiples of 30
//! and 45 degrees have exact sines and cosines.

use crate::{
    error::Result,
    interp::Interpreter,
    keyword::Keyword,
    node::NodeRef,
};

/// The exact sines of the angles 0, 30, 45, 60 and 90 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Exact {
    Zero,
    Half,
    HalfSqrt2,
    HalfSqrt3,
    One,
}

/// Returns the exact sine of an angle in degrees, as a sign and a magnitude.
fn sin_degrees(n: i64) -> Option<(bool, Exact)> {
    let n = n.rem_euclid(360);
    let negative = n > 180;
    let mut m = n % 180;
    if m > 90 {
        m = 180 - m;
    }
    let exact = match m {
        0 => Exact::Zero,
        30 => Exact::Half,
        45 => Exact::HalfSqrt2,
        60 => Exact::HalfSqrt3,
        90 => Exact::One,
        _ => return None,
    };
    Some((negative && exact != Exact::Zero, exact))
}

/// Angles whose sines are tried by `arcsin`, in degrees.
const ARCSIN_ANGLES: [i64; 9] = [-90, -60, -45, -30, 0, 30, 45, 60, 90];

/// Angles whose cosines are tried by `arccos`, in degrees.
const ARCCOS_ANGLES: [i64; 9] = [0, 30, 45, 60, 90, 120, 135, 150, 180];

/// Angles whose tangents are tried by `arctan`, in degrees.
const ARCTAN_ANGLES: [i64; 7] = [-60, -45, -30, 0, 30, 45, 60];

impl Interpreter {
    /// Returns the node of an exact sine value.
    fn exact_node(&mut self, negative: bool, exact: Exact) -> Result<NodeRef> {
        let value = match exact {
            Exact::Zero => return Ok(self.consts.zero),
            Exact::One => self.consts.one,
            Exact::Half => self.fraction(1, 2)?,
            Exact::HalfSqrt2 | Exact::HalfSqrt3 => {
                let n = self.integer(if exact == Exact::HalfSqrt2 { 2 } else { 3 })?;
                let half = self.fraction(1, 2)?;
                let root = self.pow_nodes(n, half)?;
                self.mul_nodes(root, half)?
            },
        };
        if negative {
            self.neg_node(value)
        } else {
            Ok(value)
        }
    }

    /// Returns the angle `p` in whole degrees, if it is a rational multiple of pi that is.
    fn degrees(&mut self, p: NodeRef) -> Result<Option<i64>> {
        if !self.contains(p, self.keyword(Keyword::Pi)) && !self.is_zero(p) {
            return Ok(None);
        }
        let pi = self.keyword(Keyword::Pi);
        let k = self.div_nodes(p, pi)?;
        let Some(k) = self.rational(k) else {
            return Ok(None);
        };
        let deg = k.mul(&cas_num::Rational::from_i64(180));
        Ok(deg.is_integer().then(|| deg.to_i64()).flatten())
    }

    /// Returns the node of `n` degrees in radians.
    fn radians(&mut self, n: i64) -> Result<NodeRef> {
        let k = self.fraction(n, 180)?;
        let pi = self.keyword(Keyword::Pi);
        self.mul_nodes(k, pi)
    }

    /// Returns the coefficient `k` of a term `k*pi`.
    fn pi_coefficient(&self, p: NodeRef) -> Option<NodeRef> {
        if self.is_keyword(p, Keyword::Pi) {
            return Some(self.consts.one);
        }
        match self.args(p)[..] {
            [k, pi] if self.is_head(p, Keyword::Multiply)
                && self.is_rational(k)
                && self.is_keyword(pi, Keyword::Pi) => Some(k),
            _ => None,
        }
    }

    /// Splits a sum `a + n*pi/2` into `a` and `n mod 4`.
    fn split_quarter_turns(&mut self, p: NodeRef) -> Result<Option<(NodeRef, i64)>> {
        if !self.is_head(p, Keyword::Add) {
            return Ok(None);
        }
        let mut turns = cas_num::Rational::zero();
        let mut rest = Vec::new();
        for term in self.args(p) {
            match self.pi_coefficient(term).and_then(|k| self.rational(k).cloned()) {
                Some(k) => turns = turns.add(&k),
                None => rest.push(term),
            }
        }
        let halves = turns.mul(&cas_num::Rational::from_i64(2));
        if turns.is_zero() || !halves.is_integer() {
            return Ok(None);
        }
        let n = halves.rem(&cas_num::Rational::from_i64(4))?.to_i64().unwrap_or(0).rem_euclid(4);

        let n_rest = rest.len();
        for term in rest {
            self.push(term)?;
        }
        self.add_terms(n_rest)?;
        let rest = self.pop()?;
        Ok(Some((rest, n)))
    }

    /// Pops `x` and pushes `sin(x)`.
    pub(crate) fn sin(&mut self) -> Result<()> {
        self.unary_rules(Keyword::Sin, &[
            Self::sin_of_double,
            Self::sin_of_complex_double,
            Self::sin_of_negative,
            Self::sin_of_shifted,
            Self::sin_of_inverse,
            Self::sin_of_angle,
        ])
    }

    fn sin_of_double(&mut self, p: NodeRef) -> Result<Option<NodeRef>> {
        match self.double(p) {
            Some(d) => self.double_node(d.sin()).map(Some),
            None => Ok(None),
        }
    }

    /// `sin(a + b*i) = sin(a)*cosh(b) + i*cos(a)*sinh(b)`
    fn sin_of_complex_double(&mut self, p: NodeRef) -> Result<Option<NodeRef>> {
        let Some((a, b)) = self.complex_double_parts(p) else {
            return Ok(None);
        };
        self.complex_double(a.sin() * b.cosh(), a.cos() * b.sinh()).map(Some)
    }

    /// Returns the parts of a complex number with double parts.
    pub(crate) fn complex_double_parts(&self, p: NodeRef) -> Option<(f64, f64)> {
        let (re, im) = self.complex_parts(p)?;
        if !self.is_double(re) && !self.is_double(im) {
            return None;
        }
        Some((self.to_f64(re)?, self.to_f64(im)?))
    }

    /// `sin(-x) = -sin(x)`
    fn sin_of_negative(&mut self, p: NodeRef) -> Result<Option<NodeRef>> {
        if !self.is_negative(p) {
            return Ok(None);
        }
        let q = self.neg_node(p)?;
        let q = self.call1(Self::sin, q)?;
        self.neg_node(q).map(Some)
    }

    /// `sin(x + pi/2) = cos(x)`
    /// `sin(x + pi) = -sin(x)`
    /// `sin(x + 3*pi/2) = -cos(x)`
    fn sin_of_shifted(&mut self, p: NodeRef) -> Result<Option<NodeRef>> {
        let Some((rest, n)) = self.split_quarter_turns(p)? else {
            return Ok(None);
        };
        let q = match n {
            0 | 2 => self.call1(Self::sin, rest)?,
            _ => self.call1(Self::cos, rest)?,
        };
        if n >= 2 {
            self.neg_node(q).map(Some)
        } else {
            Ok(Some(q))
        }
    }

    /// `sin(arcsin(x)) = x`
    /// `sin(arccos(x)) = (1 - x^2)^(1/2)`
    /// `sin(arctan(x)) = x/(1 + x^2)^(1/2)`
    fn sin_of_inverse(&mut self, p: NodeRef) -> Result<Option<NodeRef>> {
        let x = self.cadr(p);
        match self.head(p) {
            Some(Keyword::Arcsin) if self.length(p) == 2 => Ok(Some(x)),
            Some(Keyword::Arccos) if self.length(p) == 2 => {
                let x2 = self.mul_nodes(x, x)?;
                let one = self.consts.one;
                let d = self.sub_nodes(one, x2)?;
                let half = self.fraction(1, 2)?;
                self.pow_nodes(d, half).map(Some)
            },
            Some(Keyword::Arctan) if self.length(p) == 2 => {
                let x2 = self.mul_nodes(x, x)?;
                let one = self.consts.one;
                let d = self.add_nodes(one, x2)?;
                let half = self.fraction(-1, 2)?;
                let d = self.pow_nodes(d, half)?;
                self.mul_nodes(x, d).map(Some)
            },
            _ => Ok(None),
        }
    }

    /// `sin(n*pi/6)` and `sin(n*pi/4)`
    fn sin_of_angle(&mut self, p: NodeRef) -> Result<Option<NodeRef>> {
        let Some((negative, exact)) = self.degrees(p)?.and_then(sin_degrees) else {
            return Ok(None);
        };
        self.exact_node(negative, exact).map(Some)
    }

    /// Pops `x` and pushes `cos(x)`.
    pub(crate) fn cos(&mut self) -> Result<()> {
        self.unary_rules(Keyword::Cos, &[
            Self::cos_of_double,
            Self::cos_of_complex_double,
            Self::cos_of_negative,
            Self::cos_of_shifted,
            Self::cos_of_inverse,
            Self::cos_of_angle,
        ])
    }

    fn cos_of_double(&mut self, p: NodeRef) -> Result<Option<NodeRef>> {
        match self.double(p) {
            Some(d) => self.double_node(d.cos()).map(Some),
            None => Ok(None),
        }
    }

    /// `cos(a + b*i) = cos(a)*cosh(b) - i*sin(a)*sinh(b)`
    fn cos_of_complex_double(&mut self, p: NodeRef) -> Result<Option<NodeRef>> {
        let Some((a, b)) = self.complex_double_parts(p) else {
            return Ok(None);
        };
        self.complex_double(a.cos() * b.cosh(), -a.sin() * b.sinh()).map(Some)
    }

    /// `cos(-x) = cos(x)`
    fn cos_of_negative(&mut self, p: NodeRef) -> Result<Option<NodeRef>> {
        if !self.is_negative(p) {
            return Ok(None);
        }
        let q = self.neg_node(p)?;
        self.call1(Self::cos, q).map(Some)
    }

    /// `cos(x + pi/2) = -sin(x)`
    /// `cos(x + pi) = -cos(x)`
    /// `cos(x + 3*pi/2) = sin(x)`
    fn cos_of_shifted(&mut self, p: NodeRef) -> Result<Option<NodeRef>> {
        let Some((rest, n)) = self.split_quarter_turns(p)? else {
            return Ok(None);
        };
        let q = match n {
            0 | 2 => self.call1(Self::cos, rest)?,
            _ => self.call1(Self::sin, rest)?,
        };
        if n == 1 || n == 2 {
            self.neg_node(q).map(Some)
        } else {
            Ok(Some(q))
        }
    }

    /// `cos(arccos(x)) = x`
    /// `cos(arcsin(x)) = (1 - x^2)^(1/2)`
    /// `cos(arctan(x)) = 1/(1 + x^2)^(1/2)`
    fn cos_of_inverse(&mut self, p: NodeRef) -> Result<Option<NodeRef>> {
        let x = self.cadr(p);
        match self.head(p) {
            Some(Keyword::Arccos) if self.length(p) == 2 => Ok(Some(x)),
            Some(Keyword::Arcsin) if self.length(p) == 2 => {
                let x2 = self.mul_nodes(x, x)?;
                let one = self.consts.one;
                let d = self.sub_nodes(one, x2)?;
                let half = self.fraction(1, 2)?;
                self.pow_nodes(d, half).map(Some)
            },
            Some(Keyword::Arctan) if self.length(p) == 2 => {
                let x2 = self.mul_nodes(x, x)?;
                let one = self.consts.one;
                let d = self.add_nodes(one, x2)?;
                let half = self.fraction(-1, 2)?;
                self.pow_nodes(d, half).map(Some)
            },
            _ => Ok(None),
        }
    }

    /// `cos(n*pi/6)` and `cos(n*pi/4)`
    fn cos_of_angle(&mut self, p: NodeRef) -> Result<Option<NodeRef>> {
        let Some((negative, exact)) = self.degrees(p)?.and_then(|n| sin_degrees(n + 90)) else {
            return Ok(None);
        };
        self.exact_node(negative, exact).map(Some)
    }

    /// Pops `x` and pushes `tan(x)`.
    pub(crate) fn tan(&mut self) -> Result<()> {
        self.unary_rules(Keyword::Tan, &[
            Self::tan_of_double,
            Self::tan_of_complex_double,
            Self::tan_of_negative,
            Self::tan_of_inverse,
            Self::tan_of_angle,
        ])
    }

    fn tan_of_double(&mut self, p: NodeRef) -> Result<Option<NodeRef>> {
        match self.double(p) {
            Some(d) => self.double_node(d.tan()).map(Some),
            None => Ok(None),
        }
    }

    /// `tan(z) = sin(z)/cos(z)` for complex doubles
    fn tan_of_complex_double(&mut self, p: NodeRef) -> Result<Option<NodeRef>> {
        if self.complex_double_parts(p).is_none() {
            return Ok(None);
        }
        let sin = self.call1(Self::sin, p)?;
        let cos = self.call1(Self::cos, p)?;
        self.div_nodes(sin, cos).map(Some)
    }

    /// `tan(-x) = -tan(x)`
    fn tan_of_negative(&mut self, p: NodeRef) -> Result<Option<NodeRef>> {
        if !self.is_negative(p) {
            return Ok(None);
        }
        let q = self.neg_node(p)?;
        let q = self.call1(Self::tan, q)?;
        self.neg_node(q).map(Some)
    }

    /// `tan(arctan(x)) = x`
    fn tan_of_inverse(&mut self, p: NodeRef) -> Result<Option<NodeRef>> {
        let single = self.is_head(p, Keyword::Arctan) && self.length(p) == 2;
        Ok(single.then(|| self.cadr(p)))
    }

    /// `tan(n*pi/6)` and `tan(n*pi/4)`, except where the cosine vanishes
    fn tan_of_angle(&mut self, p: NodeRef) -> Result<Option<NodeRef>> {
        let Some(n) = self.degrees(p)? else {
            return Ok(None);
        };
        let (Some((sin_neg, sin)), Some((cos_neg, cos))) = (sin_degrees(n), sin_degrees(n + 90)) else {
            return Ok(None);
        };
        if cos == Exact::Zero {
            return Ok(None);
        }
        let sin = self.exact_node(sin_neg, sin)?;
        let cos = self.exact_node(cos_neg, cos)?;
        self.div_nodes(sin, cos).map(Some)
    }

    /// Returns the angle among `angles` whose value under `f` equals `p`.
    fn inverse_lookup(
        &mut self,
        p: NodeRef,
        angles: &[i64],
        f: fn(&mut Self) -> Result<()>,
    ) -> Result<Option<NodeRef>> {
        if !self.is_num(p) && !self.is_head(p, Keyword::Power) && !self.is_head(p, Keyword::Multiply) {
            return Ok(None);
        }
        for &angle in angles {
            let radians = self.radians(angle)?;
            let value = self.call1(f, radians)?;
            if self.equal(value, p) {
                return Ok(Some(radians));
            }
        }
        Ok(None)
    }

    /// Pops `x` and pushes `arcsin(x)`.
    pub(crate) fn arcsin(&mut self) -> Result<()> {
        self.unary_rules(Keyword::Arcsin, &[
            Self::arcsin_of_double,
            Self::arcsin_of_negative,
            Self::arcsin_of_value,
        ])
    }

    fn arcsin_of_double(&mut self, p: NodeRef) -> Result<Option<NodeRef>> {
        match self.double(p) {
            Some(d) if (-1.0..=1.0).contains(&d) => self.double_node(d.asin()).map(Some),
            _ => Ok(None),
        }
    }

    /// `arcsin(-x) = -arcsin(x)`
    fn arcsin_of_negative(&mut self, p: NodeRef) -> Result<Option<NodeRef>> {
        if !self.is_negative(p) || self.is_num(p) {
            return Ok(None);
        }
        let q = self.neg_node(p)?;
        let q = self.call1(Self::arcsin, q)?;
        self.neg_node(q).map(Some)
    }

    fn arcsin_of_value(&mut self, p: NodeRef) -> Result<Option<NodeRef>> {
        self.inverse_lookup(p, &ARCSIN_ANGLES, Self::sin)
    }

    /// Pops `x` and pushes `arccos(x)`.
    pub(crate) fn arccos(&mut self) -> Result<()> {
        self.unary_rules(Keyword::Arccos, &[Self::arccos_of_double, Self::arccos_of_value])
    }

    fn arccos_of_double(&mut self, p: NodeRef) -> Result<Option<NodeRef>> {
        match self.double(p) {
            Some(d) if (-1.0..=1.0).contains(&d) => self.double_node(d.acos()).map(Some),
            _ => Ok(None),
        }
    }

    fn arccos_of_value(&mut self, p: NodeRef) -> Result<Option<NodeRef>> {
        self.inverse_lookup(p, &ARCCOS_ANGLES, Self::cos)
    }

    /// `arctan(x)` or `arctan(y, x)`.
    pub(crate) fn eval_arctan(&mut self, p1: NodeRef) -> Result<()> {
        let y = self.eval_arg(p1, 1)?;
        let q = if self.length(p1) > 2 {
            let x = self.eval_arg(p1, 2)?;
            self.arctan2(y, x)?
        } else {
            self.call1(Self::arctan, y)?
        };
        self.push(q)
    }

    /// Pops `x` and pushes `arctan(x)`.
    pub(crate) fn arctan(&mut self) -> Result<()> {
        self.unary_rules(Keyword::Arctan, &[
            Self::arctan_of_double,
            Self::arctan_of_negative,
            Self::arctan_of_value,
        ])
    }

    fn arctan_of_double(&mut self, p: NodeRef) -> Result<Option<NodeRef>> {
        match self.double(p) {
            Some(d) => self.double_node(d.atan()).map(Some),
            None => Ok(None),
        }
    }

    /// `arctan(-x) = -arctan(x)`
    fn arctan_of_negative(&mut self, p: NodeRef) -> Result<Option<NodeRef>> {
        if !self.is_negative(p) || self.is_num(p) {
            return Ok(None);
        }
        let q = self.neg_node(p)?;
        let q = self.call1(Self::arctan, q)?;
        self.neg_node(q).map(Some)
    }

    fn arctan_of_value(&mut self, p: NodeRef) -> Result<Option<NodeRef>> {
        self.inverse_lookup(p, &ARCTAN_ANGLES, Self::tan)
    }

    /// The angle of the point `(x, y)`, in `(-pi, pi]`.
    pub(crate) fn arctan2(&mut self, y: NodeRef, x: NodeRef) -> Result<NodeRef> {
        if self.is_num(x) && self.is_num(y) {
            if self.is_double(x) || self.is_double(y) {
                let (y, x) = (self.to_f64(y).unwrap_or(0.0), self.to_f64(x).unwrap_or(0.0));
                return self.double_node(y.atan2(x));
            }
            if self.is_zero(x) {
                let half_turn = match (self.is_positive_number(y), self.is_negative_number(y)) {
                    (true, _) => 90,
                    (_, true) => -90,
                    _ => 0,
                };
                return self.radians(half_turn);
            }
        }

        let ratio = self.div_nodes(y, x)?;
        let angle = self.call1(Self::arctan, ratio)?;
        if !self.is_negative_number(x) {
            return Ok(angle);
        }

        // the left half plane
        let pi = self.keyword(Keyword::Pi);
        if self.is_negative_number(y) {
            self.sub_nodes(angle, pi)
        } else {
            self.add_nodes(angle, pi)
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::Interpreter;

    fn eval(source: &str) -> String {
        Interpreter::new().eval_str(source).unwrap()
    }

    #[test]
    fn exact_values() {
        assert_eq!(eval("sin(0)"), "0");
        assert_eq!(eval("cos(pi)"), "-1");
        assert_eq!(eval("sin(pi/6)"), "1/2");
        assert_eq!(eval("cos(pi/3)"), "1/2");
        assert_eq!(eval("sin(5*pi/4) + 1/sqrt(2)"), "0");
        assert_eq!(eval("tan(pi/4)"), "1");
        assert_eq!(eval("tan(pi/6) - 1/sqrt(3)"), "0");
    }

    #[test]
    fn symmetry() {
        assert_eq!(eval("sin(-x)"), "-sin(x)");
        assert_eq!(eval("cos(-x)"), "cos(x)");
        assert_eq!(eval("sin(x + pi/2)"), "cos(x)");
        assert_eq!(eval("cos(x + pi)"), "-cos(x)");
    }

    #[test]
    fn inverses() {
        assert_eq!(eval("arcsin(1/2)"), "pi/6");
        assert_eq!(eval("arccos(-1)"), "pi");
        assert_eq!(eval("arctan(1)"), "pi/4");
        assert_eq!(eval("arctan(-1)"), "-pi/4");
        assert_eq!(eval("arctan(1, -1)"), "3*pi/4");
        assert_eq!(eval("sin(arcsin(x))"), "x");
        assert_eq!(eval("arcsin(x)"), "arcsin(x)");
    }

    #[test]
    fn doubles() {
        assert_eq!(eval("sin(1.0)"), "0.841471");
        assert_eq!(eval("cos(0.0)"), "1.0");
    }
}
