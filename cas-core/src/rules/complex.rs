//! Complex number functions.
//!
//! A complex expression carries its imaginary part in powers of minus one, the imaginary unit
//! being `(-1)^(1/2)`. Symbols are treated as real.

use crate::{
    error::Result,
    interp::Interpreter,
    keyword::Keyword,
    node::{Node, NodeRef},
};

impl Interpreter {
    /// Pops `z` and pushes its complex conjugate.
    pub(crate) fn conj(&mut self) -> Result<()> {
        let p = self.pop()?;
        let q = self.conjugate(p)?;
        let q = if q == p { q } else { self.eval_value(q)? };
        self.push(q)
    }

    /// Replaces every `(-1)^r` with `(-1)^(-r)`, without evaluating.
    fn conjugate(&mut self, p: NodeRef) -> Result<NodeRef> {
        if !self.contains_imaginary(p) {
            return Ok(p);
        }
        if self.is_imaginary_factor(p) {
            let r = self.caddr(p);
            let r = self.neg_node(r)?;
            let minus_one = self.consts.minus_one;
            return self.apply(Keyword::Power, &[minus_one, r]);
        }
        match self.node(p) {
            Node::Tensor(t) => {
                let (dims, elems) = (t.dims.clone(), t.elems.clone());
                let elems = elems.into_iter()
                    .map(|e| self.conjugate(e))
                    .collect::<Result<Vec<_>>>()?;
                self.tensor_node(dims, elems)
            },
            Node::Cons { .. } => {
                let items = self.items(p)
                    .into_iter()
                    .map(|item| self.conjugate(item))
                    .collect::<Result<Vec<_>>>()?;
                self.list(&items)
            },
            _ => Ok(p),
        }
    }

    /// Pops `z` and pushes its real part, `(z + conj(z))/2`.
    pub(crate) fn real(&mut self) -> Result<()> {
        let p = self.pop()?;
        let q = self.real_part(p)?;
        self.push(q)
    }

    pub(crate) fn real_part(&mut self, p: NodeRef) -> Result<NodeRef> {
        if !self.contains_imaginary(p) {
            return Ok(p);
        }
        let z = self.call1(Self::rect, p)?;
        let conj = self.call1(Self::conj, z)?;
        let sum = self.add_nodes(z, conj)?;
        let half = self.fraction(1, 2)?;
        self.mul_nodes(sum, half)
    }

    /// Pops `z` and pushes its imaginary part, `(z - conj(z))/(2i)`.
    pub(crate) fn imag(&mut self) -> Result<()> {
        let p = self.pop()?;
        let q = self.imag_part(p)?;
        self.push(q)
    }

    pub(crate) fn imag_part(&mut self, p: NodeRef) -> Result<NodeRef> {
        if !self.contains_imaginary(p) {
            return Ok(self.consts.zero);
        }
        let z = self.call1(Self::rect, p)?;
        let conj = self.call1(Self::conj, z)?;
        let diff = self.sub_nodes(z, conj)?;
        let two = self.integer(2)?;
        let i = self.consts.imaginary_unit;
        let two_i = self.mul_nodes(two, i)?;
        self.div_nodes(diff, two_i)
    }

    /// Pops `z` and pushes it in rectangular form `x + i*y`.
    pub(crate) fn rect(&mut self) -> Result<()> {
        let p = self.pop()?;
        let q = self.rectangular(p)?;
        self.push(q)
    }

    fn rectangular(&mut self, p: NodeRef) -> Result<NodeRef> {
        if self.is_head(p, Keyword::Add) || self.is_head(p, Keyword::Multiply) {
            let parts = self.args(p);
            let n = parts.len();
            for part in parts {
                let q = self.rectangular(part)?;
                self.push(q)?;
            }
            return self.with_expanding(true, |interp| {
                if interp.is_head(p, Keyword::Add) {
                    interp.add_terms(n)?;
                } else {
                    interp.multiply_factors(n)?;
                }
                interp.pop()
            });
        }

        // (-1)^r = cos(r*pi) + i*sin(r*pi)
        if self.is_imaginary_factor(p) && !self.is_imaginary_unit(p) {
            let r = self.caddr(p);
            let pi = self.keyword(Keyword::Pi);
            let angle = self.mul_nodes(r, pi)?;
            return self.cis(angle);
        }

        // exp(x + i*y) = exp(x)*(cos(y) + i*sin(y))
        if self.is_head(p, Keyword::Power)
            && self.is_keyword(self.cadr(p), Keyword::Exp1)
            && self.contains_imaginary(self.caddr(p))
        {
            let expo = self.caddr(p);
            let x = self.real_part(expo)?;
            let y = self.imag_part(expo)?;
            let exp1 = self.keyword(Keyword::Exp1);
            let scale = self.pow_nodes(exp1, x)?;
            let cis = self.cis(y)?;
            return self.with_expanding(true, |interp| interp.mul_nodes(scale, cis));
        }

        Ok(p)
    }

    /// `cis(y) = cos(y) + i*sin(y)`
    fn cis(&mut self, angle: NodeRef) -> Result<NodeRef> {
        let cos = self.call1(Self::cos, angle)?;
        let sin = self.call1(Self::sin, angle)?;
        let i = self.consts.imaginary_unit;
        let sin = self.mul_nodes(sin, i)?;
        self.add_nodes(cos, sin)
    }

    /// Pops `z` and pushes its magnitude.
    pub(crate) fn mag(&mut self) -> Result<()> {
        self.unary_rules(Keyword::Mag, &[Self::mag_of])
    }

    fn mag_of(&mut self, p: NodeRef) -> Result<Option<NodeRef>> {
        if self.is_num(p) {
            return self.call1(Self::abs, p).map(Some);
        }

        // mag((-1)^r) = 1
        if self.is_imaginary_factor(p) {
            return Ok(Some(self.consts.one));
        }

        // mag(exp(z)) = exp(real(z))
        if self.is_head(p, Keyword::Power) && self.is_keyword(self.cadr(p), Keyword::Exp1) {
            let expo = self.caddr(p);
            let x = self.real_part(expo)?;
            let exp1 = self.cadr(p);
            return self.pow_nodes(exp1, x).map(Some);
        }

        // mag(a*b) = mag(a)*mag(b)
        if self.is_head(p, Keyword::Multiply) {
            let factors = self.args(p);
            let n = factors.len();
            for factor in factors {
                self.push(factor)?;
                self.mag()?;
            }
            self.multiply_factors(n)?;
            return self.pop().map(Some);
        }

        // mag(x + i*y) = (x^2 + y^2)^(1/2)
        if self.is_head(p, Keyword::Add) && self.contains_imaginary(p) {
            let x = self.real_part(p)?;
            let y = self.imag_part(p)?;
            let x2 = self.mul_nodes(x, x)?;
            let y2 = self.mul_nodes(y, y)?;
            let sum = self.add_nodes(x2, y2)?;
            let half = self.fraction(1, 2)?;
            return self.pow_nodes(sum, half).map(Some);
        }

        // real expressions are their own magnitude
        Ok(Some(p))
    }

    /// Pops `z` and pushes its argument, the angle of `z` in the complex plane.
    pub(crate) fn arg(&mut self) -> Result<()> {
        self.unary_rules(Keyword::Arg, &[Self::arg_of])
    }

    fn arg_of(&mut self, p: NodeRef) -> Result<Option<NodeRef>> {
        if let Some(d) = self.double(p) {
            let angle = if d < 0.0 { std::f64::consts::PI } else { 0.0 };
            return self.double_node(angle).map(Some);
        }
        if self.is_num(p) {
            return if self.is_negative_number(p) {
                Ok(Some(self.keyword(Keyword::Pi)))
            } else {
                Ok(Some(self.consts.zero))
            };
        }

        // arg((-1)^r) = r*pi
        if self.is_imaginary_factor(p) {
            let r = self.caddr(p);
            let pi = self.keyword(Keyword::Pi);
            return self.mul_nodes(r, pi).map(Some);
        }

        // arg(exp(z)) = imag(z)
        if self.is_head(p, Keyword::Power) && self.is_keyword(self.cadr(p), Keyword::Exp1) {
            let expo = self.caddr(p);
            return self.imag_part(expo).map(Some);
        }

        // arg(a*b) = arg(a) + arg(b)
        if self.is_head(p, Keyword::Multiply) {
            let factors = self.args(p);
            let n = factors.len();
            for factor in factors {
                self.push(factor)?;
                self.arg()?;
            }
            self.add_terms(n)?;
            return self.pop().map(Some);
        }

        // arg(x + i*y) = arctan(y, x)
        if self.is_head(p, Keyword::Add) && self.contains_imaginary(p) {
            let x = self.real_part(p)?;
            let y = self.imag_part(p)?;
            return self.arctan2(y, x).map(Some);
        }

        Ok(Some(self.consts.zero))
    }

    /// Pops `z` and pushes it in polar form `mag(z)*exp(i*arg(z))`.
    pub(crate) fn polar(&mut self) -> Result<()> {
        let p = self.pop()?;
        let mag = self.call1(Self::mag, p)?;
        let arg = self.call1(Self::arg, p)?;
        if self.is_zero(arg) {
            return self.push(mag);
        }
        let i = self.consts.imaginary_unit;
        let expo = self.mul_nodes(arg, i)?;
        // kept as an exponential, evaluating it would give back the clock form
        let exp1 = self.keyword(Keyword::Exp1);
        let phase = self.apply(Keyword::Power, &[exp1, expo])?;
        let q = self.mul_nodes(mag, phase)?;
        self.push(q)
    }

    /// Pops `z` and pushes it in clock form `mag(z)*(-1)^(arg(z)/pi)`.
    pub(crate) fn clock(&mut self) -> Result<()> {
        let p = self.pop()?;
        let mag = self.call1(Self::mag, p)?;
        let arg = self.call1(Self::arg, p)?;
        let pi = self.keyword(Keyword::Pi);
        let turns = self.div_nodes(arg, pi)?;
        let minus_one = self.consts.minus_one;
        let phase = self.pow_nodes(minus_one, turns)?;
        let q = self.mul_nodes(mag, phase)?;
        self.push(q)
    }
}

#[cfg(test)]
mod tests {
    use crate::Interpreter;

    fn eval(source: &str) -> String {
        Interpreter::new().eval_str(source).unwrap()
    }

    #[test]
    fn conjugate() {
        assert_eq!(eval("conj(2 + 3*i)"), "2 - 3*i");
        assert_eq!(eval("conj(x)"), "x");
        assert_eq!(eval("z = 1 + i\nz*conj(z)"), "2");
    }

    #[test]
    fn parts() {
        assert_eq!(eval("real(2 + 3*i)"), "2");
        assert_eq!(eval("imag(2 + 3*i)"), "3");
        assert_eq!(eval("imag(x + i*y)"), "y");
        assert_eq!(eval("real(5)"), "5");
        assert_eq!(eval("real(1 + i)"), "1");
        assert_eq!(eval("imag(1 + i)"), "1");
        assert_eq!(eval("imag(1/i)"), "-1");
    }

    #[test]
    fn magnitude_and_argument() {
        assert_eq!(eval("mag(3 + 4*i)"), "5");
        assert_eq!(eval("mag(-2)"), "2");
        assert_eq!(eval("arg(i)"), "pi/2");
        assert_eq!(eval("arg(-1)"), "pi");
        assert_eq!(eval("arg(1 + i)"), "pi/4");
        assert_eq!(eval("arg(1 + 2*i)"), "arctan(2)");
    }

    #[test]
    fn forms() {
        assert_eq!(eval("rect((-1)^(1/3))"), "1/2 + 3^(1/2)*i/2");
        assert_eq!(eval("polar(2*i)"), "2*exp(i*pi/2)");
        assert_eq!(eval("clock(1 + i)"), "2^(1/2)*(-1)^(1/4)");
    }
}
