//! Polynomials in one variable: coefficients, degree, exact and numerical roots, and greatest
//! common divisors.

use cas_num::Rational;
use crate::{
    error::{kind, Error, Result},
    interp::Interpreter,
    keyword::Keyword,
    node::NodeRef,
};
use std::ops::{Add, Div, Mul, Sub};

/// Terms of higher degree are not treated as polynomial.
const MAX_DEGREE: usize = 10_000;

/// The largest constant or leading coefficient whose divisors are tried as rational roots.
const MAX_DIVISOR_SEARCH: u64 = 1_000_000;

/// Sweeps of the Durand-Kerner iteration before giving up.
const MAX_ITERATIONS: usize = 1_000;

/// Residual, relative to the size of the terms, below which a numerical root is accepted.
const TOLERANCE: f64 = 1e-12;

/// Real or imaginary parts smaller than this, relative to the root, are dropped.
const NEGLIGIBLE: f64 = 1e-10;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Complex {
    re: f64,
    im: f64,
}

impl Complex {
    const ZERO: Self = Self { re: 0.0, im: 0.0 };
    const ONE: Self = Self { re: 1.0, im: 0.0 };

    fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }

    fn norm(self) -> f64 {
        self.re.hypot(self.im)
    }
}

impl Add for Complex {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.re + rhs.re, self.im + rhs.im)
    }
}

impl Sub for Complex {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.re - rhs.re, self.im - rhs.im)
    }
}

impl Mul for Complex {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.re * rhs.re - self.im * rhs.im,
            self.re * rhs.im + self.im * rhs.re,
        )
    }
}

impl Div for Complex {
    type Output = Self;

    fn div(self, rhs: Self) -> Self {
        let d = rhs.re * rhs.re + rhs.im * rhs.im;
        Self::new(
            (self.re * rhs.re + self.im * rhs.im) / d,
            (self.im * rhs.re - self.re * rhs.im) / d,
        )
    }
}

/// Evaluates the polynomial with coefficients `coeffs`, lowest degree first, at `z`.
fn horner(coeffs: &[Rational], z: &Rational) -> Rational {
    coeffs.iter().rev().fold(Rational::zero(), |acc, c| acc.mul(z).add(c))
}

/// Divides the polynomial by `(x - r)`, for a root `r`.
fn deflate(coeffs: &[Rational], r: &Rational) -> Vec<Rational> {
    let n = coeffs.len() - 1;
    let mut quotient = vec![Rational::zero(); n];
    let mut carry = Rational::zero();
    for k in (1..=n).rev() {
        carry = carry.mul(r).add(&coeffs[k]);
        quotient[k - 1] = carry.clone();
    }
    quotient
}

/// Drops leading zero coefficients.
fn trim(coeffs: &mut Vec<Rational>) {
    while coeffs.last().is_some_and(Rational::is_zero) {
        coeffs.pop();
    }
}

/// Returns the remainder of `a` divided by `b`, whose leading coefficient is not zero.
fn remainder(a: &[Rational], b: &[Rational]) -> Result<Vec<Rational>> {
    let mut r = a.to_vec();
    trim(&mut r);
    let Some(lead) = b.last() else {
        return Err(Error::new(kind::DivideByZero));
    };
    while r.len() >= b.len() {
        let Some(top) = r.last() else { break };
        let q = top.div(lead)?;
        let shift = r.len() - b.len();
        for (i, c) in b.iter().enumerate() {
            r[shift + i] = r[shift + i].sub(&q.mul(c));
        }
        r.pop();
        trim(&mut r);
    }
    Ok(r)
}

/// Returns the greatest common divisor of the coefficients.
fn content(coeffs: &[Rational]) -> Rational {
    coeffs.iter().fold(Rational::zero(), |g, c| g.gcd(c))
}

/// Returns the positive divisors of the integer `n` in increasing order, or `None` if there are
/// too many to search.
fn divisors(n: &Rational) -> Option<Vec<i64>> {
    let n = n.to_i64()?.unsigned_abs();
    if n == 0 || n > MAX_DIVISOR_SEARCH {
        return None;
    }
    let mut small = Vec::new();
    let mut large = Vec::new();
    let mut d = 1;
    while d * d <= n {
        if n % d == 0 {
            small.push(d as i64);
            if d * d != n {
                large.push((n / d) as i64);
            }
        }
        d += 1;
    }
    small.extend(large.into_iter().rev());
    Some(small)
}

/// Finds a rational root `p/q` of a polynomial with a non-zero constant term, where `p` divides
/// the constant term and `q` the leading coefficient once both are scaled to integers.
fn rational_root(coeffs: &[Rational]) -> Result<Option<Rational>> {
    let mut lcm = Rational::one();
    for c in coeffs {
        let d = c.denominator();
        let g = lcm.gcd(&d);
        lcm = lcm.mul(&d).div(&g)?;
    }
    let (Some(first), Some(last)) = (coeffs.first(), coeffs.last()) else {
        return Ok(None);
    };
    let (Some(ps), Some(qs)) = (divisors(&first.mul(&lcm)), divisors(&last.mul(&lcm))) else {
        return Ok(None);
    };

    for &q in &qs {
        for &p in &ps {
            for candidate in [-p, p] {
                let r = Rational::new_i64(candidate, q)?;
                if horner(coeffs, &r).is_zero() {
                    return Ok(Some(r));
                }
            }
        }
    }
    Ok(None)
}

fn not_a_polynomial(function: &'static str) -> Error {
    Error::new(kind::InvalidArgument {
        function,
        expected: "a polynomial of degree one or more",
    })
}

impl Interpreter {
    /// Returns the coefficients of `p` as a polynomial in `x`, lowest degree first, or `None` if
    /// `p` is not a polynomial in `x`. Leading zero coefficients are dropped, but at least one
    /// coefficient is always returned.
    pub(crate) fn coefficients(&mut self, p: NodeRef, x: NodeRef) -> Result<Option<Vec<NodeRef>>> {
        let terms = if self.is_head(p, Keyword::Add) { self.args(p) } else { vec![p] };
        let zero = self.consts.zero;
        let mut coeffs = vec![zero];
        for term in terms {
            let Some((k, c)) = self.monomial(term, x)? else {
                return Ok(None);
            };
            if coeffs.len() <= k {
                coeffs.resize(k + 1, zero);
            }
            coeffs[k] = self.add_nodes(coeffs[k], c)?;
        }
        while coeffs.len() > 1 && coeffs.last().is_some_and(|&c| self.is_zero(c)) {
            coeffs.pop();
        }
        Ok(Some(coeffs))
    }

    /// Splits a term into its degree in `x` and its coefficient.
    fn monomial(&mut self, term: NodeRef, x: NodeRef) -> Result<Option<(usize, NodeRef)>> {
        let factors = if self.is_head(term, Keyword::Multiply) { self.args(term) } else { vec![term] };
        let mut degree = 0;
        let mut rest = Vec::with_capacity(factors.len());
        for factor in factors {
            if self.equal(factor, x) {
                degree += 1;
            } else if self.is_head(factor, Keyword::Power) && self.equal(self.cadr(factor), x) {
                match self.small_integer(self.caddr(factor)) {
                    Some(n) if n > 0 => degree += n as usize,
                    _ => return Ok(None),
                }
            } else if self.contains(factor, x) {
                return Ok(None);
            } else {
                rest.push(factor);
            }
        }
        if degree > MAX_DEGREE {
            return Ok(None);
        }

        let n = rest.len();
        for factor in rest {
            self.push(factor)?;
        }
        self.multiply_factors(n)?;
        let coeff = self.pop()?;
        Ok(Some((degree, coeff)))
    }

    /// Evaluates the polynomial and the optional variable of `(function p x ...)`.
    fn polynomial_args(&mut self, p1: NodeRef, function: &'static str) -> Result<(Vec<NodeRef>, NodeRef)> {
        let p = self.eval_arg(p1, 1)?;
        let x = if self.length(p1) > 2 { self.eval_arg(p1, 2)? } else { self.consts.x };
        self.expect_symbol(x, function)?;
        let coeffs = self.coefficients(p, x)?
            .ok_or_else(|| Error::new(kind::InvalidArgument { function, expected: "a polynomial" }))?;
        Ok((coeffs, x))
    }

    /// `coeff(p, x, n)`, the coefficient of `x^n` in `p`. `coeff(p, n)` takes the coefficient of
    /// `x^n`.
    pub(crate) fn eval_coeff(&mut self, p1: NodeRef) -> Result<()> {
        let (p, x, n) = match self.args(p1)[..] {
            [p, x, n] => (p, self.eval_value(x)?, n),
            [p, n] => (p, self.consts.x, n),
            _ => return Err(Error::new(kind::InvalidArgument {
                function: "coeff",
                expected: "a polynomial, a variable and a power",
            })),
        };
        let p = self.eval_value(p)?;
        self.expect_symbol(x, "coeff")?;
        let n = self.eval_value(n)?;
        let n = match self.small_integer(n) {
            Some(n) if n >= 0 => n as usize,
            _ => return Err(Error::new(kind::InvalidArgument {
                function: "coeff",
                expected: "a non-negative integer power",
            })),
        };

        let coeffs = self.coefficients(p, x)?
            .ok_or_else(|| Error::new(kind::InvalidArgument { function: "coeff", expected: "a polynomial" }))?;
        let c = coeffs.get(n).copied().unwrap_or(self.consts.zero);
        self.push(c)
    }

    /// `deg(p, x)`, the degree of `p` in `x`.
    pub(crate) fn eval_deg(&mut self, p1: NodeRef) -> Result<()> {
        let (coeffs, _) = self.polynomial_args(p1, "deg")?;
        self.push_integer(coeffs.len() as i64 - 1)
    }

    /// `roots(p, x)`, the exact roots of `p` in `x`.
    ///
    /// Zero roots are factored out first. Rational roots are divided out of polynomials with
    /// rational coefficients until the degree is at most two, and what remains is solved by the
    /// linear or quadratic formula.
    pub(crate) fn eval_roots(&mut self, p1: NodeRef) -> Result<()> {
        let (mut coeffs, _) = self.polynomial_args(p1, "roots")?;
        if coeffs.len() < 2 {
            return Err(not_a_polynomial("roots"));
        }

        let mut roots = Vec::new();
        while self.is_zero(coeffs[0]) {
            roots.push(self.consts.zero);
            coeffs.remove(0);
        }

        if coeffs.len() > 3 {
            let Some(mut exact) = coeffs.iter()
                .map(|&c| self.rational(c).cloned())
                .collect::<Option<Vec<_>>>()
            else {
                log::debug!("no closed form for the roots of a polynomial of degree {}", coeffs.len() - 1);
                return Err(Error::new(kind::RootsNotFound));
            };
            while exact.len() > 3 {
                self.check_interrupt()?;
                let Some(r) = rational_root(&exact)? else {
                    log::debug!("no rational root of a polynomial of degree {}", exact.len() - 1);
                    return Err(Error::new(kind::RootsNotFound));
                };
                exact = deflate(&exact, &r);
                roots.push(self.rational_node(r)?);
            }
            coeffs = exact.into_iter()
                .map(|c| self.rational_node(c))
                .collect::<Result<_>>()?;
        }

        match coeffs[..] {
            [c, b, a] => roots.extend(self.quadratic_roots(a, b, c)?),
            [c, b] => {
                let q = self.div_nodes(c, b)?;
                roots.push(self.neg_node(q)?);
            },
            _ => {},
        }

        let q = self.root_list(roots)?;
        self.push(q)
    }

    /// The roots of `a*x^2 + b*x + c`.
    fn quadratic_roots(&mut self, a: NodeRef, b: NodeRef, c: NodeRef) -> Result<Vec<NodeRef>> {
        let b2 = self.mul_nodes(b, b)?;
        let four = self.integer(4)?;
        let ac = self.mul_nodes(a, c)?;
        let ac = self.mul_nodes(four, ac)?;
        let discriminant = self.sub_nodes(b2, ac)?;

        let minus_b = self.neg_node(b)?;
        let two = self.integer(2)?;
        let two_a = self.mul_nodes(two, a)?;
        if self.is_zero(discriminant) {
            return Ok(vec![self.div_nodes(minus_b, two_a)?]);
        }

        let root = self.call1(Self::sqrt, discriminant)?;
        let plus = self.add_nodes(minus_b, root)?;
        let minus = self.sub_nodes(minus_b, root)?;
        Ok(vec![self.div_nodes(plus, two_a)?, self.div_nodes(minus, two_a)?])
    }

    /// Sorts the roots and drops repeated ones. A single root is returned on its own, several
    /// as a vector.
    fn root_list(&mut self, mut roots: Vec<NodeRef>) -> Result<NodeRef> {
        roots.sort_by(|&a, &b| self.compare(a, b));
        roots.dedup_by(|a, b| self.equal(*a, *b));
        match roots[..] {
            [root] => Ok(root),
            _ => {
                let n = roots.len();
                self.tensor_node(vec![n], roots)
            },
        }
    }

    /// `nroots(p, x)`, the roots of `p` in `x` as floating point numbers.
    pub(crate) fn eval_nroots(&mut self, p1: NodeRef) -> Result<()> {
        let (coeffs, _) = self.polynomial_args(p1, "nroots")?;
        if coeffs.len() < 2 {
            return Err(not_a_polynomial("nroots"));
        }

        let mut numeric = Vec::with_capacity(coeffs.len());
        for c in coeffs {
            let f = self.call1(Self::float, c)?;
            let z = match (self.double(f), self.complex_double_parts(f)) {
                (Some(re), _) => Complex::new(re, 0.0),
                (None, Some((re, im))) => Complex::new(re, im),
                (None, None) => return Err(Error::new(kind::InvalidArgument {
                    function: "nroots",
                    expected: "a polynomial with numerical coefficients",
                })),
            };
            numeric.push(z);
        }

        let mut zs = self.durand_kerner(&numeric)?;
        for z in &mut zs {
            let scale = z.norm().max(1.0);
            if z.re.abs() < NEGLIGIBLE * scale {
                z.re = 0.0;
            }
            if z.im.abs() < NEGLIGIBLE * scale {
                z.im = 0.0;
            }
        }
        zs.sort_by(|a, b| a.re.total_cmp(&b.re).then(a.im.total_cmp(&b.im)));

        let mut roots = Vec::with_capacity(zs.len());
        for z in zs {
            roots.push(self.complex_double(z.re, z.im)?);
        }
        let q = match roots[..] {
            [root] => root,
            _ => {
                let n = roots.len();
                self.tensor_node(vec![n], roots)?
            },
        };
        self.push(q)
    }

    /// Finds every root of the polynomial at once by the Durand-Kerner (Weierstrass) iteration.
    fn durand_kerner(&self, coeffs: &[Complex]) -> Result<Vec<Complex>> {
        let n = coeffs.len() - 1;
        let lead = coeffs[n];
        let monic = coeffs.iter().map(|&c| c / lead).collect::<Vec<_>>();
        let eval = |z: Complex| monic.iter().rev().fold(Complex::ZERO, |acc, &c| acc * z + c);
        let size = |z: Complex| {
            let r = z.norm();
            monic.iter().rev().fold(0.0, |acc, c| acc * r + c.norm())
        };

        let seed = Complex::new(0.4, 0.9);
        let mut zs = Vec::with_capacity(n);
        let mut w = Complex::ONE;
        for _ in 0..n {
            zs.push(w);
            w = w * seed;
        }

        for iteration in 0..MAX_ITERATIONS {
            self.check_interrupt()?;
            for i in 0..n {
                let mut den = Complex::ONE;
                for j in (0..n).filter(|&j| j != i) {
                    den = den * (zs[i] - zs[j]);
                }
                zs[i] = zs[i] - eval(zs[i]) / den;
            }
            if zs.iter().any(|z| !z.re.is_finite() || !z.im.is_finite()) {
                break;
            }
            if zs.iter().all(|&z| eval(z).norm() <= TOLERANCE * size(z)) {
                log::trace!("nroots converged after {} iterations", iteration + 1);
                return Ok(zs);
            }
        }
        Err(Error::new(kind::ConvergenceFailure { function: "nroots" }))
    }

    /// Returns the greatest common divisor of two polynomials in the same variable with rational
    /// coefficients, or `None` if they are not such polynomials.
    pub(crate) fn poly_gcd(&mut self, a: NodeRef, b: NodeRef) -> Result<Option<NodeRef>> {
        let Some(x) = self.first_symbol(a).or_else(|| self.first_symbol(b)) else {
            return Ok(None);
        };
        let (Some(p), Some(q)) = (self.rational_coefficients(a, x)?, self.rational_coefficients(b, x)?) else {
            return Ok(None);
        };

        let scale = content(&p).gcd(&content(&q));
        let (mut u, mut v) = (p, q);
        trim(&mut u);
        trim(&mut v);
        while !v.is_empty() {
            self.check_interrupt()?;
            let r = remainder(&u, &v)?;
            u = v;
            v = r;
        }
        let Some(lead) = u.last().cloned() else {
            return Ok(Some(self.consts.zero));
        };
        let factor = scale.div(&lead)?;
        let gcd = u.iter().map(|c| c.mul(&factor)).collect::<Vec<_>>();
        self.polynomial_node(&gcd, x).map(Some)
    }

    fn rational_coefficients(&mut self, p: NodeRef, x: NodeRef) -> Result<Option<Vec<Rational>>> {
        let Some(coeffs) = self.coefficients(p, x)? else {
            return Ok(None);
        };
        Ok(coeffs.iter().map(|&c| self.rational(c).cloned()).collect())
    }

    fn first_symbol(&self, p: NodeRef) -> Option<NodeRef> {
        if self.is_symbol(p) {
            return Some(p);
        }
        if self.is_cons(p) {
            return self.args(p).into_iter().find_map(|q| self.first_symbol(q));
        }
        None
    }

    /// Builds the polynomial with coefficients `coeffs` in `x`, lowest degree first.
    fn polynomial_node(&mut self, coeffs: &[Rational], x: NodeRef) -> Result<NodeRef> {
        let mut terms = 0;
        for (k, c) in coeffs.iter().enumerate().filter(|(_, c)| !c.is_zero()) {
            let c = self.rational_node(c.clone())?;
            let k = self.integer(k as i64)?;
            let power = self.pow_nodes(x, k)?;
            let term = self.mul_nodes(c, power)?;
            self.push(term)?;
            terms += 1;
        }
        self.add_terms(terms)?;
        self.pop()
    }
}

#[cfg(test)]
mod tests {
    use crate::{error::kind, Interpreter};

    fn eval(source: &str) -> String {
        Interpreter::new().eval_str(source).unwrap()
    }

    #[test]
    fn coefficients() {
        assert_eq!(eval("coeff(3*x^2 + 2*x + 1, x, 2)"), "3");
        assert_eq!(eval("coeff(a*x^2 + b*x + c, x, 1)"), "b");
        assert_eq!(eval("coeff(a*x^2 + b*x + c, x, 0)"), "c");
        assert_eq!(eval("coeff(x^2, x, 5)"), "0");
        assert_eq!(eval("coeff((x + 1)^3, x, 1)"), "3");
        assert_eq!(eval("coeff(5*x^3, 3)"), "5");
    }

    #[test]
    fn degrees() {
        assert_eq!(eval("deg(x^3 + x)"), "3");
        assert_eq!(eval("deg(a*y^2 + y, y)"), "2");
        assert_eq!(eval("deg(5)"), "0");
        let err = Interpreter::new().eval_str("deg(sin(x))").unwrap_err();
        assert!(err.is::<kind::InvalidArgument>());
    }

    #[test]
    fn linear_and_quadratic_roots() {
        assert_eq!(eval("roots(2*x - 1)"), "1/2");
        assert_eq!(eval("roots(x^2 - 3*x + 2)"), "(1,2)");
        assert_eq!(eval("roots(y^2 - 4, y)"), "(-2,2)");
        assert_eq!(eval("roots(x^2 - 2*x + 1)"), "1");
        assert_eq!(eval("r = roots(x^2 - 2)\nr[1]^2"), "2");
    }

    #[test]
    fn rational_roots() {
        assert_eq!(eval("roots(x^3 - 6*x^2 + 11*x - 6)"), "(1,2,3)");
        assert_eq!(eval("roots(x^3 - x)"), "(-1,0,1)");
        assert_eq!(eval("roots(2*x^3 - x^2 - 2*x + 1)"), "(-1,1/2,1)");
    }

    #[test]
    fn roots_not_found() {
        let err = Interpreter::new().eval_str("roots(x^4 + x + 1)").unwrap_err();
        assert!(err.is::<kind::RootsNotFound>());
        let err = Interpreter::new().eval_str("roots(7)").unwrap_err();
        assert!(err.is::<kind::InvalidArgument>());
    }

    #[test]
    fn numerical_roots() {
        assert_eq!(eval("nroots(x^2 - 2)"), "(-1.41421,1.41421)");
        assert_eq!(eval("dim(nroots(x^3 - 1))"), "3");
        assert_eq!(eval("dim(nroots(x^5 + x + 1))"), "5");
        let err = Interpreter::new().eval_str("nroots(a*x^2 + 1)").unwrap_err();
        assert!(err.is::<kind::InvalidArgument>());
    }

    #[test]
    fn polynomial_gcd() {
        assert_eq!(eval("gcd(x^2 - 1, x^2 + 2*x + 1)"), "x + 1");
        assert_eq!(eval("gcd(2*x + 2, 4*x + 4)"), "2*x + 2");
        assert_eq!(eval("gcd(x + 1, x + 2)"), "1");
    }
}
