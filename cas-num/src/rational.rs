//! Signed, always-reduced fractions.

use crate::{approx, error::DivideByZero, magnitude::Magnitude};
use std::{cmp::Ordering, fmt, ops::Neg};

/// The sign of a [`Rational`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sign {
    Plus,
    Minus,
}

impl Neg for Sign {
    type Output = Sign;

    fn neg(self) -> Sign {
        match self {
            Sign::Plus => Sign::Minus,
            Sign::Minus => Sign::Plus,
        }
    }
}

impl Sign {
    /// The sign of the product of two values with the given signs.
    fn times(self, other: Sign) -> Sign {
        if self == other {
            Sign::Plus
        } else {
            Sign::Minus
        }
    }
}

/// An exact rational number.
///
/// The numerator and denominator are always coprime and the denominator is never zero. Zero is
/// always stored with [`Sign::Plus`] and a denominator of one, so two equal rationals are always
/// structurally equal.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Rational {
    sign: Sign,
    num: Magnitude,
    den: Magnitude,
}

impl Rational {
    /// Creates a reduced rational from a sign and two magnitudes.
    pub fn new(sign: Sign, num: Magnitude, den: Magnitude) -> Result<Self, DivideByZero> {
        if den.is_zero() {
            return Err(DivideByZero);
        }
        if num.is_zero() {
            return Ok(Self::zero());
        }

        let g = num.gcd(&den);
        if g.is_one() {
            Ok(Self { sign, num, den })
        } else {
            Ok(Self {
                sign,
                num: num.div(&g)?,
                den: den.div(&g)?,
            })
        }
    }

    /// Creates a reduced rational from two machine integers.
    pub fn new_i64(num: i64, den: i64) -> Result<Self, DivideByZero> {
        let sign = if (num < 0) != (den < 0) { Sign::Minus } else { Sign::Plus };
        Self::new(
            sign,
            Magnitude::from_u64(num.unsigned_abs()),
            Magnitude::from_u64(den.unsigned_abs()),
        )
    }

    /// Creates an integer.
    pub fn from_integer(sign: Sign, n: Magnitude) -> Self {
        if n.is_zero() {
            Self::zero()
        } else {
            Self { sign, num: n, den: Magnitude::one() }
        }
    }

    /// Creates an integer from an `i64`.
    pub fn from_i64(n: i64) -> Self {
        let sign = if n < 0 { Sign::Minus } else { Sign::Plus };
        Self::from_integer(sign, Magnitude::from_u64(n.unsigned_abs()))
    }

    pub fn zero() -> Self {
        Self { sign: Sign::Plus, num: Magnitude::zero(), den: Magnitude::one() }
    }

    pub fn one() -> Self {
        Self::from_i64(1)
    }

    pub fn minus_one() -> Self {
        Self::from_i64(-1)
    }

    pub fn sign(&self) -> Sign {
        self.sign
    }

    pub fn numer(&self) -> &Magnitude {
        &self.num
    }

    pub fn denom(&self) -> &Magnitude {
        &self.den
    }

    /// The numerator as a signed integer rational.
    pub fn numerator(&self) -> Rational {
        Rational::from_integer(self.sign, self.num.clone())
    }

    /// The denominator as a positive integer rational.
    pub fn denominator(&self) -> Rational {
        Rational::from_integer(Sign::Plus, self.den.clone())
    }

    pub fn is_zero(&self) -> bool {
        self.num.is_zero()
    }

    pub fn is_one(&self) -> bool {
        self.sign == Sign::Plus && self.num.is_one() && self.den.is_one()
    }

    pub fn is_minus_one(&self) -> bool {
        self.sign == Sign::Minus && self.num.is_one() && self.den.is_one()
    }

    pub fn is_negative(&self) -> bool {
        self.sign == Sign::Minus
    }

    pub fn is_positive(&self) -> bool {
        self.sign == Sign::Plus && !self.is_zero()
    }

    pub fn is_integer(&self) -> bool {
        self.den.is_one()
    }

    /// Returns `true` if the value is an integer and even.
    pub fn is_even(&self) -> bool {
        self.is_integer() && self.num.is_even()
    }

    /// Returns `true` if the value is `1/2`.
    pub fn is_half(&self) -> bool {
        self.sign == Sign::Plus && self.num.is_one() && self.den.to_u32() == Some(2)
    }

    /// Returns the value as an `i64`, if it is an integer that fits.
    pub fn to_i64(&self) -> Option<i64> {
        if !self.is_integer() {
            return None;
        }
        let n = self.num.to_u64()?;
        match self.sign {
            Sign::Plus => i64::try_from(n).ok(),
            Sign::Minus if n == 1 << 63 => Some(i64::MIN),
            Sign::Minus => i64::try_from(n).ok().map(|n| -n),
        }
    }

    /// Converts to the nearest `f64`.
    pub fn to_f64(&self) -> f64 {
        let num = self.num.to_f64();
        let den = self.den.to_f64();
        let value = if num.is_finite() && den.is_finite() {
            num / den
        } else {
            // scale both down so the quotient stays representable
            let shift = self.num.bit_len().max(self.den.bit_len()).saturating_sub(1000);
            self.num.shr(shift).to_f64() / self.den.shr(shift).to_f64()
        };
        match self.sign {
            Sign::Plus => value,
            Sign::Minus => -value,
        }
    }

    /// Converts a finite `f64` to a rational. Integral values convert exactly; other values are
    /// approximated by the best fraction whose denominator does not exceed `1000`.
    pub fn from_f64(f: f64) -> Option<Self> {
        if !f.is_finite() {
            return None;
        }
        let sign = if f < 0.0 { Sign::Minus } else { Sign::Plus };
        if f.fract() == 0.0 {
            return Some(Self::from_integer(sign, Magnitude::from_f64(f.abs())?));
        }
        let (n, d) = approx::approximate(f.abs(), approx::DEFAULT_MAX_DENOMINATOR);
        Self::new(sign, Magnitude::from_u64(n), Magnitude::from_u64(d)).ok()
    }

    /// Adds two magnitudes with signs.
    fn signed_add(a_sign: Sign, a: Magnitude, b_sign: Sign, b: Magnitude) -> (Sign, Magnitude) {
        if a_sign == b_sign {
            return (a_sign, a.add(&b));
        }
        match a.cmp(&b) {
            Ordering::Greater | Ordering::Equal => (a_sign, a.sub(&b)),
            Ordering::Less => (b_sign, b.sub(&a)),
        }
    }

    /// `a + b`
    pub fn add(&self, other: &Rational) -> Rational {
        let a = self.num.mul(&other.den);
        let b = other.num.mul(&self.den);
        let (sign, num) = Self::signed_add(self.sign, a, other.sign, b);
        let den = self.den.mul(&other.den);
        Self::new(sign, num, den).unwrap_or_else(|_| Rational::zero())
    }

    /// `a - b`
    pub fn sub(&self, other: &Rational) -> Rational {
        self.add(&other.neg())
    }

    /// `a * b`
    pub fn mul(&self, other: &Rational) -> Rational {
        let sign = self.sign.times(other.sign);
        Self::new(sign, self.num.mul(&other.num), self.den.mul(&other.den))
            .unwrap_or_else(|_| Rational::zero())
    }

    /// `a / b`
    pub fn div(&self, other: &Rational) -> Result<Rational, DivideByZero> {
        Ok(self.mul(&other.recip()?))
    }

    /// `-a`
    pub fn neg(&self) -> Rational {
        if self.is_zero() {
            return self.clone();
        }
        Rational { sign: -self.sign, num: self.num.clone(), den: self.den.clone() }
    }

    /// `|a|`
    pub fn abs(&self) -> Rational {
        Rational { sign: Sign::Plus, num: self.num.clone(), den: self.den.clone() }
    }

    /// `1 / a`
    pub fn recip(&self) -> Result<Rational, DivideByZero> {
        if self.is_zero() {
            return Err(DivideByZero);
        }
        Ok(Rational { sign: self.sign, num: self.den.clone(), den: self.num.clone() })
    }

    /// `a^n` for an integer exponent.
    pub fn pow(&self, n: i32) -> Result<Rational, DivideByZero> {
        let e = n.unsigned_abs();
        let sign = if self.sign == Sign::Minus && e % 2 == 1 { Sign::Minus } else { Sign::Plus };
        let result = Self::new(sign, self.num.pow(e), self.den.pow(e))?;
        if n < 0 {
            result.recip()
        } else {
            Ok(result)
        }
    }

    /// The largest integer not greater than the value.
    pub fn floor(&self) -> Rational {
        if self.is_integer() {
            return self.clone();
        }
        let q = self.num.div(&self.den).unwrap_or_else(|_| Magnitude::zero());
        match self.sign {
            Sign::Plus => Rational::from_integer(Sign::Plus, q),
            Sign::Minus => Rational::from_integer(Sign::Minus, q.add(&Magnitude::one())),
        }
    }

    /// The smallest integer not less than the value.
    pub fn ceil(&self) -> Rational {
        self.neg().floor().neg()
    }

    /// The exact `n`th root, if both the numerator and denominator are perfect `n`th powers.
    /// Negative values only have odd roots.
    pub fn root(&self, n: u32) -> Option<Rational> {
        if self.sign == Sign::Minus && n % 2 == 0 {
            return None;
        }
        let num = self.num.root(n)?;
        let den = self.den.root(n)?;
        Some(Rational { sign: self.sign, num, den })
    }

    /// Integer remainder with the sign of the dividend, for two integers.
    pub fn rem(&self, other: &Rational) -> Result<Rational, DivideByZero> {
        // a - b * trunc(a / b)
        let q = self.div(other)?;
        let trunc = if q.is_negative() { q.ceil() } else { q.floor() };
        Ok(self.sub(&other.mul(&trunc)))
    }

    /// Greatest common divisor of two rationals: `gcd(a/b, c/d) = gcd(a, c) / lcm(b, d)`.
    pub fn gcd(&self, other: &Rational) -> Rational {
        let num = self.num.gcd(&other.num);
        let g = self.den.gcd(&other.den);
        let lcm = self.den.div(&g).map(|d| d.mul(&other.den)).unwrap_or_else(|_| Magnitude::one());
        Self::new(Sign::Plus, num, lcm).unwrap_or_else(|_| Rational::zero())
    }
}

impl PartialOrd for Rational {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Rational {
    fn cmp(&self, other: &Self) -> Ordering {
        let sign_rank = |r: &Rational| match (r.sign, r.is_zero()) {
            (_, true) => 0,
            (Sign::Plus, _) => 1,
            (Sign::Minus, _) => -1,
        };
        let (sa, sb) = (sign_rank(self), sign_rank(other));
        if sa != sb {
            return sa.cmp(&sb);
        }

        let lhs = self.num.mul(&other.den);
        let rhs = other.num.mul(&self.den);
        match self.sign {
            Sign::Plus => lhs.cmp(&rhs),
            Sign::Minus => rhs.cmp(&lhs),
        }
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.sign == Sign::Minus {
            write!(f, "-")?;
        }
        write!(f, "{}", self.num)?;
        if !self.den.is_one() {
            write!(f, "/{}", self.den)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rational({})", self)
    }
}

impl From<i64> for Rational {
    fn from(n: i64) -> Self {
        Rational::from_i64(n)
    }
}

#[cfg(test)]
mod tests {
    use assert_float_eq::assert_float_relative_eq;
    use pretty_assertions::assert_eq;
    use super::*;

    fn q(n: i64, d: i64) -> Rational {
        Rational::new_i64(n, d).unwrap()
    }

    #[test]
    fn always_reduced() {
        assert_eq!(q(2, 4), q(1, 2));
        assert_eq!(q(-6, -9), q(2, 3));
        assert_eq!(q(6, -9).to_string(), "-2/3");
        assert_eq!(q(0, -5), Rational::zero());
        assert_eq!(q(0, -5).sign(), Sign::Plus);
        assert_eq!(Rational::new_i64(1, 0), Err(DivideByZero));
    }

    #[test]
    fn only_positive_half_is_half() {
        assert!(q(1, 2).is_half());
        assert!(q(2, 4).is_half());
        assert!(!q(-1, 2).is_half());
        assert!(!q(3, 2).is_half());
    }

    #[test]
    fn sum_matches_cross_multiplication() {
        for a in -6..=6 {
            for b in (-5..=5).filter(|&b| b != 0) {
                for c in -6..=6 {
                    for d in (-5..=5).filter(|&d| d != 0) {
                        let sum = q(a, b).add(&q(c, d));
                        assert_eq!(sum, q(a * d + c * b, b * d));
                        assert!(sum.denom().gcd(sum.numer()).is_one() || sum.is_zero());
                    }
                }
            }
        }
    }

    #[test]
    fn one_third_plus_one_sixth() {
        assert_eq!(q(1, 3).add(&q(1, 6)), q(1, 2));
    }

    #[test]
    fn arithmetic() {
        assert_eq!(q(3, 4).sub(&q(5, 4)), q(-1, 2));
        assert_eq!(q(-2, 3).mul(&q(9, 4)), q(-3, 2));
        assert_eq!(q(2, 3).div(&q(4, 9)).unwrap(), q(3, 2));
        assert_eq!(q(2, 3).div(&Rational::zero()), Err(DivideByZero));
        assert_eq!(q(-2, 3).pow(3).unwrap(), q(-8, 27));
        assert_eq!(q(-2, 3).pow(-2).unwrap(), q(9, 4));
        assert_eq!(Rational::zero().pow(-1), Err(DivideByZero));
    }

    #[test]
    fn floor_and_ceiling() {
        assert_eq!(q(7, 2).floor(), q(3, 1));
        assert_eq!(q(-7, 2).floor(), q(-4, 1));
        assert_eq!(q(-7, 2).ceil(), q(-3, 1));
        assert_eq!(q(5, 1).floor(), q(5, 1));
    }

    #[test]
    fn roots() {
        assert_eq!(q(4, 9).root(2), Some(q(2, 3)));
        assert_eq!(q(-8, 27).root(3), Some(q(-2, 3)));
        assert_eq!(q(-4, 1).root(2), None);
        assert_eq!(q(2, 1).root(2), None);
    }

    #[test]
    fn ordering() {
        assert!(q(-1, 2) < Rational::zero());
        assert!(q(-1, 2) > q(-2, 3));
        assert!(q(1, 3) < q(1, 2));
        assert_eq!(q(7, 3).cmp(&q(14, 6)), Ordering::Equal);
    }

    #[test]
    fn gcd_of_fractions() {
        assert_eq!(q(0, 1).gcd(&q(0, 1)), Rational::zero());
        assert_eq!(q(-12, 1).gcd(&Rational::zero()), q(12, 1));
        assert_eq!(q(1, 2).gcd(&q(1, 3)), q(1, 6));
        assert_eq!(q(4, 1).gcd(&q(6, 1)), q(2, 1));
    }

    #[test]
    fn float_conversion() {
        assert_eq!(q(1, 4).to_f64(), 0.25);
        assert_eq!(q(-3, 1).to_f64(), -3.0);
        assert_eq!(Rational::from_f64(0.5).unwrap(), q(1, 2));
        assert_eq!(Rational::from_f64(-2.0).unwrap(), q(-2, 1));
        assert_eq!(Rational::from_f64(1.0 / 3.0).unwrap(), q(1, 3));
        assert!(Rational::from_f64(f64::NAN).is_none());

        let huge = Rational::new(Sign::Plus, Magnitude::from_u32(3).pow(1000), Magnitude::from_u32(3).pow(999)).unwrap();
        assert_float_relative_eq!(huge.to_f64(), 3.0);
        let wide = Rational::new(Sign::Minus, Magnitude::from_u32(7).pow(800), Magnitude::from_u32(2).pow(2300)).unwrap();
        assert_float_relative_eq!(wide.to_f64(), -(800.0 * 7f64.ln() - 2300.0 * 2f64.ln()).exp(), 1e-9);
    }

    #[test]
    fn integer_remainder() {
        assert_eq!(q(7, 1).rem(&q(3, 1)).unwrap(), q(1, 1));
        assert_eq!(q(-7, 1).rem(&q(3, 1)).unwrap(), q(-1, 1));
    }
}
