//! Arbitrary-precision unsigned integers.

use crate::error::DivideByZero;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::{cmp::Ordering, fmt};

/// The radix of a single digit.
const BASE: u64 = 1 << 32;

/// The largest power of ten that fits in a single digit, used for decimal conversion.
const DECIMAL_CHUNK: u32 = 1_000_000_000;

/// Number of decimal digits in [`DECIMAL_CHUNK`].
const DECIMAL_CHUNK_DIGITS: usize = 9;

/// Number of Miller–Rabin rounds performed by [`Magnitude::is_prime`].
const PRIMALITY_ROUNDS: usize = 25;

/// Seed of the generator that picks Miller–Rabin witnesses. A fixed seed keeps the test
/// deterministic across runs.
const PRIMALITY_SEED: u64 = 0x5eed_cafe_f00d_d00d;

/// An arbitrary-precision non-negative integer.
///
/// The digits are stored little-endian in base `2^32`. A magnitude is always **normalized**:
/// there is at least one digit, and the most significant digit is nonzero unless the value is
/// zero itself.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Magnitude {
    digits: Vec<u32>,
}

impl Magnitude {
    /// Creates a magnitude from raw little-endian digits, normalizing them.
    pub fn from_digits(digits: Vec<u32>) -> Self {
        let mut m = Self { digits };
        m.normalize();
        m
    }

    /// Returns the magnitude zero.
    pub fn zero() -> Self {
        Self { digits: vec![0] }
    }

    /// Returns the magnitude one.
    pub fn one() -> Self {
        Self { digits: vec![1] }
    }

    /// Creates a magnitude from a `u32`.
    pub fn from_u32(n: u32) -> Self {
        Self { digits: vec![n] }
    }

    /// Creates a magnitude from a `u64`.
    pub fn from_u64(n: u64) -> Self {
        Self::from_digits(vec![n as u32, (n >> 32) as u32])
    }

    /// Strips leading zero digits, keeping at least one digit.
    fn normalize(&mut self) {
        while self.digits.len() > 1 && self.digits.last() == Some(&0) {
            self.digits.pop();
        }
        if self.digits.is_empty() {
            self.digits.push(0);
        }
    }

    /// The little-endian digits of the magnitude.
    pub fn digits(&self) -> &[u32] {
        &self.digits
    }

    /// The number of digits of the magnitude.
    pub fn len(&self) -> usize {
        self.digits.len()
    }

    /// Always `false`: a normalized magnitude has at least one digit.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn is_zero(&self) -> bool {
        self.digits.len() == 1 && self.digits[0] == 0
    }

    pub fn is_one(&self) -> bool {
        self.digits.len() == 1 && self.digits[0] == 1
    }

    pub fn is_even(&self) -> bool {
        self.digits[0] & 1 == 0
    }

    /// Returns the value as a `u32`, if it fits.
    pub fn to_u32(&self) -> Option<u32> {
        (self.digits.len() == 1).then_some(self.digits[0])
    }

    /// Returns the value as a `u64`, if it fits.
    pub fn to_u64(&self) -> Option<u64> {
        match self.digits.len() {
            1 => Some(self.digits[0] as u64),
            2 => Some(self.digits[0] as u64 | (self.digits[1] as u64) << 32),
            _ => None,
        }
    }

    /// The number of significant bits.
    pub fn bit_len(&self) -> u64 {
        let top = *self.digits.last().unwrap_or(&0);
        (self.digits.len() as u64 - 1) * 32 + (32 - top.leading_zeros() as u64)
    }

    /// Converts to the nearest `f64`, accumulating digit groups from the most significant end.
    /// Values too large to represent become infinity.
    pub fn to_f64(&self) -> f64 {
        self.digits
            .iter()
            .rev()
            .fold(0.0, |acc, &d| acc * BASE as f64 + d as f64)
    }

    /// Creates a magnitude from the integral part of a finite, non-negative `f64`.
    pub fn from_f64(f: f64) -> Option<Self> {
        if !f.is_finite() || f < 0.0 {
            return None;
        }

        let mut f = f.trunc();
        let mut digits = Vec::new();
        while f >= 1.0 {
            let rem = f % BASE as f64;
            digits.push(rem as u32);
            f = ((f - rem) / BASE as f64).trunc();
        }
        Some(Self::from_digits(digits))
    }

    /// `u + v`
    pub fn add(&self, v: &Magnitude) -> Magnitude {
        let (long, short) = if self.len() >= v.len() { (self, v) } else { (v, self) };
        let mut digits = Vec::with_capacity(long.len() + 1);
        let mut carry = 0u64;
        for i in 0..long.len() {
            let sum = long.digits[i] as u64 + short.digits.get(i).copied().unwrap_or(0) as u64 + carry;
            digits.push(sum as u32);
            carry = sum >> 32;
        }
        if carry > 0 {
            digits.push(carry as u32);
        }
        Magnitude::from_digits(digits)
    }

    /// `u - v`, where `u >= v`.
    ///
    /// The borrow is propagated as in schoolbook subtraction. Subtracting a larger magnitude from
    /// a smaller one has no meaning for unsigned values; callers compare first.
    pub fn sub(&self, v: &Magnitude) -> Magnitude {
        debug_assert!(*self >= *v, "magnitude subtraction would underflow");
        let mut digits = Vec::with_capacity(self.len());
        let mut borrow = 0i64;
        for i in 0..self.len() {
            let mut diff = self.digits[i] as i64 - v.digits.get(i).copied().unwrap_or(0) as i64 - borrow;
            if diff < 0 {
                diff += BASE as i64;
                borrow = 1;
            } else {
                borrow = 0;
            }
            digits.push(diff as u32);
        }
        Magnitude::from_digits(digits)
    }

    /// `u * v`, digit by digit with a 64-bit accumulator.
    pub fn mul(&self, v: &Magnitude) -> Magnitude {
        if self.is_zero() || v.is_zero() {
            return Magnitude::zero();
        }

        let mut digits = vec![0u32; self.len() + v.len()];
        for (i, &a) in self.digits.iter().enumerate() {
            let mut carry = 0u64;
            for (j, &b) in v.digits.iter().enumerate() {
                let t = a as u64 * b as u64 + digits[i + j] as u64 + carry;
                digits[i + j] = t as u32;
                carry = t >> 32;
            }
            digits[i + v.len()] = carry as u32;
        }
        Magnitude::from_digits(digits)
    }

    /// Multiplies by a single digit.
    fn mul_small(&self, n: u32) -> Magnitude {
        let mut digits = Vec::with_capacity(self.len() + 1);
        let mut carry = 0u64;
        for &d in &self.digits {
            let t = d as u64 * n as u64 + carry;
            digits.push(t as u32);
            carry = t >> 32;
        }
        digits.push(carry as u32);
        Magnitude::from_digits(digits)
    }

    /// Divides by a single nonzero digit, returning the quotient and remainder.
    fn div_rem_small(&self, n: u32) -> (Magnitude, u32) {
        let mut digits = vec![0u32; self.len()];
        let mut rem = 0u64;
        for i in (0..self.len()).rev() {
            let cur = rem << 32 | self.digits[i] as u64;
            digits[i] = (cur / n as u64) as u32;
            rem = cur % n as u64;
        }
        (Magnitude::from_digits(digits), rem as u32)
    }

    /// Shifts left by `s < 32` bits, appending one extra digit for the overflow.
    fn shl_digits(digits: &[u32], s: u32) -> Vec<u32> {
        let mut out = Vec::with_capacity(digits.len() + 1);
        let mut carry = 0u32;
        for &d in digits {
            if s == 0 {
                out.push(d);
            } else {
                out.push(d << s | carry);
                carry = d >> (32 - s);
            }
        }
        out.push(carry);
        out
    }

    /// Computes the floor quotient and remainder of `u / v`.
    ///
    /// Multi-digit divisors use Knuth's Algorithm D: the divisor is normalized so its top digit
    /// has the high bit set, each quotient digit is estimated from the top two digits of the
    /// running remainder, corrected at most twice, and the estimate is multiplied out and
    /// subtracted (adding the divisor back when the estimate was one too large).
    pub fn div_rem(&self, v: &Magnitude) -> Result<(Magnitude, Magnitude), DivideByZero> {
        if v.is_zero() {
            return Err(DivideByZero);
        }
        if self < v {
            return Ok((Magnitude::zero(), self.clone()));
        }
        if v.len() == 1 {
            let (q, r) = self.div_rem_small(v.digits[0]);
            return Ok((q, Magnitude::from_u32(r)));
        }

        let n = v.len();
        let m = self.len() - n;
        let s = v.digits[n - 1].leading_zeros();
        let mut vn = Self::shl_digits(&v.digits, s);
        vn.pop(); // the divisor never overflows its top digit after normalization
        let mut un = Self::shl_digits(&self.digits, s);
        let mut q = vec![0u32; m + 1];

        for j in (0..=m).rev() {
            let num = (un[j + n] as u64) << 32 | un[j + n - 1] as u64;
            let mut qhat = num / vn[n - 1] as u64;
            let mut rhat = num % vn[n - 1] as u64;

            while qhat >= BASE || qhat * vn[n - 2] as u64 > (rhat << 32 | un[j + n - 2] as u64) {
                qhat -= 1;
                rhat += vn[n - 1] as u64;
                if rhat >= BASE {
                    break;
                }
            }

            // multiply and subtract
            let mut k = 0i64;
            for i in 0..n {
                let p = qhat * vn[i] as u64;
                let t = un[i + j] as i64 - k - (p & 0xffff_ffff) as i64;
                un[i + j] = t as u32;
                k = (p >> 32) as i64 - (t >> 32);
            }
            let t = un[j + n] as i64 - k;
            un[j + n] = t as u32;

            if t < 0 {
                // the estimate was one too large; add the divisor back
                qhat -= 1;
                let mut carry = 0u64;
                for i in 0..n {
                    let sum = un[i + j] as u64 + vn[i] as u64 + carry;
                    un[i + j] = sum as u32;
                    carry = sum >> 32;
                }
                un[j + n] = un[j + n].wrapping_add(carry as u32);
            }

            q[j] = qhat as u32;
        }

        // unnormalize the remainder
        let mut r = vec![0u32; n];
        for i in 0..n {
            r[i] = if s == 0 {
                un[i]
            } else {
                un[i] >> s | un[i + 1] << (32 - s)
            };
        }

        Ok((Magnitude::from_digits(q), Magnitude::from_digits(r)))
    }

    /// `u / v`, rounded down.
    pub fn div(&self, v: &Magnitude) -> Result<Magnitude, DivideByZero> {
        self.div_rem(v).map(|(q, _)| q)
    }

    /// `u mod v`
    pub fn rem(&self, v: &Magnitude) -> Result<Magnitude, DivideByZero> {
        self.div_rem(v).map(|(_, r)| r)
    }

    /// `u^n` by repeated squaring.
    pub fn pow(&self, mut n: u32) -> Magnitude {
        let mut result = Magnitude::one();
        let mut base = self.clone();
        while n > 0 {
            if n & 1 == 1 {
                result = result.mul(&base);
            }
            n >>= 1;
            if n > 0 {
                base = base.mul(&base);
            }
        }
        result
    }

    /// `u^e mod m`
    pub fn modpow(&self, e: &Magnitude, m: &Magnitude) -> Result<Magnitude, DivideByZero> {
        if m.is_zero() {
            return Err(DivideByZero);
        }

        let mut result = Magnitude::one().rem(m)?;
        let mut base = self.rem(m)?;
        let bits = e.bit_len();
        for i in 0..bits {
            if e.bit(i) {
                result = result.mul(&base).rem(m)?;
            }
            base = base.mul(&base).rem(m)?;
        }
        Ok(result)
    }

    /// Returns bit `i` (counting from the least significant bit).
    fn bit(&self, i: u64) -> bool {
        let digit = (i / 32) as usize;
        digit < self.len() && self.digits[digit] >> (i % 32) & 1 == 1
    }

    /// Shifts right by `n` bits.
    pub fn shr(&self, n: u64) -> Magnitude {
        let whole = (n / 32) as usize;
        if whole >= self.len() {
            return Magnitude::zero();
        }
        let s = (n % 32) as u32;
        let src = &self.digits[whole..];
        let mut digits = Vec::with_capacity(src.len());
        for i in 0..src.len() {
            let lo = src[i] >> s;
            let hi = if s == 0 { 0 } else { src.get(i + 1).map_or(0, |&d| d << (32 - s)) };
            digits.push(lo | hi);
        }
        Magnitude::from_digits(digits)
    }

    /// Shifts left by `n` bits.
    pub fn shl(&self, n: u64) -> Magnitude {
        let whole = (n / 32) as usize;
        let mut digits = vec![0u32; whole];
        digits.extend(Self::shl_digits(&self.digits, (n % 32) as u32));
        Magnitude::from_digits(digits)
    }

    /// Number of trailing zero bits; zero for the value zero.
    fn trailing_zeros(&self) -> u64 {
        let mut count = 0;
        for &d in &self.digits {
            if d == 0 {
                count += 32;
            } else {
                return count + d.trailing_zeros() as u64;
            }
        }
        0
    }

    /// Greatest common divisor by the binary (Stein) algorithm.
    ///
    /// `gcd(0, 0) = 0` and `gcd(u, 0) = u`.
    pub fn gcd(&self, v: &Magnitude) -> Magnitude {
        if self.is_zero() {
            return v.clone();
        }
        if v.is_zero() {
            return self.clone();
        }

        let shift = self.trailing_zeros().min(v.trailing_zeros());
        let mut u = self.shr(self.trailing_zeros());
        let mut v = v.shr(v.trailing_zeros());
        loop {
            // both odd here
            match u.cmp(&v) {
                Ordering::Equal => break,
                Ordering::Greater => {
                    u = u.sub(&v);
                    u = u.shr(u.trailing_zeros());
                },
                Ordering::Less => {
                    v = v.sub(&u);
                    v = v.shr(v.trailing_zeros());
                },
            }
        }
        u.shl(shift)
    }

    /// Computes the exact integer `n`th root, or [`None`] if the magnitude is not a perfect `n`th
    /// power. Never returns an approximation.
    pub fn root(&self, n: u32) -> Option<Magnitude> {
        if n == 0 {
            return None;
        }
        if n == 1 || self.is_zero() || self.is_one() {
            return Some(self.clone());
        }

        // binary search between 2^(floor(bits / n)) and 2^(ceil(bits / n))
        let bits = self.bit_len();
        let mut lo = Magnitude::one().shl((bits - 1) / n as u64);
        let mut hi = Magnitude::one().shl(bits / n as u64 + 1);
        while lo <= hi {
            let mid = lo.add(&hi).shr(1);
            match mid.pow(n).cmp(self) {
                Ordering::Equal => return Some(mid),
                Ordering::Less => lo = mid.add(&Magnitude::one()),
                Ordering::Greater => {
                    if mid.is_zero() {
                        break;
                    }
                    hi = mid.sub(&Magnitude::one());
                },
            }
        }
        None
    }

    /// Probabilistic primality test: Miller–Rabin with [`PRIMALITY_ROUNDS`] witnesses drawn from
    /// a generator with a fixed seed.
    pub fn is_prime(&self) -> bool {
        if let Some(n) = self.to_u32() {
            if n < 2 {
                return false;
            }
            for p in [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37] {
                if n == p {
                    return true;
                }
                if n % p == 0 {
                    return false;
                }
            }
        } else if self.is_even() {
            return false;
        }

        let one = Magnitude::one();
        let n_minus_one = self.sub(&one);
        let s = n_minus_one.trailing_zeros();
        let d = n_minus_one.shr(s);

        let mut rng = StdRng::seed_from_u64(PRIMALITY_SEED);
        let three = Magnitude::from_u32(3);
        let range = self.sub(&three);
        'witness: for _ in 0..PRIMALITY_ROUNDS {
            // witness in [2, n - 2]
            let raw = Magnitude::from_digits((0..self.len()).map(|_| rng.gen()).collect());
            let a = match raw.rem(&range) {
                Ok(r) => r.add(&Magnitude::from_u32(2)),
                Err(_) => return true, // n == 3, already handled above
            };

            let Ok(mut x) = a.modpow(&d, self) else { return false };
            if x.is_one() || x == n_minus_one {
                continue;
            }
            for _ in 1..s {
                x = x.mul(&x).rem(self).unwrap_or_else(|_| Magnitude::zero());
                if x == n_minus_one {
                    continue 'witness;
                }
            }
            return false;
        }
        true
    }

    /// Parses a string of decimal digits. Returns [`None`] if the string is empty or contains a
    /// non-digit character.
    pub fn parse_decimal(s: &str) -> Option<Magnitude> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        let mut result = Magnitude::zero();
        let first = s.len() % DECIMAL_CHUNK_DIGITS;
        let mut chunks = Vec::new();
        if first > 0 {
            chunks.push(&s[..first]);
        }
        let mut i = first;
        while i < s.len() {
            chunks.push(&s[i..i + DECIMAL_CHUNK_DIGITS]);
            i += DECIMAL_CHUNK_DIGITS;
        }

        for (idx, chunk) in chunks.into_iter().enumerate() {
            let value: u32 = chunk.parse().ok()?;
            let scale = if idx == 0 && first > 0 {
                10u32.pow(chunk.len() as u32)
            } else {
                DECIMAL_CHUNK
            };
            result = result.mul_small(scale).add(&Magnitude::from_u32(value));
        }
        Some(result)
    }
}

impl PartialOrd for Magnitude {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Magnitude {
    fn cmp(&self, other: &Self) -> Ordering {
        self.len()
            .cmp(&other.len())
            .then_with(|| self.digits.iter().rev().cmp(other.digits.iter().rev()))
    }
}

impl fmt::Display for Magnitude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return write!(f, "0");
        }

        let mut chunks = Vec::new();
        let mut n = self.clone();
        while !n.is_zero() {
            let (q, r) = n.div_rem_small(DECIMAL_CHUNK);
            chunks.push(r);
            n = q;
        }

        let mut iter = chunks.iter().rev();
        if let Some(first) = iter.next() {
            write!(f, "{}", first)?;
        }
        for chunk in iter {
            write!(f, "{:09}", chunk)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Magnitude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Magnitude({})", self)
    }
}

impl From<u32> for Magnitude {
    fn from(n: u32) -> Self {
        Magnitude::from_u32(n)
    }
}

impl From<u64> for Magnitude {
    fn from(n: u64) -> Self {
        Magnitude::from_u64(n)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rug::Integer;
    use super::*;

    fn mag(s: &str) -> Magnitude {
        Magnitude::parse_decimal(s).unwrap()
    }

    fn big(s: &str) -> Integer {
        Integer::from_str_radix(s, 10).unwrap()
    }

    /// Operands wide enough to exercise the multi-digit paths.
    const OPERANDS: [&str; 8] = [
        "0",
        "1",
        "4294967295",
        "4294967296",
        "18446744073709551615",
        "340282366920938463463374607431768211457",
        "123456789012345678901234567890123456789012345678901234567890",
        "99999999999999999999999999999999999999999999999999999999999999999999999999",
    ];

    #[test]
    fn decimal_round_trip() {
        for s in OPERANDS {
            assert_eq!(mag(s).to_string(), s);
        }
        assert_eq!(mag("000123").to_string(), "123");
        assert!(Magnitude::parse_decimal("12a").is_none());
        assert!(Magnitude::parse_decimal("").is_none());
    }

    #[test]
    fn arithmetic_matches_gmp() {
        for a in OPERANDS {
            for b in OPERANDS {
                let (ma, mb) = (mag(a), mag(b));
                let (ba, bb) = (big(a), big(b));

                assert_eq!(ma.add(&mb).to_string(), Integer::from(&ba + &bb).to_string());
                assert_eq!(ma.mul(&mb).to_string(), Integer::from(&ba * &bb).to_string());
                if ma >= mb {
                    assert_eq!(ma.sub(&mb).to_string(), Integer::from(&ba - &bb).to_string());
                }
                if !mb.is_zero() {
                    let (q, r) = ma.div_rem(&mb).unwrap();
                    let (bq, br) = ba.clone().div_rem_floor(bb.clone());
                    assert_eq!(q.to_string(), bq.to_string(), "{} / {}", a, b);
                    assert_eq!(r.to_string(), br.to_string(), "{} % {}", a, b);
                }
                assert_eq!(ma.gcd(&mb).to_string(), ba.clone().gcd(&bb).to_string());
            }
        }
    }

    #[test]
    fn long_division_correction_step() {
        // quotient digit estimates that need the add-back step
        let u = mag("340282366920938463463374607431768211455");
        let v = mag("18446744073709551617");
        let (q, r) = u.div_rem(&v).unwrap();
        assert_eq!(q.mul(&v).add(&r), u);
        assert!(r < v);
    }

    #[test]
    fn divide_by_zero() {
        assert_eq!(mag("5").div_rem(&Magnitude::zero()), Err(DivideByZero));
        assert_eq!(mag("5").modpow(&mag("2"), &Magnitude::zero()), Err(DivideByZero));
    }

    #[test]
    fn gcd_base_cases() {
        assert_eq!(Magnitude::zero().gcd(&Magnitude::zero()), Magnitude::zero());
        for s in OPERANDS {
            assert_eq!(mag(s).gcd(&Magnitude::zero()), mag(s));
            assert_eq!(Magnitude::zero().gcd(&mag(s)), mag(s));
        }
    }

    #[test]
    fn exact_roots() {
        assert_eq!(mag("1024").root(10), Some(mag("2")));
        assert_eq!(mag("1000000000000000000000000000000").root(3), Some(mag("10000000000")));
        assert_eq!(mag("8").root(2), None);
        assert_eq!(mag("0").root(5), Some(mag("0")));

        let n = big("123456789123456789");
        let cube = n.clone() * &n * &n;
        assert_eq!(mag(&cube.to_string()).root(3), Some(mag(&n.to_string())));
        assert_eq!(mag(&Integer::from(&cube + 1u32).to_string()).root(3), None);
    }

    #[test]
    fn power_and_modpow() {
        assert_eq!(mag("3").pow(40).to_string(), "12157665459056928801");
        assert_eq!(mag("4").modpow(&mag("13"), &mag("497")).unwrap(), mag("445"));
    }

    #[test]
    fn primality() {
        let primes = ["2", "3", "97", "2147483647", "18446744073709551557", "170141183460469231731687303715884105727"];
        let composites = ["0", "1", "4", "561", "2147483649", "18446744073709551615", "170141183460469231731687303715884105729"];
        for p in primes {
            assert!(mag(p).is_prime(), "{} should be prime", p);
        }
        for c in composites {
            assert!(!mag(c).is_prime(), "{} should be composite", c);
        }
    }

    #[test]
    fn float_conversion() {
        assert_eq!(mag("4294967296").to_f64(), 4294967296.0);
        assert_eq!(Magnitude::from_f64(12345678901234.0).unwrap(), mag("12345678901234"));
        assert!(Magnitude::from_f64(-1.0).is_none());
    }
}
