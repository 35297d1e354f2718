//! Trial division by a table of small primes.

use crate::magnitude::Magnitude;
use once_cell::sync::Lazy;

/// The number of primes in [`PRIMES`].
pub const PRIME_COUNT: usize = 10000;

/// The first [`PRIME_COUNT`] primes, computed on first use with a sieve of Eratosthenes.
pub static PRIMES: Lazy<Vec<u32>> = Lazy::new(|| {
    // the 10000th prime is 104729
    const LIMIT: usize = 104730;
    let mut composite = vec![false; LIMIT];
    let mut primes = Vec::with_capacity(PRIME_COUNT);
    for n in 2..LIMIT {
        if composite[n] {
            continue;
        }
        primes.push(n as u32);
        if primes.len() == PRIME_COUNT {
            break;
        }
        let mut m = n * n;
        while m < LIMIT {
            composite[m] = true;
            m += n;
        }
    }
    primes
});

/// The result of [`factor_small`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Factorization {
    /// Prime factors found by trial division, with their multiplicities, in increasing order.
    pub factors: Vec<(u32, u32)>,

    /// Whatever is left after dividing out every prime in the table. One if the input factored
    /// completely.
    pub cofactor: Magnitude,
}

/// Factors out every prime in [`PRIMES`] from `n`.
///
/// Trial division stops early once the square of the next prime exceeds the remaining cofactor,
/// in which case the cofactor is itself prime (or one) and is moved into the factor list when it
/// fits in a digit.
pub fn factor_small(n: &Magnitude) -> Factorization {
    let mut factors = Vec::new();
    let mut rest = n.clone();
    if rest.is_zero() {
        return Factorization { factors, cofactor: rest };
    }

    for &p in PRIMES.iter() {
        if rest.is_one() {
            break;
        }
        let pm = Magnitude::from_u32(p);
        if pm.mul(&pm) > rest {
            // the remainder has no factor below its square root
            if let Some(r) = rest.to_u32() {
                factors.push((r, 1));
                rest = Magnitude::one();
            }
            break;
        }

        let mut count = 0;
        loop {
            match rest.div_rem(&pm) {
                Ok((q, r)) if r.is_zero() => {
                    rest = q;
                    count += 1;
                },
                _ => break,
            }
        }
        if count > 0 {
            factors.push((p, count));
        }
    }

    Factorization { factors, cofactor: rest }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;

    #[test]
    fn table() {
        assert_eq!(PRIMES.len(), PRIME_COUNT);
        assert_eq!(&PRIMES[..6], &[2, 3, 5, 7, 11, 13]);
        assert_eq!(PRIMES[PRIME_COUNT - 1], 104729);
    }

    #[test]
    fn complete_factorization() {
        let f = factor_small(&Magnitude::from_u32(360));
        assert_eq!(f.factors, vec![(2, 3), (3, 2), (5, 1)]);
        assert!(f.cofactor.is_one());

        let f = factor_small(&Magnitude::from_u32(2 * 104723));
        assert_eq!(f.factors, vec![(2, 1), (104723, 1)]);
    }

    #[test]
    fn large_cofactor() {
        // 2^3 * (2^61 - 1)^2, the Mersenne prime is far beyond the table
        let m61 = Magnitude::from_u64((1 << 61) - 1);
        let n = Magnitude::from_u32(8).mul(&m61).mul(&m61);
        let f = factor_small(&n);
        assert_eq!(f.factors, vec![(2, 3)]);
        assert_eq!(f.cofactor, m61.mul(&m61));
    }
}
