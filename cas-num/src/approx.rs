/// The denominator bound used when converting a non-integral `f64` to a rational.
pub const DEFAULT_MAX_DENOMINATOR: u64 = 1000;

/// Tolerance under which a candidate fraction is considered an exact match.
const EPSILON: f64 = 1e-12;

/// Approximates a non-negative float as a fraction `(numerator, denominator)` whose denominator
/// does not exceed `max_den`.
///
/// The fractional part is located in the Stern–Brocot tree by repeatedly taking the mediant of
/// the current lower and upper bounds, descending towards the target, and remembering the closest
/// candidate seen. The search ends as soon as a candidate is within [`EPSILON`] of the target or
/// the next mediant's denominator would exceed the bound.
///
/// See [Wikipedia](https://en.wikipedia.org/wiki/Stern%E2%80%93Brocot_tree) for more information.
pub fn approximate(f: f64, max_den: u64) -> (u64, u64) {
    let whole = f.trunc();
    let frac = f - whole;
    let whole = whole as u64;
    let max_den = max_den.max(1);

    // best candidate so far, as a fraction of the fractional part
    let (mut best_n, mut best_d) = if frac < 0.5 { (0, 1) } else { (1, 1) };
    let mut best_err = (frac - best_n as f64).abs();

    let (mut lo_n, mut lo_d) = (0u64, 1u64);
    let (mut hi_n, mut hi_d) = (1u64, 1u64);
    while best_err > EPSILON {
        let (mid_n, mid_d) = (lo_n + hi_n, lo_d + hi_d);
        if mid_d > max_den {
            break;
        }

        let mid = mid_n as f64 / mid_d as f64;
        let err = (frac - mid).abs();
        if err < best_err {
            (best_n, best_d, best_err) = (mid_n, mid_d, err);
        }

        if mid < frac {
            (lo_n, lo_d) = (mid_n, mid_d);
        } else {
            (hi_n, hi_d) = (mid_n, mid_d);
        }
    }

    (whole * best_d + best_n, best_d)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;

    #[test]
    fn exact_fractions() {
        assert_eq!(approximate(0.5, 1000), (1, 2));
        assert_eq!(approximate(1.0 / 3.0, 1000), (1, 3));
        assert_eq!(approximate(2.75, 1000), (11, 4));
        assert_eq!(approximate(0.125, 1000), (1, 8));
    }

    #[test]
    fn bounded_denominator() {
        let (n, d) = approximate(std::f64::consts::PI, 1000);
        assert_eq!((n, d), (355, 113));

        let (n, d) = approximate(std::f64::consts::PI, 10);
        assert_eq!((n, d), (22, 7));
    }

    #[test]
    fn integers() {
        assert_eq!(approximate(7.0, 1000), (7, 1));
        assert_eq!(approximate(0.0, 1000), (0, 1));
    }
}
