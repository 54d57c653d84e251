//! Small number-theory and formatting helpers shared by topic generators.

use std::fmt;

use tracing::warn;

use crate::exercise_engine::session::PrngSession;

/// Returned by [`prime_in_range`] when no prime turns up in time.
pub const PRIME_FALLBACK: i64 = 2;

pub fn is_prime(n: i64) -> bool {
    if n <= 1 {
        return false;
    }
    if n <= 3 {
        return true;
    }
    if n % 2 == 0 || n % 3 == 0 {
        return false;
    }
    let mut i = 5;
    while i * i <= n {
        if n % i == 0 || n % (i + 2) == 0 {
            return false;
        }
        i += 6;
    }
    true
}

/// Sample `[min, max]` for a prime, at most `max_attempts` times.
pub fn prime_in_range(session: &mut PrngSession, min: i64, max: i64, max_attempts: usize) -> i64 {
    for _ in 0..max_attempts {
        let n = session.int(min, max);
        if is_prime(n) {
            return n;
        }
    }
    warn!(min, max, max_attempts, "no prime found in range, using fallback");
    PRIME_FALLBACK
}

pub fn gcd(a: i64, b: i64) -> i64 {
    let (mut a, mut b) = (a.abs(), b.abs());
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a
}

pub fn lcm(a: i64, b: i64) -> i64 {
    if a == 0 || b == 0 {
        return 0;
    }
    (a * b).abs() / gcd(a, b)
}

/// Positive divisors of `n` in ascending order.  Walks `i` up to `√n` and
/// takes each pair `i`, `n / i`.
pub fn divisors(n: i64) -> Vec<i64> {
    let n = n.abs();
    let mut low = Vec::new();
    let mut high = Vec::new();
    let mut i = 1;
    while i <= n / i {
        if n % i == 0 {
            low.push(i);
            if i != n / i {
                high.push(n / i);
            }
        }
        i += 1;
    }
    low.extend(high.into_iter().rev());
    low
}

/// Reduce `num/den` to lowest terms.
pub fn simplify_fraction(num: i64, den: i64) -> (i64, i64) {
    let g = gcd(num, den).max(1);
    (num / g, den / g)
}

/// Integers print bare; everything else with two decimals, `.00` dropped.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.is_finite() {
        return format!("{}", n as i64);
    }
    let s = format!("{:.2}", n);
    match s.strip_suffix(".00") {
        Some(stripped) => stripped.to_string(),
        None => s,
    }
}

/// Round to two decimals.
pub fn round2(n: f64) -> f64 {
    (n * 100.0).round() / 100.0
}

/// A two-decimal amount held as whole hundredths, so equality is exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Hundredths(pub i64);

impl Hundredths {
    pub fn from_f64(n: f64) -> Self {
        Hundredths((n * 100.0).round() as i64)
    }

    pub fn as_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl fmt::Display for Hundredths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_number(self.as_f64()))
    }
}
