use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Div, Mul, Sub};

/// Tolerance used only when a rational must be reported as an `f64` (CLI
/// output, proptest assertions against reference floats). Exact rational
/// comparisons never use this.
pub const EPSILON: f64 = 1e-9;

/// Largest denominator the continued-fraction approximation in
/// `from_float` will produce. Bounds intermediate `i128` products during
/// subsequent arithmetic.
const MAX_DENOMINATOR: i128 = 1_000_000_000;

/// Exact rational number used as the engine's time representation.
///
/// Always stored reduced with a positive denominator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fraction {
    pub numerator: i128,
    pub denominator: i128,
}

impl Fraction {
    /// Construct and reduce `numerator/denominator`. Panics on a zero
    /// denominator, matching the behavior of the arithmetic operators below
    /// (which cannot return `Result`); combinator constructors that accept
    /// notation-derived denominators should call [`Fraction::try_new`]
    /// instead.
    pub fn new(numerator: i128, denominator: i128) -> Self {
        Self::try_new(numerator, denominator).expect("denominator must be non-zero")
    }

    /// Fallible constructor for inputs that might carry a zero denominator
    /// (mini-notation, user-supplied factors).
    pub fn try_new(numerator: i128, denominator: i128) -> Result<Self, CoreError> {
        if denominator == 0 {
            return Err(CoreError::invalid(
                "Fraction::new",
                "denominator cannot be zero",
            ));
        }
        let mut f = Fraction {
            numerator,
            denominator,
        };
        f.reduce();
        Ok(f)
    }

    pub fn from_int(n: i64) -> Self {
        Fraction {
            numerator: n as i128,
            denominator: 1,
        }
    }

    /// Best rational approximation of `f` with a bounded denominator, via a
    /// continued-fraction expansion (Stern-Brocot style convergents). This
    /// replaces a fixed-scale `*1_000_000` approximation: it converges
    /// exactly for any value that is itself a "nice" rational (e.g.
    /// `0.333333...` truncated input still lands near `1/3`) and never
    /// overflows, since the search stops as soon as the denominator would
    /// exceed `MAX_DENOMINATOR`.
    pub fn from_float(f: f64) -> Self {
        if !f.is_finite() {
            return Fraction::from_int(0);
        }
        if f == 0.0 {
            return Fraction::from_int(0);
        }

        let negative = f < 0.0;
        let f = f.abs();

        let mut h_prev: i128 = 1;
        let mut h_curr: i128 = f.trunc() as i128;
        let mut k_prev: i128 = 0;
        let mut k_curr: i128 = 1;

        let mut remainder = f.fract();
        let mut x = f;

        for _ in 0..64 {
            if remainder.abs() < 1e-12 || k_curr > MAX_DENOMINATOR {
                break;
            }
            x = 1.0 / remainder;
            let a = x.trunc() as i128;
            let h_next = a * h_curr + h_prev;
            let k_next = a * k_curr + k_prev;
            if k_next > MAX_DENOMINATOR {
                break;
            }
            h_prev = h_curr;
            k_prev = k_curr;
            h_curr = h_next;
            k_curr = k_next;
            remainder = x.fract();
        }

        let numerator = if negative { -h_curr } else { h_curr };
        Fraction::new(numerator, k_curr)
    }

    pub fn to_float(&self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }

    fn reduce(&mut self) {
        let gcd = Self::gcd(self.numerator.abs(), self.denominator.abs());
        if gcd != 0 {
            self.numerator /= gcd;
            self.denominator /= gcd;
        }
        if self.denominator < 0 {
            self.numerator = -self.numerator;
            self.denominator = -self.denominator;
        }
    }

    fn gcd(mut a: i128, mut b: i128) -> i128 {
        while b != 0 {
            let temp = b;
            b = a % b;
            a = temp;
        }
        if a == 0 {
            1
        } else {
            a
        }
    }

    pub fn lcm(a: i128, b: i128) -> i128 {
        if a == 0 || b == 0 {
            return 0;
        }
        (a / Self::gcd(a, b)) * b
    }

    pub fn reciprocal(self) -> Self {
        Fraction::new(self.denominator, self.numerator)
    }

    pub fn is_zero(&self) -> bool {
        self.numerator == 0
    }

    pub fn is_negative(&self) -> bool {
        self.numerator < 0
    }

    pub fn abs(self) -> Self {
        Fraction::new(self.numerator.abs(), self.denominator)
    }

    /// Round down to the nearest integer (towards negative infinity).
    pub fn floor(self) -> Self {
        let result = self.numerator.div_euclid(self.denominator);
        Fraction::from_int(result as i64)
    }

    /// Round up to the nearest integer.
    pub fn ceil(self) -> Self {
        let floor = self.floor();
        if floor == self {
            floor
        } else {
            floor + Fraction::from_int(1)
        }
    }

    /// Floored modulo: `self - (self / other).floor() * other`. Used by
    /// cycle-indexing combinators (`rem_euclid` for rationals).
    pub fn rem_euclid(self, other: Self) -> Self {
        let q = (self / other).floor();
        self - q * other
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.denominator == 1 {
            write!(f, "{}", self.numerator)
        } else {
            write!(f, "{}/{}", self.numerator, self.denominator)
        }
    }
}

impl From<i64> for Fraction {
    fn from(n: i64) -> Self {
        Fraction::from_int(n)
    }
}

impl From<f64> for Fraction {
    fn from(f: f64) -> Self {
        Fraction::from_float(f)
    }
}

impl From<(i64, i64)> for Fraction {
    fn from((num, den): (i64, i64)) -> Self {
        Fraction::new(num as i128, den as i128)
    }
}

impl Add for Fraction {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        let lcm = Self::lcm(self.denominator, other.denominator);
        let num1 = self.numerator * (lcm / self.denominator);
        let num2 = other.numerator * (lcm / other.denominator);
        Fraction::new(num1 + num2, lcm)
    }
}

impl Sub for Fraction {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        let lcm = Self::lcm(self.denominator, other.denominator);
        let num1 = self.numerator * (lcm / self.denominator);
        let num2 = other.numerator * (lcm / other.denominator);
        Fraction::new(num1 - num2, lcm)
    }
}

impl Mul for Fraction {
    type Output = Self;

    fn mul(self, other: Self) -> Self {
        Fraction::new(
            self.numerator * other.numerator,
            self.denominator * other.denominator,
        )
    }
}

impl Div for Fraction {
    type Output = Self;

    #[allow(clippy::suspicious_arithmetic_impl)]
    fn div(self, other: Self) -> Self {
        self * other.reciprocal()
    }
}

impl PartialOrd for Fraction {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Fraction {
    fn cmp(&self, other: &Self) -> Ordering {
        let lcm = Self::lcm(self.denominator, other.denominator);
        let num1 = self.numerator * (lcm / self.denominator);
        let num2 = other.numerator * (lcm / other.denominator);
        num1.cmp(&num2)
    }
}
