use std::{
    cmp::Ordering,
    collections::BTreeSet,
    fmt,
    ops::{Add, Sub},
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    error::TuningError,
    tuning::primes::{prime_factors, smooth_numbers},
};

/// Exact rational number, always in lowest terms.
///
/// The denominator is positive and the sign lives on the numerator; zero
/// is `0/1`. Because the form is canonical, structural equality is value
/// equality.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ratio {
    numerator: i64,
    denominator: i64,
}

impl Ratio {
    pub const ZERO: Ratio = Ratio {
        numerator: 0,
        denominator: 1,
    };

    pub const UNISON: Ratio = Ratio {
        numerator: 1,
        denominator: 1,
    };

    pub fn new(numerator: i64, denominator: i64) -> Result<Self, TuningError> {
        if denominator == 0 {
            return Err(TuningError::ZeroDenominator);
        }
        Ok(Self::reduced(numerator, denominator))
    }

    /// Reduce by cancelling shared prime exponents. `denominator != 0`.
    fn reduced(numerator: i64, denominator: i64) -> Self {
        if numerator == 0 {
            return Self::ZERO;
        }
        let negative = (numerator < 0) != (denominator < 0);
        let n_factors = prime_factors(numerator.unsigned_abs());
        let d_factors = prime_factors(denominator.unsigned_abs());

        let mut n: u64 = 1;
        let mut d: u64 = 1;
        let (mut i, mut j) = (0, 0);
        // both factor lists are sorted by prime; merge them
        while i < n_factors.len() || j < d_factors.len() {
            let (prime, exponent) = match (n_factors.get(i), d_factors.get(j)) {
                (Some(&(p, a)), Some(&(q, b))) if p == q => {
                    i += 1;
                    j += 1;
                    (p, a as i32 - b as i32)
                }
                (Some(&(p, a)), Some(&(q, _))) if p < q => {
                    i += 1;
                    (p, a as i32)
                }
                (Some(&(p, a)), None) => {
                    i += 1;
                    (p, a as i32)
                }
                (_, Some(&(q, b))) => {
                    j += 1;
                    (q, -(b as i32))
                }
                (None, None) => break,
            };
            match exponent.cmp(&0) {
                Ordering::Greater => n *= prime.pow(exponent as u32),
                Ordering::Less => d *= prime.pow(exponent.unsigned_abs()),
                Ordering::Equal => {}
            }
        }

        let magnitude = n as i64;
        Self {
            numerator: if negative { -magnitude } else { magnitude },
            denominator: d as i64,
        }
    }

    pub fn numerator(&self) -> i64 {
        self.numerator
    }

    pub fn denominator(&self) -> i64 {
        self.denominator
    }

    pub fn to_f64(&self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }

    /// Exact sum, or `None` when the reduced result does not fit in `i64`.
    pub fn checked_add(self, rhs: Ratio) -> Option<Ratio> {
        let (a, b, d) = self.cross(rhs);
        Self::from_wide(a + b, d)
    }

    /// Exact difference, or `None` when the reduced result does not fit in `i64`.
    pub fn checked_sub(self, rhs: Ratio) -> Option<Ratio> {
        let (a, b, d) = self.cross(rhs);
        Self::from_wide(a - b, d)
    }

    /// Both numerators over the common denominator, widened so the
    /// products and their sum cannot overflow.
    fn cross(self, rhs: Ratio) -> (i128, i128, i128) {
        (
            self.numerator as i128 * rhs.denominator as i128,
            rhs.numerator as i128 * self.denominator as i128,
            self.denominator as i128 * rhs.denominator as i128,
        )
    }

    /// Reduce a widened fraction by its gcd and narrow it. `denominator > 0`.
    fn from_wide(numerator: i128, denominator: i128) -> Option<Ratio> {
        if numerator == 0 {
            return Some(Self::ZERO);
        }
        let divisor = gcd(numerator.unsigned_abs(), denominator.unsigned_abs()) as i128;
        Some(Self {
            numerator: i64::try_from(numerator / divisor).ok()?,
            denominator: i64::try_from(denominator / divisor).ok()?,
        })
    }
}

fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

impl Default for Ratio {
    fn default() -> Self {
        Self::UNISON
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

impl Ord for Ratio {
    fn cmp(&self, other: &Self) -> Ordering {
        // denominators are positive, so cross multiplication keeps the order
        let lhs = self.numerator as i128 * other.denominator as i128;
        let rhs = other.numerator as i128 * self.denominator as i128;
        lhs.cmp(&rhs)
    }
}

impl PartialOrd for Ratio {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Panics, like integer addition, if the reduced sum does not fit in
/// `i64`. Intermediate products never overflow; see [`Ratio::checked_add`].
impl Add for Ratio {
    type Output = Ratio;

    fn add(self, rhs: Ratio) -> Ratio {
        match self.checked_add(rhs) {
            Some(sum) => sum,
            None => panic!("ratio overflow: {self} + {rhs}"),
        }
    }
}

/// Panics, like integer subtraction, if the reduced difference does not
/// fit in `i64`; see [`Ratio::checked_sub`].
impl Sub for Ratio {
    type Output = Ratio;

    fn sub(self, rhs: Ratio) -> Ratio {
        match self.checked_sub(rhs) {
            Some(difference) => difference,
            None => panic!("ratio overflow: {self} - {rhs}"),
        }
    }
}

/// Every ratio `x/y` with `x`, `y` both `limit`-smooth, `<= max`, and
/// `y < x < 2y` (strictly inside one octave above unison).
pub fn prime_limited_ratios(limit: u64, max: u64) -> BTreeSet<Ratio> {
    let smooth = smooth_numbers(limit, max);
    let mut ratios = BTreeSet::new();
    for &x in &smooth {
        for &y in &smooth {
            if y < x && x < 2 * y {
                ratios.insert(Ratio::reduced(x as i64, y as i64));
            }
        }
    }
    ratios
}
