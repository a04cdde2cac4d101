//! Cardinality intervals and their algebra.
//!
//! A [`Cardinality`] is an interval `{min,max}` of non-negative integers where `max` may be
//! unbounded. The matcher reads it in two ways: as the multiplicity declared on a triple
//! expression, and as the set of `k` such that a bag of triples splits into `k` matches of an
//! expression.

use std::fmt;
use std::ops::Add;

/// A `{min,max}` interval, `max` being `None` when unbounded.
///
/// Any range with `max < min` is canonicalized to [`Cardinality::EMPTY`] so that all empty
/// intervals compare and hash equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cardinality {
    min: u32,
    max: Option<u32>,
}

impl Cardinality {
    /// The empty interval.
    pub const EMPTY: Self = Self {
        min: 1,
        max: Some(0),
    };
    /// `{0,0}`.
    pub const ZERO: Self = Self {
        min: 0,
        max: Some(0),
    };
    /// `{1,1}`, the default multiplicity of a triple expression.
    pub const ONE: Self = Self {
        min: 1,
        max: Some(1),
    };
    /// `?`.
    pub const OPTIONAL: Self = Self {
        min: 0,
        max: Some(1),
    };
    /// `*`.
    pub const STAR: Self = Self { min: 0, max: None };
    /// `+`.
    pub const PLUS: Self = Self { min: 1, max: None };

    /// Builds `{min,max}`, canonicalizing illegal ranges to [`Cardinality::EMPTY`].
    #[inline]
    pub fn new(min: u32, max: Option<u32>) -> Self {
        match max {
            Some(max) if max < min => Self::EMPTY,
            _ => Self { min, max },
        }
    }

    /// `{n,n}`.
    #[inline]
    pub fn exactly(n: u32) -> Self {
        Self::new(n, Some(n))
    }

    /// `{n,*}`.
    #[inline]
    pub fn at_least(n: u32) -> Self {
        Self::new(n, None)
    }

    /// The lower bound.
    #[inline]
    pub fn min(&self) -> u32 {
        self.min
    }

    /// The upper bound, `None` if unbounded.
    #[inline]
    pub fn max(&self) -> Option<u32> {
        self.max
    }

    /// Returns true for the canonical empty interval.
    #[inline]
    pub fn is_empty(&self) -> bool {
        *self == Self::EMPTY
    }

    /// Returns true if `max` is unbounded.
    #[inline]
    pub fn is_unbounded(&self) -> bool {
        self.max.is_none()
    }

    /// Returns true if `count` lies in the interval.
    #[inline]
    pub fn contains(&self, count: u32) -> bool {
        count >= self.min && self.max.is_none_or(|max| count <= max)
    }

    /// Returns true for the multiplicities a SORBE form allows on any sub-expression:
    /// `?`, `*`, `+` and `{0,0}`.
    #[inline]
    pub fn is_standard(&self) -> bool {
        matches!(*self, Self::OPTIONAL | Self::STAR | Self::PLUS | Self::ZERO)
    }

    /// Intersection of intervals.
    #[must_use]
    pub fn intersect(self, other: Self) -> Self {
        if self.is_empty() || other.is_empty() {
            return Self::EMPTY;
        }
        let max = match (self.max, other.max) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (Some(a), None) | (None, Some(a)) => Some(a),
            (None, None) => None,
        };
        Self::new(self.min.max(other.min), max)
    }

    /// The interval of `k` such that `count` occurrences can be split into `k` groups, each
    /// group size lying in `cardinality`.
    pub fn div(count: u32, cardinality: Self) -> Self {
        if cardinality.is_empty() {
            return Self::EMPTY;
        }
        if count == 0 {
            return if cardinality.min == 0 {
                Self::STAR
            } else {
                Self::ZERO
            };
        }
        let lower = match cardinality.max {
            Some(0) => return Self::EMPTY,
            Some(max) => count.div_ceil(max),
            None => 1,
        };
        let upper = if cardinality.min == 0 {
            None
        } else {
            Some(count / cardinality.min)
        };
        Self::new(lower, upper)
    }
}

/// Sum of intervals: the counts reachable by adding one count from each side.
impl Add for Cardinality {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        if self.is_empty() || other.is_empty() {
            return Self::EMPTY;
        }
        let max = match (self.max, other.max) {
            (Some(a), Some(b)) => a.checked_add(b),
            _ => None,
        };
        Self::new(self.min.saturating_add(other.min), max)
    }
}

impl Default for Cardinality {
    fn default() -> Self {
        Self::ONE
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("{}");
        }
        match (self.min, self.max) {
            (0, None) => f.write_str("*"),
            (1, None) => f.write_str("+"),
            (0, Some(1)) => f.write_str("?"),
            (min, None) => write!(f, "{{{min},}}"),
            (min, Some(max)) if min == max => write!(f, "{{{min}}}"),
            (min, Some(max)) => write!(f, "{{{min},{max}}}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn illegal_range_is_canonical_empty() {
        assert_eq!(Cardinality::new(3, Some(2)), Cardinality::EMPTY);
        assert_eq!(Cardinality::new(7, Some(0)), Cardinality::EMPTY);
        assert!(Cardinality::new(5, Some(1)).is_empty());
        assert!(!Cardinality::ZERO.is_empty());
    }

    #[test]
    fn add_zero_is_neutral() {
        for x in [
            Cardinality::ZERO,
            Cardinality::ONE,
            Cardinality::STAR,
            Cardinality::PLUS,
            Cardinality::new(2, Some(5)),
            Cardinality::EMPTY,
        ] {
            assert_eq!(Cardinality::ZERO + x, x);
        }
    }

    #[test]
    fn intersect_star_is_neutral() {
        for x in [
            Cardinality::ZERO,
            Cardinality::OPTIONAL,
            Cardinality::PLUS,
            Cardinality::new(2, Some(5)),
            Cardinality::EMPTY,
        ] {
            assert_eq!(Cardinality::STAR.intersect(x), x);
        }
    }

    #[test]
    fn add_and_intersect() {
        assert_eq!(
            Cardinality::ONE + Cardinality::new(2, Some(3)),
            Cardinality::new(3, Some(4))
        );
        assert_eq!(Cardinality::PLUS + Cardinality::ONE, Cardinality::at_least(2));
        assert_eq!(
            Cardinality::new(1, Some(4)).intersect(Cardinality::new(3, None)),
            Cardinality::new(3, Some(4))
        );
        assert!(Cardinality::ONE.intersect(Cardinality::ZERO).is_empty());
    }

    #[test]
    fn div_by_zero_cardinality() {
        assert_eq!(Cardinality::div(0, Cardinality::ZERO), Cardinality::STAR);
        assert_eq!(Cardinality::div(1, Cardinality::ZERO), Cardinality::EMPTY);
        assert_eq!(Cardinality::div(4, Cardinality::ZERO), Cardinality::EMPTY);
    }

    #[test]
    fn div_splits_counts() {
        // 2 occurrences of a {1,3} constraint: exactly one group of 1..3, or two groups of 1.
        let card = Cardinality::new(1, Some(3));
        assert!(Cardinality::div(2, card).contains(1));
        assert_eq!(Cardinality::div(2, card), Cardinality::new(1, Some(2)));
        assert!(!Cardinality::div(4, card).contains(1));
        assert!(!Cardinality::div(0, card).contains(1));
        assert_eq!(Cardinality::div(0, card), Cardinality::ZERO);
        assert_eq!(Cardinality::div(5, Cardinality::STAR), Cardinality::at_least(1));
        assert_eq!(Cardinality::div(6, Cardinality::exactly(2)), Cardinality::exactly(3));
        assert!(Cardinality::div(5, Cardinality::exactly(2)).is_empty());
    }

    #[test]
    fn standard_cardinalities() {
        assert!(Cardinality::STAR.is_standard());
        assert!(Cardinality::PLUS.is_standard());
        assert!(Cardinality::OPTIONAL.is_standard());
        assert!(Cardinality::ZERO.is_standard());
        assert!(!Cardinality::ONE.is_standard());
        assert!(!Cardinality::new(2, Some(4)).is_standard());
    }

    #[test]
    fn display() {
        assert_eq!(Cardinality::STAR.to_string(), "*");
        assert_eq!(Cardinality::PLUS.to_string(), "+");
        assert_eq!(Cardinality::OPTIONAL.to_string(), "?");
        assert_eq!(Cardinality::exactly(3).to_string(), "{3}");
        assert_eq!(Cardinality::new(1, Some(3)).to_string(), "{1,3}");
        assert_eq!(Cardinality::at_least(2).to_string(), "{2,}");
    }
}
