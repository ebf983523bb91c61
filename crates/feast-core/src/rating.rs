//! # Rating Aggregation
//!
//! A restaurant's rating is the arithmetic mean of its review stars, rounded
//! to one decimal place, half-up at the tenths digit.
//!
//! ## Representation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Stored:      Rating(43)   (integer tenths, exact)                      │
//! │  JSON:        4.3          (f64, display only)                          │
//! │                                                                         │
//! │  mean_of([4, 4, 5, 4])                                                  │
//! │      sum = 17, count = 4, exact mean = 4.25                             │
//! │      tenths = floor((17 * 20 + 4) / (2 * 4)) = floor(43.0) = 43         │
//! │      → 4.3                                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rounding is done in integers: `floor(sum * 10 / count + 1/2)` is the same as
//! `(20 * sum + count) / (2 * count)` with truncating division, which never
//! touches floating point.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::{MAX_STAR, MIN_STAR};

// =============================================================================
// Rating
// =============================================================================

/// A one-decimal rating stored as tenths (`43` means `4.3`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type), sqlx(transparent))]
pub struct Rating(i64);

impl Rating {
    /// Creates a rating from tenths.
    #[inline]
    pub const fn from_tenths(tenths: i64) -> Self {
        Rating(tenths)
    }

    /// Rounds an arbitrary value to the nearest tenth (half-up).
    ///
    /// Used for query filters such as `min_rating=4.5`.
    pub fn from_f64(value: f64) -> Self {
        Rating((value * 10.0).round() as i64)
    }

    #[inline]
    pub const fn tenths(&self) -> i64 {
        self.0
    }

    /// Display value.
    #[inline]
    pub fn as_f64(&self) -> f64 {
        self.0 as f64 / 10.0
    }

    /// Mean of `stars` rounded to one decimal, half-up.
    ///
    /// Returns `None` for an empty set; callers leave the cached rating as is.
    ///
    /// ## Example
    /// ```rust
    /// use feast_core::rating::Rating;
    ///
    /// assert_eq!(Rating::mean_of(&[5, 4, 3]), Some(Rating::from_tenths(40)));
    /// assert_eq!(Rating::mean_of(&[4, 4, 5, 4]), Some(Rating::from_tenths(43)));
    /// assert_eq!(Rating::mean_of(&[]), None);
    /// ```
    pub fn mean_of(stars: &[i64]) -> Option<Self> {
        if stars.is_empty() {
            return None;
        }
        let sum: i64 = stars.iter().sum();
        let count = stars.len() as i64;
        Some(Rating((sum * 20 + count) / (2 * count)))
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.0 / 10, self.0 % 10)
    }
}

impl Serialize for Rating {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

impl<'de> Deserialize<'de> for Rating {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Ok(Rating::from_f64(value))
    }
}

// =============================================================================
// Star Distribution
// =============================================================================

/// Histogram of review stars over 1..=5.
///
/// Serialized with the star as key: `{"1":0,"2":1,"3":0,"4":3,"5":2}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StarDistribution {
    #[serde(rename = "1")]
    pub one: i64,
    #[serde(rename = "2")]
    pub two: i64,
    #[serde(rename = "3")]
    pub three: i64,
    #[serde(rename = "4")]
    pub four: i64,
    #[serde(rename = "5")]
    pub five: i64,
}

impl StarDistribution {
    /// Builds a histogram from `(star, count)` rows as returned by a
    /// `GROUP BY star` query. Stars outside 1..=5 are ignored.
    pub fn from_counts<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = (i64, i64)>,
    {
        let mut dist = StarDistribution::default();
        for (star, count) in rows {
            if let Some(slot) = dist.slot_mut(star) {
                *slot += count;
            }
        }
        dist
    }

    /// Builds a histogram from individual stars.
    pub fn from_stars(stars: &[i64]) -> Self {
        Self::from_counts(stars.iter().map(|&s| (s, 1)))
    }

    /// Count for one star value (0 outside 1..=5).
    pub fn count(&self, star: i64) -> i64 {
        match star {
            1 => self.one,
            2 => self.two,
            3 => self.three,
            4 => self.four,
            5 => self.five,
            _ => 0,
        }
    }

    /// Number of reviews in the histogram.
    pub fn total(&self) -> i64 {
        (MIN_STAR..=MAX_STAR).map(|s| self.count(s)).sum()
    }

    fn slot_mut(&mut self, star: i64) -> Option<&mut i64> {
        match star {
            1 => Some(&mut self.one),
            2 => Some(&mut self.two),
            3 => Some(&mut self.three),
            4 => Some(&mut self.four),
            5 => Some(&mut self.five),
            _ => None,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_of_reference_cases() {
        assert_eq!(Rating::mean_of(&[5, 4, 3]).unwrap().as_f64(), 4.0);
        assert_eq!(Rating::mean_of(&[5]).unwrap().as_f64(), 5.0);
        assert_eq!(Rating::mean_of(&[]), None);
    }

    #[test]
    fn test_mean_rounds_half_up() {
        // 4.25 → 4.3
        assert_eq!(Rating::mean_of(&[4, 4, 5, 4]), Some(Rating::from_tenths(43)));
        // 4.333.. → 4.3
        assert_eq!(Rating::mean_of(&[4, 4, 5]), Some(Rating::from_tenths(43)));
        // 4.666.. → 4.7
        assert_eq!(Rating::mean_of(&[5, 5, 4]), Some(Rating::from_tenths(47)));
        // 1.05 → 1.1 (twenty stars, one of them a 2)
        let mut stars = vec![1; 19];
        stars.push(2);
        assert_eq!(Rating::mean_of(&stars), Some(Rating::from_tenths(11)));
    }

    #[test]
    fn test_display_and_json() {
        let rating = Rating::from_tenths(43);
        assert_eq!(rating.to_string(), "4.3");
        assert_eq!(Rating::from_tenths(50).to_string(), "5.0");
        assert_eq!(serde_json::to_string(&rating).unwrap(), "4.3");

        let back: Rating = serde_json::from_str("4.3").unwrap();
        assert_eq!(back, rating);
    }

    #[test]
    fn test_from_f64_rounds_to_tenths() {
        assert_eq!(Rating::from_f64(4.5), Rating::from_tenths(45));
        assert_eq!(Rating::from_f64(3.96), Rating::from_tenths(40));
    }

    #[test]
    fn test_distribution() {
        let dist = StarDistribution::from_stars(&[5, 4, 4, 2, 5, 4]);
        assert_eq!(dist.count(5), 2);
        assert_eq!(dist.count(4), 3);
        assert_eq!(dist.count(3), 0);
        assert_eq!(dist.count(2), 1);
        assert_eq!(dist.total(), 6);

        let json = serde_json::to_value(dist).unwrap();
        assert_eq!(json["4"], 3);
        assert_eq!(json["1"], 0);
    }

    #[test]
    fn test_distribution_ignores_out_of_range() {
        let dist = StarDistribution::from_counts(vec![(0, 3), (6, 1), (3, 2)]);
        assert_eq!(dist.total(), 2);
    }
}
