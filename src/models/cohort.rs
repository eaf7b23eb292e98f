//! Birth-cohort windows
//!
//! A [`CohortRange`] is an inclusive window of birth years. It is used for
//! sample restrictions, for the compliance reference window and to name the
//! cohort dummies a regression includes.

use std::fmt;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use super::columns::cohort_dummy;

/// Inclusive window of birth years
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CohortRange {
    /// First birth year (inclusive)
    pub first: i32,
    /// Last birth year (inclusive)
    pub last: i32,
}

/// Every cohort present in the data
pub const FULL_SPAN: CohortRange = CohortRange::new(1929, 1965);

/// Cohorts for which compliance (actual service) is observed
pub const CORE_COHORTS: CohortRange = CohortRange::new(1958, 1962);

impl CohortRange {
    /// Create a window from its first and last year
    #[must_use]
    pub const fn new(first: i32, last: i32) -> Self {
        Self { first, last }
    }

    /// A window holding exactly one cohort
    #[must_use]
    pub const fn single(year: i32) -> Self {
        Self::new(year, year)
    }

    /// Whether `year` falls inside the window
    #[must_use]
    pub const fn contains(&self, year: i32) -> bool {
        self.first <= year && year <= self.last
    }

    /// Whether the window is a subset of `other`
    #[must_use]
    pub const fn within(&self, other: &Self) -> bool {
        other.first <= self.first && self.last <= other.last
    }

    /// Whether the window is well formed (`first <= last`)
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.first <= self.last
    }

    /// The years of the window in ascending order
    #[must_use]
    pub fn years(&self) -> RangeInclusive<i32> {
        self.first..=self.last
    }

    /// Number of cohorts in the window
    #[must_use]
    pub fn len(&self) -> usize {
        if self.is_valid() {
            (self.last - self.first + 1) as usize
        } else {
            0
        }
    }

    /// Whether the window holds no cohorts
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dummy names for every cohort of the window
    #[must_use]
    pub fn dummy_names(&self) -> Vec<String> {
        self.years().map(cohort_dummy).collect()
    }

    /// Dummy names for the window with its first cohort left out
    ///
    /// The first cohort is the baseline absorbed by the constant, e.g. the
    /// 1958-1962 window yields the dummies for 1959 to 1962.
    #[must_use]
    pub fn dummies_without_baseline(&self) -> Vec<String> {
        self.years().skip(1).map(cohort_dummy).collect()
    }
}

impl fmt::Display for CohortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.first == self.last {
            write!(f, "{}", self.first)
        } else {
            write!(f, "{}-{}", self.first, self.last)
        }
    }
}
