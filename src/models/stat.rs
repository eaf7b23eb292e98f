//! Table cell values

use serde::{Deserialize, Serialize};

/// A statistic that may not exist for a column
///
/// Terms outside a column's regression and percent changes of columns that
/// report none are `NotApplicable`, never a zero. Serialized as the value or
/// `null`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Stat<T> {
    Value(T),
    NotApplicable,
}

impl<T> Stat<T> {
    #[must_use]
    pub const fn is_applicable(&self) -> bool {
        matches!(self, Self::Value(_))
    }

    /// Borrow the value, if any
    #[must_use]
    pub const fn value(&self) -> Option<&T> {
        match self {
            Self::Value(v) => Some(v),
            Self::NotApplicable => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Stat<U> {
        match self {
            Self::Value(v) => Stat::Value(f(v)),
            Self::NotApplicable => Stat::NotApplicable,
        }
    }
}

impl<T> From<Option<T>> for Stat<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::NotApplicable, Self::Value)
    }
}
