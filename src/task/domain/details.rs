//! Validated task detail values: name, cost and due date.

use super::TaskDomainError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Task name, unique across the collection when compared case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskName(String);

impl TaskName {
    /// Largest name length representable in the current `PostgreSQL` schema.
    pub const MAX_CHARS: usize = 255;

    /// Creates a validated, trimmed task name.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTaskName`] when the trimmed value is
    /// empty, or [`TaskDomainError::TaskNameTooLong`] when it exceeds
    /// [`TaskName::MAX_CHARS`] characters.
    pub fn new(value: impl Into<String>) -> Result<Self, TaskDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TaskDomainError::EmptyTaskName);
        }
        let actual = trimmed.chars().count();
        if actual > Self::MAX_CHARS {
            return Err(TaskDomainError::TaskNameTooLong {
                max: Self::MAX_CHARS,
                actual,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the name as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the key used for case-insensitive uniqueness checks.
    #[must_use]
    pub fn comparison_key(&self) -> String {
        self.0.to_lowercase()
    }
}

impl AsRef<str> for TaskName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for TaskName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Non-negative monetary cost held in minor units (cents).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Cost(u64);

impl Cost {
    /// Largest cost representable in the current `PostgreSQL` schema.
    const MAX_PERSISTED_CENTS: u64 = i64::MAX.unsigned_abs();

    /// Creates a cost from a number of cents.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::CostOutOfRange`] when the value exceeds the
    /// schema-backed maximum (`i64::MAX`).
    pub const fn from_cents(cents: u64) -> Result<Self, TaskDomainError> {
        if cents > Self::MAX_PERSISTED_CENTS {
            return Err(TaskDomainError::CostOutOfRange(cents));
        }
        Ok(Self(cents))
    }

    /// Parses decimal text such as `"12"`, `"12.5"` or `"12,50"`.
    ///
    /// Either `.` or `,` separates the fractional part, which holds at most
    /// two digits. Signs, exponents and grouping characters are rejected.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidCost`] when the text is malformed or
    /// [`TaskDomainError::CostOutOfRange`] when it is too large to store.
    pub fn parse(raw: &str) -> Result<Self, TaskDomainError> {
        let invalid = || TaskDomainError::InvalidCost(raw.to_owned());
        let trimmed = raw.trim();
        let (whole, fraction) = match trimmed.split_once(['.', ',']) {
            Some((_, "")) => return Err(invalid()),
            Some(parts) => parts,
            None => (trimmed, ""),
        };

        let is_digits = |text: &str| text.bytes().all(|byte| byte.is_ascii_digit());
        if whole.is_empty() || !is_digits(whole) || fraction.len() > 2 || !is_digits(fraction) {
            return Err(invalid());
        }

        let whole_units: u64 = whole.parse().map_err(|_| invalid())?;
        let fraction_cents: u64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<u64>().map_err(|_| invalid())? * 10,
            _ => fraction.parse().map_err(|_| invalid())?,
        };
        let cents = whole_units
            .checked_mul(100)
            .and_then(|value| value.checked_add(fraction_cents))
            .ok_or_else(invalid)?;
        Self::from_cents(cents)
    }

    /// Returns the cost in cents.
    #[must_use]
    pub const fn cents(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Cost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0.div_euclid(100), self.0.rem_euclid(100))
    }
}

/// Editable task attributes. The order position is written only by the
/// ordering operations and is not part of this set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDetails {
    name: TaskName,
    cost: Cost,
    due_date: DateTime<Utc>,
}

impl TaskDetails {
    /// Bundles validated task attributes.
    #[must_use]
    pub const fn new(name: TaskName, cost: Cost, due_date: DateTime<Utc>) -> Self {
        Self {
            name,
            cost,
            due_date,
        }
    }

    /// Returns the task name.
    #[must_use]
    pub const fn name(&self) -> &TaskName {
        &self.name
    }

    /// Returns the task cost.
    #[must_use]
    pub const fn cost(&self) -> Cost {
        self.cost
    }

    /// Returns the task due date.
    #[must_use]
    pub const fn due_date(&self) -> DateTime<Utc> {
        self.due_date
    }
}
