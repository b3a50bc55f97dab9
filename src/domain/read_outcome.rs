//! Fail-soft read results
//!
//! Pure reads never error out to the caller. Instead they return a value that is either fresh or
//! a degraded default carrying the reason the lookup failed, so "zero balance" and
//! "lookup failed" stay distinguishable.

use serde::Serialize;

/// Outcome of a fail-soft read
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReadOutcome<T> {
    /// The lookup succeeded
    Fresh { value: T },
    /// The lookup failed and `value` is the documented default
    Degraded { value: T, reason: String },
}

impl<T> ReadOutcome<T> {
    pub fn fresh(value: T) -> Self {
        ReadOutcome::Fresh { value }
    }

    pub fn degraded(value: T, reason: impl Into<String>) -> Self {
        ReadOutcome::Degraded {
            value,
            reason: reason.into(),
        }
    }

    /// The value, regardless of whether it is fresh or a default
    pub fn value(&self) -> &T {
        match self {
            ReadOutcome::Fresh { value } | ReadOutcome::Degraded { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            ReadOutcome::Fresh { value } | ReadOutcome::Degraded { value, .. } => value,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, ReadOutcome::Degraded { .. })
    }

    /// Failure reason for degraded reads
    pub fn reason(&self) -> Option<&str> {
        match self {
            ReadOutcome::Fresh { .. } => None,
            ReadOutcome::Degraded { reason, .. } => Some(reason),
        }
    }

    /// Convert into a `Result`, discarding the default on failure
    pub fn into_result(self) -> Result<T, String> {
        match self {
            ReadOutcome::Fresh { value } => Ok(value),
            ReadOutcome::Degraded { reason, .. } => Err(reason),
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> ReadOutcome<U> {
        match self {
            ReadOutcome::Fresh { value } => ReadOutcome::Fresh { value: f(value) },
            ReadOutcome::Degraded { value, reason } => ReadOutcome::Degraded {
                value: f(value),
                reason,
            },
        }
    }
}

impl<T: Default> ReadOutcome<T> {
    /// Degraded read carrying `T::default()`
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::degraded(T::default(), reason)
    }

    /// Fresh on `Ok`, default-valued degraded on `Err`
    pub fn from_result<E: std::fmt::Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::fresh(value),
            Err(e) => Self::failed(e.to_string()),
        }
    }
}
