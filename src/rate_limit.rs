// Per-user daily limit on photo uploads.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{Local, NaiveDate};

/// Photos one user may upload per calendar day.
pub const UPLOAD_LIMIT_PER_DAY: usize = 25;

/// Error returned when the daily upload limit is reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadLimitError {
    pub max: usize,
}

impl std::fmt::Display for UploadLimitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Upload limit reached: max {} photos per day", self.max)
    }
}

impl std::error::Error for UploadLimitError {}

/// Thread-safe in-memory upload counter. Counts reset when the date changes.
#[derive(Debug, Clone)]
pub struct UploadLimiter {
    inner: Arc<Mutex<HashMap<i64, (NaiveDate, usize)>>>,
    max: usize,
}

impl UploadLimiter {
    pub fn new() -> Self {
        Self::with_limit(UPLOAD_LIMIT_PER_DAY)
    }

    pub fn with_limit(max: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            max,
        }
    }

    fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    /// Check whether the user may upload another photo today.
    pub fn check_limit(&self, user_id: i64) -> Result<(), UploadLimitError> {
        self.check_limit_on(user_id, Self::today())
    }

    pub fn check_limit_on(&self, user_id: i64, day: NaiveDate) -> Result<(), UploadLimitError> {
        if self.uploads_on(user_id, day) >= self.max {
            return Err(UploadLimitError { max: self.max });
        }
        Ok(())
    }

    /// Count a stored photo against today's limit.
    pub fn register_upload(&self, user_id: i64) {
        self.register_upload_on(user_id, Self::today());
    }

    pub fn register_upload_on(&self, user_id: i64, day: NaiveDate) {
        let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = map.entry(user_id).or_insert((day, 0));
        if entry.0 != day {
            *entry = (day, 0);
        }
        entry.1 += 1;
    }

    /// Photos the user stored on `day`.
    pub fn uploads_on(&self, user_id: i64, day: NaiveDate) -> usize {
        let map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        match map.get(&user_id) {
            Some((d, count)) if *d == day => *count,
            _ => 0,
        }
    }

    pub fn max(&self) -> usize {
        self.max
    }
}

impl Default for UploadLimiter {
    fn default() -> Self {
        Self::new()
    }
}
