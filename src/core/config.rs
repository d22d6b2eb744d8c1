//! Chaining parameters

use crate::core::block::DEFAULT_MAX_SEPARATION;
use crate::core::cost::DEFAULT_MAX_SPAN;
use crate::core::{Result, StitchError};

/// Parameters for a chaining run
///
/// `max_span` (the cost model's hard link limit) and `max_separation` (the
/// block cut threshold) are independent. They measure the same quantity,
/// the distance between sorted right ends, so a span limit below the
/// separation threshold makes the span limit the effective bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StitchConfig {
    pub max_separation: i64,
    pub max_span: i64,
    /// Worker budget; 0 selects the platform parallelism
    pub workers: usize,
}

impl Default for StitchConfig {
    fn default() -> Self {
        Self {
            max_separation: DEFAULT_MAX_SEPARATION,
            max_span: DEFAULT_MAX_SPAN,
            workers: 0,
        }
    }
}

impl StitchConfig {
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_max_separation(mut self, max_separation: i64) -> Self {
        self.max_separation = max_separation;
        self
    }

    pub fn with_max_span(mut self, max_span: i64) -> Self {
        self.max_span = max_span;
        self
    }

    /// Worker budget with 0 resolved to the available parallelism, at least 1
    pub fn effective_workers(&self) -> usize {
        if self.workers > 0 {
            return self.workers;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }

    /// Reject thresholds that cannot produce any block or link
    pub fn validate(&self) -> Result<()> {
        if self.max_separation < 0 {
            return Err(StitchError::InvalidConfig(format!(
                "max separation must be non-negative, got {}",
                self.max_separation
            )));
        }
        if self.max_span <= 0 {
            return Err(StitchError::InvalidConfig(format!(
                "max span must be positive, got {}",
                self.max_span
            )));
        }
        if self.max_span < self.max_separation {
            log::warn!(
                "max span ({}) is below max separation ({}); blocks may hold records that can never link",
                self.max_span,
                self.max_separation
            );
        }
        Ok(())
    }
}
