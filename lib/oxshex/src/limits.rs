//! Resource limits for ShEx validation.
//!
//! Recursive shapes, regular expressions and the assignment search can all be driven into
//! very long runs by adversarial schemas or data. These limits let the host bound a run.
//! Hitting a limit aborts the run with an error; it never makes a node non-conformant.

use std::time::{Duration, Instant};

/// Default maximum recursion depth for shape evaluation.
pub const DEFAULT_MAX_RECURSION_DEPTH: usize = 256;

/// Default maximum length for regex patterns in pattern facets.
pub const DEFAULT_MAX_REGEX_LENGTH: usize = 1000;

/// Default maximum number of nodes built when normalizing one triple expression.
pub const DEFAULT_MAX_EXPANSION: usize = 100_000;

/// Configurable resource limits for ShEx validation.
///
/// - **Recursion depth**: bounds nested shape evaluation
/// - **Assignments**: bounds the triple-to-constraint search, counted over a whole run
/// - **Timeout**: bounds the wall-clock time of a run
/// - **Regex length**: bounds pattern facet sizes
/// - **Expansion**: bounds the size of normalized triple expressions
///
/// # Examples
///
/// ```
/// use oxshex::ValidationLimits;
/// use std::time::Duration;
///
/// let limits = ValidationLimits::default()
///     .with_max_recursion_depth(50)
///     .with_max_assignments(10_000)
///     .with_timeout(Duration::from_secs(10));
/// assert_eq!(limits.max_recursion_depth, 50);
///
/// let trusted_limits = ValidationLimits::permissive();
/// assert!(trusted_limits.timeout.is_none());
/// ```
#[derive(Debug, Clone)]
pub struct ValidationLimits {
    /// Maximum recursion depth for nested shape evaluation.
    pub max_recursion_depth: usize,

    /// Maximum number of assignments enumerated during a run, unbounded if `None`.
    pub max_assignments: Option<usize>,

    /// Optional timeout for a whole validation run.
    pub timeout: Option<Duration>,

    /// Maximum length for regex patterns.
    pub max_regex_length: usize,

    /// Maximum number of nodes of a normalized triple expression.
    ///
    /// Repeated groups such as `(ex:a . ; ex:b .){2,1000}` are expanded into one copy per
    /// repetition.
    pub max_expansion: usize,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            max_recursion_depth: DEFAULT_MAX_RECURSION_DEPTH,
            max_assignments: None,
            timeout: None,
            max_regex_length: DEFAULT_MAX_REGEX_LENGTH,
            max_expansion: DEFAULT_MAX_EXPANSION,
        }
    }
}

impl ValidationLimits {
    /// Creates a new ValidationLimits with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates permissive limits suitable for trusted environments.
    pub fn permissive() -> Self {
        Self {
            max_recursion_depth: 4096,
            max_assignments: None,
            timeout: None,
            max_regex_length: 100_000,
            max_expansion: 10_000_000,
        }
    }

    /// Creates strict limits suitable for public-facing services.
    pub fn strict() -> Self {
        Self {
            max_recursion_depth: 64,
            max_assignments: Some(100_000),
            timeout: Some(Duration::from_secs(5)),
            max_regex_length: 500,
            max_expansion: 10_000,
        }
    }

    /// Sets the maximum recursion depth.
    #[must_use]
    pub fn with_max_recursion_depth(mut self, depth: usize) -> Self {
        self.max_recursion_depth = depth;
        self
    }

    /// Sets the maximum number of enumerated assignments.
    #[must_use]
    pub fn with_max_assignments(mut self, count: usize) -> Self {
        self.max_assignments = Some(count);
        self
    }

    /// Sets the validation timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Disables the validation timeout.
    #[must_use]
    pub fn without_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }

    /// Sets the maximum regex pattern length.
    #[must_use]
    pub fn with_max_regex_length(mut self, length: usize) -> Self {
        self.max_regex_length = length;
        self
    }

    /// Sets the maximum size of normalized triple expressions.
    #[must_use]
    pub fn with_max_expansion(mut self, nodes: usize) -> Self {
        self.max_expansion = nodes;
        self
    }
}

/// Tracks the resources consumed by one validation run against its limits.
#[derive(Debug)]
pub(crate) struct LimitTracker {
    limits: ValidationLimits,
    current_depth: usize,
    assignments: usize,
    start_time: Instant,
}

impl LimitTracker {
    pub fn new(limits: ValidationLimits) -> Self {
        Self {
            limits,
            current_depth: 0,
            assignments: 0,
            start_time: Instant::now(),
        }
    }

    /// Enters a deeper recursion level.
    pub fn enter_recursion(&mut self) -> Result<(), ValidationLimitError> {
        self.current_depth += 1;
        if self.current_depth > self.limits.max_recursion_depth {
            return Err(ValidationLimitError::MaxRecursionDepthExceeded {
                depth: self.current_depth,
                limit: self.limits.max_recursion_depth,
            });
        }
        self.check_timeout()
    }

    pub fn exit_recursion(&mut self) {
        self.current_depth = self.current_depth.saturating_sub(1);
    }

    /// Records one enumerated assignment.
    pub fn record_assignment(&mut self) -> Result<(), ValidationLimitError> {
        self.assignments += 1;
        if let Some(limit) = self.limits.max_assignments {
            if self.assignments > limit {
                return Err(ValidationLimitError::MaxAssignmentsExceeded { limit });
            }
        }
        Ok(())
    }

    pub fn check_timeout(&self) -> Result<(), ValidationLimitError> {
        if let Some(timeout) = self.limits.timeout {
            let elapsed = self.start_time.elapsed();
            if elapsed > timeout {
                return Err(ValidationLimitError::TimeoutExceeded {
                    elapsed,
                    limit: timeout,
                });
            }
        }
        Ok(())
    }

    #[cfg(test)]
    pub fn current_depth(&self) -> usize {
        self.current_depth
    }

    pub fn assignments(&self) -> usize {
        self.assignments
    }
}

/// Errors that occur when validation limits are exceeded.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ValidationLimitError {
    /// Maximum recursion depth exceeded.
    #[error(
        "Maximum recursion depth exceeded: reached {depth}, limit is {limit}. \
        Consider simplifying the schema or increasing the limit."
    )]
    MaxRecursionDepthExceeded {
        /// Depth reached.
        depth: usize,
        /// Configured limit.
        limit: usize,
    },

    /// Maximum number of enumerated assignments exceeded.
    #[error(
        "Maximum number of assignments exceeded: limit is {limit}. \
        The neighbourhood may have too many ways to match the shape."
    )]
    MaxAssignmentsExceeded {
        /// Configured limit.
        limit: usize,
    },

    /// Validation timeout exceeded.
    #[error("Validation timeout exceeded: elapsed {elapsed:?}, limit is {limit:?}")]
    TimeoutExceeded {
        /// Time spent when the limit was noticed.
        elapsed: Duration,
        /// Configured limit.
        limit: Duration,
    },

    /// Regex pattern too long.
    #[error("Regex pattern too long: {length} characters, limit is {limit}")]
    RegexTooLong {
        /// Pattern length in characters.
        length: usize,
        /// Configured limit.
        limit: usize,
    },

    /// Normalized triple expression too large.
    #[error(
        "Triple expression expansion too large: limit is {limit} nodes. \
        Consider lowering the repetition bounds of groups."
    )]
    ExpansionTooLarge {
        /// Configured limit.
        limit: usize,
    },
}
