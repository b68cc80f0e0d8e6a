//! Content moderation decisions.
//!
//! The moderation service returns a severity per content category; the
//! allow/block decision is made here so it can be tested without I/O.

/// Default blocking threshold.
pub const DEFAULT_SEVERITY_THRESHOLD: u8 = 2;

/// Severity score for one content category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySeverity {
    pub category: String,
    pub severity: u8,
}

impl CategorySeverity {
    /// Convenience constructor.
    pub fn new(category: impl Into<String>, severity: u8) -> Self {
        Self {
            category: category.into(),
            severity,
        }
    }
}

/// Threshold-based moderation policy.
///
/// # Examples
/// ```
/// use trailshare::domain::{CategorySeverity, ModerationPolicy};
///
/// let verdict = ModerationPolicy::new(2).evaluate(vec![
///     CategorySeverity::new("Violence", 1),
///     CategorySeverity::new("Hate", 3),
/// ]);
/// assert!(!verdict.allowed());
/// assert_eq!(verdict.failing(), &[CategorySeverity::new("Hate", 3)]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModerationPolicy {
    threshold: u8,
}

impl ModerationPolicy {
    /// Block content whose maximum severity reaches `threshold`.
    #[must_use]
    pub const fn new(threshold: u8) -> Self {
        Self { threshold }
    }

    /// Configured threshold.
    #[must_use]
    pub const fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Decide on the given category scores.
    #[must_use]
    pub fn evaluate(&self, categories: Vec<CategorySeverity>) -> ModerationVerdict {
        let max_severity = categories
            .iter()
            .map(|entry| entry.severity)
            .max()
            .unwrap_or(0);
        let failing = categories
            .iter()
            .filter(|entry| entry.severity >= self.threshold)
            .cloned()
            .collect();

        ModerationVerdict {
            allowed: max_severity < self.threshold,
            threshold: self.threshold,
            max_severity,
            categories,
            failing,
        }
    }
}

impl Default for ModerationPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_SEVERITY_THRESHOLD)
    }
}

/// Result of applying a [`ModerationPolicy`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModerationVerdict {
    allowed: bool,
    threshold: u8,
    max_severity: u8,
    categories: Vec<CategorySeverity>,
    failing: Vec<CategorySeverity>,
}

impl ModerationVerdict {
    /// Whether the content may be published.
    #[must_use]
    pub fn allowed(&self) -> bool {
        self.allowed
    }

    /// Threshold the decision was made against.
    #[must_use]
    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Highest severity observed, zero when no category was reported.
    #[must_use]
    pub fn max_severity(&self) -> u8 {
        self.max_severity
    }

    /// Every category score in service order.
    #[must_use]
    pub fn categories(&self) -> &[CategorySeverity] {
        &self.categories
    }

    /// Categories at or above the threshold, in service order.
    #[must_use]
    pub fn failing(&self) -> &[CategorySeverity] {
        &self.failing
    }
}
