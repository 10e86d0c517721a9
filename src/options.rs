/// Nesting limit used by [`ValidatorOptions::default`].
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Knobs for a validation run.
///
/// ```
/// use ferrite_gate::{validate_with, ValidatorOptions};
///
/// let options = ValidatorOptions::default()
///     .with_max_depth(4)
///     .with_scalar_root(true);
/// assert!(validate_with(b"42", &options).is_ok());
/// assert!(validate_with(b"[[[[[1]]]]]", &options).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatorOptions {
    /// Maximum number of nested objects and arrays.
    ///
    /// Opening a container one level past this fails with
    /// [`ErrorKind::DepthExceeded`](crate::ErrorKind::DepthExceeded)
    /// instead of recursing further.
    ///
    /// # Default
    ///
    /// `128`
    pub max_depth: usize,

    /// Accept any value at the top level, not just objects and arrays.
    ///
    /// # Default
    ///
    /// `false`
    pub allow_scalar_root: bool,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            allow_scalar_root: false,
        }
    }
}

impl ValidatorOptions {
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn with_scalar_root(mut self, allow: bool) -> Self {
        self.allow_scalar_root = allow;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_reject_scalar_roots() {
        let options = ValidatorOptions::default();
        assert_eq!(options.max_depth, DEFAULT_MAX_DEPTH);
        assert!(!options.allow_scalar_root);
    }

    #[test]
    fn builders_override_fields() {
        let options = ValidatorOptions::default()
            .with_max_depth(3)
            .with_scalar_root(true);
        assert_eq!(
            options,
            ValidatorOptions {
                max_depth: 3,
                allow_scalar_root: true,
            }
        );
    }
}
