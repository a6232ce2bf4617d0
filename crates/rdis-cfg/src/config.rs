//! Function discovery configuration.

/// Options for [`discover_functions`](crate::discover_functions).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DiscoveryConfig {
    /// Also build a reduced basic block graph for every function.
    pub reduce: bool,
    /// Disassemble each wave of pending entries in parallel.
    pub parallel: bool,
}

impl DiscoveryConfig {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            reduce: false,
            parallel: false,
        }
    }

    #[must_use]
    pub const fn with_reduce(mut self, enabled: bool) -> Self {
        self.reduce = enabled;
        self
    }

    #[must_use]
    pub const fn with_parallel(mut self, enabled: bool) -> Self {
        self.parallel = enabled;
        self
    }
}
