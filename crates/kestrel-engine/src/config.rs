//! Engine configuration.

/// Limits applied while evaluating code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Nested function calls allowed before a RangeError is thrown
    pub max_call_depth: usize,
    /// Statements evaluated before the engine gives up, if limited
    pub step_budget: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_call_depth: 400,
            step_budget: None,
        }
    }
}

impl EngineConfig {
    /// Sets the call depth limit.
    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    /// Caps the number of statements evaluated.
    pub fn with_step_budget(mut self, steps: u64) -> Self {
        self.step_budget = Some(steps);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.max_call_depth, 400);
        assert_eq!(config.step_budget, None);
    }

    #[test]
    fn test_builders() {
        let config = EngineConfig::default()
            .with_max_call_depth(32)
            .with_step_budget(1_000);
        assert_eq!(config.max_call_depth, 32);
        assert_eq!(config.step_budget, Some(1_000));
    }
}
