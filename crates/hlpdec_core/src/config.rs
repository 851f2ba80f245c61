//! Reader configuration.

/// Limits and policies applied while reading a container.
#[derive(Debug, Clone)]
pub struct Config {
    /// Longest nul-terminated name accepted from a B+tree page.
    pub max_name_length: usize,

    /// Deepest B+tree accepted (`NLevels`).
    pub max_levels: u16,

    /// Whether extraction may replace an existing output file.
    pub overwrite_existing: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_name_length: 255,
            max_levels: 16,
            overwrite_existing: false,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the name length limit.
    #[must_use]
    pub const fn max_name_length(mut self, value: usize) -> Self {
        self.max_name_length = value;
        self
    }

    /// Sets the B+tree depth limit.
    #[must_use]
    pub const fn max_levels(mut self, value: u16) -> Self {
        self.max_levels = value;
        self
    }

    /// Sets whether extraction may overwrite existing files.
    #[must_use]
    pub const fn overwrite_existing(mut self, value: bool) -> Self {
        self.overwrite_existing = value;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.max_name_length, 255);
        assert_eq!(config.max_levels, 16);
        assert!(!config.overwrite_existing);
    }

    #[test]
    fn builder_pattern() {
        let config = Config::new()
            .max_name_length(32)
            .max_levels(4)
            .overwrite_existing(true);

        assert_eq!(config.max_name_length, 32);
        assert_eq!(config.max_levels, 4);
        assert!(config.overwrite_existing);
    }
}
