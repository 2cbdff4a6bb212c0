use sudoku_server::config::{RawConfigFile, ServerConfig};

/// Builder for `ServerConfig` to simplify test setup.
pub struct ConfigBuilder {
    config: RawConfigFile,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn program(mut self, program: &str) -> Self {
        self.config.command.program = program.to_string();
        self
    }

    pub fn timeout(mut self, timeout: &str) -> Self {
        self.config.command.timeout = timeout.to_string();
        self
    }

    pub fn default_difficulty(mut self, difficulty: i64) -> Self {
        self.config.generate.default_difficulty = difficulty;
        self
    }

    pub fn build(self) -> ServerConfig {
        ServerConfig::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
