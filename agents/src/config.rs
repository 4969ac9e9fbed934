use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Weights of the static evaluation. Every term is White minus Black.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalWeights {
    pub king: f64,
    pub queen: f64,
    pub rook: f64,
    pub bishop: f64,
    pub knight: f64,
    pub pawn: f64,
    pub doubled_pawn: f64,
    pub isolated_pawn: f64,
    pub blocked_pawn: f64,
    pub capture: f64,
    pub mobility: f64,
    /// Squares per rank, used to bucket pawns into files.
    pub board_width: usize,
}

impl Default for EvalWeights {
    fn default() -> Self {
        Self {
            king: 200.0,
            queen: 9.0,
            rook: 5.0,
            bishop: 3.5,
            knight: 3.0,
            pawn: 1.0,
            doubled_pawn: 0.5,
            isolated_pawn: 0.5,
            blocked_pawn: 0.5,
            capture: 0.5,
            mobility: 0.1,
            board_width: 8,
        }
    }
}

/// Settings for [`crate::choose_move`] and the agents built on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Plies searched below the root.
    pub depth: u8,
    /// Children whose static score moves this far in the mover's favour are dropped.
    pub swing_threshold: f64,
    /// Open from the start position with a random book move when playing White.
    pub opening_book: bool,
    pub weights: EvalWeights,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            depth: 1,
            swing_threshold: 4.0,
            opening_book: true,
            weights: EvalWeights::default(),
        }
    }
}

impl SearchConfig {
    pub fn with_depth(depth: u8) -> Self {
        Self {
            depth,
            ..Self::default()
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: SearchConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.weights.board_width == 0 {
            return Err(ConfigError::Invalid("board_width must be positive".into()));
        }
        if !self.swing_threshold.is_finite() || self.swing_threshold <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "swing_threshold must be a positive number, got {}",
                self.swing_threshold
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_defaults() {
        let config = SearchConfig::default();
        assert_eq!(config.depth, 1);
        assert_eq!(config.swing_threshold, 4.0);
        assert_eq!(config.weights.king, 200.0);
        assert_eq!(config.weights.bishop, 3.5);
        assert_eq!(config.weights.board_width, 8);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = SearchConfig::from_toml_str(
            r#"
            depth = 3
            opening_book = false

            [weights]
            mobility = 0.2
            "#,
        )
        .unwrap();

        assert_eq!(config.depth, 3);
        assert!(!config.opening_book);
        assert_eq!(config.swing_threshold, 4.0);
        assert_eq!(config.weights.mobility, 0.2);
        assert_eq!(config.weights.queen, 9.0);
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            SearchConfig::from_toml_str("depth = \"deep\""),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            SearchConfig::from_toml_str("swing_threshold = -1.0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            SearchConfig::from_toml_str("[weights]\nboard_width = 0"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            SearchConfig::load("/nonexistent/search.toml"),
            Err(ConfigError::Io { .. })
        ));
    }
}
