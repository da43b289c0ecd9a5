use thiserror::Error;

/// Errors raised while building a mask from configuration.
///
/// Masking itself never fails: an unusable mask string degrades to a disabled
/// mask and rejected keystrokes are simply discarded. Only configuration
/// loading and custom character rules can produce these.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum MaskError {
    #[error("Invalid pattern for placeholder '{0}': {1}")]
    InvalidRule(char, regex::Error),

    #[error("Unknown key name '{0}'")]
    UnknownKey(String),

    #[error("Failed to parse YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("An unexpected I/O error occurred: {0}")]
    Io(#[from] std::io::Error),
}
