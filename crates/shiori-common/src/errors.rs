use std::path::PathBuf;

/// A platform window command failed or was rejected.
///
/// These are recoverable: the controller catches them at its boundary,
/// logs them, and reports the operation as failed without leaving the
/// shell state partially mutated.
#[derive(Debug, thiserror::Error)]
pub enum PlatformCommandError {
    #[error("create window failed: {0}")]
    Create(String),

    #[error("show window failed: {0}")]
    Show(String),

    #[error("hide window failed: {0}")]
    Hide(String),

    #[error("close window failed: {0}")]
    Close(String),

    #[error("navigate failed: {0}")]
    Navigate(String),

    #[error("chrome reposition failed: {0}")]
    Reposition(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config write error: {0}")]
    WriteError(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error(transparent)]
    Platform(#[from] PlatformCommandError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Internal inconsistency. Public operations validate their inputs
    /// and no-op instead; seeing this surface means a bug.
    #[error("invariant violation: {0}")]
    Invariant(String),
}
