//! Error types for panestash-core

use std::fmt::Write;
use thiserror::Error;

use crate::layout_tree::Orientation;

/// Remediation command for resolving an error
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RemediationCommand {
    /// Short label describing the command purpose
    pub label: String,
    /// Command to run
    pub command: String,
}

/// Actionable remediation guidance for an error
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Remediation {
    /// One-line summary of how to fix the issue
    pub summary: String,
    /// Suggested commands to resolve or diagnose the issue
    pub commands: Vec<RemediationCommand>,
    /// Additional alternative guidance
    pub alternatives: Vec<String>,
}

impl Remediation {
    /// Create a new remediation with a summary
    #[must_use]
    pub fn new(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            commands: Vec::new(),
            alternatives: Vec::new(),
        }
    }

    /// Add a suggested command
    #[must_use]
    pub fn command(mut self, label: impl Into<String>, command: impl Into<String>) -> Self {
        self.commands.push(RemediationCommand {
            label: label.into(),
            command: command.into(),
        });
        self
    }

    /// Add an alternative suggestion
    #[must_use]
    pub fn alternative(mut self, alternative: impl Into<String>) -> Self {
        self.alternatives.push(alternative.into());
        self
    }

    /// Render remediation text for human-readable output
    #[must_use]
    pub fn render_plain(&self) -> String {
        let mut output = String::new();
        let _ = writeln!(output, "To fix:");
        let _ = writeln!(output, "  {}", self.summary);

        if !self.commands.is_empty() {
            let _ = writeln!(output, "  Commands:");
            for cmd in &self.commands {
                let _ = writeln!(output, "    - {}: {}", cmd.label, cmd.command);
            }
        }

        if !self.alternatives.is_empty() {
            let _ = writeln!(output, "  Alternatives:");
            for alt in &self.alternatives {
                let _ = writeln!(output, "    - {alt}");
            }
        }

        output
    }
}

/// Result type alias using the library's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Startup failures: everything that stops a front end before any layout
/// operation runs.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Logging error: {0}")]
    Log(#[from] crate::logging::LogError),
}

impl Error {
    #[must_use]
    pub fn remediation(&self) -> Remediation {
        match self {
            Self::Config(err) => err.remediation(),
            Self::Log(_) => Remediation::new("Check the configured log file path and log level.")
                .command("Quiet run", "pstash --log-level warn list")
                .alternative("Unset `log_file` in panestash.toml to log to stderr only."),
        }
    }
}

/// Errors surfaced by the layout manager's public operations.
///
/// Everything else a layout operation runs into is absorbed and logged
/// inside the core.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// The operation referenced a name absent from the store.
    #[error("no layout named '{0}'")]
    NotFound(String),

    /// Update or navigation was requested without a usable current layout.
    #[error("no current layout")]
    NothingCurrent,

    /// The store file could not be read or written. In-memory state is kept.
    #[error("layout store unavailable at {path}: {reason}")]
    PersistenceUnavailable { path: String, reason: String },
}

impl LayoutError {
    #[must_use]
    pub fn remediation(&self) -> Remediation {
        match self {
            Self::NotFound(name) => Remediation::new(format!(
                "Layout '{name}' is not saved. Pick one of the stored layouts."
            ))
            .command("List layouts", "pstash list")
            .alternative(format!("Save the current layout first: pstash add {name}")),
            Self::NothingCurrent => Remediation::new(
                "No layout has been added or restored in this session yet.",
            )
            .command("Restore a layout", "pstash restore <name>")
            .alternative("Use `pstash add <name>` to save the current layout under a name."),
            Self::PersistenceUnavailable { path, .. } => Remediation::new(format!(
                "Changes are kept in memory but could not be written to {path}."
            ))
            .command("Check permissions", format!("ls -la \"{path}\""))
            .alternative("Point `[store] path` in panestash.toml at a writable location."),
        }
    }
}

/// Snapshot store persistence errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to read {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("failed to parse layout store: {0}")]
    Parse(String),

    #[error("failed to serialize layout store: {0}")]
    Serialize(String),

    #[error("failed to write {path}: {reason}")]
    Write { path: String, reason: String },

    #[error("layout store version {found} is newer than supported ({supported})")]
    UnsupportedVersion { found: u32, supported: u32 },
}

impl StoreError {
    /// Convert into the non-fatal error reported at the public contract.
    #[must_use]
    pub fn into_layout_error(self, path: &std::path::Path) -> LayoutError {
        LayoutError::PersistenceUnavailable {
            path: path.display().to_string(),
            reason: self.to_string(),
        }
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {0}: {1}")]
    ReadFailed(String, String),

    #[error("failed to parse config: {0}")]
    ParseFailed(String),

    #[error("invalid config: {0}")]
    ValidationError(String),
}

impl ConfigError {
    #[must_use]
    pub fn remediation(&self) -> Remediation {
        match self {
            Self::ReadFailed(path, _) => {
                Remediation::new(format!("Verify the config file exists and is readable: {path}"))
                    .command("Inspect", format!("ls -la \"{path}\""))
            }
            Self::ParseFailed(_) => Remediation::new("Fix the TOML syntax in panestash.toml.")
                .alternative("Remove the file to fall back to defaults."),
            Self::ValidationError(_) => {
                Remediation::new("Correct the invalid value in panestash.toml.")
            }
        }
    }
}

/// Failures reported by a live surface while it is being mutated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    #[error("pane {0} does not exist")]
    PaneNotFound(u64),

    #[error("pane {pane} is too small to split {axis} at {size} (available {available})")]
    TooSmall {
        pane: u64,
        axis: Orientation,
        size: u32,
        available: u32,
    },

    #[error("no buffer named '{0}'")]
    NoSuchBuffer(String),

    #[error("failed to open {path}: {reason}")]
    OpenFailed { path: String, reason: String },
}

/// Structural validation failures for a layout tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("split has {0} children, expected at least 2")]
    TooFewChildren(usize),

    #[error("leaf '{label}' has non-positive size {width}x{height}")]
    EmptyLeaf {
        label: String,
        width: u32,
        height: u32,
    },

    #[error("focused leaf index {index} out of range for {leaves} leaves")]
    FocusOutOfRange { index: usize, leaves: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remediation_renders_commands_and_alternatives() {
        let text = Remediation::new("Do the thing.")
            .command("List", "pstash list")
            .alternative("Or not.")
            .render_plain();
        assert!(text.starts_with("To fix:\n  Do the thing.\n"));
        assert!(text.contains("    - List: pstash list"));
        assert!(text.contains("  Alternatives:\n    - Or not."));
    }

    #[test]
    fn layout_error_messages() {
        assert_eq!(
            LayoutError::NotFound("work".into()).to_string(),
            "no layout named 'work'"
        );
        assert_eq!(LayoutError::NothingCurrent.to_string(), "no current layout");
    }

    #[test]
    fn not_found_remediation_mentions_name() {
        let r = LayoutError::NotFound("work".into()).remediation();
        assert!(r.summary.contains("work"));
        assert!(r.alternatives[0].contains("pstash add work"));
    }

    #[test]
    fn store_error_converts_to_persistence_unavailable() {
        let err = StoreError::Write {
            path: "/ro/layouts.json".into(),
            reason: "read-only file system".into(),
        };
        let layout = err.into_layout_error(std::path::Path::new("/ro/layouts.json"));
        match layout {
            LayoutError::PersistenceUnavailable { path, reason } => {
                assert_eq!(path, "/ro/layouts.json");
                assert!(reason.contains("read-only"));
            }
            other => panic!("expected PersistenceUnavailable, got {other:?}"),
        }
    }

    #[test]
    fn top_level_error_wraps_config() {
        let err: Error = ConfigError::ParseFailed("bad".into()).into();
        assert!(err.to_string().starts_with("Config error:"));
        assert!(err.remediation().summary.contains("TOML"));

        let err: Error = crate::logging::LogError::InvalidLevel("loud".into()).into();
        assert!(err.to_string().contains("invalid log level: loud"));
        assert!(!err.remediation().commands.is_empty());
    }
}
