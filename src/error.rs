//! Domain-specific error types for the dotfiles engine.
//!
//! Internal modules return typed errors while command handlers at the CLI
//! boundary convert them to [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! OperationError            validation rejected an operation tree
//! ├── Permission            read/write access denied on an existing path
//! └── InvalidOperation      wrong file type, self-copy, missing path
//! ConfigError               config file, variables, home resolution
//! PathError                 source identifier cannot be mapped to a pair
//! ```

use thiserror::Error;

/// Validation failure raised by an operation node.
///
/// Carries the human-readable message and a rendered description of the
/// offending node. The node description is diagnostic only: the fallback
/// combinator branches on the `Result` tag, never on its contents.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OperationError {
    /// Read or write access denied on an existing path.
    #[error("{message}")]
    Permission {
        /// Human-readable description of the denial.
        message: String,
        /// Description of the node that rejected the tree.
        node: String,
    },

    /// The operation cannot apply: wrong file type, source and destination
    /// collide, or a required path is absent.
    #[error("{message}")]
    InvalidOperation {
        /// Human-readable description of the problem.
        message: String,
        /// Description of the node that rejected the tree.
        node: String,
    },
}

impl OperationError {
    /// Build a [`OperationError::Permission`].
    pub fn permission(message: impl Into<String>, node: impl Into<String>) -> Self {
        Self::Permission {
            message: message.into(),
            node: node.into(),
        }
    }

    /// Build a [`OperationError::InvalidOperation`].
    pub fn invalid(message: impl Into<String>, node: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
            node: node.into(),
        }
    }

    /// The human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Permission { message, .. } | Self::InvalidOperation { message, .. } => message,
        }
    }

    /// Description of the node that produced this error.
    #[must_use]
    pub fn node(&self) -> &str {
        match self {
            Self::Permission { node, .. } | Self::InvalidOperation { node, .. } => node,
        }
    }

    /// Returns `true` for [`OperationError::Permission`].
    #[must_use]
    pub const fn is_permission(&self) -> bool {
        matches!(self, Self::Permission { .. })
    }
}

/// Errors that arise while loading configuration and resolving settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("IO error reading config file {path}: {source}")]
    Io {
        /// Path to the file that could not be read.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The config file is not valid TOML or has unknown keys.
    #[error("Invalid config file {file}: {message}")]
    InvalidSyntax {
        /// Path of the offending file.
        file: String,
        /// Parser message.
        message: String,
    },

    /// A `--var` argument is not of the form `KEY=VALUE`.
    #[error("Invalid template variable '{0}': expected KEY=VALUE")]
    InvalidVariable(String),

    /// Neither `--home`, the config file nor `$HOME` provide a home directory.
    #[error("cannot determine home directory: use --home or set HOME")]
    MissingHome,

    /// No user could be determined for ownership changes.
    #[error("cannot determine owner: use --user or set USER")]
    MissingUser,
}

/// Errors that arise while deriving a path pair from a source identifier.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// The identifier points outside both the home directory and the store.
    #[error("'{path}' is outside of '{home}'")]
    OutsideHome {
        /// Normalised path of the identifier.
        path: String,
        /// Home directory it was checked against.
        home: String,
    },

    /// The identifier names the home directory or the store itself.
    #[error("'{0}' cannot be managed as a dotfile")]
    Root(String),

    /// The identifier is excluded by the ignore-marker convention.
    #[error("'{path}' ignored: {reason}")]
    Ignored {
        /// Normalised path of the identifier.
        path: String,
        /// Why the entry is excluded.
        reason: String,
    },
}
