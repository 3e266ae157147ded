//! Error types with rich diagnostics using miette
//!
//! Geometry and lookups never fail; these cover the boundaries where input
//! comes from outside: configuration files, validator patterns, colors and
//! the background executor.

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

// ============================================================================
// Configuration Errors
// ============================================================================

/// Errors that occur while reading or writing a configuration store
#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("malformed configuration entry")]
    #[diagnostic(
        code(rcore::config::syntax),
        help("entries take the form `key = value`; comment lines start with `#` or `!`")
    )]
    Syntax {
        #[source_code]
        src: NamedSource<String>,
        #[label("{message}")]
        span: SourceSpan,
        message: String,
    },

    #[error("failed to read configuration from {path}")]
    #[diagnostic(code(rcore::config::read))]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write configuration to {path}")]
    #[diagnostic(code(rcore::config::write))]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration store has no backing file")]
    #[diagnostic(
        code(rcore::config::no_path),
        help("load the store from a file or call `set_path` before storing")
    )]
    NoPath,
}

// ============================================================================
// Value Errors
// ============================================================================

/// A validator pattern that does not compile
#[derive(Error, Diagnostic, Debug)]
#[error("invalid validation pattern `{pattern}`")]
#[diagnostic(code(rcore::validator::invalid_pattern))]
pub struct ValidatorError {
    pub pattern: String,
    #[source]
    pub source: regex_lite::Error,
}

/// A color string that is neither a known name nor a hex/rgb() literal
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
#[error("invalid color: {input}")]
#[diagnostic(
    code(rcore::color::invalid),
    help("use a color name, `#rrggbb`, `#rrggbbaa` or `rgb(r,g,b)`")
)]
pub struct ColorParseError {
    pub input: String,
}

// ============================================================================
// Executor Errors
// ============================================================================

/// Errors from the background task executor
#[derive(Error, Diagnostic, Debug)]
pub enum ExecutorError {
    #[error("executor has been shut down")]
    #[diagnostic(code(rcore::executor::shut_down))]
    ShutDown,

    #[error("task did not produce a result")]
    #[diagnostic(
        code(rcore::executor::task_failed),
        help("the task panicked; its panic message was logged")
    )]
    TaskFailed,

    #[error("failed to spawn executor thread `{name}`")]
    #[diagnostic(code(rcore::executor::spawn))]
    Spawn {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

// ============================================================================
// Application Errors
// ============================================================================

/// Everything that can go wrong while bringing up an application context
#[derive(Error, Diagnostic, Debug)]
pub enum AppError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Executor(#[from] ExecutorError),
}
