//! Error types
//!
//! Configuration errors are fatal and returned synchronously. Everything else the
//! engine encounters during a pass is reported as a [`crate::diagnostics::Diagnostic`]
//! and the offending hook or binding is dropped.

use thiserror::Error;

/// Invalid parser configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("The submitted \"{field}\" property in your parser config must be of type {expected}, was {actual}")]
    InvalidType {
        field: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Unknown parser config property \"{field}\"")]
    UnknownField { field: String },

    #[error("Parser config is missing the required \"{field}\" property")]
    MissingField { field: &'static str },

    #[error("No component named \"{name}\" is registered")]
    UnknownComponent { name: String },

    #[error("Invalid selector \"{selector}\": {message}")]
    InvalidSelector { selector: String, message: String },

    #[error("Invalid bracket style: {message}")]
    InvalidBracketStyle { message: String },

    #[error("Parser \"{parser}\" is missing required capabilities: {missing}")]
    MissingCapabilities { parser: String, missing: String },

    #[error("Parser config must be an object, was {actual}")]
    NotAnObject { actual: &'static str },
}

/// A raw binding expression could not be parsed or evaluated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExpressionError {
    #[error("Unterminated string literal starting at index {index} in \"{expression}\"")]
    UnterminatedString { expression: String, index: usize },

    #[error("Unbalanced \"{delimiter}\" at index {index} in \"{expression}\"")]
    Unbalanced {
        expression: String,
        delimiter: char,
        index: usize,
    },

    #[error("Expression contains reserved placeholder characters: \"{expression}\"")]
    ReservedCharacters { expression: String },

    #[error("Data type for \"{segment}\" was not recognized and could not be parsed")]
    Unrecognized { segment: String },

    #[error("Context variables are disabled, but \"{path}\" was used")]
    ContextDisabled { path: String },

    #[error("Context function calls are disabled, but \"{path}\" calls one")]
    FunctionCallsDisabled { path: String },

    #[error("\"{path}\" is not a function")]
    NotCallable { path: String },

    #[error("Calling \"{path}\" failed: {message}")]
    CallFailed { path: String, message: String },
}

/// Umbrella error for the engine.
#[derive(Debug, Error)]
pub enum HooksError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Expression(#[from] ExpressionError),

    #[error("Mounting component \"{component}\" for hook {hook_id} failed: {source}")]
    Mount {
        hook_id: usize,
        component: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("DOM error: {message}")]
    Dom { message: String },
}

pub type Result<T> = std::result::Result<T, HooksError>;
