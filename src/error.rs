//! Unified error model for the runtime.
//!
//! One enum, one set of kinds, matching the "error kinds" this runtime's
//! subsystems produce: malformed config syntax, failed binds, failed
//! validation, bad bean registrations, and resolution/wiring failures.
//! `TeardownError`s are never returned from `close()`; callers only ever
//! see them logged.

use thiserror::Error;

/// The runtime's single error type. Each variant corresponds to one of the
/// error kinds this crate's subsystems are specified to raise.
#[derive(Debug, Error)]
pub enum WeaveError {
    /// Malformed tag or property path (`${...}` grammar, key grammar).
    #[error("{0}")]
    ConfigSyntax(String),

    /// A leaf binder failure with no further nesting: missing required key,
    /// type mismatch, converter failure, unsupported bind kind.
    #[error("{0}")]
    ConfigBindLeaf(String),

    /// A field-bind failure, wrapping the inner cause with the field path
    /// that produced it. Chains naturally: the `source` may itself be
    /// another `ConfigBind`, composing a hierarchical
    /// `bind <TypeName>.<field> error: <inner>` message.
    #[error("bind {field_path} error: {source}")]
    ConfigBind {
        field_path: String,
        #[source]
        source: Box<WeaveError>,
    },

    /// A validator predicate returned false (or a non-boolean).
    #[error("validate failed on \"{expr}\" for value {value}")]
    ConfigValidate { expr: String, value: String },

    /// Duplicate bean id, registration after refresh, malformed lifecycle
    /// hook shape.
    #[error("{0}")]
    ContainerRegistry(String),

    /// Missing required bean, ambiguous primary candidates, circular
    /// dependency without lazy support, constructor/init failure.
    #[error("{0}")]
    ContainerResolution(String),

    /// The final, user-visible shape of a failed `refresh()`: the wiring
    /// stack that was active when resolution failed, followed by the cause.
    #[error("container refresh failed\n{}\n↳{cause}", render_stack(stack))]
    RefreshFailed {
        stack: Vec<String>,
        #[source]
        cause: Box<WeaveError>,
    },

    /// Surfaced only via logs; never propagated out of `close()`.
    #[error("{0}")]
    Teardown(String),
}

fn render_stack(stack: &[String]) -> String {
    stack
        .iter()
        .map(|frame| format!("↳{frame}"))
        .collect::<Vec<_>>()
        .join("\n")
}

impl WeaveError {
    pub fn syntax(msg: impl Into<String>) -> Self {
        WeaveError::ConfigSyntax(msg.into())
    }

    pub fn bind_leaf(msg: impl Into<String>) -> Self {
        WeaveError::ConfigBindLeaf(msg.into())
    }

    /// Wrap `source` with the field path that was being bound when it failed.
    pub fn bind_field(field_path: impl Into<String>, source: WeaveError) -> Self {
        WeaveError::ConfigBind {
            field_path: field_path.into(),
            source: Box::new(source),
        }
    }

    pub fn validate(expr: impl Into<String>, value: impl Into<String>) -> Self {
        WeaveError::ConfigValidate {
            expr: expr.into(),
            value: value.into(),
        }
    }

    pub fn registry(msg: impl Into<String>) -> Self {
        WeaveError::ContainerRegistry(msg.into())
    }

    pub fn resolution(msg: impl Into<String>) -> Self {
        WeaveError::ContainerResolution(msg.into())
    }

    pub fn refresh_failed(stack: Vec<String>, cause: WeaveError) -> Self {
        WeaveError::RefreshFailed {
            stack,
            cause: Box::new(cause),
        }
    }

    pub fn teardown(msg: impl Into<String>) -> Self {
        WeaveError::Teardown(msg.into())
    }
}

pub type WeaveResult<T> = Result<T, WeaveError>;
