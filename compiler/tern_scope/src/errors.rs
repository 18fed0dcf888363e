//! Errors raised by scope operations.
//!
//! Factory functions (e.g. `undefined_variable()`) are the construction
//! API; they are `#[cold]` because every one of them sits on a failure
//! path of a hot lookup or assignment.
//!
//! None of these errors carries a source position. The evaluator that
//! called into the scope chain owns spans and attaches them when it turns
//! a `ScopeError` into a diagnostic.

use crate::Name;

/// Result of a fallible scope operation.
pub type ScopeResult<T> = Result<T, ScopeError>;

/// Failure of a scope operation.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ScopeError {
    /// `get` reached the global scope without finding the name.
    #[error("undefined variable: {name}")]
    UndefinedVariable { name: Name },

    /// `set` found no binding anywhere and the assign policy is strict.
    #[error("assignment to undeclared variable: {name}")]
    UndeclaredAssignment { name: Name },

    /// `set` found the nearest binding but it was defined immutable.
    #[error("cannot assign to immutable variable: {name}")]
    ImmutableBinding { name: Name },

    /// Entering another scope would exceed the configured nesting limit.
    #[error("maximum scope depth exceeded (limit: {limit})")]
    DepthLimitExceeded { limit: usize },
}

impl ScopeError {
    /// The identifier this error is about, if it concerns a single name.
    pub fn name(&self) -> Option<&Name> {
        match self {
            Self::UndefinedVariable { name }
            | Self::UndeclaredAssignment { name }
            | Self::ImmutableBinding { name } => Some(name),
            Self::DepthLimitExceeded { .. } => None,
        }
    }
}

/// Undefined variable.
#[cold]
pub fn undefined_variable(name: &str) -> ScopeError {
    ScopeError::UndefinedVariable {
        name: Name::new(name),
    }
}

/// Assignment to a name bound nowhere, under the strict policy.
#[cold]
pub fn undeclared_assignment(name: &str) -> ScopeError {
    ScopeError::UndeclaredAssignment {
        name: Name::new(name),
    }
}

/// Assignment to an immutable binding.
#[cold]
pub fn cannot_assign_immutable(name: &str) -> ScopeError {
    ScopeError::ImmutableBinding {
        name: Name::new(name),
    }
}

/// Scope nesting limit exceeded.
#[cold]
pub fn depth_limit_exceeded(limit: usize) -> ScopeError {
    ScopeError::DepthLimitExceeded { limit }
}
