//! Closure values.

use super::Heap;
use crate::{Name, Scope};

/// Opaque handle to a function body in the evaluator's syntax tree.
///
/// The scope chain never looks inside a body; it only needs a stable
/// identity so two closures over the same body can be told apart from
/// closures over different ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(u32);

impl BodyId {
    /// Wrap an evaluator-assigned body index.
    #[inline]
    pub const fn new(raw: u32) -> Self {
        BodyId(raw)
    }

    /// The evaluator-assigned index.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// A user-defined function together with the scope it was defined in.
///
/// Holding `captured` keeps that scope and every ancestor of it alive for
/// as long as the closure is reachable, even after the call frame or
/// block that created it has been left.
#[derive(Clone, Debug)]
pub struct FunctionValue {
    name: Option<Name>,
    params: Heap<Vec<Name>>,
    body: BodyId,
    captured: Scope,
}

impl FunctionValue {
    /// Create an anonymous function capturing `captured`.
    pub fn new(params: Vec<Name>, body: BodyId, captured: Scope) -> Self {
        FunctionValue {
            name: None,
            params: Heap::new(params),
            body,
            captured,
        }
    }

    /// Attach the declared name (for diagnostics and display).
    #[must_use]
    pub fn with_name(mut self, name: impl Into<Name>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Declared name, if the function was not a lambda.
    pub fn name(&self) -> Option<&Name> {
        self.name.as_ref()
    }

    /// Parameter names in declaration order.
    pub fn params(&self) -> &[Name] {
        &self.params
    }

    /// Number of declared parameters.
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Body handle.
    pub fn body(&self) -> BodyId {
        self.body
    }

    /// Scope active where the function was defined.
    ///
    /// A call to this function runs in a fresh child of this scope.
    pub fn captured(&self) -> &Scope {
        &self.captured
    }

    /// Give up the function, keeping only its captured scope.
    pub(crate) fn into_captured(self) -> Scope {
        self.captured
    }
}

/// Functions are equal when they share a body and the same captured scope.
impl PartialEq for FunctionValue {
    fn eq(&self, other: &Self) -> bool {
        self.body == other.body && self.captured.ptr_eq(&other.captured)
    }
}
