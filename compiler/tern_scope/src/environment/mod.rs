//! Environment for one interpreter run.
//!
//! Owns the global scope from creation to teardown and keeps a stack of
//! the scopes the evaluator has entered. Entering a block pushes a child of
//! the current scope; entering a call pushes a child of the callee's
//! captured scope, so name resolution inside the call is lexical.

mod guard;

use crate::errors::depth_limit_exceeded;
use crate::{
    BodyId, EnvConfig, FunctionValue, Mutability, Name, Scope, ScopeResult, Value,
};

pub use guard::ScopeGuard;

/// Environment for the interpreter using a scope stack.
///
/// The global scope is created by `Environment::new` and torn down by
/// `finish` (or on drop). Between the two, the stack always holds at
/// least the global scope.
pub struct Environment {
    /// Stack of entered scopes, with the current scope at the top.
    scopes: Vec<Scope>,
    /// Global scope (always at the bottom).
    global: Scope,
    config: EnvConfig,
    finished: bool,
}

impl Environment {
    /// Create an environment with the default configuration.
    pub fn new() -> Self {
        Self::with_config(EnvConfig::default())
    }

    /// Create an environment with a fresh global scope.
    pub fn with_config(config: EnvConfig) -> Self {
        let global = Scope::global_with_policy(config.assign_policy);
        tracing::debug!(
            policy = ?config.assign_policy,
            max_depth = ?config.max_depth,
            "environment created"
        );
        Environment {
            scopes: vec![global.clone()],
            global,
            config,
            finished: false,
        }
    }

    /// Configuration this run was created with.
    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    /// The global scope of this run.
    pub fn global(&self) -> &Scope {
        &self.global
    }

    /// The innermost entered scope.
    #[inline]
    pub fn current(&self) -> &Scope {
        self.scopes.last().unwrap_or(&self.global)
    }

    /// Number of entered scopes, counting the global scope.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Enter a block: push a child of the current scope.
    pub fn push_scope(&mut self) -> ScopeResult<()> {
        let parent = self.current().clone();
        self.push_child_of(&parent)
    }

    /// Enter a call: push a child of the callee's captured scope.
    ///
    /// The caller's scope stays on the stack beneath but is not an
    /// ancestor of the new scope.
    pub fn push_call(&mut self, captured: &Scope) -> ScopeResult<()> {
        self.push_child_of(captured)
    }

    fn push_child_of(&mut self, parent: &Scope) -> ScopeResult<()> {
        if let Some(limit) = self.config.max_depth {
            if parent.depth() >= limit {
                tracing::debug!(limit, "scope depth limit reached");
                return Err(depth_limit_exceeded(limit));
            }
        }
        self.scopes.push(parent.child());
        Ok(())
    }

    /// Leave the current scope and return it.
    ///
    /// The global scope is never popped; returns `None` when only it is left.
    #[inline]
    pub fn pop_scope(&mut self) -> Option<Scope> {
        if self.scopes.len() > 1 {
            self.scopes.pop()
        } else {
            None
        }
    }

    /// Pop every scope above `depth`; the global scope always stays.
    fn unwind_to(&mut self, depth: usize) {
        self.scopes.truncate(depth.max(1));
    }

    /// Define a mutable variable in the current scope.
    #[inline]
    pub fn define(&mut self, name: impl Into<Name>, value: Value) {
        self.current().define(name, value);
    }

    /// Define a variable in the current scope with explicit mutability.
    #[inline]
    pub fn define_with(&mut self, name: impl Into<Name>, value: Value, mutability: Mutability) {
        self.current().define_with(name, value, mutability);
    }

    /// Define a mutable global from any depth (used for registering built-ins).
    ///
    /// Built-ins that must not be reassigned go through
    /// `global().define_with(.., Mutability::Immutable)` instead.
    pub fn define_global(&mut self, name: impl Into<Name>, value: Value) {
        self.global.define(name, value);
    }

    /// Assign to a variable from the current scope.
    #[inline]
    pub fn set(&mut self, name: &str, value: Value) -> ScopeResult<()> {
        self.current().set(name, value)
    }

    /// Look up a variable from the current scope.
    #[inline]
    pub fn get(&self, name: &str) -> ScopeResult<Value> {
        self.current().get(name)
    }

    /// Look up a variable, returning `None` when it is unbound.
    #[inline]
    pub fn lookup(&self, name: &str) -> Option<Value> {
        self.current().lookup(name)
    }

    /// Whether `name` resolves from the current scope.
    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.current().contains(name)
    }

    /// Capture the current scope for a closure.
    ///
    /// Returns a handle, not a copy: the closure observes later
    /// assignments to the captured bindings.
    pub fn capture(&self) -> Scope {
        self.current().clone()
    }

    /// Build a closure value capturing the current scope.
    pub fn make_closure(&self, name: Option<Name>, params: Vec<Name>, body: BodyId) -> Value {
        let func = FunctionValue::new(params, body, self.capture());
        match name {
            Some(name) => Value::Function(func.with_name(name)),
            None => Value::Function(func),
        }
    }

    /// End the run.
    ///
    /// Unwinds the scope stack and empties the global scope, which breaks
    /// reference cycles between globals and closures capturing the global
    /// scope. Returns the number of global bindings released. Handles to
    /// the global scope that outlive the run see it empty.
    pub fn finish(mut self) -> usize {
        self.teardown()
    }

    fn teardown(&mut self) -> usize {
        if self.finished {
            return 0;
        }
        self.finished = true;
        self.unwind_to(1);
        let released = self.global.clear();
        tracing::debug!(released, "environment torn down");
        released
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Environment {
    fn drop(&mut self) {
        self.teardown();
    }
}
