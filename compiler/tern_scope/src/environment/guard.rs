//! RAII-style scope guards for `Environment`.
//!
//! Dropping the guard restores the scope stack to the depth it had before
//! the guard was taken, including during unwinding and on early `?`
//! returns from the evaluator. Scopes the body pushed and never popped go
//! with it.
//!
//! ```text
//! {
//!     let mut scoped = env.scoped()?;
//!     scoped.define(name, value);
//!     eval_block(&mut scoped, body)?;
//! } // stack restored here
//!
//! env.with_call(func.captured(), |call| {
//!     bind_params(call, func.params(), args);
//!     eval_body(call, func.body())
//! })?
//! ```

use std::ops::{Deref, DerefMut};

use super::Environment;
use crate::{Scope, ScopeResult};

/// Guard over an entered scope; derefs to the `Environment`.
pub struct ScopeGuard<'env> {
    env: &'env mut Environment,
    /// Stack depth before the guarded scope was pushed.
    base: usize,
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        self.env.unwind_to(self.base);
    }
}

impl Deref for ScopeGuard<'_> {
    type Target = Environment;

    fn deref(&self) -> &Environment {
        self.env
    }
}

impl DerefMut for ScopeGuard<'_> {
    fn deref_mut(&mut self) -> &mut Environment {
        self.env
    }
}

impl Environment {
    /// Enter a block scope that is left when the guard drops.
    pub fn scoped(&mut self) -> ScopeResult<ScopeGuard<'_>> {
        let base = self.depth();
        self.push_scope()?;
        Ok(ScopeGuard { env: self, base })
    }

    /// Enter a call scope under `captured` that is left when the guard drops.
    pub fn scoped_call(&mut self, captured: &Scope) -> ScopeResult<ScopeGuard<'_>> {
        let base = self.depth();
        self.push_call(captured)?;
        Ok(ScopeGuard { env: self, base })
    }

    /// Run `f` inside a new block scope.
    pub fn with_scope<T, F>(&mut self, f: F) -> ScopeResult<T>
    where
        F: FnOnce(&mut ScopeGuard<'_>) -> T,
    {
        let mut scoped = self.scoped()?;
        Ok(f(&mut scoped))
    }

    /// Run `f` inside a new call scope under `captured`.
    pub fn with_call<T, F>(&mut self, captured: &Scope, f: F) -> ScopeResult<T>
    where
        F: FnOnce(&mut ScopeGuard<'_>) -> T,
    {
        let mut scoped = self.scoped_call(captured)?;
        Ok(f(&mut scoped))
    }
}
