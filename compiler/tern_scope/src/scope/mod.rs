//! Lexical scopes and the chain walks that resolve names through them.
//!
//! A `Scope` is a shared handle to one frame of bindings plus an optional
//! parent handle. Children, closures, and the environment's scope stack all
//! hold handles, so an ancestor stays alive as long as anything below it
//! does.
//!
//! Every walk up the parent chain (`get`, `set`, `contains`,
//! `global_scope`) is a loop, and so is dropping a chain. Nesting depth
//! grows with interpreted recursion, so none of these may recurse.

mod dump;

use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

use crate::errors::{cannot_assign_immutable, undeclared_assignment, undefined_variable};
use crate::{AssignPolicy, Heap, Name, ScopeResult, Value};

pub use dump::{ChainDump, ScopeFrame};

/// Whether a variable binding can be reassigned.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mutability {
    /// Binding can be reassigned.
    #[default]
    Mutable,
    /// Binding cannot be reassigned (parameters of built-ins, constants).
    Immutable,
}

impl Mutability {
    /// Returns `true` if this is `Mutable`.
    #[inline]
    pub fn is_mutable(self) -> bool {
        matches!(self, Mutability::Mutable)
    }
}

/// A single-threaded shared cell: `Rc<RefCell<T>>` behind one factory.
///
/// All scope frames are allocated through `LocalScope::new()`. The wrapper
/// is `#[repr(transparent)]`, so it costs nothing over the raw `Rc`.
/// Not thread-safe: the interpreter runs single-threaded.
#[repr(transparent)]
pub struct LocalScope<T>(Rc<RefCell<T>>);

impl<T> LocalScope<T> {
    /// Create a new `LocalScope` wrapping the given value.
    #[inline]
    pub fn new(value: T) -> Self {
        LocalScope(Rc::new(RefCell::new(value)))
    }

    /// Borrow the inner value immutably.
    #[inline]
    pub fn borrow(&self) -> std::cell::Ref<'_, T> {
        self.0.borrow()
    }

    /// Borrow the inner value mutably.
    #[inline]
    pub fn borrow_mut(&self) -> std::cell::RefMut<'_, T> {
        self.0.borrow_mut()
    }

    /// Whether two handles point at the same allocation.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Number of handles sharing this allocation.
    #[inline]
    pub fn handle_count(&self) -> usize {
        Rc::strong_count(&self.0)
    }

    /// Take the inner value if this is the last handle.
    pub fn try_unwrap(self) -> Result<T, Self> {
        Rc::try_unwrap(self.0)
            .map(RefCell::into_inner)
            .map_err(LocalScope)
    }
}

impl<T> Clone for LocalScope<T> {
    #[inline]
    fn clone(&self) -> Self {
        LocalScope(Rc::clone(&self.0))
    }
}

impl<T: fmt::Debug> fmt::Debug for LocalScope<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LocalScope").field(&self.0).finish()
    }
}

impl<T: Default> Default for LocalScope<T> {
    fn default() -> Self {
        LocalScope::new(T::default())
    }
}

impl<T> Deref for LocalScope<T> {
    type Target = RefCell<T>;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// A variable binding.
#[derive(Clone, Debug)]
struct Binding {
    value: Value,
    mutability: Mutability,
}

/// Bindings of one scope plus its link to the enclosing scope.
struct Frame {
    /// Name to slot in `entries`.
    index: FxHashMap<Name, usize>,
    /// Bindings in first-definition order.
    entries: Vec<(Name, Binding)>,
    parent: Option<Scope>,
    /// Number of ancestors; 0 for the global scope.
    depth: usize,
    /// Inherited from the global scope at construction.
    policy: AssignPolicy,
}

impl Frame {
    fn new(parent: Option<Scope>, policy: AssignPolicy) -> Self {
        let (depth, policy) = match &parent {
            Some(p) => {
                let parent_frame = p.frame.borrow();
                (parent_frame.depth.saturating_add(1), parent_frame.policy)
            }
            None => (0, policy),
        };
        Frame {
            index: FxHashMap::default(),
            entries: Vec::new(),
            parent,
            depth,
            policy,
        }
    }

    fn binding(&self, name: &str) -> Option<&Binding> {
        let slot = *self.index.get(name)?;
        self.entries.get(slot).map(|(_, binding)| binding)
    }

    fn binding_mut(&mut self, name: &str) -> Option<&mut Binding> {
        let slot = *self.index.get(name)?;
        self.entries.get_mut(slot).map(|(_, binding)| binding)
    }

    /// Insert or overwrite; an overwritten name keeps its original slot.
    fn insert(&mut self, name: Name, binding: Binding) {
        if let Some(existing) = self.binding_mut(&name) {
            *existing = binding;
            return;
        }
        self.index.insert(name.clone(), self.entries.len());
        self.entries.push((name, binding));
    }

    fn names(&self) -> impl Iterator<Item = &Name> {
        self.entries.iter().map(|(name, _)| name)
    }
}

impl Frame {
    /// Move the parent link and every binding's value onto the worklists,
    /// leaving a frame whose own drop has nothing left to release.
    fn drain_into(&mut self, scopes: &mut Vec<Scope>, values: &mut Vec<Value>) {
        scopes.extend(self.parent.take());
        self.index.clear();
        values.extend(
            std::mem::take(&mut self.entries)
                .into_iter()
                .map(|(_, binding)| binding.value),
        );
    }
}

impl Drop for Frame {
    // Frames reach other frames through parent links and through closures
    // stored in bindings (directly or inside lists). The default drop would
    // recurse once per link, so solely owned frames are released from a
    // worklist instead.
    fn drop(&mut self) {
        let mut scopes = Vec::new();
        let mut values = Vec::new();
        self.drain_into(&mut scopes, &mut values);

        loop {
            if let Some(value) = values.pop() {
                match value {
                    Value::Function(func) => scopes.push(func.into_captured()),
                    Value::List(items) => {
                        if let Ok(items) = Heap::try_unwrap(items) {
                            values.extend(items);
                        }
                    }
                    _ => {}
                }
                continue;
            }
            let Some(scope) = scopes.pop() else {
                break;
            };
            if let Ok(mut frame) = scope.frame.try_unwrap() {
                frame.drain_into(&mut scopes, &mut values);
            }
        }
    }
}

/// Handle to a scope: one level of the lexical chain.
///
/// Cloning the handle shares the scope; it never copies bindings. All
/// operations take `&self` and mutate through the shared cell, so any
/// holder (a child, a closure, the environment) can define and assign.
///
/// Two handles are `==` when they refer to the same scope.
#[derive(Clone)]
pub struct Scope {
    frame: LocalScope<Frame>,
}

impl Scope {
    /// Create a scope under `parent`, or a global scope when `parent` is `None`.
    ///
    /// A new global scope uses the default assign policy; children always
    /// inherit the policy of their chain.
    pub fn new(parent: Option<&Scope>) -> Self {
        let scope = Scope {
            frame: LocalScope::new(Frame::new(parent.cloned(), AssignPolicy::default())),
        };
        tracing::trace!(depth = scope.depth(), "scope created");
        scope
    }

    /// Create a global scope with the default assign policy.
    pub fn global() -> Self {
        Self::new(None)
    }

    /// Create a global scope with an explicit assign policy.
    pub fn global_with_policy(policy: AssignPolicy) -> Self {
        let scope = Scope {
            frame: LocalScope::new(Frame::new(None, policy)),
        };
        tracing::trace!(?policy, "global scope created");
        scope
    }

    /// Create a child of this scope.
    pub fn child(&self) -> Self {
        Self::new(Some(self))
    }

    /// Define a mutable variable in this scope only.
    ///
    /// Overwrites an existing local binding of the same name and shadows
    /// any binding in an ancestor. Never touches the parent chain.
    #[inline]
    pub fn define(&self, name: impl Into<Name>, value: Value) {
        self.define_with(name, value, Mutability::Mutable);
    }

    /// Define a variable in this scope only, with explicit mutability.
    pub fn define_with(&self, name: impl Into<Name>, value: Value, mutability: Mutability) {
        let name = name.into();
        tracing::trace!(name = %name, ?mutability, "define");
        self.frame
            .borrow_mut()
            .insert(name, Binding { value, mutability });
    }

    /// Assign to an existing variable.
    ///
    /// Updates the nearest scope that binds `name`. If no scope in the
    /// chain binds it, the global scope's assign policy decides:
    /// `CreateGlobal` defines it in the global scope (and nowhere else),
    /// `Strict` fails with `UndeclaredAssignment`.
    pub fn set(&self, name: &str, value: Value) -> ScopeResult<()> {
        let mut current = self.clone();
        loop {
            let parent = {
                let mut frame = current.frame.borrow_mut();
                if let Some(binding) = frame.binding_mut(name) {
                    if !binding.mutability.is_mutable() {
                        return Err(cannot_assign_immutable(name));
                    }
                    binding.value = value;
                    return Ok(());
                }
                frame.parent.clone()
            };
            match parent {
                Some(parent) => current = parent,
                None => break,
            }
        }

        // `current` is the global scope and nothing in the chain binds `name`.
        let policy = current.assign_policy();
        if !policy.creates_globals() {
            tracing::debug!(name, "assignment to undeclared variable rejected");
            return Err(undeclared_assignment(name));
        }
        tracing::debug!(name, "assignment created global binding");
        current.frame.borrow_mut().insert(
            Name::new(name),
            Binding {
                value,
                mutability: Mutability::Mutable,
            },
        );
        Ok(())
    }

    /// Look up a variable, failing with `UndefinedVariable` if no scope
    /// in the chain binds it.
    pub fn get(&self, name: &str) -> ScopeResult<Value> {
        self.lookup(name).ok_or_else(|| {
            tracing::debug!(name, "undefined variable");
            undefined_variable(name)
        })
    }

    /// Look up a variable by name; nearest binding wins.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        self.ancestors().find_map(|scope| {
            let frame = scope.frame.borrow();
            frame.binding(name).map(|binding| binding.value.clone())
        })
    }

    /// Whether `name` is bound in this scope or any ancestor.
    pub fn contains(&self, name: &str) -> bool {
        self.ancestors().any(|scope| scope.contains_local(name))
    }

    /// Whether `name` is bound in this scope itself.
    pub fn contains_local(&self, name: &str) -> bool {
        self.frame.borrow().index.contains_key(name)
    }

    /// Mutability of the nearest binding of `name`, if any.
    pub fn mutability_of(&self, name: &str) -> Option<Mutability> {
        self.ancestors().find_map(|scope| {
            let frame = scope.frame.borrow();
            frame.binding(name).map(|binding| binding.mutability)
        })
    }

    /// The enclosing scope, or `None` for the global scope.
    pub fn parent(&self) -> Option<Scope> {
        self.frame.borrow().parent.clone()
    }

    /// The global scope at the root of this chain.
    pub fn global_scope(&self) -> Scope {
        let mut current = self.clone();
        while let Some(parent) = current.parent() {
            current = parent;
        }
        current
    }

    /// Whether this is a global (parentless) scope.
    pub fn is_global(&self) -> bool {
        self.frame.borrow().parent.is_none()
    }

    /// Number of ancestors between this scope and the global scope.
    pub fn depth(&self) -> usize {
        self.frame.borrow().depth
    }

    /// Assign policy of this chain's global scope.
    pub fn assign_policy(&self) -> AssignPolicy {
        self.frame.borrow().policy
    }

    /// Names bound in this scope (not inherited), in definition order.
    pub fn local_names(&self) -> Vec<Name> {
        self.frame.borrow().names().cloned().collect()
    }

    /// Bindings of this scope (not inherited), in definition order.
    pub fn local_bindings(&self) -> Vec<(Name, Value)> {
        self.frame
            .borrow()
            .entries
            .iter()
            .map(|(name, binding)| (name.clone(), binding.value.clone()))
            .collect()
    }

    /// Number of bindings in this scope.
    pub fn local_len(&self) -> usize {
        self.frame.borrow().entries.len()
    }

    /// Iterate from this scope up to and including the global scope.
    pub fn ancestors(&self) -> Ancestors {
        Ancestors {
            next: Some(self.clone()),
        }
    }

    /// Stack-frame style listing of every scope's local names.
    pub fn chain_dump(&self) -> ChainDump {
        ChainDump::capture(self)
    }

    /// Whether two handles refer to the same scope.
    #[inline]
    pub fn ptr_eq(&self, other: &Scope) -> bool {
        self.frame.ptr_eq(&other.frame)
    }

    /// Remove every binding of this scope. Only used for run teardown.
    ///
    /// Values are dropped after the frame borrow is released, so closures
    /// that capture this very scope can be dropped safely.
    pub(crate) fn clear(&self) -> usize {
        let entries = {
            let mut frame = self.frame.borrow_mut();
            frame.index.clear();
            std::mem::take(&mut frame.entries)
        };
        entries.len()
    }
}

impl PartialEq for Scope {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Scope {}

// Shallow on purpose: parents and captured closures may form cycles.
impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.frame.try_borrow() {
            Ok(frame) => f
                .debug_struct("Scope")
                .field("depth", &frame.depth)
                .field("locals", &frame.names().collect::<Vec<_>>())
                .finish(),
            Err(_) => f.write_str("Scope { <borrowed> }"),
        }
    }
}

/// Iterator over a scope and its ancestors, innermost first.
pub struct Ancestors {
    next: Option<Scope>,
}

impl Iterator for Ancestors {
    type Item = Scope;

    fn next(&mut self) -> Option<Scope> {
        let current = self.next.take()?;
        self.next = current.parent();
        Some(current)
    }
}

#[cfg(test)]
mod tests;
