//! Tern Scope - variable bindings and lexical scope chain for the Tern
//! interpreter.
//!
//! # Architecture
//!
//! - `Scope`: shared handle to one level of the chain; `get`/`set`/
//!   `contains` resolve names by walking parent links iteratively
//! - `Environment`: one interpreter run; owns the global scope and the
//!   stack of entered block and call scopes, with RAII `ScopeGuard`s
//! - `Value`: closed set of runtime values; closures hold the `Scope`
//!   they were defined in
//! - `EnvConfig` / `AssignPolicy`: whether assigning an unbound name
//!   creates a global or is an error, and the nesting limit
//! - `ScopeError`: the failures above, for the evaluator to decorate with
//!   source positions
//!
//! The evaluator (lexer, parser, AST walk, built-in registration) lives
//! outside this crate and drives it through these types.

mod config;
mod environment;
pub mod errors;
mod name;
mod scope;
mod tracing_setup;
mod value;

pub use config::{AssignPolicy, EnvConfig, ASSIGN_POLICY_VAR, MAX_SCOPE_DEPTH_VAR};
pub use environment::{Environment, ScopeGuard};
pub use errors::{ScopeError, ScopeResult};
pub use name::Name;
pub use scope::{Ancestors, ChainDump, LocalScope, Mutability, Scope, ScopeFrame};
pub use tracing_setup::{init_tracing, LOG_TREE_VAR, LOG_VAR};
pub use value::{BodyId, BuiltinFn, FunctionValue, Heap, Value};
