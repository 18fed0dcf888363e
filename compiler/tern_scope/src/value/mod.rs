//! Runtime values stored in scope bindings.
//!
//! `Value` is a closed set of variants. Heap payloads go through factory
//! methods (`Value::string`, `Value::list`, `Value::function`), so the
//! `Heap<T>` wrapper is never built directly outside this module.
//!
//! Values are single-threaded (`Rc`-backed), like the scopes that hold
//! them: a closure value owns a handle to its captured `Scope`.

mod function;
mod heap;

use std::fmt;

pub use function::{BodyId, FunctionValue};
pub use heap::Heap;

use crate::{Name, Scope};

/// Native function registered by the host (e.g. a built-in).
pub type BuiltinFn = fn(&[Value]) -> Result<Value, String>;

/// Every `i64` within this magnitude converts to `f64` exactly.
const MAX_EXACT_INT: i64 = 1 << 53;

/// Runtime value of the interpreted language.
#[derive(Clone)]
pub enum Value {
    /// Integer.
    Int(i64),
    /// Floating-point number.
    Float(f64),
    /// Boolean.
    Bool(bool),
    /// Immutable string.
    Str(Heap<str>),
    /// Null / unit.
    Void,
    /// List of values.
    List(Heap<Vec<Value>>),
    /// User-defined function with its captured scope.
    Function(FunctionValue),
    /// Host function, with the name it was registered under.
    Builtin(BuiltinFn, &'static str),
}

impl Value {
    /// Create an integer value.
    #[inline]
    pub fn int(n: i64) -> Self {
        Value::Int(n)
    }

    /// Create a float value.
    #[inline]
    pub fn float(n: f64) -> Self {
        Value::Float(n)
    }

    /// Create a string value.
    #[inline]
    pub fn string(s: impl AsRef<str>) -> Self {
        Value::Str(Heap::from_text(s.as_ref()))
    }

    /// Create a list value.
    #[inline]
    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Heap::new(items))
    }

    /// Create a closure over `captured`.
    #[inline]
    pub fn function(params: Vec<Name>, body: BodyId, captured: Scope) -> Self {
        Value::Function(FunctionValue::new(params, body, captured))
    }

    /// Create a host function value.
    #[inline]
    pub fn builtin(func: BuiltinFn, name: &'static str) -> Self {
        Value::Builtin(func, name)
    }
}

impl Value {
    /// Check if this value is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Float(n) => *n != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::List(items) => !items.is_empty(),
            Value::Void => false,
            Value::Function(_) | Value::Builtin(..) => true,
        }
    }

    /// Whether this value can be called.
    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Function(_) | Value::Builtin(..))
    }

    /// Try to convert to an integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Try to convert to a float.
    ///
    /// Integers convert only when the conversion is exact (`|n| <= 2^53`).
    #[allow(
        clippy::cast_precision_loss,
        reason = "range checked against the f64 mantissa first"
    )]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(n) => Some(*n),
            Value::Int(n) if (-MAX_EXACT_INT..=MAX_EXACT_INT).contains(n) => Some(*n as f64),
            _ => None,
        }
    }

    /// Try to convert to a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to convert to a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Try to convert to a list.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Try to convert to a user-defined function.
    pub fn as_function(&self) -> Option<&FunctionValue> {
        match self {
            Value::Function(func) => Some(func),
            _ => None,
        }
    }

    /// Get the type name for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
            Value::Str(_) => "str",
            Value::Void => "void",
            Value::List(_) => "list",
            Value::Function(_) => "function",
            Value::Builtin(..) => "builtin",
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Void, Value::Void) => true,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => a == b,
            // Builtins are equal by registered name
            (Value::Builtin(_, a), Value::Builtin(_, b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => f.debug_tuple("Int").field(n).finish(),
            Value::Float(n) => f.debug_tuple("Float").field(n).finish(),
            Value::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Value::Str(s) => f.debug_tuple("Str").field(&&**s).finish(),
            Value::Void => f.write_str("Void"),
            Value::List(items) => f.debug_tuple("List").field(&&**items).finish(),
            Value::Function(func) => f.debug_tuple("Function").field(func).finish(),
            Value::Builtin(_, name) => f.debug_tuple("Builtin").field(name).finish(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(n) => write!(f, "{n}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Str(s) => write!(f, "\"{}\"", &**s),
            Value::Void => write!(f, "void"),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Function(func) => match func.name() {
                Some(name) => write!(f, "<function {name}>"),
                None => write!(f, "<function>"),
            },
            Value::Builtin(_, name) => write!(f, "<builtin {name}>"),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}
