//! Shared heap payloads for runtime values.

use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

/// Reference-counted payload of a heap-backed `Value` variant.
///
/// The constructor is private to the `value` module: heap values are only
/// created through factory methods such as `Value::string` and
/// `Value::list`. Single-threaded, matching the scope chain the values
/// are stored in.
#[repr(transparent)]
pub struct Heap<T: ?Sized>(Rc<T>);

impl<T> Heap<T> {
    #[inline]
    pub(super) fn new(value: T) -> Self {
        Heap(Rc::new(value))
    }

    /// Take the payload when this is the last handle to it.
    pub(crate) fn try_unwrap(this: Self) -> Result<T, Self> {
        Rc::try_unwrap(this.0).map_err(Heap)
    }
}

impl Heap<str> {
    #[inline]
    pub(super) fn from_text(text: &str) -> Self {
        Heap(Rc::from(text))
    }
}

impl<T: ?Sized> Heap<T> {
    /// Whether two heap values share one allocation.
    #[inline]
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        Rc::ptr_eq(&this.0, &other.0)
    }
}

impl<T: ?Sized> Clone for Heap<T> {
    #[inline]
    fn clone(&self) -> Self {
        Heap(Rc::clone(&self.0))
    }
}

impl<T: ?Sized> Deref for Heap<T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T: ?Sized + PartialEq> PartialEq for Heap<T> {
    fn eq(&self, other: &Self) -> bool {
        *self.0 == *other.0
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for Heap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}
