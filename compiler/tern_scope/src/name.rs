//! Identifier names used as binding keys.

use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

/// An identifier bound in a scope.
///
/// The text is shared behind an `Rc<str>`, so cloning a `Name` (which
/// happens for every introspection call and every error) never copies the
/// string. `Name` borrows as `str`, so binding tables keyed by `Name` are
/// queried with a plain `&str`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Name(Rc<str>);

impl Name {
    /// Create a name from identifier text.
    #[inline]
    pub fn new(text: &str) -> Self {
        Name(Rc::from(text))
    }

    /// The identifier text.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Name {
    #[inline]
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl Deref for Name {
    type Target = str;

    #[inline]
    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Name {
    #[inline]
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Name {
    #[inline]
    fn from(text: &str) -> Self {
        Name::new(text)
    }
}

impl From<String> for Name {
    #[inline]
    fn from(text: String) -> Self {
        Name(Rc::from(text))
    }
}

impl From<&Name> for Name {
    #[inline]
    fn from(name: &Name) -> Self {
        name.clone()
    }
}

impl PartialEq<str> for Name {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for Name {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({:?})", &*self.0)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
