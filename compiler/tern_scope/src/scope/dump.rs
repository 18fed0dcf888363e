//! Stack-frame style snapshot of a scope chain, for debugging output.

use std::fmt;

use super::Scope;
use crate::Name;

/// One scope in a `ChainDump`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScopeFrame {
    /// Depth of the scope (0 for the global scope).
    pub depth: usize,
    /// Local names in definition order.
    pub names: Vec<Name>,
}

/// Immutable snapshot of the local names along a scope chain.
///
/// Frames run innermost first; the last frame is the global scope.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChainDump {
    frames: Vec<ScopeFrame>,
}

impl ChainDump {
    pub(super) fn capture(scope: &Scope) -> Self {
        let frames = scope
            .ancestors()
            .map(|s| ScopeFrame {
                depth: s.depth(),
                names: s.local_names(),
            })
            .collect();
        ChainDump { frames }
    }

    /// Get the captured frames.
    pub fn frames(&self) -> &[ScopeFrame] {
        &self.frames
    }

    /// Number of frames in the dump.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Check if the dump is empty.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl fmt::Display for ChainDump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "scope chain:")?;
        for frame in &self.frames {
            let label = if frame.depth == 0 { "global" } else { "local" };
            write!(f, "  {}: {label} [", frame.depth)?;
            for (i, name) in frame.names.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{name}")?;
            }
            writeln!(f, "]")?;
        }
        Ok(())
    }
}
