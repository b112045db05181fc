//! Circular traversal over stored layout names.

use std::fmt;

/// Traversal direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Next,
    Prev,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Next => f.write_str("next"),
            Self::Prev => f.write_str("prev"),
        }
    }
}

/// Name that follows `current` in `names`, wrapping around.
///
/// `Prev` walks the list reversed. When `current` is unset or not in the
/// list, the walk starts at the first element of the (possibly reversed)
/// list. Empty `names` yields `None`.
#[must_use]
pub fn circular_step(current: Option<&str>, names: &[String], direction: Direction) -> Option<String> {
    if names.is_empty() {
        return None;
    }
    let len = names.len();
    let pos = current.and_then(|c| names.iter().position(|n| n == c));
    let idx = match (direction, pos) {
        (Direction::Next, None) => 0,
        (Direction::Prev, None) => len - 1,
        (Direction::Next, Some(i)) => (i + 1) % len,
        (Direction::Prev, Some(i)) => (i + len - 1) % len,
    };
    names.get(idx).cloned()
}
