//! Layout tree model: a serializable split tree of content-bearing panes.
//!
//! A [`LayoutSnapshot`] is the unit stored under a name. Its `root` is a
//! [`Node`], either a [`Leaf`] (one pane) or a [`Split`] dividing its bounds
//! among two or more children along one axis.
//!
//! The depth-first, left-to-right traversal of leaves is the only pane
//! ordering used anywhere in the crate. The focused pane is addressed by its
//! index in that order.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TreeError;

// =============================================================================
// Geometry
// =============================================================================

/// Split axis.
///
/// `Horizontal` lays children out left-to-right, `Vertical` top-to-bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    /// Pick the extent that runs along this axis.
    #[must_use]
    pub fn along(self, width: u32, height: u32) -> u32 {
        match self {
            Self::Horizontal => width,
            Self::Vertical => height,
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Horizontal => f.write_str("horizontal"),
            Self::Vertical => f.write_str("vertical"),
        }
    }
}

/// Edges of a split's area in cells, `x2`/`y2` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bounds {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl Bounds {
    #[must_use]
    pub fn new(x1: u32, y1: u32, x2: u32, y2: u32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.x2.saturating_sub(self.x1)
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.y2.saturating_sub(self.y1)
    }
}

// =============================================================================
// Tree nodes
// =============================================================================

/// One visible pane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leaf {
    pub width: u32,
    pub height: u32,
    /// Backing file, if the pane shows a file.
    #[serde(default)]
    pub content_path: Option<String>,
    /// Display name of the content, used when there is no file.
    pub content_label: String,
}

/// A container dividing its bounds among `children` along `orientation`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Split {
    pub orientation: Orientation,
    pub bounds: Bounds,
    pub children: Vec<Node>,
}

/// Layout tree node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    Leaf(Leaf),
    Split(Split),
}

impl Node {
    /// Leaves in depth-first, left-to-right order.
    #[must_use]
    pub fn leaves_in_order(&self) -> Vec<&Leaf> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a Leaf>) {
        match self {
            Self::Leaf(leaf) => out.push(leaf),
            Self::Split(split) => {
                for child in &split.children {
                    child.collect_leaves(out);
                }
            }
        }
    }

    #[must_use]
    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Leaf(_) => 1,
            Self::Split(split) => split.children.iter().map(Self::leaf_count).sum(),
        }
    }

    /// Size of this node along `axis`: a leaf's width or height, a split's
    /// bounds width or height.
    #[must_use]
    pub fn extent_along(&self, axis: Orientation) -> u32 {
        match self {
            Self::Leaf(leaf) => axis.along(leaf.width, leaf.height),
            Self::Split(split) => axis.along(split.bounds.width(), split.bounds.height()),
        }
    }

    /// Check structural invariants of this subtree.
    pub fn validate(&self) -> Result<(), TreeError> {
        match self {
            Self::Leaf(leaf) => {
                if leaf.width == 0 || leaf.height == 0 {
                    return Err(TreeError::EmptyLeaf {
                        label: leaf.content_label.clone(),
                        width: leaf.width,
                        height: leaf.height,
                    });
                }
                Ok(())
            }
            Self::Split(split) => {
                if split.children.len() < 2 {
                    return Err(TreeError::TooFewChildren(split.children.len()));
                }
                split.children.iter().try_for_each(Self::validate)
            }
        }
    }

    /// Maximum nesting depth; a lone leaf has depth 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::Leaf(_) => 1,
            Self::Split(split) => 1 + split.children.iter().map(Self::depth).max().unwrap_or(0),
        }
    }
}

// =============================================================================
// Snapshot
// =============================================================================

/// A captured layout: frame geometry, focus and the pane tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutSnapshot {
    pub frame_position: (i32, i32),
    pub frame_size: (u32, u32),
    pub focused_leaf_index: usize,
    pub root: Node,
}

impl LayoutSnapshot {
    #[must_use]
    pub fn leaves_in_order(&self) -> Vec<&Leaf> {
        self.root.leaves_in_order()
    }

    #[must_use]
    pub fn leaf_count(&self) -> usize {
        self.root.leaf_count()
    }

    /// The leaf addressed by `focused_leaf_index`, if in range.
    #[must_use]
    pub fn focused_leaf(&self) -> Option<&Leaf> {
        self.leaves_in_order().get(self.focused_leaf_index).copied()
    }

    /// Validate the tree and the focus index.
    pub fn validate(&self) -> Result<(), TreeError> {
        self.root.validate()?;
        let leaves = self.leaf_count();
        if self.focused_leaf_index >= leaves {
            return Err(TreeError::FocusOutOfRange {
                index: self.focused_leaf_index,
                leaves,
            });
        }
        Ok(())
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

// =============================================================================
// Tests
// =============================================================================
