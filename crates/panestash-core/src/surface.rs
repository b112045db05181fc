//! Live-surface adapter: the host-owned window arrangement the codec reads
//! from and writes to.
//!
//! Implementors wrap a real windowing host. The crate ships one
//! implementation, [`crate::sim::SimSurface`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SurfaceError;
use crate::layout_tree::{Bounds, Orientation};

/// Host pane handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaneId(pub u64);

impl fmt::Display for PaneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outer frame position and size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameGeometry {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// What a pane currently shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaneContent {
    pub path: Option<String>,
    pub label: String,
}

/// Content to put into a pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentTarget<'a> {
    /// Open (or create) the file at this path.
    File(&'a str),
    /// Show an existing buffer by name.
    Buffer(&'a str),
}

/// Host window tree as reported by the adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostNode {
    Pane(PaneId),
    Split {
        orientation: Orientation,
        bounds: Bounds,
        children: Vec<HostNode>,
    },
}

impl HostNode {
    /// Pane handles in depth-first, left-to-right order.
    #[must_use]
    pub fn panes_in_order(&self) -> Vec<PaneId> {
        let mut out = Vec::new();
        self.collect_panes(&mut out);
        out
    }

    fn collect_panes(&self, out: &mut Vec<PaneId>) {
        match self {
            Self::Pane(id) => out.push(*id),
            Self::Split { children, .. } => {
                for child in children {
                    child.collect_panes(out);
                }
            }
        }
    }
}

/// Read/write access to a host's window arrangement.
pub trait LiveSurface {
    /// Current window tree.
    fn window_tree(&self) -> HostNode;

    fn frame_geometry(&self) -> FrameGeometry;

    /// Panes in depth-first order, always derived from [`Self::window_tree`].
    fn stable_pane_order(&self) -> Vec<PaneId> {
        self.window_tree().panes_in_order()
    }

    /// Width and height of a pane in cells.
    fn pane_size(&self, pane: PaneId) -> (u32, u32);

    fn pane_content(&self, pane: PaneId) -> PaneContent;

    fn focused_pane(&self) -> PaneId;

    fn set_frame_geometry(&mut self, geometry: FrameGeometry);

    /// Delete every pane but one and return the survivor.
    fn collapse_to_single_pane(&mut self) -> PaneId;

    /// Split `pane` along `axis`. The original pane keeps `size` cells along
    /// the axis and the returned new pane takes the remainder, placed after it.
    fn split(&mut self, pane: PaneId, axis: Orientation, size: u32)
    -> Result<PaneId, SurfaceError>;

    fn set_pane_content(
        &mut self,
        pane: PaneId,
        content: ContentTarget<'_>,
    ) -> Result<(), SurfaceError>;

    fn set_focus(&mut self, pane: PaneId) -> Result<(), SurfaceError>;

    /// Move focus to the next pane in stable order, wrapping around.
    fn advance_focus(&mut self) -> Result<PaneId, SurfaceError> {
        let order = self.stable_pane_order();
        let focused = self.focused_pane();
        let next = order
            .iter()
            .position(|p| *p == focused)
            .map_or(0, |i| (i + 1) % order.len());
        let pane = order.get(next).copied().unwrap_or(focused);
        self.set_focus(pane)?;
        Ok(pane)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panes_in_order_walks_depth_first() {
        let tree = HostNode::Split {
            orientation: Orientation::Horizontal,
            bounds: Bounds::new(0, 0, 80, 24),
            children: vec![
                HostNode::Split {
                    orientation: Orientation::Vertical,
                    bounds: Bounds::new(0, 0, 40, 24),
                    children: vec![HostNode::Pane(PaneId(7)), HostNode::Pane(PaneId(3))],
                },
                HostNode::Pane(PaneId(1)),
            ],
        };
        assert_eq!(tree.panes_in_order(), vec![PaneId(7), PaneId(3), PaneId(1)]);
    }

    #[test]
    fn pane_id_serializes_as_number() {
        assert_eq!(serde_json::to_string(&PaneId(12)).unwrap(), "12");
        assert_eq!(PaneId(12).to_string(), "12");
    }
}
