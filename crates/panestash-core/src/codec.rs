//! Layout codec: capture a live surface into a [`LayoutSnapshot`] and
//! rebuild a live layout from one.
//!
//! # Data flow
//!
//! ```text
//! LiveSurface ──capture──▶ LayoutSnapshot ──restore──▶ LiveSurface (split/content/focus)
//! ```
//!
//! Restore issues host calls in a fixed order: frame geometry, then the split
//! structure, then per-leaf content, then focus. It never fails as a whole;
//! refused splits and unopenable content are recorded in the returned
//! [`RestoreReport`] and the rest of the tree is still restored.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::SurfaceError;
use crate::layout_tree::{Leaf, LayoutSnapshot, Node, Split};
use crate::surface::{ContentTarget, FrameGeometry, HostNode, LiveSurface, PaneId};

// =============================================================================
// Configuration
// =============================================================================

/// Which parts of a snapshot restore applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RestoreConfig {
    /// Apply the saved frame position and size.
    pub frame_geometry: bool,
    /// Reopen files and buffers in each pane.
    pub content: bool,
    /// Focus the saved leaf.
    pub focus: bool,
}

impl Default for RestoreConfig {
    fn default() -> Self {
        Self {
            frame_geometry: true,
            content: true,
            focus: true,
        }
    }
}

// =============================================================================
// Result types
// =============================================================================

/// Outcome of a restore. Informational only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RestoreReport {
    /// Leaves that got a pane.
    pub panes_created: usize,
    /// Leaves lost to refused splits (leaf index → error).
    pub failed_leaves: Vec<(usize, String)>,
    /// Leaves whose content could not be applied (leaf index → error).
    pub content_failures: Vec<(usize, String)>,
    pub focus_applied: bool,
}

impl RestoreReport {
    /// Every leaf got a pane and its content.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed_leaves.is_empty() && self.content_failures.is_empty()
    }
}

// =============================================================================
// Capture
// =============================================================================

/// Snapshot the surface's current layout.
pub fn capture<S: LiveSurface + ?Sized>(surface: &S) -> LayoutSnapshot {
    let tree = surface.window_tree();
    let root = capture_node(surface, &tree);

    let focused = surface.focused_pane();
    let order = surface.stable_pane_order();
    let focused_leaf_index = order.iter().position(|p| *p == focused).unwrap_or_else(|| {
        warn!(pane = focused.0, "focused pane not in window tree, using first leaf");
        0
    });

    let frame = surface.frame_geometry();
    let snapshot = LayoutSnapshot {
        frame_position: (frame.x, frame.y),
        frame_size: (frame.width, frame.height),
        focused_leaf_index,
        root,
    };

    debug!(
        leaves = order.len(),
        focused_leaf_index,
        depth = snapshot.root.depth(),
        "layout captured"
    );
    snapshot
}

fn capture_node<S: LiveSurface + ?Sized>(surface: &S, node: &HostNode) -> Node {
    match node {
        HostNode::Pane(pane) => {
            let (width, height) = surface.pane_size(*pane);
            let content = surface.pane_content(*pane);
            Node::Leaf(Leaf {
                width,
                height,
                content_path: content.path,
                content_label: content.label,
            })
        }
        HostNode::Split {
            orientation,
            bounds,
            children,
        } => Node::Split(Split {
            orientation: *orientation,
            bounds: *bounds,
            children: children.iter().map(|c| capture_node(surface, c)).collect(),
        }),
    }
}

// =============================================================================
// Restore
// =============================================================================

/// A leaf placed in a live pane during the structure phase.
struct Placed<'a> {
    pane: PaneId,
    leaf_index: usize,
    leaf: &'a Leaf,
}

/// Rebuilds a snapshot on a live surface.
pub struct LayoutRestorer<'s, S: LiveSurface + ?Sized> {
    surface: &'s mut S,
    config: RestoreConfig,
}

impl<'s, S: LiveSurface + ?Sized> LayoutRestorer<'s, S> {
    pub fn new(surface: &'s mut S, config: RestoreConfig) -> Self {
        Self { surface, config }
    }

    /// Replace the surface's layout with `snapshot`.
    pub fn restore(&mut self, snapshot: &LayoutSnapshot) -> RestoreReport {
        let mut report = RestoreReport::default();

        info!(
            leaves = snapshot.leaf_count(),
            focused_leaf_index = snapshot.focused_leaf_index,
            "starting layout restoration"
        );

        if self.config.frame_geometry {
            let (x, y) = snapshot.frame_position;
            let (width, height) = snapshot.frame_size;
            self.surface.set_frame_geometry(FrameGeometry {
                x,
                y,
                width,
                height,
            });
        }

        let root_pane = self.surface.collapse_to_single_pane();
        let mut placed = Vec::new();
        self.materialize(&snapshot.root, root_pane, 0, &mut placed, &mut report);

        if self.config.content {
            for p in &placed {
                self.apply_content(p, &mut report);
            }
        }

        if self.config.focus {
            report.focus_applied = self.apply_focus(snapshot.focused_leaf_index, &placed, &report);
        }

        info!(
            panes = report.panes_created,
            failed = report.failed_leaves.len(),
            content_failures = report.content_failures.len(),
            focus_applied = report.focus_applied,
            "layout restoration complete"
        );
        report
    }

    fn materialize<'a>(
        &mut self,
        node: &'a Node,
        pane: PaneId,
        leaf_index: usize,
        placed: &mut Vec<Placed<'a>>,
        report: &mut RestoreReport,
    ) {
        match node {
            Node::Leaf(leaf) => {
                placed.push(Placed {
                    pane,
                    leaf_index,
                    leaf,
                });
                report.panes_created += 1;
            }
            Node::Split(split) => self.materialize_children(split, pane, leaf_index, placed, report),
        }
    }

    /// Every child but the last is carved off the front of `pane` with a
    /// split sized to the child; the remainder carries on to the next sibling
    /// and the last child takes whatever is left.
    fn materialize_children<'a>(
        &mut self,
        split: &'a Split,
        pane: PaneId,
        leaf_index: usize,
        placed: &mut Vec<Placed<'a>>,
        report: &mut RestoreReport,
    ) {
        let Some((last, head)) = split.children.split_last() else {
            return;
        };

        let mut current = pane;
        let mut index = leaf_index;
        for child in head {
            let size = child.extent_along(split.orientation);
            match self.surface.split(current, split.orientation, size) {
                Ok(remainder) => {
                    debug!(
                        pane = current.0,
                        new_pane = remainder.0,
                        orientation = %split.orientation,
                        size,
                        "split pane created"
                    );
                    self.materialize(child, current, index, placed, report);
                    current = remainder;
                }
                Err(e) => {
                    let leaves = child.leaf_count();
                    warn!(
                        pane = current.0,
                        orientation = %split.orientation,
                        size,
                        leaf_index = index,
                        affected_leaves = leaves,
                        error = %e,
                        "failed to create split pane"
                    );
                    for i in index..index + leaves {
                        report.failed_leaves.push((i, e.to_string()));
                    }
                }
            }
            index += child.leaf_count();
        }

        self.materialize(last, current, index, placed, report);
    }

    fn apply_content(&mut self, placed: &Placed<'_>, report: &mut RestoreReport) {
        let leaf = placed.leaf;
        let target = match &leaf.content_path {
            Some(path) => ContentTarget::File(path),
            None => ContentTarget::Buffer(&leaf.content_label),
        };
        match self.surface.set_pane_content(placed.pane, target) {
            Ok(()) => {
                debug!(
                    pane = placed.pane.0,
                    leaf_index = placed.leaf_index,
                    path = ?leaf.content_path,
                    label = %leaf.content_label,
                    "pane content set"
                );
            }
            Err(e) => {
                if matches!(e, SurfaceError::NoSuchBuffer(_)) {
                    debug!(
                        pane = placed.pane.0,
                        leaf_index = placed.leaf_index,
                        error = %e,
                        "buffer gone, keeping default content"
                    );
                } else {
                    warn!(
                        pane = placed.pane.0,
                        leaf_index = placed.leaf_index,
                        path = ?leaf.content_path,
                        error = %e,
                        "failed to set pane content"
                    );
                }
                report
                    .content_failures
                    .push((placed.leaf_index, e.to_string()));
            }
        }
    }

    fn apply_focus(&mut self, focused_leaf_index: usize, placed: &[Placed<'_>], report: &RestoreReport) -> bool {
        // With refused splits the live order no longer lines up with leaf
        // indices, so fall back to where the focused leaf was placed.
        let target = if report.failed_leaves.is_empty() {
            self.surface
                .stable_pane_order()
                .get(focused_leaf_index)
                .copied()
        } else {
            placed
                .iter()
                .find(|p| p.leaf_index == focused_leaf_index)
                .map(|p| p.pane)
        };

        let Some(pane) = target else {
            warn!(leaf_index = focused_leaf_index, "focused leaf has no live pane");
            return false;
        };
        match self.surface.set_focus(pane) {
            Ok(()) => true,
            Err(e) => {
                warn!(pane = pane.0, leaf_index = focused_leaf_index, error = %e, "failed to focus pane");
                false
            }
        }
    }
}

/// Rebuild `snapshot` on `surface`.
pub fn restore<S: LiveSurface + ?Sized>(
    snapshot: &LayoutSnapshot,
    surface: &mut S,
    config: &RestoreConfig,
) -> RestoreReport {
    LayoutRestorer::new(surface, config.clone()).restore(snapshot)
}

// =============================================================================
// Tests
// =============================================================================
