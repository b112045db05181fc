//! In-memory host simulator implementing [`LiveSurface`].
//!
//! Behaves like a tiling host: splitting a pane gives the original pane the
//! requested size along the axis and places the new pane after it. A pane
//! whose parent already splits along the same axis gets its new sibling
//! inserted next to it, so splits are n-ary the way real hosts combine them.
//!
//! The whole state is serializable so the CLI can keep a surface in a file
//! between invocations.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SurfaceError;
use crate::layout_tree::{Bounds, Orientation};
use crate::surface::{ContentTarget, FrameGeometry, HostNode, LiveSurface, PaneContent, PaneId};

/// Label of the buffer every fresh surface starts with.
pub const SCRATCH_BUFFER: &str = "*scratch*";

/// Pane rectangle in frame-relative cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    #[must_use]
    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    /// Sub-rectangle starting `offset` cells along `axis`, `extent` cells long.
    fn slice(self, axis: Orientation, offset: u32, extent: u32) -> Self {
        match axis {
            Orientation::Horizontal => Self {
                x: self.x + offset,
                width: extent,
                ..self
            },
            Orientation::Vertical => Self {
                y: self.y + offset,
                height: extent,
                ..self
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum SimNode {
    Pane {
        id: PaneId,
    },
    Split {
        orientation: Orientation,
        bounds: Bounds,
        children: Vec<SimNode>,
    },
}

impl SimNode {
    fn to_host(&self) -> HostNode {
        match self {
            Self::Pane { id } => HostNode::Pane(*id),
            Self::Split {
                orientation,
                bounds,
                children,
            } => HostNode::Split {
                orientation: *orientation,
                bounds: *bounds,
                children: children.iter().map(Self::to_host).collect(),
            },
        }
    }

    /// Split `target`, either by inserting `new_id` as its next sibling or by
    /// replacing it with a two-child split covering `rect`.
    fn split_pane(
        &mut self,
        target: PaneId,
        new_id: PaneId,
        axis: Orientation,
        rect: Rect,
    ) -> bool {
        match self {
            Self::Pane { id } if *id == target => {
                *self = Self::Split {
                    orientation: axis,
                    bounds: rect.bounds(),
                    children: vec![Self::Pane { id: target }, Self::Pane { id: new_id }],
                };
                true
            }
            Self::Pane { .. } => false,
            Self::Split {
                orientation,
                children,
                ..
            } => {
                if *orientation == axis {
                    if let Some(pos) = children
                        .iter()
                        .position(|c| matches!(c, Self::Pane { id } if *id == target))
                    {
                        children.insert(pos + 1, Self::Pane { id: new_id });
                        return true;
                    }
                }
                children
                    .iter_mut()
                    .any(|child| child.split_pane(target, new_id, axis, rect))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct SimPane {
    rect: Rect,
    content: PaneContent,
}

/// Serializable simulated host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimSurface {
    frame: FrameGeometry,
    root: SimNode,
    panes: BTreeMap<PaneId, SimPane>,
    focused: PaneId,
    next_id: u64,
    /// Buffers that can be shown by name.
    #[serde(default)]
    buffers: BTreeSet<String>,
    /// File paths the host refuses to open.
    #[serde(default)]
    unopenable: BTreeSet<String>,
}

impl Default for SimSurface {
    fn default() -> Self {
        Self::new(80, 24)
    }
}

impl SimSurface {
    /// A single `*scratch*` pane filling a `width` x `height` frame at the origin.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let first = PaneId(1);
        let mut panes = BTreeMap::new();
        panes.insert(
            first,
            SimPane {
                rect: Rect {
                    x: 0,
                    y: 0,
                    width,
                    height,
                },
                content: PaneContent {
                    path: None,
                    label: SCRATCH_BUFFER.to_string(),
                },
            },
        );
        Self {
            frame: FrameGeometry {
                x: 0,
                y: 0,
                width,
                height,
            },
            root: SimNode::Pane { id: first },
            panes,
            focused: first,
            next_id: 2,
            buffers: BTreeSet::from([SCRATCH_BUFFER.to_string()]),
            unopenable: BTreeSet::new(),
        }
    }

    /// Make a buffer available for [`ContentTarget::Buffer`].
    pub fn add_buffer(&mut self, label: impl Into<String>) {
        self.buffers.insert(label.into());
    }

    /// Make opening `path` fail with [`SurfaceError::OpenFailed`].
    pub fn mark_unopenable(&mut self, path: impl Into<String>) {
        self.unopenable.insert(path.into());
    }

    #[must_use]
    pub fn pane_rect(&self, pane: PaneId) -> Option<Rect> {
        self.panes.get(&pane).map(|p| p.rect)
    }

    #[must_use]
    pub fn pane_count(&self) -> usize {
        self.panes.len()
    }

    fn full_rect(&self) -> Rect {
        Rect {
            x: 0,
            y: 0,
            width: self.frame.width,
            height: self.frame.height,
        }
    }

    fn node_extent(&self, node: &SimNode, axis: Orientation) -> u32 {
        match node {
            SimNode::Pane { id } => self
                .panes
                .get(id)
                .map_or(0, |p| axis.along(p.rect.width, p.rect.height)),
            SimNode::Split { bounds, .. } => axis.along(bounds.width(), bounds.height()),
        }
    }

    /// Lay `node` out inside `rect`. Children keep their extents along the
    /// split axis except the last, which absorbs the difference.
    fn relayout(&mut self, node: &mut SimNode, rect: Rect) {
        match node {
            SimNode::Pane { id } => {
                if let Some(pane) = self.panes.get_mut(id) {
                    pane.rect = rect;
                }
            }
            SimNode::Split {
                orientation,
                bounds,
                children,
            } => {
                let axis = *orientation;
                *bounds = rect.bounds();
                let total = axis.along(rect.width, rect.height);
                let mut extents: Vec<u32> = children
                    .iter()
                    .map(|c| self.node_extent(c, axis))
                    .collect();
                let head: u32 = extents.iter().rev().skip(1).sum();
                if let Some(last) = extents.last_mut() {
                    *last = total.saturating_sub(head).max(1);
                }
                let mut offset = 0;
                for (child, extent) in children.iter_mut().zip(extents) {
                    self.relayout(child, rect.slice(axis, offset, extent));
                    offset += extent;
                }
            }
        }
    }
}

impl LiveSurface for SimSurface {
    fn window_tree(&self) -> HostNode {
        self.root.to_host()
    }

    fn frame_geometry(&self) -> FrameGeometry {
        self.frame
    }

    fn pane_size(&self, pane: PaneId) -> (u32, u32) {
        self.panes
            .get(&pane)
            .map_or((0, 0), |p| (p.rect.width, p.rect.height))
    }

    fn pane_content(&self, pane: PaneId) -> PaneContent {
        self.panes.get(&pane).map_or_else(
            || PaneContent {
                path: None,
                label: String::new(),
            },
            |p| p.content.clone(),
        )
    }

    fn focused_pane(&self) -> PaneId {
        self.focused
    }

    fn set_frame_geometry(&mut self, geometry: FrameGeometry) {
        let resized = geometry.width != self.frame.width || geometry.height != self.frame.height;
        self.frame = geometry;
        if resized {
            let mut root = self.root.clone();
            self.relayout(&mut root, self.full_rect());
            self.root = root;
        }
    }

    fn collapse_to_single_pane(&mut self) -> PaneId {
        let keep = self.focused;
        let rect = self.full_rect();
        self.panes.retain(|id, _| *id == keep);
        if let Some(pane) = self.panes.get_mut(&keep) {
            pane.rect = rect;
        }
        self.root = SimNode::Pane { id: keep };
        keep
    }

    fn split(
        &mut self,
        pane: PaneId,
        axis: Orientation,
        size: u32,
    ) -> Result<PaneId, SurfaceError> {
        let original = self
            .panes
            .get(&pane)
            .cloned()
            .ok_or(SurfaceError::PaneNotFound(pane.0))?;
        let available = axis.along(original.rect.width, original.rect.height);
        if size == 0 || size >= available {
            return Err(SurfaceError::TooSmall {
                pane: pane.0,
                axis,
                size,
                available,
            });
        }

        let new_id = PaneId(self.next_id);
        if !self.root.split_pane(pane, new_id, axis, original.rect) {
            return Err(SurfaceError::PaneNotFound(pane.0));
        }
        self.next_id += 1;

        let kept = original.rect.slice(axis, 0, size);
        let added = original.rect.slice(axis, size, available - size);
        if let Some(p) = self.panes.get_mut(&pane) {
            p.rect = kept;
        }
        self.panes.insert(
            new_id,
            SimPane {
                rect: added,
                content: original.content,
            },
        );
        debug!(pane = pane.0, new_pane = new_id.0, %axis, size, "sim split");
        Ok(new_id)
    }

    fn set_pane_content(
        &mut self,
        pane: PaneId,
        content: ContentTarget<'_>,
    ) -> Result<(), SurfaceError> {
        if !self.panes.contains_key(&pane) {
            return Err(SurfaceError::PaneNotFound(pane.0));
        }
        let new_content = match content {
            ContentTarget::File(path) => {
                if self.unopenable.contains(path) {
                    return Err(SurfaceError::OpenFailed {
                        path: path.to_string(),
                        reason: "permission denied".to_string(),
                    });
                }
                let label = path.rsplit('/').next().unwrap_or(path).to_string();
                self.buffers.insert(label.clone());
                PaneContent {
                    path: Some(path.to_string()),
                    label,
                }
            }
            ContentTarget::Buffer(label) => {
                if !self.buffers.contains(label) {
                    return Err(SurfaceError::NoSuchBuffer(label.to_string()));
                }
                PaneContent {
                    path: None,
                    label: label.to_string(),
                }
            }
        };
        if let Some(p) = self.panes.get_mut(&pane) {
            p.content = new_content;
        }
        Ok(())
    }

    fn set_focus(&mut self, pane: PaneId) -> Result<(), SurfaceError> {
        if !self.panes.contains_key(&pane) {
            return Err(SurfaceError::PaneNotFound(pane.0));
        }
        self.focused = pane;
        Ok(())
    }
}
