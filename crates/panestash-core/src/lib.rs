//! panestash-core: Core library for panestash
//!
//! Captures the split-pane layout of a windowing surface, stores it under a
//! name, and restores it later, with circular navigation between stored
//! layouts.
//!
//! # Architecture
//!
//! ```text
//! LiveSurface → codec::capture → LayoutSnapshot → SnapshotStore (JSON file)
//!                                                        ↓
//! LiveSurface ← codec::restore ← LayoutSnapshot ← SnapshotStore::find
//! ```
//!
//! # Modules
//!
//! - `layout_tree`: Leaf/Split tree model and validation
//! - `surface`: Live-surface adapter trait
//! - `codec`: Capture and restore
//! - `store`: Name-keyed snapshot store and its persisted form
//! - `navigator`: Circular next/prev over stored names
//! - `manager`: Public operations and the current-layout pointer
//! - `sim`: In-memory host simulator
//! - `config`: Configuration management
//! - `logging`: Structured logging setup
//! - `error`: Error types and remediation hints

pub mod codec;
pub mod config;
pub mod error;
pub mod layout_tree;
pub mod logging;
pub mod manager;
pub mod navigator;
pub mod sim;
pub mod store;
pub mod surface;

pub use codec::{RestoreConfig, RestoreReport, capture, restore};
pub use error::{Error, LayoutError, Result};
pub use layout_tree::{Bounds, Leaf, LayoutSnapshot, Node, Orientation, Split};
pub use manager::{CurrentPointer, LayoutManager, Navigation, Outcome};
pub use navigator::{Direction, circular_step};
pub use store::{NamedConfig, SnapshotStore};
pub use surface::{LiveSurface, PaneId};
