//! Layout manager: the public operations over a live surface, the snapshot
//! store and the session-scoped current pointer.
//!
//! Every operation returns an [`Outcome`]. Its `result` carries the primary
//! success or [`LayoutError`]; a failed rewrite of the store file is reported
//! separately in `persist_error` and never rolls back the in-memory change.

use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::codec::{self, RestoreConfig, RestoreReport};
use crate::error::LayoutError;
use crate::navigator::{Direction, circular_step};
use crate::store::{NamedConfig, SnapshotStore};
use crate::surface::LiveSurface;

/// Result of a manager operation plus any persistence failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome<T> {
    pub result: Result<T, LayoutError>,
    pub persist_error: Option<LayoutError>,
}

impl<T> Outcome<T> {
    fn ok(value: T) -> Self {
        Self {
            result: Ok(value),
            persist_error: None,
        }
    }

    fn err(error: LayoutError) -> Self {
        Self {
            result: Err(error),
            persist_error: None,
        }
    }

    fn with_persist(mut self, persist_error: Option<LayoutError>) -> Self {
        self.persist_error = persist_error;
        self
    }

    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// The layout last added or restored in this session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CurrentPointer {
    #[default]
    Unset,
    Bound(String),
}

impl CurrentPointer {
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Unset => None,
            Self::Bound(name) => Some(name),
        }
    }
}

/// Where navigation landed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Navigation {
    pub name: String,
    pub report: RestoreReport,
}

/// Owns the surface being managed and the snapshot store.
pub struct LayoutManager<S: LiveSurface> {
    surface: S,
    store: SnapshotStore,
    current: CurrentPointer,
    restore_config: RestoreConfig,
}

impl<S: LiveSurface> LayoutManager<S> {
    /// Manage `surface` with an already-populated `store`.
    pub fn new(surface: S, store: SnapshotStore, restore_config: RestoreConfig) -> Self {
        Self {
            surface,
            store,
            current: CurrentPointer::Unset,
            restore_config,
        }
    }

    /// Manage `surface` with the store persisted at `store_path`, loading it.
    pub fn open(surface: S, store_path: impl Into<PathBuf>, restore_config: RestoreConfig) -> Self {
        let mut store = SnapshotStore::new(store_path);
        store.load();
        Self::new(surface, store, restore_config)
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    pub fn current(&self) -> &CurrentPointer {
        &self.current
    }

    /// Capture the surface and store it under `name`, replacing any previous
    /// entry. Binds the current pointer to `name`.
    pub fn add(&mut self, name: &str) -> Outcome<()> {
        let snapshot = codec::capture(&self.surface);
        let leaves = snapshot.leaf_count();
        self.store.put(name, snapshot);
        self.current = CurrentPointer::Bound(name.to_string());
        info!(layout = name, leaves, "layout added");
        Outcome::ok(()).with_persist(self.persist())
    }

    /// Rebuild the layout stored under `name` on the surface.
    pub fn restore(&mut self, name: &str) -> Outcome<RestoreReport> {
        match self.restore_named(name) {
            Ok(report) => Outcome::ok(report),
            Err(e) => Outcome::err(e),
        }
    }

    pub fn delete(&mut self, name: &str) -> Outcome<()> {
        if !self.store.delete(name) {
            return Outcome::err(LayoutError::NotFound(name.to_string()));
        }
        info!(layout = name, "layout deleted");
        Outcome::ok(()).with_persist(self.persist())
    }

    /// Re-capture the surface into the current layout. Returns its name.
    pub fn update_current(&mut self) -> Outcome<String> {
        let name = match &self.current {
            CurrentPointer::Unset => return Outcome::err(LayoutError::NothingCurrent),
            CurrentPointer::Bound(name) => name.clone(),
        };
        if self.store.find(&name).is_none() {
            warn!(layout = %name, "current layout no longer stored");
            return Outcome::err(LayoutError::NothingCurrent);
        }
        let snapshot = codec::capture(&self.surface);
        self.store.put(name.clone(), snapshot);
        info!(layout = %name, "layout updated");
        Outcome::ok(name).with_persist(self.persist())
    }

    pub fn next(&mut self) -> Outcome<Navigation> {
        self.navigate(Direction::Next)
    }

    pub fn prev(&mut self) -> Outcome<Navigation> {
        self.navigate(Direction::Prev)
    }

    /// Restore the layout after (or before) the current one, wrapping.
    pub fn navigate(&mut self, direction: Direction) -> Outcome<Navigation> {
        if let CurrentPointer::Bound(name) = &self.current {
            if self.store.find(name).is_none() {
                warn!(layout = %name, "current layout no longer stored");
                return Outcome::err(LayoutError::NothingCurrent);
            }
        }
        let names = self.store.names();
        let Some(target) = circular_step(self.current.name(), &names, direction) else {
            return Outcome::err(LayoutError::NothingCurrent);
        };
        debug!(%direction, from = ?self.current.name(), layout = %target, "navigating");
        match self.restore_named(&target) {
            Ok(report) => Outcome::ok(Navigation {
                name: target,
                report,
            }),
            Err(e) => Outcome::err(e),
        }
    }

    /// Stored names, most recent first.
    #[must_use]
    pub fn list_names(&self) -> Vec<String> {
        self.store.names()
    }

    pub fn show(&self, name: &str) -> Result<&NamedConfig, LayoutError> {
        self.store
            .find(name)
            .ok_or_else(|| LayoutError::NotFound(name.to_string()))
    }

    fn restore_named(&mut self, name: &str) -> Result<RestoreReport, LayoutError> {
        let entry = self
            .store
            .find(name)
            .ok_or_else(|| LayoutError::NotFound(name.to_string()))?;
        let report = codec::restore(&entry.snapshot, &mut self.surface, &self.restore_config);
        self.current = CurrentPointer::Bound(name.to_string());
        info!(
            layout = name,
            panes = report.panes_created,
            complete = report.is_complete(),
            "layout restored"
        );
        Ok(report)
    }

    fn persist(&self) -> Option<LayoutError> {
        let err = self.store.save().err()?;
        let path = self.store.path().map(PathBuf::from).unwrap_or_default();
        warn!(path = %path.display(), error = %err, "failed to persist layout store");
        Some(err.into_layout_error(&path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout_tree::Orientation;
    use crate::sim::SimSurface;
    use crate::surface::PaneId;

    fn manager() -> LayoutManager<SimSurface> {
        LayoutManager::new(
            SimSurface::new(120, 40),
            SnapshotStore::in_memory(),
            RestoreConfig::default(),
        )
    }

    fn split_columns(m: &mut LayoutManager<SimSurface>, left: u32) {
        let sim = m.surface_mut();
        let survivor = sim.collapse_to_single_pane();
        sim.split(survivor, Orientation::Horizontal, left).unwrap();
    }

    #[test]
    fn add_binds_current_and_stores() {
        let mut m = manager();
        assert!(m.add("work").is_ok());
        assert_eq!(m.list_names(), vec!["work"]);
        assert_eq!(m.current(), &CurrentPointer::Bound("work".into()));
    }

    #[test]
    fn restore_missing_leaves_everything_alone() {
        let mut m = manager();
        split_columns(&mut m, 40);
        m.add("a");
        let before = m.surface().clone();

        let out = m.restore("missing");
        assert_eq!(out.result, Err(LayoutError::NotFound("missing".into())));
        assert_eq!(m.surface(), &before);
        assert_eq!(m.list_names(), vec!["a"]);
        assert_eq!(m.current().name(), Some("a"));
    }

    #[test]
    fn update_without_current_is_nothing_current() {
        let mut m = manager();
        let out = m.update_current();
        assert_eq!(out.result, Err(LayoutError::NothingCurrent));
        assert!(m.list_names().is_empty());
    }

    #[test]
    fn update_rewrites_current_and_moves_it_front() {
        let mut m = manager();
        m.add("a");
        m.add("b");
        m.restore("a");
        split_columns(&mut m, 30);

        let out = m.update_current();
        assert_eq!(out.result.as_deref(), Ok("a"));
        assert_eq!(m.list_names(), vec!["a", "b"]);
        assert_eq!(m.show("a").unwrap().snapshot.leaf_count(), 2);
    }

    #[test]
    fn deleted_current_dangles() {
        let mut m = manager();
        m.add("a");
        m.add("b");
        assert!(m.delete("b").is_ok());
        assert_eq!(m.current().name(), Some("b"));
        assert_eq!(m.update_current().result, Err(LayoutError::NothingCurrent));
        assert_eq!(m.next().result, Err(LayoutError::NothingCurrent));
        assert_eq!(m.prev().result, Err(LayoutError::NothingCurrent));
        assert_eq!(m.list_names(), vec!["a"]);
        assert_eq!(m.show("a").unwrap().snapshot.leaf_count(), 1);
    }

    #[test]
    fn delete_missing_is_not_found() {
        let mut m = manager();
        assert_eq!(
            m.delete("ghost").result,
            Err(LayoutError::NotFound("ghost".into()))
        );
    }

    #[test]
    fn navigation_cycles_and_restores() {
        let mut m = manager();
        m.add("c");
        split_columns(&mut m, 40);
        m.add("b");
        split_columns(&mut m, 60);
        m.add("a");
        // names: a, b, c ; current a
        let nav = m.next().result.unwrap();
        assert_eq!(nav.name, "b");
        assert_eq!(m.surface().pane_size(PaneId(1)).0, 40);
        assert_eq!(m.next().result.unwrap().name, "c");
        assert_eq!(m.surface().stable_pane_order().len(), 1);
        assert_eq!(m.next().result.unwrap().name, "a");
        assert_eq!(m.prev().result.unwrap().name, "c");
        assert_eq!(m.current().name(), Some("c"));
        assert_eq!(m.list_names(), vec!["a", "b", "c"]);
    }

    #[test]
    fn navigation_from_unset_starts_at_ends() {
        let mut m = LayoutManager::new(
            SimSurface::new(80, 24),
            SnapshotStore::in_memory(),
            RestoreConfig::default(),
        );
        m.add("x");
        m.add("y");
        m.current = CurrentPointer::Unset;
        assert_eq!(m.next().result.unwrap().name, "y");
        m.current = CurrentPointer::Unset;
        assert_eq!(m.prev().result.unwrap().name, "x");
    }

    #[test]
    fn navigation_on_empty_store_is_nothing_current() {
        let mut m = manager();
        assert_eq!(m.next().result, Err(LayoutError::NothingCurrent));
        assert_eq!(m.prev().result, Err(LayoutError::NothingCurrent));
    }

    #[test]
    fn persist_failure_is_reported_without_rollback() {
        let tmp = tempfile::TempDir::new().unwrap();
        let blocker = tmp.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();

        let mut m = LayoutManager::open(
            SimSurface::default(),
            blocker.join("layouts.json"),
            RestoreConfig::default(),
        );
        let out = m.add("work");
        assert!(out.is_ok());
        assert!(matches!(
            out.persist_error,
            Some(LayoutError::PersistenceUnavailable { .. })
        ));
        assert_eq!(m.list_names(), vec!["work"]);
    }

    #[test]
    fn update_and_delete_report_persist_failure_without_rollback() {
        let tmp = tempfile::TempDir::new().unwrap();
        let blocker = tmp.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();

        let mut m = LayoutManager::open(
            SimSurface::new(120, 40),
            blocker.join("layouts.json"),
            RestoreConfig::default(),
        );
        m.add("a");
        m.add("b");
        m.restore("a");
        split_columns(&mut m, 50);

        let out = m.update_current();
        assert_eq!(out.result.as_deref(), Ok("a"));
        assert!(matches!(
            out.persist_error,
            Some(LayoutError::PersistenceUnavailable { .. })
        ));
        assert_eq!(m.show("a").unwrap().snapshot.leaf_count(), 2);
        assert_eq!(m.list_names(), vec!["a", "b"]);

        let out = m.delete("b");
        assert!(out.is_ok());
        assert!(matches!(
            out.persist_error,
            Some(LayoutError::PersistenceUnavailable { .. })
        ));
        assert_eq!(m.list_names(), vec!["a"]);
    }

    #[test]
    fn open_loads_persisted_store() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("layouts.json");
        {
            let mut m = LayoutManager::open(SimSurface::default(), &path, RestoreConfig::default());
            assert!(m.add("one").persist_error.is_none());
        }
        let m = LayoutManager::open(SimSurface::default(), &path, RestoreConfig::default());
        assert_eq!(m.list_names(), vec!["one"]);
        assert_eq!(m.current(), &CurrentPointer::Unset);
    }

    #[test]
    fn show_returns_stored_snapshot() {
        let mut m = manager();
        m.add("a");
        assert_eq!(m.show("a").unwrap().name, "a");
        assert_eq!(m.show("b").unwrap_err(), LayoutError::NotFound("b".into()));
    }
}
