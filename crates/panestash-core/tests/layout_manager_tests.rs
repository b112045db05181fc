//! End-to-end scenarios for `LayoutManager` over the host simulator with a
//! real store file.

use panestash_core::codec::{RestoreConfig, capture};
use panestash_core::error::LayoutError;
use panestash_core::layout_tree::{Node, Orientation};
use panestash_core::manager::{CurrentPointer, LayoutManager};
use panestash_core::sim::SimSurface;
use panestash_core::surface::{ContentTarget, LiveSurface};
use tempfile::TempDir;

fn open(tmp: &TempDir, surface: SimSurface) -> LayoutManager<SimSurface> {
    LayoutManager::open(
        surface,
        tmp.path().join("layouts.json"),
        RestoreConfig::default(),
    )
}

/// 120x40 surface split into a 40-column and an 80-column pane, focus right.
fn two_pane_surface() -> SimSurface {
    let mut sim = SimSurface::new(120, 40);
    let left = sim.focused_pane();
    let right = sim.split(left, Orientation::Horizontal, 40).unwrap();
    sim.set_pane_content(left, ContentTarget::File("/src/lib.rs"))
        .unwrap();
    sim.set_pane_content(right, ContentTarget::File("/src/main.rs"))
        .unwrap();
    sim.set_focus(right).unwrap();
    sim
}

// =========================================================================
// Scenarios
// =========================================================================

#[test]
fn add_then_restore_reproduces_two_pane_layout() {
    let tmp = TempDir::new().unwrap();
    let mut m = open(&tmp, two_pane_surface());
    assert!(m.list_names().is_empty());

    let out = m.add("work");
    assert!(out.is_ok());
    assert!(out.persist_error.is_none());
    assert_eq!(m.list_names(), vec!["work"]);

    // Wreck the layout, then restore it.
    let sim = m.surface_mut();
    let only = sim.collapse_to_single_pane();
    sim.set_pane_content(only, ContentTarget::Buffer("*scratch*"))
        .unwrap();

    let report = m.restore("work").result.unwrap();
    assert_eq!(report.panes_created, 2);
    assert!(report.is_complete());

    let sim = m.surface();
    let order = sim.stable_pane_order();
    assert_eq!(order.len(), 2);
    assert_eq!(sim.pane_size(order[0]), (40, 40));
    assert_eq!(sim.pane_size(order[1]), (80, 40));
    assert_eq!(sim.focused_pane(), order[1]);
    assert_eq!(
        sim.pane_content(order[0]).path.as_deref(),
        Some("/src/lib.rs")
    );
}

#[test]
fn restore_missing_changes_nothing() {
    let tmp = TempDir::new().unwrap();
    let mut m = open(&tmp, two_pane_surface());
    m.add("work");
    let store_before = std::fs::read_to_string(tmp.path().join("layouts.json")).unwrap();
    let surface_before = m.surface().clone();

    let out = m.restore("missing");
    assert_eq!(out.result, Err(LayoutError::NotFound("missing".into())));
    assert_eq!(m.surface(), &surface_before);
    assert_eq!(
        std::fs::read_to_string(tmp.path().join("layouts.json")).unwrap(),
        store_before
    );
}

#[test]
fn update_with_unset_pointer_does_not_touch_store() {
    let tmp = TempDir::new().unwrap();
    {
        let mut m = open(&tmp, SimSurface::default());
        m.add("base");
    }
    let mut m = open(&tmp, two_pane_surface());
    assert_eq!(m.current(), &CurrentPointer::Unset);

    let out = m.update_current();
    assert_eq!(out.result, Err(LayoutError::NothingCurrent));
    assert!(out.persist_error.is_none());
    assert_eq!(m.show("base").unwrap().snapshot.leaf_count(), 1);
}

#[test]
fn store_survives_restart_in_recency_order() {
    let tmp = TempDir::new().unwrap();
    {
        let mut m = open(&tmp, SimSurface::default());
        m.add("one");
        m.add("two");
        m.add("three");
        m.add("one");
        assert!(m.delete("two").is_ok());
    }
    let m = open(&tmp, SimSurface::default());
    assert_eq!(m.list_names(), vec!["one", "three"]);
}

#[test]
fn cycling_restores_each_layout_in_turn() {
    let tmp = TempDir::new().unwrap();
    let mut m = open(&tmp, SimSurface::new(120, 40));
    m.add("single");

    let sim = m.surface_mut();
    let p = sim.focused_pane();
    sim.split(p, Orientation::Vertical, 10).unwrap();
    m.add("stacked");

    let sim = m.surface_mut();
    let p = sim.collapse_to_single_pane();
    let q = sim.split(p, Orientation::Horizontal, 30).unwrap();
    sim.split(q, Orientation::Horizontal, 30).unwrap();
    m.add("columns");

    // names: columns, stacked, single ; current columns
    let expected = [("stacked", 2), ("single", 1), ("columns", 3), ("stacked", 2)];
    for (name, panes) in expected {
        let nav = m.next().result.unwrap();
        assert_eq!(nav.name, name);
        assert_eq!(m.surface().stable_pane_order().len(), panes);
    }
    let nav = m.prev().result.unwrap();
    assert_eq!(nav.name, "columns");
    let Node::Split(split) = &capture(m.surface()).root else {
        panic!("expected split root");
    };
    assert_eq!(split.children.len(), 3);
    assert_eq!(split.orientation, Orientation::Horizontal);
}

#[test]
fn restored_layout_can_be_updated_and_reloaded() {
    let tmp = TempDir::new().unwrap();
    {
        let mut m = open(&tmp, SimSurface::new(100, 30));
        m.add("dev");
        m.restore("dev");
        let sim = m.surface_mut();
        let p = sim.focused_pane();
        sim.split(p, Orientation::Horizontal, 25).unwrap();
        assert_eq!(m.update_current().result.as_deref(), Ok("dev"));
    }
    let mut m = open(&tmp, SimSurface::default());
    m.restore("dev");
    assert_eq!(m.surface().stable_pane_order().len(), 2);
    assert_eq!(m.surface().frame_geometry().width, 100);
}

#[test]
fn corrupt_store_file_starts_empty_and_is_overwritten() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("layouts.json");
    std::fs::write(&path, "this is not json").unwrap();

    let mut m = open(&tmp, SimSurface::default());
    assert!(m.list_names().is_empty());
    assert!(m.add("fresh").persist_error.is_none());

    let content = std::fs::read_to_string(&path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(value["layouts"][0]["name"], "fresh");
}

#[test]
fn deleting_the_current_layout_leaves_nothing_current() {
    let tmp = TempDir::new().unwrap();
    let mut m = open(&tmp, two_pane_surface());
    m.add("keep");
    m.add("gone");
    assert!(m.delete("gone").is_ok());
    let before = m.surface().clone();

    assert_eq!(m.update_current().result, Err(LayoutError::NothingCurrent));
    assert_eq!(m.next().result, Err(LayoutError::NothingCurrent));
    assert_eq!(m.prev().result, Err(LayoutError::NothingCurrent));
    assert_eq!(m.surface(), &before);
    assert_eq!(m.list_names(), vec!["keep"]);

    // Restoring by name rebinds the pointer and navigation works again.
    assert!(m.restore("keep").is_ok());
    assert_eq!(m.next().result.unwrap().name, "keep");
}
