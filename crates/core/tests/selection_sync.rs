//! Integration test: two chromosome views sharing one selection registry,
//! loaded from a saved DAS response.

use std::cell::RefCell;
use std::rc::Rc;

use chromovis_core::selection::SelectorSnapshot;
use chromovis_core::source::DasFileSource;
use chromovis_core::svg::render_svg;
use chromovis_core::{ChromosomeView, Mode, SelectionRegistry, SelectorEvent, ViewConfig, ViewState, Width};

fn source() -> DasFileSource {
    DasFileSource::new(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures"))
}

fn view(id: &str, mode: Mode, registry: &SelectionRegistry) -> ChromosomeView {
    let config = ViewConfig::new("21", id)
        .with_width(Width::Pixels(930.0))
        .with_rel_size(false)
        .with_mode(mode);
    let mut view = ChromosomeView::new(config, registry.clone()).unwrap();
    view.load_from(&source()).unwrap();
    assert_eq!(view.state(), ViewState::Rendered);
    view
}

#[test]
fn fixture_lays_out_every_band() {
    let registry = SelectionRegistry::new();
    let view = view("chr21", Mode::Multi, &registry);
    let layout = view.layout();
    assert_eq!(layout.geometries.len(), 14);
    assert!(layout.rejected.is_empty());

    let last = layout.geometries.last().unwrap();
    assert_eq!(last.id, "q22.3");
    assert!((last.x + last.width - 900.0).abs() < 1e-9);
    assert!(layout.geometries.windows(2).all(|w| w[0].x <= w[1].x));
}

#[test]
fn registry_is_union_of_views() {
    let registry = SelectionRegistry::new();
    let mut left = view("left", Mode::Multi, &registry);
    let mut right = view("right", Mode::Multi, &registry);

    left.click(0);
    right.click(6);
    left.click(13);

    assert_eq!(registry.len(), 3);
    assert_eq!(left.selectors().len(), 2);
    assert_eq!(right.selectors().len(), 1);
    let spans: Vec<_> = registry
        .snapshots()
        .iter()
        .map(|s| (s.owner.to_string(), s.start_bp, s.end_bp))
        .collect();
    assert_eq!(
        spans,
        [
            ("left".to_string(), 1, 2_800_000),
            ("right".to_string(), 16_400_001, 24_000_000),
            ("left".to_string(), 41_600_001, 48_129_895),
        ]
    );
}

#[test]
fn clear_reaches_every_view() {
    let registry = SelectionRegistry::new();
    let mut left = view("left", Mode::Multi, &registry);
    let mut right = view("right", Mode::Multi, &registry);
    let watcher = registry.subscribe();

    let a = left.click(2).unwrap().created.unwrap();
    let b = right.click(3).unwrap().created.unwrap();
    registry.clear();

    left.process_events();
    right.process_events();
    assert!(registry.is_empty());
    assert!(left.selectors().is_empty());
    assert!(right.selectors().is_empty());
    assert!(!a.borrow().is_live());
    assert!(!b.borrow().is_live());

    let events: Vec<_> = watcher.try_iter().collect();
    let deleted = events
        .iter()
        .filter(|e| matches!(e, SelectorEvent::Deleted(_)))
        .count();
    assert_eq!(deleted, 1);
    assert!(matches!(events.last(), Some(SelectorEvent::Deleted(removed)) if removed.len() == 2));
}

#[test]
fn single_mode_is_per_view() {
    let registry = SelectionRegistry::new();
    let mut left = view("left", Mode::Single, &registry);
    let mut right = view("right", Mode::Single, &registry);

    assert!(left.click(0).unwrap().created.is_some());
    assert!(right.click(0).unwrap().created.is_some());
    assert!(left.click(5).unwrap().created.is_none());
    assert_eq!(registry.len(), 2);

    let only = left.selectors().remove(0);
    assert!(left.delete_selector(&only));
    assert!(left.click(5).unwrap().created.is_some());
    assert_eq!(registry.len(), 2);
}

#[test]
fn delete_removes_from_registry_and_view() {
    let registry = SelectionRegistry::new();
    let mut left = view("left", Mode::Multi, &registry);
    let sel = left.click(1).unwrap().created.unwrap();

    assert!(left.delete_selector(&sel));
    assert!(!sel.borrow().is_live());
    assert!(registry.is_empty());
    assert!(!left.delete_selector(&sel));
}

#[test]
fn drag_notifies_in_order_and_updates_registry() {
    let registry = SelectionRegistry::new();
    let mut left = view("left", Mode::Multi, &registry);
    let seen: Rc<RefCell<Vec<SelectorSnapshot>>> = Rc::default();
    let sink = seen.clone();
    let probe = registry.clone();
    left.set_refresh_hook(Rc::new(move |snap: &SelectorSnapshot| {
        // The registry already holds the new extent when the hook runs.
        let stored = probe.find(snap.id).map(|s| s.borrow().snapshot());
        assert_eq!(stored.as_ref(), Some(snap));
        sink.borrow_mut().push(snap.clone());
    }));

    let id = left.click(6).unwrap().created.unwrap().borrow().id();
    left.drag_selector(id, 0.0, 450.0).unwrap();
    left.drag_selector(id, 450.0, 900.0).unwrap();

    let seen = seen.borrow();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].start_bp, 1);
    assert_eq!(seen[1].end_bp, 48_129_895);
}

#[test]
fn teardown_releases_selectors() {
    let registry = SelectionRegistry::new();
    let mut left = view("left", Mode::Multi, &registry);
    let right = view("right", Mode::Multi, &registry);
    drop(right);

    left.click(0);
    left.teardown();
    assert!(registry.is_empty());
    assert!(left.render().is_empty());
}

#[test]
fn renders_standalone_svg() {
    let registry = SelectionRegistry::new();
    let mut left = view("chr21", Mode::Multi, &registry);
    left.click(6);
    left.hover(6);

    let svg = render_svg(&left.render(), left.canvas_width(), left.canvas_height());
    assert!(svg.contains(r#"<g id="chr21svg""#));
    assert!(svg.contains(r#"class="band stalk""#));
    assert!(svg.contains(r#"<g id="chr21-selector-1" class="selector">"#));
    assert!(svg.contains(r#"class="band-lbl""#));
    assert!(svg.contains(r#"height="80""#));
}
