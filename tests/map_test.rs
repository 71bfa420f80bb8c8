mod common;

use common::six_issues;

use civicsync::controller::BrowseController;
use civicsync::map::{Camera, FALLBACK_POSITION, MapView, Viewport};
use civicsync::query::Choice;
use civicsync::types::{IssueCategory, IssueStatus};

fn controller() -> BrowseController {
    let mut controller = BrowseController::default();
    controller.replace_issues(six_issues());
    controller
}

#[test]
fn test_default_map_hides_resolved() {
    let controller = controller();
    let ids: Vec<String> = controller
        .map_markers()
        .into_iter()
        .map(|m| m.issue_id)
        .collect();
    assert_eq!(ids, ["1", "2", "3", "5", "6"]);
}

#[test]
fn test_reframe_keeps_every_placed_marker_in_view() {
    let mut controller = controller();
    controller.map_toggle_status(IssueStatus::Resolved, true);
    assert!(controller.map_reframe());

    let map = controller.map();
    let visible = map.camera().visible_bounds(map.viewport());
    let markers = controller.map_markers();
    assert_eq!(markers.len(), 6);
    for marker in markers.iter().filter(|m| m.placed) {
        assert!(
            visible.contains(marker.position),
            "{} at {:?} outside {:?}",
            marker.issue_id,
            marker.position,
            visible
        );
    }
}

#[test]
fn test_reframe_with_one_placed_marker_leaves_camera() {
    let mut controller = controller();
    controller.set_category(Choice::Only(IssueCategory::Water));
    let before = controller.map().camera();

    assert!(!controller.map_reframe());
    assert_eq!(controller.map().camera(), before);
    assert_eq!(before, Camera::default());
}

#[test]
fn test_unplaced_issue_sits_at_fallback() {
    let controller = controller();
    let bins = controller
        .map_markers()
        .into_iter()
        .find(|m| m.issue_id == "3")
        .unwrap();
    assert!(!bins.placed);
    assert_eq!(bins.position, FALLBACK_POSITION);
}

#[test]
fn test_select_flies_and_clicking_empty_map_clears() {
    let mut controller = controller();
    assert!(controller.map_select("6"));
    let camera = controller.map().camera();
    assert!((camera.center.lat - 40.7484).abs() < 1e-9);
    assert!(camera.zoom > Camera::default().zoom);

    let selected: Vec<String> = controller
        .map_markers()
        .into_iter()
        .filter(|m| m.selected)
        .map(|m| m.issue_id)
        .collect();
    assert_eq!(selected, ["6"]);

    controller.map_clear_selection();
    assert!(controller.map().selected().is_none());
    assert!(!controller.map_select("no-such-issue"));
}

#[test]
fn test_list_category_collapses_and_restores_map() {
    let mut controller = controller();
    controller.set_category(Choice::Only(IssueCategory::Road));
    assert_eq!(
        controller.map().filters().single_category(),
        Some(IssueCategory::Road)
    );

    controller.set_category(Choice::All);
    assert_eq!(
        controller.map().filters().categories.len(),
        IssueCategory::ALL.len()
    );
}

#[test]
fn test_list_category_edge_fires_once() {
    let mut controller = controller();
    controller.set_category(Choice::Only(IssueCategory::Road));
    controller.map_toggle_category(IssueCategory::Water, true);
    assert_eq!(controller.criteria().category, Choice::All);

    // Same list value again: no change, so the map keeps its own set.
    controller.set_category(Choice::All);
    assert_eq!(controller.map().filters().categories.len(), 2);
}

#[test]
fn test_map_single_category_flows_back_to_list() {
    let mut controller = controller();
    for category in IssueCategory::ALL {
        if category != IssueCategory::Sanitation {
            controller.map_toggle_category(category, false);
        }
    }
    assert_eq!(
        controller.criteria().category,
        Choice::Only(IssueCategory::Sanitation)
    );
    assert_eq!(controller.filtered().len(), 1);

    controller.map_toggle_category(IssueCategory::Road, true);
    assert_eq!(controller.criteria().category, Choice::All);
}

#[test]
fn test_map_search_matches_titles_only() {
    let mut controller = controller();
    controller.map_set_search("  street ");
    let ids: Vec<String> = controller
        .map_markers()
        .into_iter()
        .map(|m| m.issue_id)
        .collect();
    // "Street light out" is resolved, so only the pothole remains.
    assert_eq!(ids, ["1"]);

    controller.map_set_search("harbor");
    assert!(controller.map_markers().is_empty());
}

#[test]
fn test_reset_restores_defaults_and_newest_sort() {
    let mut controller = controller();
    controller.set_sort(civicsync::query::SortKey::Votes);
    controller.set_category(Choice::Only(IssueCategory::Road));
    controller.set_status(Choice::Only(IssueStatus::Pending));
    controller.map_set_search("pothole");

    controller.reset_filters();
    assert_eq!(controller.criteria().category, Choice::All);
    assert_eq!(controller.criteria().status, Choice::All);
    assert_eq!(controller.criteria().sort, civicsync::query::SortKey::Newest);
    assert_eq!(controller.map().filters(), MapView::default().filters());
}

#[test]
fn test_custom_viewport_fits_tighter() {
    let issues = six_issues();
    let mut wide = MapView::new(
        Viewport {
            width: 1600.0,
            height: 1000.0,
        },
        FALLBACK_POSITION,
    );
    let mut narrow = MapView::new(
        Viewport {
            width: 200.0,
            height: 150.0,
        },
        FALLBACK_POSITION,
    );
    assert!(wide.reframe(&issues));
    assert!(narrow.reframe(&issues));
    assert!(wide.camera().zoom > narrow.camera().zoom);
}
