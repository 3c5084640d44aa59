//! Selection and budget behaviour of the controller.

use points_exchange::adapters::{RecordingSink, StaticCatalog};
use points_exchange::domain::model::{CatalogEntry, ToggleOutcome};
use points_exchange::{ControllerSettings, SelectionController};

fn catalog(budget: u64) -> StaticCatalog {
    StaticCatalog::new(vec![
        CatalogEntry::new("A", 3000, Some("Coffee Mug")),
        CatalogEntry::new("B", 5000, Some("Bluetooth Speaker")),
        CatalogEntry::new("C", 2000, Some("Tote Bag")),
        CatalogEntry::new("D", 800, None),
        CatalogEntry::new("E", 0, Some("Sticker")),
    ])
    .with_available_points(budget)
}

fn controller(budget: u64) -> SelectionController<RecordingSink> {
    SelectionController::init(
        &catalog(budget),
        RecordingSink::new(),
        ControllerSettings::default(),
    )
    .unwrap()
}

#[test]
fn test_budget_walkthrough() {
    let mut ctrl = controller(7000);

    assert_eq!(ctrl.toggle_selection("A"), ToggleOutcome::Selected);
    assert_eq!(ctrl.remaining_points(), 4000);

    assert_eq!(
        ctrl.toggle_selection("B"),
        ToggleOutcome::Rejected { shortfall: 1000 }
    );
    assert_eq!(ctrl.remaining_points(), 4000);
    assert!(!ctrl.is_selected("B"));

    assert_eq!(ctrl.toggle_selection("A"), ToggleOutcome::Deselected);
    assert_eq!(ctrl.remaining_points(), 7000);

    assert_eq!(ctrl.toggle_selection("B"), ToggleOutcome::Selected);
    assert_eq!(ctrl.remaining_points(), 2000);
    assert_eq!(ctrl.selected_ids(), vec!["B"]);
}

#[test]
fn test_toggle_pair_restores_selection() {
    let mut ctrl = controller(7000);
    ctrl.toggle_selection("A");
    let before = ctrl.selected_ids();

    ctrl.toggle_selection("C");
    ctrl.toggle_selection("C");
    assert_eq!(ctrl.selected_ids(), before);

    ctrl.toggle_selection("A");
    ctrl.toggle_selection("A");
    assert_eq!(ctrl.selected_ids(), before);
}

#[test]
fn test_invariants_hold_for_toggle_sequences() {
    let ids = ["A", "B", "C", "D", "E", "missing"];

    for seed in 1..=20u64 {
        let mut ctrl = controller(7000);
        let mut state = seed;

        for _ in 0..200 {
            // 線性同餘產生器，確保測試可重現
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            let id = ids[(state >> 33) as usize % ids.len()];

            let before = ctrl.selected_ids();
            let outcome = ctrl.toggle_selection(id);

            assert!(ctrl.total_selected_points() <= ctrl.available_points());
            assert_eq!(
                ctrl.remaining_points() + ctrl.total_selected_points(),
                ctrl.available_points()
            );
            assert_eq!(ctrl.available_points(), 7000);
            if matches!(
                outcome,
                ToggleOutcome::Rejected { .. } | ToggleOutcome::UnknownProduct
            ) {
                assert_eq!(ctrl.selected_ids(), before);
            }

            let mut marked = ctrl.sink().marked_selected();
            let mut selected = ctrl.selected_ids();
            marked.sort();
            selected.sort();
            assert_eq!(marked, selected, "display markers follow the selection");
        }
    }
}

#[test]
fn test_confirm_control_reflects_selection() {
    let mut ctrl = controller(7000);

    let control = ctrl.sink().last_confirm().unwrap();
    assert!(!control.enabled);
    assert_eq!(control.label, "Select products to exchange");

    ctrl.toggle_selection("A");
    let control = ctrl.sink().last_confirm().unwrap();
    assert!(control.enabled);
    assert_eq!(control.label, "Exchange 1 items (3,000 points)");

    ctrl.toggle_selection("C");
    let control = ctrl.sink().last_confirm().unwrap();
    assert!(control.enabled);
    assert_eq!(control.label, "Exchange 2 items (5,000 points)");

    ctrl.toggle_selection("A");
    ctrl.toggle_selection("C");
    let control = ctrl.sink().last_confirm().unwrap();
    assert!(!control.enabled);
    assert!(!control.processing);
}

#[test]
fn test_low_points_flag() {
    let mut ctrl = controller(7000);
    assert_eq!(
        ctrl.sink().last_remaining(),
        Some(("7,000".to_string(), false))
    );

    ctrl.toggle_selection("B");
    assert_eq!(
        ctrl.sink().last_remaining(),
        Some(("2,000".to_string(), false))
    );

    ctrl.toggle_selection("D");
    assert_eq!(
        ctrl.sink().last_remaining(),
        Some(("1,200".to_string(), false))
    );

    // 1000 itself is not low
    let mut edge = controller(4000);
    edge.toggle_selection("A");
    assert_eq!(
        edge.sink().last_remaining(),
        Some(("1,000".to_string(), false))
    );

    let mut tight = controller(3900);
    tight.toggle_selection("A");
    assert_eq!(
        tight.sink().last_remaining(),
        Some(("900".to_string(), true))
    );
}

#[test]
fn test_zero_cost_item_fits_an_exhausted_budget() {
    let mut ctrl = controller(3000);
    assert_eq!(ctrl.toggle_selection("A"), ToggleOutcome::Selected);
    assert_eq!(ctrl.remaining_points(), 0);
    assert_eq!(ctrl.toggle_selection("E"), ToggleOutcome::Selected);
    assert_eq!(
        ctrl.toggle_selection("D"),
        ToggleOutcome::Rejected { shortfall: 800 }
    );
}

#[test]
fn test_budget_falls_back_to_settings() {
    let source = StaticCatalog::new(vec![CatalogEntry::new("A", 3000, None)]);
    let ctrl = SelectionController::init(
        &source,
        RecordingSink::new(),
        ControllerSettings::default().with_budget(2500),
    )
    .unwrap();

    assert_eq!(ctrl.available_points(), 2500);
}
