use tbviz::selection::{ALL, CheckboxSelection, DropdownSelection, SelectionState};

const NAMES: [&str; 3] = ["Chile", "Peru", "Spain"];

#[test]
fn nothing_checked_selects_everything() {
    let cb = CheckboxSelection::new();
    assert_eq!(cb.state(), SelectionState::AllEntities);
    assert_eq!(cb.state().resolve(&NAMES), NAMES);
}

#[test]
fn all_box_overrides_other_boxes() {
    let mut cb = CheckboxSelection::new();
    cb.set("Peru", true);
    assert_eq!(cb.state().resolve(&NAMES), ["Peru"]);
    cb.set(ALL, true);
    assert_eq!(cb.state(), SelectionState::AllEntities);
    assert_eq!(cb.checked_values(), ["Peru", ALL]);
    cb.set(ALL, false);
    assert_eq!(cb.state().resolve(&NAMES), ["Peru"]);
}

#[test]
fn subset_resolves_in_dataset_order_and_ignores_unknown_names() {
    let mut cb = CheckboxSelection::new();
    for v in ["Spain", "Atlantis", "Chile"] {
        cb.toggle(v);
    }
    assert_eq!(cb.state().resolve(&NAMES), ["Chile", "Spain"]);
    // unchecking every box falls back to everything
    cb.clear();
    assert_eq!(cb.state().resolve(&NAMES).len(), 3);
}

#[test]
fn dropdown_rejects_values_outside_its_options() {
    let mut dd = DropdownSelection::new(NAMES.iter().map(|s| s.to_string()).collect()).unwrap();
    assert_eq!(dd.selected(), "Chile");
    assert!(dd.choose("Peru").unwrap());
    assert!(!dd.choose("Peru").unwrap());
    assert!(dd.choose("Atlantis").is_err());
    assert_eq!(dd.selected(), "Peru");
    assert!(dd.state().includes("Peru"));
    assert!(!dd.state().includes("Chile"));
    assert!(DropdownSelection::new(Vec::new()).is_err());
}
