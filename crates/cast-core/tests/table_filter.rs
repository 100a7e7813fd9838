use cast_core::errors::codes;
use cast_core::{Predicate, TagTable, TagValue};
use proptest::prelude::*;

fn sample_table() -> TagTable {
    let columns = vec!["wsp".to_string(), "seed".to_string(), "controller".to_string()];
    let mut rows = Vec::new();
    for wsp in [8, 10, 12] {
        for seed in [1, 2] {
            for controller in ["ipc", "noIPC"] {
                rows.push(vec![
                    TagValue::from(wsp),
                    TagValue::from(seed),
                    TagValue::from(controller),
                ]);
            }
        }
    }
    TagTable::from_rows(columns, rows).expect("table")
}

#[test]
fn empty_predicate_is_all_true() {
    let table = sample_table();
    let mask = table.mask(&Predicate::new()).expect("mask");
    assert_eq!(mask.len(), table.len());
    assert!(mask.iter().all(|keep| *keep));
}

#[test]
fn scalar_and_set_clauses_combine_conjunctively() {
    let table = sample_table();
    let predicate = Predicate::new()
        .any_of("wsp", [10, 12])
        .eq("controller", "noIPC");
    let filtered = table.filter(&predicate).expect("filter");
    assert_eq!(filtered.len(), 4);
    for row in filtered.rows() {
        assert!(row[0] == TagValue::from(10) || row[0] == TagValue::from(12));
        assert_eq!(row[2], TagValue::from("noIPC"));
    }
    assert_eq!(filtered.columns(), table.columns());
}

#[test]
fn filter_preserves_row_order() {
    let table = sample_table();
    let filtered = table
        .filter(&Predicate::new().any_of("wsp", [12, 8]))
        .expect("filter");
    let wsp: Vec<_> = filtered.column_values(0).cloned().collect();
    assert_eq!(wsp[0], TagValue::from(8));
    assert_eq!(wsp[wsp.len() - 1], TagValue::from(12));
}

#[test]
fn integers_match_equal_floats() {
    let table = sample_table();
    let mask = table.mask(&Predicate::new().eq("wsp", 8.0)).expect("mask");
    assert_eq!(mask.iter().filter(|keep| **keep).count(), 4);
}

#[test]
fn unknown_column_is_loud() {
    let table = sample_table();
    let err = table.mask(&Predicate::new().eq("wps", 8)).unwrap_err();
    assert_eq!(err.code(), codes::COLUMN_NOT_FOUND);
    let empty = TagTable::new(vec!["wsp".to_string()]);
    assert!(empty.mask(&Predicate::new().eq("seed", 1)).is_err());
}

#[test]
fn command_line_clauses_parse() {
    let predicate = Predicate::new()
        .parse_clause("wsp=8,12")
        .and_then(|p| p.parse_clause("controller=ipc"))
        .expect("parse");
    let table = sample_table();
    assert_eq!(table.filter(&predicate).expect("filter").len(), 4);
    assert!(Predicate::new().parse_clause("wsp").is_err());
}

#[test]
fn parsed_tokens_are_trimmed() {
    assert_eq!(TagValue::parse(" 8 "), TagValue::Int(8));
    assert_eq!(TagValue::parse(" True"), TagValue::Bool(true));
    assert_eq!(TagValue::parse("  ipc \t"), TagValue::Text("ipc".to_string()));
}

#[test]
fn push_row_checks_width() {
    let mut table = TagTable::new(vec!["wsp".to_string()]);
    let err = table
        .push_row(vec![TagValue::from(1), TagValue::from(2)])
        .unwrap_err();
    assert_eq!(err.code(), codes::ROW_WIDTH);
}

proptest! {
    #[test]
    fn filter_is_idempotent(values in prop::collection::vec(0i64..4, 0..40), pick in prop::collection::vec(0i64..4, 1..3)) {
        let rows = values.iter().map(|v| vec![TagValue::from(*v)]).collect();
        let table = TagTable::from_rows(vec!["x".to_string()], rows).unwrap();
        let predicate = Predicate::new().any_of("x", pick.clone());
        let once = table.filter(&predicate).unwrap();
        let twice = once.filter(&predicate).unwrap();
        prop_assert_eq!(&once, &twice);
        prop_assert_eq!(table.mask(&predicate).unwrap(), table.mask(&predicate).unwrap());
        let expected = values.iter().filter(|v| pick.contains(v)).count();
        prop_assert_eq!(once.len(), expected);
    }
}
