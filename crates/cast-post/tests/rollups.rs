use cast_core::errors::codes;
use cast_core::{Predicate, TagValue};
use cast_post::{
    aggregate_columns, aggregate_rows, aggregate_rows_by, sort_columns, Cell, ColumnKey, ResultTable,
};
use proptest::prelude::*;

fn tag(value: impl Into<TagValue>) -> Cell {
    Cell::Tag(value.into())
}

fn seeds_table() -> ResultTable {
    ResultTable::from_rows(
        vec![
            ColumnKey::tag("wsp"),
            ColumnKey::tag("seed"),
            ColumnKey::computed("blade1_flap", "mean"),
            ColumnKey::computed("blade2_flap", "mean"),
            ColumnKey::computed("blade1_flap", "DEL"),
        ],
        vec![
            vec![tag(8), tag(1), Cell::Value(1.0), Cell::Value(3.0), Cell::Value(10.0)],
            vec![tag(10), tag(1), Cell::Value(5.0), Cell::Value(7.0), Cell::Missing],
            vec![tag(8), tag(2), Cell::Value(3.0), Cell::Value(5.0), Cell::Value(20.0)],
            vec![tag(10), tag(2), Cell::Missing, Cell::Value(9.0), Cell::Missing],
        ],
    )
    .expect("table")
}

#[test]
fn seeds_collapse_to_their_mean_in_first_seen_order() {
    let rolled = aggregate_rows(&seeds_table(), "seed").expect("rollup");
    assert_eq!(rolled.len(), 2);
    assert_eq!(rolled.columns()[0], ColumnKey::tag("wsp"));
    assert!(rolled.columns().iter().all(|column| column.name != "seed"));
    assert_eq!(rolled.rows()[0][0], tag(8));
    assert_eq!(rolled.rows()[0][1], Cell::Value(2.0));
    assert_eq!(rolled.rows()[0][3], Cell::Value(15.0));
    assert_eq!(rolled.rows()[1][0], tag(10));
    assert_eq!(rolled.rows()[1][1], Cell::Value(5.0), "missing cells are skipped");
    assert_eq!(rolled.rows()[1][3], Cell::Missing, "all-missing stays missing");
}

#[test]
fn rolled_tables_remain_queryable() {
    let rolled = aggregate_rows(&seeds_table(), "seed").expect("rollup");
    let mask = rolled.mask(&Predicate::new().eq("wsp", 10)).expect("mask");
    assert_eq!(mask, [false, true]);
    let err = rolled.mask(&Predicate::new().eq("seed", 1)).unwrap_err();
    assert_eq!(err.code(), codes::COLUMN_NOT_FOUND);
}

#[test]
fn unknown_nuisance_column_is_loud() {
    let err = aggregate_rows(&seeds_table(), "yaw").unwrap_err();
    assert_eq!(err.code(), codes::COLUMN_NOT_FOUND);
    let err = aggregate_rows(&seeds_table(), "blade1_flap").unwrap_err();
    assert_eq!(err.code(), codes::COLUMN_NOT_FOUND, "computed columns are not tags");
}

#[test]
fn key_tags_restrict_grouping() {
    let table = ResultTable::from_rows(
        vec![
            ColumnKey::tag("wsp"),
            ColumnKey::tag("seed"),
            ColumnKey::tag("case_id"),
            ColumnKey::computed("tower", "mean"),
        ],
        vec![
            vec![tag(8), tag(1), tag("wsp8_s1"), Cell::Value(1.0)],
            vec![tag(8), tag(2), tag("wsp8_s2"), Cell::Value(3.0)],
        ],
    )
    .expect("table");
    assert_eq!(aggregate_rows(&table, "seed").expect("all tags").len(), 2);
    let rolled = aggregate_rows_by(&table, &["wsp", "seed"], "seed").expect("key tags");
    assert_eq!(
        rolled.columns(),
        [ColumnKey::tag("wsp"), ColumnKey::computed("tower", "mean")]
    );
    assert_eq!(rolled.rows(), [vec![tag(8), Cell::Value(2.0)]]);
}

#[test]
fn series_cells_average_elementwise() {
    let table = ResultTable::from_rows(
        vec![ColumnKey::tag("seed"), ColumnKey::computed("tower", "PSD")],
        vec![
            vec![tag(1), Cell::Series(vec![1.0, 2.0])],
            vec![tag(2), Cell::Series(vec![3.0, 6.0])],
        ],
    )
    .expect("table");
    let rolled = aggregate_rows(&table, "seed").expect("rollup");
    assert_eq!(rolled.len(), 1);
    assert_eq!(rolled.rows()[0], [Cell::Series(vec![2.0, 4.0])]);
}

#[test]
fn channel_families_gain_one_column_per_statistic() {
    let table = seeds_table();
    let combined = aggregate_columns(&table, "flap").expect("columns");
    assert_eq!(combined.columns().len(), table.columns().len() + 2);
    assert_eq!(combined.columns()[5], ColumnKey::computed("flap", "mean"));
    assert_eq!(combined.columns()[6], ColumnKey::computed("flap", "DEL"));
    let means: Vec<&Cell> = combined.column_values(5).collect();
    assert_eq!(means[0], &Cell::Value(2.0));
    assert_eq!(means[3], &Cell::Value(9.0));
    let dels: Vec<&Cell> = combined.column_values(6).collect();
    assert_eq!(dels[1], &Cell::Missing);

    let again = aggregate_columns(&combined, "flap").expect("idempotent");
    assert_eq!(again, combined);
}

#[test]
fn sorting_groups_statistics_by_channel() {
    let mut table = ResultTable::from_rows(
        vec![
            ColumnKey::computed("tower", "mean"),
            ColumnKey::tag("wsp"),
            ColumnKey::computed("flap", "mean"),
            ColumnKey::computed("tower", "DEL"),
            ColumnKey::tag("seed"),
        ],
        vec![vec![Cell::Value(1.0), tag(8), Cell::Value(2.0), Cell::Value(3.0), tag(1)]],
    )
    .expect("table");
    sort_columns(&mut table);
    let names: Vec<String> = table.columns().iter().map(ToString::to_string).collect();
    assert_eq!(names, ["wsp", "seed", "tower/mean", "tower/DEL", "flap/mean"]);
    assert_eq!(
        table.rows()[0],
        [tag(8), tag(1), Cell::Value(1.0), Cell::Value(3.0), Cell::Value(2.0)]
    );
}

proptest! {
    #[test]
    fn rollup_yields_one_row_per_distinct_key(
        rows in prop::collection::vec((0i64..4, 0i64..3, -100.0f64..100.0), 1..40)
    ) {
        let table = ResultTable::from_rows(
            vec![ColumnKey::tag("wsp"), ColumnKey::tag("seed"), ColumnKey::computed("x", "mean")],
            rows.iter()
                .map(|(wsp, seed, x)| vec![tag(*wsp), tag(*seed), Cell::Value(*x)])
                .collect(),
        )
        .unwrap();
        let rolled = aggregate_rows(&table, "seed").unwrap();
        let mut distinct: Vec<i64> = Vec::new();
        for (wsp, _, _) in &rows {
            if !distinct.contains(wsp) {
                distinct.push(*wsp);
            }
        }
        prop_assert_eq!(rolled.len(), distinct.len());
        for (row, wsp) in rolled.rows().iter().zip(&distinct) {
            let members: Vec<f64> = rows.iter().filter(|(w, _, _)| w == wsp).map(|(_, _, x)| *x).collect();
            let mean = members.iter().sum::<f64>() / members.len() as f64;
            prop_assert_eq!(&row[0], &tag(*wsp));
            prop_assert!((row[1].as_f64().unwrap() - mean).abs() < 1e-9);
        }
    }
}
