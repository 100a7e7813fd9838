use std::path::Path;

use cast_core::errors::codes;
use cast_core::{ChannelMap, Predicate, TagValue};
use cast_design::{CampaignLayout, CaseCatalog, DesignSpace};
use cast_res::write_result_pair;

fn design() -> DesignSpace {
    DesignSpace::new()
        .constant("exponent", 4)
        .variable("wsp", [8, 10, 12])
        .variable("seed", [1, 2])
        .template("casename", "dlc12")
        .template("case_id", "wsp{wsp}_s{seed}")
        .key_tags(["wsp", "seed"])
        .channels(ChannelMap::new().with("tower_mx", 1).with("flap", 2))
}

#[test]
fn seeds_follow_table_order_with_fixed_paths() {
    let catalog = CaseCatalog::build(&design(), CampaignLayout::new("campaign")).expect("build");
    assert_eq!(catalog.len(), 6);
    let first = &catalog.seeds()[0];
    assert_eq!(first.case_id(), "wsp8_s1");
    assert_eq!(first.casename(), "dlc12");
    assert_eq!(first.paths().input, Path::new("campaign/htc/dlc12/wsp8_s1.htc"));
    assert_eq!(first.paths().header, Path::new("campaign/res/dlc12/wsp8_s1.sel"));
    assert_eq!(first.paths().payload, Path::new("campaign/res/dlc12/wsp8_s1.dat"));
    assert_eq!(first.paths().log, Path::new("campaign/log/dlc12/wsp8_s1.log"));
    assert_eq!(first.paths().postproc, Path::new("campaign/postproc/dlc12/wsp8_s1"));
    for (idx, seed) in catalog.iter().enumerate() {
        assert_eq!(seed.index(), idx);
        assert_eq!(seed.row(), catalog.table().rows()[idx].as_slice());
    }
}

#[test]
fn select_keeps_catalog_order() {
    let catalog = CaseCatalog::build(&design(), CampaignLayout::default()).expect("build");
    let selected = catalog
        .select(&Predicate::new().any_of("wsp", [12, 8]).eq("seed", 2))
        .expect("select");
    let ids: Vec<&str> = selected.iter().map(|seed| seed.case_id()).collect();
    assert_eq!(ids, ["wsp8_s2", "wsp12_s2"]);
    assert_eq!(catalog.select(&Predicate::new()).expect("all").len(), 6);
    assert_eq!(
        catalog.select(&Predicate::new().eq("yaw", 0)).unwrap_err().code(),
        codes::COLUMN_NOT_FOUND
    );
}

#[test]
fn seeds_expose_typed_tags() {
    let catalog = CaseCatalog::build(&design(), CampaignLayout::default()).expect("build");
    let seed = &catalog.seeds()[3];
    assert_eq!(seed.tag("wsp").expect("wsp"), &TagValue::from(10));
    assert_eq!(seed.tag("exponent").expect("exponent"), &TagValue::from(4));
    assert_eq!(seed.tag("yaw").unwrap_err().code(), codes::UNKNOWN_TAG);
    let keys: Vec<&str> = seed.key_tags().into_iter().map(|(name, _)| name).collect();
    assert_eq!(keys, ["wsp", "seed"]);
    assert_eq!(catalog.meta().design_hash.len(), 64);
}

#[test]
fn colliding_case_ids_are_reported() {
    let space = DesignSpace::new()
        .variable("wsp", [8, 10])
        .variable("seed", [1, 2])
        .template("casename", "dlc12")
        .template("case_id", "wsp{wsp}");
    let err = CaseCatalog::build(&space, CampaignLayout::default()).unwrap_err();
    assert_eq!(err.code(), codes::DUPLICATE_CASE_ID);
    assert_eq!(err.info().context.get("case_id").map(String::as_str), Some("wsp8"));
}

#[test]
fn designs_must_derive_case_tags() {
    let space = DesignSpace::new()
        .variable("wsp", [8])
        .template("case_id", "wsp{wsp}");
    let err = CaseCatalog::build(&space, CampaignLayout::default()).unwrap_err();
    assert_eq!(err.code(), codes::MISSING_CASE_TAG);
}

#[test]
fn iter_results_reports_failures_per_case() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let catalog = CaseCatalog::build(&design(), CampaignLayout::new(dir.path())).expect("build");
    let present = &catalog.seeds()[0];
    write_result_pair(
        &present.paths().result_stem,
        &[(0.1, vec![1.0; 10]), (0.1, vec![2.0; 10])],
    )
    .expect("fixture");

    let results: Vec<_> = catalog
        .iter_results(&Predicate::new().eq("seed", 1))
        .expect("iterate")
        .collect();
    assert_eq!(results.len(), 3);
    let (seed, first) = &results[0];
    assert_eq!(seed.case_id(), "wsp8_s1");
    let channels = first.as_ref().expect("decoded");
    assert_eq!(channels.names(), ["tower_mx".to_string(), "flap".to_string()]);
    for (_, missing) in &results[1..] {
        assert_eq!(missing.as_ref().unwrap_err().code(), codes::FILE_NOT_FOUND);
    }
}
