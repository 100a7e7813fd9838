use std::fs;

use cast_core::errors::codes;
use cast_core::TagValue;
use cast_design::{load_design, CampaignLayout, CaseCatalog};

const DESIGN: &str = r#"
constants:
  exponent: 4
  turbine: dtu10mw
variables:
  wsp: [8, 10.5, 12]
  seed: [1, 2]
functions:
  casename: "dlc12_{turbine}"
  case_id: "wsp{wsp}_s{seed}"
key_tags: [wsp, seed]
channels:
  tower_mx: 17
  flap: 26
"#;

#[test]
fn yaml_design_keeps_declaration_order() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = dir.path().join("dlc12.yaml");
    fs::write(&path, DESIGN).expect("write");
    let space = load_design(&path).expect("load");
    assert_eq!(space.source_path(), Some(path.as_path()));
    assert_eq!(
        space.attribute_names(),
        ["exponent", "turbine", "wsp", "seed", "casename", "case_id"]
    );
    let names: Vec<&str> = space.channel_map().names().collect();
    assert_eq!(names, ["tower_mx", "flap"]);

    let catalog = CaseCatalog::build(&space, CampaignLayout::new("runs")).expect("build");
    assert_eq!(catalog.len(), 6);
    assert_eq!(catalog.seeds()[2].case_id(), "wsp10.5_s1");
    assert_eq!(catalog.seeds()[2].casename(), "dlc12_dtu10mw");
    assert_eq!(
        catalog.seeds()[2].paths().header.to_string_lossy(),
        "runs/res/dlc12_dtu10mw/wsp10.5_s1.sel"
    );
    assert_eq!(catalog.seeds()[2].tag("wsp").unwrap(), &TagValue::from(10.5));
}

#[test]
fn attributes_repeated_across_sections_are_rejected() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = dir.path().join("bad.yaml");
    fs::write(
        &path,
        "constants:\n  wsp: 4\nvariables:\n  wsp: [8]\n",
    )
    .expect("write");
    assert_eq!(load_design(&path).unwrap_err().code(), codes::DUPLICATE_ATTRIBUTE);
}

#[test]
fn unknown_key_tags_are_rejected() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = dir.path().join("bad.yaml");
    fs::write(&path, "variables:\n  wsp: [8]\nkey_tags: [yaw]\n").expect("write");
    assert_eq!(load_design(&path).unwrap_err().code(), codes::UNKNOWN_TAG);
}

#[test]
fn missing_design_file_is_reported() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let err = load_design(&dir.path().join("absent.yaml")).unwrap_err();
    assert_eq!(err.code(), codes::FILE_NOT_FOUND);
}
