use std::fs::{self, File};
use std::path::Path;
use std::time::{Duration, SystemTime};

use cast_design::{freshness, load_design, CampaignLayout, CaseCatalog, Freshness};

fn touch(path: &Path, age_secs: u64) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("mkdir");
    }
    fs::write(path, b"x").expect("write");
    let when = SystemTime::now() - Duration::from_secs(age_secs);
    File::options()
        .write(true)
        .open(path)
        .expect("open")
        .set_modified(when)
        .expect("set mtime");
}

#[test]
fn causal_order_is_synchronised() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let design = dir.path().join("design.yaml");
    let input = dir.path().join("case.htc");
    let result = dir.path().join("case.sel");
    touch(&design, 300);
    touch(&input, 200);
    touch(&result, 100);
    assert_eq!(freshness(&design, &input, &result).unwrap(), Freshness::Synchronized);
}

#[test]
fn newer_design_flags_input() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let design = dir.path().join("design.yaml");
    let input = dir.path().join("case.htc");
    let result = dir.path().join("case.sel");
    touch(&input, 300);
    touch(&result, 200);
    touch(&design, 100);
    assert_eq!(
        freshness(&design, &input, &result).unwrap(),
        Freshness::UnsynchronizedInput
    );
}

#[test]
fn stale_or_missing_result_flags_result() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let design = dir.path().join("design.yaml");
    let input = dir.path().join("case.htc");
    let result = dir.path().join("case.sel");
    touch(&design, 300);
    touch(&input, 200);
    assert_eq!(
        freshness(&design, &input, &result).unwrap(),
        Freshness::UnsynchronizedResult
    );
    touch(&result, 250);
    assert_eq!(
        freshness(&design, &input, &result).unwrap(),
        Freshness::UnsynchronizedResult
    );
}

#[test]
fn seeds_check_against_their_design_file() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let design_path = dir.path().join("design.yaml");
    fs::write(
        &design_path,
        "variables:\n  wsp: [8]\nfunctions:\n  casename: dlc12\n  case_id: \"wsp{wsp}\"\n",
    )
    .expect("design");
    let space = load_design(&design_path).expect("load");
    let catalog = CaseCatalog::build(&space, CampaignLayout::new(dir.path())).expect("build");
    let seed = &catalog.seeds()[0];
    assert_eq!(seed.freshness().unwrap(), Freshness::UnsynchronizedInput);
    touch(&design_path, 300);
    touch(&seed.paths().input, 200);
    touch(&seed.paths().header, 100);
    assert_eq!(seed.freshness().unwrap(), Freshness::Synchronized);
}
