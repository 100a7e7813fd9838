use std::fs;
use std::path::Path;
use std::process::Command;

use cast_res::write_result_pair;

const DESIGN: &str = r#"
constants:
  exponent: 4
variables:
  wsp: [8, 10, 12]
  seed: [1, 2]
functions:
  casename: dlc12
  case_id: "wsp{wsp}_s{seed}"
key_tags: [wsp, seed]
channels:
  tower: 1
"#;

fn cast(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_cast"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("run cast")
}

fn write_design(root: &Path) -> String {
    let path = root.join("dlc12.yaml");
    fs::write(&path, DESIGN).expect("design");
    path.display().to_string()
}

#[test]
fn expand_prints_the_filtered_tag_table() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let design = write_design(dir.path());
    let output = cast(&["expand", "--design", &design, "--where", "wsp=8,12", "--where", "seed=2"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8(output.stdout).expect("utf8");
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines[0], "exponent,wsp,seed,casename,case_id");
    assert_eq!(lines[1], ",,,,");
    assert_eq!(&lines[2..], ["4,8,2,dlc12,wsp8_s2", "4,12,2,dlc12,wsp12_s2"]);
}

fn cast_with_log(args: &[&str], filter: &str) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_cast"))
        .args(args)
        .env("RUST_LOG", filter)
        .output()
        .expect("run cast")
}

#[test]
fn rust_log_sets_the_log_level() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let design = write_design(dir.path());
    let args = ["expand", "--design", design.as_str()];

    let debug = cast_with_log(&args, "debug");
    assert!(debug.status.success());
    let stderr = String::from_utf8_lossy(&debug.stderr);
    assert!(stderr.contains("expanded design space"), "{stderr}");

    let warn = cast_with_log(&args, "warn");
    assert!(warn.status.success());
    let stderr = String::from_utf8_lossy(&warn.stderr);
    assert!(!stderr.contains("built case catalog"), "{stderr}");

    let quiet = cast(&args);
    let stderr = String::from_utf8_lossy(&quiet.stderr);
    assert!(stderr.contains("built case catalog"), "{stderr}");
    assert!(!stderr.contains("expanded design space"), "{stderr}");
}

#[test]
fn unknown_filter_column_fails_loudly() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let design = write_design(dir.path());
    let output = cast(&["expand", "--design", &design, "--where", "yaw=0"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("column-not-found"));
}

#[test]
fn postproc_collapses_seeds_into_means() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let design = write_design(dir.path());
    for wsp in [8.0, 10.0, 12.0] {
        for seed in [1.0, 2.0] {
            let stem = dir
                .path()
                .join("res")
                .join("dlc12")
                .join(format!("wsp{wsp}_s{seed}"));
            write_result_pair(&stem, &[(0.01, vec![wsp + seed; 32])]).expect("fixture");
        }
    }
    let out = dir.path().join("postproc").join("summary.csv");
    let root = dir.path().display().to_string();
    let out_arg = out.display().to_string();
    let output = cast(&[
        "postproc",
        "--design",
        &design,
        "--root",
        &root,
        "--stat",
        "mean",
        "--stat",
        "std",
        "--collapse",
        "seed",
        "--sort",
        "--out",
        &out_arg,
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let table = cast_post::read_csv(&out).expect("read back");
    assert_eq!(table.len(), 3);
    let means: Vec<f64> = table
        .column_values(1)
        .map(|cell| cell.as_f64().expect("value"))
        .collect();
    for (got, want) in means.iter().zip([9.5, 11.5, 13.5]) {
        assert!((got - want).abs() < 1e-9, "{got} != {want}");
    }
    let names: Vec<String> = table.columns().iter().map(ToString::to_string).collect();
    assert_eq!(names, ["wsp", "tower/mean", "tower/std"]);
}

#[test]
fn decode_dumps_channels_by_name() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let stem = dir.path().join("case_8");
    write_result_pair(&stem, &[(0.1, vec![10.0; 3]), (0.2, vec![20.0; 3])]).expect("fixture");
    let stem_arg = stem.display().to_string();
    let output = cast(&["decode", &stem_arg, "--channel", "flap=2", "--channel", "tower=1"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8(output.stdout).expect("utf8");
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines, ["flap,tower", "20,10", "20,10", "20,10"]);
}
