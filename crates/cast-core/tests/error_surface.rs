use std::io;
use std::path::Path;

use cast_core::errors::codes;
use cast_core::{io_failure, CastError, ErrorInfo};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("case_id", "case_8")
        .with_context("reason", "example")
}

#[test]
fn config_error_surface() {
    let err = CastError::Config(sample_info(codes::DUPLICATE_ATTRIBUTE, "wsp declared twice"));
    assert_eq!(err.code(), "duplicate-attribute");
    assert!(err.info().context.contains_key("case_id"));
}

#[test]
fn decode_error_surface() {
    let err = CastError::Decode(sample_info(codes::TRUNCATED_PAYLOAD, "short payload"));
    assert_eq!(err.info().code, "truncated-payload");
    assert!(err.to_string().starts_with("decode error: short payload"));
}

#[test]
fn query_error_names_the_column() {
    let err = CastError::column_not_found("wps");
    assert!(matches!(&err, CastError::Query(info) if info.code == codes::COLUMN_NOT_FOUND));
    assert_eq!(err.info().context.get("column").map(String::as_str), Some("wps"));
}

#[test]
fn missing_files_map_to_file_not_found() {
    let err = io_failure(
        Path::new("res/dlc12/case_8.sel"),
        io::Error::new(io::ErrorKind::NotFound, "gone"),
    );
    assert_eq!(err.code(), codes::FILE_NOT_FOUND);
    let err = io_failure(
        Path::new("res"),
        io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
    );
    assert_eq!(err.code(), codes::IO_FAILURE);
}

#[test]
fn errors_roundtrip_through_json() {
    let err = CastError::Cancelled(
        ErrorInfo::new(codes::BATCH_CANCELLED, "interrupted").with_hint("rerun the batch"),
    );
    let bytes = serde_json::to_vec(&err).expect("encode");
    let back: CastError = serde_json::from_slice(&bytes).expect("decode");
    assert_eq!(err, back);
}
