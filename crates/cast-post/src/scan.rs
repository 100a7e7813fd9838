//! Discovery of result files by filename pattern.

use std::fs;
use std::path::Path;

use cast_core::errors::codes;
use cast_core::{io_failure, CastError, ChannelMap, ErrorInfo, TagValue};
use cast_res::HEADER_EXTENSION;
use regex::Regex;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::pipeline::{Aggregation, CaseSource, PipelineOpts};
use crate::table::{Cell, ColumnKey, ResultTable};

/// Filename pattern with `{field}` placeholders, such as `wsp{wsp}_s{seed}`.
///
/// Placeholders match greedily, so when a separator repeats the earlier field
/// takes the longest span: `wsp{wsp}_s{seed}` splits `wsp10_s1_s2` into
/// `10_s1` and `2`.
#[derive(Debug, Clone)]
pub struct FilenamePattern {
    regex: Regex,
    fields: Vec<String>,
}

impl FilenamePattern {
    pub fn parse(pattern: &str) -> Result<Self, CastError> {
        let syntax = |message: &str| {
            CastError::Config(
                ErrorInfo::new(codes::PATTERN_SYNTAX, message).with_context("pattern", pattern),
            )
        };
        let mut source = String::from("^");
        let mut fields = Vec::new();
        let mut rest = pattern;
        while let Some(open) = rest.find('{') {
            source.push_str(&regex::escape(&rest[..open]));
            let after = &rest[open + 1..];
            let close = after.find('}').ok_or_else(|| syntax("unterminated placeholder"))?;
            let field = &after[..close];
            let valid = field
                .chars()
                .next()
                .map(|c| c.is_ascii_alphabetic() || c == '_')
                .unwrap_or(false)
                && field.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
            if !valid {
                return Err(syntax("placeholder is not an identifier"));
            }
            if fields.iter().any(|known| known == field) {
                return Err(syntax("placeholder appears twice"));
            }
            source.push_str(&format!("(?P<{field}>.+)"));
            fields.push(field.to_string());
            rest = &after[close + 1..];
        }
        source.push_str(&regex::escape(rest));
        source.push('$');
        let regex = Regex::new(&source).map_err(|err| {
            CastError::Config(
                ErrorInfo::new(codes::PATTERN_SYNTAX, "pattern does not compile")
                    .with_context("pattern", pattern)
                    .with_hint(err.to_string()),
            )
        })?;
        Ok(Self { regex, fields })
    }

    /// Placeholder names in pattern order.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Field values captured from `stem`, parsed as numbers where possible.
    pub fn captures(&self, stem: &str) -> Option<Vec<TagValue>> {
        let caps = self.regex.captures(stem)?;
        self.fields
            .iter()
            .map(|field| caps.name(field).map(|m| TagValue::parse(m.as_str())))
            .collect()
    }
}

/// Finds every result header in `dir` (not recursing) whose stem matches
/// `pattern`.
///
/// The returned table has one tag column per placeholder; rows and cases are
/// ordered by file name.
pub fn scan_directory(
    dir: &Path,
    pattern: &str,
) -> Result<(ResultTable, Vec<CaseSource>), CastError> {
    let pattern = FilenamePattern::parse(pattern)?;
    fs::metadata(dir).map_err(|err| io_failure(dir, err))?;
    let suffix = format!(".{HEADER_EXTENSION}");

    let mut table = ResultTable::new(pattern.fields().iter().map(ColumnKey::tag).collect());
    let mut cases = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|err| {
            CastError::Io(
                ErrorInfo::new(codes::IO_FAILURE, err.to_string())
                    .with_context("path", dir.display().to_string()),
            )
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(stem) = entry
            .file_name()
            .to_str()
            .and_then(|name| name.strip_suffix(suffix.as_str()))
        else {
            continue;
        };
        let Some(values) = pattern.captures(stem) else {
            debug!(file = stem, "result file does not match pattern");
            continue;
        };
        table.push_row(values.into_iter().map(Cell::Tag).collect())?;
        cases.push(CaseSource {
            label: stem.to_string(),
            stem: dir.join(stem),
        });
    }
    info!(dir = %dir.display(), cases = cases.len(), "scanned result directory");
    Ok((table, cases))
}

impl Aggregation {
    /// Starts from the result files in `dir` whose names match `pattern`.
    pub fn from_directory(
        dir: &Path,
        pattern: &str,
        channels: ChannelMap,
        opts: PipelineOpts,
    ) -> Result<Self, CastError> {
        let (table, cases) = scan_directory(dir, pattern)?;
        Self::new(table, cases, channels, opts)
    }
}
