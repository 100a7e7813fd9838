use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cast_core::errors::codes;
use cast_core::{CastError, ChannelMap, ErrorInfo, TagValue};
use indexmap::IndexMap;

/// Partially built attribute mapping handed to derived functions.
pub type Attributes = IndexMap<String, TagValue>;

/// Closure deriving one tag from the attributes built so far.
pub type DeriveFn = Arc<dyn Fn(&Attributes) -> Result<TagValue, CastError> + Send + Sync>;

/// How a derived tag is computed.
#[derive(Clone)]
pub enum Derivation {
    /// `{name}` placeholders replaced by the named attribute.
    Template(String),
    /// Arbitrary function of the attributes built so far.
    Custom(DeriveFn),
}

impl fmt::Debug for Derivation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Derivation::Template(template) => f.debug_tuple("Template").field(template).finish(),
            Derivation::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl Derivation {
    /// Evaluates the derivation against `attrs`.
    pub fn evaluate(&self, attrs: &Attributes) -> Result<TagValue, CastError> {
        match self {
            Derivation::Template(template) => render_template(template, attrs).map(TagValue::Text),
            Derivation::Custom(func) => func(attrs),
        }
    }
}

/// Substitutes `{name}` placeholders in `template` from `attrs`.
pub fn render_template(template: &str, attrs: &Attributes) -> Result<String, CastError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let close = after.find('}').ok_or_else(|| {
            CastError::Config(
                ErrorInfo::new(codes::FUNCTION_FAILED, "unterminated placeholder")
                    .with_context("template", template),
            )
        })?;
        let key = &after[..close];
        let value = attrs.get(key).ok_or_else(|| {
            CastError::Config(
                ErrorInfo::new(codes::FUNCTION_FAILED, "placeholder names an unknown attribute")
                    .with_context("template", template)
                    .with_context("attribute", key)
                    .with_hint("templates may only use constants, variables and earlier functions"),
            )
        })?;
        out.push_str(&value.to_string());
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

/// Declarative description of a simulation campaign.
///
/// Constants apply to every case, variables span the sweep, functions derive
/// further tags in declaration order. An attribute name may appear in exactly
/// one of the three mappings.
#[derive(Debug, Clone, Default)]
pub struct DesignSpace {
    pub(crate) constants: IndexMap<String, TagValue>,
    pub(crate) variables: IndexMap<String, Vec<TagValue>>,
    pub(crate) functions: IndexMap<String, Derivation>,
    pub(crate) key_tags: Vec<String>,
    pub(crate) channels: ChannelMap,
    pub(crate) source: Option<PathBuf>,
    duplicates: Vec<String>,
}

impl DesignSpace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn constant(mut self, name: impl Into<String>, value: impl Into<TagValue>) -> Self {
        let name = name.into();
        self.note_duplicate(&name);
        self.constants.insert(name, value.into());
        self
    }

    pub fn variable<I, T>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TagValue>,
    {
        let name = name.into();
        self.note_duplicate(&name);
        self.variables
            .insert(name, values.into_iter().map(Into::into).collect());
        self
    }

    /// Adds a derived tag rendered from a `{name}` template.
    pub fn template(mut self, name: impl Into<String>, template: impl Into<String>) -> Self {
        let name = name.into();
        self.note_duplicate(&name);
        self.functions
            .insert(name, Derivation::Template(template.into()));
        self
    }

    /// Adds a derived tag computed by `func`.
    pub fn function<F>(mut self, name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Attributes) -> Result<TagValue, CastError> + Send + Sync + 'static,
    {
        let name = name.into();
        self.note_duplicate(&name);
        self.functions
            .insert(name, Derivation::Custom(Arc::new(func)));
        self
    }

    /// Names the tags that identify a case when exposed on a seed.
    pub fn key_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.key_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn channels(mut self, channels: ChannelMap) -> Self {
        self.channels = channels;
        self
    }

    /// Records the file the design was loaded from, for freshness checks.
    pub fn source(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = Some(path.into());
        self
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn channel_map(&self) -> &ChannelMap {
        &self.channels
    }

    pub fn key_tag_names(&self) -> &[String] {
        &self.key_tags
    }

    pub fn constants(&self) -> &IndexMap<String, TagValue> {
        &self.constants
    }

    pub fn variables(&self) -> &IndexMap<String, Vec<TagValue>> {
        &self.variables
    }

    pub fn functions(&self) -> &IndexMap<String, Derivation> {
        &self.functions
    }

    /// Column names in table order: constants, variables, functions.
    pub fn attribute_names(&self) -> Vec<String> {
        self.constants
            .keys()
            .chain(self.variables.keys())
            .chain(self.functions.keys())
            .cloned()
            .collect()
    }

    /// Number of cases the design expands to.
    pub fn case_count(&self) -> usize {
        self.variables.values().map(Vec::len).product()
    }

    /// Checks that every attribute name is declared once.
    pub fn validate(&self) -> Result<(), CastError> {
        if let Some(name) = self.duplicates.first() {
            return Err(duplicate(name));
        }
        let mut seen = std::collections::HashSet::new();
        for name in self
            .constants
            .keys()
            .chain(self.variables.keys())
            .chain(self.functions.keys())
        {
            if !seen.insert(name.as_str()) {
                return Err(duplicate(name));
            }
        }
        for tag in &self.key_tags {
            if !seen.contains(tag.as_str()) {
                return Err(CastError::Config(
                    ErrorInfo::new(codes::UNKNOWN_TAG, "key tag is not a design attribute")
                        .with_context("tag", tag.as_str()),
                ));
            }
        }
        Ok(())
    }

    fn note_duplicate(&mut self, name: &str) {
        if self.constants.contains_key(name)
            || self.variables.contains_key(name)
            || self.functions.contains_key(name)
        {
            self.duplicates.push(name.to_string());
        }
    }
}

fn duplicate(name: &str) -> CastError {
    CastError::Config(
        ErrorInfo::new(codes::DUPLICATE_ATTRIBUTE, "attribute declared more than once")
            .with_context("attribute", name),
    )
}
