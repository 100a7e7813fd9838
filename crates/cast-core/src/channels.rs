//! Named channel selections for result payloads.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::errors::{codes, CastError, ErrorInfo};

/// Ordered mapping from a caller chosen channel name to its 1-based index in
/// the result payload.
///
/// Iteration order is insertion order and decides the order of decoded
/// channels, independent of where they sit in the payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelMap(IndexMap<String, usize>);

impl ChannelMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a channel, keeping its first insertion position.
    pub fn insert(&mut self, name: impl Into<String>, index: usize) {
        self.0.insert(name.into(), index);
    }

    /// Builder form of [`ChannelMap::insert`].
    pub fn with(mut self, name: impl Into<String>, index: usize) -> Self {
        self.insert(name, index);
        self
    }

    /// Returns the payload index of `name`.
    pub fn get(&self, name: &str) -> Option<usize> {
        self.0.get(name).copied()
    }

    /// Number of channels in the map.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map selects no channel.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates `(name, index)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.0.iter().map(|(name, index)| (name.as_str(), *index))
    }

    /// Channel names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Restricts the map to `names`, in the order they are given.
    ///
    /// An empty selection returns the full map.
    pub fn subset<S: AsRef<str>>(&self, names: &[S]) -> Result<ChannelMap, CastError> {
        if names.is_empty() {
            return Ok(self.clone());
        }
        let mut out = ChannelMap::new();
        for name in names {
            let name = name.as_ref();
            let index = self.get(name).ok_or_else(|| {
                CastError::Config(
                    ErrorInfo::new(codes::UNKNOWN_CHANNEL, "channel is not in the channel map")
                        .with_context("channel", name),
                )
            })?;
            out.insert(name, index);
        }
        Ok(out)
    }
}

impl<S: Into<String>> FromIterator<(S, usize)> for ChannelMap {
    fn from_iter<I: IntoIterator<Item = (S, usize)>>(iter: I) -> Self {
        let mut map = ChannelMap::new();
        for (name, index) in iter {
            map.insert(name, index);
        }
        map
    }
}
