use std::fs;
use std::path::Path;

use cast_core::serde::from_yaml_slice;
use cast_core::{io_failure, CastError, ChannelMap, TagValue};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::design::DesignSpace;

/// On-disk YAML form of a [`DesignSpace`].
///
/// Functions are `{name}` templates; mapping order in the file is the
/// declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DesignFile {
    #[serde(default)]
    pub constants: IndexMap<String, TagValue>,
    #[serde(default)]
    pub variables: IndexMap<String, Vec<TagValue>>,
    #[serde(default)]
    pub functions: IndexMap<String, String>,
    #[serde(default)]
    pub key_tags: Vec<String>,
    #[serde(default)]
    pub channels: ChannelMap,
}

impl DesignFile {
    /// Converts the file form into a design space.
    pub fn into_design(self) -> DesignSpace {
        let mut space = DesignSpace::new();
        for (name, value) in self.constants {
            space = space.constant(name, value);
        }
        for (name, values) in self.variables {
            space = space.variable(name, values);
        }
        for (name, template) in self.functions {
            space = space.template(name, template);
        }
        space.key_tags(self.key_tags).channels(self.channels)
    }
}

/// Loads a design space from a YAML file and validates it.
pub fn load_design(path: &Path) -> Result<DesignSpace, CastError> {
    let bytes = fs::read(path).map_err(|err| io_failure(path, err))?;
    let file: DesignFile = from_yaml_slice(&bytes)?;
    let space = file.into_design().source(path);
    space.validate()?;
    Ok(space)
}

impl From<DesignFile> for DesignSpace {
    fn from(file: DesignFile) -> Self {
        file.into_design()
    }
}
