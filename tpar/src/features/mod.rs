//! Feature extraction for embedding layers.

use enum_map::Enum;

use Result;

mod addr;
pub use self::addr::{parse_addresses, AddressedValue, Dep, Source};

mod extractor;
pub use self::extractor::{EmbeddingFeatureExtractor, SparseFeature};

mod lookup;
pub use self::lookup::{LayerLookups, Lookup};

mod workspace;
pub use self::workspace::{WorkspaceRegistry, WorkspaceSet};

/// Embedding layers over which features are extracted.
#[derive(Clone, Copy, Debug, Enum, Eq, PartialEq)]
pub enum Layer {
    Word,
    Tag,
    DepRel,
}

impl Layer {
    /// The layer addressed by a feature group name.
    pub fn from_group_name(name: &str) -> Result<Layer> {
        match name {
            "words" => Ok(Layer::Word),
            "tags" => Ok(Layer::Tag),
            "labels" => Ok(Layer::DepRel),
            _ => bail!("unknown feature group: {}", name),
        }
    }
}
