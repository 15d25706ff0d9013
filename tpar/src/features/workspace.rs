use enum_map::EnumMap;

use features::Layer;

/// The set of precomputed per-token caches requested by feature
/// extractors.
///
/// Extractors declare the layers they want precomputed once at setup;
/// every batch slot's workspace is then reset against this registry when
/// a new sentence occupies the slot.
#[derive(Clone, Debug, Default)]
pub struct WorkspaceRegistry(EnumMap<Layer, bool>);

impl WorkspaceRegistry {
    pub fn request(&mut self, layer: Layer) {
        self.0[layer] = true;
    }

    pub fn is_requested(&self, layer: Layer) -> bool {
        self.0[layer]
    }
}

/// Per-slot cache of precomputed per-token identifiers.
///
/// A workspace belongs to one batch slot and is never shared. It is
/// reset and repopulated whenever a new sentence occupies the slot.
#[derive(Default)]
pub struct WorkspaceSet {
    ids: EnumMap<Layer, Option<Vec<usize>>>,
    populated: bool,
}

impl WorkspaceSet {
    /// Clear the workspace, declaring slots for the requested layers.
    pub fn reset(&mut self, registry: &WorkspaceRegistry) {
        for (layer, ids) in self.ids.iter_mut() {
            *ids = if registry.is_requested(layer) {
                Some(Vec::new())
            } else {
                None
            };
        }
        self.populated = false;
    }

    pub fn is_populated(&self) -> bool {
        self.populated
    }

    pub(crate) fn set_populated(&mut self) {
        self.populated = true;
    }

    pub(crate) fn wants(&self, layer: Layer) -> bool {
        self.ids[layer].is_some()
    }

    pub(crate) fn set_ids(&mut self, layer: Layer, ids: Vec<usize>) {
        debug_assert!(self.wants(layer), "layer {:?} was not requested", layer);
        self.ids[layer] = Some(ids);
    }

    /// The precomputed identifiers for a layer, indexed by token.
    pub fn ids(&self, layer: Layer) -> Option<&[usize]> {
        self.ids[layer].as_ref().map(Vec::as_slice)
    }
}
