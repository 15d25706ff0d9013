use std::sync::Arc;

use enum_map::EnumMap;

use features::Layer;
use lexicon::TermFrequencyMap;

/// Term lookup for one embedding layer.
///
/// Extends a term map with two sentinel indices: one for terms outside
/// the vocabulary and one for feature slots that do not address a token
/// at all. `len` includes both sentinels and is the width of the layer's
/// embedding table.
#[derive(Clone)]
pub struct Lookup {
    map: Arc<TermFrequencyMap>,
}

impl Lookup {
    pub fn new(map: Arc<TermFrequencyMap>) -> Self {
        Lookup { map }
    }

    pub fn lookup(&self, term: &str) -> usize {
        self.map.lookup(term).unwrap_or_else(|| self.unknown_idx())
    }

    pub fn term(&self, id: usize) -> Option<&str> {
        self.map.term(id)
    }

    pub fn unknown_idx(&self) -> usize {
        self.map.len()
    }

    pub fn outside_idx(&self) -> usize {
        self.map.len() + 1
    }

    pub fn len(&self) -> usize {
        self.map.len() + 2
    }
}

/// Lookups for the active embedding layers.
pub struct LayerLookups(EnumMap<Layer, Option<Lookup>>);

impl LayerLookups {
    pub fn new() -> Self {
        LayerLookups(EnumMap::new())
    }

    pub fn insert(&mut self, layer: Layer, lookup: Lookup) {
        self.0[layer] = Some(lookup);
    }

    pub fn layer_lookup(&self, layer: Layer) -> Option<&Lookup> {
        self.0[layer].as_ref()
    }
}

impl Default for LayerLookups {
    fn default() -> Self {
        LayerLookups::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use lexicon::TermFrequencyMap;

    use super::Lookup;

    #[test]
    fn sentinels_follow_the_vocabulary() {
        let map = TermFrequencyMap::from_buf_read("a 2\nb 1\n".as_bytes(), 0, 0).unwrap();
        let lookup = Lookup::new(Arc::new(map));

        assert_eq!(lookup.lookup("a"), 0);
        assert_eq!(lookup.lookup("c"), 2);
        assert_eq!(lookup.unknown_idx(), 2);
        assert_eq!(lookup.outside_idx(), 3);
        assert_eq!(lookup.len(), 4);
    }
}
