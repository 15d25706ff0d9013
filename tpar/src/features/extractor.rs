use features::addr::{parse_addresses, AddressedValue};
use features::{Layer, LayerLookups, Lookup, WorkspaceRegistry, WorkspaceSet};
use lexicon::LexiconCache;
use system::ParserState;
use task::TaskContext;
use Result;

/// A single sparse feature value.
///
/// The identifier indexes the embedding table of the feature's group;
/// weight and string value are optional refinements of the wire format.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SparseFeature {
    pub id: usize,
    pub weight: Option<f32>,
    pub value: Option<String>,
}

impl SparseFeature {
    pub fn new(id: usize) -> Self {
        SparseFeature {
            id,
            weight: None,
            value: None,
        }
    }

    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn with_value<S>(mut self, value: S) -> Self
    where
        S: Into<String>,
    {
        self.value = Some(value.into());
        self
    }
}

struct FeatureGroup {
    name: String,
    layer: Layer,
    dims: usize,
    addrs: Vec<AddressedValue>,
}

/// Extractor of grouped sparse features from parser states.
///
/// The extractor is configured once from task parameters namespaced by an
/// argument prefix, so that several extractors with different feature
/// sets can coexist in one task configuration. Each feature group
/// addresses one embedding layer and has a fixed number of feature
/// slots.
pub struct EmbeddingFeatureExtractor {
    arg_prefix: String,
    groups: Vec<FeatureGroup>,
    lookups: LayerLookups,
}

impl EmbeddingFeatureExtractor {
    pub fn new<S>(arg_prefix: S) -> Self
    where
        S: Into<String>,
    {
        EmbeddingFeatureExtractor {
            arg_prefix: arg_prefix.into(),
            groups: Vec::new(),
            lookups: LayerLookups::new(),
        }
    }

    /// The full name of a parameter namespaced by the argument prefix.
    pub fn param_name(&self, name: &str) -> String {
        format!("{}_{}", self.arg_prefix, name)
    }

    fn require_param<'a>(&self, context: &'a TaskContext, name: &str) -> Result<&'a str> {
        let param = self.param_name(name);
        context
            .param(&param)
            .ok_or_else(|| format_err!("missing parameter: {}", param))
    }

    /// Read the feature configuration. Called once, before `init`.
    pub fn setup(&mut self, context: &TaskContext) -> Result<()> {
        let names = self.require_param(context, "embedding_names")?;
        let dims = self.require_param(context, "embedding_dims")?;
        let templates = self.require_param(context, "features")?;

        let names: Vec<_> = names.split(';').map(str::trim).collect();
        let dims: Vec<_> = dims.split(';').map(str::trim).collect();
        let templates: Vec<_> = templates.split(';').map(str::trim).collect();
        ensure!(
            names.len() == dims.len() && names.len() == templates.len(),
            "feature configuration of {} names {} groups, {} dimensionalities, and {} templates",
            self.arg_prefix,
            names.len(),
            dims.len(),
            templates.len()
        );

        let mut groups = Vec::with_capacity(names.len());
        for (name, dims, template) in izip!(names, dims, templates) {
            let layer = Layer::from_group_name(name)?;
            let dims = dims.parse().map_err(|_| {
                format_err!("invalid embedding dimensionality for {}: {}", name, dims)
            })?;
            let addrs = parse_addresses(template)?;
            ensure!(!addrs.is_empty(), "feature group {} has no addresses", name);

            groups.push(FeatureGroup {
                name: name.to_owned(),
                layer,
                dims,
                addrs,
            });
        }

        self.groups = groups;

        Ok(())
    }

    /// Load the vocabularies of the configured layers.
    pub fn init(&mut self, context: &TaskContext, lexicons: &LexiconCache) -> Result<()> {
        for group in &self.groups {
            if self.lookups.layer_lookup(group.layer).is_some() {
                continue;
            }

            let input = match group.layer {
                Layer::Word => "word-map",
                Layer::Tag => "tag-map",
                Layer::DepRel => "label-map",
            };
            let map = lexicons.load(context.input_path(input)?)?;
            self.lookups.insert(group.layer, Lookup::new(map));
        }

        Ok(())
    }

    pub fn num_embeddings(&self) -> usize {
        self.groups.len()
    }

    /// The embedding dimensionality of each feature group.
    pub fn embedding_dims(&self) -> Vec<usize> {
        self.groups.iter().map(|group| group.dims).collect()
    }

    /// The fixed number of feature slots of a group.
    pub fn feature_size(&self, group: usize) -> usize {
        self.groups[group].addrs.len()
    }

    /// The width of a group's embedding table, including the sentinel
    /// indices.
    pub fn vocabulary_size(&self, group: usize) -> usize {
        self.lookups
            .layer_lookup(self.groups[group].layer)
            .expect("feature extractor used before init")
            .len()
    }

    /// Declare the precomputed workspaces this extractor needs.
    pub fn request_workspaces(&self, registry: &mut WorkspaceRegistry) {
        for group in &self.groups {
            match group.layer {
                Layer::Word | Layer::Tag => registry.request(group.layer),
                // Arc labels change while parsing and are read off the
                // state directly.
                Layer::DepRel => (),
            }
        }
    }

    /// Populate the workspace for a freshly created state.
    ///
    /// Idempotent per state: a second call on a populated workspace is a
    /// no-op.
    pub fn preprocess(&self, workspace: &mut WorkspaceSet, state: &ParserState) {
        if workspace.is_populated() {
            return;
        }

        for &layer in &[Layer::Word, Layer::Tag] {
            if !workspace.wants(layer) {
                continue;
            }

            let lookup = self
                .lookups
                .layer_lookup(layer)
                .expect("no lookup for a requested layer");

            let mut ids = Vec::with_capacity(state.n_tokens() + 1);
            ids.push(lookup.outside_idx());
            for token in state.sentence().iter() {
                let term = match layer {
                    Layer::Word => token.form(),
                    Layer::Tag => token.pos(),
                    Layer::DepRel => unreachable!("dependency relations are not precomputed"),
                };
                ids.push(lookup.lookup(term));
            }

            workspace.set_ids(layer, ids);
        }

        workspace.set_populated();
    }

    /// Extract the sparse features of a state, one sequence of values per
    /// feature group.
    ///
    /// This is a pure function of the workspace and state contents:
    /// identical inputs yield identical features.
    pub fn extract_sparse_features(
        &self,
        workspace: &WorkspaceSet,
        state: &ParserState,
    ) -> Result<Vec<Vec<SparseFeature>>> {
        ensure!(
            workspace.is_populated(),
            "features extracted from an unprocessed workspace"
        );

        let mut groups = Vec::with_capacity(self.groups.len());
        for group in &self.groups {
            let lookup = self
                .lookups
                .layer_lookup(group.layer)
                .ok_or_else(|| format_err!("no lookup for layer {:?}", group.layer))?;

            let mut features = Vec::with_capacity(group.addrs.len());
            for addr in &group.addrs {
                let id = match addr.resolve(state) {
                    Some(token) => match group.layer {
                        Layer::Word | Layer::Tag => {
                            let ids = workspace.ids(group.layer).ok_or_else(|| {
                                format_err!("workspace is missing the {:?} layer", group.layer)
                            })?;
                            ids[token]
                        }
                        // A token that was not attached yet maps to the
                        // unknown label.
                        Layer::DepRel => {
                            state.label(token).unwrap_or_else(|| lookup.unknown_idx())
                        }
                    },
                    None => lookup.outside_idx(),
                };

                features.push(SparseFeature::new(id));
            }

            ensure!(
                features.len() == group.addrs.len(),
                "feature group {} has {} values, expected {}",
                group.name,
                features.len(),
                group.addrs.len()
            );

            groups.push(features);
        }

        Ok(groups)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use features::{Layer, WorkspaceRegistry, WorkspaceSet};
    use lexicon::LexiconCache;
    use system::{create_system, ParserState, TransitionSystem};
    use systems::util::{task_context, test_sentence};
    use Result;

    use super::EmbeddingFeatureExtractor;

    fn test_extractor() -> (EmbeddingFeatureExtractor, Box<dyn TransitionSystem>) {
        let context = task_context();
        let lexicons = LexiconCache::new();

        let mut extractor = EmbeddingFeatureExtractor::new("parser");
        extractor.setup(&context).unwrap();
        extractor.init(&context, &lexicons).unwrap();

        let mut system = create_system("arc-standard").unwrap();
        system.setup(&context).unwrap();
        system.init(&context, &lexicons).unwrap();

        (extractor, system)
    }

    fn fresh_state(system: &dyn TransitionSystem) -> (WorkspaceSet, ParserState) {
        let state = ParserState::new(
            Arc::new(test_sentence()),
            system.new_transition_state(false),
            system.label_map().clone(),
        );

        let (extractor, _) = test_extractor();
        let mut registry = WorkspaceRegistry::default();
        extractor.request_workspaces(&mut registry);

        let mut workspace = WorkspaceSet::default();
        workspace.reset(&registry);
        extractor.preprocess(&mut workspace, &state);

        (workspace, state)
    }

    fn group_ids(
        extractor: &EmbeddingFeatureExtractor,
        workspace: &WorkspaceSet,
        state: &ParserState,
    ) -> Result<Vec<Vec<usize>>> {
        let features = extractor.extract_sparse_features(workspace, state)?;
        Ok(features
            .into_iter()
            .map(|group| group.into_iter().map(|feature| feature.id).collect())
            .collect())
    }

    #[test]
    fn declares_its_configuration() {
        let (extractor, _) = test_extractor();

        assert_eq!(extractor.num_embeddings(), 3);
        assert_eq!(extractor.embedding_dims(), vec![64, 32, 32]);
        assert_eq!(extractor.feature_size(0), 5);
        assert_eq!(extractor.feature_size(1), 3);
        assert_eq!(extractor.feature_size(2), 2);

        // Vocabulary sizes include the unknown and outside sentinels.
        assert_eq!(extractor.vocabulary_size(0), 10);
        assert_eq!(extractor.vocabulary_size(1), 8);
        assert_eq!(extractor.vocabulary_size(2), 8);
    }

    #[test]
    fn extracts_features_from_the_initial_state() {
        let (extractor, system) = test_extractor();
        let (workspace, state) = fresh_state(&*system);

        let ids = group_ids(&extractor, &workspace, &state).unwrap();

        // The stack is empty, so stack features are outside the parse.
        assert_eq!(
            ids,
            vec![vec![9, 9, 9, 1, 3], vec![7, 7, 1], vec![7, 7]]
        );
    }

    #[test]
    fn extracts_features_from_a_partial_parse() {
        let (extractor, system) = test_extractor();
        let (workspace, mut state) = fresh_state(&*system);

        // Shift thrice, then attach *kleine* to *Katze*.
        for _ in 0..4 {
            let action = system.next_gold_action(&state);
            system.perform_action(action, &mut state);
        }

        let ids = group_ids(&extractor, &workspace, &state).unwrap();

        assert_eq!(
            ids,
            vec![
                // Katze Die <outside> jagt den
                vec![4, 1, 9, 6, 2],
                // NN ART VVFIN
                vec![2, 1, 4],
                // The left dependent of *Katze* is *kleine* with an ATTR
                // arc; there is no right dependent yet.
                vec![4, 7],
            ]
        );
    }

    #[test]
    fn extraction_is_deterministic() {
        let (extractor, system) = test_extractor();
        let (workspace, state) = fresh_state(&*system);
        let (other_workspace, other_state) = fresh_state(&*system);

        assert_eq!(
            extractor
                .extract_sparse_features(&workspace, &state)
                .unwrap(),
            extractor
                .extract_sparse_features(&other_workspace, &other_state)
                .unwrap()
        );
    }

    #[test]
    fn preprocess_is_idempotent() {
        let (extractor, system) = test_extractor();
        let (mut workspace, state) = fresh_state(&*system);

        let before = workspace.ids(Layer::Word).unwrap().to_owned();
        extractor.preprocess(&mut workspace, &state);
        assert_eq!(workspace.ids(Layer::Word).unwrap(), before.as_slice());
    }

    #[test]
    fn rejects_inconsistent_configurations() {
        let mut context = task_context();
        context.set_param("parser_embedding_dims", "64;32");

        let mut extractor = EmbeddingFeatureExtractor::new("parser");
        assert!(extractor.setup(&context).is_err());

        let mut context = task_context();
        context.set_param("parser_embedding_names", "words;tags;suffixes");
        assert!(extractor.setup(&context).is_err());

        let mut context = task_context();
        context.set_param("parser_features", "stack(0);;stack(0)");
        assert!(extractor.setup(&context).is_err());
    }
}
