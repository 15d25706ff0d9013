//! Batched parsing drivers.
//!
//! A driver keeps a batch of independent sentences in flight: each step
//! applies one action to every live parser state, retires finished
//! sentences, tracks epoch boundaries, and emits the sparse features of
//! the states that will receive the next action. The gold driver applies
//! oracle actions to generate training data; the decoded driver applies
//! the best allowed action under externally computed scores.

use batch::{SentenceBatch, SentenceSource};
use features::{EmbeddingFeatureExtractor, SparseFeature, WorkspaceRegistry, WorkspaceSet};
use lexicon::LexiconCache;
use system::{create_system, ParserState, TransitionSystem};
use task::TaskContext;
use Result;

mod decoded;
pub use self::decoded::{DecodedDriver, DecodedStep, ScoreMatrix};

mod gold;
pub use self::gold::{GoldDriver, GoldStep};

mod scoring;
pub use self::scoring::TokenScoring;

/// The features of one step for a single feature group: one row of
/// feature values per occupied batch slot, in slot order.
pub type GroupFeatures = Vec<Vec<SparseFeature>>;

/// State shared by the parsing drivers.
///
/// Batch size, feature group count, and formalism are fixed at
/// construction. The public drivers serialize whole steps behind a
/// mutual-exclusion lock; nothing here retains state across calls beyond
/// the explicit batch, parser states, and workspaces.
pub(crate) struct ParsingDriver {
    batch: SentenceBatch,
    states: Vec<Option<ParserState>>,
    workspaces: Vec<WorkspaceSet>,
    system: Box<dyn TransitionSystem>,
    extractor: EmbeddingFeatureExtractor,
    registry: WorkspaceRegistry,
    epochs: usize,
    started: bool,
}

impl ParsingDriver {
    pub fn new(
        context: &TaskContext,
        arg_prefix: &str,
        batch_size: usize,
        num_feature_groups: usize,
        lexicons: &LexiconCache,
        source: Box<dyn SentenceSource>,
    ) -> Result<Self> {
        ensure!(batch_size > 0, "batch size must be non-zero");

        let mut extractor = EmbeddingFeatureExtractor::new(arg_prefix);
        extractor.setup(context)?;
        extractor.init(context, lexicons)?;

        let mut system = create_system(context.param_or("transition_system", "arc-standard"))?;
        system.setup(context)?;
        system.init(context, lexicons)?;

        let mut registry = WorkspaceRegistry::default();
        extractor.request_workspaces(&mut registry);

        ensure!(
            num_feature_groups == extractor.num_embeddings(),
            "the feature configuration declares {} groups, the caller {}",
            extractor.num_embeddings(),
            num_feature_groups
        );

        Ok(ParsingDriver {
            batch: SentenceBatch::new(batch_size, source),
            states: vec![None; batch_size],
            workspaces: (0..batch_size).map(|_| WorkspaceSet::default()).collect(),
            system,
            extractor,
            registry,
            epochs: 0,
            started: false,
        })
    }

    /// Retire the sentence in `slot` and load the next one.
    ///
    /// When the source still has a sentence, a fresh parser state is
    /// created for it and the slot's workspace is reset and preprocessed.
    fn advance_sentence(&mut self, slot: usize) -> Result<()> {
        self.states[slot] = None;

        if self.batch.advance_sentence(slot)? {
            let sentence = self
                .batch
                .sentence(slot)
                .expect("advanced slot is empty")
                .clone();
            let state = ParserState::new(
                sentence,
                self.system.new_transition_state(true),
                self.system.label_map().clone(),
            );
            self.workspaces[slot].reset(&self.registry);
            self.extractor.preprocess(&mut self.workspaces[slot], &state);
            self.states[slot] = Some(state);
        }

        Ok(())
    }

    /// Load sentences into `slot` until it holds a non-final state,
    /// skipping sentences that are final before any action, or until the
    /// source is exhausted.
    fn fill_slot(&mut self, slot: usize) -> Result<()> {
        loop {
            debug!("Advancing sentence {}", slot);
            self.advance_sentence(slot)?;
            match self.states[slot] {
                Some(ref state) if self.system.is_final_state(state) => continue,
                _ => return Ok(()),
            }
        }
    }

    /// Fill the batch on the first step.
    ///
    /// Returns true when this step was the initial fill, in which case no
    /// actions are applied. The initial fill does not count as an epoch
    /// boundary.
    fn prepare(&mut self) -> Result<bool> {
        if self.started {
            return Ok(false);
        }

        self.started = true;
        for slot in 0..self.states.len() {
            self.fill_slot(slot)?;
        }

        Ok(true)
    }

    /// Advance slots whose states are final; once every slot is empty,
    /// count an epoch, rewind the corpus, and refill the whole batch.
    fn advance_and_refill(&mut self) -> Result<()> {
        for slot in 0..self.states.len() {
            let is_final = match self.states[slot] {
                Some(ref state) => self.system.is_final_state(state),
                None => false,
            };
            if is_final {
                self.fill_slot(slot)?;
            }
        }

        if self.batch.size() == 0 {
            self.epochs += 1;
            info!("Starting epoch {}", self.epochs);
            self.batch.rewind()?;
            for slot in 0..self.states.len() {
                self.fill_slot(slot)?;
            }
        }

        Ok(())
    }

    /// Extract the features of every occupied slot, in slot order.
    fn extract_features(&self) -> Result<Vec<GroupFeatures>> {
        let mut groups: Vec<GroupFeatures> =
            (0..self.extractor.num_embeddings()).map(|_| Vec::new()).collect();

        for slot in 0..self.states.len() {
            let state = match self.states[slot] {
                Some(ref state) => state,
                None => continue,
            };

            let features = self
                .extractor
                .extract_sparse_features(&self.workspaces[slot], state)?;
            for (group, features) in features.into_iter().enumerate() {
                groups[group].push(features);
            }
        }

        Ok(groups)
    }
}
