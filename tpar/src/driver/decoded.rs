use std::sync::Mutex;

use batch::SentenceSource;
use driver::{GroupFeatures, ParsingDriver, TokenScoring};
use lexicon::LexiconCache;
use sentence::Sentence;
use task::TaskContext;
use Result;

/// A dense, row-major matrix of action scores.
///
/// Rows correspond to the occupied batch slots in the order their
/// features were emitted on the previous step; columns to actions.
pub struct ScoreMatrix<'a> {
    scores: &'a [f32],
    num_actions: usize,
}

impl<'a> ScoreMatrix<'a> {
    pub fn new(scores: &'a [f32], num_actions: usize) -> Result<Self> {
        ensure!(num_actions > 0, "score matrix without columns");
        ensure!(
            scores.len() % num_actions == 0,
            "a score matrix of {} values cannot have rows of {} actions",
            scores.len(),
            num_actions
        );

        Ok(ScoreMatrix {
            scores,
            num_actions,
        })
    }

    pub fn num_rows(&self) -> usize {
        self.scores.len() / self.num_actions
    }

    pub fn num_actions(&self) -> usize {
        self.num_actions
    }

    pub fn row(&self, row: usize) -> &[f32] {
        &self.scores[row * self.num_actions..(row + 1) * self.num_actions]
    }
}

/// The output of one decoded step.
#[derive(Debug)]
pub struct DecodedStep {
    /// The features of every occupied slot, one matrix per feature group.
    pub features: Vec<GroupFeatures>,
    /// The number of completed corpus traversals.
    pub epochs: usize,
    /// Tokens scored in sentences that finished during this step.
    pub num_tokens: usize,
    /// Scored tokens whose inferred analysis was correct.
    pub num_correct: usize,
    /// The arc-annotated sentences that finished during this step.
    pub documents: Vec<Sentence>,
}

/// Driver that applies the best-scoring allowed action.
///
/// Used for decoding and evaluation: the caller computes a score for
/// every action of every live state from the features emitted on the
/// previous step, and the driver applies, per state, the allowed action
/// with the highest score. Ties are broken towards the lowest action
/// index. Whenever a sentence finishes, its token accuracy is tallied
/// under the configured scoring policy and the annotated sentence is
/// emitted with the step's output.
pub struct DecodedDriver {
    inner: Mutex<ParsingDriver>,
    scoring: TokenScoring,
}

impl DecodedDriver {
    pub fn new(
        context: &TaskContext,
        arg_prefix: &str,
        batch_size: usize,
        num_feature_groups: usize,
        lexicons: &LexiconCache,
        source: Box<dyn SentenceSource>,
    ) -> Result<Self> {
        let scoring = context
            .param_or(&format!("{}_scoring", arg_prefix), "")
            .parse()?;

        Ok(DecodedDriver {
            inner: Mutex::new(ParsingDriver::new(
                context,
                arg_prefix,
                batch_size,
                num_feature_groups,
                lexicons,
                source,
            )?),
            scoring,
        })
    }

    pub fn num_actions(&self) -> usize {
        self.inner
            .lock()
            .expect("decoded driver lock poisoned")
            .system
            .num_actions()
    }

    pub fn scoring(&self) -> TokenScoring {
        self.scoring
    }

    /// Advance every live state by its best-scoring allowed action.
    ///
    /// Steps are fully serialized: concurrent callers block until the
    /// whole step, including refilling and feature extraction, finished.
    /// The score matrix is ignored on the first step, which only fills
    /// the batch.
    pub fn step(&self, scores: &ScoreMatrix) -> Result<DecodedStep> {
        let mut inner = self.inner.lock().expect("decoded driver lock poisoned");
        let driver = &mut *inner;

        let mut num_tokens = 0;
        let mut num_correct = 0;
        let mut documents = Vec::new();

        if !driver.prepare()? {
            ensure!(
                scores.num_actions() == driver.system.num_actions(),
                "score matrix has {} actions, the transition system {}",
                scores.num_actions(),
                driver.system.num_actions()
            );
            ensure!(
                scores.num_rows() == driver.batch.size(),
                "score matrix has {} rows, the batch {} live states",
                scores.num_rows(),
                driver.batch.size()
            );

            let mut batch_index = 0;
            for slot in 0..driver.states.len() {
                let action = match driver.states[slot] {
                    Some(ref state) => {
                        let mut best: Option<(usize, f32)> = None;
                        for (action, &score) in scores.row(batch_index).iter().enumerate() {
                            if !driver.system.is_allowed_action(action, state) {
                                continue;
                            }

                            if best.map_or(true, |(_, best_score)| score > best_score) {
                                best = Some((action, score));
                            }
                        }

                        match best {
                            Some((action, _)) => action,
                            None => bail!("no action is allowed in slot {}", slot),
                        }
                    }
                    None => continue,
                };

                {
                    let state = driver.states[slot].as_mut().expect("live state vanished");
                    driver.system.perform_action(action, state);
                }

                let state = driver.states[slot].as_ref().expect("live state vanished");
                if driver.system.is_final_state(state) {
                    for (idx, token) in state.sentence().iter().enumerate() {
                        if self.scoring.score_token(token.form(), token.pos()) {
                            num_tokens += 1;
                            if state.is_token_correct(idx + 1) {
                                num_correct += 1;
                            }
                        }
                    }

                    let mut document = state.sentence().clone();
                    state.add_parse_to_sentence(&mut document);
                    documents.push(document);
                }

                batch_index += 1;
            }

            driver.advance_and_refill()?;
        }

        let features = driver.extract_features()?;

        Ok(DecodedStep {
            features,
            epochs: driver.epochs,
            num_tokens,
            num_correct,
            documents,
        })
    }
}
