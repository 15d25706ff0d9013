use std::sync::Mutex;

use batch::SentenceSource;
use driver::{GroupFeatures, ParsingDriver};
use lexicon::LexiconCache;
use task::TaskContext;
use Result;

/// The output of one gold step.
#[derive(Debug)]
pub struct GoldStep {
    /// The features of every occupied slot, one matrix per feature group.
    pub features: Vec<GroupFeatures>,
    /// The next gold action of every occupied slot, aligned with the
    /// feature rows: the action a trained model should predict from that
    /// row.
    pub gold_actions: Vec<usize>,
    /// The number of completed corpus traversals.
    pub epochs: usize,
}

/// Driver that always applies the gold action.
///
/// Used to generate training data: every step emits the features of the
/// live states together with the oracle actions that advance them. The
/// oracle is trusted to produce allowed actions only, so no legality
/// checks are made.
pub struct GoldDriver {
    inner: Mutex<ParsingDriver>,
}

impl GoldDriver {
    pub fn new(
        context: &TaskContext,
        arg_prefix: &str,
        batch_size: usize,
        num_feature_groups: usize,
        lexicons: &LexiconCache,
        source: Box<dyn SentenceSource>,
    ) -> Result<Self> {
        Ok(GoldDriver {
            inner: Mutex::new(ParsingDriver::new(
                context,
                arg_prefix,
                batch_size,
                num_feature_groups,
                lexicons,
                source,
            )?),
        })
    }

    pub fn num_actions(&self) -> usize {
        self.inner
            .lock()
            .expect("gold driver lock poisoned")
            .system
            .num_actions()
    }

    /// Advance every live state by its gold action.
    ///
    /// Steps are fully serialized: concurrent callers block until the
    /// whole step, including refilling and feature extraction, finished.
    pub fn step(&self) -> Result<GoldStep> {
        let mut inner = self.inner.lock().expect("gold driver lock poisoned");
        let driver = &mut *inner;

        if !driver.prepare()? {
            for slot in 0..driver.states.len() {
                let action = match driver.states[slot] {
                    Some(ref state) => driver.system.next_gold_action(state),
                    None => continue,
                };

                let state = driver.states[slot].as_mut().expect("live state vanished");
                driver.system.perform_action(action, state);
            }

            driver.advance_and_refill()?;
        }

        let features = driver.extract_features()?;

        let mut gold_actions = Vec::with_capacity(driver.batch.size());
        for state in &driver.states {
            if let Some(ref state) = *state {
                gold_actions.push(driver.system.next_gold_action(state));
            }
        }

        Ok(GoldStep {
            features,
            gold_actions,
            epochs: driver.epochs,
        })
    }
}

#[cfg(test)]
mod tests {
    use batch::VecSource;
    use lexicon::LexiconCache;
    use systems::util::{task_context, test_sentence, trivial_sentence};

    use super::GoldDriver;

    fn gold_driver(batch_size: usize, corpus: Vec<::sentence::Sentence>) -> GoldDriver {
        let context = task_context();
        let lexicons = LexiconCache::new();
        GoldDriver::new(
            &context,
            "parser",
            batch_size,
            3,
            &lexicons,
            Box::new(VecSource::new(corpus)),
        ).unwrap()
    }

    #[test]
    fn rejects_feature_group_mismatches() {
        let context = task_context();
        let lexicons = LexiconCache::new();
        assert!(
            GoldDriver::new(
                &context,
                "parser",
                2,
                4,
                &lexicons,
                Box::new(VecSource::new(vec![trivial_sentence()])),
            ).is_err()
        );
    }

    #[test]
    fn counts_epochs_over_a_small_corpus() {
        // Three one-token sentences in a two-slot batch.
        let driver = gold_driver(
            2,
            vec![trivial_sentence(), trivial_sentence(), trivial_sentence()],
        );

        // Initial fill: two live sentences, nothing applied yet.
        let step = driver.step().unwrap();
        assert_eq!(step.epochs, 0);
        assert_eq!(step.gold_actions, vec![0, 0]);
        assert_eq!(step.features[0].len(), 2);

        // Both shifts finish their sentences; slot 0 receives the third
        // sentence, slot 1 hits the end of the corpus.
        let step = driver.step().unwrap();
        assert_eq!(step.epochs, 0);
        assert_eq!(step.gold_actions, vec![0]);
        assert_eq!(step.features[0].len(), 1);

        // The last sentence finishes: the batch drains, the corpus is
        // rewound, and both slots hold sentences one and two again.
        let step = driver.step().unwrap();
        assert_eq!(step.epochs, 1);
        assert_eq!(step.gold_actions, vec![0, 0]);
        assert_eq!(step.features[0].len(), 2);

        // The second traversal proceeds like the first.
        let step = driver.step().unwrap();
        assert_eq!(step.epochs, 1);
        assert_eq!(step.features[0].len(), 1);
        let step = driver.step().unwrap();
        assert_eq!(step.epochs, 2);
        assert_eq!(step.features[0].len(), 2);
    }

    #[test]
    fn emits_the_oracle_action_sequence() {
        let driver = gold_driver(1, vec![test_sentence()]);

        let mut actions = Vec::new();
        loop {
            let step = driver.step().unwrap();
            if step.epochs > 0 {
                break;
            }
            assert_eq!(step.gold_actions.len(), 1);
            actions.extend(step.gold_actions);
        }

        // The derivation of the test sentence takes 13 actions; compare
        // against the oracle sequence (shift = 0, left-arc = odd,
        // right-arc = even).
        assert_eq!(actions.len(), 13);
        assert_eq!(
            actions,
            vec![0, 0, 0, 9, 7, 0, 3, 0, 0, 7, 6, 0, 12]
        );
    }
}
