//! Batches of sentences read from a rewindable corpus.

use std::sync::Arc;

use sentence::Sentence;

use Result;

/// A rewindable source of sentences.
///
/// Corpus readers implement this trait; the parsing drivers only see the
/// cursor. Exhaustion is signalled by `Ok(None)` and is normal control
/// flow, not an error. `rewind` restores the exact original sentence
/// order.
pub trait SentenceSource {
    fn read_sentence(&mut self) -> Result<Option<Sentence>>;

    fn rewind(&mut self) -> Result<()>;
}

/// An in-memory sentence source.
pub struct VecSource {
    sentences: Vec<Sentence>,
    cursor: usize,
}

impl VecSource {
    pub fn new(sentences: Vec<Sentence>) -> Self {
        VecSource {
            sentences,
            cursor: 0,
        }
    }
}

impl SentenceSource for VecSource {
    fn read_sentence(&mut self) -> Result<Option<Sentence>> {
        match self.sentences.get(self.cursor) {
            Some(sentence) => {
                self.cursor += 1;
                Ok(Some(sentence.clone()))
            }
            None => Ok(None),
        }
    }

    fn rewind(&mut self) -> Result<()> {
        self.cursor = 0;
        Ok(())
    }
}

/// A fixed number of batch slots fed from a sentence source.
///
/// Each slot holds at most one live sentence. Slots are advanced
/// independently; when the source is exhausted, an advanced slot is left
/// empty. Rewinding the source is the epoch boundary and is driven by the
/// caller once every slot is empty.
pub struct SentenceBatch {
    source: Box<dyn SentenceSource>,
    slots: Vec<Option<Arc<Sentence>>>,
}

impl SentenceBatch {
    pub fn new(max_size: usize, source: Box<dyn SentenceSource>) -> Self {
        SentenceBatch {
            source,
            slots: vec![None; max_size],
        }
    }

    pub fn max_size(&self) -> usize {
        self.slots.len()
    }

    /// The number of occupied slots.
    pub fn size(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Load the next sentence into a slot.
    ///
    /// Returns `false` and empties the slot when the source is exhausted.
    pub fn advance_sentence(&mut self, slot: usize) -> Result<bool> {
        self.slots[slot] = self.source.read_sentence()?.map(Arc::new);
        Ok(self.slots[slot].is_some())
    }

    /// Reset the source to the start of the corpus.
    pub fn rewind(&mut self) -> Result<()> {
        self.source.rewind()
    }

    /// The sentence currently loaded in a slot.
    ///
    /// Only valid between an `advance_sentence` on the slot and the next.
    pub fn sentence(&self, slot: usize) -> Option<&Arc<Sentence>> {
        self.slots[slot].as_ref()
    }
}
