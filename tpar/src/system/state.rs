use std::sync::Arc;

use lexicon::TermFrequencyMap;
use sentence::Sentence;

/// Formalism-specific extension of a parser state.
///
/// A transition system attaches one of these to every state it creates,
/// e.g. to record the applied action history or to define what counts as
/// a correctly parsed token for its formalism.
pub trait TransitionState {
    fn clone_box(&self) -> Box<dyn TransitionState>;

    /// Is the inferred analysis of the given token correct?
    fn is_token_correct(&self, state: &ParserState, index: usize) -> bool;

    /// Record an applied action.
    fn record(&mut self, action: usize);

    /// The recorded action history, empty when history keeping is off.
    fn history(&self) -> &[usize];
}

/// The state of a transition-based parser for one sentence.
///
/// Token identifiers are 1-based, `0` denotes the artificial root node.
/// Every token is in exactly one of the stack, the unconsumed input, or
/// the set of consumed tokens. Arcs are added monotonically and are never
/// revoked.
pub struct ParserState {
    sentence: Arc<Sentence>,
    next: usize,
    stack: Vec<usize>,
    heads: Vec<Option<usize>>,
    labels: Vec<Option<usize>>,
    gold_heads: Vec<usize>,
    gold_labels: Vec<usize>,
    label_map: Arc<TermFrequencyMap>,
    transition_state: Box<dyn TransitionState>,
}

impl ParserState {
    pub fn new(
        sentence: Arc<Sentence>,
        transition_state: Box<dyn TransitionState>,
        label_map: Arc<TermFrequencyMap>,
    ) -> Self {
        let n_tokens = sentence.len();

        let mut gold_heads = vec![0; n_tokens + 1];
        let mut gold_labels = vec![label_map.len(); n_tokens + 1];
        for (idx, token) in sentence.iter().enumerate() {
            gold_heads[idx + 1] = token.head().unwrap_or(0);
            if let Some(rel) = token.head_rel() {
                if let Some(label) = label_map.lookup(rel) {
                    gold_labels[idx + 1] = label;
                }
            }
        }

        ParserState {
            sentence,
            next: 1,
            stack: Vec::new(),
            heads: vec![None; n_tokens + 1],
            labels: vec![None; n_tokens + 1],
            gold_heads,
            gold_labels,
            label_map,
            transition_state,
        }
    }

    pub fn sentence(&self) -> &Sentence {
        &self.sentence
    }

    pub fn n_tokens(&self) -> usize {
        self.sentence.len()
    }

    pub fn label_map(&self) -> &Arc<TermFrequencyMap> {
        &self.label_map
    }

    /// Is the input buffer exhausted?
    pub fn end_of_input(&self) -> bool {
        self.next > self.n_tokens()
    }

    /// The token `offset` positions into the unconsumed input, if any.
    pub fn input(&self, offset: usize) -> Option<usize> {
        let token = self.next + offset;
        if token <= self.n_tokens() {
            Some(token)
        } else {
            None
        }
    }

    /// Consume the next input token.
    pub fn advance(&mut self) {
        debug_assert!(!self.end_of_input(), "advancing past the end of input");
        self.next += 1;
    }

    pub fn stack_len(&self) -> usize {
        self.stack.len()
    }

    /// The token `offset` positions from the top of the stack, if any.
    pub fn stack(&self, offset: usize) -> Option<usize> {
        if offset < self.stack.len() {
            Some(self.stack[self.stack.len() - 1 - offset])
        } else {
            None
        }
    }

    pub fn push(&mut self, token: usize) {
        self.stack.push(token);
    }

    pub fn pop(&mut self) -> Option<usize> {
        self.stack.pop()
    }

    /// Attach `dependent` to `head` with the given label.
    ///
    /// A token is attached at most once; the arc is never revoked.
    pub fn add_arc(&mut self, dependent: usize, head: usize, label: usize) {
        debug_assert!(
            self.heads[dependent].is_none(),
            "token {} is already attached",
            dependent
        );
        self.heads[dependent] = Some(head);
        self.labels[dependent] = Some(label);
    }

    /// The inferred head of a token, `None` when it is unattached.
    pub fn head(&self, token: usize) -> Option<usize> {
        self.heads[token]
    }

    /// The label of a token's inferred arc.
    pub fn label(&self, token: usize) -> Option<usize> {
        self.labels[token]
    }

    /// The gold head of a token, `0` for tokens headed by the root.
    pub fn gold_head(&self, token: usize) -> usize {
        self.gold_heads[token]
    }

    pub fn gold_label(&self, token: usize) -> usize {
        self.gold_labels[token]
    }

    pub fn record_action(&mut self, action: usize) {
        self.transition_state.record(action);
    }

    pub fn history(&self) -> &[usize] {
        self.transition_state.history()
    }

    /// Is the inferred analysis of `token` correct? The notion of
    /// correctness is defined by the transition system that created this
    /// state.
    pub fn is_token_correct(&self, token: usize) -> bool {
        self.transition_state.is_token_correct(self, token)
    }

    /// Copy the inferred arcs into a sentence.
    ///
    /// This is a pure projection: the state itself is left untouched.
    /// Unattached tokens are headed by the root.
    pub fn add_parse_to_sentence(&self, sentence: &mut Sentence) {
        for (idx, token) in sentence.tokens_mut().iter_mut().enumerate() {
            token.set_head(Some(self.heads[idx + 1].unwrap_or(0)));
            match self.labels[idx + 1] {
                Some(label) => {
                    token.set_head_rel(self.label_map.term(label).map(str::to_owned))
                }
                None => token.set_head_rel(None::<String>),
            }
        }
    }
}

impl Clone for ParserState {
    fn clone(&self) -> Self {
        ParserState {
            sentence: self.sentence.clone(),
            next: self.next,
            stack: self.stack.clone(),
            heads: self.heads.clone(),
            labels: self.labels.clone(),
            gold_heads: self.gold_heads.clone(),
            gold_labels: self.gold_labels.clone(),
            label_map: self.label_map.clone(),
            transition_state: self.transition_state.clone_box(),
        }
    }
}
