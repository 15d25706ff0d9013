use std::sync::Arc;

use lexicon::{LexiconCache, TermFrequencyMap};
use system::{ParserState, TransitionState, TransitionSystem};
use task::TaskContext;
use Result;

const SHIFT: usize = 0;

enum Action {
    Shift,
    LeftArc(usize),
    RightArc(usize),
}

fn decode(action: usize) -> Action {
    if action == SHIFT {
        Action::Shift
    } else if action % 2 == 1 {
        Action::LeftArc((action - 1) / 2)
    } else {
        Action::RightArc((action - 2) / 2)
    }
}

fn left_arc(label: usize) -> usize {
    1 + 2 * label
}

fn right_arc(label: usize) -> usize {
    2 + 2 * label
}

/// The arc-standard transition system.
///
/// Arc-standard derives a projective dependency tree using shift,
/// left-arc, and right-arc actions over a stack and an input buffer. With
/// `L` arc labels, the action space has `1 + 2L` actions: action `0`
/// shifts, odd actions are left-arcs, even non-zero actions right-arcs.
pub struct ArcStandardSystem {
    label_map: Option<Arc<TermFrequencyMap>>,
}

impl ArcStandardSystem {
    pub fn new() -> Self {
        ArcStandardSystem { label_map: None }
    }

    fn labels(&self) -> &Arc<TermFrequencyMap> {
        self.label_map
            .as_ref()
            .expect("transition system used before init")
    }

    /// The gold label of a token's incoming arc, falling back to the first
    /// label when the annotated relation is not in the label vocabulary.
    fn gold_arc_label(&self, state: &ParserState, token: usize) -> usize {
        let label = state.gold_label(token);
        if label < self.labels().len() {
            label
        } else {
            0
        }
    }

    /// Are all gold dependents of `head` in the consumed part of the
    /// input?
    fn done_children_right_of(state: &ParserState, head: usize) -> bool {
        let mut token = state.input(0);
        while let Some(t) = token {
            if state.gold_head(t) == head {
                return false;
            }
            token = if t < state.n_tokens() { Some(t + 1) } else { None };
        }

        true
    }
}

impl Default for ArcStandardSystem {
    fn default() -> Self {
        ArcStandardSystem::new()
    }
}

impl TransitionSystem for ArcStandardSystem {
    fn name(&self) -> &'static str {
        "arc-standard"
    }

    fn setup(&mut self, _context: &TaskContext) -> Result<()> {
        Ok(())
    }

    fn init(&mut self, context: &TaskContext, lexicons: &LexiconCache) -> Result<()> {
        let label_map = lexicons.load(context.input_path("label-map")?)?;
        ensure!(!label_map.is_empty(), "the label map is empty");
        self.label_map = Some(label_map);
        Ok(())
    }

    fn num_actions(&self) -> usize {
        1 + 2 * self.labels().len()
    }

    fn is_allowed_action(&self, action: usize, state: &ParserState) -> bool {
        if action >= self.num_actions() {
            return false;
        }

        match decode(action) {
            Action::Shift => !state.end_of_input(),
            Action::LeftArc(_) | Action::RightArc(_) => state.stack_len() > 1,
        }
    }

    fn perform_action(&self, action: usize, state: &mut ParserState) {
        assert!(
            self.is_allowed_action(action, state),
            "action {} is not allowed in this state",
            action
        );

        match decode(action) {
            Action::Shift => {
                let next = state.input(0).expect("shift without input");
                state.push(next);
                state.advance();
            }
            Action::LeftArc(label) => {
                let s0 = state.pop().expect("left-arc on an empty stack");
                let s1 = state.pop().expect("left-arc on a singleton stack");
                state.add_arc(s1, s0, label);
                state.push(s0);
            }
            Action::RightArc(label) => {
                let s0 = state.pop().expect("right-arc on an empty stack");
                let s1 = state.stack(0).expect("right-arc on a singleton stack");
                state.add_arc(s0, s1, label);
            }
        }

        state.record_action(action);
    }

    fn is_final_state(&self, state: &ParserState) -> bool {
        state.end_of_input() && state.stack_len() < 2
    }

    fn next_gold_action(&self, state: &ParserState) -> usize {
        if state.stack_len() < 2 {
            return SHIFT;
        }

        let s0 = state.stack(0).expect("stack underflow");
        let s1 = state.stack(1).expect("stack underflow");

        if state.gold_head(s0) == s1 && Self::done_children_right_of(state, s0) {
            return right_arc(self.gold_arc_label(state, s0));
        }

        if state.gold_head(s1) == s0 {
            return left_arc(self.gold_arc_label(state, s1));
        }

        SHIFT
    }

    fn new_transition_state(&self, keep_history: bool) -> Box<dyn TransitionState> {
        Box::new(ArcStandardState::new(keep_history))
    }

    fn label_map(&self) -> &Arc<TermFrequencyMap> {
        self.labels()
    }
}

/// Per-state extension of the arc-standard system.
///
/// A token is correct when its inferred head and arc label match the gold
/// analysis; a token left unattached is correct when its gold head is the
/// root.
pub struct ArcStandardState {
    history: Option<Vec<usize>>,
}

impl ArcStandardState {
    fn new(keep_history: bool) -> Self {
        ArcStandardState {
            history: if keep_history { Some(Vec::new()) } else { None },
        }
    }
}

impl TransitionState for ArcStandardState {
    fn clone_box(&self) -> Box<dyn TransitionState> {
        Box::new(ArcStandardState {
            history: self.history.clone(),
        })
    }

    fn is_token_correct(&self, state: &ParserState, index: usize) -> bool {
        match state.head(index) {
            Some(head) => {
                state.gold_head(index) == head && state.label(index) == Some(state.gold_label(index))
            }
            None => state.gold_head(index) == 0,
        }
    }

    fn record(&mut self, action: usize) {
        if let Some(ref mut history) = self.history {
            history.push(action);
        }
    }

    fn history(&self) -> &[usize] {
        match self.history {
            Some(ref history) => history,
            None => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use system::{ParserState, TransitionSystem};
    use systems::util::{label, labels, test_sentence, trivial_sentence};

    use super::{left_arc, right_arc, ArcStandardSystem, SHIFT};

    fn test_system() -> ArcStandardSystem {
        ArcStandardSystem {
            label_map: Some(labels()),
        }
    }

    fn test_state(system: &ArcStandardSystem) -> ParserState {
        ParserState::new(
            Arc::new(test_sentence()),
            system.new_transition_state(true),
            labels(),
        )
    }

    /// Tokens are partitioned over the stack, the buffer, and the set of
    /// attached tokens.
    fn assert_partition(state: &ParserState) {
        for token in 1..state.n_tokens() + 1 {
            let mut occurrences = 0;
            occurrences += (0..state.stack_len())
                .filter(|&i| state.stack(i) == Some(token))
                .count();
            if state.input(0).map_or(false, |next| token >= next) {
                occurrences += 1;
            }
            if state.head(token).is_some() {
                occurrences += 1;
            }

            assert_eq!(occurrences, 1, "token {} is not in exactly one place", token);
        }
    }

    #[test]
    fn action_space_size() {
        let system = test_system();
        assert_eq!(system.num_actions(), 13);
    }

    #[test]
    fn gold_derivation_reproduces_reference_arcs() {
        let system = test_system();
        let mut state = test_state(&system);

        let mut actions = Vec::new();
        while !system.is_final_state(&state) {
            let action = system.next_gold_action(&state);
            system.perform_action(action, &mut state);
            actions.push(action);
            assert_partition(&state);
        }

        assert_eq!(
            actions,
            vec![
                SHIFT,
                SHIFT,
                SHIFT,
                left_arc(label("ATTR")),
                left_arc(label("DET")),
                SHIFT,
                left_arc(label("SUBJ")),
                SHIFT,
                SHIFT,
                left_arc(label("DET")),
                right_arc(label("OBJ")),
                SHIFT,
                right_arc(label("-PUNCT-")),
            ]
        );

        for token in 1..state.n_tokens() + 1 {
            assert_eq!(state.head(token).unwrap_or(0), state.gold_head(token));
            assert!(state.is_token_correct(token));
        }

        assert_eq!(state.history(), actions.as_slice());
    }

    #[test]
    fn allowed_actions_preserve_the_partition_invariant() {
        let system = test_system();
        let mut state = test_state(&system);

        while !system.is_final_state(&state) {
            for action in 0..system.num_actions() {
                if !system.is_allowed_action(action, &state) {
                    continue;
                }

                let mut explored = state.clone();
                system.perform_action(action, &mut explored);
                assert_partition(&explored);
            }

            let action = system.next_gold_action(&state);
            assert!(system.is_allowed_action(action, &state));
            system.perform_action(action, &mut state);
        }
    }

    #[test]
    fn single_token_sentences_shift_once() {
        let system = test_system();
        let mut state = ParserState::new(
            Arc::new(trivial_sentence()),
            system.new_transition_state(false),
            labels(),
        );

        assert!(!system.is_final_state(&state));
        assert_eq!(system.next_gold_action(&state), SHIFT);
        system.perform_action(SHIFT, &mut state);
        assert!(system.is_final_state(&state));
        assert_eq!(state.head(1), None);
        assert!(state.is_token_correct(1));
        assert_eq!(state.history(), &[] as &[usize]);
    }

    #[test]
    #[should_panic(expected = "not allowed")]
    fn disallowed_action_panics() {
        let system = test_system();
        let mut state = test_state(&system);

        // Arc actions require two stack tokens.
        system.perform_action(left_arc(0), &mut state);
    }
}
