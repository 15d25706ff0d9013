use std::sync::Arc;

use lexicon::{LexiconCache, TermFrequencyMap};
use system::{ParserState, TransitionState};
use systems::ArcStandardSystem;
use task::TaskContext;
use Result;

/// A transition-based parsing formalism.
///
/// A transition system defines a fixed space of actions over parser
/// states: which actions are structurally possible, how an action mutates
/// a state, when a state is final, and which action a gold oracle would
/// take. Implementations are selected by name through `create_system`.
pub trait TransitionSystem {
    fn name(&self) -> &'static str;

    /// Read formalism parameters from the task configuration. Called once,
    /// before any parsing.
    fn setup(&mut self, context: &TaskContext) -> Result<()>;

    /// Load formalism resources, such as the arc label vocabulary.
    fn init(&mut self, context: &TaskContext, lexicons: &LexiconCache) -> Result<()>;

    /// The size of the action space. Fixed for a given label vocabulary.
    fn num_actions(&self) -> usize;

    /// Is the action structurally possible in this state?
    fn is_allowed_action(&self, action: usize, state: &ParserState) -> bool;

    /// Apply an action to a state.
    ///
    /// Panics when the action is not allowed: callers must check
    /// `is_allowed_action` first. The gold oracle is trusted to only
    /// produce allowed actions.
    fn perform_action(&self, action: usize, state: &mut ParserState);

    /// Has the state consumed all input and derived a full analysis?
    fn is_final_state(&self, state: &ParserState) -> bool;

    /// The action that extends the state towards the sentence's gold
    /// analysis. Undefined for final states.
    fn next_gold_action(&self, state: &ParserState) -> usize;

    /// Create the formalism-specific extension attached to a fresh state.
    fn new_transition_state(&self, keep_history: bool) -> Box<dyn TransitionState>;

    /// The arc label vocabulary. Only valid after `init`.
    fn label_map(&self) -> &Arc<TermFrequencyMap>;
}

/// Construct a transition system by name.
///
/// The set of formalisms is closed; unknown names are configuration
/// errors.
pub fn create_system(name: &str) -> Result<Box<dyn TransitionSystem>> {
    match name {
        "arc-standard" => Ok(Box::new(ArcStandardSystem::new())),
        _ => bail!("unknown transition system: {}", name),
    }
}

#[cfg(test)]
mod tests {
    use super::create_system;

    #[test]
    fn creates_systems_by_name() {
        assert_eq!(create_system("arc-standard").unwrap().name(), "arc-standard");
        assert!(create_system("arc-sideways").is_err());
    }
}
