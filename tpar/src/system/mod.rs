//! Parser states and the transition system interface.

mod state;
pub use self::state::{ParserState, TransitionState};

mod trans_system;
pub use self::trans_system::{create_system, TransitionSystem};
