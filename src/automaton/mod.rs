pub(crate) mod automaton;
pub(crate) mod builder;
pub(crate) mod state;

pub use automaton::Automaton;
pub use automaton::AutomatonCore;
pub use builder::AutomatonBuilder;
pub use state::Label;
pub use state::State;
pub use state::StateId;
pub use state::Transition;
pub use state::TransitionId;
