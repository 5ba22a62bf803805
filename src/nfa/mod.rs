pub(crate) mod nfa;

pub use nfa::NondeterministicAutomaton;
