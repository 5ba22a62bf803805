pub(crate) mod dfa;
mod simulator;

pub use dfa::DeterministicAutomaton;
pub use simulator::DfaSimulator;
