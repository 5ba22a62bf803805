pub mod alphabet;
pub mod automaton;
pub mod config;
pub mod data_struct;
pub mod dfa;
pub mod error_handling;
pub mod io;
pub mod language;
pub mod nfa;

const VERSION: &str = "0.0.1";

pub fn version() -> &'static str {
    VERSION
}
