mod automaton_file;

pub use automaton_file::AutomatonFile;
pub use automaton_file::StateEntry;
pub use automaton_file::StateRef;
pub use automaton_file::TransitionEntry;
