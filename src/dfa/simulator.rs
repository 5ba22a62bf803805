use crate::alphabet::Symbol;
use crate::automaton::StateId;
use crate::dfa::DeterministicAutomaton;

/// Walks a DFA one symbol at a time.
///
/// Once a symbol has no outgoing transition the simulator is stuck and stays
/// stuck until [`DfaSimulator::reset_simulation`].
pub struct DfaSimulator<'a> {
    dfa: &'a DeterministicAutomaton,
    current_state: Option<StateId>,
}

impl<'a> DfaSimulator<'a> {
    pub fn new(dfa: &'a DeterministicAutomaton) -> Self {
        DfaSimulator {
            dfa,
            current_state: Some(dfa.core().start()),
        }
    }

    pub fn reset_simulation(&mut self) {
        self.current_state = Some(self.dfa.core().start());
    }

    pub fn current_state(&self) -> Option<StateId> {
        self.current_state
    }

    // Returns false once the simulation is stuck
    pub fn simulate_single_char(&mut self, input: char) -> bool {
        self.current_state = self
            .current_state
            .and_then(|state| self.dfa.next_state(state, Symbol::from(input)));
        self.current_state.is_some()
    }

    pub fn is_accepting(&self) -> bool {
        self.current_state
            .is_some_and(|state| self.dfa.core().is_final(state))
    }
}
