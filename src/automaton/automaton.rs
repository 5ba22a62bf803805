use crate::alphabet::{Alphabet, Symbol};
use crate::automaton::state::{State, StateId, Transition, TransitionId};
use crate::dfa::DeterministicAutomaton;
use crate::error_handling::Error::InvariantViolation;
use crate::error_handling::Result;
use crate::nfa::NondeterministicAutomaton;
use indexmap::{IndexMap, IndexSet};
use std::collections::HashSet;
use std::fmt::{Debug, Formatter};

/// Validated, read-oriented view over an automaton's states, alphabet and
/// transitions. Shared by the deterministic and nondeterministic variants.
#[derive(Clone)]
pub struct AutomatonCore {
    states: Vec<State>,
    alphabet: Alphabet,
    transitions: Vec<Transition>,
    start: StateId,
    finals: IndexSet<StateId>,
}

impl AutomatonCore {
    pub fn new(
        states: Vec<State>,
        alphabet: Alphabet,
        transitions: Vec<Transition>,
        start: StateId,
        finals: impl IntoIterator<Item = StateId>,
    ) -> Result<Self> {
        let core = Self::new_unchecked(states, alphabet, transitions, start, finals);
        core.validate()?;
        Ok(core)
    }

    // Used by the algorithms, whose output is well formed by construction
    pub(crate) fn new_unchecked(
        states: Vec<State>,
        alphabet: Alphabet,
        transitions: Vec<Transition>,
        start: StateId,
        finals: impl IntoIterator<Item = StateId>,
    ) -> Self {
        AutomatonCore {
            states,
            alphabet,
            transitions,
            start,
            finals: finals.into_iter().collect(),
        }
    }

    fn validate(&self) -> Result<()> {
        let mut state_ids = HashSet::with_capacity(self.states.len());
        for state in &self.states {
            if state.id() == StateId::MAX {
                return Err(InvariantViolation(format!("state id {} is out of range", state.id())));
            }
            if !state_ids.insert(state.id()) {
                return Err(InvariantViolation(format!(
                    "state id {} appears more than once",
                    state.id()
                )));
            }
        }

        let initial_states: Vec<&State> = self.states.iter().filter(|s| s.is_initial()).collect();
        match initial_states.as_slice() {
            [initial] if initial.id() == self.start => {}
            [initial] => {
                return Err(InvariantViolation(format!(
                    "initial state {} does not match start state {}",
                    initial.id(),
                    self.start
                )))
            }
            [] => return Err(InvariantViolation("no initial state".to_string())),
            _ => return Err(InvariantViolation("more than one initial state".to_string())),
        }

        for state in &self.states {
            if state.is_final() != self.finals.contains(&state.id()) {
                return Err(InvariantViolation(format!(
                    "final flag of state {} disagrees with the final set",
                    state.id()
                )));
            }
        }
        if let Some(unknown) = self.finals.iter().find(|id| !state_ids.contains(*id)) {
            return Err(InvariantViolation(format!(
                "final set names unknown state {}",
                unknown
            )));
        }

        let mut transition_ids = HashSet::with_capacity(self.transitions.len());
        for transition in &self.transitions {
            if transition.id() == TransitionId::MAX {
                return Err(InvariantViolation(format!(
                    "transition id {} is out of range",
                    transition.id()
                )));
            }
            if !transition_ids.insert(transition.id()) {
                return Err(InvariantViolation(format!(
                    "transition id {} appears more than once",
                    transition.id()
                )));
            }
            for endpoint in [transition.from(), transition.to()] {
                if !state_ids.contains(&endpoint) {
                    return Err(InvariantViolation(format!(
                        "transition {} references unknown state {}",
                        transition.id(),
                        endpoint
                    )));
                }
            }
            if let Some(symbol) = transition
                .label()
                .into_iter()
                .flatten()
                .find(|symbol| !self.alphabet.contains(**symbol))
            {
                return Err(InvariantViolation(format!(
                    "transition {} uses symbol '{}' outside the alphabet",
                    transition.id(),
                    symbol
                )));
            }
        }

        Ok(())
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn start(&self) -> StateId {
        self.start
    }

    pub fn finals(&self) -> &IndexSet<StateId> {
        &self.finals
    }

    pub fn state(&self, id: StateId) -> Option<&State> {
        self.states.iter().find(|state| state.id() == id)
    }

    pub fn is_final(&self, id: StateId) -> bool {
        self.finals.contains(&id)
    }

    pub fn outgoing(&self, from: StateId) -> impl Iterator<Item = &Transition> + '_ {
        self.transitions.iter().filter(move |t| t.from() == from)
    }

    /// Direct targets for every state and symbol, in state and alphabet order.
    /// Epsilon transitions are not part of the table.
    pub fn transition_table(&self) -> IndexMap<StateId, IndexMap<Symbol, Vec<StateId>>> {
        let mut table = IndexMap::new();
        for state in &self.states {
            let mut row: IndexMap<Symbol, Vec<StateId>> = IndexMap::new();
            for symbol in self.alphabet.iter() {
                let targets = self
                    .outgoing(state.id())
                    .filter(|t| t.carries(symbol))
                    .map(|t| t.to())
                    .collect();
                row.insert(symbol, targets);
            }
            table.insert(state.id(), row);
        }
        table
    }

    pub(crate) fn flip_finals(&mut self) {
        let mut finals = IndexSet::new();
        for state in self.states.iter_mut() {
            state.set_final(!state.is_final());
            if state.is_final() {
                finals.insert(state.id());
            }
        }
        self.finals = finals;
    }
}

impl Debug for AutomatonCore {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "( start: {:?}, finals: {:?}, alphabet: {}, states: {:?}, transitions: {{\n",
            self.start, self.finals, self.alphabet, self.states
        )?;
        for transition in &self.transitions {
            write!(f, "\t{:?}\n", transition)?;
        }
        write!(f, "}} )")
    }
}

/// An automaton exported from a builder or produced by an algorithm.
#[derive(Clone, Debug)]
pub enum Automaton {
    Deterministic(DeterministicAutomaton),
    Nondeterministic(NondeterministicAutomaton),
}

impl Automaton {
    pub fn core(&self) -> &AutomatonCore {
        match self {
            Automaton::Deterministic(dfa) => dfa.core(),
            Automaton::Nondeterministic(nfa) => nfa.core(),
        }
    }

    pub fn is_deterministic(&self) -> bool {
        matches!(self, Automaton::Deterministic(_))
    }

    pub fn run(&self, input: &str) -> bool {
        match self {
            Automaton::Deterministic(dfa) => dfa.run(input),
            Automaton::Nondeterministic(nfa) => nfa.run(input),
        }
    }

    /// Automaton accepting exactly the words over the alphabet this one rejects.
    pub fn complement(&self) -> DeterministicAutomaton {
        match self {
            Automaton::Deterministic(dfa) => dfa.complement(),
            Automaton::Nondeterministic(nfa) => nfa.negate(),
        }
    }

    /// Determinizes a nondeterministic automaton; a deterministic one is returned as is.
    pub fn into_deterministic(self) -> DeterministicAutomaton {
        match self {
            Automaton::Deterministic(dfa) => dfa,
            Automaton::Nondeterministic(nfa) => nfa.to_deterministic(),
        }
    }
}

impl From<DeterministicAutomaton> for Automaton {
    fn from(dfa: DeterministicAutomaton) -> Self {
        Automaton::Deterministic(dfa)
    }
}

impl From<NondeterministicAutomaton> for Automaton {
    fn from(nfa: NondeterministicAutomaton) -> Self {
        Automaton::Nondeterministic(nfa)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handling::Error;

    fn two_states() -> Vec<State> {
        vec![State::new(0, false, true), State::new(1, true, false)]
    }

    fn ab() -> Alphabet {
        "ab".chars().collect()
    }

    #[test]
    fn test_valid_core() -> Result<()> {
        let transitions = vec![Transition::new(0, 0, 1, Some(vec![Symbol::new('a')]))];
        let core = AutomatonCore::new(two_states(), ab(), transitions, 0, [1])?;
        assert_eq!(core.start(), 0);
        assert!(core.is_final(1));
        assert_eq!(core.outgoing(0).count(), 1);
        assert_eq!(core.transition_table()[&0][&Symbol::new('a')], vec![1]);
        assert!(core.transition_table()[&0][&Symbol::new('b')].is_empty());
        Ok(())
    }

    #[test]
    fn test_start_must_match_initial_flag() {
        let result = AutomatonCore::new(two_states(), ab(), Vec::new(), 1, [1]);
        assert!(matches!(result, Err(Error::InvariantViolation(_))));
    }

    #[test]
    fn test_two_initial_states_rejected() {
        let states = vec![State::new(0, false, true), State::new(1, true, true)];
        let result = AutomatonCore::new(states, ab(), Vec::new(), 0, [1]);
        assert!(matches!(result, Err(Error::InvariantViolation(_))));
    }

    #[test]
    fn test_final_flags_must_agree() {
        let result = AutomatonCore::new(two_states(), ab(), Vec::new(), 0, [0, 1]);
        assert!(matches!(result, Err(Error::InvariantViolation(_))));
        let result = AutomatonCore::new(two_states(), ab(), Vec::new(), 0, []);
        assert!(matches!(result, Err(Error::InvariantViolation(_))));
    }

    #[test]
    fn test_dangling_transition_rejected() {
        let transitions = vec![Transition::new(0, 0, 7, Some(vec![Symbol::new('a')]))];
        let result = AutomatonCore::new(two_states(), ab(), transitions, 0, [1]);
        assert!(matches!(result, Err(Error::InvariantViolation(_))));
    }

    #[test]
    fn test_symbol_outside_alphabet_rejected() {
        let transitions = vec![Transition::new(0, 0, 1, Some(vec![Symbol::new('z')]))];
        let result = AutomatonCore::new(two_states(), ab(), transitions, 0, [1]);
        assert!(matches!(result, Err(Error::InvariantViolation(_))));
    }

    #[test]
    fn test_ids_need_a_successor() {
        let states = vec![State::new(StateId::MAX, false, true)];
        let result = AutomatonCore::new(states, ab(), Vec::new(), StateId::MAX, Vec::new());
        assert!(matches!(result, Err(Error::InvariantViolation(_))));

        let transitions = vec![Transition::epsilon(TransitionId::MAX, 0, 1)];
        let result = AutomatonCore::new(two_states(), ab(), transitions, 0, [1]);
        assert!(matches!(result, Err(Error::InvariantViolation(_))));
    }

    #[test]
    fn test_complement_of_partial_dfa() -> Result<()> {
        let transitions = vec![Transition::new(0, 0, 1, Some(vec![Symbol::new('a')]))];
        let core = AutomatonCore::new(two_states(), ab(), transitions, 0, [1])?;
        let automaton = Automaton::Deterministic(DeterministicAutomaton::try_from(core)?);

        let complement = automaton.complement();
        assert!(complement.is_total());
        for word in ["", "aa", "b", "ab", "ba"] {
            assert!(complement.run(word), "should accept {:?}", word);
        }
        assert!(!complement.run("a"));
        Ok(())
    }

    #[test]
    fn test_flip_finals() -> Result<()> {
        let mut core = AutomatonCore::new(two_states(), ab(), Vec::new(), 0, [1])?;
        core.flip_finals();
        assert!(core.is_final(0));
        assert!(!core.is_final(1));
        assert!(core.state(0).map_or(false, |s| s.is_final()));
        Ok(())
    }
}
