use crate::alphabet::{Alphabet, Symbol};
use crate::automaton::automaton::{Automaton, AutomatonCore};
use crate::automaton::state::{Label, State, StateId, Transition, TransitionId};
use crate::dfa::DeterministicAutomaton;
use crate::error_handling::Error::{
    DuplicateStateId, DuplicateTransitionId, InitialStateExists, InvalidStateId, StateNotFound,
    TransitionExists, TransitionNotFound,
};
use crate::error_handling::Result;
use crate::nfa::NondeterministicAutomaton;
use indexmap::IndexSet;
use std::collections::HashMap;

/// Mutable staging area for editing an automaton.
///
/// Every mutator validates before it commits, so a failed call leaves the
/// builder untouched. Id counters only grow: an id handed out once is never
/// reused by the same builder, even after the entity is removed.
#[derive(Clone, Debug, Default)]
pub struct AutomatonBuilder {
    states: Vec<State>,
    transitions: Vec<Transition>,
    finals: IndexSet<StateId>,
    start: Option<StateId>,
    alphabet: Alphabet,

    state_id_counter: StateId,
    transition_id_counter: TransitionId,
}

impl AutomatonBuilder {
    pub fn new() -> Self {
        AutomatonBuilder {
            states: Vec::new(),
            transitions: Vec::new(),
            finals: IndexSet::new(),
            start: None,
            alphabet: Alphabet::new(),
            state_id_counter: 0,
            transition_id_counter: 0,
        }
    }

    /// Replays an automaton into a fresh builder. States and transitions keep
    /// their ids; counters continue from the largest id seen.
    pub fn from_automaton(automaton: &Automaton) -> Result<Self> {
        let core = automaton.core();
        let mut builder = AutomatonBuilder::new();
        builder.alphabet = core.alphabet().clone();

        for state in core.states() {
            builder.add_state(state.is_final(), state.is_initial(), Some(state.id()))?;
        }
        for transition in core.transitions() {
            builder.insert_transition(
                transition.id(),
                transition.from(),
                transition.to(),
                transition.label().map(|symbols| symbols.to_vec()),
            )?;
        }
        Ok(builder)
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn start(&self) -> Option<StateId> {
        self.start
    }

    pub fn finals(&self) -> &IndexSet<StateId> {
        &self.finals
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    pub fn add_state(
        &mut self,
        is_final: bool,
        is_initial: bool,
        explicit_id: Option<StateId>,
    ) -> Result<StateId> {
        if is_initial && self.start.is_some() {
            return Err(InitialStateExists);
        }
        let id = match explicit_id {
            Some(id) if self.get_state(id).is_some() => return Err(DuplicateStateId(id)),
            Some(id) => id,
            None => self.state_id_counter,
        };
        // The counter must stay ahead of every id in use
        let next = id.checked_add(1).ok_or_else(|| InvalidStateId(id.to_string()))?;
        self.state_id_counter = self.state_id_counter.max(next);

        self.states.push(State::new(id, is_final, is_initial));
        if is_final {
            self.finals.insert(id);
        }
        if is_initial {
            self.start = Some(id);
        }
        Ok(id)
    }

    pub fn get_state(&self, id: StateId) -> Option<&State> {
        self.states.iter().find(|state| state.id() == id)
    }

    /// Removes a state together with every transition touching it.
    pub fn remove_state(&mut self, id: StateId) -> Result<()> {
        let pos = self
            .states
            .iter()
            .position(|state| state.id() == id)
            .ok_or(StateNotFound(id))?;
        let removed = self.states.remove(pos);
        if removed.is_initial() {
            self.start = None;
        }
        self.finals.shift_remove(&id);

        let (dropped, kept): (Vec<Transition>, Vec<Transition>) = self
            .transitions
            .drain(..)
            .partition(|t| t.from() == id || t.to() == id);
        self.transitions = kept;
        for transition in &dropped {
            self.prune_symbols(transition);
        }
        Ok(())
    }

    pub fn add_transition(
        &mut self,
        from: StateId,
        to: StateId,
        label: impl Into<Label>,
    ) -> Result<TransitionId> {
        let id = self.transition_id_counter;
        self.insert_transition(id, from, to, label.into().into_symbols())?;
        Ok(id)
    }

    /// Like [`AutomatonBuilder::add_transition`], but refuses to link a pair of
    /// states that is already linked.
    pub fn connect(
        &mut self,
        from: StateId,
        to: StateId,
        label: impl Into<Label>,
    ) -> Result<TransitionId> {
        if self.exists_transition(from, to).is_some() {
            return Err(TransitionExists(from, to));
        }
        self.add_transition(from, to, label)
    }

    fn insert_transition(
        &mut self,
        id: TransitionId,
        from: StateId,
        to: StateId,
        label: Option<Vec<Symbol>>,
    ) -> Result<()> {
        for endpoint in [from, to] {
            if self.get_state(endpoint).is_none() {
                return Err(StateNotFound(endpoint));
            }
        }
        if self.get_transition(id).is_some() {
            return Err(DuplicateTransitionId(id));
        }
        let next = id.checked_add(1).ok_or_else(|| InvalidStateId(id.to_string()))?;

        // Endpoints are valid, the alphabet may now grow
        for symbol in label.iter().flatten() {
            self.alphabet.add(*symbol);
        }
        self.transitions.push(Transition::new(id, from, to, label));
        self.transition_id_counter = self.transition_id_counter.max(next);
        Ok(())
    }

    pub fn get_transition(&self, id: TransitionId) -> Option<&Transition> {
        self.transitions.iter().find(|t| t.id() == id)
    }

    /// Removes a transition. Symbols of its label that no remaining transition
    /// carries leave the alphabet; other declared symbols stay.
    pub fn remove_transition(&mut self, id: TransitionId) -> Result<()> {
        let pos = self
            .transitions
            .iter()
            .position(|t| t.id() == id)
            .ok_or(TransitionNotFound(id))?;
        let removed = self.transitions.remove(pos);
        self.prune_symbols(&removed);
        Ok(())
    }

    fn prune_symbols(&mut self, removed: &Transition) {
        for symbol in removed.label().unwrap_or_default() {
            if !self.transitions.iter().any(|t| t.carries(*symbol)) {
                log::debug!("dropping unused symbol '{}' from the alphabet", symbol);
                self.alphabet.remove(*symbol);
            }
        }
    }

    pub fn toggle_initial(&mut self, id: StateId) -> Result<()> {
        let pos = self
            .states
            .iter()
            .position(|state| state.id() == id)
            .ok_or(StateNotFound(id))?;
        match self.start {
            Some(start) if start == id => {
                self.states[pos].set_initial(false);
                self.start = None;
            }
            Some(_) => return Err(InitialStateExists),
            None => {
                self.states[pos].set_initial(true);
                self.start = Some(id);
            }
        }
        Ok(())
    }

    pub fn toggle_final(&mut self, id: StateId) -> Result<()> {
        let state = self
            .states
            .iter_mut()
            .find(|state| state.id() == id)
            .ok_or(StateNotFound(id))?;
        let is_final = !state.is_final();
        state.set_final(is_final);
        if is_final {
            self.finals.insert(id);
        } else {
            self.finals.shift_remove(&id);
        }
        Ok(())
    }

    pub fn is_final(&self, id: StateId) -> bool {
        self.finals.contains(&id)
    }

    pub fn is_initial(&self, id: StateId) -> bool {
        self.start == Some(id)
    }

    pub fn exists_transition(&self, from: StateId, to: StateId) -> Option<&Transition> {
        self.transitions
            .iter()
            .find(|t| t.from() == from && t.to() == to)
    }

    /// True iff there is no epsilon transition and no state has two outgoing
    /// transitions carrying the same symbol.
    pub fn is_deterministic(&self) -> bool {
        let mut seen: HashMap<(StateId, Symbol), TransitionId> = HashMap::new();
        for transition in &self.transitions {
            let Some(symbols) = transition.label() else {
                return false;
            };
            for symbol in symbols {
                if seen
                    .insert((transition.from(), *symbol), transition.id())
                    .is_some()
                {
                    return false;
                }
            }
        }
        true
    }

    /// Exports a copy of the current contents as the variant the determinism
    /// predicate selects.
    pub fn to_automaton(&self) -> Result<Automaton> {
        let core = AutomatonCore::new(
            self.states.clone(),
            self.alphabet.clone(),
            self.transitions.clone(),
            // an absent start is reported by the core's validation
            self.start.unwrap_or(StateId::MAX),
            self.finals.iter().copied(),
        )?;
        if self.is_deterministic() {
            Ok(Automaton::Deterministic(DeterministicAutomaton::try_from(
                core,
            )?))
        } else {
            Ok(Automaton::Nondeterministic(NondeterministicAutomaton::new(
                core,
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handling::Error;

    #[test]
    fn test_ids_are_never_reused() -> Result<()> {
        let mut builder = AutomatonBuilder::new();
        let s0 = builder.add_state(false, true, None)?;
        let s1 = builder.add_state(true, false, None)?;
        builder.remove_state(s1)?;
        let s2 = builder.add_state(false, false, None)?;
        assert_eq!((s0, s1, s2), (0, 1, 2));

        let t0 = builder.add_transition(s0, s2, 'a')?;
        builder.remove_transition(t0)?;
        let t1 = builder.add_transition(s0, s2, 'a')?;
        assert_eq!((t0, t1), (0, 1));
        Ok(())
    }

    #[test]
    fn test_second_initial_state_rejected() -> Result<()> {
        let mut builder = AutomatonBuilder::new();
        builder.add_state(false, true, None)?;
        let result = builder.add_state(false, true, None);
        assert!(matches!(result, Err(Error::InitialStateExists)));
        assert_eq!(builder.states().len(), 1);
        Ok(())
    }

    #[test]
    fn test_failed_transition_leaves_alphabet_untouched() -> Result<()> {
        let mut builder = AutomatonBuilder::new();
        let s0 = builder.add_state(false, true, None)?;
        let result = builder.add_transition(s0, 42, "xyz");
        assert!(matches!(result, Err(Error::StateNotFound(42))));
        assert!(builder.alphabet().is_empty());
        assert!(builder.transitions().is_empty());

        // the failed call did not consume an id
        let s1 = builder.add_state(true, false, None)?;
        assert_eq!(builder.add_transition(s0, s1, 'x')?, 0);
        Ok(())
    }

    #[test]
    fn test_remove_transition_prunes_alphabet() -> Result<()> {
        let mut builder = AutomatonBuilder::new();
        let s0 = builder.add_state(false, true, None)?;
        let s1 = builder.add_state(true, false, None)?;
        let t_ab = builder.add_transition(s0, s1, vec!['a', 'b'])?;
        builder.add_transition(s1, s0, 'b')?;
        assert_eq!(builder.alphabet().len(), 2);

        builder.remove_transition(t_ab)?;
        let remaining: Vec<char> = builder.alphabet().iter().map(|s| s.as_char()).collect();
        assert_eq!(remaining, vec!['b']);

        assert!(matches!(
            builder.remove_transition(t_ab),
            Err(Error::TransitionNotFound(_))
        ));
        Ok(())
    }

    #[test]
    fn test_toggle_initial_and_final() -> Result<()> {
        let mut builder = AutomatonBuilder::new();
        let s0 = builder.add_state(false, false, None)?;
        let s1 = builder.add_state(false, false, None)?;

        builder.toggle_initial(s0)?;
        assert!(builder.is_initial(s0));
        assert!(matches!(
            builder.toggle_initial(s1),
            Err(Error::InitialStateExists)
        ));
        builder.toggle_initial(s0)?;
        assert_eq!(builder.start(), None);
        builder.toggle_initial(s1)?;
        assert_eq!(builder.start(), Some(s1));

        builder.toggle_final(s0)?;
        assert!(builder.is_final(s0));
        assert!(builder.get_state(s0).map_or(false, |s| s.is_final()));
        builder.toggle_final(s0)?;
        assert!(!builder.is_final(s0));
        assert!(matches!(builder.toggle_final(9), Err(Error::StateNotFound(9))));
        Ok(())
    }

    #[test]
    fn test_connect_refuses_existing_pair() -> Result<()> {
        let mut builder = AutomatonBuilder::new();
        let s0 = builder.add_state(false, true, None)?;
        let s1 = builder.add_state(true, false, None)?;
        builder.connect(s0, s1, 'a')?;
        assert!(matches!(
            builder.connect(s0, s1, 'b'),
            Err(Error::TransitionExists(0, 1))
        ));
        // the reverse direction is a different pair
        builder.connect(s1, s0, 'b')?;
        assert!(builder.exists_transition(s1, s0).is_some());
        Ok(())
    }

    #[test]
    fn test_is_deterministic() -> Result<()> {
        let mut builder = AutomatonBuilder::new();
        let s0 = builder.add_state(false, true, None)?;
        let s1 = builder.add_state(true, false, None)?;
        builder.add_transition(s0, s1, 'a')?;
        builder.add_transition(s0, s0, 'b')?;
        assert!(builder.is_deterministic());

        let shared = builder.add_transition(s0, s1, vec!['c', 'b'])?;
        assert!(!builder.is_deterministic());
        builder.remove_transition(shared)?;
        assert!(builder.is_deterministic());

        builder.add_transition(s1, s0, Label::Epsilon)?;
        assert!(!builder.is_deterministic());
        Ok(())
    }

    #[test]
    fn test_to_automaton_without_initial_state_fails() -> Result<()> {
        let mut builder = AutomatonBuilder::new();
        builder.add_state(true, false, None)?;
        assert!(matches!(
            builder.to_automaton(),
            Err(Error::InvariantViolation(_))
        ));
        Ok(())
    }

    #[test]
    fn test_explicit_ids_advance_counter() -> Result<()> {
        let mut builder = AutomatonBuilder::new();
        builder.add_state(false, true, Some(5))?;
        assert!(matches!(
            builder.add_state(false, false, Some(5)),
            Err(Error::DuplicateStateId(5))
        ));
        assert_eq!(builder.add_state(false, false, None)?, 6);
        Ok(())
    }

    #[test]
    fn test_id_without_successor_is_rejected() -> Result<()> {
        let mut builder = AutomatonBuilder::new();
        assert!(matches!(
            builder.add_state(false, true, Some(StateId::MAX)),
            Err(Error::InvalidStateId(_))
        ));
        assert!(builder.states().is_empty());
        assert_eq!(builder.start(), None);

        let s0 = builder.add_state(false, true, Some(StateId::MAX - 1))?;
        assert!(matches!(
            builder.add_state(false, false, None),
            Err(Error::InvalidStateId(_))
        ));
        assert!(matches!(
            builder.insert_transition(TransitionId::MAX, s0, s0, None),
            Err(Error::InvalidStateId(_))
        ));
        assert!(builder.transitions().is_empty());
        Ok(())
    }

    #[test]
    fn test_removal_keeps_unrelated_declared_symbols() -> Result<()> {
        let states = vec![State::new(0, false, true), State::new(1, true, false)];
        let transitions = vec![
            Transition::new(0, 0, 1, Some(vec![Symbol::new('a')])),
            Transition::new(1, 1, 1, Some(vec![Symbol::new('b')])),
        ];
        let core = AutomatonCore::new(states, "abc".chars().collect(), transitions, 0, [1])?;
        let mut builder = AutomatonBuilder::from_automaton(&Automaton::Deterministic(
            DeterministicAutomaton::try_from(core)?,
        ))?;

        builder.remove_transition(0)?;
        let remaining: Vec<char> = builder.alphabet().iter().map(|s| s.as_char()).collect();
        assert_eq!(remaining, vec!['b', 'c']);

        builder.remove_state(1)?;
        let remaining: Vec<char> = builder.alphabet().iter().map(|s| s.as_char()).collect();
        assert_eq!(remaining, vec!['c']);
        assert_eq!(builder.add_transition(0, 0, 'a')?, 2);
        Ok(())
    }
}
