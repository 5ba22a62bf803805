use crate::alphabet::Symbol;
use crate::automaton::{AutomatonCore, State, StateId, Transition, TransitionId};
use crate::dfa::DeterministicAutomaton;
use indexmap::{IndexMap, IndexSet};
use std::collections::{HashSet, VecDeque};
use std::fmt::Debug;

/// A finite automaton that may contain epsilon transitions and several
/// transitions per (state, symbol) pair.
#[derive(Clone)]
pub struct NondeterministicAutomaton {
    core: AutomatonCore,
}

impl Debug for NondeterministicAutomaton {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NFA{:?}", self.core)
    }
}

impl NondeterministicAutomaton {
    pub fn new(core: AutomatonCore) -> Self {
        NondeterministicAutomaton { core }
    }

    pub fn core(&self) -> &AutomatonCore {
        &self.core
    }

    pub fn into_core(self) -> AutomatonCore {
        self.core
    }

    /// States reachable from `state` through zero or more epsilon transitions,
    /// in discovery order. Epsilon cycles are fine.
    pub fn epsilon_closure(&self, state: StateId) -> IndexSet<StateId> {
        let mut closure = IndexSet::new();
        closure.insert(state);
        let mut worklist = vec![state];
        while let Some(current) = worklist.pop() {
            for transition in self.core.outgoing(current).filter(|t| t.is_epsilon()) {
                if closure.insert(transition.to()) {
                    worklist.push(transition.to());
                }
            }
        }
        closure
    }

    fn closure_reaches_final(&self, state: StateId) -> bool {
        self.epsilon_closure(state)
            .iter()
            .any(|id| self.core.is_final(*id))
    }

    /// Every transition taken when reading `symbol` from `state`: the symbol
    /// transitions leaving the epsilon closure of `state`, plus the epsilon
    /// transitions followed after them. The targets of the returned transitions
    /// are exactly the states reachable on `symbol`.
    ///
    /// The flag is set when an epsilon-only path leads from `state` to a final state.
    pub fn transitions_from(&self, state: StateId, symbol: Symbol) -> (Vec<&Transition>, bool) {
        let before = self.epsilon_closure(state);
        let reaches_final = before.iter().any(|id| self.core.is_final(*id));

        let mut effective: Vec<&Transition> = Vec::new();
        let mut taken: HashSet<TransitionId> = HashSet::new();
        let mut worklist: Vec<StateId> = Vec::new();
        for source in &before {
            for transition in self.core.outgoing(*source).filter(|t| t.carries(symbol)) {
                if taken.insert(transition.id()) {
                    effective.push(transition);
                    worklist.push(transition.to());
                }
            }
        }

        let mut visited: HashSet<StateId> = worklist.iter().copied().collect();
        while let Some(current) = worklist.pop() {
            for transition in self.core.outgoing(current).filter(|t| t.is_epsilon()) {
                if taken.insert(transition.id()) {
                    effective.push(transition);
                }
                if visited.insert(transition.to()) {
                    worklist.push(transition.to());
                }
            }
        }

        (effective, reaches_final)
    }

    fn step(&self, states: &IndexSet<StateId>, symbol: Symbol) -> IndexSet<StateId> {
        let mut next = IndexSet::new();
        for state in states {
            let (transitions, _) = self.transitions_from(*state, symbol);
            next.extend(transitions.iter().map(|t| t.to()));
        }
        next
    }

    pub fn run(&self, input: &str) -> bool {
        let mut current = self.epsilon_closure(self.core.start());
        for c in input.chars() {
            current = self.step(&current, Symbol::from(c));
            if current.is_empty() {
                return false;
            }
        }
        current.iter().any(|id| self.closure_reaches_final(*id))
    }

    /// Subset construction. DFA states are sorted sets of NFA states, numbered
    /// in breadth-first discovery order starting from `{start}`. Empty target
    /// sets are left out, so the result may be partial.
    pub fn to_deterministic(&self) -> DeterministicAutomaton {
        let symbols: Vec<Symbol> = self.core.alphabet().iter().collect();

        let mut discovered: IndexMap<Vec<StateId>, StateId> = IndexMap::new();
        let mut worklist: VecDeque<Vec<StateId>> = VecDeque::new();
        let initial = vec![self.core.start()];
        discovered.insert(initial.clone(), 0);
        worklist.push_back(initial);

        let mut edges: Vec<(StateId, Symbol, StateId)> = Vec::new();
        while let Some(nfa_states) = worklist.pop_front() {
            let Some(dfa_state) = discovered.get(&nfa_states).copied() else {
                continue;
            };
            for symbol in &symbols {
                let mut targets: Vec<StateId> = nfa_states
                    .iter()
                    .flat_map(|state| {
                        let (transitions, _) = self.transitions_from(*state, *symbol);
                        transitions.into_iter().map(|t| t.to()).collect::<Vec<_>>()
                    })
                    .collect();
                targets.sort_unstable();
                targets.dedup();
                if targets.is_empty() {
                    continue;
                }

                let target_state = match discovered.get(&targets) {
                    Some(id) => *id,
                    None => {
                        let id = discovered.len();
                        discovered.insert(targets.clone(), id);
                        worklist.push_back(targets);
                        id
                    }
                };
                edges.push((dfa_state, *symbol, target_state));
            }
        }

        let mut states = Vec::with_capacity(discovered.len());
        let mut finals = Vec::new();
        for (nfa_states, dfa_state) in &discovered {
            let is_final = nfa_states
                .iter()
                .any(|id| self.core.is_final(*id) || self.closure_reaches_final(*id));
            if is_final {
                finals.push(*dfa_state);
            }
            states.push(State::new(*dfa_state, is_final, *dfa_state == 0));
        }
        let transitions: Vec<Transition> = edges
            .into_iter()
            .enumerate()
            .map(|(id, (from, symbol, to))| Transition::new(id, from, to, Some(vec![symbol])))
            .collect();

        log::debug!(
            "subset construction: {} NFA states -> {} DFA states",
            self.core.states().len(),
            states.len()
        );
        DeterministicAutomaton::from_core_unchecked(AutomatonCore::new_unchecked(
            states,
            self.core.alphabet().clone(),
            transitions,
            0,
            finals,
        ))
    }

    /// Complement over the alphabet: determinize, totalize, minimize, then flip
    /// the final states.
    pub fn negate(&self) -> DeterministicAutomaton {
        self.to_deterministic().complement()
    }

    /// Like [`AutomatonCore::transition_table`], but with targets reached
    /// through epsilon transitions included.
    pub fn effective_transition_table(&self) -> IndexMap<StateId, IndexMap<Symbol, Vec<StateId>>> {
        let mut table = IndexMap::new();
        for state in self.core.states() {
            let mut row: IndexMap<Symbol, Vec<StateId>> = IndexMap::new();
            for symbol in self.core.alphabet().iter() {
                let (transitions, _) = self.transitions_from(state.id(), symbol);
                let mut targets: Vec<StateId> = transitions.iter().map(|t| t.to()).collect();
                targets.sort_unstable();
                targets.dedup();
                row.insert(symbol, targets);
            }
            table.insert(state.id(), row);
        }
        table
    }
}
