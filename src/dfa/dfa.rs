use crate::alphabet::Symbol;
use crate::automaton::{AutomatonCore, State, StateId, Transition};
use crate::data_struct::{NodeId, Tree};
use crate::dfa::DfaSimulator;
use crate::error_handling::Error::NotDeterministic;
use crate::error_handling::{Error, Result};
use indexmap::IndexMap;
use std::collections::HashMap;
use std::fmt::Debug;

/// A finite automaton without epsilon transitions in which every state has at
/// most one outgoing transition per symbol. The transition function may be
/// partial: a missing transition rejects the input.
#[derive(Clone)]
pub struct DeterministicAutomaton {
    core: AutomatonCore,
    delta: HashMap<(StateId, Symbol), StateId>,
}

impl TryFrom<AutomatonCore> for DeterministicAutomaton {
    type Error = Error;

    fn try_from(core: AutomatonCore) -> Result<Self> {
        let mut delta = HashMap::new();
        for transition in core.transitions() {
            let Some(symbols) = transition.label() else {
                return Err(NotDeterministic);
            };
            for symbol in symbols {
                if delta
                    .insert((transition.from(), *symbol), transition.to())
                    .is_some()
                {
                    return Err(NotDeterministic);
                }
            }
        }
        Ok(DeterministicAutomaton { core, delta })
    }
}

impl Debug for DeterministicAutomaton {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DFA{:?}", self.core)
    }
}

impl DeterministicAutomaton {
    // Caller guarantees the core is deterministic
    pub(crate) fn from_core_unchecked(core: AutomatonCore) -> Self {
        let mut delta = HashMap::new();
        for transition in core.transitions() {
            for symbol in transition.label().into_iter().flatten() {
                delta.insert((transition.from(), *symbol), transition.to());
            }
        }
        DeterministicAutomaton { core, delta }
    }

    pub fn core(&self) -> &AutomatonCore {
        &self.core
    }

    pub fn into_core(self) -> AutomatonCore {
        self.core
    }

    pub fn num_states(&self) -> usize {
        self.core.states().len()
    }

    pub fn next_state(&self, state: StateId, symbol: Symbol) -> Option<StateId> {
        self.delta.get(&(state, symbol)).copied()
    }

    pub fn run(&self, input: &str) -> bool {
        let mut simulator = DfaSimulator::new(self);
        for c in input.chars() {
            if !simulator.simulate_single_char(c) {
                return false;
            }
        }
        simulator.is_accepting()
    }

    /// True iff every state has a transition for every alphabet symbol.
    pub fn is_total(&self) -> bool {
        self.core.states().iter().all(|state| {
            self.core
                .alphabet()
                .iter()
                .all(|symbol| self.next_state(state.id(), symbol).is_some())
        })
    }

    /// Returns an equivalent total DFA. Missing transitions are routed to a
    /// single new non-final sink state that loops on every symbol.
    pub fn totalize(&self) -> DeterministicAutomaton {
        if self.is_total() {
            return self.clone();
        }

        // Validated cores keep every id below usize::MAX, so the successors exist
        let sink = self.core.states().iter().map(|s| s.id() + 1).max().unwrap_or(0);
        let mut states = self.core.states().to_vec();
        states.push(State::new(sink, false, false));

        let mut transitions = self.core.transitions().to_vec();
        let mut transition_id = transitions.iter().map(|t| t.id() + 1).max().unwrap_or(0);
        for state in &states {
            let missing: Vec<Symbol> = self
                .core
                .alphabet()
                .iter()
                .filter(|symbol| state.id() == sink || self.next_state(state.id(), *symbol).is_none())
                .collect();
            if missing.is_empty() {
                continue;
            }
            transitions.push(Transition::new(transition_id, state.id(), sink, Some(missing)));
            transition_id += 1;
        }
        log::debug!("totalized DFA with sink state {}", sink);

        DeterministicAutomaton::from_core_unchecked(AutomatonCore::new_unchecked(
            states,
            self.core.alphabet().clone(),
            transitions,
            self.core.start(),
            self.core.finals().iter().copied(),
        ))
    }

    /// Complement over the alphabet: totalize, minimize, then flip the final states.
    pub fn complement(&self) -> DeterministicAutomaton {
        let mut dfa = self.totalize().minimize();
        dfa.negate();
        dfa
    }

    /// Flips every state's final flag. Only language-complementing on a total DFA.
    pub fn negate(&mut self) {
        if !self.is_total() {
            log::warn!("negating a partial DFA; stuck inputs stay rejected");
        }
        self.core.flip_finals();
    }

    /// Merges indistinguishable states by partition refinement.
    ///
    /// Blocks start as {final}, {non-final} and are split one symbol at a time,
    /// cycling through the alphabet, until a whole pass over the alphabet splits
    /// nothing. A missing transition counts as its own target class.
    pub fn minimize(&self) -> DeterministicAutomaton {
        let mut partition: Tree<Vec<StateId>> = Tree::new(Vec::new());
        let (finals, others): (Vec<StateId>, Vec<StateId>) = self
            .core
            .states()
            .iter()
            .map(|state| state.id())
            .partition(|id| self.core.is_final(*id));
        let root = partition.root();
        for block in [finals, others] {
            if !block.is_empty() {
                partition.add_child(root, block);
            }
        }

        let symbols: Vec<Symbol> = self.core.alphabet().iter().collect();
        let mut quiet_rounds = 0;
        let mut round = 0;
        while !symbols.is_empty() && quiet_rounds < symbols.len() {
            let symbol = symbols[round % symbols.len()];
            if self.refine(&mut partition, symbol) {
                quiet_rounds = 0;
            } else {
                quiet_rounds += 1;
            }
            round += 1;
        }

        let blocks = partition.leaves();
        log::debug!(
            "minimization converged after {} rounds: {} -> {} states",
            round,
            self.num_states(),
            blocks.len()
        );
        self.rebuild_from_blocks(&partition, &blocks)
    }

    // Splits every leaf block by the block its members reach on `symbol`
    fn refine(&self, partition: &mut Tree<Vec<StateId>>, symbol: Symbol) -> bool {
        let leaves = partition.leaves();
        let block_of = Self::block_index(partition, &leaves);

        let mut split = false;
        for leaf in leaves {
            let mut groups: IndexMap<Option<usize>, Vec<StateId>> = IndexMap::new();
            for state in partition.value(leaf) {
                let target_block = self
                    .next_state(*state, symbol)
                    .and_then(|to| block_of.get(&to).copied());
                groups.entry(target_block).or_default().push(*state);
            }
            if groups.len() > 1 {
                split = true;
                for (_, members) in groups {
                    partition.add_child(leaf, members);
                }
            }
        }
        split
    }

    fn block_index(partition: &Tree<Vec<StateId>>, leaves: &[NodeId]) -> HashMap<StateId, usize> {
        let mut block_of = HashMap::new();
        for (idx, leaf) in leaves.iter().enumerate() {
            for state in partition.value(*leaf) {
                block_of.insert(*state, idx);
            }
        }
        block_of
    }

    fn rebuild_from_blocks(
        &self,
        partition: &Tree<Vec<StateId>>,
        blocks: &[NodeId],
    ) -> DeterministicAutomaton {
        let block_of = Self::block_index(partition, blocks);
        let start = block_of.get(&self.core.start()).copied().unwrap_or(0);

        let mut states = Vec::with_capacity(blocks.len());
        let mut finals = Vec::new();
        let mut transitions = Vec::new();
        for (new_id, block) in blocks.iter().enumerate() {
            let members = partition.value(*block);
            let is_final = members.iter().any(|id| self.core.is_final(*id));
            if is_final {
                finals.push(new_id);
            }
            states.push(State::new(new_id, is_final, new_id == start));

            // Members of a block agree on every symbol, so one of them speaks for all
            let Some(representative) = members.first() else {
                continue;
            };
            for transition in self.core.outgoing(*representative) {
                let Some(to) = block_of.get(&transition.to()) else {
                    continue;
                };
                transitions.push(transition.with_endpoints(transitions.len(), new_id, *to));
            }
        }

        DeterministicAutomaton::from_core_unchecked(AutomatonCore::new_unchecked(
            states,
            self.core.alphabet().clone(),
            transitions,
            start,
            finals,
        ))
    }
}
