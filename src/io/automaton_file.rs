use crate::alphabet::{Alphabet, Symbol};
use crate::automaton::{Automaton, AutomatonCore, State, StateId, Transition, TransitionId};
use crate::dfa::DeterministicAutomaton;
use crate::error_handling::Error::{
    IOError, InvalidFileExtension, InvalidStateId, InvalidSymbol, UnresolvedStateReference,
};
use crate::error_handling::Result;
use crate::nfa::NondeterministicAutomaton;
use indexmap::IndexMap;
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// On-disk form of an automaton, stored as JSON in a `.automaton` file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AutomatonFile {
    pub is_deterministic: bool,
    pub alphabet: Vec<String>,
    pub states: IndexMap<String, StateEntry>,
    pub transitions: IndexMap<String, TransitionEntry>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateEntry {
    pub initial: bool,
    #[serde(rename = "final")]
    pub is_final: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionEntry {
    pub from: StateRef,
    pub to: StateRef,
    /// Empty for an epsilon transition.
    #[serde(alias = "by", default)]
    pub link_by: Vec<String>,
}

/// A state reference; older files store ids as strings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StateRef {
    Id(StateId),
    Text(String),
}

impl StateRef {
    fn resolve(&self) -> Result<StateId> {
        match self {
            StateRef::Id(id) => Ok(*id),
            StateRef::Text(text) => parse_id(text),
        }
    }
}

impl AutomatonFile {
    pub const EXTENSION: &'static str = "automaton";

    pub fn load(path: &str) -> Result<AutomatonFile> {
        Self::check_extension(path)?;
        let contents = std::fs::read_to_string(path).map_err(IOError)?;
        let file = Self::parse_from_str(contents.as_str())?;
        info!(
            "Loaded {} with {} states and {} transitions",
            path,
            file.states.len(),
            file.transitions.len()
        );
        Ok(file)
    }

    pub fn parse_from_str(json: &str) -> Result<AutomatonFile> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn save(&self, path: &str) -> Result<()> {
        Self::check_extension(path)?;
        std::fs::write(path, self.to_json_string()?).map_err(IOError)?;
        info!("Saved automaton to {}", path);
        Ok(())
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_automaton(automaton: &Automaton) -> AutomatonFile {
        let core = automaton.core();

        let mut states: Vec<&State> = core.states().iter().collect();
        states.sort_by_key(|state| state.id());
        let mut transitions: Vec<&Transition> = core.transitions().iter().collect();
        transitions.sort_by_key(|transition| transition.id());

        AutomatonFile {
            is_deterministic: automaton.is_deterministic(),
            alphabet: core.alphabet().iter().map(|s| s.to_string()).collect(),
            states: states
                .into_iter()
                .map(|state| {
                    let entry = StateEntry {
                        initial: state.is_initial(),
                        is_final: state.is_final(),
                    };
                    (state.id().to_string(), entry)
                })
                .collect(),
            transitions: transitions
                .into_iter()
                .map(|transition| {
                    let entry = TransitionEntry {
                        from: StateRef::Id(transition.from()),
                        to: StateRef::Id(transition.to()),
                        link_by: transition
                            .label()
                            .unwrap_or_default()
                            .iter()
                            .map(|s| s.to_string())
                            .collect(),
                    };
                    (transition.id().to_string(), entry)
                })
                .collect(),
        }
    }

    /// Resolves every reference and validates the result. A document flagged
    /// deterministic must actually be deterministic.
    pub fn to_automaton(&self) -> Result<Automaton> {
        let mut alphabet = Alphabet::new();
        for entry in &self.alphabet {
            alphabet.add(parse_symbol(entry)?);
        }

        let mut states = Vec::with_capacity(self.states.len());
        let mut finals = Vec::new();
        let mut start: Option<StateId> = None;
        for (key, entry) in &self.states {
            let id = parse_id(key)?;
            if entry.initial && start.is_none() {
                start = Some(id);
            }
            if entry.is_final {
                finals.push(id);
            }
            states.push(State::new(id, entry.is_final, entry.initial));
        }
        let known: HashSet<StateId> = states.iter().map(|s| s.id()).collect();

        let mut transitions = Vec::with_capacity(self.transitions.len());
        for (key, entry) in &self.transitions {
            let id: TransitionId = parse_id(key)?;
            let from = Self::resolve_state(&entry.from, &known)?;
            let to = Self::resolve_state(&entry.to, &known)?;
            let mut label = Vec::with_capacity(entry.link_by.len());
            for symbol in &entry.link_by {
                label.push(parse_symbol(symbol)?);
            }
            let label = if label.is_empty() { None } else { Some(label) };
            transitions.push(Transition::new(id, from, to, label));
        }

        let core = AutomatonCore::new(
            states,
            alphabet,
            transitions,
            // reported by the core's validation when absent
            start.unwrap_or(StateId::MAX),
            finals,
        )?;
        if self.is_deterministic {
            Ok(Automaton::Deterministic(DeterministicAutomaton::try_from(core)?))
        } else {
            Ok(Automaton::Nondeterministic(NondeterministicAutomaton::new(core)))
        }
    }

    fn resolve_state(reference: &StateRef, known: &HashSet<StateId>) -> Result<StateId> {
        let id = reference.resolve()?;
        if !known.contains(&id) {
            return Err(UnresolvedStateReference(id));
        }
        Ok(id)
    }

    fn check_extension(path: &str) -> Result<()> {
        match Path::new(path).extension().and_then(|e| e.to_str()) {
            Some(Self::EXTENSION) => Ok(()),
            _ => Err(InvalidFileExtension(path.to_string(), Self::EXTENSION)),
        }
    }
}

// An id needs a successor so builders can keep counting past it
fn parse_id(text: &str) -> Result<usize> {
    match text.trim().parse::<usize>() {
        Ok(id) if id < usize::MAX => Ok(id),
        _ => Err(InvalidStateId(text.to_string())),
    }
}

fn parse_symbol(text: &str) -> Result<Symbol> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(Symbol::new(c)),
        _ => Err(InvalidSymbol(text.to_string())),
    }
}
