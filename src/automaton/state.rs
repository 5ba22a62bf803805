use crate::alphabet::Symbol;
use std::fmt::{Debug, Formatter};

pub type StateId = usize;
pub type TransitionId = usize;

#[derive(Clone, Copy, Eq, Hash, PartialEq)]
pub struct State {
    id: StateId,
    is_final: bool,
    is_initial: bool,
}

impl State {
    pub fn new(id: StateId, is_final: bool, is_initial: bool) -> Self {
        State {
            id,
            is_final,
            is_initial,
        }
    }

    pub fn id(&self) -> StateId {
        self.id
    }

    pub fn is_final(&self) -> bool {
        self.is_final
    }

    pub fn is_initial(&self) -> bool {
        self.is_initial
    }

    pub(crate) fn set_final(&mut self, is_final: bool) {
        self.is_final = is_final;
    }

    pub(crate) fn set_initial(&mut self, is_initial: bool) {
        self.is_initial = is_initial;
    }
}

impl Debug for State {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "State({}", self.id)?;
        if self.is_initial {
            write!(f, ", initial")?;
        }
        if self.is_final {
            write!(f, ", final")?;
        }
        write!(f, ")")
    }
}

/// A labelled edge between two states, referenced by id.
///
/// A `None` label is an epsilon transition. A labelled transition carries an
/// ordered, duplicate-free list of symbols.
#[derive(Clone, Eq, PartialEq)]
pub struct Transition {
    id: TransitionId,
    from: StateId,
    to: StateId,
    label: Option<Vec<Symbol>>,
}

impl Transition {
    pub fn new(id: TransitionId, from: StateId, to: StateId, label: Option<Vec<Symbol>>) -> Self {
        let label = label.map(|symbols| {
            let mut deduped: Vec<Symbol> = Vec::with_capacity(symbols.len());
            for symbol in symbols {
                if !deduped.contains(&symbol) {
                    deduped.push(symbol);
                }
            }
            deduped
        });
        Transition {
            id,
            from,
            to,
            label,
        }
    }

    pub fn epsilon(id: TransitionId, from: StateId, to: StateId) -> Self {
        Transition::new(id, from, to, None)
    }

    pub fn id(&self) -> TransitionId {
        self.id
    }

    pub fn from(&self) -> StateId {
        self.from
    }

    pub fn to(&self) -> StateId {
        self.to
    }

    pub fn label(&self) -> Option<&[Symbol]> {
        self.label.as_deref()
    }

    pub fn is_epsilon(&self) -> bool {
        self.label.is_none()
    }

    pub fn carries(&self, symbol: Symbol) -> bool {
        self.label
            .as_ref()
            .is_some_and(|symbols| symbols.contains(&symbol))
    }

    pub(crate) fn with_endpoints(&self, id: TransitionId, from: StateId, to: StateId) -> Self {
        Transition {
            id,
            from,
            to,
            label: self.label.clone(),
        }
    }
}

impl Debug for Transition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.label {
            None => write!(
                f,
                "#{}: {} -> {}, symbol: epsilon",
                self.id, self.from, self.to
            ),
            Some(symbols) => write!(
                f,
                "#{}: {} -> {}, symbol: {:?}",
                self.id, self.from, self.to, symbols
            ),
        }
    }
}

/// Label requested by an editor when adding a transition.
///
/// An empty symbol list is treated the same as `Epsilon`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Label {
    Epsilon,
    Symbols(Vec<char>),
}

impl Label {
    pub(crate) fn into_symbols(self) -> Option<Vec<Symbol>> {
        match self {
            Label::Epsilon => None,
            Label::Symbols(chars) if chars.is_empty() => None,
            Label::Symbols(chars) => Some(chars.into_iter().map(Symbol::from).collect()),
        }
    }
}

impl From<char> for Label {
    fn from(c: char) -> Self {
        Label::Symbols(vec![c])
    }
}

impl From<&str> for Label {
    fn from(s: &str) -> Self {
        Label::Symbols(s.chars().collect())
    }
}

impl From<Vec<char>> for Label {
    fn from(chars: Vec<char>) -> Self {
        Label::Symbols(chars)
    }
}

impl From<Option<char>> for Label {
    fn from(c: Option<char>) -> Self {
        match c {
            Some(c) => Label::from(c),
            None => Label::Epsilon,
        }
    }
}
