use crate::alphabet::{Alphabet, Symbol};
use crate::automaton::{AutomatonCore, State, StateId, Transition};
use crate::data_struct::Stack;
use crate::error_handling::Error::MalformedExpression;
use crate::error_handling::Result;
use crate::language::parser::PostfixItem;
use crate::nfa::NondeterministicAutomaton;

/// A Thompson construction piece: states `0..num_states`, one entry and one
/// accepting exit.
#[derive(Clone, Debug)]
pub(crate) struct Fragment {
    start: StateId,
    accept: StateId,
    num_states: usize,
    transitions: Vec<Transition>,
    alphabet: Alphabet,
}

impl Fragment {
    /// Two states joined by `symbol`, or by an epsilon edge when `None`.
    pub(crate) fn single(symbol: Option<Symbol>) -> Fragment {
        let mut alphabet = Alphabet::new();
        if let Some(symbol) = symbol {
            alphabet.add(symbol);
        }
        Fragment {
            start: 0,
            accept: 1,
            num_states: 2,
            transitions: vec![Transition::new(0, 0, 1, symbol.map(|s| vec![s]))],
            alphabet,
        }
    }

    /// The entry of `rhs` is merged into the exit of `lhs`.
    pub(crate) fn concat(lhs: Fragment, rhs: Fragment) -> Fragment {
        let offset = lhs.num_states;
        let merge_into = lhs.accept;
        let rhs_start = rhs.start;
        let relocate = |state: StateId| {
            if state == rhs_start {
                merge_into
            } else if state < rhs_start {
                offset + state
            } else {
                offset + state - 1
            }
        };

        let mut transitions = Vec::with_capacity(lhs.transitions.len() + rhs.transitions.len());
        Self::append(&mut transitions, &lhs.transitions, |s| s);
        Self::append(&mut transitions, &rhs.transitions, relocate);

        Fragment {
            start: lhs.start,
            accept: relocate(rhs.accept),
            num_states: lhs.num_states + rhs.num_states - 1,
            transitions,
            alphabet: lhs.alphabet.union(&rhs.alphabet),
        }
    }

    /// New entry 0 and exit 1, `lhs` shifted by 2 and `rhs` after it.
    pub(crate) fn union(lhs: Fragment, rhs: Fragment) -> Fragment {
        let lhs_offset = 2;
        let rhs_offset = 2 + lhs.num_states;

        let mut transitions = Vec::new();
        Self::push_epsilon(&mut transitions, 0, lhs.start + lhs_offset);
        Self::push_epsilon(&mut transitions, 0, rhs.start + rhs_offset);
        Self::append(&mut transitions, &lhs.transitions, |s| s + lhs_offset);
        Self::append(&mut transitions, &rhs.transitions, |s| s + rhs_offset);
        Self::push_epsilon(&mut transitions, lhs.accept + lhs_offset, 1);
        Self::push_epsilon(&mut transitions, rhs.accept + rhs_offset, 1);

        Fragment {
            start: 0,
            accept: 1,
            num_states: 2 + lhs.num_states + rhs.num_states,
            transitions,
            alphabet: lhs.alphabet.union(&rhs.alphabet),
        }
    }

    pub(crate) fn star(inner: Fragment) -> Fragment {
        let offset = 2;

        let mut transitions = Vec::new();
        Self::push_epsilon(&mut transitions, 0, inner.start + offset);
        Self::push_epsilon(&mut transitions, 0, 1);
        Self::append(&mut transitions, &inner.transitions, |s| s + offset);
        Self::push_epsilon(&mut transitions, inner.accept + offset, 1);
        Self::push_epsilon(&mut transitions, inner.accept + offset, inner.start + offset);

        Fragment {
            start: 0,
            accept: 1,
            num_states: 2 + inner.num_states,
            transitions,
            alphabet: inner.alphabet,
        }
    }

    /// Folds a postfix expression into one fragment. An empty expression
    /// yields the epsilon fragment.
    pub(crate) fn evaluate(postfix: &[PostfixItem]) -> Result<Fragment> {
        if postfix.is_empty() {
            return Ok(Fragment::single(None));
        }

        let mut operands: Stack<Fragment> = Stack::new();
        for item in postfix {
            let fragment = match item {
                PostfixItem::Symbol(symbol) => Fragment::single(Some(*symbol)),
                PostfixItem::Epsilon => Fragment::single(None),
                PostfixItem::Star => Fragment::star(Self::pop_operand(&mut operands)?),
                PostfixItem::Concat | PostfixItem::Union => {
                    let rhs = Self::pop_operand(&mut operands)?;
                    let lhs = Self::pop_operand(&mut operands)?;
                    match item {
                        PostfixItem::Concat => Fragment::concat(lhs, rhs),
                        _ => Fragment::union(lhs, rhs),
                    }
                }
            };
            operands.push(fragment);
        }

        let result = Self::pop_operand(&mut operands)?;
        if !operands.is_empty() {
            return Err(MalformedExpression("operands left over after evaluation"));
        }
        Ok(result)
    }

    /// The automaton's alphabet is `declared` extended by any symbol the
    /// fragment uses.
    pub(crate) fn into_nfa(self, declared: &Alphabet) -> NondeterministicAutomaton {
        let states = (0..self.num_states)
            .map(|id| State::new(id, id == self.accept, id == self.start))
            .collect();
        let core = AutomatonCore::new_unchecked(
            states,
            declared.union(&self.alphabet),
            self.transitions,
            self.start,
            [self.accept],
        );
        NondeterministicAutomaton::new(core)
    }

    pub(crate) fn num_states(&self) -> usize {
        self.num_states
    }

    fn pop_operand(operands: &mut Stack<Fragment>) -> Result<Fragment> {
        operands
            .pop()
            .ok_or(MalformedExpression("operator is missing an operand"))
    }

    fn push_epsilon(transitions: &mut Vec<Transition>, from: StateId, to: StateId) {
        transitions.push(Transition::epsilon(transitions.len(), from, to));
    }

    fn append(
        transitions: &mut Vec<Transition>,
        source: &[Transition],
        relocate: impl Fn(StateId) -> StateId,
    ) {
        for transition in source {
            let relocated =
                transition.with_endpoints(transitions.len(), relocate(transition.from()), relocate(transition.to()));
            transitions.push(relocated);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(c: char) -> Option<Symbol> {
        Some(Symbol::new(c))
    }

    #[test]
    fn test_concat_merges_states() {
        let fragment = Fragment::concat(Fragment::single(sym('a')), Fragment::single(sym('b')));
        assert_eq!(fragment.num_states(), 3);
        let nfa = fragment.into_nfa(&Alphabet::new());
        assert!(nfa.run("ab"));
        assert!(!nfa.run("a"));
        assert!(!nfa.run("ba"));
    }

    #[test]
    fn test_union_and_star() {
        let union = Fragment::union(Fragment::single(sym('a')), Fragment::single(sym('b')));
        assert_eq!(union.num_states(), 6);
        let star = Fragment::star(union);
        assert_eq!(star.num_states(), 8);

        let nfa = star.into_nfa(&Alphabet::new());
        for accepted in ["", "a", "b", "abba"] {
            assert!(nfa.run(accepted), "{:?}", accepted);
        }
        assert!(!nfa.run("c"));
    }

    #[test]
    fn test_declared_alphabet_is_kept() {
        let declared: Alphabet = "abc".chars().collect();
        let nfa = Fragment::single(sym('a')).into_nfa(&declared);
        assert_eq!(nfa.core().alphabet().len(), 3);
        assert_eq!(nfa.core().transitions().len(), 1);
    }

    #[test]
    fn test_evaluate_rejects_malformed_postfix() {
        let a = PostfixItem::Symbol(Symbol::new('a'));
        assert!(Fragment::evaluate(&[PostfixItem::Concat]).is_err());
        assert!(Fragment::evaluate(&[a, a]).is_err());
        assert!(Fragment::evaluate(&[a, PostfixItem::Star]).is_ok());
    }

    #[test]
    fn test_empty_expression_is_epsilon() -> Result<()> {
        let nfa = Fragment::evaluate(&[])?.into_nfa(&"a".chars().collect());
        assert!(nfa.run(""));
        assert!(!nfa.run("a"));
        Ok(())
    }
}
