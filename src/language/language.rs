use crate::alphabet::Alphabet;
use crate::error_handling::Result;
use crate::language::parser::{postfix_to_string, to_postfix, PostfixItem};
use crate::language::thompson::Fragment;
use crate::language::token::Token;
use crate::nfa::NondeterministicAutomaton;
use log::debug;
use std::fmt::{Display, Formatter};

/// A validated language expression over a declared alphabet.
///
/// Terms are written in braces: `{abc}` is the word "abc" and `{}` is the
/// empty word. `*` (Kleene star), `∧`/`AND` (concatenation) and `∨`/`OR`
/// (union) combine them, with that order of precedence. A braced term that
/// itself contains braces is a nested group.
#[derive(Clone, Debug)]
pub struct Language {
    alphabet: Alphabet,
    expression: String,
    postfix: Vec<PostfixItem>,
}

impl Language {
    pub fn new(alphabet: Alphabet, expression: &str) -> Result<Self> {
        let tokens = Token::tokenize(expression)?;
        let postfix = to_postfix(&tokens, &alphabet)?;
        debug!("Postfix form of '{}': {}", expression.trim(), postfix_to_string(&postfix));
        Ok(Language {
            alphabet,
            expression: expression.trim().to_string(),
            postfix,
        })
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn postfix(&self) -> &[PostfixItem] {
        &self.postfix
    }

    pub fn postfix_string(&self) -> String {
        postfix_to_string(&self.postfix)
    }

    /// Thompson construction over the postfix form.
    pub fn to_nfa(&self) -> Result<NondeterministicAutomaton> {
        let fragment = Fragment::evaluate(&self.postfix)?;
        debug!("Thompson construction produced {} states", fragment.num_states());
        Ok(fragment.into_nfa(&self.alphabet))
    }
}

impl Display for Language {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} over {}", self.expression, self.alphabet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handling::Error;

    #[test]
    fn test_star_then_literal() -> Result<()> {
        let language = Language::new("ab".chars().collect(), "{a}*∧{b}")?;
        assert_eq!(language.postfix_string(), "a*b∧");

        let nfa = language.to_nfa()?;
        for accepted in ["b", "ab", "aaab"] {
            assert!(nfa.run(accepted));
        }
        for rejected in ["", "a", "ba", "abb"] {
            assert!(!nfa.run(rejected));
        }
        Ok(())
    }

    #[test]
    fn test_keyword_union() -> Result<()> {
        let nfa = Language::new("ab".chars().collect(), "{a} OR {b}")?.to_nfa()?;
        assert!(nfa.run("a"));
        assert!(nfa.run("b"));
        assert!(!nfa.run("ab"));
        assert!(!nfa.run(""));
        Ok(())
    }

    #[test]
    fn test_symbol_outside_alphabet() {
        let result = Language::new("a".chars().collect(), "{ab}");
        assert!(matches!(result, Err(Error::SymbolNotInAlphabet('b'))));
    }

    #[test]
    fn test_unused_alphabet_symbols_survive() -> Result<()> {
        let nfa = Language::new("abc".chars().collect(), "{a}")?.to_nfa()?;
        assert_eq!(nfa.core().alphabet().len(), 3);
        Ok(())
    }
}
