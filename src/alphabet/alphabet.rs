use indexmap::IndexSet;
use std::fmt::{Debug, Display, Formatter};

/// A single terminal character of an automaton's input language.
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Symbol(char);

impl Symbol {
    pub fn new(c: char) -> Self {
        Symbol(c)
    }

    pub fn as_char(&self) -> char {
        self.0
    }
}

impl From<char> for Symbol {
    fn from(c: char) -> Self {
        Symbol(c)
    }
}

impl Debug for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ordered, duplicate-free set of symbols.
///
/// Iteration order is first-insertion order; re-adding an existing symbol keeps
/// its original position.
#[derive(Clone, Default, Eq, PartialEq)]
pub struct Alphabet {
    symbols: IndexSet<Symbol>,
}

impl Alphabet {
    pub fn new() -> Self {
        Alphabet {
            symbols: IndexSet::new(),
        }
    }

    // Returns false if the symbol was already present
    pub fn add(&mut self, symbol: Symbol) -> bool {
        self.symbols.insert(symbol)
    }

    pub fn remove(&mut self, symbol: Symbol) -> bool {
        self.symbols.shift_remove(&symbol)
    }

    pub fn position_of(&self, symbol: Symbol) -> Option<usize> {
        self.symbols.get_index_of(&symbol)
    }

    pub fn get(&self, index: usize) -> Option<Symbol> {
        self.symbols.get_index(index).copied()
    }

    pub fn contains(&self, symbol: Symbol) -> bool {
        self.symbols.contains(&symbol)
    }

    /// Left operand's symbols come first, followed by the symbols only `other` has.
    pub fn union(&self, other: &Alphabet) -> Alphabet {
        let mut merged = self.clone();
        for symbol in other.iter() {
            merged.add(symbol);
        }
        merged
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.symbols.iter().copied()
    }
}

impl FromIterator<Symbol> for Alphabet {
    fn from_iter<I: IntoIterator<Item = Symbol>>(iter: I) -> Self {
        let mut alphabet = Alphabet::new();
        for symbol in iter {
            alphabet.add(symbol);
        }
        alphabet
    }
}

impl FromIterator<char> for Alphabet {
    fn from_iter<I: IntoIterator<Item = char>>(iter: I) -> Self {
        iter.into_iter().map(Symbol::from).collect()
    }
}

impl Debug for Alphabet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.symbols.iter()).finish()
    }
}

impl Display for Alphabet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (idx, symbol) in self.symbols.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", symbol)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_deduplicates_and_keeps_first_position() {
        let mut alphabet = Alphabet::new();
        assert!(alphabet.add(Symbol::new('b')));
        assert!(alphabet.add(Symbol::new('a')));
        assert!(!alphabet.add(Symbol::new('b')));
        assert!(alphabet.add(Symbol::new('c')));

        let chars: Vec<char> = alphabet.iter().map(|s| s.as_char()).collect();
        assert_eq!(chars, vec!['b', 'a', 'c']);
        assert_eq!(alphabet.len(), 3);
    }

    #[test]
    fn test_position_of() {
        let alphabet: Alphabet = "xyz".chars().collect();
        assert_eq!(alphabet.position_of(Symbol::new('x')), Some(0));
        assert_eq!(alphabet.position_of(Symbol::new('z')), Some(2));
        assert_eq!(alphabet.position_of(Symbol::new('q')), None);
        assert_eq!(alphabet.get(1), Some(Symbol::new('y')));
        assert_eq!(alphabet.get(3), None);
    }

    #[test]
    fn test_union_prefers_left_order() {
        let left: Alphabet = "cab".chars().collect();
        let right: Alphabet = "bdc".chars().collect();
        let merged = left.union(&right);

        let chars: String = merged.iter().map(|s| s.as_char()).collect();
        assert_eq!(chars, "cabd");
        // operands are untouched
        assert_eq!(left.len(), 3);
        assert_eq!(right.len(), 3);
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut alphabet: Alphabet = "abcd".chars().collect();
        assert!(alphabet.remove(Symbol::new('b')));
        assert!(!alphabet.remove(Symbol::new('b')));
        assert_eq!(format!("{}", alphabet), "{a, c, d}");
    }
}
