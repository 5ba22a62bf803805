use crate::error_handling::Error::{UnbalancedBraces, UnexpectedCharacter};
use crate::error_handling::Result;

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Token {
    Literal(String),   // {chars}, empty content is epsilon
    Group(Vec<Token>), // {term OR term ...}, any braced content holding braces
    Star,              // *
    Union,             // ∨ or OR
    Concat,            // ∧ or AND
}

impl Token {
    const UNION_KEYWORD: &'static str = "OR";
    const CONCAT_KEYWORD: &'static str = "AND";

    /// Splits an expression into top-level tokens. Only brace depth 0 carries
    /// operators; everything inside braces is captured verbatim.
    pub(crate) fn tokenize(expression: &str) -> Result<Vec<Token>> {
        let chars: Vec<char> = expression.chars().collect();
        let mut tokens = Vec::new();
        let mut depth = 0usize;
        let mut term = String::new();
        let mut pos = 0;

        while pos < chars.len() {
            let c = chars[pos];
            if depth > 0 {
                match c {
                    '{' => depth += 1,
                    '}' => depth -= 1,
                    _ => {}
                }
                if depth == 0 {
                    tokens.push(Token::from_term(&term)?);
                    term.clear();
                } else {
                    term.push(c);
                }
                pos += 1;
                continue;
            }

            match c {
                '{' => depth = 1,
                '}' => return Err(UnbalancedBraces),
                '*' => tokens.push(Token::Star),
                '∨' => tokens.push(Token::Union),
                '∧' => tokens.push(Token::Concat),
                _ if c.is_whitespace() => {}
                _ if Self::keyword_at(&chars, pos, Self::UNION_KEYWORD) => {
                    tokens.push(Token::Union);
                    pos += Self::UNION_KEYWORD.len();
                    continue;
                }
                _ if Self::keyword_at(&chars, pos, Self::CONCAT_KEYWORD) => {
                    tokens.push(Token::Concat);
                    pos += Self::CONCAT_KEYWORD.len();
                    continue;
                }
                _ => return Err(UnexpectedCharacter(c)),
            }
            pos += 1;
        }

        if depth != 0 {
            return Err(UnbalancedBraces);
        }
        Ok(tokens)
    }

    fn from_term(content: &str) -> Result<Token> {
        if content.contains('{') {
            return Ok(Token::Group(Self::tokenize(content)?));
        }
        Ok(Token::Literal(content.to_string()))
    }

    fn keyword_at(chars: &[char], pos: usize, keyword: &str) -> bool {
        let mut idx = pos;
        for k in keyword.chars() {
            if chars.get(idx) != Some(&k) {
                return false;
            }
            idx += 1;
        }
        true
    }
}
