use crate::alphabet::{Alphabet, Symbol};
use crate::data_struct::Stack;
use crate::error_handling::Error::{MalformedExpression, SymbolNotInAlphabet};
use crate::error_handling::Result;
use crate::language::token::Token;
use std::fmt::{Display, Formatter};

/// One item of a postfix (reverse Polish) expression.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PostfixItem {
    Symbol(Symbol),
    Epsilon,
    Concat,
    Union,
    Star,
}

impl Display for PostfixItem {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PostfixItem::Symbol(symbol) => write!(f, "{}", symbol),
            PostfixItem::Epsilon => write!(f, "λ"),
            PostfixItem::Concat => write!(f, "∧"),
            PostfixItem::Union => write!(f, "∨"),
            PostfixItem::Star => write!(f, "*"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Operator {
    Star,
    Concat,
    Union,
}

impl Operator {
    fn precedence(&self) -> u8 {
        match self {
            Operator::Star => 3,
            Operator::Concat => 2,
            Operator::Union => 1,
        }
    }

    fn to_item(self) -> PostfixItem {
        match self {
            Operator::Star => PostfixItem::Star,
            Operator::Concat => PostfixItem::Concat,
            Operator::Union => PostfixItem::Union,
        }
    }
}

/// Shunting-yard conversion of a token stream. Literal terms are checked
/// against the alphabet as they are emitted; adjacent operands get an
/// implicit concatenation.
pub(crate) fn to_postfix(tokens: &[Token], alphabet: &Alphabet) -> Result<Vec<PostfixItem>> {
    let mut output = Vec::new();
    let mut operators: Stack<Operator> = Stack::new();
    let mut after_operand = false;

    for token in tokens {
        match token {
            Token::Literal(_) | Token::Group(_) => {
                if after_operand {
                    push_operator(Operator::Concat, &mut operators, &mut output);
                }
                emit_operand(token, alphabet, &mut output)?;
                after_operand = true;
            }
            Token::Star => {
                if !after_operand {
                    return Err(MalformedExpression("'*' must follow a term"));
                }
                push_operator(Operator::Star, &mut operators, &mut output);
            }
            Token::Concat | Token::Union => {
                if !after_operand {
                    return Err(MalformedExpression("binary operator is missing its left operand"));
                }
                let operator = match token {
                    Token::Concat => Operator::Concat,
                    _ => Operator::Union,
                };
                push_operator(operator, &mut operators, &mut output);
                after_operand = false;
            }
        }
    }

    if !tokens.is_empty() && !after_operand {
        return Err(MalformedExpression("expression ends with an operator"));
    }
    while let Some(operator) = operators.pop() {
        output.push(operator.to_item());
    }
    Ok(output)
}

fn push_operator(operator: Operator, operators: &mut Stack<Operator>, output: &mut Vec<PostfixItem>) {
    while let Some(top) = operators.peek() {
        if top.precedence() < operator.precedence() {
            break;
        }
        if let Some(top) = operators.pop() {
            output.push(top.to_item());
        }
    }
    operators.push(operator);
}

fn emit_operand(token: &Token, alphabet: &Alphabet, output: &mut Vec<PostfixItem>) -> Result<()> {
    match token {
        Token::Literal(content) if content.is_empty() => output.push(PostfixItem::Epsilon),
        Token::Literal(content) => {
            // "abc" becomes a b ∧ c ∧
            for (idx, c) in content.chars().enumerate() {
                let symbol = Symbol::new(c);
                if !alphabet.contains(symbol) {
                    return Err(SymbolNotInAlphabet(c));
                }
                output.push(PostfixItem::Symbol(symbol));
                if idx > 0 {
                    output.push(PostfixItem::Concat);
                }
            }
        }
        Token::Group(inner) if inner.is_empty() => output.push(PostfixItem::Epsilon),
        Token::Group(inner) => output.extend(to_postfix(inner, alphabet)?),
        _ => return Err(MalformedExpression("operator used as an operand")),
    }
    Ok(())
}

pub(crate) fn postfix_to_string(postfix: &[PostfixItem]) -> String {
    postfix.iter().map(|item| item.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handling::Error;

    fn convert(expression: &str, alphabet: &str) -> Result<String> {
        let alphabet: Alphabet = alphabet.chars().collect();
        let tokens = Token::tokenize(expression)?;
        Ok(postfix_to_string(&to_postfix(&tokens, &alphabet)?))
    }

    #[test]
    fn test_precedence() -> Result<()> {
        assert_eq!(convert("{a}*∧{b}", "ab")?, "a*b∧");
        assert_eq!(convert("{a}∨{b}∧{c}", "abc")?, "abc∧∨");
        assert_eq!(convert("{a}∧{b}∨{c}", "abc")?, "ab∧c∨");
        assert_eq!(convert("{a}∨{b}∨{c}", "abc")?, "ab∨c∨");
        Ok(())
    }

    #[test]
    fn test_multi_char_literal_and_epsilon() -> Result<()> {
        assert_eq!(convert("{abc}", "abc")?, "ab∧c∧");
        assert_eq!(convert("{}*", "a")?, "λ*");
        assert_eq!(convert("", "a")?, "");
        Ok(())
    }

    #[test]
    fn test_implicit_concat_and_groups() -> Result<()> {
        assert_eq!(convert("{a}{b}", "ab")?, "ab∧");
        assert_eq!(convert("{a}*{b}", "ab")?, "a*b∧");
        assert_eq!(convert("{{a} OR {b}}* AND {c}", "abc")?, "ab∨*c∧");
        Ok(())
    }

    #[test]
    fn test_rejections() {
        assert!(matches!(convert("{ab}", "a"), Err(Error::SymbolNotInAlphabet('b'))));
        assert!(matches!(convert("*{a}", "a"), Err(Error::MalformedExpression(_))));
        assert!(matches!(convert("{a}∨", "a"), Err(Error::MalformedExpression(_))));
        assert!(matches!(convert("∧{a}", "a"), Err(Error::MalformedExpression(_))));
    }
}
