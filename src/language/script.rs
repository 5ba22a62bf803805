use crate::alphabet::Alphabet;
use crate::error_handling::Error::{
    DuplicateDeclaration, InvalidFileExtension, IOError, MissingDeclaration, UnbalancedBraces,
    UnexpectedToken,
};
use crate::error_handling::Result;
use crate::language::language::Language;
use crate::nfa::NondeterministicAutomaton;
use log::info;
use std::io::Read;
use std::path::Path;

/// A language script file:
///
/// ```text
/// // comments run to the end of the line
/// alphabet := "abc"
/// language := { {a}* AND {bc} }
/// ```
///
/// Both declarations are required exactly once, in either order.
#[derive(Clone, Debug)]
pub struct LanguageScript {
    language: Language,
}

impl LanguageScript {
    pub const EXTENSION: &'static str = "lsf";

    const ALPHABET_KEY: &'static str = "alphabet";
    const LANGUAGE_KEY: &'static str = "language";

    pub fn parse_from_file(script_path: &str) -> Result<LanguageScript> {
        let extension = Path::new(script_path).extension().and_then(|e| e.to_str());
        if extension != Some(Self::EXTENSION) {
            return Err(InvalidFileExtension(script_path.to_string(), Self::EXTENSION));
        }

        match std::fs::File::open(script_path) {
            Ok(mut file) => {
                let mut contents = String::new();
                if let Err(e) = file.read_to_string(&mut contents) {
                    return Err(IOError(e));
                }
                let script = Self::parse_from_str(contents.as_str())?;
                info!("Loaded language script {}", script_path);
                Ok(script)
            }
            Err(e) => Err(IOError(e)),
        }
    }

    pub fn parse_from_str(script: &str) -> Result<LanguageScript> {
        let stripped = Self::strip_comments(script);
        let mut stream = ScriptStream::new(stripped.as_str());
        let mut alphabet: Option<String> = None;
        let mut expression: Option<String> = None;

        while stream.skip_whitespace() {
            let key = stream.identifier();
            if key.is_empty() {
                return Err(UnexpectedToken(stream.rest_of_line()));
            }
            stream.skip_whitespace();
            if !stream.consume(":=") {
                return Err(UnexpectedToken(stream.rest_of_line()));
            }
            stream.skip_whitespace();

            match key.as_str() {
                Self::ALPHABET_KEY => {
                    let value = stream.quoted()?;
                    if alphabet.replace(value).is_some() {
                        return Err(DuplicateDeclaration(Self::ALPHABET_KEY));
                    }
                }
                Self::LANGUAGE_KEY => {
                    let value = stream.braced()?;
                    if expression.replace(value).is_some() {
                        return Err(DuplicateDeclaration(Self::LANGUAGE_KEY));
                    }
                }
                _ => return Err(UnexpectedToken(key)),
            }
        }

        let alphabet: Alphabet = alphabet
            .ok_or(MissingDeclaration(Self::ALPHABET_KEY))?
            .chars()
            .collect();
        let expression = expression.ok_or(MissingDeclaration(Self::LANGUAGE_KEY))?;
        Ok(LanguageScript {
            language: Language::new(alphabet, expression.as_str())?,
        })
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    pub fn into_language(self) -> Language {
        self.language
    }

    pub fn compile(&self) -> Result<NondeterministicAutomaton> {
        self.language.to_nfa()
    }

    // `//` starts a comment unless it sits inside a quoted string
    fn strip_comments(script: &str) -> String {
        let mut stripped = String::with_capacity(script.len());
        for line in script.lines() {
            let mut in_quotes = false;
            let mut previous: Option<char> = None;
            let mut end = line.len();
            for (idx, c) in line.char_indices() {
                match c {
                    '"' => in_quotes = !in_quotes,
                    '/' if !in_quotes && previous == Some('/') => {
                        end = idx - 1;
                        break;
                    }
                    _ => {}
                }
                previous = Some(c);
            }
            stripped.push_str(line[..end].trim());
            stripped.push('\n');
        }
        stripped
    }
}

struct ScriptStream {
    chars: Vec<char>,
    pos: usize,
}

impl ScriptStream {
    fn new(contents: &str) -> Self {
        ScriptStream {
            chars: contents.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    // Returns whether anything is left
    fn skip_whitespace(&mut self) -> bool {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                return true;
            }
            self.pos += 1;
        }
        false
    }

    fn identifier(&mut self) -> String {
        let mut identifier = String::new();
        while let Some(c) = self.peek() {
            if !(c.is_ascii_alphanumeric() || c == '_') {
                break;
            }
            identifier.push(c);
            self.pos += 1;
        }
        identifier
    }

    fn consume(&mut self, expected: &str) -> bool {
        let start = self.pos;
        for e in expected.chars() {
            if self.next() != Some(e) {
                self.pos = start;
                return false;
            }
        }
        true
    }

    fn quoted(&mut self) -> Result<String> {
        if self.next() != Some('"') {
            return Err(UnexpectedToken(self.rest_of_line()));
        }
        let mut value = String::new();
        loop {
            match self.next() {
                Some('"') => return Ok(value),
                Some('\n') | None => return Err(UnexpectedToken(format!("\"{}", value))),
                Some(c) => value.push(c),
            }
        }
    }

    // Content between the outer braces of `{ ... }`
    fn braced(&mut self) -> Result<String> {
        if self.next() != Some('{') {
            return Err(UnexpectedToken(self.rest_of_line()));
        }
        let mut depth = 1usize;
        let mut value = String::new();
        while let Some(c) = self.next() {
            match c {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(value);
                    }
                }
                _ => {}
            }
            value.push(c);
        }
        Err(UnbalancedBraces)
    }

    fn rest_of_line(&self) -> String {
        self.chars[self.pos..]
            .iter()
            .take_while(|c| **c != '\n')
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handling::Error;

    #[test]
    fn test_parse_script() -> Result<()> {
        let script = LanguageScript::parse_from_str(
            "// words over a and b\n\
             alphabet := \"ab\"\n\
             language := {\n  {a}* AND {b} // trailing\n}\n",
        )?;
        assert_eq!(script.language().alphabet().len(), 2);
        assert_eq!(script.language().postfix_string(), "a*b∧");

        let nfa = script.compile()?;
        assert!(nfa.run("aab"));
        assert!(!nfa.run("ba"));
        Ok(())
    }

    #[test]
    fn test_declaration_order_is_free() -> Result<()> {
        let script = LanguageScript::parse_from_str("language := {{a} OR {b}}\nalphabet := \"ab\"")?;
        assert_eq!(script.language().postfix_string(), "ab∨");
        Ok(())
    }

    #[test]
    fn test_comment_marker_inside_quotes() -> Result<()> {
        let script = LanguageScript::parse_from_str("alphabet := \"a//b\"\nlanguage := {{a/}}")?;
        assert_eq!(script.language().alphabet().len(), 3);
        assert_eq!(script.language().postfix_string(), "a/∧");
        Ok(())
    }

    #[test]
    fn test_missing_and_duplicate_declarations() {
        assert!(matches!(
            LanguageScript::parse_from_str("alphabet := \"a\""),
            Err(Error::MissingDeclaration("language"))
        ));
        assert!(matches!(
            LanguageScript::parse_from_str("language := {{a}}"),
            Err(Error::MissingDeclaration("alphabet"))
        ));
        assert!(matches!(
            LanguageScript::parse_from_str("alphabet := \"a\"\nalphabet := \"b\"\nlanguage := {}"),
            Err(Error::DuplicateDeclaration("alphabet"))
        ));
    }

    #[test]
    fn test_malformed_scripts() {
        assert!(matches!(
            LanguageScript::parse_from_str("alphabet := \"a\"\nlanguage := {{a}"),
            Err(Error::UnbalancedBraces)
        ));
        assert!(matches!(
            LanguageScript::parse_from_str("symbols := \"a\""),
            Err(Error::UnexpectedToken(_))
        ));
        assert!(matches!(
            LanguageScript::parse_from_str("alphabet = \"a\""),
            Err(Error::UnexpectedToken(_))
        ));
    }

    #[test]
    fn test_file_extension_is_checked() {
        assert!(matches!(
            LanguageScript::parse_from_file("script.txt"),
            Err(Error::InvalidFileExtension(_, "lsf"))
        ));
    }
}
