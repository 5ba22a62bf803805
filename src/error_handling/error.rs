use crate::automaton::{StateId, TransitionId};
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum Error {
    // Recoverable editing errors reported by the builder
    InitialStateExists,
    StateNotFound(StateId),
    TransitionNotFound(TransitionId),
    DuplicateStateId(StateId),
    DuplicateTransitionId(TransitionId),
    TransitionExists(StateId, StateId),

    // Script and file validation
    IOError(std::io::Error),
    JsonParsingError(serde_json::Error),
    YamlParsingError(serde_yaml::Error),
    InvalidFileExtension(String, &'static str),
    MissingDeclaration(&'static str),
    DuplicateDeclaration(&'static str),
    UnexpectedToken(String),
    UnbalancedBraces,
    UnexpectedCharacter(char),
    SymbolNotInAlphabet(char),
    MalformedExpression(&'static str),
    InvalidSymbol(String),
    InvalidStateId(String),
    UnresolvedStateReference(StateId),
    MissingConfigKey(&'static str),
    InvalidConfig(&'static str),

    // Consistency violations
    InvariantViolation(String),
    NotDeterministic,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InitialStateExists => write!(f, "an initial state already exists"),
            Error::StateNotFound(id) => write!(f, "state {} does not exist", id),
            Error::TransitionNotFound(id) => write!(f, "transition {} does not exist", id),
            Error::DuplicateStateId(id) => write!(f, "state id {} is already in use", id),
            Error::DuplicateTransitionId(id) => {
                write!(f, "transition id {} is already in use", id)
            }
            Error::TransitionExists(from, to) => {
                write!(f, "a transition from {} to {} already exists", from, to)
            }
            Error::IOError(e) => write!(f, "io error: {}", e),
            Error::JsonParsingError(e) => write!(f, "malformed automaton file: {}", e),
            Error::YamlParsingError(e) => write!(f, "malformed config file: {}", e),
            Error::InvalidFileExtension(path, expected) => {
                write!(f, "'{}' is not a .{} file", path, expected)
            }
            Error::MissingDeclaration(name) => write!(f, "no {} declaration found", name),
            Error::DuplicateDeclaration(name) => write!(f, "{} is declared more than once", name),
            Error::UnexpectedToken(token) => write!(f, "unexpected token '{}'", token),
            Error::UnbalancedBraces => write!(f, "unbalanced braces in expression"),
            Error::UnexpectedCharacter(c) => write!(f, "unexpected character '{}'", c),
            Error::SymbolNotInAlphabet(c) => write!(f, "symbol '{}' is not in the alphabet", c),
            Error::MalformedExpression(reason) => write!(f, "malformed expression: {}", reason),
            Error::InvalidSymbol(s) => write!(f, "'{}' is not a single character symbol", s),
            Error::InvalidStateId(s) => write!(f, "'{}' is not a valid id", s),
            Error::UnresolvedStateReference(id) => {
                write!(f, "transition references unknown state {}", id)
            }
            Error::MissingConfigKey(key) => write!(f, "missing config key '{}'", key),
            Error::InvalidConfig(key) => write!(f, "invalid value for config key '{}'", key),
            Error::InvariantViolation(reason) => write!(f, "invalid automaton: {}", reason),
            Error::NotDeterministic => write!(f, "automaton is not deterministic"),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::IOError(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::JsonParsingError(e)
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Error::YamlParsingError(e)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
