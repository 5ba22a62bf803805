pub(crate) mod language;
pub(crate) mod parser;
pub(crate) mod script;
pub(crate) mod thompson;
pub(crate) mod token;

pub use language::Language;
pub use parser::PostfixItem;
pub use script::LanguageScript;
