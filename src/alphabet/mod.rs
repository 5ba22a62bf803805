pub(crate) mod alphabet;

pub use alphabet::Alphabet;
pub use alphabet::Symbol;
