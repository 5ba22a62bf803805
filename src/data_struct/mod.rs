mod stack;
mod tree;

pub use stack::Stack;
pub use tree::NodeId;
pub use tree::Tree;
