pub mod gridworld;
pub mod policy;
pub mod policy_evaluation;

// Re-export all modules
pub use gridworld::*;
pub use policy::*;
pub use policy_evaluation::*;
