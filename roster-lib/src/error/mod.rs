//! Error types

mod field;
mod gateway;
mod table;
mod validation;

pub use field::*;
pub use gateway::*;
pub use table::*;
pub use validation::*;
