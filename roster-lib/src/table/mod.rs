//! The table: columns, sorting, the displayed list and its controller.

mod action;
mod column;
mod config;
mod controller;
pub mod sort;
mod state;

pub use action::*;
pub use column::*;
pub use config::*;
pub use controller::*;
pub use state::*;
