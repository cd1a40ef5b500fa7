//! Roster: a data-driven CRUD list view.
//!
//! Keeps an in-memory, sortable collection of records consistent with a remote
//! collection while records are created, edited and deleted through modal forms.

pub mod error;
pub mod form;
pub mod gateway;
pub mod modal;
pub mod model;
pub mod table;

pub use gateway::RecordGateway;
pub use table::TableController;
