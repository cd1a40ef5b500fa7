//! Record model

mod id;
mod page;
mod record;
mod record_serde;
mod value;

pub use id::*;
pub use page::*;
pub use record::*;
pub use value::*;
