//! Form descriptors and validation.
//!
//! Modal forms are described declaratively: each [`FieldDescriptor`] names the
//! record key it edits, how it should be rendered, and the [`Rule`]s its value
//! must satisfy. Rendering is left to the modal surface; validation runs here
//! so that a submit can be blocked before any gateway call.
//!
//! # Example
//!
//! ```
//! use roster_lib::form::{FieldDescriptor, Rule, Validator};
//! use roster_lib::model::Record;
//!
//! let fields = vec![
//!     FieldDescriptor::text("firstname", "First name").rule(Rule::required("First name is required")),
//!     FieldDescriptor::text("email", "Email")
//!         .rule(Rule::required("Email is required"))
//!         .rule(Rule::email("Please enter a valid email")),
//! ];
//!
//! let values = Record::new().set("firstname", "Ana").set("email", "not-an-email");
//! let result = Validator::new(&fields).validate(&values);
//!
//! assert!(result.is_invalid());
//! assert_eq!(result.first_invalid_field(), Some("email"));
//! ```

mod field;
mod result;
mod rule;
mod validator;

pub use field::{FieldDescriptor, FieldKind};
pub use result::ValidationResult;
pub use rule::Rule;
pub use validator::Validator;
