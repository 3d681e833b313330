//! Declarative form engine.
//!
//! A form is an ordered [`FieldSet`](schema::FieldSet) of
//! [`FieldDescriptor`](field::FieldDescriptor)s. [`FormState`](state::FormState)
//! owns the values, errors and file display names of one mounted form, and a
//! [`Submitter`](submit::Submitter) drives submit attempts through an
//! authentication check, the validation pass and a host-supplied
//! [`SubmitHandler`](submit::SubmitHandler).
//!
//! ```
//! use intake_form::prelude::*;
//!
//! let mut state = FormState::from_descriptors(
//!     vec![
//!         FieldDescriptor::text("name").with_label("Full name").required(),
//!         FieldDescriptor::email("email").required(),
//!     ],
//!     FormValues::new(),
//! )
//! .unwrap();
//!
//! state.set_value("email", "not-an-email").unwrap();
//! let errors = state.validate();
//! assert_eq!(errors.get("name"), Some("Full name is required"));
//! assert_eq!(errors.get("email"), Some("Please enter a valid email address"));
//! ```

pub mod config;
pub mod error;
pub mod field;
pub mod file;
pub mod option;
pub mod render;
pub mod schema;
pub mod state;
pub mod submit;
pub mod validation;
pub mod values;

pub mod prelude {
    pub use crate::config::EngineConfig;
    pub use crate::error::FormError;
    pub use crate::field::{CustomRule, FieldDescriptor, FieldKind, InputType};
    pub use crate::option::SelectOption;
    pub use crate::render::{BorderTone, Control, FieldStyle, FieldView};
    pub use crate::schema::FieldSet;
    pub use crate::state::{FieldInput, FormState};
    pub use crate::submit::{
        AuthOracle, BlockReason, FailureReason, Redirect, SubmitError, SubmitHandler,
        SubmitReport, SubmitStatus, Submitter,
    };
    pub use crate::validation::FieldErrors;
    pub use crate::values::{FieldValue, FormValues, SelectedFile};
}
