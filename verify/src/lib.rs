//! Declarative field validation for [`formdom`] documents.
//!
//! Rules are attached to elements as pipe-delimited strings
//! (`"required|min:3"`). A [`Binder`] validates the element on change or
//! submit and shows the first failing rule's message inline, as a tip, or
//! inside an element of the host's choosing.
//!
//! # Example
//!
//! ```
//! use formdom::{Dom, Element};
//! use verify::prelude::*;
//!
//! let dom = Dom::new();
//! let field = dom.write(|doc| {
//!     doc.append(doc.root(), Element::div().child(Element::input("").id("nick")))
//! });
//!
//! let binder = Binder::new(
//!     dom.clone(),
//!     RuleRegistry::with_builtins(),
//!     GlobalConfig::new().error_class("is-error"),
//!     SubmitBus::new(),
//! );
//! binder
//!     .on_bind(field, FieldConfig::new("required|min:3").name("Nickname"), None)
//!     .unwrap();
//!
//! let input = dom.read(|doc| doc.get_element_by_id("nick").unwrap());
//! dom.input_value(input, "ab", "change");
//! assert!(dom.read(|doc| doc.has_class(field, "is-error")));
//! ```

pub mod binder;
pub mod bus;
pub mod config;
pub mod engine;
pub mod error;
pub mod lookup;
pub mod options;
pub mod parser;
pub mod presenter;
pub mod rules;

pub use binder::Binder;
pub use bus::SubmitBus;
pub use config::GlobalConfig;
pub use engine::{Outcome, ValidationResult, evaluate, validate};
pub use error::VerifyError;
pub use options::{DisplayMode, FieldConfig, FieldOptions, RuleConfig, Trigger};
pub use parser::{RuleCache, RuleDescriptor, parse};
pub use presenter::{Presenter, PresenterState, Surface};
pub use rules::RuleRegistry;

pub mod prelude {
    pub use crate::binder::Binder;
    pub use crate::bus::SubmitBus;
    pub use crate::config::GlobalConfig;
    pub use crate::error::VerifyError;
    pub use crate::options::{DisplayMode, FieldConfig, RuleConfig};
    pub use crate::rules::{MessageContext, RuleRegistry};
}
