//! Named validation rules and their message templates.

mod builtin;
mod registry;

pub use registry::{CheckFn, MessageContext, MessageFn, RuleRegistry};
