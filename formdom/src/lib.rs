pub mod document;
pub mod dom;
pub mod element;
pub mod event;
pub mod selector;

pub use document::{Display, Document, ElementData, NodeId};
pub use dom::Dom;
pub use element::{Content, Element};
pub use event::{Event, Handler, ListenerId};
pub use selector::{Selector, SelectorError};
