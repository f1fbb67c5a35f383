//! Divider Arena and Element Tree
//!
//! The live view layer: one arena per message holding the buffer, the
//! version counter, and every divider record; `Divider` and `Element` are
//! cheap positional handles into it.

mod arena;
mod divider;
mod element;
mod message;

pub use divider::Divider;
pub use element::{Children, Element, ElementKey, ElementKind, HeaderPart};
pub use message::{Endpoint, Message};
