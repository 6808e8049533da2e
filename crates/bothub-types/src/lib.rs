//! BotHub Types - plain records shared by the store and its callers
//!
//! Everything here is serde data with no runtime dependencies.

pub mod document;
pub mod event;
mod lenient;
pub mod user;

pub use document::*;
pub use event::*;
pub use user::*;
