//! Test data model.
//!
//! The structured result of parsing, shared by the Markdown, text, JSON and
//! PDF renderers.

mod category;
mod question;
mod test_data;

pub use category::*;
pub use question::*;
pub use test_data::*;
