//! Data model shared by every stage of a certification run.
//!
//! Engines produce [`Issue`]s, discovery produces [`ApiEntry`]s, and the
//! validators assemble them into [`ApiOutcome`]s collected in a
//! [`RepositoryReport`].

mod api;
mod issue;
mod protocol;
mod result;

pub use api::*;
pub use issue::*;
pub use protocol::*;
pub use result::*;
