// Documents module.
// Slug/filename mapping, document records, and link rewriting.

pub mod links;
pub mod model;
pub mod slug;

pub use links::{LinkResolver, RepoLayout};
pub use model::DocumentRecord;
