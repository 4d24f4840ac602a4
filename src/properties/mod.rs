//! Hierarchical configuration model: flat storage (§A), value flattening
//! (§B), the bind-tag grammar (§C), and `${...}` string resolution (§E).

pub mod flatten;
pub mod resolve;
pub mod store;
pub mod tag;

pub use flatten::{flatten, Value};
pub use store::PropertyStore;
pub use tag::Tag;
