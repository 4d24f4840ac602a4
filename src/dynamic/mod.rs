//! Dynamic, refreshable values: a single-field [`holder::Holder`] and the
//! [`facade::Refreshable`] facade that owns a property store and pushes
//! every edit out to the holders bound against it.

pub mod facade;
pub mod holder;

pub use facade::Refreshable;
pub use holder::Holder;
