//! Registry internals: segment records, the ordered store, canaries and the
//! global instance.

pub mod canary;
pub(crate) mod global;
pub mod segment;
pub mod store;
