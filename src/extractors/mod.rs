//! Request extractors.

mod caller;

pub use caller::BEARER_PREFIX;
