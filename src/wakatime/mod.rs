// Activity upstream module.
// Client and types for the coding-activity source.

pub mod client;
pub mod types;

pub use client::{ActivityClient, FetchSample};
pub use types::{ActivityData, ActivitySample, CategoryTotal};
