// GitHub GraphQL module.
// Client, wire/payload types, cursor traversal, and change probing for the
// project listing source.

pub mod client;
pub mod detect;
pub mod paginate;
pub mod types;

pub use client::{FetchPage, GithubClient};
pub use types::{ProjectData, ProjectNode, ProjectsPayload, RepoPage};
