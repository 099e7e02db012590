// GitHub GraphQL response types.
// Wire structs mirror the upstream envelope; payload structs are the
// flattened shape this service caches and serves.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One repository as cached and served.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectNode {
    pub name: String,
    pub description: Option<String>,
    pub url: String,
    pub star_count: u64,
    pub fork_count: u64,
    /// Language names in upstream order (most used first).
    pub languages: Vec<String>,
    pub topics: BTreeSet<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub license: Option<String>,
    pub is_private: bool,
}

/// Pagination metadata as reported by the repositories connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PinnedEdge {
    pub node: ProjectNode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PinnedItems {
    pub edges: Vec<PinnedEdge>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repositories {
    pub nodes: Vec<ProjectNode>,
    pub page_info: PageInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectUser {
    pub pinned_items: PinnedItems,
    pub repositories: Repositories,
}

/// The `data` substructure of the served project response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectData {
    pub user: ProjectUser,
}

impl ProjectData {
    /// Build the data substructure for a set of accumulated nodes.
    pub fn assemble(
        pinned: Vec<ProjectNode>,
        nodes: Vec<ProjectNode>,
        page_info: PageInfo,
    ) -> Self {
        Self {
            user: ProjectUser {
                pinned_items: PinnedItems {
                    edges: pinned.into_iter().map(|node| PinnedEdge { node }).collect(),
                },
                repositories: Repositories { nodes, page_info },
            },
        }
    }

    /// View a single page as a data substructure, for change probing.
    pub fn from_page(page: &RepoPage) -> Self {
        Self::assemble(
            page.pinned.clone().unwrap_or_default(),
            page.nodes.clone(),
            page.page_info.clone(),
        )
    }
}

/// What `GET /projects` returns and what the projects slot caches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectsPayload {
    pub data: ProjectData,
    pub updated_at: DateTime<Utc>,
}

/// One decoded page of the repositories traversal.
#[derive(Debug, Clone, PartialEq)]
pub struct RepoPage {
    /// Full pinned set, redundantly present on every page the query returns.
    pub pinned: Option<Vec<ProjectNode>>,
    pub nodes: Vec<ProjectNode>,
    pub page_info: PageInfo,
}

// --- wire types -------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct GraphQlEnvelope {
    pub data: Option<WireData>,
    pub errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct WireData {
    pub user: Option<WireUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireUser {
    pub pinned_items: Option<WirePinned>,
    pub repositories: WireRepositories,
}

#[derive(Debug, Deserialize)]
pub struct WirePinned {
    pub edges: Vec<WirePinnedEdge>,
}

#[derive(Debug, Deserialize)]
pub struct WirePinnedEdge {
    pub node: WireRepo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireRepositories {
    pub nodes: Vec<WireRepo>,
    pub page_info: PageInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireRepo {
    pub name: String,
    pub description: Option<String>,
    pub url: String,
    pub stargazer_count: u64,
    pub fork_count: u64,
    pub languages: WireLanguages,
    pub repository_topics: WireTopics,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub license_info: Option<WireLicense>,
    pub is_private: bool,
}

#[derive(Debug, Deserialize)]
pub struct WireLanguages {
    pub nodes: Vec<WireNamed>,
}

#[derive(Debug, Deserialize)]
pub struct WireTopics {
    pub nodes: Vec<WireTopicNode>,
}

#[derive(Debug, Deserialize)]
pub struct WireTopicNode {
    pub topic: WireNamed,
}

#[derive(Debug, Deserialize)]
pub struct WireNamed {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct WireLicense {
    pub name: String,
}

impl From<WireRepo> for ProjectNode {
    fn from(repo: WireRepo) -> Self {
        Self {
            name: repo.name,
            description: repo.description,
            url: repo.url,
            star_count: repo.stargazer_count,
            fork_count: repo.fork_count,
            languages: repo.languages.nodes.into_iter().map(|l| l.name).collect(),
            topics: repo
                .repository_topics
                .nodes
                .into_iter()
                .map(|t| t.topic.name)
                .collect(),
            created_at: repo.created_at,
            updated_at: repo.updated_at,
            license: repo.license_info.map(|l| l.name),
            is_private: repo.is_private,
        }
    }
}

impl From<WireUser> for RepoPage {
    fn from(user: WireUser) -> Self {
        Self {
            pinned: user
                .pinned_items
                .map(|p| p.edges.into_iter().map(|e| e.node.into()).collect()),
            nodes: user
                .repositories
                .nodes
                .into_iter()
                .map(Into::into)
                .collect(),
            page_info: user.repositories.page_info,
        }
    }
}
