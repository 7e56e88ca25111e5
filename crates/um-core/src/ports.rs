//! Port traits for the external collaborators.
//!
//! The routing service, the node directory, and the schedule store are all
//! remote; the session engine only ever talks to them through these traits.
//! The camera boundary lives in [`crate::session::scan`] because its
//! lifetime is tied to the scan session.

use crate::model::{Node, Occupancy, Route, SearchHit, TravelMode};

/// Read-only node directory.
#[async_trait::async_trait]
pub trait DirectoryPort: Send + Sync {
    /// Fetch the full node directory, sorted by name.
    async fn nodes(&self) -> anyhow::Result<Vec<Node>>;
}

/// Route computation service.
#[async_trait::async_trait]
pub trait RoutePort: Send + Sync {
    /// Compute a route between two named nodes.
    async fn route(&self, start: &str, end: &str, mode: TravelMode) -> anyhow::Result<Route>;
}

/// Room schedule and occupancy store.
#[async_trait::async_trait]
pub trait SchedulePort: Send + Sync {
    /// Current occupancy of a room or department.
    async fn occupancy(&self, room: &str) -> anyhow::Result<Occupancy>;

    /// Free-text search over the lecture schedule.
    async fn search(&self, query: &str) -> anyhow::Result<Vec<SearchHit>>;
}
