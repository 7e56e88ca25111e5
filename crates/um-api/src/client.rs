//! Campus map API client
//!
//! One reqwest client serving all three ports. Wire shapes follow the
//! backend: `GET /api/nodes`, `POST /api/path`, `GET /api/schedule/{room}`
//! and `GET /api/schedule/search?q=`.

use anyhow::Context;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use um_core::model::{Node, Occupancy, Route, RouteStats, SearchHit, TravelMode, Waypoint};
use um_core::ports::{DirectoryPort, RoutePort, SchedulePort};

use crate::config::ClientConfig;
use crate::error::ApiError;

pub struct CampusApi {
    http: Client,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct PathRequest<'a> {
    start: &'a str,
    end: &'a str,
    mode: TravelMode,
}

/// Route response as the backend sends it. The `path` field (node names) is
/// accepted but unused by this client.
#[derive(Debug, Deserialize)]
struct PathResponse {
    total_time_seconds: f64,
    total_distance_meters: f64,
    path_details: Vec<Waypoint>,
    #[serde(default)]
    directions: Vec<String>,
}

impl From<PathResponse> for Route {
    fn from(response: PathResponse) -> Self {
        Route {
            waypoints: response.path_details,
            stats: RouteStats {
                total_time_seconds: response.total_time_seconds,
                total_distance_meters: response.total_distance_meters,
            },
            directions: response.directions,
        }
    }
}

impl CampusApi {
    pub fn new(config: &ClientConfig) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .context("failed to create HTTP client")?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        url: String,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        debug!(%url, "issuing request");
        let response = request.send().await.map_err(|source| ApiError::Transport {
            url: url.clone(),
            source,
        })?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status { url, status });
        }
        response
            .json()
            .await
            .map_err(|source| ApiError::Decode { url, source })
    }
}

#[async_trait::async_trait]
impl DirectoryPort for CampusApi {
    async fn nodes(&self) -> anyhow::Result<Vec<Node>> {
        let url = self.url("/api/nodes");
        let nodes: Vec<Node> = self.send_json(url.clone(), self.http.get(&url)).await?;
        Ok(nodes)
    }
}

#[async_trait::async_trait]
impl RoutePort for CampusApi {
    async fn route(&self, start: &str, end: &str, mode: TravelMode) -> anyhow::Result<Route> {
        let url = self.url("/api/path");
        let body = PathRequest { start, end, mode };
        let response: PathResponse = self
            .send_json(url.clone(), self.http.post(&url).json(&body))
            .await?;
        Ok(response.into())
    }
}

#[async_trait::async_trait]
impl SchedulePort for CampusApi {
    async fn occupancy(&self, room: &str) -> anyhow::Result<Occupancy> {
        let url = self.url(&format!("/api/schedule/{room}"));
        let occupancy: Occupancy = self.send_json(url.clone(), self.http.get(&url)).await?;
        Ok(occupancy)
    }

    async fn search(&self, query: &str) -> anyhow::Result<Vec<SearchHit>> {
        let url = self.url("/api/schedule/search");
        let hits: Vec<SearchHit> = self
            .send_json(url.clone(), self.http.get(&url).query(&[("q", query)]))
            .await?;
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use um_core::model::{NodeKind, OccupancyStatus};

    #[test]
    fn path_response_maps_to_a_route() {
        let json = r#"{
            "path": ["Gate-1", "Stairs-A0", "Stairs-A1", "Room-204"],
            "path_details": [
                {"name": "Gate-1", "x": 10.0, "y": 20.0, "floor": 0},
                {"name": "Stairs-A0", "x": 40.0, "y": 20.0, "floor": 0},
                {"name": "Stairs-A1", "x": 40.0, "y": 20.0, "floor": 1},
                {"name": "Room-204", "x": 90.0, "y": 35.0, "floor": 1}
            ],
            "total_time_seconds": 84.2,
            "total_distance_meters": 46.1,
            "directions": ["Head east", "Take the stairs to the first floor", "Arrive at Room-204"]
        }"#;

        let route: Route = serde_json::from_str::<PathResponse>(json).unwrap().into();
        assert_eq!(route.waypoints.len(), 4);
        assert_eq!(route.waypoints[2].floor, 1);
        assert_eq!(route.stats.total_distance_meters, 46.1);
        assert_eq!(route.directions.len(), 3);
    }

    #[test]
    fn node_list_parses() {
        let json = r#"[
            {"name": "CS-Department", "x": 310.0, "y": 120.0, "type": "department", "floor": 1},
            {"name": "Gate-1", "x": 10.0, "y": 20.0, "type": "corridor", "floor": 0}
        ]"#;
        let nodes: Vec<Node> = serde_json::from_str(json).unwrap();
        assert_eq!(nodes[0].kind, NodeKind::Department);
        assert_eq!(nodes[1].floor, 0);
    }

    #[test]
    fn occupancy_parses_with_and_without_details() {
        let occupied = r#"{
            "status": "Occupied",
            "details": {
                "course": "Operating Systems",
                "instructor": "Dr. Mansour",
                "time": "10:00 - 12:00",
                "type": "Lecture"
            }
        }"#;
        let occ: Occupancy = serde_json::from_str(occupied).unwrap();
        assert_eq!(occ.status, OccupancyStatus::Occupied);
        assert_eq!(occ.details.unwrap().course, "Operating Systems");

        let available = r#"{"status": "Available", "details": null}"#;
        let occ: Occupancy = serde_json::from_str(available).unwrap();
        assert_eq!(occ.status, OccupancyStatus::Available);
        assert!(occ.details.is_none());
    }

    #[test]
    fn search_hits_parse_without_instructor() {
        let json = r#"[
            {"course": "Algorithms", "room": "Room-204", "day": "Monday", "start": "10:00", "end": "12:00"}
        ]"#;
        let hits: Vec<SearchHit> = serde_json::from_str(json).unwrap();
        assert_eq!(hits[0].room, "Room-204");
        assert!(hits[0].instructor.is_none());
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let api = CampusApi::new(&ClientConfig {
            base_url: "http://localhost:5000/".to_string(),
            timeout_seconds: 5,
        })
        .unwrap();
        assert_eq!(api.url("/api/nodes"), "http://localhost:5000/api/nodes");
    }
}
