use serde::{Deserialize, Serialize};

/// What a directory node is, as reported by the node directory.
///
/// The directory is free to grow new type strings; anything this client does
/// not recognize lands in `Other` and is treated like a corridor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Room,
    Department,
    Corridor,
    Stairs,
    Elevator,
    #[serde(other)]
    Other,
}

impl NodeKind {
    /// Whether a destination of this kind has a schedule worth checking.
    pub fn is_occupiable(self) -> bool {
        matches!(self, NodeKind::Room | NodeKind::Department)
    }
}

/// A named point of interest in the building graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub floor: u32,
    #[serde(rename = "type")]
    pub kind: NodeKind,
}

/// One point of a computed route, in the pixel space of a floor image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub x: f64,
    pub y: f64,
    pub floor: u32,
}

/// Aggregate figures for a computed route.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteStats {
    pub total_time_seconds: f64,
    pub total_distance_meters: f64,
}

/// A computed path: ordered waypoints plus aggregate stats and the
/// human-readable turn-by-turn directions.
///
/// Consecutive waypoints on the same floor are connected by a straight
/// segment; a floor change between consecutive waypoints is a vertical
/// transition (stairs or elevator) with no drawable in-floor line.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub waypoints: Vec<Waypoint>,
    pub stats: RouteStats,
    pub directions: Vec<String>,
}

/// Live occupancy status of a room or department.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OccupancyStatus {
    Occupied,
    Available,
    #[serde(rename = "unknown")]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccupancyDetails {
    pub course: String,
    pub instructor: String,
    /// Shaped "HH:MM - HH:MM".
    pub time: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Occupancy {
    pub status: OccupancyStatus,
    #[serde(default)]
    pub details: Option<OccupancyDetails>,
}

/// One row of a schedule search response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub course: String,
    pub room: String,
    #[serde(default)]
    pub instructor: Option<String>,
    pub day: String,
    pub start: String,
    pub end: String,
}

/// Routing hint passed through to the routing service, not interpreted here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TravelMode {
    Normal,
    EnergySaver,
    Wheelchair,
}

impl TravelMode {
    pub const ALL: [TravelMode; 3] = [
        TravelMode::Normal,
        TravelMode::EnergySaver,
        TravelMode::Wheelchair,
    ];

    /// Wire identifier understood by the routing service.
    pub fn as_str(self) -> &'static str {
        match self {
            TravelMode::Normal => "normal",
            TravelMode::EnergySaver => "energy_saver",
            TravelMode::Wheelchair => "wheelchair",
        }
    }

    /// Short label for the mode picker.
    pub fn label(self) -> &'static str {
        match self {
            TravelMode::Normal => "Fastest",
            TravelMode::EnergySaver => "No Stairs",
            TravelMode::Wheelchair => "Elevator",
        }
    }
}

impl Default for TravelMode {
    fn default() -> Self {
        TravelMode::Normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_kind_parses_wire_strings() {
        let node: Node = serde_json::from_str(
            r#"{"name": "Room-204", "x": 120.0, "y": 88.5, "floor": 1, "type": "room"}"#,
        )
        .unwrap();
        assert_eq!(node.kind, NodeKind::Room);
        assert!(node.kind.is_occupiable());

        let node: Node = serde_json::from_str(
            r#"{"name": "Atrium", "x": 0.0, "y": 0.0, "floor": 0, "type": "plaza"}"#,
        )
        .unwrap();
        assert_eq!(node.kind, NodeKind::Other);
        assert!(!node.kind.is_occupiable());
    }

    #[test]
    fn occupancy_status_falls_back_to_unknown() {
        let occ: Occupancy = serde_json::from_str(r#"{"status": "Occupied"}"#).unwrap();
        assert_eq!(occ.status, OccupancyStatus::Occupied);
        assert!(occ.details.is_none());

        let occ: Occupancy = serde_json::from_str(r#"{"status": "maybe?"}"#).unwrap();
        assert_eq!(occ.status, OccupancyStatus::Unknown);
    }

    #[test]
    fn travel_mode_serializes_to_wire_ids() {
        for mode in TravelMode::ALL {
            let json = serde_json::to_string(&mode).unwrap();
            assert_eq!(json, format!("\"{}\"", mode.as_str()));
        }
    }
}
