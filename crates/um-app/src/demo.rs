//! Demo mode
//!
//! An in-process campus dataset plus a scripted camera feed, so the client
//! can be driven end to end without the backend or a physical camera.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use tokio::runtime::Handle;

use um_core::model::{
    Node, NodeKind, Occupancy, OccupancyDetails, OccupancyStatus, Route, RouteStats, SearchHit,
    TravelMode, Waypoint,
};
use um_core::ports::{DirectoryPort, RoutePort, SchedulePort};
use um_core::session::{
    CameraError, CameraFeed, CameraPort, CaptureConfig, DecodeAttempt, FrameSink,
};

const METERS_PER_PIXEL: f64 = 0.08;
/// Extra walking meters charged per floor crossed.
const FLOOR_CHANGE_METERS: f64 = 6.0;
/// Both stairwell landings sit at this map position on every floor.
const STAIRS_XY: (f64, f64) = (420.0, 360.0);

pub struct DemoCampus {
    nodes: Vec<Node>,
    schedule: Vec<SearchHit>,
}

impl DemoCampus {
    pub fn new() -> Self {
        Self {
            nodes: campus_nodes(),
            schedule: campus_schedule(),
        }
    }

    fn find(&self, name: &str) -> anyhow::Result<Node> {
        self.nodes
            .iter()
            .find(|n| n.name == name)
            .cloned()
            .ok_or_else(|| anyhow!("unknown node: {name}"))
    }
}

impl Default for DemoCampus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl DirectoryPort for DemoCampus {
    async fn nodes(&self) -> anyhow::Result<Vec<Node>> {
        tokio::time::sleep(Duration::from_millis(80)).await;
        Ok(self.nodes.clone())
    }
}

#[async_trait::async_trait]
impl RoutePort for DemoCampus {
    async fn route(&self, start: &str, end: &str, mode: TravelMode) -> anyhow::Result<Route> {
        tokio::time::sleep(Duration::from_millis(200)).await;
        let from = self.find(start)?;
        let to = self.find(end)?;

        let mut waypoints = vec![waypoint(from.x, from.y, from.floor)];
        if from.floor != to.floor {
            waypoints.push(waypoint(STAIRS_XY.0, STAIRS_XY.1, from.floor));
            waypoints.push(waypoint(STAIRS_XY.0, STAIRS_XY.1, to.floor));
        }
        waypoints.push(waypoint(to.x, to.y, to.floor));

        let pixels: f64 = waypoints
            .windows(2)
            .filter(|pair| pair[0].floor == pair[1].floor)
            .map(|pair| {
                let dx = pair[1].x - pair[0].x;
                let dy = pair[1].y - pair[0].y;
                (dx * dx + dy * dy).sqrt()
            })
            .sum();
        let floor_gap = from.floor.abs_diff(to.floor) as f64;
        let meters = pixels * METERS_PER_PIXEL + floor_gap * FLOOR_CHANGE_METERS;
        let speed = match mode {
            TravelMode::Normal => 1.4,
            TravelMode::EnergySaver => 1.2,
            TravelMode::Wheelchair => 1.0,
        };

        let mut directions = vec![format!("Start at {}", from.name)];
        if from.floor != to.floor {
            let via = if mode == TravelMode::Wheelchair {
                "elevator"
            } else {
                "stairs"
            };
            directions.push(format!("Head to the {via}"));
            directions.push(format!("Take the {via} to floor {}", to.floor));
        }
        directions.push(format!("Arrive at {}", to.name));

        Ok(Route {
            waypoints,
            stats: RouteStats {
                total_time_seconds: meters / speed,
                total_distance_meters: meters,
            },
            directions,
        })
    }
}

#[async_trait::async_trait]
impl SchedulePort for DemoCampus {
    async fn occupancy(&self, room: &str) -> anyhow::Result<Occupancy> {
        tokio::time::sleep(Duration::from_millis(120)).await;
        if room == "Room-204" {
            return Ok(Occupancy {
                status: OccupancyStatus::Occupied,
                details: Some(OccupancyDetails {
                    course: "Algorithms".to_string(),
                    instructor: "Dr. Haddad".to_string(),
                    time: "10:00 - 12:00".to_string(),
                    kind: Some("Lecture".to_string()),
                }),
            });
        }
        Ok(Occupancy {
            status: OccupancyStatus::Available,
            details: None,
        })
    }

    async fn search(&self, query: &str) -> anyhow::Result<Vec<SearchHit>> {
        tokio::time::sleep(Duration::from_millis(150)).await;
        let needle = query.to_lowercase();
        Ok(self
            .schedule
            .iter()
            .filter(|hit| {
                hit.course.to_lowercase().contains(&needle)
                    || hit.room.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect())
    }
}

/// Scripted camera: a couple of seconds of empty frames, then the
/// configured payload on every following frame. Exclusive like the real
/// device; a second acquire while a feed is live fails fast.
pub struct DemoCamera {
    runtime: Handle,
    payload: String,
    in_use: Arc<AtomicBool>,
}

impl DemoCamera {
    pub fn new(runtime: Handle, payload: impl Into<String>) -> Self {
        Self {
            runtime,
            payload: payload.into(),
            in_use: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl CameraPort for DemoCamera {
    fn acquire(
        &self,
        config: &CaptureConfig,
        sink: FrameSink,
    ) -> Result<Box<dyn CameraFeed>, CameraError> {
        if self.in_use.swap(true, Ordering::SeqCst) {
            return Err(CameraError::Busy);
        }

        let stop = Arc::new(AtomicBool::new(false));
        let task_stop = stop.clone();
        let payload = self.payload.clone();
        let fps = config.fps.max(1);
        let interval = Duration::from_millis(1000 / u64::from(fps));
        let warmup_frames = fps * 2;

        self.runtime.spawn(async move {
            let mut frames = 0u32;
            loop {
                tokio::time::sleep(interval).await;
                if task_stop.load(Ordering::SeqCst) {
                    break;
                }
                frames += 1;
                let attempt = if frames < warmup_frames {
                    DecodeAttempt::NoCode
                } else {
                    DecodeAttempt::Decoded(payload.clone())
                };
                (*sink)(attempt);
            }
        });

        Ok(Box::new(DemoFeed {
            stop,
            in_use: self.in_use.clone(),
        }))
    }
}

struct DemoFeed {
    stop: Arc<AtomicBool>,
    in_use: Arc<AtomicBool>,
}

impl DemoFeed {
    fn release(&mut self) {
        if !self.stop.swap(true, Ordering::SeqCst) {
            self.in_use.store(false, Ordering::SeqCst);
        }
    }
}

impl CameraFeed for DemoFeed {
    fn shut_down(&mut self) {
        self.release();
    }
}

impl Drop for DemoFeed {
    fn drop(&mut self) {
        self.release();
    }
}

fn waypoint(x: f64, y: f64, floor: u32) -> Waypoint {
    Waypoint { x, y, floor }
}

fn node(name: &str, x: f64, y: f64, floor: u32, kind: NodeKind) -> Node {
    Node {
        name: name.to_string(),
        x,
        y,
        floor,
        kind,
    }
}

fn campus_nodes() -> Vec<Node> {
    vec![
        node("Gate-1", 80.0, 520.0, 0, NodeKind::Corridor),
        node("Main-Hallway", 320.0, 430.0, 0, NodeKind::Corridor),
        node("Cafeteria", 560.0, 480.0, 0, NodeKind::Department),
        node("Room-101", 240.0, 300.0, 0, NodeKind::Room),
        node("Stairs-A", STAIRS_XY.0, STAIRS_XY.1, 0, NodeKind::Stairs),
        node("Elevator-1", 470.0, 360.0, 0, NodeKind::Elevator),
        node("Room-204", 250.0, 180.0, 1, NodeKind::Room),
        node("Room-210", 520.0, 200.0, 1, NodeKind::Room),
        node("CS-Department", 620.0, 320.0, 1, NodeKind::Department),
        node("Library", 340.0, 260.0, 2, NodeKind::Department),
        node("Seminar-Hall", 540.0, 300.0, 2, NodeKind::Room),
    ]
}

fn campus_schedule() -> Vec<SearchHit> {
    let hit = |course: &str, room: &str, instructor: &str, day: &str, start: &str, end: &str| {
        SearchHit {
            course: course.to_string(),
            room: room.to_string(),
            instructor: Some(instructor.to_string()),
            day: day.to_string(),
            start: start.to_string(),
            end: end.to_string(),
        }
    };
    vec![
        hit("Algorithms", "Room-204", "Dr. Haddad", "Monday", "10:00", "12:00"),
        hit("Operating Systems", "Room-210", "Dr. Mansour", "Monday", "12:00", "14:00"),
        hit("Databases", "Room-101", "Dr. Saleh", "Tuesday", "09:00", "11:00"),
        hit("Linear Algebra", "Seminar-Hall", "Dr. Odeh", "Wednesday", "08:00", "10:00"),
        hit("Computer Networks", "Room-204", "Dr. Haddad", "Thursday", "10:00", "12:00"),
    ]
}
