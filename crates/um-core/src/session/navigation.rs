//! Navigation session controller

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::events::events::{DirectoryLoaded, OccupancySettled, RouteFailed, RouteLoaded};
use crate::events::EventBus;
use crate::model::{Node, Occupancy, OccupancyStatus, Route, TravelMode};
use crate::ports::{RoutePort, SchedulePort};

/// Session state stored internally
struct NavState {
    start: String,
    end: String,
    mode: TravelMode,
    floor: u32,
    directory: Arc<Vec<Node>>,
    route: Option<Route>,
    occupancy: Option<Occupancy>,
    /// Bumped every time a new route lands, so views can restart draw-in.
    route_epoch: u64,
}

/// The top-level navigation session
///
/// Owns the current (start, end, mode, floor) selection, the loaded route
/// with its stats and directions, and the best-effort destination occupancy.
/// All outbound side effects are confined to [`NavigationSession::go`].
pub struct NavigationSession {
    state: RwLock<NavState>,
    route_port: Arc<dyn RoutePort>,
    schedule_port: Arc<dyn SchedulePort>,
    events: Arc<EventBus>,
}

/// Cloned per frame by the UI; cheap apart from the route itself.
#[derive(Debug, Clone)]
pub struct NavigationSnapshot {
    pub start: String,
    pub end: String,
    pub mode: TravelMode,
    pub floor: u32,
    pub directory: Arc<Vec<Node>>,
    pub route: Option<Route>,
    pub occupancy: Option<Occupancy>,
    pub route_epoch: u64,
}

impl NavigationSession {
    pub fn new(
        route_port: Arc<dyn RoutePort>,
        schedule_port: Arc<dyn SchedulePort>,
        events: Arc<EventBus>,
    ) -> Self {
        Self {
            state: RwLock::new(NavState {
                start: String::new(),
                end: String::new(),
                mode: TravelMode::default(),
                floor: 0,
                directory: Arc::new(Vec::new()),
                route: None,
                occupancy: None,
                route_epoch: 0,
            }),
            route_port,
            schedule_port,
            events,
        }
    }

    /// Install the directory snapshot fetched at startup.
    pub fn load_directory(&self, mut nodes: Vec<Node>) {
        nodes.sort_by(|a, b| a.name.cmp(&b.name));
        let count = nodes.len();
        self.state.write().directory = Arc::new(nodes);
        info!(count, "node directory loaded");
        self.events.publish(DirectoryLoaded { node_count: count });
    }

    pub fn set_start(&self, name: impl Into<String>) {
        self.state.write().start = name.into();
    }

    pub fn set_end(&self, name: impl Into<String>) {
        self.state.write().end = name.into();
    }

    pub fn set_mode(&self, mode: TravelMode) {
        self.state.write().mode = mode;
    }

    pub fn set_floor(&self, floor: u32) {
        self.state.write().floor = floor;
    }

    pub fn snapshot(&self) -> NavigationSnapshot {
        let s = self.state.read();
        NavigationSnapshot {
            start: s.start.clone(),
            end: s.end.clone(),
            mode: s.mode,
            floor: s.floor,
            directory: s.directory.clone(),
            route: s.route.clone(),
            occupancy: s.occupancy.clone(),
            route_epoch: s.route_epoch,
        }
    }

    /// Request a route for the current selection.
    ///
    /// A no-op unless start and end are both set and distinct. On success the
    /// route, stats and directions are stored, destination occupancy is
    /// looked up when the destination is a room or department, and the
    /// displayed floor switches to the start node's floor. On failure the
    /// prior session state is left untouched and a notice is published.
    ///
    /// The occupancy request is only issued after the route result is known;
    /// the two never race within one call. Repeated `go` calls are not
    /// ordered against each other (last response wins).
    pub async fn go(&self) {
        let (start, end, mode) = {
            let s = self.state.read();
            (s.start.clone(), s.end.clone(), s.mode)
        };
        if start.is_empty() || end.is_empty() || start == end {
            debug!(%start, %end, "navigation request skipped, incomplete selection");
            return;
        }

        info!(%start, %end, mode = mode.as_str(), "requesting route");
        let route = match self.route_port.route(&start, &end, mode).await {
            Ok(route) => route,
            Err(err) => {
                warn!(error = %err, "route request failed");
                self.events.publish(RouteFailed {
                    message: "Could not calculate a route. Please try again.".to_string(),
                });
                return;
            }
        };

        // Occupancy is best-effort: a failure downgrades to "unknown" and
        // never fails the navigation result.
        let destination = self.find_node(&end);
        let occupancy = match &destination {
            Some(node) if node.kind.is_occupiable() => {
                match self.schedule_port.occupancy(&end).await {
                    Ok(occupancy) => {
                        self.events.publish(OccupancySettled {
                            room: end.clone(),
                            status: occupancy.status,
                        });
                        Some(occupancy)
                    }
                    Err(err) => {
                        warn!(room = %end, error = %err, "occupancy lookup failed");
                        self.events.publish(OccupancySettled {
                            room: end.clone(),
                            status: OccupancyStatus::Unknown,
                        });
                        None
                    }
                }
            }
            _ => None,
        };

        let start_floor = self.find_node(&start).map(|n| n.floor);

        let floor = {
            let mut s = self.state.write();
            s.route = Some(route);
            s.occupancy = occupancy;
            s.route_epoch += 1;
            if let Some(floor) = start_floor {
                s.floor = floor;
            }
            s.floor
        };

        info!(%start, %end, floor, "route loaded");
        self.events.publish(RouteLoaded { start, end, floor });
    }

    /// Clear the session back to its initial data state.
    ///
    /// Mode and the displayed floor survive. Idempotent.
    pub fn reset(&self) {
        let mut s = self.state.write();
        s.route = None;
        s.occupancy = None;
        s.start.clear();
        s.end.clear();
    }

    fn find_node(&self, name: &str) -> Option<Node> {
        let s = self.state.read();
        s.directory.iter().find(|n| n.name == name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NodeKind, OccupancyDetails, RouteStats, SearchHit, Waypoint};
    use anyhow::bail;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubRoutes {
        fail: bool,
        calls: AtomicUsize,
    }

    impl StubRoutes {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                fail,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl RoutePort for StubRoutes {
        async fn route(&self, _start: &str, _end: &str, _mode: TravelMode) -> anyhow::Result<Route> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                bail!("no path found");
            }
            Ok(Route {
                waypoints: vec![
                    Waypoint { x: 0.0, y: 0.0, floor: 0 },
                    Waypoint { x: 10.0, y: 0.0, floor: 0 },
                    Waypoint { x: 10.0, y: 0.0, floor: 1 },
                ],
                stats: RouteStats {
                    total_time_seconds: 90.0,
                    total_distance_meters: 48.0,
                },
                directions: vec!["Head east".to_string(), "Take the stairs".to_string()],
            })
        }
    }

    struct StubSchedule {
        fail: bool,
        occupancy_calls: AtomicUsize,
    }

    impl StubSchedule {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                fail,
                occupancy_calls: AtomicUsize::new(0),
            })
        }

        fn occupancy_calls(&self) -> usize {
            self.occupancy_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl SchedulePort for StubSchedule {
        async fn occupancy(&self, _room: &str) -> anyhow::Result<Occupancy> {
            self.occupancy_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                bail!("schedule store unreachable");
            }
            Ok(Occupancy {
                status: OccupancyStatus::Occupied,
                details: Some(OccupancyDetails {
                    course: "Algorithms".to_string(),
                    instructor: "Dr. Haddad".to_string(),
                    time: "10:00 - 12:00".to_string(),
                    kind: None,
                }),
            })
        }

        async fn search(&self, _query: &str) -> anyhow::Result<Vec<SearchHit>> {
            Ok(Vec::new())
        }
    }

    fn campus_directory() -> Vec<Node> {
        vec![
            Node {
                name: "Gate-1".to_string(),
                x: 0.0,
                y: 0.0,
                floor: 0,
                kind: NodeKind::Corridor,
            },
            Node {
                name: "Room-204".to_string(),
                x: 10.0,
                y: 0.0,
                floor: 1,
                kind: NodeKind::Room,
            },
            Node {
                name: "Main-Hallway".to_string(),
                x: 5.0,
                y: 0.0,
                floor: 0,
                kind: NodeKind::Corridor,
            },
        ]
    }

    fn session(
        routes: Arc<StubRoutes>,
        schedule: Arc<StubSchedule>,
    ) -> (Arc<NavigationSession>, Arc<EventBus>) {
        let events = Arc::new(EventBus::new());
        let session = Arc::new(NavigationSession::new(routes, schedule, events.clone()));
        session.load_directory(campus_directory());
        (session, events)
    }

    #[tokio::test]
    async fn go_stores_route_checks_occupancy_and_switches_floor() {
        let routes = StubRoutes::new(false);
        let schedule = StubSchedule::new(false);
        let (session, _events) = session(routes.clone(), schedule.clone());

        session.set_start("Gate-1");
        session.set_end("Room-204");
        session.set_floor(2);
        session.go().await;

        let snap = session.snapshot();
        assert!(snap.route.is_some());
        assert_eq!(snap.floor, 0, "auto-switches to the start node's floor");
        assert_eq!(schedule.occupancy_calls(), 1);
        assert_eq!(
            snap.occupancy.map(|o| o.status),
            Some(OccupancyStatus::Occupied)
        );
        assert_eq!(routes.calls(), 1);
    }

    #[tokio::test]
    async fn corridor_destination_issues_no_occupancy_request() {
        let routes = StubRoutes::new(false);
        let schedule = StubSchedule::new(false);
        let (session, _events) = session(routes, schedule.clone());

        session.set_start("Room-204");
        session.set_end("Main-Hallway");
        session.go().await;

        let snap = session.snapshot();
        assert!(snap.route.is_some());
        assert_eq!(schedule.occupancy_calls(), 0);
        assert!(snap.occupancy.is_none());
        assert_eq!(snap.floor, 1, "start node is on the first floor");
    }

    #[tokio::test]
    async fn route_failure_leaves_prior_state_untouched_and_publishes_notice() {
        let routes = StubRoutes::new(true);
        let schedule = StubSchedule::new(false);
        let (session, events) = session(routes, schedule.clone());

        let notices = Arc::new(Mutex::new(Vec::new()));
        let sink = notices.clone();
        events.subscribe::<RouteFailed>(crate::events::handler_from_fn(move |event| {
            if let Some(e) = event.as_any().downcast_ref::<RouteFailed>() {
                sink.lock().push(e.message.clone());
            }
        }));

        session.set_start("Gate-1");
        session.set_end("Room-204");
        session.set_floor(2);
        session.go().await;

        let snap = session.snapshot();
        assert!(snap.route.is_none());
        assert!(snap.occupancy.is_none());
        assert_eq!(snap.floor, 2, "floor is not switched on failure");
        assert_eq!(schedule.occupancy_calls(), 0);
        assert_eq!(notices.lock().len(), 1);
    }

    #[tokio::test]
    async fn occupancy_failure_keeps_the_route() {
        let routes = StubRoutes::new(false);
        let schedule = StubSchedule::new(true);
        let (session, _events) = session(routes, schedule.clone());

        session.set_start("Gate-1");
        session.set_end("Room-204");
        session.go().await;

        let snap = session.snapshot();
        assert!(snap.route.is_some());
        assert!(snap.occupancy.is_none(), "downgraded to unknown");
        assert_eq!(schedule.occupancy_calls(), 1);
    }

    #[tokio::test]
    async fn go_is_a_no_op_without_a_complete_selection() {
        let routes = StubRoutes::new(false);
        let schedule = StubSchedule::new(false);
        let (session, _events) = session(routes.clone(), schedule);

        session.go().await;
        session.set_start("Gate-1");
        session.go().await;
        session.set_end("Gate-1");
        session.go().await; // start == end

        assert_eq!(routes.calls(), 0);
        assert!(session.snapshot().route.is_none());
    }

    #[tokio::test]
    async fn reset_is_idempotent_and_gates_further_navigation() {
        let routes = StubRoutes::new(false);
        let schedule = StubSchedule::new(false);
        let (session, _events) = session(routes.clone(), schedule);

        session.set_start("Gate-1");
        session.set_end("Room-204");
        session.set_mode(TravelMode::Wheelchair);
        session.go().await;
        assert!(session.snapshot().route.is_some());

        session.reset();
        let once = session.snapshot();
        session.reset();
        let twice = session.snapshot();

        assert!(once.route.is_none() && once.occupancy.is_none());
        assert!(once.start.is_empty() && once.end.is_empty());
        assert_eq!(once.mode, TravelMode::Wheelchair, "mode survives reset");
        assert_eq!(once.floor, twice.floor);
        assert_eq!(once.start, twice.start);
        assert_eq!(once.end, twice.end);
        assert_eq!(once.route.is_none(), twice.route.is_none());

        // Cleared selection makes go a no-op again.
        session.go().await;
        assert_eq!(routes.calls(), 1);
    }
}
