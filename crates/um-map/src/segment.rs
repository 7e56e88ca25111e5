//! Path segmentation
//!
//! A route is a flat waypoint sequence that may hop between floors; only
//! maximal runs of same-floor waypoints are drawable as polylines. A floor
//! change between consecutive waypoints is a vertical transition with no
//! in-floor line, and re-entering a floor later starts a new run.

use um_core::model::{Route, Waypoint};

/// A maximal run of consecutive same-floor waypoints.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub points: Vec<Waypoint>,
}

impl Segment {
    pub fn is_singleton(&self) -> bool {
        self.points.len() == 1
    }
}

/// Extract the floor's segments from a route, in route order.
///
/// Never emits an empty segment. Singletons are kept; whether they draw a
/// line is decided by [`drawable_segments`].
pub fn segments_for_floor(route: &Route, floor: u32) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut run: Vec<Waypoint> = Vec::new();
    for waypoint in &route.waypoints {
        if waypoint.floor == floor {
            run.push(*waypoint);
        } else if !run.is_empty() {
            segments.push(Segment {
                points: std::mem::take(&mut run),
            });
        }
    }
    if !run.is_empty() {
        segments.push(Segment { points: run });
    }
    segments
}

/// Segments that take part in line rendering.
///
/// A singleton is retained only when it is the floor's sole segment (a lone
/// waypoint, e.g. a start that immediately leaves via the elevator, still
/// renders a marker); with multiple segments on the floor, singletons carry
/// no drawable edge and are dropped here. They stay available in the full
/// [`segments_for_floor`] output for marker placement.
pub fn drawable_segments(segments: &[Segment]) -> Vec<&Segment> {
    if segments.len() <= 1 {
        return segments.iter().collect();
    }
    segments.iter().filter(|s| !s.is_singleton()).collect()
}

/// Sum of Euclidean distances between consecutive points.
///
/// Used to scale the draw-in animation, not for correctness.
pub fn segment_length(segment: &Segment) -> f64 {
    segment
        .points
        .windows(2)
        .map(|pair| {
            let dx = pair[1].x - pair[0].x;
            let dy = pair[1].y - pair[0].y;
            (dx * dx + dy * dy).sqrt()
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use um_core::model::RouteStats;

    fn route(floors: &[u32]) -> Route {
        Route {
            waypoints: floors
                .iter()
                .enumerate()
                .map(|(i, &floor)| Waypoint {
                    x: i as f64 * 10.0,
                    y: 0.0,
                    floor,
                })
                .collect(),
            stats: RouteStats {
                total_time_seconds: 0.0,
                total_distance_meters: 0.0,
            },
            directions: Vec::new(),
        }
    }

    #[test]
    fn floor_reentry_starts_a_new_segment() {
        let route = route(&[0, 0, 1, 1, 0]);

        let ground = segments_for_floor(&route, 0);
        assert_eq!(ground.len(), 2);
        assert_eq!(ground[0].points.len(), 2);
        assert_eq!(ground[1].points.len(), 1, "trailing singleton");

        let first = segments_for_floor(&route, 1);
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].points.len(), 2);
    }

    #[test]
    fn segments_are_never_empty_and_reproduce_the_route() {
        let route = route(&[2, 0, 0, 1, 1, 1, 0, 2, 2]);

        let mut reassembled = Vec::new();
        for floor in [0, 1, 2] {
            for segment in segments_for_floor(&route, floor) {
                assert!(!segment.points.is_empty());
                reassembled.extend(segment.points);
            }
        }
        // Emission order within a floor follows route order, so sorting the
        // concatenation by x restores the original sequence.
        reassembled.sort_by(|a, b| a.x.total_cmp(&b.x));
        assert_eq!(reassembled, route.waypoints);
    }

    #[test]
    fn absent_floor_yields_no_segments() {
        let route = route(&[0, 0, 1]);
        assert!(segments_for_floor(&route, 7).is_empty());
    }

    #[test]
    fn lone_singleton_stays_drawable_for_marker_rendering() {
        let lone_start = route(&[1, 0, 0]);

        let first = segments_for_floor(&lone_start, 1);
        assert_eq!(drawable_segments(&first).len(), 1);

        let mixed = segments_for_floor(&route(&[0, 1, 0, 0]), 0);
        assert_eq!(mixed.len(), 2);
        let drawable = drawable_segments(&mixed);
        assert_eq!(drawable.len(), 1);
        assert_eq!(drawable[0].points.len(), 2);
    }

    #[test]
    fn segment_length_sums_euclidean_distances() {
        let segment = Segment {
            points: vec![
                Waypoint { x: 0.0, y: 0.0, floor: 0 },
                Waypoint { x: 3.0, y: 4.0, floor: 0 },
                Waypoint { x: 3.0, y: 10.0, floor: 0 },
            ],
        };
        assert!((segment_length(&segment) - 11.0).abs() < 1e-9);

        let singleton = Segment {
            points: vec![Waypoint { x: 1.0, y: 1.0, floor: 0 }],
        };
        assert_eq!(segment_length(&singleton), 0.0);
    }
}
