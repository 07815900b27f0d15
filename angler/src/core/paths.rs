//! Predefined waypoint paths between tested spots.
//!
//! Navigation prefers a known multi-waypoint route over a direct walk when
//! one connects (approximately) the current position and the target. Paths
//! are stored one-directional and matched in both directions; a reverse match
//! yields a reversed copy.

use crate::core::geometry::WorldPoint;

/// Endpoint match tolerance, in tiles, when looking up a known path.
pub const DEFAULT_TOLERANCE: f64 = 20.0;

/// A named ordered sequence of at least two waypoints.
#[derive(Debug, Clone, PartialEq)]
pub struct WaypointPath {
    pub name: String,
    pub waypoints: Vec<WorldPoint>,
}

impl WaypointPath {
    pub fn new(name: impl Into<String>, waypoints: Vec<WorldPoint>) -> Self {
        debug_assert!(waypoints.len() >= 2, "a path needs at least two waypoints");
        Self {
            name: name.into(),
            waypoints,
        }
    }

    pub fn start(&self) -> WorldPoint {
        self.waypoints[0]
    }

    pub fn end(&self) -> WorldPoint {
        self.waypoints[self.waypoints.len() - 1]
    }

    /// The same route walked the other way, under a derived name.
    pub fn reversed(&self) -> WaypointPath {
        let mut waypoints = self.waypoints.clone();
        waypoints.reverse();
        WaypointPath::new(format!("{} (reversed)", self.name), waypoints)
    }
}

struct KnownPath {
    name: &'static str,
    waypoints: &'static [WorldPoint],
}

impl KnownPath {
    fn to_path(&self) -> WaypointPath {
        WaypointPath::new(self.name, self.waypoints.to_vec())
    }
}

const KNOWN_PATHS: &[KnownPath] = &[
    KnownPath {
        name: "Edgeville anchor to bank",
        waypoints: &[WorldPoint::ground(3067, 3505), WorldPoint::ground(3093, 3493)],
    },
    KnownPath {
        name: "Catherby anchor to fishing",
        waypoints: &[WorldPoint::ground(2811, 3449), WorldPoint::ground(2836, 3431)],
    },
    KnownPath {
        name: "Catherby bank to fishing",
        waypoints: &[WorldPoint::ground(2809, 3440), WorldPoint::ground(2836, 3431)],
    },
    KnownPath {
        name: "Edgeville anchor to Barbarian Village fishing",
        waypoints: &[WorldPoint::ground(3067, 3505), WorldPoint::ground(3100, 3430)],
    },
    KnownPath {
        name: "Fishing Guild fishing to bank",
        waypoints: &[WorldPoint::ground(2605, 3414), WorldPoint::ground(2588, 3420)],
    },
];

/// Find a known path whose endpoints lie within `tolerance` of `from` and
/// `to`. Each path is checked forward first, then reversed.
pub fn find_path(from: WorldPoint, to: WorldPoint, tolerance: f64) -> Option<WaypointPath> {
    for known in KNOWN_PATHS {
        let path = known.to_path();
        if path.start().is_within(from, tolerance) && path.end().is_within(to, tolerance) {
            return Some(path);
        }
        let reversed = path.reversed();
        if reversed.start().is_within(from, tolerance) && reversed.end().is_within(to, tolerance) {
            return Some(reversed);
        }
    }
    None
}
