//! Goal-directed movement: walking (preferring known waypoint paths) and
//! long-range fast travel.
//!
//! Exactly one goal is in flight at a time; accepting a new goal cancels the
//! previous one. Movement itself runs on a worker thread against the
//! [`Mover`] primitive, and completion is reported as a message drained by
//! the owning tick loop through [`NavigationService::poll`], so the machine
//! is never mutated from the worker's context. Cancellation is cooperative: the
//! worker is signaled through a shared flag, and its eventual completion is
//! discarded by a generation check. This service never retries; fallback is
//! the caller's decision.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::core::catalog::Anchor;
use crate::core::geometry::WorldPoint;
use crate::core::paths;

/// Movement primitive provided by the environment. Calls block the worker
/// thread until arrival, failure, timeout, or cancellation, and return
/// whether the goal was reached.
pub trait Mover: Send + Sync {
    fn walk_towards(&self, target: WorldPoint, cancel: &AtomicBool, timeout: Duration) -> bool;
    fn long_range_teleport(&self, anchor: Anchor, cancel: &AtomicBool, timeout: Duration) -> bool;
}

/// The kind of goal that completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavGoal {
    Walk,
    FastTravel,
}

/// A drained completion for the current goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavOutcome {
    pub goal: NavGoal,
    pub success: bool,
}

struct Completion {
    goal: NavGoal,
    success: bool,
    generation: u64,
}

pub struct NavigationService {
    mover: Arc<dyn Mover>,
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
    /// Bumped on every accepted goal and every cancel; completions carrying
    /// an older generation are stale and dropped.
    generation: u64,
    navigating: bool,
    cancel_flag: Option<Arc<AtomicBool>>,
}

impl NavigationService {
    pub fn new(mover: Arc<dyn Mover>) -> Self {
        let (tx, rx) = channel();
        Self {
            mover,
            tx,
            rx,
            generation: 0,
            navigating: false,
            cancel_flag: None,
        }
    }

    /// True from goal acceptance until a valid completion is drained or the
    /// goal is cancelled.
    pub fn is_navigating(&self) -> bool {
        self.navigating
    }

    /// Walk from `from` to `target`, following a known waypoint path when one
    /// connects the endpoints (in either direction), otherwise walking
    /// directly. Completion arrives via [`poll`](Self::poll).
    pub fn walk_to(&mut self, from: WorldPoint, target: WorldPoint, timeout: Duration) {
        let cancel = self.begin();
        let generation = self.generation;
        let mover = Arc::clone(&self.mover);
        let tx = self.tx.clone();
        let route = paths::find_path(from, target, paths::DEFAULT_TOLERANCE);
        match &route {
            Some(path) => info!(path = %path.name, %target, "walking via known path"),
            None => info!(%target, "walking directly"),
        }
        thread::spawn(move || {
            let success = match route {
                Some(path) => path
                    .waypoints
                    .iter()
                    .all(|wp| !cancel.load(Ordering::Relaxed)
                        && mover.walk_towards(*wp, &cancel, timeout)),
                None => mover.walk_towards(target, &cancel, timeout),
            };
            let _ = tx.send(Completion {
                goal: NavGoal::Walk,
                success: success && !cancel.load(Ordering::Relaxed),
                generation,
            });
        });
    }

    /// Teleport to `anchor` via the long-range travel primitive.
    pub fn fast_travel(&mut self, anchor: Anchor, timeout: Duration) {
        let cancel = self.begin();
        let generation = self.generation;
        let mover = Arc::clone(&self.mover);
        let tx = self.tx.clone();
        info!(anchor = anchor.name(), "fast travel");
        thread::spawn(move || {
            let success = mover.long_range_teleport(anchor, &cancel, timeout);
            let _ = tx.send(Completion {
                goal: NavGoal::FastTravel,
                success: success && !cancel.load(Ordering::Relaxed),
                generation,
            });
        });
    }

    /// Cancel any in-flight goal. Idempotent; `is_navigating` is false
    /// immediately, and the cancelled worker's completion is suppressed.
    pub fn cancel(&mut self) {
        if let Some(flag) = self.cancel_flag.take() {
            debug!("cancelling in-flight navigation");
            flag.store(true, Ordering::Relaxed);
        }
        self.generation = self.generation.wrapping_add(1);
        self.navigating = false;
    }

    /// Drain completions, discarding stale generations. Returns the current
    /// goal's outcome at most once.
    pub fn poll(&mut self) -> Option<NavOutcome> {
        while let Ok(done) = self.rx.try_recv() {
            if done.generation != self.generation {
                debug!(?done.goal, "dropping stale navigation completion");
                continue;
            }
            self.navigating = false;
            self.cancel_flag = None;
            if !done.success {
                warn!(goal = ?done.goal, "navigation goal failed");
            }
            return Some(NavOutcome {
                goal: done.goal,
                success: done.success,
            });
        }
        None
    }

    fn begin(&mut self) -> Arc<AtomicBool> {
        if self.navigating {
            self.cancel();
        }
        self.generation = self.generation.wrapping_add(1);
        let cancel = Arc::new(AtomicBool::new(false));
        self.cancel_flag = Some(Arc::clone(&cancel));
        self.navigating = true;
        cancel
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Instant;

    /// Mover that records targets and completes immediately.
    struct RecordingMover {
        walks: Mutex<Vec<WorldPoint>>,
        teleports: Mutex<Vec<Anchor>>,
        walk_result: bool,
        teleport_result: bool,
        delay: Duration,
    }

    impl RecordingMover {
        fn instant(walk_result: bool, teleport_result: bool) -> Self {
            Self {
                walks: Mutex::new(Vec::new()),
                teleports: Mutex::new(Vec::new()),
                walk_result,
                teleport_result,
                delay: Duration::ZERO,
            }
        }

        fn slow(delay: Duration) -> Self {
            Self {
                delay,
                ..Self::instant(true, true)
            }
        }
    }

    impl Mover for RecordingMover {
        fn walk_towards(&self, target: WorldPoint, cancel: &AtomicBool, _timeout: Duration) -> bool {
            self.walks.lock().expect("lock").push(target);
            if !self.delay.is_zero() {
                thread::sleep(self.delay);
            }
            !cancel.load(Ordering::Relaxed) && self.walk_result
        }

        fn long_range_teleport(
            &self,
            anchor: Anchor,
            cancel: &AtomicBool,
            _timeout: Duration,
        ) -> bool {
            self.teleports.lock().expect("lock").push(anchor);
            if !self.delay.is_zero() {
                thread::sleep(self.delay);
            }
            !cancel.load(Ordering::Relaxed) && self.teleport_result
        }
    }

    fn poll_until(nav: &mut NavigationService, timeout: Duration) -> Option<NavOutcome> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(outcome) = nav.poll() {
                return Some(outcome);
            }
            if Instant::now() >= deadline {
                return None;
            }
            thread::sleep(Duration::from_millis(2));
        }
    }

    #[test]
    fn direct_walk_completes_with_success() {
        let mover = Arc::new(RecordingMover::instant(true, true));
        let mut nav = NavigationService::new(Arc::clone(&mover) as Arc<dyn Mover>);
        let target = WorldPoint::ground(10, 10);
        nav.walk_to(WorldPoint::ground(0, 0), target, Duration::from_secs(1));
        assert!(nav.is_navigating());

        let outcome = poll_until(&mut nav, Duration::from_secs(2)).expect("completion");
        assert_eq!(
            outcome,
            NavOutcome {
                goal: NavGoal::Walk,
                success: true
            }
        );
        assert!(!nav.is_navigating());
        assert_eq!(mover.walks.lock().expect("lock").as_slice(), &[target]);
    }

    #[test]
    fn known_path_is_walked_waypoint_by_waypoint() {
        let mover = Arc::new(RecordingMover::instant(true, true));
        let mut nav = NavigationService::new(Arc::clone(&mover) as Arc<dyn Mover>);
        // Catherby anchor to fishing, within default tolerance of both ends.
        let from = WorldPoint::ground(2812, 3450);
        let to = WorldPoint::ground(2838, 3430);
        nav.walk_to(from, to, Duration::from_secs(1));

        poll_until(&mut nav, Duration::from_secs(2)).expect("completion");
        let walks = mover.walks.lock().expect("lock");
        assert_eq!(
            walks.as_slice(),
            &[WorldPoint::ground(2811, 3449), WorldPoint::ground(2836, 3431)]
        );
    }

    #[test]
    fn walk_failure_is_reported_not_retried() {
        let mover = Arc::new(RecordingMover::instant(false, true));
        let mut nav = NavigationService::new(mover as Arc<dyn Mover>);
        nav.walk_to(
            WorldPoint::ground(0, 0),
            WorldPoint::ground(10, 10),
            Duration::from_secs(1),
        );

        let outcome = poll_until(&mut nav, Duration::from_secs(2)).expect("completion");
        assert!(!outcome.success);
        assert_eq!(outcome.goal, NavGoal::Walk);
    }

    #[test]
    fn fast_travel_maps_to_its_goal_kind() {
        let mover = Arc::new(RecordingMover::instant(true, true));
        let mut nav = NavigationService::new(Arc::clone(&mover) as Arc<dyn Mover>);
        nav.fast_travel(Anchor::Draynor, Duration::from_secs(1));

        let outcome = poll_until(&mut nav, Duration::from_secs(2)).expect("completion");
        assert_eq!(outcome.goal, NavGoal::FastTravel);
        assert!(outcome.success);
        assert_eq!(
            mover.teleports.lock().expect("lock").as_slice(),
            &[Anchor::Draynor]
        );
    }

    #[test]
    fn cancel_twice_is_safe_and_clears_navigating() {
        let mover = Arc::new(RecordingMover::slow(Duration::from_millis(50)));
        let mut nav = NavigationService::new(mover as Arc<dyn Mover>);
        nav.walk_to(
            WorldPoint::ground(0, 0),
            WorldPoint::ground(10, 10),
            Duration::from_secs(1),
        );
        nav.cancel();
        nav.cancel();
        assert!(!nav.is_navigating());
    }

    #[test]
    fn cancelled_goal_completion_is_suppressed() {
        let mover = Arc::new(RecordingMover::slow(Duration::from_millis(30)));
        let mut nav = NavigationService::new(mover as Arc<dyn Mover>);
        nav.walk_to(
            WorldPoint::ground(0, 0),
            WorldPoint::ground(10, 10),
            Duration::from_secs(1),
        );
        nav.cancel();

        // The stale worker finishes well inside this window; its completion
        // must never surface.
        assert_eq!(poll_until(&mut nav, Duration::from_millis(200)), None);
        assert!(!nav.is_navigating());
    }

    #[test]
    fn new_goal_supersedes_in_flight_goal() {
        let mover = Arc::new(RecordingMover::slow(Duration::from_millis(30)));
        let mut nav = NavigationService::new(Arc::clone(&mover) as Arc<dyn Mover>);
        nav.walk_to(
            WorldPoint::ground(0, 0),
            WorldPoint::ground(10, 10),
            Duration::from_secs(1),
        );
        nav.fast_travel(Anchor::Catherby, Duration::from_secs(1));

        // Only the teleport completion may surface.
        let outcome = poll_until(&mut nav, Duration::from_secs(2)).expect("completion");
        assert_eq!(outcome.goal, NavGoal::FastTravel);
        assert_eq!(poll_until(&mut nav, Duration::from_millis(100)), None);
    }
}
