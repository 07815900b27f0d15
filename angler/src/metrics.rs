//! Session statistics: catch totals, trip accounting, skill progress, and
//! estimated value.
//!
//! Recording happens on the tick context while the status surface reads
//! concurrently, so all counters sit behind one mutex. Rates use wall-clock
//! time since session start and are guarded to 0 at zero elapsed time.
//! Prices come from an injected [`PriceSource`] so the core stays testable
//! without network access.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::world::SkillSnapshot;

/// Price lookup collaborator. The live implementation fronts an external
/// exchange client with its own caching; absent prices value as 0.
pub trait PriceSource: Send + Sync {
    fn cached_price(&self, item_id: u32) -> Option<i64>;
}

/// Price source that knows nothing. Used when no exchange client is wired.
pub struct NoPrices;

impl PriceSource for NoPrices {
    fn cached_price(&self, _item_id: u32) -> Option<i64> {
        None
    }
}

struct Counters {
    collected: BTreeMap<u32, u64>,
    current_trip: u64,
    completed_trips: u32,
    trip_totals: Vec<u64>,
    trip_started: Instant,
    skill_baseline: Option<SkillSnapshot>,
    skill_latest: Option<SkillSnapshot>,
}

pub struct MetricsService {
    started: Instant,
    prices: Arc<dyn PriceSource>,
    counters: Mutex<Counters>,
}

impl MetricsService {
    pub fn new(prices: Arc<dyn PriceSource>) -> Self {
        let started = Instant::now();
        Self {
            started,
            prices,
            counters: Mutex::new(Counters {
                collected: BTreeMap::new(),
                current_trip: 0,
                completed_trips: 0,
                trip_totals: Vec::new(),
                trip_started: started,
                skill_baseline: None,
                skill_latest: None,
            }),
        }
    }

    pub fn record_collected(&self, item_id: u32, amount: u64) {
        let mut counters = self.lock();
        *counters.collected.entry(item_id).or_insert(0) += amount;
        counters.current_trip += amount;
    }

    /// Close out the current trip. A zero-count trip is counted but never
    /// appended to the trip history; the current-trip counter always resets.
    pub fn record_trip_completed(&self) {
        let mut counters = self.lock();
        counters.completed_trips += 1;
        if counters.current_trip > 0 {
            let total = counters.current_trip;
            counters.trip_totals.push(total);
        }
        counters.current_trip = 0;
        counters.trip_started = Instant::now();
    }

    /// Feed the latest skill reading. The first observation becomes the
    /// session baseline.
    pub fn observe_skill(&self, skill: SkillSnapshot) {
        let mut counters = self.lock();
        if counters.skill_baseline.is_none() {
            counters.skill_baseline = Some(skill);
        }
        counters.skill_latest = Some(skill);
    }

    pub fn runtime(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn total_collected(&self) -> u64 {
        self.lock().collected.values().sum()
    }

    pub fn count_for(&self, item_id: u32) -> u64 {
        self.lock().collected.get(&item_id).copied().unwrap_or(0)
    }

    pub fn all_counts(&self) -> BTreeMap<u32, u64> {
        self.lock().collected.clone()
    }

    pub fn collected_per_hour(&self) -> f64 {
        per_hour(self.total_collected() as f64, self.runtime())
    }

    pub fn xp_gained(&self) -> u64 {
        let counters = self.lock();
        match (counters.skill_baseline, counters.skill_latest) {
            (Some(base), Some(latest)) => latest.xp.saturating_sub(base.xp),
            _ => 0,
        }
    }

    pub fn xp_per_hour(&self) -> f64 {
        per_hour(self.xp_gained() as f64, self.runtime())
    }

    pub fn levels_gained(&self) -> u32 {
        let counters = self.lock();
        match (counters.skill_baseline, counters.skill_latest) {
            (Some(base), Some(latest)) => latest.level.saturating_sub(base.level),
            _ => 0,
        }
    }

    pub fn current_level(&self) -> u32 {
        self.lock().skill_latest.map_or(0, |s| s.level)
    }

    pub fn xp_to_next_level(&self) -> u64 {
        self.lock().skill_latest.map_or(0, |s| s.xp_to_next_level)
    }

    /// Estimated time until the next level at the current rate. `None` when
    /// the rate is 0 (rendered as a placeholder by the snapshot).
    pub fn time_to_next_level(&self) -> Option<Duration> {
        let rate = self.xp_per_hour();
        if rate <= 0.0 {
            return None;
        }
        let remaining = self.xp_to_next_level() as f64;
        Some(Duration::from_secs_f64(remaining / rate * 3600.0))
    }

    /// Total estimated value of everything collected, at cached prices.
    /// Items without a price contribute 0.
    pub fn total_value(&self) -> i64 {
        let counts = self.all_counts();
        counts
            .iter()
            .filter_map(|(id, count)| {
                self.prices
                    .cached_price(*id)
                    .map(|price| price * *count as i64)
            })
            .sum()
    }

    pub fn value_per_hour(&self) -> f64 {
        per_hour(self.total_value() as f64, self.runtime())
    }

    pub fn completed_trips(&self) -> u32 {
        self.lock().completed_trips
    }

    pub fn current_trip_count(&self) -> u64 {
        self.lock().current_trip
    }

    pub fn current_trip_duration(&self) -> Duration {
        self.lock().trip_started.elapsed()
    }

    /// Mean items per completed trip; falls back to the in-progress trip
    /// before any trip has completed.
    pub fn average_per_trip(&self) -> f64 {
        let counters = self.lock();
        if counters.completed_trips == 0 {
            return counters.current_trip as f64;
        }
        if counters.trip_totals.is_empty() {
            return 0.0;
        }
        counters.trip_totals.iter().sum::<u64>() as f64 / counters.trip_totals.len() as f64
    }

    pub fn average_trip_duration(&self) -> Duration {
        let trips = self.completed_trips();
        if trips == 0 {
            return self.current_trip_duration();
        }
        self.runtime() / trips
    }

    /// A formatted point-in-time view for the status surface.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            runtime: format_duration(self.runtime()),
            total_collected: self.total_collected(),
            collected_per_hour: format!("{:.0}/hr", self.collected_per_hour()),
            xp_gained: self.xp_gained(),
            xp_per_hour: format!("{:.0}/hr", self.xp_per_hour()),
            current_level: self.current_level(),
            levels_gained: self.levels_gained(),
            time_to_next_level: format_time_to_level(self.time_to_next_level()),
            total_value: format_value(self.total_value()),
            value_per_hour: format_value(self.value_per_hour() as i64),
            completed_trips: self.completed_trips(),
            current_trip: self.current_trip_count(),
            average_per_trip: format!("{:.1}", self.average_per_trip()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Counters> {
        // A panic while holding this lock is a bug in this module; poisoning
        // carries no recoverable state worth keeping.
        self.counters.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Point-in-time metrics formatted for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub runtime: String,
    pub total_collected: u64,
    pub collected_per_hour: String,
    pub xp_gained: u64,
    pub xp_per_hour: String,
    pub current_level: u32,
    pub levels_gained: u32,
    pub time_to_next_level: String,
    pub total_value: String,
    pub value_per_hour: String,
    pub completed_trips: u32,
    pub current_trip: u64,
    pub average_per_trip: String,
}

/// Wall-clock rate, 0 at zero elapsed time.
pub fn per_hour(total: f64, elapsed: Duration) -> f64 {
    let hours = elapsed.as_secs_f64() / 3600.0;
    if hours > 0.0 { total / hours } else { 0.0 }
}

/// `HH:MM:SS`, hours unbounded.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

fn format_time_to_level(ttl: Option<Duration>) -> String {
    match ttl {
        None => "--:--:--".to_string(),
        Some(d) if d.as_secs() >= 24 * 3600 => {
            let secs = d.as_secs();
            format!(
                "{}d {}h {}m",
                secs / (24 * 3600),
                (secs % (24 * 3600)) / 3600,
                (secs % 3600) / 60
            )
        }
        Some(d) => format_duration(d),
    }
}

/// Compact value rendering with K/M/B suffixes.
pub fn format_value(value: i64) -> String {
    let abs = value.abs();
    if abs >= 1_000_000_000 {
        format!("{:.2}B", value as f64 / 1e9)
    } else if abs >= 1_000_000 {
        format!("{:.2}M", value as f64 / 1e6)
    } else if abs >= 1_000 {
        format!("{:.1}K", value as f64 / 1e3)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedPrices;

    impl PriceSource for FixedPrices {
        fn cached_price(&self, item_id: u32) -> Option<i64> {
            match item_id {
                317 => Some(5),
                359 => Some(120),
                _ => None,
            }
        }
    }

    fn service() -> MetricsService {
        MetricsService::new(Arc::new(FixedPrices))
    }

    #[test]
    fn per_hour_is_exactly_zero_at_zero_elapsed() {
        assert_eq!(per_hour(500.0, Duration::ZERO), 0.0);
        assert_eq!(per_hour(0.0, Duration::ZERO), 0.0);
    }

    #[test]
    fn per_hour_scales_with_elapsed_time() {
        assert_eq!(per_hour(100.0, Duration::from_secs(1800)), 200.0);
    }

    #[test]
    fn record_collected_feeds_totals_and_current_trip() {
        let metrics = service();
        metrics.record_collected(317, 2);
        metrics.record_collected(359, 1);
        assert_eq!(metrics.total_collected(), 3);
        assert_eq!(metrics.count_for(317), 2);
        assert_eq!(metrics.current_trip_count(), 3);
    }

    #[test]
    fn trip_completion_never_appends_zero_and_always_resets() {
        let metrics = service();

        // Empty trip: counted, nothing appended.
        metrics.record_trip_completed();
        assert_eq!(metrics.completed_trips(), 1);
        assert_eq!(metrics.current_trip_count(), 0);
        assert_eq!(metrics.average_per_trip(), 0.0);

        metrics.record_collected(317, 4);
        metrics.record_trip_completed();
        assert_eq!(metrics.completed_trips(), 2);
        assert_eq!(metrics.current_trip_count(), 0);
        // Only the non-empty trip is in the history.
        assert_eq!(metrics.average_per_trip(), 4.0);
    }

    #[test]
    fn average_per_trip_uses_current_trip_before_any_completion() {
        let metrics = service();
        metrics.record_collected(317, 7);
        assert_eq!(metrics.average_per_trip(), 7.0);
    }

    #[test]
    fn total_value_ignores_unpriced_items() {
        let metrics = service();
        metrics.record_collected(317, 10); // 5 each
        metrics.record_collected(359, 2); // 120 each
        metrics.record_collected(999_999, 50); // unpriced
        assert_eq!(metrics.total_value(), 10 * 5 + 2 * 120);
    }

    #[test]
    fn skill_baseline_is_fixed_by_first_observation() {
        let metrics = service();
        metrics.observe_skill(SkillSnapshot {
            level: 40,
            xp: 40_000,
            xp_to_next_level: 2_000,
        });
        metrics.observe_skill(SkillSnapshot {
            level: 41,
            xp: 42_500,
            xp_to_next_level: 500,
        });
        assert_eq!(metrics.xp_gained(), 2_500);
        assert_eq!(metrics.levels_gained(), 1);
        assert_eq!(metrics.current_level(), 41);
    }

    #[test]
    fn time_to_next_level_is_none_at_zero_rate() {
        let metrics = service();
        metrics.observe_skill(SkillSnapshot {
            level: 40,
            xp: 40_000,
            xp_to_next_level: 2_000,
        });
        assert_eq!(metrics.time_to_next_level(), None);
        assert_eq!(metrics.snapshot().time_to_next_level, "--:--:--");
    }

    #[test]
    fn value_formatting_uses_suffixes() {
        assert_eq!(format_value(950), "950");
        assert_eq!(format_value(1_500), "1.5K");
        assert_eq!(format_value(2_250_000), "2.25M");
        assert_eq!(format_value(1_200_000_000), "1.20B");
    }

    #[test]
    fn duration_formatting_is_hms() {
        assert_eq!(format_duration(Duration::from_secs(0)), "00:00:00");
        assert_eq!(format_duration(Duration::from_secs(3_725)), "01:02:05");
    }
}
