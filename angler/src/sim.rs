//! In-memory stand-ins for the external collaborators: a scriptable world
//! snapshot, a movement primitive that acts on it, and a fixed price table.
//!
//! Tests script these directly; the `demo` CLI command drives a full session
//! against them so the core stays runnable without a live environment.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crate::core::catalog::Anchor;
use crate::core::geometry::WorldPoint;
use crate::metrics::PriceSource;
use crate::navigation::Mover;
use crate::world::{Interactable, InterfaceKind, SkillSnapshot, WorldSnapshot};

/// Mutable world state behind [`SimWorld`]. Tests hold a clone of the world
/// and mutate this between ticks.
#[derive(Debug, Clone)]
pub struct SimWorldState {
    pub environment_ready: bool,
    pub session_active: bool,
    pub position: WorldPoint,
    pub storage_capacity: u32,
    /// Item ids currently in storage, one entry per unit.
    pub items: Vec<u32>,
    /// Named non-stacking possessions (teleport rings and the like).
    pub named_items: Vec<String>,
    /// Entities visible in the world, looked up by exact name.
    pub entities: Vec<(String, WorldPoint)>,
    pub interact_succeeds: bool,
    /// Whether interacting with a bank entity opens the interface.
    pub bank_opens_on_interact: bool,
    pub bank_open: bool,
    pub deposit_count: u32,
    pub animation_active: bool,
    pub skill: SkillSnapshot,
}

/// Shared-handle world snapshot. Cloning shares the underlying state.
#[derive(Clone)]
pub struct SimWorld {
    state: Arc<Mutex<SimWorldState>>,
}

impl SimWorld {
    pub fn new(position: WorldPoint) -> Self {
        Self {
            state: Arc::new(Mutex::new(SimWorldState {
                environment_ready: true,
                session_active: true,
                position,
                storage_capacity: 28,
                items: Vec::new(),
                named_items: Vec::new(),
                entities: Vec::new(),
                interact_succeeds: true,
                bank_opens_on_interact: true,
                bank_open: false,
                deposit_count: 0,
                animation_active: false,
                skill: SkillSnapshot {
                    level: 1,
                    xp: 0,
                    xp_to_next_level: 83,
                },
            })),
        }
    }

    pub fn update(&self, f: impl FnOnce(&mut SimWorldState)) {
        f(&mut self.lock());
    }

    pub fn read<R>(&self, f: impl FnOnce(&SimWorldState) -> R) -> R {
        f(&self.lock())
    }

    pub fn add_entity(&self, name: &str, position: WorldPoint) {
        self.lock().entities.push((name.to_string(), position));
    }

    pub fn add_item(&self, item_id: u32) {
        self.lock().items.push(item_id);
    }

    pub fn set_position(&self, position: WorldPoint) {
        self.lock().position = position;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SimWorldState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl WorldSnapshot for SimWorld {
    fn environment_ready(&self) -> bool {
        self.lock().environment_ready
    }

    fn session_active(&self) -> bool {
        self.lock().session_active
    }

    fn position(&self) -> WorldPoint {
        self.lock().position
    }

    fn storage_full(&self) -> bool {
        let state = self.lock();
        state.items.len() as u32 >= state.storage_capacity
    }

    fn free_storage_slots(&self) -> u32 {
        let state = self.lock();
        state.storage_capacity.saturating_sub(state.items.len() as u32)
    }

    fn storage_item_count(&self) -> u32 {
        self.lock().items.len() as u32
    }

    fn find_interactables(&self, name: &str) -> Vec<Interactable> {
        let state = self.lock();
        state
            .entities
            .iter()
            .filter(|(entity_name, _)| entity_name == name)
            .map(|(entity_name, position)| Interactable {
                name: entity_name.clone(),
                position: *position,
                distance: state.position.distance_to(*position),
            })
            .collect()
    }

    fn interact(&mut self, target: &Interactable, _action_index: u32) -> bool {
        let mut state = self.lock();
        if !state.interact_succeeds {
            return false;
        }
        if (target.name == "Bank booth" || target.name == "Banker") && state.bank_opens_on_interact
        {
            state.bank_open = true;
        }
        true
    }

    fn interface_open(&self, kind: InterfaceKind) -> bool {
        match kind {
            InterfaceKind::Bank => self.lock().bank_open,
        }
    }

    fn close_interface(&mut self, kind: InterfaceKind) {
        match kind {
            InterfaceKind::Bank => self.lock().bank_open = false,
        }
    }

    fn deposit_all(&mut self, kind: InterfaceKind) {
        match kind {
            InterfaceKind::Bank => {
                let mut state = self.lock();
                state.items.clear();
                state.deposit_count += 1;
            }
        }
    }

    fn remove_item(&mut self, item_id: u32) -> bool {
        let mut state = self.lock();
        match state.items.iter().position(|id| *id == item_id) {
            Some(index) => {
                state.items.remove(index);
                true
            }
            None => false,
        }
    }

    fn contains_item_id(&self, item_id: u32) -> bool {
        self.lock().items.contains(&item_id)
    }

    fn contains_item_named(&self, name: &str) -> bool {
        self.lock().named_items.iter().any(|n| n == name)
    }

    fn action_animation_active(&self) -> bool {
        self.lock().animation_active
    }

    fn skill(&self) -> SkillSnapshot {
        self.lock().skill
    }
}

/// Movement primitive that acts on a [`SimWorld`]: successful walks land the
/// player on the target, successful teleports on a configurable point.
pub struct SimMover {
    world: SimWorld,
    pub walk_succeeds: bool,
    pub teleport_succeeds: bool,
    /// Where a successful teleport puts the player; defaults to staying put.
    pub teleport_landing: Option<WorldPoint>,
    /// Per-call latency, to exercise cancellation windows.
    pub delay: Duration,
}

impl SimMover {
    pub fn new(world: SimWorld) -> Self {
        Self {
            world,
            walk_succeeds: true,
            teleport_succeeds: true,
            teleport_landing: None,
            delay: Duration::ZERO,
        }
    }
}

impl Mover for SimMover {
    fn walk_towards(&self, target: WorldPoint, cancel: &AtomicBool, _timeout: Duration) -> bool {
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
        if cancel.load(Ordering::Relaxed) || !self.walk_succeeds {
            return false;
        }
        self.world.set_position(target);
        true
    }

    fn long_range_teleport(
        &self,
        _anchor: Anchor,
        cancel: &AtomicBool,
        _timeout: Duration,
    ) -> bool {
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
        if cancel.load(Ordering::Relaxed) || !self.teleport_succeeds {
            return false;
        }
        if let Some(landing) = self.teleport_landing {
            self.world.set_position(landing);
        }
        true
    }
}

/// Fixed in-memory price table.
#[derive(Debug, Default)]
pub struct StaticPrices {
    prices: BTreeMap<u32, i64>,
}

impl StaticPrices {
    pub fn new(prices: impl IntoIterator<Item = (u32, i64)>) -> Self {
        Self {
            prices: prices.into_iter().collect(),
        }
    }
}

impl PriceSource for StaticPrices {
    fn cached_price(&self, item_id: u32) -> Option<i64> {
        self.prices.get(&item_id).copied()
    }
}
