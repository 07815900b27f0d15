//! The world-state accessor seam.
//!
//! The live environment is observed through a coarse polling snapshot owned
//! by the host process. [`WorldSnapshot`] decouples the machine from that
//! accessor the same way an executor trait decouples a runner from its agent
//! backend: production wires the real accessor, tests and the demo wire
//! [`crate::sim::SimWorld`].

use crate::core::geometry::WorldPoint;

/// An interface the player can have open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterfaceKind {
    Bank,
}

/// A nearby named entity the player can interact with.
#[derive(Debug, Clone, PartialEq)]
pub struct Interactable {
    pub name: String,
    pub position: WorldPoint,
    pub distance: f64,
}

/// Skill progress as read from the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkillSnapshot {
    pub level: u32,
    pub xp: u64,
    pub xp_to_next_level: u64,
}

/// Read/interact surface over the live environment.
///
/// Queries are cheap and may be called every tick; interactions return
/// whether the environment accepted them, not whether they ultimately
/// succeeded.
pub trait WorldSnapshot {
    fn environment_ready(&self) -> bool;
    fn session_active(&self) -> bool;
    fn position(&self) -> WorldPoint;

    fn storage_full(&self) -> bool;
    fn free_storage_slots(&self) -> u32;
    fn storage_item_count(&self) -> u32;

    /// Nearby interactables matching `name`, unordered.
    fn find_interactables(&self, name: &str) -> Vec<Interactable>;
    /// Invoke the `action_index`-th action on `target`.
    fn interact(&mut self, target: &Interactable, action_index: u32) -> bool;

    fn interface_open(&self, kind: InterfaceKind) -> bool;
    fn close_interface(&mut self, kind: InterfaceKind);
    fn deposit_all(&mut self, kind: InterfaceKind);

    /// Remove one unit of `item_id` from storage; false when absent.
    fn remove_item(&mut self, item_id: u32) -> bool;
    fn contains_item_id(&self, item_id: u32) -> bool;
    fn contains_item_named(&self, name: &str) -> bool;

    /// Whether the player's action animation is currently playing.
    fn action_animation_active(&self) -> bool;

    fn skill(&self) -> SkillSnapshot;
}
