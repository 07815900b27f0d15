//! States, triggers, and the transition table for the fishing task machine.
//!
//! The table is deliberately an explicit mapping, not per-state behavior:
//! given a `(State, Trigger)` pair, [`transition`] returns the destination
//! state or `None` when the trigger is not valid in that state. Invalid
//! triggers are dropped by the caller, never raised as errors. Entry actions
//! live with the machine; this module stays pure and inspectable.

/// Phases of the gathering task. Initial state is [`State::Stopped`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    Stopped,
    /// Waiting for the environment, then determining where we are.
    Initializing,
    /// Re-determining location mid-session.
    CheckingLocation,
    WalkingToFishingSpot,
    TeleportingToFishingArea,
    /// Searching for a spot interactable and engaging it.
    FindingFishingSpot,
    Fishing,
    WaitingForFish,
    /// Inventory is full; deciding how to unload.
    InventoryFull,
    DroppingFish,
    UsingBankTeleport,
    WalkingToBank,
    TeleportingToBank,
    OpeningBank,
    Banking,
    ClosingBank,
    ReturningToFishing,
    UsingBoostPotion,
    /// Bounded backoff before retrying spot acquisition.
    Idling,
    /// Halted pending external recovery or stop.
    Error,
}

impl State {
    /// Every state, for table-wide assertions.
    pub const ALL: [State; 20] = [
        State::Stopped,
        State::Initializing,
        State::CheckingLocation,
        State::WalkingToFishingSpot,
        State::TeleportingToFishingArea,
        State::FindingFishingSpot,
        State::Fishing,
        State::WaitingForFish,
        State::InventoryFull,
        State::DroppingFish,
        State::UsingBankTeleport,
        State::WalkingToBank,
        State::TeleportingToBank,
        State::OpeningBank,
        State::Banking,
        State::ClosingBank,
        State::ReturningToFishing,
        State::UsingBoostPotion,
        State::Idling,
        State::Error,
    ];
}

/// Events that may cause a state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    // Control
    Start,
    Stop,
    // Location resolution
    AtFishingSpot,
    NearFishingSpot,
    AtBank,
    NearBank,
    LocationUnknown,
    // Spot acquisition and gathering
    FishingSpotFound,
    FishingSpotNotFound,
    FishingSpotMoved,
    CaughtFish,
    StoppedFishing,
    // Inventory
    InventoryFull,
    InventoryNotFull,
    HasFishToDrop,
    AllFishDropped,
    HasBankTeleport,
    NoBankTeleport,
    // Banking
    BankOpened,
    BankClosed,
    DepositComplete,
    BankFailed,
    // Movement
    ArrivedAtDestination,
    MovementFailed,
    TeleportComplete,
    TeleportFailed,
    // Boost
    BoostNeeded,
    BoostUsed,
    NoBoostAvailable,
    // Errors and idling
    ErrorOccurred,
    ErrorResolved,
    IdleComplete,
}

/// The transition table. Returns the destination for a valid `(state,
/// trigger)` pair, `None` otherwise.
///
/// `Stop` is valid from every running state; `ErrorOccurred` from every state
/// that is neither stopped nor already in error.
pub fn transition(state: State, trigger: Trigger) -> Option<State> {
    use State as S;
    use Trigger as T;

    if trigger == T::Stop {
        return match state {
            S::Stopped => None,
            _ => Some(S::Stopped),
        };
    }
    if trigger == T::ErrorOccurred {
        return match state {
            S::Stopped | S::Error => None,
            _ => Some(S::Error),
        };
    }

    let next = match (state, trigger) {
        (S::Stopped, T::Start) => S::Initializing,

        (S::Initializing, T::AtFishingSpot) => S::FindingFishingSpot,
        (S::Initializing, T::NearFishingSpot) => S::WalkingToFishingSpot,
        (S::Initializing, T::AtBank) => S::Banking,
        (S::Initializing, T::LocationUnknown) => S::TeleportingToFishingArea,

        (S::CheckingLocation, T::AtFishingSpot) => S::FindingFishingSpot,
        (S::CheckingLocation, T::NearFishingSpot) => S::WalkingToFishingSpot,
        (S::CheckingLocation, T::AtBank) => S::Banking,
        (S::CheckingLocation, T::NearBank) => S::WalkingToBank,
        (S::CheckingLocation, T::LocationUnknown) => S::TeleportingToFishingArea,

        (S::WalkingToFishingSpot, T::ArrivedAtDestination) => S::FindingFishingSpot,
        (S::WalkingToFishingSpot, T::MovementFailed) => S::TeleportingToFishingArea,

        (S::TeleportingToFishingArea, T::TeleportComplete) => S::WalkingToFishingSpot,
        (S::TeleportingToFishingArea, T::TeleportFailed) => S::Error,

        (S::FindingFishingSpot, T::FishingSpotFound) => S::Fishing,
        (S::FindingFishingSpot, T::FishingSpotNotFound) => S::Idling,
        (S::FindingFishingSpot, T::InventoryFull) => S::InventoryFull,

        (S::Fishing, T::CaughtFish) => S::WaitingForFish,
        (S::Fishing, T::FishingSpotMoved) => S::FindingFishingSpot,
        (S::Fishing, T::InventoryFull) => S::InventoryFull,
        (S::Fishing, T::StoppedFishing) => S::FindingFishingSpot,
        (S::Fishing, T::BoostNeeded) => S::UsingBoostPotion,

        (S::WaitingForFish, T::CaughtFish) => S::WaitingForFish,
        (S::WaitingForFish, T::StoppedFishing) => S::FindingFishingSpot,
        (S::WaitingForFish, T::FishingSpotMoved) => S::FindingFishingSpot,
        (S::WaitingForFish, T::InventoryFull) => S::InventoryFull,

        (S::InventoryFull, T::HasFishToDrop) => S::DroppingFish,
        (S::InventoryFull, T::HasBankTeleport) => S::UsingBankTeleport,
        (S::InventoryFull, T::NearBank) => S::WalkingToBank,
        (S::InventoryFull, T::NoBankTeleport) => S::TeleportingToBank,

        (S::DroppingFish, T::AllFishDropped) => S::FindingFishingSpot,
        (S::DroppingFish, T::InventoryNotFull) => S::FindingFishingSpot,

        (S::UsingBankTeleport, T::TeleportComplete) => S::OpeningBank,
        (S::UsingBankTeleport, T::TeleportFailed) => S::TeleportingToBank,

        (S::WalkingToBank, T::ArrivedAtDestination) => S::OpeningBank,
        (S::WalkingToBank, T::MovementFailed) => S::TeleportingToBank,

        (S::TeleportingToBank, T::TeleportComplete) => S::WalkingToBank,
        (S::TeleportingToBank, T::TeleportFailed) => S::Error,

        (S::OpeningBank, T::BankOpened) => S::Banking,
        (S::OpeningBank, T::BankFailed) => S::WalkingToBank,

        (S::Banking, T::DepositComplete) => S::ClosingBank,
        (S::Banking, T::BankFailed) => S::Error,

        (S::ClosingBank, T::BankClosed) => S::ReturningToFishing,

        (S::ReturningToFishing, T::ArrivedAtDestination) => S::FindingFishingSpot,
        (S::ReturningToFishing, T::TeleportComplete) => S::WalkingToFishingSpot,

        (S::UsingBoostPotion, T::BoostUsed) => S::FindingFishingSpot,
        (S::UsingBoostPotion, T::NoBoostAvailable) => S::FindingFishingSpot,

        (S::Idling, T::IdleComplete) => S::FindingFishingSpot,

        (S::Error, T::ErrorResolved) => S::Initializing,

        _ => return None,
    };
    Some(next)
}

/// Whether `trigger` is valid in `state`.
pub fn can_fire(state: State, trigger: Trigger) -> bool {
    transition(state, trigger).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_is_permitted_from_every_running_state() {
        for state in State::ALL {
            if state == State::Stopped {
                assert_eq!(transition(state, Trigger::Stop), None);
            } else {
                assert_eq!(transition(state, Trigger::Stop), Some(State::Stopped));
            }
        }
    }

    #[test]
    fn error_occurred_routes_every_running_state_to_error() {
        for state in State::ALL {
            let expected = match state {
                State::Stopped | State::Error => None,
                _ => Some(State::Error),
            };
            assert_eq!(transition(state, Trigger::ErrorOccurred), expected);
        }
    }

    #[test]
    fn invalid_triggers_resolve_to_none() {
        assert_eq!(transition(State::Stopped, Trigger::CaughtFish), None);
        assert_eq!(transition(State::Fishing, Trigger::Start), None);
        assert_eq!(transition(State::Banking, Trigger::FishingSpotFound), None);
        // Initializing deliberately has no NearBank edge; the resolver's
        // NearBank result is dropped there.
        assert_eq!(transition(State::Initializing, Trigger::NearBank), None);
    }

    #[test]
    fn storage_full_paths_reach_their_branch_states() {
        assert_eq!(
            transition(State::InventoryFull, Trigger::HasFishToDrop),
            Some(State::DroppingFish)
        );
        assert_eq!(
            transition(State::InventoryFull, Trigger::HasBankTeleport),
            Some(State::UsingBankTeleport)
        );
        assert_eq!(
            transition(State::InventoryFull, Trigger::NearBank),
            Some(State::WalkingToBank)
        );
        assert_eq!(
            transition(State::InventoryFull, Trigger::NoBankTeleport),
            Some(State::TeleportingToBank)
        );
    }

    #[test]
    fn banking_cycle_returns_to_finding_spot() {
        assert_eq!(
            transition(State::OpeningBank, Trigger::BankOpened),
            Some(State::Banking)
        );
        assert_eq!(
            transition(State::Banking, Trigger::DepositComplete),
            Some(State::ClosingBank)
        );
        assert_eq!(
            transition(State::ClosingBank, Trigger::BankClosed),
            Some(State::ReturningToFishing)
        );
        assert_eq!(
            transition(State::ReturningToFishing, Trigger::ArrivedAtDestination),
            Some(State::FindingFishingSpot)
        );
    }

    #[test]
    fn error_is_recoverable_to_initializing() {
        assert_eq!(
            transition(State::Error, Trigger::ErrorResolved),
            Some(State::Initializing)
        );
    }

    #[test]
    fn can_fire_mirrors_the_table() {
        assert!(can_fire(State::Stopped, Trigger::Start));
        assert!(!can_fire(State::Stopped, Trigger::IdleComplete));
    }
}
