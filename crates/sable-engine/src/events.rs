//! Strongly-typed simulation events and the per-tick event bus.
//!
//! Events are delivered synchronously: by the time
//! [`GlobalDependencies::emit`](crate::context::GlobalDependencies::emit)
//! returns, every subscriber has seen the event. An event emitted by a
//! subscriber while another event is being delivered is queued and delivered
//! right after, before the outermost `emit` returns. Nothing is carried over
//! to the next tick.

use std::collections::VecDeque;
use std::fmt;

use serde::Serialize;

use sable_ecs::entity::EntityId;

use crate::collision::CollisionSides;
use crate::components::{CollectableItem, Velocity, WorldPosition};

// ---------------------------------------------------------------------------
// SoundId
// ---------------------------------------------------------------------------

/// Sound effects the core asks the audio layer to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SoundId {
    DukeJumping,
    DukePain,
    EnemyHit,
    ItemPickup,
    HealthPickup,
    WeaponPickup,
    LettersCollectedCorrectly,
    Teleport,
    SlidingDoor,
    Explosion,
}

// ---------------------------------------------------------------------------
// GameEvent
// ---------------------------------------------------------------------------

/// Every event the simulation core produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GameEvent {
    /// A moving body was blocked by the map on the given sides.
    CollidedWithWorld {
        entity: EntityId,
        sides: CollisionSides,
    },
    /// A shootable lost health but survived.
    ShootableDamaged {
        entity: EntityId,
        inflictor_velocity: Velocity,
    },
    /// A shootable reached zero health. Emitted before it is destroyed.
    ShootableKilled {
        entity: EntityId,
        inflictor_velocity: Velocity,
    },
    ItemCollected {
        entity: EntityId,
        item: CollectableItem,
    },
    PlayerTookDamage { amount: i32 },
    PlayerTeleported { target: WorldPosition },
    EntityActivated {
        entity: EntityId,
        first_activation: bool,
    },
    PlaySound { sound: SoundId },
    ScoreAwarded { amount: u32 },
    PlayerMessage { text: String },
}

impl GameEvent {
    /// The entity the event is about, if any.
    pub fn entity(&self) -> Option<EntityId> {
        match self {
            GameEvent::CollidedWithWorld { entity, .. }
            | GameEvent::ShootableDamaged { entity, .. }
            | GameEvent::ShootableKilled { entity, .. }
            | GameEvent::ItemCollected { entity, .. }
            | GameEvent::EntityActivated { entity, .. } => Some(*entity),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Read-only subscriber outside the simulation (renderer, audio, tests).
pub type EventObserver = Box<dyn FnMut(&GameEvent)>;

/// Delivery queue plus the log of everything emitted this tick.
#[derive(Default)]
pub struct EventBus {
    pub(crate) pending: VecDeque<GameEvent>,
    pub(crate) delivering: bool,
    emitted: Vec<GameEvent>,
    observers: Vec<EventObserver>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("pending", &self.pending.len())
            .field("emitted", &self.emitted.len())
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an external read-only observer.
    pub fn subscribe(&mut self, observer: impl FnMut(&GameEvent) + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub(crate) fn notify_observers(&mut self, event: &GameEvent) {
        for observer in &mut self.observers {
            observer(event);
        }
    }

    pub(crate) fn record(&mut self, event: GameEvent) {
        self.emitted.push(event);
    }

    /// Events delivered so far this tick, in delivery order.
    pub fn emitted(&self) -> &[GameEvent] {
        &self.emitted
    }

    /// Drain the tick's event log.
    pub fn take_emitted(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.emitted)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn observers_see_notified_events() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut bus = EventBus::new();
        bus.subscribe(move |e| sink.borrow_mut().push(e.clone()));
        bus.notify_observers(&GameEvent::ScoreAwarded { amount: 100 });
        assert_eq!(
            *seen.borrow(),
            vec![GameEvent::ScoreAwarded { amount: 100 }]
        );
    }

    #[test]
    fn take_emitted_drains() {
        let mut bus = EventBus::new();
        bus.record(GameEvent::PlayerTookDamage { amount: 1 });
        assert_eq!(bus.emitted().len(), 1);
        assert_eq!(bus.take_emitted().len(), 1);
        assert!(bus.emitted().is_empty());
    }

    #[test]
    fn entity_accessor() {
        let e = EntityId::new(3, 0);
        let event = GameEvent::EntityActivated {
            entity: e,
            first_activation: true,
        };
        assert_eq!(event.entity(), Some(e));
        assert_eq!(GameEvent::PlayerTookDamage { amount: 1 }.entity(), None);
    }
}
