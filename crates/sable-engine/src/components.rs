//! Component types shared by all systems.
//!
//! Coordinates are in tiles. The origin is the top-left corner of the map and
//! `y` grows downward. A [`BoundingBox`] is entity-local: its offset is added
//! to the entity's [`WorldPosition`] to get the world-space rectangle.

use std::borrow::Cow;
use std::ops::{Add, AddAssign, Neg, Sub};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// Integer 2D vector in tile units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Vector {
    pub x: i32,
    pub y: i32,
}

impl Vector {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Add for Vector {
    type Output = Vector;
    fn add(self, rhs: Vector) -> Vector {
        Vector::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vector {
    fn add_assign(&mut self, rhs: Vector) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vector {
    type Output = Vector;
    fn sub(self, rhs: Vector) -> Vector {
        Vector::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Vector {
    type Output = Vector;
    fn neg(self) -> Vector {
        Vector::new(-self.x, -self.y)
    }
}

/// The authoritative position of an entity (top-left anchor).
pub type WorldPosition = Vector;

/// Axis-aligned rectangle in tile units.
///
/// As a component it is relative to the entity's [`WorldPosition`]; use
/// [`to_world_space`](Self::to_world_space) before comparing two entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl BoundingBox {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The 1x1 box used for entities without a bounding box.
    pub const UNIT: BoundingBox = BoundingBox::new(0, 0, 1, 1);

    pub fn left(&self) -> i32 {
        self.x
    }

    /// Rightmost covered column (inclusive).
    pub fn right(&self) -> i32 {
        self.x + self.width - 1
    }

    pub fn top(&self) -> i32 {
        self.y
    }

    /// Lowest covered row (inclusive).
    pub fn bottom(&self) -> i32 {
        self.y + self.height - 1
    }

    /// Translate an entity-local box to world space.
    pub fn to_world_space(&self, position: WorldPosition) -> BoundingBox {
        let origin = Vector::new(self.x, self.y) + position;
        BoundingBox::new(origin.x, origin.y, self.width, self.height)
    }

    /// Whether the two rectangles share at least one tile.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.left() <= other.right()
            && other.left() <= self.right()
            && self.top() <= other.bottom()
            && other.top() <= self.bottom()
    }
}

/// Facing direction of an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    Left,
    Right,
}

impl Orientation {
    /// `-1` for left, `1` for right.
    pub fn to_movement(self) -> i32 {
        match self {
            Orientation::Left => -1,
            Orientation::Right => 1,
        }
    }

    pub fn opposite(self) -> Orientation {
        match self {
            Orientation::Left => Orientation::Right,
            Orientation::Right => Orientation::Left,
        }
    }
}

// ---------------------------------------------------------------------------
// Physical components
// ---------------------------------------------------------------------------

/// Sub-tile velocity in tiles per tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Velocity {
    pub x: f32,
    pub y: f32,
}

impl Velocity {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Velocity-driven movement state.
///
/// Only whole tiles change [`WorldPosition`]; the fractional part of each
/// step is carried in `remainder` to the next tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovingBody {
    pub velocity: Velocity,
    pub remainder: Velocity,
    pub gravity_affected: bool,
    pub ignore_collisions: bool,
    /// `false` suspends integration without removing the component.
    pub is_active: bool,
}

impl MovingBody {
    pub fn new(velocity: Velocity, gravity_affected: bool) -> Self {
        Self {
            velocity,
            remainder: Velocity::default(),
            gravity_affected,
            ignore_collisions: false,
            is_active: true,
        }
    }
}

/// Scripted per-tick position deltas, authoritative over velocity while
/// present.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovementSequence {
    pub steps: Cow<'static, [Vector]>,
    /// Index of the next step to apply.
    pub cursor: usize,
    pub repeat: bool,
    /// Zero the body's velocity when a non-repeating sequence finishes.
    pub reset_velocity_after: bool,
}

impl MovementSequence {
    pub fn new(
        steps: impl Into<Cow<'static, [Vector]>>,
        repeat: bool,
        reset_velocity_after: bool,
    ) -> Self {
        Self {
            steps: steps.into(),
            cursor: 0,
            repeat,
            reset_velocity_after,
        }
    }
}

// ---------------------------------------------------------------------------
// Activation
// ---------------------------------------------------------------------------

/// Present while the entity is inside the simulated region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Active {
    /// Inside the visible viewport, not just the simulated margin.
    pub on_screen: bool,
}

/// How the activation system treats an entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivationPolicy {
    /// Active only while inside the simulated region.
    #[default]
    Default,
    /// Always active regardless of position.
    Always,
    /// Behaves like `Default` until first activated, then like `Always`.
    AlwaysAfterFirstActivation,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ActivationSettings {
    pub policy: ActivationPolicy,
    pub has_been_activated: bool,
}

impl ActivationSettings {
    pub fn new(policy: ActivationPolicy) -> Self {
        Self {
            policy,
            has_been_activated: false,
        }
    }
}

/// Conditions under which an entity destroys itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AutoDestroy {
    pub on_world_collision: bool,
    pub on_leaving_active_region: bool,
    /// Remaining ticks before destruction.
    pub timeout: Option<u32>,
}

impl AutoDestroy {
    pub fn after_timeout(ticks: u32) -> Self {
        Self {
            timeout: Some(ticks),
            ..Default::default()
        }
    }

    pub fn on_leaving_active_region() -> Self {
        Self {
            on_leaving_active_region: true,
            ..Default::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

/// Marks the player entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Player;

/// Marks door actors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DoorTag;

/// Render hint: draw after everything else.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DrawTopMost;

// ---------------------------------------------------------------------------
// Gameplay components
// ---------------------------------------------------------------------------

/// Can be hit by player shots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Shootable {
    pub health: i32,
    pub given_score: u32,
}

/// Hurts the player on contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlayerDamaging {
    pub amount: i32,
    pub destroy_on_contact: bool,
}

/// Hurts shootables on contact (player projectiles).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DamageInflicting {
    pub amount: i32,
    pub destroy_on_contact: bool,
}

/// Inventory items the player can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InventoryItem {
    RedKey,
    BlueKey,
    CircuitBoard,
    RapidFire,
    CloakingDevice,
    SpecialHintGlobe,
}

/// The bonus letters, in the order that grants the completion bonus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollectableLetter {
    N,
    U,
    K,
    E,
    M,
}

impl CollectableLetter {
    pub const CORRECT_ORDER: [CollectableLetter; 5] = [
        CollectableLetter::N,
        CollectableLetter::U,
        CollectableLetter::K,
        CollectableLetter::E,
        CollectableLetter::M,
    ];
}

/// Picked up when the player touches it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CollectableItem {
    pub given_score: Option<u32>,
    /// Replaces `given_score` when the player is already at full health.
    pub given_score_at_full_health: Option<u32>,
    pub given_health: Option<i32>,
    pub given_item: Option<InventoryItem>,
    pub letter: Option<CollectableLetter>,
    pub spawn_score_numbers: bool,
}

/// Releases its contents as a new entity when the holder is killed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemContainer {
    pub contents: CollectableItem,
    /// Box of the released item, relative to its position.
    pub contents_bounds: BoundingBox,
}

/// Kinds of objects the player can use with the interact input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Interactable {
    Teleporter,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn world_space_and_edges() {
        let bbox = BoundingBox::new(1, -1, 2, 3).to_world_space(Vector::new(5, 5));
        assert_eq!(bbox, BoundingBox::new(6, 4, 2, 3));
        assert_eq!(bbox.right(), 7);
        assert_eq!(bbox.bottom(), 6);
    }

    #[test]
    fn intersection_is_inclusive_of_shared_tiles() {
        let a = BoundingBox::new(0, 0, 2, 2);
        assert!(a.intersects(&BoundingBox::new(1, 1, 2, 2)));
        assert!(!a.intersects(&BoundingBox::new(2, 0, 1, 1)));
        assert!(!a.intersects(&BoundingBox::new(0, 2, 1, 1)));
    }

    #[test]
    fn orientation_helpers() {
        assert_eq!(Orientation::Left.to_movement(), -1);
        assert_eq!(Orientation::Left.opposite(), Orientation::Right);
    }
}
