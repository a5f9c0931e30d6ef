//! Stateless collision queries over a [`TileMap`].
//!
//! All queries take an entity's [`WorldPosition`] and entity-local
//! [`BoundingBox`]. Movement is checked one tile at a time, so a step of
//! several tiles can never tunnel through a one-tile wall.

use serde::Serialize;

use crate::components::{BoundingBox, Orientation, Vector, WorldPosition};
use crate::map::{TileAttributes, TileMap};

// ---------------------------------------------------------------------------
// CollisionSides
// ---------------------------------------------------------------------------

/// Which sides of a box were blocked by the map during a sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CollisionSides {
    pub left: bool,
    pub right: bool,
    pub top: bool,
    pub bottom: bool,
}

impl CollisionSides {
    pub fn any(&self) -> bool {
        self.left || self.right || self.top || self.bottom
    }

    pub fn horizontal(&self) -> bool {
        self.left || self.right
    }

    pub fn vertical(&self) -> bool {
        self.top || self.bottom
    }
}

/// Outcome of [`CollisionChecker::sweep_move`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepResult {
    /// The part of the requested delta that could be applied.
    pub delta: Vector,
    pub blocked: CollisionSides,
}

// ---------------------------------------------------------------------------
// CollisionChecker
// ---------------------------------------------------------------------------

/// Read-only collision query layer.
#[derive(Clone, Copy)]
pub struct CollisionChecker<'a> {
    map: &'a dyn TileMap,
}

impl std::fmt::Debug for CollisionChecker<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollisionChecker")
            .field("width", &self.map.width())
            .field("height", &self.map.height())
            .finish()
    }
}

impl<'a> CollisionChecker<'a> {
    pub fn new(map: &'a dyn TileMap) -> Self {
        Self { map }
    }

    pub fn map(&self) -> &'a dyn TileMap {
        self.map
    }

    fn any_in_row(&self, y: i32, x0: i32, x1: i32, edge: impl Fn(&TileAttributes) -> bool) -> bool {
        (x0..=x1).any(|x| edge(&self.map.collision_data(x, y)))
    }

    fn any_in_column(
        &self,
        x: i32,
        y0: i32,
        y1: i32,
        edge: impl Fn(&TileAttributes) -> bool,
    ) -> bool {
        (y0..=y1).any(|y| edge(&self.map.collision_data(x, y)))
    }

    /// Whether a world-space box stands on ground: some tile in the row
    /// directly below it has a solid top edge.
    pub fn is_box_on_solid_ground(&self, world_box: &BoundingBox) -> bool {
        self.any_in_row(world_box.bottom() + 1, world_box.left(), world_box.right(), |t| {
            t.solid_top
        })
    }

    pub fn is_on_solid_ground(&self, position: WorldPosition, bbox: &BoundingBox) -> bool {
        self.is_box_on_solid_ground(&bbox.to_world_space(position))
    }

    /// Some tile in the row directly above the box has a solid bottom edge.
    pub fn is_touching_ceiling(&self, position: WorldPosition, bbox: &BoundingBox) -> bool {
        let world_box = bbox.to_world_space(position);
        self.any_in_row(world_box.top() - 1, world_box.left(), world_box.right(), |t| {
            t.solid_bottom
        })
    }

    /// Some tile in the column directly beside the box blocks movement in
    /// `direction`.
    pub fn is_touching_wall(
        &self,
        direction: Orientation,
        position: WorldPosition,
        bbox: &BoundingBox,
    ) -> bool {
        let world_box = bbox.to_world_space(position);
        match direction {
            Orientation::Left => {
                self.any_in_column(world_box.left() - 1, world_box.top(), world_box.bottom(), |t| {
                    t.solid_right
                })
            }
            Orientation::Right => {
                self.any_in_column(world_box.right() + 1, world_box.top(), world_box.bottom(), |t| {
                    t.solid_left
                })
            }
        }
    }

    /// Move as far as possible along `delta`, X axis first, then Y, one tile
    /// at a time. Each axis stops at the first tile step that would cross a
    /// solid edge and reports that side as blocked.
    pub fn sweep_move(
        &self,
        position: WorldPosition,
        bbox: &BoundingBox,
        delta: Vector,
    ) -> SweepResult {
        let mut world_box = bbox.to_world_space(position);
        let mut moved = Vector::default();
        let mut blocked = CollisionSides::default();

        let step_x = delta.x.signum();
        for _ in 0..delta.x.abs() {
            let hit = if step_x > 0 {
                self.any_in_column(world_box.right() + 1, world_box.top(), world_box.bottom(), |t| {
                    t.solid_left
                })
            } else {
                self.any_in_column(world_box.left() - 1, world_box.top(), world_box.bottom(), |t| {
                    t.solid_right
                })
            };
            if hit {
                if step_x > 0 {
                    blocked.right = true;
                } else {
                    blocked.left = true;
                }
                break;
            }
            world_box.x += step_x;
            moved.x += step_x;
        }

        let step_y = delta.y.signum();
        for _ in 0..delta.y.abs() {
            let hit = if step_y > 0 {
                self.any_in_row(world_box.bottom() + 1, world_box.left(), world_box.right(), |t| {
                    t.solid_top
                })
            } else {
                self.any_in_row(world_box.top() - 1, world_box.left(), world_box.right(), |t| {
                    t.solid_bottom
                })
            };
            if hit {
                if step_y > 0 {
                    blocked.bottom = true;
                } else {
                    blocked.top = true;
                }
                break;
            }
            world_box.y += step_y;
            moved.y += step_y;
        }

        SweepResult {
            delta: moved,
            blocked,
        }
    }

    /// Whether the full `delta` can be applied without being blocked.
    pub fn can_move(&self, position: WorldPosition, bbox: &BoundingBox, delta: Vector) -> bool {
        !self.sweep_move(position, bbox, delta).blocked.any()
    }

    /// Union of the non-collision flags (ladder, water, damaging, ...) of
    /// every tile the box covers.
    pub fn attributes_at(&self, position: WorldPosition, bbox: &BoundingBox) -> TileAttributes {
        let world_box = bbox.to_world_space(position);
        let mut result = TileAttributes::EMPTY;
        for y in world_box.top()..=world_box.bottom() {
            for x in world_box.left()..=world_box.right() {
                result = result.union(self.map.collision_data(x, y).without_collision());
            }
        }
        result
    }

    /// Whether any tile covered by a world-space box is fully solid.
    pub fn overlaps_solid(&self, world_box: &BoundingBox) -> bool {
        (world_box.top()..=world_box.bottom()).any(|y| {
            (world_box.left()..=world_box.right()).any(|x| self.map.collision_data(x, y).is_solid())
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
