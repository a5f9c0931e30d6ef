//! Tile map query surface.
//!
//! The core only ever asks a map for the attributes of one cell. Maps have
//! two layers and the collision data of a cell is the union of both. Any
//! coordinate outside `[0, width) x [0, height)` answers as fully solid, so
//! nothing can leave the map through collision resolution.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

// ---------------------------------------------------------------------------
// TileAttributes
// ---------------------------------------------------------------------------

/// Per-tile collision edges and gameplay flags.
///
/// An edge flag means the tile blocks movement *into* it across that edge:
/// `solid_top` stops things moving down onto the tile. A tile that is only
/// `solid_top` is a one-way platform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileAttributes {
    pub solid_top: bool,
    pub solid_bottom: bool,
    pub solid_left: bool,
    pub solid_right: bool,
    pub climbable: bool,
    pub water: bool,
    pub damaging: bool,
    pub flammable: bool,
}

impl TileAttributes {
    /// No collision, no flags.
    pub const EMPTY: TileAttributes = TileAttributes {
        solid_top: false,
        solid_bottom: false,
        solid_left: false,
        solid_right: false,
        climbable: false,
        water: false,
        damaging: false,
        flammable: false,
    };

    /// All four edges solid.
    pub const SOLID: TileAttributes = TileAttributes {
        solid_top: true,
        solid_bottom: true,
        solid_left: true,
        solid_right: true,
        ..TileAttributes::EMPTY
    };

    /// Blocks only from above.
    pub const PLATFORM: TileAttributes = TileAttributes {
        solid_top: true,
        ..TileAttributes::EMPTY
    };

    pub fn is_solid(&self) -> bool {
        self.solid_top && self.solid_bottom && self.solid_left && self.solid_right
    }

    pub fn blocks_anything(&self) -> bool {
        self.solid_top || self.solid_bottom || self.solid_left || self.solid_right
    }

    /// Flag-wise union.
    pub fn union(self, other: TileAttributes) -> TileAttributes {
        TileAttributes {
            solid_top: self.solid_top || other.solid_top,
            solid_bottom: self.solid_bottom || other.solid_bottom,
            solid_left: self.solid_left || other.solid_left,
            solid_right: self.solid_right || other.solid_right,
            climbable: self.climbable || other.climbable,
            water: self.water || other.water,
            damaging: self.damaging || other.damaging,
            flammable: self.flammable || other.flammable,
        }
    }

    /// The same flags with all collision edges cleared.
    pub fn without_collision(self) -> TileAttributes {
        TileAttributes {
            solid_top: false,
            solid_bottom: false,
            solid_left: false,
            solid_right: false,
            ..self
        }
    }
}

// ---------------------------------------------------------------------------
// TileMap
// ---------------------------------------------------------------------------

/// Number of tile layers.
pub const LAYER_COUNT: usize = 2;

/// Read-only tile query surface.
pub trait TileMap {
    fn width(&self) -> i32;
    fn height(&self) -> i32;

    /// Attributes of one cell of one layer. Must answer for in-range
    /// coordinates only; range handling is done by [`collision_data`](Self::collision_data).
    fn layer_attributes(&self, layer: usize, x: i32, y: i32) -> TileAttributes;

    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width() && y < self.height()
    }

    /// Attributes of one cell of one layer, solid outside the map.
    fn tile_attributes(&self, layer: usize, x: i32, y: i32) -> TileAttributes {
        if self.in_bounds(x, y) {
            self.layer_attributes(layer, x, y)
        } else {
            TileAttributes::SOLID
        }
    }

    /// Union of both layers, solid outside the map.
    fn collision_data(&self, x: i32, y: i32) -> TileAttributes {
        (0..LAYER_COUNT).fold(TileAttributes::EMPTY, |acc, layer| {
            acc.union(self.tile_attributes(layer, x, y))
        })
    }
}

// ---------------------------------------------------------------------------
// GridMap
// ---------------------------------------------------------------------------

/// In-memory map: two layers of tile indices plus an attribute table.
#[derive(Debug, Clone)]
pub struct GridMap {
    width: usize,
    height: usize,
    layers: [Vec<u16>; LAYER_COUNT],
    attributes: Vec<TileAttributes>,
}

impl GridMap {
    /// Build a map, validating layer sizes and tile indices.
    ///
    /// # Errors
    ///
    /// [`EngineError::MapSizeMismatch`] if a layer is not `width * height`
    /// long, [`EngineError::UnknownTile`] if a cell references a tile index
    /// outside `attributes`.
    pub fn try_new(
        width: usize,
        height: usize,
        layers: [Vec<u16>; LAYER_COUNT],
        attributes: Vec<TileAttributes>,
    ) -> Result<Self, EngineError> {
        let expected = width * height;
        for (layer, cells) in layers.iter().enumerate() {
            if cells.len() != expected {
                return Err(EngineError::MapSizeMismatch {
                    layer,
                    actual: cells.len(),
                    expected,
                    width,
                    height,
                });
            }
            if let Some(pos) = cells.iter().position(|&t| t as usize >= attributes.len()) {
                return Err(EngineError::UnknownTile {
                    tile: cells[pos],
                    x: pos % width.max(1),
                    y: pos / width.max(1),
                    table_len: attributes.len(),
                });
            }
        }
        Ok(Self {
            width,
            height,
            layers,
            attributes,
        })
    }

    /// An empty map using a two-entry table: tile 0 is empty, tile 1 solid.
    pub fn empty(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            layers: [vec![0; width * height], vec![0; width * height]],
            attributes: vec![TileAttributes::EMPTY, TileAttributes::SOLID],
        }
    }

    /// Parse an ASCII layout into a single-layer map.
    ///
    /// `#` is solid, `=` a one-way platform, `H` a ladder, `~` water,
    /// `^` a damaging tile; anything else is empty. All rows must have the
    /// same length.
    ///
    /// # Errors
    ///
    /// [`EngineError::MapSizeMismatch`] on ragged rows.
    pub fn from_ascii(rows: &[&str]) -> Result<Self, EngineError> {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.chars().count());
        let attributes = vec![
            TileAttributes::EMPTY,
            TileAttributes::SOLID,
            TileAttributes::PLATFORM,
            TileAttributes {
                climbable: true,
                ..TileAttributes::EMPTY
            },
            TileAttributes {
                water: true,
                ..TileAttributes::EMPTY
            },
            TileAttributes {
                damaging: true,
                ..TileAttributes::EMPTY
            },
        ];
        let cells: Vec<u16> = rows
            .iter()
            .flat_map(|row| row.chars())
            .map(|c| match c {
                '#' => 1,
                '=' => 2,
                'H' => 3,
                '~' => 4,
                '^' => 5,
                _ => 0,
            })
            .collect();
        let background = vec![0; cells.len()];
        Self::try_new(width, height, [cells, background], attributes)
    }

    /// Replace one cell of one layer.
    ///
    /// # Panics
    ///
    /// Panics on out-of-range coordinates or unknown tile indices.
    pub fn set_tile(&mut self, layer: usize, x: usize, y: usize, tile: u16) {
        assert!(
            x < self.width && y < self.height,
            "tile ({x}, {y}) outside map"
        );
        assert!(
            (tile as usize) < self.attributes.len(),
            "tile index {tile} has no attribute entry"
        );
        self.layers[layer][y * self.width + x] = tile;
    }
}

impl TileMap for GridMap {
    fn width(&self) -> i32 {
        self.width as i32
    }

    fn height(&self) -> i32 {
        self.height as i32
    }

    fn layer_attributes(&self, layer: usize, x: i32, y: i32) -> TileAttributes {
        let tile = self.layers[layer][y as usize * self.width + x as usize];
        self.attributes[tile as usize]
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
