//! Component type registration and per-type storage.
//!
//! Every component type used in the ECS must be registered at runtime in a
//! [`ComponentRegistry`]. Registration produces a [`ComponentTypeId`] that
//! indexes the world's storage tables and names the component in snapshots.
//!
//! Storage is one [`ComponentTable`] per registered type: a handle-indexed
//! `Vec<Option<T>>` keyed by the entity's slot index. Adding or removing a
//! component never moves any other entity's data, which is what lets systems
//! restructure entities while an `each` traversal is in progress.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Component
// ---------------------------------------------------------------------------

/// Marker bound for anything storable as a component.
///
/// `Serialize` is required so that every component shows up in world
/// snapshots and state hashes.
pub trait Component: Clone + fmt::Debug + Serialize + 'static {}

impl<T: Clone + fmt::Debug + Serialize + 'static> Component for T {}

// ---------------------------------------------------------------------------
// ComponentTypeId
// ---------------------------------------------------------------------------

/// Opaque, lightweight identifier for a registered component type.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentTypeId(pub(crate) u32);

impl fmt::Debug for ComponentTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentTypeId({})", self.0)
    }
}

// ---------------------------------------------------------------------------
// ComponentInfo
// ---------------------------------------------------------------------------

/// Metadata about a registered component type.
#[derive(Debug, Clone)]
pub struct ComponentInfo {
    /// Unique ID assigned at registration time.
    pub id: ComponentTypeId,
    /// Human-readable name (supplied by the caller).
    pub name: String,
    /// `std::mem::size_of::<T>()`; zero for tag components.
    pub size: usize,
    /// Rust `TypeId` for runtime type checking.
    pub type_id: TypeId,
}

// ---------------------------------------------------------------------------
// ComponentRegistry
// ---------------------------------------------------------------------------

/// Registry mapping Rust types to [`ComponentTypeId`]s and their metadata.
///
/// A type can only be registered once; subsequent registrations of the same
/// Rust `TypeId` return the existing [`ComponentTypeId`].
#[derive(Debug)]
pub struct ComponentRegistry {
    /// TypeId -> ComponentTypeId for dedup.
    by_type: HashMap<TypeId, ComponentTypeId>,
    /// Name -> ComponentTypeId for lookup by string name.
    by_name: HashMap<String, ComponentTypeId>,
    /// Indexed by ComponentTypeId.0.
    infos: Vec<ComponentInfo>,
}

impl ComponentRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            by_type: HashMap::new(),
            by_name: HashMap::new(),
            infos: Vec::new(),
        }
    }

    /// Register a component type under the given `name`.
    ///
    /// If the type has already been registered, the existing
    /// [`ComponentTypeId`] is returned and `name` is ignored.
    ///
    /// # Panics
    ///
    /// Panics if `name` is already taken by a different type.
    pub fn register<T: Component>(&mut self, name: &str) -> ComponentTypeId {
        let rust_type_id = TypeId::of::<T>();
        if let Some(&existing) = self.by_type.get(&rust_type_id) {
            return existing;
        }
        if self.by_name.contains_key(name) {
            panic!(
                "component name '{}' is already registered for a different type",
                name
            );
        }

        let id = ComponentTypeId(self.infos.len() as u32);
        self.infos.push(ComponentInfo {
            id,
            name: name.to_owned(),
            size: std::mem::size_of::<T>(),
            type_id: rust_type_id,
        });
        self.by_type.insert(rust_type_id, id);
        self.by_name.insert(name.to_owned(), id);
        id
    }

    /// Look up a component type by its Rust `TypeId`.
    pub fn lookup<T: 'static>(&self) -> Option<ComponentTypeId> {
        self.by_type.get(&TypeId::of::<T>()).copied()
    }

    /// Get the [`ComponentInfo`] for a registered component type ID.
    pub fn get_info(&self, id: ComponentTypeId) -> Option<&ComponentInfo> {
        self.infos.get(id.0 as usize)
    }

    /// Total number of registered component types.
    pub fn len(&self) -> usize {
        self.infos.len()
    }

    /// Whether any component types have been registered.
    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }

    /// Returns the names of all registered component types, sorted.
    pub fn registered_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.by_name.keys().map(|s| s.as_str()).collect();
        names.sort();
        names
    }
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// ComponentStorage -- type-erased table interface
// ---------------------------------------------------------------------------

/// Type-erased operations the world needs on every table without knowing
/// the concrete component type.
pub(crate) trait ComponentStorage: fmt::Debug {
    fn clear(&mut self, index: u32);
    fn to_json(&self, index: u32) -> Option<serde_json::Value>;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

// ---------------------------------------------------------------------------
// ComponentTable
// ---------------------------------------------------------------------------

/// Handle-indexed storage for one component type.
#[derive(Debug)]
pub(crate) struct ComponentTable<T> {
    rows: Vec<Option<T>>,
}

impl<T> ComponentTable<T> {
    pub(crate) fn new() -> Self {
        Self { rows: Vec::new() }
    }

    /// Insert or overwrite; returns the previous value.
    pub(crate) fn insert(&mut self, index: u32, value: T) -> Option<T> {
        let idx = index as usize;
        if idx >= self.rows.len() {
            self.rows.resize_with(idx + 1, || None);
        }
        self.rows[idx].replace(value)
    }

    pub(crate) fn remove(&mut self, index: u32) -> Option<T> {
        self.rows.get_mut(index as usize).and_then(Option::take)
    }

    #[inline]
    pub(crate) fn get(&self, index: u32) -> Option<&T> {
        self.rows.get(index as usize).and_then(Option::as_ref)
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, index: u32) -> Option<&mut T> {
        self.rows.get_mut(index as usize).and_then(Option::as_mut)
    }
}

impl<T: Component> ComponentStorage for ComponentTable<T> {
    fn clear(&mut self, index: u32) {
        self.remove(index);
    }

    fn to_json(&self, index: u32) -> Option<serde_json::Value> {
        let value = self.get(index)?;
        match serde_json::to_value(value) {
            Ok(json) => Some(json),
            Err(e) => {
                tracing::warn!(error = %e, "component failed to serialize for snapshot");
                None
            }
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
