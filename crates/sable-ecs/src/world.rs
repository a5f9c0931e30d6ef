//! The [`World`] is the top-level container for the ECS. It owns the entity
//! allocator, the component registry, and one handle-indexed table per
//! registered component type.
//!
//! # Iteration order
//!
//! Every traversal ([`World::each`], [`World::query`],
//! [`World::entities_with`]) visits entities in creation order. The order
//! list is maintained explicitly instead of being derived from slot indices,
//! because recycled indices would otherwise let a young entity jump ahead of
//! an older one.
//!
//! # Deferred destruction
//!
//! [`World::destroy`] invalidates the handle immediately (the slot generation
//! is bumped), so `has`/`get` report the entity as gone and no traversal
//! yields it again. Its component rows stay in the tables until
//! [`World::sweep_destroyed`] runs at the end of the tick, which is the only
//! point where slots are recycled. Until then a callback that destroyed the
//! entity it is visiting can keep reading and writing those rows through
//! [`World::get_retained`] and [`World::get_retained_mut`].

use crate::component::{
    Component, ComponentRegistry, ComponentStorage, ComponentTable, ComponentTypeId,
};
use crate::entity::{EntityAllocator, EntityId};
use crate::query::{Bundle, Query, QueryIter, Signature};
use crate::EcsError;

// ---------------------------------------------------------------------------
// SpawnMarker
// ---------------------------------------------------------------------------

/// A point in the world's creation history.
///
/// Entities created after the marker was taken compare as
/// [`created_since`](World::created_since) it. The physics integrator uses
/// this to find bodies spawned between its two phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SpawnMarker(u64);

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

/// The top-level ECS container.
pub struct World {
    /// Entity ID allocator.
    pub(crate) allocator: EntityAllocator,
    /// Component type registry.
    pub(crate) registry: ComponentRegistry,
    /// One table per registered component, indexed by `ComponentTypeId.0`.
    pub(crate) storages: Vec<Box<dyn ComponentStorage>>,
    /// Live and pending-sweep handles in creation order.
    pub(crate) creation_order: Vec<EntityId>,
    /// Creation serial of the entity currently occupying each slot.
    spawn_serials: Vec<u64>,
    /// Serial handed to the next created entity.
    next_serial: u64,
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("entity_count", &self.allocator.alive_count())
            .field("pending_sweep", &self.allocator.pending_count())
            .field("component_types", &self.registry.len())
            .finish()
    }
}

impl World {
    /// Create a new, empty world.
    pub fn new() -> Self {
        Self {
            allocator: EntityAllocator::new(),
            registry: ComponentRegistry::new(),
            storages: Vec::new(),
            creation_order: Vec::new(),
            spawn_serials: Vec::new(),
            next_serial: 0,
        }
    }

    /// Read-only access to the component registry.
    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// Register a component type and create its storage table.
    ///
    /// Registering the same type twice is a no-op returning the existing id.
    pub fn register_component<T: Component>(&mut self, name: &str) -> ComponentTypeId {
        let id = self.registry.register::<T>(name);
        if id.0 as usize == self.storages.len() {
            self.storages.push(Box::new(ComponentTable::<T>::new()));
        }
        id
    }

    // -- typed table access -------------------------------------------------

    fn table<T: Component>(&self) -> Option<&ComponentTable<T>> {
        let id = self.registry.lookup::<T>()?;
        self.storages[id.0 as usize]
            .as_any()
            .downcast_ref::<ComponentTable<T>>()
    }

    fn table_mut<T: Component>(&mut self) -> Option<&mut ComponentTable<T>> {
        let id = self.registry.lookup::<T>()?;
        self.storages[id.0 as usize]
            .as_any_mut()
            .downcast_mut::<ComponentTable<T>>()
    }

    fn unknown_component<T: 'static>(&self) -> EcsError {
        EcsError::UnknownComponent {
            name: std::any::type_name::<T>().to_owned(),
            registered: self.registry.registered_names().join(", "),
        }
    }

    fn component_name<T: 'static>(&self) -> String {
        self.registry
            .lookup::<T>()
            .and_then(|id| self.registry.get_info(id))
            .map(|info| info.name.clone())
            .unwrap_or_else(|| std::any::type_name::<T>().to_owned())
    }

    // -- entity lifecycle ---------------------------------------------------

    /// Create a new entity with no components.
    pub fn create(&mut self) -> EntityId {
        let entity = self.allocator.allocate();
        let idx = entity.index() as usize;
        if idx >= self.spawn_serials.len() {
            self.spawn_serials.resize(idx + 1, 0);
        }
        self.spawn_serials[idx] = self.next_serial;
        self.next_serial += 1;
        self.creation_order.push(entity);
        entity
    }

    /// Create an entity and attach every component of `bundle`.
    ///
    /// # Panics
    ///
    /// Panics if any component type in the bundle is unregistered.
    pub fn spawn<B: Bundle>(&mut self, bundle: B) -> EntityId {
        let entity = self.create();
        bundle.insert_into(self, entity);
        entity
    }

    /// Spawn a new entity with a single component.
    pub fn spawn_with<T: Component>(&mut self, component: T) -> EntityId {
        self.spawn((component,))
    }

    /// Destroy an entity.
    ///
    /// The handle is invalid from this call on: `has`/`get` report nothing
    /// and no traversal yields the entity again. Storage is reclaimed by
    /// [`sweep_destroyed`](Self::sweep_destroyed).
    ///
    /// Returns `false` (and does nothing) if the handle was already stale.
    pub fn destroy(&mut self, entity: EntityId) -> bool {
        let destroyed = self.allocator.mark_destroyed(entity);
        if !destroyed {
            tracing::trace!(entity = %entity, "destroy ignored for stale handle");
        }
        destroyed
    }

    /// Reclaim the storage of every entity destroyed since the last sweep.
    ///
    /// Returns the number of entities swept.
    pub fn sweep_destroyed(&mut self) -> usize {
        let released = self.allocator.release_pending();
        if released.is_empty() {
            return 0;
        }
        for &index in &released {
            for storage in &mut self.storages {
                storage.clear(index);
            }
        }
        let allocator = &self.allocator;
        self.creation_order.retain(|&e| allocator.is_alive(e));
        tracing::trace!(count = released.len(), "swept destroyed entities");
        released.len()
    }

    /// Returns `true` if `entity` is alive (not destroyed, not stale).
    pub fn is_alive(&self, entity: EntityId) -> bool {
        self.allocator.is_alive(entity)
    }

    /// Number of live entities.
    pub fn entity_count(&self) -> usize {
        self.allocator.alive_count()
    }

    /// Number of destroyed entities whose storage awaits the next sweep.
    pub fn pending_destruction_count(&self) -> usize {
        self.allocator.pending_count()
    }

    /// Capture the current point in creation history.
    pub fn spawn_marker(&self) -> SpawnMarker {
        SpawnMarker(self.next_serial)
    }

    /// Whether a live `entity` was created after `marker` was taken.
    pub fn created_since(&self, entity: EntityId, marker: SpawnMarker) -> bool {
        self.is_alive(entity) && self.spawn_serials[entity.index() as usize] >= marker.0
    }

    // -- component access ---------------------------------------------------

    /// Attach (or overwrite) a component, returning the previous value.
    ///
    /// # Errors
    ///
    /// [`EcsError::StaleEntity`] for dead handles,
    /// [`EcsError::UnknownComponent`] for unregistered types.
    pub fn try_add<T: Component>(
        &mut self,
        entity: EntityId,
        value: T,
    ) -> Result<Option<T>, EcsError> {
        if !self.is_alive(entity) {
            return Err(EcsError::StaleEntity { entity });
        }
        match self.table_mut::<T>() {
            Some(table) => Ok(table.insert(entity.index(), value)),
            None => Err(self.unknown_component::<T>()),
        }
    }

    /// Attach (or overwrite) a component.
    ///
    /// # Panics
    ///
    /// Adding to a destroyed entity or adding an unregistered type is a
    /// programming error and panics.
    pub fn add<T: Component>(&mut self, entity: EntityId, value: T) {
        if let Err(e) = self.try_add(entity, value) {
            panic!("add failed: {e}");
        }
    }

    /// Detach a component, returning it if it was present.
    pub fn remove<T: Component>(&mut self, entity: EntityId) -> Option<T> {
        if !self.is_alive(entity) {
            return None;
        }
        self.table_mut::<T>()?.remove(entity.index())
    }

    /// Get an immutable reference to a component on an entity.
    pub fn get<T: Component>(&self, entity: EntityId) -> Option<&T> {
        if !self.is_alive(entity) {
            return None;
        }
        self.table::<T>()?.get(entity.index())
    }

    /// Get a mutable reference to a component on an entity.
    pub fn get_mut<T: Component>(&mut self, entity: EntityId) -> Option<&mut T> {
        if !self.is_alive(entity) {
            return None;
        }
        self.table_mut::<T>()?.get_mut(entity.index())
    }

    /// Like [`get`](Self::get), but also reaches the rows of an entity
    /// destroyed since the last sweep.
    ///
    /// Meant for the callback that destroyed the entity it is visiting. Any
    /// other holder of the handle should treat it as gone.
    pub fn get_retained<T: Component>(&self, entity: EntityId) -> Option<&T> {
        if !self.is_alive(entity) && !self.allocator.is_pending_sweep(entity) {
            return None;
        }
        self.table::<T>()?.get(entity.index())
    }

    /// Mutable counterpart of [`get_retained`](Self::get_retained).
    pub fn get_retained_mut<T: Component>(&mut self, entity: EntityId) -> Option<&mut T> {
        if !self.is_alive(entity) && !self.allocator.is_pending_sweep(entity) {
            return None;
        }
        self.table_mut::<T>()?.get_mut(entity.index())
    }

    /// Fail-fast access to a component the caller knows is present.
    ///
    /// # Panics
    ///
    /// Panics if the entity is dead or lacks the component.
    pub fn component<T: Component>(&self, entity: EntityId) -> &T {
        match self.get::<T>(entity) {
            Some(value) => value,
            None => panic!(
                "entity {entity} has no component '{}'",
                self.component_name::<T>()
            ),
        }
    }

    /// Fail-fast mutable access to a component the caller knows is present.
    ///
    /// # Panics
    ///
    /// Panics if the entity is dead or lacks the component.
    pub fn component_mut<T: Component>(&mut self, entity: EntityId) -> &mut T {
        if !self.has_component::<T>(entity) {
            panic!(
                "entity {entity} has no component '{}'",
                self.component_name::<T>()
            );
        }
        match self.get_mut::<T>(entity) {
            Some(value) => value,
            None => unreachable!("presence checked above"),
        }
    }

    /// Check whether an entity has a given component type.
    pub fn has_component<T: Component>(&self, entity: EntityId) -> bool {
        self.get::<T>(entity).is_some()
    }

    /// Check whether an entity carries every component in signature `S`.
    pub fn has<S: Signature>(&self, entity: EntityId) -> bool {
        self.is_alive(entity) && S::matches(self, entity)
    }

    // -- traversal ----------------------------------------------------------

    /// Handles of every live entity matching `S`, in creation order.
    pub fn entities_with<S: Signature>(&self) -> Vec<EntityId> {
        self.creation_order
            .iter()
            .copied()
            .filter(|&e| self.has::<S>(e))
            .collect()
    }

    /// The oldest live entity matching `S`.
    pub fn first_with<S: Signature>(&self) -> Option<EntityId> {
        self.creation_order
            .iter()
            .copied()
            .find(|&e| self.has::<S>(e))
    }

    /// Visit every entity matching `S` with mutable world access.
    ///
    /// The candidate list is fixed when the call starts, so entities created
    /// by `f` are not visited. Each candidate is re-checked right before its
    /// visit: an entity destroyed, or stripped of a required component, by an
    /// earlier callback is skipped.
    pub fn each<S: Signature>(&mut self, mut f: impl FnMut(&mut World, EntityId)) {
        let candidates = self.creation_order.clone();
        for entity in candidates {
            if self.has::<S>(entity) {
                f(self, entity);
            }
        }
    }

    /// Lazy read-only iteration over `(EntityId, components)` in creation
    /// order, e.g. `world.query::<(&Pos, Option<&Vel>)>()`.
    pub fn query<Q: Query>(&self) -> QueryIter<'_, Q> {
        QueryIter::new(self)
    }

    /// Number of live entities carrying component `T`.
    pub fn count_with<T: Component>(&self) -> usize {
        self.creation_order
            .iter()
            .filter(|&&e| self.has_component::<T>(e))
            .count()
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, serde::Serialize)]
    struct Pos {
        x: i32,
        y: i32,
    }

    #[derive(Debug, Clone, PartialEq, serde::Serialize)]
    struct Vel {
        dx: f32,
        dy: f32,
    }

    #[derive(Debug, Clone, PartialEq, serde::Serialize)]
    struct Door;

    fn setup_world() -> World {
        let mut world = World::new();
        world.register_component::<Pos>("position");
        world.register_component::<Vel>("velocity");
        world.register_component::<Door>("door");
        world
    }

    #[test]
    fn create_add_get() {
        let mut world = setup_world();
        let e = world.create();
        world.add(e, Pos { x: 1, y: 2 });
        assert_eq!(world.get::<Pos>(e), Some(&Pos { x: 1, y: 2 }));
        assert!(world.get::<Vel>(e).is_none());
        assert!(world.has_component::<Pos>(e));
        assert!(!world.has::<(Pos, Vel)>(e));
    }

    #[test]
    fn add_overwrites_and_returns_previous() {
        let mut world = setup_world();
        let e = world.spawn_with(Pos { x: 0, y: 0 });
        let previous = world.try_add(e, Pos { x: 9, y: 9 }).unwrap();
        assert_eq!(previous, Some(Pos { x: 0, y: 0 }));
        assert_eq!(world.component::<Pos>(e), &Pos { x: 9, y: 9 });
    }

    #[test]
    fn try_add_unregistered_is_error() {
        #[derive(Debug, Clone, serde::Serialize)]
        struct Unregistered;
        let mut world = setup_world();
        let e = world.create();
        let err = world.try_add(e, Unregistered).unwrap_err();
        assert!(matches!(err, EcsError::UnknownComponent { .. }));
    }

    #[test]
    fn try_add_stale_is_error() {
        let mut world = setup_world();
        let e = world.create();
        world.destroy(e);
        let err = world.try_add(e, Pos { x: 0, y: 0 }).unwrap_err();
        assert!(matches!(err, EcsError::StaleEntity { .. }));
    }

    #[test]
    #[should_panic(expected = "has no component 'velocity'")]
    fn component_access_fails_fast() {
        let mut world = setup_world();
        let e = world.spawn_with(Pos { x: 0, y: 0 });
        let _ = world.component::<Vel>(e);
    }

    #[test]
    fn destroyed_handle_is_invalid_before_sweep() {
        let mut world = setup_world();
        let e = world.spawn((Pos { x: 1, y: 1 }, Door));
        assert!(world.destroy(e));
        assert!(!world.is_alive(e));
        assert!(!world.has_component::<Pos>(e));
        assert!(!world.has::<(Door,)>(e));
        assert_eq!(world.get::<Pos>(e), None);
        assert_eq!(world.remove::<Pos>(e), None);
        assert_eq!(world.pending_destruction_count(), 1);
        assert_eq!(world.entities_with::<(Pos,)>(), Vec::<EntityId>::new());

        assert_eq!(world.sweep_destroyed(), 1);
        assert_eq!(world.pending_destruction_count(), 0);
    }

    #[test]
    fn sweep_clears_rows_before_slot_reuse() {
        let mut world = setup_world();
        let old = world.spawn((Pos { x: 1, y: 1 }, Vel { dx: 1.0, dy: 0.0 }));
        world.destroy(old);
        world.sweep_destroyed();

        let fresh = world.create();
        assert_eq!(fresh.index(), old.index());
        assert!(world.get::<Pos>(fresh).is_none());
        assert!(world.get::<Vel>(fresh).is_none());
    }

    #[test]
    fn iteration_follows_creation_order_despite_recycling() {
        let mut world = setup_world();
        let a = world.spawn_with(Pos { x: 0, y: 0 });
        let b = world.spawn_with(Pos { x: 1, y: 0 });
        world.destroy(a);
        world.sweep_destroyed();
        // Reuses a's slot index but is younger than b.
        let c = world.spawn_with(Pos { x: 2, y: 0 });
        assert_eq!(c.index(), a.index());

        let order: Vec<EntityId> = world.query::<(&Pos,)>().map(|(e, _)| e).collect();
        assert_eq!(order, vec![b, c]);
    }

    #[test]
    fn each_skips_entities_destroyed_by_earlier_callbacks() {
        let mut world = setup_world();
        let a = world.spawn_with(Pos { x: 0, y: 0 });
        let b = world.spawn_with(Pos { x: 1, y: 0 });
        let mut visited = Vec::new();
        world.each::<(Pos,)>(|world, entity| {
            visited.push(entity);
            if entity == a {
                world.destroy(b);
            }
        });
        assert_eq!(visited, vec![a]);
    }

    #[test]
    fn each_skips_entities_that_lost_a_component() {
        let mut world = setup_world();
        let a = world.spawn((Pos { x: 0, y: 0 }, Vel { dx: 0.0, dy: 0.0 }));
        let b = world.spawn((Pos { x: 1, y: 0 }, Vel { dx: 0.0, dy: 0.0 }));
        let mut visited = Vec::new();
        world.each::<(Pos, Vel)>(|world, entity| {
            visited.push(entity);
            world.remove::<Vel>(b);
        });
        assert_eq!(visited, vec![a]);
    }

    #[test]
    fn each_does_not_visit_entities_created_during_traversal() {
        let mut world = setup_world();
        world.spawn_with(Pos { x: 0, y: 0 });
        let mut visits = 0;
        world.each::<(Pos,)>(|world, _| {
            visits += 1;
            world.spawn_with(Pos { x: 5, y: 5 });
        });
        assert_eq!(visits, 1);
        assert_eq!(world.count_with::<Pos>(), 2);
    }

    #[test]
    fn current_entity_destroyed_mid_callback_does_not_crash() {
        let mut world = setup_world();
        let a = world.spawn_with(Pos { x: 0, y: 0 });
        world.each::<(Pos,)>(|world, entity| {
            world.destroy(entity);
            assert!(!world.has_component::<Pos>(entity));
            assert!(!world.destroy(entity));
        });
        assert!(!world.is_alive(a));
        assert_eq!(world.query::<(&Pos,)>().count(), 0);
    }

    #[test]
    fn destroyed_entity_rows_stay_readable_until_the_sweep() {
        let mut world = setup_world();
        let a = world.spawn((Pos { x: 3, y: 4 }, Vel { dx: 1.0, dy: 0.0 }));
        let mut seen = Vec::new();
        world.each::<(Pos, Vel)>(|world, entity| {
            world.destroy(entity);
            if let Some(vel) = world.get_retained_mut::<Vel>(entity) {
                vel.dx = 0.0;
            }
            seen.push((
                world.get_retained::<Pos>(entity).cloned(),
                world.get_retained::<Vel>(entity).map(|v| v.dx),
            ));
        });
        assert_eq!(seen, vec![(Some(Pos { x: 3, y: 4 }), Some(0.0))]);

        // Ordinary lookups already treat the handle as gone.
        assert!(world.get::<Pos>(a).is_none());
        assert!(!world.has::<(Pos,)>(a));

        world.sweep_destroyed();
        assert!(world.get_retained::<Pos>(a).is_none());
        let b = world.spawn_with(Pos { x: 9, y: 9 });
        assert_eq!(b.index(), a.index());
        assert!(world.get_retained::<Pos>(a).is_none());
    }

    #[test]
    fn spawn_marker_tracks_late_entities() {
        let mut world = setup_world();
        let early = world.spawn_with(Pos { x: 0, y: 0 });
        let marker = world.spawn_marker();
        let late = world.spawn_with(Pos { x: 0, y: 0 });
        assert!(!world.created_since(early, marker));
        assert!(world.created_since(late, marker));
        world.destroy(late);
        assert!(!world.created_since(late, marker));
    }

    #[test]
    fn first_with_returns_oldest_match() {
        let mut world = setup_world();
        world.spawn_with(Pos { x: 0, y: 0 });
        let door1 = world.spawn((Pos { x: 1, y: 0 }, Door));
        let _door2 = world.spawn((Pos { x: 2, y: 0 }, Door));
        assert_eq!(world.first_with::<(Door,)>(), Some(door1));
    }
}
