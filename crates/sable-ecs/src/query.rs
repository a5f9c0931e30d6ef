//! Queries, signatures and bundles.
//!
//! * [`Signature`] is a tuple of component *types* used to filter entities:
//!   `world.has::<(Pos, Vel)>(e)`, `world.each::<(Pos, Vel)>(..)`.
//! * [`Query`] is a tuple of component *borrows* fetched per entity:
//!   `world.query::<(&Pos, Option<&Vel>)>()`. An `Option<&T>` item never
//!   filters; it yields `None` for entities without `T`.
//! * [`Bundle`] is a tuple of component *values* attached by
//!   [`World::spawn`].
//!
//! All three are implemented for tuples of one to eight elements.

use std::marker::PhantomData;

use crate::component::Component;
use crate::entity::EntityId;
use crate::world::World;

// ---------------------------------------------------------------------------
// Signature
// ---------------------------------------------------------------------------

/// A set of component types an entity must carry.
pub trait Signature {
    /// Whether `entity` carries every component of the signature.
    fn matches(world: &World, entity: EntityId) -> bool;
}

// ---------------------------------------------------------------------------
// QueryItem -- one element of a query tuple
// ---------------------------------------------------------------------------

/// A single element of a query fetch: `&T` or `Option<&T>`.
pub trait QueryItem {
    /// The output type yielded per entity.
    type Item<'w>;
    /// Fetch the item, or `None` if the entity does not satisfy it.
    fn fetch<'w>(world: &'w World, entity: EntityId) -> Option<Self::Item<'w>>;
}

impl<T: Component> QueryItem for &T {
    type Item<'w> = &'w T;

    fn fetch<'w>(world: &'w World, entity: EntityId) -> Option<Self::Item<'w>> {
        world.get::<T>(entity)
    }
}

impl<T: Component> QueryItem for Option<&T> {
    type Item<'w> = Option<&'w T>;

    fn fetch<'w>(world: &'w World, entity: EntityId) -> Option<Self::Item<'w>> {
        Some(world.get::<T>(entity))
    }
}

// ---------------------------------------------------------------------------
// Query -- a tuple of QueryItems
// ---------------------------------------------------------------------------

/// A tuple of query items: `(&A,)`, `(&A, Option<&B>)`, ...
pub trait Query {
    /// The per-entity output type.
    type Item<'w>;
    /// Fetch every item, or `None` if any required item is missing.
    fn fetch<'w>(world: &'w World, entity: EntityId) -> Option<Self::Item<'w>>;
}

// ---------------------------------------------------------------------------
// Bundle
// ---------------------------------------------------------------------------

/// A tuple of component values attached together.
pub trait Bundle {
    /// Attach every component to `entity`.
    ///
    /// # Panics
    ///
    /// Panics if a component type is unregistered or `entity` is stale.
    fn insert_into(self, world: &mut World, entity: EntityId);
}

// -- tuple impls -------------------------------------------------------------

macro_rules! impl_tuples {
    ($($name:ident),+) => {
        impl<$($name: Component),+> Signature for ($($name,)+) {
            fn matches(world: &World, entity: EntityId) -> bool {
                $(world.has_component::<$name>(entity))&&+
            }
        }

        impl<$($name: QueryItem),+> Query for ($($name,)+) {
            type Item<'w> = ($($name::Item<'w>,)+);

            fn fetch<'w>(world: &'w World, entity: EntityId) -> Option<Self::Item<'w>> {
                Some(($($name::fetch(world, entity)?,)+))
            }
        }

        impl<$($name: Component),+> Bundle for ($($name,)+) {
            #[allow(non_snake_case)]
            fn insert_into(self, world: &mut World, entity: EntityId) {
                let ($($name,)+) = self;
                $(world.add(entity, $name);)+
            }
        }
    };
}

impl_tuples!(A);
impl_tuples!(A, B);
impl_tuples!(A, B, C);
impl_tuples!(A, B, C, D);
impl_tuples!(A, B, C, D, E);
impl_tuples!(A, B, C, D, E, F);
impl_tuples!(A, B, C, D, E, F, G);
impl_tuples!(A, B, C, D, E, F, G, H);

// ---------------------------------------------------------------------------
// QueryIter
// ---------------------------------------------------------------------------

/// Iterator that yields `(EntityId, Q::Item)` for all matching entities in
/// creation order. Created by [`World::query`].
pub struct QueryIter<'w, Q: Query> {
    world: &'w World,
    cursor: usize,
    _marker: PhantomData<Q>,
}

impl<'w, Q: Query> QueryIter<'w, Q> {
    pub(crate) fn new(world: &'w World) -> Self {
        Self {
            world,
            cursor: 0,
            _marker: PhantomData,
        }
    }
}

impl<'w, Q: Query> Iterator for QueryIter<'w, Q> {
    type Item = (EntityId, Q::Item<'w>);

    fn next(&mut self) -> Option<Self::Item> {
        let world = self.world;
        while let Some(&entity) = world.creation_order.get(self.cursor) {
            self.cursor += 1;
            if !world.is_alive(entity) {
                continue;
            }
            if let Some(item) = Q::fetch(world, entity) {
                return Some((entity, item));
            }
        }
        None
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
