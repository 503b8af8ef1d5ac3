//! The scene owns every body and force generator in a simulation
//! and drives them through fixed-order ticks.

use crate::{body::Body, forces::ForceGenerator};

use thunderdome as td;

/// Key type to look up a body stored in a scene.
///
/// Keys stay valid across other bodies being added and removed;
/// a key to a pruned body simply stops resolving.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BodyKey(pub(crate) td::Index);

impl BodyKey {
    /// Get the underlying [`thunderdome::Index`][thunderdome::Index] of this key.
    /// Useful for creating your own mappings from bodies to other things.
    #[inline]
    pub fn index(&self) -> td::Index {
        self.0
    }
}

/// The bodies of a scene: arena storage plus an insertion-order index,
/// so that iteration and index-based access are deterministic while
/// keys stay stable across removals.
pub struct BodySet {
    bodies: td::Arena<Body>,
    order: Vec<BodyKey>,
}

impl BodySet {
    pub(crate) fn new() -> Self {
        BodySet {
            bodies: td::Arena::new(),
            order: Vec::new(),
        }
    }

    pub(crate) fn insert(&mut self, body: Body) -> BodyKey {
        let key = BodyKey(self.bodies.insert(body));
        self.order.push(key);
        key
    }

    /// Access a body if it still exists.
    #[inline]
    pub fn get(&self, key: BodyKey) -> Option<&Body> {
        self.bodies.get(key.0)
    }

    /// Mutably access a body if it still exists.
    #[inline]
    pub fn get_mut(&mut self, key: BodyKey) -> Option<&mut Body> {
        self.bodies.get_mut(key.0)
    }

    /// Mutably access two distinct bodies at once.
    /// Returns `None` if either has been pruned.
    ///
    /// # Panics
    /// If both keys refer to the same body.
    pub fn get_pair_mut(&mut self, pair: [BodyKey; 2]) -> Option<[&mut Body; 2]> {
        match self.bodies.get2_mut(pair[0].0, pair[1].0) {
            (Some(b1), Some(b2)) => Some([b1, b2]),
            _ => None,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// The body at an insertion-order index.
    ///
    /// # Panics
    /// If the index is out of range.
    #[inline]
    pub fn at(&self, index: usize) -> &Body {
        self.get(self.order[index])
            .expect("body order list out of sync with arena")
    }

    /// Mutable access to the body at an insertion-order index.
    ///
    /// # Panics
    /// If the index is out of range.
    #[inline]
    pub fn at_mut(&mut self, index: usize) -> &mut Body {
        let key = self.order[index];
        self.get_mut(key)
            .expect("body order list out of sync with arena")
    }

    /// The key of the body at an insertion-order index.
    ///
    /// # Panics
    /// If the index is out of range.
    #[inline]
    pub fn key_at(&self, index: usize) -> BodyKey {
        self.order[index]
    }

    /// Iterate over bodies in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (BodyKey, &Body)> {
        self.order.iter().map(move |key| (*key, self.at_by_key(*key)))
    }

    fn at_by_key(&self, key: BodyKey) -> &Body {
        self.get(key).expect("body order list out of sync with arena")
    }

    /// Drop every body marked removed, in both the arena and the order
    /// list. Returns how many were dropped.
    pub(crate) fn prune(&mut self) -> usize {
        let before = self.order.len();
        let Self { bodies, order } = self;
        bodies.retain(|_, body| !body.is_removed());
        order.retain(|key| bodies.contains(key.0));
        before - order.len()
    }
}

/// A simulation scene: the body collection, the force generator
/// collection, and the tick loop that couples them.
///
/// Everything in a scene is owned by it; external code holds
/// [`BodyKey`]s and goes through the scene to read or mutate state.
/// Dropping the scene drops every body (and its payload) and every
/// generator (and its captured state).
pub struct Scene {
    bodies: BodySet,
    forces: Vec<Box<dyn ForceGenerator>>,
}

impl Scene {
    pub fn new() -> Self {
        Scene {
            bodies: BodySet::new(),
            forces: Vec::new(),
        }
    }

    /// Transfer a body into the scene, receiving a stable key for it.
    pub fn add_body(&mut self, body: Body) -> BodyKey {
        let key = self.bodies.insert(body);
        log::debug!("added body {:?}", key);
        key
    }

    #[inline]
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// How many force generators are currently registered.
    #[inline]
    pub fn force_count(&self) -> usize {
        self.forces.len()
    }

    /// The body at an insertion-order index.
    ///
    /// # Panics
    /// If the index is out of range.
    #[inline]
    pub fn body(&self, index: usize) -> &Body {
        self.bodies.at(index)
    }

    /// Mutable access to the body at an insertion-order index.
    ///
    /// # Panics
    /// If the index is out of range.
    #[inline]
    pub fn body_mut(&mut self, index: usize) -> &mut Body {
        self.bodies.at_mut(index)
    }

    /// Access a body by key, if it still exists.
    #[inline]
    pub fn get(&self, key: BodyKey) -> Option<&Body> {
        self.bodies.get(key)
    }

    /// Mutably access a body by key, if it still exists.
    #[inline]
    pub fn get_mut(&mut self, key: BodyKey) -> Option<&mut Body> {
        self.bodies.get_mut(key)
    }

    /// Read-only access to the whole body collection.
    #[inline]
    pub fn bodies(&self) -> &BodySet {
        &self.bodies
    }

    /// Mark the body at an insertion-order index for removal.
    /// It is pruned, along with every generator anchored to it,
    /// at the end of the next tick.
    ///
    /// # Panics
    /// If the index is out of range.
    pub fn remove_body(&mut self, index: usize) {
        self.bodies.at_mut(index).remove();
    }

    /// Register a force generator. It runs every tick, in registration
    /// order, until a body it is anchored to is removed.
    pub fn add_force(&mut self, generator: impl ForceGenerator + 'static) {
        self.forces.push(Box::new(generator));
    }

    /// Register a closure as a force generator not anchored to any body.
    pub fn add_force_fn(&mut self, f: impl FnMut(&mut BodySet) + 'static) {
        self.add_force(crate::forces::Closure::from_fn(f));
    }

    /// Register a closure as a force generator anchored to the given bodies.
    pub fn add_force_fn_with_bodies(
        &mut self,
        anchors: Vec<BodyKey>,
        f: impl FnMut(&mut BodySet) + 'static,
    ) {
        self.add_force(crate::forces::Closure::from_fn_with_bodies(anchors, f));
    }

    /// Advance the simulation by one step.
    ///
    /// Phase order is fixed and significant:
    /// 1. every generator runs against pre-integration state,
    ///    in registration order;
    /// 2. every body integrates its accumulators, in insertion order;
    /// 3. generators anchored to a removed body are dropped;
    /// 4. removed bodies are dropped.
    ///
    /// Pruning comes last so that handlers observe consistent positions
    /// and velocities for the tick in which the triggering event fired.
    pub fn tick(&mut self, dt: f64) {
        for generator in &mut self.forces {
            generator.apply(&mut self.bodies);
        }

        for i in 0..self.bodies.len() {
            self.bodies.at_mut(i).tick(dt);
        }

        let bodies = &self.bodies;
        let forces_before = self.forces.len();
        self.forces.retain(|generator| {
            !generator
                .anchors()
                .iter()
                .any(|key| bodies.get(*key).map_or(true, |body| body.is_removed()))
        });
        let forces_pruned = forces_before - self.forces.len();
        if forces_pruned > 0 {
            log::debug!("pruned {} force generators", forces_pruned);
        }

        let bodies_pruned = self.bodies.prune();
        if bodies_pruned > 0 {
            log::debug!("pruned {} bodies", bodies_pruned);
        }
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}
