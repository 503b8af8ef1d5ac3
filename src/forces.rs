//! Force generators: pairwise couplings between bodies, applied once per
//! scene tick before integration.
//!
//! A generator is registered on a [`Scene`][crate::Scene] and lives until
//! any body it is anchored to is removed. Generators only push forces and
//! impulses into bodies (or mutate body state in the case of collision
//! responses); they never touch the scene's collections.

use crate::{
    body::Body,
    collision,
    math::{Unit, Vec2},
    scene::{BodyKey, BodySet},
};

/// Inverse-square couplings produce no force below this centroid distance,
/// so near-coincident bodies don't get launched by an unbounded force.
pub const MIN_ATTRACTION_DISTANCE: f64 = 5.0;

/// A coupling between bodies that is applied once per scene tick.
pub trait ForceGenerator {
    /// Push this tick's forces/impulses into the affected bodies.
    ///
    /// Anchored bodies may have been pruned already; implementations
    /// must treat a missing body as a no-op.
    fn apply(&mut self, bodies: &mut BodySet);

    /// The bodies this generator is attached to.
    ///
    /// Used only for pruning: the generator is dropped by the scene once
    /// any anchor has been removed. An empty slice means the generator
    /// lives as long as the scene.
    fn anchors(&self) -> &[BodyKey];
}

//
// inverse-square coupling (gravity / vortex)
//

/// An inverse-square attraction between two bodies,
/// `constant * m1 * m2 / d^2` along the line between their centroids.
///
/// Both [`newtonian_gravity`] and [`vortex`] produce this; they had
/// identical behavior as separate generators, so they share one type
/// with two named constructors.
pub struct InverseSquare {
    constant: f64,
    pair: [BodyKey; 2],
}

/// Newtonian gravity between two bodies with gravitational constant `g`.
pub fn newtonian_gravity(g: f64, body1: BodyKey, body2: BodyKey) -> InverseSquare {
    InverseSquare {
        constant: g,
        pair: [body1, body2],
    }
}

/// A vortex pulling two bodies together, same shape of force as gravity.
pub fn vortex(strength: f64, body1: BodyKey, body2: BodyKey) -> InverseSquare {
    InverseSquare {
        constant: strength,
        pair: [body1, body2],
    }
}

impl ForceGenerator for InverseSquare {
    fn apply(&mut self, bodies: &mut BodySet) {
        let (Some(b1), Some(b2)) = (bodies.get(self.pair[0]), bodies.get(self.pair[1])) else {
            return;
        };
        let diff = b1.centroid() - b2.centroid();
        let dist = diff.mag();
        if dist <= MIN_ATTRACTION_DISTANCE {
            return;
        }
        let magnitude = self.constant * b1.mass().get() * b2.mass().get() / (dist * dist);
        // pulls body2 toward body1 and vice versa
        let force_on_2 = diff * (magnitude / dist);
        if let Some(b1) = bodies.get_mut(self.pair[0]) {
            b1.add_force(-force_on_2);
        }
        if let Some(b2) = bodies.get_mut(self.pair[1]) {
            b2.add_force(force_on_2);
        }
    }

    fn anchors(&self) -> &[BodyKey] {
        &self.pair
    }
}

//
// spring
//

/// An undamped Hookean spring between two bodies' centroids
/// with rest length zero.
pub struct Spring {
    stiffness: f64,
    pair: [BodyKey; 2],
}

pub fn spring(stiffness: f64, body1: BodyKey, body2: BodyKey) -> Spring {
    Spring {
        stiffness,
        pair: [body1, body2],
    }
}

impl ForceGenerator for Spring {
    fn apply(&mut self, bodies: &mut BodySet) {
        let (Some(b1), Some(b2)) = (bodies.get(self.pair[0]), bodies.get(self.pair[1])) else {
            return;
        };
        let force_on_1 = (b2.centroid() - b1.centroid()) * self.stiffness;
        if let Some(b1) = bodies.get_mut(self.pair[0]) {
            b1.add_force(force_on_1);
        }
        if let Some(b2) = bodies.get_mut(self.pair[1]) {
            b2.add_force(-force_on_1);
        }
    }

    fn anchors(&self) -> &[BodyKey] {
        &self.pair
    }
}

//
// drag
//

/// Linear drag on a single body, `-coefficient * velocity`.
pub struct Drag {
    coefficient: f64,
    body: [BodyKey; 1],
}

pub fn drag(coefficient: f64, body: BodyKey) -> Drag {
    Drag {
        coefficient,
        body: [body],
    }
}

impl ForceGenerator for Drag {
    fn apply(&mut self, bodies: &mut BodySet) {
        if let Some(body) = bodies.get_mut(self.body[0]) {
            let force = body.velocity() * -self.coefficient;
            body.add_force(force);
        }
    }

    fn anchors(&self) -> &[BodyKey] {
        &self.body
    }
}

//
// arbitrary closures
//

/// A generator from an arbitrary closure, for effects the built-in
/// library doesn't cover. The closure's captured state plays the role
/// of the generator's parameters and is dropped with it.
pub struct Closure {
    anchors: Vec<BodyKey>,
    f: Box<dyn FnMut(&mut BodySet)>,
}

impl Closure {
    /// A closure generator not anchored to any body;
    /// it is never pruned automatically.
    pub fn from_fn(f: impl FnMut(&mut BodySet) + 'static) -> Self {
        Closure {
            anchors: Vec::new(),
            f: Box::new(f),
        }
    }

    /// A closure generator pruned once any of the given bodies is removed.
    pub fn from_fn_with_bodies(
        anchors: Vec<BodyKey>,
        f: impl FnMut(&mut BodySet) + 'static,
    ) -> Self {
        Closure {
            anchors,
            f: Box::new(f),
        }
    }
}

impl ForceGenerator for Closure {
    fn apply(&mut self, bodies: &mut BodySet) {
        (self.f)(bodies);
    }

    fn anchors(&self) -> &[BodyKey] {
        &self.anchors
    }
}

//
// collision-triggered responses
//

/// Called when a watched pair of bodies starts to overlap,
/// with the minimum-overlap axis from the separating axis test.
pub type CollisionHandler = Box<dyn FnMut(&mut Body, &mut Body, Unit<Vec2>)>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ContactState {
    Separated,
    Contacting,
}

/// Watches a pair of bodies and invokes a handler when they collide.
///
/// The handler is edge-triggered: it fires exactly once when the pair
/// goes from separated to overlapping, and cannot fire again until
/// they have fully separated. Continued overlap is debounced.
pub struct CollisionForce {
    pair: [BodyKey; 2],
    state: ContactState,
    handler: CollisionHandler,
}

impl CollisionForce {
    /// Watch a pair of bodies with a custom handler.
    pub fn new(
        body1: BodyKey,
        body2: BodyKey,
        handler: impl FnMut(&mut Body, &mut Body, Unit<Vec2>) + 'static,
    ) -> Self {
        CollisionForce {
            pair: [body1, body2],
            state: ContactState::Separated,
            handler: Box::new(handler),
        }
    }
}

impl ForceGenerator for CollisionForce {
    fn apply(&mut self, bodies: &mut BodySet) {
        let (Some(b1), Some(b2)) = (bodies.get(self.pair[0]), bodies.get(self.pair[1])) else {
            return;
        };
        // one collision test per tick, shared between the transition
        // check and the handler's resolution normal
        let contact = collision::intersection_check(b1.shape(), b2.shape());
        match (self.state, contact) {
            (ContactState::Separated, Some(contact)) => {
                if let Some([b1, b2]) = bodies.get_pair_mut(self.pair) {
                    (self.handler)(b1, b2, contact.normal);
                }
                self.state = ContactState::Contacting;
            }
            (ContactState::Contacting, None) => {
                self.state = ContactState::Separated;
            }
            (ContactState::Separated, None) | (ContactState::Contacting, Some(_)) => {}
        }
    }

    fn anchors(&self) -> &[BodyKey] {
        &self.pair
    }
}

/// Remove both bodies on first contact.
pub fn destructive(body1: BodyKey, body2: BodyKey) -> CollisionForce {
    CollisionForce::new(body1, body2, |b1, b2, _| {
        b1.remove();
        b2.remove();
    })
}

/// Impulse-based bounce with the given elasticity
/// (0 = perfectly inelastic, 1 = perfectly elastic).
pub fn bounce(elasticity: f64, body1: BodyKey, body2: BodyKey) -> CollisionForce {
    CollisionForce::new(body1, body2, move |b1, b2, normal| {
        bounce_impulse(b1, b2, normal, elasticity);
    })
}

/// Bounce, then remove the first body. The second body keeps the
/// momentum kick from the bounce.
pub fn delete_bounce(elasticity: f64, deleted: BodyKey, bounced: BodyKey) -> CollisionForce {
    CollisionForce::new(deleted, bounced, move |b1, b2, normal| {
        bounce_impulse(b1, b2, normal, elasticity);
        b1.remove();
    })
}

/// Increment the first body's counter and remove the second.
pub fn coin_pickup(collector: BodyKey, coin: BodyKey) -> CollisionForce {
    CollisionForce::new(collector, coin, |collector, coin, _| {
        collector.increment_counter();
        coin.remove();
    })
}

/// Scale the first body's velocity by `factor` and remove the second.
pub fn velocity_damp(factor: f64, slowed: BodyKey, removed: BodyKey) -> CollisionForce {
    CollisionForce::new(slowed, removed, move |slowed, removed, _| {
        let v = slowed.velocity();
        slowed.set_velocity(v * factor);
        removed.remove();
    })
}

/// Remove both bodies. Behaviorally the same as [`destructive`],
/// kept separate so callers can watch for the pair that ends the game.
pub fn end_game(body1: BodyKey, body2: BodyKey) -> CollisionForce {
    destructive(body1, body2)
}

/// The impulse exchanged by two colliding bodies along the contact normal.
///
/// Uses the reduced mass `m1*m2/(m1+m2)`, falling back to the finite
/// mass when the other is infinite so immovable bodies reflect instead
/// of absorbing. `+J` goes to the first body and `-J` to the second,
/// which conserves momentum and, at elasticity 1 with equal masses,
/// exchanges the normal velocities.
fn bounce_impulse(b1: &mut Body, b2: &mut Body, normal: Unit<Vec2>, elasticity: f64) {
    let (m1, m2) = (b1.mass(), b2.mass());
    let reduced_mass = match (m1.is_infinite(), m2.is_infinite()) {
        // two immovable bodies have nothing to exchange
        (true, true) => return,
        (true, false) => m2.get(),
        (false, true) => m1.get(),
        (false, false) => m1.get() * m2.get() / (m1.get() + m2.get()),
    };
    let closing_speed = (b2.velocity() - b1.velocity()).dot(*normal);
    let impulse = *normal * (reduced_mass * (1.0 + elasticity) * closing_speed);
    b1.add_impulse(impulse);
    b2.add_impulse(-impulse);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        body::{Body, Color, Mass},
        scene::Scene,
    };
    use std::{cell::Cell, rc::Rc};

    fn square_at(center: Vec2, side: f64, mass: impl Into<Mass>) -> Body {
        let h = side / 2.0;
        Body::new(
            vec![
                center + Vec2::new(-h, -h),
                center + Vec2::new(h, -h),
                center + Vec2::new(h, h),
                center + Vec2::new(-h, h),
            ],
            mass,
            Color::WHITE,
        )
    }

    #[test]
    fn gravity_cutoff_and_magnitude() {
        // exactly at the cutoff distance: no force
        let mut scene = Scene::new();
        let a = scene.add_body(square_at(Vec2::zero(), 1.0, 10.0));
        let b = scene.add_body(square_at(Vec2::new(5.0, 0.0), 1.0, 20.0));
        scene.add_force(newtonian_gravity(2.0, a, b));
        scene.tick(1.0);
        assert_eq!(scene.get(a).unwrap().velocity(), Vec2::zero());
        assert_eq!(scene.get(b).unwrap().velocity(), Vec2::zero());

        // just past the cutoff: inverse-square attraction
        let mut scene = Scene::new();
        let (g, m1, m2, d) = (2.0, 10.0, 20.0, 5.01);
        let a = scene.add_body(square_at(Vec2::zero(), 1.0, m1));
        let b = scene.add_body(square_at(Vec2::new(d, 0.0), 1.0, m2));
        scene.add_force(newtonian_gravity(g, a, b));
        scene.tick(1.0);
        let expected_accel = g * m1 * m2 / (d * d) / m1;
        let v_a = scene.get(a).unwrap().velocity();
        assert!(v_a.x > 0.0, "body a is attracted toward body b");
        assert!((v_a.mag() - expected_accel).abs() < 1e-9);
        let v_b = scene.get(b).unwrap().velocity();
        assert!(v_b.x < 0.0, "body b is attracted toward body a");
    }

    #[test]
    fn spring_pulls_bodies_together() {
        let mut scene = Scene::new();
        let a = scene.add_body(square_at(Vec2::zero(), 1.0, 2.0));
        let b = scene.add_body(square_at(Vec2::new(10.0, 0.0), 1.0, 2.0));
        scene.add_force(spring(3.0, a, b));
        scene.tick(1.0);
        // F = k * displacement = 30, dv = F/m * dt = 15
        assert!((scene.get(a).unwrap().velocity() - Vec2::new(15.0, 0.0)).mag() < 1e-9);
        assert!((scene.get(b).unwrap().velocity() - Vec2::new(-15.0, 0.0)).mag() < 1e-9);
    }

    #[test]
    fn drag_opposes_velocity() {
        let mut scene = Scene::new();
        let a = scene.add_body(square_at(Vec2::zero(), 1.0, 2.0));
        scene.get_mut(a).unwrap().set_velocity(Vec2::new(4.0, 0.0));
        scene.add_force(drag(0.5, a));
        scene.tick(1.0);
        // F = -0.5 * 4 = -2, dv = -1
        assert!((scene.get(a).unwrap().velocity() - Vec2::new(3.0, 0.0)).mag() < 1e-9);
    }

    #[test]
    fn collision_handler_is_edge_triggered() {
        let fired = Rc::new(Cell::new(0));
        let fired_in_handler = fired.clone();

        let mut scene = Scene::new();
        // overlapping from the start
        let a = scene.add_body(square_at(Vec2::zero(), 10.0, 1.0));
        let b = scene.add_body(square_at(Vec2::new(5.0, 0.0), 10.0, 1.0));
        scene.add_force(CollisionForce::new(a, b, move |_, _, _| {
            fired_in_handler.set(fired_in_handler.get() + 1);
        }));

        for _ in 0..5 {
            scene.tick(0.1);
        }
        assert_eq!(fired.get(), 1, "continued overlap is debounced");

        // separate, then bring back into contact
        scene.get_mut(b).unwrap().set_centroid(Vec2::new(100.0, 0.0));
        scene.tick(0.1);
        assert_eq!(fired.get(), 1);
        scene.get_mut(b).unwrap().set_centroid(Vec2::new(5.0, 0.0));
        scene.tick(0.1);
        assert_eq!(fired.get(), 2, "handler fires again after re-contact");
    }

    #[test]
    fn equal_mass_elastic_bounce_swaps_velocities() {
        let mut scene = Scene::new();
        let a = scene.add_body(square_at(Vec2::zero(), 10.0, 2.0));
        let b = scene.add_body(square_at(Vec2::new(5.0, 0.0), 10.0, 2.0));
        scene.get_mut(a).unwrap().set_velocity(Vec2::new(1.0, 0.0));
        scene.get_mut(b).unwrap().set_velocity(Vec2::new(-1.0, 0.0));
        scene.add_force(bounce(1.0, a, b));
        scene.tick(1e-6);
        let (v_a, v_b) = (
            scene.get(a).unwrap().velocity(),
            scene.get(b).unwrap().velocity(),
        );
        assert!((v_a - Vec2::new(-1.0, 0.0)).mag() < 1e-9);
        assert!((v_b - Vec2::new(1.0, 0.0)).mag() < 1e-9);
        // momentum is conserved
        assert!((v_a * 2.0 + v_b * 2.0).mag() < 1e-9);
    }

    #[test]
    fn bounce_off_infinite_mass_reflects() {
        let mut scene = Scene::new();
        let ball = scene.add_body(square_at(Vec2::zero(), 10.0, 3.0));
        let wall = scene.add_body(square_at(Vec2::new(5.0, 0.0), 10.0, Mass::Infinite));
        scene.get_mut(ball).unwrap().set_velocity(Vec2::new(2.0, 0.0));
        scene.add_force(bounce(1.0, ball, wall));
        scene.tick(1e-6);
        assert!((scene.get(ball).unwrap().velocity() - Vec2::new(-2.0, 0.0)).mag() < 1e-9);
        assert_eq!(scene.get(wall).unwrap().velocity(), Vec2::zero());
    }

    #[test]
    fn coin_pickup_counts_and_removes() {
        let mut scene = Scene::new();
        let player = scene.add_body(square_at(Vec2::zero(), 10.0, 1.0));
        let coin = scene.add_body(square_at(Vec2::new(5.0, 0.0), 10.0, 1.0));
        scene.add_force(coin_pickup(player, coin));
        scene.tick(0.1);
        assert_eq!(scene.get(player).unwrap().counter(), 1);
        assert!(scene.get(coin).is_none(), "coin was pruned");
        assert_eq!(scene.body_count(), 1);
    }

    #[test]
    fn velocity_damp_scales_and_removes() {
        let mut scene = Scene::new();
        let player = scene.add_body(square_at(Vec2::zero(), 10.0, 1.0));
        let hazard = scene.add_body(square_at(Vec2::new(5.0, 0.0), 10.0, 1.0));
        scene.get_mut(player).unwrap().set_velocity(Vec2::new(8.0, 0.0));
        scene.add_force(velocity_damp(0.25, player, hazard));
        scene.tick(1e-6);
        assert!((scene.get(player).unwrap().velocity() - Vec2::new(2.0, 0.0)).mag() < 1e-9);
        assert!(scene.get(hazard).is_none());
    }

    #[test]
    fn destructive_collision_removes_both() {
        let mut scene = Scene::new();
        let a = scene.add_body(square_at(Vec2::zero(), 10.0, 1.0));
        let b = scene.add_body(square_at(Vec2::new(5.0, 0.0), 10.0, 1.0));
        scene.add_force(destructive(a, b));
        scene.tick(0.1);
        assert_eq!(scene.body_count(), 0);
        assert_eq!(scene.force_count(), 0);
    }
}
