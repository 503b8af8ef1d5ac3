//! A small 2D rigid body physics core.
//!
//! Bodies are convex polygons with mass and velocity, advanced through
//! time by accumulated forces and impulses. Collisions are detected
//! with a separating axis test, and pairwise force generators (gravity,
//! springs, drag, collision responses) couple bodies together. A
//! [`Scene`] owns both collections and drives one fixed-order
//! simulation step per [`tick`][Scene::tick].
//!
//! Rotational dynamics are out of scope: a body's angle is a cosmetic
//! orientation for rendering, not physically integrated. So are
//! nonconvex shapes and continuous collision detection.

pub mod math;
pub use math::{uv, Rotor2, Unit, Vec2};

pub mod body;
pub use body::{Body, Color, Mass};

pub mod collision;
pub use collision::{intersection_check, Contact};

pub mod forces;
pub use forces::{
    bounce, coin_pickup, delete_bounce, destructive, drag, end_game, newtonian_gravity, spring,
    velocity_damp, vortex, CollisionForce, CollisionHandler, ForceGenerator,
    MIN_ATTRACTION_DISTANCE,
};

pub mod scene;
pub use scene::{BodyKey, BodySet, Scene};
