use crate::math::{self as m, Vec2};

use std::any::Any;

/// Mass of a body, which can be infinite.
///
/// This stores both a mass value and its inverse, because calculating inverse mass
/// is expensive and needed a lot in physics calculations.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde-types", derive(serde::Serialize, serde::Deserialize))]
pub enum Mass {
    Finite { mass: f64, inverse: f64 },
    Infinite,
}

impl From<f64> for Mass {
    #[inline]
    fn from(mass: f64) -> Self {
        if mass.is_finite() {
            Mass::Finite {
                mass,
                inverse: 1.0 / mass,
            }
        } else {
            Mass::Infinite
        }
    }
}

impl Mass {
    /// Get the inverse of the mass, which is zero if the mass is infinite.
    ///
    /// Infinite-mass bodies respond to neither forces nor impulses
    /// because everything they feel is scaled by this.
    #[inline]
    pub fn inv(&self) -> f64 {
        match self {
            Mass::Finite { inverse, .. } => *inverse,
            Mass::Infinite => 0.0,
        }
    }

    /// Get the mass value, or `f64::INFINITY` for an infinite mass.
    #[inline]
    pub fn get(&self) -> f64 {
        match self {
            Mass::Finite { mass, .. } => *mass,
            Mass::Infinite => f64::INFINITY,
        }
    }

    #[inline]
    pub fn is_infinite(&self) -> bool {
        matches!(self, Mass::Infinite)
    }
}

/// An RGB tag carried by each body for the renderer's benefit.
/// The physics core never reads it.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde-types", derive(serde::Serialize, serde::Deserialize))]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Self = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
    };
    pub const BLACK: Self = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Color { r, g, b }
    }
}

/// A rigid body: a convex polygon with mass and kinematic state.
///
/// Forces and impulses accumulate between ticks and are consumed by
/// [`tick`][Self::tick]. A body lives inside exactly one
/// [`Scene`][crate::Scene], which owns its storage and prunes it
/// once it has been marked removed.
pub struct Body {
    shape: Vec<Vec2>,
    mass: Mass,
    color: Color,
    texture: Option<String>,
    centroid: Vec2,
    velocity: Vec2,
    angle: f64,
    force: Vec2,
    impulse: Vec2,
    removed: bool,
    counter: u32,
    payload: Option<Box<dyn Any>>,
}

impl Body {
    /// Create a body from a convex polygon.
    ///
    /// The centroid is computed once here and kept in sync with the shape
    /// from then on.
    ///
    /// # Panics
    /// If the polygon has fewer than three vertices.
    pub fn new(shape: Vec<Vec2>, mass: impl Into<Mass>, color: Color) -> Self {
        assert!(shape.len() >= 3, "a body needs at least three vertices");
        let centroid = m::polygon_centroid(&shape);
        Body {
            shape,
            mass: mass.into(),
            color,
            texture: None,
            centroid,
            velocity: Vec2::zero(),
            angle: 0.0,
            force: Vec2::zero(),
            impulse: Vec2::zero(),
            removed: false,
            counter: 0,
            payload: None,
        }
    }

    /// Attach owner-supplied metadata in a builder-like chain.
    /// The core never inspects it; it is dropped with the body.
    pub fn with_payload(mut self, payload: impl Any) -> Self {
        self.payload = Some(Box::new(payload));
        self
    }

    /// Attach a texture tag in a builder-like chain.
    pub fn with_texture(mut self, texture: impl Into<String>) -> Self {
        self.texture = Some(texture.into());
        self
    }

    // accessors

    /// The current vertices of the body's polygon.
    ///
    /// This is a read-only view; the shape can only change through
    /// [`set_centroid`][Self::set_centroid] and
    /// [`set_rotation`][Self::set_rotation].
    #[inline]
    pub fn shape(&self) -> &[Vec2] {
        &self.shape
    }

    #[inline]
    pub fn centroid(&self) -> Vec2 {
        self.centroid
    }

    #[inline]
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    #[inline]
    pub fn mass(&self) -> Mass {
        self.mass
    }

    #[inline]
    pub fn rotation(&self) -> f64 {
        self.angle
    }

    #[inline]
    pub fn color(&self) -> Color {
        self.color
    }

    #[inline]
    pub fn texture(&self) -> Option<&str> {
        self.texture.as_deref()
    }

    #[inline]
    pub fn counter(&self) -> u32 {
        self.counter
    }

    /// Access the owner-supplied payload, if any.
    #[inline]
    pub fn payload(&self) -> Option<&dyn Any> {
        self.payload.as_deref()
    }

    #[inline]
    pub fn is_removed(&self) -> bool {
        self.removed
    }

    // mutators

    /// Move the body so that its centroid lands on the given point,
    /// rigidly translating every vertex of the shape with it.
    pub fn set_centroid(&mut self, centroid: Vec2) {
        m::polygon_translate(&mut self.shape, centroid - self.centroid);
        self.centroid = centroid;
    }

    #[inline]
    pub fn set_velocity(&mut self, velocity: Vec2) {
        self.velocity = velocity;
    }

    /// Set the body's visual orientation, rotating the shape about the
    /// centroid by the difference from the current angle.
    ///
    /// Orientation is not advanced by integration; this is the only way
    /// it changes.
    pub fn set_rotation(&mut self, angle: f64) {
        m::polygon_rotate(&mut self.shape, angle - self.angle, self.centroid);
        self.angle = angle;
    }

    #[inline]
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    #[inline]
    pub fn set_texture(&mut self, texture: impl Into<String>) {
        self.texture = Some(texture.into());
    }

    /// Accumulate a continuous force for the next integration step.
    #[inline]
    pub fn add_force(&mut self, force: Vec2) {
        self.force += force;
    }

    /// Accumulate an instantaneous impulse for the next integration step.
    /// Unlike forces, impulses are not scaled by the timestep.
    #[inline]
    pub fn add_impulse(&mut self, impulse: Vec2) {
        self.impulse += impulse;
    }

    #[inline]
    pub fn increment_counter(&mut self) {
        self.counter += 1;
    }

    /// Mark the body for removal at the end of the current scene tick.
    /// Idempotent; a removed body never comes back.
    #[inline]
    pub fn remove(&mut self) {
        self.removed = true;
    }

    /// Advance the body's kinematics by `dt`, consuming the accumulated
    /// force and impulse.
    ///
    /// The position update is trapezoidal: the centroid moves by the
    /// average of the old and new velocity over the step.
    pub fn tick(&mut self, dt: f64) {
        let inv_mass = self.mass.inv();
        let acceleration = self.force * inv_mass;
        let new_velocity = self.velocity + acceleration * dt + self.impulse * inv_mass;
        let average_velocity = (self.velocity + new_velocity) * 0.5;
        self.set_centroid(self.centroid + average_velocity * dt);
        self.velocity = new_velocity;
        self.force = Vec2::zero();
        self.impulse = Vec2::zero();
    }
}
