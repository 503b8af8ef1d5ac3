//! Types, aliases and helper operations for doing math with `ultraviolet`.

pub use ultraviolet as uv;

pub type Vec2 = uv::DVec2;
pub type Rotor2 = uv::DRotor2;

/// A wrapper type to indicate a vector should always be normalized.
#[derive(Clone, Copy, Debug)]
pub struct Unit<T>(T);

impl Unit<Vec2> {
    pub fn new_normalize(v: Vec2) -> Self {
        Unit(v.normalized())
    }

    pub const fn new_unchecked(v: Vec2) -> Self {
        Unit(v)
    }

    pub fn unit_x() -> Self {
        Unit(Vec2::unit_x())
    }

    pub fn unit_y() -> Self {
        Unit(Vec2::unit_y())
    }
}

impl std::ops::Mul<Unit<Vec2>> for Rotor2 {
    type Output = Unit<Vec2>;

    fn mul(self, rhs: Unit<Vec2>) -> Self::Output {
        Unit(self * rhs.0)
    }
}

impl<T> std::ops::Deref for Unit<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> std::ops::Neg for Unit<T>
where
    T: std::ops::Neg,
{
    type Output = Unit<<T as std::ops::Neg>::Output>;

    fn neg(self) -> Self::Output {
        Unit(-self.0)
    }
}

// Vec2 utils

#[inline]
pub fn left_normal(v: Vec2) -> Vec2 {
    Vec2::new(-v.y, v.x)
}
#[inline]
pub fn right_normal(v: Vec2) -> Vec2 {
    Vec2::new(v.y, -v.x)
}

// polygon utils
//
// Polygons are plain vertex slices with consistent winding.
// Convexity is assumed, not checked.

/// Compute the area centroid of a polygon with the shoelace formula.
///
/// # Panics
/// If the polygon has fewer than three vertices.
pub fn polygon_centroid(poly: &[Vec2]) -> Vec2 {
    use itertools::Itertools;
    assert!(poly.len() >= 3, "a polygon needs at least three vertices");

    let mut signed_area = 0.0;
    let mut weighted_sum = Vec2::zero();
    for (p0, p1) in poly.iter().circular_tuple_windows() {
        let cross = p0.x * p1.y - p1.x * p0.y;
        signed_area += cross;
        weighted_sum += (*p0 + *p1) * cross;
    }
    weighted_sum / (3.0 * signed_area)
}

/// Rigidly translate every vertex of a polygon.
#[inline]
pub fn polygon_translate(poly: &mut [Vec2], delta: Vec2) {
    for p in poly {
        *p += delta;
    }
}

/// Rotate every vertex of a polygon about a pivot point.
pub fn polygon_rotate(poly: &mut [Vec2], angle: f64, pivot: Vec2) {
    let rotor = Rotor2::from_angle(angle);
    for p in poly {
        *p = pivot + rotor * (*p - pivot);
    }
}
