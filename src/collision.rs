//! Separating axis test for convex polygons.
//!
//! Every edge normal of both polygons is a candidate separating axis;
//! if the vertex projections onto any axis don't overlap, the polygons
//! are disjoint. Correctness depends on the inputs being convex, which
//! is assumed and not checked.

use crate::math::{right_normal, Unit, Vec2};

use itertools::Itertools;

/// An intersection between two convex polygons.
#[derive(Clone, Copy, Debug)]
pub struct Contact {
    /// The axis of minimum overlap, unit length.
    ///
    /// Doubles as the resolution normal for impulse-based collision
    /// responses: its direction is consistent with which side of the
    /// projection interval overlaps least.
    pub normal: Unit<Vec2>,
    /// The amount of overlap along `normal`.
    pub depth: f64,
}

/// Check two convex polygons for intersection.
///
/// Returns `None` as soon as any separating axis is found, otherwise
/// the axis of minimum overlap.
///
/// # Panics
/// If either polygon has fewer than three vertices. Zero-length edges
/// make the normal undefined and are the caller's responsibility to
/// avoid.
pub fn intersection_check(poly1: &[Vec2], poly2: &[Vec2]) -> Option<Contact> {
    assert!(
        poly1.len() >= 3 && poly2.len() >= 3,
        "a polygon needs at least three vertices"
    );

    let mut min_overlap = f64::INFINITY;
    let mut min_axis = Vec2::zero();

    let edges = poly1
        .iter()
        .circular_tuple_windows()
        .chain(poly2.iter().circular_tuple_windows());
    for (start, end) in edges {
        let axis = right_normal(*end - *start);

        let (min1, max1) = project(poly1, axis);
        let (min2, max2) = project(poly2, axis);

        if max1 < min2 || max2 < min1 {
            // separating axis found, no other axis needs checking
            return None;
        }

        let overlap = if max1 >= max2 { max2 - min1 } else { max1 - min2 };
        if overlap < min_overlap {
            min_overlap = overlap;
            min_axis = axis;
        }
    }

    Some(Contact {
        normal: Unit::new_normalize(min_axis),
        depth: min_overlap / min_axis.mag(),
    })
}

/// Project every vertex of a polygon onto an axis,
/// returning the extent of the projection interval.
fn project(poly: &[Vec2], axis: Vec2) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for p in poly {
        let proj = p.dot(axis);
        min = min.min(proj);
        max = max.max(proj);
    }
    (min, max)
}
