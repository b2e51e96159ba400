use super::{Aabb, Capsule, Intersection, Obb, Overlap, Sphere, Sweep};
use crate::math::{self as m, Vec3};

/// Directions this close to perpendicular to a box face count as parallel to it.
const FACE_TOLERANCE: f64 = 1e-9;

/// Any of the shapes that can be both overlap tested and swept.
///
/// Capsules only support overlap tests and aren't included here;
/// test them against a `Shape` with [`Overlap`][super::Overlap] directly.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shape {
    Sphere(Sphere),
    Aabb(Aabb),
    Obb(Obb),
}

impl From<Sphere> for Shape {
    fn from(s: Sphere) -> Self {
        Shape::Sphere(s)
    }
}

impl From<Aabb> for Shape {
    fn from(b: Aabb) -> Self {
        Shape::Aabb(b)
    }
}

impl From<Obb> for Shape {
    fn from(b: Obb) -> Self {
        Shape::Obb(b)
    }
}

impl Shape {
    #[inline]
    pub fn center(&self) -> Vec3 {
        match self {
            Shape::Sphere(s) => s.center,
            Shape::Aabb(b) => b.center,
            Shape::Obb(b) => b.center,
        }
    }

    /// The same shape moved by `offset`.
    pub fn translated(&self, offset: Vec3) -> Self {
        match *self {
            Shape::Sphere(s) => Shape::Sphere(Sphere {
                center: s.center + offset,
                ..s
            }),
            Shape::Aabb(b) => Shape::Aabb(Aabb {
                center: b.center + offset,
                ..b
            }),
            Shape::Obb(b) => Shape::Obb(Obb {
                center: b.center + offset,
                ..b
            }),
        }
    }

    /// The shape expanded outward by `amount` in every direction.
    ///
    /// Boxes stay boxes, so their corners grow by more than `amount`.
    /// Negative amounts shrink the shape, stopping at zero size.
    pub fn grown(&self, amount: f64) -> Self {
        let grow_extents = |e: Vec3| {
            Vec3::new(
                (e.x + amount).max(0.0),
                (e.y + amount).max(0.0),
                (e.z + amount).max(0.0),
            )
        };
        match *self {
            Shape::Sphere(s) => Shape::Sphere(Sphere {
                radius: (s.radius + amount).max(0.0),
                ..s
            }),
            Shape::Aabb(b) => Shape::Aabb(Aabb {
                extents: grow_extents(b.extents),
                ..b
            }),
            Shape::Obb(b) => Shape::Obb(Obb {
                extents: grow_extents(b.extents),
                ..b
            }),
        }
    }

    /// The point of the shape farthest along `direction`.
    ///
    /// Where several points are equally far (e.g. a box face perpendicular
    /// to the direction), the one in the middle is chosen.
    /// A zero direction gives the center.
    pub fn farthest_point(&self, direction: Vec3) -> Vec3 {
        match self {
            Shape::Sphere(s) => match m::Unit::try_new_normalize(direction) {
                Some(dir) => s.center + *dir * s.radius,
                None => s.center,
            },
            Shape::Aabb(b) => {
                let signs = Vec3::new(
                    m::sign(direction.x),
                    m::sign(direction.y),
                    m::sign(direction.z),
                );
                b.center + m::mul_elem(signs, b.extents)
            }
            Shape::Obb(b) => b
                .axes()
                .iter()
                .enumerate()
                .fold(b.center, |p, (i, axis)| {
                    let side = m::sign_beyond(axis.dot(direction), FACE_TOLERANCE);
                    p + *axis * (side * b.extents[i])
                }),
        }
    }
}

impl Overlap for Shape {
    fn overlaps(&self, other: &Shape) -> bool {
        match (self, other) {
            (Shape::Sphere(a), Shape::Sphere(b)) => a.overlaps(b),
            (Shape::Sphere(a), Shape::Aabb(b)) => a.overlaps(b),
            (Shape::Sphere(a), Shape::Obb(b)) => a.overlaps(b),
            (Shape::Aabb(a), Shape::Sphere(b)) => a.overlaps(b),
            (Shape::Aabb(a), Shape::Aabb(b)) => a.overlaps(b),
            (Shape::Aabb(a), Shape::Obb(b)) => a.overlaps(b),
            (Shape::Obb(a), Shape::Sphere(b)) => a.overlaps(b),
            (Shape::Obb(a), Shape::Aabb(b)) => a.overlaps(b),
            (Shape::Obb(a), Shape::Obb(b)) => a.overlaps(b),
        }
    }
}

impl Overlap<Capsule> for Shape {
    fn overlaps(&self, capsule: &Capsule) -> bool {
        match self {
            Shape::Sphere(s) => s.overlaps(capsule),
            Shape::Aabb(b) => b.overlaps(capsule),
            Shape::Obb(b) => b.overlaps(capsule),
        }
    }
}

impl Overlap<Shape> for Capsule {
    fn overlaps(&self, shape: &Shape) -> bool {
        shape.overlaps(self)
    }
}

impl Sweep for Shape {
    fn sweep(&self, moving: &Shape, movement: Vec3) -> Option<Intersection> {
        match (self, moving) {
            (Shape::Sphere(a), Shape::Sphere(b)) => a.sweep(b, movement),
            (Shape::Sphere(a), Shape::Aabb(b)) => a.sweep(b, movement),
            (Shape::Sphere(a), Shape::Obb(b)) => a.sweep(b, movement),
            (Shape::Aabb(a), Shape::Sphere(b)) => a.sweep(b, movement),
            (Shape::Aabb(a), Shape::Aabb(b)) => a.sweep(b, movement),
            (Shape::Aabb(a), Shape::Obb(b)) => a.sweep(b, movement),
            (Shape::Obb(a), Shape::Sphere(b)) => a.sweep(b, movement),
            (Shape::Obb(a), Shape::Aabb(b)) => a.sweep(b, movement),
            (Shape::Obb(a), Shape::Obb(b)) => a.sweep(b, movement),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_vec_eq(a: Vec3, b: Vec3) {
        assert!((a - b).mag() < 1e-9, "{:?} != {:?}", a, b);
    }

    fn all_kinds(center: Vec3) -> [Shape; 3] {
        [
            Sphere::new(center, 1.0).into(),
            Aabb::new(center, Vec3::one()).into(),
            Obb::new(
                center,
                m::rotor_from_scaled_axis(Vec3::new(0.0, 0.7, 0.0)),
                Vec3::one(),
            )
            .into(),
        ]
    }

    #[test]
    fn dispatch_covers_every_pair() {
        let movement = Vec3::new(-10.0, 0.0, 0.0);
        for a in all_kinds(Vec3::zero()) {
            for b in all_kinds(Vec3::new(5.0, 0.0, 0.0)) {
                assert!(!a.overlaps(&b));
                let hit = a.sweep(&b, movement).expect("head-on sweeps should hit");
                assert!(
                    hit.t > 0.0 && hit.t < 0.5,
                    "{:?} vs {:?}: t = {}",
                    a,
                    b,
                    hit.t
                );
                assert!(hit.normal.x > 0.0);

                let moved = b.translated(movement * hit.t);
                assert!(a.grown(1e-6).overlaps(&moved));
            }
        }
    }

    #[test]
    fn farthest_points() {
        let [sphere, aabb, obb] = all_kinds(Vec3::zero());
        let down = Vec3::new(0.0, -3.0, 0.0);
        assert_vec_eq(sphere.farthest_point(down), -Vec3::unit_y());
        let corner = aabb.farthest_point(Vec3::new(1.0, -2.0, 0.5));
        assert_vec_eq(corner, Vec3::new(1.0, -1.0, 1.0));
        // face perpendicular to the direction gives its middle
        assert_vec_eq(aabb.farthest_point(Vec3::unit_x()), Vec3::unit_x());
        assert_vec_eq(obb.farthest_point(Vec3::unit_y()), Vec3::unit_y());
        assert_vec_eq(sphere.farthest_point(Vec3::zero()), Vec3::zero());
    }

    #[test]
    fn growing_and_shrinking() {
        let grown = Shape::from(Sphere::new(Vec3::zero(), 1.0)).grown(0.5);
        assert_eq!(grown, Shape::Sphere(Sphere::new(Vec3::zero(), 1.5)));
        let flat = Aabb::new(Vec3::zero(), Vec3::new(1.0, 0.2, 1.0));
        let shrunk = Shape::from(flat).grown(-0.5);
        assert_eq!(
            shrunk,
            Shape::Aabb(Aabb::new(Vec3::zero(), Vec3::new(0.5, 0.0, 0.5)))
        );
    }

    #[test]
    fn capsule_against_shape() {
        let cap = Capsule::new(Vec3::new(0.0, -3.0, 0.0), Vec3::new(0.0, 3.0, 0.0), 0.5);
        for s in all_kinds(Vec3::new(1.4, 0.0, 0.0)) {
            assert!(s.overlaps(&cap));
            assert!(cap.overlaps(&s));
        }
        for s in all_kinds(Vec3::new(2.0, 0.0, 0.0)) {
            assert!(!s.overlaps(&cap));
        }
    }
}
