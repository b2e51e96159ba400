use crate::math::{self as m, Unit, Vec3};

/// A line segment between two points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub a: Vec3,
    pub b: Vec3,
}

impl Segment {
    #[inline]
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self { a, b }
    }

    #[inline]
    pub fn dir(&self) -> Vec3 {
        self.b - self.a
    }

    /// Point at parameter `t`, where 0 is `a` and 1 is `b`.
    #[inline]
    pub fn at(&self, t: f64) -> Vec3 {
        self.a + self.dir() * t
    }

    /// Parameter of the point on the segment closest to `p`.
    ///
    /// A degenerate segment (a == b) always returns 0.
    pub fn closest_param(&self, p: Vec3) -> f64 {
        let dir = self.dir();
        let len_sq = dir.mag_sq();
        if len_sq == 0.0 {
            return 0.0;
        }
        ((p - self.a).dot(dir) / len_sq).clamp(0.0, 1.0)
    }

    /// Parameters `(s, t)` of the closest points between this segment and another,
    /// such that `self.at(s)` and `other.at(t)` are as close as possible.
    ///
    /// Parallel segments pick the closest pair starting from `self.a`.
    pub fn closest_params(&self, other: &Segment) -> (f64, f64) {
        let d1 = self.dir();
        let d2 = other.dir();
        let r = self.a - other.a;
        let a = d1.mag_sq();
        let e = d2.mag_sq();
        let f = d2.dot(r);

        match (a == 0.0, e == 0.0) {
            (true, true) => return (0.0, 0.0),
            (true, false) => return (0.0, (f / e).clamp(0.0, 1.0)),
            (false, true) => return ((-d1.dot(r) / a).clamp(0.0, 1.0), 0.0),
            (false, false) => {}
        }

        let b = d1.dot(d2);
        let c = d1.dot(r);
        let denom = a * e - b * b;
        let mut s = if denom > f64::EPSILON * a * e {
            ((b * f - c * e) / denom).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let mut t = (b * s + f) / e;
        if t < 0.0 {
            t = 0.0;
            s = (-c / a).clamp(0.0, 1.0);
        } else if t > 1.0 {
            t = 1.0;
            s = ((b - c) / a).clamp(0.0, 1.0);
        }
        (s, t)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f64,
}

impl Sphere {
    #[inline]
    pub fn new(center: Vec3, radius: f64) -> Self {
        debug_assert!(radius >= 0.0, "negative sphere radius {}", radius);
        Self { center, radius }
    }
}

/// A segment swept by a sphere.
///
/// Only static overlap tests are supported for capsules.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Capsule {
    pub segment: Segment,
    pub radius: f64,
}

impl Capsule {
    #[inline]
    pub fn new(a: Vec3, b: Vec3, radius: f64) -> Self {
        debug_assert!(radius >= 0.0, "negative capsule radius {}", radius);
        Self {
            segment: Segment::new(a, b),
            radius,
        }
    }

    /// The sphere at parameter `t` along the capsule's segment.
    #[inline]
    pub fn sphere_at(&self, t: f64) -> Sphere {
        Sphere {
            center: self.segment.at(t),
            radius: self.radius,
        }
    }
}

/// An axis-aligned box. Extents are half the side lengths.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub center: Vec3,
    pub extents: Vec3,
}

impl Aabb {
    #[inline]
    pub fn new(center: Vec3, extents: Vec3) -> Self {
        debug_assert!(
            extents.x >= 0.0 && extents.y >= 0.0 && extents.z >= 0.0,
            "negative box extents {:?}",
            extents
        );
        Self { center, extents }
    }

    #[inline]
    pub fn min(&self) -> Vec3 {
        self.center - self.extents
    }

    #[inline]
    pub fn max(&self) -> Vec3 {
        self.center + self.extents
    }

    /// Squared distance from a point to the closest point in the box.
    /// Zero if the point is inside.
    pub fn dist_sq_to_point(&self, p: Vec3) -> f64 {
        let (mins, maxs) = (self.min(), self.max());
        let mut dist_sq = 0.0;
        for a in 0..3 {
            if p[a] < mins[a] {
                dist_sq += m::sqr(p[a] - mins[a]);
            } else if p[a] > maxs[a] {
                dist_sq += m::sqr(p[a] - maxs[a]);
            }
        }
        dist_sq
    }

    /// The same box as an Obb with identity rotation.
    #[inline]
    pub fn to_obb(&self) -> Obb {
        Obb {
            center: self.center,
            rotation: m::Rotor3::identity(),
            extents: self.extents,
        }
    }
}

/// A box with an arbitrary orientation. Extents are half the side lengths
/// along the box's local axes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Obb {
    pub center: Vec3,
    pub rotation: m::Rotor3,
    pub extents: Vec3,
}

impl Obb {
    #[inline]
    pub fn new(center: Vec3, rotation: m::Rotor3, extents: Vec3) -> Self {
        debug_assert!(
            extents.x >= 0.0 && extents.y >= 0.0 && extents.z >= 0.0,
            "negative box extents {:?}",
            extents
        );
        Self {
            center,
            rotation,
            extents,
        }
    }

    /// World-space directions of the box's local axes.
    #[inline]
    pub fn axes(&self) -> [Vec3; 3] {
        m::rotated_axes(self.rotation)
    }

    /// Half the length of the box's projection onto `axis`, scaled by `axis`'s length.
    #[inline]
    pub fn projected_radius(&self, axes: &[Vec3; 3], axis: Vec3) -> f64 {
        (0..3)
            .map(|i| self.extents[i] * axes[i].dot(axis).abs())
            .sum()
    }
}

/// The result of a swept intersection query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Intersection {
    /// Point of first contact, in world space, at the time of impact.
    pub contact: Vec3,
    /// Normal of the static shape's surface at the contact, pointing outward
    /// towards the moving shape.
    pub normal: Unit<Vec3>,
    /// Fraction of the movement vector at which contact happens, in [0, 1].
    /// Zero if the shapes already touch at the start.
    pub t: f64,
}

impl Intersection {
    /// Swap the roles of the two shapes, negating the normal.
    ///
    /// Used when the query was solved with the moving and static shapes exchanged.
    /// `movement` is the movement of the shape that moves in the caller's query;
    /// the contact point, computed on the shape that was treated as static,
    /// is carried along with it to the time of impact.
    #[inline]
    pub(crate) fn swapped(self, movement: Vec3) -> Self {
        Self {
            contact: self.contact + movement * self.t,
            normal: -self.normal,
            t: self.t,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_closest_param_is_clamped() {
        let s = Segment::new(Vec3::zero(), Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(s.closest_param(Vec3::new(1.0, 5.0, 0.0)), 0.5);
        assert_eq!(s.closest_param(Vec3::new(-3.0, 0.0, 0.0)), 0.0);
        assert_eq!(s.closest_param(Vec3::new(9.0, 1.0, 1.0)), 1.0);

        let degenerate = Segment::new(Vec3::one(), Vec3::one());
        assert_eq!(degenerate.closest_param(Vec3::zero()), 0.0);
    }

    #[test]
    fn segment_segment_closest_points() {
        let s1 = Segment::new(Vec3::new(-1.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        let s2 = Segment::new(Vec3::new(0.0, -1.0, 2.0), Vec3::new(0.0, 1.0, 2.0));
        let (s, t) = s1.closest_params(&s2);
        assert!((s - 0.5).abs() < 1e-12 && (t - 0.5).abs() < 1e-12);

        // closest points past the end get clamped
        let s3 = Segment::new(Vec3::new(3.0, -1.0, 0.0), Vec3::new(3.0, 1.0, 0.0));
        let (s, t) = s1.closest_params(&s3);
        assert_eq!(s, 1.0);
        assert!((t - 0.5).abs() < 1e-12);

        // parallel
        let s4 = Segment::new(Vec3::new(0.0, 1.0, 0.0), Vec3::new(4.0, 1.0, 0.0));
        let (s, t) = s1.closest_params(&s4);
        let dist = (s1.at(s) - s4.at(t)).mag();
        assert!((dist - 1.0).abs() < 1e-12);
    }

    #[test]
    fn aabb_point_distance() {
        let b = Aabb::new(Vec3::zero(), Vec3::one());
        assert_eq!(b.dist_sq_to_point(Vec3::new(0.5, -0.5, 0.9)), 0.0);
        assert_eq!(b.dist_sq_to_point(Vec3::new(3.0, 0.0, 0.0)), 4.0);
        assert_eq!(b.dist_sq_to_point(Vec3::new(2.0, 2.0, 0.0)), 2.0);
    }
}
