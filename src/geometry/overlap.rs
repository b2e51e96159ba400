use super::shapes::{Aabb, Capsule, Obb, Segment, Sphere};
use super::sphere_box::{self, BoxFrame};
use crate::math::{self as m, Vec3};

use itertools::iproduct;

/// Static intersection test. Shapes that exactly touch count as overlapping.
///
/// Implemented for every ordered pair of shapes,
/// with `a.overlaps(&b) == b.overlaps(&a)` for all of them.
pub trait Overlap<Rhs = Self> {
    fn overlaps(&self, other: &Rhs) -> bool;
}

/// Mirrored pairs delegate to the other order so that the test is symmetric by construction.
macro_rules! mirror_overlap {
    ($a:ty, $b:ty) => {
        impl Overlap<$b> for $a {
            #[inline]
            fn overlaps(&self, other: &$b) -> bool {
                other.overlaps(self)
            }
        }
    };
}

//
// SPHERE <-> SPHERE
//

impl Overlap for Sphere {
    fn overlaps(&self, other: &Sphere) -> bool {
        let dist_sq = (other.center - self.center).mag_sq();
        dist_sq <= m::sqr(self.radius + other.radius)
    }
}

//
// BOX <-> SPHERE
//

impl Overlap<Sphere> for Aabb {
    fn overlaps(&self, sphere: &Sphere) -> bool {
        sphere_box::overlap(&BoxFrame::from(self), sphere)
    }
}
mirror_overlap!(Sphere, Aabb);

impl Overlap<Sphere> for Obb {
    fn overlaps(&self, sphere: &Sphere) -> bool {
        sphere_box::overlap(&BoxFrame::from(self), sphere)
    }
}
mirror_overlap!(Sphere, Obb);

//
// BOX <-> BOX
//

impl Overlap for Aabb {
    fn overlaps(&self, other: &Aabb) -> bool {
        let offset = other.center - self.center;
        let reach = self.extents + other.extents;
        (0..3).all(|a| offset[a].abs() <= reach[a])
    }
}

impl Overlap for Obb {
    fn overlaps(&self, other: &Obb) -> bool {
        least_penetration(self, other).is_some()
    }
}

impl Overlap<Obb> for Aabb {
    fn overlaps(&self, other: &Obb) -> bool {
        self.to_obb().overlaps(other)
    }
}
mirror_overlap!(Obb, Aabb);

/// One of the fifteen candidate separating axes between two boxes A and B.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum BoxAxis {
    /// Face normal `i` of box A.
    FaceA(usize),
    /// Face normal `j` of box B.
    FaceB(usize),
    /// Cross product of edge direction `i` of A and `j` of B.
    Edge(usize, usize),
}

/// Cross product axes shorter than this come from (nearly) parallel edges
/// and can't separate anything the face axes don't, so they're skipped.
pub(super) const MIN_AXIS_MAG_SQ: f64 = 1e-10;

/// The separating axis candidates for two boxes with the given local axes.
/// Edge axes are not normalized.
pub(super) fn candidate_axes<'a>(
    axes_a: &'a [Vec3; 3],
    axes_b: &'a [Vec3; 3],
) -> impl Iterator<Item = (BoxAxis, Vec3)> + 'a {
    let faces_a = (0..3).map(move |i| (BoxAxis::FaceA(i), axes_a[i]));
    let faces_b = (0..3).map(move |j| (BoxAxis::FaceB(j), axes_b[j]));
    let edges = iproduct!(0..3, 0..3)
        .map(move |(i, j)| {
            (BoxAxis::Edge(i, j), axes_a[i].cross(axes_b[j]))
        })
        .filter(|(_, axis)| axis.mag_sq() > MIN_AXIS_MAG_SQ);
    faces_a.chain(faces_b).chain(edges)
}

/// The candidate axis along which two boxes penetrate the least,
/// with the penetration depth, or None if they're separated.
pub(super) fn least_penetration(a: &Obb, b: &Obb) -> Option<(BoxAxis, Vec3, f64)> {
    let (axes_a, axes_b) = (a.axes(), b.axes());
    let offset = b.center - a.center;

    let mut best: Option<(BoxAxis, Vec3, f64)> = None;
    for (kind, axis) in candidate_axes(&axes_a, &axes_b) {
        let reach = a.projected_radius(&axes_a, axis) + b.projected_radius(&axes_b, axis);
        let dist = offset.dot(axis).abs();
        if dist > reach {
            return None;
        }
        let depth = (reach - dist) / axis.mag();
        if best.map_or(true, |(_, _, best_depth)| depth < best_depth) {
            best = Some((kind, axis, depth));
        }
    }
    best
}

//
// CAPSULE <-> X
//

/// Number of golden-section steps used to find the point on a capsule's
/// segment closest to a box. Shrinks the search interval below 1e-9.
const CAPSULE_SEARCH_ITERATIONS: usize = 44;

/// Minimum of a convex function on [0, 1] by golden-section search.
/// Returns the argument and value at the minimum.
fn convex_min_on_unit_interval(f: impl Fn(f64) -> f64) -> (f64, f64) {
    const INV_PHI: f64 = 0.618_033_988_749_895;

    let (mut lo, mut hi) = (0.0, 1.0);
    let mut x1 = hi - INV_PHI * (hi - lo);
    let mut x2 = lo + INV_PHI * (hi - lo);
    let (mut f1, mut f2) = (f(x1), f(x2));
    for _ in 0..CAPSULE_SEARCH_ITERATIONS {
        if f1 <= f2 {
            hi = x2;
            x2 = x1;
            f2 = f1;
            x1 = hi - INV_PHI * (hi - lo);
            f1 = f(x1);
        } else {
            lo = x1;
            x1 = x2;
            f1 = f2;
            x2 = lo + INV_PHI * (hi - lo);
            f2 = f(x2);
        }
    }

    // the search never evaluates the endpoints themselves
    let mid = 0.5 * (lo + hi);
    [0.0, mid, 1.0]
        .into_iter()
        .map(|x| (x, f(x)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .unwrap_or((mid, f64::INFINITY))
}

fn capsule_box_overlap(capsule: &Capsule, frame: &BoxFrame) -> bool {
    let seg = capsule.segment;
    let (_, dist_sq) = convex_min_on_unit_interval(|t| frame.dist_sq_to_point(seg.at(t)));
    dist_sq <= m::sqr(capsule.radius)
}

impl Capsule {
    /// The sphere on this capsule closest to a point.
    #[inline]
    fn sphere_closest_to(&self, p: Vec3) -> Sphere {
        self.sphere_at(self.segment.closest_param(p))
    }
}

impl Overlap<Sphere> for Capsule {
    fn overlaps(&self, sphere: &Sphere) -> bool {
        self.sphere_closest_to(sphere.center).overlaps(sphere)
    }
}
mirror_overlap!(Sphere, Capsule);

impl Overlap<Aabb> for Capsule {
    fn overlaps(&self, other: &Aabb) -> bool {
        capsule_box_overlap(self, &BoxFrame::from(other))
    }
}
mirror_overlap!(Aabb, Capsule);

impl Overlap<Obb> for Capsule {
    fn overlaps(&self, other: &Obb) -> bool {
        capsule_box_overlap(self, &BoxFrame::from(other))
    }
}
mirror_overlap!(Obb, Capsule);

impl Overlap for Capsule {
    fn overlaps(&self, other: &Capsule) -> bool {
        let (s, t) = self.segment.closest_params(&other.segment);
        let dist_sq = (other.segment.at(t) - self.segment.at(s)).mag_sq();
        dist_sq <= m::sqr(self.radius + other.radius)
    }
}

/// Closest points between two segments.
#[inline]
pub(super) fn segment_closest_points(s1: &Segment, s2: &Segment) -> (Vec3, Vec3) {
    let (s, t) = s1.closest_params(s2);
    (s1.at(s), s2.at(t))
}
