//! Sphere against box, both static and swept.
//!
//! The sweep is solved against the box grown by the sphere's radius
//! (a box with rounded edges and corners) with the sphere reduced to its center point.
//! The rounded box is never built explicitly. Instead the sphere center is reflected
//! into the positive octant of the box's local frame and its offset from the positive
//! corner is classified into a region. The region decides which faces, rounded edges
//! and rounded vertices can be met first, and each of those is solved in closed form.

use super::shapes::{Aabb, Intersection, Obb, Sphere};
use crate::math::{self as m, Rotor3, Unit, Vec3};

use itertools::iproduct;

/// Slack allowed when checking whether a hit point lies on the part of the
/// rounded surface belonging to the feature that was hit.
const FEATURE_EPSILON: f64 = 1e-9;

const SIGNS: [f64; 2] = [1.0, -1.0];

/// A box's local frame.
#[derive(Clone, Copy, Debug)]
pub(super) struct BoxFrame {
    center: Vec3,
    rotation: Rotor3,
    extents: Vec3,
}

impl From<&Aabb> for BoxFrame {
    fn from(b: &Aabb) -> Self {
        Self {
            center: b.center,
            rotation: Rotor3::identity(),
            extents: b.extents,
        }
    }
}

impl From<&Obb> for BoxFrame {
    fn from(b: &Obb) -> Self {
        Self {
            center: b.center,
            rotation: b.rotation,
            extents: b.extents,
        }
    }
}

impl BoxFrame {
    #[inline]
    fn point_to_local(&self, p: Vec3) -> Vec3 {
        self.rotation.reversed() * (p - self.center)
    }

    #[inline]
    fn dir_to_local(&self, v: Vec3) -> Vec3 {
        self.rotation.reversed() * v
    }

    #[inline]
    fn point_to_world(&self, p: Vec3) -> Vec3 {
        self.center + self.rotation * p
    }

    /// Squared distance from a world-space point to the box. Zero inside.
    pub fn dist_sq_to_point(&self, p: Vec3) -> f64 {
        let local = self.point_to_local(p);
        let corner_offset = abs(local) - self.extents;
        outside_part(corner_offset).mag_sq()
    }
}

#[inline]
fn abs(v: Vec3) -> Vec3 {
    Vec3::new(v.x.abs(), v.y.abs(), v.z.abs())
}

/// Zero out the components of a corner offset that lie within the box's extents.
#[inline]
fn outside_part(corner_offset: Vec3) -> Vec3 {
    Vec3::new(
        corner_offset.x.max(0.0),
        corner_offset.y.max(0.0),
        corner_offset.z.max(0.0),
    )
}

/// Which part of the box the sphere center is nearest to,
/// in the reflected positive-octant frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Region {
    Inside,
    Face(usize),
    Edge(usize, usize),
    Vertex,
}

impl Region {
    fn classify(corner_offset: Vec3) -> Self {
        let outside: Vec<usize> = (0..3).filter(|&a| corner_offset[a] > 0.0).collect();
        match outside[..] {
            [] => Region::Inside,
            [a] => Region::Face(a),
            [a, b] => Region::Edge(a, b),
            _ => Region::Vertex,
        }
    }

    fn is_outside(self, axis: usize) -> bool {
        match self {
            Region::Inside => false,
            Region::Face(a) => a == axis,
            Region::Edge(a, b) => a == axis || b == axis,
            Region::Vertex => true,
        }
    }

    /// Parts of the rounded box a center in this region can meet first:
    /// the ones on the positive side of at least one axis the center is outside on.
    fn features(self) -> Vec<Feature> {
        let on_outside = |a: usize, side: f64| side > 0.0 && self.is_outside(a);
        let faces = (0..3).filter(|&a| self.is_outside(a)).map(Feature::Face);
        let edges = iproduct!(0..3, SIGNS, SIGNS)
            .filter(|&(axis, s1, s2)| {
                let [a, b] = other_axes(axis);
                on_outside(a, s1) || on_outside(b, s2)
            })
            .map(|(axis, s1, s2)| Feature::Edge(axis, [s1, s2]));
        let vertices = iproduct!(SIGNS, SIGNS, SIGNS)
            .filter(|&(s1, s2, s3)| {
                on_outside(0, s1) || on_outside(1, s2) || on_outside(2, s3)
            })
            .map(|(s1, s2, s3)| Feature::Vertex([s1, s2, s3]));
        faces.chain(edges).chain(vertices).collect()
    }
}

/// A face, rounded edge or rounded vertex of the box grown by the sphere's radius.
///
/// Edges are parallel to an axis and vertices sit at a corner;
/// the signs say which side of the box they lie on along each other axis,
/// in increasing axis order. Only the positive faces appear,
/// since the negative ones are never met first from the positive octant.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Feature {
    Face(usize),
    Edge(usize, [f64; 2]),
    Vertex([f64; 3]),
}

impl Feature {
    /// Squared distance the center lies past the box on the feature's sides.
    /// Unless this exceeds the squared radius, the center is inside every
    /// tangent plane of the feature and can't enter the rounded box through it.
    fn beyond_sq(self, corner_offset: Vec3) -> f64 {
        let beyond = |a: usize, side: f64| {
            if side > 0.0 {
                m::sqr(corner_offset[a].max(0.0))
            } else {
                0.0
            }
        };
        match self {
            Feature::Face(a) => beyond(a, 1.0),
            Feature::Edge(axis, signs) => {
                let [a, b] = other_axes(axis);
                beyond(a, signs[0]) + beyond(b, signs[1])
            }
            Feature::Vertex(signs) => (0..3).map(|a| beyond(a, signs[a])).sum(),
        }
    }
}

/// Sphere and movement in the local frame of a box,
/// reflected so that the sphere center has no negative coordinates.
struct Canonical {
    center: Vec3,
    /// Offset of the center from the box's positive corner.
    corner_offset: Vec3,
    movement: Vec3,
    extents: Vec3,
    radius: f64,
    /// Per-axis sign flips that take local coordinates into this frame and back.
    reflection: Vec3,
}

impl Canonical {
    fn new(frame: &BoxFrame, sphere: &Sphere, movement: Vec3) -> Self {
        let local_center = frame.point_to_local(sphere.center);
        let local_movement = frame.dir_to_local(movement);
        let mut reflection = Vec3::one();
        for a in 0..3 {
            if local_center[a] < 0.0 {
                reflection[a] = -1.0;
            }
        }
        let center = m::mul_elem(local_center, reflection);
        Self {
            center,
            corner_offset: center - frame.extents,
            movement: m::mul_elem(local_movement, reflection),
            extents: frame.extents,
            radius: sphere.radius,
            reflection,
        }
    }

    fn to_world(&self, frame: &BoxFrame, hit: LocalHit) -> Intersection {
        let normal = frame.rotation * m::mul_elem(*hit.normal, self.reflection);
        Intersection {
            contact: frame.point_to_world(m::mul_elem(hit.contact, self.reflection)),
            normal: Unit::new_unchecked(normal),
            t: hit.t,
        }
    }

    /// Result for a sphere that already touches the box.
    fn touching(&self, region: Region) -> LocalHit {
        match region {
            Region::Inside => {
                // push out through the face with the least penetration
                let offset = &self.corner_offset;
                let axis = (0..3)
                    .max_by(|&a, &b| offset[a].total_cmp(&offset[b]))
                    .unwrap_or(0);
                let mut contact = self.center;
                contact[axis] = self.extents[axis];
                LocalHit {
                    t: 0.0,
                    normal: Unit::axis(axis),
                    contact,
                }
            }
            _ => {
                let outside = outside_part(self.corner_offset);
                let normal = Unit::try_new_normalize(outside).unwrap_or_else(|| {
                    let axis = (0..3)
                        .max_by(|&a, &b| outside[a].total_cmp(&outside[b]))
                        .unwrap_or(0);
                    Unit::axis(axis)
                });
                LocalHit {
                    t: 0.0,
                    normal,
                    contact: self.center - outside,
                }
            }
        }
    }

    /// Earliest contact with one of the box's faces grown by the radius.
    ///
    /// Only the three positive faces can be reached first from the positive octant.
    fn face_hit(&self, axis: usize) -> Option<LocalHit> {
        let (offset, mv) = (self.corner_offset[axis], self.movement[axis]);
        if offset <= self.radius || mv >= 0.0 {
            return None;
        }
        let t = (self.radius - offset) / mv;
        if t > 1.0 {
            return None;
        }
        let mut point = self.center + self.movement * t;
        let on_face = (0..3)
            .filter(|&a| a != axis)
            .all(|a| point[a].abs() <= self.extents[a] + FEATURE_EPSILON);
        if !on_face {
            return None;
        }
        point[axis] = self.extents[axis];
        Some(LocalHit {
            t,
            normal: Unit::axis(axis),
            contact: point,
        })
    }

    /// Earliest contact with a rounded edge parallel to `axis`.
    ///
    /// `signs` say which side of the box the edge lies on along the two other axes,
    /// in increasing axis order. Edges on the negative side are mirrored
    /// onto the positive corner by offsetting by twice the extents.
    fn edge_hit(&self, axis: usize, signs: [f64; 2]) -> Option<LocalHit> {
        let others = other_axes(axis);
        let mut edge_point = Vec3::zero();
        for (&a, &s) in others.iter().zip(&signs) {
            if s < 0.0 && self.movement[a] >= 0.0 {
                return None;
            }
            edge_point[a] = s * self.extents[a];
        }
        let mut offset = self.center - edge_point;
        offset[axis] = 0.0;
        let mut movement = self.movement;
        movement[axis] = 0.0;

        let t = entry_time(offset, movement, self.radius)?;
        let point = self.center + self.movement * t;
        let in_region = point[axis].abs() <= self.extents[axis] + FEATURE_EPSILON
            && others
                .iter()
                .zip(&signs)
                .all(|(&a, &s)| s * point[a] >= self.extents[a] - FEATURE_EPSILON);
        if !in_region {
            return None;
        }

        let normal = self.surface_normal(offset + movement * t);
        let mut contact = edge_point;
        contact[axis] = point[axis];
        Some(LocalHit { t, normal, contact })
    }

    /// Earliest contact with a rounded vertex.
    fn vertex_hit(&self, signs: [f64; 3]) -> Option<LocalHit> {
        let mut vertex = Vec3::zero();
        for a in 0..3 {
            if signs[a] < 0.0 && self.movement[a] >= 0.0 {
                return None;
            }
            vertex[a] = signs[a] * self.extents[a];
        }
        let offset = self.center - vertex;

        let t = entry_time(offset, self.movement, self.radius)?;
        let point = self.center + self.movement * t;
        let in_region = (0..3).all(|a| signs[a] * point[a] >= self.extents[a] - FEATURE_EPSILON);
        if !in_region {
            return None;
        }

        Some(LocalHit {
            t,
            normal: self.surface_normal(offset + self.movement * t),
            contact: vertex,
        })
    }

    /// Normal of the rounded surface given the offset from the nearest box feature.
    /// A zero radius leaves no offset to normalize, so fall back to facing the movement.
    fn surface_normal(&self, offset: Vec3) -> Unit<Vec3> {
        Unit::try_new_normalize(offset)
            .or_else(|| Unit::try_new_normalize(-self.movement))
            .unwrap_or_else(Unit::unit_x)
    }

    fn feature_hit(&self, feature: Feature) -> Option<LocalHit> {
        match feature {
            Feature::Face(a) => self.face_hit(a),
            Feature::Edge(axis, signs) => self.edge_hit(axis, signs),
            Feature::Vertex(signs) => self.vertex_hit(signs),
        }
    }

    /// Earliest contact with the features a center in `region` can meet first.
    fn earliest_hit(&self, region: Region) -> Option<LocalHit> {
        let radius_sq = m::sqr(self.radius) - FEATURE_EPSILON;
        region
            .features()
            .into_iter()
            // the center enters through a feature only from outside its tangent plane
            .filter(|f| f.beyond_sq(self.corner_offset) > radius_sq)
            .filter_map(|f| self.feature_hit(f))
            .fold(None, |best: Option<LocalHit>, hit| match best {
                Some(b) if b.t <= hit.t => Some(b),
                _ => Some(hit),
            })
    }
}

#[derive(Clone, Copy, Debug)]
struct LocalHit {
    t: f64,
    normal: Unit<Vec3>,
    contact: Vec3,
}

#[inline]
fn other_axes(axis: usize) -> [usize; 2] {
    match axis {
        0 => [1, 2],
        1 => [0, 2],
        _ => [0, 1],
    }
}

/// First time in [0, 1] at which a point starting at `offset` from a center
/// and moving by `movement` reaches distance `radius` from the center,
/// coming from outside.
fn entry_time(offset: Vec3, movement: Vec3, radius: f64) -> Option<f64> {
    let a = movement.mag_sq();
    if a <= m::DIRECTION_EPSILON_SQ {
        return None;
    }
    let b = offset.dot(movement);
    let c = offset.mag_sq() - m::sqr(radius);
    if c <= 0.0 || b >= 0.0 {
        // already inside, or moving away
        return None;
    }
    let discriminant = b * b - a * c;
    if discriminant < 0.0 {
        return None;
    }
    let t = (-b - discriminant.sqrt()) / a;
    (t <= 1.0).then(|| t.max(0.0))
}

//
// public interface
//

pub(super) fn overlap(frame: &BoxFrame, sphere: &Sphere) -> bool {
    frame.dist_sq_to_point(sphere.center) <= m::sqr(sphere.radius)
}

/// Sweep a sphere against a static box.
pub(super) fn sweep(frame: &BoxFrame, sphere: &Sphere, movement: Vec3) -> Option<Intersection> {
    let canon = Canonical::new(frame, sphere, movement);
    let region = Region::classify(canon.corner_offset);

    if outside_part(canon.corner_offset).mag_sq() <= m::sqr(canon.radius) {
        return Some(canon.to_world(frame, canon.touching(region)));
    }

    // beyond the grown box on some axis and not moving back towards it
    let unreachable = (0..3).any(|a| {
        canon.corner_offset[a] > canon.radius && canon.movement[a] >= 0.0
    });
    if unreachable {
        return None;
    }

    let hit = canon.earliest_hit(region)?;
    log::trace!("sphere hit box from {:?} region at t = {}", region, hit.t);
    Some(canon.to_world(frame, hit))
}
