use super::overlap::{candidate_axes, least_penetration, segment_closest_points, BoxAxis};
use super::overlap::{Overlap, MIN_AXIS_MAG_SQ};
use super::shapes::{Aabb, Intersection, Obb, Segment, Sphere};
use super::sphere_box::{self, BoxFrame};
use crate::math::{self as m, Unit, Vec3};

/// Swept intersection test.
///
/// `self` stays still while `moving` travels by `movement` over a unit time interval.
/// Returns the first contact within that interval. Shapes that already overlap
/// at the start (as decided by [`Overlap`][super::Overlap]) report `t = 0`.
pub trait Sweep<Moving = Self> {
    fn sweep(&self, moving: &Moving, movement: Vec3) -> Option<Intersection>;
}

/// Velocities smaller than this along an axis are treated as not moving along it.
const MIN_AXIS_SPEED: f64 = 1e-12;

/// Box axes closer than this to perpendicular with a contact normal
/// count as parallel to the contact plane.
const PARALLEL_EPSILON: f64 = 1e-9;

/// Direction from the static shape to the moving one along a contact axis,
/// given their separation along the axis.
/// Falls back to facing the movement when the shapes are centered on each other.
#[inline]
fn separation_sign(offset_along: f64, movement_along: f64) -> f64 {
    match (m::sign(offset_along), m::sign(movement_along)) {
        (s, _) if s != 0.0 => s,
        (_, mv) if mv != 0.0 => -mv,
        _ => 1.0,
    }
}

//
// SPHERE <-> SPHERE
//

impl Sweep for Sphere {
    fn sweep(&self, moving: &Sphere, movement: Vec3) -> Option<Intersection> {
        let offset = moving.center - self.center;
        let radius_sum = self.radius + moving.radius;

        let contact_on_self = |normal: Unit<Vec3>| self.center + *normal * self.radius;

        if self.overlaps(moving) {
            let normal = Unit::try_new_normalize(offset)
                .or_else(|| Unit::try_new_normalize(-movement))
                .unwrap_or_else(Unit::unit_x);
            return Some(Intersection {
                contact: contact_on_self(normal),
                normal,
                t: 0.0,
            });
        }

        // |offset + movement * t|^2 = radius_sum^2
        let a = movement.mag_sq();
        if a <= m::DIRECTION_EPSILON_SQ {
            return None;
        }
        let b = offset.dot(movement);
        if b >= 0.0 {
            return None;
        }
        let c = offset.mag_sq() - m::sqr(radius_sum);
        let discriminant = b * b - a * c;
        if discriminant < 0.0 {
            return None;
        }
        // c > 0 because we're not overlapping, so both roots have the same sign
        // and b < 0 makes them positive
        let t = (-b - discriminant.sqrt()) / a;
        if t > 1.0 {
            return None;
        }

        let normal = Unit::try_new_normalize(offset + movement * t)
            .or_else(|| Unit::try_new_normalize(-movement))
            .unwrap_or_else(Unit::unit_x);
        Some(Intersection {
            contact: contact_on_self(normal),
            normal,
            t,
        })
    }
}

//
// BOX <-> SPHERE
//

impl Sweep<Sphere> for Aabb {
    fn sweep(&self, moving: &Sphere, movement: Vec3) -> Option<Intersection> {
        sphere_box::sweep(&BoxFrame::from(self), moving, movement)
    }
}

impl Sweep<Sphere> for Obb {
    fn sweep(&self, moving: &Sphere, movement: Vec3) -> Option<Intersection> {
        sphere_box::sweep(&BoxFrame::from(self), moving, movement)
    }
}

// a box moving into a static sphere is solved as the sphere moving the other way

impl Sweep<Aabb> for Sphere {
    fn sweep(&self, moving: &Aabb, movement: Vec3) -> Option<Intersection> {
        moving.sweep(self, -movement).map(|i| i.swapped(movement))
    }
}

impl Sweep<Obb> for Sphere {
    fn sweep(&self, moving: &Obb, movement: Vec3) -> Option<Intersection> {
        moving.sweep(self, -movement).map(|i| i.swapped(movement))
    }
}

//
// AABB <-> AABB
//

impl Sweep for Aabb {
    fn sweep(&self, moving: &Aabb, movement: Vec3) -> Option<Intersection> {
        let offset = moving.center - self.center;

        if self.overlaps(moving) {
            let reach = self.extents + moving.extents;
            let axis = (0..3)
                .min_by(|&a, &b| {
                    let depth_a = reach[a] - offset[a].abs();
                    let depth_b = reach[b] - offset[b].abs();
                    depth_a.total_cmp(&depth_b)
                })
                .unwrap_or(0);
            let normal = m::axis_vec(axis) * separation_sign(offset[axis], movement[axis]);
            return Some(Intersection {
                contact: aabb_contact_region_center(self, moving),
                normal: Unit::new_unchecked(normal),
                t: 0.0,
            });
        }

        // slab test on the Minkowski difference
        let reach = self.extents + moving.extents;
        let mut entry = f64::NEG_INFINITY;
        let mut entry_axis = None;
        let mut exit = f64::INFINITY;
        for a in 0..3 {
            if movement[a].abs() <= MIN_AXIS_SPEED {
                if offset[a].abs() > reach[a] {
                    return None;
                }
                continue;
            }
            let t1 = (-reach[a] - offset[a]) / movement[a];
            let t2 = (reach[a] - offset[a]) / movement[a];
            let (axis_entry, axis_exit) = if t1 < t2 { (t1, t2) } else { (t2, t1) };
            if axis_entry > entry {
                entry = axis_entry;
                entry_axis = Some(a);
            }
            exit = exit.min(axis_exit);
        }

        let axis = entry_axis?;
        if entry > exit || entry > 1.0 || exit < 0.0 {
            return None;
        }
        let t = entry.max(0.0);

        let moved = Aabb {
            center: moving.center + movement * t,
            extents: moving.extents,
        };
        let side = separation_sign(offset[axis], movement[axis]);
        let mut contact = aabb_contact_region_center(self, &moved);
        contact[axis] = self.center[axis] + side * self.extents[axis];

        Some(Intersection {
            contact,
            normal: Unit::new_unchecked(m::axis_vec(axis) * side),
            t,
        })
    }
}

/// Center of the region where two boxes overlap,
/// or of the gap between them along axes where they don't.
fn aabb_contact_region_center(a: &Aabb, b: &Aabb) -> Vec3 {
    let (a_min, a_max, b_min, b_max) = (a.min(), a.max(), b.min(), b.max());
    let mut center = Vec3::zero();
    for i in 0..3 {
        let lo = a_min[i].max(b_min[i]);
        let hi = a_max[i].min(b_max[i]);
        center[i] = 0.5 * (lo + hi);
    }
    center
}

//
// OBB <-> OBB
//

impl Sweep for Obb {
    fn sweep(&self, moving: &Obb, movement: Vec3) -> Option<Intersection> {
        let (axes_a, axes_b) = (self.axes(), moving.axes());
        let offset = moving.center - self.center;

        if let Some((kind, axis, _)) = least_penetration(self, moving) {
            let normal = contact_normal(axis, offset, movement);
            return Some(Intersection {
                contact: obb_contact(self, &axes_a, moving, &axes_b, kind, normal),
                normal,
                t: 0.0,
            });
        }

        let mut entry = f64::NEG_INFINITY;
        let mut entry_axis = None;
        let mut exit = f64::INFINITY;
        for (kind, axis) in candidate_axes(&axes_a, &axes_b) {
            let reach =
                self.projected_radius(&axes_a, axis) + moving.projected_radius(&axes_b, axis);
            let dist = offset.dot(axis);
            let speed = movement.dot(axis);
            if speed.abs() <= MIN_AXIS_SPEED * axis.mag() {
                if dist.abs() > reach {
                    return None;
                }
                continue;
            }
            let t1 = (-reach - dist) / speed;
            let t2 = (reach - dist) / speed;
            let (axis_entry, axis_exit) = if t1 < t2 { (t1, t2) } else { (t2, t1) };
            if axis_entry > entry {
                entry = axis_entry;
                entry_axis = Some((kind, axis));
            }
            exit = exit.min(axis_exit);
        }

        // axes perpendicular to the movement can only rule contact out,
        // since the separation along them never changes
        let movement_axes = axes_a.iter().chain(&axes_b).map(|ax| movement.cross(*ax));
        for axis in movement_axes.filter(|ax| ax.mag_sq() > MIN_AXIS_MAG_SQ) {
            let reach =
                self.projected_radius(&axes_a, axis) + moving.projected_radius(&axes_b, axis);
            if offset.dot(axis).abs() > reach {
                return None;
            }
        }

        let (kind, axis) = entry_axis?;
        if entry > exit || entry > 1.0 || exit < 0.0 {
            return None;
        }
        let t = entry.max(0.0);

        let moved = Obb {
            center: moving.center + movement * t,
            ..*moving
        };
        let normal = contact_normal(axis, moved.center - self.center, movement);
        Some(Intersection {
            contact: obb_contact(self, &axes_a, &moved, &axes_b, kind, normal),
            normal,
            t,
        })
    }
}

/// Orient a separating axis to point from the static box towards the moving one.
fn contact_normal(axis: Vec3, offset: Vec3, movement: Vec3) -> Unit<Vec3> {
    let side = separation_sign(offset.dot(axis), movement.dot(axis));
    Unit::new_normalize(axis * side)
}

/// Point of contact between two touching boxes,
/// found from the features that meet along the contact axis.
///
/// A face contact picks the other box's vertex deepest along the normal.
/// Along axes parallel to the contact plane there is no deepest vertex,
/// so the point goes to the middle of the range where the boxes overlap on that axis.
fn obb_contact(
    a: &Obb,
    axes_a: &[Vec3; 3],
    b: &Obb,
    axes_b: &[Vec3; 3],
    kind: BoxAxis,
    normal: Unit<Vec3>,
) -> Vec3 {
    let side = |d: f64| m::sign_beyond(d, PARALLEL_EPSILON);
    // coordinates of the support point of A towards B and of B towards A
    let support_a = |i: usize| match side(axes_a[i].dot(*normal)) {
        s if s == 0.0 => overlap_middle(a, a.extents[i], b, axes_b, axes_a[i]),
        s => s * a.extents[i],
    };
    let support_b = |j: usize| match side(axes_b[j].dot(*normal)) {
        s if s == 0.0 => overlap_middle(b, b.extents[j], a, axes_a, axes_b[j]),
        s => -s * b.extents[j],
    };

    match kind {
        BoxAxis::FaceA(_) => (0..3).fold(b.center, |p, j| p + axes_b[j] * support_b(j)),
        BoxAxis::FaceB(_) => (0..3).fold(a.center, |p, i| p + axes_a[i] * support_a(i)),
        BoxAxis::Edge(i, j) => {
            let edge_mid_a = (0..3)
                .filter(|&k| k != i)
                .fold(a.center, |p, k| p + axes_a[k] * support_a(k));
            let edge_mid_b = (0..3)
                .filter(|&k| k != j)
                .fold(b.center, |p, k| p + axes_b[k] * support_b(k));
            let edge_a = Segment::new(
                edge_mid_a - axes_a[i] * a.extents[i],
                edge_mid_a + axes_a[i] * a.extents[i],
            );
            let edge_b = Segment::new(
                edge_mid_b - axes_b[j] * b.extents[j],
                edge_mid_b + axes_b[j] * b.extents[j],
            );
            let (on_a, on_b) = segment_closest_points(&edge_a, &edge_b);
            (on_a + on_b) * 0.5
        }
    }
}

/// Offset from `own`'s center along its unit `axis` to the middle of
/// the range covered by both boxes' projections, clamped to `own`.
fn overlap_middle(
    own: &Obb,
    own_extent: f64,
    other: &Obb,
    other_axes: &[Vec3; 3],
    axis: Vec3,
) -> f64 {
    let dist = (other.center - own.center).dot(axis);
    let reach = other.projected_radius(other_axes, axis);
    let lo = (dist - reach).max(-own_extent);
    let hi = (dist + reach).min(own_extent);
    (0.5 * (lo + hi)).clamp(-own_extent, own_extent)
}

//
// AABB <-> OBB
//

impl Sweep<Obb> for Aabb {
    fn sweep(&self, moving: &Obb, movement: Vec3) -> Option<Intersection> {
        self.to_obb().sweep(moving, movement)
    }
}

impl Sweep<Aabb> for Obb {
    fn sweep(&self, moving: &Aabb, movement: Vec3) -> Option<Intersection> {
        self.sweep(&moving.to_obb(), movement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use std::f64::consts::FRAC_PI_4;

    fn assert_vec_eq(a: Vec3, b: Vec3) {
        assert!((a - b).mag() < 1e-9, "{:?} != {:?}", a, b);
    }

    #[test]
    fn sphere_sphere_closed_form() {
        let s1 = Sphere::new(Vec3::zero(), 1.0);
        let s2 = Sphere::new(Vec3::new(5.0, 0.0, 0.0), 1.0);
        let hit = s1
            .sweep(&s2, Vec3::new(-10.0, 0.0, 0.0))
            .expect("should hit");
        // gap of 3 closed over a travel of 10
        assert!((hit.t - 0.3).abs() < 1e-12, "t = {}", hit.t);
        assert_vec_eq(*hit.normal, Vec3::unit_x());
        assert_vec_eq(hit.contact, Vec3::unit_x());
    }

    #[test]
    fn sphere_sphere_glancing() {
        let s1 = Sphere::new(Vec3::zero(), 1.0);
        // passes with the centers exactly 2 apart at the closest point
        let s2 = Sphere::new(Vec3::new(5.0, 2.0, 0.0), 1.0);
        let movement = Vec3::new(-10.0, 0.0, 0.0);
        let hit = s1.sweep(&s2, movement).expect("should graze");
        assert!((hit.t - 0.5).abs() < 1e-6);
        let s3 = Sphere::new(Vec3::new(5.0, 2.001, 0.0), 1.0);
        assert!(s1.sweep(&s3, movement).is_none());
    }

    #[test]
    fn aabb_aabb_face() {
        let a = Aabb::new(Vec3::zero(), Vec3::one());
        let b = Aabb::new(Vec3::new(5.0, 0.0, 0.0), Vec3::one());
        let hit = a.sweep(&b, Vec3::new(-10.0, 0.0, 0.0)).expect("should hit");
        assert!((hit.t - 0.3).abs() < 1e-12);
        assert_vec_eq(*hit.normal, Vec3::unit_x());
        assert!((hit.contact.x - 1.0).abs() < 1e-12);
    }

    #[test]
    fn aabb_aabb_diagonal_latest_entry_axis() {
        let a = Aabb::new(Vec3::zero(), Vec3::one());
        let b = Aabb::new(Vec3::new(4.0, 3.0, 0.0), Vec3::one());
        let hit = a.sweep(&b, Vec3::new(-4.0, -4.0, 0.0)).expect("should hit");
        // x slab entered at t = 0.5, y slab at t = 0.25
        assert!((hit.t - 0.5).abs() < 1e-12);
        assert_vec_eq(*hit.normal, Vec3::unit_x());

        let above = Aabb::new(Vec3::new(4.0, 5.0, 0.0), Vec3::one());
        assert!(a.sweep(&above, Vec3::new(-4.0, 0.0, 0.0)).is_none());
    }

    #[test]
    fn identity_obb_matches_aabb() {
        let a = Aabb::new(Vec3::zero(), Vec3::one());
        let b = Aabb::new(Vec3::new(5.0, 0.0, 0.0), Vec3::one());
        let movement = Vec3::new(-10.0, 0.0, 0.0);
        let aabb_hit = a.sweep(&b, movement).expect("should hit");
        let obb_hit = a
            .to_obb()
            .sweep(&b.to_obb(), movement)
            .expect("should hit");
        assert_eq!(aabb_hit.t, obb_hit.t);
        assert_vec_eq(*aabb_hit.normal, *obb_hit.normal);
        assert_vec_eq(aabb_hit.contact, obb_hit.contact);

        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let mut rand_vec = |range: f64| {
                Vec3::new(
                    rng.gen_range(-range..range),
                    rng.gen_range(-range..range),
                    rng.gen_range(-range..range),
                )
            };
            let a = Aabb::new(rand_vec(4.0), rand_vec(1.0).abs() + Vec3::broadcast(0.1));
            let b = Aabb::new(rand_vec(4.0), rand_vec(1.0).abs() + Vec3::broadcast(0.1));
            let movement = rand_vec(8.0);
            let aabb_hit = a.sweep(&b, movement);
            let obb_hit = a.to_obb().sweep(&b.to_obb(), movement);
            match (aabb_hit, obb_hit) {
                (Some(h1), Some(h2)) => {
                    assert!((h1.t - h2.t).abs() < 1e-9, "{} != {}", h1.t, h2.t);
                    assert_vec_eq(*h1.normal, *h2.normal);
                }
                (None, None) => {}
                (h1, h2) => panic!("aabb gave {:?}, obb gave {:?}", h1, h2),
            }
        }
    }

    #[test]
    fn obb_rotated_vertex_onto_face() {
        // B is rotated so that one of its vertices points straight down at A's top face
        let slab = Vec3::new(5.0, 1.0, 5.0);
        let a = Obb::new(Vec3::zero(), m::Rotor3::identity(), slab);
        let tilt = m::rotor_from_scaled_axis(Vec3::new(0.0, 0.0, FRAC_PI_4));
        let b = Obb::new(Vec3::new(0.0, 6.0, 0.0), tilt, Vec3::new(1.0, 1.0, 0.5));
        let hit = a.sweep(&b, Vec3::new(0.0, -10.0, 0.0)).expect("should hit");

        let lowest = 6.0 - 2.0f64.sqrt();
        let expected_t = (lowest - 1.0) / 10.0;
        assert!((hit.t - expected_t).abs() < 1e-9, "t = {}", hit.t);
        assert_vec_eq(*hit.normal, Vec3::unit_y());
        // the bottom edge of B runs along z, so the contact sits at its middle
        assert_vec_eq(hit.contact, Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn obb_parallel_faces_contact_on_both_boxes() {
        // a wide slab lands off-center on a small cube
        let small = Obb::new(Vec3::zero(), m::Rotor3::identity(), Vec3::broadcast(0.5));
        let wide = Obb::new(
            Vec3::new(3.0, 3.0, 0.0),
            m::Rotor3::identity(),
            Vec3::new(5.0, 0.5, 5.0),
        );
        let movement = Vec3::new(0.0, -5.0, 0.0);
        let hit = small.sweep(&wide, movement).expect("should hit");

        assert!((hit.t - 0.4).abs() < 1e-12, "t = {}", hit.t);
        assert_vec_eq(*hit.normal, Vec3::unit_y());
        assert_vec_eq(hit.contact, Vec3::new(0.0, 0.5, 0.0));
        let moved = Obb {
            center: wide.center + movement * hit.t,
            ..wide
        };
        for (b, name) in [(&small, "static"), (&moved, "moving")] {
            let local = hit.contact - b.center;
            for i in 0..3 {
                assert!(
                    local[i].abs() <= b.extents[i] + 1e-9,
                    "off the {} box: {:?}",
                    name,
                    hit.contact
                );
            }
        }

        let aabb_hit = Aabb::new(small.center, small.extents)
            .sweep(&Aabb::new(wide.center, wide.extents), movement)
            .expect("should hit");
        assert!((aabb_hit.t - hit.t).abs() < 1e-12);
        assert_vec_eq(aabb_hit.contact, hit.contact);

        // the same from the other side, with the small box moving
        let hit = wide.sweep(&small, -movement).expect("should hit");
        assert_vec_eq(hit.contact, Vec3::new(0.0, 2.5, 0.0));
        assert_vec_eq(*hit.normal, -Vec3::unit_y());
    }

    #[test]
    fn obb_edge_edge() {
        let a = Obb::new(
            Vec3::zero(),
            m::rotor_from_scaled_axis(Vec3::new(FRAC_PI_4, 0.0, 0.0)),
            Vec3::one(),
        );
        let b = Obb::new(
            Vec3::new(0.0, 6.0, 0.0),
            m::rotor_from_scaled_axis(Vec3::new(0.0, 0.0, FRAC_PI_4)),
            Vec3::one(),
        );
        let hit = a.sweep(&b, Vec3::new(0.0, -6.0, 0.0)).expect("should hit");
        // the top edge of A is at sqrt(2), the bottom edge of B at 6 - sqrt(2)
        let gap = 6.0 - 2.0 * 2.0f64.sqrt();
        assert!((hit.t - gap / 6.0).abs() < 1e-9, "t = {}", hit.t);
        assert_vec_eq(*hit.normal, Vec3::unit_y());
        assert_vec_eq(hit.contact, Vec3::new(0.0, 2.0f64.sqrt(), 0.0));
    }

    #[test]
    fn obb_moving_past_is_rejected() {
        let a = Obb::new(Vec3::zero(), m::Rotor3::identity(), Vec3::one());
        let b = Obb::new(
            Vec3::new(-5.0, 3.0, 0.0),
            m::rotor_from_scaled_axis(Vec3::new(0.3, 0.2, 0.1)),
            Vec3::new(0.5, 0.5, 0.5),
        );
        assert!(a.sweep(&b, Vec3::new(10.0, 0.0, 0.0)).is_none());
        // and no hit for a movement that stops short
        assert!(a.sweep(&b, Vec3::new(1.0, -1.0, 0.0)).is_none());
    }

    #[test]
    fn sphere_against_moving_box_is_mirrored() {
        let sphere = Sphere::new(Vec3::zero(), 1.0);
        let b = Aabb::new(Vec3::new(5.0, 0.0, 0.0), Vec3::one());
        let movement = Vec3::new(-10.0, 0.0, 0.0);
        let hit = sphere.sweep(&b, movement).expect("should hit");
        assert!((hit.t - 0.3).abs() < 1e-12);
        // normal points from the static sphere to the box
        assert_vec_eq(*hit.normal, Vec3::unit_x());
        // contact is where the box's face meets the sphere at impact
        assert_vec_eq(hit.contact, Vec3::unit_x());

        let hit_obb = sphere.sweep(&b.to_obb(), movement).expect("should hit");
        assert!((hit_obb.t - hit.t).abs() < 1e-12);
        assert_vec_eq(hit_obb.contact, hit.contact);
    }

    #[test]
    fn already_touching_reports_zero() {
        let mut rng = StdRng::seed_from_u64(5);
        let unit = Aabb::new(Vec3::zero(), Vec3::one());
        for _ in 0..200 {
            let p = Vec3::new(
                rng.gen_range(-1.5..1.5),
                rng.gen_range(-1.5..1.5),
                rng.gen_range(-1.5..1.5),
            );
            let movement = Vec3::new(rng.gen_range(-3.0..3.0), rng.gen_range(-3.0..3.0), 0.0);
            let sphere = Sphere::new(p, 0.5);
            if unit.overlaps(&sphere) {
                assert_eq!(unit.sweep(&sphere, movement).map(|i| i.t), Some(0.0));
            }
            let small = Aabb::new(p, Vec3::broadcast(0.3));
            if unit.overlaps(&small) {
                assert_eq!(unit.sweep(&small, movement).map(|i| i.t), Some(0.0));
                let obb_hit = unit.to_obb().sweep(&small.to_obb(), movement);
                assert_eq!(obb_hit.map(|i| i.t), Some(0.0));
            }
            let other = Sphere::new(p, 0.2);
            if sphere.overlaps(&other) {
                assert_eq!(sphere.sweep(&other, movement).map(|i| i.t), Some(0.0));
            }
        }
    }

    #[test]
    fn degenerate_inputs() {
        let unit = Aabb::new(Vec3::zero(), Vec3::one());
        let far_sphere = Sphere::new(Vec3::new(5.0, 0.0, 0.0), 1.0);
        assert!(unit.sweep(&far_sphere, Vec3::zero()).is_none());
        let far_box = Aabb::new(Vec3::new(5.0, 0.0, 0.0), Vec3::one());
        assert!(unit.sweep(&far_box, Vec3::zero()).is_none());
        let flat_obb = Obb::new(far_box.center, m::Rotor3::identity(), Vec3::zero());
        assert!(unit.to_obb().sweep(&flat_obb, Vec3::zero()).is_none());
        let point = Sphere::new(Vec3::zero(), 0.0);
        assert!(far_sphere.sweep(&point, Vec3::zero()).is_none());

        // a point moving into a flat box
        let flat = Aabb::new(Vec3::zero(), Vec3::new(1.0, 0.0, 1.0));
        let point = Sphere::new(Vec3::new(0.0, 2.0, 0.0), 0.0);
        let movement = Vec3::new(0.0, -4.0, 0.0);
        let hit = flat.sweep(&point, movement).expect("should hit");
        assert!((hit.t - 0.5).abs() < 1e-12);

        // zero-size spheres in the same spot
        let p1 = Sphere::new(Vec3::zero(), 0.0);
        let hit = p1.sweep(&p1, Vec3::zero()).expect("already touching");
        assert_eq!(hit.t, 0.0);
    }
}
