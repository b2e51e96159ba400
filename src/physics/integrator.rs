//! Advancing a single dynamic object by one fixed step.
//!
//! Movement is resolved with sweep-and-slide: the object's shape is swept
//! along its velocity, and on every hit it stops at the contact, bounces,
//! and continues with whatever time is left in the step.
//! Rotation is applied afterwards by searching for the largest
//! fraction of the step's rotation that doesn't push into anything.

use super::{
    motion::bounce, EntitySet, Motion, MotionKey, ObjectKey, PhysicsParams, Registry, VolumeKey,
};
use crate::{
    geometry::{Shape, Sweep},
    math::{self as m, Transform, Vec3},
};

/// Squared speed below which an object is considered not to be moving along a surface.
const SLIDE_SPEED_EPSILON_SQ: f64 = 1e-12;

/// State of the object being stepped, copied out of the entity set
/// so the registry can be queried while it changes.
struct Mover {
    key: MotionKey,
    owner: ObjectKey,
    volumes: Vec<VolumeKey>,
    motion: Motion,
    transform: Transform,
}

impl Mover {
    fn world_shapes<'a>(&'a self, entities: &'a EntitySet) -> impl Iterator<Item = Shape> + 'a {
        self.volumes.iter().filter_map(move |v| {
            entities
                .get_volume(*v)
                .map(|vol| vol.build_world_shape(&self.transform))
        })
    }
}

pub(super) fn step_motion(
    entities: &mut EntitySet,
    registry: &Registry,
    params: &PhysicsParams,
    key: MotionKey,
    dt: f64,
) {
    let _span = tracy_span!("step motion", "step_motion");

    let Some(owner) = entities.motion_owner(key) else {
        log::warn!("Tried to step motion {:?} without an owner", key);
        return;
    };
    let Some(motion) = entities.get_motion(key).copied() else {
        return;
    };
    let Some(transform) = entities.get_transform(owner).copied() else {
        return;
    };
    let mut mover = Mover {
        key,
        owner,
        volumes: registry
            .volumes_of(owner)
            .into_iter()
            .filter(|v| entities.contains_volume(*v))
            .collect(),
        motion,
        transform,
    };
    let start_position = mover.transform.translation;

    integrate_velocity(&mut mover, entities, registry, params, dt);
    slide(&mut mover, entities, registry, params, dt);
    rotate(&mut mover, entities, registry, params, start_position, dt);

    if let Some(motion) = entities.get_motion_mut(mover.key) {
        *motion = mover.motion;
    }
    if let Some(transform) = entities.get_transform_mut(mover.owner) {
        *transform = mover.transform;
    }
}

/// Apply gravity, drag and contact forces from surfaces the object is resting against.
fn integrate_velocity(
    mover: &mut Mover,
    entities: &EntitySet,
    registry: &Registry,
    params: &PhysicsParams,
    dt: f64,
) {
    let motion = &mover.motion;
    let mut force = motion.gravity * motion.mass() - motion.velocity() * motion.drag;
    let mut angular_change = Vec3::zero();

    if let Some(push_dir) = m::Unit::try_new_normalize(force) {
        // look a little past the proximity margin in the direction we're being pushed
        let reach = *push_dir * (2.0 * params.proximity_margin);
        let mut supported_by: Vec<VolumeKey> = Vec::new();
        for shape in mover.world_shapes(entities) {
            let near = registry.overlap(&shape.grown(params.proximity_margin), entities);
            for other in near {
                if mover.volumes.contains(&other) || supported_by.contains(&other) {
                    continue;
                }
                let Some((other_vol, other_tr)) = entities.get_volume_with_transform(other) else {
                    continue;
                };
                let other_shape = other_vol.build_world_shape(other_tr);
                let Some(contact) = other_shape.sweep(&shape, reach) else {
                    continue;
                };
                let normal = *contact.normal;
                let into_surface = force.dot(normal);
                if into_surface >= 0.0 {
                    continue;
                }
                supported_by.push(other);

                let normal_force = normal * -into_surface;
                force += normal_force;

                let velocity = mover.motion.velocity();
                let tangential = velocity - normal * velocity.dot(normal);
                let slide_speed_sq = tangential.mag_sq();
                if slide_speed_sq <= SLIDE_SPEED_EPSILON_SQ {
                    continue;
                }
                let slide_speed = slide_speed_sq.sqrt();
                // friction can stop the object but never push it backwards
                let friction_mag = (mover.motion.friction * normal_force.mag())
                    .min(slide_speed * mover.motion.mass() / dt);
                let friction = tangential * (-friction_mag / slide_speed);
                force += friction;

                let offset = contact.contact - mover.transform.translation;
                angular_change += offset.cross(friction) / mover.motion.mass() * dt;
            }
        }
    }

    let motion = &mut mover.motion;
    let velocity = motion.velocity() + force / motion.mass() * dt;
    motion.set_velocity(velocity);
    let angular = motion.angular_velocity() * (1.0 - motion.angular_drag) + angular_change;
    motion.set_angular_velocity(angular);
}

/// Move along the current velocity for `dt`, bouncing off anything in the way.
fn slide(
    mover: &mut Mover,
    entities: &mut EntitySet,
    registry: &Registry,
    params: &PhysicsParams,
    dt: f64,
) {
    // never collide with ourselves
    let mut ignore = mover.volumes.clone();
    let mut remaining = dt;

    for _ in 0..params.max_slide_iterations {
        let movement = mover.motion.velocity() * remaining;
        if movement.mag_sq() == 0.0 {
            return;
        }

        let hit = mover
            .world_shapes(entities)
            .filter_map(|shape| registry.sweep(&shape, movement, &ignore, entities))
            .min_by(|a, b| a.intersection.t.total_cmp(&b.intersection.t));
        let Some(hit) = hit else {
            mover.transform.translation += movement;
            return;
        };

        let t = hit.intersection.t;
        let normal = *hit.intersection.normal;
        let center_at_hit = mover.transform.translation + movement * t;
        let offset = hit.intersection.contact - center_at_hit;
        let body = mover.motion.as_bounce_body(offset);

        let partner = hit
            .motion
            .filter(|p| *p != mover.key)
            .and_then(|p| {
                let motion = entities.get_motion(p)?;
                let owner = entities.motion_owner(p)?;
                let center = entities.get_transform(owner)?.translation;
                Some((p, *motion, hit.intersection.contact - center))
            });
        let restitution = partner.map_or(mover.motion.restitution, |(_, other, _)| {
            mover.motion.restitution_with(&other)
        });
        let partner_body = partner.map(|(_, other, offset)| other.as_bounce_body(offset));

        let (own_change, partner_change) =
            bounce(normal, restitution, &body, partner_body.as_ref());

        if t == 0.0 && own_change.is_zero() {
            // touching but already moving away, stop considering it this step
            ignore.push(hit.volume);
            continue;
        }

        mover.transform.translation += movement * t + normal * params.contact_skin;
        mover.motion.apply(own_change);
        if let Some((partner_key, _, _)) = partner {
            if let Some(partner_motion) = entities.get_motion_mut(partner_key) {
                partner_motion.apply(partner_change);
            }
        }
        remaining *= 1.0 - t;
    }

    log::debug!(
        "Motion {:?} hit the slide iteration cap, dropping the rest of its movement",
        mover.key
    );
}

/// Rotate by the angular velocity for `dt`, as far as possible without overlapping anything.
fn rotate(
    mover: &mut Mover,
    entities: &EntitySet,
    registry: &Registry,
    params: &PhysicsParams,
    start_position: Vec3,
    dt: f64,
) {
    let rotation_vec = mover.motion.angular_velocity() * dt;
    if rotation_vec.mag_sq() == 0.0 {
        return;
    }
    let start_rotation = mover.transform.rotation;
    let rotation_at = |fraction: f64| {
        let mut r = m::rotor_from_scaled_axis(rotation_vec * fraction) * start_rotation;
        r.normalize();
        r
    };

    if mover.volumes.is_empty() {
        mover.transform.rotation = rotation_at(1.0);
        return;
    }

    let is_blocked = |fraction: f64| {
        let rotation = rotation_at(fraction);
        mover.volumes.iter().any(|v| {
            let Some(vol) = entities.get_volume(*v) else {
                return false;
            };
            // shrink by the skin so that resting contact doesn't count
            let shape = vol
                .build_world_shape_with_rotation(&mover.transform, rotation)
                .grown(-params.contact_skin);
            registry
                .overlap(&shape, entities)
                .iter()
                .any(|other| !mover.volumes.contains(other))
        })
    };

    if !is_blocked(1.0) {
        mover.transform.rotation = rotation_at(1.0);
        return;
    }

    let mut free = 0.0;
    let mut blocked = 1.0;
    for _ in 0..params.rotation_bisection_steps {
        let mid = 0.5 * (free + blocked);
        if is_blocked(mid) {
            blocked = mid;
        } else {
            free = mid;
        }
    }
    mover.transform.rotation = rotation_at(free);
    log::debug!(
        "Motion {:?} could only rotate {} of the way this step",
        mover.key,
        free
    );

    // treat the obstruction as a contact on the side we were moving towards
    let translation = mover.transform.translation - start_position;
    let Some(direction) = m::Unit::try_new_normalize(translation) else {
        log::debug!("Rotation blocked with no direction to bounce in");
        mover.motion.set_angular_velocity(Vec3::zero());
        return;
    };
    let Some(shape) = mover.world_shapes(entities).next() else {
        return;
    };
    let contact = shape.farthest_point(*direction);
    let body = mover
        .motion
        .as_bounce_body(contact - mover.transform.translation);
    let (change, _) = bounce(-*direction, mover.motion.restitution, &body, None);
    mover.motion.apply(change);
}
