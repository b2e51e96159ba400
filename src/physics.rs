//! Simulated objects, their collision volumes and motion,
//! and the world that steps them forward in time.

mod entity_set;
pub use entity_set::{EntitySet, MotionKey, ObjectKey, VolumeKey};

mod error;
pub use error::{ParamsError, PhysicsError};

pub mod hecs_sync;
pub use hecs_sync::{HecsSync, HecsSyncOptions};

mod integrator;

pub mod motion;
pub use motion::{bounce, BounceBody, Motion, MotionParams, VelocityChange};

mod params;
pub use params::PhysicsParams;

pub mod registry;
pub use registry::{Classification, Registry, SweepHit};

pub mod volume;
pub use volume::{CollisionVolume, VolumeShape};

use crate::{
    geometry::Shape,
    math::{Transform, Vec3},
    util::FixedStep,
};

/// A world of simulated objects.
///
/// Objects are plain transforms until something is attached to them:
/// a [`CollisionVolume`] lets other objects hit them, and a [`Motion`] makes
/// them move. An object with volumes but no motion is static;
/// one with a motion is dynamic.
pub struct PhysicsWorld {
    pub entity_set: EntitySet,
    registry: Registry,
    params: PhysicsParams,
    clock: FixedStep,
}

impl PhysicsWorld {
    pub fn new(params: PhysicsParams) -> Result<Self, PhysicsError> {
        params.validate()?;
        Ok(Self {
            entity_set: EntitySet::new(),
            registry: Registry::new(),
            params,
            clock: FixedStep::new(params.fixed_dt),
        })
    }

    #[inline]
    pub fn params(&self) -> &PhysicsParams {
        &self.params
    }

    /// Replace the simulation parameters. Time accumulated by
    /// [`update`][Self::update] is discarded if the step length changes.
    pub fn set_params(&mut self, params: PhysicsParams) -> Result<(), PhysicsError> {
        params.validate()?;
        if params.fixed_dt != self.params.fixed_dt {
            self.clock = FixedStep::new(params.fixed_dt);
        }
        self.params = params;
        Ok(())
    }

    #[inline]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Add an object with the given transform.
    #[inline]
    pub fn insert_object(&mut self, transform: Transform) -> ObjectKey {
        self.entity_set.insert_object(transform)
    }

    /// Remove an object along with everything attached to it.
    /// Returns its last transform if it still existed.
    ///
    /// Registry entries are cleaned up lazily at the start of the next step.
    pub fn remove_object(&mut self, object: ObjectKey) -> Option<Transform> {
        let removed = self.entity_set.remove_object(object);
        if removed.is_none() {
            log::warn!("Tried to remove object {:?} which doesn't exist", object);
        }
        removed
    }

    /// Give an object a collision volume.
    pub fn attach_volume(
        &mut self,
        object: ObjectKey,
        volume: CollisionVolume,
    ) -> Result<VolumeKey, PhysicsError> {
        if !self.entity_set.contains_object(object) {
            log::warn!(
                "Tried to attach a volume to nonexistent object {:?}",
                object
            );
            return Err(PhysicsError::ObjectNotFound);
        }
        let key = self.entity_set.insert_volume(object, volume);
        self.registry.add_volume(object, key);
        Ok(key)
    }

    /// Remove a collision volume from its object.
    pub fn detach_volume(&mut self, volume: VolumeKey) -> Result<CollisionVolume, PhysicsError> {
        let owner = self.entity_set.volume_owner(volume);
        let Some(removed) = self.entity_set.remove_volume(volume) else {
            log::warn!("Tried to detach volume {:?} which doesn't exist", volume);
            return Err(PhysicsError::VolumeNotFound);
        };
        if let Some(owner) = owner {
            self.registry.remove_volume(owner, volume, &self.entity_set);
        }
        Ok(removed)
    }

    /// Make an object dynamic.
    /// An object can only have one motion at a time.
    pub fn attach_motion(
        &mut self,
        object: ObjectKey,
        params: MotionParams,
    ) -> Result<MotionKey, PhysicsError> {
        if !self.entity_set.contains_object(object) {
            log::warn!(
                "Tried to attach a motion to nonexistent object {:?}",
                object
            );
            return Err(PhysicsError::ObjectNotFound);
        }
        if let Some(existing) = self.registry.motion_of(object) {
            if self.entity_set.contains_motion(existing) {
                return Err(PhysicsError::MotionAlreadyAttached);
            }
        }
        let motion = params.build()?;
        let key = self.entity_set.insert_motion(object, motion);
        self.registry.add_motion(object, key);
        Ok(key)
    }

    /// Make a dynamic object static again, returning its final motion state.
    pub fn detach_motion(&mut self, motion: MotionKey) -> Result<Motion, PhysicsError> {
        let owner = self.entity_set.motion_owner(motion);
        let Some(removed) = self.entity_set.remove_motion(motion) else {
            log::warn!("Tried to detach motion {:?} which doesn't exist", motion);
            return Err(PhysicsError::MotionNotFound);
        };
        if let Some(owner) = owner {
            self.registry.remove_motion(owner, motion);
        }
        Ok(removed)
    }

    #[inline]
    pub fn get_transform(&self, object: ObjectKey) -> Option<&Transform> {
        self.entity_set.get_transform(object)
    }

    #[inline]
    pub fn get_transform_mut(&mut self, object: ObjectKey) -> Option<&mut Transform> {
        self.entity_set.get_transform_mut(object)
    }

    #[inline]
    pub fn get_volume(&self, volume: VolumeKey) -> Option<&CollisionVolume> {
        self.entity_set.get_volume(volume)
    }

    #[inline]
    pub fn get_motion(&self, motion: MotionKey) -> Option<&Motion> {
        self.entity_set.get_motion(motion)
    }

    #[inline]
    pub fn get_motion_mut(&mut self, motion: MotionKey) -> Option<&mut Motion> {
        self.entity_set.get_motion_mut(motion)
    }

    /// The current world-space shape of a volume.
    pub fn world_shape(&self, volume: VolumeKey) -> Option<Shape> {
        let (vol, transform) = self.entity_set.get_volume_with_transform(volume)?;
        Some(vol.build_world_shape(transform))
    }

    /// Every collision volume overlapping the given shape.
    #[inline]
    pub fn overlap(&self, shape: &Shape) -> Vec<VolumeKey> {
        self.registry.overlap(shape, &self.entity_set)
    }

    /// The first collision volume a shape would hit when moved by `movement`.
    #[inline]
    pub fn sweep(&self, shape: &Shape, movement: Vec3, ignore: &[VolumeKey]) -> Option<SweepHit> {
        self.registry.sweep(shape, movement, ignore, &self.entity_set)
    }

    /// Advance every dynamic object by one step of length `dt`.
    ///
    /// Objects are moved one at a time in key order,
    /// each seeing the others where they already are.
    pub fn step(&mut self, dt: f64) {
        let _span = tracy_span!("physics step", "step");

        self.registry.purge_stale(&self.entity_set);
        for key in self.entity_set.motion_keys() {
            // an earlier motion can't remove a later one, but check anyway
            if !self.entity_set.contains_motion(key) {
                continue;
            }
            integrator::step_motion(&mut self.entity_set, &self.registry, &self.params, key, dt);
        }
    }

    /// Accumulate `elapsed` seconds of real time and run
    /// as many whole fixed steps as fit. Returns the number of steps run.
    pub fn update(&mut self, elapsed: f64) -> usize {
        let steps = self.clock.advance(elapsed);
        for _ in 0..steps {
            self.step(self.params.fixed_dt);
        }
        steps
    }

    /// Remove every object.
    pub fn clear(&mut self) {
        self.entity_set.clear();
        self.registry.clear();
        self.clock.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Rotor3;

    fn at(x: f64, y: f64, z: f64) -> Transform {
        Transform::new(Vec3::new(x, y, z), Rotor3::identity(), 1.0)
    }

    #[test]
    fn attach_and_detach_in_any_order() {
        let mut world = PhysicsWorld::new(PhysicsParams::default()).unwrap();
        let obj = world.insert_object(at(0.0, 0.0, 0.0));

        // motion first, then volume
        let motion = world.attach_motion(obj, MotionParams::new()).unwrap();
        assert_eq!(
            world.registry().classification(obj),
            Some(Classification::Dynamic)
        );
        let vol = world.attach_volume(obj, CollisionVolume::sphere(1.0)).unwrap();
        assert_eq!(world.registry().volumes_of(obj), vec![vol]);

        // motion goes first, volume stays as a static
        world.detach_motion(motion).unwrap();
        assert_eq!(
            world.registry().classification(obj),
            Some(Classification::Static)
        );
        assert_eq!(world.registry().volumes_of(obj), vec![vol]);

        world.detach_volume(vol).unwrap();
        assert_eq!(world.registry().classification(obj), None);
        assert!(world.registry().is_empty());
    }

    #[test]
    fn errors_on_bad_keys_and_params() {
        let mut world = PhysicsWorld::new(PhysicsParams::default()).unwrap();
        let obj = world.insert_object(at(0.0, 0.0, 0.0));
        let vol = world.attach_volume(obj, CollisionVolume::sphere(1.0)).unwrap();
        let motion = world.attach_motion(obj, MotionParams::new()).unwrap();

        assert_eq!(
            world.attach_motion(obj, MotionParams::new()),
            Err(PhysicsError::MotionAlreadyAttached)
        );
        assert_eq!(
            world.attach_motion(obj, MotionParams::new().with_mass(0.0)),
            Err(PhysicsError::MotionAlreadyAttached)
        );

        world.remove_object(obj);
        assert_eq!(
            world.attach_volume(obj, CollisionVolume::sphere(1.0)),
            Err(PhysicsError::ObjectNotFound)
        );
        assert_eq!(world.detach_volume(vol), Err(PhysicsError::VolumeNotFound));
        assert_eq!(
            world.detach_motion(motion),
            Err(PhysicsError::MotionNotFound)
        );

        let other = world.insert_object(at(0.0, 0.0, 0.0));
        assert_eq!(
            world.attach_motion(other, MotionParams::new().with_mass(-1.0)),
            Err(PhysicsError::InvalidParams(
                ParamsError::NonPositiveMass(-1.0)
            ))
        );
        let bad_dt = PhysicsParams::default().with_fixed_dt(-1.0);
        assert!(PhysicsWorld::new(bad_dt).is_err());
    }

    #[test]
    fn removed_objects_vanish_from_queries() {
        let mut world = PhysicsWorld::new(PhysicsParams::default()).unwrap();
        let obj = world.insert_object(at(0.0, 0.0, 0.0));
        world.attach_volume(obj, CollisionVolume::sphere(1.0)).unwrap();
        world.attach_motion(obj, MotionParams::new()).unwrap();
        let query: Shape = crate::geometry::Sphere::new(Vec3::zero(), 2.0).into();
        assert_eq!(world.overlap(&query).len(), 1);

        world.remove_object(obj);
        assert!(world.overlap(&query).is_empty());
        // the registry still remembers it until the next step
        assert_eq!(world.registry().len(), 1);
        world.step(world.params().fixed_dt);
        assert!(world.registry().is_empty());
    }

    #[test]
    fn update_runs_whole_steps() {
        let params = PhysicsParams::default().with_fixed_dt(0.25);
        let mut world = PhysicsWorld::new(params).unwrap();
        let obj = world.insert_object(at(0.0, 0.0, 0.0));
        let motion = world
            .attach_motion(obj, MotionParams::new().with_drag(0.0))
            .unwrap();

        assert_eq!(world.update(0.125), 0);
        assert_eq!(world.get_motion(motion).unwrap().velocity(), Vec3::zero());
        assert_eq!(world.update(0.125), 1);
        let v = world.get_motion(motion).unwrap().velocity();
        assert!((v.y + 9.81 * 0.25).abs() < 1e-12);
    }
}
