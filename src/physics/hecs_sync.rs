use crate::{
    math::Transform,
    physics::{
        CollisionVolume, MotionKey, MotionParams, ObjectKey, PhysicsError, PhysicsWorld, VolumeKey,
    },
};

use std::collections::HashMap;
use thunderdome as td;

#[derive(Clone, Copy, Debug)]
pub struct HecsSyncOptions {
    pub hecs_to_physics: bool,
    pub physics_to_hecs: bool,
    pub autodelete: bool,
}

impl HecsSyncOptions {
    #[inline]
    pub fn both_ways() -> Self {
        Self {
            hecs_to_physics: true,
            physics_to_hecs: true,
            autodelete: true,
        }
    }

    #[inline]
    pub fn hecs_to_physics_only() -> Self {
        Self {
            hecs_to_physics: true,
            physics_to_hecs: false,
            autodelete: true,
        }
    }

    #[inline]
    pub fn physics_to_hecs_only() -> Self {
        Self {
            hecs_to_physics: false,
            physics_to_hecs: true,
            autodelete: false,
        }
    }

    #[inline]
    pub fn do_not_sync() -> Self {
        Self {
            hecs_to_physics: false,
            physics_to_hecs: false,
            autodelete: false,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct SyncedEntity {
    entity: hecs::Entity,
    volume: Option<VolumeKey>,
    motion: Option<MotionKey>,
    opts: HecsSyncOptions,
}

/// Automatically syncs information between a [`hecs`][hecs] world
/// and a [`PhysicsWorld`][super::PhysicsWorld].
///
/// Each synced entity is one physics object. Its [`Transform`] component
/// is the object's transform, a [`CollisionVolume`] component gives it a volume
/// and a [`MotionParams`] component makes it dynamic.
/// Those components can be added and removed at any time and in any order;
/// the physics object follows along on the next sync.
#[derive(Default, Debug)]
pub struct HecsSync {
    /// If set, automatically uses these options to register all hecs entities
    /// with a [`Transform`] and a [`CollisionVolume`] or [`MotionParams`]
    /// that haven't been registered manually. None by default.
    pub default_opts: Option<HecsSyncOptions>,
    object_entity_map: td::Arena<SyncedEntity>,
    entity_objects: HashMap<hecs::Entity, ObjectKey>,
}

impl HecsSync {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn new_autosync(opts: HecsSyncOptions) -> Self {
        Self {
            default_opts: Some(opts),
            ..Self::default()
        }
    }

    /// The physics object created for an entity, if it's synced.
    #[inline]
    pub fn object_of(&self, entity: hecs::Entity) -> Option<ObjectKey> {
        self.entity_objects.get(&entity).copied()
    }

    /// The entity a physics object was created for, if it's synced.
    #[inline]
    pub fn entity_of(&self, object: ObjectKey) -> Option<hecs::Entity> {
        self.object_entity_map.get(object.0).map(|s| s.entity)
    }

    /// Create a physics object for an entity and start syncing it.
    /// The entity must have a [`Transform`] component.
    ///
    /// Registering an entity twice returns the existing object.
    pub fn register(
        &mut self,
        physics: &mut PhysicsWorld,
        hecs_world: &hecs::World,
        entity: hecs::Entity,
        opts: HecsSyncOptions,
    ) -> Result<ObjectKey, PhysicsError> {
        if let Some(existing) = self.object_of(entity) {
            return Ok(existing);
        }
        let transform = *hecs_world
            .get::<&Transform>(entity)
            .map_err(|_| PhysicsError::EntityWithoutTransform)?;
        let object = physics.insert_object(transform);
        let mut synced = SyncedEntity {
            entity,
            volume: None,
            motion: None,
            opts,
        };
        sync_components(physics, hecs_world, object, &mut synced);
        self.object_entity_map.insert_at(object.0, synced);
        self.entity_objects.insert(entity, object);
        Ok(object)
    }

    /// Stop syncing an entity and remove its physics object.
    pub fn unregister(&mut self, physics: &mut PhysicsWorld, entity: hecs::Entity) {
        let Some(object) = self.entity_objects.remove(&entity) else {
            return;
        };
        self.object_entity_map.remove(object.0);
        physics.remove_object(object);
    }

    /// Sync data from a hecs world to the physics world.
    /// Call before [`PhysicsWorld::step`][PhysicsWorld::step].
    pub fn sync_hecs_to_physics(
        &mut self,
        physics: &mut PhysicsWorld,
        hecs_world: &mut hecs::World,
    ) {
        // auto-register new entities
        if let Some(opts) = self.default_opts {
            let new_entities: Vec<hecs::Entity> = hecs_world
                .query_mut::<(&Transform, hecs::Or<&CollisionVolume, &MotionParams>)>()
                .into_iter()
                .map(|(entity, _)| entity)
                .filter(|entity| !self.entity_objects.contains_key(entity))
                .collect();
            for entity in new_entities {
                if let Err(err) = self.register(physics, hecs_world, entity, opts) {
                    log::warn!("Failed to register entity {:?}: {}", entity, err);
                }
            }
        }

        let hecs_world = &*hecs_world;
        let entity_objects = &mut self.entity_objects;
        self.object_entity_map.retain(|object, synced| {
            let object = ObjectKey(object);
            // auto-delete objects for entities that don't exist anymore,
            // using the surrounding `retain` to also delete them from this map
            if synced.opts.autodelete && !hecs_world.contains(synced.entity) {
                physics.remove_object(object);
                entity_objects.remove(&synced.entity);
                return false;
            }
            // removed directly from the physics world
            if !physics.entity_set.contains_object(object) {
                entity_objects.remove(&synced.entity);
                return false;
            }
            sync_components(physics, hecs_world, object, synced);
            if synced.opts.hecs_to_physics {
                let Ok(transform) = hecs_world.get::<&Transform>(synced.entity) else {
                    return true;
                };
                if let Some(physics_tr) = physics.get_transform_mut(object) {
                    *physics_tr = *transform;
                }
            }
            true
        });
    }

    /// Sync data from a physics world to a hecs world.
    /// Call after [`PhysicsWorld::step`][PhysicsWorld::step].
    pub fn sync_physics_to_hecs(&self, physics: &PhysicsWorld, hecs_world: &mut hecs::World) {
        for (object, synced) in self.object_entity_map.iter() {
            if !synced.opts.physics_to_hecs {
                continue;
            }
            let Some(physics_tr) = physics.get_transform(ObjectKey(object)) else {
                continue;
            };
            let Ok(transform) = hecs_world.query_one_mut::<&mut Transform>(synced.entity) else {
                continue;
            };
            *transform = *physics_tr;
        }
    }
}

/// Attach or detach the volume and motion of an object
/// to match the components its entity currently has.
fn sync_components(
    physics: &mut PhysicsWorld,
    hecs_world: &hecs::World,
    object: ObjectKey,
    synced: &mut SyncedEntity,
) {
    // keys detached directly from the physics world are forgotten,
    // so a component that's still there gets attached again
    if let Some(key) = synced.volume {
        if !physics.entity_set.contains_volume(key) {
            synced.volume = None;
        }
    }
    if let Some(key) = synced.motion {
        if !physics.entity_set.contains_motion(key) {
            synced.motion = None;
        }
    }

    let volume_comp = hecs_world
        .get::<&CollisionVolume>(synced.entity)
        .ok()
        .map(|v| *v);
    match (volume_comp, synced.volume) {
        (Some(vol), None) => match physics.attach_volume(object, vol) {
            Ok(key) => synced.volume = Some(key),
            Err(err) => log::warn!("Failed to attach volume for {:?}: {}", synced.entity, err),
        },
        (Some(vol), Some(key)) => {
            if let Some(existing) = physics.entity_set.get_volume_mut(key) {
                *existing = vol;
            }
        }
        (None, Some(key)) => {
            if let Err(err) = physics.detach_volume(key) {
                log::debug!("Volume of {:?} was already gone: {}", synced.entity, err);
            }
            synced.volume = None;
        }
        (None, None) => {}
    }

    let motion_comp = hecs_world
        .get::<&MotionParams>(synced.entity)
        .ok()
        .map(|p| *p);
    match (motion_comp, synced.motion) {
        (Some(params), None) => match physics.attach_motion(object, params) {
            Ok(key) => synced.motion = Some(key),
            Err(err) => log::warn!("Failed to attach motion for {:?}: {}", synced.entity, err),
        },
        (None, Some(key)) => {
            if let Err(err) = physics.detach_motion(key) {
                log::debug!("Motion of {:?} was already gone: {}", synced.entity, err);
            }
            synced.motion = None;
        }
        // params only describe the initial state, the running motion is left alone
        (Some(_), Some(_)) | (None, None) => {}
    }
}
