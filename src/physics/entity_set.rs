use super::{CollisionVolume, Motion};
use crate::math::Transform;

use thunderdome as td;

macro_rules! arena_key {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub struct $name(pub(crate) td::Index);

        impl $name {
            /// Get the underlying [`thunderdome::Index`][thunderdome::Index] of this key.
            /// Useful for creating your own mappings from physics objects to other things
            /// such as [`hecs`][hecs] entities.
            #[inline]
            pub fn index(&self) -> td::Index {
                self.0
            }
        }

        // arbitrary but stable order, used to keep registry lists sorted
        impl PartialOrd for $name {
            #[inline]
            fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
                Some(self.cmp(other))
            }
        }

        impl Ord for $name {
            #[inline]
            fn cmp(&self, other: &Self) -> std::cmp::Ordering {
                self.0.to_bits().cmp(&other.0.to_bits())
            }
        }
    };
}

arena_key!(
    /// Key type to look up a simulated object, i.e. something with a transform
    /// that collision volumes and motion can be attached to.
    ObjectKey
);
arena_key!(
    /// Key type to look up a collision volume attached to an object.
    VolumeKey
);
arena_key!(
    /// Key type to look up the motion state of a dynamic object.
    MotionKey
);

/// Storage for every object in the physics world along with
/// the collision volumes and motions attached to them.
///
/// Keys are generation-checked, so a key to something that was removed
/// just returns `None` instead of something else that took its place.
#[derive(Default)]
pub struct EntitySet {
    pub(super) objects: td::Arena<Transform>,
    pub(super) volumes: td::Arena<CollisionVolume>,
    // owners are stored at the same index as the thing they own
    pub(super) volume_owners: td::Arena<ObjectKey>,
    pub(super) motions: td::Arena<Motion>,
    pub(super) motion_owners: td::Arena<ObjectKey>,
}

impl EntitySet {
    #[inline]
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Access the transform of an object, if it still exists.
    #[inline]
    pub fn get_transform(&self, object: ObjectKey) -> Option<&Transform> {
        self.objects.get(object.0)
    }

    /// Mutably access the transform of an object, if it still exists.
    #[inline]
    pub fn get_transform_mut(&mut self, object: ObjectKey) -> Option<&mut Transform> {
        self.objects.get_mut(object.0)
    }

    #[inline]
    pub fn get_volume(&self, volume: VolumeKey) -> Option<&CollisionVolume> {
        self.volumes.get(volume.0)
    }

    #[inline]
    pub fn get_volume_mut(&mut self, volume: VolumeKey) -> Option<&mut CollisionVolume> {
        self.volumes.get_mut(volume.0)
    }

    #[inline]
    pub fn get_motion(&self, motion: MotionKey) -> Option<&Motion> {
        self.motions.get(motion.0)
    }

    #[inline]
    pub fn get_motion_mut(&mut self, motion: MotionKey) -> Option<&mut Motion> {
        self.motions.get_mut(motion.0)
    }

    /// The object a collision volume is attached to, if both still exist.
    #[inline]
    pub fn volume_owner(&self, volume: VolumeKey) -> Option<ObjectKey> {
        self.volume_owners
            .get(volume.0)
            .copied()
            .filter(|o| self.objects.contains(o.0))
    }

    /// The object a motion is attached to, if both still exist.
    #[inline]
    pub fn motion_owner(&self, motion: MotionKey) -> Option<ObjectKey> {
        self.motion_owners
            .get(motion.0)
            .copied()
            .filter(|o| self.objects.contains(o.0))
    }

    /// Look up a volume together with its owner's transform, if both still exist.
    #[inline]
    pub fn get_volume_with_transform(
        &self,
        volume: VolumeKey,
    ) -> Option<(&CollisionVolume, &Transform)> {
        let vol = self.volumes.get(volume.0)?;
        let owner = self.volume_owners.get(volume.0)?;
        let tr = self.objects.get(owner.0)?;
        Some((vol, tr))
    }

    #[inline]
    pub fn contains_object(&self, object: ObjectKey) -> bool {
        self.objects.contains(object.0)
    }

    #[inline]
    pub fn contains_volume(&self, volume: VolumeKey) -> bool {
        self.volumes.contains(volume.0)
    }

    #[inline]
    pub fn contains_motion(&self, motion: MotionKey) -> bool {
        self.motions.contains(motion.0)
    }

    /// Iterate over the keys of every motion, in key order.
    pub fn motion_keys(&self) -> Vec<MotionKey> {
        let mut keys: Vec<MotionKey> = self.motions.iter().map(|(k, _)| MotionKey(k)).collect();
        keys.sort();
        keys
    }

    pub(super) fn insert_object(&mut self, transform: Transform) -> ObjectKey {
        ObjectKey(self.objects.insert(transform))
    }

    pub(super) fn insert_volume(&mut self, owner: ObjectKey, volume: CollisionVolume) -> VolumeKey {
        let key = self.volumes.insert(volume);
        self.volume_owners.insert_at(key, owner);
        VolumeKey(key)
    }

    pub(super) fn insert_motion(&mut self, owner: ObjectKey, motion: Motion) -> MotionKey {
        let key = self.motions.insert(motion);
        self.motion_owners.insert_at(key, owner);
        MotionKey(key)
    }

    /// Remove an object along with every volume and motion attached to it.
    pub(super) fn remove_object(&mut self, object: ObjectKey) -> Option<Transform> {
        let transform = self.objects.remove(object.0)?;
        let volume_owners = &mut self.volume_owners;
        self.volumes.retain(|k, _| {
            if volume_owners.get(k) == Some(&object) {
                volume_owners.remove(k);
                false
            } else {
                true
            }
        });
        let motion_owners = &mut self.motion_owners;
        self.motions.retain(|k, _| {
            if motion_owners.get(k) == Some(&object) {
                motion_owners.remove(k);
                false
            } else {
                true
            }
        });
        Some(transform)
    }

    pub(super) fn remove_volume(&mut self, volume: VolumeKey) -> Option<CollisionVolume> {
        self.volume_owners.remove(volume.0);
        self.volumes.remove(volume.0)
    }

    pub(super) fn remove_motion(&mut self, motion: MotionKey) -> Option<Motion> {
        self.motion_owners.remove(motion.0);
        self.motions.remove(motion.0)
    }

    pub(super) fn clear(&mut self) {
        self.objects.clear();
        self.volumes.clear();
        self.volume_owners.clear();
        self.motions.clear();
        self.motion_owners.clear();
    }
}
