//! The broadphase: every registered collision volume, split into static and dynamic
//! ones depending on whether the owning object moves.

use super::{EntitySet, MotionKey, ObjectKey, VolumeKey};
use crate::geometry::{Intersection, Overlap, Shape, Sweep};
use crate::math::Vec3;

use std::{collections::BTreeMap, ops::Range};

/// Whether an object's volumes can move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Classification {
    /// Has at least one collision volume but no motion.
    Static,
    /// Has a motion, and possibly collision volumes.
    Dynamic,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct StaticEntry {
    owner: ObjectKey,
    volume: VolumeKey,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct DynamicEntry {
    owner: ObjectKey,
    /// None for an object that has a motion but no volume yet.
    volume: Option<VolumeKey>,
    motion: MotionKey,
}

/// Result of a registry sweep.
#[derive(Clone, Copy, Debug)]
pub struct SweepHit {
    pub intersection: Intersection,
    /// The volume that was hit.
    pub volume: VolumeKey,
    /// Motion of the hit volume's owner, if it's dynamic.
    pub motion: Option<MotionKey>,
}

/// Keeps track of every collision volume in the world and answers
/// overlap and sweep queries against all of them.
///
/// The registry holds keys, not the volumes themselves.
/// Keys that have gone stale (their target was removed from the
/// [`EntitySet`][super::EntitySet]) are skipped during queries
/// and cleaned up by removals and [`purge_stale`][Self::purge_stale].
///
/// Both entry lists are kept sorted by owner so that all entries
/// belonging to one object can be found with a binary search.
#[derive(Default, Debug)]
pub struct Registry {
    statics: Vec<StaticEntry>,
    dynamics: Vec<DynamicEntry>,
    status: BTreeMap<ObjectKey, Classification>,
}

/// Range of entries belonging to `owner` in a list sorted by owner.
fn owner_range<T>(
    entries: &[T],
    owner: ObjectKey,
    owner_of: impl Fn(&T) -> ObjectKey,
) -> Range<usize> {
    let start = entries.partition_point(|e| owner_of(e) < owner);
    let end = start + entries[start..].partition_point(|e| owner_of(e) == owner);
    start..end
}

impl Registry {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    fn static_range(&self, owner: ObjectKey) -> Range<usize> {
        owner_range(&self.statics, owner, |e| e.owner)
    }

    #[inline]
    fn dynamic_range(&self, owner: ObjectKey) -> Range<usize> {
        owner_range(&self.dynamics, owner, |e| e.owner)
    }

    /// Whether an object is currently static, dynamic, or unknown to the registry (None).
    #[inline]
    pub fn classification(&self, owner: ObjectKey) -> Option<Classification> {
        self.status.get(&owner).copied()
    }

    /// Every volume registered for an object.
    pub fn volumes_of(&self, owner: ObjectKey) -> Vec<VolumeKey> {
        match self.classification(owner) {
            Some(Classification::Static) => self.statics[self.static_range(owner)]
                .iter()
                .map(|e| e.volume)
                .collect(),
            Some(Classification::Dynamic) => self.dynamics[self.dynamic_range(owner)]
                .iter()
                .filter_map(|e| e.volume)
                .collect(),
            None => Vec::new(),
        }
    }

    /// The motion registered for an object, if it's dynamic.
    pub fn motion_of(&self, owner: ObjectKey) -> Option<MotionKey> {
        self.dynamics[self.dynamic_range(owner)]
            .first()
            .map(|e| e.motion)
    }

    /// Total number of entries, placeholders included.
    #[inline]
    pub fn len(&self) -> usize {
        self.statics.len() + self.dynamics.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn static_count(&self) -> usize {
        self.statics.len()
    }

    #[inline]
    pub fn dynamic_count(&self) -> usize {
        self.dynamics.len()
    }

    /// Register a volume belonging to `owner`.
    ///
    /// If the owner is dynamic, the volume is paired with its motion,
    /// filling in the placeholder entry if there is one.
    pub fn add_volume(&mut self, owner: ObjectKey, volume: VolumeKey) {
        if self.classification(owner) == Some(Classification::Dynamic) {
            let range = self.dynamic_range(owner);
            if let Some(placeholder) = self.dynamics[range.clone()]
                .iter_mut()
                .find(|e| e.volume.is_none())
            {
                placeholder.volume = Some(volume);
                return;
            }
            if let Some(motion) = self.dynamics[range.clone()].first().map(|e| e.motion) {
                self.dynamics.insert(
                    range.end,
                    DynamicEntry {
                        owner,
                        volume: Some(volume),
                        motion,
                    },
                );
                return;
            }
            log::warn!(
                "Dynamic object {:?} had no registry entries, treating as static",
                owner
            );
        }

        let range = self.static_range(owner);
        self.statics.insert(range.end, StaticEntry { owner, volume });
        self.status.insert(owner, Classification::Static);
    }

    /// Unregister a volume. Returns whether it was registered.
    ///
    /// Stale entries of the same owner are purged along the way.
    /// A dynamic object that loses its last volume keeps a placeholder entry
    /// so that it stays dynamic.
    pub fn remove_volume(
        &mut self,
        owner: ObjectKey,
        volume: VolumeKey,
        entities: &EntitySet,
    ) -> bool {
        match self.classification(owner) {
            Some(Classification::Static) => {
                let range = self.static_range(owner);
                let start = range.start;
                let found = self.statics[range.clone()]
                    .iter()
                    .any(|e| e.volume == volume);
                let kept: Vec<StaticEntry> = self
                    .statics
                    .drain(range)
                    .filter(|e| e.volume != volume && entities.contains_volume(e.volume))
                    .collect();
                if kept.is_empty() {
                    self.status.remove(&owner);
                }
                self.statics.splice(start..start, kept);
                found
            }
            Some(Classification::Dynamic) => {
                let range = self.dynamic_range(owner);
                let start = range.start;
                let entries: Vec<DynamicEntry> = self.dynamics.drain(range).collect();
                let Some(motion) = entries.first().map(|e| e.motion) else {
                    self.status.remove(&owner);
                    return false;
                };
                let found = entries.iter().any(|e| e.volume == Some(volume));
                let mut kept: Vec<DynamicEntry> = entries
                    .into_iter()
                    .filter(|e| {
                        matches!(e.volume, Some(v) if v != volume && entities.contains_volume(v))
                    })
                    .collect();
                if kept.is_empty() {
                    kept.push(DynamicEntry {
                        owner,
                        volume: None,
                        motion,
                    });
                }
                self.dynamics.splice(start..start, kept);
                found
            }
            None => false,
        }
    }

    /// Register a motion for `owner`, making it dynamic.
    ///
    /// Every static volume of the owner moves over to the dynamic list.
    /// An owner without volumes gets a placeholder entry.
    pub fn add_motion(&mut self, owner: ObjectKey, motion: MotionKey) {
        if self.classification(owner) == Some(Classification::Dynamic) {
            let range = self.dynamic_range(owner);
            for e in &mut self.dynamics[range] {
                e.motion = motion;
            }
            return;
        }

        let static_range = self.static_range(owner);
        let migrated: Vec<DynamicEntry> = self
            .statics
            .drain(static_range)
            .map(|e| DynamicEntry {
                owner,
                volume: Some(e.volume),
                motion,
            })
            .collect();
        let insert_at = self.dynamic_range(owner).end;
        if migrated.is_empty() {
            self.dynamics.insert(
                insert_at,
                DynamicEntry {
                    owner,
                    volume: None,
                    motion,
                },
            );
        } else {
            self.dynamics.splice(insert_at..insert_at, migrated);
        }
        self.status.insert(owner, Classification::Dynamic);
    }

    /// Unregister a motion, turning its owner back into a static object
    /// (or forgetting it entirely if it has no volumes). Returns whether it was registered.
    pub fn remove_motion(&mut self, owner: ObjectKey, motion: MotionKey) -> bool {
        let range = self.dynamic_range(owner);
        if range.is_empty() || self.dynamics[range.start].motion != motion {
            return false;
        }

        let volumes: Vec<VolumeKey> = self
            .dynamics
            .drain(range)
            .filter_map(|e| e.volume)
            .collect();
        if volumes.is_empty() {
            self.status.remove(&owner);
        } else {
            let insert_at = self.static_range(owner).end;
            self.statics.splice(
                insert_at..insert_at,
                volumes.into_iter().map(|volume| StaticEntry { owner, volume }),
            );
            self.status.insert(owner, Classification::Static);
        }
        true
    }

    /// Drop entries whose volume, motion or owner no longer exists,
    /// reclassifying owners as needed.
    pub fn purge_stale(&mut self, entities: &EntitySet) {
        let _span = tracy_span!("purge stale registry entries", "purge_stale");

        self.statics.retain(|e| {
            entities.contains_object(e.owner) && entities.contains_volume(e.volume)
        });

        let mut demoted = Vec::new();
        self.dynamics.retain_mut(|e| {
            if !entities.contains_object(e.owner) {
                return false;
            }
            if e.volume.map_or(false, |v| !entities.contains_volume(v)) {
                e.volume = None;
            }
            if !entities.contains_motion(e.motion) {
                if let Some(volume) = e.volume {
                    demoted.push(StaticEntry {
                        owner: e.owner,
                        volume,
                    });
                }
                return false;
            }
            true
        });
        if !demoted.is_empty() {
            self.statics.extend(demoted);
            // stable, so registration order within an owner is preserved
            self.statics.sort_by_key(|e| e.owner);
        }

        // placeholders are only needed when a dynamic owner has nothing else
        let mut idx = 0;
        while idx < self.dynamics.len() {
            let range = self.dynamic_range(self.dynamics[idx].owner);
            let has_volume = self.dynamics[range.clone()]
                .iter()
                .any(|e| e.volume.is_some());
            let mut end = range.end;
            let mut i = range.start;
            let mut kept_placeholder = false;
            while i < end {
                let is_placeholder = self.dynamics[i].volume.is_none();
                if is_placeholder && (has_volume || kept_placeholder) {
                    self.dynamics.remove(i);
                    end -= 1;
                } else {
                    kept_placeholder |= is_placeholder;
                    i += 1;
                }
            }
            idx = end;
        }

        self.status.clear();
        for e in &self.statics {
            self.status.insert(e.owner, Classification::Static);
        }
        for e in &self.dynamics {
            self.status.insert(e.owner, Classification::Dynamic);
        }
    }

    /// Remove everything.
    pub fn clear(&mut self) {
        self.statics.clear();
        self.dynamics.clear();
        self.status.clear();
    }

    /// Iterate over every live volume with its world shape, statics first.
    fn live_shapes<'a>(
        &'a self,
        entities: &'a EntitySet,
    ) -> impl Iterator<Item = (VolumeKey, Option<MotionKey>, Shape)> + 'a {
        let statics = self.statics.iter().map(|e| (e.volume, None));
        let dynamics = self
            .dynamics
            .iter()
            .filter_map(|e| Some((e.volume?, Some(e.motion))));
        statics.chain(dynamics).filter_map(move |(volume, motion)| {
            let (vol, transform) = entities.get_volume_with_transform(volume)?;
            let motion = motion.filter(|m| entities.contains_motion(*m));
            Some((volume, motion, vol.build_world_shape(transform)))
        })
    }

    /// Every registered volume that overlaps the given shape.
    ///
    /// If the shape belongs to a registered volume, that volume will be
    /// in the result too; filter it out by key if needed.
    pub fn overlap(&self, shape: &Shape, entities: &EntitySet) -> Vec<VolumeKey> {
        let _span = tracy_span!("registry overlap", "overlap");
        self.live_shapes(entities)
            .filter(|(_, _, registered)| registered.overlaps(shape))
            .map(|(volume, _, _)| volume)
            .collect()
    }

    /// Sweep a shape by `movement` against every registered volume
    /// not in `ignore`, returning the earliest hit.
    pub fn sweep(
        &self,
        shape: &Shape,
        movement: Vec3,
        ignore: &[VolumeKey],
        entities: &EntitySet,
    ) -> Option<SweepHit> {
        let _span = tracy_span!("registry sweep", "sweep");
        let mut earliest: Option<SweepHit> = None;
        for (volume, motion, registered) in self.live_shapes(entities) {
            if ignore.contains(&volume) {
                continue;
            }
            let Some(intersection) = registered.sweep(shape, movement) else {
                continue;
            };
            if earliest.map_or(true, |e| intersection.t < e.intersection.t) {
                earliest = Some(SweepHit {
                    intersection,
                    volume,
                    motion,
                });
            }
        }
        if let Some(hit) = &earliest {
            log::trace!("sweep hit {:?} at t = {}", hit.volume, hit.intersection.t);
        }
        earliest
    }
}
