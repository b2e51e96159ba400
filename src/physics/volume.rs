use crate::{
    geometry::{Aabb, Obb, Shape, Sphere},
    math::{Pose, Rotor3, Transform, Vec3},
};

/// The local shape of a collision volume, before it's placed in the world.
///
/// Sizes are in the owning object's local units
/// and get multiplied by the object's scale when the world shape is built.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde-types", derive(serde::Serialize, serde::Deserialize))]
pub enum VolumeShape {
    Sphere { radius: f64 },
    /// A box that stays aligned with the world axes no matter how its object rotates.
    AxisAlignedBox { extents: Vec3 },
    /// A box that rotates with its object.
    OrientedBox { extents: Vec3 },
}

/// A collision volume gives an object a shape that other objects can hit.
///
/// The volume doesn't cache its world-space shape;
/// it's rebuilt from the owner's current transform every time it's needed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CollisionVolume {
    pub shape: VolumeShape,
    /// Placement of the shape relative to the owning object.
    pub offset: Pose,
}

impl CollisionVolume {
    #[inline]
    pub fn new(shape: VolumeShape) -> Self {
        Self {
            shape,
            offset: Pose::identity(),
        }
    }

    #[inline]
    pub fn sphere(radius: f64) -> Self {
        Self::new(VolumeShape::Sphere { radius })
    }

    #[inline]
    pub fn aabb(extents: Vec3) -> Self {
        Self::new(VolumeShape::AxisAlignedBox { extents })
    }

    #[inline]
    pub fn obb(extents: Vec3) -> Self {
        Self::new(VolumeShape::OrientedBox { extents })
    }

    /// Set the offset from the owning object in a builder-like chain.
    #[inline]
    pub fn with_offset(mut self, offset: Pose) -> Self {
        self.offset = offset;
        self
    }

    /// Build the world-space shape of this volume for an owner with the given transform.
    pub fn build_world_shape(&self, owner: &Transform) -> Shape {
        self.build_world_shape_with_rotation(owner, owner.rotation)
    }

    /// Build the world-space shape as it would be if the owner had a different rotation.
    /// Used to try out rotations before committing to them.
    pub fn build_world_shape_with_rotation(&self, owner: &Transform, rotation: Rotor3) -> Shape {
        self.build_world_shape_at(owner.translation, rotation, owner.scale)
    }

    /// Build the world-space shape for an owner at an arbitrary position and rotation.
    pub fn build_world_shape_at(&self, position: Vec3, rotation: Rotor3, scale: f64) -> Shape {
        let center = position + rotation * (self.offset.translation * scale);
        let shape_rotation = rotation * self.offset.rotation;
        match self.shape {
            VolumeShape::Sphere { radius } => Sphere::new(center, radius * scale).into(),
            VolumeShape::AxisAlignedBox { extents } => Aabb::new(center, extents * scale).into(),
            VolumeShape::OrientedBox { extents } => {
                Obb::new(center, shape_rotation, extents * scale).into()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math as m;

    #[test]
    fn world_shape_follows_owner() {
        let owner = Transform::new(
            Vec3::new(1.0, 2.0, 3.0),
            m::rotor_from_scaled_axis(Vec3::new(0.0, 0.0, std::f64::consts::FRAC_PI_2)),
            2.0,
        );
        let vol = CollisionVolume::obb(Vec3::new(1.0, 0.5, 0.5))
            .with_offset(Pose::new(Vec3::new(1.0, 0.0, 0.0), Rotor3::identity()));

        match vol.build_world_shape(&owner) {
            Shape::Obb(b) => {
                // offset rotated onto the y axis and doubled
                assert!((b.center - Vec3::new(1.0, 4.0, 3.0)).mag() < 1e-9);
                assert_eq!(b.extents, Vec3::new(2.0, 1.0, 1.0));
                assert!((b.axes()[0] - Vec3::unit_y()).mag() < 1e-9);
            }
            other => panic!("expected an obb, got {:?}", other),
        }

        // aabbs ignore rotation
        let aabb = CollisionVolume::aabb(Vec3::one()).build_world_shape(&owner);
        assert_eq!(
            aabb,
            Shape::Aabb(Aabb::new(Vec3::new(1.0, 2.0, 3.0), Vec3::broadcast(2.0)))
        );
    }
}
