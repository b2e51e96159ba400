//! Types, aliases and helper operations for doing math with `ultraviolet`.
pub use ultraviolet as uv;

/// A Pose has a rotation and a translation, no scaling.
///
/// Used for the local offset of a collision volume from its owning object.
pub type Pose = uv::DIsometry3;
/// A Transform is a [`Pose`][self::Pose] plus a uniform scaling.
///
/// This is the world transform of a simulated object.
/// Scaling is applied to collision volumes when world shapes are built,
/// the physics itself never sees it.
pub type Transform = uv::DSimilarity3;
pub type Vec3 = uv::DVec3;
pub type Rotor3 = uv::DRotor3;

/// Squared length under which a vector is considered to have no direction.
pub const DIRECTION_EPSILON_SQ: f64 = 1e-18;

/// A wrapper type to indicate a vector should always be normalized.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Unit<T>(T);

impl Unit<Vec3> {
    pub fn new_normalize(v: Vec3) -> Self {
        Unit(v.normalized())
    }

    /// Normalize a vector, or return None if it's too short to have a meaningful direction.
    pub fn try_new_normalize(v: Vec3) -> Option<Self> {
        let mag_sq = v.mag_sq();
        if mag_sq <= DIRECTION_EPSILON_SQ || !mag_sq.is_finite() {
            None
        } else {
            Some(Unit(v / mag_sq.sqrt()))
        }
    }

    pub const fn new_unchecked(v: Vec3) -> Self {
        Unit(v)
    }

    pub fn unit_x() -> Self {
        Unit(Vec3::unit_x())
    }

    pub fn unit_y() -> Self {
        Unit(Vec3::unit_y())
    }

    pub fn unit_z() -> Self {
        Unit(Vec3::unit_z())
    }

    /// The unit vector along one of the coordinate axes (0 = x, 1 = y, 2 = z).
    pub fn axis(idx: usize) -> Self {
        Unit(axis_vec(idx))
    }

    #[inline]
    pub fn into_inner(self) -> Vec3 {
        self.0
    }
}

impl std::ops::Mul<Unit<Vec3>> for Rotor3 {
    type Output = Unit<Vec3>;

    fn mul(self, rhs: Unit<Vec3>) -> Self::Output {
        Unit(self * rhs.0)
    }
}

impl<T> std::ops::Deref for Unit<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> std::ops::Neg for Unit<T>
where
    T: std::ops::Neg,
{
    type Output = Unit<<T as std::ops::Neg>::Output>;

    fn neg(self) -> Self::Output {
        Unit(-self.0)
    }
}

// scalar utils

#[inline]
pub fn sqr(x: f64) -> f64 {
    x * x
}

/// Like `f64::signum`, except zero maps to zero.
#[inline]
pub fn sign(x: f64) -> f64 {
    if x == 0.0 {
        0.0
    } else {
        x.signum()
    }
}

/// Sign of `x`, treating anything within `tolerance` of zero as zero.
#[inline]
pub fn sign_beyond(x: f64, tolerance: f64) -> f64 {
    if x.abs() <= tolerance {
        0.0
    } else {
        x.signum()
    }
}

// Vec3 utils

/// The vector along one of the coordinate axes (0 = x, 1 = y, 2 = z).
#[inline]
pub fn axis_vec(idx: usize) -> Vec3 {
    let mut v = Vec3::zero();
    v[idx] = 1.0;
    v
}

/// Component-wise multiplication.
#[inline]
pub fn mul_elem(a: Vec3, b: Vec3) -> Vec3 {
    Vec3::new(a.x * b.x, a.y * b.y, a.z * b.z)
}

// rotor utils

/// Exponential map from a rotation vector (axis scaled by angle in radians)
/// to a rotor. Rotation follows the right hand rule around the axis.
pub fn rotor_from_scaled_axis(v: Vec3) -> Rotor3 {
    let angle_sq = v.mag_sq();
    if angle_sq <= DIRECTION_EPSILON_SQ {
        return Rotor3::identity();
    }
    let angle = angle_sq.sqrt();
    let axis = v / angle;
    let (sin, cos) = (angle / 2.0).sin_cos();
    Rotor3::from_quaternion_array([axis.x * sin, axis.y * sin, axis.z * sin, cos]).normalized()
}

/// The world-space directions of a rotated frame's local x, y and z axes.
#[inline]
pub fn rotated_axes(rotation: Rotor3) -> [Vec3; 3] {
    [
        rotation * Vec3::unit_x(),
        rotation * Vec3::unit_y(),
        rotation * Vec3::unit_z(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn assert_vec_eq(a: Vec3, b: Vec3) {
        assert!((a - b).mag() < 1e-9, "{:?} != {:?}", a, b);
    }

    #[test]
    fn scaled_axis_rotation_follows_right_hand_rule() {
        let rot = rotor_from_scaled_axis(Vec3::new(0.0, 0.0, PI / 2.0));
        assert_vec_eq(rot * Vec3::unit_x(), Vec3::unit_y());
        assert_vec_eq(rot * Vec3::unit_y(), -Vec3::unit_x());

        let rot = rotor_from_scaled_axis(Vec3::new(PI / 2.0, 0.0, 0.0));
        assert_vec_eq(rot * Vec3::unit_y(), Vec3::unit_z());
    }

    #[test]
    fn zero_rotation_is_identity() {
        let rot = rotor_from_scaled_axis(Vec3::zero());
        assert_vec_eq(rot * Vec3::new(1.0, 2.0, 3.0), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn degenerate_vectors_have_no_direction() {
        assert!(Unit::try_new_normalize(Vec3::zero()).is_none());
        let tiny = Vec3::new(1e-12, 0.0, 0.0);
        assert!(Unit::try_new_normalize(tiny).is_none());
        let u = Unit::try_new_normalize(Vec3::new(0.0, 3.0, 4.0)).unwrap();
        assert_vec_eq(*u, Vec3::new(0.0, 0.6, 0.8));
    }

    #[test]
    fn sign_of_zero_is_zero() {
        assert_eq!(sign(0.0), 0.0);
        assert_eq!(sign(-0.0), 0.0);
        assert_eq!(sign(-3.0), -1.0);
        assert_eq!(sign(2.0), 1.0);
    }
}
