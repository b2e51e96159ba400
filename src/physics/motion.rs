use super::ParamsError;
use crate::math::{Unit, Vec3};

/// Rigid body state of a dynamic object.
///
/// Created through [`MotionParams`] when attached to an object
/// with [`PhysicsWorld::attach_motion`][super::PhysicsWorld::attach_motion].
/// Rotational inertia is approximated as `mass` around every axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Motion {
    velocity: Vec3,
    angular_velocity: Vec3,
    mass: f64,
    /// Coefficient of restitution, 0 for fully inelastic and 1 for fully elastic bounces.
    pub restitution: f64,
    /// Linear drag coefficient. Drag force is `-drag * velocity`.
    pub drag: f64,
    /// Fraction of angular velocity lost every step.
    pub angular_drag: f64,
    /// Acceleration applied every step, in metres per second squared.
    pub gravity: Vec3,
    /// Coefficient of friction against surfaces the object rests on.
    pub friction: f64,
}

impl Default for Motion {
    fn default() -> Self {
        Self {
            velocity: Vec3::zero(),
            angular_velocity: Vec3::zero(),
            mass: 10.0,
            restitution: 0.8,
            drag: 0.01,
            angular_drag: 0.01,
            gravity: Vec3::new(0.0, -9.81, 0.0),
            friction: 0.3,
        }
    }
}

impl Motion {
    /// Linear velocity in metres per second.
    #[inline]
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    #[inline]
    pub fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }

    /// Angular velocity as a rotation axis scaled by radians per second.
    #[inline]
    pub fn angular_velocity(&self) -> Vec3 {
        self.angular_velocity
    }

    #[inline]
    pub fn set_angular_velocity(&mut self, angular_velocity: Vec3) {
        self.angular_velocity = angular_velocity;
    }

    #[inline]
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Set the mass, which must be positive and finite.
    pub fn set_mass(&mut self, mass: f64) -> Result<(), ParamsError> {
        check_mass(mass)?;
        self.mass = mass;
        Ok(())
    }

    /// Get the velocity of a point offset from the center of mass.
    #[inline]
    pub fn point_velocity(&self, offset: Vec3) -> Vec3 {
        self.velocity + self.angular_velocity.cross(offset)
    }

    /// Restitution used when this object bounces off another.
    ///
    /// It is computed as the average of the two coefficients.
    #[inline]
    pub fn restitution_with(&self, other: &Self) -> f64 {
        (self.restitution + other.restitution) / 2.0
    }

    pub(super) fn apply(&mut self, change: VelocityChange) {
        self.velocity += change.linear;
        self.angular_velocity += change.angular;
    }

    pub(super) fn as_bounce_body(&self, offset: Vec3) -> BounceBody {
        BounceBody {
            velocity: self.velocity,
            angular_velocity: self.angular_velocity,
            mass: self.mass,
            offset,
        }
    }
}

fn check_mass(mass: f64) -> Result<(), ParamsError> {
    if mass > 0.0 && mass.is_finite() {
        Ok(())
    } else {
        Err(ParamsError::NonPositiveMass(mass))
    }
}

/// Builder for a [`Motion`], checked when the motion is attached to an object.
///
/// With the `serde-types` feature this doubles as a serializable description
/// of a dynamic object's physical properties.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde-types",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct MotionParams {
    pub velocity: Vec3,
    pub angular_velocity: Vec3,
    pub mass: f64,
    pub restitution: f64,
    pub drag: f64,
    pub angular_drag: f64,
    pub gravity: Vec3,
    pub friction: f64,
}

impl Default for MotionParams {
    fn default() -> Self {
        let m = Motion::default();
        Self {
            velocity: m.velocity,
            angular_velocity: m.angular_velocity,
            mass: m.mass,
            restitution: m.restitution,
            drag: m.drag,
            angular_drag: m.angular_drag,
            gravity: m.gravity,
            friction: m.friction,
        }
    }
}

impl MotionParams {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    #[inline]
    pub fn with_angular_velocity(mut self, angular_velocity: Vec3) -> Self {
        self.angular_velocity = angular_velocity;
        self
    }

    #[inline]
    pub fn with_mass(mut self, mass: f64) -> Self {
        self.mass = mass;
        self
    }

    #[inline]
    pub fn with_restitution(mut self, restitution: f64) -> Self {
        self.restitution = restitution;
        self
    }

    #[inline]
    pub fn with_drag(mut self, drag: f64) -> Self {
        self.drag = drag;
        self
    }

    #[inline]
    pub fn with_angular_drag(mut self, angular_drag: f64) -> Self {
        self.angular_drag = angular_drag;
        self
    }

    #[inline]
    pub fn with_gravity(mut self, gravity: Vec3) -> Self {
        self.gravity = gravity;
        self
    }

    #[inline]
    pub fn with_friction(mut self, friction: f64) -> Self {
        self.friction = friction;
        self
    }

    pub fn validate(&self) -> Result<(), ParamsError> {
        check_mass(self.mass)?;
        ParamsError::check_range("restitution", self.restitution, 0.0, 1.0)?;
        ParamsError::check_range("drag", self.drag, 0.0, 1.0)?;
        ParamsError::check_range("angular_drag", self.angular_drag, 0.0, 1.0)?;
        ParamsError::check_range("friction", self.friction, 0.0, f64::MAX)?;
        Ok(())
    }

    pub fn build(&self) -> Result<Motion, ParamsError> {
        self.validate()?;
        Ok(Motion {
            velocity: self.velocity,
            angular_velocity: self.angular_velocity,
            mass: self.mass,
            restitution: self.restitution,
            drag: self.drag,
            angular_drag: self.angular_drag,
            gravity: self.gravity,
            friction: self.friction,
        })
    }
}

/// One participant of a [`bounce`].
#[derive(Clone, Copy, Debug)]
pub struct BounceBody {
    pub velocity: Vec3,
    pub angular_velocity: Vec3,
    pub mass: f64,
    /// Contact point relative to the body's center of mass.
    pub offset: Vec3,
}

impl BounceBody {
    #[inline]
    fn contact_velocity(&self) -> Vec3 {
        self.velocity + self.angular_velocity.cross(self.offset)
    }

    /// Inverse of the mass felt along `normal` at the contact point.
    #[inline]
    fn inverse_effective_mass(&self, normal: Vec3) -> f64 {
        (1.0 + self.offset.cross(normal).mag_sq()) / self.mass
    }

    #[inline]
    fn velocity_change(&self, impulse: Vec3) -> VelocityChange {
        VelocityChange {
            linear: impulse / self.mass,
            angular: self.offset.cross(impulse) / self.mass,
        }
    }
}

/// Change in velocity caused by a [`bounce`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct VelocityChange {
    pub linear: Vec3,
    pub angular: Vec3,
}

impl VelocityChange {
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.linear == Vec3::zero() && self.angular == Vec3::zero()
    }
}

/// Resolve a collision between `body` and `other` with a single impulse.
///
/// `normal` points from the other body's surface towards `body`.
/// A missing `other` is an immovable surface.
/// Nothing happens unless the bodies are approaching each other at the contact point.
/// Returns the velocity changes of `body` and `other`, in that order.
pub fn bounce(
    normal: Vec3,
    restitution: f64,
    body: &BounceBody,
    other: Option<&BounceBody>,
) -> (VelocityChange, VelocityChange) {
    let Some(normal) = Unit::try_new_normalize(normal) else {
        return Default::default();
    };
    let normal = *normal;

    let mut relative_vel = body.contact_velocity();
    let mut inv_mass_sum = body.inverse_effective_mass(normal);
    if let Some(other) = other {
        relative_vel -= other.contact_velocity();
        inv_mass_sum += other.inverse_effective_mass(normal);
    }
    let normal_vel = relative_vel.dot(normal);
    if normal_vel >= 0.0 || inv_mass_sum <= 0.0 || !inv_mass_sum.is_finite() {
        return Default::default();
    }

    let impulse = normal * (-(1.0 + restitution) * normal_vel / inv_mass_sum);
    let own_change = body.velocity_change(impulse);
    let other_change = other.map_or_else(VelocityChange::default, |o| o.velocity_change(-impulse));
    (own_change, other_change)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinetic_energy(b: &BounceBody) -> f64 {
        0.5 * b.mass * (b.velocity.mag_sq() + b.angular_velocity.mag_sq())
    }

    fn applied(b: &BounceBody, c: VelocityChange) -> BounceBody {
        BounceBody {
            velocity: b.velocity + c.linear,
            angular_velocity: b.angular_velocity + c.angular,
            ..*b
        }
    }

    #[test]
    fn elastic_bounce_off_immovable_surface() {
        let body = BounceBody {
            velocity: Vec3::new(0.0, -5.0, 0.0),
            angular_velocity: Vec3::zero(),
            mass: 2.0,
            offset: Vec3::new(0.0, -1.0, 0.0),
        };
        let (change, other) = bounce(Vec3::unit_y(), 1.0, &body, None);
        assert!(other.is_zero());
        let after = applied(&body, change);
        assert!((after.velocity - Vec3::new(0.0, 5.0, 0.0)).mag() < 1e-12);
        assert!((after.velocity.mag() - body.velocity.mag()).abs() < 1e-12);

        // off-center hit: some of the energy goes into spin, none is lost
        let body = BounceBody {
            velocity: Vec3::new(1.0, -3.0, 0.0),
            offset: Vec3::new(1.0, -1.0, 0.0),
            ..body
        };
        let (change, _) = bounce(Vec3::unit_y(), 1.0, &body, None);
        let after = applied(&body, change);
        assert!(change.angular.mag() > 0.0);
        let energy_change = kinetic_energy(&after) - kinetic_energy(&body);
        assert!(energy_change.abs() < 1e-9);
    }

    #[test]
    fn inelastic_bounce_stops_normal_motion() {
        let body = BounceBody {
            velocity: Vec3::new(2.0, -4.0, 1.0),
            angular_velocity: Vec3::zero(),
            mass: 1.0,
            offset: Vec3::new(0.0, -0.5, 0.0),
        };
        let (change, _) = bounce(Vec3::unit_y(), 0.0, &body, None);
        let after = applied(&body, change);
        assert!(after.velocity.y.abs() < 1e-12);
        // tangential motion is untouched by a head-on normal impulse
        assert_eq!(after.velocity.x, 2.0);
        assert_eq!(after.velocity.z, 1.0);
    }

    #[test]
    fn equal_masses_exchange_velocity() {
        let a = BounceBody {
            velocity: Vec3::new(-3.0, 0.0, 0.0),
            angular_velocity: Vec3::zero(),
            mass: 1.0,
            offset: Vec3::new(-1.0, 0.0, 0.0),
        };
        let b = BounceBody {
            velocity: Vec3::zero(),
            offset: Vec3::new(1.0, 0.0, 0.0),
            ..a
        };
        let (ca, cb) = bounce(Vec3::unit_x(), 1.0, &a, Some(&b));
        assert!((applied(&a, ca).velocity).mag() < 1e-12);
        let b_after = applied(&b, cb).velocity;
        assert!((b_after - Vec3::new(-3.0, 0.0, 0.0)).mag() < 1e-12);
        // momentum is conserved
        assert!((ca.linear * a.mass + cb.linear * b.mass).mag() < 1e-12);
    }

    #[test]
    fn no_impulse_when_separating_or_degenerate() {
        let body = BounceBody {
            velocity: Vec3::new(0.0, 1.0, 0.0),
            angular_velocity: Vec3::zero(),
            mass: 1.0,
            offset: Vec3::zero(),
        };
        let (c, _) = bounce(Vec3::unit_y(), 0.5, &body, None);
        assert!(c.is_zero());

        let resting = BounceBody {
            velocity: Vec3::new(1.0, 0.0, 0.0),
            ..body
        };
        assert!(bounce(Vec3::unit_y(), 0.5, &resting, None).0.is_zero());
        assert!(bounce(Vec3::zero(), 0.5, &resting, None).0.is_zero());
    }

    #[test]
    fn params_validation() {
        assert!(MotionParams::default().build().is_ok());
        assert_eq!(
            MotionParams::new().with_mass(0.0).build(),
            Err(ParamsError::NonPositiveMass(0.0))
        );
        assert!(MotionParams::new()
            .with_mass(f64::INFINITY)
            .build()
            .is_err());
        assert!(matches!(
            MotionParams::new().with_restitution(1.5).validate(),
            Err(ParamsError::OutOfRange { name: "restitution", .. })
        ));
        assert!(MotionParams::new().with_drag(-0.1).validate().is_err());

        let mut motion = MotionParams::new().with_velocity(Vec3::unit_x()).build().unwrap();
        assert_eq!(motion.velocity(), Vec3::unit_x());
        assert!(motion.set_mass(-1.0).is_err());
        assert_eq!(motion.mass(), 10.0);
    }

    #[test]
    fn restitution_is_averaged() {
        let a = MotionParams::new().with_restitution(1.0).build().unwrap();
        let b = MotionParams::new().with_restitution(0.0).build().unwrap();
        assert_eq!(a.restitution_with(&b), 0.5);
        assert_eq!(b.restitution_with(&a), 0.5);
    }
}
