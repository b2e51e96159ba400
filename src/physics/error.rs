/// Error from an operation on the [`PhysicsWorld`][super::PhysicsWorld].
///
/// Geometric queries never fail; they return `Option` instead.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum PhysicsError {
    #[error("Object does not exist")]
    ObjectNotFound,
    #[error("Collision volume does not exist")]
    VolumeNotFound,
    #[error("Motion does not exist")]
    MotionNotFound,
    #[error("Object already has a motion attached")]
    MotionAlreadyAttached,
    #[error("Entity has no Transform component")]
    EntityWithoutTransform,
    #[error("Invalid parameters")]
    InvalidParams(#[from] ParamsError),
}

/// A parameter was outside the range the simulation can handle.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum ParamsError {
    #[error("Mass must be positive and finite, got {0}")]
    NonPositiveMass(f64),
    #[error("{name} must be within [{min}, {max}], got {value}")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

impl ParamsError {
    /// Check that `value` is within `min..=max`.
    /// NaN is always out of range.
    pub(crate) fn check_range(
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    ) -> Result<(), Self> {
        if (min..=max).contains(&value) {
            Ok(())
        } else {
            Err(Self::OutOfRange {
                name,
                value,
                min,
                max,
            })
        }
    }
}
