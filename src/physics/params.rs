use super::ParamsError;

/// Global tunables of the simulation.
///
/// With the `serde-types` feature this can be loaded from any serde format.
/// Missing fields are filled in from [`Default`][PhysicsParams::default].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde-types",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct PhysicsParams {
    /// Length of one simulation step in seconds.
    pub fixed_dt: f64,
    /// Maximum number of collisions resolved for one object in one step.
    /// Movement left over after this many is dropped.
    pub max_slide_iterations: usize,
    /// Number of halvings used to find how far an object can rotate
    /// before it runs into something.
    pub rotation_bisection_steps: usize,
    /// Distance an object is pushed away from a surface after hitting it,
    /// so that the next sweep doesn't start out touching.
    pub contact_skin: f64,
    /// How far from an object's surface other objects can be
    /// and still count as touching for contact forces.
    pub proximity_margin: f64,
}

impl Default for PhysicsParams {
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            max_slide_iterations: 8,
            rotation_bisection_steps: 4,
            contact_skin: 1e-4,
            proximity_margin: 0.02,
        }
    }
}

impl PhysicsParams {
    #[inline]
    pub fn with_fixed_dt(mut self, dt: f64) -> Self {
        self.fixed_dt = dt;
        self
    }

    #[inline]
    pub fn with_max_slide_iterations(mut self, iterations: usize) -> Self {
        self.max_slide_iterations = iterations;
        self
    }

    #[inline]
    pub fn with_rotation_bisection_steps(mut self, steps: usize) -> Self {
        self.rotation_bisection_steps = steps;
        self
    }

    #[inline]
    pub fn with_contact_skin(mut self, skin: f64) -> Self {
        self.contact_skin = skin;
        self
    }

    #[inline]
    pub fn with_proximity_margin(mut self, margin: f64) -> Self {
        self.proximity_margin = margin;
        self
    }

    pub fn validate(&self) -> Result<(), ParamsError> {
        if !(self.fixed_dt > 0.0 && self.fixed_dt.is_finite()) {
            return Err(ParamsError::OutOfRange {
                name: "fixed_dt",
                value: self.fixed_dt,
                min: f64::MIN_POSITIVE,
                max: f64::MAX,
            });
        }
        if self.max_slide_iterations == 0 {
            return Err(ParamsError::OutOfRange {
                name: "max_slide_iterations",
                value: 0.0,
                min: 1.0,
                max: f64::MAX,
            });
        }
        ParamsError::check_range("contact_skin", self.contact_skin, 0.0, f64::MAX)?;
        ParamsError::check_range("proximity_margin", self.proximity_margin, 0.0, f64::MAX)?;
        Ok(())
    }
}
