//! Convex primitives and the static and swept intersection tests between them.
//!
//! All swept tests take the form `sweep(static_shape, moving_shape, movement)`
//! where the moving shape travels by `movement` over a unit time interval.
//! Callers with two moving shapes should subtract one movement from the other
//! to get into the rest frame of one of them.

pub mod shapes;
pub use shapes::{Aabb, Capsule, Intersection, Obb, Segment, Sphere};

pub mod overlap;
pub use overlap::Overlap;

pub mod sweep;
pub use sweep::Sweep;

mod sphere_box;

pub mod shape;
pub use shape::Shape;
