/// Open a tracy profiler span if the profiler is running.
/// Does nothing unless the `tracy` feature is enabled.
#[macro_export]
macro_rules! tracy_span {
    ($name:expr, $fn_name:expr) => {
        $crate::tracy_client::Client::running()
            .map(|client| client.span_alloc(Some($name), $fn_name, file!(), line!(), 0))
    };
}

#[doc(hidden)]
pub use tracy_client;

pub mod math;
pub use math::{uv, Pose, Rotor3, Transform, Unit, Vec3};

pub mod geometry;
pub use geometry::{Aabb, Capsule, Intersection, Obb, Overlap, Segment, Shape, Sphere, Sweep};

pub mod physics;
pub use physics::{
    Classification, CollisionVolume, HecsSync, HecsSyncOptions, Motion, MotionKey, MotionParams,
    ObjectKey, ParamsError, PhysicsError, PhysicsParams, PhysicsWorld, Registry, SweepHit,
    VolumeKey, VolumeShape,
};

pub mod util;
pub use util::FixedStep;

// Re-exported hecs to guarantee versions match
pub use hecs;
