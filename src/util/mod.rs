pub mod gameloop;
pub use gameloop::FixedStep;
