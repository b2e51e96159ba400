use instant::Instant;

// time snapping technique from Tyler Glaiel's blog post
// https://medium.com/@tglaiel/how-to-make-your-game-run-at-60fps-24c61210fe75
const SNAP_TARGETS: [f64; 5] = [1.0 / 120.0, 1.0 / 60.0, 1.0 / 30.0, 1.0 / 20.0, 1.0 / 15.0];
const SNAP_THRESHOLD: f64 = 0.000_2;

const DEFAULT_MAX_ACCUMULATED: f64 = 1.0 / 8.0;

/// Turns elapsed wall-clock time into a number of whole fixed-length steps.
///
/// Time that doesn't add up to a whole step carries over to the next call,
/// so the simulation never runs a partial step.
#[derive(Clone, Debug)]
pub struct FixedStep {
    period: f64,
    accumulated: f64,
    max_accumulated: f64,
    prev_time: Option<Instant>,
}

impl FixedStep {
    /// Create a stepper running steps of `period` seconds.
    pub fn new(period: f64) -> Self {
        debug_assert!(period > 0.0, "step period must be positive");
        Self {
            period,
            accumulated: 0.0,
            max_accumulated: DEFAULT_MAX_ACCUMULATED.max(period),
            prev_time: None,
        }
    }

    /// Set the most time that can be waiting to be simulated.
    /// Anything beyond it is forgotten, preventing a spiral of death
    /// when steps take longer to compute than they simulate.
    pub fn with_max_accumulated(mut self, max: f64) -> Self {
        self.max_accumulated = max.max(self.period);
        self
    }

    #[inline]
    pub fn period(&self) -> f64 {
        self.period
    }

    /// Time carried over from previous calls that hasn't been simulated yet.
    #[inline]
    pub fn accumulated(&self) -> f64 {
        self.accumulated
    }

    /// Add `elapsed` seconds and return how many steps should be run.
    pub fn advance(&mut self, elapsed: f64) -> usize {
        if elapsed.is_finite() && elapsed > 0.0 {
            self.accumulated = (self.accumulated + elapsed).min(self.max_accumulated);
        }
        let steps = (self.accumulated / self.period).floor();
        self.accumulated -= steps * self.period;
        // floating point can leave a hair under zero
        self.accumulated = self.accumulated.max(0.0);
        steps as usize
    }

    /// Measure the time since the previous call and [`advance`][Self::advance] by it.
    ///
    /// If the measured time is very close to a common display refresh interval,
    /// it's snapped to that exact interval so that a vsynced loop
    /// runs the same number of steps every frame.
    /// The first call only starts the clock and returns 0.
    pub fn advance_wall_clock(&mut self) -> usize {
        let now = Instant::now();
        let Some(prev) = self.prev_time.replace(now) else {
            return 0;
        };
        self.advance(snap_to_refresh_interval((now - prev).as_secs_f64()))
    }

    /// Forget any accumulated time and restart the wall clock.
    pub fn reset(&mut self) {
        self.accumulated = 0.0;
        self.prev_time = None;
    }
}

fn snap_to_refresh_interval(dt: f64) -> f64 {
    SNAP_TARGETS
        .iter()
        .copied()
        .find(|target| (dt - target).abs() < SNAP_THRESHOLD)
        .unwrap_or(dt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_whole_steps_run() {
        let mut stepper = FixedStep::new(0.1);
        assert_eq!(stepper.advance(0.05), 0);
        assert_eq!(stepper.advance(0.06), 1);
        assert!((stepper.accumulated() - 0.01).abs() < 1e-12);
        assert_eq!(stepper.advance(0.1), 1);
        assert_eq!(stepper.advance(0.0), 0);
    }

    #[test]
    fn accumulator_is_capped() {
        let mut stepper = FixedStep::new(0.25).with_max_accumulated(1.0);
        assert_eq!(stepper.advance(10.0), 4);
        assert_eq!(stepper.advance(f64::NAN), 0);
        assert_eq!(stepper.advance(-1.0), 0);
    }

    #[test]
    fn vsync_times_snap() {
        assert_eq!(snap_to_refresh_interval(1.0 / 60.0 + 0.0001), 1.0 / 60.0);
        assert_eq!(snap_to_refresh_interval(0.04), 0.04);
    }

    #[test]
    fn wall_clock_starts_at_zero() {
        let mut stepper = FixedStep::new(1.0);
        assert_eq!(stepper.advance_wall_clock(), 0);
        assert_eq!(stepper.advance_wall_clock(), 0);
    }
}
