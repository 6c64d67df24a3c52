use std::time::Instant;

use tracing::debug;

/// Exponentially smoothed frames-per-second
pub struct FpsCounter {
    last_frame_time: Instant,
    fps: f64,
    frame_count: u64,
}

impl FpsCounter {
    pub fn new() -> Self {
        Self {
            last_frame_time: Instant::now(),
            fps: 0.0,
            frame_count: 0,
        }
    }

    /// Record a displayed frame and return the smoothed rate
    pub fn tick(&mut self) -> f64 {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_frame_time).as_secs_f64();
        self.last_frame_time = now;
        self.update(elapsed)
    }

    fn update(&mut self, elapsed: f64) -> f64 {
        if elapsed > 0.0 {
            let current = 1.0 / elapsed;
            self.fps = if self.fps == 0.0 {
                current
            } else {
                self.fps * 0.95 + current * 0.05
            };
        }
        self.frame_count += 1;

        if self.frame_count % 100 == 0 {
            debug!("{} frames displayed, {:.1} FPS", self.frame_count, self.fps);
        }
        metrics::gauge!("display_fps").set(self.fps);

        self.fps
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_sample_is_taken_raw_then_smoothed() {
        let mut counter = FpsCounter::new();
        assert!((counter.update(0.1) - 10.0).abs() < 1e-9);

        let fps = counter.update(0.05);
        assert!((fps - (10.0 * 0.95 + 20.0 * 0.05)).abs() < 1e-9);
        assert_eq!(counter.frame_count(), 2);
    }

    #[test]
    fn zero_interval_keeps_previous_rate() {
        let mut counter = FpsCounter::new();
        counter.update(0.5);
        assert_eq!(counter.update(0.0), 2.0);
    }
}
