use std::time::{Duration, Instant};

/// Redraw timing: seconds between consecutive frames, plus a frame rate
/// averaged over a fixed sampling window.
#[derive(Debug)]
pub struct FrameClock {
    last_frame: Instant,
    window: Duration,
    window_start: Instant,
    frames_in_window: u32,
    fps: f32,
}

impl FrameClock {
    pub fn new(window: Duration) -> Self {
        let now = Instant::now();
        Self {
            last_frame: now,
            window,
            window_start: now,
            frames_in_window: 0,
            fps: 0.0,
        }
    }

    /// Forget the time spent before the first frame (window creation,
    /// adapter selection)
    pub fn restart(&mut self) {
        let now = Instant::now();
        self.last_frame = now;
        self.window_start = now;
        self.frames_in_window = 0;
    }

    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    /// Delta in seconds since the previous frame. Not clamped, so a stalled
    /// frame moves the camera by the whole stall.
    pub fn tick_at(&mut self, now: Instant) -> f32 {
        let delta = now.saturating_duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        self.frames_in_window += 1;
        let sampled = now.saturating_duration_since(self.window_start);
        if sampled >= self.window {
            self.fps = self.frames_in_window as f32 / sampled.as_secs_f32();
            self.frames_in_window = 0;
            self.window_start = now;
            log::debug!("FPS: {:.1}", self.fps);
        }
        delta
    }

    /// Zero until the first window has elapsed
    pub fn fps(&self) -> f32 {
        self.fps
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}
