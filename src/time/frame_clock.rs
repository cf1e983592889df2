/// Frame time for one dispatch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTime {
    /// Absolute simulation time at the end of the frame, in seconds
    pub time: f32,
    /// Frame delta in seconds
    pub delta_time: f32,
    /// Zero-based frame number
    pub frame: u64,
}

/// Accumulates simulation time across frames
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    elapsed: f64,
    frame: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by `delta_time` seconds and return the frame's timing.
    /// Negative or non-finite deltas count as zero.
    pub fn tick_secs(&mut self, delta_time: f32) -> FrameTime {
        let frame = self.peek_secs(delta_time);
        self.elapsed += frame.delta_time as f64;
        self.frame += 1;
        frame
    }

    /// Timing the next `tick_secs(delta_time)` would return, without advancing
    pub fn peek_secs(&self, delta_time: f32) -> FrameTime {
        let delta_time = if delta_time.is_finite() { delta_time.max(0.0) } else { 0.0 };
        FrameTime {
            time: (self.elapsed + delta_time as f64) as f32,
            delta_time,
            frame: self.frame,
        }
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed as f32
    }

    pub fn frame_count(&self) -> u64 {
        self.frame
    }
}
