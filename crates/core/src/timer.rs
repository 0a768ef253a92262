//! Step countdown timer. The caller drives it with one `tick()` per second.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    duration: u32,
    remaining: u32,
    running: bool,
}

impl Countdown {
    pub fn new(duration_secs: u32) -> Self {
        Self { duration: duration_secs, remaining: duration_secs, running: false }
    }

    pub fn remaining(&self) -> u32 { self.remaining }
    pub fn is_running(&self) -> bool { self.running }
    pub fn is_finished(&self) -> bool { self.remaining == 0 }

    pub fn start(&mut self) {
        if self.remaining > 0 { self.running = true; }
    }

    pub fn pause(&mut self) { self.running = false; }

    pub fn toggle(&mut self) {
        if self.running { self.pause() } else { self.start() }
    }

    pub fn reset(&mut self) {
        self.remaining = self.duration;
        self.running = false;
    }

    /// Advance one second. Returns true exactly once, on the tick that reaches zero.
    pub fn tick(&mut self) -> bool {
        if !self.running || self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        if self.remaining == 0 {
            self.running = false;
            return true;
        }
        false
    }

    /// Elapsed fraction in `[0, 1]`.
    pub fn progress(&self) -> f32 {
        if self.duration == 0 {
            return 0.0;
        }
        (self.duration - self.remaining) as f32 / self.duration as f32
    }

    pub fn display(&self) -> String { format_clock(self.remaining) }
}

/// `M:SS`, minutes unpadded.
pub fn format_clock(secs: u32) -> String { format!("{}:{:02}", secs / 60, secs % 60) }
