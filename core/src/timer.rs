/// At or below this many seconds left every tick carries a low-time warning.
pub const LOW_TIME_THRESHOLD: u32 = 5;

/// Handle of one started countdown. Ticks are addressed to it, so ticks of a
/// replaced countdown are recognized and dropped.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TimerId(u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Tick {
    /// Tick for a countdown that is no longer running.
    Ignored,
    Running { left: u32, low_time: bool },
    Expired,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Running {
    id: TimerId,
    duration: u32,
    left: u32,
}

/// Single restartable countdown with one second granularity.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Countdown {
    generation: u32,
    running: Option<Running>,
}

impl Countdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a fresh countdown, silently replacing any running one.
    pub fn start(&mut self, seconds: u32) -> TimerId {
        self.generation = self.generation.wrapping_add(1);
        let id = TimerId(self.generation);
        self.running = Some(Running {
            id,
            duration: seconds,
            left: seconds,
        });
        id
    }

    /// Cancels the running countdown without expiring it. Returns whether one was running.
    pub fn stop(&mut self) -> bool {
        self.running.take().is_some()
    }

    pub fn tick(&mut self, id: TimerId) -> Tick {
        let Some(running) = self.running.as_mut().filter(|r| r.id == id) else {
            return Tick::Ignored;
        };

        running.left = running.left.saturating_sub(1);
        let left = running.left;
        if left == 0 {
            self.running = None;
            Tick::Expired
        } else {
            Tick::Running {
                left,
                low_time: left <= LOW_TIME_THRESHOLD,
            }
        }
    }

    /// Adds time to the running countdown, returning the new remaining seconds.
    pub fn extend(&mut self, seconds: u32) -> Option<u32> {
        let running = self.running.as_mut()?;
        running.left = running.left.saturating_add(seconds);
        running.duration = running.duration.max(running.left);
        Some(running.left)
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    pub fn seconds_left(&self) -> Option<u32> {
        self.running.map(|r| r.left)
    }

    /// Remaining share of the countdown in `0.0..=1.0`, for progress bars.
    pub fn fraction_left(&self) -> f32 {
        match self.running {
            Some(Running { duration: 0, .. }) | None => 0.0,
            Some(Running { duration, left, .. }) => left as f32 / duration as f32,
        }
    }
}
