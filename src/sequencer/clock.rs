/// Polled software clock - periodic ticks and one-shot deferred events
///
/// There is no timer thread. The owner calls [`Clock::poll`] often (well
/// below one interval) and handles the events it returns.
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct Pending<E> {
    deadline: Instant,
    event: E,
}

#[derive(Debug, Clone)]
pub struct Clock<E> {
    bpm: f64,
    interval: Duration,
    last_tick: Instant,
    tick_events: Vec<E>,
    pending: Vec<Pending<E>>,
}

impl<E: Clone> Clock<E> {
    /// `bpm` should pass `SequencerConfig::validate`; a tempo too slow to
    /// represent never ticks.
    pub fn new(bpm: f64, now: Instant) -> Self {
        Self {
            bpm,
            interval: Duration::try_from_secs_f64(60.0 / bpm).unwrap_or(Duration::MAX),
            last_tick: now,
            tick_events: Vec::new(),
            pending: Vec::new(),
        }
    }

    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Start of the tick period currently running.
    pub fn last_tick(&self) -> Instant {
        self.last_tick
    }

    /// Number of one-shot events still waiting.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Emit `event` on every tick from now on.
    pub fn on_tick(&mut self, event: E) {
        self.tick_events.push(event);
    }

    /// Emit `event` once, at the first poll at least `seconds` after the
    /// start of the current tick period, so deferred events stay on the
    /// tick grid however late the tick was polled.
    pub fn after(&mut self, seconds: f64, event: E) {
        let delay = if seconds > 0.0 {
            Duration::try_from_secs_f64(seconds).ok()
        } else {
            Some(Duration::ZERO)
        };
        let Some(deadline) = delay.and_then(|d| self.last_tick.checked_add(d)) else {
            log::warn!("dropped one-shot {} s out, beyond the clock range", seconds);
            return;
        };
        self.pending.push(Pending { deadline, event });
    }

    /// Advance to `now` and return the fired events.
    ///
    /// Due one-shots come first, in registration order, followed by the tick
    /// events if a full interval has passed. A tick moves the phase forward
    /// by exactly one interval so polling jitter does not accumulate.
    pub fn poll(&mut self, now: Instant) -> Vec<E> {
        let mut fired = Vec::new();

        let (due, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|p| p.deadline <= now);
        self.pending = waiting;
        fired.extend(due.into_iter().map(|p| p.event));

        if now.saturating_duration_since(self.last_tick) >= self.interval {
            self.last_tick += self.interval;
            fired.extend(self.tick_events.iter().cloned());
        }

        fired
    }
}
