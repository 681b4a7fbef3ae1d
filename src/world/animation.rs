//! The scripted path animation and the tick sources that drive it.

use std::time::Duration;

use instant::Instant;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Z,
}

/// Which way the camera looks while a leg is travelled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Heading {
    PlusX,
    PlusZ,
    MinusX,
    MinusZ,
}

/// One straight stretch of the path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Leg {
    pub axis: Axis,
    /// `1` or `-1`.
    pub direction: i8,
    /// Length in path segments.
    pub segments: u32,
}

impl Leg {
    pub const fn new(axis: Axis, direction: i8, segments: u32) -> Self {
        Self {
            axis,
            direction,
            segments,
        }
    }

    /// Number of ticks needed to travel this leg.
    pub fn length(&self, segment_length: u32) -> u32 {
        self.segments * segment_length
    }

    pub fn heading(&self) -> Heading {
        match (self.axis, self.direction >= 0) {
            (Axis::X, true) => Heading::PlusX,
            (Axis::Z, true) => Heading::PlusZ,
            (Axis::X, false) => Heading::MinusX,
            (Axis::Z, false) => Heading::MinusZ,
        }
    }
}

/// The closed path: its legs sum to zero on both axes.
pub const PATH: [Leg; 6] = [
    Leg::new(Axis::X, 1, 1),
    Leg::new(Axis::Z, 1, 1),
    Leg::new(Axis::X, -1, 2),
    Leg::new(Axis::Z, -1, 2),
    Leg::new(Axis::X, 1, 1),
    Leg::new(Axis::Z, 1, 1),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running { leg: usize, progress: u32 },
}

/// What a single [`Animation::tick`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing is running.
    Idle,
    Advanced,
    /// A new leg starts with the next tick.
    LegCompleted,
    /// The last leg ended; offsets are back at the origin.
    Finished,
}

/**
 * State machine walking [`PATH`] one unit per tick.
 *
 * Stages are numbered like the legs (0..=5), idle is stage -1. Reaching the
 * end of the last leg is stage 6, which is never observable: it immediately
 * resets the offsets and returns to idle.
 */
#[derive(Clone, Debug, PartialEq)]
pub struct Animation {
    phase: Phase,
    offset_x: f32,
    offset_z: f32,
    segment_length: u32,
}

impl Animation {
    pub fn new(segment_length: u32) -> Self {
        Self {
            phase: Phase::Idle,
            offset_x: 0.0,
            offset_z: 0.0,
            segment_length: segment_length.max(1),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        matches!(self.phase, Phase::Running { .. })
    }

    pub fn stage(&self) -> i32 {
        match self.phase {
            Phase::Idle => -1,
            Phase::Running { leg, .. } => leg as i32,
        }
    }

    /// Units travelled on the current leg.
    pub fn progress(&self) -> u32 {
        match self.phase {
            Phase::Idle => 0,
            Phase::Running { progress, .. } => progress,
        }
    }

    /// Path offset as `(x, z)`.
    pub fn offset(&self) -> (f32, f32) {
        (self.offset_x, self.offset_z)
    }

    pub fn current_leg(&self) -> Option<Leg> {
        match self.phase {
            Phase::Idle => None,
            Phase::Running { leg, .. } => PATH.get(leg).copied(),
        }
    }

    pub fn segment_length(&self) -> u32 {
        self.segment_length
    }

    /// Starts from the origin. Returns `false`, changing nothing, while a
    /// run is in progress.
    pub fn start(&mut self) -> bool {
        if self.is_running() {
            return false;
        }
        self.offset_x = 0.0;
        self.offset_z = 0.0;
        self.phase = Phase::Running {
            leg: 0,
            progress: 0,
        };
        true
    }

    fn advance_along(&mut self, leg: Leg) {
        let step = f32::from(leg.direction);
        match leg.axis {
            Axis::X => self.offset_x += step,
            Axis::Z => self.offset_z += step,
        }
    }

    pub fn tick(&mut self) -> TickOutcome {
        let Phase::Running { leg, progress } = self.phase else {
            return TickOutcome::Idle;
        };
        let Some(current) = PATH.get(leg).copied() else {
            self.finish();
            return TickOutcome::Finished;
        };
        self.advance_along(current);
        let progress = progress + 1;
        if progress < current.length(self.segment_length) {
            self.phase = Phase::Running { leg, progress };
            return TickOutcome::Advanced;
        }
        if leg + 1 < PATH.len() {
            self.phase = Phase::Running {
                leg: leg + 1,
                progress: 0,
            };
            TickOutcome::LegCompleted
        } else {
            self.finish();
            TickOutcome::Finished
        }
    }

    fn finish(&mut self) {
        self.phase = Phase::Idle;
        self.offset_x = 0.0;
        self.offset_z = 0.0;
    }

    /// Ticks a full run takes from start to idle.
    pub fn total_ticks(&self) -> u32 {
        PATH.iter().map(|leg| leg.length(self.segment_length)).sum()
    }
}

/// A source of animation ticks.
pub trait Ticker {
    fn start(&mut self);
    fn stop(&mut self);
    fn is_running(&self) -> bool;
    /// Ticks that became due since the last poll; zero while stopped.
    fn poll(&mut self) -> u32;
}

/// Ticks at a fixed interval of wall-clock time.
#[derive(Clone, Debug)]
pub struct IntervalTicker {
    interval: Duration,
    max_catch_up: u32,
    last: Option<Instant>,
}

impl IntervalTicker {
    pub fn new(interval: Duration, max_catch_up: u32) -> Self {
        Self {
            interval: interval.max(Duration::from_micros(1)),
            max_catch_up: max_catch_up.max(1),
            last: None,
        }
    }
}

impl Ticker for IntervalTicker {
    fn start(&mut self) {
        self.last = Some(Instant::now());
    }

    fn stop(&mut self) {
        self.last = None;
    }

    fn is_running(&self) -> bool {
        self.last.is_some()
    }

    fn poll(&mut self) -> u32 {
        let Some(last) = self.last else {
            return 0;
        };
        let now = Instant::now();
        let elapsed = now.duration_since(last);
        let due = (elapsed.as_nanos() / self.interval.as_nanos()) as u32;
        if due > self.max_catch_up {
            // A stall is not replayed; the clock restarts from now.
            self.last = Some(now);
            return self.max_catch_up;
        }
        if due > 0 {
            self.last = Some(last + self.interval * due);
        }
        due
    }
}

/// Ticks only when told to; deterministic.
#[derive(Clone, Debug, Default)]
pub struct ManualTicker {
    running: bool,
    pending: u32,
}

impl ManualTicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `ticks` more ticks due, if running.
    pub fn advance(&mut self, ticks: u32) {
        if self.running {
            self.pending += ticks;
        }
    }
}

impl Ticker for ManualTicker {
    fn start(&mut self) {
        self.running = true;
        self.pending = 0;
    }

    fn stop(&mut self) {
        self.running = false;
        self.pending = 0;
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn poll(&mut self) -> u32 {
        std::mem::take(&mut self.pending)
    }
}
