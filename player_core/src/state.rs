//! Position phases of the carriage and the transition table between them.

use core::fmt;

/// Phase of the carriage's travel.
///
/// The graph only moves forward: `Offmark → Onmark → Started → Halfway →
/// Finished`, with `Started → Onmark` as the single step back (the carriage
/// slid onto the bottom stop again before reaching the top). `Finished` is
/// terminal until the controller is reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PositionState {
    Offmark,
    Onmark,
    Started,
    Halfway,
    Finished,
}

/// Limit switch levels sampled once per tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LimitReading {
    pub top: bool,
    pub bottom: bool,
}

/// A state change observed during one `update`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: PositionState,
    pub to: PositionState,
}

impl PositionState {
    pub const ALL: [PositionState; 5] = [
        PositionState::Offmark,
        PositionState::Onmark,
        PositionState::Started,
        PositionState::Halfway,
        PositionState::Finished,
    ];

    /// Apply one tick of the transition table. Level-triggered: the same
    /// reading on consecutive ticks can advance at most one step per tick.
    pub fn next(self, limits: LimitReading) -> Self {
        match self {
            PositionState::Offmark if limits.bottom => PositionState::Onmark,
            PositionState::Onmark if !limits.bottom => PositionState::Started,
            PositionState::Started if limits.bottom => PositionState::Onmark,
            PositionState::Started if limits.top => PositionState::Halfway,
            PositionState::Halfway if limits.bottom => PositionState::Finished,
            other => other,
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            PositionState::Offmark => "offmark",
            PositionState::Onmark => "onmark",
            PositionState::Started => "started",
            PositionState::Halfway => "halfway",
            PositionState::Finished => "finished",
        }
    }

    /// Whether `to` is reachable from `self` in a single tick (staying put
    /// included). `reset` forcing `Offmark` is outside this table.
    pub fn can_step_to(self, to: PositionState) -> bool {
        use PositionState::*;
        self == to
            || matches!(
                (self, to),
                (Offmark, Onmark)
                    | (Onmark, Started)
                    | (Started, Onmark)
                    | (Started, Halfway)
                    | (Halfway, Finished)
            )
    }
}

impl fmt::Display for PositionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}
