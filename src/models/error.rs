use thiserror::Error;

use super::{Day, EventKind, SlotKey};

/// Errors raised while building the domain model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("invalid {kind} identifier: {id:?}")]
    InvalidEventId { id: String, kind: EventKind },

    #[error("invalid day: {0:?}")]
    InvalidDay(String),

    #[error("invalid time: {0:?}")]
    InvalidTime(String),

    #[error("duplicate event: {0}")]
    DuplicateEvent(String),

    #[error("duplicate slot: {0}")]
    DuplicateSlot(SlotKey),

    #[error("unknown event: {0}")]
    UnknownEvent(String),

    #[error("unknown {kind} slot: {day} {time}")]
    UnknownSlot { kind: EventKind, day: Day, time: String },

    #[error("event {0} already has a partial assignment")]
    DuplicatePartialAssignment(String),

    #[error("special practice {0} needs a TU 18:00 practice slot")]
    MissingSpecialPracticeSlot(String),

    #[error("cannot fix {event} into {slot}: hard constraint violated")]
    InfeasiblePartialAssignment { event: String, slot: SlotKey },
}
