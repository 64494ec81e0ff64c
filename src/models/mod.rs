//! League scheduling domain models.
//!
//! Provides the data types for the slot assignment problem and its
//! solutions.
//!
//! # Domain Mappings
//!
//! | league-schedule | Meaning |
//! |-----------------|---------|
//! | Division | League, age tier and division number of a team group |
//! | Event | A weekly game or practice of one division |
//! | Slot | A weekly time window with capacity bounds |
//! | Instance | Slots, events, relations, weights and fixed placements |
//! | Schedule | Event-to-slot assignment layered on the fixed placements |

mod division;
mod error;
mod evaluation;
mod event;
mod instance;
mod relation;
mod schedule;
mod slot;

pub use division::{Division, ALL_DIVISIONS, SPECIAL_LEAGUE};
pub use error::ModelError;
pub use evaluation::{Component, PenaltyBreakdown};
pub use event::{Event, EventId};
pub use instance::{Instance, InstanceBuilder, Penalties, Weights};
pub use relation::SymmetricRelation;
pub use schedule::{Assignment, Schedule};
pub use slot::{format_time, parse_time, Day, EventKind, Slot, SlotId, SlotKey, EVENING_START_MIN};
