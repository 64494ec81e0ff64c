//! Input file parser.
//!
//! The input is a sequence of sections, each introduced by a header line
//! ending in `:` (case-insensitive) and followed by comma-separated
//! records:
//!
//! | Section | Record |
//! |---------|--------|
//! | `Name:` | instance name |
//! | `Game slots:` / `Practice slots:` | `DAY, H:MM, MAX, MIN` |
//! | `Games:` / `Practices:` | event identifier |
//! | `Not compatible:` / `Pair:` | `EVENT, EVENT` |
//! | `Unwanted:` | `EVENT, DAY, H:MM` |
//! | `Preferences:` | `DAY, H:MM, EVENT, WEIGHT` |
//! | `Partial assignments:` | `EVENT, DAY, H:MM` |
//!
//! Blank lines are ignored. Structural problems (missing or unknown
//! header, wrong field count, unparsable number, day or time) and any
//! failed partial assignment abort parsing. Malformed or duplicate
//! events, duplicate slots, and relations naming unknown events or slots
//! are logged and skipped.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

use crate::models::{
    parse_time, Day, Event, EventKind, Instance, InstanceBuilder, ModelError, Penalties, Slot,
    Weights,
};

/// Fatal parse errors. Line numbers are 1-based.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: record before any section header")]
    MissingSection { line: usize },

    #[error("line {line}: unknown section {name:?}")]
    UnknownSection { line: usize, name: String },

    #[error("line {line}: {message}")]
    Malformed { line: usize, message: String },

    #[error("line {line}: {source}")]
    Model {
        line: usize,
        #[source]
        source: ModelError,
    },

    #[error("cannot build instance: {0}")]
    Build(#[from] ModelError),
}

/// Input file sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Name,
    GameSlots,
    PracticeSlots,
    Games,
    Practices,
    NotCompatible,
    Unwanted,
    Preferences,
    Pair,
    PartialAssignments,
}

impl FromStr for Section {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.split_whitespace().collect::<Vec<_>>().join(" ");
        match normalized.to_ascii_lowercase().as_str() {
            "name" => Ok(Section::Name),
            "game slots" => Ok(Section::GameSlots),
            "practice slots" => Ok(Section::PracticeSlots),
            "games" => Ok(Section::Games),
            "practices" => Ok(Section::Practices),
            "not compatible" => Ok(Section::NotCompatible),
            "unwanted" => Ok(Section::Unwanted),
            "preferences" => Ok(Section::Preferences),
            "pair" => Ok(Section::Pair),
            "partial assignments" => Ok(Section::PartialAssignments),
            _ => Err(()),
        }
    }
}

/// Reads and parses an input file.
pub fn parse_file(
    path: impl AsRef<Path>,
    weights: Weights,
    penalties: Penalties,
) -> Result<Instance, ParseError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), bytes = text.len(), "parsing input file");
    parse_instance(&text, weights, penalties)
}

/// Parses input text into an [`Instance`].
///
/// # Example
///
/// ```
/// use league_schedule::models::{Penalties, Weights};
/// use league_schedule::parser::parse_instance;
///
/// let text = "Name:\nTiny\n\nGame slots:\nMO, 8:00, 2, 1\n\nGames:\nCMSA U13T3 DIV 01\n";
/// let instance = parse_instance(text, Weights::default(), Penalties::default()).unwrap();
/// assert_eq!(instance.name(), "Tiny");
/// assert_eq!(instance.events().len(), 1);
/// ```
pub fn parse_instance(
    text: &str,
    weights: Weights,
    penalties: Penalties,
) -> Result<Instance, ParseError> {
    let mut builder = Instance::builder()
        .with_weights(weights)
        .with_penalties(penalties);
    let mut section: Option<Section> = None;
    let mut skipped = 0usize;

    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let record = raw.trim();
        if record.is_empty() {
            continue;
        }

        if let Some(header) = record.strip_suffix(':') {
            let parsed = header.parse::<Section>().map_err(|_| ParseError::UnknownSection {
                line,
                name: header.trim().to_string(),
            })?;
            section = Some(parsed);
            continue;
        }

        let current = section.ok_or(ParseError::MissingSection { line })?;
        let outcome = parse_record(&mut builder, current, record, line)?;
        if let Err(err) = outcome {
            skipped += 1;
            tracing::warn!(line, record, error = %err, "skipping record");
        }
    }

    if skipped > 0 {
        tracing::warn!(skipped, "input records skipped");
    }
    Ok(builder.build()?)
}

/// Applies one record. The outer error is fatal; the inner one means the
/// record is skipped.
fn parse_record(
    builder: &mut InstanceBuilder,
    section: Section,
    record: &str,
    line: usize,
) -> Result<Result<(), ModelError>, ParseError> {
    let fatal = |source: ModelError| ParseError::Model { line, source };

    let outcome = match section {
        Section::Name => {
            builder.set_name(record);
            Ok(())
        }
        Section::GameSlots | Section::PracticeSlots => {
            let kind = if section == Section::GameSlots {
                EventKind::Game
            } else {
                EventKind::Practice
            };
            let [day, time, max, min] = fields::<4>(record, line)?;
            let day: Day = day.parse().map_err(fatal)?;
            let start = parse_time(time).map_err(fatal)?;
            let max = int(max, line)?;
            let min = int(min, line)?;
            builder
                .add_slot(Slot::new(kind, day, start, max, min))
                .map(|_| ())
        }
        Section::Games => Event::game(record).and_then(|e| builder.add_event(e).map(|_| ())),
        Section::Practices => {
            Event::practice(record).and_then(|e| builder.add_event(e).map(|_| ()))
        }
        Section::NotCompatible => {
            let [a, b] = fields::<2>(record, line)?;
            builder.add_incompatible(a, b).map(|_| ())
        }
        Section::Pair => {
            let [a, b] = fields::<2>(record, line)?;
            builder.add_pair(a, b).map(|_| ())
        }
        Section::Unwanted => {
            let [event, day, time] = fields::<3>(record, line)?;
            let day: Day = day.parse().map_err(fatal)?;
            let start = parse_time(time).map_err(fatal)?;
            builder.add_unwanted(event, day, start)
        }
        Section::Preferences => {
            let [day, time, event, weight] = fields::<4>(record, line)?;
            let day: Day = day.parse().map_err(fatal)?;
            let start = parse_time(time).map_err(fatal)?;
            let weight = int(weight, line)?;
            builder.add_preference(event, day, start, weight)
        }
        Section::PartialAssignments => {
            let [event, day, time] = fields::<3>(record, line)?;
            let day: Day = day.parse().map_err(fatal)?;
            let start = parse_time(time).map_err(fatal)?;
            builder.add_partial_assignment(event, day, start).map_err(fatal)?;
            Ok(())
        }
    };
    Ok(outcome)
}

/// Splits a record into exactly `N` trimmed fields.
fn fields<const N: usize>(record: &str, line: usize) -> Result<[&str; N], ParseError> {
    let parts: Vec<&str> = record.split(',').map(str::trim).collect();
    parts.try_into().map_err(|parts: Vec<&str>| ParseError::Malformed {
        line,
        message: format!("expected {N} fields, found {}", parts.len()),
    })
}

fn int<T: FromStr>(field: &str, line: usize) -> Result<T, ParseError> {
    field.parse().map_err(|_| ParseError::Malformed {
        line,
        message: format!("invalid integer {field:?}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Schedule;

    const DEMO: &str = include_str!("../data/demo.txt");

    fn parse(text: &str) -> Result<Instance, ParseError> {
        parse_instance(text, Weights::new(1, 1, 1, 1), Penalties::new(1, 1, 1, 1))
    }

    #[test]
    fn test_parse_demo() {
        let inst = parse(DEMO).unwrap();
        assert_eq!(inst.name(), "DemoLeague");
        assert_eq!(inst.slots().len(), 12);
        // Seven games, five practices and the generated special practice
        assert_eq!(inst.events().len(), 13);

        let blocked = inst
            .find_slot(EventKind::Game, Day::Tu, 11 * 60)
            .unwrap();
        assert_eq!(inst.slot(blocked).max, 0);

        let special = inst.find_event("CMSA U12T1S").unwrap();
        let fixed = inst.find_event("CUSA O18 DIV 01").unwrap();
        assert!(inst.is_fixed(special));
        assert!(inst.is_fixed(fixed));

        let a = inst.find_event("CMSA U13T3 DIV 01").unwrap();
        let b = inst.find_event("CMSA U17T1 DIV 01").unwrap();
        assert!(inst.incompatible().contains(a, b));
        assert_eq!(inst.pairs().len(), 1);

        let s = Schedule::new(&inst);
        assert!(s.valid());
    }

    #[test]
    fn test_demo_solves() {
        use crate::ga::{GaConfig, GaRunner};

        let inst = parse(DEMO).unwrap();
        let config = GaConfig::default()
            .with_population(5, 12)
            .with_eviction_batch(6)
            .with_plateau_rounds(2)
            .with_seed(11);
        let result = GaRunner::run(&inst, &config).unwrap();
        assert!(result.best.complete());
        assert!(result.best.valid());
        assert_eq!(result.best.eval(), result.best_fitness);

        let fixed = inst.find_event("CUSA O18 DIV 01").unwrap();
        let tu = inst.find_slot(EventKind::Game, Day::Tu, 9 * 60 + 30).unwrap();
        assert_eq!(result.best.slot_of(fixed), Some(tu));
    }

    #[test]
    fn test_headers_case_insensitive() {
        let text = "GAME SLOTS:\nmo, 8:00, 1, 0\ngames:\nCMSA U13T3 DIV 01\n";
        let inst = parse(text).unwrap();
        assert_eq!(inst.slots().len(), 1);
        assert_eq!(inst.events().len(), 1);
    }

    #[test]
    fn test_record_before_header_is_fatal() {
        let err = parse("MO, 8:00, 1, 0\n").unwrap_err();
        assert!(matches!(err, ParseError::MissingSection { line: 1 }));
    }

    #[test]
    fn test_unknown_header_is_fatal() {
        let err = parse("Game slots:\nMO, 8:00, 1, 0\nTeams:\n").unwrap_err();
        assert!(matches!(err, ParseError::UnknownSection { line: 3, .. }));
    }

    #[test]
    fn test_bad_fields_are_fatal() {
        assert!(matches!(
            parse("Game slots:\nMO, 8:00, 1\n").unwrap_err(),
            ParseError::Malformed { line: 2, .. }
        ));
        assert!(matches!(
            parse("Game slots:\nMO, 8:00, x, 0\n").unwrap_err(),
            ParseError::Malformed { line: 2, .. }
        ));
        assert!(matches!(
            parse("Game slots:\nXX, 8:00, 1, 0\n").unwrap_err(),
            ParseError::Model {
                source: ModelError::InvalidDay(_),
                ..
            }
        ));
    }

    #[test]
    fn test_bad_records_skipped() {
        let text = "\
Game slots:
MO, 8:00, 2, 0
MO, 8:00, 5, 0

Games:
CMSA U13T3 DIV 01
CMSA U13T3 01
CMSA U13T3 DIV 01

Not compatible:
CMSA U13T3 DIV 01, CMSA U99 DIV 01

Unwanted:
CMSA U13T3 DIV 01, WE, 8:00
";
        let inst = parse(text).unwrap();
        assert_eq!(inst.slots().len(), 1);
        assert_eq!(inst.slot(inst.slot_ids().next().unwrap()).max, 2);
        assert_eq!(inst.events().len(), 1);
        assert!(inst.incompatible().is_empty());
        assert!(inst.events()[0].unwanted.is_empty());
    }

    #[test]
    fn test_partial_assignment_failures_are_fatal() {
        let unknown_slot = "\
Game slots:
MO, 8:00, 1, 0
Games:
CMSA U13T3 DIV 01
Partial assignments:
CMSA U13T3 DIV 01, TU, 8:00
";
        assert!(matches!(
            parse(unknown_slot).unwrap_err(),
            ParseError::Model {
                line: 6,
                source: ModelError::UnknownSlot { .. }
            }
        ));

        let blocked = "\
Game slots:
TU, 11:00, 3, 0
Games:
CMSA U13T3 DIV 01
Partial assignments:
CMSA U13T3 DIV 01, TU, 11:00
";
        assert!(matches!(
            parse(blocked).unwrap_err(),
            ParseError::Build(ModelError::InfeasiblePartialAssignment { .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = parse_file(
            "/nonexistent/league.txt",
            Weights::default(),
            Penalties::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ParseError::Io { .. }));
    }
}
