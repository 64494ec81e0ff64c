//! OR-tree constraint solver.
//!
//! Produces one complete, valid schedule by randomized depth-first
//! backtracking over a fixed event order. An optional template schedule
//! biases each choice toward the template's slot without forcing it.
//!
//! # Algorithm
//! For the event at depth *i*:
//! 1. Enumerate the currently valid candidate slots in random order,
//!    with the template's slot (if it is a candidate) tried first.
//! 2. Place the event in the next candidate and descend to depth *i* + 1.
//! 3. When the subtree fails:
//!    - with the abandon flag raised, unwind to the root, which clears
//!      the flag and restarts below the same slot;
//!    - otherwise unassign, raise the abandon flag with a small
//!      probability, and try the next candidate.
//! 4. A depth with no candidates left fails.
//!
//! The search runs on an explicit stack, so depth is bounded by heap
//! memory rather than the call stack.
//!
//! # Reference
//! - Russell & Norvig (2020), "Artificial Intelligence: A Modern Approach", Ch. 6 (Backtracking Search)
//! - Gomes et al. (2000), "Heavy-Tailed Phenomena in Satisfiability and Constraint Satisfaction Problems"

use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

use crate::models::{EventId, Instance, Schedule, SlotId};

/// Solver tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig {
    /// Chance of abandoning the branch after a failed subtree.
    pub abandon_probability: f64,
    /// Root restarts allowed before the invocation gives up.
    pub max_restarts: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            abandon_probability: 0.05,
            max_restarts: 10_000,
        }
    }
}

impl SolverConfig {
    pub fn with_abandon_probability(mut self, p: f64) -> Self {
        self.abandon_probability = p;
        self
    }

    pub fn with_max_restarts(mut self, n: usize) -> Self {
        self.max_restarts = n;
        self
    }
}

/// Solver failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolverError {
    /// Every branch failed for this event order and random draw.
    #[error("no valid completion found for {events} events")]
    Exhausted { events: usize },

    /// The search kept abandoning back to the root.
    #[error("search abandoned after {0} root restarts")]
    RestartLimit(usize),

    /// The search reported success but the result breaks an invariant.
    #[error("solver produced an inconsistent schedule: {0}")]
    Inconsistent(String),
}

impl SolverError {
    /// Whether a fresh solver run may succeed.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, SolverError::Inconsistent(_))
    }
}

/// One depth of the search.
struct Frame {
    event: EventId,
    /// Remaining slots, tried from the back.
    candidates: Vec<SlotId>,
    /// Slot the event holds while its subtree is explored.
    placed: Option<SlotId>,
}

/// Randomized backtracking solver.
///
/// # Example
///
/// ```
/// use league_schedule::cp::OrTree;
/// use league_schedule::models::{Day, Event, Instance, Slot};
/// use rand::rngs::SmallRng;
/// use rand::SeedableRng;
///
/// let mut builder = Instance::builder();
/// builder.add_slot(Slot::game(Day::Mo, 8 * 60, 1, 1)).unwrap();
/// builder.add_event(Event::game("CMSA U13T3 DIV 01").unwrap()).unwrap();
/// let instance = builder.build().unwrap();
///
/// let mut rng = SmallRng::seed_from_u64(42);
/// let schedule = OrTree::new(&instance).solve(&mut rng).unwrap();
/// assert!(schedule.complete() && schedule.valid());
/// assert_eq!(schedule.eval(), 0);
/// ```
pub struct OrTree<'a> {
    schedule: Schedule<'a>,
    template: Option<Schedule<'a>>,
    order: Vec<EventId>,
    config: SolverConfig,
}

impl<'a> OrTree<'a> {
    /// Creates a solver over an empty schedule. The event order is fixed here.
    pub fn new(instance: &'a Instance) -> Self {
        let schedule = Schedule::new(instance);
        let order = schedule.scheduling_order();
        Self {
            schedule,
            template: None,
            order,
            config: SolverConfig::default(),
        }
    }

    /// Biases the search toward the template's assignments.
    pub fn with_template(mut self, template: Schedule<'a>) -> Self {
        self.template = Some(template);
        self
    }

    pub fn with_config(mut self, config: SolverConfig) -> Self {
        self.config = config;
        self
    }

    /// Events in the order they are placed.
    pub fn order(&self) -> &[EventId] {
        &self.order
    }

    /// Runs the search.
    ///
    /// A template that is already complete and valid is returned as is.
    /// Otherwise the result is checked for completeness and validity
    /// before it is returned.
    pub fn solve<R: Rng>(mut self, rng: &mut R) -> Result<Schedule<'a>, SolverError> {
        if let Some(template) = self.template.take() {
            if template.complete() && template.valid() {
                tracing::trace!("template accepted without search");
                return Ok(template);
            }
            self.template = Some(template);
        }

        let restarts = self.search(rng)?;

        if !self.schedule.complete() {
            let missing = self.schedule.unassigned_events().count();
            return Err(SolverError::Inconsistent(format!(
                "{missing} events left unassigned"
            )));
        }
        if let Err(errors) = crate::validation::check_schedule(&self.schedule) {
            let first = errors
                .first()
                .map(|e| e.message.clone())
                .unwrap_or_default();
            return Err(SolverError::Inconsistent(format!(
                "{} hard-constraint violations, first: {first}",
                errors.len()
            )));
        }

        tracing::debug!(
            events = self.order.len(),
            restarts,
            eval = self.schedule.eval(),
            "solver found schedule"
        );
        Ok(self.schedule)
    }

    fn frame<R: Rng>(&self, depth: usize, rng: &mut R) -> Frame {
        let event = self.order[depth];
        let mut candidates = self.schedule.candidate_slots(event);
        candidates.shuffle(rng);

        let preferred = self.template.as_ref().and_then(|t| t.slot_of(event));
        if let Some(pos) = preferred.and_then(|p| candidates.iter().position(|&s| s == p)) {
            let slot = candidates.remove(pos);
            candidates.push(slot);
        }

        Frame {
            event,
            candidates,
            placed: None,
        }
    }

    /// Backtracking loop. Returns the number of root restarts on success.
    fn search<R: Rng>(&mut self, rng: &mut R) -> Result<usize, SolverError> {
        if self.order.is_empty() {
            return Ok(0);
        }

        let mut stack = vec![self.frame(0, rng)];
        let mut abandon = false;
        let mut restarts = 0usize;

        while let Some(frame) = stack.last_mut() {
            if let Some(slot) = frame.candidates.pop() {
                if !self.schedule.assign(frame.event, slot, true) {
                    continue;
                }
                frame.placed = Some(slot);

                let next = stack.len();
                if next == self.order.len() {
                    return Ok(restarts);
                }
                let child = self.frame(next, rng);
                stack.push(child);
                continue;
            }

            // No candidate left at this depth; report failure to the parents.
            stack.pop();
            while !stack.is_empty() {
                let depth = stack.len() - 1;
                let parent = &mut stack[depth];
                let Some(slot) = parent.placed.take() else {
                    break;
                };
                let event = parent.event;

                if abandon {
                    if depth > 0 {
                        self.schedule.clear_assignment(event);
                        stack.pop();
                        continue;
                    }
                    abandon = false;
                    parent.candidates.push(slot);
                    restarts += 1;
                    tracing::trace!(restarts, "branch abandoned, restarting at root");
                    if restarts > self.config.max_restarts {
                        return Err(SolverError::RestartLimit(self.config.max_restarts));
                    }
                }

                if rng.random_bool(self.config.abandon_probability) {
                    abandon = true;
                }
                self.schedule.clear_assignment(event);
                break;
            }
        }

        Err(SolverError::Exhausted {
            events: self.order.len(),
        })
    }
}
