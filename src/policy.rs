// Per-turn decision policy
//
// Immediate safety filter, then search, then reconciliation of the search
// result with the safe set, then the low-health food override. Always
// produces a direction.

use log::{debug, info, warn};
use rand::Rng;
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::geometry::{is_safe, nearest_food_distance, neighbor, safe_neighbor_count};
use crate::search::Searcher;
use crate::simulator::advance;
use crate::state::{BoardState, Mover};
use crate::types::Direction;

/// Which stage settled the final move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionSource {
    /// Nothing was safe; the configured fallback was sent
    NoSafeMoves,
    /// The search's own choice
    Search,
    /// Search gave nothing usable; picked at random among safe moves
    RandomSafe,
    /// Low health sent us toward the closest food
    LowHealthFood,
    /// The decision task died; first safe move (or the fallback) was sent
    TaskFailed,
}

impl DecisionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionSource::NoSafeMoves => "no_safe_moves",
            DecisionSource::Search => "search",
            DecisionSource::RandomSafe => "random_safe",
            DecisionSource::LowHealthFood => "low_health_food",
            DecisionSource::TaskFailed => "task_failed",
        }
    }
}

/// The move chosen for one turn and how it was reached
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub direction: Direction,
    pub source: DecisionSource,
    /// Root score of the search, when it completed at least one depth
    pub score: Option<f64>,
    /// Deepest completed search depth (0 when search did not run)
    pub depth: u8,
}

/// Decision policy bound to a configuration
#[derive(Debug, Clone, Copy)]
pub struct DecisionPolicy<'a> {
    config: &'a Config,
}

impl<'a> DecisionPolicy<'a> {
    pub fn new(config: &'a Config) -> Self {
        DecisionPolicy { config }
    }

    /// Chooses this turn's move.
    ///
    /// # Arguments
    /// * `state` - Validated snapshot of the turn
    /// * `rng` - Source for the random-among-safe fallback
    /// * `deadline` - Instant by which the search must have unwound
    pub fn decide<R: Rng>(
        &self,
        state: &BoardState,
        rng: &mut R,
        deadline: Option<Instant>,
    ) -> Decision {
        let safe = self.safe_moves(state);
        if safe.is_empty() {
            let direction = self.config.policy.fallback_direction;
            warn!("Turn {}: No safe moves detected! Moving {}", state.turn, direction);
            return Decision {
                direction,
                source: DecisionSource::NoSafeMoves,
                score: None,
                depth: 0,
            };
        }
        debug!("Turn {}: safe moves {:?}", state.turn, safe);

        let mut searcher = Searcher::new(&self.config.weights)
            .with_min_time_remaining(Duration::from_millis(self.config.timing.min_time_remaining_ms));
        if let Some(deadline) = deadline {
            searcher = searcher.with_deadline(deadline);
        }

        let search = &self.config.search;
        let result = if search.iterative_deepening {
            searcher.iterative_deepening(state, search.depth, search.pruning)
        } else {
            searcher.search(state, search.depth, search.pruning)
        };
        debug!(
            "Turn {}: search visited {} nodes with {} cutoffs",
            state.turn,
            searcher.nodes(),
            searcher.cutoffs()
        );

        let score = result.map(|r| r.score);
        let depth = result.map_or(0, |r| r.depth);

        let mut decision = match result.and_then(|r| r.direction) {
            Some(direction) if safe.contains(&direction) => Decision {
                direction,
                source: DecisionSource::Search,
                score,
                depth,
            },
            other => {
                let direction = safe[rng.random_range(0..safe.len())];
                debug!(
                    "Turn {}: search returned {:?}, falling back to random safe move {}",
                    state.turn, other, direction
                );
                Decision {
                    direction,
                    source: DecisionSource::RandomSafe,
                    score,
                    depth,
                }
            }
        };

        if let Some(direction) = self.low_health_override(state, &safe) {
            if direction != decision.direction {
                info!(
                    "Turn {}: health {} below {}, heading {} for food instead of {}",
                    state.turn,
                    state.you().health,
                    self.config.policy.low_health_threshold,
                    direction,
                    decision.direction
                );
            }
            decision.direction = direction;
            decision.source = DecisionSource::LowHealthFood;
        }

        decision
    }

    /// Moves that survive the next step: no reversing onto the neck, no
    /// walls, no body segments (tails included). With trap lookahead on and
    /// more than one candidate, moves into a cell with no safe exit are
    /// dropped, which may leave nothing.
    pub fn safe_moves(&self, state: &BoardState) -> Vec<Direction> {
        let you = state.you();
        let head = you.head();
        let neck = you.neck();

        let immediate: Vec<Direction> = Direction::all()
            .iter()
            .copied()
            .filter(|&dir| {
                let next = neighbor(&head, dir);
                Some(next) != neck && is_safe(&next, state)
            })
            .collect();

        // A lone safe move is kept even if it leads into a pocket
        if !self.config.policy.trap_lookahead || immediate.len() <= 1 {
            return immediate;
        }

        immediate
            .into_iter()
            .filter(|&dir| !Self::leads_into_trap(state, dir))
            .collect()
    }

    /// Decision to send when the normal pipeline could not finish.
    ///
    /// `safe` is the result of [`Self::safe_moves`] for the same turn. The
    /// first safe move wins; the configured fallback is used only when
    /// nothing is safe.
    pub fn recovery(&self, safe: &[Direction]) -> Decision {
        Decision {
            direction: safe
                .first()
                .copied()
                .unwrap_or(self.config.policy.fallback_direction),
            source: DecisionSource::TaskFailed,
            score: None,
            depth: 0,
        }
    }

    /// True when our head, after moving `dir`, has no safe neighbour
    fn leads_into_trap(state: &BoardState, dir: Direction) -> bool {
        let next = advance(state, Mover::You, dir);
        safe_neighbor_count(&next.you().head(), &next) == 0
    }

    /// Safe move bringing our head closest to any food, when health is low
    fn low_health_override(&self, state: &BoardState, safe: &[Direction]) -> Option<Direction> {
        let you = state.you();
        if you.health >= self.config.policy.low_health_threshold || state.food.is_empty() {
            return None;
        }

        let head = you.head();
        safe.iter()
            .copied()
            .filter_map(|dir| {
                nearest_food_distance(&neighbor(&head, dir), &state.food).map(|d| (dir, d))
            })
            .min_by_key(|&(_, distance)| distance)
            .map(|(dir, _)| dir)
    }
}
