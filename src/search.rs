// Adversarial game tree search
//
// Two-player alpha-beta between our snake (MAX) and the designated rival
// (MIN), one snake moving per ply. Nodes are expanded in place with
// apply_move/undo_move on a single working copy of the board.

use log::debug;
use std::time::{Duration, Instant};

use crate::config::WeightsConfig;
use crate::evaluation::evaluate;
use crate::geometry::{is_safe, neighbor};
use crate::state::{BoardState, Mover};
use crate::types::Direction;

/// Outcome of a completed search
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchResult {
    pub score: f64,
    /// `None` when no safe root move produced a usable score
    pub direction: Option<Direction>,
    /// Deepest fully completed depth
    pub depth: u8,
}

/// Raised inside the recursion when the deadline has passed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeadlineExceeded;

type NodeValue = (f64, Option<Direction>);

/// Search driver carrying the evaluation weights, deadline and node counters
#[derive(Debug)]
pub struct Searcher<'a> {
    weights: &'a WeightsConfig,
    deadline: Option<Instant>,
    min_time_remaining: Duration,
    nodes: u64,
    cutoffs: u64,
}

impl<'a> Searcher<'a> {
    pub fn new(weights: &'a WeightsConfig) -> Self {
        Searcher {
            weights,
            deadline: None,
            min_time_remaining: Duration::ZERO,
            nodes: 0,
            cutoffs: 0,
        }
    }

    /// Abort any search still running at `deadline`
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Skip starting a new depth when less than `margin` is left
    pub fn with_min_time_remaining(mut self, margin: Duration) -> Self {
        self.min_time_remaining = margin;
        self
    }

    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    pub fn cutoffs(&self) -> u64 {
        self.cutoffs
    }

    /// Searches depths 1..=max_depth, keeping the result of the deepest one
    /// that finished before the deadline
    pub fn iterative_deepening(
        &mut self,
        state: &BoardState,
        max_depth: u8,
        pruning: bool,
    ) -> Option<SearchResult> {
        let mut best = None;

        for depth in 1..=max_depth {
            if let Some(deadline) = self.deadline {
                let remaining = deadline.saturating_duration_since(Instant::now());
                if remaining <= self.min_time_remaining {
                    debug!("Stopping search: {}ms left before depth {}", remaining.as_millis(), depth);
                    break;
                }
            }

            match self.search(state, depth, pruning) {
                Some(result) => best = Some(result),
                None => {
                    debug!("Deadline hit during depth {}, keeping depth {:?}", depth, best.map(|r: SearchResult| r.depth));
                    break;
                }
            }
        }

        best
    }

    /// Runs one fixed-depth search from our snake's turn.
    /// Returns `None` if the deadline expired before it completed.
    pub fn search(&mut self, state: &BoardState, depth: u8, pruning: bool) -> Option<SearchResult> {
        let mut work = state.clone();
        let outcome = if pruning {
            self.alpha_beta(&mut work, depth, Mover::You, f64::NEG_INFINITY, f64::INFINITY)
        } else {
            self.minimax(&mut work, depth, Mover::You)
        };

        match outcome {
            Ok((score, direction)) => {
                debug!(
                    "Depth {} complete: {:?} score {:.4} ({} nodes, {} cutoffs)",
                    depth, direction, score, self.nodes, self.cutoffs
                );
                Some(SearchResult { score, direction, depth })
            }
            Err(DeadlineExceeded) => None,
        }
    }

    /// Alpha-beta over the two-snake tree. `state` is restored before returning.
    pub fn alpha_beta(
        &mut self,
        state: &mut BoardState,
        depth: u8,
        mover: Mover,
        alpha: f64,
        beta: f64,
    ) -> Result<NodeValue, DeadlineExceeded> {
        self.node(state, depth, mover, alpha, beta, true)
    }

    /// Exhaustive minimax over the same tree, without pruning
    pub fn minimax(
        &mut self,
        state: &mut BoardState,
        depth: u8,
        mover: Mover,
    ) -> Result<NodeValue, DeadlineExceeded> {
        self.node(state, depth, mover, f64::NEG_INFINITY, f64::INFINITY, false)
    }

    fn node(
        &mut self,
        state: &mut BoardState,
        depth: u8,
        mover: Mover,
        mut alpha: f64,
        mut beta: f64,
        pruning: bool,
    ) -> Result<NodeValue, DeadlineExceeded> {
        self.nodes += 1;

        if depth == 0 {
            return Ok((evaluate(state, self.weights), None));
        }

        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(DeadlineExceeded);
            }
        }

        let head = match mover {
            Mover::You => state.you().head(),
            Mover::Rival => match state.rival() {
                Some(rival) => rival.head(),
                // Nobody to oppose us: the ply passes straight back
                None => {
                    let (score, _) = self.node(state, depth - 1, Mover::You, alpha, beta, pruning)?;
                    return Ok((score, None));
                }
            },
        };

        let maximizing = mover == Mover::You;
        let next_mover = if maximizing { Mover::Rival } else { Mover::You };
        let mut best_score = if maximizing { f64::NEG_INFINITY } else { f64::INFINITY };
        let mut best_move = None;

        for dir in Direction::all() {
            if !is_safe(&neighbor(&head, dir), state) {
                continue;
            }

            let undo = match state.apply_move(mover, dir) {
                Some(undo) => undo,
                None => continue,
            };
            let child = self.node(state, depth - 1, next_mover, alpha, beta, pruning);
            state.undo_move(undo);
            let (score, _) = child?;

            if maximizing {
                if score > best_score {
                    best_score = score;
                    best_move = Some(dir);
                }
                alpha = alpha.max(score);
            } else {
                if score < best_score {
                    best_score = score;
                    best_move = Some(dir);
                }
                beta = beta.min(score);
            }

            if pruning && beta <= alpha {
                self.cutoffs += 1;
                break;
            }
        }

        Ok((best_score, best_move))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::SnakeState;
    use crate::types::Coord;

    fn open_board() -> BoardState {
        let me = SnakeState::new("me", vec![Coord::new(3, 3), Coord::new(3, 2)], 90);
        BoardState::new(7, 7, vec![], vec![me], 0)
    }

    #[test]
    fn test_depth_zero_is_static_evaluation() {
        let weights = WeightsConfig::default();
        let mut state = open_board();
        let mut searcher = Searcher::new(&weights);
        let (score, dir) = searcher.alpha_beta(&mut state, 0, Mover::You, f64::NEG_INFINITY, f64::INFINITY).unwrap();
        assert_eq!(score, evaluate(&open_board(), &weights));
        assert_eq!(dir, None);
    }

    #[test]
    fn test_search_leaves_input_untouched() {
        let weights = WeightsConfig::default();
        let state = open_board();
        let before = state.clone();
        let result = Searcher::new(&weights).search(&state, 3, true).unwrap();
        assert!(result.direction.is_some());
        assert_eq!(state, before);
    }

    #[test]
    fn test_walks_onto_adjacent_food() {
        let weights = WeightsConfig::default();
        let me = SnakeState::new("me", vec![Coord::new(3, 3), Coord::new(3, 2)], 40);
        let state = BoardState::new(7, 7, vec![Coord::new(4, 3)], vec![me], 0);
        let result = Searcher::new(&weights).search(&state, 1, true).unwrap();
        assert_eq!(result.direction, Some(Direction::Right));
    }

    #[test]
    fn test_boxed_in_root_has_no_move() {
        let weights = WeightsConfig::default();
        // Head in the corner, neck above, rival blocking the only other exit
        let me = SnakeState::new("me", vec![Coord::new(0, 0), Coord::new(0, 1)], 90);
        let rival = SnakeState::new("rival", vec![Coord::new(1, 0), Coord::new(2, 0)], 90);
        let state = BoardState::new(5, 5, vec![], vec![me, rival], 0);

        let result = Searcher::new(&weights).search(&state, 3, true).unwrap();
        assert_eq!(result.direction, None);
        assert_eq!(result.score, f64::NEG_INFINITY);
    }

    #[test]
    fn test_expired_deadline_yields_nothing() {
        let weights = WeightsConfig::default();
        let state = open_board();
        let mut searcher = Searcher::new(&weights).with_deadline(Instant::now());
        assert_eq!(searcher.search(&state, 3, true), None);
        assert_eq!(searcher.iterative_deepening(&state, 3, true), None);
    }

    #[test]
    fn test_iterative_deepening_reaches_max_depth() {
        let weights = WeightsConfig::default();
        let state = open_board();
        let mut searcher =
            Searcher::new(&weights).with_deadline(Instant::now() + Duration::from_secs(30));
        let result = searcher.iterative_deepening(&state, 3, true).unwrap();
        assert_eq!(result.depth, 3);
        assert_eq!(result, Searcher::new(&weights).search(&state, 3, true).unwrap());
    }

    #[test]
    fn test_deadline_mid_search_keeps_last_complete_depth() {
        let weights = WeightsConfig::default();
        let me = SnakeState::new("me", vec![Coord::new(2, 2), Coord::new(2, 1)], 70);
        let rival = SnakeState::new("rival", vec![Coord::new(8, 8), Coord::new(8, 9)], 70);
        let state = BoardState::new(11, 11, vec![Coord::new(5, 5)], vec![me, rival], 0);

        let mut searcher =
            Searcher::new(&weights).with_deadline(Instant::now() + Duration::from_millis(50));
        let result = searcher
            .iterative_deepening(&state, 40, true)
            .expect("depth 1 fits in 50ms");

        assert!(result.depth >= 1 && result.depth < 40, "depth {}", result.depth);
        let fixed = Searcher::new(&weights).search(&state, result.depth, true).unwrap();
        assert_eq!(result.direction, fixed.direction);
    }

    #[test]
    fn test_pruning_cuts_nodes_in_a_duel() {
        let weights = WeightsConfig::default();
        let me = SnakeState::new("me", vec![Coord::new(2, 2), Coord::new(2, 1)], 70);
        let rival = SnakeState::new("rival", vec![Coord::new(6, 6), Coord::new(6, 7)], 70);
        let state = BoardState::new(11, 11, vec![Coord::new(4, 4)], vec![me, rival], 0);

        let mut pruned = Searcher::new(&weights);
        let a = pruned.search(&state, 4, true).unwrap();
        let mut full = Searcher::new(&weights);
        let b = full.search(&state, 4, false).unwrap();

        assert_eq!(a, b);
        assert!(pruned.nodes() <= full.nodes());
    }
}
