// Welcome to
// __________         __    __  .__                               __
// \______   \_____ _/  |__/  |_|  |   ____   ______ ____ _____  |  | __ ____
//  |    |  _/\__  \\   __\   __\  | _/ __ \ /  ___//    \\__  \ |  |/ // __ \
//  |    |   \ / __ \|  |  |  | |  |_\  ___/ \___ \|   |  \/ __ \|    <\  ___/
//  |________/(______/__|  |__| |____/\_____>______>___|__(______/__|__\\_____>
//
// The bot glues the HTTP endpoints to the decision engine: it validates the
// snapshot, runs the policy off the async runtime and reports the move.

use log::{error, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::{json, Value};
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::debug_logger::{DebugLogger, LogEntry};
use crate::policy::{Decision, DecisionPolicy};
use crate::state::{BoardState, SnapshotError};
use crate::types::GameState;

/// Battlesnake Bot with OOP-style API
/// Takes static configuration dependencies and exposes methods corresponding to API endpoints
#[derive(Debug)]
pub struct Bot {
    config: Config,
    logger: DebugLogger,
}

impl Bot {
    /// Creates a new Bot instance with the given configuration
    ///
    /// # Arguments
    /// * `config` - Static configuration that does not change during the bot's lifetime
    pub fn new(config: Config) -> Self {
        Bot {
            config,
            logger: DebugLogger::disabled(),
        }
    }

    /// Creates a Bot that records every decision through `logger`
    pub fn with_logger(config: Config, logger: DebugLogger) -> Self {
        Bot { config, logger }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns bot metadata and appearance
    /// Corresponds to GET / endpoint
    pub fn info(&self) -> Value {
        info!("INFO");

        json!({
            "apiversion": "1",
            "author": "alphabeta-snake",
            "color": "#FFA500",
            "head": "bendr",
            "tail": "sharp",
        })
    }

    /// Called when a game starts
    /// Corresponds to POST /start endpoint
    pub fn start(&self, request: &GameState) {
        info!(
            "GAME START: {}x{} board, {}ms timeout",
            request.board.width, request.board.height, request.game.timeout
        );
    }

    /// Called when a game ends
    /// Corresponds to POST /end endpoint
    pub fn end(&self, request: &GameState) {
        info!("GAME OVER after {} turns", request.turn);
    }

    /// Computes and returns the next move
    /// Corresponds to POST /move endpoint
    ///
    /// The snapshot is validated first; the decision itself runs on a blocking
    /// task with a deadline derived from the game timeout, so the search
    /// unwinds in time on its own.
    ///
    /// # Returns
    /// * `Value` - JSON response containing the chosen move direction
    /// * `SnapshotError` - The request describes an inconsistent board
    pub async fn get_move(&self, request: &GameState) -> Result<Value, SnapshotError> {
        let start_time = Instant::now();
        let turn = request.turn;

        let state = BoardState::from_request(request)?;

        let budget = self.config.timing.effective_budget_ms(request.game.timeout);
        let deadline = start_time + Duration::from_millis(budget);
        info!("Turn {}: Computing move ({}ms budget)", turn, budget);

        // Kept on this side of the task so a panic still leaves a safe answer
        let safe = DecisionPolicy::new(&self.config).safe_moves(&state);

        let config = self.config.clone();
        let decision = match tokio::task::spawn_blocking(move || {
            Bot::compute_move(&state, &config, deadline)
        })
        .await
        {
            Ok(decision) => decision,
            Err(e) => {
                let decision = DecisionPolicy::new(&self.config).recovery(&safe);
                error!(
                    "Turn {}: decision task failed: {}; sending {}",
                    turn, e, decision.direction
                );
                decision
            }
        };

        info!(
            "Turn {}: Chose {} via {} (score: {:?}, depth: {}, time: {}ms)",
            turn,
            decision.direction,
            decision.source.as_str(),
            decision.score,
            decision.depth,
            start_time.elapsed().as_millis()
        );

        self.logger.log_move(LogEntry::new(
            &request.game.id,
            request.game.timeout,
            turn,
            &request.you.id,
            request.board.clone(),
            &decision,
        ));

        Ok(json!({ "move": decision.direction.as_str() }))
    }

    /// Runs the decision policy for one validated snapshot
    pub fn compute_move(state: &BoardState, config: &Config, deadline: Instant) -> Decision {
        let mut rng = Self::rng_for_turn(config, state.turn);
        DecisionPolicy::new(config).decide(state, &mut rng, Some(deadline))
    }

    /// Seeded per turn when a seed is configured, from OS entropy otherwise
    pub fn rng_for_turn(config: &Config, turn: i32) -> StdRng {
        match config.policy.random_seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(turn as u64)),
            None => StdRng::from_os_rng(),
        }
    }
}
