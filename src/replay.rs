// Replay module for analyzing historical game states and debugging decision-making
//
// This module provides functionality to:
// 1. Parse JSONL debug logs
// 2. Replay the decision policy on historical states
// 3. Compare logged vs replayed moves
// 4. Generate summary reports

use log::{info, warn};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::{Duration, Instant};

use crate::bot::Bot;
use crate::config::Config;
use crate::debug_logger::LogEntry;
use crate::policy::DecisionSource;
use crate::state::BoardState;
use crate::types::{Direction, Game, GameState};

/// Result of replaying a single turn
#[derive(Debug, Clone)]
pub struct ReplayResult {
    pub turn: i32,
    pub original_move: Direction,
    pub replayed_move: Direction,
    pub matches: bool,
    pub replayed_source: DecisionSource,
    pub replayed_score: Option<f64>,
    pub search_depth: u8,
    pub computation_time_ms: u128,
}

/// Statistics for a complete replay session
#[derive(Debug, Default)]
pub struct ReplayStats {
    pub total_turns: usize,
    pub matches: usize,
    pub mismatches: usize,
    pub match_rate: f64,
}

/// Replay engine for analyzing debug logs
#[derive(Debug)]
pub struct ReplayEngine {
    config: Config,
    verbose: bool,
}

impl ReplayEngine {
    /// Creates a new replay engine. Random fallbacks are seeded with `seed`
    /// unless the configuration already fixes one, so replays are repeatable.
    pub fn new(mut config: Config, verbose: bool, seed: u64) -> Self {
        if config.policy.random_seed.is_none() {
            config.policy.random_seed = Some(seed);
        }
        ReplayEngine { config, verbose }
    }

    /// Loads all log entries from a JSONL file
    pub fn load_log_file<P: AsRef<Path>>(&self, log_path: P) -> Result<Vec<LogEntry>, String> {
        let file =
            File::open(log_path.as_ref()).map_err(|e| format!("Failed to open log file: {}", e))?;

        let reader = BufReader::new(file);
        let mut entries = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| format!("Failed to read line {}: {}", line_num + 1, e))?;

            if line.trim().is_empty() {
                continue;
            }

            let entry: LogEntry = serde_json::from_str(&line)
                .map_err(|e| format!("Failed to parse JSON on line {}: {}", line_num + 1, e))?;

            entries.push(entry);
        }

        info!("Loaded {} log entries", entries.len());
        Ok(entries)
    }

    /// Rebuilds the move request a log entry was produced from
    pub fn request_for(entry: &LogEntry) -> Result<GameState, String> {
        let you = entry
            .board
            .snakes
            .iter()
            .find(|s| s.id == entry.you_id)
            .cloned()
            .ok_or_else(|| format!("Snake with id '{}' not found in board state", entry.you_id))?;

        Ok(GameState {
            game: Game {
                id: entry.game_id.clone(),
                ruleset: HashMap::new(),
                timeout: entry.timeout,
                source: "replay".to_string(),
            },
            turn: entry.turn,
            board: entry.board.clone(),
            you,
        })
    }

    /// Replays a single log entry and compares the result
    pub fn replay_entry(&self, entry: &LogEntry) -> Result<ReplayResult, String> {
        if self.verbose {
            info!("Replaying turn {}...", entry.turn);
        }

        let original_move: Direction = entry.chosen_move.parse()?;
        let request = Self::request_for(entry)?;
        let state = BoardState::from_request(&request).map_err(|e| e.to_string())?;

        let start_time = Instant::now();
        let budget = self.config.timing.effective_budget_ms(entry.timeout);
        let decision = Bot::compute_move(&state, &self.config, start_time + Duration::from_millis(budget));
        let computation_time = start_time.elapsed().as_millis();

        let matches = original_move == decision.direction;
        let result = ReplayResult {
            turn: entry.turn,
            original_move,
            replayed_move: decision.direction,
            matches,
            replayed_source: decision.source,
            replayed_score: decision.score,
            search_depth: decision.depth,
            computation_time_ms: computation_time,
        };

        if self.verbose {
            if matches {
                info!(
                    "Turn {}: MATCH - {} via {} (depth: {}, time: {}ms)",
                    entry.turn,
                    decision.direction,
                    decision.source.as_str(),
                    decision.depth,
                    computation_time
                );
            } else {
                warn!(
                    "Turn {}: MISMATCH - Original: {}, Replayed: {} via {} (depth: {}, time: {}ms)",
                    entry.turn,
                    original_move,
                    decision.direction,
                    decision.source.as_str(),
                    decision.depth,
                    computation_time
                );
            }
        }

        Ok(result)
    }

    /// Replays all entries in a log file
    pub fn replay_all(&self, entries: &[LogEntry]) -> Vec<ReplayResult> {
        let mut results = Vec::new();

        for entry in entries {
            match self.replay_entry(entry) {
                Ok(result) => results.push(result),
                Err(e) => warn!("Failed to replay turn {}: {}", entry.turn, e),
            }
        }

        results
    }

    /// Replays specific turns from a log file
    pub fn replay_turns(
        &self,
        entries: &[LogEntry],
        turn_numbers: &[i32],
    ) -> Result<Vec<ReplayResult>, String> {
        let mut results = Vec::new();

        for turn_num in turn_numbers {
            let entry = entries
                .iter()
                .find(|e| e.turn == *turn_num)
                .ok_or_else(|| format!("Turn {} not found in log file", turn_num))?;

            match self.replay_entry(entry) {
                Ok(result) => results.push(result),
                Err(e) => warn!("Failed to replay turn {}: {}", turn_num, e),
            }
        }

        Ok(results)
    }

    /// Generates statistics from replay results
    pub fn generate_stats(&self, results: &[ReplayResult]) -> ReplayStats {
        let total_turns = results.len();
        let matches = results.iter().filter(|r| r.matches).count();
        let mismatches = total_turns - matches;
        let match_rate = if total_turns > 0 {
            (matches as f64 / total_turns as f64) * 100.0
        } else {
            0.0
        };

        ReplayStats {
            total_turns,
            matches,
            mismatches,
            match_rate,
        }
    }

    /// Prints a detailed report of replay results
    pub fn print_report(&self, results: &[ReplayResult]) {
        let stats = self.generate_stats(results);

        println!("\n═══════════════════════════════════════════════════════════");
        println!("                    REPLAY REPORT");
        println!("═══════════════════════════════════════════════════════════");
        println!("Total Turns:    {}", stats.total_turns);
        println!("Matches:        {} ({:.1}%)", stats.matches, stats.match_rate);
        println!("Mismatches:     {}", stats.mismatches);
        println!("═══════════════════════════════════════════════════════════\n");

        if !results.is_empty() {
            let avg_time: f64 = results.iter().map(|r| r.computation_time_ms as f64).sum::<f64>()
                / results.len() as f64;
            let avg_depth: f64 =
                results.iter().map(|r| f64::from(r.search_depth)).sum::<f64>() / results.len() as f64;
            let overrides = results
                .iter()
                .filter(|r| r.replayed_source == DecisionSource::LowHealthFood)
                .count();

            println!("Average Search Depth:       {:.1}", avg_depth);
            println!("Average Computation Time:   {:.1}ms", avg_time);
            println!("Low-Health Overrides:       {}\n", overrides);
        }

        let mismatches: Vec<_> = results.iter().filter(|r| !r.matches).collect();
        if !mismatches.is_empty() {
            println!("═══════════════════════════════════════════════════════════");
            println!("                  DETAILED MISMATCHES");
            println!("═══════════════════════════════════════════════════════════");

            for result in mismatches {
                println!(
                    "Turn {}: {} → {} via {} (depth: {}, time: {}ms)",
                    result.turn,
                    result.original_move,
                    result.replayed_move,
                    result.replayed_source.as_str(),
                    result.search_depth,
                    result.computation_time_ms
                );
            }
            println!();
        }
    }

    /// Validates that specific expected moves were made
    pub fn validate_expected_moves(
        &self,
        entries: &[LogEntry],
        expected_moves: &[(i32, Vec<Direction>)], // (turn, acceptable_moves)
    ) -> Result<(), String> {
        for (turn, acceptable) in expected_moves {
            let entry = entries
                .iter()
                .find(|e| e.turn == *turn)
                .ok_or_else(|| format!("Turn {} not found in log", turn))?;

            let actual_move: Direction = entry.chosen_move.parse()?;

            if !acceptable.contains(&actual_move) {
                return Err(format!(
                    "Turn {}: Expected one of {:?}, but got {}",
                    turn,
                    acceptable.iter().map(|d| d.as_str()).collect::<Vec<_>>(),
                    actual_move
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Battlesnake, Board, Coord};
    use serde_json::json;
    use std::io::Write;

    fn entry(turn: i32, chosen_move: &str, health: i32) -> LogEntry {
        let body = vec![Coord::new(3, 3), Coord::new(3, 2), Coord::new(3, 1)];
        LogEntry {
            turn,
            game_id: "g".to_string(),
            timeout: 500,
            you_id: "me".to_string(),
            chosen_move: chosen_move.to_string(),
            source: "search".to_string(),
            score: None,
            depth: 3,
            board: Board {
                height: 7,
                width: 7,
                food: vec![Coord::new(0, 3)],
                snakes: vec![Battlesnake {
                    id: "me".to_string(),
                    name: "me".to_string(),
                    health,
                    head: body[0],
                    length: 3,
                    body,
                    latency: json!("0"),
                    shout: None,
                }],
                hazards: vec![],
            },
            timestamp: "2024-01-01T00:00:00+00:00".to_string(),
        }
    }

    #[test]
    fn test_load_log_file_skips_blank_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{}", serde_json::to_string(&entry(0, "up", 90)).unwrap()).unwrap();
        writeln!(file).unwrap();
        writeln!(file, "{}", serde_json::to_string(&entry(1, "left", 89)).unwrap()).unwrap();

        let engine = ReplayEngine::new(Config::default_hardcoded(), false, 1);
        let entries = engine.load_log_file(file.path()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].chosen_move, "left");
    }

    #[test]
    fn test_load_log_file_reports_bad_line() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{{not json").unwrap();

        let engine = ReplayEngine::new(Config::default_hardcoded(), false, 1);
        let err = engine.load_log_file(file.path()).unwrap_err();
        assert!(err.contains("line 1"));
    }

    #[test]
    fn test_replay_low_health_turn_matches_food_move() {
        let engine = ReplayEngine::new(Config::default_hardcoded(), false, 1);
        let result = engine.replay_entry(&entry(5, "left", 20)).unwrap();
        assert!(result.matches);
        assert_eq!(result.replayed_source, DecisionSource::LowHealthFood);
    }

    #[test]
    fn test_replay_turns_rejects_unknown_turn() {
        let engine = ReplayEngine::new(Config::default_hardcoded(), false, 1);
        let entries = vec![entry(0, "up", 90)];
        assert!(engine.replay_turns(&entries, &[4]).is_err());
    }

    #[test]
    fn test_validate_expected_moves() {
        let engine = ReplayEngine::new(Config::default_hardcoded(), false, 1);
        let entries = vec![entry(0, "up", 90), entry(1, "left", 90)];

        assert!(engine
            .validate_expected_moves(&entries, &[(0, vec![Direction::Up]), (1, vec![Direction::Left, Direction::Right])])
            .is_ok());
        assert!(engine
            .validate_expected_moves(&entries, &[(1, vec![Direction::Up])])
            .is_err());
    }

    #[test]
    fn test_stats_from_results() {
        let engine = ReplayEngine::new(Config::default_hardcoded(), false, 1);
        let results = vec![
            engine.replay_entry(&entry(0, "left", 20)).unwrap(),
            engine.replay_entry(&entry(1, "right", 20)).unwrap(),
        ];
        let stats = engine.generate_stats(&results);
        assert_eq!(stats.total_turns, 2);
        assert_eq!(stats.matches, 1);
        assert_eq!(stats.mismatches, 1);
        assert!((stats.match_rate - 50.0).abs() < f64::EPSILON);
    }
}
