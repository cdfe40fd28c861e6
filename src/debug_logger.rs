// Debug logging module for asynchronous game state logging
//
// This module provides fire-and-forget async logging to avoid blocking
// the main request/response cycle. Each turn's state is written to a JSONL file
// that the replay tool can read back.

use log::error;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::policy::Decision;
use crate::types::Board;

/// Represents a single debug log entry
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LogEntry {
    pub turn: i32,
    pub game_id: String,
    pub timeout: u32,
    pub you_id: String,
    pub chosen_move: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub depth: u8,
    pub board: Board,
    pub timestamp: String,
}

impl LogEntry {
    /// Builds an entry for a decision taken now
    pub fn new(
        game_id: &str,
        timeout: u32,
        turn: i32,
        you_id: &str,
        board: Board,
        decision: &Decision,
    ) -> Self {
        LogEntry {
            turn,
            game_id: game_id.to_string(),
            timeout,
            you_id: you_id.to_string(),
            chosen_move: decision.direction.as_str().to_string(),
            source: decision.source.as_str().to_string(),
            score: decision.score.filter(|s| s.is_finite()),
            depth: decision.depth,
            board,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Shared debug logger state
/// Uses Arc<Mutex<File>> to allow concurrent async writes from multiple tasks
#[derive(Clone, Debug)]
pub struct DebugLogger {
    file: Arc<Mutex<Option<File>>>,
    enabled: bool,
}

impl DebugLogger {
    /// Creates a new debug logger
    /// If enabled is true, initializes the log file (truncating if it exists)
    pub async fn new(enabled: bool, log_file_path: &str) -> Self {
        if !enabled {
            return Self::disabled();
        }

        match OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(log_file_path)
            .await
        {
            Ok(file) => {
                log::info!("Debug logging enabled: {}", log_file_path);
                DebugLogger {
                    file: Arc::new(Mutex::new(Some(file))),
                    enabled: true,
                }
            }
            Err(e) => {
                error!("Failed to create debug log file '{}': {}", log_file_path, e);
                Self::disabled()
            }
        }
    }

    /// Creates a disabled debug logger (no-op)
    pub fn disabled() -> Self {
        DebugLogger {
            file: Arc::new(Mutex::new(None)),
            enabled: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Logs a move decision asynchronously (fire-and-forget)
    /// This spawns a tokio task that writes to the file without blocking
    pub fn log_move(&self, entry: LogEntry) {
        if !self.enabled {
            return;
        }

        let file_handle = self.file.clone();
        tokio::spawn(async move {
            Self::write_entry(file_handle, entry).await;
        });
    }

    /// Writes one entry and waits for it to reach the file
    pub async fn log_move_now(&self, entry: LogEntry) {
        if self.enabled {
            Self::write_entry(self.file.clone(), entry).await;
        }
    }

    async fn write_entry(file_handle: Arc<Mutex<Option<File>>>, entry: LogEntry) {
        let mut file_guard = file_handle.lock().await;

        if let Some(file) = file_guard.as_mut() {
            match serde_json::to_string(&entry) {
                Ok(json_line) => {
                    let line_with_newline = format!("{}\n", json_line);
                    if let Err(e) = file.write_all(line_with_newline.as_bytes()).await {
                        error!("Failed to write debug log entry: {}", e);
                    } else if let Err(e) = file.flush().await {
                        error!("Failed to flush debug log: {}", e);
                    }
                }
                Err(e) => {
                    error!("Failed to serialize debug log entry: {}", e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::DecisionSource;
    use crate::types::Direction;

    fn board() -> Board {
        Board {
            height: 7,
            width: 7,
            food: vec![],
            snakes: vec![],
            hazards: vec![],
        }
    }

    #[test]
    fn test_entry_drops_infinite_scores() {
        let decision = Decision {
            direction: Direction::Left,
            source: DecisionSource::Search,
            score: Some(f64::NEG_INFINITY),
            depth: 2,
        };
        let entry = LogEntry::new("g", 500, 3, "me", board(), &decision);
        assert_eq!(entry.chosen_move, "left");
        assert_eq!(entry.source, "search");
        assert_eq!(entry.score, None);
        assert!(serde_json::to_string(&entry).is_ok());
    }

    #[tokio::test]
    async fn test_entries_are_appended_as_json_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("debug.jsonl");
        let logger = DebugLogger::new(true, path.to_str().unwrap()).await;
        assert!(logger.is_enabled());

        let decision = Decision {
            direction: Direction::Up,
            source: DecisionSource::RandomSafe,
            score: Some(0.5),
            depth: 1,
        };
        for turn in 0..3 {
            logger
                .log_move_now(LogEntry::new("g", 500, turn, "me", board(), &decision))
                .await;
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        let last: LogEntry = serde_json::from_str(lines[2]).unwrap();
        assert_eq!(last.turn, 2);
        assert_eq!(last.score, Some(0.5));
    }

    #[tokio::test]
    async fn test_disabled_logger_writes_nothing() {
        let logger = DebugLogger::disabled();
        assert!(!logger.is_enabled());
        logger.log_move(LogEntry::new(
            "g",
            500,
            0,
            "me",
            board(),
            &Decision {
                direction: Direction::Down,
                source: DecisionSource::NoSafeMoves,
                score: None,
                depth: 0,
            },
        ));
    }
}
