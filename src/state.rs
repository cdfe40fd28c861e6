// Internal board representation used by the decision engine
//
// The wire payload carries our snake twice (`you` and an entry in
// `board.snakes`). Here it exists exactly once: `you` is an index into
// `snakes`, so every simulated move goes through a single mutation path.

use std::collections::{HashSet, VecDeque};
use thiserror::Error;

use crate::types::{Coord, GameState};

/// Structural problems that make a snapshot unusable for search
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("invalid board dimensions {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },
    #[error("snake '{0}' has an empty body")]
    EmptyBody(String),
    #[error("snake '{0}' head does not match body[0]")]
    HeadMismatch(String),
    #[error("snake '{id}' reports length {length} but has {body} body segments")]
    LengthMismatch { id: String, length: i32, body: usize },
    #[error("snake '{id}' has health {health} outside [0, 100]")]
    HealthOutOfRange { id: String, health: i32 },
    #[error("snake id '{0}' appears more than once on the board")]
    DuplicateSnake(String),
    #[error("controlled snake '{0}' is not on the board")]
    MissingSelf(String),
    #[error("controlled snake '{0}' differs from its board entry")]
    SelfMismatch(String),
}

/// A snake as the engine sees it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnakeState {
    pub id: String,
    /// Head-first body segments
    pub body: VecDeque<Coord>,
    pub health: i32,
    pub length: i32,
}

impl SnakeState {
    pub fn new(id: impl Into<String>, body: Vec<Coord>, health: i32) -> Self {
        let length = body.len() as i32;
        SnakeState {
            id: id.into(),
            body: body.into_iter().collect(),
            health,
            length,
        }
    }

    pub fn head(&self) -> Coord {
        self.body[0]
    }

    /// Second body segment, if the snake has one distinct from the head
    pub fn neck(&self) -> Option<Coord> {
        self.body.get(1).copied().filter(|&n| n != self.head())
    }
}

/// Which snake moves in a simulated ply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mover {
    /// The controlled snake (maximizer)
    You,
    /// The designated rival (minimizer)
    Rival,
}

/// Self-contained snapshot of one turn
#[derive(Debug, Clone, PartialEq)]
pub struct BoardState {
    pub width: i32,
    pub height: i32,
    pub food: Vec<Coord>,
    pub snakes: Vec<SnakeState>,
    /// Index of the controlled snake in `snakes`
    pub you: usize,
    /// Index of the first snake whose id differs from ours
    pub rival: Option<usize>,
    pub turn: i32,
    pub timeout_ms: u32,
}

impl BoardState {
    /// Builds a board from explicit parts, picking the rival by board order
    pub fn new(
        width: i32,
        height: i32,
        food: Vec<Coord>,
        snakes: Vec<SnakeState>,
        you: usize,
    ) -> Self {
        let rival = Self::find_rival(&snakes, you);
        BoardState {
            width,
            height,
            food,
            snakes,
            you,
            rival,
            turn: 0,
            timeout_ms: 500,
        }
    }

    /// Validates a move request and converts it to the internal representation
    pub fn from_request(request: &GameState) -> Result<Self, SnapshotError> {
        let board = &request.board;
        if board.width <= 0 || board.height <= 0 {
            return Err(SnapshotError::InvalidDimensions {
                width: board.width,
                height: board.height,
            });
        }

        let mut seen = HashSet::new();
        let mut snakes = Vec::with_capacity(board.snakes.len());
        for snake in &board.snakes {
            if !seen.insert(snake.id.as_str()) {
                return Err(SnapshotError::DuplicateSnake(snake.id.clone()));
            }
            if snake.body.is_empty() {
                return Err(SnapshotError::EmptyBody(snake.id.clone()));
            }
            if snake.head != snake.body[0] {
                return Err(SnapshotError::HeadMismatch(snake.id.clone()));
            }
            if snake.length as usize != snake.body.len() || snake.length < 0 {
                return Err(SnapshotError::LengthMismatch {
                    id: snake.id.clone(),
                    length: snake.length,
                    body: snake.body.len(),
                });
            }
            if !(0..=100).contains(&snake.health) {
                return Err(SnapshotError::HealthOutOfRange {
                    id: snake.id.clone(),
                    health: snake.health,
                });
            }
            snakes.push(SnakeState {
                id: snake.id.clone(),
                body: snake.body.iter().copied().collect(),
                health: snake.health,
                length: snake.length,
            });
        }

        let you = board
            .snakes
            .iter()
            .position(|s| s.id == request.you.id)
            .ok_or_else(|| SnapshotError::MissingSelf(request.you.id.clone()))?;

        let entry = &board.snakes[you];
        if entry.body != request.you.body
            || entry.health != request.you.health
            || entry.length != request.you.length
        {
            return Err(SnapshotError::SelfMismatch(request.you.id.clone()));
        }

        let mut state = BoardState::new(board.width, board.height, board.food.clone(), snakes, you);
        state.turn = request.turn;
        state.timeout_ms = request.game.timeout;
        Ok(state)
    }

    fn find_rival(snakes: &[SnakeState], you: usize) -> Option<usize> {
        let our_id = &snakes.get(you)?.id;
        snakes.iter().position(|s| &s.id != our_id)
    }

    pub fn you(&self) -> &SnakeState {
        &self.snakes[self.you]
    }

    pub fn rival(&self) -> Option<&SnakeState> {
        self.rival.map(|i| &self.snakes[i])
    }

    /// Resolves a mover to its snake index; `None` when no rival exists
    pub fn mover_index(&self, mover: Mover) -> Option<usize> {
        match mover {
            Mover::You => Some(self.you),
            Mover::Rival => self.rival,
        }
    }

    pub fn in_bounds(&self, coord: &Coord) -> bool {
        coord.x >= 0 && coord.x < self.width && coord.y >= 0 && coord.y < self.height
    }
}
