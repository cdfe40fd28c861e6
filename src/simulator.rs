// One-step game simulation
//
// `advance` is the pure form: it clones the board and moves one snake.
// The search uses `apply_move` / `undo_move` instead so a node costs no
// allocation beyond the body deque growing by a segment.

use crate::geometry::neighbor;
use crate::state::{BoardState, Mover};
use crate::types::{Coord, Direction};

/// Health after eating
pub const HEALTH_ON_FOOD: i32 = 100;
/// Health lost by the mover on every step
pub const HEALTH_LOSS_PER_TURN: i32 = 1;

/// Everything needed to restore the board after `apply_move`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveUndo {
    snake: usize,
    health: i32,
    length: i32,
    tail: Option<Coord>,
    eaten: Option<(usize, Coord)>,
}

impl MoveUndo {
    pub fn ate_food(&self) -> bool {
        self.eaten.is_some()
    }
}

/// Returns the board after `mover` steps in `direction`; the input is untouched
pub fn advance(state: &BoardState, mover: Mover, direction: Direction) -> BoardState {
    let mut next = state.clone();
    next.apply_move(mover, direction);
    next
}

impl BoardState {
    /// Moves one snake in place. Returns `None` (and changes nothing) when the
    /// mover is the rival and the board has none.
    pub fn apply_move(&mut self, mover: Mover, direction: Direction) -> Option<MoveUndo> {
        let idx = self.mover_index(mover)?;
        let snake = &mut self.snakes[idx];

        let new_head = neighbor(&snake.head(), direction);
        let mut undo = MoveUndo {
            snake: idx,
            health: snake.health,
            length: snake.length,
            tail: None,
            eaten: None,
        };

        snake.body.push_front(new_head);
        undo.tail = snake.body.pop_back();
        snake.health = (snake.health - HEALTH_LOSS_PER_TURN).max(0);

        if let Some(food_idx) = self.food.iter().position(|f| *f == new_head) {
            let eaten = self.food.remove(food_idx);
            snake.health = HEALTH_ON_FOOD;
            if let Some(&last) = snake.body.back() {
                snake.body.push_back(last);
            }
            snake.length += 1;
            undo.eaten = Some((food_idx, eaten));
        }

        Some(undo)
    }

    /// Reverts the move recorded in `undo`. Moves must be undone in reverse order.
    pub fn undo_move(&mut self, undo: MoveUndo) {
        let snake = &mut self.snakes[undo.snake];

        if let Some((food_idx, food)) = undo.eaten {
            snake.body.pop_back();
            self.food.insert(food_idx, food);
        }
        if let Some(tail) = undo.tail {
            snake.body.push_back(tail);
        }
        snake.body.pop_front();
        snake.health = undo.health;
        snake.length = undo.length;
    }
}
