// Grid geometry and occupancy checks

use crate::state::BoardState;
use crate::types::{Coord, Direction};

/// Position one step away from `position` in `direction`
pub fn neighbor(position: &Coord, direction: Direction) -> Coord {
    direction.apply(position)
}

/// Calculates Manhattan distance between two coordinates
pub fn manhattan_distance(a: &Coord, b: &Coord) -> i32 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}

/// Distance from `from` to the closest food item, `None` on an empty board
pub fn nearest_food_distance(from: &Coord, food: &[Coord]) -> Option<i32> {
    food.iter().map(|f| manhattan_distance(from, f)).min()
}

/// Whether a cell is free to move into, judged from our snake's point of view.
///
/// Checks run cheapest first: bounds, then our own body (minus the current
/// head), then every other snake's full body.
pub fn is_safe(position: &Coord, state: &BoardState) -> bool {
    if !state.in_bounds(position) {
        return false;
    }

    let you = state.you();
    if you.body.iter().skip(1).any(|segment| segment == position) {
        return false;
    }

    state
        .snakes
        .iter()
        .enumerate()
        .filter(|&(i, s)| i != state.you && s.id != you.id)
        .all(|(_, s)| !s.body.contains(position))
}

/// Number of the four cells around `position` that are currently safe
pub fn safe_neighbor_count(position: &Coord, state: &BoardState) -> usize {
    Direction::all()
        .iter()
        .filter(|&&dir| is_safe(&neighbor(position, dir), state))
        .count()
}
