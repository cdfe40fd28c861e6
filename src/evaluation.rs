// Static evaluation of a board from our snake's point of view

use crate::config::WeightsConfig;
use crate::geometry::{nearest_food_distance, safe_neighbor_count};
use crate::state::BoardState;

/// Scores a board as a weighted sum of health, relative length, food
/// proximity and immediate mobility. Higher is better for us.
pub fn evaluate(state: &BoardState, weights: &WeightsConfig) -> f64 {
    let you = state.you();
    let head = you.head();

    // Alone on the board we measure against ourselves
    let rival_length = state.rival().map_or(you.length, |r| r.length);

    let health_score = f64::from(you.health) / 100.0;
    let length_score = f64::from(you.length) / (f64::from(rival_length) + 1.0);
    let food_score = match nearest_food_distance(&head, &state.food) {
        Some(distance) => 1.0 / (f64::from(distance) + 1.0),
        None => 0.0,
    };
    let safety_score = safe_neighbor_count(&head, state) as f64 / 4.0;

    weights.health * health_score
        + weights.length * length_score
        + weights.food * food_score
        + weights.safety * safety_score
}
