// Integration tests for the /move flow through the Bot
//
// Tests that:
// 1. A completely trapped snake answers with the configured fallback move
// 2. A snake with one way out takes it
// 3. Malformed snapshots are rejected before any decision is made
// 4. Every answer is one of the four API tokens

use alphabeta_snake::bot::Bot;
use alphabeta_snake::config::Config;
use alphabeta_snake::state::SnapshotError;
use alphabeta_snake::types::{Battlesnake, Board, Coord, Game, GameState};
use serde_json::json;
use std::collections::HashMap;

fn snake(id: &str, body: Vec<Coord>, health: i32) -> Battlesnake {
    Battlesnake {
        id: id.to_string(),
        name: id.to_string(),
        health,
        head: body[0],
        length: body.len() as i32,
        body,
        latency: json!("0"),
        shout: None,
    }
}

fn request(snakes: Vec<Battlesnake>, you: usize, food: Vec<Coord>) -> GameState {
    GameState {
        game: Game {
            id: "test-game".to_string(),
            ruleset: HashMap::new(),
            timeout: 500,
            source: "test".to_string(),
        },
        turn: 12,
        you: snakes[you].clone(),
        board: Board {
            height: 11,
            width: 11,
            food,
            snakes,
            hazards: vec![],
        },
    }
}

/// Test: Snake at top wall, boxed in by its own body and an opponent.
/// No move is safe, so the configured fallback is sent.
#[tokio::test]
async fn test_fully_trapped_snake_sends_fallback() {
    let bot = Bot::new(Config::default_hardcoded());

    let me = snake(
        "our-snake",
        vec![Coord::new(5, 10), Coord::new(5, 9), Coord::new(4, 9), Coord::new(4, 10)],
        50,
    );
    let opponent = snake(
        "opponent",
        vec![Coord::new(6, 10), Coord::new(6, 9), Coord::new(6, 8)],
        50,
    );

    let response = bot.get_move(&request(vec![me, opponent], 0, vec![])).await.unwrap();
    assert_eq!(response["move"], "down");
}

/// Test: Snake in the bottom-left corner area with only "up" open
#[tokio::test]
async fn test_single_exit_is_taken() {
    let bot = Bot::new(Config::default_hardcoded());

    let me = snake(
        "our-snake",
        vec![Coord::new(0, 0), Coord::new(1, 0), Coord::new(2, 0)],
        80,
    );

    let response = bot.get_move(&request(vec![me], 0, vec![])).await.unwrap();
    assert_eq!(response["move"], "up");
}

/// Test: Hungry snake beside food grabs it
#[tokio::test]
async fn test_hungry_snake_eats_adjacent_food() {
    let bot = Bot::new(Config::default_hardcoded());

    let me = snake(
        "our-snake",
        vec![Coord::new(5, 5), Coord::new(5, 4), Coord::new(5, 3)],
        12,
    );
    let opponent = snake(
        "opponent",
        vec![Coord::new(9, 9), Coord::new(9, 8), Coord::new(9, 7)],
        90,
    );

    let response = bot
        .get_move(&request(vec![opponent, me], 1, vec![Coord::new(6, 5)]))
        .await
        .unwrap();
    assert_eq!(response["move"], "right");
}

/// Test: The controlled snake missing from the board is a caller error
#[tokio::test]
async fn test_missing_self_is_rejected() {
    let bot = Bot::new(Config::default_hardcoded());

    let me = snake("our-snake", vec![Coord::new(5, 5), Coord::new(5, 4)], 80);
    let opponent = snake("opponent", vec![Coord::new(1, 1), Coord::new(1, 2)], 80);

    let mut req = request(vec![opponent], 0, vec![]);
    req.you = me;

    let err = bot.get_move(&req).await.unwrap_err();
    assert_eq!(err, SnapshotError::MissingSelf("our-snake".to_string()));
}

/// Test: Stale length is rejected
#[tokio::test]
async fn test_inconsistent_length_is_rejected() {
    let bot = Bot::new(Config::default_hardcoded());

    let mut me = snake("our-snake", vec![Coord::new(5, 5), Coord::new(5, 4)], 80);
    me.length = 3;

    let err = bot.get_move(&request(vec![me], 0, vec![])).await.unwrap_err();
    assert!(matches!(err, SnapshotError::LengthMismatch { .. }));
}

/// Test: Answers are always one of the API tokens across a spread of boards
#[tokio::test]
async fn test_response_is_always_a_direction_token() {
    let mut config = Config::default_hardcoded();
    config.policy.random_seed = Some(3);
    let bot = Bot::new(config);

    for x in 0..11 {
        let me = snake(
            "our-snake",
            vec![Coord::new(x, 0), Coord::new(x, 1)],
            (x * 9) % 100,
        );
        let opponent = snake(
            "opponent",
            vec![Coord::new(10 - x, 5), Coord::new(10 - x, 6)],
            70,
        );

        let response = bot
            .get_move(&request(vec![me, opponent], 0, vec![Coord::new(5, 2)]))
            .await
            .unwrap();
        let token = response["move"].as_str().unwrap();
        assert!(["up", "down", "left", "right"].contains(&token), "bad token {}", token);
    }
}

#[test]
fn test_info_reports_api_version() {
    let bot = Bot::new(Config::default_hardcoded());
    assert_eq!(bot.info()["apiversion"], "1");
}
