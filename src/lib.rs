// Library exports for the Battlesnake bot
// The server binary, the replay tool and the integration tests all go through here

pub mod bot;
pub mod config;
pub mod debug_logger;
pub mod evaluation;
pub mod geometry;
pub mod policy;
pub mod replay;
pub mod search;
pub mod simulator;
pub mod state;
pub mod types;
