//! Scripted games loaded from JSON.

use crate::config::GameConfig;
use crate::game::Game;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("scenario has no players")]
    NoPlayers,
    #[error("player '{0}' is listed twice")]
    DuplicateHandle(String),
    #[error("round {0} runs for zero ticks")]
    EmptyRound(usize),
}

fn default_ticks() -> u32 {
    1
}

/// Orders issued together, followed by `ticks` resolution passes. At least
/// one pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    pub orders: Vec<String>,
    #[serde(default = "default_ticks")]
    pub ticks: u32,
}

impl Round {
    pub fn new(orders: Vec<String>, ticks: u32) -> Self {
        Self { orders, ticks }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub players: Vec<String>,
    #[serde(default)]
    pub servers_per_player: Option<usize>,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub rounds: Vec<Round>,
}

impl Scenario {
    /// Four players scan, mine once, then probe the first server they found.
    pub fn demo() -> Self {
        let players = ["Bob", "Mary", "Fred", "Sue"];
        let orders = |make: fn(&str) -> String| -> Vec<String> {
            players.iter().map(|p| make(p)).collect()
        };

        Self {
            players: players.iter().map(|p| p.to_string()).collect(),
            servers_per_player: None,
            seed: None,
            rounds: vec![
                Round::new(orders(|p| format!("nmap {} 0 *.*.*.*", p)), 4),
                Round::new(orders(|p| format!("mine {} 1", p)), 1),
                Round::new(orders(|p| format!("probe {} 2 known 0", p)), 2),
            ],
        }
    }

    pub fn from_json(text: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = serde_json::from_str(text)?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn validate(&self) -> Result<(), ScenarioError> {
        if self.players.is_empty() {
            return Err(ScenarioError::NoPlayers);
        }

        let mut seen = HashSet::new();
        for handle in &self.players {
            if !seen.insert(handle.as_str()) {
                return Err(ScenarioError::DuplicateHandle(handle.clone()));
            }
        }

        if let Some(index) = self.rounds.iter().position(|r| r.ticks == 0) {
            return Err(ScenarioError::EmptyRound(index));
        }
        Ok(())
    }

    /// Settings the scenario asks for, on top of the defaults
    pub fn config(&self) -> GameConfig {
        let defaults = GameConfig::default();
        GameConfig {
            servers_per_player: self
                .servers_per_player
                .unwrap_or(defaults.servers_per_player),
            seed: self.seed,
        }
    }

    /// Creates a game with every listed player registered
    pub fn build_game(&self, config: GameConfig) -> Game {
        let mut game = Game::new(config);
        for handle in &self.players {
            game.create_player(handle.as_str());
        }
        game
    }
}
