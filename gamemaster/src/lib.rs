//! # Game Master Library
//!
//! This library is the authoritative engine for the text-based hacking game.
//! It owns the canonical game state, attaches timed commands to servers and
//! resolves every running command once per tick.
//!
//! ## Core Responsibilities
//!
//! ### Authoritative State
//! The [`game::Game`] owns every player, every server and every running
//! command. Commands never hold references into the state; they address
//! servers through [`shared::ServerRef`] handles and receive a
//! [`command::Cycle`] view of the state while their hooks run.
//!
//! ### Tick Resolution
//! Each tick is a two-phase pass over all servers:
//! - Phase one runs `pre_cycle` for every active command. A command that
//!   reports a bad parameter is dropped on its own server only.
//! - Phase two runs `post_cycle`, counts the duration down and fires
//!   `completed` on the commands whose duration ran out.
//!
//! ### Orders and Scenarios
//! Orders are one-line text commands (`nmap Bob 0 *.*.*.*`). A scenario is a
//! JSON file listing the players and rounds of orders; the session driver
//! replays it on a timer and can take extra orders from stdin.
//!
//! ## Module Organization
//!
//! ### Command Module (`command`)
//! The hook set shared by all commands and the three command kinds:
//! - `NMap` scans for servers belonging to other players
//! - `Mine` earns a credit every cycle
//! - `Probe` looks for weaknesses on a known server
//!
//! ### Game Module (`game`)
//! Player registration, command assignment and the resolution pass.
//!
//! ### Session Module (`session`)
//! Fixed-rate driver that feeds orders in and writes a report after every
//! tick.
//!
//! ### Report Module (`report`)
//! Per-player views of the state, rendered as text or JSON.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use gamemaster::config::GameConfig;
//! use gamemaster::report::ReportFormat;
//! use gamemaster::scenario::Scenario;
//! use gamemaster::session::Session;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let scenario = Scenario::demo();
//!     let mut session = Session::from_scenario(&scenario, GameConfig::seeded(7));
//!
//!     // Four players scan, mine and probe, one report per 100ms tick
//!     let mut out = std::io::stdout();
//!     session
//!         .run(Duration::from_millis(100), None, ReportFormat::Text, &mut out)
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

pub mod command;
pub mod config;
pub mod error;
pub mod game;
pub mod order;
pub mod player;
pub mod report;
pub mod scenario;
pub mod server;
pub mod session;

pub use error::{BadCommand, GameError};
pub use game::Game;
