//! One-line text orders, as typed on stdin or listed in a scenario file.
//!
//! ```text
//! nmap  <player> <slot> <mask>
//! mine  <player> <slot>
//! probe <player> <slot> <target-player> <target-slot>
//! probe <player> <slot> known <n>
//! ```
//!
//! Players are named by handle or by registration index.

use crate::command::Command;
use crate::game::Game;
use crate::player::Player;
use shared::{PlayerId, ServerRef};
use std::str::SplitWhitespace;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    #[error("empty order")]
    Empty,
    #[error("unknown order '{0}'")]
    UnknownVerb(String),
    #[error("'{verb}' is missing its {what}")]
    MissingArgument {
        verb: &'static str,
        what: &'static str,
    },
    #[error("unexpected trailing input '{0}'")]
    TrailingInput(String),
    #[error("'{0}' is not a valid number")]
    BadNumber(String),
    #[error("no player called '{0}'")]
    UnknownPlayer(String),
    #[error("{player} has no known server #{index}")]
    UnknownKnownServer { player: String, index: usize },
}

/// A parsed order: which server runs which command.
#[derive(Debug, Clone)]
pub struct Order {
    pub at: ServerRef,
    pub command: Command,
}

impl Order {
    pub fn new(at: ServerRef, command: Command) -> Self {
        Self { at, command }
    }

    /// Parses `line` against the players registered in `game`.
    ///
    /// Slots are not range-checked here; `Game::assign` rejects servers that
    /// do not exist.
    pub fn parse(line: &str, game: &Game) -> Result<Order, OrderError> {
        let mut args = Args {
            tokens: line.split_whitespace(),
            verb: "",
        };

        let verb = args.tokens.next().ok_or(OrderError::Empty)?;
        let order = match verb.to_ascii_lowercase().as_str() {
            "nmap" => {
                args.verb = "nmap";
                let at = args.server(game)?;
                let mask = args.next("mask")?;
                Order::new(at, Command::nmap(mask))
            }
            "mine" => {
                args.verb = "mine";
                Order::new(args.server(game)?, Command::mine())
            }
            "probe" => {
                args.verb = "probe";
                let at = args.server(game)?;
                let target = args.target(game, at.player)?;
                Order::new(at, Command::probe(target))
            }
            other => return Err(OrderError::UnknownVerb(other.to_string())),
        };

        args.finish()?;
        Ok(order)
    }
}

struct Args<'a> {
    tokens: SplitWhitespace<'a>,
    verb: &'static str,
}

impl<'a> Args<'a> {
    fn next(&mut self, what: &'static str) -> Result<&'a str, OrderError> {
        self.tokens.next().ok_or(OrderError::MissingArgument {
            verb: self.verb,
            what,
        })
    }

    fn number(&mut self, what: &'static str) -> Result<usize, OrderError> {
        let token = self.next(what)?;
        token
            .parse()
            .map_err(|_| OrderError::BadNumber(token.to_string()))
    }

    fn player<'g>(&mut self, game: &'g Game, what: &'static str) -> Result<&'g Player, OrderError> {
        let token = self.next(what)?;
        find_player(game, token).ok_or_else(|| OrderError::UnknownPlayer(token.to_string()))
    }

    fn server(&mut self, game: &Game) -> Result<ServerRef, OrderError> {
        let player = self.player(game, "player")?;
        let id = player
            .index
            .ok_or_else(|| OrderError::UnknownPlayer(player.handle.clone()))?;
        let slot = self.number("server slot")?;
        Ok(ServerRef::new(id, slot))
    }

    fn target(&mut self, game: &Game, owner: PlayerId) -> Result<ServerRef, OrderError> {
        let token = self.next("target")?;
        if token.eq_ignore_ascii_case("known") {
            let index = self.number("known server number")?;
            let player = game
                .player(owner)
                .ok_or_else(|| OrderError::UnknownPlayer(owner.to_string()))?;
            return player.known_servers.get(index).copied().ok_or_else(|| {
                OrderError::UnknownKnownServer {
                    player: player.handle.clone(),
                    index,
                }
            });
        }

        let player =
            find_player(game, token).ok_or_else(|| OrderError::UnknownPlayer(token.to_string()))?;
        let id = player
            .index
            .ok_or_else(|| OrderError::UnknownPlayer(player.handle.clone()))?;
        let slot = self.number("target slot")?;
        Ok(ServerRef::new(id, slot))
    }

    fn finish(mut self) -> Result<(), OrderError> {
        let rest: Vec<&str> = self.tokens.by_ref().collect();
        if rest.is_empty() {
            Ok(())
        } else {
            Err(OrderError::TrailingInput(rest.join(" ")))
        }
    }
}

fn find_player<'g>(game: &'g Game, token: &str) -> Option<&'g Player> {
    game.player_by_handle(token).or_else(|| {
        token
            .parse::<usize>()
            .ok()
            .and_then(|index| game.player(PlayerId(index)))
    })
}
