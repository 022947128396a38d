//! Drives a game on a timer.
//!
//! A session replays scenario rounds, takes extra orders from a channel and
//! runs one resolution pass per interval tick, writing a report after each.

use crate::config::GameConfig;
use crate::error::GameError;
use crate::game::Game;
use crate::order::{Order, OrderError};
use crate::report::{self, ReportFormat};
use crate::scenario::{Round, Scenario};
use log::{info, warn};
use shared::ServerRef;
use std::collections::VecDeque;
use std::io::{self, Write};
use thiserror::Error;
use tokio::sync::mpsc::{self, error::TryRecvError};
use tokio::time::{interval, Duration, MissedTickBehavior};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IssueError {
    #[error(transparent)]
    Order(#[from] OrderError),
    #[error(transparent)]
    Game(#[from] GameError),
}

pub struct Session {
    game: Game,
    rounds: VecDeque<Round>,
    ticks_left: u32,
    max_ticks: Option<u64>,
}

impl Session {
    pub fn new(game: Game, rounds: impl IntoIterator<Item = Round>) -> Self {
        Self {
            game,
            rounds: rounds.into_iter().collect(),
            ticks_left: 0,
            max_ticks: None,
        }
    }

    pub fn from_scenario(scenario: &Scenario, config: GameConfig) -> Self {
        Self::new(scenario.build_game(config), scenario.rounds.clone())
    }

    /// Stops the session after `max_ticks` resolution passes
    pub fn with_max_ticks(mut self, max_ticks: Option<u64>) -> Self {
        self.max_ticks = max_ticks;
        self
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn into_game(self) -> Game {
        self.game
    }

    /// True once every scripted round has been issued and played out
    pub fn is_scripted_done(&self) -> bool {
        self.ticks_left == 0 && self.rounds.is_empty()
    }

    fn hit_tick_limit(&self) -> bool {
        self.max_ticks.is_some_and(|max| self.game.tick() >= max)
    }

    /// Parses one order line and attaches it.
    pub fn issue(&mut self, line: &str) -> Result<ServerRef, IssueError> {
        let order = Order::parse(line, &self.game)?;
        let at = order.at;
        self.game.assign(at, order.command)?;
        Ok(at)
    }

    /// Issues `line`, logging the outcome. Returns whether it was accepted.
    fn issue_logged(&mut self, line: &str) -> bool {
        match self.issue(line) {
            Ok(at) => {
                info!("Order '{}' accepted on {}", line.trim(), at);
                true
            }
            Err(e) => {
                warn!("Order '{}' rejected: {}", line.trim(), e);
                false
            }
        }
    }

    /// Issues due orders and runs one resolution pass.
    ///
    /// Returns false without resolving when there is nothing left to do.
    /// Rejected extra orders count as nothing to do. Repeating commands alone
    /// only keep the game ticking under a tick limit.
    pub fn step(&mut self, extra_orders: &[String]) -> bool {
        if self.hit_tick_limit() {
            return false;
        }

        let mut scripted = false;
        if self.ticks_left == 0 {
            if let Some(round) = self.rounds.pop_front() {
                for line in &round.orders {
                    self.issue_logged(line);
                }
                // Rounds built by hand skip scenario validation
                self.ticks_left = round.ticks.max(1);
                scripted = true;
            }
        }

        let mut accepted = 0;
        for line in extra_orders {
            if self.issue_logged(line) {
                accepted += 1;
            }
        }

        let pending = scripted
            || self.ticks_left > 0
            || accepted > 0
            || self.game.pending_commands() > 0
            || (self.max_ticks.is_some() && self.game.active_commands() > 0);
        if !pending {
            return false;
        }

        self.game.resolve();
        self.ticks_left = self.ticks_left.saturating_sub(1);
        true
    }

    /// Runs until the script is done and only repeating commands are left,
    /// or until the tick limit.
    ///
    /// With an order channel the session stays up after the script ends and
    /// keeps waiting for orders until the sender goes away.
    pub async fn run<W: Write>(
        &mut self,
        period: Duration,
        mut orders: Option<mpsc::Receiver<String>>,
        format: ReportFormat,
        out: &mut W,
    ) -> io::Result<()> {
        let mut timer = interval(period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            "Session for game {} started with {} player(s)",
            self.game.id(),
            self.game.players().len()
        );
        self.write_report(format, out)?;

        loop {
            timer.tick().await;

            let mut extra = Vec::new();
            if let Some(rx) = orders.as_mut() {
                loop {
                    match rx.try_recv() {
                        Ok(line) => extra.push(line),
                        Err(TryRecvError::Empty) => break,
                        Err(TryRecvError::Disconnected) => {
                            info!("Order channel closed");
                            orders = None;
                            break;
                        }
                    }
                }
            }

            if self.step(&extra) {
                self.write_report(format, out)?;
                continue;
            }

            if orders.is_none() || self.hit_tick_limit() {
                break;
            }
        }

        info!("Session ended after {} tick(s)", self.game.tick());
        Ok(())
    }

    fn write_report<W: Write>(&self, format: ReportFormat, out: &mut W) -> io::Result<()> {
        let report = report::render(&self.game, format)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        writeln!(out, "{}", report.trim_end())?;
        out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Lifecycle;
    use shared::PlayerId;
    use tokio_test::{assert_err, assert_ok};

    fn session(rounds: Vec<Round>) -> Session {
        let mut game = Game::with_seed(8);
        game.create_player("Bob");
        game.create_player("Mary");
        Session::new(game, rounds)
    }

    #[test]
    fn test_issue_reports_errors() {
        let mut session = session(vec![]);

        assert_ok!(session.issue("mine Bob 0"));
        assert_err!(session.issue("nmap Bob"));
        assert!(matches!(
            session.issue("mine Bob 0"),
            Err(IssueError::Game(GameError::ServerBusy(_)))
        ));
        assert!(matches!(
            session.issue("mine Bob 9"),
            Err(IssueError::Game(GameError::UnknownServer(_)))
        ));
        assert!(matches!(
            session.issue("dance Bob 0"),
            Err(IssueError::Order(OrderError::UnknownVerb(_)))
        ));
    }

    #[test]
    fn test_step_plays_rounds_in_order() {
        let mut session = session(vec![
            Round::new(vec!["nmap Bob 0 *.*".to_string()], 1),
            Round::new(vec!["nmap Mary 0 *.*.*.*".to_string()], 2),
        ]);

        assert!(session.step(&[]));
        assert_eq!(session.game().tick(), 1);
        assert!(!session.game().players()[0].servers[0].is_busy());

        assert!(session.step(&[]));
        assert!(session.step(&[]));
        let running = session.game().players()[1].servers[0]
            .current_command
            .as_ref()
            .map(|c| c.duration());
        assert_eq!(running, Some(2));
        assert!(session.is_scripted_done());

        assert!(session.step(&[]));
        assert!(session.step(&[]));
        assert!(!session.step(&[]));
        assert_eq!(session.game().tick(), 5);
        assert_eq!(session.game().players()[1].known_servers.len(), 1);
    }

    #[test]
    fn test_step_idle_does_not_resolve() {
        let mut session = session(vec![]);
        assert!(!session.step(&[]));
        assert_eq!(session.game().tick(), 0);

        assert!(session.step(&["mine Mary 2".to_string()]));
        assert_eq!(session.game().players()[1].credits, 2);
    }

    #[test]
    fn test_step_respects_tick_limit() {
        let mut session = session(vec![]).with_max_ticks(Some(2));
        session.issue("mine Bob 0").unwrap();

        assert!(session.step(&[]));
        assert!(session.step(&[]));
        assert!(!session.step(&[]));
        assert_eq!(session.game().player(PlayerId(0)).unwrap().credits, 3);
    }

    #[test]
    fn test_repeating_commands_alone_stop_unlimited_session() {
        let mut session = session(vec![]);
        session.issue("mine Bob 0").unwrap();

        assert!(!session.step(&[]));
        assert_eq!(session.game().tick(), 0);
    }

    #[test]
    fn test_rejected_orders_do_not_resolve() {
        let mut session = session(vec![]);
        assert_ok!(session.issue("mine Bob 0"));
        assert!(!session.step(&[]));

        assert!(!session.step(&["dance Bob 0".to_string()]));
        assert!(!session.step(&["mine Bob 0".to_string()]));
        assert!(!session.step(&["mine Bob 7".to_string()]));

        assert_eq!(session.game().tick(), 0);
        assert_eq!(session.game().players()[0].credits, 1);
    }

    #[test]
    fn test_mixed_orders_resolve_once() {
        let mut session = session(vec![]);

        let orders = ["dance Bob 0".to_string(), "mine Bob 0".to_string()];
        assert!(session.step(&orders));
        assert_eq!(session.game().tick(), 1);
        assert_eq!(session.game().players()[0].credits, 2);
    }

    #[tokio::test]
    async fn test_run_plays_demo_to_completion() {
        let scenario = Scenario::demo();
        let mut session = Session::from_scenario(&scenario, GameConfig::seeded(3));
        let mut out = Vec::new();

        session
            .run(Duration::from_millis(1), None, ReportFormat::Text, &mut out)
            .await
            .unwrap();

        // 4 scan ticks, 1 mining tick, 2 probe ticks
        let game = session.game();
        assert_eq!(game.tick(), 7);
        for player in game.players() {
            assert_eq!(player.known_servers.len(), 1);
            assert_eq!(player.credits, 4);
        }

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("tick 0"));
        assert!(text.contains("tick 7"));
        assert!(!text.contains("tick 8"));
    }
}
