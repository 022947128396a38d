//! The authoritative game state and the resolution pass.

use crate::command::{Command, Cycle, Lifecycle};
use crate::config::GameConfig;
use crate::error::GameError;
use crate::player::Player;
use crate::server::Server;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use shared::{PlayerId, ServerRef};
use uuid::Uuid;

/// Owns every player for the lifetime of a simulation.
///
/// Commands are attached with [`Game::assign`] and advanced one cycle per
/// [`Game::resolve`] call. Resolution needs `&mut self`, so a pass always has
/// the whole game to itself.
#[derive(Debug)]
pub struct Game {
    id: Uuid,
    players: Vec<Player>,
    tick: u64,
    config: GameConfig,
    rng: StdRng,
}

impl Game {
    pub fn new(config: GameConfig) -> Self {
        let rng = config.rng();
        Self {
            id: Uuid::new_v4(),
            players: Vec::new(),
            tick: 0,
            config,
            rng,
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::new(GameConfig::seeded(seed))
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Number of resolution passes run so far
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(id.0)
    }

    pub fn player_by_handle(&self, handle: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.handle == handle)
    }

    pub fn server(&self, at: ServerRef) -> Option<&Server> {
        self.player(at.player)?.servers.get(at.slot)
    }

    fn server_mut(&mut self, at: ServerRef) -> Option<&mut Server> {
        self.players.get_mut(at.player.0)?.servers.get_mut(at.slot)
    }

    /// Every player but `id`, in registration order
    pub fn other_players(&self, id: PlayerId) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(move |p| p.index != Some(id))
    }

    /// Registers a player and hands out the next index.
    pub fn add_player(&mut self, player: Player) -> Result<PlayerId, GameError> {
        if player.is_registered() {
            return Err(GameError::AlreadyRegistered(player.handle));
        }
        Ok(self.register(player))
    }

    /// Builds a player with freshly generated servers and registers it
    pub fn create_player(&mut self, handle: impl Into<String>) -> PlayerId {
        let player = Player::generate(handle, self.config.servers_per_player, &mut self.rng);
        self.register(player)
    }

    fn register(&mut self, mut player: Player) -> PlayerId {
        let id = PlayerId(self.players.len());
        player.index = Some(id);
        info!(
            "Added player {} as {} with {} server(s)",
            player.handle,
            id,
            player.servers.len()
        );
        self.players.push(player);
        id
    }

    /// Attaches `command` to the server at `at`.
    ///
    /// A server runs one command at a time; a busy server rejects the new one
    /// and keeps what it has.
    pub fn assign(&mut self, at: ServerRef, command: Command) -> Result<(), GameError> {
        let server = self
            .server_mut(at)
            .ok_or(GameError::UnknownServer(at))?;

        if server.is_busy() {
            return Err(GameError::ServerBusy(at));
        }

        debug!("Assigned {} to {}", command, at);
        server.current_command = Some(command);
        Ok(())
    }

    /// Number of servers currently running a command
    pub fn active_commands(&self) -> usize {
        self.players
            .iter()
            .flat_map(|p| p.servers.iter())
            .filter(|s| s.is_busy())
            .count()
    }

    /// Number of running commands that will finish on their own
    pub fn pending_commands(&self) -> usize {
        self.players
            .iter()
            .flat_map(|p| p.servers.iter())
            .filter_map(|s| s.current_command.as_ref())
            .filter(|c| !c.repeats())
            .count()
    }

    /// Advances every attached command by one cycle.
    ///
    /// Runs in two phases over all (player, server) pairs: every pre-cycle
    /// first, then post-cycle, countdown and completion. A bad command only
    /// affects its own server.
    pub fn resolve(&mut self) {
        self.tick += 1;
        let slots: Vec<ServerRef> = self.players.iter().flat_map(|p| p.server_refs()).collect();

        for at in &slots {
            self.run_pre_cycle(*at);
        }

        for at in &slots {
            self.run_post_cycle(*at);
        }

        debug!(
            "Tick {}: {} command(s) still running",
            self.tick,
            self.active_commands()
        );
    }

    fn take_command(&mut self, at: ServerRef) -> Option<Command> {
        self.server_mut(at)?.current_command.take()
    }

    fn run_pre_cycle(&mut self, at: ServerRef) {
        let Some(mut command) = self.take_command(at) else {
            if let Some(server) = self.server_mut(at) {
                server.clear_results();
            }
            return;
        };

        let outcome = {
            let mut cycle = Cycle::new(&mut self.players, at, &mut self.rng);
            command.pre_cycle(&mut cycle)
        };

        let Some(server) = self.server_mut(at) else {
            return;
        };
        server.post_result = None;

        match outcome {
            Ok(status) => {
                server.pre_result = Some(status);
                server.current_command = Some(command);
            }
            Err(err) => {
                warn!("Dropped '{}' on {}: {}", command, at, err);
                server.pre_result = Some(err.to_string());
            }
        }
    }

    fn run_post_cycle(&mut self, at: ServerRef) {
        let Some(mut command) = self.take_command(at) else {
            return;
        };

        let (status, finished) = {
            let mut cycle = Cycle::new(&mut self.players, at, &mut self.rng);
            let mut status = command.post_cycle(&mut cycle);
            command.tick_down();
            if command.is_exhausted() {
                status = command.completed(&mut cycle);
            }
            (status, command.is_exhausted())
        };

        if finished {
            info!("'{}' on {} completed: {}", command, at, status);
        }

        if let Some(server) = self.server_mut(at) {
            server.post_result = Some(status);
            if !finished {
                server.current_command = Some(command);
            }
        }
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}
