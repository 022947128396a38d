//! Timed commands and the lifecycle every one of them goes through.
//!
//! A command sits on exactly one server. Each resolution pass drives it
//! through the same hooks:
//!
//! 1. `pre_cycle` runs for every active command before anything else
//!    happens in the pass. It announces the command and validates its
//!    parameters; a [`BadCommand`] here drops the command.
//! 2. `post_cycle` reports per-tick progress, then the duration drops by one.
//! 3. Once the duration is exhausted `completed` fires the terminal effect.
//!    The command is detached afterwards unless `completed` re-armed it.
//!
//! Only `completed` should touch game state for one-shot commands, so a scan
//! or probe takes effect exactly once no matter how long it ran.

mod mine;
mod nmap;
mod probe;

pub use mine::Mine;
pub use nmap::{NMap, Segment};
pub use probe::{Probe, PROBE_DURATION};

use crate::error::BadCommand;
use crate::player::Player;
use crate::server::Server;
use rand::rngs::StdRng;
use rand::Rng;
use shared::{PlayerId, ServerRef};
use std::fmt;

/// Everything a command may look at or change while one of its hooks runs.
///
/// The running command has been lifted off its server for the duration of
/// the call, so `server()` is the host without its command slot filled.
pub struct Cycle<'a> {
    players: &'a mut [Player],
    at: ServerRef,
    rng: &'a mut StdRng,
}

impl<'a> Cycle<'a> {
    pub(crate) fn new(players: &'a mut [Player], at: ServerRef, rng: &'a mut StdRng) -> Self {
        Self { players, at, rng }
    }

    /// The server the command is attached to
    pub fn at(&self) -> ServerRef {
        self.at
    }

    pub fn owner_id(&self) -> PlayerId {
        self.at.player
    }

    pub fn owner(&self) -> &Player {
        &self.players[self.at.player.0]
    }

    pub fn owner_mut(&mut self) -> &mut Player {
        &mut self.players[self.at.player.0]
    }

    pub fn server(&self) -> &Server {
        &self.owner().servers[self.at.slot]
    }

    /// Every registered player except the owner, in registration order
    pub fn other_players(&self) -> impl Iterator<Item = &Player> {
        let owner = self.owner_id();
        self.players
            .iter()
            .filter(move |p| p.index.is_some() && p.index != Some(owner))
    }

    pub fn lookup(&self, at: ServerRef) -> Option<&Server> {
        self.players.get(at.player.0)?.servers.get(at.slot)
    }

    pub fn lookup_mut(&mut self, at: ServerRef) -> Option<&mut Server> {
        self.players.get_mut(at.player.0)?.servers.get_mut(at.slot)
    }

    pub fn rng(&mut self) -> &mut StdRng {
        &mut *self.rng
    }

    /// Uniform index into a collection of `len` items, `None` when empty
    pub fn draw_index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            None
        } else {
            Some(self.rng.gen_range(0..len))
        }
    }
}

/// The fixed hook set shared by every command variant.
pub trait Lifecycle {
    /// Remaining cycles
    fn duration(&self) -> i32;

    fn set_duration(&mut self, duration: i32);

    /// Fast, every-tick effect. Validation failures end the command.
    fn pre_cycle(&mut self, cycle: &mut Cycle<'_>) -> Result<String, BadCommand>;

    /// Every-tick status while the command is attached.
    fn post_cycle(&mut self, cycle: &mut Cycle<'_>) -> String;

    /// Terminal effect, fired once the duration is exhausted.
    fn completed(&mut self, cycle: &mut Cycle<'_>) -> String;

    fn tick_down(&mut self) {
        self.set_duration(self.duration() - 1);
    }

    fn is_exhausted(&self) -> bool {
        self.duration() <= 0
    }

    /// Repeating commands re-arm in `completed` and never finish on their own.
    fn repeats(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone)]
pub enum Command {
    NMap(NMap),
    Mine(Mine),
    Probe(Probe),
}

impl Command {
    pub fn nmap(mask: &str) -> Self {
        Command::NMap(NMap::new(mask))
    }

    pub fn mine() -> Self {
        Command::Mine(Mine::new())
    }

    pub fn probe(target: ServerRef) -> Self {
        Command::Probe(Probe::new(target))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::NMap(_) => "nmap",
            Command::Mine(_) => "mine",
            Command::Probe(_) => "probe",
        }
    }

    fn hooks(&mut self) -> &mut dyn Lifecycle {
        match self {
            Command::NMap(c) => c,
            Command::Mine(c) => c,
            Command::Probe(c) => c,
        }
    }
}

impl Lifecycle for Command {
    fn duration(&self) -> i32 {
        match self {
            Command::NMap(c) => c.duration(),
            Command::Mine(c) => c.duration(),
            Command::Probe(c) => c.duration(),
        }
    }

    fn set_duration(&mut self, duration: i32) {
        self.hooks().set_duration(duration)
    }

    fn repeats(&self) -> bool {
        matches!(self, Command::Mine(_))
    }

    fn pre_cycle(&mut self, cycle: &mut Cycle<'_>) -> Result<String, BadCommand> {
        self.hooks().pre_cycle(cycle)
    }

    fn post_cycle(&mut self, cycle: &mut Cycle<'_>) -> String {
        self.hooks().post_cycle(cycle)
    }

    fn completed(&mut self, cycle: &mut Cycle<'_>) -> String {
        self.hooks().completed(cycle)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::NMap(c) => write!(f, "nmap {}", c.mask()),
            Command::Mine(_) => write!(f, "mine"),
            Command::Probe(c) => write!(f, "probe {}", c.target()),
        }
    }
}

impl From<NMap> for Command {
    fn from(command: NMap) -> Self {
        Command::NMap(command)
    }
}

impl From<Mine> for Command {
    fn from(command: Mine) -> Self {
        Command::Mine(command)
    }
}

impl From<Probe> for Command {
    fn from(command: Probe) -> Self {
        Command::Probe(command)
    }
}
