use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

pub const STARTING_CREDITS: u64 = 1;
pub const DEFAULT_SERVERS_PER_PLAYER: usize = 3;
pub const ADDRESS_OCTETS: usize = 4;

/// Every server boots with these, in this order.
pub const DEFAULT_WEAKNESSES: [&str; 4] = [
    "dictionary root password",
    "anonymous telnet",
    "missing patches",
    "SSL.v3",
];

/// Registration index handed out by the game. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub usize);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lookup-only handle to a server owned by some player.
///
/// Known-server lists and probe targets hold these instead of the server
/// itself, so the owning player stays the only one holding the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ServerRef {
    pub player: PlayerId,
    pub slot: usize,
}

impl ServerRef {
    pub fn new(player: PlayerId, slot: usize) -> Self {
        Self { player, slot }
    }
}

impl fmt::Display for ServerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.player, self.slot)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address(pub [u8; ADDRESS_OCTETS]);

impl Address {
    /// Draws each octet from 0..255, so 255 never shows up.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut octets = [0u8; ADDRESS_OCTETS];
        for octet in octets.iter_mut() {
            *octet = rng.gen_range(0..255);
        }
        Self(octets)
    }

    pub fn octets(&self) -> [u8; ADDRESS_OCTETS] {
        self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.0;
        write!(f, "{}.{}.{}.{}", a, b, c, d)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressParseError(pub String);

impl fmt::Display for AddressParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid address '{}'", self.0)
    }
}

impl std::error::Error for AddressParseError {}

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split('.').collect();
        if parts.len() != ADDRESS_OCTETS {
            return Err(AddressParseError(s.to_string()));
        }

        let mut octets = [0u8; ADDRESS_OCTETS];
        for (octet, part) in octets.iter_mut().zip(parts) {
            *octet = part
                .trim()
                .parse()
                .map_err(|_| AddressParseError(s.to_string()))?;
        }
        Ok(Self(octets))
    }
}

/// A discoverable flaw on a server, tracked per discoverer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weakness {
    pub description: String,
    pub found_by: BTreeSet<PlayerId>,
}

impl Weakness {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            found_by: BTreeSet::new(),
        }
    }

    /// The standard set every fresh server starts with.
    pub fn standard_set() -> Vec<Weakness> {
        DEFAULT_WEAKNESSES.iter().map(|d| Weakness::new(*d)).collect()
    }

    pub fn is_found_by(&self, player: PlayerId) -> bool {
        self.found_by.contains(&player)
    }

    /// Records a discovery. Returns false if the player already had it.
    pub fn mark_found(&mut self, player: PlayerId) -> bool {
        self.found_by.insert(player)
    }
}

impl fmt::Display for Weakness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description)
    }
}

// Read-only views handed to renderers. Weakness lists are already filtered
// down to what the viewing player has found.

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerView {
    pub address: Address,
    pub command: Option<String>,
    pub cycles_left: Option<i32>,
    pub pre_result: Option<String>,
    pub post_result: Option<String>,
    pub weaknesses: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    pub handle: String,
    pub index: Option<PlayerId>,
    pub credits: u64,
    pub servers: Vec<ServerView>,
    pub known_servers: Vec<ServerView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub game_id: String,
    pub tick: u64,
    pub players: Vec<PlayerView>,
}
