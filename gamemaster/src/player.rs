use crate::server::Server;
use rand::Rng;
use shared::{PlayerId, ServerRef, STARTING_CREDITS};

#[derive(Debug, Clone)]
pub struct Player {
    pub handle: String,
    /// Assigned by `Game::add_player`, `None` until then.
    pub index: Option<PlayerId>,
    pub servers: Vec<Server>,
    /// Discovery log. Append-only.
    pub known_servers: Vec<ServerRef>,
    pub credits: u64,
}

impl Player {
    pub fn new(handle: impl Into<String>, servers: Vec<Server>) -> Self {
        Self {
            handle: handle.into(),
            index: None,
            servers,
            known_servers: Vec::new(),
            credits: STARTING_CREDITS,
        }
    }

    /// Creates a player owning `server_count` servers at random addresses
    pub fn generate<R: Rng + ?Sized>(
        handle: impl Into<String>,
        server_count: usize,
        rng: &mut R,
    ) -> Self {
        let servers = (0..server_count).map(|_| Server::generate(rng)).collect();
        Self::new(handle, servers)
    }

    pub fn is_registered(&self) -> bool {
        self.index.is_some()
    }

    pub fn knows(&self, at: ServerRef) -> bool {
        self.known_servers.contains(&at)
    }

    /// Appends to the discovery log. Returns false if it was already known.
    pub fn learn(&mut self, at: ServerRef) -> bool {
        if self.knows(at) {
            return false;
        }
        self.known_servers.push(at);
        true
    }

    /// Refs to this player's own servers. Empty before registration.
    pub fn server_refs(&self) -> Vec<ServerRef> {
        match self.index {
            Some(id) => (0..self.servers.len())
                .map(|slot| ServerRef::new(id, slot))
                .collect(),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_player_creation() {
        let mut rng = StdRng::seed_from_u64(3);
        let player = Player::generate("Bob", 3, &mut rng);

        assert_eq!(player.handle, "Bob");
        assert_eq!(player.index, None);
        assert!(!player.is_registered());
        assert_eq!(player.servers.len(), 3);
        assert!(player.known_servers.is_empty());
        assert_eq!(player.credits, 1);
    }

    #[test]
    fn test_learn_rejects_duplicates() {
        let mut player = Player::new("Mary", vec![]);
        let at = ServerRef::new(PlayerId(1), 0);

        assert!(player.learn(at));
        assert!(!player.learn(at));
        assert_eq!(player.known_servers, vec![at]);
        assert!(player.knows(at));
    }

    #[test]
    fn test_server_refs_need_registration() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut player = Player::generate("Fred", 2, &mut rng);
        assert!(player.server_refs().is_empty());

        player.index = Some(PlayerId(4));
        assert_eq!(
            player.server_refs(),
            vec![ServerRef::new(PlayerId(4), 0), ServerRef::new(PlayerId(4), 1)]
        );
    }
}
