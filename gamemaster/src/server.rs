use crate::command::Command;
use rand::Rng;
use shared::{Address, PlayerId, Weakness};

/// A machine owned by one player.
///
/// Holds at most one running command and the two status lines produced by
/// the most recent resolution pass.
#[derive(Debug, Clone)]
pub struct Server {
    pub address: Address,
    pub weaknesses: Vec<Weakness>,
    pub current_command: Option<Command>,
    pub pre_result: Option<String>,
    pub post_result: Option<String>,
}

impl Server {
    /// Creates a server at `address` with the standard weakness set
    pub fn new(address: Address) -> Self {
        Self::with_weaknesses(address, Weakness::standard_set())
    }

    pub fn with_weaknesses(address: Address, weaknesses: Vec<Weakness>) -> Self {
        Self {
            address,
            weaknesses,
            current_command: None,
            pre_result: None,
            post_result: None,
        }
    }

    /// Creates a server at a random address
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::new(Address::random(rng))
    }

    pub fn is_busy(&self) -> bool {
        self.current_command.is_some()
    }

    /// Weaknesses `viewer` has discovered on this server
    pub fn found_weaknesses(&self, viewer: PlayerId) -> impl Iterator<Item = &Weakness> {
        self.weaknesses.iter().filter(move |w| w.is_found_by(viewer))
    }

    pub(crate) fn clear_results(&mut self) {
        self.pre_result = None;
        self.post_result = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_server_creation() {
        let server = Server::new(Address([1, 2, 3, 4]));

        assert_eq!(server.address.to_string(), "1.2.3.4");
        assert_eq!(server.weaknesses.len(), 4);
        assert!(!server.is_busy());
        assert!(server.pre_result.is_none());
        assert!(server.post_result.is_none());
    }

    #[test]
    fn test_generated_servers_differ() {
        let mut rng = StdRng::seed_from_u64(1);
        let a = Server::generate(&mut rng);
        let b = Server::generate(&mut rng);
        assert_ne!(a.address, b.address);
    }

    #[test]
    fn test_found_weaknesses_filters_by_viewer() {
        let mut server = Server::new(Address([1, 2, 3, 4]));
        server.weaknesses[1].mark_found(PlayerId(0));
        server.weaknesses[2].mark_found(PlayerId(1));

        let seen: Vec<&str> = server
            .found_weaknesses(PlayerId(0))
            .map(|w| w.description.as_str())
            .collect();
        assert_eq!(seen, vec!["anonymous telnet"]);
        assert_eq!(server.found_weaknesses(PlayerId(3)).count(), 0);
    }
}
