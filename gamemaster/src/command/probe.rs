use super::{Cycle, Lifecycle};
use crate::error::BadCommand;
use log::info;
use shared::ServerRef;

pub const PROBE_DURATION: i32 = 2;

/// Looks for a weakness on a target server, which may belong to anyone.
#[derive(Debug, Clone)]
pub struct Probe {
    target: ServerRef,
    duration: i32,
}

impl Probe {
    pub fn new(target: ServerRef) -> Self {
        Self {
            target,
            duration: PROBE_DURATION,
        }
    }

    pub fn target(&self) -> ServerRef {
        self.target
    }

    fn target_label(&self, cycle: &Cycle<'_>) -> String {
        cycle
            .lookup(self.target)
            .map(|s| s.address.to_string())
            .unwrap_or_else(|| self.target.to_string())
    }
}

impl Lifecycle for Probe {
    fn duration(&self) -> i32 {
        self.duration
    }

    fn set_duration(&mut self, duration: i32) {
        self.duration = duration;
    }

    fn pre_cycle(&mut self, cycle: &mut Cycle<'_>) -> Result<String, BadCommand> {
        match cycle.lookup(self.target) {
            Some(server) => Ok(format!(
                "{} probing {}",
                cycle.owner().handle,
                server.address
            )),
            None => {
                self.duration = 0;
                Err(BadCommand::new(format!("No server at {} to probe", self.target)))
            }
        }
    }

    fn post_cycle(&mut self, cycle: &mut Cycle<'_>) -> String {
        format!("Probing {}", self.target_label(cycle))
    }

    fn completed(&mut self, cycle: &mut Cycle<'_>) -> String {
        let label = self.target_label(cycle);
        let owner = cycle.owner_id();
        let weakness_count = cycle
            .lookup(self.target)
            .map(|s| s.weaknesses.len())
            .unwrap_or(0);

        let found = cycle.draw_index(weakness_count).and_then(|pick| {
            let weakness = &mut cycle.lookup_mut(self.target)?.weaknesses[pick];
            weakness
                .mark_found(owner)
                .then(|| weakness.description.clone())
        });

        match found {
            Some(description) => {
                info!(
                    "{} found '{}' on {}",
                    cycle.owner().handle,
                    description,
                    label
                );
                format!("Found '{}' weakness on {}", description, label)
            }
            None => format!("No new weakness found on {}", label),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::Player;
    use crate::server::Server;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use shared::{Address, PlayerId, Weakness};

    fn pair(target_weaknesses: Vec<Weakness>) -> Vec<Player> {
        let mut prober = Player::new("Bob", vec![Server::new(Address([1, 1, 1, 1]))]);
        prober.index = Some(PlayerId(0));
        let mut target = Player::new(
            "Mary",
            vec![Server::with_weaknesses(Address([2, 2, 2, 2]), target_weaknesses)],
        );
        target.index = Some(PlayerId(1));
        vec![prober, target]
    }

    const FROM: ServerRef = ServerRef {
        player: PlayerId(0),
        slot: 0,
    };
    const TARGET: ServerRef = ServerRef {
        player: PlayerId(1),
        slot: 0,
    };

    #[test]
    fn test_probe_starts_with_fixed_duration() {
        let probe = Probe::new(TARGET);
        assert_eq!(probe.duration(), PROBE_DURATION);
        assert_eq!(probe.target(), TARGET);
    }

    #[test]
    fn test_pre_cycle_rejects_missing_target() {
        let mut players = pair(Weakness::standard_set());
        let mut rng = StdRng::seed_from_u64(0);
        let mut cycle = Cycle::new(&mut players, FROM, &mut rng);

        let mut probe = Probe::new(ServerRef::new(PlayerId(1), 5));
        let err = probe.pre_cycle(&mut cycle).unwrap_err();
        assert_eq!(err.reason, "No server at 1/5 to probe");
    }

    #[test]
    fn test_busy_status_has_no_side_effect() {
        let mut players = pair(Weakness::standard_set());
        let mut rng = StdRng::seed_from_u64(0);
        let mut cycle = Cycle::new(&mut players, FROM, &mut rng);

        let mut probe = Probe::new(TARGET);
        assert_eq!(probe.pre_cycle(&mut cycle).unwrap(), "Bob probing 2.2.2.2");
        assert_eq!(probe.post_cycle(&mut cycle), "Probing 2.2.2.2");

        let target = &players[1].servers[0];
        assert!(target.weaknesses.iter().all(|w| w.found_by.is_empty()));
    }

    #[test]
    fn test_completed_records_finder() {
        let mut players = pair(vec![Weakness::new("SSL.v3")]);
        let mut rng = StdRng::seed_from_u64(0);
        let mut cycle = Cycle::new(&mut players, FROM, &mut rng);

        let status = Probe::new(TARGET).completed(&mut cycle);
        assert_eq!(status, "Found 'SSL.v3' weakness on 2.2.2.2");
        assert!(players[1].servers[0].weaknesses[0].is_found_by(PlayerId(0)));
    }

    #[test]
    fn test_completed_already_found() {
        let mut weakness = Weakness::new("SSL.v3");
        weakness.mark_found(PlayerId(0));
        let mut players = pair(vec![weakness]);
        let mut rng = StdRng::seed_from_u64(0);
        let mut cycle = Cycle::new(&mut players, FROM, &mut rng);

        let status = Probe::new(TARGET).completed(&mut cycle);
        assert_eq!(status, "No new weakness found on 2.2.2.2");
        assert_eq!(players[1].servers[0].weaknesses[0].found_by.len(), 1);
    }

    #[test]
    fn test_completed_without_weaknesses() {
        let mut players = pair(vec![]);
        let mut rng = StdRng::seed_from_u64(0);
        let mut cycle = Cycle::new(&mut players, FROM, &mut rng);

        let status = Probe::new(TARGET).completed(&mut cycle);
        assert_eq!(status, "No new weakness found on 2.2.2.2");
    }

    #[test]
    fn test_probe_own_server() {
        let mut players = pair(vec![]);
        let mut rng = StdRng::seed_from_u64(0);
        let mut cycle = Cycle::new(&mut players, FROM, &mut rng);

        let status = Probe::new(FROM).completed(&mut cycle);
        assert!(status.starts_with("Found '"));
        assert_eq!(
            players[0].servers[0]
                .found_weaknesses(PlayerId(0))
                .count(),
            1
        );
    }
}
