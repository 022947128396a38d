use super::{Cycle, Lifecycle};
use crate::error::BadCommand;
use log::info;
use rand::seq::SliceRandom;
use shared::{ServerRef, ADDRESS_OCTETS};

/// One dotted token of a scan mask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Octet(u8),
    Wildcard,
    Malformed(String),
}

impl Segment {
    fn parse(token: &str) -> Self {
        let token = token.trim();
        if token == "*" {
            return Segment::Wildcard;
        }
        match token.parse::<u8>() {
            Ok(octet) => Segment::Octet(octet),
            Err(_) => Segment::Malformed(token.to_string()),
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, Segment::Wildcard)
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, Segment::Malformed(_))
    }
}

/// Network scan. Each wildcard in the mask adds a cycle to the run time;
/// on completion one opponent server the owner did not know about yet is
/// added to the owner's known servers.
#[derive(Debug, Clone)]
pub struct NMap {
    mask: String,
    path: Vec<Segment>,
    duration: i32,
}

impl NMap {
    pub fn new(mask: &str) -> Self {
        let path: Vec<Segment> = mask.split('.').map(Segment::parse).collect();
        let duration = path.iter().filter(|s| s.is_wildcard()).count() as i32;
        Self {
            mask: mask.trim().to_string(),
            path,
            duration,
        }
    }

    pub fn mask(&self) -> &str {
        &self.mask
    }

    pub fn path(&self) -> &[Segment] {
        &self.path
    }

    fn is_valid(&self) -> bool {
        self.path.len() == ADDRESS_OCTETS && !self.path.iter().any(Segment::is_malformed)
    }

    /// First not-yet-known server of every opponent, in registration order.
    fn candidates(cycle: &Cycle<'_>) -> Vec<ServerRef> {
        let owner = cycle.owner();
        cycle
            .other_players()
            .filter_map(|p| p.server_refs().into_iter().find(|at| !owner.knows(*at)))
            .collect()
    }
}

impl Lifecycle for NMap {
    fn duration(&self) -> i32 {
        self.duration
    }

    fn set_duration(&mut self, duration: i32) {
        self.duration = duration;
    }

    fn pre_cycle(&mut self, cycle: &mut Cycle<'_>) -> Result<String, BadCommand> {
        if !self.is_valid() {
            self.duration = 0;
            return Err(BadCommand::new(format!(
                "Invalid nmap mask given {}",
                self.mask
            )));
        }

        Ok(format!(
            "{} running 'nmap' against {}",
            cycle.owner().handle,
            self.mask
        ))
    }

    fn post_cycle(&mut self, cycle: &mut Cycle<'_>) -> String {
        if self.duration > 1 {
            format!(
                "{} scanning {}, {} cycle(s) left",
                cycle.owner().handle,
                self.mask,
                self.duration
            )
        } else {
            format!("{} finishing 'nmap' against {}", cycle.owner().handle, self.mask)
        }
    }

    fn completed(&mut self, cycle: &mut Cycle<'_>) -> String {
        let candidates = Self::candidates(cycle);
        let handle = cycle.owner().handle.clone();

        let Some(hit) = candidates.choose(cycle.rng()).copied() else {
            return format!(
                "{} completed 'nmap' against {}. No new servers found.",
                handle, self.mask
            );
        };

        cycle.owner_mut().learn(hit);
        let address = cycle
            .lookup(hit)
            .map(|s| s.address.to_string())
            .unwrap_or_else(|| hit.to_string());

        info!("{} discovered {} ({})", handle, address, hit);
        format!(
            "{} completed 'nmap' against {}. Found {}",
            handle, self.mask, address
        )
    }
}
