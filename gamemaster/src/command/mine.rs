use super::{Cycle, Lifecycle};
use crate::error::BadCommand;

const CREDITS_PER_CYCLE: u64 = 1;

/// Repeating credit miner. Every cycle is a terminal cycle: the owner gains
/// a credit and the command re-arms itself for the next one.
#[derive(Debug, Clone)]
pub struct Mine {
    duration: i32,
}

impl Mine {
    pub fn new() -> Self {
        Self { duration: 1 }
    }
}

impl Default for Mine {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle for Mine {
    fn duration(&self) -> i32 {
        self.duration
    }

    fn set_duration(&mut self, duration: i32) {
        self.duration = duration;
    }

    fn repeats(&self) -> bool {
        true
    }

    fn pre_cycle(&mut self, cycle: &mut Cycle<'_>) -> Result<String, BadCommand> {
        Ok(format!(
            "{} mining on {}",
            cycle.owner().handle,
            cycle.server().address
        ))
    }

    fn post_cycle(&mut self, cycle: &mut Cycle<'_>) -> String {
        format!("{} mining on {}", cycle.owner().handle, cycle.server().address)
    }

    fn completed(&mut self, cycle: &mut Cycle<'_>) -> String {
        let owner = cycle.owner_mut();
        owner.credits += CREDITS_PER_CYCLE;
        let handle = owner.handle.clone();
        self.duration = 1;

        format!(
            "{} mined {} credit on {}",
            handle,
            CREDITS_PER_CYCLE,
            cycle.server().address
        )
    }
}
