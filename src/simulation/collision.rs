//! Collision arbitration between a mover and a blocking agent

use crate::core::types::AgentId;
use crate::simulation::world::World;

/// The mover wins iff its total strength beats the blocker's by more than `margin`
pub fn collision_wins(mover_strength: f64, blocker_strength: f64, margin: f64) -> bool {
    mover_strength - blocker_strength > margin
}

impl World {
    /// Settle a collision: a winning mover breaks the blocker's weakest bond.
    ///
    /// Returns whether the mover won.
    pub fn arbitrate_collision(&mut self, mover: AgentId, blocker: AgentId) -> bool {
        let seed = self.seed_count;
        let mover_strength = self.total_bond_strength(mover);
        let blocker_strength = self.total_bond_strength(blocker);
        let wins = collision_wins(
            mover_strength,
            blocker_strength,
            self.config.interaction.collision_win_threshold,
        );

        if !wins {
            self.tally.collisions_lost += 1;
            tracing::debug!(%mover, %blocker, mover_strength, blocker_strength, "collision lost");
            return false;
        }

        self.tally.collisions_won += 1;
        let weakest = self
            .agent(blocker)
            .and_then(|a| a.weakest_bond(seed))
            .map(|b| b.neighbor);
        if let Some(neighbor) = weakest {
            self.unbond(blocker, neighbor);
        }
        tracing::debug!(
            %mover,
            %blocker,
            mover_strength,
            blocker_strength,
            severed = ?weakest,
            "collision won"
        );
        true
    }
}
