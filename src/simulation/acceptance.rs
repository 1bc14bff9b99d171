//! Energy/temperature acceptance of uphill moves

use crate::core::config::MotionConfig;
use crate::simulation::rng::SimRng;

/// Barrier a gaussian draw must clear for a move raising tension by `delta`
pub fn acceptance_barrier(delta: f64, motion: &MotionConfig) -> f64 {
    0.5 + delta / motion.energy_scale - motion.temperature / motion.max_temperature
}

/// Metropolis-like rule: downhill always passes, uphill passes when
/// `|gauss| > barrier`. Draws from the stream only for uphill moves.
pub fn accept_move(delta: f64, motion: &MotionConfig, rng: &mut SimRng) -> bool {
    if delta <= 0.0 {
        return true;
    }
    rng.abs_gaussian() > acceptance_barrier(delta, motion)
}
