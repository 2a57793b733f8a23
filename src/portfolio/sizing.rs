// Position sizing using volatility targeting.
//
// size = (target_vol / realized_vol) · confidence, capped at max_size.
// Both volatilities are DAILY. Passing an annualized realized vol against
// a daily target is a contract violation: the position comes out ~√252
// times too small. Callers holding annualized vol must divide by √252
// before calling.

use log::debug;

use crate::models::Direction;

/// Compute the target position fraction for a forecast.
///
/// `vol_floor` guards the division when realized vol collapses to ~0
/// (constant prices); the cap then comes from `max_size`.
pub fn compute_position_size(
    direction: Direction,
    confidence: f64,
    realized_vol_daily: f64,
    target_vol_daily: f64,
    max_size: f64,
    vol_floor: f64,
) -> f64 {
    if direction == Direction::Flat {
        return 0.0;
    }

    let vol = realized_vol_daily.max(vol_floor);
    let vol_targeted = target_vol_daily / vol;
    let size = (vol_targeted * confidence).clamp(0.0, max_size);
    debug!(
        "sizing: vol={realized_vol_daily:.5} target={target_vol_daily:.5} \
         confidence={confidence:.3} -> size={size:.4}"
    );
    size
}
