use std::collections::HashSet;

use rand::Rng;
use rand::seq::SliceRandom;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pick<'a> {
    pub challenge: &'a str,
    /// True when every challenge had been used and the window started over.
    pub pool_reset: bool,
}

/// Draw uniformly from the challenges not yet used. When none are left the
/// used set is cleared and the draw comes from the whole pool. The draw is
/// recorded in `used`. Returns `None` only for an empty pool.
pub fn pick<'a, R: Rng + ?Sized>(
    pool: &'a [String],
    used: &mut HashSet<String>,
    rng: &mut R,
) -> Option<Pick<'a>> {
    let available: Vec<&'a String> = pool.iter().filter(|c| !used.contains(*c)).collect();

    let (challenge, pool_reset) = if available.is_empty() {
        used.clear();
        (pool.choose(rng)?, true)
    } else {
        (*available.choose(rng)?, false)
    };

    used.insert(challenge.clone());
    Some(Pick {
        challenge,
        pool_reset,
    })
}
