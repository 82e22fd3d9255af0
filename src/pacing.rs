// ABOUTME: Courtesy delay policy applied between stream pages
// ABOUTME: Fixed, randomised, or disabled pacing behind a small trait

use rand::Rng;
use std::time::Duration;

pub const DEFAULT_PAGE_DELAY: Duration = Duration::from_secs(1);

/// Decides how long to wait after a page before requesting the next one.
///
/// `page` is the zero-based index of the page that was just fetched.
pub trait Pacer {
    fn delay_after(&self, page: usize) -> Duration;

    fn pause(&self, page: usize) {
        let delay = self.delay_after(page);
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pacing {
    None,
    Fixed(Duration),
    Jitter { min_ms: u64, max_ms: u64 },
}

impl Default for Pacing {
    fn default() -> Self {
        Pacing::Fixed(DEFAULT_PAGE_DELAY)
    }
}

impl Pacer for Pacing {
    fn delay_after(&self, _page: usize) -> Duration {
        match *self {
            Pacing::None => Duration::ZERO,
            Pacing::Fixed(delay) => delay,
            Pacing::Jitter { min_ms, max_ms } => {
                if max_ms == 0 {
                    return Duration::ZERO;
                }
                let ms = rand::thread_rng().gen_range(min_ms..=max_ms);
                Duration::from_millis(ms)
            }
        }
    }
}
