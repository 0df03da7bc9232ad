use std::time::{Duration, Instant};

pub(crate) fn trace(l_step: &str, start: Instant, prev_elapsed: Duration) -> Duration {
    log::trace!("TIME | Total={:.2?} | {}={:.2?}", start.elapsed(), l_step, start.elapsed() - prev_elapsed);
    start.elapsed()
}
