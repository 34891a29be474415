use std::time::Instant;

pub mod auth;
pub mod health;
pub mod moods;
pub mod stats;

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
