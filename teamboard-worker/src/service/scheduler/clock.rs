use chrono::{DateTime, TimeDelta, Utc};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy)]
pub enum Clock {
    /// Reads system time on every call, so clock corrections are picked up
    System,

    /// Starts at `wall_start` and advances with tokio time, paused tests control it
    Tokio {
        wall_start: DateTime<Utc>,
        instant_start: Instant,
    },
}

impl Clock {
    pub fn starting_at(wall_start: DateTime<Utc>) -> Self {
        Self::Tokio {
            wall_start,
            instant_start: Instant::now(),
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Self::System => Utc::now(),
            Self::Tokio {
                wall_start,
                instant_start,
            } => {
                let elapsed =
                    TimeDelta::from_std(instant_start.elapsed()).unwrap_or(TimeDelta::zero());
                *wall_start + elapsed
            }
        }
    }

    pub fn until(&self, at: DateTime<Utc>) -> Duration {
        (at - self.now()).to_std().unwrap_or(Duration::ZERO)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn tokio_clock_follows_tokio_time() {
        let start = "2026-10-16T08:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let clock = Clock::starting_at(start);

        tokio::time::sleep(Duration::from_secs(90)).await;

        assert_eq!(clock.now(), start + TimeDelta::seconds(90));
        assert_eq!(
            clock.until(start + TimeDelta::seconds(100)),
            Duration::from_secs(10)
        );
        assert_eq!(clock.until(start), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn system_clock_reads_system_time() {
        let before = Utc::now();

        tokio::time::sleep(Duration::from_secs(3600)).await;
        let now = Clock::System.now();

        assert!(now >= before);
        assert!(now - before < TimeDelta::minutes(1));
        assert!(Clock::System.until(before).is_zero());
    }
}
