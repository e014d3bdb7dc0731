use std::future::Future;
use std::time::Duration;

use chrono::{Local, NaiveDateTime, NaiveTime, TimeDelta};

pub const POLL_INTERVAL: Duration = Duration::from_secs(60);

pub fn next_occurrence(now: NaiveDateTime, at: NaiveTime) -> NaiveDateTime {
    let today = now.date().and_time(at);
    if today > now {
        today
    } else {
        today + TimeDelta::days(1)
    }
}

/// Fires once a day at a fixed local wall-clock time.
///
/// Missed runs are not caught up and a slow job is not guarded against; the
/// next due time is always recomputed from the moment the job finishes.
#[derive(Debug, Clone)]
pub struct DailySchedule {
    at: NaiveTime,
    poll: Duration,
    next: NaiveDateTime,
}

impl DailySchedule {
    pub fn new(at: NaiveTime, now: NaiveDateTime) -> Self {
        Self {
            at,
            poll: POLL_INTERVAL,
            next: next_occurrence(now, at),
        }
    }

    pub fn with_poll_interval(mut self, poll: Duration) -> Self {
        self.poll = poll;
        self
    }

    pub fn next_run(&self) -> NaiveDateTime {
        self.next
    }

    pub fn is_due(&self, now: NaiveDateTime) -> bool {
        now >= self.next
    }

    pub fn advance(&mut self, now: NaiveDateTime) {
        self.next = next_occurrence(now, self.at);
    }

    pub async fn run<F, Fut>(mut self, mut job: F)
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ()>,
    {
        log::info!(
            "Daily run at {}, next at {}",
            self.at.format("%H:%M"),
            self.next
        );
        let mut interval = tokio::time::interval(self.poll);

        loop {
            interval.tick().await;
            if !self.is_due(Local::now().naive_local()) {
                continue;
            }

            job().await;

            self.advance(Local::now().naive_local());
            log::info!("Next run at {}", self.next);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn seven() -> NaiveTime {
        NaiveTime::from_hms_opt(7, 0, 0).unwrap()
    }

    #[test]
    fn test_next_occurrence_later_today() {
        assert_eq!(
            next_occurrence(dt("2024-08-16 06:59"), seven()),
            dt("2024-08-16 07:00")
        );
    }

    #[test]
    fn test_next_occurrence_exact_time_rolls_over() {
        assert_eq!(
            next_occurrence(dt("2024-08-16 07:00"), seven()),
            dt("2024-08-17 07:00")
        );
    }

    #[test]
    fn test_next_occurrence_crosses_year() {
        assert_eq!(
            next_occurrence(dt("2024-12-31 23:30"), seven()),
            dt("2025-01-01 07:00")
        );
    }

    #[test]
    fn test_started_after_trigger_waits_for_tomorrow() {
        let schedule = DailySchedule::new(seven(), dt("2024-08-16 08:00"));
        assert!(!schedule.is_due(dt("2024-08-16 08:01")));
        assert!(!schedule.is_due(dt("2024-08-17 06:59")));
        assert!(schedule.is_due(dt("2024-08-17 07:00")));
    }

    #[test]
    fn test_advance_skips_missed_days() {
        let mut schedule = DailySchedule::new(seven(), dt("2024-08-16 06:00"));
        assert!(schedule.is_due(dt("2024-08-19 09:00")));

        schedule.advance(dt("2024-08-19 09:00"));
        assert_eq!(schedule.next_run(), dt("2024-08-20 07:00"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_fires_when_due() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicUsize, Ordering};

        let now = Local::now().naive_local();
        let mut schedule = DailySchedule::new(seven(), now).with_poll_interval(Duration::from_secs(60));
        // Force the first poll to be due.
        schedule.next = now - TimeDelta::minutes(1);

        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();
        let handle = tokio::spawn(schedule.run(move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        }));

        tokio::time::sleep(Duration::from_secs(150)).await;
        handle.abort();

        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }
}
