use std::{
    collections::{BTreeMap, HashMap, VecDeque},
    time::{Duration, Instant},
};

use serde_derive::Serialize;

use super::state::RecordId;

/// Most durations kept per record; older entries are evicted first.
pub const MAX_DURATIONS_PER_RECORD: usize = 10_000;

/// Time a connection spent checked out.
#[derive(Debug, Clone, Copy)]
pub struct UsageDuration {
    start: Instant,
    end: Option<Instant>,
}

impl UsageDuration {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
            end: None,
        }
    }

    /// Returns `false` if the duration was already stopped.
    pub fn stop(&mut self) -> bool {
        if self.end.is_some() {
            return false;
        }
        self.end = Some(Instant::now());
        true
    }

    pub fn is_stopped(&self) -> bool {
        self.end.is_some()
    }

    pub fn value(&self) -> Option<Duration> {
        self.end.map(|end| end.duration_since(self.start))
    }
}

#[derive(Debug, Default)]
pub(crate) struct UsageHistory {
    durations: HashMap<RecordId, VecDeque<UsageDuration>>,
}

impl UsageHistory {
    pub(crate) fn record(&mut self, id: RecordId, duration: UsageDuration) {
        let history = self.durations.entry(id).or_default();
        while history.len() >= MAX_DURATIONS_PER_RECORD {
            history.pop_front();
        }
        history.push_back(duration);
    }

    pub(crate) fn stats(&self) -> PoolStats {
        let connections: BTreeMap<RecordId, ConnectionStats> = self
            .durations
            .iter()
            .map(|(id, durations)| {
                let total_time: Duration =
                    durations.iter().filter_map(UsageDuration::value).sum();
                (
                    *id,
                    ConnectionStats {
                        total_time,
                        called_times: durations.len(),
                    },
                )
            })
            .collect();

        let max_time = connections
            .values()
            .map(|c| c.total_time)
            .max()
            .unwrap_or_default();

        PoolStats {
            num: connections.len(),
            connections,
            max_time,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConnectionStats {
    pub total_time: Duration,
    pub called_times: usize,
}

/// Usage report for a pool.
///
/// A pool that has never released a connection reports no connections and a zero
/// `max_time`; check [`PoolStats::is_empty`] before reading `max_time`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    pub connections: BTreeMap<RecordId, ConnectionStats>,
    #[serde(rename = "max-time")]
    pub max_time: Duration,
    pub num: usize,
}

impl PoolStats {
    pub fn is_empty(&self) -> bool {
        self.num == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stopped_after(start: Instant, elapsed: Duration) -> UsageDuration {
        UsageDuration {
            start,
            end: Some(start + elapsed),
        }
    }

    #[test]
    fn duration_stops_once() {
        let mut duration = UsageDuration::start();
        assert!(duration.value().is_none());
        assert!(!duration.is_stopped());

        assert!(duration.stop());
        let value = duration.value().unwrap();

        assert!(!duration.stop());
        assert_eq!(duration.value(), Some(value));
    }

    #[test]
    fn history_evicts_oldest() {
        let mut history = UsageHistory::default();
        let id = RecordId(0);
        let start = Instant::now();

        history.record(id, stopped_after(start, Duration::from_secs(100)));
        for _ in 1..MAX_DURATIONS_PER_RECORD {
            history.record(id, stopped_after(start, Duration::from_millis(1)));
        }
        assert_eq!(
            history.stats().connections[&id].called_times,
            MAX_DURATIONS_PER_RECORD
        );
        assert!(history.stats().max_time >= Duration::from_secs(100));

        history.record(id, stopped_after(start, Duration::from_millis(1)));

        let stats = history.stats();
        assert_eq!(stats.connections[&id].called_times, MAX_DURATIONS_PER_RECORD);
        assert_eq!(
            stats.connections[&id].total_time,
            Duration::from_millis(MAX_DURATIONS_PER_RECORD as u64)
        );
    }

    #[test]
    fn stats_per_record() {
        let mut history = UsageHistory::default();
        let start = Instant::now();

        history.record(RecordId(0), stopped_after(start, Duration::from_millis(10)));
        history.record(RecordId(0), stopped_after(start, Duration::from_millis(20)));
        history.record(RecordId(1), stopped_after(start, Duration::from_millis(5)));

        let stats = history.stats();
        assert_eq!(stats.num, 2);
        assert_eq!(stats.max_time, Duration::from_millis(30));
        assert_eq!(
            stats.connections[&RecordId(0)],
            ConnectionStats {
                total_time: Duration::from_millis(30),
                called_times: 2,
            }
        );
        assert_eq!(stats.connections[&RecordId(1)].called_times, 1);
    }

    #[test]
    fn empty_history_reports_zero() {
        let stats = UsageHistory::default().stats();

        assert!(stats.is_empty());
        assert_eq!(stats.max_time, Duration::ZERO);
        assert_eq!(stats, PoolStats::default());
    }

    #[test]
    fn unstopped_duration_counts_as_zero() {
        let mut history = UsageHistory::default();
        history.record(RecordId(3), UsageDuration::start());

        let stats = history.stats();
        assert_eq!(stats.connections[&RecordId(3)].called_times, 1);
        assert_eq!(stats.connections[&RecordId(3)].total_time, Duration::ZERO);
    }
}
