// Copyright 2025 Cowboy AI, LLC.

//! Per-intrinsic-method statistics accumulation.

use std::collections::HashMap;
use std::time::Duration;

/// A single observation fed into [`Statistics::record`].
#[derive(Debug, Clone)]
pub struct Sample {
    pub server_time: Option<Duration>,
    pub client_time: Duration,
    pub request_len: u64,
    pub reply_len: u64,
    pub is_exception: bool,
}

/// Accumulated counters for one intrinsic method name, across the
/// connection's lifetime.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MethodStats {
    pub count: u64,
    pub exception_count: u64,
    pub server_time_sum: Duration,
    pub server_time_min: Option<Duration>,
    pub server_time_max: Option<Duration>,
    pub client_time_sum: Duration,
    pub client_time_min: Option<Duration>,
    pub client_time_max: Option<Duration>,
    pub request_len_sum: u64,
    pub request_len_min: Option<u64>,
    pub request_len_max: Option<u64>,
    pub reply_len_sum: u64,
    pub reply_len_min: Option<u64>,
    pub reply_len_max: Option<u64>,
}

impl MethodStats {
    fn record(&mut self, sample: &Sample) {
        self.count += 1;
        if sample.is_exception {
            self.exception_count += 1;
        }
        if let Some(server_time) = sample.server_time {
            self.server_time_sum += server_time;
            self.server_time_min = Some(self.server_time_min.map_or(server_time, |m| m.min(server_time)));
            self.server_time_max = Some(self.server_time_max.map_or(server_time, |m| m.max(server_time)));
        }
        self.client_time_sum += sample.client_time;
        self.client_time_min = Some(self.client_time_min.map_or(sample.client_time, |m| m.min(sample.client_time)));
        self.client_time_max = Some(self.client_time_max.map_or(sample.client_time, |m| m.max(sample.client_time)));

        self.request_len_sum += sample.request_len;
        self.request_len_min = Some(self.request_len_min.map_or(sample.request_len, |m| m.min(sample.request_len)));
        self.request_len_max = Some(self.request_len_max.map_or(sample.request_len, |m| m.max(sample.request_len)));

        self.reply_len_sum += sample.reply_len;
        self.reply_len_min = Some(self.reply_len_min.map_or(sample.reply_len, |m| m.min(sample.reply_len)));
        self.reply_len_max = Some(self.reply_len_max.map_or(sample.reply_len, |m| m.max(sample.reply_len)));
    }
}

/// A connection's statistics table: disabled by default, recording
/// nothing until [`ConnectionBuilder::stats_enabled`](crate::config::ConnectionBuilder::stats_enabled)
/// turns it on.
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    enabled: bool,
    methods: HashMap<String, MethodStats>,
}

impl Statistics {
    /// Construct a statistics table; `enabled` gates whether `record` does
    /// anything.
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            methods: HashMap::new(),
        }
    }

    /// True if statistics are being collected.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Record a sample for `method`. A no-op when disabled, so that the
    /// "disabled leaves counters at zero" testable property holds without
    /// a separate code path.
    pub fn record(&mut self, method: &str, sample: Sample) {
        if !self.enabled {
            return;
        }
        self.methods.entry(method.to_string()).or_default().record(&sample);
    }

    /// An immutable, cloneable snapshot of the per-method counters, keyed
    /// by intrinsic method name.
    pub fn snapshot(&self) -> HashMap<String, MethodStats> {
        self.methods.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_statistics_record_nothing() {
        let mut stats = Statistics::new(false);
        stats.record(
            "GetInstance",
            Sample {
                server_time: Some(Duration::from_millis(5)),
                client_time: Duration::from_millis(10),
                request_len: 503,
                reply_len: 585,
                is_exception: false,
            },
        );
        assert!(stats.snapshot().is_empty());
    }

    #[test]
    fn enabled_statistics_accumulate_exact_lengths() {
        let mut stats = Statistics::new(true);
        stats.record(
            "GetInstance",
            Sample {
                server_time: None,
                client_time: Duration::from_millis(10),
                request_len: 503,
                reply_len: 585,
                is_exception: false,
            },
        );
        let snapshot = stats.snapshot();
        let method = snapshot.get("GetInstance").unwrap();
        assert_eq!(method.count, 1);
        assert_eq!(method.request_len_sum, 503);
        assert_eq!(method.reply_len_sum, 585);
        assert_eq!(method.exception_count, 0);
    }

    #[test]
    fn exceptions_increment_exception_count() {
        let mut stats = Statistics::new(true);
        stats.record(
            "DeleteInstance",
            Sample {
                server_time: None,
                client_time: Duration::from_millis(1),
                request_len: 10,
                reply_len: 20,
                is_exception: true,
            },
        );
        assert_eq!(stats.snapshot().get("DeleteInstance").unwrap().exception_count, 1);
    }
}
