//! Lookup and notification metrics.
//!
//! Each [`Localization`](crate::i18n::Localization) owns one
//! `LocalizationMetrics`; there is no process-wide instance.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Default)]
pub struct LocalizationMetrics {
    /// Lookups answered by some provider in the chain
    hits: AtomicUsize,

    /// Lookups no provider could answer
    misses: AtomicUsize,

    /// Lookups skipped because no current language could be negotiated
    unresolved_language: AtomicUsize,

    /// Observer fanout cycles
    notifications: AtomicUsize,

    /// `provider_updated` calls for ids that are not registered
    ignored_provider_updates: AtomicUsize,
}

impl LocalizationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_unresolved_language(&self) {
        self.unresolved_language.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_notification(&self) {
        self.notifications.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_ignored_provider_update(&self) {
        self.ignored_provider_updates.fetch_add(1, Ordering::Relaxed);
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> usize {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn unresolved_language(&self) -> usize {
        self.unresolved_language.load(Ordering::Relaxed)
    }

    pub fn notifications(&self) -> usize {
        self.notifications.load(Ordering::Relaxed)
    }

    pub fn ignored_provider_updates(&self) -> usize {
        self.ignored_provider_updates.load(Ordering::Relaxed)
    }

    /// Generate a metrics report.
    pub fn report(&self) -> MetricsReport {
        let hits = self.hits();
        let misses = self.misses();
        let unresolved_language = self.unresolved_language();
        let total_lookups = hits + misses + unresolved_language;
        let hit_rate = if total_lookups > 0 {
            (hits as f64 / total_lookups as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            lookups: total_lookups,
            hits,
            misses,
            unresolved_language,
            hit_rate,
            notifications: self.notifications(),
            ignored_provider_updates: self.ignored_provider_updates(),
        }
    }
}

/// Snapshot of a resolver's metrics.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    /// Total lookups (hits + misses + unresolved language)
    pub lookups: usize,

    pub hits: usize,

    pub misses: usize,

    pub unresolved_language: usize,

    /// Hit rate as a percentage (0-100)
    pub hit_rate: f64,

    pub notifications: usize,

    pub ignored_provider_updates: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Counter Tests ====================

    #[test]
    fn test_record_hit() {
        let metrics = LocalizationMetrics::new();

        assert_eq!(metrics.hits(), 0);
        metrics.record_hit();
        assert_eq!(metrics.hits(), 1);
        metrics.record_hit();
        assert_eq!(metrics.hits(), 2);
    }

    #[test]
    fn test_record_miss() {
        let metrics = LocalizationMetrics::new();

        metrics.record_miss();
        assert_eq!(metrics.misses(), 1);
    }

    #[test]
    fn test_record_notification_and_ignored_update() {
        let metrics = LocalizationMetrics::new();

        metrics.record_notification();
        metrics.record_ignored_provider_update();
        metrics.record_ignored_provider_update();

        assert_eq!(metrics.notifications(), 1);
        assert_eq!(metrics.ignored_provider_updates(), 2);
    }

    // ==================== Report Tests ====================

    #[test]
    fn test_report_empty() {
        let report = LocalizationMetrics::new().report();

        assert_eq!(report.lookups, 0);
        assert_eq!(report.hits, 0);
        assert_eq!(report.misses, 0);
        assert_eq!(report.hit_rate, 0.0);
        assert_eq!(report.notifications, 0);
    }

    #[test]
    fn test_report_hit_rate() {
        let metrics = LocalizationMetrics::new();

        // 3 hits, 1 miss = 75% hit rate
        metrics.record_hit();
        metrics.record_hit();
        metrics.record_hit();
        metrics.record_miss();

        let report = metrics.report();
        assert_eq!(report.lookups, 4);
        assert_eq!(report.hit_rate, 75.0);
    }

    #[test]
    fn test_report_unresolved_language_counts_as_lookup() {
        let metrics = LocalizationMetrics::new();

        metrics.record_hit();
        metrics.record_unresolved_language();

        let report = metrics.report();
        assert_eq!(report.lookups, 2);
        assert_eq!(report.unresolved_language, 1);
        assert_eq!(report.hit_rate, 50.0);
    }

    #[test]
    fn test_report_serializes() {
        let metrics = LocalizationMetrics::new();
        metrics.record_hit();

        let json = serde_json::to_value(metrics.report()).expect("serialize");
        assert_eq!(json["hits"], 1);
        assert_eq!(json["hit_rate"], 100.0);
    }

    #[test]
    fn test_instances_are_independent() {
        let first = LocalizationMetrics::new();
        let second = LocalizationMetrics::new();

        first.record_hit();
        assert_eq!(first.hits(), 1);
        assert_eq!(second.hits(), 0);
    }
}
