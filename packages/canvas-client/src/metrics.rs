//! Prometheus metrics (lock-free atomics, zero allocation on hot path).

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

pub static METRICS: Metrics = Metrics::new();

pub struct Metrics {
    // --- Writes ---
    pub tx_total: AtomicU64,
    pub tx_success: AtomicU64,
    pub tx_error: AtomicU64,
    pub tx_duration_us_sum: AtomicU64,

    // --- Reads ---
    pub query_total: AtomicU64,
    pub query_cache_hits: AtomicU64,

    // --- RPC ---
    pub rpc_errors: AtomicU64,
    pub rpc_failovers: AtomicU64,

    // --- Pinning ---
    pub uploads_total: AtomicU64,
    pub upload_errors: AtomicU64,

    // --- Metadata cache ---
    pub metadata_cache_hits: AtomicU64,
    pub metadata_cache_misses: AtomicU64,
    pub metadata_fetch_errors: AtomicU64,
}

impl Metrics {
    const fn new() -> Self {
        Self {
            tx_total: AtomicU64::new(0),
            tx_success: AtomicU64::new(0),
            tx_error: AtomicU64::new(0),
            tx_duration_us_sum: AtomicU64::new(0),
            query_total: AtomicU64::new(0),
            query_cache_hits: AtomicU64::new(0),
            rpc_errors: AtomicU64::new(0),
            rpc_failovers: AtomicU64::new(0),
            uploads_total: AtomicU64::new(0),
            upload_errors: AtomicU64::new(0),
            metadata_cache_hits: AtomicU64::new(0),
            metadata_cache_misses: AtomicU64::new(0),
            metadata_fetch_errors: AtomicU64::new(0),
        }
    }

    pub fn record_tx_duration(&self, start: Instant) {
        let us = start.elapsed().as_micros() as u64;
        self.tx_duration_us_sum.fetch_add(us, Ordering::Relaxed);
    }

    /// Render in Prometheus text exposition format.
    pub fn render(&self) -> String {
        let tx_total = self.tx_total.load(Ordering::Relaxed);
        let tx_success = self.tx_success.load(Ordering::Relaxed);
        let tx_error = self.tx_error.load(Ordering::Relaxed);
        let tx_dur_sum_s = self.tx_duration_us_sum.load(Ordering::Relaxed) as f64 / 1_000_000.0;
        let query_total = self.query_total.load(Ordering::Relaxed);
        let query_cache_hits = self.query_cache_hits.load(Ordering::Relaxed);
        let rpc_errors = self.rpc_errors.load(Ordering::Relaxed);
        let rpc_failovers = self.rpc_failovers.load(Ordering::Relaxed);
        let uploads_total = self.uploads_total.load(Ordering::Relaxed);
        let upload_errors = self.upload_errors.load(Ordering::Relaxed);
        let meta_hits = self.metadata_cache_hits.load(Ordering::Relaxed);
        let meta_misses = self.metadata_cache_misses.load(Ordering::Relaxed);
        let meta_errors = self.metadata_fetch_errors.load(Ordering::Relaxed);

        format!(
            "\
# HELP canvas_tx_total Total write calls submitted.\n\
# TYPE canvas_tx_total counter\n\
canvas_tx_total {tx_total}\n\
# HELP canvas_tx_success_total Writes confirmed on-chain.\n\
# TYPE canvas_tx_success_total counter\n\
canvas_tx_success_total {tx_success}\n\
# HELP canvas_tx_error_total Writes rejected or failed.\n\
# TYPE canvas_tx_error_total counter\n\
canvas_tx_error_total {tx_error}\n\
# HELP canvas_tx_duration_seconds_sum Total write round-trip time (seconds).\n\
# TYPE canvas_tx_duration_seconds_sum counter\n\
canvas_tx_duration_seconds_sum {tx_dur_sum_s:.6}\n\
# HELP canvas_query_total Listing queries served (cache or network).\n\
# TYPE canvas_query_total counter\n\
canvas_query_total {query_total}\n\
# HELP canvas_query_cache_hits_total Listing queries served from cache.\n\
# TYPE canvas_query_cache_hits_total counter\n\
canvas_query_cache_hits_total {query_cache_hits}\n\
# HELP canvas_rpc_errors_total RPC errors.\n\
# TYPE canvas_rpc_errors_total counter\n\
canvas_rpc_errors_total {rpc_errors}\n\
# HELP canvas_rpc_failovers_total RPC primary-to-fallback failovers.\n\
# TYPE canvas_rpc_failovers_total counter\n\
canvas_rpc_failovers_total {rpc_failovers}\n\
# HELP canvas_uploads_total Pinning uploads attempted.\n\
# TYPE canvas_uploads_total counter\n\
canvas_uploads_total {uploads_total}\n\
# HELP canvas_upload_errors_total Pinning uploads failed.\n\
# TYPE canvas_upload_errors_total counter\n\
canvas_upload_errors_total {upload_errors}\n\
# HELP canvas_metadata_cache_hits_total Metadata served from cache.\n\
# TYPE canvas_metadata_cache_hits_total counter\n\
canvas_metadata_cache_hits_total {meta_hits}\n\
# HELP canvas_metadata_cache_misses_total Metadata fetched from a gateway.\n\
# TYPE canvas_metadata_cache_misses_total counter\n\
canvas_metadata_cache_misses_total {meta_misses}\n\
# HELP canvas_metadata_fetch_errors_total Metadata fetches that failed.\n\
# TYPE canvas_metadata_fetch_errors_total counter\n\
canvas_metadata_fetch_errors_total {meta_errors}\n"
        )
    }
}
