//! Metrics instrumentation for cluster bootstrap.
//!
//! Thin wrappers around the `metrics` facade so call sites stay terse and
//! metric names live in one place.

pub(crate) mod labels {
    pub const MODE_TLS: &str = "tls";
    pub const MODE_PLAIN: &str = "plain";
}

pub(crate) mod counters {
    use metrics::counter;

    pub fn connect_attempted(mode: &'static str) {
        counter!("couchlink_connect_attempted_total", "mode" => mode).increment(1);
    }

    pub fn connect_succeeded(mode: &'static str) {
        counter!("couchlink_connect_succeeded_total", "mode" => mode).increment(1);
    }

    pub fn connect_failed(mode: &'static str) {
        counter!("couchlink_connect_failed_total", "mode" => mode).increment(1);
    }
}
