//! Prometheus metrics

/// Counter metric types
#[derive(Debug, Clone, Copy)]
pub enum CounterMetric {
    /// Inbound data frames (text or binary)
    FramesReceived,
    /// Price updates applied for the tracked symbol
    PriceUpdates,
    /// Frames of some other shape
    DecodeUnrecognized,
    /// Frames that could not be decoded
    DecodeMalformed,
    /// Sessions started by the supervisor
    SessionsStarted,
    /// Cooldown waits after a failed session
    Cooldowns,
    /// Sessions cancelled by a local command
    LocalCancels,
}

/// Gauge metric types
#[derive(Debug, Clone, Copy)]
pub enum GaugeMetric {
    /// Latest mid price of the tracked symbol
    LatestPrice,
    /// 1 while a session is streaming, 0 otherwise
    Connected,
}

impl CounterMetric {
    pub fn name(self) -> &'static str {
        match self {
            CounterMetric::FramesReceived => "hype_ticker_frames_received_total",
            CounterMetric::PriceUpdates => "hype_ticker_price_updates_total",
            CounterMetric::DecodeUnrecognized => "hype_ticker_decode_unrecognized_total",
            CounterMetric::DecodeMalformed => "hype_ticker_decode_malformed_total",
            CounterMetric::SessionsStarted => "hype_ticker_sessions_started_total",
            CounterMetric::Cooldowns => "hype_ticker_cooldowns_total",
            CounterMetric::LocalCancels => "hype_ticker_local_cancels_total",
        }
    }
}

impl GaugeMetric {
    pub fn name(self) -> &'static str {
        match self {
            GaugeMetric::LatestPrice => "hype_ticker_latest_price",
            GaugeMetric::Connected => "hype_ticker_connected",
        }
    }
}

/// Increment a counter by one
pub fn increment(metric: CounterMetric) {
    ::metrics::counter!(metric.name()).increment(1);
}

/// Set a gauge value
pub fn set_gauge(metric: GaugeMetric, value: f64) {
    ::metrics::gauge!(metric.name()).set(value);
}
