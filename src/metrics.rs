use lazy_static::lazy_static;
use prometheus::{Counter, Gauge, Histogram, register_counter, register_gauge, register_histogram};


lazy_static! {
    pub static ref REQUEST_TOTAL: Counter =
        register_counter!("lume_gateway_requests_total", "Total number of chat requests")
            .expect("register lume_gateway_requests_total");
    pub static ref RATE_LIMITED_TOTAL: Counter = register_counter!(
        "lume_gateway_rate_limited_total",
        "Requests rejected by the rate limiter"
    )
    .expect("register lume_gateway_rate_limited_total");
    pub static ref UPSTREAM_ERRORS: Counter = register_counter!(
        "lume_gateway_upstream_errors_total",
        "Failed or empty upstream calls"
    )
    .expect("register lume_gateway_upstream_errors_total");
    pub static ref REQUEST_LATENCY: Histogram = register_histogram!(
        "lume_gateway_request_latency_seconds",
        "Request latency in seconds"
    )
    .expect("register lume_gateway_request_latency_seconds");
    pub static ref RATE_LIMIT_CLIENTS: Gauge = register_gauge!(
        "lume_gateway_rate_limit_clients",
        "Client keys currently tracked by the rate limiter"
    )
    .expect("register lume_gateway_rate_limit_clients");
}
