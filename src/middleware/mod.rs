// Middleware module - request logging and metrics

pub mod metrics;
pub mod request_logger;

pub use self::metrics::metrics_middleware;
pub use request_logger::{REQUEST_ID_HEADER, current_request_id, request_logger_middleware};
