pub mod logger;

pub use logger::{TraceId, child_span, init_tracing, root_span, warn_if_slow};
