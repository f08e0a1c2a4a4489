use slog::{o, Drain, Logger};

pub use slog_async::Async;
pub use slog_term::{CompactFormat, TermDecorator};

/// Builds the root [`Logger`] used across the stack: terminal output behind
/// an async drain, every record tagged with the owning service's name.
pub fn new_logger(service: &str) -> Logger {
    let decorator = TermDecorator::new().build();
    let drain = CompactFormat::new(decorator).build().fuse();
    let drain = Async::new(drain).build().fuse();

    Logger::root(drain, o!("service" => service.to_owned()))
}

/// A discarding [`Logger`] for tests and benchmarks.
pub fn discard_logger() -> Logger {
    Logger::root(slog::Discard, o!())
}
