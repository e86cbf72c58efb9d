use std::{
    backtrace::{Backtrace, BacktraceStatus},
    panic::PanicHookInfo,
};

/// Reports panics through `tracing` so they land in the configured logger instead of
/// only on stderr.
pub fn panic_hook(panic_info: &PanicHookInfo) {
    let payload = panic_info.payload();
    let message = payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str));

    let location = panic_info.location().map(ToString::to_string);
    let backtrace = Backtrace::capture();
    let hint = (backtrace.status() == BacktraceStatus::Disabled)
        .then_some("set RUST_BACKTRACE=1 to capture a backtrace");

    tracing::error!(
        panic.message = message,
        panic.location = location,
        panic.backtrace = %backtrace,
        panic.hint = hint,
        "panicked",
    );
}
