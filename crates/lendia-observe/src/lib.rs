//! Observability setup for Lendia: tracing subscriber initialization with
//! structured logging and optional OpenTelemetry trace export.

pub mod tracing_setup;
