use prometheus::register_counter_vec;
use prometheus::register_int_counter;
use prometheus::CounterVec;
use prometheus::IntCounter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use lazy_static::lazy_static;

lazy_static! {
    pub static ref QUIZ_QUESTIONS_CNTR: CounterVec = register_counter_vec!(
        "quiz_questions_served_total",
        "Number of questions handed out by the quiz endpoint",
        &["category"]
    )
    .unwrap();
    pub static ref QUESTIONS_CREATED_CNTR: IntCounter = register_int_counter!(
        "questions_created_total",
        "Number of questions created through the API"
    )
    .unwrap();
}

const DEFAULT_DIRECTIVES: &str = "info,sqlx=warn";

// unset or unparsable LOG_LEVEL falls back to the defaults
fn env_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVES))
}

fn span_events_enabled(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.eq_ignore_ascii_case("true"))
}

pub fn init_tracing() {
    let mut fmt_layer = fmt::layer();
    if span_events_enabled(std::env::var("INCLUDE_SPAN_EVENTS").ok().as_deref()) {
        fmt_layer = fmt_layer.with_span_events(FmtSpan::ENTER | FmtSpan::EXIT);
    }
    let filter_layer = env_filter(std::env::var("LOG_LEVEL").ok().as_deref());

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}
