//! Statement metrics and tracing spans
//!
//! With the `metrics` feature, every executed statement is counted and timed
//! through OpenTelemetry instruments on the global meter provider. With the
//! `tracing` feature, statements and transaction boundaries run inside spans.

#[cfg(feature = "metrics")]
use once_cell::sync::Lazy;
#[cfg(feature = "metrics")]
use opentelemetry::{
    global,
    metrics::{Counter, Histogram},
    KeyValue,
};

#[cfg(feature = "metrics")]
pub static METRICS: Lazy<TagsqlMetrics> = Lazy::new(TagsqlMetrics::init);

#[cfg(feature = "metrics")]
pub struct TagsqlMetrics {
    pub statements_total: Counter<u64>,
    pub statement_errors_total: Counter<u64>,
    pub statement_duration: Histogram<f64>,
}

#[cfg(feature = "metrics")]
impl TagsqlMetrics {
    pub fn init() -> Self {
        let meter = global::meter("tagsql");

        let statements_total = meter
            .u64_counter("tagsql_statements_total")
            .with_description("Total statements executed")
            .build();

        let statement_errors_total = meter
            .u64_counter("tagsql_statement_errors_total")
            .with_description("Statements that returned an error")
            .build();

        let statement_duration = meter
            .f64_histogram("tagsql_statement_duration_seconds")
            .with_description("Duration of statements, including row decoding")
            .build();

        Self {
            statements_total,
            statement_errors_total,
            statement_duration,
        }
    }

    /// Record one statement; `kind` is `exec` or `query`
    pub fn record_statement(&self, kind: &'static str, elapsed: std::time::Duration, ok: bool) {
        let attributes = [KeyValue::new("kind", kind)];
        self.statements_total.add(1, &attributes);
        self.statement_duration
            .record(elapsed.as_secs_f64(), &attributes);
        if !ok {
            self.statement_errors_total.add(1, &attributes);
        }
    }
}

#[cfg(feature = "tracing")]
pub mod tracing_helpers {
    use tracing::{debug_span, info_span, Span};

    pub fn execute_statement_span(sql: &str) -> Span {
        debug_span!("tagsql.execute", sql = sql)
    }

    pub fn query_statement_span(sql: &str) -> Span {
        debug_span!("tagsql.query", sql = sql)
    }

    pub fn acquire_connection_span(datasource: &str) -> Span {
        debug_span!("tagsql.acquire", datasource = datasource)
    }

    pub fn begin_transaction_span() -> Span {
        info_span!("tagsql.begin")
    }

    pub fn commit_transaction_span() -> Span {
        info_span!("tagsql.commit")
    }

    pub fn rollback_transaction_span() -> Span {
        info_span!("tagsql.rollback")
    }
}
