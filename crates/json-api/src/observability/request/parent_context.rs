//! Continues a caller's trace when a request carries a valid `traceparent`.

use opentelemetry::{
    Context, global,
    propagation::{Extractor, TextMapPropagator},
    trace::TraceContextExt as _,
};
use salvo::http::{HeaderMap, HeaderName};

pub(super) fn extract_parent_context(headers: &HeaderMap) -> Option<Context> {
    global::get_text_map_propagator(|propagator| parent_from(propagator, headers))
}

/// Only a remote span context counts; without one the request span starts a new trace
/// instead of nesting under whatever span is active in-process.
fn parent_from(propagator: &dyn TextMapPropagator, headers: &HeaderMap) -> Option<Context> {
    let context = propagator.extract_with_context(&Context::new(), &Headers(headers));

    context
        .span()
        .span_context()
        .is_valid()
        .then_some(context)
}

#[derive(Debug)]
struct Headers<'a>(&'a HeaderMap);

impl Extractor for Headers<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|value| value.to_str().ok())
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(HeaderName::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use opentelemetry_sdk::propagation::TraceContextPropagator;
    use salvo::http::header::HeaderValue;

    use super::*;

    const TRACEPARENT: &str = "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01";

    #[test]
    fn valid_traceparent_becomes_the_parent() {
        let mut headers = HeaderMap::new();

        headers.insert("traceparent", HeaderValue::from_static(TRACEPARENT));

        let parent = parent_from(&TraceContextPropagator::new(), &headers);

        let trace_id = parent.map(|context| context.span().span_context().trace_id().to_string());

        assert_eq!(trace_id.as_deref(), Some("4bf92f3577b34da6a3ce929d0e0e4736"));
    }

    #[test]
    fn missing_or_garbled_traceparent_starts_a_new_trace() {
        let propagator = TraceContextPropagator::new();
        let mut headers = HeaderMap::new();

        assert!(parent_from(&propagator, &headers).is_none());

        headers.insert("traceparent", HeaderValue::from_static("not-a-trace"));

        assert!(parent_from(&propagator, &headers).is_none());
    }
}
