//! Access to the HTTP request behind a tool call
//!
//! The streamable HTTP transport stores the `http::request::Parts` of the
//! inbound request in the extensions of every `RequestContext`. Servers that
//! are scoped by a query parameter (for example `?tenant=...`) read it here.

use std::collections::HashMap;

use axum::{extract::Query, http::request::Parts};
use rmcp::{service::RequestContext, RoleServer};

/// Read a query parameter from the HTTP request that carried this tool call
///
/// Returns `None` when the call did not arrive over HTTP, the query string is
/// malformed, or the parameter is absent. The value is returned as sent;
/// callers decide whether to trim it.
pub fn query_param(context: &RequestContext<RoleServer>, name: &str) -> Option<String> {
    context
        .extensions
        .get::<Parts>()
        .and_then(|parts| query_param_from_parts(parts, name))
}

/// Read a query parameter from already extracted request parts
pub fn query_param_from_parts(parts: &Parts, name: &str) -> Option<String> {
    let Query(params) = Query::<HashMap<String, String>>::try_from_uri(&parts.uri).ok()?;
    params.get(name).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_for(uri: &str) -> Parts {
        Request::builder().uri(uri).body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_reads_parameter() {
        let parts = parts_for("/llm?instance_id=42");
        assert_eq!(query_param_from_parts(&parts, "instance_id"), Some("42".to_string()));
    }

    #[test]
    fn test_decodes_percent_encoding() {
        let parts = parts_for("/llm?instance_id=%2042%20&other=x");
        assert_eq!(query_param_from_parts(&parts, "instance_id"), Some(" 42 ".to_string()));
    }

    #[test]
    fn test_missing_parameter() {
        assert_eq!(query_param_from_parts(&parts_for("/llm"), "instance_id"), None);
        assert_eq!(query_param_from_parts(&parts_for("/llm?other=1"), "instance_id"), None);
    }
}
