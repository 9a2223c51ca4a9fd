//! Route table built from a [`RouterConfig`].
//!
//! Configured routes answer with a fixed response whose body may reference
//! path parameters as `{name}`. Configured filters write access-log events.

use std::sync::Arc;
use std::time::Instant;

use crate::config::schema::{RouteConfig, RouterConfig};
use crate::error::{BuildError, RouteError};
use crate::filter::Phase;
use crate::http::context::Context;
use crate::http::handler::{Handler, HandlerResult};
use crate::http::method::HttpMethod;
use crate::routing::router::RouteTable;

const START_ATTRIBUTE: &str = "access_log.start";

/// Build a frozen route table from configuration.
///
/// Unknown methods are reported alongside pattern errors in one
/// [`BuildError`].
pub fn from_config(config: &RouterConfig) -> Result<RouteTable, BuildError> {
    let mut errors = Vec::new();
    let mut builder = RouteTable::builder()
        .ignore_trailing_slash(config.router.ignore_trailing_slash)
        .metrics(config.observability.metrics_enabled);

    for route in &config.routes {
        match route.method.parse::<HttpMethod>() {
            Ok(method) => {
                builder = builder.add_route(method, &route.path, Arc::new(StaticResponse::from(route)));
            }
            Err(source) => errors.push(RouteError::UnknownMethod {
                pattern: route.path.clone(),
                source,
            }),
        }
    }

    for filter in &config.filters {
        builder = builder.add_filter(
            filter.phase,
            &filter.path,
            Arc::new(AccessLogFilter::new(filter.name.clone(), filter.phase)),
        );
    }

    match builder.build() {
        Ok(table) if errors.is_empty() => Ok(table),
        Ok(_) => Err(BuildError { errors }),
        Err(mut err) => {
            errors.append(&mut err.errors);
            Err(BuildError { errors })
        }
    }
}

/// Handler answering with a configured status, content type and body.
#[derive(Debug, Clone)]
pub struct StaticResponse {
    name: String,
    status: u16,
    content_type: String,
    body: String,
}

impl From<&RouteConfig> for StaticResponse {
    fn from(route: &RouteConfig) -> Self {
        Self {
            name: route.name.clone(),
            status: route.status,
            content_type: route.content_type.clone(),
            body: route.body.clone(),
        }
    }
}

impl StaticResponse {
    /// Substitute `{name}` placeholders in one left-to-right pass. Inserted
    /// values are never rescanned; braces that do not name a path
    /// parameter are kept verbatim.
    fn render(&self, ctx: &Context<'_>) -> String {
        let mut body = String::with_capacity(self.body.len());
        let mut rest = self.body.as_str();
        while let Some(open) = rest.find('{') {
            body.push_str(&rest[..open]);
            let tail = &rest[open..];
            let param = tail
                .find('}')
                .and_then(|close| ctx.path_param(&tail[1..close]).map(|value| (value, close)));
            match param {
                Some((value, close)) => {
                    body.push_str(value);
                    rest = &tail[close + 1..];
                }
                None => {
                    body.push('{');
                    rest = &tail[1..];
                }
            }
        }
        body.push_str(rest);
        body
    }
}

impl Handler for StaticResponse {
    fn handle(&self, ctx: &mut Context<'_>) -> HandlerResult {
        tracing::trace!(route = %self.name, "Serving static response");
        let body = self.render(ctx);
        ctx.set_status(self.status).set_content_type(self.content_type.as_str());
        if !body.is_empty() {
            ctx.write_body(body);
        }
        Ok(())
    }
}

/// Filter writing one access-log event per request and phase.
#[derive(Debug, Clone)]
pub struct AccessLogFilter {
    name: String,
    phase: Phase,
}

impl AccessLogFilter {
    pub fn new(name: impl Into<String>, phase: Phase) -> Self {
        Self {
            name: name.into(),
            phase,
        }
    }
}

impl Handler for AccessLogFilter {
    fn handle(&self, ctx: &mut Context<'_>) -> HandlerResult {
        match self.phase {
            Phase::Before => {
                tracing::info!(
                    filter = %self.name,
                    request_id = %ctx.request_id(),
                    method = %ctx.method(),
                    path = ctx.path(),
                    "Inbound request"
                );
                ctx.set_attribute(START_ATTRIBUTE, Instant::now());
            }
            Phase::After => {
                let elapsed_ms = ctx
                    .attribute::<Instant>(START_ATTRIBUTE)
                    .map(|start| start.elapsed().as_millis() as u64);
                if ctx.status() >= 500 {
                    tracing::warn!(
                        filter = %self.name,
                        request_id = %ctx.request_id(),
                        path = ctx.path(),
                        status = ctx.status(),
                        elapsed_ms = ?elapsed_ms,
                        "Request failed"
                    );
                } else {
                    tracing::info!(
                        filter = %self.name,
                        request_id = %ctx.request_id(),
                        path = ctx.path(),
                        status = ctx.status(),
                        elapsed_ms = ?elapsed_ms,
                        "Request completed"
                    );
                }
            }
        }
        Ok(())
    }
}
