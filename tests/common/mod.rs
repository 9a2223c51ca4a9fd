//! Shared utilities for integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use event_router::{Context, HandlerResult};

/// Ordered record of which handlers and filters ran.
#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    /// Handler that appends `label` and succeeds.
    pub fn recorder(&self, label: &'static str) -> impl Fn(&mut Context<'_>) -> HandlerResult + Send + Sync + 'static {
        let journal = self.clone();
        move |_ctx: &mut Context<'_>| {
            journal.push(label);
            Ok(())
        }
    }

    /// Handler that appends `label` and fails with `message`.
    pub fn failing(
        &self,
        label: &'static str,
        message: &'static str,
    ) -> impl Fn(&mut Context<'_>) -> HandlerResult + Send + Sync + 'static {
        let journal = self.clone();
        move |_ctx: &mut Context<'_>| {
            journal.push(label);
            Err(event_router::HandlerError::msg(message))
        }
    }
}

/// Handler echoing the matched pattern and every path parameter.
pub fn echo(ctx: &mut Context<'_>) -> HandlerResult {
    let mut params: Vec<String> = ctx
        .path_params()
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect();
    params.sort();
    let body = format!("{} {}", ctx.matched_path().unwrap_or("-"), params.join("&"));
    ctx.text(body);
    Ok(())
}
