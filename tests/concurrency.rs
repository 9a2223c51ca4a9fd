//! Shared route table under concurrent dispatch.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use event_router::{Context, HttpMethod, HttpRequest, RouteTable};

mod common;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_dispatch_keeps_requests_isolated() {
    let inbound = Arc::new(AtomicUsize::new(0));
    let counter = inbound.clone();
    let table = Arc::new(
        RouteTable::builder()
            .before("*", move |ctx: &mut Context<'_>| {
                counter.fetch_add(1, Ordering::Relaxed);
                let id = ctx.request_id();
                ctx.set_attribute("request_id", id);
                Ok(())
            })
            .get("/items/{id}", |ctx: &mut Context<'_>| {
                let id = ctx.path_param("id").unwrap_or_default().to_string();
                ctx.text(id);
                Ok(())
            })
            .after("*", |ctx: &mut Context<'_>| {
                let own = ctx.attribute::<uuid::Uuid>("request_id").copied();
                if own != Some(ctx.request_id()) {
                    return Err(event_router::HandlerError::msg("context leaked"));
                }
                Ok(())
            })
            .build()
            .unwrap(),
    );

    let tasks = 16;
    let per_task = 200;
    let mut handles = Vec::new();
    for task in 0..tasks {
        let table = table.clone();
        handles.push(tokio::spawn(async move {
            for i in 0..per_task {
                let id = format!("{}-{}", task, i);
                let request = HttpRequest::new(HttpMethod::Get, format!("/items/{}", id));
                let response = table.dispatch(&request);
                assert_eq!(response.status, 200);
                assert_eq!(response.body.as_deref(), Some(id.as_str()));
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(inbound.load(Ordering::Relaxed), tasks * per_task);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_blocking_dispatch_from_spawned_threads() {
    let table = Arc::new(
        RouteTable::builder()
            .get("/health", common::echo)
            .build()
            .unwrap(),
    );

    let results = dispatch_on_blocking_pool(table, 8).await;
    assert!(results.iter().all(|status| *status == 200));
}

async fn dispatch_on_blocking_pool(table: Arc<RouteTable>, n: usize) -> Vec<u16> {
    let mut handles = Vec::new();
    for _ in 0..n {
        let table = table.clone();
        handles.push(tokio::task::spawn_blocking(move || {
            table.dispatch(&HttpRequest::new(HttpMethod::Get, "/health")).status
        }));
    }
    let mut statuses = Vec::new();
    for handle in handles {
        statuses.push(handle.await.unwrap());
    }
    statuses
}
