//! Integration tests for the retry middleware.

use std::cell::Cell;
use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use assert2::{check, let_assert};
use tripperware::middleware::{LoggingMiddleware, RetryMetrics, RetryMiddleware, ServiceBuilder};
use tripperware::{Context, Error, Handler, Result, handler_fn};

type Script = Box<dyn Fn(u32, &Context) -> Result<&'static str> + Send + Sync>;

/// Handler answering each attempt from a script, counting invocations.
struct Scripted {
    calls: AtomicU32,
    script: Script,
}

impl Scripted {
    fn new(script: impl Fn(u32, &Context) -> Result<&'static str> + Send + Sync + 'static) -> Self {
        Self {
            calls: AtomicU32::new(0),
            script: Box::new(script),
        }
    }

    fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Handler<()> for Scripted {
    type Response = &'static str;

    fn call(
        &self,
        ctx: Context,
        _request: (),
    ) -> impl Future<Output = Result<Self::Response>> + Send {
        let attempt = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        std::future::ready((self.script)(attempt, &ctx))
    }
}

/// Metrics sink keeping everything it sees.
#[derive(Default)]
struct RecordingMetrics {
    retries: AtomicU32,
    tries: Mutex<Vec<u32>>,
}

impl RetryMetrics for RecordingMetrics {
    fn record_retry(&self) {
        self.retries.fetch_add(1, Ordering::SeqCst);
    }

    fn observe_tries(&self, tries: u32) {
        self.tries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(tries);
    }
}

impl RecordingMetrics {
    fn retries(&self) -> u32 {
        self.retries.load(Ordering::SeqCst)
    }

    fn tries(&self) -> Vec<u32> {
        self.tries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

async fn run(max_retries: u32, handler: &Scripted) -> Result<&'static str> {
    RetryMiddleware::new(max_retries)
        .wrap(handler)
        .call(Context::background(), ())
        .await
}

#[tokio::test]
async fn test_retry_failures_until_success() {
    let handler = Scripted::new(|attempt, _| {
        if attempt == 5 {
            Ok("Hello World")
        } else {
            Err(Error::handler("fail"))
        }
    });

    let result = run(5, &handler).await;

    check!(result == Ok("Hello World"));
    check!(handler.calls() == 5);
}

#[tokio::test]
async fn test_success_after_some_failures() {
    let handler = Scripted::new(|attempt, _| {
        if attempt <= 2 {
            Err(Error::http(502, "Bad Gateway"))
        } else {
            Ok("ok")
        }
    });

    let result = run(5, &handler).await;

    check!(result == Ok("ok"));
    check!(handler.calls() == 3);
}

#[tokio::test]
async fn test_first_success_is_not_retried() {
    let handler = Scripted::new(|_, _| Ok("ok"));

    check!(run(5, &handler).await == Ok("ok"));
    check!(handler.calls() == 1);
}

#[tokio::test]
async fn test_dont_retry_400s() {
    let handler = Scripted::new(|_, _| Err(Error::http(400, "Bad Request")));

    let result = run(5, &handler).await;

    check!(result == Err(Error::http(400, "Bad Request")));
    check!(handler.calls() == 1);
}

#[tokio::test]
async fn test_retry_500s() {
    let handler = Scripted::new(|_, _| Err(Error::http(500, "Internal Server Error")));

    let result = run(5, &handler).await;

    check!(result == Err(Error::http(500, "Internal Server Error")));
    check!(handler.calls() == 5);
}

#[tokio::test]
async fn test_client_error_ends_retries() {
    let handler = Scripted::new(|attempt, _| {
        if attempt == 5 {
            Err(Error::http(400, "Bad Request"))
        } else {
            Err(Error::http(500, "Internal Server Error"))
        }
    });

    let result = run(5, &handler).await;

    check!(result == Err(Error::http(400, "Bad Request")));
    check!(handler.calls() == 5);
}

#[tokio::test]
async fn test_client_error_wins_over_remaining_budget() {
    let handler = Scripted::new(|attempt, _| {
        if attempt == 3 {
            Err(Error::http(422, "Unprocessable Entity"))
        } else {
            Err(Error::http(503, "Service Unavailable"))
        }
    });

    let result = run(5, &handler).await;

    let_assert!(Err(Error::Http { status, .. }) = result);
    check!(status == 422);
    check!(handler.calls() == 3);
}

#[tokio::test]
async fn test_exhaustion_returns_most_recent_error() {
    let handler = Scripted::new(|attempt, _| {
        Err(match attempt {
            1 => Error::http(500, "first"),
            2 => Error::handler("second"),
            _ => Error::http(503, "third"),
        })
    });

    let result = run(3, &handler).await;

    check!(result == Err(Error::http(503, "third")));
    check!(handler.calls() == 3);
}

#[tokio::test]
async fn test_single_attempt_does_not_retry() {
    let handler = Scripted::new(|_, _| Err(Error::http(500, "Internal Server Error")));

    check!(run(1, &handler).await == Err(Error::http(500, "Internal Server Error")));
    check!(handler.calls() == 1);
}

#[tokio::test]
async fn test_zero_max_retries_makes_one_attempt() {
    let handler = Scripted::new(|_, _| Err(Error::handler("fail")));

    check!(run(0, &handler).await == Err(Error::handler("fail")));
    check!(handler.calls() == 1);
}

#[tokio::test]
async fn test_cancelled_context_skips_handler() {
    let handler = Scripted::new(|_, ctx| Err(ctx.err().unwrap_or(Error::handler("live"))));
    let ctx = Context::background().with_cancel();
    ctx.cancel();

    let result = RetryMiddleware::new(5).wrap(&handler).call(ctx.clone(), ()).await;

    check!(handler.calls() == 0);
    check!(result == Err(Error::Canceled));
    check!(ctx.err() == Some(Error::Canceled));
}

#[tokio::test]
async fn test_cancel_during_attempt_returns_context_error() {
    let handler = Scripted::new(|_, ctx| {
        ctx.cancel();
        Err(Error::handler("failed"))
    });
    let ctx = Context::background().with_cancel();

    let result = RetryMiddleware::new(5).wrap(&handler).call(ctx.clone(), ()).await;

    check!(handler.calls() == 1);
    check!(result == Err(Error::Canceled));
    check!(ctx.err() == Some(Error::Canceled));
}

#[tokio::test]
async fn test_expired_deadline_skips_handler() {
    let handler = Scripted::new(|_, _| Ok("too late"));
    let ctx = Context::background().with_timeout(Duration::ZERO);

    let result = RetryMiddleware::new(5).wrap(&handler).call(ctx, ()).await;

    check!(handler.calls() == 0);
    check!(result == Err(Error::DeadlineExceeded));
}

#[tokio::test(start_paused = true)]
async fn test_handler_waiting_on_deadline() {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&calls);
    let handler = handler_fn(move |ctx: Context, _req: ()| {
        let counter = Arc::clone(&counter);
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            ctx.done().await;
            Err::<(), _>(Error::handler("gave up waiting"))
        }
    });
    let ctx = Context::background().with_timeout(Duration::from_secs(10));

    let result = RetryMiddleware::new(5).wrap(handler).call(ctx, ()).await;

    check!(calls.load(Ordering::SeqCst) == 1);
    check!(result == Err(Error::DeadlineExceeded));
}

#[tokio::test]
async fn test_metrics_count_retries_and_tries() {
    let metrics = Arc::new(RecordingMetrics::default());
    let middleware = RetryMiddleware::new(5).with_metrics(metrics.clone());

    let flaky = Scripted::new(|attempt, _| {
        if attempt <= 2 {
            Err(Error::http(500, "Internal Server Error"))
        } else {
            Ok("ok")
        }
    });
    check!(middleware.wrap(&flaky).call(Context::background(), ()).await == Ok("ok"));

    let invalid = Scripted::new(|_, _| Err(Error::http(400, "Bad Request")));
    let _ = middleware.wrap(&invalid).call(Context::background(), ()).await;

    let ctx = Context::background().with_cancel();
    ctx.cancel();
    let _ = middleware.wrap(&invalid).call(ctx, ()).await;

    check!(metrics.retries() == 2);
    check!(metrics.tries() == vec![3, 1, 0]);
}

#[tokio::test]
async fn test_metrics_on_exhaustion() {
    let metrics = Arc::new(RecordingMetrics::default());
    let handler = Scripted::new(|_, _| Err(Error::handler("fail")));

    let result = RetryMiddleware::new(4)
        .with_metrics(metrics.clone())
        .wrap(&handler)
        .call(Context::background(), ())
        .await;

    check!(result == Err(Error::handler("fail")));
    check!(metrics.retries() == 3);
    check!(metrics.tries() == vec![4]);
}

#[tokio::test]
async fn test_single_attempt_records_no_retry() {
    let metrics = Arc::new(RecordingMetrics::default());
    let handler = Scripted::new(|_, _| Err(Error::http(500, "Internal Server Error")));

    let result = RetryMiddleware::new(1)
        .with_metrics(metrics.clone())
        .wrap(&handler)
        .call(Context::background(), ())
        .await;

    check!(result == Err(Error::http(500, "Internal Server Error")));
    check!(handler.calls() == 1);
    check!(metrics.retries() == 0);
    check!(metrics.tries() == vec![1]);
}

#[tokio::test]
async fn test_cancel_during_last_attempt_returns_handler_error() {
    let handler = Scripted::new(|_, ctx| {
        ctx.cancel();
        Err(Error::handler("failed"))
    });
    let ctx = Context::background().with_cancel();

    let result = RetryMiddleware::new(1).wrap(&handler).call(ctx.clone(), ()).await;

    check!(handler.calls() == 1);
    check!(result == Err(Error::handler("failed")));
    check!(ctx.err() == Some(Error::Canceled));
}

#[tokio::test]
async fn test_request_need_not_be_sync() {
    let handler = handler_fn(|_ctx: Context, attempt: Cell<u32>| async move {
        if attempt.get() == 0 {
            Ok::<_, Error>("first")
        } else {
            Err(Error::handler("unexpected"))
        }
    });

    let result = RetryMiddleware::new(3)
        .wrap(handler)
        .call(Context::background(), Cell::new(0))
        .await;

    check!(result == Ok("first"));
}

#[derive(Debug, Clone)]
struct Job {
    id: u32,
    failures: u32,
    calls: Arc<AtomicU32>,
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_calls_are_independent() {
    let handler = Arc::new(RetryMiddleware::new(5).wrap(handler_fn(
        |_ctx: Context, job: Job| async move {
            let attempt = job.calls.fetch_add(1, Ordering::SeqCst) + 1;
            tokio::task::yield_now().await;
            if attempt <= job.failures {
                Err(Error::http(503, "Service Unavailable"))
            } else {
                Ok(job.id)
            }
        },
    )));

    let mut tasks = Vec::new();
    for id in 0..64 {
        let handler = Arc::clone(&handler);
        let job = Job {
            id,
            failures: id % 5,
            calls: Arc::new(AtomicU32::new(0)),
        };
        tasks.push(tokio::spawn(async move {
            let result = handler.call(Context::background(), job.clone()).await;
            (job, result)
        }));
    }

    for task in tasks {
        let (job, result) = task.await.expect("task");
        check!(result == Ok(job.id));
        check!(job.calls.load(Ordering::SeqCst) == job.failures + 1);
    }
}

#[tokio::test]
async fn test_composition_with_logging() {
    let handler = Scripted::new(|attempt, _| {
        if attempt < 3 {
            Err(Error::http(500, "Internal Server Error"))
        } else {
            Ok("composed")
        }
    });

    let composed = ServiceBuilder::new()
        .layer(LoggingMiddleware::debug())
        .layer(RetryMiddleware::new(5))
        .service(&handler);

    check!(composed.call(Context::background(), ()).await == Ok("composed"));
    check!(handler.calls() == 3);
}
