//! Concurrent batch validation.
//!
//! Every token is queued up front into a closed channel that a fixed set of
//! workers drains. A worker validates and reports a token by itself, so one
//! token's lines always come out together; order across tokens is unspecified.

use std::num::NonZeroUsize;
use std::ops::AddAssign;
use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;

use crate::report::Reporter;
use crate::validator::Validator;

/// Token counts for a finished batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub processed: usize,
    pub valid: usize,
    pub invalid: usize,
}

impl BatchSummary {
    fn record(&mut self, valid: bool) {
        self.processed += 1;
        if valid {
            self.valid += 1;
        } else {
            self.invalid += 1;
        }
    }
}

impl AddAssign for BatchSummary {
    fn add_assign(&mut self, other: Self) {
        self.processed += other.processed;
        self.valid += other.valid;
        self.invalid += other.invalid;
    }
}

type Queue = Arc<Mutex<mpsc::Receiver<String>>>;

/// Validate `credentials` with up to `concurrency` workers and report each
/// outcome as it completes.
///
/// Returns once every worker has drained the queue and exited.
pub async fn run_batch(
    validator: Arc<Validator>,
    credentials: Vec<String>,
    concurrency: NonZeroUsize,
    reporter: Arc<Reporter>,
) -> BatchSummary {
    if credentials.is_empty() {
        log::info!("No tokens to validate");
        return BatchSummary::default();
    }

    let workers = concurrency.get().min(credentials.len());
    log::info!(
        "Validating {} tokens with {workers} worker(s)",
        credentials.len()
    );

    let (tx, rx) = mpsc::channel(credentials.len());
    for credential in credentials {
        // Capacity matches the batch and `rx` is alive, so this never waits or fails.
        if tx.send(credential).await.is_err() {
            break;
        }
    }
    drop(tx);

    let queue: Queue = Arc::new(Mutex::new(rx));
    let handles: Vec<JoinHandle<BatchSummary>> = (0..workers)
        .map(|id| {
            tokio::spawn(worker(
                id,
                Arc::clone(&queue),
                Arc::clone(&validator),
                Arc::clone(&reporter),
            ))
        })
        .collect();

    let mut summary = BatchSummary::default();
    for handle in handles {
        match handle.await {
            Ok(tally) => summary += tally,
            Err(e) => log::error!("Worker task failed: {e}"),
        }
    }

    log::info!(
        "Processed {} tokens: {} valid, {} invalid",
        summary.processed,
        summary.valid,
        summary.invalid
    );
    summary
}

async fn worker(
    id: usize,
    queue: Queue,
    validator: Arc<Validator>,
    reporter: Arc<Reporter>,
) -> BatchSummary {
    let mut tally = BatchSummary::default();

    loop {
        // The guard is released at the end of this statement.
        let next = queue.lock().await.recv().await;
        let Some(credential) = next else {
            break;
        };

        let outcome = validator.validate(&credential).await;
        tally.record(outcome.valid);

        if let Err(e) = reporter.report(&credential, &outcome) {
            log::error!("Worker {id} failed to write report: {e}");
        }
    }

    log::debug!("Worker {id} done after {} token(s)", tally.processed);
    tally
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::time::{Duration, Instant};

    use wiremock::matchers::{header_regex, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::report::ReportOptions;
    use crate::test_support::SharedBuf;
    use crate::validator::ValidatorConfig;

    /// Accepts tokens starting with `good-`; everything else gets the default 404.
    async fn github() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .and(header_regex("authorization", "^Bearer good-"))
            .respond_with(ResponseTemplate::new(200).insert_header("X-OAuth-Scopes", "repo"))
            .mount(&server)
            .await;
        server
    }

    fn validator(server: &MockServer, retrieve_resources: bool) -> Arc<Validator> {
        Arc::new(
            Validator::new(ValidatorConfig {
                endpoint: format!("{}/user", server.uri()),
                retrieve_identity: false,
                retrieve_resources,
            })
            .expect("validator"),
        )
    }

    fn reporter(show_invalid: bool) -> (Arc<Reporter>, SharedBuf) {
        let buf = SharedBuf::default();
        let options = ReportOptions {
            show_invalid,
            remove_color: true,
        };
        (Arc::new(Reporter::new(options, buf.clone())), buf)
    }

    fn tokens(good: usize, bad: usize) -> Vec<String> {
        (0..good)
            .map(|i| format!("good-{i}"))
            .chain((0..bad).map(|i| format!("bad-{i}")))
            .collect()
    }

    fn concurrency(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).expect("non-zero")
    }

    #[tokio::test]
    async fn every_token_is_reported_exactly_once() {
        let server = github().await;
        let (reporter, buf) = reporter(true);

        let summary = run_batch(validator(&server, false), tokens(10, 10), concurrency(4), reporter)
            .await;

        assert_eq!(
            summary,
            BatchSummary {
                processed: 20,
                valid: 10,
                invalid: 10,
            }
        );

        let output = buf.contents();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 20);
        let unique: BTreeSet<&str> = lines.iter().copied().collect();
        assert_eq!(unique.len(), 20, "duplicate report lines: {output}");
        assert!(unique.contains("Valid token: good-3"));
        assert!(unique.contains("Invalid token: bad-7"));
    }

    #[tokio::test]
    async fn single_worker_and_full_pool_report_the_same_set() {
        let server = github().await;
        let input = tokens(6, 6);

        let (serial_reporter, serial_buf) = reporter(true);
        run_batch(validator(&server, false), input.clone(), concurrency(1), serial_reporter).await;

        let (pool_reporter, pool_buf) = reporter(true);
        run_batch(validator(&server, false), input.clone(), concurrency(input.len()), pool_reporter)
            .await;

        let serial: BTreeSet<String> = serial_buf.contents().lines().map(str::to_string).collect();
        let pooled: BTreeSet<String> = pool_buf.contents().lines().map(str::to_string).collect();
        assert_eq!(serial.len(), 12);
        assert_eq!(serial, pooled);
    }

    #[tokio::test]
    async fn invalid_tokens_are_counted_but_not_printed() {
        let server = github().await;
        let (reporter, buf) = reporter(false);

        let summary = run_batch(validator(&server, false), tokens(3, 5), concurrency(2), reporter)
            .await;

        assert_eq!(summary.invalid, 5);
        let output = buf.contents();
        assert_eq!(output.lines().count(), 3);
        assert!(output.lines().all(|l| l.starts_with("Valid token: good-")));
    }

    #[tokio::test]
    async fn empty_batch_issues_no_requests() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        let (reporter, buf) = reporter(true);

        let summary = run_batch(validator(&server, false), Vec::new(), concurrency(8), reporter).await;

        assert_eq!(summary, BatchSummary::default());
        assert!(buf.contents().is_empty());
    }

    #[tokio::test]
    async fn pool_larger_than_batch_is_capped() {
        let server = github().await;
        let (reporter, buf) = reporter(true);

        let summary = run_batch(validator(&server, false), tokens(2, 0), concurrency(64), reporter)
            .await;

        assert_eq!(summary.processed, 2);
        assert_eq!(buf.contents().lines().count(), 2);
    }

    #[tokio::test]
    async fn each_token_block_is_contiguous() {
        let server = github().await;
        Mock::given(method("GET"))
            .and(path("/user/repos"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"[{"name":"a","html_url":"https://github.com/o/a"},
                    {"name":"b","html_url":"https://github.com/o/b"}]"#,
            ))
            .mount(&server)
            .await;
        let (reporter, buf) = reporter(false);

        run_batch(validator(&server, true), tokens(8, 0), concurrency(4), reporter).await;

        let output = buf.contents();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 8 * 4);
        for block in lines.chunks(4) {
            assert!(block[0].starts_with("Valid token: good-"), "{output}");
            assert_eq!(block[1], "Private Repositories:");
            assert_eq!(block[2], "- a (https://github.com/o/a)");
            assert_eq!(block[3], "- b (https://github.com/o/b)");
        }
    }

    #[tokio::test]
    async fn workers_validate_in_parallel() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;
        let (reporter, _buf) = reporter(false);

        let started = Instant::now();
        let summary = run_batch(validator(&server, false), tokens(4, 0), concurrency(4), reporter)
            .await;

        assert_eq!(summary.valid, 4);
        assert!(
            started.elapsed() < Duration::from_millis(1500),
            "batch took {:?}",
            started.elapsed()
        );
    }

    #[tokio::test]
    async fn slow_token_stalls_only_its_own_worker() {
        let server = github().await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .and(header_regex("authorization", "^Bearer good-slow$"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .with_priority(1)
            .mount(&server)
            .await;
        let (reporter, buf) = reporter(false);

        let mut input = vec!["good-slow".to_string()];
        input.extend(tokens(5, 0));
        let batch = tokio::spawn(run_batch(
            validator(&server, false),
            input,
            concurrency(2),
            reporter,
        ));

        let started = Instant::now();
        while buf.contents().lines().count() < 5 {
            assert!(
                started.elapsed() < Duration::from_secs(2),
                "fast tokens were held back: {:?}",
                buf.contents()
            );
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        let early = buf.contents();
        assert!(!early.contains("good-slow"), "{early}");
        for i in 0..5 {
            assert!(early.contains(&format!("Valid token: good-{i}\n")), "{early}");
        }

        let summary = batch.await.expect("batch task");
        assert_eq!(summary.valid, 6);
        let output = buf.contents();
        assert_eq!(output.lines().last(), Some("Valid token: good-slow"));
    }
}
