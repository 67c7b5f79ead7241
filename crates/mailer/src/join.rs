use std::future::Future;

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use mailwright_core::MailerError;
use thiserror::Error;

/// A spawned task ended without producing a value.
///
/// Raised when the runtime cancels a task, typically because it is shutting
/// down. Panics are not reported this way; they resume on the caller.
#[derive(Debug, Error)]
#[error("task did not complete: {0}")]
pub struct TaskCancelled(pub String);

impl From<TaskCancelled> for MailerError {
    fn from(err: TaskCancelled) -> Self {
        MailerError::TaskFailed(err.0)
    }
}

/// Run keyed fallible tasks concurrently and collect their results.
///
/// Every task is spawned onto the runtime before any is awaited. Results are
/// returned in completion order, each paired with its key. The first error
/// observed is returned immediately; the remaining tasks are detached, so they
/// run to completion in the background and their results are discarded.
///
/// # Examples
///
/// ```
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// use mailwright_core::MailerError;
/// use mailwright_mailer::try_join_keyed;
///
/// let tasks = (1..=3).map(|n| (n, async move { Ok::<_, MailerError>(n * 10) }));
/// let mut results = try_join_keyed(tasks).await.unwrap();
/// results.sort_unstable();
/// assert_eq!(results, vec![(1, 10), (2, 20), (3, 30)]);
/// # }
/// ```
pub async fn try_join_keyed<K, T, E, I, F>(tasks: I) -> Result<Vec<(K, T)>, E>
where
    I: IntoIterator<Item = (K, F)>,
    F: Future<Output = Result<T, E>> + Send + 'static,
    K: Send,
    T: Send + 'static,
    E: From<TaskCancelled> + Send + 'static,
{
    let mut pending: FuturesUnordered<_> = tasks
        .into_iter()
        .map(|(key, task)| {
            let handle = tokio::spawn(task);
            async move { (key, handle.await) }
        })
        .collect();

    let mut joined = Vec::with_capacity(pending.len());
    while let Some((key, outcome)) = pending.next().await {
        match outcome {
            Ok(Ok(value)) => joined.push((key, value)),
            Ok(Err(err)) => return Err(err),
            Err(join_err) if join_err.is_panic() => {
                std::panic::resume_unwind(join_err.into_panic());
            }
            Err(join_err) => return Err(TaskCancelled(join_err.to_string()).into()),
        }
    }
    Ok(joined)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use futures::FutureExt;
    use futures::future::BoxFuture;

    use super::*;

    #[derive(Debug, PartialEq, Eq)]
    enum TestError {
        Failed(&'static str),
        Cancelled,
    }

    impl From<TaskCancelled> for TestError {
        fn from(_: TaskCancelled) -> Self {
            Self::Cancelled
        }
    }

    type Task = BoxFuture<'static, Result<u32, TestError>>;

    async fn explode() -> Result<u32, TestError> {
        panic!("task exploded")
    }

    #[tokio::test]
    async fn empty_input_joins_to_empty_output() {
        let tasks: Vec<(&str, Task)> = Vec::new();
        let joined = try_join_keyed(tasks).await.unwrap();
        assert!(joined.is_empty());
    }

    #[tokio::test]
    async fn all_successes_are_collected_with_keys() {
        let tasks: Vec<(&str, Task)> = vec![
            (
                "slow",
                async {
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    Ok(1)
                }
                .boxed(),
            ),
            ("fast", async { Ok(2) }.boxed()),
        ];

        let mut joined = try_join_keyed(tasks).await.unwrap();
        joined.sort_unstable();
        assert_eq!(joined, vec![("fast", 2), ("slow", 1)]);
    }

    #[tokio::test]
    async fn first_failure_returns_without_waiting_for_siblings() {
        let tasks: Vec<(&str, Task)> = vec![
            (
                "stuck",
                async {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(1)
                }
                .boxed(),
            ),
            ("broken", async { Err(TestError::Failed("boom")) }.boxed()),
        ];

        let result = tokio::time::timeout(Duration::from_secs(5), try_join_keyed(tasks))
            .await
            .expect("join should short-circuit");
        assert_eq!(result.unwrap_err(), TestError::Failed("boom"));
    }

    #[tokio::test]
    async fn siblings_are_detached_not_aborted() {
        let finished = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&finished);
        let tasks: Vec<(&str, Task)> = vec![
            (
                "sibling",
                async move {
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    flag.store(true, Ordering::SeqCst);
                    Ok(1)
                }
                .boxed(),
            ),
            ("broken", async { Err(TestError::Failed("boom")) }.boxed()),
        ];

        assert!(try_join_keyed(tasks).await.is_err());
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(finished.load(Ordering::SeqCst));
    }

    #[tokio::test]
    #[should_panic(expected = "task exploded")]
    async fn panics_resume_on_the_caller() {
        let tasks: Vec<(&str, Task)> = vec![("bad", explode().boxed())];
        let _ = try_join_keyed(tasks).await;
    }

    #[test]
    fn cancellation_maps_to_task_failed() {
        let err: MailerError = TaskCancelled("runtime shut down".to_owned()).into();
        assert!(matches!(err, MailerError::TaskFailed(ref m) if m == "runtime shut down"));
    }
}
