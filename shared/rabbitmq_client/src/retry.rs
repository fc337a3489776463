use std::{fmt::Display, future::Future, time::Duration};

///
/// Runs async function in a loop until it returns Ok.
/// Every failed attempt is followed by `retry_interval` of sleep.
///
pub async fn retry<AttemptF, ErrF, F, Fut, T, E>(
    retry_interval: Duration,
    attempt_log_fn: AttemptF,
    error_log_fn: ErrF,
    async_fn: F,
) -> T
where
    AttemptF: Fn(u32),
    ErrF: Fn(u32, E),
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut attempt = 0;

    loop {
        attempt += 1;

        attempt_log_fn(attempt);
        match async_fn().await {
            Ok(output) => return output,
            Err(err) => error_log_fn(attempt, err),
        }

        tokio::time::sleep(retry_interval).await;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn retry_returns_first_ok() {
        let calls = AtomicU32::new(0);

        let output = retry(
            Duration::from_millis(1),
            |_| {},
            |_, _: String| {},
            || async {
                match calls.fetch_add(1, Ordering::SeqCst) {
                    0 | 1 => Err("not yet".to_string()),
                    n => Ok(n),
                }
            },
        )
        .await;

        assert_eq!(output, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn retry_reports_attempt_numbers() {
        let failed_attempts = std::sync::Mutex::new(Vec::new());

        retry(
            Duration::from_millis(1),
            |_| {},
            |attempt, _: String| failed_attempts.lock().unwrap().push(attempt),
            || {
                let len = failed_attempts.lock().unwrap().len();
                async move {
                    match len < 2 {
                        true => Err("fail".to_string()),
                        false => Ok(()),
                    }
                }
            },
        )
        .await;

        assert_eq!(*failed_attempts.lock().unwrap(), vec![1, 2]);
    }
}
