// Timeout-bounded fetching.
//
// Every network call in the research core goes through `bounded`. The deadline
// covers the whole operation (connect, send, body read), and dropping the
// timed-out future releases its timer and connection on every exit path.

use std::future::Future;
use std::time::Duration;

use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{SourceError, SourceResult};

/// Simple lookups: search, code host, enrichment, calendar.
pub const LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);
/// Social provider lookups.
pub const SOCIAL_TIMEOUT: Duration = Duration::from_secs(15);
/// Event page scrapes.
pub const EVENT_SCRAPE_TIMEOUT: Duration = Duration::from_secs(12);
/// LLM completions.
pub const LLM_TIMEOUT: Duration = Duration::from_secs(30);

/// Run `fut` with a hard deadline. Elapsed deadline maps to `SourceError::Timeout`.
pub async fn bounded<T, F>(timeout: Duration, fut: F) -> SourceResult<T>
where
    F: Future<Output = SourceResult<T>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => {
            debug!(timeout_ms = timeout.as_millis() as u64, "fetch: deadline elapsed");
            Err(SourceError::Timeout(timeout))
        }
    }
}

/// Send a request and fail on non-2xx, carrying the response body as the message.
async fn send_checked(request: RequestBuilder) -> SourceResult<Response> {
    let resp = request.send().await?;
    let status = resp.status();
    if !status.is_success() {
        let message = resp.text().await.unwrap_or_default();
        return Err(SourceError::Status {
            status: status.as_u16(),
            message,
        });
    }
    Ok(resp)
}

/// Bounded request returning the parsed JSON body.
pub async fn fetch_json<T: DeserializeOwned>(
    request: RequestBuilder,
    timeout: Duration,
) -> SourceResult<T> {
    bounded(timeout, async move {
        let resp = send_checked(request).await?;
        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    })
    .await
}

/// Bounded request returning the raw text body.
pub async fn fetch_text(request: RequestBuilder, timeout: Duration) -> SourceResult<String> {
    bounded(timeout, async move {
        let resp = send_checked(request).await?;
        Ok(resp.text().await?)
    })
    .await
}
