//! Follows the backend log socket, feeding frames into a [`LogBuffer`].
//!
//! A dropped or refused connection is retried on the [`ReconnectPolicy`]
//! schedule; a successful connect resets it. Once the policy is exhausted
//! the follower gives up and reports [`StreamEnd::GaveUp`].

use std::future::Future;

use futures::stream::BoxStream;
use futures::{Stream, StreamExt};
use hints_engine::{LogBuffer, LogEntry, ReconnectPolicy};
use tokio::sync::watch;
use tokio_tungstenite::tungstenite::Message;

use crate::error::ClientError;

/// Why [`follow_log_stream`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEnd {
    /// The stop signal turned `true`.
    Stopped,
    /// Reconnect attempts ran out; the stream stays disconnected.
    GaveUp,
}

/// Connect to `url` and push every parsed frame into `buffer` until stopped
/// or until reconnecting gives up. `on_entry` sees each entry as it arrives.
pub async fn follow_log_stream(
    url: &str,
    buffer: &mut LogBuffer,
    stop: watch::Receiver<bool>,
    on_entry: impl FnMut(&LogEntry),
) -> StreamEnd {
    follow(|| connect_frames(url), buffer, stop, on_entry).await
}

async fn connect_frames(
    url: &str,
) -> Result<BoxStream<'static, Result<String, ClientError>>, ClientError> {
    let (socket, _) = tokio_tungstenite::connect_async(url)
        .await
        .map_err(Box::new)?;
    tracing::info!(url, "log stream connected");
    Ok(socket
        .filter_map(|message| async move {
            match message {
                Ok(Message::Text(text)) => Some(Ok(text)),
                Ok(_) => None,
                Err(e) => Some(Err(ClientError::from(Box::new(e)))),
            }
        })
        .boxed())
}

pub(crate) async fn follow<C, Fut, S>(
    mut connect: C,
    buffer: &mut LogBuffer,
    mut stop: watch::Receiver<bool>,
    mut on_entry: impl FnMut(&LogEntry),
) -> StreamEnd
where
    C: FnMut() -> Fut,
    Fut: Future<Output = Result<S, ClientError>>,
    S: Stream<Item = Result<String, ClientError>> + Unpin,
{
    let mut policy = ReconnectPolicy::new();
    loop {
        let connected = tokio::select! {
            biased;
            () = stopped(&mut stop) => return StreamEnd::Stopped,
            result = connect() => result,
        };

        match connected {
            Ok(mut frames) => {
                policy.reset();
                loop {
                    let next = tokio::select! {
                        biased;
                        () = stopped(&mut stop) => return StreamEnd::Stopped,
                        next = frames.next() => next,
                    };
                    match next {
                        Some(Ok(raw)) => {
                            if let Some(entry) = LogEntry::parse_frame(&raw) {
                                on_entry(&entry);
                                buffer.push(entry);
                            }
                        }
                        Some(Err(e)) => {
                            tracing::warn!(error = %e, "log stream dropped");
                            break;
                        }
                        None => {
                            tracing::info!("log stream closed");
                            break;
                        }
                    }
                }
            }
            Err(e) => tracing::warn!(error = %e, "log stream connect failed"),
        }

        let Some(delay) = policy.next_delay() else {
            tracing::warn!(attempts = policy.attempts(), "log stream reconnect attempts exhausted");
            return StreamEnd::GaveUp;
        };
        tracing::debug!(attempt = policy.attempts(), ?delay, "reconnecting log stream");
        tokio::select! {
            biased;
            () = stopped(&mut stop) => return StreamEnd::Stopped,
            () = tokio::time::sleep(delay) => {}
        }
    }
}

/// Resolves once the stop flag is `true`; never resolves if the sender is gone.
async fn stopped(stop: &mut watch::Receiver<bool>) {
    loop {
        if *stop.borrow_and_update() {
            return;
        }
        if stop.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
