use std::collections::HashSet;
use std::time::Duration;

use futures::{Stream, StreamExt};

/// Request lifecycle events, keyed by the browser's request id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestEvent {
    Sent(String),
    Finished(String),
}

/// Resolves once no request has been in flight for `window`.
///
/// Every event restarts the quiet period. Returns early if the event stream
/// ends (the page or browser went away). There is no upper bound: a page that
/// keeps requests open keeps this waiting.
pub async fn wait_for_network_idle<S>(events: S, window: Duration)
where
    S: Stream<Item = RequestEvent> + Unpin,
{
    let mut events = events.fuse();
    let mut in_flight: HashSet<String> = HashSet::new();

    loop {
        tokio::select! {
            event = events.next() => match event {
                Some(RequestEvent::Sent(id)) => {
                    in_flight.insert(id);
                }
                Some(RequestEvent::Finished(id)) => {
                    in_flight.remove(&id);
                }
                None => return,
            },
            _ = tokio::time::sleep(window), if in_flight.is_empty() => return,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use tokio::sync::mpsc;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn resolves_after_quiet_window_with_no_traffic() {
        let (_tx, rx) = mpsc::unbounded_channel::<RequestEvent>();
        let events = tokio_stream_from(rx);
        let start = Instant::now();
        wait_for_network_idle(events, Duration::from_millis(500)).await;
        assert!(start.elapsed() >= Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn waits_for_in_flight_requests_to_finish() {
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(RequestEvent::Sent("1".to_string())).unwrap();

        let sender = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(3)).await;
            tx.send(RequestEvent::Finished("1".to_string())).unwrap();
            // Keep the stream open past the quiet window.
            tokio::time::sleep(Duration::from_secs(10)).await;
            drop(tx);
        });

        let start = Instant::now();
        wait_for_network_idle(tokio_stream_from(rx), Duration::from_millis(500)).await;
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(3500), "{elapsed:?}");
        assert!(elapsed < Duration::from_secs(4), "{elapsed:?}");
        sender.abort();
    }

    #[tokio::test]
    async fn ended_stream_stops_waiting() {
        let events = stream::iter(vec![RequestEvent::Sent("a".to_string())]);
        // Would otherwise wait forever on "a".
        wait_for_network_idle(events, Duration::from_secs(3600)).await;
    }

    fn tokio_stream_from(
        mut rx: mpsc::UnboundedReceiver<RequestEvent>,
    ) -> impl Stream<Item = RequestEvent> + Unpin {
        Box::pin(stream::poll_fn(move |cx| rx.poll_recv(cx)))
    }
}
