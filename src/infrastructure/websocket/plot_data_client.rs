use super::dto::{PLOT_DATA_PROTOCOL, StreamDecoder, StreamMessage};
use crate::domain::errors::StreamError;
use crate::domain::logging::{LogComponent, get_logger};
use futures::StreamExt;
use gloo_net::websocket::Message;
use gloo_net::websocket::futures::WebSocket;
use std::time::Duration;

/// First reconnect delay
pub const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
/// Reconnect delays double up to this cap
pub const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Next reconnect delay after `current`
pub fn next_backoff(current: Duration) -> Duration {
    (current * 2).min(MAX_BACKOFF)
}

/// Websocket client for a plot-data feed based on gloo
pub struct PlotDataClient {
    url: String,
    decoder: StreamDecoder,
}

impl PlotDataClient {
    pub fn new(url: &str) -> Self {
        Self { url: url.to_string(), decoder: StreamDecoder::new(url) }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn decoder(&self) -> &StreamDecoder {
        &self.decoder
    }

    /// Open the websocket on the plot-data subprotocol
    pub fn connect(&self) -> Result<WebSocket, StreamError> {
        get_logger().info(
            LogComponent::Infrastructure("PlotDataClient"),
            &format!("connecting to {}", self.url),
        );
        WebSocket::open_with_protocol(&self.url, PLOT_DATA_PROTOCOL)
            .map_err(|e| StreamError::ConnectionFailed(format!("{e:?}")))
    }

    /// Decode one websocket message
    pub fn handle_message(&mut self, message: Message) -> Result<StreamMessage, StreamError> {
        match message {
            Message::Text(text) => self.decoder.decode_text(&text),
            Message::Bytes(bytes) => self.decoder.decode_binary(bytes),
        }
    }

    /// Receive forever, reconnecting with exponential backoff.
    ///
    /// Every decoded message goes straight to `handler`; nothing is queued,
    /// so a slow consumer only ever sees the latest data.
    pub async fn run<F, R>(&mut self, mut handler: F, mut on_reconnect: R)
    where
        F: FnMut(StreamMessage),
        R: FnMut(Duration),
    {
        use gloo_timers::future::sleep;

        let mut delay = INITIAL_BACKOFF;
        loop {
            match self.connect() {
                Ok(mut stream) => {
                    delay = INITIAL_BACKOFF;
                    while let Some(message) = stream.next().await {
                        match message {
                            Ok(message) => match self.handle_message(message) {
                                Ok(decoded) => handler(decoded),
                                Err(e) => get_logger().warn(
                                    LogComponent::Infrastructure("PlotDataClient"),
                                    &format!("dropped message: {e}"),
                                ),
                            },
                            Err(e) => {
                                get_logger().error(
                                    LogComponent::Infrastructure("PlotDataClient"),
                                    &format!("websocket error: {e:?}"),
                                );
                                break;
                            }
                        }
                    }
                }
                Err(e) => {
                    get_logger().error(LogComponent::Infrastructure("PlotDataClient"), &e.to_string());
                }
            }

            get_logger().warn(
                LogComponent::Infrastructure("PlotDataClient"),
                &format!("reconnecting in {}s", delay.as_secs()),
            );
            on_reconnect(delay);
            sleep(delay).await;
            delay = next_backoff(delay);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_to_cap() {
        let mut delay = INITIAL_BACKOFF;
        let mut seen = Vec::new();
        for _ in 0..7 {
            seen.push(delay.as_secs());
            delay = next_backoff(delay);
        }
        assert_eq!(seen, vec![1, 2, 4, 8, 16, 30, 30]);
    }

    #[test]
    fn text_and_binary_messages_decode() {
        let mut client = PlotDataClient::new("ws://localhost:8080");
        let header = client.handle_message(Message::Text(r#"{"xdelta": 2.0}"#.into())).unwrap();
        assert!(matches!(header, StreamMessage::Header(h) if h.xdelta == Some(2.0)));
        let samples = client.handle_message(Message::Bytes(vec![0; 8])).unwrap();
        assert!(matches!(samples, StreamMessage::Samples(_)));
    }
}
