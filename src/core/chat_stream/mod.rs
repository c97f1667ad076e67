//! Chat completion exchange: sends one request and exposes the reply as a
//! lazy, one-shot sequence of [`StreamEvent`]s.
//!
//! Every stream ends with exactly one terminal event: [`StreamEvent::Done`]
//! or [`StreamEvent::Failed`]. Cancellation is reported as
//! `Failed(ChatError::Cancelled { partial })`, where `partial` is everything
//! emitted so far. The token is only observed while the consumer waits on the
//! network; lines already decoded from a received chunk are delivered first.

pub mod decoder;
pub mod error;


use std::collections::VecDeque;
use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures_util::stream::{self, BoxStream, Stream, StreamExt};
use reqwest::header::CONTENT_TYPE;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::api::{ChatCompletion, ChatRequest};
use crate::utils::url::construct_api_url;

pub use decoder::{decode_line, Frame, FrameDecoder};
pub use error::ChatError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    Delta(String),
    Done,
    Failed(ChatError),
}

impl StreamEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, StreamEvent::Delta(_))
    }
}

/// Everything needed for one exchange. A token drives at most one stream.
pub struct StreamParams {
    pub client: reqwest::Client,
    pub endpoint: String,
    pub credential: String,
    pub request: ChatRequest,
    pub cancel_token: CancellationToken,
}

/// The chat completion endpoint under an API base URL.
pub fn chat_endpoint(base_url: &str) -> String {
    construct_api_url(base_url, "chat/completions")
}

/// Prepare an exchange. Fails immediately, without touching the network, when
/// the credential is empty. The request is sent on first poll.
pub fn stream_chat(params: StreamParams) -> Result<ChatStream, ChatError> {
    if params.credential.trim().is_empty() {
        return Err(ChatError::MissingCredential);
    }

    let StreamParams {
        client,
        endpoint,
        credential,
        request,
        cancel_token,
    } = params;

    let exchange = Exchange {
        client,
        endpoint,
        credential,
        request,
    };
    Ok(ChatStream::new(Consumer::new(
        State::Connect(Box::new(exchange)),
        cancel_token,
    )))
}

type BodyStream = BoxStream<'static, Result<Bytes, ChatError>>;

/// Lazy sequence of reply events. Not restartable; yields `None` after the
/// terminal event.
pub struct ChatStream {
    inner: BoxStream<'static, StreamEvent>,
}

impl ChatStream {
    fn new(consumer: Consumer) -> Self {
        let inner = stream::unfold(consumer, |mut consumer| async move {
            let event = consumer.next_event().await?;
            Some((event, consumer))
        })
        .fuse()
        .boxed();
        Self { inner }
    }

    /// Decode an already-open streaming body. Useful for transports other
    /// than the built-in HTTP client.
    pub fn from_byte_stream<S, B, E>(body: S, cancel_token: CancellationToken) -> Self
    where
        S: Stream<Item = Result<B, E>> + Send + 'static,
        B: Into<Bytes> + 'static,
        E: fmt::Display + 'static,
    {
        let body = body
            .map(|chunk| {
                chunk
                    .map(Into::into)
                    .map_err(|err| ChatError::Transport(err.to_string()))
            })
            .boxed();
        Self::new(Consumer::new(State::Streaming(body), cancel_token))
    }
}

impl Stream for ChatStream {
    type Item = StreamEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.poll_next_unpin(cx)
    }
}

impl fmt::Debug for ChatStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatStream").finish_non_exhaustive()
    }
}

struct Exchange {
    client: reqwest::Client,
    endpoint: String,
    credential: String,
    request: ChatRequest,
}

enum State {
    Connect(Box<Exchange>),
    Streaming(BodyStream),
    Finished,
}

struct Consumer {
    state: State,
    cancel_token: CancellationToken,
    pending: VecDeque<StreamEvent>,
    accumulated: String,
    decoder: FrameDecoder,
}

impl Consumer {
    fn new(state: State, cancel_token: CancellationToken) -> Self {
        Self {
            state,
            cancel_token,
            pending: VecDeque::new(),
            accumulated: String::new(),
            decoder: FrameDecoder::new(),
        }
    }

    async fn next_event(&mut self) -> Option<StreamEvent> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Some(event);
            }

            match std::mem::replace(&mut self.state, State::Finished) {
                State::Finished => return None,
                State::Connect(exchange) => self.connect(*exchange).await,
                State::Streaming(body) => self.read_body(body).await,
            }
        }
    }

    fn emit_delta(&mut self, text: String) {
        self.accumulated.push_str(&text);
        self.pending.push_back(StreamEvent::Delta(text));
    }

    fn finish(&mut self, event: StreamEvent) {
        self.pending.push_back(event);
        self.state = State::Finished;
    }

    fn fail(&mut self, error: ChatError) {
        self.finish(StreamEvent::Failed(error));
    }

    fn cancel(&mut self) {
        debug!(
            partial_len = self.accumulated.len(),
            "chat stream cancelled"
        );
        let partial = std::mem::take(&mut self.accumulated);
        self.fail(ChatError::Cancelled { partial });
    }

    async fn connect(&mut self, exchange: Exchange) {
        let Exchange {
            client,
            endpoint,
            credential,
            request,
        } = exchange;
        let streaming = request.stream;

        debug!(
            endpoint = %endpoint,
            model = %request.model,
            messages = request.messages.len(),
            streaming,
            "sending chat completion request"
        );

        let send = client
            .post(&endpoint)
            .header(CONTENT_TYPE, "application/json")
            .bearer_auth(&credential)
            .json(&request)
            .send();

        let response = tokio::select! {
            biased;
            _ = self.cancel_token.cancelled() => return self.cancel(),
            result = send => match result {
                Ok(response) => response,
                Err(err) => return self.fail(ChatError::Transport(err.to_string())),
            },
        };

        let status = response.status();
        if status.is_success() && streaming {
            let body = response
                .bytes_stream()
                .map(|chunk| chunk.map_err(|err| ChatError::Transport(err.to_string())))
                .boxed();
            self.state = State::Streaming(body);
            return;
        }

        let body = tokio::select! {
            biased;
            _ = self.cancel_token.cancelled() => return self.cancel(),
            body = response.text() => body,
        };

        let text = match body {
            Ok(text) => text,
            Err(err) => return self.fail(ChatError::Transport(err.to_string())),
        };

        if !status.is_success() {
            debug!(status = status.as_u16(), "chat completion request rejected");
            return self.fail(provider_error(Some(status.as_u16()), &text));
        }
        self.complete_from_body(status.as_u16(), &text)
    }

    fn complete_from_body(&mut self, status: u16, body: &str) {
        let completion = match serde_json::from_str::<ChatCompletion>(body) {
            Ok(completion) => completion,
            Err(err) => {
                debug!(error = %err, "unparseable chat completion body");
                return self.fail(provider_error(Some(status), body));
            }
        };

        let Some(choice) = completion.choices.into_iter().next() else {
            return self.fail(provider_error(Some(status), body));
        };

        if let Some(content) = choice.message.content.filter(|text| !text.is_empty()) {
            self.emit_delta(content);
        }
        self.finish(StreamEvent::Done);
    }

    async fn read_body(&mut self, mut body: BodyStream) {
        let chunk = tokio::select! {
            biased;
            _ = self.cancel_token.cancelled() => return self.cancel(),
            chunk = body.next() => chunk,
        };

        match chunk {
            Some(Ok(bytes)) => {
                self.decoder.extend(&bytes);
                while let Some(line) = self.decoder.next_line() {
                    if self.handle_line(&line) {
                        return;
                    }
                }
                self.state = State::Streaming(body);
            }
            Some(Err(err)) => self.fail(err),
            None => {
                if let Some(rest) = self.decoder.take_remainder() {
                    if self.handle_line(&rest) {
                        return;
                    }
                }
                debug!("chat stream ended without [DONE] sentinel");
                self.finish(StreamEvent::Done);
            }
        }
    }

    /// Apply one line; returns true once the stream has reached its end.
    fn handle_line(&mut self, line: &[u8]) -> bool {
        match decode_line(line) {
            Ok(Frame::Delta(text)) => {
                self.emit_delta(text);
                false
            }
            Ok(Frame::Ignored) => false,
            Ok(Frame::Done) => {
                self.finish(StreamEvent::Done);
                true
            }
            Err(err) => {
                debug!(error = %err, "skipping malformed stream frame");
                false
            }
        }
    }
}

pub(crate) fn extract_error_summary(value: &serde_json::Value) -> Option<String> {
    let summary = value
        .pointer("/error/message")
        .and_then(|v| v.as_str())
        .map(str::to_owned)
        .or_else(|| {
            value
                .get("error")
                .and_then(|v| v.as_str())
                .map(str::to_owned)
        })
        .or_else(|| {
            value
                .get("message")
                .and_then(|v| v.as_str().map(str::to_owned))
        });

    summary
        .map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|text| !text.is_empty())
}

/// Turn a rejected response body into a provider error, preferring the
/// provider's own message over the raw body.
pub fn provider_error(status: Option<u16>, body: &str) -> ChatError {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return ChatError::provider(status, "<empty>");
    }

    let message = serde_json::from_str::<serde_json::Value>(trimmed)
        .ok()
        .and_then(|value| extract_error_summary(&value))
        .unwrap_or_else(|| trimmed.to_string());
    ChatError::provider(status, message)
}
