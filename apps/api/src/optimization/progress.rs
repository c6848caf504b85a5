//! Progress stream: newline-delimited JSON frames written as stages finish.
//!
//! Each frame is written and flushed on its own. Exactly one terminal frame
//! (`complete` or `error`) is written, after which the sink is closed; the
//! terminal methods consume the emitter so a second one cannot be sent.
//!
//! A consumer that disconnects only stops receiving frames. Stage calls already
//! in flight run to completion.

use std::convert::Infallible;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, warn};

use crate::optimization::stages::Stage;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ProgressFrame {
    Started,
    Progress {
        step: Stage,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        data: Option<Value>,
    },
    Complete {
        data: Value,
    },
    Error {
        error: String,
    },
}

impl ProgressFrame {
    #[cfg(test)]
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProgressFrame::Complete { .. } | ProgressFrame::Error { .. })
    }
}

#[derive(Debug, Error)]
#[error("progress consumer disconnected")]
pub struct SinkClosed;

/// Streaming transport: write-and-flush one line, then close.
#[async_trait]
pub trait ProgressSink: Send {
    async fn write_line(&mut self, line: Bytes) -> Result<(), SinkClosed>;
    fn close(&mut self);
}

/// Feeds frames into a bounded channel whose receiving half becomes the HTTP body.
pub struct ChannelSink {
    tx: Option<mpsc::Sender<Result<Bytes, Infallible>>>,
}

impl ChannelSink {
    pub fn pair(buffer: usize) -> (Self, ReceiverStream<Result<Bytes, Infallible>>) {
        let (tx, rx) = mpsc::channel(buffer);
        (Self { tx: Some(tx) }, ReceiverStream::new(rx))
    }
}

#[async_trait]
impl ProgressSink for ChannelSink {
    async fn write_line(&mut self, line: Bytes) -> Result<(), SinkClosed> {
        match &self.tx {
            Some(tx) => tx.send(Ok(line)).await.map_err(|_| SinkClosed),
            None => Err(SinkClosed),
        }
    }

    fn close(&mut self) {
        // Dropping the sender ends the receiver stream.
        self.tx.take();
    }
}

pub struct ProgressEmitter<S: ProgressSink> {
    sink: S,
    connected: bool,
}

impl<S: ProgressSink> ProgressEmitter<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            connected: true,
        }
    }

    pub async fn started(&mut self) {
        self.emit(&ProgressFrame::Started).await;
    }

    pub async fn progress(&mut self, step: Stage, data: Option<Value>) {
        self.emit(&ProgressFrame::Progress { step, data }).await;
    }

    pub async fn complete(mut self, data: Value) {
        self.emit(&ProgressFrame::Complete { data }).await;
        self.sink.close();
    }

    pub async fn fail(mut self, error: String) {
        self.emit(&ProgressFrame::Error { error }).await;
        self.sink.close();
    }

    async fn emit(&mut self, frame: &ProgressFrame) {
        if !self.connected {
            return;
        }

        let mut line = match serde_json::to_vec(frame) {
            Ok(line) => line,
            Err(e) => {
                warn!("Failed to serialize progress frame: {e}");
                return;
            }
        };
        line.push(b'\n');

        if self.sink.write_line(Bytes::from(line)).await.is_err() {
            debug!("Progress consumer went away; remaining frames are dropped");
            self.connected = false;
        }
    }
}

#[cfg(test)]
pub mod test_support {
    use std::sync::{Arc, Mutex};

    use super::*;

    /// Records every line written so tests can inspect the stream afterwards.
    #[derive(Clone, Default)]
    pub struct MemorySink {
        lines: Arc<Mutex<Vec<String>>>,
        closed: Arc<Mutex<bool>>,
    }

    impl MemorySink {
        pub fn frames(&self) -> Vec<ProgressFrame> {
            self.lines
                .lock()
                .unwrap()
                .iter()
                .map(|l| serde_json::from_str(l.trim_end()).unwrap())
                .collect()
        }

        pub fn raw_lines(&self) -> Vec<String> {
            self.lines.lock().unwrap().clone()
        }

        pub fn is_closed(&self) -> bool {
            *self.closed.lock().unwrap()
        }
    }

    #[async_trait]
    impl ProgressSink for MemorySink {
        async fn write_line(&mut self, line: Bytes) -> Result<(), SinkClosed> {
            if self.is_closed() {
                return Err(SinkClosed);
            }
            self.lines
                .lock()
                .unwrap()
                .push(String::from_utf8_lossy(&line).into_owned());
            Ok(())
        }

        fn close(&mut self) {
            *self.closed.lock().unwrap() = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::MemorySink;
    use super::*;
    use serde_json::json;
    use tokio_stream::StreamExt;

    #[test]
    fn test_frame_shapes() {
        let started = serde_json::to_value(ProgressFrame::Started).unwrap();
        assert_eq!(started, json!({"status": "started"}));

        let progress = serde_json::to_value(ProgressFrame::Progress {
            step: Stage::ParsingResume,
            data: None,
        })
        .unwrap();
        assert_eq!(progress, json!({"status": "progress", "step": "parsing_resume"}));

        let error = serde_json::to_value(ProgressFrame::Error {
            error: "boom".into(),
        })
        .unwrap();
        assert_eq!(error, json!({"status": "error", "error": "boom"}));
    }

    #[tokio::test]
    async fn test_each_frame_is_one_newline_terminated_line() {
        let sink = MemorySink::default();
        let mut emitter = ProgressEmitter::new(sink.clone());
        emitter.started().await;
        emitter
            .progress(Stage::MappingKeywords, Some(json!({"assignedBullets": 2})))
            .await;
        emitter.complete(json!({"runId": "abc"})).await;

        let lines = sink.raw_lines();
        assert_eq!(lines.len(), 3);
        assert!(lines.iter().all(|l| l.ends_with('\n') && l.matches('\n').count() == 1));
        assert!(sink.is_closed());
        assert!(sink.frames().last().unwrap().is_terminal());
    }

    #[tokio::test]
    async fn test_channel_sink_streams_frames_then_ends() {
        let (sink, mut stream) = ChannelSink::pair(8);
        let mut emitter = ProgressEmitter::new(sink);
        emitter.started().await;
        emitter.fail("extracting_jd_info failed".into()).await;

        let mut lines = Vec::new();
        while let Some(Ok(chunk)) = stream.next().await {
            lines.push(String::from_utf8(chunk.to_vec()).unwrap());
        }
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("\"status\":\"error\""));
    }

    #[tokio::test]
    async fn test_disconnected_consumer_does_not_panic() {
        let (sink, stream) = ChannelSink::pair(1);
        drop(stream);
        let mut emitter = ProgressEmitter::new(sink);
        emitter.started().await;
        emitter.progress(Stage::ParsingResume, None).await;
        emitter.complete(json!({})).await;
    }
}
