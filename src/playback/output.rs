//! Audio output seam.
//!
//! The coordinator talks to audio hardware through these traits so tests
//! can substitute fakes. The real implementation drives `rodio` from a
//! dedicated thread: the output stream is not `Send`, so it lives on that
//! thread for the life of the process and sinks are handed back over a
//! channel.

use std::io::Cursor;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

use rodio::{Decoder, OutputStreamBuilder, Sink};

use crate::error::{AppError, AppResult};

/// Handle to one opened audio stream.
pub trait AudioSink: Send + Sync {
    /// Pause playback. Pausing an already-paused or finished sink is a no-op.
    fn pause(&self);

    /// The stream has played to its natural end.
    fn is_finished(&self) -> bool;
}

/// Factory for audio streams; opening a sink starts playback immediately.
pub trait AudioOutput: Send + Sync {
    /// Decode `payload` and start playing it, returning the live handle.
    fn open(&self, payload: Vec<u8>) -> AppResult<Arc<dyn AudioSink>>;
}

enum OutputCmd {
    Open {
        payload: Vec<u8>,
        reply: mpsc::SyncSender<AppResult<Sink>>,
    },
}

/// `rodio`-backed audio output on a dedicated thread.
pub struct RodioOutput {
    tx: mpsc::Sender<OutputCmd>,
}

impl RodioOutput {
    /// Open the default output device and spawn the audio thread.
    pub fn new() -> AppResult<Self> {
        let (tx, rx) = mpsc::channel::<OutputCmd>();
        let (ready_tx, ready_rx) = mpsc::sync_channel::<Result<(), String>>(1);

        thread::Builder::new()
            .name("audio-output".to_string())
            .spawn(move || {
                let mut stream = match OutputStreamBuilder::open_default_stream() {
                    Ok(stream) => stream,
                    Err(error) => {
                        let _ = ready_tx.send(Err(error.to_string()));
                        return;
                    }
                };
                // rodio logs to stderr when the stream drops; noisy here.
                stream.log_on_drop(false);
                let _ = ready_tx.send(Ok(()));

                while let Ok(OutputCmd::Open { payload, reply }) = rx.recv() {
                    let result = Decoder::new(Cursor::new(payload))
                        .map(|source| {
                            let sink = Sink::connect_new(stream.mixer());
                            sink.append(source);
                            sink.play();
                            sink
                        })
                        .map_err(|error| AppError::Audio(error.to_string()));
                    let _ = reply.send(result);
                }
            })?;

        ready_rx
            .recv()
            .map_err(|_| AppError::Audio("audio thread exited during startup".to_string()))?
            .map_err(AppError::Audio)?;

        Ok(Self { tx })
    }
}

impl AudioOutput for RodioOutput {
    fn open(&self, payload: Vec<u8>) -> AppResult<Arc<dyn AudioSink>> {
        let (reply_tx, reply_rx) = mpsc::sync_channel(1);
        self.tx
            .send(OutputCmd::Open {
                payload,
                reply: reply_tx,
            })
            .map_err(|_| AppError::Audio("audio thread terminated".to_string()))?;

        let sink = reply_rx
            .recv()
            .map_err(|_| AppError::Audio("audio thread terminated".to_string()))??;

        Ok(Arc::new(RodioSink { sink }))
    }
}

struct RodioSink {
    sink: Sink,
}

impl AudioSink for RodioSink {
    fn pause(&self) {
        self.sink.pause();
    }

    fn is_finished(&self) -> bool {
        self.sink.empty()
    }
}
