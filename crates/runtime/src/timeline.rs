//! Frame-driven playback.
//!
//! A [`Timeline`] does not schedule itself. The host calls
//! [`tick`](Timeline::tick) once per frame, usually through
//! [`BattleSession::frame`](crate::BattleSession::frame), and whoever started
//! playback awaits the [`TimelinePlayback`] future.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;
use tracing::trace;

use crate::api::{Result, RuntimeError};

type StepFn = Box<dyn FnMut(u32) + Send>;

/// A fixed number of frames with a per-frame step callback, followed by
/// `padding` idle frames.
pub struct Timeline {
    frames: u32,
    padding: u32,
    current: u32,
    playing: bool,
    step: StepFn,
    completion: Option<oneshot::Sender<Result<()>>>,
}

impl Timeline {
    pub fn new(frames: u32, step: impl FnMut(u32) + Send + 'static, padding: u32) -> Self {
        Self {
            frames,
            padding,
            current: 0,
            playing: false,
            step: Box::new(step),
            completion: None,
        }
    }

    pub fn frames(&self) -> u32 {
        self.frames
    }

    pub fn current_frame(&self) -> u32 {
        self.current
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Starts (or restarts) from frame zero.
    ///
    /// The returned future resolves after `frames + padding + 1` ticks. A
    /// playback that was still pending is rejected.
    pub fn play(&mut self) -> TimelinePlayback {
        let (tx, rx) = oneshot::channel();
        if let Some(previous) = self.completion.replace(tx) {
            let _ = previous.send(Err(RuntimeError::TimelineAborted));
        }
        self.current = 0;
        self.playing = true;
        TimelinePlayback { rx }
    }

    /// Advances one frame. Does nothing unless playing.
    pub fn tick(&mut self) {
        if !self.playing {
            return;
        }
        if self.current < self.frames {
            (self.step)(self.current);
        }
        self.current += 1;
        if self.current > self.frames + self.padding {
            trace!(target: "battle::timeline", frames = self.frames, "Timeline finished");
            self.stop(false);
        }
    }

    /// Stops playback. The pending future resolves, or is rejected with
    /// [`RuntimeError::TimelineAborted`] when `reject` is set.
    pub fn stop(&mut self, reject: bool) {
        self.playing = false;
        if let Some(tx) = self.completion.take() {
            let outcome = if reject {
                Err(RuntimeError::TimelineAborted)
            } else {
                Ok(())
            };
            let _ = tx.send(outcome);
        }
    }
}

impl fmt::Debug for Timeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timeline")
            .field("frames", &self.frames)
            .field("padding", &self.padding)
            .field("current", &self.current)
            .field("playing", &self.playing)
            .finish_non_exhaustive()
    }
}

/// Completion of one [`Timeline::play`] call.
///
/// Dropping the timeline while playing rejects the future.
#[must_use = "playback does nothing unless awaited"]
pub struct TimelinePlayback {
    rx: oneshot::Receiver<Result<()>>,
}

impl Future for TimelinePlayback {
    type Output = Result<()>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|received| received.unwrap_or_else(|_| Err(RuntimeError::TimelineAborted)))
    }
}
