//! Frame-by-frame labeling loop.
//!
//! The controller keeps the navigation buffer and the label sequence in lockstep:
//! every labeling step records one label and advances one frame, every successful
//! undo steps back one frame and drops one label. The frame index therefore always
//! equals the number of recorded labels.
//!
//! Display and keyboard are reached through [`FrameDisplay`] and [`KeySource`], so
//! the same loop drives the terminal preview and scripted test fakes.

mod status;

use crate::frames::FrameSource;
use crate::labels::{label_for_key, LabelSequence};
use crate::log_debug;
use crate::navigation::NavigationBuffer;
use anyhow::Result;
use tracing::{debug, info};

pub use status::{describe_key, StatusLine};

pub const QUIT_KEY: u8 = b'q';
pub const UNDO_KEY: u8 = b'b';

/// What a key press asks the session to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Quit,
    Undo,
    Label(char),
}

impl KeyAction {
    pub fn from_code(code: u32) -> Self {
        match (code & 0xFF) as u8 {
            QUIT_KEY => KeyAction::Quit,
            UNDO_KEY => KeyAction::Undo,
            _ => KeyAction::Label(label_for_key(code)),
        }
    }
}

/// Input delivered by a [`KeySource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    /// A key code; only the low byte is significant.
    Code(u32),
    /// The display surface changed size and should be redrawn.
    Resize,
    /// The operator aborted the session (Ctrl+C).
    Interrupt,
}

/// Blocking source of key presses. There is no timeout.
pub trait KeySource {
    fn wait_key(&mut self) -> Result<KeyInput>;
}

/// Sink that previews the current frame together with the status line.
pub trait FrameDisplay<F> {
    fn show(&mut self, frame: &F, status: &StatusLine) -> Result<()>;

    /// Tear down the display surface. Must be safe to call more than once.
    fn close(&mut self) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Running,
    AwaitingKey,
    Stopped,
}

/// Why the session reached [`SessionState::Stopped`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The quit key was pressed.
    Quit,
    /// The video ran out of frames.
    Exhausted,
    /// Aborted by the operator; labels must not be written.
    Interrupted,
}

impl SessionOutcome {
    /// Normal terminations end with the label table on disk.
    pub fn writes_table(self) -> bool {
        !matches!(self, SessionOutcome::Interrupted)
    }
}

pub struct SessionController<S: FrameSource> {
    navigation: NavigationBuffer<S>,
    labels: LabelSequence,
    frame_index: usize,
    state: SessionState,
    outcome: Option<SessionOutcome>,
    last_key: Option<u32>,
}

impl<S: FrameSource> SessionController<S> {
    pub fn new(source: S, buffer_capacity: usize) -> Self {
        Self {
            navigation: NavigationBuffer::new(source, buffer_capacity),
            labels: LabelSequence::new(),
            frame_index: 0,
            state: SessionState::Running,
            outcome: None,
            last_key: None,
        }
    }

    /// Read the first frame. An empty video stops the session right away.
    pub fn start(&mut self) -> Result<SessionState> {
        if self.navigation.current().is_some() || self.state == SessionState::Stopped {
            return Ok(self.state);
        }
        match self.navigation.advance() {
            Ok(Some(_)) => {
                info!(capacity = self.navigation.capacity(), "labeling session started");
            }
            Ok(None) => {
                log_debug("video has no frames");
                self.stop(SessionOutcome::Exhausted);
            }
            Err(err) => {
                self.abort();
                return Err(err);
            }
        }
        Ok(self.state)
    }

    /// Apply one key press to the session.
    pub fn handle_key(&mut self, code: u32) -> Result<SessionState> {
        if self.state == SessionState::Stopped {
            return Ok(self.state);
        }
        self.last_key = Some(code);
        match KeyAction::from_code(code) {
            KeyAction::Quit => self.stop(SessionOutcome::Quit),
            KeyAction::Undo => self.undo(),
            KeyAction::Label(label) => {
                if let Err(err) = self.label_and_advance(label) {
                    self.abort();
                    return Err(err);
                }
            }
        }
        Ok(self.state)
    }

    fn undo(&mut self) {
        if self.navigation.undo().is_none() {
            debug!(frame_index = self.frame_index, "undo ignored: no earlier frame");
            self.state = SessionState::Running;
            return;
        }
        // The window never holds more frames than there are labels.
        assert!(
            self.labels.remove_last(),
            "undo stepped back past the first labeled frame"
        );
        self.frame_index -= 1;
        self.state = SessionState::Running;
        debug!(
            frame_index = self.frame_index,
            labels = self.labels.len(),
            buffered = self.navigation.len(),
            redo = self.navigation.redo_len(),
            "undo"
        );
    }

    fn label_and_advance(&mut self, label: char) -> Result<()> {
        self.labels.record(label);
        self.frame_index += 1;
        let advanced = self.navigation.advance()?;
        debug!(
            frame_index = self.frame_index,
            labels = self.labels.len(),
            buffered = self.navigation.len(),
            redo = self.navigation.redo_len(),
            "label recorded"
        );
        if advanced.is_some() {
            self.state = SessionState::Running;
        } else {
            self.stop(SessionOutcome::Exhausted);
        }
        Ok(())
    }

    /// Stop without writing anything (Ctrl+C).
    pub fn interrupt(&mut self) {
        if self.state != SessionState::Stopped {
            self.stop(SessionOutcome::Interrupted);
        }
    }

    fn stop(&mut self, outcome: SessionOutcome) {
        self.state = SessionState::Stopped;
        self.outcome = Some(outcome);
        self.navigation.release();
        info!(
            ?outcome,
            frame_index = self.frame_index,
            labels = self.labels.len(),
            "labeling session stopped"
        );
        log_debug(&format!(
            "session stopped ({outcome:?}) at frame {} with {} labels",
            self.frame_index,
            self.labels.len()
        ));
    }

    fn abort(&mut self) {
        self.state = SessionState::Stopped;
        self.navigation.release();
    }

    /// Drive the interactive loop until the session stops.
    ///
    /// The frame source is released and the display closed on every exit path,
    /// including errors from the display or the key source.
    pub fn run<K, D>(&mut self, keys: &mut K, display: &mut D) -> Result<SessionOutcome>
    where
        K: KeySource,
        D: FrameDisplay<S::Frame>,
    {
        let result = self.drive(keys, display);
        if result.is_err() {
            self.abort();
        }
        self.navigation.release();
        display.close();
        result
    }

    fn drive<K, D>(&mut self, keys: &mut K, display: &mut D) -> Result<SessionOutcome>
    where
        K: KeySource,
        D: FrameDisplay<S::Frame>,
    {
        self.start()?;
        while self.state != SessionState::Stopped {
            if let Some(frame) = self.navigation.current() {
                display.show(frame, &self.status_line())?;
            }
            self.state = SessionState::AwaitingKey;
            match keys.wait_key()? {
                KeyInput::Code(code) => {
                    self.handle_key(code)?;
                }
                KeyInput::Resize => self.state = SessionState::Running,
                KeyInput::Interrupt => self.interrupt(),
            }
        }
        Ok(self.outcome.unwrap_or(SessionOutcome::Exhausted))
    }

    /// Consume the session and hand back the finished labels.
    pub fn finish(mut self) -> LabelSequence {
        self.navigation.release();
        self.labels
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn outcome(&self) -> Option<SessionOutcome> {
        self.outcome
    }

    pub fn frame_index(&self) -> usize {
        self.frame_index
    }

    pub fn labels(&self) -> &LabelSequence {
        &self.labels
    }

    pub fn current_frame(&self) -> Option<&S::Frame> {
        self.navigation.current()
    }

    pub fn navigation(&self) -> &NavigationBuffer<S> {
        &self.navigation
    }

    pub fn status_line(&self) -> StatusLine {
        StatusLine {
            last_key: self.last_key,
            frame_index: self.frame_index,
            labels: self.labels.len(),
        }
    }
}
