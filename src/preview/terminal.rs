use super::render::{fit_frame, frame_lines};
use super::screen::PreviewScreen;
use crate::frames::VideoFrame;
use crate::log_debug;
use crate::session::{FrameDisplay, StatusLine};
use anyhow::{anyhow, Context, Result};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    widgets::Paragraph,
    Frame, Terminal,
};
use std::io::{self, Stdout};

/// Full-screen frame preview with a one-line status bar at the bottom.
pub struct TerminalPreview {
    screen: PreviewScreen,
    terminal: Option<Terminal<CrosstermBackend<Stdout>>>,
}

impl TerminalPreview {
    /// Switch the terminal to raw mode on the alternate screen.
    pub fn open() -> Result<Self> {
        let mut stdout = io::stdout();
        let screen = PreviewScreen::engage(&mut stdout)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))
            .context("failed to initialise the terminal backend")?;
        log_debug("terminal preview opened");
        Ok(Self {
            screen,
            terminal: Some(terminal),
        })
    }
}

/// Centre a `cols` x `rows` box inside `area`.
fn centered(area: Rect, cols: u16, rows: u16) -> Rect {
    let cols = cols.min(area.width);
    let rows = rows.min(area.height);
    Rect {
        x: area.x + (area.width - cols) / 2,
        y: area.y + (area.height - rows) / 2,
        width: cols,
        height: rows,
    }
}

fn draw(frame: &mut Frame, video_frame: &VideoFrame, status: &StatusLine) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(frame.size());
    let image_area = chunks[0];

    if let Some(size) = fit_frame(
        video_frame.width(),
        video_frame.height(),
        image_area.width,
        image_area.height,
    ) {
        let target = centered(image_area, size.cols, size.rows);
        frame.render_widget(Paragraph::new(frame_lines(video_frame, size)), target);
    }

    let status_bar = Paragraph::new(status.to_string())
        .style(Style::default().add_modifier(Modifier::REVERSED));
    frame.render_widget(status_bar, chunks[1]);
}

impl FrameDisplay<VideoFrame> for TerminalPreview {
    fn show(&mut self, video_frame: &VideoFrame, status: &StatusLine) -> Result<()> {
        let terminal = self
            .terminal
            .as_mut()
            .ok_or_else(|| anyhow!("terminal preview already closed"))?;
        terminal
            .draw(|frame| draw(frame, video_frame, status))
            .context("failed to draw frame preview")?;
        Ok(())
    }

    fn close(&mut self) {
        if self.terminal.take().is_some() {
            self.screen.leave();
            log_debug("terminal preview closed");
        }
    }
}

impl Drop for TerminalPreview {
    fn drop(&mut self) {
        self.close();
    }
}
