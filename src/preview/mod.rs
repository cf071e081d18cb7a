//! Terminal preview of the frame being labeled.

mod render;
mod screen;
mod terminal;

pub use render::{fit_frame, frame_lines, CellSize};
pub use terminal::TerminalPreview;
