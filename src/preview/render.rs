//! Frame to terminal-cell conversion.
//!
//! Each cell shows two vertically stacked pixels: the upper half block `▀` takes
//! the top pixel as foreground and the bottom pixel as background. Terminal cells
//! are roughly twice as tall as wide, so this keeps pixels close to square.

use crate::frames::VideoFrame;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

const HALF_BLOCK: &str = "▀";

/// Size of the preview in terminal cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellSize {
    pub cols: u16,
    pub rows: u16,
}

/// Largest cell area that shows the whole frame with its aspect ratio intact.
pub fn fit_frame(width: u32, height: u32, max_cols: u16, max_rows: u16) -> Option<CellSize> {
    if width == 0 || height == 0 || max_cols == 0 || max_rows == 0 {
        return None;
    }
    let (width, height) = (u64::from(width), u64::from(height));
    let max_cols = u64::from(max_cols);
    let max_pixel_rows = u64::from(max_rows) * 2;
    // Compare max_cols / width against max_pixel_rows / height without dividing.
    let (cols, pixel_rows) = if max_cols * height <= max_pixel_rows * width {
        (max_cols, height * max_cols / width)
    } else {
        (width * max_pixel_rows / height, max_pixel_rows)
    };
    Some(CellSize {
        cols: cols.clamp(1, max_cols) as u16,
        rows: pixel_rows.div_ceil(2).clamp(1, u64::from(max_rows)) as u16,
    })
}

fn sample(frame: &VideoFrame, x: u32, y: u32) -> Color {
    let [r, g, b] = frame.pixel(x, y).unwrap_or([0, 0, 0]);
    Color::Rgb(r, g, b)
}

/// Nearest-neighbour downsample of `frame` into `size` cells.
pub fn frame_lines(frame: &VideoFrame, size: CellSize) -> Vec<Line<'static>> {
    let width = u64::from(frame.width());
    let height = u64::from(frame.height());
    let cols = u64::from(size.cols);
    let pixel_rows = u64::from(size.rows) * 2;
    if width == 0 || height == 0 || cols == 0 || pixel_rows == 0 {
        return Vec::new();
    }

    (0..u64::from(size.rows))
        .map(|row| {
            let top_y = (row * 2 * height / pixel_rows) as u32;
            let bottom_y = ((row * 2 + 1) * height / pixel_rows) as u32;
            let spans: Vec<Span<'static>> = (0..cols)
                .map(|col| {
                    let x = (col * width / cols) as u32;
                    let style = Style::default()
                        .fg(sample(frame, x, top_y))
                        .bg(sample(frame, x, bottom_y));
                    Span::styled(HALF_BLOCK, style)
                })
                .collect();
            Line::from(spans)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker(width: u32, height: u32) -> VideoFrame {
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                let value = if (x + y) % 2 == 0 { 255 } else { 0 };
                pixels.extend_from_slice(&[value, value, value]);
            }
        }
        VideoFrame::new(0, width, height, pixels)
    }

    #[test]
    fn fit_is_limited_by_width_for_wide_frames() {
        let size = fit_frame(1920, 1080, 80, 40).unwrap();
        assert_eq!(size.cols, 80);
        // 1080 * (80 / 1920) = 45 pixel rows -> 23 cell rows.
        assert_eq!(size.rows, 23);
    }

    #[test]
    fn fit_is_limited_by_height_for_tall_frames() {
        let size = fit_frame(100, 400, 80, 20).unwrap();
        assert_eq!(size.rows, 20);
        assert_eq!(size.cols, 10);
    }

    #[test]
    fn fit_never_exceeds_available_area() {
        for (w, h) in [(1, 1), (3, 1000), (1000, 3), (640, 480)] {
            let size = fit_frame(w, h, 17, 9).unwrap();
            assert!(size.cols >= 1 && size.cols <= 17, "{w}x{h}");
            assert!(size.rows >= 1 && size.rows <= 9, "{w}x{h}");
        }
    }

    #[test]
    fn fit_rejects_empty_areas() {
        assert!(fit_frame(0, 10, 80, 24).is_none());
        assert!(fit_frame(10, 10, 0, 24).is_none());
        assert!(fit_frame(10, 10, 80, 0).is_none());
    }

    #[test]
    fn lines_pair_top_and_bottom_pixels() {
        let frame = checker(2, 2);
        let lines = frame_lines(&frame, CellSize { cols: 2, rows: 1 });
        assert_eq!(lines.len(), 1);
        let spans = &lines[0].spans;
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].content, HALF_BLOCK);
        assert_eq!(spans[0].style.fg, Some(Color::Rgb(255, 255, 255)));
        assert_eq!(spans[0].style.bg, Some(Color::Rgb(0, 0, 0)));
        assert_eq!(spans[1].style.fg, Some(Color::Rgb(0, 0, 0)));
        assert_eq!(spans[1].style.bg, Some(Color::Rgb(255, 255, 255)));
    }

    #[test]
    fn lines_match_requested_size_when_downscaling() {
        let frame = checker(64, 48);
        let lines = frame_lines(&frame, CellSize { cols: 16, rows: 6 });
        assert_eq!(lines.len(), 6);
        assert!(lines.iter().all(|line| line.spans.len() == 16));
    }
}
