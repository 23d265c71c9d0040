// SPDX-License-Identifier: GPL-3.0-only

//! Terminal preview surface
//!
//! Presents composited canvases in the terminal using Unicode half-block
//! characters for improved vertical resolution. One text cell covers a
//! 1x2 pixel column pair; the bottom row is reserved for a status line.

use std::io::{self, Stdout, stdout};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU16, Ordering};

use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal, backend::CrosstermBackend, buffer::Buffer, layout::Rect, style::Color,
    widgets::Widget,
};

use crate::compose::{Canvas, Rgba};
use crate::frame::Size;
use crate::surface::{PresentError, Surface};

pub struct TerminalSurface {
    terminal: Mutex<Terminal<CrosstermBackend<Stdout>>>,
    // Cell geometry from the most recent draw; size() must not lock the
    // terminal because the render worker may be mid-present
    cols: AtomicU16,
    rows: AtomicU16,
    status: Mutex<String>,
    recorded: Mutex<Option<Canvas>>,
}

impl TerminalSurface {
    /// Switch the terminal to raw mode on the alternate screen
    ///
    /// The terminal is restored when the surface is dropped.
    pub fn new() -> io::Result<Self> {
        enable_raw_mode()?;
        let mut out = stdout();
        execute!(out, EnterAlternateScreen)?;
        let terminal = Terminal::new(CrosstermBackend::new(out))?;
        let (cols, rows) = crossterm::terminal::size()?;

        Ok(Self {
            terminal: Mutex::new(terminal),
            cols: AtomicU16::new(cols),
            rows: AtomicU16::new(rows),
            status: Mutex::new(String::new()),
            recorded: Mutex::new(None),
        })
    }

    /// Replace the status line shown under the preview
    pub fn set_status(&self, message: impl Into<String>) {
        *self.status.lock().unwrap_or_else(|e| e.into_inner()) = message.into();
    }

    /// Copy of the most recently presented canvas
    pub fn last_frame(&self) -> Option<Canvas> {
        self.recorded
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl Surface for TerminalSurface {
    fn size(&self) -> Size {
        let cols = u32::from(self.cols.load(Ordering::Relaxed)).max(1);
        let rows = u32::from(self.rows.load(Ordering::Relaxed));
        // One row for the status line, two pixels per remaining cell
        Size::new(cols, rows.saturating_sub(1).max(1) * 2)
    }

    fn present(&self, canvas: &Canvas) -> Result<(), PresentError> {
        let status = self
            .status
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        let mut terminal = self.terminal.lock().unwrap_or_else(|e| e.into_inner());

        terminal
            .draw(|f| {
                let area = f.area();
                self.cols.store(area.width, Ordering::Relaxed);
                self.rows.store(area.height, Ordering::Relaxed);

                let canvas_area = Rect {
                    x: area.x,
                    y: area.y,
                    width: area.width,
                    height: area.height.saturating_sub(1),
                };
                f.render_widget(CanvasWidget { canvas }, canvas_area);

                let status_area = Rect {
                    x: area.x,
                    y: area.y + area.height.saturating_sub(1),
                    width: area.width,
                    height: 1,
                };
                f.render_widget(StatusBar { message: &status }, status_area);
            })
            .map_err(|e| PresentError::Draw(e.to_string()))?;

        let mut slot = self.recorded.lock().unwrap_or_else(|e| e.into_inner());
        match slot.as_mut() {
            Some(kept) => kept.clone_from(canvas),
            None => *slot = Some(canvas.clone()),
        }

        Ok(())
    }
}

impl Drop for TerminalSurface {
    fn drop(&mut self) {
        let terminal = self.terminal.get_mut().unwrap_or_else(|e| e.into_inner());
        let _ = disable_raw_mode();
        let _ = execute!(terminal.backend_mut(), LeaveAlternateScreen);
        let _ = terminal.show_cursor();
    }
}

/// Widget that renders a composited canvas with half-block characters
struct CanvasWidget<'a> {
    canvas: &'a Canvas,
}

impl Widget for CanvasWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let size = self.canvas.size();
        let cell_cols = u32::from(area.width).min(size.width);
        let cell_rows = u32::from(area.height).min(size.height.div_ceil(2));

        // Each cell shows two vertically stacked pixels:
        // upper half (▀) from fg, lower half from bg
        for ty in 0..cell_rows {
            for tx in 0..cell_cols {
                let top = self.canvas.pixel(tx, ty * 2);
                let bottom = self.canvas.pixel(tx, ty * 2 + 1);
                let Some(cell) = buf.cell_mut((area.x + tx as u16, area.y + ty as u16)) else {
                    continue;
                };
                cell.set_char('▀');
                cell.set_fg(cell_color(top));
                cell.set_bg(cell_color(bottom));
            }
        }
    }
}

fn cell_color(pixel: Rgba) -> Color {
    Color::Rgb(pixel.r, pixel.g, pixel.b)
}

/// Status bar widget
struct StatusBar<'a> {
    message: &'a str,
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for x in area.x..area.x + area.width {
            if let Some(cell) = buf.cell_mut((x, area.y)) {
                cell.set_char(' ');
                cell.set_bg(Color::DarkGray);
            }
        }

        let text: String = self.message.chars().take(area.width as usize).collect();
        buf.set_string(
            area.x,
            area.y,
            text,
            ratatui::style::Style::default()
                .fg(Color::White)
                .bg(Color::DarkGray),
        );
    }
}
