// src/display/mod.rs
//! Display surfaces the core pushes values into

pub mod terminal;

use crate::error::Result;
use crossterm::style::Color;

/// Styling hints a task may attach to a write.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Style {
    pub fg: Option<Color>,
    pub bg: Option<Color>,
}

impl Style {
    pub fn fg(color: Color) -> Self {
        Self {
            fg: Some(color),
            bg: None,
        }
    }

    pub fn fg_bg(fg: Color, bg: Color) -> Self {
        Self {
            fg: Some(fg),
            bg: Some(bg),
        }
    }
}

/// A stateful display region owned by exactly one task.
///
/// Implemented by the terminal layer for real rendering and by test doubles
/// in the core's tests. The surface is persistent, so writers that replace
/// their content wholesale call [`DisplaySink::reset`] first.
pub trait DisplaySink: Send {
    /// Clear whatever the sink currently shows.
    fn reset(&mut self);

    /// Render new content, one display line per `\n`-separated segment.
    fn write(&mut self, content: &str, style: Style) -> Result<()>;
}
