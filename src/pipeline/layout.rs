//! Tolerance-based text layout: positioned glyphs → plain text.
//!
//! pdfium reports every character with its bounding box but says little
//! about which characters form words and lines. This module rebuilds that
//! structure from geometry alone, the same way pdfplumber does:
//!
//! 1. glyphs whose tops lie within `y_tolerance` of each other form a line;
//! 2. lines are emitted top to bottom, glyphs in a line left to right;
//! 3. a space is inserted wherever the horizontal gap between neighbours
//!    exceeds `x_tolerance`.
//!
//! Tight tolerances (1 pt) keep table cells and multi-column text from
//! being glued together, at the cost of occasionally splitting lines whose
//! baseline drifts.

/// A single character and its bounding box in PDF user space
/// (origin bottom-left, y grows upwards).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glyph {
    pub ch: char,
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

/// Merge thresholds, in PDF points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutTolerance {
    pub x: f32,
    pub y: f32,
}

impl Default for LayoutTolerance {
    fn default() -> Self {
        Self { x: 1.0, y: 1.0 }
    }
}

/// Lay out one page's glyphs as text. Returns an empty string when the page
/// has no visible characters.
pub fn layout_page(glyphs: &[Glyph], tolerance: LayoutTolerance) -> String {
    let mut visible: Vec<Glyph> = glyphs
        .iter()
        .copied()
        .filter(|g| !g.ch.is_whitespace() && !g.ch.is_control())
        .collect();
    if visible.is_empty() {
        return String::new();
    }

    // Highest on the page first.
    visible.sort_by(|a, b| b.top.total_cmp(&a.top));

    let mut lines: Vec<Vec<Glyph>> = Vec::new();
    let mut last_top = f32::NAN;
    for glyph in visible {
        if lines.is_empty() || (last_top - glyph.top).abs() > tolerance.y {
            lines.push(Vec::new());
        }
        last_top = glyph.top;
        if let Some(line) = lines.last_mut() {
            line.push(glyph);
        }
    }

    lines
        .into_iter()
        .map(|mut line| {
            line.sort_by(|a, b| a.left.total_cmp(&b.left));
            join_line(&line, tolerance.x)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn join_line(line: &[Glyph], x_tolerance: f32) -> String {
    let mut out = String::with_capacity(line.len() + 8);
    let mut prev_right: Option<f32> = None;
    for glyph in line {
        if let Some(right) = prev_right {
            if glyph.left - right > x_tolerance {
                out.push(' ');
            }
        }
        out.push(glyph.ch);
        prev_right = Some(glyph.right);
    }
    out
}
