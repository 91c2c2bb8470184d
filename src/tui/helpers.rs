// Layout and formatting helpers
use crate::swipe::{CardTransform, CELL_HEIGHT_PX, CELL_WIDTH_PX};
use chrono::{DateTime, Local, Utc};
use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Where a transformed card lands, clipped to `area`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardPlacement {
    /// Visible part of the card
    pub visible: Rect,
    /// Columns cut off at the left edge
    pub hidden_cols: u16,
    /// Rows cut off at the top edge
    pub hidden_rows: u16,
}

/// Positions a card resting at `rest` after applying `transform`.
///
/// Offsets are converted from pixels to cells and the scale shrinks the
/// card around its center. Returns `None` once the card is fully outside
/// `area`.
pub fn place_card(rest: Rect, area: Rect, transform: &CardTransform) -> Option<CardPlacement> {
    let scale = transform.scale.max(0.0);
    let width = (rest.width as f32 * scale).round() as i32;
    let height = (rest.height as f32 * scale).round() as i32;
    if width <= 0 || height <= 0 {
        return None;
    }

    let dx = (transform.x / CELL_WIDTH_PX).round() as i32;
    let dy = (transform.y / CELL_HEIGHT_PX).round() as i32;
    let left = rest.x as i32 + (rest.width as i32 - width) / 2 + dx;
    let top = rest.y as i32 + (rest.height as i32 - height) / 2 + dy;

    let clip_left = left.max(area.x as i32);
    let clip_top = top.max(area.y as i32);
    let clip_right = (left + width).min(area.right() as i32);
    let clip_bottom = (top + height).min(area.bottom() as i32);
    if clip_right <= clip_left || clip_bottom <= clip_top {
        return None;
    }

    Some(CardPlacement {
        visible: Rect::new(
            clip_left as u16,
            clip_top as u16,
            (clip_right - clip_left) as u16,
            (clip_bottom - clip_top) as u16,
        ),
        hidden_cols: (clip_left - left) as u16,
        hidden_rows: (clip_top - top) as u16,
    })
}

/// Helper to create a centered rect
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Bottom sheet covering `percent_y` of `r`
pub fn bottom_rect(percent_y: u16, r: Rect) -> Rect {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(100 - percent_y),
            Constraint::Percentage(percent_y),
        ])
        .split(r)[1]
}

/// "Photo i/n" with `i` clamped to `n`
pub fn progress_label(cursor: usize, total: usize) -> String {
    format!("Photo {}/{}", (cursor + 1).min(total), total)
}

/// Fraction of photos reviewed
pub fn calculate_progress(cursor: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        (cursor.min(total)) as f64 / total as f64
    }
}

pub fn format_timestamp(time: &DateTime<Utc>) -> String {
    time.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

pub fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        format!("{} {}", count, word)
    } else {
        format!("{} {}s", count, word)
    }
}
