// TUI module for rendering the terminal interface
pub mod colors;
pub mod helpers;
pub mod input;

// Re-exports
pub use colors::*;
pub use helpers::{calculate_progress, centered_rect, place_card, progress_label};
pub use input::{handle_confirm_input, handle_key_event, KeyAction};

use crate::app::{App, ViewState};
use crate::async_preview::PreviewState;
use crate::domain::{CollectionStatus, PhotoAsset};
use crate::preview::{caption, format_duration, PreviewContent};
use crate::swipe::{keep_overlay, yeet_overlay, Overlay, SwipeConfig};
use helpers::{bottom_rect, format_timestamp, plural};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

/// Renders the current screen and any overlays
pub fn render(frame: &mut Frame, app: &mut App) {
    match app.view() {
        ViewState::Permission => render_permission_screen(frame),
        ViewState::Staged | ViewState::ConfirmDelete => render_staged_screen(frame, app),
        ViewState::Help if app.help_return() == ViewState::Staged => {
            render_staged_screen(frame, app)
        }
        _ => render_review_screen(frame, app),
    }

    match app.view() {
        ViewState::Welcome => render_welcome_overlay(frame),
        ViewState::Help => render_help_overlay(frame),
        ViewState::Details => {
            if let Some(asset) = app.collection().current() {
                render_details_sheet(frame, asset);
            }
        }
        ViewState::ConfirmDelete => render_confirm_delete_overlay(frame, app.pending_delete_count()),
        ViewState::Alert => {
            if let Some(message) = app.alert() {
                render_alert_overlay(frame, message);
            }
        }
        ViewState::Permission | ViewState::Review | ViewState::Staged => {}
    }

    let loading = app.collection().loading().status();
    if loading.visible {
        render_loading_overlay(frame, &loading.message);
    }
}

/// Renders the swipe screen: header, card and footer
pub fn render_review_screen(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Header with progress
            Constraint::Min(0),    // Card
            Constraint::Length(3), // Footer
        ])
        .split(frame.area());

    render_header(frame, chunks[0], app);

    match app.collection().status() {
        CollectionStatus::Loading => {
            let block = Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(BORDER_COLOR));
            frame.render_widget(block, chunks[1]);
        }
        CollectionStatus::Empty => frame.render_widget(render_no_photos_widget(), chunks[1]),
        CollectionStatus::Exhausted => frame.render_widget(render_all_done_widget(app), chunks[1]),
        CollectionStatus::Reviewing => render_card(frame, chunks[1], app),
    }

    render_footer(frame, chunks[2], app);
}

fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(2)])
        .split(area);

    let collection = app.collection();
    let total = collection.visible().len();
    let staged = collection.staged().len();

    let title_text = if collection.has_loaded() {
        format!(" {} ", progress_label(collection.cursor(), total))
    } else {
        " Photoyeet ".to_string()
    };

    let info = match collection.current() {
        Some(asset) => vec![
            Span::styled(
                asset.filename.clone(),
                Style::default()
                    .fg(TEXT_PRIMARY)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(
                format!("(Yeeted: {})", staged),
                Style::default().fg(ACCENT_PRIMARY),
            ),
        ],
        None => vec![Span::styled(
            format!("Yeeted: {}", staged),
            Style::default().fg(ACCENT_PRIMARY),
        )],
    };

    let header = Paragraph::new(vec![
        Line::from(Span::styled(
            title_text,
            Style::default()
                .fg(ACCENT_HIGHLIGHT)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(info),
    ])
    .block(
        Block::default()
            .borders(Borders::TOP | Borders::LEFT | Borders::RIGHT)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(BORDER_COLOR)),
    );
    frame.render_widget(header, chunks[0]);

    let progress = calculate_progress(collection.cursor(), total);
    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::BOTTOM | Borders::LEFT | Borders::RIGHT)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(BORDER_COLOR)),
        )
        .gauge_style(Style::default().fg(ACCENT_SECONDARY).bg(BG_DARK))
        .ratio(progress)
        .label(format!("{}%", (progress * 100.0) as u16));
    frame.render_widget(gauge, chunks[1]);
}

fn preview_lines(state: &PreviewState) -> Vec<Line<'static>> {
    match state {
        PreviewState::Loading => vec![
            Line::from(""),
            Line::from(Span::styled(
                "  Loading preview...",
                Style::default()
                    .fg(TEXT_SECONDARY)
                    .add_modifier(Modifier::ITALIC),
            )),
        ],
        PreviewState::Ready(PreviewContent::Styled(lines)) => lines.clone(),
        PreviewState::Ready(PreviewContent::Text(lines)) => {
            lines.iter().map(|l| Line::from(format!("  {}", l))).collect()
        }
        PreviewState::Error(e) => vec![
            Line::from(""),
            Line::from(Span::styled(
                "  [!] Error generating preview",
                Style::default()
                    .fg(ACCENT_PRIMARY)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(format!("  {}", e)),
        ],
    }
}

fn overlay_label(text: &str, overlay: &Overlay, color: Color) -> Span<'static> {
    let mut style = Style::default()
        .fg(blend(BG_DARK, color, overlay.opacity))
        .add_modifier(Modifier::BOLD);
    if overlay.opacity >= 1.0 {
        style = style.add_modifier(Modifier::REVERSED);
    }
    // Labels grow by one cell of padding as they scale up
    if overlay.scale >= 0.9 {
        Span::styled(format!(" {} ", text), style)
    } else {
        Span::styled(text.to_string(), style)
    }
}

/// Renders the current photo as a swipe card with KEEP/YEET overlays
fn render_card(frame: &mut Frame, area: Rect, app: &mut App) {
    let Some(asset) = app.collection().current().cloned() else {
        return;
    };
    let upcoming = app.collection().upcoming().cloned();
    let transform = app.card().transform();
    let config: SwipeConfig = *app.card().config();

    // Previews are sized for the card at rest so animation frames hit the cache
    let rest = area;
    let cols = rest.width.saturating_sub(2);
    let rows = rest.height.saturating_sub(2);
    let lines = preview_lines(app.previews_mut().request(&asset, cols, rows));
    if let Some(next) = upcoming.as_ref() {
        app.previews_mut().loader().prefetch(next, cols, rows);
    }

    let Some(placement) = place_card(rest, area, &transform) else {
        return;
    };

    let keep = keep_overlay(transform.x, &config);
    let yeet = yeet_overlay(transform.x, &config);
    let border = if keep.is_visible() {
        blend(BORDER_COLOR, ACCENT_SECONDARY, keep.opacity)
    } else if yeet.is_visible() {
        blend(BORDER_COLOR, ACCENT_PRIMARY, yeet.opacity)
    } else {
        BORDER_COLOR
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border))
        .title(format!(" {} ", asset.filename));
    let inner = block.inner(placement.visible);

    frame.render_widget(Clear, placement.visible);
    frame.render_widget(block, placement.visible);
    frame.render_widget(
        Paragraph::new(lines)
            .style(Style::default().fg(TEXT_PRIMARY))
            .scroll((placement.hidden_rows, placement.hidden_cols)),
        inner,
    );

    if inner.height == 0 || inner.width < 6 {
        return;
    }
    let label_row = Rect::new(inner.x, inner.y, inner.width, 1);
    if keep.is_visible() {
        frame.render_widget(
            Paragraph::new(Line::from(overlay_label("KEEP", &keep, ACCENT_SECONDARY))),
            label_row,
        );
    }
    if yeet.is_visible() {
        frame.render_widget(
            Paragraph::new(Line::from(overlay_label("YEET", &yeet, ACCENT_PRIMARY)))
                .alignment(Alignment::Right),
            label_row,
        );
    }
}

/// Creates the empty state widget for a library without photos
fn render_no_photos_widget() -> Paragraph<'static> {
    let lines = vec![
        Line::from(""),
        Line::from(""),
        Line::from(Span::styled(
            "No photos found",
            Style::default()
                .fg(ACCENT_HIGHLIGHT)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Your library has no photos left to review.",
            Style::default().fg(TEXT_SECONDARY),
        )),
    ];

    Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(BORDER_COLOR)),
        )
        .alignment(Alignment::Center)
}

fn render_all_done_widget(app: &App) -> Paragraph<'static> {
    let staged = app.collection().staged().len();
    let lines = vec![
        Line::from(""),
        Line::from(""),
        Line::from(Span::styled(
            "All done!",
            Style::default()
                .fg(ACCENT_SECONDARY)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!("You've reviewed all {}.", plural(app.collection().visible().len(), "photo")),
            Style::default().fg(TEXT_SECONDARY),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("r ", Style::default().fg(ACCENT_HIGHLIGHT)),
            Span::styled("Start over", Style::default().fg(TEXT_SECONDARY)),
            Span::raw("  │  "),
            Span::styled("s ", Style::default().fg(ACCENT_PRIMARY)),
            Span::styled(
                format!("Review {} yeeted", staged),
                Style::default().fg(TEXT_SECONDARY),
            ),
        ]),
    ];

    Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(BORDER_COLOR)),
        )
        .alignment(Alignment::Center)
}

fn footer_block() -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER_COLOR))
}

fn render_footer(frame: &mut Frame, area: Rect, app: &App) {
    let line = match app.notice() {
        Some(notice) => Line::from(Span::styled(
            notice.to_string(),
            Style::default().fg(ACCENT_HIGHLIGHT),
        )),
        None => Line::from(vec![
            Span::styled(
                " ← ",
                Style::default()
                    .fg(ACCENT_PRIMARY)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("Yeet", Style::default().fg(TEXT_SECONDARY)),
            Span::raw("  │  "),
            Span::styled(
                "→ ",
                Style::default()
                    .fg(ACCENT_SECONDARY)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("Keep", Style::default().fg(TEXT_SECONDARY)),
            Span::raw("  │  "),
            Span::styled("↑ ", Style::default().fg(TEXT_SECONDARY)),
            Span::styled("Details", Style::default().fg(TEXT_SECONDARY)),
            Span::raw("  │  "),
            Span::styled("s ", Style::default().fg(ACCENT_PRIMARY)),
            Span::styled("Yeeted", Style::default().fg(TEXT_SECONDARY)),
            Span::raw("  │  "),
            Span::styled("? ", Style::default().fg(TEXT_SECONDARY)),
            Span::styled("Help", Style::default().fg(TEXT_SECONDARY)),
            Span::raw("  │  "),
            Span::styled("q ", Style::default().fg(TEXT_SECONDARY)),
            Span::styled("Quit", Style::default().fg(TEXT_SECONDARY)),
        ]),
    };

    frame.render_widget(
        Paragraph::new(line)
            .block(footer_block())
            .alignment(Alignment::Center),
        area,
    );
}

/// Renders the yeeted photos list with a preview of the highlighted one
pub fn render_staged_screen(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(frame.area());

    let staged: Vec<PhotoAsset> = app.collection().staged().to_vec();
    let title = format!(" Yeeted photos ({}) ", staged.len());

    if staged.is_empty() {
        let empty = Paragraph::new(vec![
            Line::from(""),
            Line::from(""),
            Line::from(Span::styled(
                "No yeeted photos",
                Style::default()
                    .fg(ACCENT_HIGHLIGHT)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Swipe left on a photo to yeet it.",
                Style::default().fg(TEXT_SECONDARY),
            )),
        ])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(BORDER_COLOR))
                .title(title),
        )
        .alignment(Alignment::Center);
        frame.render_widget(empty, chunks[0]);
    } else {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(chunks[0]);

        let items: Vec<ListItem> = staged
            .iter()
            .map(|asset| {
                let (mark, color) = if app.is_marked_keep(&asset.id) {
                    ("[✓] ", ACCENT_SECONDARY)
                } else {
                    ("[ ] ", ACCENT_PRIMARY)
                };
                ListItem::new(Line::from(vec![
                    Span::styled(mark, Style::default().fg(color)),
                    Span::styled(asset.filename.clone(), Style::default().fg(TEXT_PRIMARY)),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(BORDER_COLOR))
                    .title(title),
            )
            .highlight_style(Style::default().bg(BORDER_COLOR).add_modifier(Modifier::BOLD))
            .highlight_symbol("▶ ");
        let mut state = ListState::default().with_selected(Some(app.staged_cursor()));
        frame.render_stateful_widget(list, columns[0], &mut state);

        let highlighted = app.highlighted_staged().cloned();
        let mut preview_block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(BORDER_COLOR));
        if let Some(asset) = highlighted.as_ref() {
            preview_block = preview_block.title(caption(asset));
        }
        let inner = preview_block.inner(columns[1]);
        let lines = match highlighted {
            Some(asset) => {
                preview_lines(app.previews_mut().request(&asset, inner.width, inner.height))
            }
            None => Vec::new(),
        };
        frame.render_widget(
            Paragraph::new(lines)
                .block(preview_block)
                .style(Style::default().fg(TEXT_PRIMARY)),
            columns[1],
        );
    }

    let keep_count = app.keep_count();
    let delete_count = app.delete_candidates().len();
    let line = match app.notice() {
        Some(notice) => Line::from(Span::styled(
            notice.to_string(),
            Style::default().fg(ACCENT_HIGHLIGHT),
        )),
        None => Line::from(vec![
            Span::styled("Space ", Style::default().fg(ACCENT_HIGHLIGHT)),
            Span::styled("Mark keep", Style::default().fg(TEXT_SECONDARY)),
            Span::raw("  │  "),
            Span::styled("Enter ", Style::default().fg(ACCENT_SECONDARY)),
            Span::styled(format!("Keep {}", keep_count), Style::default().fg(TEXT_SECONDARY)),
            Span::raw("  │  "),
            Span::styled("d ", Style::default().fg(ACCENT_PRIMARY)),
            Span::styled(
                format!("Delete {}", delete_count),
                Style::default().fg(TEXT_SECONDARY),
            ),
            Span::raw("  │  "),
            Span::styled("Esc ", Style::default().fg(TEXT_SECONDARY)),
            Span::styled("Back", Style::default().fg(TEXT_SECONDARY)),
        ]),
    };
    frame.render_widget(
        Paragraph::new(line)
            .block(footer_block())
            .alignment(Alignment::Center),
        chunks[1],
    );
}

/// Renders the screen asking for gallery access
pub fn render_permission_screen(frame: &mut Frame) {
    let area = centered_rect(60, 40, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "We need access to your photos to continue",
            Style::default()
                .fg(TEXT_PRIMARY)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Photoyeet only reads, moves and deletes photos you swipe on.",
            Style::default().fg(TEXT_SECONDARY),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("[Enter]", Style::default().fg(ACCENT_SECONDARY)),
            Span::raw(" Grant permission    "),
            Span::styled("[q]", Style::default().fg(ACCENT_PRIMARY)),
            Span::raw(" Quit"),
        ]),
    ];

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .title(" Photo access ")
                .title_alignment(Alignment::Center)
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(ACCENT_HIGHLIGHT))
                .style(Style::default().bg(BG_DARK)),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn detail_row(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<12}", label), Style::default().fg(TEXT_SECONDARY)),
        Span::styled(value, Style::default().fg(TEXT_PRIMARY)),
    ])
}

/// Renders the metadata sheet for a photo
pub fn render_details_sheet(frame: &mut Frame, asset: &PhotoAsset) {
    let area = bottom_rect(60, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = vec![
        Line::from(""),
        detail_row("Filename", asset.filename.clone()),
        detail_row("Dimensions", format!("{} × {}", asset.width, asset.height)),
        detail_row("Created", format_timestamp(&asset.creation_time)),
        detail_row("Modified", format_timestamp(&asset.modification_time)),
        detail_row("Type", asset.media_type.label().to_string()),
    ];
    if !asset.media_subtypes.is_empty() {
        lines.push(detail_row("Subtypes", asset.media_subtypes.join(", ")));
    }
    if asset.duration > 0.0 {
        lines.push(detail_row("Duration", format_duration(asset.duration)));
    }
    lines.push(detail_row(
        "Album",
        asset
            .album_id
            .as_ref()
            .map(|a| a.to_string())
            .unwrap_or_else(|| "None".to_string()),
    ));
    lines.push(detail_row("Location", asset.uri.clone()));
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("  o ", Style::default().fg(ACCENT_HIGHLIGHT)),
        Span::raw("Open in viewer    "),
        Span::styled("Esc ", Style::default().fg(TEXT_SECONDARY)),
        Span::raw("Close"),
    ]));

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .title(" Details ")
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(ACCENT_HIGHLIGHT))
                .style(Style::default().bg(BG_DARK)),
        )
        .style(Style::default().fg(TEXT_PRIMARY))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

/// Renders the help overlay
pub fn render_help_overlay(frame: &mut Frame) {
    let area = frame.area();
    let help_area = centered_rect(60, 80, area);

    // Clear background
    frame.render_widget(Clear, help_area);

    let block = Block::default()
        .title(" Help ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(ACCENT_HIGHLIGHT))
        .style(Style::default().bg(BG_DARK));

    let inner = block.inner(help_area);
    frame.render_widget(block, help_area);

    let key = |keys: &'static str, color: Color, text: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {:<10}", keys), Style::default().fg(color)),
            Span::raw(text),
        ])
    };

    let help_lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Swiping",
            Style::default()
                .fg(ACCENT_HIGHLIGHT)
                .add_modifier(Modifier::BOLD),
        )),
        key("drag", TEXT_SECONDARY, "Drag the photo with the mouse"),
        key("→ / k", ACCENT_SECONDARY, "Keep photo"),
        key("← / y", ACCENT_PRIMARY, "Yeet photo"),
        key("↑ / i", TEXT_SECONDARY, "Photo details"),
        key("o", TEXT_SECONDARY, "Open in viewer"),
        key("r", TEXT_SECONDARY, "Start over when done"),
        Line::from(""),
        Line::from(Span::styled(
            "Yeeted photos",
            Style::default()
                .fg(ACCENT_HIGHLIGHT)
                .add_modifier(Modifier::BOLD),
        )),
        key("s", ACCENT_PRIMARY, "Open yeeted photos"),
        key("Space", ACCENT_HIGHLIGHT, "Mark photo to keep"),
        key("Enter", ACCENT_SECONDARY, "Keep marked photos"),
        key("d", ACCENT_PRIMARY, "Delete unmarked photos"),
        Line::from(""),
        key("q / Esc", TEXT_SECONDARY, "Quit or go back"),
        key("?", TEXT_SECONDARY, "Toggle help"),
        Line::from(""),
        Line::from(Span::styled(
            "Press ? or Esc to close",
            Style::default().fg(TEXT_SECONDARY),
        )),
    ];

    let paragraph = Paragraph::new(help_lines).style(Style::default().fg(TEXT_PRIMARY));
    frame.render_widget(paragraph, inner);
}

/// Renders the welcome dialog overlay
pub fn render_welcome_overlay(frame: &mut Frame) {
    let area = centered_rect(80, 70, frame.area());

    // Clear background
    frame.render_widget(Clear, area);

    let welcome_lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Welcome to Photoyeet!",
            Style::default()
                .fg(ACCENT_HIGHLIGHT)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("Clean up your photo library one swipe at a time."),
        Line::from(""),
        Line::from(vec![
            Span::styled("  1. ", Style::default().fg(TEXT_SECONDARY)),
            Span::raw("Drag a photo "),
            Span::styled("right", Style::default().fg(ACCENT_SECONDARY)),
            Span::raw(" (or press →) to keep it"),
        ]),
        Line::from(vec![
            Span::styled("  2. ", Style::default().fg(TEXT_SECONDARY)),
            Span::raw("Drag it "),
            Span::styled("left", Style::default().fg(ACCENT_PRIMARY)),
            Span::raw(" (or press ←) to yeet it"),
        ]),
        Line::from(vec![
            Span::styled("  3. ", Style::default().fg(TEXT_SECONDARY)),
            Span::raw("Drag it up (or press ↑) for details"),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  •  ", Style::default().fg(ACCENT_SECONDARY)),
            Span::raw("Yeeted photos are not deleted until you confirm on the "),
            Span::styled("s", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" screen"),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "Press any key to start swiping...",
            Style::default()
                .fg(ACCENT_HIGHLIGHT)
                .add_modifier(Modifier::BOLD),
        )),
    ];

    let welcome_text = Paragraph::new(welcome_lines)
        .block(
            Block::default()
                .title(" Welcome ")
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(ACCENT_HIGHLIGHT))
                .style(Style::default().bg(BG_DARK)),
        )
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: false });

    frame.render_widget(welcome_text, area);
}

/// Renders the confirmation dialog for permanent deletion
pub fn render_confirm_delete_overlay(frame: &mut Frame, count: usize) {
    let confirm_area = centered_rect(80, 40, frame.area());
    frame.render_widget(Clear, confirm_area);

    let block = Block::default()
        .title(" ⚠ Delete photos ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(ACCENT_PRIMARY))
        .style(Style::default().bg(BG_DARK));

    let inner = block.inner(confirm_area);
    frame.render_widget(block, confirm_area);

    let confirm_lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!(
                "Are you sure you want to permanently delete {} photo(s)?",
                count
            ),
            Style::default()
                .fg(TEXT_PRIMARY)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "This cannot be undone.",
            Style::default().fg(TEXT_SECONDARY),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("[Y]", Style::default().fg(ACCENT_PRIMARY)),
            Span::raw("es  "),
            Span::styled("[Enter]", Style::default().fg(ACCENT_PRIMARY)),
            Span::raw("     "),
            Span::styled("[N]", Style::default().fg(ACCENT_SECONDARY)),
            Span::raw("o  "),
            Span::styled("[Esc]", Style::default().fg(ACCENT_SECONDARY)),
        ]),
    ];

    frame.render_widget(
        Paragraph::new(confirm_lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .style(Style::default().fg(TEXT_PRIMARY)),
        inner,
    );
}

/// Renders a blocking error message
pub fn render_alert_overlay(frame: &mut Frame, message: &str) {
    let area = centered_rect(60, 30, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            message.to_string(),
            Style::default().fg(TEXT_PRIMARY),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "[OK]",
            Style::default()
                .fg(ACCENT_HIGHLIGHT)
                .add_modifier(Modifier::BOLD),
        )),
    ];

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .title(" Error ")
                .title_alignment(Alignment::Center)
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(ACCENT_PRIMARY))
                .style(Style::default().bg(BG_DARK)),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

/// Renders the loading overlay
pub fn render_loading_overlay(frame: &mut Frame, message: &str) {
    let loading_area = centered_rect(40, 20, frame.area());
    frame.render_widget(Clear, loading_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(ACCENT_HIGHLIGHT))
        .style(Style::default().bg(BG_DARK));

    let inner = block.inner(loading_area);
    frame.render_widget(block, loading_area);

    // Simple animation based on current time
    let spinners = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    let spinner = spinners[(now / 100) as usize % spinners.len()];

    let lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled(
                format!("{} ", spinner),
                Style::default().fg(ACCENT_HIGHLIGHT),
            ),
            Span::styled(message.to_string(), Style::default().fg(TEXT_PRIMARY)),
        ]),
    ];

    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center),
        inner,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::AppSettings;
    use crate::config::{SecureStore, UserConfig};
    use crate::domain::{AssetId, LoadingIndicator, PhotoCollection};
    use crate::library::{LocalLibrary, MediaLibrary};
    use crate::store::{AssetStore, StagingMode};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;
    use tempfile::TempDir;

    struct Fixture {
        _library_dir: TempDir,
        _sandbox: TempDir,
        app: App,
    }

    async fn fixture(count: usize) -> Fixture {
        let library_dir = TempDir::new().unwrap();
        let sandbox = TempDir::new().unwrap();
        for i in 0..count {
            image::RgbImage::new(8, 8)
                .save(library_dir.path().join(format!("photo{}.png", i)))
                .unwrap();
        }

        let library: Arc<dyn MediaLibrary> = Arc::new(LocalLibrary::new(library_dir.path()));
        let store = AssetStore::open(library, StagingMode::Album, sandbox.path()).await;
        let app = App::new(
            PhotoCollection::new(store, LoadingIndicator::new()),
            SecureStore::in_dir(sandbox.path()),
            UserConfig {
                welcome_shown: true,
            },
            AppSettings::default(),
            80,
        );

        Fixture {
            _library_dir: library_dir,
            _sandbox: sandbox,
            app,
        }
    }

    async fn started(count: usize) -> Fixture {
        let mut f = fixture(count).await;
        f.app.start().await;
        f.app.drain_commands().await;
        f
    }

    fn draw(app: &mut App) -> String {
        let backend = TestBackend::new(80, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();

        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    mod screen_tests {
        use super::*;

        #[tokio::test]
        async fn test_render_permission_screen() {
            let mut f = fixture(1).await;
            let screen = draw(&mut f.app);
            assert!(screen.contains("We need access to your photos to continue"));
        }

        #[tokio::test]
        async fn test_render_review_header() {
            let mut f = started(3).await;
            let screen = draw(&mut f.app);

            assert!(screen.contains("Photo 1/3"));
            assert!(screen.contains("photo0.png"));
            assert!(screen.contains("Yeeted: 0"));
            assert!(screen.contains("Keep"));
            assert!(screen.contains("Yeet"));
        }

        #[tokio::test]
        async fn test_render_no_photos() {
            let mut f = started(0).await;
            let screen = draw(&mut f.app);
            assert!(screen.contains("No photos found"));
        }

        #[tokio::test]
        async fn test_render_all_done() {
            let mut f = started(1).await;
            let mut now = std::time::Instant::now();
            press(&mut f.app, KeyCode::Right);
            for _ in 0..40 {
                now += std::time::Duration::from_millis(16);
                f.app.on_tick(now);
            }
            assert!(draw(&mut f.app).contains("All done!"));
        }

        #[tokio::test]
        async fn test_render_loading_overlay() {
            let mut f = started(1).await;
            f.app.collection().loading().show("Moving photo to yeeted...");

            let screen = draw(&mut f.app);
            assert!(screen.contains("Moving photo to yeeted..."));
        }

        #[tokio::test]
        async fn test_render_help_overlay() {
            let mut f = started(1).await;
            press(&mut f.app, KeyCode::Char('?'));

            let screen = draw(&mut f.app);
            assert!(screen.contains("Help"));
            assert!(screen.contains("Keep photo"));
            assert!(screen.contains("Yeet photo"));
        }

        #[tokio::test]
        async fn test_render_details_sheet() {
            let mut f = started(1).await;
            let backend = TestBackend::new(80, 30);
            let mut terminal = Terminal::new(backend).unwrap();
            let asset = f.app.collection().current().cloned().unwrap();

            terminal
                .draw(|frame| render_details_sheet(frame, &asset))
                .unwrap();
            let screen: String = terminal
                .backend()
                .buffer()
                .content()
                .iter()
                .map(|c| c.symbol())
                .collect();

            assert!(screen.contains("Details"));
            assert!(screen.contains("photo0.png"));
            assert!(screen.contains("8 × 8"));
        }
    }

    mod staged_screen_tests {
        use super::*;

        #[tokio::test]
        async fn test_render_empty_staged() {
            let mut f = started(1).await;
            press(&mut f.app, KeyCode::Char('s'));
            f.app.drain_commands().await;

            assert!(draw(&mut f.app).contains("No yeeted photos"));
        }

        #[tokio::test]
        async fn test_render_staged_list_and_counts() {
            let mut f = started(2).await;
            f.app.run(crate::app::AppCommand::Discard(AssetId::new("photo0.png"))).await;
            f.app.run(crate::app::AppCommand::Discard(AssetId::new("photo1.png"))).await;
            press(&mut f.app, KeyCode::Char('s'));
            f.app.drain_commands().await;
            press(&mut f.app, KeyCode::Char(' '));

            let screen = draw(&mut f.app);
            assert!(screen.contains("Yeeted photos (2)"));
            assert!(screen.contains("photo0.png"));
            assert!(screen.contains("Keep 1"));
            assert!(screen.contains("Delete 1"));
        }

        #[tokio::test]
        async fn test_render_confirm_delete() {
            let backend = TestBackend::new(80, 30);
            let mut terminal = Terminal::new(backend).unwrap();
            terminal
                .draw(|frame| render_confirm_delete_overlay(frame, 3))
                .unwrap();
            let screen: String = terminal
                .backend()
                .buffer()
                .content()
                .iter()
                .map(|c| c.symbol())
                .collect();

            assert!(screen.contains("permanently delete 3 photo(s)?"));
        }

        #[tokio::test]
        async fn test_render_alert() {
            let backend = TestBackend::new(80, 30);
            let mut terminal = Terminal::new(backend).unwrap();
            terminal
                .draw(|frame| render_alert_overlay(frame, "Failed to load photos"))
                .unwrap();
            let screen: String = terminal
                .backend()
                .buffer()
                .content()
                .iter()
                .map(|c| c.symbol())
                .collect();

            assert!(screen.contains("Failed to load photos"));
        }
    }
}
