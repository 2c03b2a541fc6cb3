//! Terminal UI rendering with ratatui
//!
//! Rendering only reads a `Snapshot`; it never touches the engine.

use crate::board::{Cell, COLS, ROWS};
use crate::game::Snapshot;
use crate::gesture::PAN_SCALE;
use crate::highscores::HighScores;
use crate::tetromino::ShapeKind;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use std::collections::HashMap;

const BLOCK: &str = "██";
const EMPTY: &str = "  ";

/// Terminal columns per board cell
pub const CELL_WIDTH: u16 = 2;
const BOARD_WIDTH: u16 = COLS as u16 * CELL_WIDTH;
const BOARD_HEIGHT: u16 = ROWS as u16;
const PANEL_WIDTH: u16 = 18;
const GAME_WIDTH: u16 = BOARD_WIDTH + PANEL_WIDTH;

/// Display color for a piece kind
pub fn kind_color(kind: ShapeKind) -> Color {
    match kind {
        ShapeKind::I => Color::Cyan,
        ShapeKind::O => Color::Yellow,
        ShapeKind::T => Color::Magenta,
        ShapeKind::S => Color::Green,
        ShapeKind::Z => Color::Red,
        ShapeKind::J => Color::Blue,
        ShapeKind::L => Color::Rgb(255, 165, 0), // Orange
    }
}

fn center_rect(area: Rect, width: u16, height: u16) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

fn game_layout(area: Rect) -> (Rect, Rect) {
    let game_area = center_rect(area, GAME_WIDTH, BOARD_HEIGHT);
    let layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(BOARD_WIDTH),
            Constraint::Length(PANEL_WIDTH),
        ])
        .split(game_area);
    (layout[0], layout[1])
}

/// Where the board (frame included) is drawn inside `area`
pub fn board_area(area: Rect) -> Rect {
    game_layout(area).0
}

/// Pan view width for a board drawn in `board`, so that dragging across
/// one board cell moves the piece one column
pub fn pan_view_width(board: Rect) -> f32 {
    board.width as f32 * PAN_SCALE / COLS as f32
}

/// Render the whole game screen
pub fn render_game(frame: &mut Frame, snapshot: &Snapshot, high_scores: &HighScores) {
    let area = frame.area();
    let (board, panel) = game_layout(area);

    render_board(frame, board, snapshot);
    render_panel(frame, panel, snapshot, high_scores);

    if snapshot.game_over {
        let subtitle = format!("Score {} - N to restart", snapshot.score);
        render_overlay(frame, board, "GAME OVER", &subtitle);
    }
}

fn render_board(frame: &mut Frame, area: Rect, snapshot: &Snapshot) {
    let locked: HashMap<Cell, ShapeKind> = snapshot.occupied.iter().copied().collect();
    let falling_color = snapshot.falling_kind.map(kind_color).unwrap_or(Color::White);

    // Top row first; row 0 is the floor
    let lines: Vec<Line> = (0..ROWS as i32)
        .rev()
        .map(|row| {
            let spans: Vec<Span> = (0..COLS as i32)
                .map(|col| {
                    let cell = Cell::new(row, col);
                    if snapshot.falling.contains(&cell) {
                        Span::styled(BLOCK, Style::default().fg(falling_color))
                    } else if let Some(&kind) = locked.get(&cell) {
                        Span::styled(BLOCK, Style::default().fg(kind_color(kind)))
                    } else if row == 0 || row == ROWS as i32 - 1 || col == 0 || col == COLS as i32 - 1 {
                        Span::styled(BLOCK, Style::default().fg(Color::DarkGray))
                    } else {
                        Span::raw(EMPTY)
                    }
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), area);
}

fn stat(label: &str, value: String, color: Color) -> [Line<'static>; 2] {
    [
        Line::from(Span::styled(label.to_string(), Style::default().fg(Color::Gray))),
        Line::from(Span::styled(value, Style::default().fg(color).bold())),
    ]
}

fn render_panel(frame: &mut Frame, area: Rect, snapshot: &Snapshot, high_scores: &HighScores) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = Vec::new();
    lines.extend(stat("SCORE", snapshot.score.to_string(), Color::Yellow));
    lines.push(Line::raw(""));
    lines.extend(stat("LEVEL", snapshot.level.to_string(), Color::Cyan));
    lines.push(Line::raw(""));
    lines.extend(stat(
        "ROWS",
        format!("{} ({}/10)", snapshot.rows, snapshot.rows_this_level),
        Color::Green,
    ));
    lines.push(Line::raw(""));
    lines.push(Line::from(Span::styled("HIGH SCORES", Style::default().fg(Color::Gray))));
    for entry in &high_scores.entries {
        lines.push(Line::raw(format!("{:<4}{:>9}", entry.initials, entry.score)));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

/// Render an overlay (for game over)
fn render_overlay(frame: &mut Frame, area: Rect, title: &str, subtitle: &str) {
    let popup_width = area.width.min(24);
    let popup_height = 5u16;
    let popup_area = center_rect(area, popup_width, popup_height);

    // Clear the background
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .style(Style::default().bg(Color::Black));

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let text = vec![
        Line::styled(title.to_string(), Style::default().fg(Color::Yellow).bold()),
        Line::raw(""),
        Line::styled(subtitle.to_string(), Style::default().fg(Color::Gray)),
    ];

    let paragraph = Paragraph::new(text).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}
