//! UI components for the TUI application

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};
use unicode_width::UnicodeWidthStr;

use dc_core::{RenderedTable, ViewMode};

use crate::app::ManagerFocus;
use crate::viewmodel::{MessageBody, MessageView, ServerStatus, ViewModel};

/// Draw the whole application frame
pub fn draw_root(f: &mut ratatui::Frame, area: Rect, view_model: &ViewModel) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with connection status
            Constraint::Min(5),    // Active view
            Constraint::Length(4), // Notice + shortcuts
        ])
        .split(area);

    draw_header(f, chunks[0], view_model);
    match view_model.view {
        ViewMode::UploadManager => draw_manager(f, chunks[1], view_model),
        ViewMode::Chat => draw_chat(f, chunks[1], view_model),
    }
    draw_footer(f, chunks[2], view_model);
}

/// Draw the title bar with the connection status
fn draw_header(f: &mut ratatui::Frame, area: Rect, view_model: &ViewModel) {
    let status_color = match view_model.server_status {
        ServerStatus::Probing => Color::Yellow,
        ServerStatus::Connected => Color::Green,
        ServerStatus::Disconnected => Color::Red,
    };

    let line = Line::from(vec![
        Span::styled("DataChat AI", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("  •  "),
        Span::styled(
            view_model.server_status.label(),
            Style::default().fg(status_color),
        ),
    ]);

    let paragraph = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
    f.render_widget(paragraph, area);
}

/// Draw the upload manager: path input plus staged and committed lists
fn draw_manager(f: &mut ratatui::Frame, area: Rect, view_model: &ViewModel) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Path input
            Constraint::Min(3),    // File lists
        ])
        .split(area);

    draw_path_input(f, chunks[0], view_model);

    let lists = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);

    draw_name_list(
        f,
        lists[0],
        "Selected Files",
        &view_model.pending,
        view_model.selected_pending,
        matches!(view_model.manager_focus, ManagerFocus::Pending),
        "No files selected",
    );
    draw_name_list(
        f,
        lists[1],
        "Uploaded Files",
        &view_model.tables,
        view_model.selected_table,
        matches!(view_model.manager_focus, ManagerFocus::Tables),
        "No tables uploaded yet",
    );
}

fn draw_path_input(f: &mut ratatui::Frame, area: Rect, view_model: &ViewModel) {
    let is_focused = matches!(view_model.manager_focus, ManagerFocus::PathInput);

    let text = if view_model.path_input.is_empty() {
        Span::styled(
            "Type a CSV path and press Enter...",
            Style::default().fg(Color::DarkGray),
        )
    } else {
        Span::raw(view_model.path_input.clone())
    };

    let block_style = if is_focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };

    let paragraph = Paragraph::new(Line::from(text)).block(
        Block::default()
            .borders(Borders::ALL)
            .style(block_style)
            .title("Add File"),
    );
    f.render_widget(paragraph, area);
}

/// Draw one selectable list of file names
fn draw_name_list(
    f: &mut ratatui::Frame,
    area: Rect,
    title: &str,
    names: &[String],
    selected: usize,
    is_focused: bool,
    empty_text: &'static str,
) {
    let mut state = ListState::default();
    let items: Vec<ListItem> = if names.is_empty() {
        vec![ListItem::new(empty_text)]
    } else {
        state.select(Some(selected.min(names.len() - 1)));
        names.iter().map(|name| ListItem::new(name.as_str())).collect()
    };

    let block_style = if is_focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .style(block_style)
                .title(title),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol(">> ");

    f.render_stateful_widget(list, area, &mut state);
}

/// Draw the conversation log and the question input
fn draw_chat(f: &mut ratatui::Frame, area: Rect, view_model: &ViewModel) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Conversation log
            Constraint::Length(3), // Question input
        ])
        .split(area);

    let lines = if view_model.messages.is_empty() {
        welcome_lines(view_model)
    } else {
        conversation_lines(view_model)
    };

    // Stick to the newest lines once the log outgrows the pane
    let inner_height = chunks[0].height.saturating_sub(2) as usize;
    let scroll = lines.len().saturating_sub(inner_height) as u16;

    let log = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Data Analysis Chat"),
        )
        .scroll((scroll, 0));
    f.render_widget(log, chunks[0]);

    draw_question_input(f, chunks[1], view_model);
}

fn draw_question_input(f: &mut ratatui::Frame, area: Rect, view_model: &ViewModel) {
    let text = if view_model.question_input.is_empty() {
        Span::styled(
            "Ask a question about your data...",
            Style::default().fg(Color::DarkGray),
        )
    } else {
        Span::raw(view_model.question_input.clone())
    };

    let paragraph = Paragraph::new(Line::from(text))
        .block(Block::default().borders(Borders::ALL).title("Question"));
    f.render_widget(paragraph, area);
}

/// Greeting and starter questions shown while the log is empty
fn welcome_lines(view_model: &ViewModel) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(
            "Welcome to DataChat AI",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from("Upload your CSV files and ask questions about your data in plain English."),
        Line::from(""),
        Line::from("Try asking:"),
    ];

    for (index, suggestion) in view_model.suggestions.iter().enumerate() {
        let selected = index == view_model.selected_suggestion;
        let marker = if selected { ">> " } else { "   " };
        let style = if selected {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        };
        lines.push(Line::from(Span::styled(
            format!("{marker}{suggestion}"),
            style,
        )));
    }

    lines
}

fn conversation_lines(view_model: &ViewModel) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for message in &view_model.messages {
        lines.extend(message_lines(message));
        lines.push(Line::from(""));
    }
    if view_model.submitting {
        lines.push(Line::from(Span::styled(
            "Processing your question...",
            Style::default().fg(Color::DarkGray),
        )));
    }
    lines
}

fn message_lines(message: &MessageView) -> Vec<Line<'static>> {
    let sender_color = if message.sender == "You" {
        Color::Yellow
    } else {
        Color::Green
    };

    let mut lines = vec![Line::from(vec![
        Span::styled(
            message.sender.to_string(),
            Style::default().fg(sender_color).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  {}", message.time),
            Style::default().fg(Color::DarkGray),
        ),
    ])];

    match &message.body {
        MessageBody::Question(content) => {
            lines.push(Line::from(content.clone()));
        }
        MessageBody::Answer {
            sql,
            explanation,
            table,
        } => {
            lines.push(Line::from(Span::styled(
                "Generated SQL",
                Style::default().add_modifier(Modifier::BOLD),
            )));
            for sql_line in sql.lines() {
                lines.push(Line::from(Span::styled(
                    sql_line.to_string(),
                    Style::default().fg(Color::Magenta),
                )));
            }
            lines.push(Line::from(Span::styled(
                "Analysis",
                Style::default().add_modifier(Modifier::BOLD),
            )));
            for text_line in explanation.lines() {
                lines.push(Line::from(text_line.to_string()));
            }
            if let Some(table) = table {
                lines.push(Line::from(Span::styled(
                    "Results",
                    Style::default().add_modifier(Modifier::BOLD),
                )));
                lines.extend(table_lines(table));
            }
        }
        MessageBody::Failure {
            message,
            suggestion,
        } => {
            lines.push(Line::from(Span::styled(
                message.clone(),
                Style::default().fg(Color::Red),
            )));
            if let Some(suggestion) = suggestion {
                lines.push(Line::from(Span::styled(
                    format!("Suggestion: {suggestion}"),
                    Style::default().fg(Color::Yellow),
                )));
            }
        }
    }

    lines
}

/// Lay a rendered result set out as fixed-width text columns
fn table_lines(table: &RenderedTable) -> Vec<Line<'static>> {
    let mut widths: Vec<usize> = table.headers.iter().map(|header| header.width()).collect();
    for row in &table.cells {
        for (index, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(index) {
                *width = (*width).max(cell.width());
            }
        }
    }

    let mut lines = vec![Line::from(Span::styled(
        padded_row(&table.headers, &widths),
        Style::default().add_modifier(Modifier::UNDERLINED),
    ))];
    for row in &table.cells {
        lines.push(Line::from(padded_row(row, &widths)));
    }
    lines.push(Line::from(Span::styled(
        format!("Total rows: {}", table.row_count()),
        Style::default().fg(Color::DarkGray),
    )));

    lines
}

fn padded_row(cells: &[String], widths: &[usize]) -> String {
    let mut out = String::new();
    for (index, cell) in cells.iter().enumerate() {
        if index > 0 {
            out.push_str("  ");
        }
        out.push_str(cell);
        let width = widths.get(index).copied().unwrap_or(0);
        for _ in cell.width()..width {
            out.push(' ');
        }
    }
    out
}

/// Draw the notice line and contextual shortcuts
fn draw_footer(f: &mut ratatui::Frame, area: Rect, view_model: &ViewModel) {
    let notice_line = match &view_model.notice {
        Some(notice) => Line::from(Span::styled(
            notice.clone(),
            Style::default().fg(Color::Red),
        )),
        None => Line::from(""),
    };

    let shortcuts = match view_model.view {
        ViewMode::UploadManager => manager_shortcuts(view_model.manager_focus),
        ViewMode::Chat => chat_shortcuts(view_model),
    };

    let paragraph = Paragraph::new(vec![notice_line, Line::from(shortcuts)])
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(paragraph, area);
}

fn manager_shortcuts(focus: ManagerFocus) -> Vec<Span<'static>> {
    match focus {
        ManagerFocus::PathInput => vec![
            Span::styled("Tab", Style::default().fg(Color::Cyan)),
            Span::raw(" Next pane • "),
            Span::styled("Enter", Style::default().fg(Color::Green)),
            Span::raw(" Add file • "),
            Span::styled("Esc", Style::default().fg(Color::Yellow)),
            Span::raw(" Chat • "),
            Span::styled("Ctrl+C", Style::default().fg(Color::Red)),
            Span::raw(" Quit"),
        ],
        ManagerFocus::Pending => vec![
            Span::styled("Tab", Style::default().fg(Color::Cyan)),
            Span::raw(" Next pane • "),
            Span::styled("Enter", Style::default().fg(Color::Green)),
            Span::raw(" Upload all • "),
            Span::styled("Del", Style::default().fg(Color::Yellow)),
            Span::raw(" Discard • "),
            Span::styled("Ctrl+C", Style::default().fg(Color::Red)),
            Span::raw(" Quit"),
        ],
        ManagerFocus::Tables => vec![
            Span::styled("Tab", Style::default().fg(Color::Cyan)),
            Span::raw(" Next pane • "),
            Span::styled("Del", Style::default().fg(Color::Yellow)),
            Span::raw(" Remove table • "),
            Span::styled("Esc", Style::default().fg(Color::Green)),
            Span::raw(" Chat • "),
            Span::styled("Ctrl+C", Style::default().fg(Color::Red)),
            Span::raw(" Quit"),
        ],
    }
}

fn chat_shortcuts(view_model: &ViewModel) -> Vec<Span<'static>> {
    let mut spans = vec![
        Span::styled("Enter", Style::default().fg(Color::Green)),
        Span::raw(" Send • "),
    ];
    if !view_model.suggestions.is_empty() {
        spans.push(Span::styled("↑↓", Style::default().fg(Color::Yellow)));
        spans.push(Span::raw(" Pick • "));
        spans.push(Span::styled("Tab", Style::default().fg(Color::Cyan)));
        spans.push(Span::raw(" Fill • "));
    }
    if view_model.can_clear {
        spans.push(Span::styled("Ctrl+L", Style::default().fg(Color::Yellow)));
        spans.push(Span::raw(" Clear • "));
    }
    spans.push(Span::styled("Ctrl+U", Style::default().fg(Color::Cyan)));
    spans.push(Span::raw(" Upload • "));
    spans.push(Span::styled("Ctrl+C", Style::default().fg(Color::Red)));
    spans.push(Span::raw(" Quit"));
    spans
}
