//! UI rendering with ratatui.
//!
//! Single-column layout: header bar, conversation with the input line under
//! it, and a status bar with key hints.

use barbershop_chat_core::{linkify, Message, Segment, Sender};
use barbershop_chat_session::SUGGESTIONS;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{
    Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap,
};
use ratatui::Frame;

use crate::app::App;

/// Horizontal padding inside the chat block.
const CHAT_PADDING: u16 = 1;

const INPUT_PLACEHOLDER: &str = "Digite sua mensagem...";

/// Render the UI.
pub fn render(frame: &mut Frame, app: &App) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header bar
            Constraint::Min(5),    // Conversation
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    render_header_bar(frame, app, layout[0]);
    render_chat(frame, app, layout[1]);
    render_status_bar(frame, app, layout[2]);
}

fn to_u16(value: usize) -> u16 {
    u16::try_from(value).unwrap_or(u16::MAX)
}

/// Render the header bar with the assistant name and provider.
fn render_header_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = "BARBERSHOP · Ana";
    let (status_text, status_style) = if app.store().is_pending() {
        ("digitando", Style::default().fg(Color::Yellow))
    } else {
        ("online", Style::default().fg(Color::Green))
    };
    let right_text = format!("{} [{status_text}]", app.provider());
    let gap = area
        .width
        .saturating_sub(to_u16(title.chars().count() + right_text.chars().count()));

    let line = Line::from(vec![
        Span::styled(title, Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Span::raw(" ".repeat(usize::from(gap))),
        Span::raw(app.provider().to_string()),
        Span::raw(" ["),
        Span::styled(status_text, status_style),
        Span::raw("]"),
    ]);

    let header = Paragraph::new(line).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

/// Split one line of message text into plain and link spans.
fn linked_spans(text: &str, base: Style) -> Vec<Span<'_>> {
    linkify(text)
        .into_iter()
        .map(|segment| match segment {
            Segment::Text(text) => Span::styled(text, base),
            Segment::Link { text, .. } => Span::styled(
                text,
                Style::default()
                    .fg(Color::LightBlue)
                    .add_modifier(Modifier::UNDERLINED),
            ),
        })
        .collect()
}

/// Lines for one message bubble: a label with the time, then the text.
fn message_lines(message: &Message) -> Vec<Line<'_>> {
    let (label, label_color) = match message.sender {
        Sender::User => ("[Você] ", Color::Cyan),
        Sender::Bot => ("[Ana] ", Color::Green),
    };

    let mut lines = vec![Line::from(vec![
        Span::styled(
            label,
            Style::default().fg(label_color).add_modifier(Modifier::BOLD),
        ),
        Span::styled(message.display_time(), Style::default().fg(Color::DarkGray)),
    ])];

    let base = Style::default().fg(Color::White);
    lines.extend(
        message
            .text
            .lines()
            .map(|line| Line::from(linked_spans(line, base))),
    );
    lines.push(Line::from(""));
    lines
}

fn typing_lines(app: &App) -> [Line<'static>; 3] {
    [
        Line::from(Span::styled(
            "[Ana]",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            app.typing_dots(),
            Style::default().fg(Color::Yellow),
        )),
        Line::from(""),
    ]
}

fn welcome_lines(app: &App) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(
            "Bem-vindo ao BarberShop 💈",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Escolha uma pergunta com Tab ou digite a sua:",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    for (index, suggestion) in SUGGESTIONS.iter().enumerate() {
        let selected = app.selected_suggestion == Some(index);
        let (marker, style) = if selected {
            (
                "› ",
                Style::default().fg(Color::Black).bg(Color::Cyan),
            )
        } else {
            ("  ", Style::default().fg(Color::Gray))
        };
        lines.push(Line::from(vec![
            Span::raw(marker),
            Span::styled(*suggestion, style),
        ]));
    }
    lines
}

/// Render the conversation and the input line.
fn render_chat(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Ana · assistente virtual ")
        .borders(Borders::ALL)
        .border_style(if app.input_focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::Gray)
        });

    let inner_area = block.inner(area);
    frame.render_widget(block, area);

    let inner_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),    // Messages
            Constraint::Length(1), // Separator line
            Constraint::Length(1), // Input line
        ])
        .split(inner_area);

    let chat_area_full = inner_layout[0];
    let chat_area = Rect::new(
        chat_area_full.x + CHAT_PADDING,
        chat_area_full.y,
        chat_area_full.width.saturating_sub(CHAT_PADDING * 2 + 1), // +1 for scrollbar
        chat_area_full.height,
    );

    let store = app.store();
    let mut lines: Vec<Line> = Vec::new();
    for message in store.messages() {
        lines.extend(message_lines(message));
        if store.typing_after() == Some(message.id) {
            lines.extend(typing_lines(app));
        }
    }
    if store.show_welcome() {
        lines.extend(welcome_lines(app));
    }

    let text = Text::from(lines);
    let content_width = usize::from(chat_area.width);
    let visible_lines = usize::from(chat_area.height);
    let total_wrapped_lines = calculate_wrapped_line_count(&text, content_width);

    // chat_scroll counts lines up from the bottom.
    let max_scroll = total_wrapped_lines.saturating_sub(visible_lines);
    let effective_scroll = app.chat_scroll.min(max_scroll);
    let scroll_offset = max_scroll.saturating_sub(effective_scroll);

    let paragraph = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .scroll((to_u16(scroll_offset), 0));
    frame.render_widget(paragraph, chat_area);

    if total_wrapped_lines > visible_lines {
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("▲"))
            .end_symbol(Some("▼"));
        let mut scrollbar_state = ScrollbarState::new(total_wrapped_lines)
            .position(scroll_offset)
            .viewport_content_length(visible_lines);
        frame.render_stateful_widget(scrollbar, chat_area_full, &mut scrollbar_state);
    }

    render_input_line(frame, app, inner_layout[1], inner_layout[2]);
}

/// Render the input line at the bottom of the conversation.
fn render_input_line(frame: &mut Frame, app: &App, separator_area: Rect, input_area: Rect) {
    let separator = Paragraph::new("─".repeat(usize::from(separator_area.width)))
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(separator, separator_area);

    let store = app.store();
    let enabled = !store.is_pending();
    let prompt = if enabled { "> " } else { "… " };

    let input_span = if store.input().is_empty() {
        Span::styled(INPUT_PLACEHOLDER, Style::default().fg(Color::DarkGray))
    } else {
        Span::styled(store.input(), Style::default().fg(Color::White))
    };

    let input_line = Line::from(vec![
        Span::styled(
            prompt,
            Style::default().fg(if enabled { Color::Cyan } else { Color::DarkGray }),
        ),
        input_span,
    ]);
    frame.render_widget(Paragraph::new(input_line), input_area);

    // Hide the cursor while a reply is pending.
    if app.input_focused && enabled {
        frame.set_cursor_position((
            input_area.x + to_u16(prompt.chars().count() + store.cursor()),
            input_area.y,
        ));
    }
}

/// Render the status bar.
fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let key = |k: &'static str| Span::styled(k, Style::default().fg(Color::Yellow));
    let store = app.store();

    let mut spans = vec![
        Span::raw(" "),
        key("Enter"),
        Span::raw(":enviar "),
    ];
    if store.show_welcome() {
        spans.extend([key("Tab"), Span::raw(":sugestões ")]);
    }
    if store.can_clear() {
        spans.extend([key("Ctrl+L"), Span::raw(":limpar ")]);
    }
    spans.extend([
        key("PgUp/PgDn"),
        Span::raw(":rolar "),
        key("Esc"),
        Span::raw(":sair"),
    ]);

    let status_bar = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(status_bar, area);
}

/// Calculate the number of visual lines after text wrapping.
fn calculate_wrapped_line_count(text: &Text, available_width: usize) -> usize {
    if available_width == 0 {
        return text.lines.len();
    }

    text.lines
        .iter()
        .map(|line| line.width().div_ceil(available_width).max(1))
        .sum()
}
