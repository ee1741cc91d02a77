use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Margin, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{
        block::Title, Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation,
        ScrollbarState, Tabs, Wrap,
    },
};
use docsdesk_core::Message;
use crate::app::{App, Tab};
use crate::markdown::render_markdown;

const SPINNER: [&str; 3] = ["◐", "◓", "◑"];
const MAX_INPUT_LINES: u16 = 4;

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: tabs, body, footer
    let [tabs_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_tabs(app, frame, tabs_area);

    match app.tab {
        Tab::Ask => render_ask_tab(app, frame, body_area),
        Tab::Context => {
            app.chat_area = None;
            render_context_tab(app, frame, body_area);
        }
    }

    render_footer(app, frame, footer_area);
}

fn render_tabs(app: &App, frame: &mut Frame, area: Rect) {
    let titles = Tab::all().into_iter().map(|tab| format!(" {} ", tab.title()));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(" docsdesk ", Style::default().fg(Color::Cyan).bold()))
        .title(
            Title::from(Span::styled(
                format!(" {} · v{} ", app.config.backend_url, env!("CARGO_PKG_VERSION")),
                Style::default().fg(Color::DarkGray),
            ))
            .alignment(Alignment::Right),
        );

    let tabs = Tabs::new(titles)
        .block(block)
        .select(app.tab.index())
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .divider("│");

    frame.render_widget(tabs, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let mode_text = match app.tab {
        Tab::Ask => " ASK ",
        Tab::Context => " CONTEXT ",
    };
    let mode_style = if app.is_busy() {
        Style::default().bg(Color::Yellow).fg(Color::Black)
    } else {
        Style::default().bg(Color::Blue).fg(Color::White)
    };

    let mut hints = match app.tab {
        Tab::Ask => {
            let mut hints = Vec::new();
            if !app.chat.is_sending() {
                hints.extend(vec![
                    Span::styled(" Enter ", key_style),
                    Span::styled(" send ", label_style),
                    Span::styled(" Shift+Enter ", key_style),
                    Span::styled(" newline ", label_style),
                ]);
            }
            hints.extend(vec![
                Span::styled(" PgUp/PgDn ", key_style),
                Span::styled(" scroll ", label_style),
            ]);
            if app.chat.latest_reference().is_some() {
                hints.extend(vec![
                    Span::styled(" Ctrl+O ", key_style),
                    Span::styled(" open reference ", label_style),
                ]);
            }
            hints
        }
        Tab::Context => vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" provide context ", label_style),
            Span::styled(" q ", key_style),
            Span::styled(" quit ", label_style),
        ],
    };
    hints.extend(vec![
        Span::styled(" Tab ", key_style),
        Span::styled(" switch tab ", label_style),
        Span::styled(" Ctrl+C ", key_style),
        Span::styled(" quit ", label_style),
    ]);

    let footer_content = Line::from(
        vec![
            Span::styled(mode_text, mode_style),
            Span::styled(" ", label_style),
        ]
        .into_iter()
        .chain(hints)
        .collect::<Vec<_>>(),
    );

    let footer = Paragraph::new(footer_content).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

fn render_ask_tab(app: &mut App, frame: &mut Frame, area: Rect) {
    let visible_input_lines = (app.input.line_count() as u16).clamp(1, MAX_INPUT_LINES);
    let [chat_area, input_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(visible_input_lines + 2),
    ])
    .areas(area);

    app.chat_area = Some(chat_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Conversation ");
    let inner = block.inner(chat_area);

    let mut lines: Vec<Line<'static>> = Vec::new();
    for message in app.chat.messages() {
        lines.extend(message_lines(app, message));
    }
    if app.chat.is_sending() {
        lines.push(sender_line("Assistant", Color::Yellow, None, Alignment::Left));
        lines.push(progress_dots(app.animation_frame));
    }

    // Row count from the same word wrapper the paragraph renders with
    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
    let total_lines = u16::try_from(paragraph.line_count(inner.width)).unwrap_or(u16::MAX);
    app.sync_chat_scroll(total_lines, inner.height);

    let paragraph = paragraph.block(block).scroll((app.chat_scroll, 0));
    frame.render_widget(paragraph, chat_area);

    // Render scrollbar
    if app.chat_total_lines > app.chat_height {
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("^"))
            .end_symbol(Some("v"));

        let mut scrollbar_state = ScrollbarState::new(
            app.chat_total_lines.saturating_sub(app.chat_height) as usize,
        )
        .position(app.chat_scroll as usize);

        frame.render_stateful_widget(
            scrollbar,
            chat_area.inner(Margin {
                vertical: 1,
                horizontal: 0,
            }),
            &mut scrollbar_state,
        );
    }

    render_input(app, frame, input_area, visible_input_lines);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect, visible_lines: u16) {
    let sending = app.chat.is_sending();
    let send_enabled = !sending && !app.input.is_blank();

    let border_color = if sending { Color::DarkGray } else { Color::Yellow };
    let send_style = if send_enabled {
        Style::default().fg(Color::Black).bg(Color::Green).bold()
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Message ")
        .title(Title::from(Span::styled(" Send ⏎ ", send_style)).alignment(Alignment::Right));

    let (row, col) = app.input.cursor_row_col();
    let input_scroll = (row as u16).saturating_sub(visible_lines.saturating_sub(1));

    // Horizontal scroll keeps the cursor inside the box; every row shares it
    let inner_width = usize::from(area.width.saturating_sub(2));
    let scroll_offset = horizontal_offset(col, inner_width);

    let paragraph = if sending {
        Paragraph::new(Span::styled(
            "Waiting for the answer...",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        ))
    } else if app.input.value().is_empty() {
        Paragraph::new(Span::styled(
            "Type your message...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let visible_rows = app
            .input
            .value()
            .split('\n')
            .map(|line| {
                Line::from(
                    line.chars()
                        .skip(scroll_offset)
                        .take(inner_width)
                        .collect::<String>(),
                )
            })
            .collect::<Vec<_>>();
        Paragraph::new(visible_rows).scroll((input_scroll, 0))
    };
    frame.render_widget(paragraph.block(block), area);

    // Show cursor only while the input accepts text
    if !sending {
        frame.set_cursor_position((
            area.x + 1 + u16::try_from(col.saturating_sub(scroll_offset)).unwrap_or(0),
            area.y + 1 + (row as u16).saturating_sub(input_scroll),
        ));
    }
}

fn sender_line(label: &'static str, color: Color, time: Option<String>, alignment: Alignment) -> Line<'static> {
    let mut spans = vec![Span::styled(
        label,
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )];
    if let Some(time) = time {
        spans.push(Span::styled(format!(" · {time}"), Style::default().fg(Color::DarkGray)));
    }
    Line::from(spans).alignment(alignment)
}

fn message_lines(app: &App, message: &Message) -> Vec<Line<'static>> {
    let (label, color, alignment) = if message.is_user() {
        ("You", Color::Cyan, Alignment::Right)
    } else {
        ("Assistant", Color::Yellow, Alignment::Left)
    };

    let mut lines = vec![sender_line(label, color, Some(message.time_label()), alignment)];
    lines.extend(
        render_markdown(&message.text)
            .into_iter()
            .map(|line| line.alignment(alignment)),
    );

    if let Some(anchor) = message.reference_anchor() {
        lines.push(
            Line::from(vec![
                Span::styled(
                    "Reference",
                    Style::default().fg(Color::Blue).add_modifier(Modifier::UNDERLINED),
                ),
                Span::styled(
                    format!(" {}", app.reference_url(anchor)),
                    Style::default().fg(Color::DarkGray),
                ),
            ])
            .alignment(alignment),
        );
    }

    if let Some(score) = message.display_score() {
        lines.push(
            Line::from(Span::styled(
                format!("Score - {score}"),
                Style::default().fg(Color::Magenta),
            ))
            .alignment(alignment),
        );
    }

    lines.push(Line::default());
    lines
}

/// Three dots, one lit per frame, so the pulse walks left to right
fn progress_dots(frame: u8) -> Line<'static> {
    let spans = (0..3u8)
        .map(|i| {
            let style = if i == frame {
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            Span::styled("● ", style)
        })
        .collect::<Vec<_>>();
    Line::from(spans)
}

/// First visible column so that `cursor_col` fits in `width` columns
fn horizontal_offset(cursor_col: usize, width: usize) -> usize {
    if width == 0 || cursor_col < width {
        0
    } else {
        cursor_col - width + 1
    }
}

/// Helper to create a centered rect
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

fn render_context_tab(app: &App, frame: &mut Frame, area: Rect) {
    let card_area = centered_rect(64, 16, area);

    let card = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Span::styled(" Provide Context ", Style::default().bold()));
    let inner = card.inner(card_area);
    frame.render_widget(card, card_area);

    let [description_area, button_area, outcome_area] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Length(3),
        Constraint::Min(0),
    ])
    .areas(inner.inner(Margin {
        vertical: 0,
        horizontal: 1,
    }));

    let description = Paragraph::new(Span::styled(
        "Press Enter to submit context data",
        Style::default().fg(Color::DarkGray),
    ));
    frame.render_widget(description, description_area);

    let in_flight = app.context.is_in_flight();
    let (label, label_style, border_color) = if in_flight {
        (
            format!("{} Processing...", SPINNER[usize::from(app.animation_frame) % SPINNER.len()]),
            Style::default().fg(Color::DarkGray),
            Color::DarkGray,
        )
    } else {
        (
            "Provide Context".to_string(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            Color::Blue,
        )
    };
    let button = Paragraph::new(Span::styled(label, label_style))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border_color)),
        );
    frame.render_widget(button, button_area);

    let outcome = if let Some(text) = app.context.success_text() {
        Some((" Success ", text, Color::Green))
    } else {
        app.context.error_text().map(|text| (" Error ", text, Color::Red))
    };

    if let Some((title, text, color)) = outcome {
        let panel = Paragraph::new(text.to_string())
            .style(Style::default().fg(color))
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(color))
                    .title(Span::styled(title, Style::default().fg(color).bold())),
            );
        frame.render_widget(panel, outcome_area);
    }
}
