//! Terminal rendering for the intro and chat screens.

use ratatui::layout::{Alignment, Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;
use unicode_width::UnicodeWidthStr;

use crate::core::session::Screen;
use crate::ui::chat_loop::ChatApp;

/// Shown on error bubbles so the user has somewhere to go.
pub const CONTACT_URL: &str = "https://www.messenger.com/e2ee/t/9899403416776668";

pub fn ui(f: &mut Frame, app: &ChatApp) {
    match app.session.screen() {
        Screen::Intro => draw_intro(f),
        Screen::Chatting => draw_chat(f, app),
    }
}

fn draw_intro(f: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(30),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(f.area());

    let lines = vec![
        Line::from(Span::styled(
            "Welcome to SERA AI",
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("Meet SERA AI, your smart assistant powered by Gemini."),
        Line::from("Whether you need answers, ideas, or just a friendly chat,"),
        Line::from("SERA AI is ready to assist you."),
        Line::from(""),
        Line::from(Span::styled(
            "Press Enter to start chatting. Ctrl+C quits.",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let intro = Paragraph::new(lines).alignment(Alignment::Center);
    f.render_widget(intro, chunks[1]);

    let footer = Paragraph::new(Span::styled(
        "SERA AI | Copyright © 2025.",
        Style::default().fg(Color::DarkGray),
    ))
    .alignment(Alignment::Center);
    f.render_widget(footer, chunks[2]);
}

/// Project the transcript into display lines. Assistant text goes through
/// the reveal state, so a message in mid-animation shows only its prefix
/// plus a block cursor.
pub fn build_display_lines(app: &ChatApp) -> Vec<Line<'static>> {
    let messages = app.session.messages();
    let mut lines = Vec::new();

    if messages.is_empty() {
        lines.push(Line::from(Span::styled(
            "Say hello to SERA AI!",
            Style::default().fg(Color::DarkGray),
        )));
        return lines;
    }

    for (idx, msg) in messages.iter().enumerate() {
        if msg.is_user() {
            lines.push(Line::from(vec![
                Span::styled(
                    "You: ",
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(msg.text.clone(), Style::default().fg(Color::Cyan)),
            ]));
        } else {
            let revealing = app.reveals.is_revealing(idx);
            let mut visible = app.reveals.visible(idx, &msg.text).to_string();
            if revealing {
                visible.push('▌');
            }

            let body_style = if msg.is_error {
                Style::default().fg(Color::Red)
            } else {
                Style::default().fg(Color::White)
            };

            let mut first = true;
            for content_line in visible.lines() {
                if first {
                    lines.push(Line::from(vec![
                        Span::styled(
                            "SERA: ",
                            Style::default()
                                .fg(Color::Green)
                                .add_modifier(Modifier::BOLD),
                        ),
                        Span::styled(content_line.to_string(), body_style),
                    ]));
                    first = false;
                } else {
                    lines.push(Line::from(Span::styled(
                        content_line.to_string(),
                        body_style,
                    )));
                }
            }
            if first {
                // Empty visible text still gets its prefix line.
                lines.push(Line::from(Span::styled(
                    "SERA: ",
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                )));
            }

            if let Some(image) = &msg.image {
                lines.push(Line::from(Span::styled(
                    format!("[image] {image}"),
                    Style::default().fg(Color::DarkGray),
                )));
            }
            if msg.is_error {
                lines.push(Line::from(Span::styled(
                    format!("Contact the developer: {CONTACT_URL}"),
                    Style::default().fg(Color::DarkGray),
                )));
            }
        }
        lines.push(Line::from(""));
    }

    if app.session.is_loading() {
        lines.push(Line::from(Span::styled(
            "SERA is thinking…",
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )));
    }

    lines
}

fn draw_chat(f: &mut Frame, app: &ChatApp) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(f.area());

    let lines = build_display_lines(app);

    let available_height = chunks[0].height.saturating_sub(1);
    let total_lines = lines.len() as u16;
    let max_offset = total_lines.saturating_sub(available_height);
    let scroll_offset = if app.auto_scroll {
        max_offset
    } else {
        app.scroll_offset.min(max_offset)
    };

    let transcript = Paragraph::new(lines)
        .block(Block::default().title("SERA AI"))
        .wrap(Wrap { trim: false })
        .scroll((scroll_offset, 0));
    f.render_widget(transcript, chunks[0]);

    let input = Paragraph::new(app.session.input())
        .style(Style::default().fg(Color::Yellow))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Ask SERA... (Enter to send, Ctrl+C to quit)"),
        );
    f.render_widget(input, chunks[1]);

    let cursor_x = chunks[1].x + app.session.input().width() as u16 + 1;
    f.set_cursor_position((cursor_x.min(chunks[1].right().saturating_sub(2)), chunks[1].y + 1));
}
