//! Main chat event loop.
//!
//! The loop owns the terminal, the session, and the reveal clock. Relay
//! calls run on spawned tasks and report back over an mpsc channel, so the
//! UI keeps accepting input while a call is outstanding. Reveal state lives
//! here too: when the loop returns, every pending tick goes with it.

use std::io;
use std::time::Instant;

use ratatui::backend::CrosstermBackend;
use ratatui::crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::crossterm::execute;
use ratatui::crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::Terminal;
use tokio::sync::mpsc;

use crate::api::client::RelayClient;
use crate::core::config::Config;
use crate::core::session::{ChatSession, Screen, SessionEvent};
use crate::ui::renderer::{build_display_lines, ui};
use crate::ui::typewriter::{RevealSet, REVEAL_INTERVAL};

/// Everything the renderer and the event loop share.
pub struct ChatApp {
    pub session: ChatSession,
    pub reveals: RevealSet,
    pub scroll_offset: u16,
    pub auto_scroll: bool,
}

impl Default for ChatApp {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatApp {
    pub fn new() -> Self {
        Self {
            session: ChatSession::new(),
            reveals: RevealSet::new(),
            scroll_offset: 0,
            auto_scroll: true,
        }
    }

    /// Register every assistant message with the reveal state. New messages
    /// start animating; existing entries keep their progress.
    pub fn sync_reveals(&mut self) {
        for (idx, msg) in self.session.messages().iter().enumerate() {
            if !msg.is_user() {
                self.reveals.ensure(idx, &msg.text);
            }
        }
    }

    fn max_scroll_offset(&self, available_height: u16) -> u16 {
        let total_lines = build_display_lines(self).len() as u16;
        total_lines.saturating_sub(available_height)
    }

    pub fn scroll_up(&mut self, available_height: u16) {
        if self.auto_scroll {
            self.scroll_offset = self.max_scroll_offset(available_height);
            self.auto_scroll = false;
        }
        self.scroll_offset = self.scroll_offset.saturating_sub(1);
    }

    pub fn scroll_down(&mut self, available_height: u16) {
        let max = self.max_scroll_offset(available_height);
        self.scroll_offset = self.scroll_offset.saturating_add(1).min(max);
        if self.scroll_offset >= max {
            self.auto_scroll = true;
        }
    }
}

/// Run the chat client until the user quits.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let client = RelayClient::new(config.relay_url.clone());
    let mut app = ChatApp::new();
    let (tx, mut rx) = mpsc::unbounded_channel::<SessionEvent>();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, &mut app, &client, &tx, &mut rx).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut ChatApp,
    client: &RelayClient,
    tx: &mpsc::UnboundedSender<SessionEvent>,
    rx: &mut mpsc::UnboundedReceiver<SessionEvent>,
) -> anyhow::Result<()> {
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui(f, app))?;

        let timeout = REVEAL_INTERVAL.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    let viewport = viewport_height(terminal);
                    if handle_key(key, app, client, tx, viewport) == LoopAction::Quit {
                        return Ok(());
                    }
                }
            }
        }

        if last_tick.elapsed() >= REVEAL_INTERVAL {
            app.reveals.tick();
            last_tick = Instant::now();
        }

        while let Ok(event) = rx.try_recv() {
            app.session.apply(event);
            app.sync_reveals();
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum LoopAction {
    Continue,
    Quit,
}

fn handle_key(
    key: KeyEvent,
    app: &mut ChatApp,
    client: &RelayClient,
    tx: &mpsc::UnboundedSender<SessionEvent>,
    viewport_height: u16,
) -> LoopAction {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match app.session.screen() {
        Screen::Intro => match key.code {
            KeyCode::Enter => {
                app.session.start_chat();
                LoopAction::Continue
            }
            KeyCode::Esc => LoopAction::Quit,
            KeyCode::Char('c') if ctrl => LoopAction::Quit,
            _ => LoopAction::Continue,
        },
        Screen::Chatting => match key.code {
            KeyCode::Char('c') if ctrl => LoopAction::Quit,
            KeyCode::Enter => {
                dispatch_send(app, client, tx);
                LoopAction::Continue
            }
            KeyCode::Char(c) => {
                app.session.push_input(c);
                LoopAction::Continue
            }
            KeyCode::Backspace => {
                app.session.pop_input();
                LoopAction::Continue
            }
            KeyCode::Up => {
                app.scroll_up(viewport_height);
                LoopAction::Continue
            }
            KeyCode::Down => {
                app.scroll_down(viewport_height);
                LoopAction::Continue
            }
            _ => LoopAction::Continue,
        },
    }
}

/// Kick off a relay call for the current input.
///
/// Sends are not serialized: pressing Enter while a call is outstanding
/// starts another one, and replies land in completion order.
fn dispatch_send(app: &mut ChatApp, client: &RelayClient, tx: &mpsc::UnboundedSender<SessionEvent>) {
    let Some(outbound) = app.session.send() else {
        return;
    };
    app.auto_scroll = true;

    let client = client.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let event = match client.send(outbound.message, outbound.history).await {
            Ok(reply) => SessionEvent::Reply(reply),
            Err(_) => SessionEvent::TransportFailed,
        };
        let _ = tx.send(event);
    });
}

/// Transcript rows visible above the input bar (3 rows) and the title row.
fn viewport_height(terminal: &Terminal<CrosstermBackend<io::Stdout>>) -> u16 {
    let height = terminal.size().map(|s| s.height).unwrap_or_default();
    height.saturating_sub(3).saturating_sub(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ChatReply;
    use crate::core::message::Message;

    fn app_in_chat() -> ChatApp {
        let mut app = ChatApp::new();
        app.session.start_chat();
        app
    }

    #[test]
    fn sync_reveals_registers_assistant_messages_only() {
        let mut app = app_in_chat();
        app.session.append_message(Message::user("Hello"));
        app.session.append_message(Message::assistant("Hi there!"));
        app.sync_reveals();

        assert!(!app.reveals.is_revealing(0));
        assert!(app.reveals.is_revealing(1));
        assert_eq!(app.reveals.visible(1, "Hi there!"), "");
    }

    #[test]
    fn reveal_progress_survives_later_syncs() {
        let mut app = app_in_chat();
        app.session.append_message(Message::assistant("Hi there!"));
        app.sync_reveals();
        app.reveals.tick();
        app.reveals.tick();

        app.session.append_message(Message::user("more"));
        app.sync_reveals();
        assert_eq!(app.reveals.visible(0, "Hi there!"), "Hi");
    }

    #[test]
    fn applying_a_reply_then_syncing_starts_its_animation() {
        let mut app = app_in_chat();
        for c in "Hello".chars() {
            app.session.push_input(c);
        }
        app.session.send().unwrap();
        app.session.apply(SessionEvent::Reply(ChatReply {
            reply: "Hi there!".into(),
            image: None,
        }));
        app.sync_reveals();

        assert!(app.reveals.is_revealing(1));
        assert!(!app.session.is_loading());
    }

    #[test]
    fn scrolling_up_leaves_auto_scroll_and_down_restores_it() {
        let mut app = app_in_chat();
        for i in 0..20 {
            app.session.append_message(Message::user(format!("msg {i}")));
        }
        assert!(app.auto_scroll);

        app.scroll_up(5);
        assert!(!app.auto_scroll);
        let after_up = app.scroll_offset;

        app.scroll_down(5);
        app.scroll_down(5);
        assert!(app.scroll_offset > after_up || app.auto_scroll);

        while !app.auto_scroll {
            app.scroll_down(5);
        }
        assert!(app.auto_scroll);
    }

    #[test]
    fn scroll_offset_never_exceeds_the_transcript() {
        let mut app = app_in_chat();
        app.session.append_message(Message::user("only one"));
        app.scroll_up(50);
        assert_eq!(app.scroll_offset, 0);
        app.scroll_down(50);
        assert!(app.auto_scroll);
    }
}
