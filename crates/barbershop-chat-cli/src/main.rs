//! BarberShop chat - terminal front end for the sales assistant.
//!
//! This is the entry point for the `barberchat` binary.

mod app;
mod ui;

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use barbershop_chat_provider::{connect, ProviderConfig, ProviderKind};
use barbershop_chat_session::{ChatController, ChatEvent, ChatSettings, DEFAULT_WELCOME};
use clap::Parser;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::mpsc;

use app::App;

/// Persona and sales script used when no prompt file is given.
const DEFAULT_PROMPT: &str = include_str!("../prompts/ana.md");

/// BarberShop chat - talk to Ana, the BarberShop sales assistant.
#[derive(Parser, Debug)]
#[command(name = "barberchat")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// API key for the completion provider.
    #[arg(long, env = "BARBERCHAT_API_KEY", default_value = "", hide_env_values = true)]
    api_key: String,

    /// Completion provider (groq or gemini).
    #[arg(long, env = "BARBERCHAT_PROVIDER", default_value = "groq")]
    provider: ProviderKind,

    /// File with the system prompt. Defaults to the bundled Ana script.
    #[arg(long, env = "BARBERCHAT_SYSTEM_PROMPT")]
    system_prompt: Option<PathBuf>,

    /// Override the provider's API root.
    #[arg(long, env = "BARBERCHAT_BASE_URL")]
    base_url: Option<String>,

    /// Override the model for the first attempt.
    #[arg(long, env = "BARBERCHAT_MODEL")]
    model: Option<String>,

    /// Override the model for the fallback attempt.
    #[arg(long, env = "BARBERCHAT_FALLBACK_MODEL")]
    fallback_model: Option<String>,

    /// Per-attempt request timeout in seconds.
    #[arg(long, env = "BARBERCHAT_TIMEOUT", default_value = "30")]
    timeout: u64,

    /// Open with a bot greeting, like the floating widget.
    #[arg(long, default_value = "false")]
    greeting: bool,

    /// Enable debug logging.
    #[arg(long, default_value = "false")]
    debug: bool,
}

impl Args {
    fn provider_config(&self) -> ProviderConfig {
        let mut config = ProviderConfig::new(self.provider);
        config.base_url.clone_from(&self.base_url);
        config.primary_model.clone_from(&self.model);
        config.fallback_model.clone_from(&self.fallback_model);
        config.timeout_secs = self.timeout;
        config
    }

    fn chat_settings(&self) -> anyhow::Result<ChatSettings> {
        let system_prompt = match &self.system_prompt {
            Some(path) => ChatSettings::load_system_prompt(path)?,
            None => DEFAULT_PROMPT.trim().to_string(),
        };
        let mut settings = ChatSettings::new(self.api_key.clone(), system_prompt);
        if self.greeting {
            settings = settings.with_welcome(DEFAULT_WELCOME);
        }
        Ok(settings)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                "barberchat=debug,barbershop_chat_session=debug,barbershop_chat_provider=debug,warn",
            )
            .with_writer(std::io::stderr)
            .init();
    }

    // Settings and client are validated before the terminal is taken over
    let settings = args.chat_settings()?;
    let client = connect(&args.provider_config(), &args.api_key)?;
    let (chat, events) = ChatController::new(settings, client);
    let mut app = App::new(chat, args.provider);

    tracing::debug!(provider = %args.provider, "Starting chat");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_event_loop(&mut terminal, &mut app, events).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    result
}

/// Main event loop.
///
/// Terminal input is polled on a short tick. Chat events (replies and reveal
/// ticks) redraw immediately.
async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    mut events: mpsc::Receiver<ChatEvent>,
) -> anyhow::Result<()> {
    loop {
        app.tick_animation();
        terminal.draw(|f| ui::render(f, app))?;

        // Faster ticks keep the typing indicator moving
        let tick_rate = if app.is_busy() {
            Duration::from_millis(80)
        } else {
            Duration::from_millis(100)
        };

        tokio::select! {
            () = tokio::time::sleep(tick_rate) => {
                while event::poll(Duration::from_millis(0))? {
                    handle_input(app, event::read()?);
                }
            }

            Some(event) = events.recv() => {
                if app.handle_chat_event(event) {
                    terminal.draw(|f| ui::render(f, app))?;
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Handle terminal input events.
fn handle_input(app: &mut App, event: Event) {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(app, key),
        Event::Mouse(mouse) => match mouse.kind {
            MouseEventKind::ScrollUp => app.scroll_chat_up(3),
            MouseEventKind::ScrollDown => app.scroll_chat_down(3),
            _ => {}
        },
        _ => {}
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Esc => app.should_quit = true,
        KeyCode::Char('c') if ctrl => app.should_quit = true,
        KeyCode::Char('l') if ctrl => app.clear_conversation(),
        KeyCode::Enter => app.submit(),
        KeyCode::Tab => app.next_suggestion(),
        KeyCode::BackTab => app.prev_suggestion(),
        KeyCode::PageUp => app.scroll_chat_up(10),
        KeyCode::PageDown => app.scroll_chat_down(10),
        KeyCode::Backspace => app.delete_char(),
        KeyCode::Delete => app.delete_char_forward(),
        KeyCode::Left => app.move_cursor_left(),
        KeyCode::Right => app.move_cursor_right(),
        KeyCode::Home => app.move_cursor_start(),
        KeyCode::End => app.move_cursor_end(),
        KeyCode::Char(c) if !ctrl => app.insert_char(c),
        _ => {}
    }
}
