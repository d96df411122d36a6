// Main TUI application using ratatui
// Shows the playlist and the transport state, turns key presses into player
// actions and feeds the media element's notifications back into the player.

use std::io;
use std::time::Instant;

use anyhow::Context;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Gauge, List, ListItem, Paragraph},
    Frame, Terminal,
};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::warn;

use webtv_player::config::AppConfig;
use webtv_player::player::controller::Controller;
use webtv_player::player::media::MediaEvent;
use webtv_player::player::simulated::SimulatedElement;
use webtv_player::player::state::{Action, Phase};

const HELP: &str =
    "[j/k]Navigate [Enter]Select [n/p]Next/Prev [Space]Play/Pause [←/→]Seek [0-9]Scrub [↑/↓]Volume [m]Mute [q]Quit";

pub struct PlayerApp {
    controller: Controller<SimulatedElement>,
    events: UnboundedReceiver<MediaEvent>,
    cursor: usize,
    config: AppConfig,
    should_quit: bool,
    status_message: String,
}

impl PlayerApp {
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let playlist = config.playlist()?;
        let (tx, events) = mpsc::unbounded_channel();
        let element = SimulatedElement::new(tx).with_lengths(&playlist, config.default_length_secs);

        let mut controller = Controller::new(playlist);
        controller
            .attach(element)
            .context("failed to attach the media element")?;

        Ok(PlayerApp {
            controller,
            events,
            cursor: 0,
            config,
            should_quit: false,
            status_message: String::new(),
        })
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        enable_raw_mode().context("failed to enable raw mode")?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.event_loop(&mut terminal).await;

        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        result
    }

    async fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> anyhow::Result<()> {
        let mut last_tick = Instant::now();

        loop {
            terminal.draw(|f| self.draw_ui(f))?;

            // Advance the element's clock, then apply what it reported
            let now = Instant::now();
            if let Some(element) = self.controller.element_mut() {
                element.tick(now.duration_since(last_tick));
            }
            last_tick = now;
            self.controller.drain(&mut self.events)?;

            if event::poll(self.config.tick_interval())? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_input(key.code);
                    }
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn draw_ui(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(6),
                Constraint::Length(5),
                Constraint::Length(3),
            ])
            .split(frame.size());

        // Header
        let title = if self.status_message.is_empty() {
            HELP.to_string()
        } else {
            self.status_message.clone()
        };
        let header = Paragraph::new(title)
            .block(Block::default().borders(Borders::ALL).title("WebTV Player"));
        frame.render_widget(header, chunks[0]);

        // Playlist
        let selected = self.controller.state().selected();
        let items: Vec<ListItem> = self
            .controller
            .playlist()
            .iter()
            .enumerate()
            .map(|(i, video)| {
                let marker = if Some(i) == selected { "▶ " } else { "  " };
                let content = format!("{}{} [{}]", marker, video.title, video.display_duration);
                let style = if i == self.cursor {
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
                } else if Some(i) == selected {
                    Style::default().fg(Color::Green)
                } else {
                    Style::default()
                };
                ListItem::new(content).style(style)
            })
            .collect();
        let playlist = List::new(items)
            .block(Block::default().borders(Borders::ALL).title("Playlist"));
        frame.render_widget(playlist, chunks[1]);

        // Player info
        let state = self.controller.state();
        let now_playing = match self.controller.current() {
            Some(video) => format!("Now Showing: {}", video.title),
            None => "Nothing selected".to_string(),
        };
        let phase = match state.phase() {
            Phase::Idle => "⏹ Idle",
            Phase::Loading => "… Loading",
            Phase::Loaded => "⏹ Ready",
            Phase::Playing => "▶ Playing",
            Phase::Paused => "⏸ Paused",
        };
        let volume = if state.is_muted() {
            format!("{}% (muted)", (state.volume() * 100.0).round())
        } else {
            format!("{}%", (state.volume() * 100.0).round())
        };
        let player_info = format!("{}\nState: {} | Volume: {}", now_playing, phase, volume);
        let player_widget = Paragraph::new(player_info)
            .block(Block::default().borders(Borders::ALL).title("Player"));
        frame.render_widget(player_widget, chunks[2]);

        // Progress
        let label = format!(
            "{} / {}",
            format_time(state.position()),
            format_time(state.duration())
        );
        let progress = Gauge::default()
            .block(Block::default().borders(Borders::ALL))
            .gauge_style(Style::default().fg(Color::Blue))
            .ratio(state.progress())
            .label(label);
        frame.render_widget(progress, chunks[3]);
    }

    fn handle_input(&mut self, key: KeyCode) {
        self.status_message.clear();

        let action = match key {
            KeyCode::Char('q') => {
                self.should_quit = true;
                return;
            }
            KeyCode::Char('j') => {
                self.move_cursor(1);
                return;
            }
            KeyCode::Char('k') => {
                self.move_cursor(-1);
                return;
            }
            KeyCode::Enter => match self.controller.playlist().get(self.cursor) {
                Some(video) => Action::Select(video.id.clone()),
                None => return,
            },
            KeyCode::Char('n') => Action::SelectNext,
            KeyCode::Char('p') => Action::SelectPrevious,
            KeyCode::Char(' ') => Action::TogglePlayPause,
            KeyCode::Right => Action::SeekBy(self.config.seek_step_secs),
            KeyCode::Left => Action::SeekBy(-self.config.seek_step_secs),
            KeyCode::Char(digit @ '0'..='9') => {
                let tenths = f64::from(digit as u8 - b'0');
                Action::SeekTo(self.controller.state().duration() * tenths / 10.0)
            }
            KeyCode::Up => self.volume_change(self.config.volume_step),
            KeyCode::Down => self.volume_change(-self.config.volume_step),
            KeyCode::Char('m') => Action::ToggleMute,
            _ => return,
        };

        if let Err(err) = self.controller.dispatch(action) {
            warn!(error = %err, "action failed");
            self.status_message = format!("Error: {}", err);
        } else if matches!(key, KeyCode::Enter | KeyCode::Char('n') | KeyCode::Char('p')) {
            if let Some(index) = self.controller.state().selected() {
                self.cursor = index;
            }
            if let Some(video) = self.controller.current() {
                self.status_message = format!("Loading: {}...", video.title);
            }
        }
    }

    fn volume_change(&self, delta: f64) -> Action {
        // Round to whole percents so repeated steps land exactly on 0.0
        let volume = ((self.controller.state().volume() + delta) * 100.0).round() / 100.0;
        Action::SetVolume(volume.clamp(0.0, 1.0))
    }

    fn move_cursor(&mut self, delta: isize) {
        let len = self.controller.playlist().len() as isize;
        self.cursor = (self.cursor as isize + delta).rem_euclid(len) as usize;
    }
}

fn format_time(seconds: f64) -> String {
    let mins = (seconds / 60.0) as u64;
    let secs = (seconds % 60.0) as u64;
    format!("{:02}:{:02}", mins, secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn app() -> PlayerApp {
        PlayerApp::new(AppConfig::default()).unwrap()
    }

    // Finishes the pending load so the element reports its duration
    fn settle(app: &mut PlayerApp) {
        app.controller.element_mut().unwrap().tick(Duration::ZERO);
        app.controller.drain(&mut app.events).unwrap();
    }

    #[test]
    fn test_cursor_wraps_and_enter_selects() {
        let mut app = app();

        app.handle_input(KeyCode::Char('k'));
        assert_eq!(3, app.cursor);
        app.handle_input(KeyCode::Char('j'));
        assert_eq!(0, app.cursor);

        app.handle_input(KeyCode::Char('k'));
        app.handle_input(KeyCode::Enter);
        assert_eq!("video04", app.controller.current().unwrap().id);
        assert_eq!("Loading: Encerramento...", app.status_message);

        app.handle_input(KeyCode::Char('n'));
        assert_eq!(0, app.cursor);
    }

    #[test]
    fn test_digit_keys_scrub_by_tenths() {
        let mut app = app();
        settle(&mut app);
        assert_eq!(45.0, app.controller.state().duration());

        app.handle_input(KeyCode::Char('5'));
        assert_eq!(22.5, app.controller.state().position());

        app.handle_input(KeyCode::Char('0'));
        assert_eq!(0.0, app.controller.state().position());
    }

    #[test]
    fn test_volume_keys_step_down_to_mute() {
        let mut app = app();

        for _ in 0..20 {
            app.handle_input(KeyCode::Down);
        }
        assert_eq!(0.0, app.controller.state().volume());
        assert!(app.controller.state().is_muted());

        // Raising the volume keeps the mute flag
        app.handle_input(KeyCode::Up);
        assert_eq!(0.05, app.controller.state().volume());
        assert!(app.controller.state().is_muted());

        app.handle_input(KeyCode::Char('m'));
        assert!(!app.controller.state().is_muted());
    }

    #[test]
    fn test_quit_key() {
        let mut app = app();

        app.handle_input(KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn test_format_time() {
        assert_eq!("00:00", format_time(0.0));
        assert_eq!("01:05", format_time(65.4));
        assert_eq!("61:01", format_time(3661.0));
    }
}
