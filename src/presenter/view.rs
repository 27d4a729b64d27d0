use std::io;
use std::panic::{self, PanicHookInfo};
use std::sync::Arc;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{self, EnterAlternateScreen};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Paragraph, Tabs};
use ratatui::{DefaultTerminal, Frame, Terminal};

use super::charts::{Chart, ChartView};

const FOOTER_STYLE: Style = Style::new().fg(Color::DarkGray);
const SELECTED_STYLE: Style = Style::new().fg(Color::Yellow).add_modifier(Modifier::BOLD);

enum ViewAction {
    Continue,
    Close,
}

struct ChartBrowser<'a> {
    charts: &'a [Chart],
    selected: usize,
}

impl ChartBrowser<'_> {
    fn draw(&self, frame: &mut Frame) {
        let [tabs_area, chart_area, footer_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        let tabs = Tabs::new(self.charts.iter().map(|chart| chart.title()))
            .select(self.selected)
            .highlight_style(SELECTED_STYLE);
        frame.render_widget(tabs, tabs_area);

        self.charts[self.selected].draw(chart_area, frame.buffer_mut());

        frame.render_widget(
            Paragraph::new(Line::from(" \u{2190}/\u{2192} switch chart   q quit")).style(FOOTER_STYLE),
            footer_area,
        );
    }

    fn handle_key(&mut self, code: KeyCode) -> ViewAction {
        let count = self.charts.len();
        match code {
            KeyCode::Char('q') | KeyCode::Esc => ViewAction::Close,
            KeyCode::Right | KeyCode::Tab | KeyCode::Char('l') => {
                self.selected = (self.selected + 1) % count;
                ViewAction::Continue
            },
            KeyCode::Left | KeyCode::BackTab | KeyCode::Char('h') => {
                self.selected = (self.selected + count - 1) % count;
                ViewAction::Continue
            },
            _ => ViewAction::Continue,
        }
    }
}

type PanicHook = Box<dyn Fn(&PanicHookInfo<'_>) + Sync + Send + 'static>;

/// Runs `on_panic` ahead of the current panic hook for as long as it lives,
/// then puts the previous hook back.
struct RestoreOnPanic {
    previous: Option<Arc<PanicHook>>,
}

impl RestoreOnPanic {
    fn install(on_panic: fn()) -> RestoreOnPanic {
        let previous = Arc::new(panic::take_hook());
        let chained = Arc::clone(&previous);
        panic::set_hook(Box::new(move |info| {
            on_panic();
            chained(info);
        }));

        RestoreOnPanic {
            previous: Some(previous),
        }
    }
}

impl Drop for RestoreOnPanic {
    fn drop(&mut self) {
        // the hook cannot be swapped while unwinding
        if std::thread::panicking() {
            return;
        }

        let Some(previous) = self.previous.take() else {
            return;
        };
        drop(panic::take_hook());
        match Arc::try_unwrap(previous) {
            Ok(hook) => panic::set_hook(hook),
            Err(shared) => panic::set_hook(Box::new(move |info| shared(info))),
        }
    }
}

fn enter_terminal() -> io::Result<DefaultTerminal> {
    terminal::enable_raw_mode()?;
    execute!(io::stdout(), EnterAlternateScreen)?;
    Terminal::new(CrosstermBackend::new(io::stdout()))
}

/// Shows the charts full screen until the user closes the view. Sets up the
/// terminal and a panic hook, and restores the terminal on the way out.
pub fn run_chart_view(charts: &[Chart]) -> Result<()> {
    if charts.is_empty() {
        return Ok(());
    }

    let _hook = RestoreOnPanic::install(ratatui::restore);
    let mut terminal = match enter_terminal() {
        Ok(terminal) => terminal,
        Err(e) => {
            ratatui::restore();
            return Err(e.into());
        },
    };
    let mut browser = ChartBrowser { charts, selected: 0 };

    let result: Result<()> = loop {
        if let Err(e) = terminal.draw(|frame| browser.draw(frame)) {
            break Err(e.into());
        }

        match event::read() {
            Err(e) => break Err(e.into()),
            Ok(Event::Key(key)) => {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                    break Ok(());
                }
                match browser.handle_key(key.code) {
                    ViewAction::Close => break Ok(()),
                    ViewAction::Continue => {},
                }
            },
            _ => {},
        }
    };

    drop(terminal);
    ratatui::restore();
    result
}
