//! Full-screen bar chart of cigarettes per day.

use crate::model::ChartPoint;
use anyhow::Result;
use crossterm::{
    cursor::Show,
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::Line,
    widgets::{Bar, BarChart, BarGroup, Block, Paragraph},
};

pub const CHART_TITLE: &str = "Cigarettes per Day for Each Smoker";

/// One bar per smoker, labelled by id, with the count printed on the bar.
pub fn bar_chart(points: &[ChartPoint]) -> BarChart<'static> {
    let bars: Vec<Bar<'static>> = points
        .iter()
        .map(|p| {
            Bar::default()
                .value(u64::try_from(p.cigarettes_per_day).unwrap_or(0))
                .label(Line::from(p.smoker_id.to_string()))
                .text_value(p.cigarettes_per_day.to_string())
        })
        .collect();

    BarChart::default()
        .block(
            Block::bordered()
                .title(CHART_TITLE)
                .title_bottom("x: Smoker ID | y: Cigarettes per Day"),
        )
        .data(BarGroup::default().bars(&bars))
        .bar_width(5)
        .bar_gap(2)
        .bar_style(Style::default().fg(Color::LightBlue))
        .value_style(Style::default().fg(Color::Black).bg(Color::LightBlue))
}

pub fn draw_chart(f: &mut Frame, points: &[ChartPoint]) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)].as_ref())
        .split(f.area());

    f.render_widget(bar_chart(points), chunks[0]);
    f.render_widget(
        Paragraph::new("Press any key to return to the menu.")
            .style(Style::default().fg(Color::DarkGray)),
        chunks[1],
    );
}

/// Runs its closure when dropped, so early returns still undo terminal setup.
struct Restore<F: FnMut()>(F);

impl<F: FnMut()> Drop for Restore<F> {
    fn drop(&mut self) {
        (self.0)()
    }
}

fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(std::io::stdout(), LeaveAlternateScreen, Show);
}

/// Shows the chart on the alternate screen and blocks until a key is pressed.
pub fn show_chart(points: &[ChartPoint]) -> Result<()> {
    enable_raw_mode()?;
    let _restore = Restore(restore_terminal);

    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    run_chart(&mut terminal, points)
}

fn run_chart(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    points: &[ChartPoint],
) -> Result<()> {
    loop {
        terminal.draw(|f| draw_chart(f, points))?;
        if let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            return Ok(());
        }
    }
}
