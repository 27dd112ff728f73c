pub mod render;
pub mod state;
pub mod views;

use crate::query::ListingTable;
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::*;
use state::{AppState, Page, TuiCommand};
use std::io::stdout;
use std::time::Duration;

/// Run the dashboard until the user quits. Blocks the calling thread; every
/// key press re-runs at most one query against `table` before the next frame.
pub fn run_tui(table: &ListingTable, state: &mut AppState, tick: Duration) -> Result<()> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = tui_loop(&mut terminal, table, state, tick);

    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

fn tui_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    table: &ListingTable,
    state: &mut AppState,
    tick: Duration,
) -> Result<()> {
    loop {
        terminal.draw(|f| render::draw(f, state))?;

        if event::poll(tick)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if let Some(cmd) = command_for(key.code) {
                    tracing::debug!(?cmd, "dashboard command");
                    if !state.apply(cmd, table) {
                        return Ok(());
                    }
                }
            }
        }
    }
}

/// Map a key to a dashboard command. Unbound keys are ignored.
pub fn command_for(code: KeyCode) -> Option<TuiCommand> {
    let cmd = match code {
        KeyCode::Char('q') | KeyCode::Esc => TuiCommand::Quit,
        KeyCode::Tab => TuiCommand::NextPage,
        KeyCode::Char('1') => TuiCommand::GotoPage(Page::Home),
        KeyCode::Char('2') => TuiCommand::GotoPage(Page::Geospatial),
        KeyCode::Char('3') => TuiCommand::GotoPage(Page::Visualization),
        KeyCode::Char('c') => TuiCommand::NextCountry,
        KeyCode::Char('C') => TuiCommand::PrevCountry,
        KeyCode::Char('s') => TuiCommand::NextSuburb,
        KeyCode::Char('S') => TuiCommand::PrevSuburb,
        KeyCode::Char('+') | KeyCode::Char('=') => TuiCommand::RaisePrice,
        KeyCode::Char('-') => TuiCommand::LowerPrice,
        KeyCode::Right | KeyCode::Char(']') => TuiCommand::NextTab,
        KeyCode::Left | KeyCode::Char('[') => TuiCommand::PrevTab,
        KeyCode::Char('t') => TuiCommand::NextPropertyType,
        KeyCode::Char('T') => TuiCommand::PrevPropertyType,
        KeyCode::Char('o') => TuiCommand::NextOccupancyWindow,
        KeyCode::Char('j') | KeyCode::Down => TuiCommand::ScrollDown,
        KeyCode::Char('k') | KeyCode::Up => TuiCommand::ScrollUp,
        _ => return None,
    };
    Some(cmd)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_bindings() {
        assert_eq!(command_for(KeyCode::Char('q')), Some(TuiCommand::Quit));
        assert_eq!(command_for(KeyCode::Char('2')), Some(TuiCommand::GotoPage(Page::Geospatial)));
        assert_eq!(command_for(KeyCode::Char('=')), Some(TuiCommand::RaisePrice));
        assert_eq!(command_for(KeyCode::Left), Some(TuiCommand::PrevTab));
        assert_eq!(command_for(KeyCode::Char('z')), None);
    }
}
