//! Terminal preview of a rendered sequence
//!
//! Shows the block layout per axis, the waveform of the visible window and
//! its spectrum. The signal is rendered up front; the preview only moves a
//! window over it.

mod header;
mod spectrum;
pub mod state;
mod timeline;
mod waveform;

use std::time::Duration;

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
    DefaultTerminal, Frame,
};

use gradsonic::Rendered;

pub use state::{PreviewInit, View};

use header::{render_header, SignalStats};
use spectrum::{render_spectrum, SpectrumAnalyzer};
use timeline::render_timeline;
use waveform::render_waveform;

pub struct PreviewApp<'a> {
    init: PreviewInit,
    samples: &'a [f64],
    view: View,
    analyzer: SpectrumAnalyzer,
    /// Spectrum is recomputed only when the view moves
    dirty: bool,
    should_quit: bool,
}

impl<'a> PreviewApp<'a> {
    pub fn new(init: PreviewInit, rendered: &'a Rendered) -> Self {
        Self {
            analyzer: SpectrumAnalyzer::new(init.rate),
            init,
            samples: &rendered.samples,
            view: View::full(rendered.samples.len()),
            dirty: true,
            should_quit: false,
        }
    }

    /// Run the event loop until the user quits.
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            if self.dirty {
                self.analyzer.update(self.visible());
                self.dirty = false;
            }

            terminal.draw(|frame| self.render(frame))?;

            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        Ok(())
    }

    fn visible(&self) -> &'a [f64] {
        &self.samples[self.view.offset..self.view.end()]
    }

    fn handle_key(&mut self, key: KeyCode) {
        let before = self.view;
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Left | KeyCode::Char('h') => self.view.scroll(-1),
            KeyCode::Right | KeyCode::Char('l') => self.view.scroll(1),
            KeyCode::Char('+') | KeyCode::Char('=') => self.view.zoom_in(),
            KeyCode::Char('-') => self.view.zoom_out(),
            KeyCode::Char('0') => self.view = View::full(self.samples.len()),
            _ => {}
        }
        self.dirty |= self.view != before;
    }

    fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Length(6), // Timeline
                Constraint::Min(8),    // Waveform
                Constraint::Length(10), // Spectrum
                Constraint::Length(1), // Help
            ])
            .split(frame.area());

        let visible = self.visible();
        render_header(
            frame,
            chunks[0],
            &self.init,
            &self.view,
            &SignalStats::from_samples(visible),
        );

        let timeline_block = Block::default().title(" Blocks ").borders(Borders::ALL);
        let timeline_inner = timeline_block.inner(chunks[1]);
        frame.render_widget(timeline_block, chunks[1]);
        render_timeline(frame, timeline_inner, &self.init, &self.view);

        render_waveform(frame, chunks[2], &self.init, visible, self.view.offset);
        render_spectrum(frame, chunks[3], self.analyzer.data());

        let help = Paragraph::new(" [Q] Quit  [←/→] Scroll  [+/-] Zoom  [0] Reset view")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[4]);
    }
}
