use std::time::Instant;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
    Frame,
};

use drumsheet::{
    history::HitJudgement,
    pad::PadId,
    session::EngineState,
    sheet::Judgement,
    stats::AccuracyBand,
};

use crate::App;

const HORIZONTAL_MARGIN: u16 = 2;
const VERTICAL_MARGIN: u16 = 1;
const FEED_WIDTH: u16 = 34;

/// Short-lived highlight on a pad after it is struck. Cleared by the event
/// loop once `until` has passed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PadFlash {
    pub judgement: HitJudgement,
    pub until: Instant,
}

impl PadFlash {
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.until
    }
}

fn judgement_color(judgement: HitJudgement) -> Color {
    match judgement {
        HitJudgement::Correct => Color::Green,
        HitJudgement::Wrong => Color::Red,
        HitJudgement::Neutral => Color::Blue,
    }
}

fn judgement_symbol(judgement: HitJudgement) -> &'static str {
    match judgement {
        HitJudgement::Correct => "✓",
        HitJudgement::Wrong => "✗",
        HitJudgement::Neutral => "·",
    }
}

pub fn band_color(band: AccuracyBand) -> Color {
    match band {
        AccuracyBand::High => Color::Green,
        AccuracyBand::Medium => Color::Yellow,
        AccuracyBand::Low => Color::Red,
        AccuracyBand::Neutral => Color::Gray,
    }
}

pub fn draw(app: &App, f: &mut Frame) {
    f.render_widget(app, f.area());
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let snap = self.engine.snapshot();
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_style = Style::default().add_modifier(Modifier::DIM);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(1), // title
                Constraint::Min(8),    // body
                Constraint::Length(1), // status
                Constraint::Length(1), // legend
            ])
            .split(area);

        let state_style = match snap.state {
            EngineState::Running => bold_style.fg(Color::Yellow),
            EngineState::Complete => bold_style.fg(Color::Green),
            EngineState::Idle => dim_style,
        };
        Paragraph::new(Line::from(vec![
            Span::styled("drumsheet", bold_style.fg(Color::Cyan)),
            Span::styled("  sheet matcher · live tracking  ", dim_style),
            Span::styled(snap.state.to_string().to_uppercase(), state_style),
        ]))
        .render(rows[0], buf);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(30), Constraint::Length(FEED_WIDTH)])
            .split(rows[1]);

        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(3)])
            .split(columns[0]);

        render_pads(self, left[0], buf);

        // sheet
        let sheet_spans: Vec<Span> = snap
            .steps
            .iter()
            .enumerate()
            .flat_map(|(idx, step)| {
                let style = if idx == snap.cursor && snap.is_running {
                    bold_style.fg(Color::Black).bg(Color::Yellow)
                } else {
                    match step.judgement {
                        Judgement::Correct => bold_style.fg(Color::Green),
                        Judgement::Wrong => bold_style.fg(Color::Red),
                        Judgement::Pending if idx < snap.cursor => dim_style,
                        Judgement::Pending => bold_style.fg(Color::Gray),
                    }
                };
                [Span::styled(format!(" {} ", step.expected), style), Span::raw(" ")]
            })
            .collect();

        let sheet_text = if sheet_spans.is_empty() {
            Line::from(Span::styled("no sheet loaded", italic_style))
        } else {
            Line::from(sheet_spans)
        };
        Paragraph::new(sheet_text)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title("Sheet"))
            .render(left[1], buf);

        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(7), Constraint::Min(3)])
            .split(columns[1]);

        // stats
        let (done, total) = snap.progress();
        let stats = snap.stats;
        let accuracy_style = bold_style.fg(band_color(stats.band()));
        let stats_text = Text::from(vec![
            Line::from(format!("Progress  {done} / {total}")),
            Line::from(format!("Attempts  {}", stats.attempts)),
            Line::from(Span::styled(
                format!("Correct   {}", stats.correct),
                Style::default().fg(Color::Green),
            )),
            Line::from(Span::styled(
                format!("Wrong     {}", stats.wrong),
                Style::default().fg(Color::Red),
            )),
            Line::from(Span::styled(format!("Accuracy  {}%", stats.accuracy), accuracy_style)),
        ]);
        Paragraph::new(stats_text)
            .block(Block::default().borders(Borders::ALL).title("Stats"))
            .render(right[0], buf);

        // live feed, newest first
        let feed: Vec<Line> = self
            .engine
            .history()
            .iter_recent()
            .map(|entry| {
                Line::from(vec![
                    Span::styled(
                        format!("{} {:<6}", judgement_symbol(entry.judgement), entry.display_token),
                        bold_style.fg(judgement_color(entry.judgement)),
                    ),
                    Span::styled(entry.clock(), dim_style),
                ])
            })
            .collect();
        Paragraph::new(Text::from(feed))
            .block(Block::default().borders(Borders::ALL).title("Live Hit Feed"))
            .render(right[1], buf);

        if let Some(text) = &self.prompt {
            Paragraph::new(Line::from(vec![
                Span::styled("load sheet or .txt path: ", bold_style.fg(Color::Cyan)),
                Span::raw(format!("{text}_")),
            ]))
            .render(rows[2], buf);
        } else if let Some(status) = &self.status {
            Paragraph::new(Span::styled(status.as_str(), bold_style.fg(Color::Yellow)))
                .alignment(Alignment::Center)
                .render(rows[2], buf);
        }

        let legend = if self.prompt.is_some() {
            "(enter) load / (esc) cancel"
        } else {
            "(space) start/pause / (r)eset / re(l)oad / (o)pen / (1)(2)(3) hit, scored like the pads / (esc)ape"
        };
        Paragraph::new(Span::styled(legend, italic_style))
            .alignment(Alignment::Center)
            .render(rows[3], buf);
    }
}

fn render_pads(app: &App, area: Rect, buf: &mut Buffer) {
    let cells = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(area);

    for (pad, cell) in PadId::ALL.into_iter().zip(cells.iter()) {
        let style = match app.flashes[pad.index()] {
            Some(flash) => Style::default()
                .fg(Color::Black)
                .bg(judgement_color(flash.judgement))
                .add_modifier(Modifier::BOLD),
            None => Style::default(),
        };
        Paragraph::new(Text::from(vec![
            Line::from(Span::styled(pad.name(), Style::default().add_modifier(Modifier::BOLD))),
            Line::from(format!("[{}]", pad.device_code())),
        ]))
        .alignment(Alignment::Center)
        .style(style)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(pad.to_string()),
        )
        .render(*cell, buf);
    }
}
