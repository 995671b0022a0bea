// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use banview_app::{
    BanRecord, BanSnapshot, FilterEngine, FilterReport, Page, RecordField, SelectController,
    SelectEvent, SelectSetting, WidgetId,
};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Row, Table};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use time::OffsetDateTime;

/// Delay before a committed criterion is read back from the page.
const CRITERIA_SYNC_DELAY: Duration = Duration::from_millis(10);
const STATUS_CLEAR_DELAY: Duration = Duration::from_secs(4);

/// Where the ban data comes from. Sources are local by design: a snapshot
/// file or seeded demo data, never a server.
pub trait BanSource {
    fn load_snapshot(&mut self) -> Result<BanSnapshot>;
    /// Bans for one instances-widget value; `"all"` means every instance.
    fn load_bans(&mut self, instance: &str) -> Result<Vec<BanRecord>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub show_totals: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self { show_totals: true }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
    /// Re-read the currently displayed period/reason values into the
    /// filter engine. Deliberately carries no payload: the handler always
    /// reads live display text, so late or duplicate deliveries are
    /// harmless.
    SyncCriteria,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewData {
    /// 0 is the keyword input, `1 + i` is `page.selects[i]`.
    pub focus: usize,
    pub option_cursor: usize,
    pub status_line: Option<String>,
    pub status_token: u64,
    pub report: FilterReport,
    pub now: OffsetDateTime,
}

impl ViewData {
    pub fn new(now: OffsetDateTime) -> Self {
        Self {
            focus: 0,
            option_cursor: 0,
            status_line: None,
            status_token: 0,
            report: FilterReport::default(),
            now,
        }
    }
}

pub fn run_app<S: BanSource>(source: &mut S, options: &RunOptions) -> Result<()> {
    let snapshot = source.load_snapshot().context("load ban snapshot")?;
    let now = OffsetDateTime::now_utc();
    let mut page = banview_render::render_page(&snapshot, now).context("render ban page")?;
    let mut engine = FilterEngine::default();
    let mut controller = SelectController::default();
    let mut view = ViewData::new(now);
    view.report = engine.recompute(&mut page);

    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let (internal_tx, internal_rx) = mpsc::channel();

    let mut result = Ok(());
    loop {
        process_internal_events(&mut page, &mut engine, &mut view, &internal_tx, &internal_rx);

        if let Err(error) = terminal.draw(|frame| render(frame, &page, &view, options)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = event::poll(Duration::from_millis(120)).context("poll event")?;
        if has_event {
            match event::read().context("read event")? {
                Event::Key(key) => {
                    if handle_key_event(
                        &mut page,
                        &mut engine,
                        &mut controller,
                        source,
                        &mut view,
                        &internal_tx,
                        key,
                    ) {
                        break;
                    }
                }
                Event::Resize(_, _) => {}
                _ => {}
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn process_internal_events(
    page: &mut Page,
    engine: &mut FilterEngine,
    view: &mut ViewData,
    tx: &Sender<InternalEvent>,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view.status_token => {
                view.status_line = None;
            }
            InternalEvent::ClearStatus { .. } => {}
            InternalEvent::SyncCriteria => sync_criteria(page, engine, view, tx),
        }
    }
}

/// The deferred read-back: applies whatever the period/reason widgets
/// display right now. A widget whose write never landed simply yields its
/// previous value.
fn sync_criteria(
    page: &mut Page,
    engine: &mut FilterEngine,
    view: &mut ViewData,
    tx: &Sender<InternalEvent>,
) {
    let period = page
        .displayed_value(SelectSetting::Period.as_str())
        .map(str::to_owned);
    let reason = page
        .displayed_value(SelectSetting::Reason.as_str())
        .map(str::to_owned);

    let mut report = None;
    if let Some(period) = period {
        report = Some(engine.set_period(page, &period));
    }
    if let Some(reason) = reason {
        report = Some(engine.set_reason(page, &reason));
    }
    if let Some(report) = report {
        apply_report(view, tx, report);
    }
}

fn apply_report(view: &mut ViewData, tx: &Sender<InternalEvent>, report: FilterReport) {
    if !report.skipped.is_empty() {
        let first = report.skipped[0];
        emit_status(
            view,
            tx,
            format!(
                "{} malformed ban(s) skipped; record {} is missing {}",
                report.skipped.len(),
                first.record.get(),
                first.field.as_str(),
            ),
        );
    }
    view.report = report;
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_CLEAR_DELAY);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

/// Schedules the criteria read-back strictly after the commit that
/// requested it. Pending syncs are never cancelled; the handler is
/// idempotent instead.
fn schedule_criteria_sync(internal_tx: &Sender<InternalEvent>) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(CRITERIA_SYNC_DELAY);
        let _ = sender.send(InternalEvent::SyncCriteria);
    });
}

fn emit_status(view: &mut ViewData, internal_tx: &Sender<InternalEvent>, message: impl Into<String>) {
    view.status_line = Some(message.into());
    view.status_token = view.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view.status_token);
}

fn handle_key_event<S: BanSource>(
    page: &mut Page,
    engine: &mut FilterEngine,
    controller: &mut SelectController,
    source: &mut S,
    view: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if key.code == KeyCode::Char('r') && key.modifiers.contains(KeyModifiers::CONTROL) {
        let instance = page
            .displayed_value(SelectSetting::Instances.as_str())
            .unwrap_or(banview_app::FilterCriteria::UNCONSTRAINED)
            .to_owned();
        reload_records(page, engine, source, view, internal_tx, &instance);
        return false;
    }

    match key.code {
        KeyCode::Tab => {
            view.focus = (view.focus + 1) % (page.selects.len() + 1);
        }
        KeyCode::BackTab => {
            let targets = page.selects.len() + 1;
            view.focus = (view.focus + targets - 1) % targets;
        }
        KeyCode::Esc => {
            if let Some(open) = controller.open_widget() {
                let events = controller.trigger_clicked(page, open);
                handle_select_events(page, engine, source, view, internal_tx, events);
            }
        }
        KeyCode::Up | KeyCode::Down => {
            if let Some(open) = controller.open_widget()
                && let Some(widget) = page.widget(open)
            {
                let count = widget.options.len();
                if count > 0 {
                    view.option_cursor = match key.code {
                        KeyCode::Up => (view.option_cursor + count - 1) % count,
                        _ => (view.option_cursor + 1) % count,
                    };
                }
            }
        }
        KeyCode::Enter => {
            if let Some(id) = focused_widget_id(page, view) {
                let events = if controller.open_widget() == Some(id) {
                    controller.option_clicked(page, id, view.option_cursor)
                } else {
                    controller.trigger_clicked(page, id)
                };
                handle_select_events(page, engine, source, view, internal_tx, events);
            }
        }
        KeyCode::Char(' ') if view.focus > 0 => {
            if let Some(id) = focused_widget_id(page, view) {
                let events = controller.trigger_clicked(page, id);
                handle_select_events(page, engine, source, view, internal_tx, events);
            }
        }
        KeyCode::Char(c)
            if view.focus == 0
                && !key.modifiers.contains(KeyModifiers::CONTROL)
                && !key.modifiers.contains(KeyModifiers::ALT) =>
        {
            page.keyword_input.push(c);
            let value = page.keyword_input.clone();
            let report = engine.set_keyword(page, &value);
            apply_report(view, internal_tx, report);
        }
        KeyCode::Backspace if view.focus == 0 => {
            page.keyword_input.pop();
            let value = page.keyword_input.clone();
            let report = engine.set_keyword(page, &value);
            apply_report(view, internal_tx, report);
        }
        _ => {}
    }

    false
}

fn focused_widget_id(page: &Page, view: &ViewData) -> Option<WidgetId> {
    if view.focus == 0 {
        return None;
    }
    page.selects.get(view.focus - 1).map(|widget| widget.id)
}

fn handle_select_events<S: BanSource>(
    page: &mut Page,
    engine: &mut FilterEngine,
    source: &mut S,
    view: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    events: Vec<SelectEvent>,
) {
    for event in events {
        match event {
            SelectEvent::Opened(id) => {
                view.option_cursor = page
                    .widget(id)
                    .and_then(|widget| widget.selected_option_index())
                    .unwrap_or(0);
            }
            SelectEvent::Closed(_) => {}
            SelectEvent::Committed(notice) => match SelectSetting::parse(&notice.setting) {
                Some(setting) if setting.is_filter_criterion() => {
                    schedule_criteria_sync(internal_tx);
                }
                Some(SelectSetting::Instances) => {
                    reload_records(page, engine, source, view, internal_tx, &notice.value);
                }
                _ => {}
            },
            SelectEvent::DateRangeVisibility(_) => {}
        }
    }
}

fn reload_records<S: BanSource>(
    page: &mut Page,
    engine: &mut FilterEngine,
    source: &mut S,
    view: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    instance: &str,
) {
    let bans = match source.load_bans(instance) {
        Ok(bans) => bans,
        Err(error) => {
            emit_status(view, internal_tx, format!("load failed: {error}"));
            return;
        }
    };
    match banview_render::render_records(&bans, view.now) {
        Ok(records) => {
            page.replace_records(records);
            let report = engine.recompute(page);
            apply_report(view, internal_tx, report);
        }
        Err(error) => emit_status(view, internal_tx, format!("render failed: {error}")),
    }
}

fn render(frame: &mut ratatui::Frame<'_>, page: &Page, view: &ViewData, options: &RunOptions) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let filter_bar = Paragraph::new(filter_bar_text(page, view))
        .block(Block::default().title("banview").borders(Borders::ALL));
    frame.render_widget(filter_bar, layout[0]);

    render_record_table(frame, layout[1], page);

    let status = Paragraph::new(status_text(view, options))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, layout[2]);

    if let Some(widget) = page.open_widgets().next() {
        let area = centered_rect(36, 48, frame.area());
        frame.render_widget(Clear, area);
        let panel = Paragraph::new(option_panel_text(widget, view)).block(
            Block::default()
                .title(widget.setting.clone())
                .borders(Borders::ALL)
                .style(Style::default().fg(Color::Cyan)),
        );
        frame.render_widget(panel, area);
    }
}

fn filter_bar_text(page: &Page, view: &ViewData) -> String {
    let keyword_marker = if view.focus == 0 { "›" } else { " " };
    let mut lines = vec![format!(
        "{keyword_marker}keyword: {}_",
        page.keyword_input
    )];

    let mut controls = Vec::new();
    for (index, widget) in page.selects.iter().enumerate() {
        let marker = if view.focus == index + 1 { "›" } else { " " };
        let indicator = if widget.disabled {
            "·"
        } else if widget.open {
            "▴"
        } else {
            "▾"
        };
        controls.push(format!(
            "{marker}{}: {} {indicator}",
            widget.setting, widget.display_text
        ));
    }
    if page.date_range.visible {
        controls.push(format!(
            "from {} to {}",
            page.date_range.from_value, page.date_range.to_value
        ));
    }
    lines.push(controls.join("   "));
    lines.join("\n")
}

fn option_panel_text(widget: &banview_app::SelectWidget, view: &ViewData) -> String {
    widget
        .options
        .iter()
        .enumerate()
        .map(|(index, option)| {
            let cursor = if index == view.option_cursor { "▸" } else { " " };
            let mark = if option.selected { "●" } else { " " };
            format!("{cursor}{mark} {}", option.value)
        })
        .collect::<Vec<String>>()
        .join("\n")
}

fn render_record_table(frame: &mut ratatui::Frame<'_>, area: Rect, page: &Page) {
    let header = Row::new(["ip", "ban start", "ban end", "remain", "period", "reason"])
        .style(Style::default().add_modifier(Modifier::BOLD));
    let rows: Vec<Row> = page
        .visible_records()
        .map(|record| {
            Row::new(
                RecordField::ALL
                    .map(|field| record.attr(field).unwrap_or_default().to_owned()),
            )
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(26),
            Constraint::Length(17),
            Constraint::Length(17),
            Constraint::Length(10),
            Constraint::Length(8),
            Constraint::Min(10),
        ],
    )
    .header(header)
    .block(Block::default().title("bans").borders(Borders::ALL));
    frame.render_widget(table, area);
}

fn status_text(view: &ViewData, options: &RunOptions) -> String {
    if let Some(message) = &view.status_line {
        return message.clone();
    }
    if options.show_totals {
        return format!(
            "{} of {} bans shown",
            view.report.visible,
            view.report.total()
        );
    }
    String::new()
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
