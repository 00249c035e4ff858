//! Browser screen: key bindings, the activity log, and rendering.

use ratzilla::ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratzilla::ratatui::style::{Color, Modifier, Style};
use ratzilla::ratatui::text::{Line, Span};
use ratzilla::ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratzilla::ratatui::Frame;

use idle_gold::economy::GENERATORS;
use idle_gold::engine::{Engine, GeneratorView, Notification};
use idle_gold::error::{EconomyError, EngineError};
use idle_gold::format::format_number;
use idle_gold::store::SnapshotStore;

use crate::click::{is_narrow_layout, ClickState};

const LOG_CAPACITY: usize = 50;
const PRESTIGE_BAR_WIDTH: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Tap,
    UpgradeTap,
    /// Buy one unit of the generator at this table index.
    BuyOne(usize),
    BuyMax(usize),
    /// Select the n-th visible generator.
    Select(usize),
    SelectNext,
    SelectPrev,
    Prestige,
    Save,
    /// Full wipe; has to be pressed twice in a row.
    Reset,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogLine {
    pub text: String,
    pub important: bool,
}

#[derive(Debug, Default)]
pub struct UiState {
    /// Table index of the highlighted generator.
    pub selected: usize,
    pub log: Vec<LogLine>,
    reset_armed: bool,
}

impl UiState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_log(&mut self, text: impl Into<String>, important: bool) {
        self.log.push(LogLine {
            text: text.into(),
            important,
        });
        if self.log.len() > LOG_CAPACITY {
            let excess = self.log.len() - LOG_CAPACITY;
            self.log.drain(..excess);
        }
    }

    /// Point the cursor at the first line still on screen.
    fn select_first_visible<S: SnapshotStore>(&mut self, engine: &Engine<S>) {
        self.selected = engine.visible_generators().first().map_or(0, |g| g.index);
    }

    pub fn command_for_key(&self, c: char) -> Option<Command> {
        match c {
            ' ' | 'c' => Some(Command::Tap),
            'u' => Some(Command::UpgradeTap),
            'b' => Some(Command::BuyOne(self.selected)),
            'm' => Some(Command::BuyMax(self.selected)),
            'j' => Some(Command::SelectNext),
            'k' => Some(Command::SelectPrev),
            'p' => Some(Command::Prestige),
            's' => Some(Command::Save),
            'R' => Some(Command::Reset),
            '1'..='9' => c.to_digit(10).map(|d| Command::Select(d as usize - 1)),
            _ => None,
        }
    }

    pub fn apply<S: SnapshotStore>(&mut self, engine: &mut Engine<S>, command: Command) {
        if command != Command::Reset {
            self.reset_armed = false;
        }
        match command {
            Command::Tap => {
                engine.tap();
            }
            Command::UpgradeTap => {
                if engine.buy_tap_upgrade().is_ok() {
                    self.push_log(
                        format!("Tap upgraded: {} gold per tap", format_number(engine.tap_gain())),
                        false,
                    );
                }
            }
            Command::BuyOne(index) => {
                self.selected = index;
                let Some(def) = GENERATORS.get(index) else {
                    return;
                };
                if let Ok(cost) = engine.buy_generator_one(def.name) {
                    self.push_log(
                        format!("Bought 1 {} for {}", def.name, format_number(cost)),
                        false,
                    );
                }
            }
            Command::BuyMax(index) => {
                self.selected = index;
                let Some(def) = GENERATORS.get(index) else {
                    return;
                };
                if let Ok(purchase) = engine.buy_generator_max(def.name) {
                    if purchase.quantity > 0 {
                        self.push_log(
                            format!(
                                "Bought {} {} for {}",
                                purchase.quantity,
                                def.name,
                                format_number(purchase.spent)
                            ),
                            false,
                        );
                    }
                }
            }
            Command::Select(slot) => {
                if let Some(g) = engine.visible_generators().get(slot) {
                    self.selected = g.index;
                }
            }
            Command::SelectNext | Command::SelectPrev => {
                let visible = engine.visible_generators();
                if visible.is_empty() {
                    return;
                }
                let pos = visible
                    .iter()
                    .position(|g| g.index == self.selected)
                    .unwrap_or(0);
                let next = if command == Command::SelectNext {
                    (pos + 1) % visible.len()
                } else {
                    (pos + visible.len() - 1) % visible.len()
                };
                self.selected = visible[next].index;
            }
            Command::Prestige => {
                if engine.prestige().is_ok() {
                    self.select_first_visible(engine);
                }
            }
            Command::Save => {
                if let Err(EngineError::SaveInProgress) = engine.save() {
                    self.push_log("A save is already running.", false);
                }
            }
            Command::Reset => {
                if !self.reset_armed {
                    self.reset_armed = true;
                    self.push_log("Press R again to erase all progress.", true);
                    return;
                }
                self.reset_armed = false;
                match engine.reset() {
                    Err(EngineError::SaveInProgress) => {
                        self.push_log("A save is running; nothing was erased.", true);
                        return;
                    }
                    Err(err) => self.push_log(
                        format!("Reset, but the save could not be deleted: {err}"),
                        true,
                    ),
                    Ok(()) => self.push_log("Progress erased.", true),
                }
                self.select_first_visible(engine);
            }
        }
    }

    /// Move engine notifications into the log. Returns the ones worth a
    /// console warning.
    pub fn absorb(&mut self, notifications: Vec<Notification>) -> Vec<String> {
        let mut warnings = Vec::new();
        for note in notifications {
            match note {
                Notification::AchievementUnlocked(id) => {
                    self.push_log(format!("Achievement unlocked: {}", id.def().label), true);
                }
                Notification::PrestigeCompleted {
                    gain,
                    new_multiplier,
                } => {
                    self.push_log(
                        format!("Prestige! +{gain} shards, income x{new_multiplier:.2}"),
                        true,
                    );
                }
                Notification::OfflineGainApplied(gain) => {
                    self.push_log(
                        format!(
                            "Offline gains: +{} (~{:.1}h)",
                            format_number(gain.amount),
                            gain.hours_applied
                        ),
                        true,
                    );
                }
                Notification::PurchaseRejected(err) => {
                    self.push_log(rejection_text(&err), false);
                }
                Notification::Saved => self.push_log("Saved.", false),
                Notification::SaveFailed(reason) => {
                    let text = format!("Save failed: {reason}");
                    self.push_log(text.clone(), true);
                    warnings.push(text);
                }
                Notification::SnapshotRecovered { reason, backup } => {
                    let text = match backup {
                        Some(at) => format!("Save was unreadable ({reason}); moved to {at}. New game."),
                        None => format!("Save was unreadable ({reason}). New game."),
                    };
                    self.push_log(text.clone(), true);
                    warnings.push(text);
                }
            }
        }
        warnings
    }
}

fn rejection_text(err: &EconomyError) -> String {
    match err {
        EconomyError::InsufficientFunds { cost, gold } => format!(
            "Not enough gold: need {}, have {}",
            format_number(*cost),
            format_number(*gold)
        ),
        EconomyError::NothingToPrestige => "Nothing to prestige yet".to_string(),
        EconomyError::UnknownGenerator(name) => format!("Unknown generator {name}"),
    }
}

fn prestige_bar(fraction: f64) -> String {
    let filled = ((fraction.clamp(0.0, 1.0)) * PRESTIGE_BAR_WIDTH as f64).round() as usize;
    format!(
        "{}{}",
        "█".repeat(filled),
        "░".repeat(PRESTIGE_BAR_WIDTH - filled)
    )
}

pub fn render<S: SnapshotStore>(f: &mut Frame, engine: &Engine<S>, ui: &UiState, cs: &mut ClickState) {
    let size = f.area();
    cs.reset_frame(size.width, size.height);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(7),
            Constraint::Min(5),
            Constraint::Length(8),
            Constraint::Length(3),
        ])
        .split(size);

    render_title(f, engine, chunks[0]);
    render_stats(f, engine, chunks[1], cs);
    render_generators(f, engine, ui, chunks[2], cs);
    render_log(f, ui, chunks[3]);
    render_help(f, chunks[4], cs);
}

fn render_title<S: SnapshotStore>(f: &mut Frame, engine: &Engine<S>, area: Rect) {
    let title = Paragraph::new(Line::from(vec![
        Span::styled(
            "Idle Gold",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("   {} gold", format_number(engine.gold())),
            Style::default().fg(Color::White),
        ),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    )
    .alignment(Alignment::Center);
    f.render_widget(title, area);
}

fn render_stats<S: SnapshotStore>(f: &mut Frame, engine: &Engine<S>, area: Rect, cs: &mut ClickState) {
    let (unlocked, total) = engine.achievement_progress();
    let key = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let lines = vec![
        Line::from(vec![
            Span::styled(" [Space] ", key),
            Span::raw(format!(
                "Tap for {} gold    {} gold/s",
                format_number(engine.tap_gain()),
                format_number(engine.cps())
            )),
        ]),
        Line::from(vec![
            Span::styled(" [U] ", key),
            Span::raw(format!(
                "Upgrade tap: {} gold",
                format_number(engine.tap_upgrade_cost())
            )),
        ]),
        Line::from(vec![
            Span::styled(" [P] ", key),
            Span::raw(format!(
                "Prestige {} +{} shards (next at {})",
                prestige_bar(engine.prestige_progress()),
                engine.potential_shard_gain(),
                format_number(engine.next_prestige_threshold())
            )),
        ]),
        Line::from(Span::styled(
            format!(
                "     Shards {}  multiplier x{:.2}  achievements {unlocked}/{total}",
                engine.prestige_shards(),
                engine.prestige_multiplier()
            ),
            Style::default().fg(Color::Gray),
        )),
    ];
    let stats = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green))
            .title(" Economy "),
    );
    f.render_widget(stats, area);

    cs.add_target(area.y + 1, Command::Tap);
    cs.add_target(area.y + 2, Command::UpgradeTap);
    cs.add_target(area.y + 3, Command::Prestige);
}

fn generator_line(g: &GeneratorView, selected: bool, narrow: bool) -> Line<'static> {
    let marker = if selected { "▶" } else { " " };
    if !g.discovered {
        return Line::from(Span::styled(
            format!("{marker} {} (locked)  {}", g.name, format_number(g.next_cost)),
            Style::default().fg(Color::DarkGray),
        ));
    }
    let style = if selected {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };
    let mut text = format!(
        "{marker} {} x{}  {}",
        g.name,
        g.count,
        format_number(g.next_cost)
    );
    if !narrow {
        text.push_str(&format!(
            "  +{}/s  max {}",
            format_number(g.line_cps),
            g.max_affordable
        ));
    }
    Line::from(Span::styled(text, style))
}

fn render_generators<S: SnapshotStore>(
    f: &mut Frame,
    engine: &Engine<S>,
    ui: &UiState,
    area: Rect,
    cs: &mut ClickState,
) {
    let narrow = is_narrow_layout(area.width);
    let visible = engine.visible_generators();
    let lines: Vec<Line> = visible
        .iter()
        .map(|g| generator_line(g, g.index == ui.selected, narrow))
        .collect();
    let list = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(" Generators (tap to buy) "),
    );
    f.render_widget(list, area);

    let inner_rows = area.height.saturating_sub(2) as usize;
    for (i, g) in visible.iter().take(inner_rows).enumerate() {
        cs.add_target(area.y + 1 + i as u16, Command::BuyOne(g.index));
    }
}

fn render_log(f: &mut Frame, ui: &UiState, area: Rect) {
    let visible_height = area.height.saturating_sub(2) as usize;
    let start = ui.log.len().saturating_sub(visible_height);
    let lines: Vec<Line> = ui.log[start..]
        .iter()
        .map(|entry| {
            let style = if entry.important {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            Line::from(Span::styled(entry.text.clone(), style))
        })
        .collect();
    let log = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Blue))
                .title(" Log "),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(log, area);
}

fn render_help(f: &mut Frame, area: Rect, cs: &mut ClickState) {
    let help = Paragraph::new(Line::from(Span::styled(
        "[J/K] select  [B] buy 1  [M] buy max  [S] save  [R] reset",
        Style::default().fg(Color::DarkGray),
    )))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    )
    .alignment(Alignment::Center);
    f.render_widget(help, area);

    for row in area.y..area.y + area.height {
        cs.add_target(row, Command::Save);
    }
}
