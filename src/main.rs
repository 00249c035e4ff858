mod click;
mod ui;

use std::{cell::RefCell, io, rc::Rc};

use click::{pixel_y_to_row, ClickState};
use idle_gold::config::IdleConfig;
use idle_gold::engine::Engine;
use ratzilla::event::{KeyCode, MouseButton, MouseEventKind};
use ratzilla::ratatui::Terminal;
use ratzilla::{DomBackend, WebRenderer};
use tracing_subscriber::EnvFilter;
use ui::{Command, UiState};

#[cfg(target_arch = "wasm32")]
type HostStore = idle_gold::store::LocalStorageStore;
#[cfg(not(target_arch = "wasm32"))]
type HostStore = idle_gold::store::FileStore;

fn host_store(config: &IdleConfig) -> HostStore {
    #[cfg(target_arch = "wasm32")]
    {
        HostStore::new(config.storage_key.clone())
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        HostStore::new(config.save_path.clone())
    }
}

/// Query the grid container's bounding rect and convert pixel coordinates to a row.
fn dom_pixel_to_row(mouse_x: u32, mouse_y: u32, cs: &ClickState) -> Option<u16> {
    let document = web_sys::window()?.document()?;
    // DomBackend creates a <div> as the grid container inside <body>.
    let grid = document.query_selector("body > div").ok()??;
    let rect = grid.get_bounding_client_rect();
    if (mouse_x as f64) < rect.left() {
        return None;
    }
    pixel_y_to_row(mouse_y as f64 - rect.top(), rect.height(), cs.terminal_rows)
}

fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map_or(0.0, |p| p.now())
}

type Shared = Rc<RefCell<(Engine<HostStore>, UiState)>>;

/// Run a command and move the resulting notifications into the log.
fn dispatch(shared: &Shared, command: Command) {
    let mut guard = shared.borrow_mut();
    let (engine, ui) = &mut *guard;
    ui.apply(engine, command);
    flush_notifications(engine, ui);
}

fn flush_notifications(engine: &mut Engine<HostStore>, ui: &mut UiState) {
    for warning in ui.absorb(engine.drain_notifications()) {
        web_sys::console::warn_1(&warning.into());
    }
}

/// Sends each formatted tracing line to the browser console.
struct ConsoleWriter;

impl io::Write for ConsoleWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let text = String::from_utf8_lossy(buf);
        let line = text.trim_end();
        if !line.is_empty() {
            web_sys::console::log_1(&line.into());
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

const DEFAULT_LOG_FILTER: &str = "idle_gold=info";

fn init_tracing() {
    // No env vars in the browser; fall back to engine events at info.
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    // SystemTime panics on wasm32, so no timestamps.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .without_time()
        .compact()
        .with_writer(|| ConsoleWriter)
        .try_init();
}

fn main() -> io::Result<()> {
    console_error_panic_hook::set_once();
    init_tracing();

    let config = IdleConfig::load_from_env();
    let store = host_store(&config);
    let mut engine = Engine::new(config, store);
    let mut ui = UiState::new();
    engine.load();
    flush_notifications(&mut engine, &mut ui);

    let shared: Shared = Rc::new(RefCell::new((engine, ui)));
    let click_state = Rc::new(RefCell::new(ClickState::new()));
    let backend = DomBackend::new()?;
    let terminal = Terminal::new(backend)?;

    terminal.on_mouse_event({
        let shared = shared.clone();
        let click_state = click_state.clone();
        move |mouse_event| {
            if mouse_event.event != MouseEventKind::Pressed
                || mouse_event.button != MouseButton::Left
            {
                return;
            }
            let command = {
                let cs = click_state.borrow();
                dom_pixel_to_row(mouse_event.x, mouse_event.y, &cs)
                    .and_then(|row| cs.command_at(row))
            };
            if let Some(command) = command {
                dispatch(&shared, command);
            }
        }
    });

    terminal.on_key_event({
        let shared = shared.clone();
        move |key_event| {
            let command = {
                let state = shared.borrow();
                match key_event.code {
                    KeyCode::Char(c) => state.1.command_for_key(c),
                    KeyCode::Up => Some(Command::SelectPrev),
                    KeyCode::Down => Some(Command::SelectNext),
                    KeyCode::Enter => Some(Command::BuyOne(state.1.selected)),
                    _ => None,
                }
            };
            if let Some(command) = command {
                dispatch(&shared, command);
            }
        }
    });

    terminal.draw_web(move |f| {
        let mut guard = shared.borrow_mut();
        let (engine, ui) = &mut *guard;

        let report = engine.pump(now_ms());
        if report.autosave_due {
            // failures arrive as notifications
            let _ = engine.save();
        }
        flush_notifications(engine, ui);

        let mut cs = click_state.borrow_mut();
        ui::render(f, engine, ui, &mut cs);
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::level_filters::LevelFilter;

    #[test]
    fn default_filter_passes_engine_info_events() {
        let filter = EnvFilter::new(DEFAULT_LOG_FILTER);
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::INFO));
    }
}
