use std::sync::Arc;

use time::OffsetDateTime;
use vox_core::ItineraryStore;
use vox_notify::{Level, NoticeBoard};
use vox_trips::TripGateway;

use crate::cmd_trip::default_trip_name;

/// Application state for the story player.
pub struct App {
    pub store: ItineraryStore,
    pub gateway: Arc<dyn TripGateway>,
    pub notices: NoticeBoard,
    pub should_quit: bool,
    runtime: tokio::runtime::Runtime,
}

impl App {
    /// Opens in story mode at the first stop.
    pub fn new(mut store: ItineraryStore, gateway: Arc<dyn TripGateway>) -> anyhow::Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        store.start_journey();
        Ok(Self {
            store,
            gateway,
            notices: NoticeBoard::new(),
            should_quit: false,
            runtime,
        })
    }

    /// Per-frame housekeeping.
    pub fn tick(&mut self) {
        self.notices.prune(OffsetDateTime::now_utc());
    }

    /// Handle a key press.
    pub fn handle_key(&mut self, key: crossterm::event::KeyEvent) {
        use crossterm::event::KeyCode;

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.quit(),
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('n') | KeyCode::Char(' ') => {
                self.step(true)
            }
            KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('p') => self.step(false),
            KeyCode::Char('m') => self.store.toggle_story_mode(),
            KeyCode::Char('t') => self.store.toggle_theme(),
            KeyCode::Char('s') => self.save(),
            KeyCode::Char('x') => self.dismiss_latest(),
            _ => {}
        }
    }

    fn quit(&mut self) {
        self.store.stop_journey();
        self.should_quit = true;
    }

    fn step(&mut self, forward: bool) {
        if !self.store.cursor().is_active() {
            self.notices
                .push(Level::Info, "Story mode is off. Press m to start.");
            return;
        }
        if forward {
            self.store.next_stop();
        } else {
            self.store.prev_stop();
        }
    }

    fn save(&mut self) {
        let name = default_trip_name(&self.store);
        let snapshot = self.store.snapshot(None, &name, None, None);
        match self.runtime.block_on(self.gateway.save_trip(&snapshot)) {
            Ok(_) => {
                self.notices.push(Level::Success, format!("Saved \"{name}\""));
            }
            Err(e) => {
                self.notices
                    .push(Level::Error, format!("Failed to save trip: {e}"));
            }
        }
    }

    fn dismiss_latest(&mut self) {
        let latest = self
            .notices
            .latest(OffsetDateTime::now_utc())
            .map(|n| n.id.clone());
        if let Some(id) = latest {
            self.notices.dismiss(&id);
        }
    }
}
