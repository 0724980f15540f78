use std::sync::Arc;

use ratatui::layout::Rect;
use thaytu_core::indicator::LOADING_PHRASES;
use thaytu_core::{Config, FortuneClient, LoadingIndicator, SessionController, SessionEvent};
use tokio::sync::mpsc::UnboundedSender;

use crate::chart::RadarRenderer;

pub type Session = SessionController<FortuneClient, RadarRenderer>;

pub struct App {
    // Core state
    pub should_quit: bool,
    pub server_url: String,
    pub session: Session,

    // Transcript scroll state, in rows
    pub chat_scroll: usize,
    pub chat_max_scroll: usize,
    pub chat_height: u16, // Inner height of the transcript, updated during render

    // Panel area for mouse hit-testing (updated during render)
    pub chat_area: Option<Rect>,

    // Animation state
    pub animation_frame: u8, // 0-3 for the busy spinner
}

impl App {
    pub fn new(config: &Config, events: UnboundedSender<SessionEvent>) -> anyhow::Result<Self> {
        let server_url = config.server_url();
        let client = FortuneClient::new(&server_url)?;

        let indicator = if config.rotate_loading_phrases() {
            LoadingIndicator::rotating(
                LOADING_PHRASES.iter().map(|p| p.to_string()).collect(),
                config.rotation_interval(),
            )
        } else {
            LoadingIndicator::fixed(LOADING_PHRASES[0])
        };

        let session = SessionController::new(
            Arc::new(client),
            RadarRenderer::default(),
            indicator,
            events,
        );

        Ok(Self {
            should_quit: false,
            server_url,
            session,
            chat_scroll: 0,
            chat_max_scroll: 0,
            chat_height: 0,
            chat_area: None,
            animation_frame: 0,
        })
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.session.is_pending() {
            self.animation_frame = (self.animation_frame + 1) % 4;
        } else {
            self.animation_frame = 0;
        }
    }

    pub fn scroll_up(&mut self, rows: usize) {
        if rows == 0 || self.chat_max_scroll == 0 {
            return;
        }
        self.session.transcript_mut().release_scroll();
        self.chat_scroll = self.chat_scroll.saturating_sub(rows);
    }

    pub fn scroll_down(&mut self, rows: usize) {
        self.chat_scroll = (self.chat_scroll + rows).min(self.chat_max_scroll);
        if self.chat_scroll >= self.chat_max_scroll {
            self.session.transcript_mut().scroll_to_latest();
        }
    }

    pub fn scroll_half_page_up(&mut self) {
        let half = (self.chat_height / 2).max(1) as usize;
        self.scroll_up(half);
    }

    pub fn scroll_half_page_down(&mut self) {
        let half = (self.chat_height / 2).max(1) as usize;
        self.scroll_down(half);
    }

    pub fn scroll_to_bottom(&mut self) {
        self.chat_scroll = self.chat_max_scroll;
        self.session.transcript_mut().scroll_to_latest();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn app() -> App {
        let (tx, _rx) = mpsc::unbounded_channel();
        let config = Config {
            server_url: Some("http://127.0.0.1:9".to_string()),
            rotate_loading_phrases: Some(false),
            rotation_interval_ms: None,
        };
        App::new(&config, tx).unwrap()
    }

    #[test]
    fn test_scrolling_back_releases_follow_latest() {
        let mut app = app();
        app.chat_max_scroll = 30;
        app.chat_scroll = 30;
        app.chat_height = 10;

        app.scroll_half_page_up();
        assert_eq!(app.chat_scroll, 25);
        assert!(!app.session.transcript().follows_latest());

        app.scroll_down(100);
        assert_eq!(app.chat_scroll, 30);
        assert!(app.session.transcript().follows_latest());
    }

    #[test]
    fn test_scroll_up_without_overflow_keeps_following() {
        let mut app = app();
        app.scroll_up(3);
        assert_eq!(app.chat_scroll, 0);
        assert!(app.session.transcript().follows_latest());
    }

    #[test]
    fn test_spinner_only_turns_while_pending() {
        let mut app = app();
        app.tick_animation();
        assert_eq!(app.animation_frame, 0);
    }
}
