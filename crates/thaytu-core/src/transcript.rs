//! The displayed conversation: an append-only list of formatted entries.

use crate::chart::{ChartId, ChartRenderer};
use crate::format::{format, Markup};
use crate::reply::extract;
use crate::state::{ChatMessage, ChatRole};

/// One displayed message with its formatted content and optional chart container
#[derive(Debug, Clone)]
pub struct TranscriptEntry {
    pub message: ChatMessage,
    pub markup: Markup,
    pub chart: Option<ChartId>,
}

pub struct Transcript<R> {
    entries: Vec<TranscriptEntry>,
    renderer: R,
    next_chart: u64,
    follow_latest: bool,
}

impl<R: ChartRenderer> Transcript<R> {
    pub fn new(renderer: R) -> Self {
        Self {
            entries: Vec::new(),
            renderer,
            next_chart: 0,
            follow_latest: true,
        }
    }

    /// Append a message and scroll to it.
    ///
    /// Assistant replies go through chart extraction first; user input never does.
    pub fn append(&mut self, message: ChatMessage) {
        match message.role {
            ChatRole::User => {
                let markup = format(&message.content);
                self.entries.push(TranscriptEntry {
                    message,
                    markup,
                    chart: None,
                });
            }
            ChatRole::Assistant => {
                let parsed = extract(&message.content);
                let markup = format(&parsed.display_text);
                match parsed.chart {
                    Some(chart) => {
                        let id = self.reserve_chart_id();
                        // Container exists before the renderer is asked to draw into it
                        self.entries.push(TranscriptEntry {
                            message,
                            markup,
                            chart: Some(id),
                        });
                        self.renderer.render(id, &chart);
                    }
                    None => self.entries.push(TranscriptEntry {
                        message,
                        markup,
                        chart: None,
                    }),
                }
            }
        }
        self.scroll_to_latest();
    }

    /// Drop everything, including drawn charts, and show a single message
    pub fn replace_with(&mut self, message: ChatMessage) {
        self.entries.clear();
        self.renderer.dispose_all();
        self.append(message);
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&TranscriptEntry> {
        self.entries.last()
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Whether the view should pin the newest content to the bottom
    pub fn follows_latest(&self) -> bool {
        self.follow_latest
    }

    pub fn scroll_to_latest(&mut self) {
        self.follow_latest = true;
    }

    /// The user scrolled back through history
    pub fn release_scroll(&mut self) {
        self.follow_latest = false;
    }

    fn reserve_chart_id(&mut self) -> ChartId {
        self.next_chart += 1;
        ChartId(self.next_chart)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reply::ChartData;

    /// Records every render call
    #[derive(Default)]
    struct RecordingRenderer {
        calls: Vec<(ChartId, ChartData)>,
        disposed: usize,
    }

    impl ChartRenderer for RecordingRenderer {
        fn render(&mut self, id: ChartId, chart: &ChartData) {
            self.calls.push((id, chart.clone()));
        }

        fn dispose_all(&mut self) {
            self.disposed += 1;
            self.calls.clear();
        }
    }

    const CHARTED: &str = "```json {\"type\":\"chart_data\",\"nam_sinh\":1995,\"chart_config\":{\"labels\":[\"A\",\"B\"],\"data\":[10,20]}} ```\nNăm nay **tốt**.";

    #[test]
    fn test_user_messages_are_never_scanned_for_charts() {
        let mut transcript = Transcript::new(RecordingRenderer::default());
        transcript.append(ChatMessage::user(CHARTED));

        let entry = transcript.last().unwrap();
        assert!(entry.chart.is_none());
        assert!(entry.markup.plain_text().contains("```json"));
        assert!(transcript.renderer().calls.is_empty());
    }

    #[test]
    fn test_assistant_chart_reserves_container_and_renders_once() {
        let mut transcript = Transcript::new(RecordingRenderer::default());
        transcript.append(ChatMessage::assistant(CHARTED));

        let entry = transcript.last().unwrap();
        assert_eq!(entry.markup.plain_text(), "Năm nay tốt.");
        let id = entry.chart.expect("chart container reserved");

        let calls = &transcript.renderer().calls;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, id);
        assert_eq!(calls[0].1.chart_config.labels, vec!["A", "B"]);
        assert_eq!(calls[0].1.chart_config.data, vec![10.0, 20.0]);
    }

    #[test]
    fn test_chart_ids_are_unique_across_replacements() {
        let mut transcript = Transcript::new(RecordingRenderer::default());
        transcript.append(ChatMessage::assistant(CHARTED));
        let first = transcript.last().unwrap().chart.unwrap();

        transcript.replace_with(ChatMessage::assistant(CHARTED));
        let second = transcript.last().unwrap().chart.unwrap();

        assert_ne!(first, second);
        assert_eq!(transcript.renderer().disposed, 1);
        assert_eq!(transcript.len(), 1);
    }

    #[test]
    fn test_append_restores_follow_latest() {
        let mut transcript = Transcript::new(RecordingRenderer::default());
        transcript.append(ChatMessage::user("2k1 nam"));
        transcript.release_scroll();
        assert!(!transcript.follows_latest());

        transcript.append(ChatMessage::assistant("Bạn sinh năm 2001..."));
        assert!(transcript.follows_latest());
    }
}
