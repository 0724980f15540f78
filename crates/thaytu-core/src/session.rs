//! Conversation session controller.
//!
//! Owns the transcript, indicator, input and the single `pending` flag.
//! Network calls run as tokio tasks and report back as [`SessionEvent`]s on
//! the channel given at construction; the owner passes each event to
//! [`SessionController::handle`]. Only one request may be in flight at a
//! time, `ask` and `reset` included.

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;

use crate::api::{ApiError, AskReply, FortuneBackend, HealthStatus};
use crate::chart::ChartRenderer;
use crate::indicator::{IndicatorTick, LoadingIndicator};
use crate::input::InputController;
use crate::state::{ChatMessage, SessionUiState};
use crate::transcript::Transcript;

pub const ASK_ERROR_FALLBACK: &str = "Có lỗi xảy ra, vui lòng thử lại!";
pub const NETWORK_FALLBACK: &str = "Mạng mẽo cà chớn quá, con đợi xíu rồi hỏi lại nghen!";

pub const WELCOME_GREETING: &str = "Chào con! Thầy Tư đây.\n\
Con muốn coi sao hạn, tử vi hay thần số học? Cho Thầy biết **Năm Sinh** với **Giới Tính** nghen.";

pub const RESET_GREETING: &str = "Hello con! Thầy Tư đã quay lại nè.\n\
Con muốn coi quẻ mới hông? Cho Tui biết **Năm Sinh** với **Giới Tính** đi.";

pub const SUGGESTIONS: &[&str] = &[
    "Xem sao hạn năm nay cho con, 2k1 nam",
    "Tử vi tuổi Ất Hợi 1995 nữ năm tới ra sao Thầy?",
    "Thần số học của con, sinh ngày 12/08/1998",
    "Con cung Sư Tử, tháng này tình duyên thế nào?",
];

#[derive(Debug)]
pub enum SessionEvent {
    AskSettled(Result<AskReply, ApiError>),
    ResetSettled(Result<(), ApiError>),
    HealthChecked(Result<HealthStatus, ApiError>),
    Indicator(IndicatorTick),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Sending,
    Resetting,
}

/// How the last `ask` ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AskOutcome {
    Answered,
    Rejected,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendStatus {
    Unknown,
    Online { agent: String },
    Unreachable,
}

pub struct SessionController<B, R> {
    backend: Arc<B>,
    events: UnboundedSender<SessionEvent>,
    transcript: Transcript<R>,
    indicator: LoadingIndicator,
    input: InputController,
    ui: SessionUiState,
    phase: SessionPhase,
    last_outcome: Option<AskOutcome>,
    backend_status: BackendStatus,
}

impl<B: FortuneBackend, R: ChartRenderer> SessionController<B, R> {
    /// New session showing the welcome greeting
    pub fn new(
        backend: Arc<B>,
        renderer: R,
        indicator: LoadingIndicator,
        events: UnboundedSender<SessionEvent>,
    ) -> Self {
        let mut transcript = Transcript::new(renderer);
        transcript.append(ChatMessage::assistant(WELCOME_GREETING));
        Self {
            backend,
            events,
            transcript,
            indicator,
            input: InputController::new(),
            ui: SessionUiState::default(),
            phase: SessionPhase::Idle,
            last_outcome: None,
            backend_status: BackendStatus::Unknown,
        }
    }

    pub fn transcript(&self) -> &Transcript<R> {
        &self.transcript
    }

    pub fn transcript_mut(&mut self) -> &mut Transcript<R> {
        &mut self.transcript
    }

    pub fn indicator(&self) -> &LoadingIndicator {
        &self.indicator
    }

    pub fn input(&self) -> &InputController {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut InputController {
        &mut self.input
    }

    pub fn ui_state(&self) -> SessionUiState {
        self.ui
    }

    pub fn is_pending(&self) -> bool {
        self.ui.pending
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn last_outcome(&self) -> Option<AskOutcome> {
        self.last_outcome
    }

    pub fn backend_status(&self) -> &BackendStatus {
        &self.backend_status
    }

    /// Prefill the input with suggestion `index` and focus it
    pub fn apply_suggestion(&mut self, index: usize) -> bool {
        let Some(text) = SUGGESTIONS.get(index) else {
            return false;
        };
        if self.ui.pending {
            return false;
        }
        self.input.set_text(text);
        self.input.focus();
        true
    }

    /// Send whatever is in the input field. The text is kept if the send is refused.
    pub fn submit_input(&mut self) -> bool {
        if self.phase != SessionPhase::Idle {
            tracing::warn!(phase = ?self.phase, "submit ignored, a request is already in flight");
            return false;
        }
        match self.input.take_submission() {
            Some(message) => self.submit(&message),
            None => false,
        }
    }

    /// Append the user message and start an `ask`. No-op for blank text.
    pub fn submit(&mut self, text: &str) -> bool {
        let message = text.trim();
        if message.is_empty() {
            return false;
        }
        if self.phase != SessionPhase::Idle {
            tracing::warn!(phase = ?self.phase, "submit ignored, a request is already in flight");
            return false;
        }

        self.transcript.append(ChatMessage::user(message));
        self.set_pending(true);
        self.show_indicator();
        self.phase = SessionPhase::Sending;

        tracing::debug!(chars = message.chars().count(), "sending ask");
        let backend = Arc::clone(&self.backend);
        let events = self.events.clone();
        let message = message.to_string();
        tokio::spawn(async move {
            let result = backend.ask(&message).await;
            let _ = events.send(SessionEvent::AskSettled(result));
        });
        true
    }

    /// Start a `reset`; the transcript is replaced once the server answers.
    /// The input shows the busy affordance until then.
    pub fn reset(&mut self) -> bool {
        if self.phase != SessionPhase::Idle {
            tracing::warn!(phase = ?self.phase, "reset ignored, a request is already in flight");
            return false;
        }
        self.phase = SessionPhase::Resetting;
        self.set_pending(true);

        let backend = Arc::clone(&self.backend);
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = backend.reset().await;
            let _ = events.send(SessionEvent::ResetSettled(result));
        });
        true
    }

    /// Probe the backend in the background; does not occupy the request slot
    pub fn check_health(&self) {
        let backend = Arc::clone(&self.backend);
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = backend.health().await;
            let _ = events.send(SessionEvent::HealthChecked(result));
        });
    }

    pub fn handle(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::AskSettled(result) => self.settle_ask(result),
            SessionEvent::ResetSettled(result) => self.settle_reset(result),
            SessionEvent::HealthChecked(result) => self.settle_health(result),
            SessionEvent::Indicator(tick) => self.indicator.tick(tick),
        }
    }

    fn settle_ask(&mut self, result: Result<AskReply, ApiError>) {
        if self.phase != SessionPhase::Sending {
            tracing::warn!(phase = ?self.phase, "ask result arrived with no ask in flight");
            return;
        }
        self.indicator.hide();

        let (reply, outcome) = match result {
            Ok(AskReply::Answer(text)) => (text, AskOutcome::Answered),
            Ok(AskReply::Rejected { status, error }) => {
                tracing::info!(status, "ask rejected by server");
                let text = error
                    .filter(|e| !e.is_empty())
                    .unwrap_or_else(|| ASK_ERROR_FALLBACK.to_string());
                (text, AskOutcome::Rejected)
            }
            Err(e) => {
                tracing::error!(error = %e, "ask failed");
                (NETWORK_FALLBACK.to_string(), AskOutcome::Failed)
            }
        };
        self.transcript.append(ChatMessage::assistant(reply));
        self.last_outcome = Some(outcome);

        self.set_pending(false);
        self.phase = SessionPhase::Idle;
        self.input.focus();
    }

    fn settle_reset(&mut self, result: Result<(), ApiError>) {
        if self.phase != SessionPhase::Resetting {
            tracing::warn!(phase = ?self.phase, "reset result arrived with no reset in flight");
            return;
        }
        self.phase = SessionPhase::Idle;
        self.set_pending(false);

        match result {
            Ok(()) => {
                self.transcript
                    .replace_with(ChatMessage::assistant(RESET_GREETING));
                self.last_outcome = None;
                self.input.clear();
                self.input.focus();
            }
            Err(e) => tracing::error!(error = %e, "reset failed, keeping transcript"),
        }
    }

    fn settle_health(&mut self, result: Result<HealthStatus, ApiError>) {
        self.backend_status = match result {
            Ok(health) => {
                tracing::info!(agent = %health.agent, status = %health.status, "backend is up");
                BackendStatus::Online {
                    agent: health.agent,
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "health check failed");
                BackendStatus::Unreachable
            }
        };
    }

    fn set_pending(&mut self, pending: bool) {
        self.ui.pending = pending;
        self.input.set_pending(pending);
    }

    fn show_indicator(&mut self) {
        let events = self.events.clone();
        self.indicator
            .show(move |tick| events.send(SessionEvent::Indicator(tick)).is_ok());
        self.transcript.scroll_to_latest();
    }
}
