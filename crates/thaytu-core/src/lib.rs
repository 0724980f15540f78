pub mod api;
pub mod chart;
pub mod config;
pub mod format;
pub mod indicator;
pub mod input;
pub mod reply;
pub mod session;
pub mod state;
pub mod transcript;

// Re-export main types for convenience
pub use api::{ApiError, AskReply, FortuneBackend, FortuneClient, HealthStatus};
pub use chart::{ChartId, ChartRenderer, RadarChartConfig};
pub use config::Config;
pub use format::{format, Markup, Segment};
pub use indicator::{Fade, LoadingIndicator};
pub use input::{InputController, SendAffordance};
pub use reply::{extract, ChartData, ParsedReply};
pub use session::{BackendStatus, SessionController, SessionEvent, SessionPhase};
pub use state::{ChatMessage, ChatRole, SessionUiState};
pub use transcript::{Transcript, TranscriptEntry};
