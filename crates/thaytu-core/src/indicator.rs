//! Loading/typing indicator shown while a request is pending.
//!
//! With rotation enabled, `show` spawns a timer task that emits
//! [`IndicatorTick`]s through a callback. The owner feeds each tick back
//! into [`LoadingIndicator::tick`], so all state changes happen on the
//! owner's event loop. `hide` aborts the task and bumps the generation,
//! which makes any tick that was already queued a no-op.

use std::time::Duration;

use tokio::task::JoinHandle;

/// Length of each half of the fade around a phrase swap
pub const FADE: Duration = Duration::from_millis(300);

pub const DEFAULT_ROTATION_INTERVAL: Duration = Duration::from_millis(2500);

pub const LOADING_PHRASES: &[&str] = &[
    "Thầy đang bấm quẻ...",
    "Thầy đang coi sao chiếu mệnh...",
    "Thầy đang tra Can Chi ngũ hành...",
    "Thầy đang tính thần số học...",
    "Thầy đang lật sách tử vi...",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fade {
    Steady,
    Out,
    In,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationStep {
    FadeOut,
    Swap,
    Settle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorTick {
    pub generation: u64,
    pub step: RotationStep,
}

/// Handle to the rotation timer task. Dropping it cancels the task.
#[derive(Debug)]
pub struct RotationHandle(JoinHandle<()>);

impl RotationHandle {
    pub fn cancel(self) {
        self.0.abort();
    }
}

impl Drop for RotationHandle {
    fn drop(&mut self) {
        self.0.abort();
    }
}

#[derive(Debug)]
enum IndicatorState {
    Hidden,
    Visible {
        phrase_index: usize,
        fade: Fade,
        rotation: Option<RotationHandle>,
    },
}

#[derive(Debug)]
pub struct LoadingIndicator {
    phrases: Vec<String>,
    interval: Option<Duration>,
    generation: u64,
    state: IndicatorState,
}

impl LoadingIndicator {
    /// Indicator with a single fixed phrase and no timer
    pub fn fixed(phrase: impl Into<String>) -> Self {
        Self {
            phrases: vec![phrase.into()],
            interval: None,
            generation: 0,
            state: IndicatorState::Hidden,
        }
    }

    /// Indicator cycling through `phrases` every `interval`.
    ///
    /// An empty phrase list falls back to the built-in phrases.
    pub fn rotating(phrases: Vec<String>, interval: Duration) -> Self {
        let phrases = if phrases.is_empty() {
            LOADING_PHRASES.iter().map(|p| p.to_string()).collect()
        } else {
            phrases
        };
        Self {
            phrases,
            interval: Some(interval.max(FADE * 2)),
            generation: 0,
            state: IndicatorState::Hidden,
        }
    }

    pub fn is_visible(&self) -> bool {
        matches!(self.state, IndicatorState::Visible { .. })
    }

    pub fn is_rotating(&self) -> bool {
        matches!(
            self.state,
            IndicatorState::Visible {
                rotation: Some(_),
                ..
            }
        )
    }

    /// Current phrase and fade state, `None` while hidden
    pub fn current(&self) -> Option<(&str, Fade)> {
        match &self.state {
            IndicatorState::Hidden => None,
            IndicatorState::Visible {
                phrase_index, fade, ..
            } => Some((self.phrases[*phrase_index].as_str(), *fade)),
        }
    }

    /// Show the first phrase. Calling it while visible restarts from the first phrase.
    ///
    /// `emit` receives rotation ticks and returns `false` once the receiver is gone.
    /// Must be called from within a tokio runtime when rotation is enabled.
    pub fn show<F>(&mut self, emit: F)
    where
        F: Fn(IndicatorTick) -> bool + Send + 'static,
    {
        self.hide();
        let rotation = self
            .interval
            .filter(|_| self.phrases.len() > 1)
            .map(|interval| spawn_rotation(self.generation, interval, emit));
        self.state = IndicatorState::Visible {
            phrase_index: 0,
            fade: Fade::Steady,
            rotation,
        };
    }

    /// Cancel any rotation and remove the indicator. No-op when hidden.
    pub fn hide(&mut self) {
        let state = std::mem::replace(&mut self.state, IndicatorState::Hidden);
        if let IndicatorState::Visible { rotation, .. } = state {
            if let Some(handle) = rotation {
                handle.cancel();
            }
            self.generation += 1;
        }
    }

    /// Apply a tick from the rotation task; stale ticks are ignored
    pub fn tick(&mut self, tick: IndicatorTick) {
        if tick.generation != self.generation {
            return;
        }
        let count = self.phrases.len();
        if let IndicatorState::Visible {
            phrase_index, fade, ..
        } = &mut self.state
        {
            match tick.step {
                RotationStep::FadeOut => *fade = Fade::Out,
                RotationStep::Swap => {
                    *phrase_index = (*phrase_index + 1) % count;
                    *fade = Fade::In;
                }
                RotationStep::Settle => *fade = Fade::Steady,
            }
        }
    }
}

fn spawn_rotation<F>(generation: u64, interval: Duration, emit: F) -> RotationHandle
where
    F: Fn(IndicatorTick) -> bool + Send + 'static,
{
    let hold = interval.saturating_sub(FADE * 2);
    let steps = [
        (hold, RotationStep::FadeOut),
        (FADE, RotationStep::Swap),
        (FADE, RotationStep::Settle),
    ];
    RotationHandle(tokio::spawn(async move {
        loop {
            for (delay, step) in steps {
                tokio::time::sleep(delay).await;
                if !emit(IndicatorTick { generation, step }) {
                    return;
                }
            }
        }
    }))
}
