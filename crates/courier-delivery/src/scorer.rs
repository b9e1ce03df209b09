//! Retry scoring — the heuristic risk signal that can shortcut escalation.
//!
//! Each failed attempt adds a fixed per-channel weight to a running score.
//! Channels with historically lower reliability carry a larger weight. The
//! score is capped, monotonically non-decreasing, and can only shorten the
//! escalation path — a high score stops escalation early and falls straight
//! to the Inbox; it never adds attempts.

use courier_types::models::Channel;

/// Per-channel failure weight.
pub fn channel_weight(channel: Channel) -> u32 {
    match channel {
        Channel::Sms => 2,
        Channel::Email => 1,
        Channel::Push => 2,
        Channel::WhatsApp => 4,
        Channel::Inbox => 0,
    }
}

#[derive(Debug, Clone)]
pub struct ScorerConfig {
    /// Cap on the cumulative score; also the normalization base for
    /// `retry_percentage`.
    pub max_score: u32,
    /// Score at which escalation stops early and remaining channels are
    /// skipped.
    pub stop_threshold: u32,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            max_score: 10,
            stop_threshold: 5,
        }
    }
}

/// Why the scorer told the orchestrator to stop escalating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopCause {
    /// Every eligible channel has been tried.
    Exhausted,
    /// The score crossed the stop threshold with channels still untried.
    RetryScore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Continue,
    Stop(StopCause),
}

/// Accumulates failure weight over one notification's attempt sequence.
#[derive(Debug)]
pub struct RetryScorer {
    config: ScorerConfig,
    score: u32,
}

impl RetryScorer {
    pub fn new(config: ScorerConfig) -> Self {
        Self { config, score: 0 }
    }

    /// Record a failed attempt. Returns the new score, capped at
    /// `max_score`.
    pub fn record_failure(&mut self, channel: Channel) -> u32 {
        self.score = (self.score + channel_weight(channel)).min(self.config.max_score);
        self.score
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// Score normalized to 0–100 for display.
    pub fn percentage(&self) -> u32 {
        (100.0 * f64::from(self.score) / f64::from(self.config.max_score)).round() as u32
    }

    /// Decide whether escalation continues, given how many ranked channels
    /// remain untried.
    pub fn verdict(&self, remaining_channels: usize) -> Verdict {
        if remaining_channels == 0 {
            Verdict::Stop(StopCause::Exhausted)
        } else if self.score >= self.config.stop_threshold {
            Verdict::Stop(StopCause::RetryScore)
        } else {
            Verdict::Continue
        }
    }
}
