//! Lazy avatar reveal.
//!
//! A result row shows a placeholder icon until its avatar image has
//! loaded, then fades the image in after a short delay. Swapping the
//! source starts over.

use crate::core::State;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AvatarPhase {
    #[default]
    Pending,
    Loaded,
    Displayed,
}

impl State for AvatarPhase {
    fn name(&self) -> &str {
        match self {
            Self::Pending => "Pending",
            Self::Loaded => "Loaded",
            Self::Displayed => "Displayed",
        }
    }

    fn is_settled(&self) -> bool {
        matches!(self, Self::Displayed)
    }
}

/// Identifies one scheduled reveal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RevealToken(u64);

#[derive(Debug, Clone)]
pub struct LazyAvatar {
    source: Option<String>,
    phase: AvatarPhase,
    generation: u64,
    reveal_after: Duration,
}

impl LazyAvatar {
    pub fn new(reveal_after: Duration) -> Self {
        Self {
            source: None,
            phase: AvatarPhase::Pending,
            generation: 0,
            reveal_after,
        }
    }

    pub fn phase(&self) -> AvatarPhase {
        self.phase
    }

    /// Point the avatar at a (possibly new) image. Returns `true` if the
    /// host should start loading it.
    pub fn set_source(&mut self, source: &str) -> bool {
        if source.is_empty() || self.source.as_deref() == Some(source) {
            return false;
        }
        self.source = Some(source.to_string());
        self.phase = AvatarPhase::Pending;
        self.generation += 1;
        true
    }

    /// The image for `source` finished loading. Returns the reveal to
    /// schedule, unless the source changed meanwhile.
    pub fn on_loaded(&mut self, source: &str) -> Option<(RevealToken, Duration)> {
        if self.source.as_deref() != Some(source) || self.phase != AvatarPhase::Pending {
            return None;
        }
        self.phase = AvatarPhase::Loaded;
        Some((RevealToken(self.generation), self.reveal_after))
    }

    /// Reveal scheduled by `on_loaded` that has not fired yet.
    pub fn pending_reveal(&self) -> Option<RevealToken> {
        (self.phase == AvatarPhase::Loaded).then_some(RevealToken(self.generation))
    }

    pub fn on_reveal(&mut self, token: RevealToken) -> bool {
        if token != RevealToken(self.generation) || self.phase != AvatarPhase::Loaded {
            return false;
        }
        self.phase = AvatarPhase::Displayed;
        true
    }

    /// Source to put in the image element; empty until loaded.
    pub fn image_source(&self) -> Option<&str> {
        match self.phase {
            AvatarPhase::Pending => None,
            _ => self.source.as_deref(),
        }
    }

    pub fn shows_placeholder(&self) -> bool {
        self.phase == AvatarPhase::Pending
    }

    pub fn is_visible(&self) -> bool {
        self.phase == AvatarPhase::Displayed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REVEAL: Duration = Duration::from_millis(300);

    #[test]
    fn load_then_reveal() {
        let mut avatar = LazyAvatar::new(REVEAL);
        assert!(avatar.set_source("https://a/1"));
        assert!(avatar.shows_placeholder());
        assert_eq!(avatar.image_source(), None);

        let (token, after) = avatar.on_loaded("https://a/1").unwrap();
        assert_eq!(after, REVEAL);
        assert!(!avatar.shows_placeholder());
        assert_eq!(avatar.image_source(), Some("https://a/1"));
        assert!(!avatar.is_visible());

        assert_eq!(avatar.pending_reveal(), Some(token));
        assert!(avatar.on_reveal(token));
        assert!(avatar.is_visible());
        assert!(avatar.phase().is_settled());
        assert_eq!(avatar.pending_reveal(), None);
    }

    #[test]
    fn same_source_is_not_reloaded() {
        let mut avatar = LazyAvatar::new(REVEAL);
        assert!(avatar.set_source("https://a/1"));
        assert!(!avatar.set_source("https://a/1"));
        assert!(!avatar.set_source(""));
    }

    #[test]
    fn swapping_source_discards_old_load_and_reveal() {
        let mut avatar = LazyAvatar::new(REVEAL);
        avatar.set_source("https://a/1");
        let (old, _) = avatar.on_loaded("https://a/1").unwrap();

        avatar.set_source("https://a/2");
        assert!(!avatar.on_reveal(old));
        assert!(avatar.on_loaded("https://a/1").is_none());
        assert_eq!(avatar.phase(), AvatarPhase::Pending);

        let (new, _) = avatar.on_loaded("https://a/2").unwrap();
        assert!(avatar.on_reveal(new));
    }
}
