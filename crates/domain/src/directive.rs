//! Operator directives carried by inbound chat messages.

use std::fmt;

/// A command an operator can send through the command channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Directive {
    /// Clear every device lockout.
    ResetLockouts,
    /// Force every device off until resumed.
    Stop,
    /// Leave stop mode.
    Resume,
    /// Report schedule, stop flag and per-device state.
    Status,
}

impl Directive {
    /// Every directive, in the order they are applied when one message
    /// carries several.
    pub const ALL: [Self; 4] = [Self::ResetLockouts, Self::Stop, Self::Resume, Self::Status];

    /// Chat keyword that selects this directive.
    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            Self::ResetLockouts => "/reset",
            Self::Stop => "/stop",
            Self::Resume => "/start",
            Self::Status => "/info",
        }
    }

    /// Find every directive mentioned in `text`, case-insensitively.
    ///
    /// Unrecognised text yields an empty list.
    #[must_use]
    pub fn parse_all(text: &str) -> Vec<Self> {
        let text = text.to_lowercase();
        Self::ALL
            .into_iter()
            .filter(|directive| text.contains(directive.keyword()))
            .collect()
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}
