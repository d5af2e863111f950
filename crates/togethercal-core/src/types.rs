/// Event variant tag without model dependencies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Holiday,
    SpecialDay,
    WeeklyActivity,
    OneTimeEvent,
}

impl EventKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Holiday => "holiday",
            Self::SpecialDay => "special_day",
            Self::WeeklyActivity => "weekly_activity",
            Self::OneTimeEvent => "one_time_event",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
