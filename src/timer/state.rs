use serde::{Deserialize, Serialize};

/// Counter and clock state shared by every page.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    /// Timestamp of the last clock tick, in milliseconds since the epoch.
    pub last_update: i64,
    /// Whether the last tick came from a live client clock.
    pub light: bool,
    /// User-driven counter. May go negative.
    pub count: i64,
}

impl TimerState {
    /// The state every fresh store starts from.
    pub const fn initial() -> Self {
        Self {
            last_update: 0,
            light: false,
            count: 0,
        }
    }

    /// Shallow-merge a partial state over this one.
    ///
    /// Fields present in `preloaded` win; absent fields keep their current value.
    pub fn merged(&self, preloaded: &PreloadedState) -> Self {
        Self {
            last_update: preloaded.last_update.unwrap_or(self.last_update),
            light: preloaded.light.unwrap_or(self.light),
            count: preloaded.count.unwrap_or(self.count),
        }
    }
}

/// Partial state handed over by a render pass.
///
/// Every field is optional so a page can seed only what it computed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreloadedState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub light: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<i64>,
}

impl From<TimerState> for PreloadedState {
    fn from(state: TimerState) -> Self {
        Self {
            last_update: Some(state.last_update),
            light: Some(state.light),
            count: Some(state.count),
        }
    }
}
