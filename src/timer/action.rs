use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Actions accepted by [`transition`](super::transition).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimerAction {
    /// Clock update carrying its own timestamp.
    Tick {
        /// Milliseconds since the epoch.
        ts: i64,
        /// `true` for a live client clock, `false` for a render pass.
        light: bool,
    },
    Increment,
    Decrement,
    Reset,
}

/// Tick stamped by a non-interactive render pass.
pub fn server_tick() -> TimerAction {
    tick_at(now_ms(), false)
}

/// Tick stamped by the live client clock.
pub fn client_tick() -> TimerAction {
    tick_at(now_ms(), true)
}

/// Tick with an explicit timestamp.
pub fn tick_at(ts: i64, light: bool) -> TimerAction {
    TimerAction::Tick { ts, light }
}

/// Add one to the count.
pub fn increment() -> TimerAction {
    TimerAction::Increment
}

/// Subtract one from the count. There is no floor.
pub fn decrement() -> TimerAction {
    TimerAction::Decrement
}

/// Set the count back to zero.
pub fn reset() -> TimerAction {
    TimerAction::Reset
}

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// An action as it arrives from an untyped boundary (JSON, devtools, replay logs).
///
/// Decoding is lenient: `light` accepts any JSON value and is coerced by
/// truthiness, and anything that does not name a known action decodes to
/// `None`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawAction {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts: Option<Value>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub light: Value,
}

impl RawAction {
    /// Raw action with only a type tag.
    pub fn named(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Default::default()
        }
    }

    /// Parse a raw action from a JSON value.
    ///
    /// Values that are not an object with a string `type` yield `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }

    /// Decode into a typed action, or `None` when the tag is unknown or the
    /// payload is unusable.
    pub fn decode(&self) -> Option<TimerAction> {
        match self.kind.as_str() {
            "TICK" => {
                let ts = self.ts.as_ref().and_then(timestamp_ms)?;
                Some(TimerAction::Tick {
                    ts,
                    light: truthy(&self.light),
                })
            }
            "INCREMENT" => Some(TimerAction::Increment),
            "DECREMENT" => Some(TimerAction::Decrement),
            "RESET" => Some(TimerAction::Reset),
            _ => None,
        }
    }
}

impl From<TimerAction> for RawAction {
    fn from(action: TimerAction) -> Self {
        match action {
            TimerAction::Tick { ts, light } => Self {
                kind: "TICK".to_string(),
                ts: Some(Value::from(ts)),
                light: Value::Bool(light),
            },
            TimerAction::Increment => Self::named("INCREMENT"),
            TimerAction::Decrement => Self::named("DECREMENT"),
            TimerAction::Reset => Self::named("RESET"),
        }
    }
}

const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

// Integral floats are accepted since JSON producers often emit `1.7e12`.
fn timestamp_ms(value: &Value) -> Option<i64> {
    if let Some(ts) = value.as_i64() {
        return Some(ts);
    }
    let ts = value.as_f64()?;
    if ts.fract() == 0.0 && ts.abs() <= MAX_SAFE_INTEGER {
        Some(ts as i64)
    } else {
        None
    }
}

/// Boolean coercion with script-host truthiness.
///
/// `null`, `false`, `0` and the empty string are falsy. Arrays and objects
/// are truthy even when empty.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
