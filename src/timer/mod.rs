//! Counter and clock state, its actions, and the transition function.
//!
//! [`transition`] is total: every typed action has a defined result, and
//! [`transition_raw`] treats anything it cannot decode as a no-op.

mod action;
mod state;

pub use action::{
    client_tick, decrement, increment, reset, server_tick, tick_at, truthy, RawAction,
    TimerAction,
};
pub use state::{PreloadedState, TimerState};

/// Compute the next state. An absent state means [`TimerState::initial`].
pub fn transition(state: Option<&TimerState>, action: &TimerAction) -> TimerState {
    let state = state.copied().unwrap_or_else(TimerState::initial);
    reduce(&state, action)
}

/// Apply an untyped action. Unknown or malformed actions return the state unchanged.
pub fn transition_raw(state: Option<&TimerState>, action: &RawAction) -> TimerState {
    match action.decode() {
        Some(action) => transition(state, &action),
        None => state.copied().unwrap_or_else(TimerState::initial),
    }
}

/// Reducer shape used by [`Store`](crate::store::Store).
///
/// The counter wraps at the `i64` bounds, so decrement always undoes increment.
pub fn reduce(state: &TimerState, action: &TimerAction) -> TimerState {
    match *action {
        TimerAction::Tick { ts, light } => TimerState {
            last_update: ts,
            light,
            ..*state
        },
        TimerAction::Increment => TimerState {
            count: state.count.wrapping_add(1),
            ..*state
        },
        TimerAction::Decrement => TimerState {
            count: state.count.wrapping_sub(1),
            ..*state
        },
        TimerAction::Reset => TimerState {
            count: TimerState::initial().count,
            ..*state
        },
    }
}
