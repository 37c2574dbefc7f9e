//! Integration tests for Tallyclock

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use futures::executor::{block_on, LocalPool};
use serde_json::json;
use tallyclock::{
    decrement, increment, reset, tick_at, transition, transition_raw, App, AppConfig,
    ExecutionMode, MemoryStorage, PageProps, PreloadedState, RawAction, SessionStore, Storage,
    StoreContext, TimerState,
};

fn interactive(storage: &MemoryStorage, pool: &LocalPool) -> StoreContext {
    StoreContext::new(
        ExecutionMode::Interactive,
        Arc::new(storage.clone()),
        pool.spawner(),
    )
}

#[test]
fn transition_laws() {
    let state = TimerState {
        last_update: 100,
        light: true,
        count: 3,
    };

    assert_eq!(
        transition_raw(Some(&state), &RawAction::named("UNKNOWN")),
        state
    );

    let up = transition(Some(&state), &increment());
    assert_eq!(transition(Some(&up), &decrement()), state);

    assert_eq!(transition(Some(&state), &reset()).count, 0);

    let ticked = transition(Some(&state), &tick_at(1_700_000_000_123, false));
    assert_eq!(ticked.last_update, 1_700_000_000_123);
    assert!(!ticked.light);
}

#[test]
fn raw_ticks_coerce_light() {
    let zero = RawAction::from_value(&json!({"type": "TICK", "ts": 1, "light": 0})).unwrap();
    let text = RawAction::from_value(&json!({"type": "TICK", "ts": 2, "light": "x"})).unwrap();
    assert!(!transition_raw(None, &zero).light);
    assert!(transition_raw(None, &text).light);
}

#[test]
fn persistence_round_trip() {
    let storage = MemoryStorage::default();

    {
        let mut pool = LocalPool::new();
        let mut ctx = interactive(&storage, &pool);
        let store = ctx.initialize_store(None);
        pool.run_until_stalled();

        for _ in 0..7 {
            store.dispatch(increment());
        }
        store.dispatch(tick_at(555, true));
        block_on(store.persistor().flush()).expect("flush");
    }

    assert_eq!(
        storage.snapshot("persist:primary").as_deref(),
        Some(r#"{"count":7}"#)
    );

    let mut pool = LocalPool::new();
    let mut ctx = interactive(&storage, &pool);
    let store = ctx.initialize_store(None);
    pool.run_until_stalled();

    assert_eq!(
        store.get_state(),
        TimerState {
            last_update: 0,
            light: false,
            count: 7
        }
    );
}

#[test]
fn stored_count_survives_until_rehydration() {
    let storage = MemoryStorage::default();
    block_on(storage.set_item("persist:primary", r#"{"count":4}"#)).expect("seed storage");

    let mut pool = LocalPool::new();
    let mut ctx = interactive(&storage, &pool);
    let store = ctx.initialize_store(None);

    // Defaults must not be written over the stored entry before it is read.
    block_on(store.persistor().flush()).expect("flush");
    assert_eq!(
        storage.snapshot("persist:primary").as_deref(),
        Some(r#"{"count":4}"#)
    );

    pool.run_until_stalled();
    assert_eq!(store.get_state().count, 4);
}

#[test]
fn singleton_merge() {
    let mut pool = LocalPool::new();
    let mut ctx = interactive(&MemoryStorage::default(), &pool);

    ctx.initialize_store(Some(&PreloadedState {
        last_update: Some(100),
        light: Some(true),
        count: Some(3),
    }));
    pool.run_until_stalled();

    let merged = ctx.initialize_store(Some(&PreloadedState {
        count: Some(5),
        ..Default::default()
    }));
    assert_eq!(
        merged.get_state(),
        TimerState {
            last_update: 100,
            light: true,
            count: 5
        }
    );
}

#[test]
fn interactive_app_persists_without_flush() {
    let storage = MemoryStorage::default();
    let mut pool = LocalPool::new();
    let mut app = App::new(interactive(&storage, &pool), AppConfig::default());
    let props = PageProps::default();

    app.render(&props, |_| String::new());
    pool.run_until_stalled();

    let store = app.store(&props);
    for _ in 0..7 {
        store.dispatch(increment());
    }
    pool.run_until_stalled();

    assert!(app.render(&props, |scope| scope.state.count.to_string()).ends_with("7</div>"));
    assert_eq!(
        storage.snapshot("persist:primary").as_deref(),
        Some(r#"{"count":7}"#)
    );
}

#[test]
fn stored_count_wins_after_merge_rehydrates() {
    let storage = MemoryStorage::default();
    let mut pool = LocalPool::new();
    let mut ctx = interactive(&storage, &pool);

    ctx.initialize_store(Some(&PreloadedState {
        last_update: Some(100),
        light: Some(true),
        count: Some(3),
    }));
    pool.run_until_stalled();

    let merged = ctx.initialize_store(Some(&PreloadedState {
        count: Some(5),
        ..Default::default()
    }));
    assert_eq!(merged.get_state().count, 5);

    pool.run_until_stalled();
    assert_eq!(
        merged.get_state(),
        TimerState {
            last_update: 100,
            light: true,
            count: 3
        }
    );
}

#[test]
fn stale_store_cannot_overwrite_merged_store() {
    let storage = MemoryStorage::default();
    let mut pool = LocalPool::new();
    let mut ctx = interactive(&storage, &pool);

    let stale = ctx.initialize_store(None);
    pool.run_until_stalled();

    let merged = ctx.initialize_store(Some(&PreloadedState {
        light: Some(true),
        ..Default::default()
    }));
    pool.run_until_stalled();
    merged.dispatch(increment());

    for _ in 0..4 {
        stale.dispatch(decrement());
    }
    pool.run_until_stalled();

    assert_eq!(
        storage.snapshot("persist:primary").as_deref(),
        Some(r#"{"count":1}"#)
    );
}

#[test]
fn render_only_context_never_reuses() {
    let pool = LocalPool::new();
    let mut ctx = StoreContext::new(
        ExecutionMode::RenderOnly,
        Arc::new(MemoryStorage::default()),
        pool.spawner(),
    );
    let first = ctx.initialize_store(None);
    first.dispatch(increment());
    let second = ctx.initialize_store(None);

    assert!(!first.ptr_eq(&second));
    assert_eq!(second.get_state().count, 0);
}

#[test]
fn store_subscription() {
    let pool = LocalPool::new();
    let mut ctx = interactive(&MemoryStorage::default(), &pool);
    let store = SessionStore::new().get_or_create(&mut ctx, None);

    let counter = Arc::new(AtomicUsize::new(0));
    let counter_clone = counter.clone();
    let subscription = store.subscribe(move |_| {
        counter_clone.fetch_add(1, Ordering::SeqCst);
    });

    store.dispatch(increment());
    store.dispatch(decrement());
    assert_eq!(counter.load(Ordering::SeqCst), 2);

    drop(subscription);
    store.dispatch(increment());
    assert_eq!(counter.load(Ordering::SeqCst), 2);
}

#[test]
fn app_renders_page_after_rehydration() {
    let storage = MemoryStorage::default();
    block_on(storage.set_item("persist:primary", r#"{"count":2}"#)).expect("seed storage");

    let mut pool = LocalPool::new();
    let mut app = App::new(interactive(&storage, &pool), AppConfig::default());
    let props: PageProps = serde_json::from_value(json!({
        "initialReduxState": {"lastUpdate": 99, "light": false}
    }))
    .unwrap();

    let page = |scope: &tallyclock::RenderScope<'_>| {
        format!("{}@{}", scope.state.count, scope.state.last_update)
    };

    assert_eq!(app.render(&props, page), "<div>loading</div>");
    pool.run_until_stalled();
    assert!(app.render(&props, page).ends_with("2@99</div>"));
}
