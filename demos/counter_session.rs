//! A render-only pass followed by an interactive session with persistence

use std::sync::Arc;

use futures::executor::LocalPool;
use tallyclock::{
    client_tick, decrement, increment, reset, server_tick, App, AppConfig, ExecutionMode,
    MemoryStorage, NoopStorage, PageProps, PreloadedState, RenderScope, StoreContext,
};

fn page(scope: &RenderScope<'_>) -> String {
    let state = scope.state;
    format!(
        "<h1 style=\"color:{}\">{}</h1><p>clock {} ({})</p>",
        scope.theme.colors.primary,
        state.count,
        state.last_update,
        if state.light { "live" } else { "static" }
    )
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("=== Counter Session ===\n");

    // A render pass computes the clock once and hands it over as page props.
    println!("1. Render-only pass");
    let render_pool = LocalPool::new();
    let mut render_ctx = StoreContext::new(
        ExecutionMode::RenderOnly,
        Arc::new(NoopStorage),
        render_pool.spawner(),
    );
    let server_store = render_ctx.initialize_store(None);
    server_store.dispatch(server_tick());
    let props = PageProps {
        initial_redux_state: Some(PreloadedState {
            last_update: Some(server_store.get_state().last_update),
            light: Some(false),
            count: None,
        }),
        ..Default::default()
    };
    println!("   handed over: {:?}", props.initial_redux_state);

    // The interactive session picks the props up and restores the counter.
    println!("\n2. Interactive session");
    let storage = MemoryStorage::default();
    let mut pool = LocalPool::new();
    let context = StoreContext::new(
        ExecutionMode::Interactive,
        Arc::new(storage.clone()),
        pool.spawner(),
    );
    let mut app = App::new(context, AppConfig::default());

    println!("   before rehydration: {}", app.render(&props, page));
    pool.run_until_stalled();
    println!("   after rehydration:  {}", app.render(&props, page));

    println!("\n3. Interacting");
    let store = app.store(&props);
    let _log = store.subscribe(|state| println!("   [State] {:?}", state));
    store.dispatch(client_tick());
    store.dispatch(increment());
    store.dispatch(increment());
    store.dispatch(decrement());
    println!("   {}", app.render(&props, page));

    println!("\n4. Persisting");
    pool.run_until_stalled();
    println!(
        "   stored: {:?}",
        storage.snapshot(store.persistor().storage_key())
    );

    println!("\n5. Resetting");
    store.dispatch(reset());
    println!("   {}", app.render(&props, page));

    println!("\n✓ Session complete!");
}
