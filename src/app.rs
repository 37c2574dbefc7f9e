//! Page shell: store provider, persistence gate and theme.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::bootstrap::{AppStore, SessionStore, StoreContext};
use crate::config::AppConfig;
use crate::persist::PersistGate;
use crate::timer::{PreloadedState, TimerState};

/// Stylesheet applied around every page.
pub const GLOBAL_STYLE: &str = "body { margin: 0; padding: 0; box-sizing: border-box; \
font-family: 'Courier New', Courier, monospace; }";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeColors {
    pub primary: String,
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            primary: "#0070f3".to_string(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub colors: ThemeColors,
}

/// Props a render pass hands to the shell.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageProps {
    /// State computed by the render pass, merged into the session store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_redux_state: Option<PreloadedState>,
    /// Everything else, passed through to the page untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// What a page sees while rendering.
pub struct RenderScope<'a> {
    pub store: &'a AppStore,
    pub state: TimerState,
    pub theme: &'a Theme,
    pub props: &'a PageProps,
}

/// The application shell.
///
/// Owns the bootstrap context and the memoized session store, and wraps each
/// page in the persistence gate and theme.
#[derive(Debug)]
pub struct App {
    context: StoreContext,
    session: SessionStore,
    theme: Theme,
    gate: PersistGate,
}

impl App {
    /// Build the shell around `context`, applying `config`.
    pub fn new(context: StoreContext, config: AppConfig) -> Self {
        Self {
            context: context.with_config(config.persist),
            session: SessionStore::new(),
            theme: config.theme,
            gate: PersistGate::default(),
        }
    }

    /// Replace the loading gate.
    pub fn with_gate(mut self, gate: PersistGate) -> Self {
        self.gate = gate;
        self
    }

    /// Theme handed to every page.
    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Store for `props`, creating or merging it as needed.
    pub fn store(&mut self, props: &PageProps) -> AppStore {
        self.session
            .get_or_create(&mut self.context, props.initial_redux_state.as_ref())
    }

    /// Render one page.
    ///
    /// Shows the gate's placeholder until the store has rehydrated.
    pub fn render<F>(&mut self, props: &PageProps, page: F) -> String
    where
        F: FnOnce(&RenderScope<'_>) -> String,
    {
        let store = self.store(props);
        let theme = &self.theme;
        self.gate.render(store.persistor(), || {
            let scope = RenderScope {
                store: &store,
                state: store.get_state(),
                theme,
                props,
            };
            format!(
                "<style>{GLOBAL_STYLE}</style><div data-theme-primary=\"{}\">{}</div>",
                theme.colors.primary,
                page(&scope)
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use futures::executor::LocalPool;
    use serde_json::json;

    use super::*;
    use crate::bootstrap::ExecutionMode;
    use crate::persist::NoopStorage;

    fn count_page(scope: &RenderScope<'_>) -> String {
        format!("<p>{}</p>", scope.state.count)
    }

    #[test]
    fn page_props_read_initial_state_and_keep_extras() {
        let props: PageProps = serde_json::from_value(json!({
            "initialReduxState": {"lastUpdate": 12, "light": false},
            "title": "home"
        }))
        .unwrap();
        assert_eq!(props.initial_redux_state.unwrap().last_update, Some(12));
        assert_eq!(props.extra.get("title"), Some(&json!("home")));
    }

    #[test]
    fn render_is_gated_until_rehydrated() {
        let mut pool = LocalPool::new();
        let context = StoreContext::new(ExecutionMode::Interactive, Arc::new(NoopStorage), pool.spawner());
        let mut app = App::new(context, AppConfig::default());
        let props = PageProps::default();

        assert_eq!(app.render(&props, count_page), "<div>loading</div>");

        pool.run_until_stalled();
        let html = app.render(&props, count_page);
        assert!(html.starts_with("<style>body"));
        assert!(html.contains("data-theme-primary=\"#0070f3\""));
        assert!(html.ends_with("<p>0</p></div>"));
    }

    #[test]
    fn render_reuses_session_store_between_pages() {
        let mut pool = LocalPool::new();
        let context = StoreContext::new(ExecutionMode::Interactive, Arc::new(NoopStorage), pool.spawner());
        let mut app = App::new(context, AppConfig::default());
        let props = PageProps::default();

        app.store(&props).dispatch(crate::timer::increment());
        pool.run_until_stalled();

        assert!(app.render(&props, count_page).ends_with("<p>1</p></div>"));
    }
}
