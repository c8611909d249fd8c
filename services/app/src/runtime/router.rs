//! services/app/src/runtime/router.rs
//!
//! The navigation engine: owns the location fragment and its history stack, and
//! publishes a route-changed event for every location change, whether it came
//! from `navigate`, from back/forward, or from the browser itself.

use futures::Stream;
use novaread_core::route::{normalize_fragment, PageId, Route};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

const EVENT_CAPACITY: usize = 64;
/// Oldest entries are dropped past this many.
const HISTORY_LIMIT: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NavigationCause {
    Navigate,
    Back,
    Forward,
    /// The location changed outside the engine (typed URL, link with a plain href).
    External,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteChange {
    pub fragment: String,
    pub route: Route,
    pub cause: NavigationCause,
    /// Set when entering the reader, which always starts at the top of the chapter.
    pub scroll_to_top: bool,
}

pub struct NavigationEngine {
    history: Vec<String>,
    cursor: usize,
    scroll_offset: f64,
    events: broadcast::Sender<RouteChange>,
}

impl NavigationEngine {
    pub fn new(initial_fragment: &str) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            history: vec![normalize_fragment(initial_fragment)],
            cursor: 0,
            scroll_offset: 0.0,
            events,
        }
    }

    pub fn current_fragment(&self) -> &str {
        // `history` is never empty and `cursor` always indexes into it.
        &self.history[self.cursor]
    }

    /// Derives the route from the current fragment. Pure.
    pub fn current_route(&self) -> Route {
        Route::parse(self.current_fragment())
    }

    /// Moves to `path`. Navigating to the current fragment emits nothing.
    pub fn navigate(&mut self, path: &str) -> Option<RouteChange> {
        self.push(path, NavigationCause::Navigate)
    }

    /// Records a location change made by the browser rather than by `navigate`.
    pub fn location_changed(&mut self, fragment: &str) -> Option<RouteChange> {
        self.push(fragment, NavigationCause::External)
    }

    pub fn back(&mut self) -> Option<RouteChange> {
        if !self.can_go_back() {
            return None;
        }
        self.cursor -= 1;
        Some(self.emit(NavigationCause::Back))
    }

    pub fn forward(&mut self) -> Option<RouteChange> {
        if !self.can_go_forward() {
            return None;
        }
        self.cursor += 1;
        Some(self.emit(NavigationCause::Forward))
    }

    pub fn can_go_back(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.cursor + 1 < self.history.len()
    }

    pub fn scroll_offset(&self) -> f64 {
        self.scroll_offset
    }

    pub fn set_scroll_offset(&mut self, offset: f64) {
        self.scroll_offset = offset.max(0.0);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RouteChange> {
        self.events.subscribe()
    }

    /// Route-changed events from now on, as a stream.
    pub fn changes(&self) -> impl Stream<Item = RouteChange> + Send + 'static {
        let mut receiver = self.events.subscribe();
        async_stream::stream! {
            loop {
                match receiver.recv().await {
                    Ok(change) => yield change,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("Route subscriber fell behind, {} events skipped", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    fn push(&mut self, path: &str, cause: NavigationCause) -> Option<RouteChange> {
        let fragment = normalize_fragment(path);
        if fragment == self.current_fragment() {
            debug!("Already at {}, no route change", fragment);
            return None;
        }
        self.history.truncate(self.cursor + 1);
        self.history.push(fragment);
        self.cursor += 1;
        if self.history.len() > HISTORY_LIMIT {
            let excess = self.history.len() - HISTORY_LIMIT;
            self.history.drain(..excess);
            self.cursor -= excess;
        }
        Some(self.emit(cause))
    }

    fn emit(&mut self, cause: NavigationCause) -> RouteChange {
        let route = self.current_route();
        let scroll_to_top = route.page() == PageId::Reader;
        if scroll_to_top {
            self.scroll_offset = 0.0;
        }
        let change = RouteChange {
            fragment: self.current_fragment().to_string(),
            route,
            cause,
            scroll_to_top,
        };
        info!("Route changed ({:?}) to {}", cause, change.fragment);
        // No subscribers is fine.
        let _ = self.events.send(change.clone());
        change
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[test]
    fn navigate_then_current_route_reflects_the_path() {
        let mut engine = NavigationEngine::new("");
        let cases = [
            ("#/browse?q=sea", PageId::Browse),
            ("#/rankings", PageId::Rankings),
            ("#/library", PageId::Library),
            ("#/login", PageId::Login),
            ("#/register", PageId::Register),
            ("#/forgot-password", PageId::ForgotPassword),
            ("#/admin", PageId::Admin),
            ("#/profile", PageId::Profile),
            ("#/novel/n1", PageId::NovelDetail),
            ("#/read/c1", PageId::Reader),
            ("#/", PageId::Home),
        ];
        for (path, page) in cases {
            engine.navigate(path);
            assert_eq!(engine.current_route().page(), page, "after navigating to {}", path);
        }
        assert_eq!(engine.current_route(), Route::parse(engine.current_fragment()));
    }

    #[test]
    fn same_fragment_emits_nothing() {
        let mut engine = NavigationEngine::new("#/rankings");
        let mut events = engine.subscribe();
        assert!(engine.navigate("/rankings").is_none());
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn history_supports_back_and_forward_and_truncates_on_push() {
        let mut engine = NavigationEngine::new("#/");
        engine.navigate("#/novel/a");
        engine.navigate("#/read/c1");

        let back = engine.back().unwrap();
        assert_eq!(back.cause, NavigationCause::Back);
        assert_eq!(back.route, Route::NovelDetail { id: "a".to_string() });

        engine.navigate("#/browse");
        assert!(!engine.can_go_forward());
        assert!(engine.forward().is_none());

        engine.back();
        engine.back();
        assert!(engine.back().is_none());
        assert_eq!(engine.current_route(), Route::Home);
    }

    #[test]
    fn history_is_bounded_and_keeps_the_newest_entries() {
        let mut engine = NavigationEngine::new("#/");
        for n in 0..HISTORY_LIMIT + 25 {
            engine.navigate(&format!("#/novel/n{}", n));
        }
        assert_eq!(engine.history.len(), HISTORY_LIMIT);
        assert_eq!(engine.current_fragment(), format!("#/novel/n{}", HISTORY_LIMIT + 24));

        let mut steps = 0;
        while engine.back().is_some() {
            steps += 1;
        }
        assert_eq!(steps, HISTORY_LIMIT - 1);
        assert_eq!(engine.current_fragment(), "#/novel/n25");
        assert!(engine.forward().is_some());
    }

    #[test]
    fn entering_the_reader_resets_scroll() {
        let mut engine = NavigationEngine::new("#/");
        engine.set_scroll_offset(640.0);
        let change = engine.navigate("#/novel/a").unwrap();
        assert!(!change.scroll_to_top);
        assert_eq!(engine.scroll_offset(), 640.0);

        let change = engine.location_changed("#/read/c9").unwrap();
        assert!(change.scroll_to_top);
        assert_eq!(change.cause, NavigationCause::External);
        assert_eq!(engine.scroll_offset(), 0.0);
    }

    #[tokio::test]
    async fn subscribers_see_each_change_once() {
        let mut engine = NavigationEngine::new("#/");
        let changes = engine.changes();
        tokio::pin!(changes);

        engine.navigate("#/novel/x");
        engine.navigate("#/novel/x");
        engine.back();

        let first = changes.next().await.unwrap();
        let second = changes.next().await.unwrap();
        assert_eq!(first.fragment, "#/novel/x");
        assert_eq!(second.route, Route::Home);
        assert_eq!(second.cause, NavigationCause::Back);

        drop(engine);
        assert!(changes.next().await.is_none());
    }
}
