pub mod catalog;
pub mod notifications;
pub mod page;
pub mod progress;
pub mod reader;
pub mod router;
pub mod session;
pub mod shell;
pub mod state;

// Re-export the pieces the binary and the integration tests drive directly.
pub use notifications::{Notification, NotificationQueue, Severity};
pub use router::{NavigationCause, NavigationEngine, RouteChange};
pub use shell::{PageView, Shell};
pub use state::{AppState, AppStore};
