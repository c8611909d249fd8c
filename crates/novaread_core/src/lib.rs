pub mod commands;
pub mod domain;
pub mod input;
pub mod ports;
pub mod route;
pub mod views;

pub use commands::{ChapterDraft, ChapterPatch, NovelDraft, NovelPatch};
pub use domain::{
    AuthSession, Chapter, ChapterDetails, Comment, LibraryEntry, LibraryStatus, Novel,
    NovelDetails, NovelStatus, ReaderSettings, ReaderTheme, ReadingProgress, Review, Role, Theme,
    User,
};
pub use input::ListInput;
pub use ports::{AuthService, CatalogService, HtmlSanitizer, PortError, PortResult};
pub use route::{PageId, Route, SearchFilters, SortBy};
