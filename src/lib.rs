//! Project-card portfolio: a persisted list of project records edited through
//! a create/update/delete controller, a read-only gallery loaded from the
//! local slot or a remote document, card rendering, and a light/dark theme
//! shared between a page and its embedded frame.

pub mod card;
pub mod config;
pub mod contact;
pub mod controller;
pub mod error;
pub mod html;
pub mod loader;
pub mod logging;
pub mod notice;
pub mod record;
pub mod records;
pub mod state;
pub mod storage;
pub mod theme;

pub use card::{CardAttributes, ProjectCard};
pub use config::{Config, ConfigError};
pub use controller::{Confirm, CrudController, DeleteOutcome, EditMode, SubmitAction, SubmitOutcome};
pub use error::{AppError, AppResult};
pub use loader::{Gallery, LoadError, Loader, RemoteSource, Source, ViewState};
pub use logging::{flush_file_logs, init_file_logging, init_logging};
pub use notice::{Notice, NoticeLevel};
pub use record::{parse_tags, ProjectRecord};
pub use records::{Persisted, RecordStore, StoreError};
pub use state::{AppState, GalleryPage};
pub use storage::{SlotError, SlotStore, StoreHandle, PROJECTS_KEY, THEME_KEY};
pub use theme::{Theme, ThemeCoordinator, ThemeSurface};
