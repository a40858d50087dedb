use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::storage::{StoreHandle, THEME_KEY};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Interpret a stored flag: only `"light"` selects the light theme.
    pub fn from_stored(value: Option<&str>) -> Self {
        match value {
            Some("light") => Theme::Light,
            _ => Theme::Dark,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("unknown theme {other:?} (expected light or dark)")),
        }
    }
}

/// Anything that shows a light or dark variant.
pub trait ThemeSurface {
    fn set_variant(&mut self, theme: Theme);
}

pub type SharedSurface = Arc<Mutex<dyn ThemeSurface + Send>>;

/// A document body whose class list carries the theme.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    light: bool,
}

impl Document {
    pub fn is_light(&self) -> bool {
        self.light
    }

    pub fn body_class(&self) -> &'static str {
        if self.light {
            "light-theme"
        } else {
            ""
        }
    }
}

impl ThemeSurface for Document {
    fn set_variant(&mut self, theme: Theme) {
        self.light = theme == Theme::Light;
    }
}

/// Publishes the theme to the local surfaces and the optional embedded frame,
/// and persists it.
pub struct ThemeCoordinator {
    slots: StoreHandle,
    current: Theme,
    surfaces: Vec<SharedSurface>,
    frame: Option<SharedSurface>,
}

impl ThemeCoordinator {
    pub fn new(slots: StoreHandle) -> Self {
        Self {
            slots,
            current: Theme::default(),
            surfaces: Vec::new(),
            frame: None,
        }
    }

    pub fn current(&self) -> Theme {
        self.current
    }

    pub fn subscribe(&mut self, surface: SharedSurface) {
        set_variant(&surface, self.current);
        self.surfaces.push(surface);
    }

    /// Register the embedded document and bring it in line with the current
    /// theme, as when the frame finishes loading.
    pub fn attach_frame(&mut self, frame: SharedSurface) {
        set_variant(&frame, self.current);
        self.frame = Some(frame);
    }

    pub fn detach_frame(&mut self) {
        self.frame = None;
    }

    /// The stored theme, dark when absent or unreadable.
    pub fn stored(&self) -> Theme {
        match self.slots.get(THEME_KEY) {
            Ok(value) => Theme::from_stored(value.as_deref()),
            Err(err) => {
                warn!(target: "folio", event = "theme_read_failed", error = %err);
                Theme::Dark
            }
        }
    }

    /// Apply the stored theme.
    pub fn init(&mut self) -> Theme {
        let theme = self.stored();
        debug!(target: "folio", event = "theme_init", theme = theme.as_str());
        self.apply(theme);
        theme
    }

    pub fn toggle(&mut self) -> Theme {
        let next = self.current.toggled();
        self.apply(next);
        next
    }

    /// Push `theme` to every surface and the frame, then persist it. A failed
    /// write is logged and the theme stays applied.
    pub fn apply(&mut self, theme: Theme) {
        self.current = theme;
        for surface in &self.surfaces {
            set_variant(surface, theme);
        }
        if let Some(frame) = &self.frame {
            set_variant(frame, theme);
        }
        match self.slots.set(THEME_KEY, theme.as_str()) {
            Ok(()) => info!(target: "folio", event = "theme_applied", theme = theme.as_str()),
            Err(err) => warn!(
                target: "folio",
                event = "theme_save_failed",
                theme = theme.as_str(),
                error = %err
            ),
        }
    }
}

fn set_variant(surface: &SharedSurface, theme: Theme) {
    surface
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .set_variant(theme);
}
