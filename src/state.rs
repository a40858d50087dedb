use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::config::Config;
use crate::controller::CrudController;
use crate::html::escape;
use crate::loader::{present, Gallery, Loader, Source};
use crate::notice::Notice;
use crate::storage::StoreHandle;
use crate::theme::{Document, SharedSurface, ThemeCoordinator};
use crate::AppResult;

/// Everything a page needs, built once at startup and passed down.
#[derive(Clone, Debug)]
pub struct AppState {
    pub config: Config,
    pub slots: StoreHandle,
    pub data_dir: Arc<PathBuf>,
}

impl AppState {
    /// Open the slot file under the configured data directory.
    pub fn open(config: Config) -> AppResult<Self> {
        let data_dir = config.data_dir()?;
        let slots = StoreHandle::file(&data_dir)?;
        Ok(Self::with_slots(config, slots, data_dir))
    }

    pub fn with_slots(config: Config, slots: StoreHandle, data_dir: PathBuf) -> Self {
        Self {
            config,
            slots,
            data_dir: Arc::new(data_dir),
        }
    }

    pub fn crud(&self) -> (CrudController, Option<Notice>) {
        CrudController::open(self.slots.clone())
    }

    pub fn loader(&self) -> AppResult<Loader> {
        Ok(Loader::new(self.slots.clone(), self.config.remote_source())?)
    }

    /// The display page with its theme applied to the document and gallery.
    pub fn gallery_page(&self) -> AppResult<GalleryPage> {
        let mut theme = ThemeCoordinator::new(self.slots.clone());
        let document = Arc::new(Mutex::new(Document::default()));
        let gallery = Arc::new(Mutex::new(Gallery::new(theme.stored())));
        let document_surface: SharedSurface = document.clone();
        let gallery_surface: SharedSurface = gallery.clone();
        theme.subscribe(document_surface);
        theme.subscribe(gallery_surface);
        theme.init();
        Ok(GalleryPage {
            theme,
            document,
            gallery,
            loader: self.loader()?,
        })
    }
}

pub struct GalleryPage {
    pub theme: ThemeCoordinator,
    document: Arc<Mutex<Document>>,
    gallery: Arc<Mutex<Gallery>>,
    loader: Loader,
}

impl GalleryPage {
    /// Show the loading state, load without holding the gallery lock, then
    /// display the outcome.
    pub async fn load(&self, source: Source) {
        self.gallery().begin_loading();
        let result = self.loader.load(source).await;
        present(source, result, &mut self.gallery());
    }

    pub fn gallery(&self) -> MutexGuard<'_, Gallery> {
        self.gallery.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn document(&self) -> MutexGuard<'_, Document> {
        self.document.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn render(&self) -> String {
        let body_class = self.document().body_class();
        let class_attr = if body_class.is_empty() {
            String::new()
        } else {
            format!(" class=\"{}\"", escape(body_class))
        };
        format!(
            "<!DOCTYPE html>\n<html><body{class_attr}><main id=\"projects-container\">{}</main></body></html>\n",
            self.gallery().render()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::ViewState;
    use crate::storage::{PROJECTS_KEY, THEME_KEY};
    use crate::theme::Theme;

    fn state() -> AppState {
        AppState::with_slots(
            Config::default(),
            StoreHandle::in_memory(),
            PathBuf::from("unused"),
        )
    }

    #[test]
    fn crud_and_gallery_share_slots() {
        let state = state();
        let (mut crud, _) = state.crud();
        crud.submit(crate::ProjectRecord::titled("Shared")).unwrap();

        let page = state.gallery_page().unwrap();
        tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
            .block_on(page.load(Source::Local));
        assert_eq!(page.gallery().state(), &ViewState::Cards);
        assert!(page.render().contains("<h2>Shared</h2>"));
    }

    #[test]
    fn stored_light_theme_reaches_cards_and_body() {
        let state = state();
        state.slots.set(THEME_KEY, "light").unwrap();
        state.slots.set(PROJECTS_KEY, r#"[{"title":"A"}]"#).unwrap();
        let mut page = state.gallery_page().unwrap();
        tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
            .block_on(page.load(Source::Local));
        assert!(page.gallery().cards()[0].is_light());
        assert!(page.render().contains("<body class=\"light-theme\">"));

        assert_eq!(page.theme.toggle(), Theme::Dark);
        assert!(!page.gallery().cards()[0].is_light());
        assert!(page.render().contains("<body>"));
    }
}
