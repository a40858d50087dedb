//! Create/update/delete flow between a project form and the [`RecordStore`].
//!
//! The controller owns a single piece of state, the edit mode. In
//! [`EditMode::Creating`] a submit appends; in [`EditMode::Editing`] it
//! replaces the record at that position. Every submit returns to creating.

use std::fmt::Write as _;

use tracing::{debug, info};

use crate::html::escape;
use crate::notice::Notice;
use crate::record::ProjectRecord;
use crate::records::{Persisted, RecordStore, StoreError};
use crate::storage::StoreHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditMode {
    Creating,
    Editing(usize),
}

/// Yes/no prompt consulted before a delete.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitAction {
    Created,
    Updated,
}

#[derive(Debug)]
pub struct SubmitOutcome {
    pub action: SubmitAction,
    pub position: usize,
    pub persisted: Persisted,
    /// Outcome of the slot write on its own.
    pub save_notice: Notice,
    /// What the user sees once the operation completes.
    pub notice: Notice,
}

#[derive(Debug)]
pub enum DeleteOutcome {
    Declined,
    Deleted {
        record: ProjectRecord,
        persisted: Persisted,
        save_notice: Notice,
        notice: Notice,
    },
}

#[derive(Debug)]
pub struct CrudController {
    store: RecordStore,
    mode: EditMode,
}

impl CrudController {
    pub fn new(store: RecordStore) -> Self {
        Self {
            store,
            mode: EditMode::Creating,
        }
    }

    /// Load the projects slot and start in creating mode. A failed load
    /// yields an empty list and an error notice.
    pub fn open(slots: StoreHandle) -> (Self, Option<Notice>) {
        let (store, loaded) = RecordStore::open(slots);
        let notice = loaded.err().map(|_| load_failed_notice());
        (Self::new(store), notice)
    }

    pub fn mode(&self) -> EditMode {
        self.mode
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn records(&self) -> &[ProjectRecord] {
        self.store.records()
    }

    pub fn submit_label(&self) -> &'static str {
        match self.mode {
            EditMode::Creating => "Create Project",
            EditMode::Editing(_) => "Update Project",
        }
    }

    pub fn submit(&mut self, fields: ProjectRecord) -> Result<SubmitOutcome, StoreError> {
        let mode = std::mem::replace(&mut self.mode, EditMode::Creating);
        let (action, position, persisted) = match mode {
            EditMode::Creating => {
                let persisted = self.store.append(fields);
                (SubmitAction::Created, self.store.len() - 1, persisted)
            }
            EditMode::Editing(position) => {
                let persisted = self.store.replace_at(position, fields)?;
                (SubmitAction::Updated, position, persisted)
            }
        };

        info!(
            target: "folio",
            event = "project_submitted",
            action = ?action,
            position,
            saved = persisted.is_saved()
        );

        let notice = match (&persisted, action) {
            (Persisted::Failed(err), _) => save_failed_notice(err),
            (Persisted::Saved, SubmitAction::Created) => {
                Notice::success("Project created successfully!")
            }
            (Persisted::Saved, SubmitAction::Updated) => {
                Notice::success("Project updated successfully!")
            }
        };

        Ok(SubmitOutcome {
            action,
            position,
            save_notice: save_notice(&persisted),
            persisted,
            notice,
        })
    }

    /// Enter edit mode for `position` and return a copy of the record so the
    /// form can be prefilled.
    pub fn begin_edit(&mut self, position: usize) -> Result<(ProjectRecord, Notice), StoreError> {
        self.store.check_position(position)?;
        let record = self.store.records()[position].clone();
        self.mode = EditMode::Editing(position);
        debug!(target: "folio", event = "project_edit_started", position);
        Ok((
            record,
            Notice::info("Editing project. Modify fields and click Update."),
        ))
    }

    pub fn cancel_edit(&mut self) {
        self.mode = EditMode::Creating;
    }

    pub fn delete(
        &mut self,
        position: usize,
        confirm: &mut dyn Confirm,
    ) -> Result<DeleteOutcome, StoreError> {
        self.store.check_position(position)?;
        let prompt = format!(
            "Are you sure you want to delete \"{}\"?",
            self.store.records()[position].title
        );
        if !confirm.confirm(&prompt) {
            debug!(target: "folio", event = "project_delete_declined", position);
            return Ok(DeleteOutcome::Declined);
        }

        let (record, persisted) = self.store.remove_at(position)?;
        match self.mode {
            EditMode::Editing(p) if p == position => self.cancel_edit(),
            EditMode::Editing(p) if p > position => self.mode = EditMode::Editing(p - 1),
            _ => {}
        }

        info!(
            target: "folio",
            event = "project_deleted",
            position,
            saved = persisted.is_saved()
        );

        let notice = match &persisted {
            Persisted::Saved => Notice::success(format!("Deleted: {}", record.title)),
            Persisted::Failed(err) => save_failed_notice(err),
        };
        Ok(DeleteOutcome::Deleted {
            record,
            save_notice: save_notice(&persisted),
            persisted,
            notice,
        })
    }

    /// Re-read the projects slot, dropping edit mode if its target is gone.
    pub fn refresh(&mut self) -> Option<Notice> {
        let loaded = self.store.load();
        if let EditMode::Editing(p) = self.mode {
            if p >= self.store.len() {
                self.cancel_edit();
            }
        }
        loaded.err().map(|_| load_failed_notice())
    }

    /// HTML for the management list, or the empty-state block.
    pub fn render_list(&self) -> String {
        if self.store.is_empty() {
            return concat!(
                "<div class=\"empty-state\">",
                "<p>No projects found in storage.</p>",
                "<p>Add a new project using the form above, or load projects from the main page.</p>",
                "</div>"
            )
            .to_string();
        }

        let mut out = String::new();
        for (position, record) in self.store.records().iter().enumerate() {
            let _ = write!(
                out,
                concat!(
                    "<div class=\"project-item\">",
                    "<div class=\"project-item-header\">",
                    "<span class=\"project-item-index\">[{index}]</span>",
                    "<h3 class=\"project-item-title\">{title}</h3>",
                    "</div>",
                    "<p class=\"project-item-description\">{description}</p>",
                    "<div class=\"project-item-actions\">",
                    "<button class=\"btn btn-small btn-edit\" data-index=\"{position}\">Edit</button>",
                    "<button class=\"btn btn-small btn-delete\" data-index=\"{position}\">Delete</button>",
                    "</div>",
                    "</div>"
                ),
                index = escape(&record.index),
                title = escape(&record.title),
                description = escape(&record.description),
                position = position,
            );
        }
        out
    }
}

fn load_failed_notice() -> Notice {
    Notice::error("Failed to load projects from storage")
}

fn save_failed_notice(err: &StoreError) -> Notice {
    Notice::error(format!("Failed to save: {err}"))
}

fn save_notice(persisted: &Persisted) -> Notice {
    match persisted {
        Persisted::Saved => Notice::success("Changes saved successfully!"),
        Persisted::Failed(err) => save_failed_notice(err),
    }
}
