use crate::application::{Application, ApplicationId, ApplicationStatus};
use std::collections::BTreeSet;

pub const EMPTY_LIST_TEXT: &str = "No applications from you yet";
pub const UNAVAILABLE_LIST_TEXT: &str = "Your applications could not be loaded";
pub const PLACEHOLDER_CARDS: usize = 3;

/// Local mirror of the signed-in user's applications.
#[derive(Clone, Debug, Default)]
pub struct ApplicationList {
    items: Vec<Application>,
    loaded: bool,
    loading: bool,
    failed: bool,
    deleting: BTreeSet<ApplicationId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListView {
    Loading { placeholders: usize },
    Empty { message: &'static str },
    /// The first load failed, so emptiness is unknown.
    Unavailable { message: &'static str },
    Populated(Vec<ApplicationCard>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApplicationCard {
    pub id: ApplicationId,
    pub description: String,
    pub status: ApplicationStatus,
    pub deleting: bool,
}

impl ApplicationList {
    pub fn items(&self) -> &[Application] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, id: &ApplicationId) -> bool {
        self.items.iter().any(|a| &a.id == id)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn begin_load(&mut self) {
        self.loading = true;
    }

    /// Ends a load. A failed load keeps whatever was shown before.
    pub fn finish_load(&mut self, items: Option<Vec<Application>>) {
        self.loading = false;
        match items {
            Some(items) => self.replace(items),
            None => self.failed = true,
        }
    }

    pub fn replace(&mut self, items: Vec<Application>) {
        self.deleting.retain(|id| items.iter().any(|a| &a.id == id));
        self.items = items;
        self.loaded = true;
        self.failed = false;
    }

    /// Appends, or replaces the row with the same id.
    pub fn insert(&mut self, application: Application) {
        match self.items.iter_mut().find(|a| a.id == application.id) {
            Some(existing) => *existing = application,
            None => self.items.push(application),
        }
    }

    pub fn remove(&mut self, id: &ApplicationId) -> bool {
        self.deleting.remove(id);
        let before = self.items.len();
        self.items.retain(|a| &a.id != id);
        self.items.len() != before
    }

    pub fn mark_deleting(&mut self, id: &ApplicationId, deleting: bool) {
        if deleting {
            self.deleting.insert(id.clone());
        } else {
            self.deleting.remove(id);
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Placeholders only cover the first load; later refreshes keep the
    /// current cards on screen.
    pub fn render(&self) -> ListView {
        if !self.loaded && (self.loading || !self.failed) {
            return ListView::Loading {
                placeholders: PLACEHOLDER_CARDS,
            };
        }
        if !self.loaded && self.items.is_empty() {
            return ListView::Unavailable {
                message: UNAVAILABLE_LIST_TEXT,
            };
        }
        if self.items.is_empty() {
            return ListView::Empty {
                message: EMPTY_LIST_TEXT,
            };
        }
        ListView::Populated(
            self.items
                .iter()
                .map(|a| ApplicationCard {
                    id: a.id.clone(),
                    description: a.description.clone(),
                    status: a.status(),
                    deleting: self.deleting.contains(&a.id),
                })
                .collect(),
        )
    }
}
