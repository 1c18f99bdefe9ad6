//! User list screen.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::http::Transport;
use crate::route::{Navigator, Route};
use crate::store::{RequestStatus, UserStore};
use crate::types::{User, UserId};

/// Question asked before a delete is dispatched.
pub const DELETE_PROMPT: &str = "¿Eliminar usuario?";

/// Interactive yes/no gate.
pub trait Confirm {
    fn confirm(&mut self, message: &str) -> bool;
}

impl<F: FnMut(&str) -> bool> Confirm for F {
    fn confirm(&mut self, message: &str) -> bool {
        self(message)
    }
}

/// Lists users and dispatches deletes.
pub struct ListView<T> {
    store: Arc<UserStore<T>>,
    mounted: bool,
}

impl<T> ListView<T> {
    pub fn new(store: Arc<UserStore<T>>) -> Self {
        Self { store, mounted: false }
    }

    /// Route to the edit form for `id`.
    pub fn edit(&self, id: UserId, navigator: &mut dyn Navigator) {
        navigator.navigate(Route::Edit(id));
    }

    /// Marks the view as shown. Returns whether this first showing should
    /// fetch, which is only the case while the store has never loaded.
    pub fn begin_mount(&mut self) -> bool {
        if self.mounted {
            return false;
        }
        self.mounted = true;
        self.store.status().is_idle()
    }

    /// Asks before a delete. Declining is a no-op.
    pub fn confirm_delete(&self, id: UserId, confirm: &mut dyn Confirm) -> bool {
        let confirmed = confirm.confirm(DELETE_PROMPT);
        if !confirmed {
            debug!(id, "delete declined");
        }
        confirmed
    }

    pub fn render(&self) -> ListScreen {
        let state = self.store.snapshot();
        let notice = state.replaced().map(|previous| {
            format!(
                "El servidor devolvió el id {}, que ya estaba en la lista; {} fue reemplazado.",
                previous.id, previous.name
            )
        });
        let body = match state.status() {
            RequestStatus::Loading => ListBody::Loading,
            RequestStatus::Failed(message) => ListBody::Failed(message.clone()),
            RequestStatus::Idle | RequestStatus::Succeeded => {
                ListBody::Users(state.users().iter().map(UserRow::from).collect())
            }
        };
        ListScreen { notice, body }
    }
}

impl<T: Transport> ListView<T> {
    /// Fetches the list the first time the view is shown, but only while the
    /// store has never loaded anything.
    pub async fn mount(&mut self) {
        if self.begin_mount() {
            // The failure is recorded in the store and rendered from there.
            if let Err(err) = self.store.fetch_users().await {
                debug!(error = %err, "initial fetch failed");
            }
        }
    }

    /// Returns whether the delete was dispatched.
    pub async fn delete(&self, id: UserId, confirm: &mut dyn Confirm) -> bool {
        if !self.confirm_delete(id, confirm) {
            return false;
        }
        if let Err(err) = self.store.delete_user(id).await {
            debug!(id, error = %err, "delete failed");
        }
        true
    }
}

/// What the list screen shows below its title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListBody {
    Loading,
    Failed(String),
    Users(Vec<UserRow>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRow {
    pub id: UserId,
    pub name: String,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub edit: Route,
}

impl From<&User> for UserRow {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            phone: user.phone.clone().unwrap_or_default(),
            edit: Route::Edit(user.id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListScreen {
    /// Set when a create overwrote an entry that shared its id.
    pub notice: Option<String>,
    pub body: ListBody,
}

impl fmt::Display for ListScreen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Lista de Usuarios")?;
        writeln!(f)?;
        if let Some(notice) = &self.notice {
            writeln!(f, "! {notice}")?;
        }
        match &self.body {
            ListBody::Loading => writeln!(f, "Cargando usuarios..."),
            ListBody::Failed(message) => writeln!(f, "Error: {message}"),
            ListBody::Users(rows) => {
                for row in rows {
                    writeln!(f, "#{} {} (@{})", row.id, row.name, row.username)?;
                    writeln!(f, "    {} • {}", row.email, row.phone)?;
                    writeln!(f, "    [Editar {}] [Eliminar]", row.edit)?;
                }
                Ok(())
            }
        }
    }
}
