//! Create/edit form.
//!
//! The same view serves both screens. The route decides the mode: `/create`
//! starts from empty fields, `/edit/{id}` copies the user with that id out of
//! the store's current list. There is no fetch-by-id; a user the list has not
//! loaded leaves the form empty.

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use crate::error::{FormError, NetworkError, ValidationError};
use crate::http::Transport;
use crate::route::{Navigator, Route};
use crate::store::{UserStore, UsersState};
use crate::types::{User, UserFields, UserId};

/// Shown when a failed submission carries no message of its own.
pub const GENERIC_FAILURE: &str = "Error en la operación";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(UserId),
}

impl FormMode {
    pub fn from_route(route: Route) -> Self {
        match route.user_id() {
            Some(id) => FormMode::Edit(id),
            None => FormMode::Create,
        }
    }
}

/// Editable inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Username,
    Email,
    Phone,
    Website,
}

impl Field {
    /// Accepts the field key or its on-screen label.
    pub fn parse(name: &str) -> Option<Field> {
        match name.trim().to_lowercase().as_str() {
            "name" | "nombre" => Some(Field::Name),
            "username" => Some(Field::Username),
            "email" | "correo" => Some(Field::Email),
            "phone" | "telefono" | "teléfono" => Some(Field::Phone),
            "website" => Some(Field::Website),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::Name => "Nombre",
            Field::Username => "Username",
            Field::Email => "Email",
            Field::Phone => "Teléfono",
            Field::Website => "Website",
        }
    }
}

pub struct FormView<T> {
    store: Arc<UserStore<T>>,
    mode: FormMode,
    fields: UserFields,
    submitting: bool,
    error: Option<String>,
    changes: watch::Receiver<UsersState>,
    seen: Vec<User>,
}

impl<T> FormView<T> {
    pub fn new(store: Arc<UserStore<T>>, route: Route) -> Self {
        let changes = store.subscribe();
        Self {
            store,
            mode: FormMode::from_route(route),
            fields: UserFields::default(),
            submitting: false,
            error: None,
            changes,
            seen: Vec::new(),
        }
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn fields(&self) -> &UserFields {
        &self.fields
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Initial fill: empty in create mode, the stored user in edit mode.
    pub fn mount(&mut self) {
        self.fields = UserFields::default();
        self.seen = self.changes.borrow_and_update().users().to_vec();
        self.prefill();
    }

    /// Switch to another target (e.g. `/edit/1` to `/edit/2`).
    pub fn set_route(&mut self, route: Route) {
        let mode = FormMode::from_route(route);
        if mode != self.mode {
            self.mode = mode;
            self.error = None;
            self.mount();
        }
    }

    /// Re-fills the form when the store's list changed since the last look.
    /// Status-only changes are ignored. Returns whether a re-fill happened.
    pub fn refresh(&mut self) -> bool {
        if !self.changes.has_changed().unwrap_or(false) {
            return false;
        }
        let state = self.changes.borrow_and_update();
        if state.users() == self.seen.as_slice() {
            return false;
        }
        self.seen = state.users().to_vec();
        drop(state);
        self.prefill();
        true
    }

    fn prefill(&mut self) {
        if let FormMode::Edit(id) = self.mode {
            match self.seen.iter().find(|u| u.id == id) {
                Some(user) => self.fields = UserFields::from_user(user),
                None => debug!(id, "user not in local list, form left as is"),
            }
        }
    }

    pub fn set(&mut self, field: Field, value: &str) {
        let slot = match field {
            Field::Name => &mut self.fields.name,
            Field::Username => &mut self.fields.username,
            Field::Email => &mut self.fields.email,
            Field::Phone => &mut self.fields.phone,
            Field::Website => &mut self.fields.website,
        };
        *slot = value.to_string();
    }

    /// Name and email must be non-empty after trimming.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.fields.name.trim().is_empty() || self.fields.email.trim().is_empty() {
            return Err(ValidationError::MissingRequired);
        }
        Ok(())
    }

    pub fn cancel(&self, navigator: &mut dyn Navigator) {
        navigator.navigate(Route::List);
    }

    /// First half of `submit`: validates and switches the form to its
    /// submitting state. The returned submission does not borrow the view, so
    /// the form can keep rendering while it runs.
    pub fn begin_submit(&mut self) -> Result<Submission<T>, ValidationError> {
        self.error = None;
        if let Err(err) = self.validate() {
            self.error = Some(err.to_string());
            return Err(err);
        }
        self.submitting = true;
        Ok(Submission {
            store: Arc::clone(&self.store),
            mode: self.mode,
            fields: self.fields.clone(),
        })
    }

    /// Second half of `submit`: back to the list on success, otherwise the
    /// message stays on the form.
    pub fn finish_submit(
        &mut self,
        outcome: Result<(), NetworkError>,
        navigator: &mut dyn Navigator,
    ) -> Result<(), FormError> {
        self.submitting = false;
        match outcome {
            Ok(()) => {
                navigator.navigate(Route::List);
                Ok(())
            }
            Err(err) => {
                let message = err.to_string();
                self.error = Some(if message.is_empty() {
                    GENERIC_FAILURE.to_string()
                } else {
                    message
                });
                Err(err.into())
            }
        }
    }

    pub fn render(&self) -> FormScreen {
        let (title, submit) = match self.mode {
            FormMode::Create => ("Crear Usuario", "Crear"),
            FormMode::Edit(_) => ("Editar Usuario", "Actualizar"),
        };
        let submit = if self.submitting { "Procesando..." } else { submit };
        FormScreen {
            title,
            submit,
            error: self.error.clone(),
            fields: self.fields.clone(),
        }
    }
}

impl<T: Transport> FormView<T> {
    /// Validate, dispatch create or update, and go back to the list on
    /// success. A failure stays on the form with its message shown.
    pub async fn submit(&mut self, navigator: &mut dyn Navigator) -> Result<(), FormError> {
        let submission = self.begin_submit()?;
        let outcome = submission.send().await;
        self.finish_submit(outcome, navigator)
    }
}

/// A validated create or update waiting to be sent.
pub struct Submission<T> {
    store: Arc<UserStore<T>>,
    mode: FormMode,
    fields: UserFields,
}

impl<T: Transport> Submission<T> {
    pub async fn send(self) -> Result<(), NetworkError> {
        match self.mode {
            FormMode::Create => self.store.create_user(&self.fields.to_new_user()).await.map(drop),
            FormMode::Edit(id) => self.store.update_user(id, &self.fields.to_changes()).await.map(drop),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormScreen {
    pub title: &'static str,
    pub submit: &'static str,
    pub error: Option<String>,
    pub fields: UserFields,
}

impl fmt::Display for FormScreen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f)?;
        if let Some(error) = &self.error {
            writeln!(f, "! {error}")?;
        }
        let rows = [
            (Field::Name, &self.fields.name),
            (Field::Username, &self.fields.username),
            (Field::Email, &self.fields.email),
            (Field::Phone, &self.fields.phone),
            (Field::Website, &self.fields.website),
        ];
        for (field, value) in rows {
            writeln!(f, "{:<10} {value}", format!("{}:", field.label()))?;
        }
        writeln!(f)?;
        writeln!(f, "[{}] [Cancelar]", self.submit)
    }
}
