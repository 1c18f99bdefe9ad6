//! Screens rendered from store state.
//!
//! Views never mutate the store directly; they dispatch store operations and
//! render a plain-data screen (`ListScreen`, `FormScreen`) whose `Display`
//! output is what the terminal shows.

pub mod form;
pub mod list;

use std::fmt;

use crate::route::Route;

pub use form::{Field, FormMode, FormScreen, FormView, Submission};
pub use list::{Confirm, ListBody, ListScreen, ListView, UserRow, DELETE_PROMPT};

/// Header with links to the two top-level screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavBar {
    pub current: Route,
}

impl NavBar {
    pub const LINKS: [(&'static str, Route); 2] = [("Usuarios", Route::List), ("Crear", Route::Create)];
}

impl fmt::Display for NavBar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (label, route)) in Self::LINKS.iter().enumerate() {
            if i > 0 {
                write!(f, " | ")?;
            }
            if *route == self.current {
                write!(f, "*{label}* ({route})")?;
            } else {
                write!(f, "{label} ({route})")?;
            }
        }
        writeln!(f)
    }
}
