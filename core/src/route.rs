//! Screen routes and the navigation seam.

use std::fmt;

use crate::types::UserId;

/// One of the three screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// `/`
    List,
    /// `/create`
    Create,
    /// `/edit/{id}`
    Edit(UserId),
}

impl Route {
    /// Map a path to its route. Unknown paths yield `None`.
    pub fn parse(path: &str) -> Option<Route> {
        let trimmed = path.trim();
        let trimmed = if trimmed.len() > 1 {
            trimmed.trim_end_matches('/')
        } else {
            trimmed
        };
        match trimmed {
            "/" | "" => Some(Route::List),
            "/create" => Some(Route::Create),
            other => other
                .strip_prefix("/edit/")
                .and_then(|id| id.parse().ok())
                .map(Route::Edit),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::List => "/".to_string(),
            Route::Create => "/create".to_string(),
            Route::Edit(id) => format!("/edit/{id}"),
        }
    }

    /// The id carried in the navigation context, if any.
    pub fn user_id(&self) -> Option<UserId> {
        match self {
            Route::Edit(id) => Some(*id),
            _ => None,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Moves the application to another screen.
pub trait Navigator {
    fn navigate(&mut self, route: Route);
}

/// In-memory navigation history. The last entry is the current screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct History {
    entries: Vec<Route>,
}

impl History {
    pub fn new(start: Route) -> Self {
        Self { entries: vec![start] }
    }

    pub fn current(&self) -> Route {
        self.entries.last().copied().unwrap_or(Route::List)
    }

    pub fn entries(&self) -> &[Route] {
        &self.entries
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(Route::List)
    }
}

impl Navigator for History {
    fn navigate(&mut self, route: Route) {
        self.entries.push(route);
    }
}
