//! Line-oriented front end: reads commands, drives the views, re-renders.

use std::io::{self, Write};
use std::sync::Arc;

use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;
use users_core::view::{Confirm, Field, FormView, ListView, NavBar, Submission, DELETE_PROMPT};
use users_core::{History, Navigator, NetworkError, Route, Transport, UserId, UserStore};

const HELP: &str = "\
Comandos:
  list | /            ver la lista
  new                 crear usuario
  edit <id>           editar usuario
  rm <id>             eliminar usuario
  set <campo> <valor> (formulario) name, username, email, phone, website
  save | cancel       (formulario) guardar o volver
  go <ruta>           ir a /, /create o /edit/<id>
  help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    New,
    Edit(UserId),
    Delete(UserId),
    Set(Field, String),
    Save,
    Cancel,
    Go(Route),
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("comando desconocido: {0} (escribe help)")]
    Unknown(String),

    #[error("uso: {0}")]
    Usage(&'static str),

    #[error("campo desconocido: {0}")]
    UnknownField(String),

    #[error("ruta desconocida: {0}")]
    UnknownRoute(String),

    #[error("no disponible en esta pantalla")]
    WrongScreen,
}

impl Command {
    pub fn parse(line: &str) -> Result<Command, CommandError> {
        let line = line.trim();
        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        match word {
            "list" | "/" => Ok(Command::List),
            "new" => Ok(Command::New),
            "edit" => parse_id(rest, "edit <id>").map(Command::Edit),
            "rm" => parse_id(rest, "rm <id>").map(Command::Delete),
            "set" => {
                let (name, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                if name.is_empty() {
                    return Err(CommandError::Usage("set <campo> <valor>"));
                }
                let field = Field::parse(name).ok_or_else(|| CommandError::UnknownField(name.to_string()))?;
                Ok(Command::Set(field, value.trim().to_string()))
            }
            "save" => Ok(Command::Save),
            "cancel" => Ok(Command::Cancel),
            "go" => Route::parse(rest)
                .map(Command::Go)
                .ok_or_else(|| CommandError::UnknownRoute(rest.to_string())),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

fn parse_id(raw: &str, usage: &'static str) -> Result<UserId, CommandError> {
    raw.parse().map_err(|_| CommandError::Usage(usage))
}

/// Whether a typed reply to a yes/no question means yes.
fn is_yes(reply: Option<&str>) -> bool {
    matches!(
        reply.map(str::trim),
        Some("y" | "Y" | "s" | "S" | "si" | "sí" | "yes")
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

enum Screen<T> {
    List(ListView<T>),
    Form(FormView<T>),
}

/// A request started by a command. It owns its store handle so the shell
/// can keep rendering while it runs.
enum Work<T> {
    Fetch,
    Delete(UserId),
    Submit(Submission<T>),
}

enum Done {
    Fetch(Result<(), NetworkError>),
    Delete(UserId, Result<(), NetworkError>),
    Submit(Result<(), NetworkError>),
}

impl<T: Transport> Work<T> {
    async fn run(self, store: Arc<UserStore<T>>) -> Done {
        match self {
            Work::Fetch => Done::Fetch(store.fetch_users().await),
            Work::Delete(id) => Done::Delete(id, store.delete_user(id).await),
            Work::Submit(submission) => Done::Submit(submission.send().await),
        }
    }
}

/// Owns the navigation history and whichever view the current route shows.
pub struct Shell<T> {
    store: Arc<UserStore<T>>,
    history: History,
    shown: Option<Route>,
    screen: Screen<T>,
    pending: Option<Work<T>>,
    notice: Option<String>,
}

impl<T: Transport> Shell<T> {
    /// Starts on the list; its initial fetch is queued, not sent.
    pub fn new(store: Arc<UserStore<T>>) -> Self {
        let mut shell = Self {
            screen: Screen::List(ListView::new(Arc::clone(&store))),
            store,
            history: History::default(),
            shown: None,
            pending: None,
            notice: None,
        };
        shell.sync();
        shell
    }

    pub fn route(&self) -> Route {
        self.history.current()
    }

    /// Show the view for the current route if it is not the one on screen.
    fn sync(&mut self) {
        let route = self.route();
        if self.shown == Some(route) {
            return;
        }
        debug!(%route, "mounting view");
        self.shown = Some(route);

        if let (Screen::Form(view), Route::Create | Route::Edit(_)) = (&mut self.screen, route) {
            view.set_route(route);
            return;
        }
        match route {
            Route::List => {
                let mut view = ListView::new(Arc::clone(&self.store));
                if view.begin_mount() {
                    self.pending = Some(Work::Fetch);
                }
                self.screen = Screen::List(view);
            }
            Route::Create | Route::Edit(_) => {
                let mut view = FormView::new(Arc::clone(&self.store), route);
                view.mount();
                self.screen = Screen::Form(view);
            }
        }
    }

    /// Whether `command` needs a yes/no answer before `apply`.
    pub fn needs_confirmation(&self, command: &Command) -> bool {
        matches!((command, &self.screen), (Command::Delete(_), Screen::List(_)))
    }

    /// Apply `command` to the views. A request it starts is queued for
    /// `drive` or `settle` instead of being awaited here.
    pub fn apply(&mut self, command: Command, confirm: &mut dyn Confirm) -> Result<Flow, CommandError> {
        match command {
            Command::List => self.history.navigate(Route::List),
            Command::New => self.history.navigate(Route::Create),
            Command::Edit(id) => self.history.navigate(Route::Edit(id)),
            Command::Go(route) => self.history.navigate(route),
            Command::Delete(id) => match &self.screen {
                Screen::List(view) => {
                    if view.confirm_delete(id, confirm) {
                        self.pending = Some(Work::Delete(id));
                    }
                }
                Screen::Form(_) => return Err(CommandError::WrongScreen),
            },
            Command::Set(field, value) => match &mut self.screen {
                Screen::Form(view) => view.set(field, &value),
                Screen::List(_) => return Err(CommandError::WrongScreen),
            },
            // A validation failure is rendered by the form itself.
            Command::Save => match &mut self.screen {
                Screen::Form(view) => match view.begin_submit() {
                    Ok(submission) => self.pending = Some(Work::Submit(submission)),
                    Err(err) => debug!(error = %err, "form rejected"),
                },
                Screen::List(_) => return Err(CommandError::WrongScreen),
            },
            Command::Cancel => match &self.screen {
                Screen::Form(view) => view.cancel(&mut self.history),
                Screen::List(_) => return Err(CommandError::WrongScreen),
            },
            Command::Help => self.notice = Some(HELP.to_string()),
            Command::Quit => return Ok(Flow::Quit),
        }
        self.sync();
        Ok(Flow::Continue)
    }

    /// `apply` followed by `settle`.
    pub async fn handle(&mut self, command: Command, confirm: &mut dyn Confirm) -> Result<Flow, CommandError> {
        let flow = self.apply(command, confirm)?;
        self.settle().await;
        Ok(flow)
    }

    /// Run queued requests to completion without drawing.
    pub async fn settle(&mut self) {
        while let Some(work) = self.pending.take() {
            let done = work.run(Arc::clone(&self.store)).await;
            self.finish(done);
        }
    }

    /// Run queued requests, writing a frame to `out` each time the store
    /// enters the loading state while one is in flight.
    pub async fn drive<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        while let Some(work) = self.pending.take() {
            let mut changes = self.store.subscribe();
            changes.borrow_and_update();
            let request = work.run(Arc::clone(&self.store));
            tokio::pin!(request);

            let done = loop {
                tokio::select! {
                    biased;
                    Ok(()) = changes.changed() => {
                        let loading = changes.borrow_and_update().status().is_loading();
                        if loading {
                            write!(out, "\n{}", self.render())?;
                            out.flush()?;
                        }
                    }
                    done = &mut request => break done,
                }
            };
            self.finish(done);
        }
        Ok(())
    }

    fn finish(&mut self, done: Done) {
        match done {
            // Fetch and delete failures are recorded in the store and shown
            // by the list.
            Done::Fetch(Err(err)) => debug!(error = %err, "fetch failed"),
            Done::Delete(id, Err(err)) => debug!(id, error = %err, "delete failed"),
            Done::Fetch(Ok(())) | Done::Delete(_, Ok(())) => {}
            Done::Submit(outcome) => match &mut self.screen {
                Screen::Form(view) => {
                    if let Err(err) = view.finish_submit(outcome, &mut self.history) {
                        debug!(error = %err, "submit failed");
                    }
                }
                Screen::List(_) => debug!("submission finished after the form was left"),
            },
        }
        self.sync();
    }

    /// Navigation bar, any pending notice, then the active view.
    pub fn render(&mut self) -> String {
        let mut out = NavBar { current: self.history.current() }.to_string();
        out.push('\n');
        if let Some(notice) = self.notice.take() {
            out.push_str(&notice);
            out.push_str("\n\n");
        }
        match &mut self.screen {
            Screen::List(view) => out.push_str(&view.render().to_string()),
            Screen::Form(view) => {
                view.refresh();
                out.push_str(&view.render().to_string());
            }
        }
        out
    }

    /// Interactive loop over stdin/stdout until `quit` or end of input.
    pub async fn run_stdio(mut self) -> io::Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdout = io::stdout();

        self.drive(&mut stdout).await?;
        write!(stdout, "\n{}\n> ", self.render())?;
        stdout.flush()?;

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                write!(stdout, "> ")?;
                stdout.flush()?;
                continue;
            }

            let flow = match Command::parse(&line) {
                Ok(command) => {
                    let mut answer = false;
                    if self.needs_confirmation(&command) {
                        write!(stdout, "{DELETE_PROMPT} [y/N] ")?;
                        stdout.flush()?;
                        answer = is_yes(lines.next_line().await?.as_deref());
                    }
                    self.apply(command, &mut |_: &str| answer)
                }
                Err(err) => Err(err),
            };

            match flow {
                Ok(Flow::Quit) => break,
                Ok(Flow::Continue) => self.drive(&mut stdout).await?,
                Err(err) => self.notice = Some(err.to_string()),
            }
            write!(stdout, "\n{}\n> ", self.render())?;
            stdout.flush()?;
        }

        Ok(())
    }
}
