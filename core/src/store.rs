//! In-memory user list plus the status of the most recent request.
//!
//! # Design
//! `UserStore` is an owned container shared through `Arc`; views receive the
//! handle explicitly. State lives in a `tokio::sync::watch` sender so every
//! mutation notifies subscribers, which is what drives re-rendering.
//!
//! Operations are not coordinated with each other. When two are in flight,
//! whichever resolves last decides the final status (last-write-wins), and a
//! response that arrives after its view is gone still updates the list.

use std::fmt;

use tokio::sync::watch;
use tracing::{info, instrument, warn};

use crate::client::UsersClient;
use crate::error::NetworkError;
use crate::http::Transport;
use crate::types::{NewUser, User, UserChanges, UserId};

/// Progress of the most recent async operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RequestStatus {
    #[default]
    Idle,
    Loading,
    Succeeded,
    /// Carries the user-facing failure message.
    Failed(String),
}

impl RequestStatus {
    pub fn is_idle(&self) -> bool {
        matches!(self, RequestStatus::Idle)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, RequestStatus::Loading)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestStatus::Idle => write!(f, "idle"),
            RequestStatus::Loading => write!(f, "loading"),
            RequestStatus::Succeeded => write!(f, "succeeded"),
            RequestStatus::Failed(_) => write!(f, "failed"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Operation {
    Fetch,
    Create,
    Update,
    Delete,
}

impl Operation {
    /// Message used when the underlying error renders as an empty string.
    fn fallback_message(self) -> &'static str {
        match self {
            Operation::Fetch => "Error fetching users",
            Operation::Create => "Error creating user",
            Operation::Update => "Error updating user",
            Operation::Delete => "Error deleting user",
        }
    }
}

/// Snapshot of the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsersState {
    list: Vec<User>,
    status: RequestStatus,
    replaced: Option<User>,
}

impl UsersState {
    pub fn users(&self) -> &[User] {
        &self.list
    }

    pub fn status(&self) -> &RequestStatus {
        &self.status
    }

    /// Present only while the status is `Failed`.
    pub fn error(&self) -> Option<&str> {
        match &self.status {
            RequestStatus::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn find(&self, id: UserId) -> Option<&User> {
        self.list.iter().find(|u| u.id == id)
    }

    /// The entry overwritten by the latest create or local add, when the
    /// incoming id was already listed. Cleared when the next request starts.
    pub fn replaced(&self) -> Option<&User> {
        self.replaced.as_ref()
    }

    /// Append, or replace in place when the id is already listed.
    fn insert(&mut self, user: User) {
        match self.list.iter_mut().find(|u| u.id == user.id) {
            Some(existing) => {
                warn!(id = user.id, "duplicate id, replacing existing entry");
                self.replaced = Some(std::mem::replace(existing, user));
            }
            None => self.list.push(user),
        }
    }

    fn replace(&mut self, id: UserId, user: User) -> bool {
        match self.list.iter_mut().find(|u| u.id == id) {
            Some(existing) => {
                *existing = user;
                true
            }
            None => false,
        }
    }

    fn remove(&mut self, id: UserId) -> bool {
        let before = self.list.len();
        self.list.retain(|u| u.id != id);
        self.list.len() != before
    }
}

/// Owns the user list and performs the four remote operations against it.
pub struct UserStore<T> {
    client: UsersClient<T>,
    state: watch::Sender<UsersState>,
}

impl<T> UserStore<T> {
    pub fn new(client: UsersClient<T>) -> Self {
        let (state, _) = watch::channel(UsersState::default());
        Self { client, state }
    }

    /// Receiver that is marked changed after every state mutation.
    pub fn subscribe(&self) -> watch::Receiver<UsersState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> UsersState {
        self.state.borrow().clone()
    }

    pub fn status(&self) -> RequestStatus {
        self.state.borrow().status.clone()
    }

    /// Append without a network call.
    pub fn add_user_to_state(&self, user: User) {
        self.state.send_modify(|s| s.insert(user));
    }

    /// Replace the entry with the same id, if any, without a network call.
    pub fn update_user_in_state(&self, user: User) -> bool {
        let mut replaced = false;
        self.state.send_modify(|s| replaced = s.replace(user.id, user));
        replaced
    }

    /// Drop the entry with `id`, if any, without a network call.
    pub fn remove_user_from_state(&self, id: UserId) -> bool {
        let mut removed = false;
        self.state.send_modify(|s| removed = s.remove(id));
        removed
    }

    fn begin(&self) {
        self.state.send_modify(|s| {
            s.status = RequestStatus::Loading;
            s.replaced = None;
        });
    }

    fn fail(&self, op: Operation, err: NetworkError) -> NetworkError {
        warn!(operation = ?op, error = %err, "request failed");
        let mut message = err.to_string();
        if message.is_empty() {
            message = op.fallback_message().to_string();
        }
        self.state.send_modify(|s| s.status = RequestStatus::Failed(message));
        err
    }
}

impl<T: Transport> UserStore<T> {
    /// Replace the whole list with the server's.
    #[instrument(skip(self))]
    pub async fn fetch_users(&self) -> Result<(), NetworkError> {
        self.begin();
        match self.client.list_users().await {
            Ok(users) => {
                info!(count = users.len(), "fetched users");
                self.state.send_modify(|s| {
                    s.list = users;
                    s.status = RequestStatus::Succeeded;
                });
                Ok(())
            }
            Err(err) => Err(self.fail(Operation::Fetch, err)),
        }
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_user(&self, input: &NewUser) -> Result<User, NetworkError> {
        self.begin();
        match self.client.create_user(input).await {
            Ok(user) => {
                info!(id = user.id, "created user");
                self.state.send_modify(|s| {
                    s.insert(user.clone());
                    s.status = RequestStatus::Succeeded;
                });
                Ok(user)
            }
            Err(err) => Err(self.fail(Operation::Create, err)),
        }
    }

    /// An id that is not in the local list leaves the list untouched.
    #[instrument(skip(self, changes))]
    pub async fn update_user(&self, id: UserId, changes: &UserChanges) -> Result<User, NetworkError> {
        self.begin();
        match self.client.update_user(id, changes).await {
            Ok(user) => {
                if user.id != id {
                    warn!(returned = user.id, "server returned a different id");
                }
                self.state.send_modify(|s| {
                    if !s.replace(id, user.clone()) {
                        info!("updated user is not in the local list");
                    }
                    s.status = RequestStatus::Succeeded;
                });
                Ok(user)
            }
            Err(err) => Err(self.fail(Operation::Update, err)),
        }
    }

    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: UserId) -> Result<(), NetworkError> {
        self.begin();
        match self.client.delete_user(id).await {
            Ok(()) => {
                info!("deleted user");
                self.state.send_modify(|s| {
                    s.remove(id);
                    s.status = RequestStatus::Succeeded;
                });
                Ok(())
            }
            Err(err) => Err(self.fail(Operation::Delete, err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::http::{HttpConfig, HttpMethod};
    use crate::testing::ScriptedTransport;
    use crate::types::UserFields;

    fn store() -> (UserStore<Arc<ScriptedTransport>>, Arc<ScriptedTransport>) {
        let transport = Arc::new(ScriptedTransport::default());
        let client = UsersClient::new(HttpConfig::new("http://fixture"), Arc::clone(&transport));
        (UserStore::new(client), transport)
    }

    fn user(id: UserId, name: &str) -> User {
        User {
            id,
            name: name.to_string(),
            username: name.to_lowercase(),
            email: format!("{}@x.com", name.to_lowercase()),
            phone: None,
            website: None,
        }
    }

    fn json(users: &[User]) -> String {
        serde_json::to_string(users).unwrap()
    }

    async fn seeded(users: &[User]) -> (UserStore<Arc<ScriptedTransport>>, Arc<ScriptedTransport>) {
        let (store, transport) = store();
        transport.push_ok(200, &json(users));
        store.fetch_users().await.unwrap();
        (store, transport)
    }

    #[test]
    fn starts_idle_and_empty() {
        let (store, _) = store();
        let state = store.snapshot();
        assert!(state.users().is_empty());
        assert_eq!(state.status(), &RequestStatus::Idle);
        assert_eq!(state.error(), None);
    }

    #[tokio::test]
    async fn fetch_replaces_the_list() {
        let (store, transport) = store();
        transport.push_ok(200, r#"[{"id":1,"name":"Ana","username":"ana","email":"a@x.com"}]"#);
        store.fetch_users().await.unwrap();

        let state = store.snapshot();
        assert_eq!(state.users().len(), 1);
        assert_eq!(state.users()[0].name, "Ana");
        assert_eq!(state.status(), &RequestStatus::Succeeded);
        assert_eq!(state.error(), None);
    }

    #[tokio::test]
    async fn repeated_fetches_keep_only_the_latest_list() {
        let (store, transport) = seeded(&[user(1, "Ana"), user(2, "Bo")]).await;
        store.add_user_to_state(user(99, "Local"));

        transport.push_ok(200, &json(&[user(3, "Cy")]));
        store.fetch_users().await.unwrap();

        assert_eq!(store.snapshot().users(), &[user(3, "Cy")]);
    }

    #[tokio::test]
    async fn fetch_failure_keeps_list_and_records_message() {
        let (store, transport) = seeded(&[user(1, "Ana")]).await;
        transport.push_err(NetworkError::Timeout { millis: 10_000 });

        let err = store.fetch_users().await.unwrap_err();
        assert_eq!(err, NetworkError::Timeout { millis: 10_000 });
        let state = store.snapshot();
        assert_eq!(state.users(), &[user(1, "Ana")]);
        assert_eq!(state.error(), Some("timeout of 10000ms exceeded"));
    }

    #[tokio::test]
    async fn create_appends_server_user() {
        let (store, transport) = seeded(&[user(1, "Ana")]).await;
        transport.push_ok(201, r#"{"id":11,"name":"Bo","username":"bo","email":"bo@x.com"}"#);

        let input = NewUser {
            name: "Bo".to_string(),
            username: "bo".to_string(),
            email: "bo@x.com".to_string(),
            phone: None,
            website: None,
        };
        let created = store.create_user(&input).await.unwrap();

        assert_eq!(created.id, 11);
        let state = store.snapshot();
        assert_eq!(state.users().len(), 2);
        assert_eq!(state.users()[1], created);
        assert_eq!(state.status(), &RequestStatus::Succeeded);
        assert_eq!(transport.requests()[1].method, HttpMethod::Post);
    }

    #[tokio::test]
    async fn create_with_known_id_does_not_duplicate() {
        let (store, transport) = seeded(&[user(11, "Ana")]).await;
        transport.push_ok(201, &serde_json::to_string(&user(11, "Bo")).unwrap());

        let input = UserFields::default().to_new_user();
        store.create_user(&input).await.unwrap();

        let state = store.snapshot();
        assert_eq!(state.users(), &[user(11, "Bo")]);
        assert_eq!(state.replaced(), Some(&user(11, "Ana")));
    }

    #[tokio::test]
    async fn replaced_entry_is_forgotten_when_the_next_request_starts() {
        let (store, transport) = seeded(&[user(11, "Ana")]).await;
        store.add_user_to_state(user(11, "Bo"));
        assert_eq!(store.snapshot().replaced(), Some(&user(11, "Ana")));

        transport.push_ok(200, &json(&[user(11, "Bo")]));
        store.fetch_users().await.unwrap();
        assert_eq!(store.snapshot().replaced(), None);
    }

    #[tokio::test]
    async fn create_failure_leaves_list_unchanged() {
        let (store, transport) = seeded(&[user(1, "Ana")]).await;
        transport.push_ok(500, "oops");

        let input = UserFields::default().to_new_user();
        assert!(store.create_user(&input).await.is_err());

        let state = store.snapshot();
        assert_eq!(state.users(), &[user(1, "Ana")]);
        assert_eq!(state.error(), Some("Request failed with status code 500"));
    }

    #[tokio::test]
    async fn update_replaces_only_the_matching_entry() {
        let (store, transport) = seeded(&[user(1, "Ana"), user(2, "Bo"), user(3, "Cy")]).await;
        let renamed = User {
            email: "bo@new.com".to_string(),
            ..user(2, "Bo")
        };
        transport.push_ok(200, &serde_json::to_string(&renamed).unwrap());

        let changes = UserChanges {
            email: Some("bo@new.com".to_string()),
            ..UserChanges::default()
        };
        store.update_user(2, &changes).await.unwrap();

        assert_eq!(
            store.snapshot().users(),
            &[user(1, "Ana"), renamed, user(3, "Cy")]
        );
        assert_eq!(store.status(), RequestStatus::Succeeded);
    }

    #[tokio::test]
    async fn update_of_unknown_id_is_a_no_op_on_the_list() {
        let (store, transport) = seeded(&[user(1, "Ana")]).await;
        transport.push_ok(200, &serde_json::to_string(&user(42, "Zed")).unwrap());

        store.update_user(42, &UserChanges::default()).await.unwrap();

        assert_eq!(store.snapshot().users(), &[user(1, "Ana")]);
        assert_eq!(store.status(), RequestStatus::Succeeded);
    }

    #[tokio::test]
    async fn update_failure_sets_failed() {
        let (store, transport) = seeded(&[user(1, "Ana")]).await;
        transport.push_ok(404, "{}");

        let err = store.update_user(1, &UserChanges::default()).await.unwrap_err();
        assert_eq!(err, NetworkError::NotFound);
        let state = store.snapshot();
        assert_eq!(state.users(), &[user(1, "Ana")]);
        assert!(!state.error().unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_removes_exactly_one_entry() {
        let (store, transport) = seeded(&[user(1, "Ana"), user(2, "Bo")]).await;
        transport.push_ok(200, "{}");

        store.delete_user(1).await.unwrap();

        let state = store.snapshot();
        assert_eq!(state.users(), &[user(2, "Bo")]);
        assert_eq!(state.status(), &RequestStatus::Succeeded);
        assert_eq!(transport.requests()[1].url, "http://fixture/users/1");
    }

    #[tokio::test]
    async fn delete_failure_keeps_the_entry() {
        let (store, transport) = seeded(&[user(1, "Ana")]).await;
        transport.push_err(NetworkError::Transport("connection reset".to_string()));

        assert!(store.delete_user(1).await.is_err());

        let state = store.snapshot();
        assert_eq!(state.users(), &[user(1, "Ana")]);
        assert_eq!(state.error(), Some("connection reset"));
    }

    #[tokio::test]
    async fn empty_error_message_falls_back_per_operation() {
        let (store, transport) = store();
        transport.push_err(NetworkError::Transport(String::new()));
        transport.push_err(NetworkError::Transport(String::new()));

        assert!(store.fetch_users().await.is_err());
        assert_eq!(store.snapshot().error(), Some("Error fetching users"));
        assert!(store.delete_user(5).await.is_err());
        assert_eq!(store.snapshot().error(), Some("Error deleting user"));
    }

    #[tokio::test]
    async fn fetch_then_delete_scenario() {
        let (store, transport) = store();
        transport.push_ok(200, r#"[{"id":1,"name":"Ana","email":"a@x.com"}]"#);
        store.fetch_users().await.unwrap();
        assert_eq!(store.snapshot().users().len(), 1);
        assert_eq!(store.status(), RequestStatus::Succeeded);

        transport.push_ok(200, "{}");
        store.delete_user(1).await.unwrap();
        let state = store.snapshot();
        assert!(state.users().is_empty());
        assert_eq!(state.status(), &RequestStatus::Succeeded);
    }

    #[tokio::test]
    async fn a_new_operation_clears_the_previous_error() {
        let (store, transport) = store();
        transport.push_ok(503, "");
        assert!(store.fetch_users().await.is_err());
        assert!(store.snapshot().error().is_some());

        transport.push_ok(200, "[]");
        store.fetch_users().await.unwrap();
        assert_eq!(store.snapshot().error(), None);
    }

    #[tokio::test]
    async fn subscribers_see_every_change() {
        let (store, transport) = store();
        let mut rx = store.subscribe();
        assert!(!rx.has_changed().unwrap());

        transport.push_ok(200, "[]");
        store.fetch_users().await.unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().status(), &RequestStatus::Succeeded);
    }

    #[test]
    fn local_mutations_splice_by_id() {
        let (store, _) = store();
        store.add_user_to_state(user(1, "Ana"));
        store.add_user_to_state(user(2, "Bo"));

        assert!(store.update_user_in_state(User {
            name: "Ana María".to_string(),
            ..user(1, "Ana")
        }));
        assert!(!store.update_user_in_state(user(7, "Nobody")));
        assert!(store.remove_user_from_state(2));
        assert!(!store.remove_user_from_state(2));

        let state = store.snapshot();
        assert_eq!(state.users().len(), 1);
        assert_eq!(state.users()[0].name, "Ana María");
        assert_eq!(state.status(), &RequestStatus::Idle);
    }
}
