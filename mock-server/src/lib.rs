use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::trace::TraceLayer;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateUser {
    pub name: String,
    #[serde(default)]
    pub username: String,
    pub email: String,
    pub phone: Option<String>,
    pub website: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
}

/// Users keyed by id; ids only grow, so iteration order is creation order.
pub type Db = Arc<RwLock<BTreeMap<u64, User>>>;

/// The records every fresh `app()` starts with.
pub fn seed_users() -> Vec<User> {
    vec![
        User {
            id: 1,
            name: "Leanne Graham".to_string(),
            username: "Bret".to_string(),
            email: "Sincere@april.biz".to_string(),
            phone: Some("1-770-736-8031 x56442".to_string()),
            website: Some("hildegard.org".to_string()),
        },
        User {
            id: 2,
            name: "Ervin Howell".to_string(),
            username: "Antonette".to_string(),
            email: "Shanna@melissa.tv".to_string(),
            phone: Some("010-692-6593 x09125".to_string()),
            website: Some("anastasia.net".to_string()),
        },
        User {
            id: 3,
            name: "Clementine Bauch".to_string(),
            username: "Samantha".to_string(),
            email: "Nathan@yesenia.net".to_string(),
            phone: None,
            website: None,
        },
    ]
}

pub fn app() -> Router {
    app_with(seed_users())
}

pub fn app_with(users: Vec<User>) -> Router {
    let db: Db = Arc::new(RwLock::new(users.into_iter().map(|u| (u.id, u)).collect()));
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/{id}", get(get_user).put(update_user).delete(delete_user))
        .layer(TraceLayer::new_for_http())
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn list_users(State(db): State<Db>) -> Json<Vec<User>> {
    let users = db.read().await;
    Json(users.values().cloned().collect())
}

async fn create_user(
    State(db): State<Db>,
    Json(input): Json<CreateUser>,
) -> (StatusCode, Json<User>) {
    let mut users = db.write().await;
    let id = users.keys().next_back().map_or(1, |last| last + 1);
    let user = User {
        id,
        name: input.name,
        username: input.username,
        email: input.email,
        phone: input.phone,
        website: input.website,
    };
    users.insert(id, user.clone());
    tracing::debug!(id, "created user");
    (StatusCode::CREATED, Json(user))
}

async fn get_user(
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> Result<Json<User>, StatusCode> {
    let users = db.read().await;
    users.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn update_user(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(input): Json<UpdateUser>,
) -> Result<Json<User>, StatusCode> {
    let mut users = db.write().await;
    let user = users.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    if let Some(name) = input.name {
        user.name = name;
    }
    if let Some(username) = input.username {
        user.username = username;
    }
    if let Some(email) = input.email {
        user.email = email;
    }
    if let Some(phone) = input.phone {
        user.phone = Some(phone);
    }
    if let Some(website) = input.website {
        user.website = Some(website);
    }
    Ok(Json(user.clone()))
}

/// Acknowledges with `{}` like the public fixture does.
async fn delete_user(
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let mut users = db.write().await;
    users
        .remove(&id)
        .map(|_| Json(serde_json::json!({})))
        .ok_or(StatusCode::NOT_FOUND)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_serializes_to_json() {
        let user = seed_users().remove(0);
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["username"], "Bret");
        assert_eq!(json["website"], "hildegard.org");
    }

    #[test]
    fn absent_optionals_are_omitted() {
        let user = seed_users().remove(2);
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("phone").is_none());
        assert!(json.get("website").is_none());
    }

    #[test]
    fn seed_ids_are_unique_and_ascending() {
        let ids: Vec<u64> = seed_users().iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn create_user_defaults_username() {
        let input: CreateUser = serde_json::from_str(r#"{"name":"Ana","email":"a@x.com"}"#).unwrap();
        assert_eq!(input.username, "");
        assert!(input.phone.is_none());
    }

    #[test]
    fn create_user_rejects_missing_email() {
        let result: Result<CreateUser, _> = serde_json::from_str(r#"{"name":"Ana"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn update_user_all_fields_optional() {
        let input: UpdateUser = serde_json::from_str(r#"{}"#).unwrap();
        assert!(input.name.is_none());
        assert!(input.email.is_none());
        assert!(input.website.is_none());
    }
}
