//! Endpoints of the `/users` resource.
//!
//! # Design
//! Each CRUD operation comes in two shapes: `build_*` / `parse_*` pairs that
//! never touch the network (the host executes the round-trip), and an async
//! method that runs the same request through the configured `Transport`.

use crate::error::NetworkError;
use crate::http::{check_status, decode_json, HttpClient, HttpConfig, HttpMethod, HttpRequest, HttpResponse, Transport};
use crate::types::{NewUser, User, UserChanges, UserId};

const USERS_PATH: &str = "/users";

fn user_path(id: UserId) -> String {
    format!("{USERS_PATH}/{id}")
}

/// Client for the users API.
#[derive(Debug, Clone)]
pub struct UsersClient<T> {
    http: HttpClient<T>,
}

impl<T> UsersClient<T> {
    pub fn new(config: HttpConfig, transport: T) -> Self {
        Self {
            http: HttpClient::new(config, transport),
        }
    }

    pub fn build_list_users(&self) -> HttpRequest {
        self.http.build_request(HttpMethod::Get, USERS_PATH)
    }

    pub fn build_create_user(&self, input: &NewUser) -> Result<HttpRequest, NetworkError> {
        self.http.build_json_request(HttpMethod::Post, USERS_PATH, input)
    }

    pub fn build_update_user(&self, id: UserId, changes: &UserChanges) -> Result<HttpRequest, NetworkError> {
        self.http.build_json_request(HttpMethod::Put, &user_path(id), changes)
    }

    pub fn build_delete_user(&self, id: UserId) -> HttpRequest {
        self.http.build_request(HttpMethod::Delete, &user_path(id))
    }

    pub fn parse_list_users(&self, response: HttpResponse) -> Result<Vec<User>, NetworkError> {
        decode_json(response)
    }

    pub fn parse_create_user(&self, response: HttpResponse) -> Result<User, NetworkError> {
        decode_json(response)
    }

    pub fn parse_update_user(&self, response: HttpResponse) -> Result<User, NetworkError> {
        decode_json(response)
    }

    pub fn parse_delete_user(&self, response: HttpResponse) -> Result<(), NetworkError> {
        check_status(&response)
    }
}

impl<T: Transport> UsersClient<T> {
    pub async fn list_users(&self) -> Result<Vec<User>, NetworkError> {
        self.http.get(USERS_PATH).await
    }

    pub async fn create_user(&self, input: &NewUser) -> Result<User, NetworkError> {
        self.http.post(USERS_PATH, input).await
    }

    pub async fn update_user(&self, id: UserId, changes: &UserChanges) -> Result<User, NetworkError> {
        self.http.put(&user_path(id), changes).await
    }

    pub async fn delete_user(&self, id: UserId) -> Result<(), NetworkError> {
        self.http.delete(&user_path(id)).await
    }
}
