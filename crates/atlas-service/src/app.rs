//! Shared handler state.

use std::sync::Arc;

use atlas_core::{DataApi, Embedder};

use crate::search::{self, SearchSettings};
use crate::todos::{self, TodoSettings};
use crate::{ServiceError, ServiceResponse};

/// Backends and settings shared by every request.
///
/// Cloning is cheap; the backends are behind `Arc` and never mutated.
#[derive(Clone)]
pub struct App {
    data_api: Arc<dyn DataApi>,
    embedder: Arc<dyn Embedder>,
    todos: TodoSettings,
    search: SearchSettings,
}

impl App {
    pub fn new(data_api: Arc<dyn DataApi>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            data_api,
            embedder,
            todos: TodoSettings::default(),
            search: SearchSettings::default(),
        }
    }

    pub fn with_todos(mut self, todos: TodoSettings) -> Self {
        self.todos = todos;
        self
    }

    pub fn with_search(mut self, search: SearchSettings) -> Self {
        self.search = search;
        self
    }

    pub fn data_api(&self) -> &dyn DataApi {
        self.data_api.as_ref()
    }

    pub fn todo_settings(&self) -> &TodoSettings {
        &self.todos
    }

    pub fn search_settings(&self) -> &SearchSettings {
        &self.search
    }

    /// Handle a todos request. Every outcome, including failure, is a response.
    pub async fn todos(
        &self,
        method: &str,
        id: Option<&str>,
        body: Option<&str>,
    ) -> ServiceResponse {
        todos::handle(&self.todos, self.data_api.as_ref(), method, id, body)
            .await
            .unwrap_or_else(ServiceError::into_response)
    }

    /// Handle a search request. Every outcome, including failure, is a response.
    pub async fn search(&self, body: Option<&str>) -> ServiceResponse {
        search::handle(
            &self.search,
            self.embedder.as_ref(),
            self.data_api.as_ref(),
            body,
        )
        .await
        .unwrap_or_else(ServiceError::into_response)
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("data_api", &self.data_api.describe())
            .field("model", &self.embedder.model().as_str())
            .field("todos", &self.todos)
            .field("search", &self.search)
            .finish()
    }
}
