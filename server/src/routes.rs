//! HTTP handlers for `/api/texts` and `/api/dictionary`.
//!
//! Every handler answers with the `{success, data?, error?}` envelope. Store
//! failures are logged with their cause and reported to the caller with a
//! fixed message only.

use crate::database::{StoreError, StoreResult};
use crate::models::{DictionaryEntry, DictionaryPatch, TextDraft, TextPatch};
use crate::reading::{build_reading_view, normalize_word};
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn respond<T: Serialize>(status: StatusCode, data: T) -> Response {
    let body = ApiResponse {
        success: true,
        data: Some(data),
        error: None,
    };
    (status, Json(body)).into_response()
}

fn fail(status: StatusCode, message: impl Into<String>) -> Response {
    let body: ApiResponse<()> = ApiResponse {
        success: false,
        data: None,
        error: Some(message.into()),
    };
    (status, Json(body)).into_response()
}

/// Validation problems go back to the caller as 400; anything else is logged
/// and reported as `message` with a 500.
fn store_failure(err: StoreError, message: &str) -> Response {
    match err {
        StoreError::Validation(_) => fail(StatusCode::BAD_REQUEST, err.to_string()),
        other => {
            error!(error = %other, "{}", message);
            fail(StatusCode::INTERNAL_SERVER_ERROR, message)
        }
    }
}

fn bad_body(rejection: JsonRejection) -> Response {
    warn!(error = %rejection, "rejected request body");
    fail(StatusCode::BAD_REQUEST, "Invalid request body")
}

/// Runs a store call on the blocking thread pool. The stores do synchronous
/// file IO.
async fn blocking<T, F>(call: F) -> StoreResult<T>
where
    F: FnOnce() -> StoreResult<T> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(call).await {
        Ok(result) => result,
        Err(e) => Err(StoreError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            e,
        ))),
    }
}

// Empty query values count as missing.
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

// ----------------------------------------------------------------------------
// Texts
// ----------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct TextQuery {
    pub id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTextRequest {
    pub id: Option<String>,
    #[serde(flatten)]
    pub patch: TextPatch,
}

/// `GET /api/texts[?id=X]`
pub async fn get_texts(
    State(state): State<AppState>,
    Query(query): Query<TextQuery>,
) -> Response {
    if let Some(id) = present(query.id) {
        return match blocking(move || state.texts.get_by_id(&id)).await {
            Ok(Some(text)) => respond(StatusCode::OK, text),
            Ok(None) => fail(StatusCode::NOT_FOUND, "Text not found"),
            Err(e) => store_failure(e, "Failed to fetch texts"),
        };
    }

    match blocking(move || state.texts.get_all()).await {
        Ok(texts) => respond(StatusCode::OK, texts),
        Err(e) => store_failure(e, "Failed to fetch texts"),
    }
}

/// `POST /api/texts`
pub async fn create_text(
    State(state): State<AppState>,
    body: Result<Json<TextDraft>, JsonRejection>,
) -> Response {
    let Json(draft) = match body {
        Ok(body) => body,
        Err(rejection) => return bad_body(rejection),
    };

    match blocking(move || state.texts.create(draft)).await {
        Ok(text) => respond(StatusCode::CREATED, text),
        Err(e) => store_failure(e, "Failed to create text"),
    }
}

/// `PUT /api/texts` with `{id, ...fields}`
pub async fn update_text(
    State(state): State<AppState>,
    body: Result<Json<UpdateTextRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => return bad_body(rejection),
    };
    let Some(id) = present(request.id) else {
        return fail(StatusCode::BAD_REQUEST, "Text ID is required");
    };

    match blocking(move || state.texts.update(&id, request.patch)).await {
        Ok(text) => respond(StatusCode::OK, text),
        Err(e) => store_failure(e, "Failed to update text"),
    }
}

/// `DELETE /api/texts?id=X`
pub async fn delete_text(
    State(state): State<AppState>,
    Query(query): Query<TextQuery>,
) -> Response {
    let Some(id) = present(query.id) else {
        return fail(StatusCode::BAD_REQUEST, "Text ID is required");
    };

    match blocking(move || state.texts.delete(&id)).await {
        Ok(true) => respond(StatusCode::OK, true),
        Ok(false) => fail(StatusCode::NOT_FOUND, "Text not found"),
        Err(e) => store_failure(e, "Failed to delete text"),
    }
}

/// `GET /api/texts/reading?id=X`
pub async fn get_reading(
    State(state): State<AppState>,
    Query(query): Query<TextQuery>,
) -> Response {
    let Some(id) = present(query.id) else {
        return fail(StatusCode::BAD_REQUEST, "Text ID is required");
    };

    let texts = state.texts.clone();
    let text = match blocking(move || texts.get_by_id(&id)).await {
        Ok(Some(text)) => text,
        Ok(None) => return fail(StatusCode::NOT_FOUND, "Text not found"),
        Err(e) => return store_failure(e, "Failed to fetch text"),
    };

    match blocking(move || build_reading_view(text, &state.dictionary)).await {
        Ok(view) => respond(StatusCode::OK, view),
        Err(e) => store_failure(e, "Failed to build reading view"),
    }
}

// ----------------------------------------------------------------------------
// Dictionary
// ----------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct DictionaryQuery {
    pub word: Option<String>,
    pub q: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LookupQuery {
    pub token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateEntryRequest {
    pub word: Option<String>,
    #[serde(flatten)]
    pub patch: DictionaryPatch,
}

/// `GET /api/dictionary[?word=W | ?q=Q]`; `word` wins when both are given.
pub async fn get_dictionary(
    State(state): State<AppState>,
    Query(query): Query<DictionaryQuery>,
) -> Response {
    if let Some(word) = present(query.word) {
        return match blocking(move || state.dictionary.get_by_word(&word)).await {
            Ok(Some(entry)) => respond(StatusCode::OK, entry),
            Ok(None) => fail(StatusCode::NOT_FOUND, "Dictionary entry not found"),
            Err(e) => store_failure(e, "Failed to fetch dictionary"),
        };
    }

    let q = present(query.q);
    let result = blocking(move || match q {
        Some(q) => state.dictionary.search(&q),
        None => state.dictionary.get_all(),
    });
    match result.await {
        Ok(entries) => respond(StatusCode::OK, entries),
        Err(e) => store_failure(e, "Failed to fetch dictionary"),
    }
}

/// `GET /api/dictionary/lookup?token=T`, normalizing `T` the way reading views do.
pub async fn lookup_word(
    State(state): State<AppState>,
    Query(query): Query<LookupQuery>,
) -> Response {
    let word = query.token.as_deref().map(normalize_word).unwrap_or_default();
    if word.is_empty() {
        return fail(StatusCode::BAD_REQUEST, "Token is required");
    }

    match blocking(move || state.dictionary.get_by_word(&word)).await {
        Ok(Some(entry)) => respond(StatusCode::OK, entry),
        Ok(None) => fail(StatusCode::NOT_FOUND, "Dictionary entry not found"),
        Err(e) => store_failure(e, "Failed to fetch dictionary"),
    }
}

/// `POST /api/dictionary`; replaces an existing entry with the same word.
pub async fn create_entry(
    State(state): State<AppState>,
    body: Result<Json<DictionaryEntry>, JsonRejection>,
) -> Response {
    let Json(entry) = match body {
        Ok(body) => body,
        Err(rejection) => return bad_body(rejection),
    };

    match blocking(move || state.dictionary.create(entry)).await {
        Ok(entry) => respond(StatusCode::CREATED, entry),
        Err(e) => store_failure(e, "Failed to create dictionary entry"),
    }
}

/// `PUT /api/dictionary` with `{word, ...fields}`
pub async fn update_entry(
    State(state): State<AppState>,
    body: Result<Json<UpdateEntryRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => return bad_body(rejection),
    };
    let Some(word) = present(request.word) else {
        return fail(StatusCode::BAD_REQUEST, "Word is required");
    };

    match blocking(move || state.dictionary.update(&word, request.patch)).await {
        Ok(entry) => respond(StatusCode::OK, entry),
        Err(e) => store_failure(e, "Failed to update dictionary entry"),
    }
}

/// `DELETE /api/dictionary?word=W`
pub async fn delete_entry(
    State(state): State<AppState>,
    Query(query): Query<DictionaryQuery>,
) -> Response {
    let Some(word) = present(query.word) else {
        return fail(StatusCode::BAD_REQUEST, "Word is required");
    };

    match blocking(move || state.dictionary.delete(&word)).await {
        Ok(true) => respond(StatusCode::OK, true),
        Ok(false) => fail(StatusCode::NOT_FOUND, "Dictionary entry not found"),
        Err(e) => store_failure(e, "Failed to delete dictionary entry"),
    }
}
