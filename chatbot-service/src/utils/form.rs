use axum::{
    extract::{FromRequest, Multipart, Request},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Form, Json,
};
use serde::de::DeserializeOwned;
use serde_json::json;

/// Form fields sent either url-encoded or as `multipart/form-data`.
///
/// Browsers submitting a `FormData` object use multipart, plain HTML forms and
/// most HTTP clients use url-encoding; both decode into the same `T`.
pub struct FormFields<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for FormFields<T>
where
    T: DeserializeOwned + 'static,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !is_multipart(&req) {
            let Form(value) = Form::<T>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            return Ok(FormFields(value));
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(IntoResponse::into_response)?;

        let mut fields = Vec::new();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| reject(StatusCode::BAD_REQUEST, format!("Invalid multipart body: {}", e)))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            let value = field.text().await.map_err(|e| {
                reject(
                    StatusCode::BAD_REQUEST,
                    format!("Failed to read field '{}': {}", name, e),
                )
            })?;
            fields.push((name, value));
        }

        // Re-encode so multipart and url-encoded bodies share one deserializer.
        let encoded = serde_urlencoded::to_string(&fields)
            .map_err(|e| reject(StatusCode::BAD_REQUEST, e.to_string()))?;
        let value = serde_urlencoded::from_str(&encoded).map_err(|e| {
            reject(
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("Failed to deserialize form body: {}", e),
            )
        })?;

        Ok(FormFields(value))
    }
}

fn is_multipart(req: &Request) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_ascii_lowercase().starts_with("multipart/form-data"))
        .unwrap_or(false)
}

fn reject(status: StatusCode, error: String) -> Response {
    (status, Json(json!({ "error": error }))).into_response()
}
