// ============================================================================
// API CLIENT - Gateway de requests autenticadas
// ============================================================================
// Inyecta el Bearer token, cierra la sesión ante un 401 y clasifica errores.
// Los endpoints concretos viven en los *_service.rs.
// ============================================================================

use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::services::http::{HttpRequest, HttpTransport, Method};
use crate::state::SessionStore;

/// Cliente API - comunicación HTTP + credenciales de la sesión
pub struct ApiClient<T> {
    base_url: String,
    transport: Rc<T>,
    session: SessionStore,
}

impl<T> Clone for ApiClient<T> {
    fn clone(&self) -> Self {
        Self {
            base_url: self.base_url.clone(),
            transport: Rc::clone(&self.transport),
            session: self.session.clone(),
        }
    }
}

impl<T: HttpTransport> ApiClient<T> {
    pub fn new(base_url: impl Into<String>, transport: Rc<T>, session: SessionStore) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            transport,
            session,
        }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Envía la request y devuelve el body de una respuesta 2xx
    pub(crate) async fn execute(&self, method: Method, path: &str, body: Option<String>) -> AppResult<String> {
        let url = format!("{}{}", self.base_url, path);
        // El token se captura antes de enviar: un 401 solo cierra la sesión
        // si sigue siendo la misma que hizo la request.
        let token = self.session.token();

        let mut request = HttpRequest::new(method, url);
        if let Some(token) = token.as_deref() {
            request = request.header("Authorization", &format!("Bearer {}", token));
        }
        if let Some(body) = body {
            request = request.json_body(body);
        }

        let response = self.transport.send(request).await.map_err(|e| {
            log::error!("❌ {} {} falló: {}", method, path, e);
            AppError::Transport(e)
        })?;

        if response.ok() {
            return Ok(response.body);
        }

        let message = error_message(&response.body);
        if response.status == 401 {
            log::warn!("🔒 {} {} respondió 401", method, path);
            if let Some(token) = token.as_deref() {
                self.session.expire_token(token);
            }
            return Err(AppError::Unauthorized(message));
        }

        log::error!("❌ {} {} respondió HTTP {}", method, path, response.status);
        Err(AppError::Http {
            status: response.status,
            message,
        })
    }

    pub(crate) async fn get_json<R: DeserializeOwned>(&self, path: &str) -> AppResult<R> {
        let body = self.execute(Method::Get, path, None).await?;
        decode(&body)
    }

    pub(crate) async fn send_json<B: Serialize, R: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        payload: &B,
    ) -> AppResult<R> {
        let body = self.execute(method, path, Some(encode(payload)?)).await?;
        decode(&body)
    }

    /// Para endpoints cuya respuesta no interesa (204, mensajes informativos)
    pub(crate) async fn send_unit<B: Serialize>(&self, method: Method, path: &str, payload: &B) -> AppResult<()> {
        self.execute(method, path, Some(encode(payload)?)).await.map(|_| ())
    }

    pub(crate) async fn delete(&self, path: &str) -> AppResult<()> {
        self.execute(Method::Delete, path, None).await.map(|_| ())
    }
}

fn encode<B: Serialize>(payload: &B) -> AppResult<String> {
    serde_json::to_string(payload).map_err(|e| AppError::Transport(format!("Serialization error: {}", e)))
}

fn decode<R: DeserializeOwned>(body: &str) -> AppResult<R> {
    serde_json::from_str(body).map_err(|e| AppError::Transport(format!("Parse error: {}", e)))
}

/// Extrae `error` o `message` del body de una respuesta fallida
fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["error", "message"]
        .iter()
        .find_map(|key| value.get(*key).and_then(|v| v.as_str()))
        .filter(|m| !m.is_empty())
        .map(|m| m.to_string())
}
