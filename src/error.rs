// ============================================================================
// ERRORES - Taxonomía de fallos del cliente
// ============================================================================
// Cada fallo llega a la vista que inició la operación; ninguno se descarta
// salvo los refrescos en segundo plano (ver DashboardViewModel).
// ============================================================================

use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    /// Credenciales o código incorrectos (el usuario puede corregirlos)
    #[error("{0}")]
    Authentication(String),

    /// 401 a mitad de sesión: la sesión ya fue cerrada
    #[error("{}", .0.as_deref().unwrap_or("Sesión expirada, inicia sesión nuevamente"))]
    Unauthorized(Option<String>),

    /// Validación del lado del cliente antes de enviar
    #[error("{0}")]
    Validation(String),

    /// El servidor rechazó la operación por un cambio de estado (p.ej. stock)
    #[error("{0}")]
    Conflict(String),

    /// Respuesta no-2xx sin clasificar
    #[error("HTTP {status}: {}", .message.as_deref().unwrap_or("Error del servidor"))]
    Http { status: u16, message: Option<String> },

    /// Red caída, servidor inaccesible o respuesta ilegible
    #[error("Error de red: {0}")]
    Transport(String),

    #[error("Estado inválido: {0}")]
    InvalidState(String),
}

impl AppError {
    /// Mensaje del servidor, si la respuesta traía uno
    pub fn server_message(&self) -> Option<&str> {
        match self {
            AppError::Unauthorized(message) | AppError::Http { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Respuesta 4xx (incluye 401)
    pub fn is_client_error(&self) -> bool {
        match self {
            AppError::Unauthorized(_) => true,
            AppError::Http { status, .. } => (400..500).contains(status),
            _ => false,
        }
    }

    /// Convierte un 4xx en `Conflict` con el texto del servidor; el resto pasa intacto.
    pub fn into_conflict(self, default_message: &str) -> AppError {
        match self {
            AppError::Http { status, message } if (400..500).contains(&status) => {
                AppError::Conflict(message.unwrap_or_else(|| default_message.to_string()))
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn into_conflict_keeps_server_text() {
        let err = AppError::Http { status: 400, message: Some("Stock insuficiente".into()) };
        assert_eq!(err.into_conflict("x"), AppError::Conflict("Stock insuficiente".into()));

        let err = AppError::Http { status: 409, message: None };
        assert_eq!(err.into_conflict("Error al eliminar"), AppError::Conflict("Error al eliminar".into()));
    }

    #[test]
    fn into_conflict_leaves_server_errors_alone() {
        let err = AppError::Http { status: 500, message: None };
        assert_eq!(err.clone().into_conflict("x"), err);
        assert_eq!(AppError::Unauthorized(None).into_conflict("x"), AppError::Unauthorized(None));
    }

    #[test]
    fn display_uses_server_message() {
        assert_eq!(
            AppError::Unauthorized(Some("Token inválido".into())).to_string(),
            "Token inválido"
        );
        assert_eq!(
            AppError::Http { status: 502, message: None }.to_string(),
            "HTTP 502: Error del servidor"
        );
    }
}
