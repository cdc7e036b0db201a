/// URL base del backend
/// Configurada en tiempo de compilación:
/// - Desarrollo: http://localhost:4000 (por defecto)
/// - Producción: via API_URL env var
pub const BACKEND_URL: &str = match option_env!("API_URL") {
    Some(url) => url,
    None => "http://localhost:4000",
};

// Claves de localStorage
pub const STORAGE_KEY_TOKEN: &str = "token";
pub const STORAGE_KEY_ROLE: &str = "role";
pub const STORAGE_KEY_USER_ID: &str = "usuario";
pub const STORAGE_KEY_PENDING_USER_ID: &str = "pendingUserId";
