use serde::{Deserialize, Serialize};

use crate::utils::BACKEND_URL;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// URL explícita de la API (`API_URL`); tiene prioridad sobre el entorno
    pub api_url: Option<String>,
    pub backend_url_development: String,
    pub backend_url_production: String,
    pub environment: String,
    pub enable_logging: bool,
    /// Por debajo de este stock el inventario marca el producto en amarillo
    pub low_stock_threshold: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            backend_url_development: BACKEND_URL.to_string(),
            backend_url_production: "https://api.tiendagestor.com".to_string(),
            environment: "development".to_string(),
            enable_logging: true,
            low_stock_threshold: 5,
        }
    }
}

impl AppConfig {
    /// Carga la configuración desde variables de entorno en tiempo de compilación
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_url: option_env!("API_URL").map(|s| s.to_string()),
            backend_url_development: option_env!("BACKEND_URL_DEVELOPMENT")
                .map(|s| s.to_string())
                .unwrap_or(defaults.backend_url_development),
            backend_url_production: option_env!("BACKEND_URL_PRODUCTION")
                .map(|s| s.to_string())
                .unwrap_or(defaults.backend_url_production),
            environment: option_env!("ENVIRONMENT")
                .unwrap_or("development").to_string(),
            enable_logging: option_env!("ENABLE_LOGGING")
                .unwrap_or("true").parse().unwrap_or(true),
            low_stock_threshold: option_env!("LOW_STOCK_THRESHOLD")
                .unwrap_or("5").parse().unwrap_or(5),
        }
    }

    /// Obtiene la URL del backend según el entorno actual
    pub fn backend_url(&self) -> &str {
        if let Some(url) = self.api_url.as_deref() {
            return url.trim_end_matches('/');
        }
        match self.environment.as_str() {
            "production" => self.backend_url_production.trim_end_matches('/'),
            _ => self.backend_url_development.trim_end_matches('/'),
        }
    }

    /// Verifica si el modo de logging está habilitado
    pub fn is_logging_enabled(&self) -> bool {
        self.enable_logging
    }

    pub fn log_level(&self) -> log::Level {
        if self.enable_logging {
            log::Level::Info
        } else {
            log::Level::Error
        }
    }
}

// Configuración global estática
lazy_static::lazy_static! {
    pub static ref CONFIG: AppConfig = AppConfig::from_env();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_url_wins_over_environment() {
        let config = AppConfig {
            api_url: Some("https://mi-api.example/".into()),
            environment: "production".into(),
            ..AppConfig::default()
        };
        assert_eq!(config.backend_url(), "https://mi-api.example");
    }

    #[test]
    fn environment_selects_backend() {
        let mut config = AppConfig {
            backend_url_development: "http://localhost:4000".into(),
            ..AppConfig::default()
        };
        assert_eq!(config.backend_url(), "http://localhost:4000");
        config.environment = "production".into();
        assert_eq!(config.backend_url(), "https://api.tiendagestor.com");
    }
}
