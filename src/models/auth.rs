use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::lenient;

/// Rol del usuario autenticado
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Empleado,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Empleado => "empleado",
            Role::Admin => "admin",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "empleado" | "employee" => Ok(Role::Empleado),
            other => Err(format!("Rol desconocido: {}", other)),
        }
    }
}

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
pub struct LoginRequest {
    pub usuario: String,
    pub contrasena: String,
}

/// Respuesta de `/auth/login`: o bien trae token, o bien pide verificación
#[derive(Clone, PartialEq, Serialize, Deserialize, Debug, Default)]
pub struct LoginResponse {
    #[serde(default)]
    pub step: Option<String>,
    #[serde(rename = "userId", default, deserialize_with = "lenient::option_string")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default, deserialize_with = "lenient::option_string")]
    pub usuario: Option<String>,
    #[serde(default)]
    pub rol: Option<String>,
}

impl LoginResponse {
    pub fn requires_verification(&self) -> bool {
        self.step.as_deref() == Some("verify")
    }

    pub fn role(&self) -> Option<Role> {
        self.rol.as_deref().and_then(|r| r.parse().ok())
    }
}

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
pub struct VerifyCodeRequest {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub code: String,
}

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug, Default)]
pub struct VerifyCodeResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default, deserialize_with = "lenient::option_string")]
    pub usuario: Option<String>,
    #[serde(default)]
    pub rol: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl VerifyCodeResponse {
    pub fn role(&self) -> Option<Role> {
        self.rol.as_deref().and_then(|r| r.parse().ok())
    }
}

/// Alta de usuario (`/auth/register`)
#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
pub struct RegisterRequest {
    pub nombre: String,
    pub usuario: String,
    pub correo: String,
    pub contrasena: String,
    pub rol: Role,
}
