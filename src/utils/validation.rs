use crate::error::{AppError, AppResult};

pub const PASSWORD_POLICY_MESSAGE: &str =
    "Contraseña debe tener al menos 8 caracteres, una mayúscula y una minúscula";

/// Política de contraseña: mínimo 8 caracteres, al menos una mayúscula y una minúscula
pub fn is_valid_password(password: &str) -> bool {
    password.chars().count() >= 8
        && password.chars().any(|c| c.is_lowercase())
        && password.chars().any(|c| c.is_uppercase())
}

pub fn validate_password(password: &str) -> AppResult<()> {
    if is_valid_password(password) {
        Ok(())
    } else {
        Err(AppError::Validation(PASSWORD_POLICY_MESSAGE.to_string()))
    }
}

/// Campo obligatorio (ignora espacios)
pub fn require_field(value: &str, field: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("El campo {} es obligatorio", field)));
    }
    Ok(())
}
