use serde::{Deserialize, Serialize};

use super::auth::Role;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Empleado {
    pub id: i64,
    pub nombre: String,
    pub usuario: String,
    #[serde(default)]
    pub correo: Option<String>,
    pub rol: Role,
}

/// Formulario de empleado. En edición, una contraseña vacía no se envía y el
/// backend conserva la anterior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmpleadoForm {
    pub nombre: String,
    pub usuario: String,
    pub correo: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contrasena: Option<String>,
    pub rol: Role,
}

impl Default for EmpleadoForm {
    fn default() -> Self {
        Self {
            nombre: String::new(),
            usuario: String::new(),
            correo: String::new(),
            contrasena: None,
            rol: Role::Empleado,
        }
    }
}

impl From<&Empleado> for EmpleadoForm {
    fn from(empleado: &Empleado) -> Self {
        Self {
            nombre: empleado.nombre.clone(),
            usuario: empleado.usuario.clone(),
            correo: empleado.correo.clone().unwrap_or_default(),
            contrasena: None,
            rol: empleado.rol,
        }
    }
}

/// Tarjetas de resumen de la vista de empleados
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ResumenEmpleados {
    pub total: usize,
    pub admins: usize,
    pub empleados: usize,
}

impl ResumenEmpleados {
    pub fn from_empleados(empleados: &[Empleado]) -> Self {
        let admins = empleados.iter().filter(|e| e.rol.is_admin()).count();
        Self {
            total: empleados.len(),
            admins,
            empleados: empleados.len() - admins,
        }
    }
}
