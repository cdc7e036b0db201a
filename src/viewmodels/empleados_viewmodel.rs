// ============================================================================
// EMPLEADOS VIEWMODEL - Gestión de usuarios (solo admin)
// ============================================================================

use crate::error::{AppError, AppResult};
use crate::models::{Empleado, EmpleadoForm, ResumenEmpleados};
use crate::services::{ApiClient, HttpTransport};
use crate::utils::{require_field, validate_password};

pub struct EmpleadosViewModel<T> {
    api: ApiClient<T>,
    empleados: Vec<Empleado>,
    error: Option<String>,
}

impl<T: HttpTransport> EmpleadosViewModel<T> {
    pub fn new(api: ApiClient<T>) -> Self {
        Self {
            api,
            empleados: Vec::new(),
            error: None,
        }
    }

    pub fn empleados(&self) -> &[Empleado] {
        &self.empleados
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn resumen(&self) -> ResumenEmpleados {
        ResumenEmpleados::from_empleados(&self.empleados)
    }

    pub async fn cargar(&mut self) -> AppResult<()> {
        match self.api.get_empleados().await {
            Ok(empleados) => {
                self.empleados = empleados;
                self.error = None;
                Ok(())
            }
            Err(err) => {
                log::error!("❌ Error cargando empleados: {}", err);
                self.error = Some("Error al cargar empleados".to_string());
                Err(err)
            }
        }
    }

    /// Crea o edita. La contraseña es obligatoria al crear; al editar, vacía
    /// significa "mantener la actual".
    pub async fn guardar(&mut self, editando: Option<i64>, form: &EmpleadoForm) -> AppResult<()> {
        let form = match preparar_form(editando.is_some(), form) {
            Ok(form) => form,
            Err(err) => {
                self.error = Some(err.to_string());
                return Err(err);
            }
        };

        let result = match editando {
            Some(id) => self.api.update_empleado(id, &form).await,
            None => self.api.create_empleado(&form).await,
        };
        if let Err(err) = result {
            let err = err.into_conflict("Error al guardar empleado");
            self.error = Some(err.to_string());
            return Err(err);
        }

        self.error = None;
        self.cargar().await
    }

    pub async fn eliminar(&mut self, id: i64) -> AppResult<()> {
        if let Err(err) = self.api.delete_empleado(id).await {
            let err = err.into_conflict("Error al eliminar empleado");
            self.error = Some(err.to_string());
            return Err(err);
        }
        self.cargar().await
    }
}

fn preparar_form(editando: bool, form: &EmpleadoForm) -> AppResult<EmpleadoForm> {
    require_field(&form.nombre, "nombre")?;
    require_field(&form.usuario, "usuario")?;

    let contrasena = form.contrasena.as_deref().filter(|c| !c.is_empty());
    match contrasena {
        Some(c) => validate_password(c)?,
        None if !editando => {
            return Err(AppError::Validation("La contraseña es obligatoria".to_string()));
        }
        None => {}
    }

    Ok(EmpleadoForm {
        contrasena: contrasena.map(str::to_string),
        ..form.clone()
    })
}
