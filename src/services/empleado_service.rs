use crate::error::AppResult;
use crate::models::{Empleado, EmpleadoForm};
use crate::services::api_client::ApiClient;
use crate::services::http::{HttpTransport, Method};

impl<T: HttpTransport> ApiClient<T> {
    pub async fn get_empleados(&self) -> AppResult<Vec<Empleado>> {
        self.get_json("/empleados").await
    }

    pub async fn create_empleado(&self, form: &EmpleadoForm) -> AppResult<()> {
        log::info!("👤 Creando empleado: {}", form.usuario);
        self.send_unit(Method::Post, "/empleados", form).await
    }

    pub async fn update_empleado(&self, id: i64, form: &EmpleadoForm) -> AppResult<()> {
        log::info!("📝 Actualizando empleado {}", id);
        self.send_unit(Method::Put, &format!("/empleados/{}", id), form).await
    }

    pub async fn delete_empleado(&self, id: i64) -> AppResult<()> {
        log::info!("🗑️ Eliminando empleado {}", id);
        self.delete(&format!("/empleados/{}", id)).await
    }
}
