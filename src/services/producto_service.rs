use crate::error::AppResult;
use crate::models::{Producto, ProductoForm};
use crate::services::api_client::ApiClient;
use crate::services::http::{HttpTransport, Method};

impl<T: HttpTransport> ApiClient<T> {
    /// Listar productos
    pub async fn get_productos(&self) -> AppResult<Vec<Producto>> {
        let productos: Vec<Producto> = self.get_json("/productos").await?;
        log::info!("📦 {} productos obtenidos", productos.len());
        Ok(productos)
    }

    pub async fn create_producto(&self, form: &ProductoForm) -> AppResult<()> {
        log::info!("➕ Creando producto: {}", form.nombre);
        self.send_unit(Method::Post, "/productos", form).await
    }

    pub async fn update_producto(&self, id: i64, form: &ProductoForm) -> AppResult<()> {
        log::info!("📝 Actualizando producto {}", id);
        self.send_unit(Method::Put, &format!("/productos/{}", id), form).await
    }

    pub async fn delete_producto(&self, id: i64) -> AppResult<()> {
        log::info!("🗑️ Eliminando producto {}", id);
        self.delete(&format!("/productos/{}", id)).await
    }
}
