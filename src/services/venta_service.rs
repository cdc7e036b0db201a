use crate::error::AppResult;
use crate::models::VentaRequest;
use crate::services::api_client::ApiClient;
use crate::services::http::{HttpTransport, Method};

impl<T: HttpTransport> ApiClient<T> {
    /// Registrar venta
    pub async fn create_venta(&self, venta: &VentaRequest) -> AppResult<()> {
        log::info!("🛒 Registrando venta con {} líneas", venta.productos.len());
        self.send_unit(Method::Post, "/ventas", venta).await
    }
}
