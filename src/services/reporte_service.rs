use crate::error::AppResult;
use crate::models::{FiltroVentas, ReporteVenta, UsuarioReporte};
use crate::services::api_client::ApiClient;
use crate::services::http::HttpTransport;

impl<T: HttpTransport> ApiClient<T> {
    pub async fn get_usuarios_reporte(&self) -> AppResult<Vec<UsuarioReporte>> {
        self.get_json("/reportes/usuarios").await
    }

    /// Ventas por producto; sin filtro devuelve todo el histórico
    pub async fn get_ventas_filtradas(&self, filtro: Option<&FiltroVentas>) -> AppResult<Vec<ReporteVenta>> {
        match filtro {
            Some(filtro) => {
                filtro.validate()?;
                self.get_json(&format!("/reportes/ventas-filtradas?{}", filtro.to_query()))
                    .await
            }
            None => self.get_json("/reportes/ventas-filtradas").await,
        }
    }
}
