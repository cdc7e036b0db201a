// ============================================================================
// DASHBOARD VIEWMODEL - Métricas y gráfico de ventas
// ============================================================================

use serde::Serialize;

use crate::error::AppResult;
use crate::models::{FiltroVentas, Producto, ReporteVenta, UsuarioReporte};
use crate::services::{ApiClient, HttpTransport};

pub const CHART_TITLE: &str = "Productos Más Vendidos";
pub const CHART_SERIES_LABEL: &str = "Unidades Vendidas";

/// Tarjetas superiores del dashboard
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DashboardMetrics {
    pub total_productos: usize,
    pub productos_agotados: usize,
    pub total_ventas: f64,
}

/// Serie para el gráfico de barras
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub title: &'static str,
    pub series_label: &'static str,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

pub struct DashboardViewModel<T> {
    api: ApiClient<T>,
    productos: Vec<Producto>,
    usuarios: Vec<UsuarioReporte>,
    reportes: Vec<ReporteVenta>,
    filtro: FiltroVentas,
}

impl<T: HttpTransport> DashboardViewModel<T> {
    pub fn new(api: ApiClient<T>) -> Self {
        Self {
            api,
            productos: Vec::new(),
            usuarios: Vec::new(),
            reportes: Vec::new(),
            filtro: FiltroVentas::default(),
        }
    }

    pub fn productos(&self) -> &[Producto] {
        &self.productos
    }

    pub fn usuarios(&self) -> &[UsuarioReporte] {
        &self.usuarios
    }

    pub fn reportes(&self) -> &[ReporteVenta] {
        &self.reportes
    }

    pub fn filtro(&self) -> &FiltroVentas {
        &self.filtro
    }

    /// Fija el filtro sin consultar; lo usa la próxima carga
    pub fn set_filtro(&mut self, filtro: FiltroVentas) -> AppResult<()> {
        filtro.validate()?;
        self.filtro = filtro;
        Ok(())
    }

    /// Carga: productos, usuarios del filtro y ventas con el filtro actual
    /// (todo el histórico si está vacío)
    pub async fn cargar(&mut self) -> AppResult<()> {
        log::info!("📊 Cargando dashboard");
        self.productos = self.api.get_productos().await?;
        self.usuarios = self.api.get_usuarios_reporte().await?;
        let filtro = Some(&self.filtro).filter(|f| **f != FiltroVentas::default());
        self.reportes = self.api.get_ventas_filtradas(filtro).await?;
        log::info!(
            "✅ Dashboard: {} productos, {} filas de ventas",
            self.productos.len(),
            self.reportes.len()
        );
        Ok(())
    }

    /// Aplica el filtro. Un rango inválido se rechaza sin llamar al backend.
    /// Si la consulta falla se conservan las ventas anteriores y devuelve
    /// `Ok(false)`.
    pub async fn aplicar_filtro(&mut self, filtro: FiltroVentas) -> AppResult<bool> {
        self.set_filtro(filtro)?;

        match self.api.get_ventas_filtradas(Some(&self.filtro)).await {
            Ok(reportes) => {
                self.reportes = reportes;
                Ok(true)
            }
            Err(err) => {
                log::warn!("⚠️ No se pudo actualizar el reporte de ventas: {}", err);
                Ok(false)
            }
        }
    }

    pub fn metricas(&self) -> DashboardMetrics {
        DashboardMetrics {
            total_productos: self.productos.len(),
            productos_agotados: self.productos.iter().filter(|p| p.is_agotado()).count(),
            total_ventas: self.reportes.iter().map(ReporteVenta::total).sum(),
        }
    }

    pub fn chart(&self) -> ChartData {
        ChartData {
            title: CHART_TITLE,
            series_label: CHART_SERIES_LABEL,
            labels: self.reportes.iter().map(|r| r.etiqueta().to_string()).collect(),
            values: self.reportes.iter().map(ReporteVenta::unidades).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::services::http::mock::MockTransport;
    use crate::state::SessionStore;
    use crate::utils::MemoryStorage;
    use chrono::NaiveDate;
    use serde_json::json;
    use std::rc::Rc;

    fn viewmodel() -> (DashboardViewModel<MockTransport>, Rc<MockTransport>) {
        let session = SessionStore::restore(Rc::new(MemoryStorage::with_entries([("token", "t")])));
        let transport = Rc::new(MockTransport::new());
        let api = ApiClient::new("http://api.test", transport.clone(), session);
        (DashboardViewModel::new(api), transport)
    }

    fn cargado(transport: &MockTransport) {
        transport
            .respond(
                200,
                json!([
                    {"id": 1, "nombre": "Arroz", "precio": 18.5, "stock": 0},
                    {"id": 2, "nombre": "Aceite", "precio": 9.9, "stock": 4}
                ]),
            )
            .respond(200, json!([{"id": 1, "nombre": "Ana"}, {"id": "2", "nombre": "Luis"}]))
            .respond(
                200,
                json!([
                    {"nombre": "Arroz", "cantidad_vendida": "6", "total_vendido": "111.00"},
                    {"producto": "Aceite", "cantidad": 2, "total_vendido": 19.8}
                ]),
            );
    }

    #[tokio::test]
    async fn metrics_and_chart() {
        let (mut vm, transport) = viewmodel();
        cargado(&transport);
        vm.cargar().await.unwrap();

        let metricas = vm.metricas();
        assert_eq!(metricas.total_productos, 2);
        assert_eq!(metricas.productos_agotados, 1);
        assert!((metricas.total_ventas - 130.8).abs() < 1e-9);
        assert_eq!(vm.usuarios()[1].id, "2");

        let chart = vm.chart();
        assert_eq!(chart.title, "Productos Más Vendidos");
        assert_eq!(chart.series_label, "Unidades Vendidas");
        assert_eq!(chart.labels, vec!["Arroz", "Aceite"]);
        assert_eq!(chart.values, vec![6.0, 2.0]);
    }

    #[tokio::test]
    async fn filter_builds_query() {
        let (mut vm, transport) = viewmodel();
        cargado(&transport);
        vm.cargar().await.unwrap();

        transport.respond(200, json!([]));
        let filtro = FiltroVentas::from_inputs("2024-01-01", "2024-01-31", "2").unwrap();
        assert!(vm.aplicar_filtro(filtro).await.unwrap());

        assert_eq!(
            transport.last_request().unwrap().url,
            "http://api.test/reportes/ventas-filtradas?fechaInicio=2024-01-01&fechaFin=2024-01-31&id_usuario=2"
        );
        assert!(vm.reportes().is_empty());
        assert_eq!(vm.metricas().total_ventas, 0.0);
    }

    #[tokio::test]
    async fn preset_filter_is_used_by_initial_load() {
        let (mut vm, transport) = viewmodel();
        vm.set_filtro(FiltroVentas::from_inputs("2024-03-01", "", "").unwrap()).unwrap();
        cargado(&transport);

        vm.cargar().await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(
            requests[2].url,
            "http://api.test/reportes/ventas-filtradas?fechaInicio=2024-03-01&fechaFin=&id_usuario="
        );
    }

    #[tokio::test]
    async fn initial_load_without_filter_fetches_everything() {
        let (mut vm, transport) = viewmodel();
        cargado(&transport);
        vm.cargar().await.unwrap();
        assert_eq!(transport.requests()[2].url, "http://api.test/reportes/ventas-filtradas");
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_report() {
        let (mut vm, transport) = viewmodel();
        cargado(&transport);
        vm.cargar().await.unwrap();

        transport.respond_empty(500);
        let refreshed = vm.aplicar_filtro(FiltroVentas::default()).await.unwrap();

        assert!(!refreshed);
        assert_eq!(vm.reportes().len(), 2);
    }

    #[tokio::test]
    async fn inverted_range_is_rejected_locally() {
        let (mut vm, transport) = viewmodel();
        let filtro = FiltroVentas {
            fecha_inicio: NaiveDate::from_ymd_opt(2024, 2, 1),
            fecha_fin: NaiveDate::from_ymd_opt(2024, 1, 1),
            id_usuario: None,
        };

        assert!(matches!(vm.aplicar_filtro(filtro).await, Err(AppError::Validation(_))));
        assert!(transport.requests().is_empty());
        assert_eq!(vm.filtro(), &FiltroVentas::default());
    }

    #[tokio::test]
    async fn initial_load_failure_propagates() {
        let (mut vm, transport) = viewmodel();
        transport.fail("Network error: offline");
        assert!(matches!(vm.cargar().await, Err(AppError::Transport(_))));
    }
}
