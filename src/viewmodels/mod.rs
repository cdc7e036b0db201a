pub mod dashboard_viewmodel;
pub mod inventario_viewmodel;
pub mod ventas_viewmodel;
pub mod empleados_viewmodel;

pub use dashboard_viewmodel::{ChartData, DashboardMetrics, DashboardViewModel};
pub use inventario_viewmodel::InventarioViewModel;
pub use ventas_viewmodel::VentasViewModel;
pub use empleados_viewmodel::EmpleadosViewModel;
