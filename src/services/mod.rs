pub mod http;
pub mod api_client;
pub mod auth_service;
pub mod producto_service;
pub mod empleado_service;
pub mod venta_service;
pub mod reporte_service;

pub use api_client::ApiClient;
pub use http::{HttpRequest, HttpResponse, HttpTransport, Method};
#[cfg(target_arch = "wasm32")]
pub use http::FetchTransport;
