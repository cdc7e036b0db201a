// ============================================================================
// TIENDA GESTOR - FRONTEND MVVM (RUST + WASM)
// ============================================================================
// - ViewModels: Estado de cada vista + lógica UI
// - Services: SOLO comunicación API (gateway autenticado)
// - State: Sesión y carrito con Rc<RefCell>
// - Router: Guard de rutas por sesión y rol
// - Models: Estructuras compartidas con backend
// ============================================================================

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod state;
pub mod router;
pub mod utils;
pub mod viewmodels;
pub mod app;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use app::App;
pub use config::{AppConfig, CONFIG};
pub use error::{AppError, AppResult};
pub use router::{Route, RouteDecision};
pub use state::{Cart, SessionStore};
