// ============================================================================
// APP - Raíz de composición
// ============================================================================
// Une storage + transporte + sesión + gateway. Las vistas piden aquí sus
// ViewModels y consultan el guard en cada navegación.
// ============================================================================

use std::rc::Rc;

use crate::config::CONFIG;
use crate::error::AppResult;
use crate::models::RegisterRequest;
use crate::router::{nav_items, resolve, NavItem, RouteDecision};
use crate::services::{ApiClient, HttpTransport};
use crate::state::{LoginOutcome, SessionStore, VerifyOutcome};
use crate::utils::KeyValueStorage;
use crate::viewmodels::{DashboardViewModel, EmpleadosViewModel, InventarioViewModel, VentasViewModel};

pub struct App<T> {
    session: SessionStore,
    api: ApiClient<T>,
}

impl<T: HttpTransport> App<T> {
    /// Restaura la sesión guardada y apunta al backend configurado
    pub fn new(storage: Rc<dyn KeyValueStorage>, transport: Rc<T>) -> Self {
        Self::with_base_url(storage, transport, CONFIG.backend_url())
    }

    pub fn with_base_url(storage: Rc<dyn KeyValueStorage>, transport: Rc<T>, base_url: &str) -> Self {
        let session = SessionStore::restore(storage);
        let api = ApiClient::new(base_url, transport, session.clone());
        log::info!("🚀 TiendaGestor iniciado contra {}", api.base_url());
        Self { session, api }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn api(&self) -> &ApiClient<T> {
        &self.api
    }

    /// Decide qué se muestra para `path` con la sesión de este momento
    pub fn navigate(&self, path: &str) -> RouteDecision {
        let decision = resolve(path, &self.session.snapshot());
        if let RouteDecision::Redirect(target) = decision {
            log::info!("↪️ {} redirigido a {}", path, target.path());
        }
        decision
    }

    pub fn nav_items(&self) -> Vec<NavItem> {
        nav_items(self.session.role())
    }

    pub async fn login(&self, usuario: &str, contrasena: &str) -> LoginOutcome {
        self.session.login(&self.api, usuario, contrasena).await
    }

    pub async fn verify_code(&self, code: &str) -> AppResult<VerifyOutcome> {
        self.session.verify_code(&self.api, code).await
    }

    pub async fn register(&self, form: &RegisterRequest) -> AppResult<String> {
        self.session.register(&self.api, form).await
    }

    pub fn logout(&self) {
        self.session.logout();
    }

    pub fn dashboard(&self) -> DashboardViewModel<T> {
        DashboardViewModel::new(self.api.clone())
    }

    pub fn inventario(&self) -> InventarioViewModel<T> {
        InventarioViewModel::new(self.api.clone())
    }

    pub fn ventas(&self) -> VentasViewModel<T> {
        VentasViewModel::new(self.api.clone())
    }

    pub fn empleados(&self) -> EmpleadosViewModel<T> {
        EmpleadosViewModel::new(self.api.clone())
    }
}
