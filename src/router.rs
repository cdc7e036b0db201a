// ============================================================================
// ROUTER - Rutas de la app y guard de acceso
// ============================================================================
// Se evalúa en cada navegación contra la sesión actual; la decisión no se cachea.
// ============================================================================

use crate::models::Role;
use crate::state::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Dashboard,
    Inventario,
    Ventas,
    Empleados,
}

impl Route {
    pub const ALL: [Route; 5] = [
        Route::Login,
        Route::Dashboard,
        Route::Inventario,
        Route::Ventas,
        Route::Empleados,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Dashboard => "/dashboard",
            Route::Inventario => "/inventario",
            Route::Ventas => "/ventas",
            Route::Empleados => "/empleados",
        }
    }

    /// Ignora query string, fragmento y barra final
    pub fn from_path(path: &str) -> Option<Route> {
        let path = path.split(['?', '#']).next().unwrap_or("");
        let path = path.trim_end_matches('/');
        Route::ALL.into_iter().find(|r| r.path() == path)
    }

    pub fn admin_only(&self) -> bool {
        matches!(self, Route::Empleados)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Route::Login => "Iniciar Sesión",
            Route::Dashboard => "Dashboard",
            Route::Inventario => "Inventario",
            Route::Ventas => "Ventas",
            Route::Empleados => "Empleados",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Allow(Route),
    Redirect(Route),
}

impl RouteDecision {
    /// Ruta que termina mostrándose
    pub fn target(&self) -> Route {
        match self {
            RouteDecision::Allow(route) | RouteDecision::Redirect(route) => *route,
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, RouteDecision::Allow(_))
    }
}

/// Guard de una ruta protegida
pub fn guard(route: Route, session: &Session) -> RouteDecision {
    if route == Route::Login {
        return if session.is_authenticated() {
            RouteDecision::Redirect(Route::Dashboard)
        } else {
            RouteDecision::Allow(Route::Login)
        };
    }
    if !session.is_authenticated() {
        return RouteDecision::Redirect(Route::Login);
    }
    if route.admin_only() && !session.is_admin() {
        return RouteDecision::Redirect(Route::Dashboard);
    }
    RouteDecision::Allow(route)
}

/// Resuelve un path cualquiera; `/` y rutas desconocidas van al inicio que corresponda
pub fn resolve(path: &str, session: &Session) -> RouteDecision {
    match Route::from_path(path) {
        Some(route) => guard(route, session),
        None if session.is_authenticated() => RouteDecision::Redirect(Route::Dashboard),
        None => RouteDecision::Redirect(Route::Login),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavItem {
    pub route: Route,
    pub label: &'static str,
}

/// Entradas del sidebar; Empleados solo para administradores
pub fn nav_items(role: Option<Role>) -> Vec<NavItem> {
    let mut routes = vec![Route::Dashboard, Route::Inventario, Route::Ventas];
    if role.map_or(false, |r| r.is_admin()) {
        routes.push(Route::Empleados);
    }
    routes
        .into_iter()
        .map(|route| NavItem { route, label: route.label() })
        .collect()
}
