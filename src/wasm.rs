// ============================================================================
// WASM - Punto de entrada del navegador
// ============================================================================
// La App y el ViewModel de cada pantalla viven en thread_locals; las vistas
// JS llaman a estas funciones y escuchan el evento "sessionChanged" de
// window para re-renderizar.
// ============================================================================

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::thread::LocalKey;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use wasm_bindgen::prelude::*;

use crate::app::App;
use crate::config::CONFIG;
use crate::error::AppResult;
use crate::models::{EmpleadoForm, FiltroVentas, ProductoForm, RegisterRequest};
use crate::services::FetchTransport;
use crate::state::SessionEvent;
use crate::utils::BrowserStorage;
use crate::viewmodels::{DashboardViewModel, EmpleadosViewModel, InventarioViewModel, VentasViewModel};

type BrowserApp = App<FetchTransport>;

/// ViewModel de una pantalla. Mientras una operación async lo tiene
/// prestado, las demás llamadas reciben error en vez de una copia vacía.
struct Slot<V> {
    vm: RefCell<Option<V>>,
    busy: Cell<bool>,
}

impl<V> Slot<V> {
    fn new() -> Self {
        Self {
            vm: RefCell::new(None),
            busy: Cell::new(false),
        }
    }

    fn take(&self, init: impl FnOnce() -> V) -> Result<V, JsValue> {
        if self.busy.get() {
            return Err(JsValue::from_str("Operación en curso, intenta de nuevo"));
        }
        self.busy.set(true);
        Ok(self.vm.borrow_mut().take().unwrap_or_else(init))
    }

    fn restore(&self, vm: V) {
        *self.vm.borrow_mut() = Some(vm);
        self.busy.set(false);
    }

    fn reset(&self) {
        self.vm.borrow_mut().take();
    }
}

thread_local! {
    static APP: RefCell<Option<Rc<BrowserApp>>> = RefCell::new(None);
    static VENTAS: Slot<VentasViewModel<FetchTransport>> = Slot::new();
    static INVENTARIO: Slot<InventarioViewModel<FetchTransport>> = Slot::new();
    static EMPLEADOS: Slot<EmpleadosViewModel<FetchTransport>> = Slot::new();
}

pub const SESSION_CHANGED_EVENT: &str = "sessionChanged";

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::new(CONFIG.log_level()));
    log::info!("🚀 TiendaGestor - Rust + WASM ({})", CONFIG.environment);

    let app = App::new(Rc::new(BrowserStorage), Rc::new(FetchTransport));

    // Se registra una sola vez: el listener vive lo mismo que la App
    app.session().subscribe(|event| {
        if matches!(event, SessionEvent::LoggedOut) {
            // El carrito y las listas pertenecen a la sesión que terminó
            VENTAS.with(Slot::reset);
            INVENTARIO.with(Slot::reset);
            EMPLEADOS.with(Slot::reset);
            log::info!("👋 Sesión cerrada, la vista vuelve a /login");
        }
        dispatch_session_changed();
    });

    APP.with(|cell| *cell.borrow_mut() = Some(Rc::new(app)));
    Ok(())
}

fn dispatch_session_changed() {
    let Some(win) = web_sys::window() else {
        return;
    };
    match web_sys::CustomEvent::new(SESSION_CHANGED_EVENT) {
        Ok(event) => {
            if let Err(e) = win.dispatch_event(&event) {
                log::error!("❌ No se pudo despachar {}: {:?}", SESSION_CHANGED_EVENT, e);
            }
        }
        Err(e) => log::error!("❌ No se pudo crear evento {}: {:?}", SESSION_CHANGED_EVENT, e),
    }
}

fn app() -> Result<Rc<BrowserApp>, JsValue> {
    APP.with(|cell| cell.borrow().clone())
        .ok_or_else(|| JsValue::from_str("App no está inicializada"))
}

fn take<V: 'static>(key: &'static LocalKey<Slot<V>>, init: fn(&BrowserApp) -> V) -> Result<V, JsValue> {
    let app = app()?;
    key.with(|slot| slot.take(|| init(&app)))
}

fn restore<V: 'static>(key: &'static LocalKey<Slot<V>>, vm: V) {
    key.with(|slot| slot.restore(vm));
}

/// Operación síncrona sobre el ViewModel de una pantalla
fn with_vm<V: 'static, R>(
    key: &'static LocalKey<Slot<V>>,
    init: fn(&BrowserApp) -> V,
    f: impl FnOnce(&mut V) -> R,
) -> Result<R, JsValue> {
    let mut vm = take(key, init)?;
    let result = f(&mut vm);
    restore(key, vm);
    Ok(result)
}

/// Serializa como objetos JS planos (no `Map`)
fn to_js<S: Serialize>(value: &S) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

fn from_js<D: DeserializeOwned>(value: JsValue) -> Result<D, JsValue> {
    serde_wasm_bindgen::from_value(value).map_err(|e| JsValue::from_str(&format!("Formulario inválido: {}", e)))
}

/// El error de la operación rechaza la Promise con su mensaje
fn js_err<T>(result: AppResult<T>) -> Result<T, JsValue> {
    result.map_err(|e| JsValue::from_str(&e.to_string()))
}

// ----------------------------------------------------------------------------
// Sesión y navegación
// ----------------------------------------------------------------------------

/// Path que debe mostrarse para `path` (el mismo si está permitido)
#[wasm_bindgen]
pub fn resolve_route(path: &str) -> Result<String, JsValue> {
    Ok(app()?.navigate(path).target().path().to_string())
}

#[wasm_bindgen]
pub fn nav_items() -> Result<JsValue, JsValue> {
    let items: Vec<serde_json::Value> = app()?
        .nav_items()
        .into_iter()
        .map(|item| json!({ "path": item.route.path(), "label": item.label }))
        .collect();
    to_js(&items)
}

#[wasm_bindgen]
pub async fn login(usuario: String, contrasena: String) -> Result<JsValue, JsValue> {
    let outcome = app()?.login(&usuario, &contrasena).await;
    to_js(&outcome.to_json())
}

#[wasm_bindgen]
pub async fn verify_code(code: String) -> Result<JsValue, JsValue> {
    match app()?.verify_code(&code).await {
        Ok(outcome) => to_js(&outcome.to_json()),
        Err(err) => to_js(&json!({ "success": false, "error": err.to_string() })),
    }
}

/// Alta de usuario: `{nombre, usuario, correo, contrasena, rol}`
#[wasm_bindgen]
pub async fn register(form: JsValue) -> Result<JsValue, JsValue> {
    let form: RegisterRequest = from_js(form)?;
    let message = js_err(app()?.register(&form).await)?;
    to_js(&json!({ "success": true, "message": message }))
}

#[wasm_bindgen]
pub fn logout() -> Result<(), JsValue> {
    app()?.logout();
    Ok(())
}

#[wasm_bindgen]
pub fn current_role() -> Result<Option<String>, JsValue> {
    Ok(app()?.session().role().map(|r| r.as_str().to_string()))
}

// ----------------------------------------------------------------------------
// Dashboard
// ----------------------------------------------------------------------------

/// Métricas + gráfico del dashboard, opcionalmente filtrados (`YYYY-MM-DD`)
#[wasm_bindgen]
pub async fn load_dashboard(fecha_inicio: String, fecha_fin: String, id_usuario: String) -> Result<JsValue, JsValue> {
    let app = app()?;
    let mut dashboard: DashboardViewModel<FetchTransport> = app.dashboard();
    let filtro = js_err(FiltroVentas::from_inputs(&fecha_inicio, &fecha_fin, &id_usuario))?;
    js_err(dashboard.set_filtro(filtro))?;
    js_err(dashboard.cargar().await)?;

    to_js(&json!({
        "metricas": dashboard.metricas(),
        "chart": dashboard.chart(),
        "usuarios": dashboard.usuarios(),
    }))
}

// ----------------------------------------------------------------------------
// Ventas (punto de venta)
// ----------------------------------------------------------------------------

fn ventas_state(vm: &VentasViewModel<FetchTransport>) -> serde_json::Value {
    json!({
        "productos": vm.filtrados(),
        "carrito": vm.cart().items(),
        "total": vm.total(),
    })
}

/// Entrar a la vista: carrito vacío y catálogo recargado
#[wasm_bindgen]
pub async fn ventas_abrir() -> Result<JsValue, JsValue> {
    let app = app()?;
    let _anterior = take(&VENTAS, BrowserApp::ventas)?;
    let mut vm = app.ventas();
    let result = vm.cargar_productos().await;
    let state = ventas_state(&vm);
    restore(&VENTAS, vm);
    js_err(result)?;
    to_js(&state)
}

#[wasm_bindgen]
pub fn ventas_buscar(busqueda: &str) -> Result<JsValue, JsValue> {
    to_js(&with_vm(&VENTAS, BrowserApp::ventas, |vm| {
        vm.set_busqueda(busqueda);
        ventas_state(vm)
    })?)
}

#[wasm_bindgen]
pub fn ventas_agregar(product_id: i32) -> Result<JsValue, JsValue> {
    to_js(&with_vm(&VENTAS, BrowserApp::ventas, |vm| {
        vm.agregar(i64::from(product_id));
        ventas_state(vm)
    })?)
}

#[wasm_bindgen]
pub fn ventas_actualizar_cantidad(product_id: i32, cantidad: i32) -> Result<JsValue, JsValue> {
    to_js(&with_vm(&VENTAS, BrowserApp::ventas, |vm| {
        vm.actualizar_cantidad(i64::from(product_id), i64::from(cantidad));
        ventas_state(vm)
    })?)
}

#[wasm_bindgen]
pub fn ventas_quitar(product_id: i32) -> Result<JsValue, JsValue> {
    to_js(&with_vm(&VENTAS, BrowserApp::ventas, |vm| {
        vm.quitar(i64::from(product_id));
        ventas_state(vm)
    })?)
}

#[wasm_bindgen]
pub fn ventas_total() -> Result<f64, JsValue> {
    with_vm(&VENTAS, BrowserApp::ventas, |vm| vm.total())
}

/// Si el servidor rechaza la venta el carrito queda igual para reintentar
#[wasm_bindgen]
pub async fn ventas_confirmar() -> Result<JsValue, JsValue> {
    let mut vm = take(&VENTAS, BrowserApp::ventas)?;
    let result = vm.confirmar_venta().await;
    let state = ventas_state(&vm);
    restore(&VENTAS, vm);
    let message = js_err(result)?;
    to_js(&json!({ "message": message, "estado": state }))
}

// ----------------------------------------------------------------------------
// Inventario
// ----------------------------------------------------------------------------

fn inventario_state(vm: &InventarioViewModel<FetchTransport>) -> serde_json::Value {
    let productos: Vec<serde_json::Value> = vm
        .filtrados()
        .into_iter()
        .map(|p| json!({ "producto": p, "nivel": p.stock_level() }))
        .collect();
    json!({ "productos": productos, "error": vm.error() })
}

#[wasm_bindgen]
pub async fn inventario_cargar() -> Result<JsValue, JsValue> {
    let mut vm = take(&INVENTARIO, BrowserApp::inventario)?;
    let result = vm.cargar().await;
    let state = inventario_state(&vm);
    restore(&INVENTARIO, vm);
    js_err(result)?;
    to_js(&state)
}

#[wasm_bindgen]
pub fn inventario_buscar(busqueda: &str) -> Result<JsValue, JsValue> {
    to_js(&with_vm(&INVENTARIO, BrowserApp::inventario, |vm| {
        vm.set_busqueda(busqueda);
        inventario_state(vm)
    })?)
}

/// `id = undefined` crea; con id actualiza. `form = {nombre, descripcion, precio, stock}`
#[wasm_bindgen]
pub async fn inventario_guardar(id: Option<i32>, form: JsValue) -> Result<JsValue, JsValue> {
    let form: ProductoForm = from_js(form)?;
    let mut vm = take(&INVENTARIO, BrowserApp::inventario)?;
    let result = vm.guardar(id.map(i64::from), &form).await;
    let state = inventario_state(&vm);
    restore(&INVENTARIO, vm);
    js_err(result)?;
    to_js(&state)
}

#[wasm_bindgen]
pub async fn inventario_eliminar(id: i32) -> Result<JsValue, JsValue> {
    let mut vm = take(&INVENTARIO, BrowserApp::inventario)?;
    let result = vm.eliminar(i64::from(id)).await;
    let state = inventario_state(&vm);
    restore(&INVENTARIO, vm);
    js_err(result)?;
    to_js(&state)
}

// ----------------------------------------------------------------------------
// Empleados (solo admin; el guard redirige antes de llegar aquí)
// ----------------------------------------------------------------------------

fn empleados_state(vm: &EmpleadosViewModel<FetchTransport>) -> serde_json::Value {
    json!({
        "empleados": vm.empleados(),
        "resumen": vm.resumen(),
        "error": vm.error(),
    })
}

#[wasm_bindgen]
pub async fn empleados_cargar() -> Result<JsValue, JsValue> {
    let mut vm = take(&EMPLEADOS, BrowserApp::empleados)?;
    let result = vm.cargar().await;
    let state = empleados_state(&vm);
    restore(&EMPLEADOS, vm);
    js_err(result)?;
    to_js(&state)
}

/// `form = {nombre, usuario, correo, contrasena?, rol}`
#[wasm_bindgen]
pub async fn empleados_guardar(id: Option<i32>, form: JsValue) -> Result<JsValue, JsValue> {
    let form: EmpleadoForm = from_js(form)?;
    let mut vm = take(&EMPLEADOS, BrowserApp::empleados)?;
    let result = vm.guardar(id.map(i64::from), &form).await;
    let state = empleados_state(&vm);
    restore(&EMPLEADOS, vm);
    js_err(result)?;
    to_js(&state)
}

#[wasm_bindgen]
pub async fn empleados_eliminar(id: i32) -> Result<JsValue, JsValue> {
    let mut vm = take(&EMPLEADOS, BrowserApp::empleados)?;
    let result = vm.eliminar(i64::from(id)).await;
    let state = empleados_state(&vm);
    restore(&EMPLEADOS, vm);
    js_err(result)?;
    to_js(&state)
}
