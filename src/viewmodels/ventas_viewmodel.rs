// ============================================================================
// VENTAS VIEWMODEL - Punto de venta
// ============================================================================
// Catálogo disponible (stock > 0) + carrito. Devuelve valores, la vista
// decide cómo mostrarlos.
// ============================================================================

use crate::error::AppResult;
use crate::models::Producto;
use crate::services::{ApiClient, HttpTransport};
use crate::state::Cart;

pub struct VentasViewModel<T> {
    api: ApiClient<T>,
    productos: Vec<Producto>,
    busqueda: String,
    cart: Cart,
}

impl<T: HttpTransport> VentasViewModel<T> {
    /// Al entrar a la vista el carrito empieza vacío
    pub fn new(api: ApiClient<T>) -> Self {
        Self {
            api,
            productos: Vec::new(),
            busqueda: String::new(),
            cart: Cart::new(),
        }
    }

    pub fn productos(&self) -> &[Producto] {
        &self.productos
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn set_busqueda(&mut self, busqueda: &str) {
        self.busqueda = busqueda.to_string();
    }

    /// Búsqueda por nombre o código
    pub fn filtrados(&self) -> Vec<&Producto> {
        let needle = self.busqueda.trim().to_lowercase();
        self.productos
            .iter()
            .filter(|p| {
                needle.is_empty()
                    || p.nombre.to_lowercase().contains(&needle)
                    || p.codigo.as_deref().map_or(false, |c| c.to_lowercase().contains(&needle))
            })
            .collect()
    }

    pub async fn cargar_productos(&mut self) -> AppResult<()> {
        let productos = self.api.get_productos().await?;
        self.productos = productos.into_iter().filter(|p| p.stock > 0).collect();
        Ok(())
    }

    /// Agrega una unidad del producto del catálogo. Devuelve false si no existe.
    pub fn agregar(&mut self, product_id: i64) -> bool {
        match self.productos.iter().find(|p| p.id == product_id) {
            Some(producto) => {
                self.cart.add_item(producto);
                true
            }
            None => false,
        }
    }

    pub fn actualizar_cantidad(&mut self, product_id: i64, cantidad: i64) {
        self.cart.set_quantity(product_id, cantidad);
    }

    pub fn quitar(&mut self, product_id: i64) {
        self.cart.remove_item(product_id);
    }

    /// Abandonar la venta en curso
    pub fn vaciar(&mut self) {
        self.cart.clear();
    }

    pub fn total(&self) -> f64 {
        self.cart.total()
    }

    /// Confirma la venta. Tras el éxito el catálogo se recarga para reflejar
    /// el nuevo stock; si esa recarga falla solo se registra en el log.
    pub async fn confirmar_venta(&mut self) -> AppResult<String> {
        self.cart.checkout(&self.api).await?;

        if let Err(err) = self.cargar_productos().await {
            log::warn!("⚠️ No se pudo recargar el catálogo tras la venta: {}", err);
        }
        Ok("Venta registrada exitosamente".to_string())
    }
}
