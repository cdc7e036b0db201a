// ============================================================================
// CART STATE - Carrito del punto de venta
// ============================================================================
// Invariante: 1 <= cantidad <= stock en cada línea. Una línea que llega a 0
// se elimina. El orden de inserción se conserva hasta el checkout.
// ============================================================================

use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::models::{Producto, VentaItem, VentaRequest};
use crate::services::{ApiClient, HttpTransport};

/// Producto + cantidad dentro del carrito
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineItem {
    pub product_id: i64,
    pub nombre: String,
    pub precio: f64,
    /// Stock del producto cuando se agregó (o se volvió a agregar)
    pub stock: u32,
    pub cantidad: u32,
}

impl LineItem {
    pub fn subtotal(&self) -> f64 {
        self.precio * f64::from(self.cantidad)
    }

    pub fn at_ceiling(&self) -> bool {
        self.cantidad >= self.stock
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn item(&self, product_id: i64) -> Option<&LineItem> {
        self.items.iter().find(|i| i.product_id == product_id)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Agrega una unidad. En el tope de stock no hace nada (sin error).
    pub fn add_item(&mut self, producto: &Producto) {
        if let Some(index) = self.position(producto.id) {
            let item = &mut self.items[index];
            item.stock = producto.stock;
            if item.cantidad < item.stock {
                item.cantidad += 1;
            } else if item.cantidad > item.stock {
                // El stock bajó desde que se agregó
                item.cantidad = item.stock;
            }
            if item.cantidad == 0 {
                self.items.remove(index);
            }
            return;
        }

        if producto.stock == 0 {
            log::warn!("⚠️ {} sin stock, no se agrega al carrito", producto.nombre);
            return;
        }

        self.items.push(LineItem {
            product_id: producto.id,
            nombre: producto.nombre.clone(),
            precio: producto.precio,
            stock: producto.stock,
            cantidad: 1,
        });
    }

    /// `n <= 0` elimina la línea; `n > stock` se ajusta al stock.
    pub fn set_quantity(&mut self, product_id: i64, n: i64) {
        let Some(index) = self.position(product_id) else {
            return;
        };
        if n <= 0 {
            self.items.remove(index);
            return;
        }

        let item = &mut self.items[index];
        let requested = u32::try_from(n).unwrap_or(u32::MAX);
        item.cantidad = requested.min(item.stock);
        if item.cantidad == 0 {
            self.items.remove(index);
        }
    }

    pub fn remove_item(&mut self, product_id: i64) {
        self.items.retain(|i| i.product_id != product_id);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn total(&self) -> f64 {
        self.items.iter().map(LineItem::subtotal).sum()
    }

    pub fn total_unidades(&self) -> u32 {
        self.items.iter().map(|i| i.cantidad).sum()
    }

    /// Payload de `/ventas` en orden de inserción
    pub fn checkout_payload(&self) -> VentaRequest {
        VentaRequest {
            productos: self
                .items
                .iter()
                .map(|i| VentaItem {
                    id_producto: i.product_id,
                    cantidad: i.cantidad,
                })
                .collect(),
        }
    }

    /// Registra la venta. Si el servidor la rechaza, el carrito queda intacto
    /// para que el usuario ajuste cantidades y reintente.
    pub async fn checkout<T: HttpTransport>(&mut self, api: &ApiClient<T>) -> AppResult<()> {
        if self.items.is_empty() {
            return Err(AppError::Validation("El carrito está vacío".to_string()));
        }

        let payload = self.checkout_payload();
        match api.create_venta(&payload).await {
            Ok(()) => {
                log::info!("✅ Venta registrada: {} unidades, total {:.2}", self.total_unidades(), self.total());
                self.clear();
                Ok(())
            }
            Err(err) => {
                log::error!("❌ Error al registrar venta: {}", err);
                Err(err.into_conflict("Error al registrar venta"))
            }
        }
    }

    fn position(&self, product_id: i64) -> Option<usize> {
        self.items.iter().position(|i| i.product_id == product_id)
    }
}
