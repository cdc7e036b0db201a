// ============================================================================
// INVENTARIO VIEWMODEL - CRUD de productos
// ============================================================================

use crate::error::{AppError, AppResult};
use crate::models::{Producto, ProductoForm};
use crate::services::{ApiClient, HttpTransport};
use crate::utils::require_field;

pub struct InventarioViewModel<T> {
    api: ApiClient<T>,
    productos: Vec<Producto>,
    busqueda: String,
    error: Option<String>,
}

impl<T: HttpTransport> InventarioViewModel<T> {
    pub fn new(api: ApiClient<T>) -> Self {
        Self {
            api,
            productos: Vec::new(),
            busqueda: String::new(),
            error: None,
        }
    }

    pub fn productos(&self) -> &[Producto] {
        &self.productos
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_busqueda(&mut self, busqueda: &str) {
        self.busqueda = busqueda.to_string();
    }

    /// Productos cuyo nombre o descripción contienen la búsqueda (sin mayúsculas)
    pub fn filtrados(&self) -> Vec<&Producto> {
        let needle = self.busqueda.trim().to_lowercase();
        self.productos
            .iter()
            .filter(|p| {
                needle.is_empty()
                    || p.nombre.to_lowercase().contains(&needle)
                    || p.descripcion.to_lowercase().contains(&needle)
            })
            .collect()
    }

    pub async fn cargar(&mut self) -> AppResult<()> {
        match self.api.get_productos().await {
            Ok(productos) => {
                self.productos = productos;
                self.error = None;
                Ok(())
            }
            Err(err) => {
                log::error!("❌ Error cargando productos: {}", err);
                self.error = Some("Error al cargar productos".to_string());
                Err(err)
            }
        }
    }

    /// Crea (`editando = None`) o actualiza un producto y recarga la lista
    pub async fn guardar(&mut self, editando: Option<i64>, form: &ProductoForm) -> AppResult<()> {
        if let Err(err) = validar_producto(form) {
            self.error = Some(err.to_string());
            return Err(err);
        }

        let result = match editando {
            Some(id) => self.api.update_producto(id, form).await,
            None => self.api.create_producto(form).await,
        };
        if let Err(err) = result {
            let err = err.into_conflict("Error al guardar producto");
            self.error = Some(err.to_string());
            return Err(err);
        }

        self.error = None;
        self.cargar().await
    }

    /// Elimina un producto; si el backend lo impide (p.ej. tiene ventas) se
    /// muestra su mensaje y la lista no cambia.
    pub async fn eliminar(&mut self, id: i64) -> AppResult<()> {
        if let Err(err) = self.api.delete_producto(id).await {
            let err = err.into_conflict("Error al eliminar");
            self.error = Some(err.to_string());
            return Err(err);
        }
        self.cargar().await
    }
}

fn validar_producto(form: &ProductoForm) -> AppResult<()> {
    require_field(&form.nombre, "nombre")?;
    if !form.precio.is_finite() || form.precio < 0.0 {
        return Err(AppError::Validation("El precio no puede ser negativo".to_string()));
    }
    if form.stock < 0 {
        return Err(AppError::Validation("El stock no puede ser negativo".to_string()));
    }
    Ok(())
}
