use serde::{Deserialize, Serialize};

use super::lenient;
use crate::config::CONFIG;

/// Producto del catálogo (propiedad del backend)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Producto {
    pub id: i64,
    pub nombre: String,
    #[serde(default)]
    pub descripcion: String,
    #[serde(deserialize_with = "lenient::f64")]
    pub precio: f64,
    #[serde(deserialize_with = "lenient::u32")]
    pub stock: u32,
    #[serde(default)]
    pub codigo: Option<String>,
}

/// Nivel de stock mostrado en la tabla de inventario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StockLevel {
    Agotado,
    Bajo,
    Disponible,
}

impl Producto {
    pub fn stock_level(&self) -> StockLevel {
        match self.stock {
            0 => StockLevel::Agotado,
            s if s < CONFIG.low_stock_threshold => StockLevel::Bajo,
            _ => StockLevel::Disponible,
        }
    }

    pub fn is_agotado(&self) -> bool {
        self.stock == 0
    }
}

/// Formulario de alta/edición de producto
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ProductoForm {
    pub nombre: String,
    pub descripcion: String,
    pub precio: f64,
    pub stock: i64,
}

impl From<&Producto> for ProductoForm {
    fn from(producto: &Producto) -> Self {
        Self {
            nombre: producto.nombre.clone(),
            descripcion: producto.descripcion.clone(),
            precio: producto.precio,
            stock: i64::from(producto.stock),
        }
    }
}
