use serde::{Deserialize, Serialize};

/// Línea del payload de `/ventas`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VentaItem {
    pub id_producto: i64,
    pub cantidad: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VentaRequest {
    pub productos: Vec<VentaItem>,
}
