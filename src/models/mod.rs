pub mod auth;
pub mod producto;
pub mod empleado;
pub mod venta;
pub mod reporte;

pub use auth::{LoginRequest, LoginResponse, RegisterRequest, Role, VerifyCodeRequest, VerifyCodeResponse};
pub use producto::{Producto, ProductoForm, StockLevel};
pub use empleado::{Empleado, EmpleadoForm, ResumenEmpleados};
pub use venta::{VentaItem, VentaRequest};
pub use reporte::{FiltroVentas, ReporteVenta, UsuarioReporte};

// ============================================================================
// Helpers de serde: el backend mezcla números y cadenas (columnas numeric
// de Postgres llegan como "10.00", ids a veces como texto)
// ============================================================================

pub(crate) mod lenient {
    use serde::{de, Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(serde_json::Number),
        Text(String),
    }

    fn number_to_f64<E: de::Error>(n: serde_json::Number) -> Result<f64, E> {
        n.as_f64()
            .filter(|v| v.is_finite())
            .ok_or_else(|| E::custom("número fuera de rango"))
    }

    // "NaN" e "inf" parsean como f64 pero no son montos ni cantidades
    fn text_to_f64<E: de::Error>(s: &str) -> Result<f64, E> {
        s.trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| E::custom(format!("valor numérico inválido: {:?}", s)))
    }

    pub fn f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match NumberOrString::deserialize(deserializer)? {
            NumberOrString::Number(n) => number_to_f64(n),
            NumberOrString::Text(s) => text_to_f64(&s),
        }
    }

    pub fn option_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        match Option::<NumberOrString>::deserialize(deserializer)? {
            None => Ok(None),
            Some(NumberOrString::Number(n)) => number_to_f64(n).map(Some),
            Some(NumberOrString::Text(s)) if s.trim().is_empty() => Ok(None),
            Some(NumberOrString::Text(s)) => text_to_f64(&s).map(Some),
        }
    }

    pub fn u32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        let value = f64(deserializer)?;
        // Stock negativo en el servidor se trata como agotado
        if value <= 0.0 {
            return Ok(0);
        }
        Ok(value.trunc().min(u32::MAX as f64) as u32)
    }

    /// Identificador como texto, venga como número o como cadena
    pub fn string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        match NumberOrString::deserialize(deserializer)? {
            NumberOrString::Number(n) => Ok(n.to_string()),
            NumberOrString::Text(s) => Ok(s),
        }
    }

    pub fn option_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        Ok(Option::<NumberOrString>::deserialize(deserializer)?.map(|v| match v {
            NumberOrString::Number(n) => n.to_string(),
            NumberOrString::Text(s) => s,
        }))
    }
}
