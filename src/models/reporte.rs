use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::lenient;
use crate::error::{AppError, AppResult};

/// Fila de `/reportes/ventas-filtradas`. Los nombres de columna varían
/// según la consulta del backend, de ahí los campos alternativos.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ReporteVenta {
    #[serde(default)]
    pub nombre: Option<String>,
    #[serde(default)]
    pub producto: Option<String>,
    #[serde(default, deserialize_with = "lenient::option_f64")]
    pub cantidad_vendida: Option<f64>,
    #[serde(default, deserialize_with = "lenient::option_f64")]
    pub cantidad: Option<f64>,
    #[serde(default, deserialize_with = "lenient::option_f64")]
    pub total_vendido: Option<f64>,
}

impl ReporteVenta {
    pub fn etiqueta(&self) -> &str {
        self.nombre
            .as_deref()
            .filter(|n| !n.is_empty())
            .or(self.producto.as_deref().filter(|p| !p.is_empty()))
            .unwrap_or("Sin nombre")
    }

    pub fn unidades(&self) -> f64 {
        self.cantidad_vendida.or(self.cantidad).unwrap_or(0.0)
    }

    pub fn total(&self) -> f64 {
        self.total_vendido.unwrap_or(0.0)
    }
}

/// Usuario seleccionable en el filtro del dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsuarioReporte {
    #[serde(deserialize_with = "lenient::string")]
    pub id: String,
    pub nombre: String,
}

/// Filtro de ventas: rango de fechas y usuario. Vacío = sin filtro.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FiltroVentas {
    pub fecha_inicio: Option<NaiveDate>,
    pub fecha_fin: Option<NaiveDate>,
    pub id_usuario: Option<String>,
}

const DATE_FORMAT: &str = "%Y-%m-%d";

fn parse_fecha(value: &str, campo: &str) -> AppResult<Option<NaiveDate>> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map(Some)
        .map_err(|_| AppError::Validation(format!("Fecha inválida en {}: {}", campo, value)))
}

impl FiltroVentas {
    /// Construye el filtro desde los valores crudos de los inputs (`YYYY-MM-DD`)
    pub fn from_inputs(fecha_inicio: &str, fecha_fin: &str, id_usuario: &str) -> AppResult<Self> {
        let filtro = Self {
            fecha_inicio: parse_fecha(fecha_inicio, "Desde")?,
            fecha_fin: parse_fecha(fecha_fin, "Hasta")?,
            id_usuario: Some(id_usuario.trim().to_string()).filter(|id| !id.is_empty()),
        };
        filtro.validate()?;
        Ok(filtro)
    }

    pub fn validate(&self) -> AppResult<()> {
        if let (Some(inicio), Some(fin)) = (self.fecha_inicio, self.fecha_fin) {
            if inicio > fin {
                return Err(AppError::Validation(
                    "La fecha de inicio no puede ser posterior a la fecha fin".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Query string con las tres claves siempre presentes (vacías si no hay filtro).
    /// Los valores van percent-encoded.
    pub fn to_query(&self) -> String {
        let fecha = |f: Option<NaiveDate>| f.map(|d| d.format(DATE_FORMAT).to_string()).unwrap_or_default();
        let params = [
            ("fechaInicio", fecha(self.fecha_inicio)),
            ("fechaFin", fecha(self.fecha_fin)),
            ("id_usuario", self.id_usuario.clone().unwrap_or_default()),
        ];
        params
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reporte_fallbacks() {
        let json = r#"{"producto":"Widget","cantidad":"4","total_vendido":"40.50"}"#;
        let reporte: ReporteVenta = serde_json::from_str(json).unwrap();
        assert_eq!(reporte.etiqueta(), "Widget");
        assert_eq!(reporte.unidades(), 4.0);
        assert_eq!(reporte.total(), 40.5);

        let vacio = ReporteVenta::default();
        assert_eq!(vacio.etiqueta(), "Sin nombre");
        assert_eq!(vacio.unidades(), 0.0);
    }

    #[test]
    fn empty_filter_keeps_all_keys() {
        assert_eq!(FiltroVentas::default().to_query(), "fechaInicio=&fechaFin=&id_usuario=");
    }

    #[test]
    fn filter_from_inputs() {
        let filtro = FiltroVentas::from_inputs("2024-01-01", "2024-01-31", "3").unwrap();
        assert_eq!(filtro.to_query(), "fechaInicio=2024-01-01&fechaFin=2024-01-31&id_usuario=3");
    }

    #[test]
    fn filter_values_are_percent_encoded() {
        let filtro = FiltroVentas {
            id_usuario: Some("ana maría&x=1".into()),
            ..FiltroVentas::default()
        };
        assert_eq!(
            filtro.to_query(),
            "fechaInicio=&fechaFin=&id_usuario=ana%20mar%C3%ADa%26x%3D1"
        );
    }

    #[test]
    fn filter_rejects_inverted_range_and_bad_dates() {
        assert!(matches!(
            FiltroVentas::from_inputs("2024-02-01", "2024-01-01", ""),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            FiltroVentas::from_inputs("01/02/2024", "", ""),
            Err(AppError::Validation(_))
        ));
    }
}
