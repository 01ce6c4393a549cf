//! Wire types exchanged between the billing server and its clients.
//!
//! Monetary amounts always travel as decimal strings with two fraction
//! digits (`"113.00"`); the server parses them into integer minor units.
//! Field names are camelCase to match the admin console.

use serde::{Deserialize, Serialize};

/// How a payment plan is billed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TipoPago {
    /// Single payment
    Unico,
    /// Repeats every `periodicidadValor` × `periodicidadUnidad`
    Recurrente,
    /// Fixed number of installments
    Cuotas,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PeriodicidadUnidad {
    Dias,
    Semanas,
    Meses,
    Anios,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EstadoPago {
    Pendiente,
    Pagado,
    Vencido,
    Anulado,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MetodoPago {
    Efectivo,
    Tarjeta,
    Transferencia,
    Deposito,
    Cheque,
    Otro,
}

/// Field the user touched last in the plan editor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CampoEditado {
    Subtotal,
    Total,
    SubtotalFinal,
    TotalFinal,
    NumeroCuotas,
    Impuesto,
    TipoPago,
}

/// A persisted payment plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanPago {
    pub id: i64,
    pub nombre: String,
    pub descripcion: Option<String>,
    pub tipo_pago: TipoPago,
    pub subtotal: String,
    pub total: String,
    pub periodicidad_valor: Option<u32>,
    pub periodicidad_unidad: Option<PeriodicidadUnidad>,
    pub numero_cuotas: Option<u32>,
    pub subtotal_final: Option<String>,
    pub total_final: Option<String>,
    pub id_impuesto: Option<i64>,
    pub id_moneda: Option<i64>,
    pub activo: bool,
    /// RFC 3339
    pub created_at: String,
    /// RFC 3339
    pub updated_at: String,
}

/// Body of `POST /planes-pago` and `PUT /planes-pago/{id}`.
///
/// Derived amounts sent by the client are advisory; the server recomputes
/// them from `subtotal` (or `total` when no subtotal is given).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanPagoRequest {
    #[serde(default)]
    pub nombre: String,
    #[serde(default)]
    pub descripcion: Option<String>,
    pub tipo_pago: Option<TipoPago>,
    #[serde(default)]
    pub subtotal: Option<String>,
    #[serde(default)]
    pub total: Option<String>,
    #[serde(default)]
    pub periodicidad_valor: Option<u32>,
    #[serde(default)]
    pub periodicidad_unidad: Option<PeriodicidadUnidad>,
    #[serde(default)]
    pub numero_cuotas: Option<u32>,
    #[serde(default)]
    pub subtotal_final: Option<String>,
    #[serde(default)]
    pub total_final: Option<String>,
    #[serde(default)]
    pub id_impuesto: Option<i64>,
    #[serde(default)]
    pub id_moneda: Option<i64>,
    #[serde(default)]
    pub activo: Option<bool>,
}

/// Body of `POST /planes-pago/derivar`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivarPlanRequest {
    #[serde(flatten)]
    pub plan: PlanPagoRequest,
    pub campo_editado: CampoEditado,
}

/// Recomputed amounts for the plan editor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanPagoCalculo {
    pub tipo_pago: TipoPago,
    pub tasa_impuesto: String,
    pub subtotal: String,
    pub total: String,
    pub numero_cuotas: Option<u32>,
    pub subtotal_final: Option<String>,
    pub total_final: Option<String>,
}

/// One billable installment generated from a plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatriculaPago {
    pub id: i64,
    pub matricula_id: i64,
    pub plan_pago_id: i64,
    pub numero_pago: u32,
    pub subtotal: String,
    pub total: String,
    /// `YYYY-MM-DD`
    pub fecha_vencimiento: String,
    pub estado: EstadoPago,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerarPagosRequest {
    pub plan_pago_id: i64,
    /// `YYYY-MM-DD`, due date of the first invoice
    pub fecha_inicio: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatriculaPagoListResponse {
    pub pagos: Vec<MatriculaPago>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarcarVencidosRequest {
    /// `YYYY-MM-DD`; invoices due strictly before this date become VENCIDO
    pub fecha_corte: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarcarVencidosResponse {
    pub actualizados: Vec<i64>,
}

/// A partial payment recorded against an invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Abono {
    pub id: i64,
    pub matricula_pago_id: i64,
    pub monto: String,
    pub metodo_pago: MetodoPago,
    /// RFC 3339
    pub fecha_abono: String,
    pub referencia: Option<String>,
    pub nota: Option<String>,
    pub usuario_id: i64,
}

/// Body of `POST /matriculas-pagos-abonos`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAbonoRequest {
    pub matricula_pago_id: i64,
    pub monto: String,
    pub metodo_pago: MetodoPago,
    #[serde(default)]
    pub referencia: Option<String>,
    #[serde(default)]
    pub nota: Option<String>,
}

/// Running balance of an invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumenAbonos {
    pub matricula_pago_id: i64,
    pub estado: EstadoPago,
    pub total_pago: String,
    pub total_abonado: String,
    pub saldo_pendiente: String,
    /// Oldest first
    pub abonos: Vec<Abono>,
}

/// Data needed to reprint the receipt of a past abono
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReciboAbono {
    pub abono: Abono,
    pub total_pago: String,
    /// Balance right before this abono
    pub saldo_anterior: String,
    /// Balance right after this abono
    pub saldo_pendiente: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Impuesto {
    pub id: i64,
    pub nombre: String,
    /// Percentage as a decimal string, e.g. `"13"` for 13 %
    pub porcentaje: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Moneda {
    pub id: i64,
    pub codigo: String,
    pub simbolo: String,
    pub nombre: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Stable machine-readable code, e.g. `BalanceExceeded`
    pub error: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_abono_request_uses_camel_case() {
        let json = r#"{"matriculaPagoId":7,"monto":"50.00","metodoPago":"EFECTIVO"}"#;
        let request: CreateAbonoRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.matricula_pago_id, 7);
        assert_eq!(request.monto, "50.00");
        assert_eq!(request.metodo_pago, MetodoPago::Efectivo);
        assert!(request.referencia.is_none());
    }

    #[test]
    fn derivar_request_flattens_plan_fields() {
        let json = r#"{
            "nombre": "Mensualidad",
            "tipoPago": "CUOTAS",
            "subtotal": "100.00",
            "numeroCuotas": 3,
            "idImpuesto": 1,
            "campoEditado": "SUBTOTAL"
        }"#;
        let request: DerivarPlanRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.campo_editado, CampoEditado::Subtotal);
        assert_eq!(request.plan.tipo_pago, Some(TipoPago::Cuotas));
        assert_eq!(request.plan.numero_cuotas, Some(3));
        assert_eq!(request.plan.total, None);
    }

    #[test]
    fn estado_serializes_screaming_snake() {
        let json = serde_json::to_string(&EstadoPago::Pendiente).unwrap();
        assert_eq!(json, "\"PENDIENTE\"");
    }
}
