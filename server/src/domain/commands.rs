//! Domain-level command types.
//! These are built by the REST layer from the DTOs in the `shared` crate and
//! never leave the server.

pub mod planes {
    use crate::domain::models::PlanState;

    /// Create or replace a plan. Derived amounts in `state` are recomputed
    /// before anything is stored.
    #[derive(Debug, Clone)]
    pub struct SavePlanCommand {
        pub state: PlanState,
    }
}

pub mod pagos {
    use chrono::NaiveDate;

    /// Generate invoices for an enrollment from a plan.
    #[derive(Debug, Clone)]
    pub struct GenerarPagosCommand {
        pub matricula_id: i64,
        pub plan_pago_id: i64,
        pub fecha_inicio: NaiveDate,
    }
}

pub mod abonos {
    use crate::domain::models::MetodoPago;
    use crate::domain::money::Money;

    /// Record a partial payment against an invoice.
    #[derive(Debug, Clone)]
    pub struct ApplyAbonoCommand {
        pub matricula_pago_id: i64,
        pub monto: Money,
        pub metodo_pago: MetodoPago,
        pub referencia: Option<String>,
        pub nota: Option<String>,
        /// Staff member recording the payment
        pub usuario_id: i64,
    }
}
