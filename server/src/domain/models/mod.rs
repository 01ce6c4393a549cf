pub mod abono;
pub mod catalog;
pub mod matricula_pago;
pub mod plan_pago;

pub use abono::{Abono, MetodoPago, NewAbono};
pub use catalog::{Impuesto, Moneda};
pub use matricula_pago::{EstadoPago, MatriculaPago, NewMatriculaPago};
pub use plan_pago::{PeriodicidadUnidad, PlanPago, PlanState, TipoPago};
