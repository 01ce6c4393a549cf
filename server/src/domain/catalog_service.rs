//! Lookups against the impuestos and monedas catalogs.

use log::warn;
use rust_decimal::Decimal;
use std::sync::Arc;

use crate::domain::errors::{BillingError, BillingResult};
use crate::domain::models::{Impuesto, Moneda};
use crate::storage::traits::CatalogStorage;

#[derive(Clone)]
pub struct CatalogService {
    storage: Arc<dyn CatalogStorage>,
}

impl CatalogService {
    pub fn new(storage: Arc<dyn CatalogStorage>) -> Self {
        Self { storage }
    }

    pub async fn list_impuestos(&self) -> BillingResult<Vec<Impuesto>> {
        Ok(self.storage.list_impuestos().await?)
    }

    pub async fn list_monedas(&self) -> BillingResult<Vec<Moneda>> {
        Ok(self.storage.list_monedas().await?)
    }

    /// Rate for `id_impuesto` as a fraction. A plan with no impuesto yet is
    /// derived at rate zero.
    pub async fn tax_rate(&self, id_impuesto: Option<i64>) -> BillingResult<Decimal> {
        let Some(id) = id_impuesto else {
            return Ok(Decimal::ZERO);
        };
        let impuesto = self
            .storage
            .get_impuesto(id)
            .await?
            .ok_or_else(|| BillingError::not_found("impuesto", id))?;
        impuesto.tasa().map_err(|e| {
            warn!("Impuesto {} has an unusable porcentaje '{}'", id, impuesto.porcentaje);
            e.into()
        })
    }

    /// Fails with NotFound when the currency does not exist
    pub async fn ensure_moneda(&self, id_moneda: i64) -> BillingResult<()> {
        match self.storage.get_moneda(id_moneda).await? {
            Some(_) => Ok(()),
            None => Err(BillingError::not_found("moneda", id_moneda)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;

    struct FixedCatalog;

    #[async_trait]
    impl CatalogStorage for FixedCatalog {
        async fn list_impuestos(&self) -> Result<Vec<Impuesto>> {
            Ok(vec![Impuesto {
                id: 1,
                nombre: "IVA".to_string(),
                porcentaje: "13".to_string(),
            }])
        }

        async fn get_impuesto(&self, id: i64) -> Result<Option<Impuesto>> {
            Ok(self.list_impuestos().await?.into_iter().find(|i| i.id == id))
        }

        async fn list_monedas(&self) -> Result<Vec<Moneda>> {
            Ok(vec![])
        }

        async fn get_moneda(&self, _id: i64) -> Result<Option<Moneda>> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn test_tax_rate_lookup() {
        let service = CatalogService::new(Arc::new(FixedCatalog));

        assert_eq!(service.tax_rate(None).await.unwrap(), Decimal::ZERO);
        assert_eq!(service.tax_rate(Some(1)).await.unwrap(), Decimal::new(13, 2));
        assert!(matches!(
            service.tax_rate(Some(9)).await,
            Err(BillingError::NotFound { entity: "impuesto", id: 9 })
        ));
        assert!(matches!(
            service.ensure_moneda(1).await,
            Err(BillingError::NotFound { entity: "moneda", .. })
        ));
    }
}
