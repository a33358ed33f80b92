//! Payment repository
//!
//! Append-only record of payment outcomes reported by the billing gateway.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::organization::require_organization;
use super::scoped::ScopedRepository;
use crate::error::RepositoryError;
use crate::models::billing_package::Entity as BillingPackage;
use crate::models::payment::{self, Entity as Payment};

pub type PaymentRepository = ScopedRepository<Payment>;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewPayment {
    #[serde(default)]
    pub billing_package_id: Option<Uuid>,
    pub amount_cents: i64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub external_reference: Option<String>,
}

fn default_currency() -> String {
    "usd".to_string()
}

impl PaymentRepository {
    pub async fn record(
        &self,
        organization_id: Uuid,
        input: NewPayment,
    ) -> Result<payment::Model, RepositoryError> {
        if input.amount_cents <= 0 {
            return Err(RepositoryError::validation_error(
                "amount_cents must be positive",
            ));
        }
        let currency = input.currency.trim().to_ascii_lowercase();
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(RepositoryError::validation_error(
                "currency must be a three-letter ISO code",
            ));
        }

        require_organization(self.db.as_ref(), organization_id).await?;
        if let Some(package_id) = input.billing_package_id {
            BillingPackage::find_by_id(package_id)
                .one(self.db.as_ref())
                .await?
                .ok_or_else(|| {
                    RepositoryError::not_found(format!(
                        "Billing package '{}' not found",
                        package_id
                    ))
                })?;
        }

        let payment = payment::ActiveModel {
            id: Set(Uuid::new_v4()),
            organization_id: Set(organization_id),
            billing_package_id: Set(input.billing_package_id),
            amount_cents: Set(input.amount_cents),
            currency: Set(currency),
            external_reference: Set(input.external_reference),
            created_at: Set(Utc::now().into()),
        };
        let payment = payment.insert(self.db.as_ref()).await?;

        tracing::info!(
            organization_id = %organization_id,
            payment_id = %payment.id,
            amount_cents = payment.amount_cents,
            "Recorded payment"
        );
        Ok(payment)
    }
}
