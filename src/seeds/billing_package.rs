//! Billing package seeding
//!
//! Ensures the default package catalog exists so freshly provisioned
//! organizations have something to be assigned to.

use anyhow::Result;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::repositories::{BillingPackageRepository, NewBillingPackage};

/// Creates the default billing packages that are missing, matched by name.
pub async fn seed_billing_packages(db: &DatabaseConnection) -> Result<()> {
    let repo = BillingPackageRepository::new(Arc::new(db.clone()));

    for package in default_packages() {
        match repo.find_by_name(&package.name).await {
            Ok(Some(_)) => {
                log::info!("Billing package '{}' already exists, skipping", package.name);
            }
            Ok(None) => {
                log::info!("Creating billing package: {}", package.name);
                let name = package.name.clone();
                if let Err(e) = repo.create(package).await {
                    log::error!("Failed to create billing package '{}': {}", name, e);
                    return Err(e.into());
                }
            }
            Err(e) => {
                log::error!(
                    "Error checking if billing package '{}' exists: {}",
                    package.name,
                    e
                );
                return Err(e.into());
            }
        }
    }

    log::info!("Billing package seeding completed successfully");
    Ok(())
}

fn default_packages() -> Vec<NewBillingPackage> {
    vec![
        NewBillingPackage {
            name: "Starter".to_string(),
            price_cents: 4_900,
            monthly_credits: 1_000,
            max_agents: 1,
            max_users: 2,
        },
        NewBillingPackage {
            name: "Growth".to_string(),
            price_cents: 19_900,
            monthly_credits: 5_000,
            max_agents: 5,
            max_users: 10,
        },
        NewBillingPackage {
            name: "Scale".to_string(),
            price_cents: 79_900,
            monthly_credits: 25_000,
            max_agents: 25,
            max_users: 50,
        },
    ]
}
