//! Quotas, credits, billing packages and payments.

use anyhow::Result;
use std::sync::Arc;
use uuid::Uuid;
use voice_admin::error::RepositoryError;
use voice_admin::repositories::{
    AgentRepository, BillingPackageRepository, NewPayment, NewUser, OrganizationRepository,
    PaymentRepository, UserRepository,
};

#[path = "test_utils/mod.rs"]
mod test_utils;
use test_utils::{
    create_test_agent, create_test_organization_on, create_test_package, new_agent,
    setup_test_db_arc,
};

fn new_user(email: &str) -> NewUser {
    NewUser {
        email: email.to_string(),
        name: None,
        role: "member".to_string(),
        is_admin: false,
    }
}

#[tokio::test]
async fn agent_quota_is_enforced() -> Result<()> {
    let db = setup_test_db_arc().await?;
    let package = create_test_package(&db, 2, 5, 100).await?;
    let org = create_test_organization_on(&db, Some(package.id)).await?;

    create_test_agent(&db, org.id, "One").await?;
    create_test_agent(&db, org.id, "Two").await?;
    let third = AgentRepository::new(Arc::clone(&db), true)
        .create(org.id, new_agent("Three"))
        .await;

    assert!(matches!(
        third,
        Err(RepositoryError::QuotaExceeded {
            resource: "agents",
            limit: 2
        })
    ));
    Ok(())
}

#[tokio::test]
async fn organization_without_package_gets_default_quota() -> Result<()> {
    let db = setup_test_db_arc().await?;
    let org = create_test_organization_on(&db, None).await?;

    assert_eq!(org.max_agents, 1);
    assert_eq!(org.max_users, 1);
    assert_eq!(org.monthly_credits, 0);

    let users = UserRepository::new(Arc::clone(&db), true);
    users.create(org.id, new_user("Owner@Example.com")).await?;
    let second = users.create(org.id, new_user("second@example.com")).await;

    assert!(matches!(
        second,
        Err(RepositoryError::QuotaExceeded { resource: "users", .. })
    ));
    let stored = users.list(org.id).await?;
    assert_eq!(stored[0].email, "owner@example.com");
    Ok(())
}

#[tokio::test]
async fn user_in_missing_organization_is_not_found() -> Result<()> {
    let db = setup_test_db_arc().await?;

    let result = UserRepository::new(Arc::clone(&db), true)
        .create(Uuid::new_v4(), new_user("ghost@example.com"))
        .await;

    assert!(matches!(result, Err(RepositoryError::NotFound(_))));
    Ok(())
}

#[tokio::test]
async fn credits_never_exceed_monthly_allowance() -> Result<()> {
    let db = setup_test_db_arc().await?;
    let package = create_test_package(&db, 1, 1, 100).await?;
    let org = create_test_organization_on(&db, Some(package.id)).await?;
    let repo = OrganizationRepository::new(Arc::clone(&db));

    assert!(repo.consume_credits(org.id, 60).await?);
    assert!(!repo.consume_credits(org.id, 50).await?);
    assert!(repo.consume_credits(org.id, 40).await?);
    assert!(!repo.consume_credits(org.id, 1).await?);

    let stored = repo.find(org.id).await?.expect("organization exists");
    assert_eq!(stored.used_credits, 100);
    assert_eq!(stored.remaining_credits(), 0);

    repo.reset_credits(org.id).await?;
    let stored = repo.find(org.id).await?.expect("organization exists");
    assert_eq!(stored.used_credits, 0);
    Ok(())
}

#[tokio::test]
async fn non_positive_charge_is_rejected() -> Result<()> {
    let db = setup_test_db_arc().await?;
    let org = create_test_organization_on(&db, None).await?;

    let result = OrganizationRepository::new(Arc::clone(&db))
        .consume_credits(org.id, 0)
        .await;

    assert!(matches!(result, Err(RepositoryError::Validation(_))));
    Ok(())
}

#[tokio::test]
async fn assigning_package_copies_quotas() -> Result<()> {
    let db = setup_test_db_arc().await?;
    let org = create_test_organization_on(&db, None).await?;
    let package = create_test_package(&db, 7, 3, 2_500).await?;
    let repo = OrganizationRepository::new(Arc::clone(&db));

    let updated = repo.assign_billing_package(org.id, package.id).await?;

    assert_eq!(updated.billing_package_id, Some(package.id));
    assert_eq!(updated.max_agents, 7);
    assert_eq!(updated.max_users, 3);
    assert_eq!(updated.monthly_credits, 2_500);

    let missing = repo.assign_billing_package(Uuid::new_v4(), package.id).await;
    assert!(matches!(missing, Err(RepositoryError::NotFound(_))));
    Ok(())
}

#[tokio::test]
async fn active_packages_are_listed_cheapest_first() -> Result<()> {
    let db = setup_test_db_arc().await?;
    let repo = BillingPackageRepository::new(Arc::clone(&db));
    voice_admin::seeds::seed_billing_packages(&db).await?;
    voice_admin::seeds::seed_billing_packages(&db).await?;

    let packages = repo.list_active().await?;
    let names: Vec<&str> = packages.iter().map(|p| p.name.as_str()).collect();

    assert_eq!(names, vec!["Starter", "Growth", "Scale"]);
    Ok(())
}

#[tokio::test]
async fn payments_are_scoped_to_their_organization() -> Result<()> {
    let db = setup_test_db_arc().await?;
    let org_a = create_test_organization_on(&db, None).await?;
    let org_b = create_test_organization_on(&db, None).await?;
    let repo = PaymentRepository::new(Arc::clone(&db), true);

    let payment = repo
        .record(
            org_a.id,
            NewPayment {
                billing_package_id: None,
                amount_cents: 4_900,
                currency: "USD".to_string(),
                external_reference: Some("pi_123".to_string()),
            },
        )
        .await?;

    assert_eq!(payment.currency, "usd");
    assert_eq!(repo.list(org_a.id).await?.len(), 1);
    assert!(repo.list(org_b.id).await?.is_empty());
    assert!(repo.find(payment.id, org_b.id).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn payment_for_unknown_package_is_not_found() -> Result<()> {
    let db = setup_test_db_arc().await?;
    let org = create_test_organization_on(&db, None).await?;
    let repo = PaymentRepository::new(Arc::clone(&db), true);

    let result = repo
        .record(
            org.id,
            NewPayment {
                billing_package_id: Some(Uuid::new_v4()),
                amount_cents: 4_900,
                currency: "usd".to_string(),
                external_reference: None,
            },
        )
        .await;

    assert!(matches!(result, Err(RepositoryError::NotFound(_))));
    assert!(repo.list(org.id).await?.is_empty());
    Ok(())
}
