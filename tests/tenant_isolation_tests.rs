//! Tests ensuring reads, updates and listings never cross organizations.

use anyhow::Result;
use sea_orm::Set;
use std::sync::Arc;
use uuid::Uuid;
use voice_admin::models::{ApprovalStatus, integration};
use voice_admin::repositories::{
    AgentChanges, AgentRepository, IntegrationRepository, NewIntegration, NewRagConfiguration,
    RagConfigurationRepository,
};

#[path = "test_utils/mod.rs"]
mod test_utils;
use test_utils::{create_test_agent, create_test_organization, setup_test_db_arc};

fn new_integration(name: &str) -> NewIntegration {
    NewIntegration {
        provider: "google_calendar".to_string(),
        name: name.to_string(),
        config: Some(serde_json::json!({ "calendar": "primary" })),
    }
}

#[tokio::test]
async fn foreign_find_returns_none() -> Result<()> {
    let db = setup_test_db_arc().await?;
    let org_a = create_test_organization(&db).await?;
    let org_b = create_test_organization(&db).await?;
    let agent = create_test_agent(&db, org_a, "Support").await?;
    let repo = AgentRepository::new(Arc::clone(&db), true);

    assert!(repo.find(agent.id, org_a).await?.is_some());
    assert!(repo.find(agent.id, org_b).await?.is_none());
    assert!(!repo.exists(agent.id, org_b).await?);
    Ok(())
}

#[tokio::test]
async fn foreign_update_changes_nothing() -> Result<()> {
    let db = setup_test_db_arc().await?;
    let org_a = create_test_organization(&db).await?;
    let org_b = create_test_organization(&db).await?;
    let agent = create_test_agent(&db, org_a, "Support").await?;
    let repo = AgentRepository::new(Arc::clone(&db), true);

    let changes = AgentChanges {
        name: Some("Hijacked".to_string()),
        ..Default::default()
    };
    assert!(repo.update(agent.id, org_b, changes).await?.is_none());

    let stored = repo.find(agent.id, org_a).await?.expect("agent still present");
    assert_eq!(stored.name, "Support");
    Ok(())
}

#[tokio::test]
async fn owner_update_applies_changes() -> Result<()> {
    let db = setup_test_db_arc().await?;
    let org = create_test_organization(&db).await?;
    let agent = create_test_agent(&db, org, "Support").await?;
    let repo = AgentRepository::new(Arc::clone(&db), true);

    let updated = repo
        .update(
            agent.id,
            org,
            AgentChanges {
                name: Some("Sales".to_string()),
                language: Some("de".to_string()),
                ..Default::default()
            },
        )
        .await?
        .expect("owner update returns the row");

    assert_eq!(updated.name, "Sales");
    assert_eq!(updated.language, "de");
    assert_eq!(updated.first_message, agent.first_message);
    Ok(())
}

#[tokio::test]
async fn generic_update_is_scoped() -> Result<()> {
    let db = setup_test_db_arc().await?;
    let org_a = create_test_organization(&db).await?;
    let org_b = create_test_organization(&db).await?;
    let repo = IntegrationRepository::new(Arc::clone(&db), true);
    let created = repo.create(org_a, new_integration("Calendar")).await?;

    let rename = || integration::ActiveModel {
        name: Set("Renamed".to_string()),
        ..Default::default()
    };

    assert!(repo.update(created.id, org_b, rename()).await?.is_none());
    assert_eq!(
        repo.find(created.id, org_a).await?.map(|i| i.name),
        Some("Calendar".to_string())
    );

    let renamed = repo.update(created.id, org_a, rename()).await?;
    assert_eq!(renamed.map(|i| i.name), Some("Renamed".to_string()));
    Ok(())
}

#[tokio::test]
async fn listing_never_returns_foreign_rows() -> Result<()> {
    let db = setup_test_db_arc().await?;
    let org_a = create_test_organization(&db).await?;
    let org_b = create_test_organization(&db).await?;
    let first = create_test_agent(&db, org_a, "First").await?;
    let second = create_test_agent(&db, org_a, "Second").await?;
    create_test_agent(&db, org_b, "Foreign").await?;
    let repo = AgentRepository::new(Arc::clone(&db), true);

    let agents = repo.list(org_a).await?;
    let ids: Vec<Uuid> = agents.iter().map(|a| a.id).collect();

    assert_eq!(agents.len(), 2);
    assert!(ids.contains(&first.id));
    assert!(ids.contains(&second.id));
    assert!(agents.iter().all(|a| a.organization_id == org_a));
    Ok(())
}

#[tokio::test]
async fn agent_pages_walk_all_rows_once() -> Result<()> {
    let db = setup_test_db_arc().await?;
    let org = create_test_organization(&db).await?;
    for i in 0..5 {
        create_test_agent(&db, org, &format!("Agent {}", i)).await?;
    }
    let repo = AgentRepository::new(Arc::clone(&db), true);

    let mut seen = Vec::new();
    let mut cursor: Option<String> = None;
    loop {
        let page = repo.list_page(org, cursor.as_deref(), 2).await?;
        assert!(page.items.len() <= 2);
        seen.extend(page.items.iter().map(|a| a.id));
        match page.next_cursor {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    let mut unique = seen.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(seen.len(), 5);
    assert_eq!(unique.len(), 5);
    Ok(())
}

#[tokio::test]
async fn garbage_cursor_is_rejected() -> Result<()> {
    let db = setup_test_db_arc().await?;
    let org = create_test_organization(&db).await?;
    let repo = AgentRepository::new(Arc::clone(&db), true);

    assert!(repo.list_page(org, Some("not a cursor!"), 10).await.is_err());
    Ok(())
}

#[tokio::test]
async fn approval_status_starts_pending() -> Result<()> {
    let db = setup_test_db_arc().await?;
    let org = create_test_organization(&db).await?;

    let integration = IntegrationRepository::new(Arc::clone(&db), true)
        .create(org, new_integration("Calendar"))
        .await?;
    let rag = RagConfigurationRepository::new(Arc::clone(&db), true)
        .create(
            org,
            NewRagConfiguration {
                name: "Handbook".to_string(),
                agent_id: None,
                embedding_model: "text-embedding-3-small".to_string(),
                chunk_size: 1000,
                chunk_overlap: 200,
                document_ids: vec!["doc-1".to_string()],
            },
        )
        .await?;

    assert_eq!(integration.status, ApprovalStatus::PendingApproval);
    assert_eq!(rag.status, ApprovalStatus::PendingApproval);
    assert_eq!(rag.documents(), vec!["doc-1".to_string()]);
    Ok(())
}

#[tokio::test]
async fn admin_transition_and_status_listing() -> Result<()> {
    let db = setup_test_db_arc().await?;
    let org_a = create_test_organization(&db).await?;
    let org_b = create_test_organization(&db).await?;
    let repo = IntegrationRepository::new(Arc::clone(&db), true);
    let approved = repo.create(org_a, new_integration("Approved")).await?;
    let pending = repo.create(org_a, new_integration("Pending")).await?;
    repo.create(org_b, new_integration("Foreign")).await?;

    assert!(
        repo.set_approval_status(approved.id, ApprovalStatus::Active)
            .await?
    );
    assert!(
        !repo
            .set_approval_status(Uuid::new_v4(), ApprovalStatus::Rejected)
            .await?
    );

    let active = repo.list_by_status(org_a, ApprovalStatus::Active).await?;
    let waiting = repo
        .list_by_status(org_a, ApprovalStatus::PendingApproval)
        .await?;

    assert_eq!(active.iter().map(|i| i.id).collect::<Vec<_>>(), vec![approved.id]);
    assert_eq!(waiting.iter().map(|i| i.id).collect::<Vec<_>>(), vec![pending.id]);
    Ok(())
}
