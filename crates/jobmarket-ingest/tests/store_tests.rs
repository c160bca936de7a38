//! Storage layer tests
//!
//! Run against a live Postgres via `#[sqlx::test]`; each test gets its
//! own database with the migrations applied.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use anyhow::Result;
use jobmarket_ingest::normalize::NormalizedOffer;
use jobmarket_ingest::store::{
    link_skill_tx, resolve_company_tx, resolve_contract_tx, resolve_industry_tx,
    resolve_location_tx, resolve_skill_tx, upsert_offer_tx, OfferStore, RequirementLevel,
    SkillCategory,
};
use sqlx::PgPool;

fn sample_offer(url: &str) -> NormalizedOffer {
    NormalizedOffer {
        url: url.to_string(),
        title: "data engineer".to_string(),
        description: Some("Pipelines batch et streaming.".to_string()),
        company: Some("ACME".to_string()),
        industry: Some("Conseil en systèmes informatiques".to_string()),
        contract: Some("CDI".to_string()),
        salary_min_annual: Some(40_000.0),
        salary_max_annual: Some(50_000.0),
        dept_code: Some("75".to_string()),
        city: Some("Paris".to_string()),
        latitude: Some(48.86),
        longitude: Some(2.34),
        skills_hard_required: vec!["SQL".to_string()],
        skills_hard_optional: vec!["Power BI".to_string()],
        skills_soft: vec!["Rigueur".to_string()],
        languages_required: vec!["Anglais".to_string()],
        ..Default::default()
    }
}

#[sqlx::test]
async fn test_company_resolution_is_idempotent(pool: PgPool) -> Result<()> {
    let mut tx = pool.begin().await?;

    let first = resolve_company_tx(&mut tx, "ACME").await?;
    let second = resolve_company_tx(&mut tx, "ACME").await?;
    let other = resolve_company_tx(&mut tx, "Globex").await?;

    assert_eq!(first, second);
    assert_ne!(first, other);

    tx.commit().await?;

    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM company")
        .fetch_one(&pool)
        .await?;
    assert_eq!(count, 2);

    Ok(())
}

#[sqlx::test]
async fn test_absent_industry_and_contract_resolve_to_none(pool: PgPool) -> Result<()> {
    let mut tx = pool.begin().await?;

    assert_eq!(resolve_industry_tx(&mut tx, None).await?, None);
    assert_eq!(resolve_industry_tx(&mut tx, Some("")).await?, None);
    assert_eq!(resolve_contract_tx(&mut tx, None).await?, None);

    let id = resolve_contract_tx(&mut tx, Some("CDI")).await?;
    assert!(id.is_some());

    tx.commit().await?;

    // Nothing was created for the absent labels.
    let industries = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM industry")
        .fetch_one(&pool)
        .await?;
    assert_eq!(industries, 0);

    Ok(())
}

#[sqlx::test]
async fn test_location_keyed_by_city_and_code(pool: PgPool) -> Result<()> {
    let mut tx = pool.begin().await?;

    let paris = resolve_location_tx(&mut tx, "Paris", "75", Some(48.86), Some(2.34)).await?;
    let paris_again = resolve_location_tx(&mut tx, "Paris", "75", None, None).await?;
    let lyon = resolve_location_tx(&mut tx, "Lyon", "69", None, None).await?;

    assert_eq!(paris, paris_again);
    assert_ne!(paris, lyon);

    tx.commit().await?;

    // Coordinates from the first insert survive the keyed re-resolution.
    let lat = sqlx::query_scalar::<_, Option<f64>>("SELECT latitude FROM location WHERE id = $1")
        .bind(paris)
        .fetch_one(&pool)
        .await?;
    assert_eq!(lat, Some(48.86));

    Ok(())
}

#[sqlx::test]
async fn test_skill_distinct_per_category(pool: PgPool) -> Result<()> {
    let mut tx = pool.begin().await?;

    let hard = resolve_skill_tx(&mut tx, "Anglais", SkillCategory::Hard).await?;
    let language = resolve_skill_tx(&mut tx, "Anglais", SkillCategory::Language).await?;
    let language_again = resolve_skill_tx(&mut tx, "Anglais", SkillCategory::Language).await?;

    assert_ne!(hard, language);
    assert_eq!(language, language_again);

    tx.commit().await?;
    Ok(())
}

#[sqlx::test]
async fn test_offer_upsert_keyed_on_url(pool: PgPool) -> Result<()> {
    let mut tx = pool.begin().await?;

    let company = resolve_company_tx(&mut tx, "ACME").await?;
    let location = resolve_location_tx(&mut tx, "Paris", "75", None, None).await?;

    let mut offer = sample_offer("https://example.test/offres/1");
    let (id, is_new) = upsert_offer_tx(&mut tx, &offer, company, None, None, location).await?;
    assert!(is_new);

    offer.title = "senior data engineer".to_string();
    offer.salary_max_annual = Some(60_000.0);
    let (id_again, is_new_again) =
        upsert_offer_tx(&mut tx, &offer, company, None, None, location).await?;

    assert_eq!(id, id_again);
    assert!(!is_new_again);

    tx.commit().await?;

    let (title, updated_at): (String, Option<chrono::DateTime<chrono::Utc>>) =
        sqlx::query_as("SELECT title, updated_at FROM job_offer WHERE id = $1")
            .bind(id)
            .fetch_one(&pool)
            .await?;
    assert_eq!(title, "senior data engineer");
    assert!(updated_at.is_some());

    Ok(())
}

#[sqlx::test]
async fn test_skill_link_duplicates_are_no_ops(pool: PgPool) -> Result<()> {
    let mut tx = pool.begin().await?;

    let company = resolve_company_tx(&mut tx, "ACME").await?;
    let location = resolve_location_tx(&mut tx, "Paris", "75", None, None).await?;
    let offer = sample_offer("https://example.test/offres/1");
    let (offer_id, _) = upsert_offer_tx(&mut tx, &offer, company, None, None, location).await?;
    let skill = resolve_skill_tx(&mut tx, "SQL", SkillCategory::Hard).await?;

    link_skill_tx(&mut tx, offer_id, skill, RequirementLevel::Required).await?;
    link_skill_tx(&mut tx, offer_id, skill, RequirementLevel::Required).await?;
    // Same skill at another level is a distinct association.
    link_skill_tx(&mut tx, offer_id, skill, RequirementLevel::Optional).await?;

    tx.commit().await?;

    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM job_offer_skill")
        .fetch_one(&pool)
        .await?;
    assert_eq!(count, 2);

    Ok(())
}

#[sqlx::test]
async fn test_store_batch_persists_offers_and_links(pool: PgPool) -> Result<()> {
    let store = OfferStore::new(pool.clone());

    let offers = vec![
        sample_offer("https://example.test/offres/1"),
        sample_offer("https://example.test/offres/2"),
    ];

    let stats = store.store_batch(&offers).await?;
    assert_eq!(stats.total, 2);
    assert_eq!(stats.created, 2);
    assert_eq!(stats.updated, 0);

    // 4 skill labels per offer, shared dictionary rows.
    let skills = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM skill")
        .fetch_one(&pool)
        .await?;
    assert_eq!(skills, 4);

    let links = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM job_offer_skill")
        .fetch_one(&pool)
        .await?;
    assert_eq!(links, 8);

    // Second run updates in place.
    let stats = store.store_batch(&offers).await?;
    assert_eq!(stats.created, 0);
    assert_eq!(stats.updated, 2);

    let offers_count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM job_offer")
        .fetch_one(&pool)
        .await?;
    assert_eq!(offers_count, 2);

    Ok(())
}

#[sqlx::test]
async fn test_store_batch_substitutes_defaults(pool: PgPool) -> Result<()> {
    let store = OfferStore::new(pool.clone());

    let offer = NormalizedOffer {
        url: "francetravail:186FJKB".to_string(),
        title: "data analyst".to_string(),
        ..Default::default()
    };

    store.store_batch(&[offer]).await?;

    let company: String = sqlx::query_scalar(
        "SELECT c.name FROM job_offer o JOIN company c ON c.id = o.company_id",
    )
    .fetch_one(&pool)
    .await?;
    assert_eq!(company, "Unknown");

    let (ville, code): (String, String) = sqlx::query_as(
        "SELECT l.ville, l.code_postal FROM job_offer o JOIN location l ON l.id = o.location_id",
    )
    .fetch_one(&pool)
    .await?;
    assert_eq!(ville, "Inconnue");
    assert_eq!(code, "00");

    Ok(())
}

#[sqlx::test]
async fn test_store_batch_rolls_back_as_a_whole(pool: PgPool) -> Result<()> {
    let store = OfferStore::new(pool.clone());

    let good = sample_offer("https://example.test/offres/1");
    // Postgres rejects NUL bytes in text, failing the second row.
    let bad = NormalizedOffer {
        url: "https://example.test/offres/2".to_string(),
        title: "broken\u{0}title".to_string(),
        ..Default::default()
    };

    assert!(store.store_batch(&[good, bad]).await.is_err());

    // The first row must not survive the failed batch.
    let offers_count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM job_offer")
        .fetch_one(&pool)
        .await?;
    assert_eq!(offers_count, 0);

    let companies = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM company")
        .fetch_one(&pool)
        .await?;
    assert_eq!(companies, 0);

    Ok(())
}
