//! Entity resolution and upsert layer
//!
//! Maps normalized offers onto the relational schema. Reference entities
//! (company, skill, industry, contract, location) are resolved with
//! "select by natural key, else insert" and are append-only; the job
//! offer itself is a true upsert keyed on url. A whole batch runs inside
//! a single transaction: either every row of a run commits or none does.
//!
//! The select-then-insert resolvers are racy under concurrent writers; a
//! run owns its connection exclusively (no concurrent batches), so the
//! window cannot be hit today. Multi-run concurrency would require
//! switching them to `INSERT ... ON CONFLICT ... RETURNING id`.

use anyhow::{Context, Result};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, info};

use crate::normalize::NormalizedOffer;

/// Company sentinel for offers with no employer name.
pub const UNKNOWN_COMPANY: &str = "Unknown";

/// City sentinel for offers with no parseable workplace.
pub const UNKNOWN_CITY: &str = "Inconnue";

/// Department-code sentinel for offers with no parseable workplace.
pub const UNKNOWN_DEPT_CODE: &str = "00";

/// Skill category stored on the `skill` dictionary row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkillCategory {
    Hard,
    Soft,
    Language,
}

impl SkillCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            SkillCategory::Hard => "hard",
            SkillCategory::Soft => "soft",
            SkillCategory::Language => "language",
        }
    }
}

/// Requirement level of a skill association
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequirementLevel {
    Required,
    Optional,
}

impl RequirementLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            RequirementLevel::Required => "required",
            RequirementLevel::Optional => "optional",
        }
    }
}

/// Statistics from a batch store operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Offers processed
    pub total: usize,
    /// New job_offer rows inserted
    pub created: usize,
    /// Existing job_offer rows updated
    pub updated: usize,
    /// Skill/language association inserts attempted
    pub links: usize,
}

/// Storage handler for normalized job offers
pub struct OfferStore {
    db: PgPool,
}

impl OfferStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Store a whole batch inside a single transaction
    ///
    /// Any error aborts the transaction (full rollback, nothing from this
    /// run persists) and propagates to the caller. Success commits once,
    /// after all rows are processed.
    pub async fn store_batch(&self, offers: &[NormalizedOffer]) -> Result<StoreStats> {
        let mut tx = self
            .db
            .begin()
            .await
            .context("Failed to begin batch transaction")?;

        let mut stats = StoreStats::default();

        for offer in offers {
            self.store_offer_tx(&mut tx, offer, &mut stats)
                .await
                .with_context(|| format!("Failed to store offer '{}'", offer.url))?;
            stats.total += 1;
        }

        tx.commit()
            .await
            .context("Failed to commit batch transaction")?;

        info!(
            total = stats.total,
            created = stats.created,
            updated = stats.updated,
            links = stats.links,
            "Batch stored"
        );

        Ok(stats)
    }

    /// Resolve every referenced entity, upsert the offer, link its skills
    async fn store_offer_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        offer: &NormalizedOffer,
        stats: &mut StoreStats,
    ) -> Result<()> {
        debug!(url = %offer.url, "Storing offer");

        let company_name = offer
            .company
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(UNKNOWN_COMPANY);
        let company_id = resolve_company_tx(tx, company_name).await?;

        let industry_id = resolve_industry_tx(tx, offer.industry.as_deref()).await?;
        let contract_id = resolve_contract_tx(tx, offer.contract.as_deref()).await?;

        let city = offer
            .city
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(UNKNOWN_CITY);
        let dept_code = offer
            .dept_code
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(UNKNOWN_DEPT_CODE);
        let location_id =
            resolve_location_tx(tx, city, dept_code, offer.latitude, offer.longitude).await?;

        let (job_offer_id, is_new) = upsert_offer_tx(
            tx,
            offer,
            company_id,
            contract_id,
            industry_id,
            location_id,
        )
        .await?;

        if is_new {
            stats.created += 1;
        } else {
            stats.updated += 1;
        }

        let link_groups: [(&[String], SkillCategory, RequirementLevel); 5] = [
            (
                &offer.skills_hard_required,
                SkillCategory::Hard,
                RequirementLevel::Required,
            ),
            (
                &offer.skills_hard_optional,
                SkillCategory::Hard,
                RequirementLevel::Optional,
            ),
            // Soft skills carry no exigence flag upstream; stored as required.
            (
                &offer.skills_soft,
                SkillCategory::Soft,
                RequirementLevel::Required,
            ),
            (
                &offer.languages_required,
                SkillCategory::Language,
                RequirementLevel::Required,
            ),
            (
                &offer.languages_optional,
                SkillCategory::Language,
                RequirementLevel::Optional,
            ),
        ];

        for (labels, category, level) in link_groups {
            for label in labels {
                let skill_id = resolve_skill_tx(tx, label, category).await?;
                link_skill_tx(tx, job_offer_id, skill_id, level).await?;
                stats.links += 1;
            }
        }

        Ok(())
    }
}

/// Resolve a company by name, creating it on first encounter
pub async fn resolve_company_tx(
    tx: &mut Transaction<'_, Postgres>,
    name: &str,
) -> Result<i64> {
    let existing = sqlx::query_scalar::<_, i64>("SELECT id FROM company WHERE name = $1")
        .bind(name)
        .fetch_optional(&mut **tx)
        .await
        .context("Failed to look up company")?;

    if let Some(id) = existing {
        return Ok(id);
    }

    let id = sqlx::query_scalar::<_, i64>("INSERT INTO company (name) VALUES ($1) RETURNING id")
        .bind(name)
        .fetch_one(&mut **tx)
        .await
        .context("Failed to insert company")?;

    Ok(id)
}

/// Resolve an industry by name; an absent label yields no row and no id
pub async fn resolve_industry_tx(
    tx: &mut Transaction<'_, Postgres>,
    name: Option<&str>,
) -> Result<Option<i64>> {
    let Some(name) = name.filter(|s| !s.is_empty()) else {
        return Ok(None);
    };

    let existing = sqlx::query_scalar::<_, i64>("SELECT id FROM industry WHERE name = $1")
        .bind(name)
        .fetch_optional(&mut **tx)
        .await
        .context("Failed to look up industry")?;

    if let Some(id) = existing {
        return Ok(Some(id));
    }

    let id = sqlx::query_scalar::<_, i64>("INSERT INTO industry (name) VALUES ($1) RETURNING id")
        .bind(name)
        .fetch_one(&mut **tx)
        .await
        .context("Failed to insert industry")?;

    Ok(Some(id))
}

/// Resolve a contract by type label; an absent label yields no row and no id
pub async fn resolve_contract_tx(
    tx: &mut Transaction<'_, Postgres>,
    label: Option<&str>,
) -> Result<Option<i64>> {
    let Some(label) = label.filter(|s| !s.is_empty()) else {
        return Ok(None);
    };

    let existing =
        sqlx::query_scalar::<_, i64>("SELECT id FROM contract WHERE type_contrat = $1")
            .bind(label)
            .fetch_optional(&mut **tx)
            .await
            .context("Failed to look up contract")?;

    if let Some(id) = existing {
        return Ok(Some(id));
    }

    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO contract (type_contrat) VALUES ($1) RETURNING id",
    )
    .bind(label)
    .fetch_one(&mut **tx)
    .await
    .context("Failed to insert contract")?;

    Ok(Some(id))
}

/// Resolve a location by its (city, department code) natural key
///
/// Coordinates are stored on first creation only; the dictionary row is
/// never mutated afterwards.
pub async fn resolve_location_tx(
    tx: &mut Transaction<'_, Postgres>,
    city: &str,
    postal_code: &str,
    latitude: Option<f64>,
    longitude: Option<f64>,
) -> Result<i64> {
    let existing = sqlx::query_scalar::<_, i64>(
        "SELECT id FROM location WHERE ville = $1 AND code_postal = $2",
    )
    .bind(city)
    .bind(postal_code)
    .fetch_optional(&mut **tx)
    .await
    .context("Failed to look up location")?;

    if let Some(id) = existing {
        return Ok(id);
    }

    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO location (ville, code_postal, latitude, longitude)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(city)
    .bind(postal_code)
    .bind(latitude)
    .bind(longitude)
    .fetch_one(&mut **tx)
    .await
    .context("Failed to insert location")?;

    Ok(id)
}

/// Resolve a skill by its (name, category) natural key
pub async fn resolve_skill_tx(
    tx: &mut Transaction<'_, Postgres>,
    name: &str,
    category: SkillCategory,
) -> Result<i64> {
    let existing =
        sqlx::query_scalar::<_, i64>("SELECT id FROM skill WHERE name = $1 AND category = $2")
            .bind(name)
            .bind(category.as_str())
            .fetch_optional(&mut **tx)
            .await
            .context("Failed to look up skill")?;

    if let Some(id) = existing {
        return Ok(id);
    }

    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO skill (name, category) VALUES ($1, $2) RETURNING id",
    )
    .bind(name)
    .bind(category.as_str())
    .fetch_one(&mut **tx)
    .await
    .context("Failed to insert skill")?;

    Ok(id)
}

/// Upsert a job offer keyed on url
///
/// On hit, every mutable field and the foreign keys are overwritten and
/// `updated_at` refreshed; on miss a new row is inserted. Returns the
/// surrogate id and whether the row is new.
pub async fn upsert_offer_tx(
    tx: &mut Transaction<'_, Postgres>,
    offer: &NormalizedOffer,
    company_id: i64,
    contract_id: Option<i64>,
    industry_id: Option<i64>,
    location_id: i64,
) -> Result<(i64, bool)> {
    let existing = sqlx::query_scalar::<_, i64>("SELECT id FROM job_offer WHERE url = $1")
        .bind(&offer.url)
        .fetch_optional(&mut **tx)
        .await
        .context("Failed to look up job offer")?;

    if let Some(id) = existing {
        sqlx::query(
            r#"
            UPDATE job_offer
            SET
                title = $1,
                description = $2,
                salary_min_annual = $3,
                salary_max_annual = $4,
                experience = $5,
                education = $6,
                date_posted = $7,
                company_id = $8,
                contract_id = $9,
                industry_id = $10,
                location_id = $11,
                updated_at = NOW()
            WHERE id = $12
            "#,
        )
        .bind(&offer.title)
        .bind(&offer.description)
        .bind(offer.salary_min_annual)
        .bind(offer.salary_max_annual)
        .bind(&offer.experience)
        .bind(&offer.education)
        .bind(offer.date_posted)
        .bind(company_id)
        .bind(contract_id)
        .bind(industry_id)
        .bind(location_id)
        .bind(id)
        .execute(&mut **tx)
        .await
        .context("Failed to update job offer")?;

        return Ok((id, false));
    }

    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO job_offer (
            title,
            description,
            salary_min_annual,
            salary_max_annual,
            experience,
            education,
            date_posted,
            url,
            company_id,
            contract_id,
            industry_id,
            location_id
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        RETURNING id
        "#,
    )
    .bind(&offer.title)
    .bind(&offer.description)
    .bind(offer.salary_min_annual)
    .bind(offer.salary_max_annual)
    .bind(&offer.experience)
    .bind(&offer.education)
    .bind(offer.date_posted)
    .bind(&offer.url)
    .bind(company_id)
    .bind(contract_id)
    .bind(industry_id)
    .bind(location_id)
    .fetch_one(&mut **tx)
    .await
    .context("Failed to insert job offer")?;

    Ok((id, true))
}

/// Link a skill to an offer; duplicate triples are silent no-ops
pub async fn link_skill_tx(
    tx: &mut Transaction<'_, Postgres>,
    job_offer_id: i64,
    skill_id: i64,
    requirement_level: RequirementLevel,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO job_offer_skill (job_offer_id, skill_id, requirement_level)
        VALUES ($1, $2, $3)
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(job_offer_id)
    .bind(skill_id)
    .bind(requirement_level.as_str())
    .execute(&mut **tx)
    .await
    .context("Failed to link skill to job offer")?;

    Ok(())
}
