//! PostgreSQL Repository Implementation
//!
//! Item transitions take `SELECT ... FOR UPDATE` on the item row before the
//! ledger locks the affected user rows, so concurrent confirmations of the
//! same item serialize and only the first one observes an unsettled item.

use account::infra::ledger::post_entry;
use chrono::{DateTime, Utc};
use kernel::id::{CategoryId, ClaimId, CommentId, ItemId, ReportId, SubCategoryId, UserId};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::domain::entity::category::{Category, SubCategory};
use crate::domain::entity::claim::ItemClaim;
use crate::domain::entity::comment::Comment;
use crate::domain::entity::item::{LostItem, Posting, Transition};
use crate::domain::entity::report::{ItemReport, ReportStatus};
use crate::domain::repository::{
    BrowseFilter, CategoryRepository, ItemRepository, MemberDirectory, NewReport,
    ReportRepository,
};
use crate::error::{ItemError, ItemResult};

const ITEM_COLUMNS: &str = r#"
    item_id,
    owner_id,
    title,
    description,
    location,
    category_id,
    subcategory_id,
    status,
    bounty_coins,
    finder_id,
    owner_confirmed,
    finder_confirmed,
    is_highlighted,
    highlight_expiry,
    created_at,
    updated_at
"#;

#[derive(Clone)]
pub struct PgItemRepository {
    pool: PgPool,
}

impl PgItemRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn lock_item(conn: &mut PgConnection, item_id: ItemId) -> ItemResult<LostItem> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM items WHERE item_id = $1 FOR UPDATE");
        sqlx::query_as::<_, ItemRow>(&sql)
            .bind(item_id.as_uuid())
            .fetch_optional(&mut *conn)
            .await?
            .ok_or(ItemError::ItemNotFound)?
            .into_entity()
    }

    async fn apply_postings(conn: &mut PgConnection, postings: &[Posting]) -> ItemResult<()> {
        for posting in postings {
            post_entry(
                &mut *conn,
                posting.user_id,
                posting.delta,
                posting.transaction_type,
            )
            .await?;
        }
        Ok(())
    }
}

impl ItemRepository for PgItemRepository {
    async fn create(&self, item: &LostItem, postings: &[Posting]) -> ItemResult<()> {
        let mut tx = self.pool.begin().await?;

        // escrow first: an owner without funds never gets a row
        Self::apply_postings(&mut tx, postings).await?;

        sqlx::query(
            r#"
            INSERT INTO items (
                item_id,
                owner_id,
                title,
                description,
                location,
                category_id,
                subcategory_id,
                status,
                bounty_coins,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
            "#,
        )
        .bind(item.id.as_uuid())
        .bind(item.owner_id.as_uuid())
        .bind(&item.title)
        .bind(&item.description)
        .bind(&item.location)
        .bind(item.category_id.map(CategoryId::into_uuid))
        .bind(item.subcategory_id.map(SubCategoryId::into_uuid))
        .bind(item.status.as_str())
        .bind(item.bounty_coins)
        .bind(item.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn find(&self, item_id: ItemId) -> ItemResult<Option<LostItem>> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM items WHERE item_id = $1");
        sqlx::query_as::<_, ItemRow>(&sql)
            .bind(item_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?
            .map(ItemRow::into_entity)
            .transpose()
    }

    async fn browse(&self, filter: BrowseFilter) -> ItemResult<Vec<LostItem>> {
        let sql = format!(
            r#"
            SELECT {ITEM_COLUMNS}
            FROM items
            WHERE ($1::TEXT IS NULL OR status = $1)
              AND (NOT $2 OR is_highlighted)
              AND ($3::TEXT IS NULL OR title ILIKE $3 OR description ILIKE $3)
              AND ($4::TEXT IS NULL OR location ILIKE $4)
              AND ($5::UUID IS NULL OR category_id = $5)
              AND ($6::UUID IS NULL OR subcategory_id = $6)
            ORDER BY is_highlighted DESC, created_at DESC
            LIMIT $7
            "#
        );
        let rows = sqlx::query_as::<_, ItemRow>(&sql)
            .bind(filter.status.map(|s| s.as_str()))
            .bind(filter.highlighted_only)
            .bind(filter.query.as_deref().map(contains_pattern))
            .bind(filter.location.as_deref().map(contains_pattern))
            .bind(filter.category_id.map(CategoryId::into_uuid))
            .bind(filter.subcategory_id.map(SubCategoryId::into_uuid))
            .bind(filter.limit)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(ItemRow::into_entity).collect()
    }

    async fn transition<T, F>(&self, item_id: ItemId, f: F) -> ItemResult<T>
    where
        T: Send,
        F: FnOnce(&mut LostItem) -> ItemResult<Transition<T>> + Send,
    {
        let mut tx = self.pool.begin().await?;
        let mut item = Self::lock_item(&mut tx, item_id).await?;

        let transition = f(&mut item)?;

        sqlx::query(
            r#"
            UPDATE items SET
                title = $2,
                description = $3,
                location = $4,
                category_id = $5,
                subcategory_id = $6,
                status = $7,
                finder_id = $8,
                owner_confirmed = $9,
                finder_confirmed = $10,
                is_highlighted = $11,
                highlight_expiry = $12,
                updated_at = $13
            WHERE item_id = $1
            "#,
        )
        .bind(item.id.as_uuid())
        .bind(&item.title)
        .bind(&item.description)
        .bind(&item.location)
        .bind(item.category_id.map(CategoryId::into_uuid))
        .bind(item.subcategory_id.map(SubCategoryId::into_uuid))
        .bind(item.status.as_str())
        .bind(item.finder_id.map(UserId::into_uuid))
        .bind(item.owner_confirmed)
        .bind(item.finder_confirmed)
        .bind(item.is_highlighted)
        .bind(item.highlight_expiry)
        .bind(item.updated_at)
        .execute(&mut *tx)
        .await?;

        Self::apply_postings(&mut tx, &transition.postings).await?;

        tx.commit().await?;
        Ok(transition.value)
    }

    async fn remove<F>(&self, item_id: ItemId, f: F) -> ItemResult<LostItem>
    where
        F: FnOnce(&LostItem) -> ItemResult<Vec<Posting>> + Send,
    {
        let mut tx = self.pool.begin().await?;
        let item = Self::lock_item(&mut tx, item_id).await?;

        let postings = f(&item)?;

        sqlx::query("DELETE FROM notifications WHERE related_item_id = $1")
            .bind(item_id.as_uuid())
            .execute(&mut *tx)
            .await?;

        // claims, comments and reports cascade
        sqlx::query("DELETE FROM items WHERE item_id = $1")
            .bind(item_id.as_uuid())
            .execute(&mut *tx)
            .await?;

        Self::apply_postings(&mut tx, &postings).await?;

        tx.commit().await?;
        Ok(item)
    }

    async fn expire_highlights(&self, now: DateTime<Utc>) -> ItemResult<u64> {
        let expired = sqlx::query(
            r#"
            UPDATE items
            SET is_highlighted = FALSE, highlight_expiry = NULL
            WHERE is_highlighted AND highlight_expiry <= $1
            "#,
        )
        .bind(now)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(expired)
    }

    async fn add_claim(&self, item_id: ItemId, user_id: UserId) -> ItemResult<bool> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO item_claims (claim_id, item_id, user_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (item_id, user_id) DO NOTHING
            "#,
        )
        .bind(ClaimId::new().as_uuid())
        .bind(item_id.as_uuid())
        .bind(user_id.as_uuid())
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(inserted > 0)
    }

    async fn list_claims(&self, item_id: ItemId) -> ItemResult<Vec<ItemClaim>> {
        let rows = sqlx::query_as::<_, ClaimRow>(
            r#"
            SELECT c.claim_id, c.item_id, c.user_id, u.user_name, c.created_at
            FROM item_claims c
            JOIN users u ON u.user_id = c.user_id
            WHERE c.item_id = $1
            ORDER BY c.created_at
            "#,
        )
        .bind(item_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ClaimRow::into_entity).collect())
    }

    async fn add_comment(&self, item_id: ItemId, user_id: UserId, content: &str) -> ItemResult<Comment> {
        let row = sqlx::query_as::<_, CommentRow>(
            r#"
            WITH inserted AS (
                INSERT INTO comments (comment_id, item_id, user_id, content)
                VALUES ($1, $2, $3, $4)
                RETURNING comment_id, item_id, user_id, content, created_at
            )
            SELECT i.comment_id, i.item_id, i.user_id, u.user_name, i.content, i.created_at
            FROM inserted i
            JOIN users u ON u.user_id = i.user_id
            "#,
        )
        .bind(CommentId::new().as_uuid())
        .bind(item_id.as_uuid())
        .bind(user_id.as_uuid())
        .bind(content)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_entity())
    }

    async fn list_comments(&self, item_id: ItemId) -> ItemResult<Vec<Comment>> {
        let rows = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT c.comment_id, c.item_id, c.user_id, u.user_name, c.content, c.created_at
            FROM comments c
            JOIN users u ON u.user_id = c.user_id
            WHERE c.item_id = $1
            ORDER BY c.created_at
            "#,
        )
        .bind(item_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(CommentRow::into_entity).collect())
    }
}

const REPORT_SELECT: &str = r#"
    r.report_id,
    r.item_id,
    i.title AS item_title,
    i.owner_id AS item_owner_id,
    r.reporter_id,
    r.reason,
    r.description,
    r.status,
    r.created_at,
    r.updated_at
"#;

impl ReportRepository for PgItemRepository {
    async fn create_report(&self, report: &NewReport) -> ItemResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO item_reports (report_id, item_id, reporter_id, reason, description)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(report.id.as_uuid())
        .bind(report.item_id.as_uuid())
        .bind(report.reporter_id.as_uuid())
        .bind(report.reason.as_str())
        .bind(&report.description)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(ItemError::AlreadyReported)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn has_reported(&self, item_id: ItemId, reporter_id: UserId) -> ItemResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM item_reports WHERE item_id = $1 AND reporter_id = $2)",
        )
        .bind(item_id.as_uuid())
        .bind(reporter_id.as_uuid())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn list_reports(&self, status: Option<ReportStatus>, limit: i64) -> ItemResult<Vec<ItemReport>> {
        let sql = format!(
            r#"
            SELECT {REPORT_SELECT}
            FROM item_reports r
            JOIN items i ON i.item_id = r.item_id
            WHERE ($1::TEXT IS NULL OR r.status = $1)
            ORDER BY r.created_at DESC
            LIMIT $2
            "#
        );
        let rows = sqlx::query_as::<_, ReportRow>(&sql)
            .bind(status.map(|s| s.as_str()))
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(ReportRow::into_entity).collect()
    }

    async fn set_report_status(&self, report_id: ReportId, status: ReportStatus) -> ItemResult<Option<ItemReport>> {
        let sql = format!(
            r#"
            WITH r AS (
                UPDATE item_reports
                SET status = $2, updated_at = NOW()
                WHERE report_id = $1
                RETURNING *
            )
            SELECT {REPORT_SELECT}
            FROM r
            JOIN items i ON i.item_id = r.item_id
            "#
        );
        sqlx::query_as::<_, ReportRow>(&sql)
            .bind(report_id.as_uuid())
            .bind(status.as_str())
            .fetch_optional(&self.pool)
            .await?
            .map(ReportRow::into_entity)
            .transpose()
    }
}

impl MemberDirectory for PgItemRepository {
    async fn user_exists(&self, user_id: UserId) -> ItemResult<bool> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE user_id = $1)")
                .bind(user_id.as_uuid())
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn admin_ids(&self) -> ItemResult<Vec<UserId>> {
        let ids = sqlx::query_scalar::<_, Uuid>("SELECT user_id FROM users WHERE is_admin")
            .fetch_all(&self.pool)
            .await?;

        Ok(ids.into_iter().map(UserId::from_uuid).collect())
    }
}

impl CategoryRepository for PgItemRepository {
    async fn list_categories(&self) -> ItemResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, CategoryRow>(
            "SELECT category_id, name, icon FROM categories ORDER BY sort_order, name",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut subcategories = sqlx::query_as::<_, SubCategoryRow>(
            r#"
            SELECT subcategory_id, category_id, name
            FROM subcategories
            ORDER BY sort_order, name
            "#,
        )
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(SubCategoryRow::into_entity)
        .collect::<Vec<_>>();

        Ok(categories
            .into_iter()
            .map(|row| {
                let id = CategoryId::from_uuid(row.category_id);
                let (children, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut subcategories)
                    .into_iter()
                    .partition(|sub| sub.category_id == id);
                subcategories = rest;
                row.into_entity(children)
            })
            .collect())
    }

    async fn find_category(&self, category_id: CategoryId) -> ItemResult<Option<Category>> {
        let Some(row) = sqlx::query_as::<_, CategoryRow>(
            "SELECT category_id, name, icon FROM categories WHERE category_id = $1",
        )
        .bind(category_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?
        else {
            return Ok(None);
        };

        let subcategories = sqlx::query_as::<_, SubCategoryRow>(
            r#"
            SELECT subcategory_id, category_id, name
            FROM subcategories
            WHERE category_id = $1
            ORDER BY sort_order, name
            "#,
        )
        .bind(category_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(row.into_entity(
            subcategories.into_iter().map(SubCategoryRow::into_entity).collect(),
        )))
    }

    async fn find_subcategory(&self, subcategory_id: SubCategoryId) -> ItemResult<Option<SubCategory>> {
        let row = sqlx::query_as::<_, SubCategoryRow>(
            "SELECT subcategory_id, category_id, name FROM subcategories WHERE subcategory_id = $1",
        )
        .bind(subcategory_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(SubCategoryRow::into_entity))
    }
}

/// `%term%` for ILIKE, with the pattern metacharacters in `term` escaped
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[derive(sqlx::FromRow)]
struct CategoryRow {
    category_id: Uuid,
    name: String,
    icon: String,
}

impl CategoryRow {
    fn into_entity(self, subcategories: Vec<SubCategory>) -> Category {
        Category {
            id: CategoryId::from_uuid(self.category_id),
            name: self.name,
            icon: self.icon,
            subcategories,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SubCategoryRow {
    subcategory_id: Uuid,
    category_id: Uuid,
    name: String,
}

impl SubCategoryRow {
    fn into_entity(self) -> SubCategory {
        SubCategory {
            id: SubCategoryId::from_uuid(self.subcategory_id),
            category_id: CategoryId::from_uuid(self.category_id),
            name: self.name,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ItemRow {
    item_id: Uuid,
    owner_id: Uuid,
    title: String,
    description: String,
    location: String,
    category_id: Option<Uuid>,
    subcategory_id: Option<Uuid>,
    status: String,
    bounty_coins: i64,
    finder_id: Option<Uuid>,
    owner_confirmed: bool,
    finder_confirmed: bool,
    is_highlighted: bool,
    highlight_expiry: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ItemRow {
    fn into_entity(self) -> ItemResult<LostItem> {
        Ok(LostItem {
            id: ItemId::from_uuid(self.item_id),
            owner_id: UserId::from_uuid(self.owner_id),
            title: self.title,
            description: self.description,
            location: self.location,
            category_id: self.category_id.map(CategoryId::from_uuid),
            subcategory_id: self.subcategory_id.map(SubCategoryId::from_uuid),
            status: self
                .status
                .parse()
                .map_err(|_| ItemError::Internal(format!("bad item status: {}", self.status)))?,
            bounty_coins: self.bounty_coins,
            finder_id: self.finder_id.map(UserId::from_uuid),
            owner_confirmed: self.owner_confirmed,
            finder_confirmed: self.finder_confirmed,
            is_highlighted: self.is_highlighted,
            highlight_expiry: self.highlight_expiry,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ClaimRow {
    claim_id: Uuid,
    item_id: Uuid,
    user_id: Uuid,
    user_name: String,
    created_at: DateTime<Utc>,
}

impl ClaimRow {
    fn into_entity(self) -> ItemClaim {
        ItemClaim {
            id: ClaimId::from_uuid(self.claim_id),
            item_id: ItemId::from_uuid(self.item_id),
            user_id: UserId::from_uuid(self.user_id),
            user_name: self.user_name,
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    comment_id: Uuid,
    item_id: Uuid,
    user_id: Uuid,
    user_name: String,
    content: String,
    created_at: DateTime<Utc>,
}

impl CommentRow {
    fn into_entity(self) -> Comment {
        Comment {
            id: CommentId::from_uuid(self.comment_id),
            item_id: ItemId::from_uuid(self.item_id),
            user_id: UserId::from_uuid(self.user_id),
            user_name: self.user_name,
            content: self.content,
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ReportRow {
    report_id: Uuid,
    item_id: Uuid,
    item_title: String,
    item_owner_id: Uuid,
    reporter_id: Uuid,
    reason: String,
    description: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ReportRow {
    fn into_entity(self) -> ItemResult<ItemReport> {
        Ok(ItemReport {
            id: ReportId::from_uuid(self.report_id),
            item_id: ItemId::from_uuid(self.item_id),
            item_title: self.item_title,
            item_owner_id: UserId::from_uuid(self.item_owner_id),
            reporter_id: UserId::from_uuid(self.reporter_id),
            reason: self.reason.parse()?,
            description: self.description,
            status: self.status.parse()?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::contains_pattern;

    #[test]
    fn test_contains_pattern_wraps_term() {
        assert_eq!(contains_pattern("dompet"), "%dompet%");
    }

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(contains_pattern("a\\b"), "%a\\\\b%");
    }
}
