use std::collections::HashSet;

use vocab_core::model::{CardId, Track, ValidatedCard, VocabularyCard};

use super::SqliteRepository;
use super::mapping::{
    CARD_COLUMNS, card_id_from_i64, card_id_to_i64, conn, count_from_i64, map_card_row,
    placeholders, table_name,
};
use crate::repository::{
    CardFilter, CardPage, CardStore, CategoryCount, PageRequest, StorageError, StoreSummary,
};

#[async_trait::async_trait]
impl CardStore for SqliteRepository {
    async fn insert_card(
        &self,
        track: Track,
        card: ValidatedCard,
    ) -> Result<VocabularyCard, StorageError> {
        let table = table_name(track);
        let sql = format!(
            r"
            INSERT INTO {table} (
                prompt, answer, pronunciation, category, word_type, level, notes, example,
                created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "
        );
        let result = sqlx::query(&sql)
            .bind(&card.prompt)
            .bind(&card.answer)
            .bind(&card.pronunciation)
            .bind(&card.category)
            .bind(&card.word_type)
            .bind(&card.level)
            .bind(&card.notes)
            .bind(&card.example)
            .bind(card.created_at)
            .execute(&self.pool)
            .await
            .map_err(conn)?;

        let id = card_id_from_i64(result.last_insert_rowid())?;
        Ok(card.assign_id(id))
    }

    async fn get_card(
        &self,
        track: Track,
        id: CardId,
    ) -> Result<Option<VocabularyCard>, StorageError> {
        let table = table_name(track);
        let sql = format!("SELECT {CARD_COLUMNS} FROM {table} WHERE id = ?1");
        let row = sqlx::query(&sql)
            .bind(card_id_to_i64(id)?)
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        row.as_ref().map(map_card_row).transpose()
    }

    async fn count(&self, track: Track) -> Result<u64, StorageError> {
        let table = table_name(track);
        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&self.pool)
            .await
            .map_err(conn)?;
        count_from_i64(total)
    }

    async fn sample(
        &self,
        track: Track,
        excluding: &HashSet<CardId>,
        limit: u32,
    ) -> Result<Vec<VocabularyCard>, StorageError> {
        let table = table_name(track);
        let sql = if excluding.is_empty() {
            format!("SELECT {CARD_COLUMNS} FROM {table} ORDER BY RANDOM() LIMIT ?1")
        } else {
            format!(
                "SELECT {CARD_COLUMNS} FROM {table} WHERE id NOT IN ({}) ORDER BY RANDOM() LIMIT ?1",
                placeholders(2, excluding.len())
            )
        };

        let mut q = sqlx::query(&sql).bind(i64::from(limit));
        for id in excluding {
            q = q.bind(card_id_to_i64(*id)?);
        }

        let rows = q.fetch_all(&self.pool).await.map_err(conn)?;
        rows.iter().map(map_card_row).collect()
    }

    async fn summary(&self, track: Track) -> Result<StoreSummary, StorageError> {
        let table = table_name(track);
        let rows: Vec<(String, i64)> = sqlx::query_as(&format!(
            "SELECT category, COUNT(id) FROM {table} GROUP BY category ORDER BY category"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut categories = Vec::with_capacity(rows.len());
        for (name, count) in rows {
            categories.push(CategoryCount {
                name,
                count: count_from_i64(count)?,
            });
        }

        Ok(StoreSummary {
            total: self.count(track).await?,
            categories,
        })
    }

    async fn list_cards(
        &self,
        track: Track,
        filter: &CardFilter,
        page: PageRequest,
    ) -> Result<CardPage, StorageError> {
        let page = page.normalized();
        let table = table_name(track);

        let mut clauses = Vec::new();
        let mut binds: Vec<&str> = Vec::new();
        if let Some(category) = filter.category.as_deref() {
            binds.push(category);
            clauses.push(format!("category = ?{}", binds.len()));
        }
        if let Some(level) = filter.level.as_deref() {
            binds.push(level);
            clauses.push(format!("level = ?{}", binds.len()));
        }
        let where_sql = if clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", clauses.join(" AND "))
        };

        let count_sql = format!("SELECT COUNT(*) FROM {table} {where_sql}");
        let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
        for value in &binds {
            count_q = count_q.bind(*value);
        }
        let total = count_from_i64(count_q.fetch_one(&self.pool).await.map_err(conn)?)?;

        let n = binds.len();
        let list_sql = format!(
            "SELECT {CARD_COLUMNS} FROM {table} {where_sql} \
             ORDER BY category, answer, id LIMIT ?{} OFFSET ?{}",
            n + 1,
            n + 2
        );
        let mut list_q = sqlx::query(&list_sql);
        for value in &binds {
            list_q = list_q.bind(*value);
        }
        let offset = i64::try_from(page.offset())
            .map_err(|_| StorageError::Serialization("offset overflow".into()))?;
        let rows = list_q
            .bind(i64::from(page.per_page))
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;

        let cards = rows.iter().map(map_card_row).collect::<Result<Vec<_>, _>>()?;
        Ok(CardPage::new(cards, page, total))
    }
}
