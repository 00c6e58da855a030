use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use std::collections::HashSet;

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq)]
pub struct Category {
    pub id: i64,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,
}

pub async fn get_all_categories(pool: &SqlitePool) -> sqlx::Result<Vec<Category>> {
    sqlx::query_as::<_, Category>(
        r#"
SELECT id, type
FROM categories
ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn get_category(pool: &SqlitePool, id: i64) -> sqlx::Result<Category> {
    sqlx::query_as::<_, Category>(
        r#"
SELECT id, type
FROM categories
WHERE categories.id = ?1
        "#,
    )
    .bind(id)
    .fetch_one(pool)
    .await
}

pub async fn create_category(pool: &SqlitePool, kind: &str) -> sqlx::Result<i64> {
    let mut conn = pool.acquire().await?;

    let id = sqlx::query(
        r#"
INSERT INTO categories (type) VALUES (?1)
        "#,
    )
    .bind(kind)
    .execute(&mut *conn)
    .await?
    .last_insert_rowid();

    Ok(id)
}

/// Inserts new categories and overwrites the label of existing ones, keyed by id.
pub async fn import_categories(
    conn: &mut SqliteConnection,
    categories: &[Category],
) -> sqlx::Result<()> {
    for category in categories {
        sqlx::query(
            r#"
INSERT INTO categories (id, type) VALUES (?1, ?2)
ON CONFLICT (id) DO UPDATE SET type = excluded.type
            "#,
        )
        .bind(category.id)
        .bind(&category.kind)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

/// Deletes every category whose id is not in `keep`. Returns how many were removed.
pub async fn prune_categories(conn: &mut SqliteConnection, keep: &[Category]) -> sqlx::Result<usize> {
    let existing_ids: HashSet<i64> = sqlx::query_scalar::<_, i64>("SELECT id FROM categories")
        .fetch_all(&mut *conn)
        .await?
        .into_iter()
        .collect();
    let keep_ids: HashSet<i64> = keep.iter().map(|c| c.id).collect();
    let stale: Vec<i64> = existing_ids.difference(&keep_ids).copied().collect();
    for id in &stale {
        sqlx::query(
            r#"
DELETE FROM categories WHERE categories.id = ?1
            "#,
        )
        .bind(id)
        .execute(&mut *conn)
        .await?;
    }
    Ok(stale.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::tests::test_pool;

    #[tokio::test]
    async fn create_and_fetch_category() {
        let pool = test_pool().await;
        let id = create_category(&pool, "Science").await.unwrap();
        let category = get_category(&pool, id).await.unwrap();
        assert_eq!(category.kind, "Science");
    }

    #[tokio::test]
    async fn missing_category_is_row_not_found() {
        let pool = test_pool().await;
        let err = get_category(&pool, 42).await.unwrap_err();
        assert!(matches!(err, sqlx::Error::RowNotFound));
    }

    #[tokio::test]
    async fn categories_are_ordered_by_id() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        import_categories(
            &mut conn,
            &[
                Category { id: 3, kind: "Geography".into() },
                Category { id: 1, kind: "Science".into() },
            ],
        )
        .await
        .unwrap();
        drop(conn);
        let ids: Vec<i64> = get_all_categories(&pool)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[tokio::test]
    async fn import_overwrites_and_prune_removes_stale() {
        let pool = test_pool().await;
        create_category(&pool, "Science").await.unwrap();
        create_category(&pool, "Art").await.unwrap();

        let wanted = vec![Category { id: 1, kind: "Physics".into() }];
        let mut tx = pool.begin().await.unwrap();
        import_categories(&mut tx, &wanted).await.unwrap();
        let removed = prune_categories(&mut tx, &wanted).await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(removed, 1);
        assert_eq!(get_all_categories(&pool).await.unwrap(), wanted);
    }
}
