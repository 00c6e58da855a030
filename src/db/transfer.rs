//! CSV export and import of the trivia tables.

use std::path::Path;

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::SqlitePool;

use super::queries::categories::{get_all_categories, import_categories, prune_categories};
use super::queries::questions::{get_all_questions, import_questions};
use super::{Category, Question};

const CATEGORIES_FILE: &str = "categories.csv";
const QUESTIONS_FILE: &str = "questions.csv";

fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Cannot create {}", path.display()))?;
    rows.iter().try_for_each(|row| writer.serialize(row))?;
    writer.flush()?;
    Ok(())
}

fn read_csv<T: DeserializeOwned>(path: &Path) -> anyhow::Result<Vec<T>> {
    csv::Reader::from_path(path)
        .with_context(|| format!("Cannot open {}", path.display()))?
        .deserialize()
        .collect::<Result<Vec<T>, _>>()
        .with_context(|| format!("Malformed row in {}", path.display()))
}

pub async fn export_data(pool: &SqlitePool, dir: &Path) -> anyhow::Result<()> {
    let categories = get_all_categories(pool).await?;
    let questions = get_all_questions(pool).await?;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Cannot create directory {}", dir.display()))?;
    tracing::info!(
        categories = categories.len(),
        questions = questions.len(),
        "Exporting to {}",
        dir.display()
    );
    write_csv(&dir.join(CATEGORIES_FILE), &categories)?;
    write_csv(&dir.join(QUESTIONS_FILE), &questions)?;
    Ok(())
}

/// Runs in one transaction: categories are upserted before questions so the foreign keys hold,
/// and pruned after. Any failure leaves the database untouched.
pub async fn import_data(pool: &SqlitePool, dir: &Path) -> anyhow::Result<()> {
    let categories: Vec<Category> = read_csv(&dir.join(CATEGORIES_FILE))?;
    let questions: Vec<Question> = read_csv(&dir.join(QUESTIONS_FILE))?;
    tracing::info!(
        categories = categories.len(),
        questions = questions.len(),
        "Importing from {}",
        dir.display()
    );
    let mut tx = pool.begin().await?;
    import_categories(&mut tx, &categories).await?;
    import_questions(&mut tx, &questions).await?;
    let pruned = prune_categories(&mut tx, &categories).await?;
    tx.commit().await?;
    tracing::debug!(pruned, "Removed stale categories");
    Ok(())
}
