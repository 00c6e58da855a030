use std::collections::BTreeMap;

use axum::{extract::State, routing::get, Router};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{categories, questions::get_questions_for_category},
        Category, Question,
    },
    server::{
        app::AppState,
        error::ApiError,
        extract::{Json, Path},
    },
};

use super::ApiResponse;

/// Category id to label, serialized as a JSON object keyed by id.
pub type CategoryMap = BTreeMap<i64, String>;

pub fn categories_map(categories: Vec<Category>) -> CategoryMap {
    categories.into_iter().map(|c| (c.id, c.kind)).collect()
}

#[derive(Serialize)]
struct CategoriesResponse {
    success: bool,
    categories: CategoryMap,
    total_categories: usize,
}

#[derive(Serialize)]
struct CategoryQuestionsResponse {
    success: bool,
    questions: Vec<Question>,
    total_questions: usize,
    current_category: i64,
}

#[tracing::instrument(skip(pool))]
async fn get_categories(State(pool): State<SqlitePool>) -> ApiResponse<Json<CategoriesResponse>> {
    let categories = categories::get_all_categories(&pool).await?;
    if categories.is_empty() {
        return Err(ApiError::NotFound);
    }
    Ok(Json(CategoriesResponse {
        success: true,
        total_categories: categories.len(),
        categories: categories_map(categories),
    }))
}

#[tracing::instrument(skip(pool))]
async fn questions_for_category(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> ApiResponse<Json<CategoryQuestionsResponse>> {
    // an unknown category is just an empty filter
    let questions = get_questions_for_category(&pool, id).await?;
    tracing::debug!(found = questions.len());
    Ok(Json(CategoryQuestionsResponse {
        success: true,
        total_questions: questions.len(),
        questions,
        current_category: id,
    }))
}

pub fn category_router(state: AppState) -> Router {
    Router::new()
        .route("/categories", get(get_categories))
        .route("/categories/{id}/questions", get(questions_for_category))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_keys_serialize_as_strings_in_id_order() {
        let map = categories_map(vec![
            Category { id: 2, kind: "Art".into() },
            Category { id: 1, kind: "Science".into() },
        ]);
        assert_eq!(
            serde_json::to_string(&map).unwrap(),
            r#"{"1":"Science","2":"Art"}"#
        );
    }
}
