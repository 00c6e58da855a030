use axum::{
    extract::State,
    response::{IntoResponse, Response},
    routing::{delete, get},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_option_number_from_string;
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{categories, questions},
        NewQuestion, Question,
    },
    server::{
        app::AppState,
        deserializers::first_page,
        error::ApiError,
        extract::{Json, Path, Query},
        pagination::{paginate, PageQuery},
    },
    telemetry::QUESTIONS_CREATED_CNTR,
};

use super::{
    categories::{categories_map, CategoryMap},
    ApiResponse,
};

const DIFFICULTIES: std::ops::RangeInclusive<i64> = 1..=5;

/// Body of `POST /questions`: a search when `searchTerm` is set, a new question otherwise.
#[derive(Deserialize, Debug, Default)]
struct QuestionsBody {
    question: Option<String>,
    answer: Option<String>,
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    category: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    difficulty: Option<i64>,
    #[serde(rename = "searchTerm")]
    search_term: Option<String>,
}

impl QuestionsBody {
    fn search_term(&self) -> Option<&str> {
        self.search_term
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
    }

    fn into_new_question(self) -> Result<NewQuestion, ApiError> {
        fn required(field: &str, value: Option<String>) -> Result<String, ApiError> {
            value
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ApiError::Unprocessable(format!("{field} is required")))
        }

        let question = required("question", self.question)?;
        let answer = required("answer", self.answer)?;
        let category = self
            .category
            .ok_or_else(|| ApiError::Unprocessable("category is required".to_owned()))?;
        let difficulty = self
            .difficulty
            .ok_or_else(|| ApiError::Unprocessable("difficulty is required".to_owned()))?;
        if !DIFFICULTIES.contains(&difficulty) {
            return Err(ApiError::Unprocessable(format!(
                "difficulty {difficulty} is outside {DIFFICULTIES:?}"
            )));
        }
        Ok(NewQuestion {
            question,
            answer,
            category,
            difficulty,
        })
    }
}

// a query string that doesn't parse (e.g. a repeated `page`) falls back to the first page
fn requested_page(query: Result<Query<PageQuery>, ApiError>) -> i64 {
    match query {
        Ok(Query(PageQuery { page })) => page,
        Err(err) => {
            tracing::debug!(error = %err, "Ignoring malformed query string");
            first_page()
        }
    }
}

#[derive(Serialize)]
struct QuestionsPage {
    success: bool,
    questions: Vec<Question>,
    total_questions: usize,
    categories: CategoryMap,
    current_category: Option<i64>,
}

#[derive(Serialize)]
struct SearchResults {
    success: bool,
    questions: Vec<Question>,
    total_questions: usize,
    current_category: Option<i64>,
}

#[derive(Serialize)]
struct QuestionCreated {
    success: bool,
    created: i64,
    questions: Vec<Question>,
    total_questions: usize,
}

#[derive(Serialize)]
struct QuestionDeleted {
    success: bool,
    deleted: i64,
}

#[tracing::instrument(skip(pool))]
async fn questions_page(
    State(pool): State<SqlitePool>,
    query: Result<Query<PageQuery>, ApiError>,
) -> ApiResponse<Json<QuestionsPage>> {
    let page = requested_page(query);
    let all = questions::get_all_questions(&pool).await?;
    let current = paginate(&all, page);
    if current.is_empty() {
        return Err(ApiError::NotFound);
    }
    Ok(Json(QuestionsPage {
        success: true,
        questions: current.to_vec(),
        total_questions: all.len(),
        categories: categories_map(categories::get_all_categories(&pool).await?),
        current_category: None,
    }))
}

#[tracing::instrument(skip(pool))]
async fn create_or_search(
    State(pool): State<SqlitePool>,
    query: Result<Query<PageQuery>, ApiError>,
    Json(body): Json<QuestionsBody>,
) -> ApiResponse<Response> {
    let page = requested_page(query);
    if let Some(term) = body.search_term() {
        let found = questions::search_questions(&pool, term).await?;
        tracing::debug!(term, found = found.len(), "Searched questions");
        return Ok(Json(SearchResults {
            success: true,
            total_questions: found.len(),
            questions: found,
            current_category: None,
        })
        .into_response());
    }

    let new_question = body.into_new_question()?;
    if let Err(err) = categories::get_category(&pool, new_question.category).await {
        return Err(match err {
            sqlx::Error::RowNotFound => ApiError::Unprocessable(format!(
                "category {} does not exist",
                new_question.category
            )),
            err => err.into(),
        });
    }
    let id = questions::create_question(&pool, &new_question).await?;
    QUESTIONS_CREATED_CNTR.inc();
    tracing::info!(id, category = new_question.category, "Created question");

    let all = questions::get_all_questions(&pool).await?;
    Ok(Json(QuestionCreated {
        success: true,
        created: id,
        questions: paginate(&all, page).to_vec(),
        total_questions: all.len(),
    })
    .into_response())
}

#[tracing::instrument(skip(pool))]
async fn delete_question(
    State(pool): State<SqlitePool>,
    Path(id): Path<String>,
) -> ApiResponse<Json<QuestionDeleted>> {
    // deleting something that can't be a question id is as unprocessable as a missing one
    let id: i64 = id
        .parse()
        .map_err(|_| ApiError::Unprocessable(format!("{id} is not a question id")))?;
    if !questions::delete_question(&pool, id).await? {
        return Err(ApiError::Unprocessable(format!(
            "question {id} does not exist"
        )));
    }
    tracing::info!(id, "Deleted question");
    Ok(Json(QuestionDeleted {
        success: true,
        deleted: id,
    }))
}

pub fn questions_router(state: AppState) -> Router {
    Router::new()
        .route("/questions", get(questions_page).post(create_or_search))
        .route("/questions/{id}", delete(delete_question))
        .with_state(state)
}
