use std::collections::HashSet;

use axum::{extract::State, routing::post, Router};
use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_number_from_string;
use sqlx::SqlitePool;

use crate::{
    db::{queries::questions, Question},
    quiz::{next_question, ALL_CATEGORIES},
    server::{app::AppState, deserializers::Stri64, extract::Json},
    telemetry::QUIZ_QUESTIONS_CNTR,
};

use super::ApiResponse;

#[derive(Deserialize, Debug)]
struct QuizRequest {
    #[serde(default)]
    previous_questions: Vec<Stri64>,
    quiz_category: QuizCategory,
}

#[derive(Deserialize, Debug)]
struct QuizCategory {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    id: i64,
}

#[derive(Serialize)]
struct QuizResponse {
    success: bool,
    question: Option<Question>,
}

#[tracing::instrument(skip(pool))]
async fn play_quiz(
    State(pool): State<SqlitePool>,
    Json(request): Json<QuizRequest>,
) -> ApiResponse<Json<QuizResponse>> {
    let category = request.quiz_category.id;
    let candidates = if category == ALL_CATEGORIES {
        questions::get_all_questions(&pool).await?
    } else {
        questions::get_questions_for_category(&pool, category).await?
    };
    let previous: HashSet<i64> = request.previous_questions.iter().map(|id| id.0).collect();

    let question = next_question(candidates, &previous, &mut rand::rng());
    match &question {
        Some(q) => {
            let label = if category == ALL_CATEGORIES {
                "all".to_owned()
            } else {
                category.to_string()
            };
            QUIZ_QUESTIONS_CNTR.with_label_values(&[label.as_str()]).inc();
            tracing::debug!(id = q.id, seen = previous.len(), "Serving quiz question");
        }
        None => tracing::debug!(seen = previous.len(), "Quiz exhausted"),
    }

    Ok(Json(QuizResponse {
        success: true,
        question,
    }))
}

pub fn quizzes_router(state: AppState) -> Router {
    Router::new()
        .route("/quizzes", post(play_quiz))
        .with_state(state)
}
