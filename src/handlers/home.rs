//! Prediction page handlers

use axum::{extract::State, response::Html, Form};

use crate::models::HeartForm;
use crate::{render, AppResult, AppState};

/// Render the empty form
pub async fn show() -> Html<String> {
    Html(render::home_page(&HeartForm::default(), None, None))
}

/// Validate the submitted form and predict when it is clean
pub async fn submit(
    State(state): State<AppState>,
    Form(form): Form<HeartForm>,
) -> AppResult<Html<String>> {
    let report = match form.validate_report() {
        Ok(report) => report,
        Err(errors) => {
            tracing::debug!(
                fields = ?errors.fields().collect::<Vec<_>>(),
                "Form validation failed"
            );
            return Ok(Html(render::home_page(&form, Some(&errors), None)));
        }
    };

    let result = state.predictor.predict_report(&report)?;

    tracing::info!(disease = result.has_disease(), "Prediction served");

    Ok(Html(render::home_page(&form, None, Some(&result.message()))))
}
