use crate::api::{endpoints, ValidationIssue};
use crate::ipc::helpers::{
    apply_saved, ctx, refresh, required_str, respond, saved_result, validation_err, HandlerResult,
};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

const QUESTION_KEYS: &[&str] = &["questions", "question"];
const REVIEW_KEYS: &[&str] = &["feedbacks", "feedback", "reviews"];

fn handle_questions_list(state: &mut AppState, _req: &Request) -> HandlerResult {
    let mut c = ctx(state)?;
    let items = refresh(
        &c.client,
        &mut c.store.questions,
        endpoints::QUESTIONS,
        QUESTION_KEYS,
    )?;
    Ok(json!({ "questions": items }))
}

fn handle_questions_create(state: &mut AppState, req: &Request) -> HandlerResult {
    let course_id = required_str(req, "courseId")?;
    let text = required_str(req, "text")?;
    let mut c = ctx(state)?;
    let resp = c.client.post(
        endpoints::QUESTIONS,
        &json!({ "course": course_id, "text": text }),
    )?;
    let item = apply_saved(
        &c.client,
        &mut c.store.questions,
        &resp,
        endpoints::QUESTIONS,
        QUESTION_KEYS,
    )?;
    Ok(saved_result(item, &c.store.questions))
}

/// Instructor answer to a learner's question.
fn handle_questions_respond(state: &mut AppState, req: &Request) -> HandlerResult {
    let question_id = required_str(req, "questionId")?;
    let response = required_str(req, "response")?;
    let mut c = ctx(state)?;
    let resp = c.client.put(
        &endpoints::action(endpoints::QUESTIONS, question_id, endpoints::RESPOND),
        &json!({ "response": response }),
    )?;
    let item = apply_saved(
        &c.client,
        &mut c.store.questions,
        &resp,
        endpoints::QUESTIONS,
        QUESTION_KEYS,
    )?;
    Ok(saved_result(item, &c.store.questions))
}

fn handle_reviews_list(state: &mut AppState, _req: &Request) -> HandlerResult {
    let mut c = ctx(state)?;
    let items = refresh(
        &c.client,
        &mut c.store.reviews,
        endpoints::REVIEWS,
        REVIEW_KEYS,
    )?;
    Ok(json!({ "reviews": items }))
}

fn handle_reviews_create(state: &mut AppState, req: &Request) -> HandlerResult {
    let course_id = required_str(req, "courseId")?;
    let comment = required_str(req, "comment")?;
    let rating = req.params.get("rating").and_then(|v| v.as_u64());
    if let Some(r) = rating {
        if !(1..=5).contains(&r) {
            return Err(validation_err(vec![ValidationIssue::new(
                "rating",
                "rating must be between 1 and 5",
            )]));
        }
    }
    let mut c = ctx(state)?;
    let resp = c.client.post(
        endpoints::REVIEWS,
        &json!({ "course": course_id, "comment": comment, "rating": rating }),
    )?;
    let item = apply_saved(
        &c.client,
        &mut c.store.reviews,
        &resp,
        endpoints::REVIEWS,
        REVIEW_KEYS,
    )?;
    Ok(saved_result(item, &c.store.reviews))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "questions.list" => handle_questions_list(state, req),
        "questions.create" => handle_questions_create(state, req),
        "questions.respond" => handle_questions_respond(state, req),
        "reviews.list" => handle_reviews_list(state, req),
        "reviews.create" => handle_reviews_create(state, req),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
