use crate::api::{decode_list, endpoints};
use crate::ipc::helpers::{
    apply_saved, ctx, refresh, required_str, respond, saved_result, validation_err, HandlerErr,
    HandlerResult,
};
use crate::ipc::types::{AppState, Request};
use crate::models::Quiz;
use crate::quiz::{validate_quiz, QuizDraft, QuizRules};
use serde_json::json;

const KEYS: &[&str] = &["quizzes", "quiz"];

fn rules(state: &AppState) -> QuizRules {
    QuizRules {
        question_count: state.config.quiz_question_count,
    }
}

fn draft_param(req: &Request) -> Result<QuizDraft, HandlerErr> {
    let draft = req
        .params
        .get("draft")
        .cloned()
        .ok_or_else(|| HandlerErr::bad_params("missing draft"))?;
    serde_json::from_value(draft).map_err(|e| HandlerErr::bad_params(e.to_string()))
}

fn handle_list(state: &mut AppState, _req: &Request) -> HandlerResult {
    let mut c = ctx(state)?;
    let quizzes = refresh(&c.client, &mut c.store.quizzes, endpoints::QUIZZES, KEYS)?;
    Ok(json!({ "quizzes": quizzes }))
}

fn handle_for_course(state: &mut AppState, req: &Request) -> HandlerResult {
    let course_id = required_str(req, "courseId")?;
    let mut c = ctx(state)?;
    let resp = c.client.get(&endpoints::quiz_for_course(course_id))?;
    // Either one quiz or a list of them.
    let quizzes: Vec<Quiz> = if resp.get("_id").is_some() {
        vec![serde_json::from_value(resp)
            .map_err(|e| HandlerErr::new("bad_response", e.to_string()))?]
    } else {
        decode_list(resp, KEYS)?
    };
    for q in &quizzes {
        c.store.quizzes.upsert(q.clone());
    }
    Ok(json!({ "quizzes": quizzes }))
}

fn handle_validate(state: &mut AppState, req: &Request) -> HandlerResult {
    let draft = draft_param(req)?;
    let rules = rules(state);
    let issues = validate_quiz(&draft, rules);
    Ok(json!({
        "valid": issues.is_empty(),
        "issues": issues,
        "questionCount": rules.question_count,
    }))
}

fn handle_save(state: &mut AppState, req: &Request, quiz_id: Option<&str>) -> HandlerResult {
    let draft = draft_param(req)?;
    let issues = validate_quiz(&draft, rules(state));
    if !issues.is_empty() {
        return Err(validation_err(issues));
    }
    let body = draft.normalized();

    let mut c = ctx(state)?;
    let resp = match quiz_id {
        Some(id) => c.client.put(&endpoints::item(endpoints::QUIZZES, id), &body)?,
        None => c.client.post(endpoints::QUIZZES, &body)?,
    };
    let item = apply_saved(&c.client, &mut c.store.quizzes, &resp, endpoints::QUIZZES, KEYS)?;
    Ok(saved_result(item, &c.store.quizzes))
}

fn handle_delete(state: &mut AppState, req: &Request) -> HandlerResult {
    let quiz_id = required_str(req, "quizId")?;
    let mut c = ctx(state)?;
    c.client
        .delete(&endpoints::item(endpoints::QUIZZES, quiz_id))?;
    let removed = c.store.quizzes.remove(quiz_id).is_some();
    Ok(json!({ "removed": removed, "items": c.store.quizzes.snapshot() }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "quizzes.list" => handle_list(state, req),
        "quizzes.forCourse" => handle_for_course(state, req),
        "quizzes.validate" => handle_validate(state, req),
        "quizzes.create" => handle_save(state, req, None),
        "quizzes.update" => {
            required_str(req, "quizId").and_then(|id| handle_save(state, req, Some(id)))
        }
        "quizzes.delete" => handle_delete(state, req),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
