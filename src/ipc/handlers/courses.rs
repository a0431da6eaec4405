use crate::api::{decode_entity, endpoints};
use crate::ipc::helpers::{
    apply_saved, ctx, refresh, required_str, respond, saved_result, validation_err,
    HandlerErr, HandlerResult,
};
use crate::ipc::types::{AppState, Request};
use crate::models::Course;
use crate::upload::{self, CourseDraft};
use serde_json::json;

const KEYS: &[&str] = &["courses", "course"];

fn handle_list(state: &mut AppState, _req: &Request) -> HandlerResult {
    let mut c = ctx(state)?;
    let courses = refresh(&c.client, &mut c.store.courses, endpoints::COURSES, KEYS)?;
    Ok(json!({ "courses": courses }))
}

fn handle_get(state: &mut AppState, req: &Request) -> HandlerResult {
    let course_id = required_str(req, "courseId")?;
    let mut c = ctx(state)?;
    let resp = c.client.get(&endpoints::item(endpoints::COURSES, course_id))?;
    let course: Course = decode_entity(&resp, KEYS)
        .ok_or_else(|| HandlerErr::new("bad_response", "course response carries no course"))?;
    c.store.courses.upsert(course.clone());
    Ok(json!({
        "course": course,
        "videoCount": course.video_count(),
        "totalDuration": course.total_duration(),
    }))
}

fn draft_param(req: &Request) -> Result<CourseDraft, HandlerErr> {
    let draft = req
        .params
        .get("draft")
        .cloned()
        .ok_or_else(|| HandlerErr::bad_params("missing draft"))?;
    serde_json::from_value(draft).map_err(|e| HandlerErr::bad_params(e.to_string()))
}

fn handle_save(state: &mut AppState, req: &Request, course_id: Option<&str>) -> HandlerResult {
    let draft = draft_param(req)?;
    let issues = upload::validate_course(&draft);
    if !issues.is_empty() {
        return Err(validation_err(issues));
    }
    let built = upload::build_course_form(&draft)?;
    let summary = upload::upload_summary(&built);

    let mut c = ctx(state)?;
    let resp = match course_id {
        Some(id) => c
            .client
            .put_multipart(&endpoints::item(endpoints::COURSES, id), built.form)?,
        None => c.client.post_multipart(endpoints::COURSES, built.form)?,
    };
    let item = apply_saved(&c.client, &mut c.store.courses, &resp, endpoints::COURSES, KEYS)?;
    let mut out = saved_result(item, &c.store.courses);
    out["upload"] = summary;
    Ok(out)
}

fn handle_delete(state: &mut AppState, req: &Request) -> HandlerResult {
    let course_id = required_str(req, "courseId")?;
    let mut c = ctx(state)?;
    c.client
        .delete(&endpoints::item(endpoints::COURSES, course_id))?;
    let removed = c.store.courses.remove(course_id).is_some();
    Ok(json!({ "removed": removed, "items": c.store.courses.snapshot() }))
}

fn handle_review(state: &mut AppState, req: &Request, action: &str) -> HandlerResult {
    let course_id = required_str(req, "courseId")?;
    let mut c = ctx(state)?;
    let resp = c.client.put(
        &endpoints::action(endpoints::COURSES, course_id, action),
        &json!({}),
    )?;
    let status = if action == endpoints::ACCEPT {
        "accepted"
    } else {
        "refused"
    };
    match decode_entity::<Course>(&resp, KEYS) {
        Some(course) => c.store.courses.upsert(course),
        None => {
            c.store.courses.update_with(course_id, |course| {
                course.status = Some(status.to_string());
            });
        }
    }
    Ok(json!({
        "course": c.store.courses.get(course_id),
        "status": status,
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "courses.list" => handle_list(state, req),
        "courses.get" => handle_get(state, req),
        "courses.create" => handle_save(state, req, None),
        "courses.update" => {
            required_str(req, "courseId").and_then(|id| handle_save(state, req, Some(id)))
        }
        "courses.delete" => handle_delete(state, req),
        "courses.accept" => handle_review(state, req, endpoints::ACCEPT),
        "courses.refuse" => handle_review(state, req, endpoints::REFUSE),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
