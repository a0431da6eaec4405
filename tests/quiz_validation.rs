mod test_support;

use elearnd::api::{Body, Method};
use serde_json::json;
use test_support::{
    call, call_ok, error_code, quiz_draft, request_ok, scripted_state, spawn_sidecar_with_env,
    Reply,
};

fn issue_paths(resp: &serde_json::Value) -> Vec<String> {
    resp["error"]["details"]["issues"]
        .as_array()
        .expect("issues")
        .iter()
        .filter_map(|i| i.get("path").and_then(|p| p.as_str()).map(str::to_string))
        .collect()
}

#[test]
fn exactly_twenty_complete_questions_are_accepted() {
    let (mut state, _t) = scripted_state();
    let result = call_ok(&mut state, "1", "quizzes.validate", json!({ "draft": quiz_draft(20) }));
    assert_eq!(result["valid"], true);
    assert_eq!(result["questionCount"], 20);
}

#[test]
fn wrong_question_counts_are_rejected() {
    let (mut state, _t) = scripted_state();
    for count in [0, 19, 21] {
        let result = call_ok(
            &mut state,
            "1",
            "quizzes.validate",
            json!({ "draft": quiz_draft(count) }),
        );
        assert_eq!(result["valid"], false, "count {count} accepted");
        let paths: Vec<&str> = result["issues"]
            .as_array()
            .expect("issues")
            .iter()
            .filter_map(|i| i["path"].as_str())
            .collect();
        assert!(paths.contains(&"questions"));
    }
}

#[test]
fn blank_prompts_and_missing_options_are_reported_per_question() {
    let (mut state, _t) = scripted_state();
    let mut draft = quiz_draft(20);
    draft["questions"][3]["question"] = json!("   ");
    draft["questions"][7]["options"] = json!(["Ownership", ""]);
    draft["questions"][9]["options"] = json!(["Ownership"]);

    let result = call_ok(&mut state, "1", "quizzes.validate", json!({ "draft": draft }));
    assert_eq!(result["valid"], false);
    let paths: Vec<&str> = result["issues"]
        .as_array()
        .expect("issues")
        .iter()
        .filter_map(|i| i["path"].as_str())
        .collect();
    assert!(paths.contains(&"questions.3.question"));
    assert!(paths.contains(&"questions.7.options"));
    assert!(paths.contains(&"questions.9.options"));
    assert!(!paths.contains(&"questions"));
}

#[test]
fn extra_blank_option_still_leaves_two_filled() {
    let (mut state, _t) = scripted_state();
    let mut draft = quiz_draft(20);
    draft["questions"][0]["options"] = json!(["Ownership", "", "Borrowing"]);
    let result = call_ok(&mut state, "1", "quizzes.validate", json!({ "draft": draft }));
    assert_eq!(result["valid"], true, "{result}");
}

#[test]
fn invalid_quiz_is_never_submitted() {
    let (mut state, t) = scripted_state();
    t.route(Method::Post, "/quiz", Reply::Json(201, json!({ "_id": "q1" })));

    let resp = call(&mut state, "1", "quizzes.create", json!({ "draft": quiz_draft(12) }));
    assert_eq!(error_code(&resp), Some("validation_failed"));
    assert!(issue_paths(&resp).contains(&"questions".to_string()));
    assert!(t.requests().is_empty());
}

#[test]
fn valid_quiz_is_sent_normalized_and_mirrored() {
    let (mut state, t) = scripted_state();
    let mut draft = quiz_draft(20);
    draft["questions"][0]["options"] = json!([" Ownership ", "", "Borrowing"]);
    t.route(
        Method::Post,
        "/quiz",
        Reply::Json(
            201,
            json!({ "quiz": { "_id": "q1", "course": "course-1", "duration": 30, "questions": [] } }),
        ),
    );

    let result = call_ok(&mut state, "1", "quizzes.create", json!({ "draft": draft }));
    assert_eq!(result["item"]["_id"], "q1");
    assert_eq!(result["items"].as_array().map(|a| a.len()), Some(1));

    let sent = t.last(Method::Post, "/quiz").expect("quiz posted");
    let Body::Json(body) = sent.body else {
        panic!("quiz must be sent as JSON");
    };
    assert_eq!(body["questions"].as_array().map(|a| a.len()), Some(20));
    assert_eq!(body["questions"][0]["options"], json!(["Ownership", "Borrowing"]));
}

#[test]
fn configured_question_count_drives_validation() {
    let (mut state, _t) = scripted_state();
    call_ok(
        &mut state,
        "1",
        "config.set",
        json!({ "patch": { "quizQuestionCount": 5 } }),
    );
    let result = call_ok(&mut state, "2", "quizzes.validate", json!({ "draft": quiz_draft(5) }));
    assert_eq!(result["valid"], true);
    let result = call_ok(&mut state, "3", "quizzes.validate", json!({ "draft": quiz_draft(20) }));
    assert_eq!(result["valid"], false);
}

#[test]
fn answer_outside_the_options_is_rejected() {
    let (mut state, _t) = scripted_state();
    let mut draft = quiz_draft(20);
    draft["questions"][4]["correctAnswer"] = json!("Borrow checker");

    let out = call_ok(&mut state, "1", "quizzes.validate", json!({ "draft": draft }));
    assert_eq!(out["valid"], false);
    let issues = out["issues"].as_array().expect("issues");
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0]["path"], "questions.4.correctAnswer");
}

#[test]
fn out_of_range_question_count_from_env_is_ignored() {
    for raw in ["0", "201"] {
        let (mut child, mut stdin, mut reader) =
            spawn_sidecar_with_env(&[("ELEARND_QUIZ_QUESTIONS", raw)]);

        let cfg = request_ok(&mut stdin, &mut reader, "1", "config.get", json!({}));
        assert_eq!(cfg["config"]["quizQuestionCount"], 20, "for {raw}");

        let empty = json!({ "course": "course-1", "duration": 30, "questions": [] });
        let out = request_ok(
            &mut stdin,
            &mut reader,
            "2",
            "quizzes.validate",
            json!({ "draft": empty }),
        );
        assert_eq!(out["valid"], false, "for {raw}");

        drop(stdin);
        let _ = child.wait();
    }

    let (mut child, mut stdin, mut reader) =
        spawn_sidecar_with_env(&[("ELEARND_QUIZ_QUESTIONS", "5")]);
    let cfg = request_ok(&mut stdin, &mut reader, "1", "config.get", json!({}));
    assert_eq!(cfg["config"]["quizQuestionCount"], 5);
    drop(stdin);
    let _ = child.wait();
}
