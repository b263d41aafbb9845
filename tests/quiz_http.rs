mod common;

use axum::http::{Method, StatusCode};
use axum::Router;

use common::app::spawn_test_server;
use common::auth::{auth_header, register_and_get_token};
use common::http::{assert_json_error, request, response_json};

async fn create_book_with_words(
    app: &Router,
    token: &str,
    title: &str,
    words: &[(&str, &str)],
) -> String {
    let response = request(
        app,
        Method::POST,
        "/api/books",
        Some(serde_json::json!({"title": title})),
        &[("authorization", auth_header(token))],
    )
    .await;
    let (status, _, body) = response_json(response).await;
    assert_eq!(status, StatusCode::CREATED, "create book failed: {body}");
    let book_id = body["data"]["id"].as_str().unwrap().to_string();

    for (eng, kor) in words {
        let response = request(
            app,
            Method::POST,
            &format!("/api/books/{book_id}/words"),
            Some(serde_json::json!({"eng": eng, "kor": kor})),
            &[("authorization", auth_header(token))],
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    book_id
}

async fn start_quiz(
    app: &Router,
    token: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let response = request(
        app,
        Method::POST,
        "/api/quiz",
        Some(body),
        &[("authorization", auth_header(token))],
    )
    .await;
    let (status, _, body) = response_json(response).await;
    (status, body)
}

async fn answer(app: &Router, token: &str, text: &str) -> (StatusCode, serde_json::Value) {
    let response = request(
        app,
        Method::POST,
        "/api/quiz/answer",
        Some(serde_json::json!({"answer": text})),
        &[("authorization", auth_header(token))],
    )
    .await;
    let (status, _, body) = response_json(response).await;
    (status, body)
}

#[tokio::test]
async fn it_quiz_empty_selection_is_rejected() {
    let app = spawn_test_server().await;
    let token = register_and_get_token(&app.app).await;

    let (status, body) = start_quiz(
        &app.app,
        &token,
        serde_json::json!({"bookIds": [], "direction": "engToKor"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_json_error(&body, "QUIZ_EMPTY_SELECTION");

    let empty_book =
        create_book_with_words(&app.app, &token, "Empty", &[]).await;
    let (status, body) = start_quiz(
        &app.app,
        &token,
        serde_json::json!({"bookIds": [empty_book], "direction": "engToKor"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_json_error(&body, "QUIZ_EMPTY_SELECTION");
}

#[tokio::test]
async fn it_quiz_eng_to_kor_question_carries_speech_hint() {
    let app = spawn_test_server().await;
    let token = register_and_get_token(&app.app).await;
    let book_id =
        create_book_with_words(&app.app, &token, "Animals", &[("cat", "고양이")]).await;

    let (status, body) = start_quiz(
        &app.app,
        &token,
        serde_json::json!({"bookIds": [book_id], "direction": "engToKor"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let question = &body["data"]["question"];
    assert_eq!(question["index"], 0);
    assert_eq!(question["total"], 1);
    assert_eq!(question["prompt"], "cat");
    assert_eq!(question["speech"]["text"], "cat");
    assert_eq!(question["speech"]["lang"], "en-US");
    assert!((question["speech"]["rate"].as_f64().unwrap() - 0.8).abs() < 1e-6);
}

#[tokio::test]
async fn it_quiz_kor_to_eng_has_no_speech() {
    let app = spawn_test_server().await;
    let token = register_and_get_token(&app.app).await;
    let book_id =
        create_book_with_words(&app.app, &token, "Animals", &[("cat", "고양이")]).await;

    let (status, body) = start_quiz(
        &app.app,
        &token,
        serde_json::json!({"bookIds": [book_id], "direction": "korToEng"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let question = &body["data"]["question"];
    assert_eq!(question["prompt"], "고양이");
    assert!(question.get("speech").is_none());
}

#[tokio::test]
async fn it_quiz_count_truncates_the_pool() {
    let app = spawn_test_server().await;
    let token = register_and_get_token(&app.app).await;
    let book_id = create_book_with_words(
        &app.app,
        &token,
        "Animals",
        &[("cat", "고양이"), ("dog", "개"), ("bird", "새")],
    )
    .await;

    let (status, body) = start_quiz(
        &app.app,
        &token,
        serde_json::json!({"bookIds": [book_id], "direction": "engToKor", "count": 2}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["question"]["total"], 2);
}

#[tokio::test]
async fn it_quiz_duplicate_book_ids_count_words_once() {
    let app = spawn_test_server().await;
    let token = register_and_get_token(&app.app).await;
    let book_id = create_book_with_words(
        &app.app,
        &token,
        "Animals",
        &[("cat", "고양이"), ("dog", "개")],
    )
    .await;

    let (status, body) = start_quiz(
        &app.app,
        &token,
        serde_json::json!({
            "bookIds": [book_id.clone(), book_id],
            "direction": "engToKor",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["question"]["total"], 2);
}

#[tokio::test]
async fn it_quiz_correct_answer_finishes_single_word_session() {
    let app = spawn_test_server().await;
    let token = register_and_get_token(&app.app).await;
    let book_id =
        create_book_with_words(&app.app, &token, "Animals", &[("cat", "고양이")]).await;

    start_quiz(
        &app.app,
        &token,
        serde_json::json!({"bookIds": [book_id], "direction": "engToKor"}),
    )
    .await;

    // Normalization: stray whitespace around the answer is fine.
    let (status, body) = answer(&app.app, &token, "  고양이  ").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["result"], "correct");
    assert_eq!(body["data"]["finished"], true);

    let (status, body) = answer(&app.app, &token, "anything").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_json_error(&body, "QUIZ_FINISHED");

    let current = request(
        &app.app,
        Method::GET,
        "/api/quiz",
        None,
        &[("authorization", auth_header(&token))],
    )
    .await;
    let (status, _, body) = response_json(current).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["finished"], true);
    assert!(body["data"]["question"].is_null());
}

#[tokio::test]
async fn it_quiz_alternative_answers_are_accepted() {
    let app = spawn_test_server().await;
    let token = register_and_get_token(&app.app).await;
    let book_id = create_book_with_words(
        &app.app,
        &token,
        "Verbs",
        &[("run", "달리다, 뛰다 / 운영하다")],
    )
    .await;

    start_quiz(
        &app.app,
        &token,
        serde_json::json!({"bookIds": [book_id], "direction": "engToKor"}),
    )
    .await;

    let (status, body) = answer(&app.app, &token, "운영하다").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["result"], "correct");
}

#[tokio::test]
async fn it_quiz_wrong_answer_keeps_question_and_records_wrong_note() {
    let app = spawn_test_server().await;
    let token = register_and_get_token(&app.app).await;
    let book_id =
        create_book_with_words(&app.app, &token, "Animals", &[("dog", "개")]).await;

    start_quiz(
        &app.app,
        &token,
        serde_json::json!({"bookIds": [book_id], "direction": "engToKor"}),
    )
    .await;

    let (status, body) = answer(&app.app, &token, "고양이").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["result"], "incorrect");
    assert_eq!(body["data"]["expected"], "개");
    assert_eq!(body["data"]["question"]["prompt"], "dog");

    // The missed word landed in the reserved wrong-note book.
    let listing = request(
        &app.app,
        Method::GET,
        "/api/books",
        None,
        &[("authorization", auth_header(&token))],
    )
    .await;
    let (_, _, body) = response_json(listing).await;
    let books = body["data"].as_array().unwrap();
    let wrong_note = books
        .iter()
        .find(|b| b["kind"] == "wrongNote")
        .expect("wrong-note book created");
    assert_eq!(wrong_note["title"], "오답노트 ⭐️");
    assert_eq!(wrong_note["wordCount"], 1);

    // A second miss of the same word does not duplicate the entry.
    let (_, body) = answer(&app.app, &token, "고양이 아님").await;
    assert_eq!(body["data"]["result"], "incorrect");

    let wrong_note_id = wrong_note["id"].as_str().unwrap();
    let words = app.state.store().list_book_words(wrong_note_id).unwrap();
    assert_eq!(words.len(), 1);
    assert_eq!(words[0].eng, "dog");

    // Still answerable: the session did not advance.
    let (status, body) = answer(&app.app, &token, "개").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["result"], "correct");
    assert_eq!(body["data"]["finished"], true);
}

#[tokio::test]
async fn it_quiz_requires_an_active_session() {
    let app = spawn_test_server().await;
    let token = register_and_get_token(&app.app).await;

    for (method, path, body) in [
        (Method::GET, "/api/quiz", None),
        (
            Method::POST,
            "/api/quiz/answer",
            Some(serde_json::json!({"answer": "x"})),
        ),
        (Method::DELETE, "/api/quiz", None),
    ] {
        let response = request(
            &app.app,
            method,
            path,
            body,
            &[("authorization", auth_header(&token))],
        )
        .await;
        let (status, _, _) = response_json(response).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}

#[tokio::test]
async fn it_quiz_abandon_drops_the_session() {
    let app = spawn_test_server().await;
    let token = register_and_get_token(&app.app).await;
    let book_id =
        create_book_with_words(&app.app, &token, "Animals", &[("cat", "고양이")]).await;

    start_quiz(
        &app.app,
        &token,
        serde_json::json!({"bookIds": [book_id], "direction": "engToKor"}),
    )
    .await;

    let abandon = request(
        &app.app,
        Method::DELETE,
        "/api/quiz",
        None,
        &[("authorization", auth_header(&token))],
    )
    .await;
    assert_eq!(abandon.status(), StatusCode::OK);

    let current = request(
        &app.app,
        Method::GET,
        "/api/quiz",
        None,
        &[("authorization", auth_header(&token))],
    )
    .await;
    assert_eq!(current.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn it_quiz_pool_is_a_snapshot() {
    let app = spawn_test_server().await;
    let token = register_and_get_token(&app.app).await;
    let book_id =
        create_book_with_words(&app.app, &token, "Animals", &[("cat", "고양이")]).await;

    start_quiz(
        &app.app,
        &token,
        serde_json::json!({"bookIds": [book_id.clone()], "direction": "engToKor"}),
    )
    .await;

    // Deleting the source book mid-quiz does not disturb the session.
    let delete = request(
        &app.app,
        Method::DELETE,
        &format!("/api/books/{book_id}"),
        None,
        &[("authorization", auth_header(&token))],
    )
    .await;
    assert_eq!(delete.status(), StatusCode::OK);

    let (status, body) = answer(&app.app, &token, "고양이").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["result"], "correct");
}

#[tokio::test]
async fn it_quiz_cannot_start_from_another_users_book() {
    let app = spawn_test_server().await;
    let owner = register_and_get_token(&app.app).await;
    let intruder = register_and_get_token(&app.app).await;

    let book_id =
        create_book_with_words(&app.app, &owner, "Private", &[("cat", "고양이")]).await;

    let (status, _) = start_quiz(
        &app.app,
        &intruder,
        serde_json::json!({"bookIds": [book_id], "direction": "engToKor"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
