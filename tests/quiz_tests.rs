mod common;

use common::{location, TestApp};

/// Basics chapter plus a test over all three cards
fn quiz_app() -> TestApp {
  let app = TestApp::new();
  let (_, ids) = app.basics();
  app.test("Basics check", "basics-check", &ids, 3);
  app
}

#[tokio::test]
async fn test_summary_links_to_tests() {
  let mut app = quiz_app();

  let summary = app.get("/capitulos/basics/finished/").await;
  summary.assert_text_contains("Basics check");
  summary.assert_text_contains("/capitulos/basics/?show_test=basics-check");
}

#[tokio::test]
async fn test_show_test_renders_questions() {
  let mut app = quiz_app();

  let page = app.get("/capitulos/basics/?show_test=basics-check").await;
  page.assert_status_ok();
  page.assert_text_contains("meaning of apple");
  page.assert_text_contains("meaning of cat");
  page.assert_text_contains(r#"name="answer_2""#);
  page.assert_text_contains(r#"action="/capitulos/basics/quiz/""#);
}

#[tokio::test]
async fn test_all_correct_answers_pass() {
  let mut app = quiz_app();

  let result = app
    .post(
      "/capitulos/basics/quiz/",
      &[
        ("test", "basics-check"),
        ("answer_0", "Apple"),
        ("answer_1", "  book "),
        ("answer_2", "CAT"),
      ],
    )
    .await;
  result.assert_status_ok();
  result.assert_text_contains("3 / 3 correct");
  result.assert_text_contains("passed!");
}

#[tokio::test]
async fn test_one_wrong_answer_fails() {
  let mut app = quiz_app();

  let result = app
    .post(
      "/capitulos/basics/quiz/",
      &[
        ("test", "basics-check"),
        ("answer_0", "apple"),
        ("answer_1", "bok"),
        ("answer_2", "cat"),
      ],
    )
    .await;
  result.assert_status_ok();
  result.assert_text_contains("2 / 3 correct");
  result.assert_text_contains("not passed yet");
  result.assert_text_contains("Expected: <strong>book</strong>");
}

#[tokio::test]
async fn test_only_num_questions_are_asked() {
  let mut app = TestApp::new();
  let (_, ids) = app.basics();
  app.test("Short check", "short-check", &ids, 2);

  let page = app.get("/capitulos/basics/?show_test=short-check").await;
  page.assert_text_contains(r#"name="answer_1""#);
  assert!(!page.text().contains(r#"name="answer_2""#));

  let result = app
    .post(
      "/capitulos/basics/quiz/",
      &[("test", "short-check"), ("answer_0", "apple"), ("answer_1", "book")],
    )
    .await;
  result.assert_text_contains("2 / 2 correct");
}

#[tokio::test]
async fn test_unknown_test_falls_back_to_chapter() {
  let mut app = quiz_app();

  let response = app.get("/capitulos/basics/?show_test=missing").await;
  assert_eq!(location(&response), "/capitulos/basics/");

  let submit = app
    .post("/capitulos/basics/quiz/", &[("test", "missing"), ("answer_0", "apple")])
    .await;
  assert_eq!(location(&submit), "/capitulos/basics/");
}

#[tokio::test]
async fn test_test_without_questions_falls_back() {
  let mut app = TestApp::new();
  app.basics();
  app.test("Empty check", "empty-check", &[], 3);

  let response = app.get("/capitulos/basics/?show_test=empty-check").await;
  assert_eq!(location(&response), "/capitulos/basics/");
}

#[tokio::test]
async fn test_quiz_disabled_falls_back() {
  let mut app = TestApp::with_quiz(false);
  let (_, ids) = app.basics();
  app.test("Basics check", "basics-check", &ids, 3);

  let response = app.get("/capitulos/basics/?show_test=basics-check").await;
  assert_eq!(location(&response), "/capitulos/basics/");

  let summary = app.get("/capitulos/basics/finished/").await;
  assert!(!summary.text().contains("show_test"));
}
