//! Controller scenarios against a mock task server.

use serde_json::{json, Value};
use taskboard::controller::{MOVE_FAILED_MESSAGE, RECOVERY_FAILED_MESSAGE};
use taskboard::{
    ApiClient, BoardController, BoardError, DragPosition, DragResult, Severity, TaskForm,
    TaskStatus,
};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn task_json(id: &str, status: &str, order: f64) -> Value {
    json!({
        "id": id,
        "title": format!("Task {id}"),
        "description": null,
        "status": status,
        "order": order
    })
}

fn server_tasks() -> Value {
    json!([
        task_json("m", "To Do", 1.0),
        task_json("s", "To Do", 2.0),
        task_json("p", "In Progress", 1.0),
    ])
}

async fn loaded_controller(mock_server: &MockServer) -> BoardController<ApiClient> {
    let mut controller = BoardController::new(ApiClient::new(format!("{}/api", mock_server.uri())));
    controller.load().await.unwrap();
    controller
}

fn column(controller: &BoardController<ApiClient>, status: TaskStatus) -> Vec<(String, i64)> {
    controller
        .board()
        .column(&status)
        .unwrap()
        .tasks
        .iter()
        .map(|t| (t.id.clone(), t.order))
        .collect()
}

#[tokio::test]
async fn test_cross_column_move_is_persisted() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(server_tasks()))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/api/tasks/m/move"))
        .and(body_json(json!({"status": "In Progress", "order": 1})))
        .respond_with(ResponseTemplate::new(200).set_body_json(task_json("m", "In Progress", 1.0)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut controller = loaded_controller(&mock_server).await;
    controller
        .on_drag_end(DragResult {
            task_id: "m".to_string(),
            source: DragPosition::new(TaskStatus::ToDo, 0),
            destination: Some(DragPosition::new(TaskStatus::InProgress, 0)),
        })
        .await
        .unwrap();

    assert_eq!(column(&controller, TaskStatus::ToDo), [("s".to_string(), 1)]);
    assert_eq!(
        column(&controller, TaskStatus::InProgress),
        [("m".to_string(), 1), ("p".to_string(), 2)]
    );
}

#[tokio::test]
async fn test_failed_move_restores_server_state() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(server_tasks()))
        .expect(2)
        .mount(&mock_server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/api/tasks/m/move"))
        .respond_with(ResponseTemplate::new(500).set_body_string("database locked"))
        .mount(&mock_server)
        .await;

    let mut controller = loaded_controller(&mock_server).await;
    let before = controller.board().clone();

    let err = controller
        .on_drag_end(DragResult {
            task_id: "m".to_string(),
            source: DragPosition::new(TaskStatus::ToDo, 0),
            destination: Some(DragPosition::new(TaskStatus::InProgress, 0)),
        })
        .await
        .unwrap_err();

    match err {
        BoardError::Transport(e) => {
            assert_eq!(e.status(), Some(500));
            assert_eq!(e.body(), Some("database locked"));
        }
        other => panic!("Expected transport error, got {other:?}"),
    }
    assert_eq!(controller.board(), &before);
    assert_eq!(controller.current_alert().unwrap().message, MOVE_FAILED_MESSAGE);
}

#[tokio::test]
async fn test_failed_recovery_is_critical() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(server_tasks()))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/tasks/p"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let mut controller = loaded_controller(&mock_server).await;
    let err = controller.delete_task("p").await.unwrap_err();

    assert!(matches!(err, BoardError::RecoveryFailed { .. }));
    controller.dismiss_alert();
    let alert = controller.current_alert().unwrap();
    assert_eq!(alert.severity, Severity::Critical);
    assert_eq!(alert.message, RECOVERY_FAILED_MESSAGE);
}

#[tokio::test]
async fn test_invalid_form_never_reaches_server() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/tasks"))
        .respond_with(ResponseTemplate::new(201).set_body_json(task_json("x", "To Do", 1.0)))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut controller = loaded_controller(&mock_server).await;
    let err = controller
        .create_task(&TaskForm::new("", ""), TaskStatus::ToDo)
        .await
        .unwrap_err();

    assert!(matches!(err, BoardError::Validation(_)));
}

#[tokio::test]
async fn test_unknown_status_is_dropped_on_load() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            task_json("a", "To Do", 1.0),
            task_json("b", "Archived", 1.0),
        ])))
        .mount(&mock_server)
        .await;

    let controller = loaded_controller(&mock_server).await;

    assert_eq!(controller.board().columns.task_count(), 1);
    assert!(controller.board().find_task("b").is_none());
}
