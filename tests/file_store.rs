//! Boards backed by the on-disk store.

mod support;

use std::fs;
use std::thread;

use support::TestBoard;
use taskboard::error::Error;
use taskboard::model::{NewProject, NewTask};

#[test]
fn data_survives_reopen() {
    let dir = TestBoard::new();

    let (project, task) = {
        let board = dir.open();
        let project = board
            .projects()
            .create(NewProject::new("Alpha").with_description("first"))
            .expect("create");
        let task = board
            .tasks()
            .create(&project.id, NewTask::new("A").due("2024-01-05T09:30:00Z"))
            .expect("create task");
        (project, task)
    };

    let board = dir.open();
    assert_eq!(board.projects().get(&project.id).expect("get"), Some(project.clone()));
    assert_eq!(
        board.tasks().get(&project.id, &task.id).expect("get"),
        Some(task)
    );
}

#[test]
fn stored_documents_use_camel_case_fields() {
    let dir = TestBoard::new();
    let board = dir.open();
    let project = board.projects().create(NewProject::new("Alpha")).expect("create");
    board
        .tasks()
        .create(&project.id, NewTask::new("A").due("2024-01-05"))
        .expect("create task");

    let raw = fs::read_to_string(dir.key_file("tm_tasks")).expect("read");
    let mapping: serde_json::Value = serde_json::from_str(&raw).expect("json");
    let stored = &mapping[project.id.as_str()][0];
    assert_eq!(stored["dueDate"], "2024-01-05T00:00:00.000Z");
    assert!(stored["createdAt"].is_string());
    assert_eq!(stored["priority"], "Medium");
    assert_eq!(stored["status"], "Not Started");
}

#[test]
fn legacy_project_tasks_field_is_ignored() {
    let dir = TestBoard::new();
    fs::write(
        dir.key_file("tm_projects"),
        r#"[{"id":"p_1","name":"Old","description":"","tasks":[{"id":"x"}]}]"#,
    )
    .expect("write");

    let board = dir.open();
    let projects = board.projects().list().expect("list");
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0].name, "Old");
}

#[test]
fn corrupt_tasks_document_is_not_overwritten() {
    let dir = TestBoard::new();
    fs::write(dir.key_file("tm_tasks"), "[oops").expect("write");

    let board = dir.open();
    let err = board
        .tasks()
        .create("p_1", NewTask::new("A"))
        .expect_err("corrupt store");
    assert!(matches!(err, Error::Decode { ref key, .. } if key == "tm_tasks"));

    let raw = fs::read_to_string(dir.key_file("tm_tasks")).expect("read");
    assert_eq!(raw, "[oops");
}

#[test]
fn concurrent_writers_lose_no_tasks() {
    let dir = TestBoard::new();
    let writers = 4;
    let per_writer = 10;

    thread::scope(|scope| {
        for writer in 0..writers {
            let board = dir.open();
            scope.spawn(move || {
                for i in 0..per_writer {
                    board
                        .tasks()
                        .create("p_shared", NewTask::new(format!("w{writer} #{i}")))
                        .expect("create");
                }
            });
        }
    });

    let board = dir.open();
    assert_eq!(
        board.tasks().count_tasks("p_shared").expect("count"),
        writers * per_writer
    );

    let leftovers: Vec<_> = fs::read_dir(dir.path())
        .expect("read dir")
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_string_lossy().contains(".tmp."))
        .collect();
    assert!(leftovers.is_empty());
}
