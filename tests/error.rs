use std::path::PathBuf;

use taskboard::error::{exit_codes, Error};

#[test]
fn exit_codes_map_correctly() {
    let user = Error::InvalidArgument("bad".to_string());
    assert_eq!(user.exit_code(), exit_codes::USER_ERROR);

    assert_eq!(Error::NotAuthenticated.exit_code(), exit_codes::USER_ERROR);
    assert_eq!(
        Error::ProjectNotFound("p_x".to_string()).exit_code(),
        exit_codes::USER_ERROR
    );

    let lock = Error::LockFailed(PathBuf::from("tm_tasks.json.lock"));
    assert_eq!(lock.exit_code(), exit_codes::OPERATION_FAILED);

    let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let decode = Error::Decode {
        key: "tm_tasks".to_string(),
        source,
    };
    assert_eq!(decode.exit_code(), exit_codes::OPERATION_FAILED);
}

#[test]
fn not_found_errors_carry_ids() {
    let err = Error::TaskNotFound("t_1".to_string());
    assert!(err.to_string().contains("Task not found"));
    assert_eq!(err.details().expect("details")["task_id"], "t_1");

    let err = Error::ProjectNotFound("p_1".to_string());
    assert_eq!(err.details().expect("details")["project_id"], "p_1");

    assert!(Error::NotAuthenticated.details().is_none());
}

#[test]
fn decode_error_names_key() {
    let source = serde_json::from_str::<serde_json::Value>("[1,").unwrap_err();
    let err = Error::Decode {
        key: "tm_projects".to_string(),
        source,
    };
    assert!(err.to_string().contains("tm_projects"));
    let details = err.details().expect("details");
    assert_eq!(details["key"], "tm_projects");
}
