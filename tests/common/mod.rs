#![allow(dead_code)]

use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

pub fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

pub struct Sidecar {
    child: Child,
    stdin: Option<ChildStdin>,
    reader: BufReader<ChildStdout>,
    next_id: u64,
}

impl Sidecar {
    pub fn spawn() -> Self {
        Self::spawn_with_env(&[])
    }

    pub fn spawn_with_env(envs: &[(&str, &str)]) -> Self {
        let exe = env!("CARGO_BIN_EXE_schoold");
        let mut cmd = Command::new(exe);
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .env_remove("SCHOOLD_WORKSPACE");
        for (k, v) in envs {
            cmd.env(k, v);
        }
        let mut child = cmd.spawn().expect("spawn schoold");
        let stdin = child.stdin.take().expect("child stdin");
        let stdout = child.stdout.take().expect("child stdout");
        Self {
            child,
            stdin: Some(stdin),
            reader: BufReader::new(stdout),
            next_id: 0,
        }
    }

    /// Spawns the sidecar and selects a fresh workspace.
    pub fn with_workspace(prefix: &str) -> (Self, PathBuf) {
        let workspace = temp_dir(prefix);
        let mut sidecar = Self::spawn();
        sidecar.select_workspace(&workspace);
        (sidecar, workspace)
    }

    pub fn select_workspace(&mut self, workspace: &Path) {
        self.request_ok(
            "workspace.select",
            json!({ "path": workspace.to_string_lossy() }),
        );
    }

    pub fn send_line(&mut self, line: &str) -> serde_json::Value {
        let stdin = self.stdin.as_mut().expect("stdin open");
        writeln!(stdin, "{}", line).expect("write request");
        stdin.flush().expect("flush request");

        let mut out = String::new();
        self.reader.read_line(&mut out).expect("read response line");
        assert!(!out.trim().is_empty(), "empty response for {}", line);
        serde_json::from_str(out.trim()).expect("parse response json")
    }

    pub fn request(&mut self, method: &str, params: serde_json::Value) -> serde_json::Value {
        self.next_id += 1;
        let id = self.next_id.to_string();
        let payload = json!({
            "id": id,
            "method": method,
            "params": params,
        });
        let value = self.send_line(&payload.to_string());
        assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id.as_str()));
        value
    }

    pub fn request_ok(&mut self, method: &str, params: serde_json::Value) -> serde_json::Value {
        let value = self.request(method, params);
        assert!(
            value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
            "{} failed: {}",
            method,
            value
                .get("error")
                .and_then(|e| e.get("message"))
                .and_then(|v| v.as_str())
                .unwrap_or("unknown error")
        );
        value.get("result").cloned().unwrap_or_else(|| json!({}))
    }

    /// Asserts the request failed and returns `(code, message)`.
    pub fn request_err(&mut self, method: &str, params: serde_json::Value) -> (String, String) {
        let value = self.request(method, params);
        assert_eq!(
            value.get("ok").and_then(|v| v.as_bool()),
            Some(false),
            "{} unexpectedly succeeded: {}",
            method,
            value
        );
        let error = value.get("error").cloned().unwrap_or_else(|| json!({}));
        (
            error
                .get("code")
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string(),
            error
                .get("message")
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string(),
        )
    }
}

impl Drop for Sidecar {
    fn drop(&mut self) {
        drop(self.stdin.take());
        let _ = self.child.wait();
    }
}

pub fn id_of(value: &serde_json::Value) -> i64 {
    value.get("id").and_then(|v| v.as_i64()).expect("integer id")
}

/// Creates a class owned by `teacher_id` and returns its id.
pub fn create_class(sidecar: &mut Sidecar, teacher_id: i64, name: &str) -> i64 {
    let res = sidecar.request_ok(
        "classes.create",
        json!({ "teacherId": teacher_id, "name": name }),
    );
    id_of(&res["class"])
}

/// Enrolls a new student and returns its student id.
pub fn add_student(
    sidecar: &mut Sidecar,
    teacher_id: i64,
    class_id: i64,
    first: &str,
    last: &str,
) -> i64 {
    let res = sidecar.request_ok(
        "students.add",
        json!({
            "teacherId": teacher_id,
            "classId": class_id,
            "firstName": first,
            "lastName": last
        }),
    );
    res["overlay"]["enrollments"]
        .as_array()
        .expect("enrollments")
        .iter()
        .find(|e| e["student"]["lastName"] == last && e["student"]["firstName"] == first)
        .and_then(|e| e["student"]["id"].as_i64())
        .expect("enrolled student")
}
