#![allow(dead_code)]

use std::process::{Command, Output};

use jiff::Timestamp;
use tempfile::TempDir;

use civicsync::types::{Issue, IssueCategory, IssueStatus};

/// Runs the `civicsync` binary in an isolated temp directory with no
/// credentials in the environment.
pub struct CivicTest {
    pub temp_dir: TempDir,
}

impl CivicTest {
    pub fn new() -> Self {
        CivicTest {
            temp_dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    pub fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_civicsync"))
            .args(args)
            .current_dir(self.temp_dir.path())
            .env("CIVICSYNC_ROOT", self.temp_dir.path().join(".civicsync"))
            .env_remove("CIVICSYNC_BACKEND_URL")
            .env_remove("CIVICSYNC_API_KEY")
            .env_remove("CIVICSYNC_ACCESS_TOKEN")
            .env_remove("CIVICSYNC_USER_ID")
            .env_remove("MAPBOX_TOKEN")
            .env_remove("CIVICSYNC_LOG")
            .output()
            .expect("Failed to execute civicsync command")
    }

    pub fn run_success(&self, args: &[&str]) -> String {
        let output = self.run(args);
        if !output.status.success() {
            panic!(
                "Command {:?} failed with status {:?}\nstdout: {}\nstderr: {}",
                args,
                output.status,
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr)
            );
        }
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    pub fn run_failure(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            !output.status.success(),
            "Command {:?} should have failed\nstdout: {}",
            args,
            String::from_utf8_lossy(&output.stdout)
        );
        String::from_utf8_lossy(&output.stderr).to_string()
    }

    pub fn run_json(&self, args: &[&str]) -> serde_json::Value {
        let mut full = vec!["--json"];
        full.extend_from_slice(args);
        let stdout = self.run_success(&full);
        serde_json::from_str(&stdout).expect("stdout should be JSON")
    }
}

/// An issue with sensible defaults, created at the Unix epoch.
pub fn issue(id: &str, title: &str, category: IssueCategory, status: IssueStatus) -> Issue {
    Issue {
        id: id.to_string(),
        title: title.to_string(),
        description: "Reported by a resident of the neighborhood".to_string(),
        category,
        location: "Somewhere in town".to_string(),
        status,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
        user_id: "owner".to_string(),
        image_url: None,
        votes: 0,
        latitude: None,
        longitude: None,
    }
}

fn at_minute(minute: i64) -> Timestamp {
    Timestamp::from_second(1_790_000_000 + minute * 60).expect("valid timestamp")
}

/// Six issues: three pending, two in progress, one resolved. Only one
/// title mentions a pothole.
pub fn six_issues() -> Vec<Issue> {
    let specs = [
        ("1", "Pothole on Main Street", IssueCategory::Road, IssueStatus::Pending, 4, "Main Street", Some((40.7142, -74.0059))),
        ("2", "Water leak near library", IssueCategory::Water, IssueStatus::InProgress, 12, "Elm Street", Some((40.7306, -73.9866))),
        ("3", "Overflowing bins", IssueCategory::Sanitation, IssueStatus::Pending, 1, "Riverside Park", None),
        ("4", "Street light out", IssueCategory::Electricity, IssueStatus::Resolved, 12, "Pine Street", Some((40.7075, -74.0113))),
        ("5", "Graffiti on underpass", IssueCategory::Other, IssueStatus::InProgress, 0, "Harbor Road", Some((40.7010, -74.0150))),
        ("6", "Cracked sidewalk", IssueCategory::Road, IssueStatus::Pending, 7, "Oak Avenue", Some((40.7484, -73.9857))),
    ];
    specs
        .into_iter()
        .enumerate()
        .map(|(i, (id, title, category, status, votes, location, position))| {
            let mut issue = issue(id, title, category, status);
            issue.votes = votes;
            issue.location = location.to_string();
            issue.created_at = at_minute(i as i64);
            issue.updated_at = issue.created_at;
            issue.latitude = position.map(|p: (f64, f64)| p.0);
            issue.longitude = position.map(|p: (f64, f64)| p.1);
            issue
        })
        .collect()
}

pub fn ids(issues: &[Issue]) -> String {
    issues
        .iter()
        .map(|i| i.id.as_str())
        .collect::<Vec<_>>()
        .join(",")
}
