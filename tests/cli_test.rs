mod common;

use common::CivicTest;

#[test]
fn test_offline_browse_lists_sample_issues() {
    let civic = CivicTest::new();
    let stdout = civic.run_success(&["--offline", "browse"]);
    assert!(stdout.contains("Pothole on Main Street"), "{stdout}");
    assert!(stdout.contains("Cracked sidewalk by school"), "{stdout}");
}

#[test]
fn test_offline_browse_json_clamps_page() {
    let civic = CivicTest::new();
    let page = civic.run_json(&["--offline", "browse", "--page", "10"]);
    assert_eq!(page["page"], 1);
    assert_eq!(page["total_pages"], 1);
    assert_eq!(page["total_items"], 6);
    assert_eq!(page["items"].as_array().unwrap().len(), 6);
}

#[test]
fn test_offline_browse_filters_by_status() {
    let civic = CivicTest::new();
    let page = civic.run_json(&["--offline", "browse", "--status", "pending"]);
    let items = page["items"].as_array().unwrap();
    assert_eq!(items.len(), 3);
    assert!(items.iter().all(|i| i["status"] == "pending"));
}

#[test]
fn test_offline_map_json() {
    let civic = CivicTest::new();
    let map = civic.run_json(&["--offline", "map"]);
    let markers = map["markers"].as_array().unwrap();
    // The resolved street light is hidden by default.
    assert_eq!(markers.len(), 5);
    assert_eq!(map["reframed"], true);
    assert!(
        markers
            .iter()
            .any(|m| m["issue_id"] == "demo-5" && m["placed"] == false)
    );
}

#[test]
fn test_offline_map_single_category_feeds_list() {
    let civic = CivicTest::new();
    let map = civic.run_json(&["--offline", "map", "-c", "water", "--select", "demo-2"]);
    assert_eq!(map["list_category"], "water");
    assert_eq!(map["selected"], "demo-2");
    assert_eq!(map["reframed"], false);
}

#[test]
fn test_offline_vote() {
    let civic = CivicTest::new();
    let result = civic.run_json(&["--offline", "vote", "demo-1"]);
    assert_eq!(result["issue"]["votes"], 10);
    assert_eq!(result["milestone"], true);
}

#[test]
fn test_config_set_then_get() {
    let civic = CivicTest::new();
    civic.run_success(&["config", "set", "browse.page_size", "20"]);
    let stdout = civic.run_success(&["config", "get", "browse.page_size"]);
    assert_eq!(stdout.trim(), "20");

    civic.run_success(&["config", "set", "backend.api_key", "anon-secret"]);
    let value = civic.run_json(&["config", "get", "backend.api_key"]);
    assert_eq!(value["value"], "[REDACTED]");

    let config_file = civic.temp_dir.path().join(".civicsync").join("config.yaml");
    assert!(config_file.exists());
}

#[test]
fn test_config_rejects_unknown_key() {
    let civic = CivicTest::new();
    let stderr = civic.run_failure(&["config", "set", "backend.colour", "blue"]);
    assert!(stderr.contains("unknown config key"), "{stderr}");
}

#[test]
fn test_browse_without_backend_fails() {
    let civic = CivicTest::new();
    let stderr = civic.run_failure(&["browse"]);
    assert!(stderr.contains("no backend configured"), "{stderr}");
}

#[test]
fn test_unreachable_backend_suggests_offline() {
    let civic = CivicTest::new();
    civic.run_success(&["config", "set", "backend.url", "http://127.0.0.1:9"]);
    civic.run_success(&["config", "set", "backend.api_key", "anon-key"]);
    let stderr = civic.run_failure(&["browse"]);
    assert!(stderr.contains("--offline"), "{stderr}");
}

#[test]
fn test_offline_browse_empty_filter_message() {
    let civic = CivicTest::new();
    let stdout = civic.run_success(&["--offline", "browse", "--search", "no such thing anywhere"]);
    assert!(stdout.contains("No issues match these filters"), "{stdout}");
}

#[test]
fn test_geocode_without_token_fails() {
    let civic = CivicTest::new();
    let stderr = civic.run_failure(&["geocode", "Main Street"]);
    assert!(stderr.to_lowercase().contains("token"), "{stderr}");
}

#[test]
fn test_invalid_category_is_rejected_by_parser() {
    let civic = CivicTest::new();
    let stderr = civic.run_failure(&["--offline", "browse", "--category", "potholes"]);
    assert!(stderr.contains("Invalid category"), "{stderr}");
}
