#![allow(deprecated)] // TODO: migrate Command::cargo_bin to cargo_bin_cmd!

mod common;

use assert_cmd::Command;
use common::TestProject;
use predicates::prelude::*;

const SITE: &str = r#"
project "color-challenge"
bucket "color-challenge-website-bucket" {
    index-document "index.html"
}
upload { source "./www" }
"#;

fn siteflow(project: &TestProject) -> Command {
    let mut cmd = Command::cargo_bin("siteflow").unwrap();
    cmd.current_dir(project.path()).env_remove("SITEFLOW_CONFIG");
    cmd
}

fn website_project() -> TestProject {
    let project = TestProject::new();
    project.write_site_kdl(SITE);
    project.write_file("www/index.html", "<h1>colors</h1>");
    project.write_file("www/sub/b.png", "png");
    project
}

#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("siteflow").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("preview"))
        .stdout(predicate::str::contains("up"))
        .stdout(predicate::str::contains("destroy"))
        .stdout(predicate::str::contains("graph"));
}

#[test]
fn test_cli_version() {
    let mut cmd = Command::cargo_bin("siteflow").unwrap();
    cmd.arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("siteflow"));
}

#[test]
fn test_up_help() {
    let mut cmd = Command::cargo_bin("siteflow").unwrap();
    cmd.args(["up", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--yes"))
        .stdout(predicate::str::contains("--refresh"));
}

#[test]
fn test_graph_lists_objects() {
    let project = website_project();
    let output = siteflow(&project).arg("graph").assert().success();
    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();

    let graph: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(graph["stack"], "color-challenge");

    let keys: Vec<String> = graph["resources"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| format!("{}:{}", r["resource_type"].as_str().unwrap(), r["id"].as_str().unwrap()))
        .collect();
    assert!(keys.contains(&"s3-object:index.html".to_string()));
    assert!(keys.contains(&"s3-object:sub/b.png".to_string()));
    assert!(keys.contains(&"cloudfront-distribution:website-cdn".to_string()));
    assert_eq!(
        graph["exports"]["cdn_url"],
        "${cloudfront-distribution:website-cdn.domain_name}"
    );
}

#[test]
fn test_graph_to_file() {
    let project = website_project();
    siteflow(&project)
        .args(["graph", "--output", "graph.json"])
        .assert()
        .success();
    let written = std::fs::read_to_string(project.path().join("graph.json")).unwrap();
    assert!(written.contains("s3-bucket-policy"));
}

#[test]
fn test_validate_summary() {
    let project = website_project();
    siteflow(&project)
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("color-challenge-website-bucket"))
        .stdout(predicate::str::contains("Upload: 2 files"))
        .stdout(predicate::str::contains("sub/b.png (image/png)"));
}

#[test]
fn test_validate_rejects_bad_config() {
    let project = TestProject::new();
    project.write_site_kdl("cdn \"c\" {\n    max-ttl -5\n}\n");
    siteflow(&project)
        .arg("validate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("max-ttl"));
}

#[test]
fn test_explicit_config_flag() {
    let project = TestProject::new();
    project.write_file("conf/other.kdl", "project \"elsewhere\"\n");
    siteflow(&project)
        .args(["validate", "--config", "conf/other.kdl"])
        .assert()
        .success()
        .stdout(predicate::str::contains("elsewhere"));
}

#[test]
fn test_preview_counts_creates() {
    let project = website_project();
    siteflow(&project)
        .arg("preview")
        .assert()
        .success()
        .stdout(predicate::str::contains("6 to create"));
}

#[test]
fn test_preview_warns_on_missing_upload_dir() {
    let project = TestProject::new();
    project.write_site_kdl(SITE);
    siteflow(&project)
        .arg("preview")
        .assert()
        .success()
        .stdout(predicate::str::contains("upload skipped"))
        .stdout(predicate::str::contains("4 to create"));
}

#[test]
fn test_outputs_pending_before_up() {
    let project = website_project();
    siteflow(&project)
        .arg("outputs")
        .assert()
        .success()
        .stdout(predicate::str::contains("bucket_name"))
        .stdout(predicate::str::contains("(pending)"));
}

#[test]
fn test_up_without_yes_stops_at_plan() {
    let project = website_project();
    siteflow(&project)
        .arg("up")
        .assert()
        .success()
        .stdout(predicate::str::contains("--yes"));
    assert!(!project.path().join(".siteflow/state.json").exists());
}

#[test]
fn test_up_without_engine_fails() {
    let project = website_project();
    siteflow(&project)
        .args(["up", "--yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No engine configured"));
}

#[cfg(unix)]
#[test]
fn test_up_records_engine_state() {
    let project = TestProject::new();
    let engine = project.write_engine(
        r#"cat > /dev/null
cat <<'JSON'
{
  "succeeded": [],
  "failed": [],
  "realized": {
    "s3-bucket:color-challenge-website-bucket": {
      "id": "color-challenge-website-bucket-4f2a",
      "resource_type": "s3-bucket",
      "status": "ready",
      "attributes": {
        "arn": "arn:aws:s3:::color-challenge-website-bucket-4f2a",
        "website_endpoint": "color-challenge-website-bucket-4f2a.s3-website-us-east-1.amazonaws.com"
      },
      "created_at": "2024-05-01T00:00:00Z",
      "updated_at": "2024-05-01T00:00:00Z"
    },
    "cloudfront-distribution:website-cdn": {
      "id": "E2QWRUHAPOMQZL",
      "resource_type": "cloudfront-distribution",
      "status": "ready",
      "attributes": { "domain_name": "d111111abcdef8.cloudfront.net" },
      "created_at": "2024-05-01T00:00:00Z",
      "updated_at": "2024-05-01T00:00:00Z"
    }
  }
}
JSON"#,
    );
    project.write_site_kdl(&format!("{SITE}\nengine \"{}\"\n", engine.display()));

    siteflow(&project)
        .args(["up", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("color-challenge-website-bucket-4f2a"))
        .stdout(predicate::str::contains("d111111abcdef8.cloudfront.net"));

    assert!(project.path().join(".siteflow/state.json").exists());
    assert!(!project.path().join(".siteflow/lock.json").exists());

    siteflow(&project)
        .arg("outputs")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "color-challenge-website-bucket-4f2a.s3-website-us-east-1.amazonaws.com",
        ));

    // bucket and distribution are recorded with their inputs now
    siteflow(&project)
        .arg("preview")
        .assert()
        .success()
        .stdout(predicate::str::contains("2 to create"))
        .stdout(predicate::str::contains("2 unchanged"));
}

/// Bucket and distribution as an engine reports them
const RECORDED_STATE: &str = r#"{
  "version": 1,
  "updated_at": "2024-05-01T00:00:00Z",
  "resources": {
    "s3-bucket:color-challenge-website-bucket": {
      "id": "color-challenge-website-bucket-4f2a",
      "resource_type": "s3-bucket",
      "status": "ready",
      "attributes": {},
      "created_at": "2024-05-01T00:00:00Z",
      "updated_at": "2024-05-01T00:00:00Z"
    },
    "cloudfront-distribution:website-cdn": {
      "id": "E2QWRUHAPOMQZL",
      "resource_type": "cloudfront-distribution",
      "status": "ready",
      "attributes": { "domain_name": "d111111abcdef8.cloudfront.net" },
      "created_at": "2024-05-01T00:00:00Z",
      "updated_at": "2024-05-01T00:00:00Z"
    }
  }
}"#;

#[cfg(unix)]
fn project_with_engine(body: &str) -> TestProject {
    let project = TestProject::new();
    let engine = project.write_engine(body);
    project.write_site_kdl(&format!("{SITE}\nengine \"{}\"\n", engine.display()));
    project
}

#[cfg(unix)]
#[test]
fn test_destroy_without_yes_keeps_state() {
    let project = project_with_engine("echo unexpected >&2\nexit 1");
    project.write_state(RECORDED_STATE);

    siteflow(&project)
        .arg("destroy")
        .assert()
        .success()
        .stdout(predicate::str::contains("- s3-bucket:color-challenge-website-bucket"))
        .stdout(predicate::str::contains("2 to delete"))
        .stdout(predicate::str::contains("--yes"));

    let state = project.read_state();
    assert_eq!(state["resources"].as_object().unwrap().len(), 2);
}

#[cfg(unix)]
#[test]
fn test_destroy_with_yes_empties_state() {
    let project = project_with_engine(
        r#"case "$1" in
  apply)
    cat > /dev/null
    echo '{"succeeded":[{"action_id":"delete-cloudfront-distribution:website-cdn","success":true},{"action_id":"delete-s3-bucket:color-challenge-website-bucket","success":true}],"failed":[]}'
    ;;
  *) exit 1 ;;
esac"#,
    );
    project.write_state(RECORDED_STATE);

    siteflow(&project)
        .args(["destroy", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Site destroyed"));

    let state = project.read_state();
    assert!(state["resources"].as_object().unwrap().is_empty());
    assert!(!project.path().join(".siteflow/lock.json").exists());
}

#[cfg(unix)]
#[test]
fn test_destroy_reports_failed_deletions() {
    let project = project_with_engine(
        r#"cat > /dev/null
echo '{"succeeded":[{"action_id":"delete-cloudfront-distribution:website-cdn","success":true}],"failed":[{"action_id":"delete-s3-bucket:color-challenge-website-bucket","success":false,"error":"BucketNotEmpty"}]}'"#,
    );
    project.write_state(RECORDED_STATE);

    siteflow(&project)
        .args(["destroy", "--yes"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("BucketNotEmpty"));

    let state = project.read_state();
    let resources = state["resources"].as_object().unwrap();
    assert_eq!(resources.len(), 1);
    assert_eq!(
        resources["s3-bucket:color-challenge-website-bucket"]["status"],
        "error"
    );
}

#[cfg(unix)]
#[test]
fn test_preview_refresh_replaces_recorded_state() {
    let project = project_with_engine(&format!(
        "case \"$1\" in\n  state) cat <<'JSON'\n{RECORDED_STATE}\nJSON\n    ;;\n  *) exit 1 ;;\nesac"
    ));
    project.write_state(r#"{"version":1,"updated_at":"2024-01-01T00:00:00Z","resources":{}}"#);

    siteflow(&project)
        .args(["preview", "--refresh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Refreshing state"))
        .stdout(predicate::str::contains("2 to create"))
        .stdout(predicate::str::contains("2 to update"));

    let state = project.read_state();
    assert_eq!(
        state["resources"]["cloudfront-distribution:website-cdn"]["id"],
        "E2QWRUHAPOMQZL"
    );
    assert!(!project.path().join(".siteflow/lock.json").exists());
}

#[cfg(unix)]
#[test]
fn test_preview_refresh_respects_lock() {
    let project = project_with_engine("echo '{}'");
    project.write_file(
        ".siteflow/lock.json",
        r#"{"holder":"ci-runner:4242","acquired_at":"2999-01-01T00:00:00Z"}"#,
    );

    siteflow(&project)
        .args(["preview", "--refresh"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("locked by ci-runner:4242"));
    assert!(!project.path().join(".siteflow/state.json").exists());
}
