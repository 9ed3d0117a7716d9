//! End-to-end tests driving the `edgeone-deploy` binary.
//!
//! Deploy tests replace the npm tool with a shell command via `deploy.toml`,
//! so they run without Node and never touch the network.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn bin() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_edgeone-deploy"));
    cmd.env_remove("EDGEONE_PAGES_API_TOKEN")
        .env_remove("EDGEONE_PAGES_PROJECT_NAME")
        .env_remove("RUST_LOG");
    cmd
}

fn run(cmd: &mut Command, source: &Path) -> Output {
    cmd.arg("--source")
        .arg(source)
        .output()
        .expect("failed to run edgeone-deploy")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn fixture_site() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let src = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/site");
    copy_dir(&src, tmp.path());
    tmp
}

fn copy_dir(src: &Path, dst: &Path) {
    for entry in fs::read_dir(src).unwrap() {
        let entry = entry.unwrap();
        let to = dst.join(entry.file_name());
        if entry.path().is_dir() {
            fs::create_dir_all(&to).unwrap();
            copy_dir(&entry.path(), &to);
        } else {
            fs::copy(entry.path(), &to).unwrap();
        }
    }
}

/// Point the deploy step at a shell script instead of npx.
fn use_shell_deploy(root: &Path, script: &str) {
    let toml = format!(
        "[deploy]\ninstall_check = false\ncommand = [\"sh\", \"-c\", {script:?}]\n"
    );
    fs::write(root.join("deploy.toml"), toml).unwrap();
}

// ============================================================================
// validate
// ============================================================================

#[test]
fn validate_fixture_site() {
    let site = fixture_site();
    let output = run(bin().arg("validate"), site.path());
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let out = stdout(&output);
    assert!(out.contains("✅ index.html"));
    assert!(out.contains("Valid files: 3"));
    assert!(out.contains("notes.md: possibly unsupported file type .md"));
    assert!(out.contains("✅ Local image: assets/logo.png"));
    assert!(out.contains("🌐 External image: https://cdn.example.com/banner.jpg"));
    assert!(out.contains("Validation complete: 3 valid files, 1 advisory"));

    let sitemap = fs::read_to_string(site.path().join("sitemap.xml")).unwrap();
    assert!(sitemap.contains("<loc>https://lovemoneygame.co/</loc>"));
    let robots = fs::read_to_string(site.path().join("robots.txt")).unwrap();
    assert!(robots.contains("Sitemap: https://lovemoneygame.co/sitemap.xml"));
}

#[test]
fn validate_twice_reports_the_same() {
    let site = fixture_site();
    let first = run(bin().args(["validate", "--json"]), site.path());
    let second = run(bin().args(["validate", "--json"]), site.path());
    assert!(first.status.success());
    assert_eq!(stdout(&first), stdout(&second));
}

#[test]
fn validate_missing_entry_fails() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("style.css"), "body {}").unwrap();

    let output = run(bin().arg("validate"), tmp.path());
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Missing required files: index.html"));
    assert!(!tmp.path().join("sitemap.xml").exists());
}

#[test]
fn validate_lists_required_files_before_failing() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("deploy.toml"),
        "[validation]\nrequired_files = [\"index.html\", \"style.css\"]\n",
    )
    .unwrap();
    fs::write(tmp.path().join("style.css"), "body {}").unwrap();

    let output = run(bin().arg("validate"), tmp.path());
    assert_eq!(output.status.code(), Some(1));
    let out = stdout(&output);
    assert!(out.contains("✅ style.css"));
    assert!(out.contains("❌ index.html is missing"));
}

#[test]
fn validate_json_failure_keeps_stdout_empty() {
    let tmp = TempDir::new().unwrap();
    let output = run(bin().args(["validate", "--json"]), tmp.path());
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
}

#[test]
fn validate_leaves_temp_deployment_file_alone() {
    let site = fixture_site();
    fs::write(site.path().join("temp-deployment.html"), "<html></html>").unwrap();

    let output = run(bin().arg("validate"), site.path());
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(site.path().join("temp-deployment.html").exists());
}

#[test]
fn validate_missing_source_fails() {
    let tmp = TempDir::new().unwrap();
    let output = run(bin().arg("validate"), &tmp.path().join("nope"));
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn validate_json_output() {
    let site = fixture_site();
    let output = run(bin().args(["validate", "--json"]), site.path());
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["report"]["valid_file_count"], 3);
    assert_eq!(json["report"]["warnings"][0]["kind"], "unsupported_type");
    assert_eq!(json["html"]["status"], "checked");
    assert_eq!(json["artifacts"], serde_json::json!(["sitemap.xml", "robots.txt"]));
}

#[test]
fn validate_without_artifacts() {
    let site = fixture_site();
    let output = run(bin().args(["validate", "--no-artifacts"]), site.path());
    assert!(output.status.success());
    assert!(!site.path().join("sitemap.xml").exists());
    assert!(!site.path().join("robots.txt").exists());
}

#[test]
fn validate_rejects_unknown_config_keys() {
    let site = fixture_site();
    fs::write(site.path().join("deploy.toml"), "[site]\nbase = \"x\"\n").unwrap();
    let output = run(bin().arg("validate"), site.path());
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn validate_uses_configured_base_url() {
    let site = fixture_site();
    fs::write(
        site.path().join("deploy.toml"),
        "[site]\nbase_url = \"https://game.example.org/\"\n",
    )
    .unwrap();
    let output = run(bin().arg("validate"), site.path());
    assert!(output.status.success());
    let robots = fs::read_to_string(site.path().join("robots.txt")).unwrap();
    assert_eq!(
        robots,
        "User-agent: *\nAllow: /\n\nSitemap: https://game.example.org/sitemap.xml\n"
    );
}

// ============================================================================
// gen-config
// ============================================================================

#[test]
fn gen_config_prints_parseable_toml() {
    let output = bin().arg("gen-config").output().unwrap();
    assert!(output.status.success());
    let value: toml::Value = toml::from_str(&stdout(&output)).unwrap();
    assert_eq!(value["deploy"]["project_name"].as_str(), Some("lovemoney-game"));
}

// ============================================================================
// deploy
// ============================================================================

#[cfg(unix)]
#[test]
fn deploy_without_token_is_anonymous() {
    let site = fixture_site();
    use_shell_deploy(
        site.path(),
        "test \"$EDGEONE_PAGES_PROJECT_NAME\" = lovemoney-game && test -z \"$EDGEONE_PAGES_API_TOKEN\"",
    );

    let output = run(bin().arg("deploy"), site.path());
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let out = stdout(&output);
    assert!(out.contains("⚠️ EDGEONE_PAGES_API_TOKEN is not set"));
    assert!(out.contains("✅ Deployed to EdgeOne Pages (temporary link)"));
    assert!(out.contains("2. Set EDGEONE_PAGES_API_TOKEN"));
}

#[cfg(unix)]
#[test]
fn deploy_passes_env_to_command() {
    let site = fixture_site();
    use_shell_deploy(
        site.path(),
        "test \"$EDGEONE_PAGES_PROJECT_NAME\" = other-game && test \"$EDGEONE_PAGES_API_TOKEN\" = t0k",
    );

    let output = run(
        bin()
            .env("EDGEONE_PAGES_PROJECT_NAME", "other-game")
            .env("EDGEONE_PAGES_API_TOKEN", "t0k")
            .arg("deploy"),
        site.path(),
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("✅ API token configured"));
    assert!(out.contains("Deployed to EdgeOne Pages project other-game"));
    assert!(!out.contains("t0k"));
}

#[cfg(unix)]
#[test]
fn deploy_failure_exits_with_hints() {
    let site = fixture_site();
    use_shell_deploy(site.path(), "exit 3");

    let output = run(bin().arg("deploy"), site.path());
    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("exit code 3"));
    assert!(err.contains("🔧 Troubleshooting:"));
    assert!(err.contains("Verify the API token"));
}

#[test]
fn deploy_missing_entry_fails() {
    let tmp = TempDir::new().unwrap();
    let output = run(bin().arg("deploy"), tmp.path());
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Entry file not found"));
}

#[cfg(unix)]
#[test]
fn deploy_single_stages_entry_and_cleans_up() {
    let site = fixture_site();
    // Only index.html is staged: no assets directory next to it
    use_shell_deploy(site.path(), "test -f index.html && test ! -d assets");

    let output = run(bin().arg("deploy-single"), site.path());
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Images and other assets are not included"));
    assert!(!site.path().join("temp-deployment.html").exists());
}

#[cfg(unix)]
#[test]
fn deploy_single_cleans_up_after_failure() {
    let site = fixture_site();
    use_shell_deploy(site.path(), "exit 1");

    let output = run(bin().arg("deploy-single"), site.path());
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Try a full deployment"));
    assert!(!site.path().join("temp-deployment.html").exists());
}
