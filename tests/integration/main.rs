//! Integration tests for lambda-lift

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn lift(root: &Path) -> Command {
        let mut cmd = cargo_bin_cmd!("lambda-lift");
        cmd.env_remove("LAMBDA_LIFT_ROOT").arg("--root").arg(root);
        cmd
    }

    /// A function with sources and no requirements, so no pip is needed
    fn project(root: &Path, name: &str) {
        let dir = root.join(name);
        fs::create_dir_all(dir.join("src").join("__pycache__")).unwrap();
        fs::write(dir.join("src").join("handler.py"), "def handler(e, c): pass\n").unwrap();
        fs::write(dir.join("src").join("__pycache__").join("handler.pyc"), "bc").unwrap();
        fs::write(
            dir.join("lambda-lift.toml"),
            r#"
[build]
source_paths = ["src"]
destination_path = "dist/out.zip"
cache_path = ".cache"
platform = "x86"

[deployment.dev]
region = "us-east-1"
name = "dev-function"
"#,
        )
        .unwrap();
    }

    #[test]
    fn help_displays() {
        cargo_bin_cmd!("lambda-lift")
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Package serverless Python functions"));
    }

    #[test]
    fn version_displays() {
        cargo_bin_cmd!("lambda-lift")
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("lambda-lift"));
    }

    #[test]
    fn list_empty_root() {
        let temp = TempDir::new().unwrap();
        lift(temp.path())
            .args(["list", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[]"));
    }

    #[test]
    fn list_discovers_configs() {
        let temp = TempDir::new().unwrap();
        project(temp.path(), "api");
        project(temp.path(), "worker");

        lift(temp.path())
            .args(["list", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::diff("api\nworker\n"));

        lift(temp.path())
            .arg("list")
            .assert()
            .success()
            .stdout(predicate::str::contains("NAME").and(predicate::str::contains("dev")));
    }

    #[test]
    fn build_without_configs_fails() {
        let temp = TempDir::new().unwrap();
        lift(temp.path())
            .arg("build")
            .assert()
            .failure()
            .stderr(predicate::str::contains("No lambda-lift configuration found"));
    }

    #[test]
    fn build_unknown_name_fails() {
        let temp = TempDir::new().unwrap();
        project(temp.path(), "api");
        lift(temp.path())
            .args(["build", "nonexistent"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Lambda not found"))
            .stderr(predicate::str::contains("lambda-lift list"));
    }

    #[test]
    fn build_then_reuse_cache() {
        let temp = TempDir::new().unwrap();
        project(temp.path(), "api");

        lift(temp.path())
            .args(["build", "api"])
            .assert()
            .success()
            .stdout(predicate::str::contains("dependencies rebuilt"));

        let archive = temp.path().join("api").join("dist").join("out.zip");
        let mut zip = zip::ZipArchive::new(fs::File::open(&archive).unwrap()).unwrap();
        let names: Vec<String> = (0..zip.len())
            .map(|i| zip.by_index(i).unwrap().name().to_string())
            .collect();
        assert_eq!(names, vec!["handler.py"]);

        lift(temp.path())
            .arg("build")
            .assert()
            .success()
            .stdout(predicate::str::contains("cached dependencies"));

        lift(temp.path())
            .args(["build", "--force"])
            .assert()
            .success()
            .stdout(predicate::str::contains("dependencies rebuilt"));
    }

    #[test]
    fn cache_status_and_clear() {
        let temp = TempDir::new().unwrap();
        project(temp.path(), "api");

        lift(temp.path())
            .args(["cache", "status"])
            .assert()
            .success()
            .stdout(predicate::str::contains("missing archive"));

        lift(temp.path()).arg("build").assert().success();

        lift(temp.path())
            .args(["cache", "status", "api"])
            .assert()
            .success()
            .stdout(predicate::str::contains("fresh"));

        lift(temp.path())
            .args(["cache", "clear", "--all"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Cleared 1 cache(s)"));

        assert!(!temp
            .path()
            .join("api")
            .join(".cache")
            .join("dependencies_api.zip")
            .exists());
    }

    #[test]
    fn invalid_config_reports_path() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("lambda-lift-broken.toml"),
            "[build]\nsource_paths = [\"missing\"]\n",
        )
        .unwrap();
        lift(temp.path())
            .arg("list")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"));
    }
}
