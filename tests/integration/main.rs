//! Integration tests for agentmd

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    /// A sandboxed site: config, storage base, options and route table
    /// all live under one temp dir
    struct Site {
        dir: TempDir,
    }

    impl Site {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let root = dir.path();
            let config = format!(
                "[general]\naudit_log = true\n\n\
                 [storage]\nbase_dir = {:?}\n\n\
                 [options]\npath = {:?}\n\n\
                 [routes]\ntable_path = {:?}\n",
                root.join("uploads"),
                root.join("options.json"),
                root.join("routes.json"),
            );
            std::fs::write(root.join("config.toml"), config).unwrap();
            Self { dir }
        }

        fn root(&self) -> &Path {
            self.dir.path()
        }

        fn cache_root(&self) -> PathBuf {
            self.root().join("uploads").join("mfa-cache")
        }

        fn cmd(&self) -> Command {
            let mut cmd = cargo_bin_cmd!("agentmd");
            cmd.arg("--config")
                .arg(self.root().join("config.toml"))
                .env("HOME", self.root())
                .env("XDG_STATE_HOME", self.root().join("state"))
                .env("XDG_DATA_HOME", self.root().join("data"))
                .env_remove("RUST_LOG");
            cmd
        }

        fn put(&self, identity: &str, markdown: &str) {
            self.cmd()
                .args(["cache", "put", identity])
                .write_stdin(markdown)
                .assert()
                .success();
        }
    }

    #[test]
    fn help_displays() {
        cargo_bin_cmd!("agentmd")
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Cache lifecycle controller"));
    }

    #[test]
    fn version_flag_displays() {
        cargo_bin_cmd!("agentmd")
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("agentmd"));
    }

    #[test]
    fn bootstrap_on_fresh_install_rebuilds_routes() {
        let site = Site::new();

        site.cmd().args(["event", "bootstrap"]).assert().success();

        let table = std::fs::read_to_string(site.root().join("routes.json")).unwrap();
        assert!(table.contains(r"^(.+)\\.md/?$"));
        let options = std::fs::read_to_string(site.root().join("options.json")).unwrap();
        assert!(options.contains("mfa_version"));

        site.cmd()
            .args(["routes", "list", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains(".md/?$"));
    }

    #[test]
    fn second_bootstrap_leaves_table_alone() {
        let site = Site::new();
        site.cmd().args(["event", "bootstrap"]).assert().success();

        site.cmd()
            .args(["routes", "list", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"generation\": 1"));

        site.cmd().args(["event", "bootstrap"]).assert().success();

        site.cmd()
            .args(["routes", "list", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"generation\": 1"));
    }

    #[test]
    fn uninstall_removes_route() {
        let site = Site::new();
        site.cmd().args(["event", "install"]).assert().success();
        site.cmd().args(["event", "uninstall"]).assert().success();

        site.cmd()
            .args(["routes", "list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No route rules persisted"));
    }

    #[test]
    fn cache_put_then_get() {
        let site = Site::new();
        site.put("/about/", "# About\n");

        site.cmd()
            .args(["cache", "get", "/about/"])
            .assert()
            .success()
            .stdout("# About\n");
    }

    #[test]
    fn cache_get_miss_fails() {
        let site = Site::new();

        site.cmd()
            .args(["cache", "get", "/nowhere/"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Cache miss"));
    }

    #[test]
    fn theme_switch_flushes_and_protects() {
        let site = Site::new();
        site.put("/about/", "# About\n");
        site.put("/contact/", "# Contact\n");

        site.cmd()
            .args(["event", "theme-switched", "twentytwenty"])
            .assert()
            .success();

        let mut names: Vec<String> = std::fs::read_dir(site.cache_root())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec![".htaccess", "index.html"]);

        site.cmd()
            .args(["cache", "get", "/about/"])
            .assert()
            .failure();
    }

    #[test]
    fn plugin_activation_flushes() {
        let site = Site::new();
        site.put("/about/", "# About\n");

        site.cmd()
            .args(["event", "plugin-activated", "seo-tools"])
            .assert()
            .success();

        site.cmd()
            .args(["cache", "status", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"entries\": 0"))
            .stdout(predicate::str::contains("\"protected\": true"));
    }

    #[test]
    fn flush_without_cache_dir_is_a_noop() {
        let site = Site::new();

        site.cmd()
            .args(["cache", "flush", "--yes"])
            .assert()
            .success()
            .stdout(predicate::str::contains("nothing to flush"));

        assert!(!site.cache_root().exists());
    }

    #[test]
    fn flush_without_yes_aborts_when_not_interactive() {
        let site = Site::new();
        site.put("/about/", "# About\n");

        site.cmd()
            .args(["cache", "flush"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Aborted"));

        site.cmd().args(["cache", "get", "/about/"]).assert().success();
    }

    #[test]
    fn event_writes_journal() {
        let site = Site::new();
        site.put("/about/", "# About\n");
        site.cmd()
            .args(["event", "theme-switched", "dark"])
            .assert()
            .success();

        let journal = site.root().join("state").join("agentmd").join("journal.log");
        let content = std::fs::read_to_string(journal).unwrap();
        assert!(content.contains("cache.flushed"));
    }

    #[test]
    fn version_reports_pending_rebuild() {
        let site = Site::new();

        site.cmd()
            .arg("version")
            .assert()
            .success()
            .stdout(predicate::str::contains("running: 1.1.1"))
            .stdout(predicate::str::contains("Next bootstrap rebuilds"));
    }

    #[test]
    fn config_path_honors_flag() {
        let site = Site::new();

        site.cmd()
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn read_only_commands_leave_state_dir_alone() {
        let site = Site::new();

        site.cmd().args(["config", "path"]).assert().success();
        site.cmd().args(["cache", "status"]).assert().success();

        assert!(!site.root().join("state").exists());
    }

    #[test]
    fn config_show() {
        let site = Site::new();

        site.cmd()
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[storage]"))
            .stdout(predicate::str::contains("mfa-cache"));
    }

    #[test]
    fn config_set_persists() {
        let site = Site::new();

        site.cmd()
            .args(["config", "set", "routes.query_var", "md_path"])
            .assert()
            .success();

        let content = std::fs::read_to_string(site.root().join("config.toml")).unwrap();
        assert!(content.contains("md_path"));
    }

    #[test]
    fn config_set_unknown_key_fails() {
        let site = Site::new();

        site.cmd()
            .args(["config", "set", "vm.name", "x"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown configuration key"));
    }
}
