//! Integration tests for the `mdkatex` binary entry point.
//!
//! A shell script standing in for the `katex` renderer is placed first on
//! `PATH`, so the tests exercise resolution, rendering, and caching end to
//! end without a Node.js installation.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::str::contains;
use tempfile::TempDir;

const HTML: &str = r#"<span class="katex">x</span>"#;

struct Sandbox {
    bin: TempDir,
    cache: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            bin: TempDir::new().expect("bin dir"),
            cache: TempDir::new().expect("cache dir"),
        }
    }

    fn command(&self) -> Command {
        let mut command = cargo_bin_cmd!("mdkatex");
        command
            .env("PATH", self.bin.path())
            .env("MDKATEX_CACHE_DIR", self.cache.path())
            .env("MDKATEX_BUNDLE_DIR", self.bin.path().join("bundle"))
            .env("MDKATEX_LOG_FILTER", "off");
        command
    }

    fn cache_entries(&self) -> usize {
        fs::read_dir(self.cache.path())
            .expect("list cache")
            .flatten()
            .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "html"))
            .count()
    }
}

#[cfg(unix)]
fn install_stub(dir: &Path) {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("katex");
    let script = format!(
        r#"#!/bin/sh
if [ "$1" = "--version" ]; then echo 0.16.9; exit 0; fi
if [ "$1" = "--help" ]; then printf 'Options:\n  --trust   Trust the input\n'; exit 0; fi
out=""
while [ $# -gt 0 ]; do
  if [ "$1" = "--output" ]; then out="$2"; fi
  if [ "$1" = "--input" ]; then
    read -r tex < "$2"
    case "$tex" in *fail*) echo "KaTeX parse error" >&2; exit 1;; esac
  fi
  shift
done
printf '%s\n' '{HTML}' > "$out"
"#
    );
    fs::write(&path, script).expect("write stub");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod stub");
}

#[test]
fn missing_subcommand_exits_with_failure() {
    let sandbox = Sandbox::new();
    sandbox
        .command()
        .assert()
        .failure()
        .stderr(contains("Usage"));
}

#[test]
fn missing_renderer_reports_install_hint() {
    let sandbox = Sandbox::new();
    sandbox
        .command()
        .args(["render", "x^2"])
        .assert()
        .failure()
        .stderr(contains("npm install katex"));
}

#[cfg(unix)]
#[test]
fn render_prints_html_and_caches_it() {
    let sandbox = Sandbox::new();
    install_stub(sandbox.bin.path());

    sandbox
        .command()
        .args(["render", "--display-mode", "x^2"])
        .assert()
        .success()
        .stdout(format!("{HTML}\n"));
    assert_eq!(sandbox.cache_entries(), 1);

    // Served from the cache even once the renderer is gone.
    fs::remove_file(sandbox.bin.path().join("katex")).expect("remove stub");
    fs::write(sandbox.bin.path().join("katex"), "").expect("placeholder");
    sandbox
        .command()
        .args(["render", "--display-mode", "x^2"])
        .assert()
        .success()
        .stdout(format!("{HTML}\n"));
}

#[cfg(unix)]
#[test]
fn render_reads_stdin_without_tex_argument() {
    let sandbox = Sandbox::new();
    install_stub(sandbox.bin.path());

    sandbox
        .command()
        .arg("render")
        .write_stdin("y^2\n")
        .assert()
        .success()
        .stdout(contains("katex"));
}

#[cfg(unix)]
#[test]
fn render_failure_names_the_input() {
    let sandbox = Sandbox::new();
    install_stub(sandbox.bin.path());

    sandbox
        .command()
        .args(["render", "fail"])
        .assert()
        .failure()
        .stderr(contains("Error processing 'fail'"))
        .stderr(contains("KaTeX parse error"));
    assert_eq!(sandbox.cache_entries(), 0);
}

#[cfg(unix)]
#[test]
fn resolve_and_options_use_the_stub() {
    let sandbox = Sandbox::new();
    install_stub(sandbox.bin.path());

    sandbox
        .command()
        .arg("resolve")
        .assert()
        .success()
        .stdout(contains("katex"));
    sandbox
        .command()
        .arg("options")
        .assert()
        .success()
        .stdout(contains("--trust\tTrust the input"))
        .stdout(contains("--leqno"));
}

#[test]
fn config_flags_precede_the_command() {
    let sandbox = Sandbox::new();
    sandbox
        .command()
        .args(["--retention-secs", "0", "clean"])
        .assert()
        .success()
        .stdout(contains("removed 0 expired cache entries"));
}
