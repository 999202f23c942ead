//! End-to-end tests driving the `relbin-hook` binary over stdin.

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use mockito::{Matcher, Server, ServerGuard};
use relbin_schema::{ArchiveFormat, Platform};
use tempfile::TempDir;

/// Test context that sets up a temporary relbin home and a mock release host
struct TestContext {
    temp_dir: TempDir,
    server: ServerGuard,
}

impl TestContext {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let server = Server::new();
        let config = format!(
            "base_url = \"{}\"\nrepository = \"acme/tool\"\n",
            server.url()
        );
        std::fs::write(temp_dir.path().join("relbin.toml"), config).expect("failed to write config");
        Self { temp_dir, server }
    }

    fn install_dir(&self) -> PathBuf {
        self.temp_dir.path().join(".binary")
    }

    fn run(&self, stdin: &str) -> Output {
        self.run_with_config(stdin, None)
    }

    fn run_with_config(&self, stdin: &str, config: Option<&Path>) -> Output {
        let bin_path = env!("CARGO_BIN_EXE_relbin-hook");
        let mut command = Command::new(bin_path);
        match config {
            Some(path) => command.env("RELBIN_CONFIG", path),
            None => command.env_remove("RELBIN_CONFIG"),
        };
        let mut child = command
            .env("RELBIN_HOME", self.temp_dir.path())
            .env("RUST_LOG", "info")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("failed to run relbin-hook");
        child
            .stdin
            .take()
            .expect("stdin is piped")
            .write_all(stdin.as_bytes())
            .expect("failed to write stdin");
        child.wait_with_output().expect("failed to wait for relbin-hook")
    }
}

/// Release archive for the host platform containing `tool` / `tool.exe`.
fn host_archive(platform: Platform, contents: &[u8]) -> Vec<u8> {
    let name = platform.executable_name("tool");
    match platform.archive_format() {
        ArchiveFormat::Zip => {
            let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
            writer
                .start_file(format!("tool/{name}"), zip::write::SimpleFileOptions::default())
                .unwrap();
            writer.write_all(contents).unwrap();
            writer.finish().unwrap().into_inner()
        }
        ArchiveFormat::TarGz => {
            let encoder =
                flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
            let mut builder = tar::Builder::new(encoder);
            let mut header = tar::Header::new_gnu();
            header.set_size(contents.len() as u64);
            header.set_mode(0o644);
            builder
                .append_data(&mut header, format!("tool/{name}"), contents)
                .unwrap();
            builder.into_inner().unwrap().finish().unwrap()
        }
    }
}

#[test]
fn test_install_then_uninstall() {
    let platform = Platform::current();
    if !platform.is_supported() {
        return;
    }
    let mut ctx = TestContext::new();
    let m = ctx
        .server
        .mock(
            "GET",
            Matcher::Regex(r"^/acme/tool/releases/download/v1\.2\.3/tool_1\.2\.3_".into()),
        )
        .with_status(200)
        .with_body(host_archive(platform, b"tool binary"))
        .expect(1)
        .create();

    let output = ctx.run(
        r#"{"hook":"post-package-install","package":{"name":"acme/tool","version":"v1.2.3"}}"#,
    );

    m.assert();
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Binary installed successfully"), "{stderr}");

    let binary = ctx.install_dir().join(platform.executable_name("tool"));
    assert_eq!(std::fs::read(&binary).unwrap(), b"tool binary");

    let output = ctx.run(r#"{"hook":"plugin-uninstall"}"#);
    assert!(output.status.success());
    assert!(!ctx.install_dir().exists());
}

#[test]
fn test_failures_do_not_fail_the_hook() {
    let mut ctx = TestContext::new();
    let _m = ctx
        .server
        .mock("GET", Matcher::Any)
        .with_status(500)
        .create();

    let output = ctx.run(concat!(
        "this is not json\n",
        "\n",
        r#"{"hook":"post-package-update","target":{"name":"acme/tool","version":"2.0.0"}}"#,
        "\n",
    ));

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Ignoring malformed hook message"), "{stderr}");
    if Platform::current().is_supported() {
        assert!(stderr.contains("Failed to install binary"), "{stderr}");
    }
}

#[test]
fn test_other_packages_are_ignored() {
    let mut ctx = TestContext::new();
    let m = ctx.server.mock("GET", Matcher::Any).expect(0).create();

    let output = ctx.run(
        r#"{"hook":"post-package-install","package":{"name":"acme/unrelated","version":"1.0.0"}}"#,
    );

    m.assert();
    assert!(output.status.success());
    assert!(!ctx.install_dir().exists());
}

#[test]
fn test_bad_config_fails_fast() {
    let ctx = TestContext::new();
    std::fs::write(ctx.temp_dir.path().join("relbin.toml"), "repository = \"nope\"\n").unwrap();

    let output = ctx.run("");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to load relbin configuration"), "{stderr}");
}

#[test]
fn test_missing_explicit_config_fails_fast() {
    let ctx = TestContext::new();
    let missing = ctx.temp_dir.path().join("elsewhere.toml");

    let output = ctx.run_with_config("", Some(&missing));

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to load relbin configuration"), "{stderr}");
    assert!(stderr.contains("elsewhere.toml"), "{stderr}");
}
