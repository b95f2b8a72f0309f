use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const ORDERS: &str = "이름,휴대폰번호,주문일자,주문금액\n홍길동,01012345678,2025-03-22,50000\n김철수,010-9876-5432,2025/03/23,1200\n";

struct Workspace {
    temp: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self {
            temp: TempDir::new().expect("temp dir"),
        }
    }

    fn write(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.temp.path().join(name);
        fs::write(&path, contents).expect("write fixture");
        path
    }

    fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("bulkmsg");
        cmd.env("XDG_CONFIG_HOME", self.temp.path().join("config"))
            .env("XDG_DATA_HOME", self.temp.path().join("data"))
            .env_remove("RUST_LOG");
        cmd
    }

    fn json(&self, args: &[&str]) -> Value {
        let output = self.cmd().arg("--json").args(args).output().expect("run command");
        assert!(output.status.success(), "command failed: {:?}", output);
        serde_json::from_slice(&output.stdout).expect("parse json")
    }
}

fn path_str(path: &Path) -> &str {
    path.to_str().expect("utf8 path")
}

#[test]
fn preview_fills_default_template() {
    let ws = Workspace::new();
    let orders = ws.write("orders.csv", ORDERS.as_bytes());

    let response = ws.json(&["preview", path_str(&orders), "--sender", "02-123-4567"]);
    assert_eq!(response["success"], true);
    assert_eq!(response["total"], 2);
    let preview = response["preview"].as_array().expect("preview array");
    assert_eq!(
        preview[0]["text"],
        "안녕하세요 홍길동님, 2025-03-22에 주문하신 상품의 금액은 50,000원입니다."
    );
    assert_eq!(preview[1]["phone"], "01098765432");
    assert_eq!(response["recipients"][0]["from"], "021234567");
    assert_eq!(response["recipients"][0]["type"], "SMS");
}

#[test]
fn preview_prints_human_readable_summary() {
    let ws = Workspace::new();
    let orders = ws.write("orders.csv", ORDERS.as_bytes());

    let output = ws
        .cmd()
        .args(["preview", path_str(&orders), "--sender", "0212345678"])
        .args(["--template", "{{이름}}님 {{주문금액}}원"])
        .output()
        .expect("run command");
    assert!(output.status.success(), "command failed: {:?}", output);
    let stdout = String::from_utf8(output.stdout).expect("utf8");
    assert!(stdout.contains("template (--template)"));
    assert!(stdout.contains("김철수님 1,200원"));
    assert!(stdout.contains("2 messages generated"));
}

#[test]
fn dry_run_send_reports_no_failures() {
    let ws = Workspace::new();
    let orders = ws.write("orders.csv", ORDERS.as_bytes());

    let report = ws.json(&[
        "send",
        path_str(&orders),
        "--sender",
        "02-123-4567",
        "--dry-run",
    ]);
    assert_eq!(report["success"], true);
    assert_eq!(report["provider"], "dry-run");
    assert_eq!(report["total"], 2);
    assert_eq!(report["failedCount"], 0);
    assert_eq!(report["failedList"].as_array().map(Vec::len), Some(0));
}

#[test]
fn missing_phone_column_is_invalid_input() {
    let ws = Workspace::new();
    let table = ws.write("names.csv", "이름,주문금액\n홍길동,50000\n".as_bytes());

    let output = ws
        .cmd()
        .args(["--json", "preview", path_str(&table), "--sender", "0212345678"])
        .output()
        .expect("run command");
    assert_eq!(output.status.code(), Some(3));
    let response: Value = serde_json::from_slice(&output.stdout).expect("parse json");
    assert_eq!(response["success"], false);
    assert!(response["message"]
        .as_str()
        .expect("message")
        .contains("phone number column"));
}

#[test]
fn missing_sender_is_invalid_input() {
    let ws = Workspace::new();
    let orders = ws.write("orders.csv", ORDERS.as_bytes());

    ws.cmd()
        .args(["preview", path_str(&orders)])
        .assert()
        .code(3);
}

#[test]
fn missing_table_file_is_not_found() {
    let ws = Workspace::new();
    let missing = ws.temp.path().join("missing.csv");

    ws.cmd()
        .args(["preview", path_str(&missing), "--sender", "0212345678"])
        .assert()
        .code(2);
}

#[test]
fn parse_recipients_reads_name_and_phone_columns() {
    let ws = Workspace::new();
    let list = ws.write(
        "list.csv",
        "이름,전화번호\n홍길동,010-1234-5678\n잘못,123\n김철수,01098765432\n".as_bytes(),
    );

    let parsed = ws.json(&["parse-recipients", path_str(&list)]);
    assert_eq!(parsed["success"], true);
    assert_eq!(parsed["count"], 2);
    assert_eq!(parsed["recipients"][0], "01012345678");
    assert_eq!(parsed["names"][1], "김철수");
}

#[test]
fn parse_recipients_without_valid_phones_fails() {
    let ws = Workspace::new();
    let list = ws.write("list.csv", "이름,전화번호\n홍길동,123\n".as_bytes());

    ws.cmd()
        .args(["parse-recipients", path_str(&list)])
        .assert()
        .code(3);
}

#[test]
fn send_text_dry_run_counts_valid_numbers() {
    let ws = Workspace::new();

    let report = ws.json(&[
        "send-text",
        "--text",
        "공지: 내일 휴무입니다",
        "--to",
        "010-1111-2222, 01033334444",
        "--sender",
        "0212345678",
        "--dry-run",
    ]);
    assert_eq!(report["total"], 2);
    assert_eq!(report["failedCount"], 0);
}

#[test]
fn stored_table_can_be_previewed_and_fetched() {
    let ws = Workspace::new();
    let orders = ws.write("orders.csv", ORDERS.as_bytes());

    let stored = ws.json(&["store", "put", path_str(&orders)]);
    let key = stored["key"].as_str().expect("key").to_string();
    assert!(key.starts_with("uploads/"));
    assert!(key.ends_with(".csv"));

    let response = ws.json(&["preview", "--key", &key, "--sender", "0212345678"]);
    assert_eq!(response["total"], 2);

    let out = ws.temp.path().join("copy.csv");
    ws.cmd()
        .args(["store", "get", &key, "--out", path_str(&out)])
        .assert()
        .success();
    assert_eq!(fs::read(&out).expect("read copy"), ORDERS.as_bytes());

    ws.cmd()
        .args(["store", "get", &key, "--out", path_str(&out)])
        .assert()
        .code(3);
}

#[test]
fn stored_table_without_extension_is_sniffed() {
    let ws = Workspace::new();
    let orders = ws.write("orders", ORDERS.as_bytes());

    let stored = ws.json(&["store", "put", path_str(&orders)]);
    let key = stored["key"].as_str().expect("key").to_string();
    assert!(!key.trim_start_matches("uploads/").contains('.'));

    let response = ws.json(&["preview", "--key", &key, "--sender", "0212345678"]);
    assert_eq!(response["success"], true);
    assert_eq!(response["total"], 2);

    ws.json(&["store", "put", path_str(&orders), "--key", "tables/orders.bin"]);
    let response = ws.json(&[
        "preview",
        "--key",
        "tables/orders.bin",
        "--sender",
        "0212345678",
    ]);
    assert_eq!(response["total"], 2);
}

#[test]
fn unknown_store_key_is_not_found() {
    let ws = Workspace::new();
    let out = ws.temp.path().join("out.bin");

    ws.cmd()
        .args(["store", "get", "uploads/nothing.csv", "--out", path_str(&out)])
        .assert()
        .code(2);
}

#[cfg(unix)]
#[test]
fn configured_sender_is_used_when_flag_is_absent() {
    use std::os::unix::fs::PermissionsExt;

    let ws = Workspace::new();
    let orders = ws.write("orders.csv", ORDERS.as_bytes());
    let config = ws.write(
        "config.toml",
        b"sender = \"1588-0000\"\npreview_limit = 1\n\n[template]\ndefault_text = \"{{name}} {{order_amount}}\"\n",
    );
    fs::set_permissions(&config, fs::Permissions::from_mode(0o600)).expect("chmod");

    let response = ws.json(&["--config", path_str(&config), "preview", path_str(&orders)]);
    assert_eq!(response["recipients"][0]["from"], "15880000");
    assert_eq!(response["preview"].as_array().map(Vec::len), Some(1));
    assert_eq!(response["preview"][0]["text"], "홍길동 50,000");
}

#[test]
fn bulk_starter_feeds_parse_recipients() {
    let ws = Workspace::new();
    let out = ws.temp.path().join("recipients.csv");

    let written = ws.json(&["template", "bulk", "--out", path_str(&out)]);
    assert_eq!(written["kind"], "bulk");

    let parsed = ws.json(&["parse-recipients", path_str(&out)]);
    assert_eq!(parsed["count"], 2);
    assert_eq!(parsed["names"][1], "전우치");

    ws.cmd()
        .args(["template", "bulk", "--out", path_str(&out)])
        .assert()
        .code(3);
    ws.cmd()
        .args(["template", "bulk", "--out", path_str(&out), "--force"])
        .assert()
        .success();
}

#[test]
fn auto_starter_previews_checked_rows() {
    let ws = Workspace::new();
    let out = ws.temp.path().join("orders.xlsx");

    ws.cmd()
        .args(["template", "auto", "--out", path_str(&out)])
        .assert()
        .success();

    let response = ws.json(&["preview", path_str(&out), "--sender", "0212345678"]);
    assert_eq!(response["success"], true);
    assert_eq!(response["total"], 2);
    assert_eq!(response["preview"][0]["name"], "홍길동");
    assert_eq!(response["preview"][1]["phone"], "01098765432");
}

#[test]
fn completions_run_without_config() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["--config", "/nonexistent/bulkmsg.toml", "completions", "bash"])
        .assert()
        .success();
}
