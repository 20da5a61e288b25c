use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_taxdesk"))
}

/// Isolated config/data homes for one test.
struct Sandbox {
    config: PathBuf,
    data: PathBuf,
}

impl Sandbox {
    fn new(prefix: &str) -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time")
            .as_nanos();
        let base = std::env::temp_dir().join(format!(
            "taxdesk_{}_{}_{}",
            prefix,
            std::process::id(),
            nanos
        ));
        let config = base.join("config");
        let data = base.join("data");
        std::fs::create_dir_all(&config).expect("create config dir");
        std::fs::create_dir_all(&data).expect("create data dir");
        Self { config, data }
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(bin());
        cmd.args(args)
            .env("XDG_CONFIG_HOME", &self.config)
            .env("XDG_DATA_HOME", &self.data)
            .env_remove("TAXDESK_STORE")
            .env_remove("TAXDESK_CONFIG")
            .env_remove("TAXDESK_PASSWORD")
            .env("TAXDESK_LOG", "off")
            .stdin(Stdio::null());
        cmd
    }

    fn run(&self, args: &[&str]) -> Output {
        self.command(args).output().expect("run taxdesk")
    }

    fn run_ok(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            output.status.success(),
            "taxdesk {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    fn run_json(&self, args: &[&str]) -> serde_json::Value {
        let mut full = vec!["--json"];
        full.extend_from_slice(args);
        let stdout = self.run_ok(&full);
        serde_json::from_str(&stdout).expect("valid JSON output")
    }

    fn store_path(&self) -> PathBuf {
        self.data.join("taxdesk").join("taxdesk.db")
    }

    fn config_path(&self) -> PathBuf {
        self.config.join("taxdesk").join("config.toml")
    }

    /// `init` plus `register`, leaving a logged-in session.
    fn ready(prefix: &str) -> Self {
        let sandbox = Self::new(prefix);
        sandbox.run_ok(&["init"]);
        sandbox.run_ok(&[
            "register",
            "--email",
            "pat@example.com",
            "--password",
            "secret",
            "--first-name",
            "Pat",
            "--last-name",
            "Lee",
            "--no-input",
        ]);
        sandbox
    }
}

fn exit_code(output: &Output) -> i32 {
    output.status.code().expect("exit code")
}

#[test]
fn test_init_writes_config_and_store() {
    let sandbox = Sandbox::new("init");
    let stdout = sandbox.run_ok(&["init", "--strict-transitions"]);
    assert!(stdout.contains("status=ok"));
    assert!(sandbox.store_path().exists());

    let config = std::fs::read_to_string(sandbox.config_path()).expect("read config");
    assert!(config.contains("strict_transitions = true"));

    let again = sandbox.run(&["init"]);
    assert_eq!(exit_code(&again), 4);
}

#[test]
fn test_missing_store_exits_not_found() {
    let sandbox = Sandbox::new("nostore");
    let output = sandbox.run(&["returns", "list"]);
    assert_eq!(exit_code(&output), 3);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error=No store found"));
    assert!(stderr.contains("taxdesk init"));
}

#[test]
fn test_pages_require_a_session() {
    let sandbox = Sandbox::new("noauth");
    sandbox.run_ok(&["init"]);
    let output = sandbox.run(&["returns", "list"]);
    assert_eq!(exit_code(&output), 5);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("taxdesk login"));
}

#[test]
fn test_login_requires_password_without_tty() {
    let sandbox = Sandbox::new("nopw");
    sandbox.run_ok(&["init"]);
    let output = sandbox.run(&["login", "--email", "pat@example.com", "--no-input"]);
    assert_eq!(exit_code(&output), 4);

    let output = sandbox
        .command(&["login", "--email", "pat@example.com", "--no-input"])
        .env("TAXDESK_PASSWORD", "secret")
        .output()
        .expect("run taxdesk");
    assert!(output.status.success());
}

#[test]
fn test_returns_flow() {
    let sandbox = Sandbox::ready("returns");

    let created = sandbox.run_json(&["returns", "add", "--type", "1040", "--year", "2024"]);
    assert_eq!(created["status"], "Pending");
    assert_eq!(created["documentCount"], 0);
    let id = created["id"].as_str().expect("id").to_string();

    let listed = sandbox.run_json(&["returns", "list"]);
    assert_eq!(listed[0]["id"], id.as_str());

    let updated = sandbox.run_json(&["returns", "status", &id, "in-review"]);
    assert_eq!(updated["status"], "In Review");

    let bad = sandbox.run(&["returns", "status", &id, "archived"]);
    assert_eq!(exit_code(&bad), 4);

    let missing = sandbox.run(&["returns", "delete", "nope", "--yes"]);
    assert_eq!(exit_code(&missing), 3);

    sandbox.run_ok(&["returns", "delete", &id, "--yes"]);
    let listed = sandbox.run_json(&["returns", "list"]);
    assert!(listed
        .as_array()
        .expect("array")
        .iter()
        .all(|r| r["id"] != id.as_str()));

    let activity = sandbox.run_json(&["activity", "--type", "return"]);
    let descriptions: Vec<&str> = activity
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|e| e["description"].as_str())
        .collect();
    assert_eq!(
        descriptions,
        vec!["Tax Return Deleted", "Status Updated", "Tax Return Created"]
    );
}

#[test]
fn test_pay_invoice_writes_receipt() {
    let sandbox = Sandbox::ready("pay");

    let payment = sandbox.run_json(&["payments", "pay", "INV-002", "--method", "credit_card"]);
    assert_eq!(payment["invoice"]["status"], "Paid");
    assert_eq!(payment["receipt"]["invoiceId"], "INV-002");
    assert_eq!(payment["receipt"]["amount"], 125.0);
    assert_eq!(payment["receipt"]["paymentMethod"], "credit_card");

    let receipts = sandbox.run_json(&["payments", "receipts"]);
    assert_eq!(receipts[0]["invoiceId"], "INV-002");

    let again = sandbox.run(&["payments", "pay", "INV-002"]);
    assert_eq!(exit_code(&again), 4);

    let activity = sandbox.run_json(&["activity", "--search", "INV-002"]);
    assert_eq!(activity[0]["description"], "Payment Processed");
    assert_eq!(activity[0]["type"], "payment");
    let agent = activity[0]["metadata"]["userAgent"].as_str().unwrap_or_default();
    assert!(agent.starts_with("taxdesk-cli/"), "unexpected user agent: {agent}");
}

#[test]
fn test_create_invoice_validates_input() {
    let sandbox = Sandbox::ready("invoice");
    let bad = sandbox.run(&[
        "payments", "create", "--description", "Audit", "--amount", "abc", "--due", "2024-09-01",
    ]);
    assert_eq!(exit_code(&bad), 4);

    let invoice = sandbox.run_json(&[
        "payments", "create", "--description", "Audit", "--amount", "$1,500", "--due", "2024-09-01",
    ]);
    assert_eq!(invoice["id"], "INV-004");
    assert_eq!(invoice["status"], "Unpaid");
}

#[test]
fn test_document_upload_and_search() {
    let sandbox = Sandbox::ready("docs");
    let file = sandbox.data.join("w2-2024.pdf");
    std::fs::write(&file, vec![0u8; 2048]).expect("write file");
    let file = file.to_string_lossy().to_string();

    let uploaded = sandbox.run_json(&["documents", "upload", &file]);
    assert_eq!(uploaded[0]["name"], "w2-2024.pdf");
    assert_eq!(uploaded[0]["type"], "pdf");
    assert_eq!(uploaded[0]["size"], 2048);
    let id = uploaded[0]["id"].as_str().expect("id").to_string();

    sandbox.run_ok(&["documents", "comment", &id, "Employer copy"]);
    let found = sandbox.run_json(&["documents", "list", "--search", "employer"]);
    assert_eq!(found.as_array().expect("array").len(), 1);

    let missing = sandbox.run(&["documents", "upload", "/no/such/file.pdf"]);
    assert_eq!(exit_code(&missing), 3);
}

#[test]
fn test_open_redirects_by_session() {
    let sandbox = Sandbox::new("open");
    sandbox.run_ok(&["init"]);

    let stdout = sandbox.run_ok(&["open", "/dashboard/returns"]);
    assert!(stdout.contains("path=/login"));
    assert!(stdout.contains("redirected_from=/dashboard/returns"));

    sandbox.run_ok(&[
        "login", "--email", "pat@example.com", "--password", "pw", "--no-input",
    ]);
    let resolved = sandbox.run_json(&["open", "/login"]);
    assert_eq!(resolved["path"], "/dashboard");
    assert_eq!(resolved["route"], "Dashboard");
}

#[test]
fn test_shell_navigates_and_goes_back() {
    let sandbox = Sandbox::ready("shell");
    let mut child = sandbox
        .command(&["shell"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("spawn shell");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(b"follow Payments\ngo dashboard//returns\nback\nwhere\nquit\n")
        .expect("write commands");
    let output = child.wait_with_output().expect("shell output");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let paths: Vec<&str> = stdout
        .lines()
        .filter_map(|line| line.strip_prefix("path="))
        .collect();
    assert_eq!(
        paths,
        vec![
            "/dashboard",
            "/dashboard/payments",
            "/dashboard/returns",
            "/dashboard/payments",
            "/dashboard/payments",
        ]
    );
}

#[test]
fn test_settings_and_dashboard() {
    let sandbox = Sandbox::ready("settings");

    let profile = sandbox.run_json(&["settings", "set-profile", "--phone", "555-0100"]);
    assert_eq!(profile["phone"], "555-0100");
    assert_eq!(profile["firstName"], "Pat");

    let prefs = sandbox.run_json(&["settings", "notify", "sms", "on"]);
    assert_eq!(prefs["smsNotifications"], true);

    let whoami = sandbox.run_json(&["whoami"]);
    assert_eq!(whoami["initials"], "PL");

    let dashboard = sandbox.run_json(&["dashboard"]);
    assert_eq!(dashboard["totalReturns"], 3);
    assert_eq!(dashboard["unpaidInvoices"], 2);
}

#[test]
fn test_delete_account_ends_session() {
    let sandbox = Sandbox::ready("delete");
    sandbox.run_ok(&["settings", "delete-account", "--yes"]);
    let output = sandbox.run(&["whoami"]);
    assert_eq!(exit_code(&output), 5);
}

#[test]
fn test_check_and_backup() {
    let sandbox = Sandbox::ready("backup");
    let stdout = sandbox.run_ok(&["check"]);
    assert!(stdout.contains("status=ok"));

    let destination = sandbox.data.join("backups").join("copy.db");
    let destination_str = destination.to_string_lossy().to_string();
    let stdout = sandbox.run_ok(&["backup", &destination_str]);
    assert!(stdout.contains("status=ok"));
    assert!(Path::new(&destination).exists());

    let reopened = sandbox.run_json(&["--store", &destination_str, "whoami"]);
    assert_eq!(reopened["email"], "pat@example.com");
}
