use gasfree_tron_signer::eip712::{recover_address, Eip712Signature};
use gasfree_tron_signer::permit::{NetworkDomain, TransferRequest};
use serde_json::Value;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

const TEST_KEY: &str = "1b3d1201039f2c91d2dac01a218967981d594a4bfa004478e7fed19a12a9fc31";
const TEST_ADDRESS: &str = "TZ3oPnE1SdAUL1YRd9GJQHenxrXjy4paAn";

const MESSAGE: &str = r#"{
    "token": "TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t",
    "serviceProvider": "TGzz8gjYiYRqpfmDwnLxfgPuLVNmpCswVp",
    "user": "TZ3oPnE1SdAUL1YRd9GJQHenxrXjy4paAn",
    "receiver": "TX554G9uKsEv1U6TBQnNPC7dkhbvBFhgrD",
    "value": "3000000",
    "maxFee": "2000000",
    "deadline": "1749371692",
    "version": 1,
    "nonce": 0
}"#;

fn cli() -> Command {
    let binary_path = assert_cmd::cargo::cargo_bin!("gasfree-tron-signer");
    let mut cmd = Command::new(binary_path);
    for var in [
        "GASFREE_NETWORK",
        "GASFREE_CHAIN_STYLE_V",
        "GASFREE_DEADLINE_SECS",
        "GASFREE_DEBUG",
        "GASFREE_PRIVATE_KEY",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

fn run_with_stdin(mut cmd: Command, stdin: &str) -> Output {
    let mut child = cmd
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("cli spawns");
    if let Some(mut pipe) = child.stdin.take() {
        // the cli may exit before reading, e.g. when no key is configured
        let _ = pipe.write_all(stdin.as_bytes());
    }
    child.wait_with_output().expect("cli run succeeds")
}

fn stdout_of(output: &Output) -> String {
    assert!(output.status.success(), "cli exited unsuccessfully: {:?}", output);
    String::from_utf8(output.stdout.clone()).expect("stdout is utf8").trim().to_string()
}

fn message_file(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("gasfree-cli-{}-{}.json", name, std::process::id()));
    std::fs::write(&path, MESSAGE).expect("write temp message");
    path
}

fn digest_for(network: &str) -> String {
    let mut cmd = cli();
    cmd.args(["--network", network, "digest"]);
    let json: Value = serde_json::from_str(&stdout_of(&run_with_stdin(cmd, MESSAGE))).expect("digest is json");
    json["digest"].as_str().expect("digest field").to_string()
}

#[test]
fn type_string_matches_controller() {
    let output = cli().arg("type-string").output().expect("cli run succeeds");
    assert_eq!(
        stdout_of(&output),
        "PermitTransfer(address token,address serviceProvider,address user,address receiver,uint256 value,uint256 maxFee,uint256 deadline,uint256 version,uint256 nonce)"
    );

    let output = cli().args(["type-string", "--hash"]).output().expect("cli run succeeds");
    assert_eq!(
        stdout_of(&output),
        "7152a81926d9e798ca737da749154c32625b4ff2ffa7b4fe94e46d745c5202f4"
    );
}

#[test]
fn address_derives_from_key() {
    let output = cli().args(["address", "--key", TEST_KEY]).output().expect("cli run succeeds");
    assert_eq!(stdout_of(&output), TEST_ADDRESS);

    let output = cli()
        .arg("address")
        .env("GASFREE_PRIVATE_KEY", TEST_KEY)
        .output()
        .expect("cli run succeeds");
    assert_eq!(stdout_of(&output), TEST_ADDRESS);
}

#[test]
fn digest_uses_selected_network() {
    assert_eq!(
        digest_for("nile"),
        "40d7033c90c6af2e8d903626738acfd2703824dc2d8079a7fcb49228d343ce2c"
    );
    assert_eq!(
        digest_for("mainnet"),
        "a327b931d153ef4828e1f1b117732d1f8a78c758ff5094066aea2a074790393b"
    );
}

#[test]
fn sign_is_deterministic_and_recoverable() {
    let path = message_file("sign");

    let first = cli()
        .args(["sign", "--key", TEST_KEY])
        .arg(&path)
        .output()
        .expect("cli run succeeds");
    let second = cli()
        .args(["sign", "--key", TEST_KEY])
        .arg(&path)
        .output()
        .expect("cli run succeeds");
    let _ = std::fs::remove_file(&path);

    let sig = stdout_of(&first);
    assert_eq!(sig, stdout_of(&second));
    assert_eq!(sig.len(), 130);

    let digest = hex::decode(digest_for("nile")).expect("digest hex");
    let signature = Eip712Signature::from_hex(&sig).expect("signature parses");
    assert_eq!(recover_address(&digest, &signature).expect("recover"), TEST_ADDRESS);
}

#[test]
fn sign_differs_between_networks() {
    let mut nile = cli();
    nile.args(["sign", "--key", TEST_KEY]);
    let mut mainnet = cli();
    mainnet.args(["--network", "mainnet", "sign", "--key", TEST_KEY]);

    let nile_sig = stdout_of(&run_with_stdin(nile, MESSAGE));
    let mainnet_sig = stdout_of(&run_with_stdin(mainnet, MESSAGE));
    assert_eq!(mainnet_sig.len(), 130);
    assert_ne!(nile_sig, mainnet_sig);
}

#[test]
fn sign_request_emits_transfer_body() {
    let mut cmd = cli();
    cmd.args(["sign", "--key", TEST_KEY, "--request", "--raw-v"]);
    let body: Value = serde_json::from_str(&stdout_of(&run_with_stdin(cmd, MESSAGE))).expect("body is json");

    assert_eq!(body["serviceProvider"], "TGzz8gjYiYRqpfmDwnLxfgPuLVNmpCswVp");
    assert_eq!(body["value"], "3000000");
    let sig = body["sig"].as_str().expect("sig field");
    assert_eq!(sig.len(), 130);
    let v = u8::from_str_radix(&sig[128..], 16).expect("v byte");
    assert!(v <= 1);
}

fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock after epoch")
        .as_secs()
}

fn signed_deadline(message: &str, extra: &[&str]) -> (u64, u64, u64) {
    let mut cmd = cli();
    cmd.env("GASFREE_DEADLINE_SECS", "600")
        .args(["sign", "--key", TEST_KEY, "--request"])
        .args(extra);

    let before = unix_now();
    let stdout = stdout_of(&run_with_stdin(cmd, message));
    let after = unix_now();

    let request: TransferRequest = serde_json::from_str(&stdout).expect("body parses");
    let digest = request.permit.digest(&NetworkDomain::NILE.to_domain()).expect("digest");
    let sig = Eip712Signature::from_hex(&request.sig).expect("signature parses");
    assert_eq!(recover_address(&digest, &sig).expect("recover"), TEST_ADDRESS);

    (before, request.permit.deadline, after)
}

#[test]
fn sign_fills_deadline_from_window() {
    let without_deadline = MESSAGE.replace("\"deadline\": \"1749371692\",", "");
    assert!(!without_deadline.contains("deadline"));

    let (before, deadline, after) = signed_deadline(&without_deadline, &[]);
    assert!(deadline >= before + 600, "deadline {} too early", deadline);
    assert!(deadline <= after + 600, "deadline {} too late", deadline);

    let (before, deadline, after) = signed_deadline(MESSAGE, &["--expire"]);
    assert!(deadline >= before + 600 && deadline <= after + 600);

    let (_, deadline, _) = signed_deadline(MESSAGE, &[]);
    assert_eq!(deadline, 1_749_371_692);
}

#[test]
fn missing_key_fails() {
    let output = run_with_stdin(
        {
            let mut cmd = cli();
            cmd.arg("sign");
            cmd
        },
        MESSAGE,
    );
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("GASFREE_PRIVATE_KEY"));
}

#[test]
fn missing_field_is_reported() {
    let mut cmd = cli();
    cmd.args(["sign", "--key", TEST_KEY]);
    let output = run_with_stdin(cmd, r#"{"token": "TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t"}"#);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("serviceProvider"));
}
