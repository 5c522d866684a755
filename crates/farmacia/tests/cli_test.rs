//! Integration tests for the `farmacia` CLI binary.
//!
//! Everything runs against the built-in demo data, so no backend is needed.
#![allow(clippy::unwrap_used)]

use std::io::Write;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `farmacia` binary with env isolation.
///
/// Clears all `FARMACIA_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn farmacia_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("farmacia");
    cmd.env("HOME", "/tmp/farmacia-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/farmacia-cli-test-nonexistent")
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("FARMACIA_PROFILE")
        .env_remove("FARMACIA_API_URL")
        .env_remove("FARMACIA_EMAIL")
        .env_remove("FARMACIA_PASSWORD")
        .env_remove("FARMACIA_OUTPUT")
        .env_remove("FARMACIA_INSECURE")
        .env_remove("FARMACIA_TIMEOUT")
        .env_remove("FARMACIA_DEFAULT_PROFILE");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = farmacia_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    farmacia_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("entradas")
            .and(predicate::str::contains("saidas"))
            .and(predicate::str::contains("perdas"))
            .and(predicate::str::contains("inventarios")),
    );
}

#[test]
fn test_version_flag() {
    farmacia_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("farmacia"));
}

#[test]
fn test_completions_zsh() {
    farmacia_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn test_set_requires_key_value() {
    farmacia_cmd()
        .args(["perdas", "create", "--set", "motivo"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("expected key=value"));
}

// ── Documents ───────────────────────────────────────────────────────

#[test]
fn test_entradas_list_json() {
    farmacia_cmd()
        .args(["entradas", "list", "-o", "json"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("\"nome_fornecedor\": \"Fornecedor ABC\"")
                .and(predicate::str::contains("\"status\": \"draft\""))
                .and(predicate::str::contains("LOTE123")),
        );
}

#[test]
fn test_inventarios_list_plain_in_insertion_order() {
    farmacia_cmd()
        .args(["inventarios", "list", "-o", "plain"])
        .assert()
        .success()
        .stdout("1\n2\n");
}

#[test]
fn test_get_shows_header_and_items() {
    farmacia_cmd()
        .args(["entradas", "get", "1"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Fornecedor ABC")
                .and(predicate::str::contains("Medicamento A"))
                .and(predicate::str::contains("draft")),
        );
}

#[test]
fn test_create_saida_missing_cpf_is_usage_error() {
    let output = farmacia_cmd()
        .args([
            "saidas",
            "create",
            "--set",
            "nome_paciente=Maria Santos",
            "--set",
            "nome_medico=Dr. José Silva",
            "--set",
            "crm=54321",
            "--set",
            "data_saida=2024-02-26",
        ])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("cpf_paciente"), "Expected missing field in:\n{text}");
}

#[test]
fn test_create_rejects_unknown_header_field() {
    farmacia_cmd()
        .args([
            "perdas",
            "create",
            "--set",
            "data_perda=2024-03-01",
            "--set",
            "motivoo=Quebra",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("motivoo"));
}

#[test]
fn test_create_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(br#"{"data_inventario": "2024-03-31", "motivo": "Fechamento"}"#)
        .unwrap();

    farmacia_cmd()
        .args(["inventarios", "create", "-o", "json", "--from-file"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(
            predicate::str::contains("\"motivo\": \"Fechamento\"")
                .and(predicate::str::contains("\"itens\": []")),
        )
        .stderr(predicate::str::contains("created"));
}

#[test]
fn test_add_item_rejects_zero_quantity() {
    farmacia_cmd()
        .args([
            "entradas",
            "add-item",
            "1",
            "--produto",
            "Medicamento B",
            "--quantidade",
            "0",
            "--lote",
            "LOTE456",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("quantidade"));
}

#[test]
fn test_add_item_with_dates_on_entrada() {
    farmacia_cmd()
        .args([
            "entradas",
            "add-item",
            "1",
            "--produto",
            "Medicamento B",
            "--quantidade",
            "5",
            "--lote",
            "LOTE456",
            "--fabricacao",
            "2024-01-01",
            "--validade",
            "2026-01-01",
            "-o",
            "json",
        ])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("\"dataHoraValidade\": \"2026-01-01\"")
                .and(predicate::str::contains("LOTE456")),
        );
}

#[test]
fn test_add_item_with_expiry_only() {
    farmacia_cmd()
        .args([
            "entradas",
            "add-item",
            "1",
            "--produto",
            "Medicamento B",
            "--quantidade",
            "5",
            "--lote",
            "LOTE789",
            "--validade",
            "2026-06-30",
            "-o",
            "json",
        ])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("\"dataHoraValidade\": \"2026-06-30\"")
                .and(predicate::str::contains("LOTE789")),
        );
}

#[test]
fn test_delete_unknown_is_not_found() {
    farmacia_cmd()
        .args(["perdas", "delete", "99", "--yes"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_delete_without_yes_needs_a_terminal() {
    farmacia_cmd()
        .args(["perdas", "delete", "1"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--yes"));
}

#[test]
fn test_finalize_perda() {
    farmacia_cmd()
        .args(["perdas", "finalize", "1", "--yes", "-o", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"status\": \"effective\""))
        .stderr(predicate::str::contains("finalized"));
}

#[test]
fn test_remove_unknown_item_keeps_document() {
    farmacia_cmd()
        .args(["inventarios", "remove-item", "1", "99", "-o", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("LOTE456"));
}

// ── Master data ─────────────────────────────────────────────────────

#[test]
fn test_empresas_list_plain() {
    farmacia_cmd()
        .args(["empresas", "list", "-o", "plain"])
        .assert()
        .success()
        .stdout("1\n2\n");
}

#[test]
fn test_produto_name_too_short() {
    farmacia_cmd()
        .args(["produtos", "create", "--set", "nome=Di"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("nome"));
}

#[test]
fn test_produto_create_with_raw_json_field() {
    farmacia_cmd()
        .args([
            "produtos",
            "create",
            "-o",
            "json",
            "--set",
            "nome=Dipirona 500mg",
            "--set",
            "quantidade:=10",
        ])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("\"nome\": \"Dipirona 500mg\"")
                .and(predicate::str::contains("\"quantidade\": 10")),
        );
}

#[test]
fn test_fornecedores_search() {
    farmacia_cmd()
        .args(["fornecedores", "list", "--search", "teste", "-o", "plain"])
        .assert()
        .success()
        .stdout("1\n");
}

// ── Reports and filings ─────────────────────────────────────────────

#[test]
fn test_estoque_table() {
    farmacia_cmd()
        .args(["estoque"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Medicamento A")
                .and(predicate::str::contains("LOTE456")),
        );
}

#[test]
fn test_transmit_rejects_reversed_range() {
    farmacia_cmd()
        .args(["transmitir", "--from", "2024-03-01", "--to", "2024-02-01"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("data_final"));
}

#[test]
fn test_transmit_period() {
    farmacia_cmd()
        .args(["transmitir", "--from", "2024-02-01", "--to", "2024-02-29"])
        .assert()
        .success()
        .stderr(predicate::str::contains("File transmitted"));
}

#[test]
fn test_payment_unknown_company() {
    farmacia_cmd()
        .args(["pagamento", "99", "--yes"])
        .assert()
        .code(4);
}

#[test]
fn test_payment_known_company() {
    farmacia_cmd()
        .args(["pagamento", "2", "--yes"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Empresa B"));
}

// ── Session ─────────────────────────────────────────────────────────

#[test]
fn test_login_uses_mock_user() {
    farmacia_cmd()
        .args(["login", "-o", "plain"])
        .assert()
        .success()
        .stdout("teste@farmacia.com\n");
}

#[test]
fn test_remote_without_credentials_fails() {
    farmacia_cmd()
        .args(["--remote", "entradas", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("credentials"));
}

#[test]
fn test_remote_unreachable_backend_is_connection_error() {
    farmacia_cmd()
        .args([
            "--remote",
            "--api-url",
            "http://127.0.0.1:9/api",
            "--email",
            "ana@farmacia.com",
            "--password",
            "s3cret",
            "--timeout",
            "5",
            "entradas",
            "list",
        ])
        .assert()
        .code(7);
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_set_then_show() {
    let dir = tempfile::tempdir().unwrap();
    let with_dir = |cmd: &mut assert_cmd::Command| {
        cmd.env("HOME", dir.path()).env("XDG_CONFIG_HOME", dir.path());
    };

    let mut set = farmacia_cmd();
    with_dir(&mut set);
    set.args(["config", "set", "mode", "remote"]).assert().success();

    let mut show = farmacia_cmd();
    with_dir(&mut show);
    show.args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("mode = \"remote\""));
}

#[test]
fn test_config_use_unknown_profile() {
    farmacia_cmd()
        .args(["config", "use", "nowhere"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nowhere"));
}
