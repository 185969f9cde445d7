use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Deserialize;
use serde_json::json;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

use polcheck_aws::{Finding, LocalSource, PolicyResource, Summary};
use polcheck_policy::{PolicyError, PolicyEvaluator};

#[derive(Parser, Debug)]
#[command(author, version, about="polcheck — evaluate cloud access policies for public, wildcard and admin grants")]
struct Cli {
    /// Output format
    #[arg(long, value_enum, default_value_t=Format::Text, global = true)]
    format: Format,

    /// Debug-level logs on stderr
    #[arg(short, long, default_value_t=false, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, ValueEnum)]
enum Format { Text, Json }

#[derive(Subcommand, Debug)] enum Cmd {
    /// Evaluate a single policy document ('-' reads stdin)
    Eval {
        policy: PathBuf,
        /// Resource ARN to test with grants_to_resource
        #[arg(long)] target: Option<String>,
    },
    /// Run the compliance checks over the resources in a scan config
    Scan {
        /// Scan config (YAML)
        #[arg(short, long)] file: PathBuf,
        /// Only run these check ids
        #[arg(long, value_delimiter=',')] checks: Vec<String>,
        /// Concurrent resource evaluations
        #[arg(long)] jobs: Option<usize>,
        /// Exit with status 1 when any FAIL or ERROR finding exists
        #[arg(long, default_value_t=false)] fail_on_findings: bool,
    },
    /// List the available checks
    Checks,
}

#[derive(Deserialize, Debug)]
struct ScanConfig {
    #[serde(default)] account: Option<String>,
    #[serde(default)] resources: Vec<PolicyResource>,
}

fn load_config(path: &Path) -> Result<ScanConfig> {
    let bytes = std::fs::read(path).with_context(|| format!("read scan config {}", path.display()))?;
    let cfg: ScanConfig = serde_yaml::from_slice(&bytes).with_context(|| format!("parse scan config {}", path.display()))?;
    for r in &cfg.resources { r.policy_ref()?; }
    Ok(cfg)
}

fn read_policy(path: &Path) -> Result<Vec<u8>> {
    if path == Path::new("-") {
        let mut buf = Vec::new();
        std::io::stdin().read_to_end(&mut buf).context("read policy from stdin")?;
        Ok(buf)
    } else {
        std::fs::read(path).with_context(|| format!("read policy {}", path.display()))
    }
}

fn default_jobs() -> usize { std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1) }

const EXIT_OK: u8 = 0;
const EXIT_FINDINGS: u8 = 1;
const EXIT_MALFORMED: u8 = 2;

fn eval_cmd(policy: &Path, target: Option<&str>, format: Format, out: &mut impl Write) -> Result<u8> {
    let raw = read_policy(policy)?;
    let result = match PolicyEvaluator::evaluate(&raw) {
        Ok(r) => r,
        Err(PolicyError::MalformedPolicy { reason }) => {
            match format {
                Format::Json => writeln!(out, "{}", json!({ "error": "malformed_policy", "reason": reason }))?,
                Format::Text => eprintln!("ERROR: malformed policy: {reason}"),
            }
            return Ok(EXIT_MALFORMED);
        }
    };

    let grants = target.map(|t| result.grants_to_resource(t));
    match format {
        Format::Json => {
            let mut report = json!({
                "publicly_accessible": result.is_publicly_accessible(),
                "wildcard_service_actions": result.has_wildcard_service_actions(),
                "administrative_access": result.has_administrative_access(),
                "statements": result.classifications(),
                "document": result.document(),
            });
            if let (Some(t), Some(g)) = (target, grants) {
                report["target"] = json!(t);
                report["grants_to_resource"] = json!(g);
            }
            writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
        }
        Format::Text => {
            writeln!(out, "{:<26}{}", "publicly_accessible", result.is_publicly_accessible())?;
            writeln!(out, "{:<26}{}", "wildcard_service_actions", result.has_wildcard_service_actions())?;
            writeln!(out, "{:<26}{}", "administrative_access", result.has_administrative_access())?;
            if let (Some(t), Some(g)) = (target, grants) {
                writeln!(out, "{:<26}{} ({})", "grants_to_resource", g, t)?;
            }
            writeln!(out, "{:<26}{}", "statements", result.classifications().len())?;
        }
    }
    Ok(EXIT_OK)
}

fn print_findings(findings: &[Finding], summary: &Summary, format: Format, out: &mut impl Write) -> Result<()> {
    match format {
        Format::Json => {
            writeln!(out, "{}", serde_json::to_string_pretty(&json!({ "findings": findings, "summary": summary }))?)?;
        }
        Format::Text => {
            for f in findings {
                writeln!(out, "{:<15}{:<45}{:<24}{}", f.verdict, f.check_id, f.resource_name, f.message)?;
            }
            writeln!(out, "\n{summary}")?;
        }
    }
    Ok(())
}

struct ScanArgs<'a> {
    file: &'a Path,
    checks: &'a [String],
    jobs: Option<usize>,
    fail_on_findings: bool,
}

async fn scan_cmd(args: ScanArgs<'_>, format: Format, out: &mut impl Write) -> Result<u8> {
    let cfg = load_config(args.file)?;
    let checks = polcheck_aws::select(args.checks)?;
    let base_dir = args.file.parent().map(Path::to_path_buf).unwrap_or_default();
    tracing::info!(account = cfg.account.as_deref().unwrap_or("-"), resources = cfg.resources.len(), checks = checks.len(), "starting scan");

    let jobs = args.jobs.unwrap_or_else(default_jobs);
    let findings = polcheck_aws::scan(cfg.resources, Arc::new(LocalSource::new(base_dir)), checks, jobs).await?;
    let summary = Summary::from_findings(&findings);
    print_findings(&findings, &summary, format, out)?;

    Ok(if args.fail_on_findings && summary.has_failures() { EXIT_FINDINGS } else { EXIT_OK })
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt().json().with_span_events(FmtSpan::CLOSE)
        .with_max_level(level).with_writer(std::io::stderr).init();

    let mut stdout = std::io::stdout().lock();
    let status = match cli.cmd {
        Cmd::Eval { policy, target } => eval_cmd(&policy, target.as_deref(), cli.format, &mut stdout)?,
        Cmd::Scan { file, checks, jobs, fail_on_findings } => {
            let args = ScanArgs { file: &file, checks: &checks, jobs, fail_on_findings };
            scan_cmd(args, cli.format, &mut stdout).await?
        }
        Cmd::Checks => {
            for c in polcheck_aws::registry() {
                writeln!(stdout, "{:<45}{:<22}{}", c.id(), c.kind(), c.description())?;
            }
            EXIT_OK
        }
    };
    Ok(ExitCode::from(status))
}

#[cfg(test)]
mod tests {
    use super::*;
    use polcheck_aws::{PolicyRef, ResourceKind};

    #[test]
    fn test_parse_scan_config() {
        let yaml = r#"
account: "123456789012"
resources:
  - type: aws_s3_bucket
    name: logs
    arn: arn:aws:s3:::logs
    policy_file: policies/logs.json
  - type: aws_lambda_function
    name: handler
    arn: arn:aws:lambda:us-east-1:123456789012:function:handler
    policy:
      Version: "2012-10-17"
      Statement:
        - Effect: Allow
          Principal: { Service: s3.amazonaws.com }
          Action: lambda:InvokeFunction
          Resource: arn:aws:lambda:us-east-1:123456789012:function:handler
  - type: aws_iam_policy
    name: admin
    arn: arn:aws:iam::123456789012:policy/admin
"#;
        let cfg: ScanConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.account.as_deref(), Some("123456789012"));
        assert_eq!(cfg.resources.len(), 3);
        assert_eq!(cfg.resources[0].policy_ref().unwrap(), PolicyRef::File(Path::new("policies/logs.json")));
        assert_eq!(cfg.resources[1].kind, ResourceKind::LambdaFunction);
        let inline = cfg.resources[1].policy.as_ref().unwrap();
        assert_eq!(inline["Statement"][0]["Principal"]["Service"], "s3.amazonaws.com");
        assert_eq!(cfg.resources[2].policy_ref().unwrap(), PolicyRef::None);
    }

    #[test]
    fn test_load_config_rejects_both_policy_forms() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.yaml");
        std::fs::write(&path, "resources:\n  - type: aws_s3_bucket\n    name: b\n    arn: arn:aws:s3:::b\n    policy: '{}'\n    policy_file: b.json\n").unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("both policy and policy_file"));
    }

    #[test]
    fn test_cli_parses_scan_flags() {
        let cli = Cli::parse_from(["polcheck", "--format", "json", "scan", "-f", "scan.yaml", "--checks", "a,b", "--jobs", "4", "--fail-on-findings"]);
        assert_eq!(cli.format, Format::Json);
        match cli.cmd {
            Cmd::Scan { checks, jobs, fail_on_findings, .. } => {
                assert_eq!(checks, vec!["a", "b"]);
                assert_eq!(jobs, Some(4));
                assert!(fail_on_findings);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_default_jobs_positive() { assert!(default_jobs() >= 1); }

    #[tokio::test]
    async fn test_demo_config_scan() {
        let file = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos/scan.yaml");
        let cfg = load_config(&file).unwrap();
        let base = file.parent().unwrap().to_path_buf();
        let findings = polcheck_aws::scan(cfg.resources, Arc::new(LocalSource::new(base)), polcheck_aws::registry(), 2).await.unwrap();
        let summary = Summary::from_findings(&findings);
        // public-site (FAIL), audit-logs (PASS), thumbnailer x2 (PASS), ops-admin x2 (FAIL)
        assert_eq!(findings.len(), 6);
        assert_eq!(summary.fail, 3);
        assert_eq!(summary.pass, 3);
        assert_eq!(summary.error, 0);
    }

    fn write_policy(dir: &tempfile::TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    const LAMBDA_ARN: &str = "arn:aws:lambda:us-east-1:123456789012:function:f";

    #[test]
    fn test_eval_malformed_policy_exits_2() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_policy(&dir, "bad.json", r#"{"Statement":{"Effect":"Allow","Principal":"*","Resource":"*"}}"#);

        let mut out = Vec::new();
        assert_eq!(eval_cmd(&path, None, Format::Json, &mut out).unwrap(), EXIT_MALFORMED);
        let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(v["error"], "malformed_policy");
        assert!(v["reason"].as_str().unwrap().contains("missing Action"));

        let mut out = Vec::new();
        assert_eq!(eval_cmd(&path, None, Format::Text, &mut out).unwrap(), EXIT_MALFORMED);
        assert!(out.is_empty());
    }

    #[test]
    fn test_eval_json_reports_predicates_and_target() {
        let dir = tempfile::tempdir().unwrap();
        let body = format!(r#"{{"Statement":[{{"Effect":"Allow","Principal":{{"AWS":"arn:aws:iam::123456789012:root"}},"Action":"lambda:InvokeFunction","Resource":"{LAMBDA_ARN}"}}]}}"#);
        let path = write_policy(&dir, "fn.json", &body);

        let mut out = Vec::new();
        assert_eq!(eval_cmd(&path, Some(LAMBDA_ARN), Format::Json, &mut out).unwrap(), EXIT_OK);
        let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(v["publicly_accessible"], false);
        assert_eq!(v["wildcard_service_actions"], false);
        assert_eq!(v["administrative_access"], false);
        assert_eq!(v["target"], LAMBDA_ARN);
        assert_eq!(v["grants_to_resource"], true);
        assert_eq!(v["document"]["statements"][0]["principal"]["kind"], "AccountOrRole");

        let mut out = Vec::new();
        eval_cmd(&path, Some("arn:aws:lambda:us-east-1:123456789012:function:g"), Format::Json, &mut out).unwrap();
        let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(v["grants_to_resource"], false);
    }

    #[test]
    fn test_eval_text_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_policy(&dir, "admin.json", r#"{"Statement":{"Effect":"Allow","Principal":"*","Action":"*","Resource":"*"}}"#);
        let mut out = Vec::new();
        assert_eq!(eval_cmd(&path, Some(LAMBDA_ARN), Format::Text, &mut out).unwrap(), EXIT_OK);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("publicly_accessible       true"), "{text}");
        assert!(text.contains("administrative_access     true"), "{text}");
        assert!(text.contains(&format!("grants_to_resource        true ({LAMBDA_ARN})")), "{text}");
    }

    fn demo_config() -> PathBuf { Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos/scan.yaml") }

    #[tokio::test]
    async fn test_scan_fail_on_findings_exits_1() {
        let file = demo_config();
        let mut out = Vec::new();
        let args = ScanArgs { file: &file, checks: &[], jobs: Some(2), fail_on_findings: true };
        assert_eq!(scan_cmd(args, Format::Json, &mut out).await.unwrap(), EXIT_FINDINGS);
        let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(v["summary"]["fail"], 3);
        assert_eq!(v["findings"].as_array().unwrap().len(), 6);

        let mut out = Vec::new();
        let args = ScanArgs { file: &file, checks: &[], jobs: Some(2), fail_on_findings: false };
        assert_eq!(scan_cmd(args, Format::Text, &mut out).await.unwrap(), EXIT_OK);
        assert!(String::from_utf8(out).unwrap().contains("3 passed, 3 failed"));
    }

    #[tokio::test]
    async fn test_scan_error_finding_exits_1() {
        let dir = tempfile::tempdir().unwrap();
        write_policy(&dir, "bad.json", r#"{"Statement":{"Effect":"Allow","Resource":"*"}}"#);
        let file = write_policy(&dir, "scan.yaml",
            "resources:\n  - type: aws_iam_policy\n    name: broken\n    arn: arn:aws:iam::1:policy/broken\n    policy_file: bad.json\n");
        let checks = vec!["iam_policy_no_administrative_privileges".to_string()];
        let mut out = Vec::new();
        let args = ScanArgs { file: &file, checks: &checks, jobs: None, fail_on_findings: true };
        assert_eq!(scan_cmd(args, Format::Json, &mut out).await.unwrap(), EXIT_FINDINGS);
        let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(v["findings"][0]["verdict"], "ERROR");
        assert_eq!(v["summary"]["error"], 1);
    }

    #[tokio::test]
    async fn test_scan_clean_config_exits_0() {
        let dir = tempfile::tempdir().unwrap();
        let file = write_policy(&dir, "scan.yaml",
            "resources:\n  - type: aws_s3_bucket\n    name: private\n    arn: arn:aws:s3:::private\n");
        let mut out = Vec::new();
        let args = ScanArgs { file: &file, checks: &[], jobs: Some(usize::MAX), fail_on_findings: true };
        assert_eq!(scan_cmd(args, Format::Json, &mut out).await.unwrap(), EXIT_OK);
    }
}
