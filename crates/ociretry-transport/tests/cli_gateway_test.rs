//! OCI CLI gateway against a fake `oci` shell script
//!
//! The script is run through `sh` so no executable bit or PATH setup is
//! needed; it answers the three commands the gateway issues.

#![cfg(unix)]

use ociretry_transport::{
    GatewayOutput, OciCliGateway, ProcessConfig, ProviderGateway, ProvisionRequest,
    TransportError,
};
use rstest::rstest;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

const FAKE_OCI: &str = r#"
case "$1" in
  --version)
    echo "3.45.2"
    ;;
  iam)
    echo '{"data": [{"name": "kIdk:AP-MUMBAI-1-AD-1"}, {"name": "kIdk:AP-MUMBAI-1-AD-2"}]}'
    ;;
  compute)
    shift 2
    case "$*" in
      *AD-1*)
        echo 'ServiceError: {"code": "InternalError", "message": "Out of host capacity."}' >&2
        exit 1
        ;;
      *)
        echo '{"data": {"id": "ocid1.instance.oc1..xyz", "lifecycle-state": "RUNNING"}}'
        ;;
    esac
    ;;
  *)
    echo "unknown command $1" >&2
    exit 2
    ;;
esac
"#;

fn write_script(dir: &TempDir, body: &str) -> PathBuf {
    let path = dir.path().join("oci.sh");
    std::fs::write(&path, body).unwrap();
    path
}

fn gateway_for(script: &Path) -> OciCliGateway {
    OciCliGateway::with_config(
        ProcessConfig::new("sh")
            .with_arg(script.display().to_string())
            .with_timeout(Duration::from_secs(10)),
    )
}

fn request(domain: &str) -> ProvisionRequest {
    ProvisionRequest {
        compartment_id: "ocid1.compartment.oc1..aaa".to_string(),
        availability_domain: domain.to_string(),
        shape: "VM.Standard.A1.Flex".to_string(),
        ocpus: 2,
        memory_in_gbs: 12,
        image_id: "ocid1.image.oc1..bbb".to_string(),
        subnet_id: "ocid1.subnet.oc1..ccc".to_string(),
        display_name: "my-instance".to_string(),
        ssh_public_key_path: PathBuf::from("/tmp/id_rsa.pub"),
        assign_public_ip: true,
    }
}

#[tokio::test]
async fn test_check_available_returns_version() {
    let dir = TempDir::new().unwrap();
    let gateway = gateway_for(&write_script(&dir, FAKE_OCI));

    assert_eq!(gateway.check_available().await.unwrap(), "3.45.2");
}

#[tokio::test]
async fn test_check_available_fails_on_nonzero_exit() {
    let dir = TempDir::new().unwrap();
    let gateway = gateway_for(&write_script(&dir, "echo 'config file missing' >&2\nexit 3\n"));

    match gateway.check_available().await {
        Err(TransportError::NonZeroExit { status, stderr }) => {
            assert_eq!(status, 3);
            assert_eq!(stderr, "config file missing");
        }
        other => panic!("Expected NonZeroExit, got {other:?}"),
    }
}

#[tokio::test]
async fn test_list_failure_domains_returns_raw_json() {
    let dir = TempDir::new().unwrap();
    let gateway = gateway_for(&write_script(&dir, FAKE_OCI));

    let output = gateway
        .list_failure_domains("ocid1.compartment.oc1..aaa")
        .await
        .unwrap();

    assert!(output.success());
    let names: Vec<String> = output.json().unwrap()["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["kIdk:AP-MUMBAI-1-AD-1", "kIdk:AP-MUMBAI-1-AD-2"]);
}

#[rstest]
#[case::out_of_capacity("kIdk:AP-MUMBAI-1-AD-1", 1, "Out of host capacity")]
#[case::running("kIdk:AP-MUMBAI-1-AD-2", 0, "")]
#[tokio::test]
async fn test_launch_instance_captures_status_and_stderr(
    #[case] domain: &str,
    #[case] status: i32,
    #[case] stderr_fragment: &str,
) {
    let dir = TempDir::new().unwrap();
    let gateway = gateway_for(&write_script(&dir, FAKE_OCI));

    let output: GatewayOutput = gateway.launch_instance(&request(domain)).await.unwrap();

    assert_eq!(output.status, status);
    assert!(output.stderr.contains(stderr_fragment));
    if output.success() {
        assert_eq!(output.json().unwrap()["data"]["lifecycle-state"], "RUNNING");
    }
}

#[tokio::test]
async fn test_short_commands_are_bounded() {
    let dir = TempDir::new().unwrap();
    let script = write_script(&dir, "sleep 30\n");
    let gateway = OciCliGateway::with_config(
        ProcessConfig::new("sh")
            .with_arg(script.display().to_string())
            .with_timeout(Duration::from_millis(200)),
    );

    let started = std::time::Instant::now();
    let err = gateway
        .list_failure_domains("ocid1.compartment.oc1..aaa")
        .await
        .unwrap_err();

    assert!(matches!(err, TransportError::Timeout(_)));
    assert!(started.elapsed() < Duration::from_secs(10));
}
