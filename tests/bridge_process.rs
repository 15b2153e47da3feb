//! Bridge sessions against real helper processes
//!
//! Each helper is a small `sh` script speaking the bridge line protocol, so
//! these tests exercise real pipes, process exit and reaping.

#![cfg(target_os = "linux")]

use arrow::array::{Array, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use candle_core::{Device, Tensor};
use offtarget::prelude::*;
use std::path::Path;
use std::sync::Arc;
use tempfile::tempdir;

/// Answers every request; handle is `m<descriptor length>`, bits are
/// `<length> 7`; descriptors containing `?` are rejected
const WELL_BEHAVED: &str = r#"
tab="$(printf '\t')"
while IFS="$tab" read -r verb payload; do
    case "$verb" in
        parse)
            case "$payload" in
                *'?'*) printf 'err\tcould not parse %s\n' "$payload" ;;
                *) printf 'ok\tm%s\n' "${#payload}" ;;
            esac ;;
        fingerprint) printf 'ok\t%s 7\n' "${payload#m}" ;;
        quit) exit 0 ;;
    esac
done
"#;

/// Serves one molecule, then exits without waiting for `quit`
const EXITS_EARLY: &str = r#"
read -r request
printf 'ok\tm1\n'
read -r request
printf 'ok\t2 4\n'
exit 0
"#;

fn helper(script: &str) -> BridgeConfig {
    BridgeConfig::new("sh").arg("-c").arg(script)
}

/// A helper that writes a JVM-style banner to stdout before serving
fn noisy_helper() -> BridgeConfig {
    helper(&format!(
        "printf 'Picked up JAVA_TOOL_OPTIONS: -Xmx2g\\n'\n{}",
        WELL_BEHAVED
    ))
}

fn is_running(pid: u32) -> bool {
    Path::new(&format!("/proc/{}", pid)).exists()
}

fn smiles_table(smiles: &[&str]) -> RecordBatch {
    let schema = Arc::new(Schema::new(vec![Field::new("smiles", DataType::Utf8, true)]));
    RecordBatch::try_new(schema, vec![Arc::new(StringArray::from(smiles.to_vec()))]).unwrap()
}

fn model_registry(dir: &Path) -> ModelRegistry {
    let device = Device::Cpu;
    MlpClassifier::from_layers(vec![(
        Tensor::full(0.0f32, (1, FINGERPRINT_LENGTH), &device).unwrap(),
        Tensor::new(&[0.0f32], &device).unwrap(),
    )])
    .unwrap()
    .save(dir.join("herg.safetensors"))
    .unwrap();
    ModelRegistry::discover(dir).unwrap()
}

#[test]
fn test_well_behaved_session() {
    let bridge = ProcessBridge::launch(&helper(WELL_BEHAVED)).unwrap();
    let pid = bridge.id();
    let mut adapter = FingerprintAdapter::new(bridge);

    let vector = adapter.compute("CCO").unwrap();
    assert_eq!(vector.iter_ones().collect::<Vec<_>>(), vec![3, 7]);

    let err = adapter.compute("C1CC?").unwrap_err();
    assert!(matches!(
        err,
        FeaturizationError::Parse {
            source: EngineError::Rejected(_),
            ..
        }
    ));

    let vector = adapter.compute("c1ccccc1").unwrap();
    assert_eq!(vector.iter_ones().collect::<Vec<_>>(), vec![7, 8]);

    let stats = adapter.close().unwrap();
    assert_eq!(stats.computed, 3);
    assert_eq!(stats.failed, 1);
    assert!(!is_running(pid));
}

#[test]
fn test_scoring_through_helper() {
    let dir = tempdir().unwrap();
    let pipeline = ScoringPipeline::new(
        MlpBackend,
        model_registry(dir.path()),
        ScoringConfig::default(),
    );
    let mut adapter = FingerprintAdapter::new(ProcessBridge::launch(&helper(WELL_BEHAVED)).unwrap());

    let scored = pipeline
        .score(&mut adapter, &smiles_table(&["CCO", "C?", "CCN"]))
        .unwrap();
    adapter.close().unwrap();

    assert_eq!(scored.stats.featurized, 2);
    let herg = scored
        .table
        .column_by_name("herg")
        .unwrap()
        .as_any()
        .downcast_ref::<Float64Array>()
        .unwrap();
    assert_eq!(herg.value(0), 0.5);
    assert!(herg.is_null(1));
    assert_eq!(herg.value(2), 0.5);
}

/// A stray stdout line must never shift replies onto the wrong molecule
#[test]
fn test_stdout_noise_stops_session() {
    let bridge = ProcessBridge::launch(&noisy_helper()).unwrap();
    let pid = bridge.id();
    let mut adapter = FingerprintAdapter::new(bridge);

    let first = adapter.compute("CCO").unwrap_err();
    assert!(matches!(
        first,
        FeaturizationError::Parse {
            source: EngineError::Protocol(_),
            ..
        }
    ));
    assert!(!first.is_session_lost());

    // Replies to earlier requests are still queued; none may be consumed
    for descriptor in ["CCN", "c1ccccc1"] {
        assert!(adapter.compute(descriptor).unwrap_err().is_session_lost());
    }

    adapter.close().unwrap();
    assert!(!is_running(pid));
}

#[test]
fn test_stdout_noise_aborts_scoring() {
    let dir = tempdir().unwrap();
    let pipeline = ScoringPipeline::new(
        MlpBackend,
        model_registry(dir.path()),
        ScoringConfig::default(),
    );
    let mut adapter = FingerprintAdapter::new(ProcessBridge::launch(&noisy_helper()).unwrap());

    let err = pipeline
        .score(&mut adapter, &smiles_table(&["CCO", "CCN", "CCCC"]))
        .unwrap_err();
    assert!(matches!(
        err,
        ScoringError::EngineUnavailable(ref e) if e.is_session_lost()
    ));

    let stats = adapter.close().unwrap();
    assert_eq!(stats.computed, 2);
    assert_eq!(stats.failed, 2);
}

#[test]
fn test_helper_exiting_early() {
    let bridge = ProcessBridge::launch(&helper(EXITS_EARLY)).unwrap();
    let pid = bridge.id();
    let mut adapter = FingerprintAdapter::new(bridge);

    let vector = adapter.compute("CCO").unwrap();
    assert_eq!(vector.iter_ones().collect::<Vec<_>>(), vec![2, 4]);

    // Broken pipe or EOF, depending on how far the helper got
    let lost = adapter.compute("CCN").unwrap_err();
    assert!(matches!(
        lost,
        FeaturizationError::Parse {
            source: EngineError::Protocol(_) | EngineError::IoError(_),
            ..
        }
    ));
    assert!(adapter.compute("CCCC").unwrap_err().is_session_lost());

    let stats = adapter.close().unwrap();
    assert_eq!(stats.computed, 3);
    assert_eq!(stats.failed, 2);
    assert!(!is_running(pid));
}

#[test]
fn test_drop_kills_helper() {
    let bridge = ProcessBridge::launch(&helper(WELL_BEHAVED)).unwrap();
    let pid = bridge.id();
    assert!(is_running(pid));

    drop(bridge);
    assert!(!is_running(pid));
}
