use super::*;
use std::collections::HashMap;

/// In-memory engine keyed by descriptor
#[derive(Debug, Default)]
struct TableEngine {
    bits: HashMap<String, Vec<u32>>,
    unfingerprintable: Vec<String>,
    closed: bool,
}

impl TableEngine {
    fn with(mut self, descriptor: &str, bits: &[u32]) -> Self {
        self.bits.insert(descriptor.to_string(), bits.to_vec());
        self
    }
}

impl ChemistryEngine for TableEngine {
    type Molecule = String;

    fn parse(&mut self, descriptor: &str) -> Result<String, EngineError> {
        if self.bits.contains_key(descriptor) || self.unfingerprintable.iter().any(|d| d == descriptor) {
            Ok(descriptor.to_string())
        } else {
            Err(EngineError::Rejected(format!("unknown molecule {}", descriptor)))
        }
    }

    fn fingerprint(&mut self, molecule: &String) -> Result<Vec<u32>, EngineError> {
        self.bits
            .get(molecule)
            .cloned()
            .ok_or_else(|| EngineError::Rejected("no fingerprint".to_string()))
    }

    fn close(&mut self) -> Result<(), EngineError> {
        self.closed = true;
        Ok(())
    }
}

#[test]
fn test_vector_from_set_bits() {
    let vector = FeatureVector::from_set_bits([0, 63, 64, 1023, 64]).unwrap();
    assert_eq!(vector.len(), FINGERPRINT_LENGTH);
    assert_eq!(vector.count_ones(), 4);
    assert!(vector.get(0));
    assert!(vector.get(63));
    assert!(vector.get(64));
    assert!(vector.get(1023));
    assert!(!vector.get(1));
    assert!(!vector.get(5000));
    assert_eq!(vector.iter_ones().collect::<Vec<_>>(), vec![0, 63, 64, 1023]);
}

#[test]
fn test_vector_rejects_out_of_range_bit() {
    let err = FeatureVector::from_set_bits([3, 1024]).unwrap_err();
    assert!(matches!(
        err,
        FeaturizationError::BitOutOfRange { index: 1024, length: 1024 }
    ));
}

#[test]
fn test_vector_dense_view() {
    let vector = FeatureVector::from_set_bits([2, 10]).unwrap();
    let dense = vector.to_dense();
    assert_eq!(dense.len(), FINGERPRINT_LENGTH);
    assert_eq!(dense[2], 1.0);
    assert_eq!(dense[10], 1.0);
    assert_eq!(dense.iter().sum::<f32>(), 2.0);
    assert_eq!(FeatureVector::zeros().count_ones(), 0);
}

#[test]
fn test_adapter_compute() {
    let engine = TableEngine::default().with("CCO", &[1, 2, 3]);
    let mut adapter = FingerprintAdapter::new(engine);

    let vector = adapter.compute("CCO").unwrap();
    assert_eq!(vector.iter_ones().collect::<Vec<_>>(), vec![1, 2, 3]);

    // Cells reach the engine exactly as written
    assert!(matches!(
        adapter.compute(" CCO"),
        Err(FeaturizationError::Parse { ref descriptor, .. }) if descriptor == " CCO"
    ));
    assert_eq!(adapter.stats(), FeaturizerStats { computed: 2, failed: 1 });
}

#[test]
fn test_adapter_failures_are_featurization_errors() {
    let mut engine = TableEngine::default().with("C", &[5]).with("CC", &[2000]);
    engine.unfingerprintable.push("C1CC".to_string());
    let mut adapter = FingerprintAdapter::new(engine);

    assert!(matches!(
        adapter.compute("xyz"),
        Err(FeaturizationError::Parse { .. })
    ));
    assert!(matches!(
        adapter.compute("C1CC"),
        Err(FeaturizationError::Fingerprint { .. })
    ));
    assert!(matches!(
        adapter.compute("CC"),
        Err(FeaturizationError::BitOutOfRange { index: 2000, .. })
    ));
    assert!(matches!(
        adapter.compute("   "),
        Err(FeaturizationError::MissingDescriptor)
    ));
    assert!(adapter.compute("C").is_ok());

    let stats = adapter.stats();
    assert_eq!(stats.computed, 5);
    assert_eq!(stats.failed, 4);
}

#[test]
fn test_adapter_close_ends_session() {
    let adapter = FingerprintAdapter::new(TableEngine::default());
    assert!(!adapter.engine().closed);
    let stats = adapter.close().unwrap();
    assert_eq!(stats, FeaturizerStats::default());
}
