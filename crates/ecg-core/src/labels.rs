//! Diagnostic label vocabulary
//!
//! Fixed 26-entry vocabulary of the pretrained classifier, in the order the
//! model emits its outputs. Result messages preserve this order.

/// Per-class output labels of the classifier, in model output order
pub const LABEL_VOCABULARY: [&str; 26] = [
    "AF",
    "AFL",
    "BBB",
    "Brady",
    "CLBBB|LBBB",
    "CRBBB|RBBB",
    "IAVB",
    "IRBBB",
    "LAD",
    "LAnFB",
    "LPR",
    "LQRSV",
    "LQT",
    "NSIVCB",
    "NSR",
    "PAC|SVPB",
    "PR",
    "PRWP",
    "PVC|VPB",
    "QAb",
    "RAD",
    "SA",
    "SB",
    "STach",
    "TAb",
    "TInv",
];

/// Sentinel published when no label clears the decision threshold
pub const NORMAL_SENTINEL: &str = "Normal";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vocabulary_size() {
        assert_eq!(LABEL_VOCABULARY.len(), 26);
    }

    #[test]
    fn test_vocabulary_has_no_duplicates() {
        for (i, a) in LABEL_VOCABULARY.iter().enumerate() {
            for b in &LABEL_VOCABULARY[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
