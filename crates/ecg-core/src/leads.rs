//! Standard lead naming for 12-lead ECG

/// Limb electrodes required in a raw recording
pub const LIMB_CHANNELS: [&str; 3] = ["LA", "RA", "LL"];

/// Precordial electrodes required in a raw recording
pub const PRECORDIAL_CHANNELS: [&str; 6] = ["V1", "V2", "V3", "V4", "V5", "V6"];

/// The clinical 12-lead set, in the fixed order used on the wire and in the
/// inference tensor
pub const DERIVED_LEAD_ORDER: [&str; 12] = [
    "I", "II", "III", "aVR", "aVL", "aVF", "V1", "V2", "V3", "V4", "V5", "V6",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lead_order_shape() {
        assert_eq!(DERIVED_LEAD_ORDER.len(), 12);
        // Augmented leads follow the bipolar limb leads
        assert_eq!(&DERIVED_LEAD_ORDER[..6], &["I", "II", "III", "aVR", "aVL", "aVF"]);
        assert_eq!(&DERIVED_LEAD_ORDER[6..], &PRECORDIAL_CHANNELS[..]);
    }
}
