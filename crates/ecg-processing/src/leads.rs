//! Derivation of the clinical 12-lead set from raw electrode potentials

use ecg_core::{
    EcgResult, SignalBlock, DERIVED_LEAD_ORDER, LIMB_CHANNELS, PRECORDIAL_CHANNELS,
};

/// Coefficient of the Wilson central-terminal correction applied to the
/// precordial channels
const WILSON_COEFF: f64 = 0.333;

/// Derive the standard 12-lead set from a raw recording
///
/// The input must carry the `LA`, `RA`, `LL` limb channels and `V1..V6`
/// precordial channels (any order, names matched case-insensitively). The
/// output holds `I, II, III, aVR, aVL, aVF, V1..V6` in that order, computed
/// sample-aligned:
///
/// ```text
/// I   = LA - RA
/// II  = LL - RA
/// III = LL - LA
/// aVR = -0.5*(I + II)
/// aVL =  0.5*(I - III)
/// aVF =  0.5*(II + III)
/// Vk' = Vk - 0.333*(LA + RA + LL)
/// ```
///
/// By construction `I + III == II` and `aVR + aVL + aVF == 0`.
pub fn derive_leads(raw: &SignalBlock) -> EcgResult<SignalBlock> {
    let la = raw.require_channel(LIMB_CHANNELS[0])?;
    let ra = raw.require_channel(LIMB_CHANNELS[1])?;
    let ll = raw.require_channel(LIMB_CHANNELS[2])?;

    let n = raw.samples_per_channel();

    let mut lead_i = Vec::with_capacity(n);
    let mut lead_ii = Vec::with_capacity(n);
    let mut lead_iii = Vec::with_capacity(n);
    let mut avr = Vec::with_capacity(n);
    let mut avl = Vec::with_capacity(n);
    let mut avf = Vec::with_capacity(n);

    for ((&la_v, &ra_v), &ll_v) in la.iter().zip(ra).zip(ll) {
        let i = la_v - ra_v;
        let ii = ll_v - ra_v;
        let iii = ll_v - la_v;
        lead_i.push(i);
        lead_ii.push(ii);
        lead_iii.push(iii);
        avr.push(-0.5 * (i + ii));
        avl.push(0.5 * (i - iii));
        avf.push(0.5 * (ii + iii));
    }

    let mut derived = vec![
        (DERIVED_LEAD_ORDER[0].to_string(), lead_i),
        (DERIVED_LEAD_ORDER[1].to_string(), lead_ii),
        (DERIVED_LEAD_ORDER[2].to_string(), lead_iii),
        (DERIVED_LEAD_ORDER[3].to_string(), avr),
        (DERIVED_LEAD_ORDER[4].to_string(), avl),
        (DERIVED_LEAD_ORDER[5].to_string(), avf),
    ];

    for name in PRECORDIAL_CHANNELS {
        let vk = raw.require_channel(name)?;
        let corrected = vk
            .iter()
            .zip(la.iter().zip(ra).zip(ll))
            .map(|(&v, ((&la_v, &ra_v), &ll_v))| v - WILSON_COEFF * (la_v + ra_v + ll_v))
            .collect();
        derived.push((name.to_string(), corrected));
    }

    SignalBlock::new(derived, raw.sample_rate_hz())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecg_core::EcgError;

    fn raw_block(n: usize) -> SignalBlock {
        let mut channels = vec![
            ("LA".to_string(), (0..n).map(|i| (i as f64 * 0.01).sin()).collect()),
            ("RA".to_string(), (0..n).map(|i| (i as f64 * 0.013).cos()).collect()),
            ("LL".to_string(), (0..n).map(|i| (i as f64 * 0.007).sin() * 0.5).collect()),
        ];
        for (k, name) in PRECORDIAL_CHANNELS.iter().enumerate() {
            let scale = 0.1 * (k + 1) as f64;
            channels.push((name.to_string(), (0..n).map(|i| scale * (i as f64 * 0.02).sin()).collect()));
        }
        SignalBlock::new(channels, 2000.0).unwrap()
    }

    fn max_rel_err(a: &[f64], b: &[f64]) -> f64 {
        a.iter()
            .zip(b)
            .map(|(&x, &y)| {
                let scale = x.abs().max(y.abs()).max(1.0);
                (x - y).abs() / scale
            })
            .fold(0.0, f64::max)
    }

    #[test]
    fn test_lead_order_and_count() {
        let derived = derive_leads(&raw_block(256)).unwrap();
        assert_eq!(derived.channel_count(), 12);
        let names: Vec<&str> = derived.names().iter().map(String::as_str).collect();
        assert_eq!(names, DERIVED_LEAD_ORDER);
    }

    #[test]
    fn test_einthoven_identity() {
        let derived = derive_leads(&raw_block(512)).unwrap();
        let i = derived.channel("I").unwrap();
        let ii = derived.channel("II").unwrap();
        let iii = derived.channel("III").unwrap();

        let sum: Vec<f64> = i.iter().zip(iii).map(|(&a, &b)| a + b).collect();
        assert!(max_rel_err(&sum, ii) < 1e-6);
    }

    #[test]
    fn test_augmented_leads_sum_to_zero() {
        let derived = derive_leads(&raw_block(512)).unwrap();
        let avr = derived.channel("aVR").unwrap();
        let avl = derived.channel("aVL").unwrap();
        let avf = derived.channel("aVF").unwrap();

        for ((&r, &l), &f) in avr.iter().zip(avl).zip(avf) {
            assert!((r + l + f).abs() < 1e-6);
        }
    }

    #[test]
    fn test_wilson_correction() {
        let raw = raw_block(64);
        let derived = derive_leads(&raw).unwrap();
        let la = raw.channel("LA").unwrap();
        let ra = raw.channel("RA").unwrap();
        let ll = raw.channel("LL").unwrap();
        let v3 = raw.channel("V3").unwrap();
        let v3_prime = derived.channel("V3").unwrap();

        for i in 0..64 {
            let expected = v3[i] - 0.333 * (la[i] + ra[i] + ll[i]);
            assert!((v3_prime[i] - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn test_missing_channel() {
        let channels = vec![
            ("LA".to_string(), vec![0.0; 16]),
            ("RA".to_string(), vec![0.0; 16]),
            // LL and the precordials absent
        ];
        let raw = SignalBlock::new(channels, 2000.0).unwrap();
        let err = derive_leads(&raw).unwrap_err();
        assert_eq!(err, EcgError::MissingChannel { channel: "LL".to_string() });
    }
}
