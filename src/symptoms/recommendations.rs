//! Fixed advice lists per severity tier.

use rand::{seq::SliceRandom, Rng};

pub const PICKS: usize = 3;
pub const GENERIC: &str = "Consult a healthcare professional.";

pub static MILD: [&str; 15] = [
    "Stay hydrated and get plenty of rest.",
    "Take over-the-counter pain relievers if necessary.",
    "Monitor your symptoms for the next 24 hours.",
    "Avoid strenuous activities.",
    "Get a good night's sleep.",
    "Eat light, balanced meals.",
    "Apply a cold compress if there's any inflammation.",
    "Maintain a calm and relaxed environment.",
    "Avoid caffeine and alcohol.",
    "Take a short walk if you feel up to it.",
    "Practice gentle stretching exercises.",
    "Keep your workspace stress-free.",
    "Try deep breathing exercises to relax.",
    "Maintain regular meal times.",
    "Keep a symptom diary to track any changes.",
];

pub static MODERATE: [&str; 15] = [
    "Consult a doctor if symptoms persist for more than 72 hours.",
    "Avoid heavy physical exertion until you feel better.",
    "Stay well-hydrated and consider electrolyte drinks.",
    "Monitor your temperature regularly.",
    "Follow any prescribed medication instructions carefully.",
    "Rest and minimize stress.",
    "Eat nutritious foods to help your recovery.",
    "Use a warm compress if you experience muscle pain.",
    "Reduce or avoid strenuous work or exercise.",
    "Keep a detailed record of your symptoms.",
    "Practice relaxation techniques like meditation.",
    "Avoid foods that could irritate your condition.",
    "Ensure you get adequate sleep.",
    "Consider a follow-up with your healthcare provider.",
    "Limit exposure to stressors and noisy environments.",
];

pub static SEVERE: [&str; 15] = [
    "Seek immediate medical attention to evaluate your condition.",
    "Avoid self-medication without professional guidance.",
    "Have someone accompany you if you visit a hospital.",
    "Limit physical activities until assessed by a doctor.",
    "Follow your doctor’s instructions closely.",
    "Keep a list of current medications for review.",
    "Rest in a quiet, calm environment.",
    "Consult a specialist if symptoms do not improve.",
    "Record your symptoms and any changes for medical evaluation.",
    "Avoid heavy exertion and allow your body to recover.",
    "Be prepared to provide detailed symptom history to healthcare providers.",
    "Consider taking prescribed medication as advised.",
    "Avoid stressful activities and ensure proper rest.",
    "Monitor any additional symptoms carefully.",
    "Keep emergency contact numbers handy.",
];

pub static CRITICAL: [&str; 15] = [
    "🚨 CALL EMERGENCY SERVICES IMMEDIATELY! 🚨",
    "Do not delay seeking urgent medical care.",
    "Avoid driving yourself—ask someone to help you get to the hospital.",
    "Follow all emergency instructions from professionals.",
    "Prepare to provide a detailed account of your symptoms to emergency responders.",
    "Have a family member or friend accompany you, if possible.",
    "Do not self-medicate or try to treat severe symptoms alone.",
    "Stay as calm as possible while waiting for help.",
    "If available, take any prescribed emergency medication as directed.",
    "Keep all vital health information accessible for responders.",
    "Do not ignore severe warning signs.",
    "Immediately seek professional medical assistance.",
    "Ensure you have a way to quickly contact emergency services.",
    "Avoid any delay; your condition requires urgent attention.",
    "Follow the advice of emergency medical personnel without delay.",
];

/// Advice list for a tier label, matched case-insensitively.
pub fn for_label(label: &str) -> &'static [&'static str] {
    match label.trim().to_lowercase().as_str() {
        "mild" => &MILD[..],
        "moderate" => &MODERATE[..],
        "severe" => &SEVERE[..],
        "critical" => &CRITICAL[..],
        _ => &[GENERIC],
    }
}

/// Draws `min(3, len)` distinct entries without replacement.
pub fn select<R: Rng + ?Sized>(label: &str, rng: &mut R) -> Vec<String> {
    let list = for_label(label);
    list.choose_multiple(rng, PICKS.min(list.len()))
        .map(|s| s.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};
    use std::collections::HashSet;

    #[test]
    fn picks_three_distinct_members_of_tier() {
        let mut rng = StdRng::seed_from_u64(7);
        for (label, list) in [
            ("Mild", &MILD),
            ("Moderate", &MODERATE),
            ("Severe", &SEVERE),
            ("Critical", &CRITICAL),
        ] {
            for _ in 0..50 {
                let picked = select(label, &mut rng);
                assert_eq!(picked.len(), 3);
                let uniq: HashSet<_> = picked.iter().collect();
                assert_eq!(uniq.len(), 3);
                assert!(picked.iter().all(|p| list.contains(&p.as_str())));
            }
        }
    }

    #[test]
    fn label_lookup_ignores_case() {
        assert_eq!(for_label("SEVERE").len(), 15);
        assert_eq!(for_label(" critical ")[0], CRITICAL[0]);
    }

    #[test]
    fn unknown_label_gets_generic_advice() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(select("Unknown", &mut rng), vec![GENERIC.to_string()]);
    }

    #[test]
    fn tiers_have_fifteen_unique_entries() {
        for list in [&MILD, &MODERATE, &SEVERE, &CRITICAL] {
            let uniq: HashSet<_> = list.iter().collect();
            assert_eq!(uniq.len(), 15);
        }
    }
}
