//! Built-in Scenarios
//!
//! Default training scripts loaded into an empty data store so the landing
//! page is never blank on a fresh install. Seeded scenarios are marked
//! `createdBy: "system"` and remain editable by instructors like any other.

use chrono::Utc;
use wardsim_core::scenario::{HospitalSetting, Interaction, Scenario};

fn system(message: &str) -> Interaction {
    Interaction::System {
        message: message.to_string(),
    }
}

fn patient(message: &str) -> Interaction {
    Interaction::Patient {
        message: message.to_string(),
    }
}

fn nurse(expected: &str, correct: &str, rationale: &str) -> Interaction {
    Interaction::Nurse {
        expected_response: expected.to_string(),
        correct_response: correct.to_string(),
        rationale: rationale.to_string(),
    }
}

/// The scenarios written into a fresh data store.
pub fn default_scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            id: "chest-pain-assessment".to_string(),
            title: "Acute Chest Pain Assessment".to_string(),
            hospital_setting: HospitalSetting::Emergency,
            description: "Initial nursing assessment of a patient presenting \
                          with acute chest pain."
                .to_string(),
            patient_profile: "58-year-old male, diaphoretic, clutching his chest. \
                              History of hypertension and smoking."
                .to_string(),
            timer_minutes: Some(10),
            interactions: vec![
                system("You are triaging in the Emergency Department. A patient is wheeled in."),
                patient("My chest feels so tight... it's been hurting for about an hour."),
                nurse(
                    "pain,scale,rate,describe",
                    "Can you describe the pain and rate it on a scale of 0 to 10?",
                    "Pain characteristics and severity guide triage priority and \
                     differentiate cardiac from non-cardiac causes.",
                ),
                patient("It's like a heavy pressure, maybe an 8. It goes down my left arm."),
                nurse(
                    "vitals,vital signs,ecg,ekg,oxygen",
                    "I'm going to check your vital signs, start oxygen and get a 12-lead ECG right away.",
                    "Radiating chest pressure is a red flag for myocardial infarction; \
                     vitals and a 12-lead ECG are immediate priorities.",
                ),
                system("Hint: think about who else needs to know about this patient."),
                nurse(
                    "doctor,physician,provider,notify",
                    "I will notify the physician immediately about the suspected cardiac event.",
                    "Early provider notification shortens door-to-treatment time.",
                ),
            ],
            created_by: "system".to_string(),
            date_created: Utc::now(),
        },
        Scenario {
            id: "post-op-recovery".to_string(),
            title: "Post-Operative Recovery Check".to_string(),
            hospital_setting: HospitalSetting::Surgical,
            description: "First assessment of a patient returning from an \
                          uncomplicated appendectomy."
                .to_string(),
            patient_profile: "45-year-old female, two hours post laparoscopic \
                              appendectomy, drowsy but responsive."
                .to_string(),
            timer_minutes: None,
            interactions: vec![
                system("The patient has just arrived on the surgical ward from recovery."),
                patient("I feel a bit sick to my stomach, and the cut area is sore."),
                nurse(
                    "pain,nausea,assess,medication",
                    "Let me assess your pain and nausea; I can get you medication for both.",
                    "Post-operative nausea and pain are expected and should be \
                     treated promptly to support early mobilisation.",
                ),
                nurse(
                    "wound,dressing,incision,site",
                    "I'm going to check your incision site and dressing for any bleeding.",
                    "Early detection of bleeding or dehiscence prevents complications.",
                ),
                // Ungraded reflection prompt: any response is accepted.
                nurse(
                    "",
                    "Reassure the patient and explain the plan for the next few hours.",
                    "",
                ),
            ],
            created_by: "system".to_string(),
            date_created: Utc::now(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_scenarios_are_system_authored() {
        let scenarios = default_scenarios();
        assert!(!scenarios.is_empty());
        for scenario in &scenarios {
            assert_eq!(scenario.created_by, "system");
            assert!(!scenario.interactions.is_empty());
        }
    }

    #[test]
    fn test_seed_ids_are_unique() {
        let scenarios = default_scenarios();
        let mut ids: Vec<_> = scenarios.iter().map(|s| s.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), scenarios.len());
    }

    #[test]
    fn test_seed_includes_timed_and_untimed() {
        let scenarios = default_scenarios();
        assert!(scenarios.iter().any(|s| s.is_timed()));
        assert!(scenarios.iter().any(|s| !s.is_timed()));
    }
}
