//! Screening colonoscopy eligibility policy.
//!
//! Single pass, every branch terminal. Declined unless an approval branch is
//! reached explicitly.

use super::types::{ClaimCriteria, ConfidenceTracker, EligibilityOutcome};
use super::AdjudicationError;

const PEDIATRIC_MAX_AGE: i32 = 21;
const SCREENING_MIN_AGE: i32 = 40;
const CANCER_HISTORY_MIN_AGE: i32 = 45;

/// Walk the criteria through the eligibility policy for procedure `cpt`.
///
/// Fails only when a criterion carries the wrong value shape (e.g. a
/// non-numeric age).
pub fn decide(criteria: &ClaimCriteria, cpt: u32) -> Result<EligibilityOutcome, AdjudicationError> {
    let age = criteria.age.as_years()?;
    let requested = criteria.procedure.as_flag()?;
    let treatment_improved = criteria.treatment.as_flag()?;
    let polyposis = criteria.polyposis.as_flag()?;
    let symptomatic = criteria.symptomatic.as_flag()?;
    let prior_colonoscopy = criteria.prior_colonoscopy.as_flag()?;
    let cancer_history = criteria.cancer_history.as_flag()?;

    let mut tracker = ConfidenceTracker::new(&criteria.procedure, &criteria.age);

    if !requested {
        return Ok(tracker.decline(format!("{cpt} is not identified among the requested procedures")));
    }

    tracker.consult(&[&criteria.treatment]);
    if treatment_improved {
        return Ok(tracker.decline(criteria.treatment.evidence.clone()));
    }

    if polyposis {
        tracker.consult(&[&criteria.polyposis]);
        return Ok(tracker.approve(format!(
            "Patient of age {age} with family history of colonic adenomatous polyposis"
        )));
    }

    if age <= PEDIATRIC_MAX_AGE {
        if symptomatic {
            tracker.consult(&[&criteria.symptomatic]);
            return Ok(tracker.approve(format!(
                "Pediatric patient of age {age} with symptoms as mentioned in report here:\n{}",
                criteria.symptomatic.evidence
            )));
        }
        tracker.consult(&[&criteria.polyposis, &criteria.symptomatic]);
        return Ok(tracker.decline(format!(
            "Pediatric patient of age {age} with no relevant symptoms does not match criteria for the procedure {cpt}"
        )));
    }

    if age >= SCREENING_MIN_AGE {
        if !prior_colonoscopy {
            tracker.consult(&[&criteria.prior_colonoscopy]);
            return Ok(tracker.approve(format!(
                "Patient of age {age} with no colonoscopy in last 10 years"
            )));
        }

        if age < CANCER_HISTORY_MIN_AGE {
            tracker.consult(&[&criteria.prior_colonoscopy, &criteria.polyposis]);
            return Ok(tracker.decline(format!(
                "Patient of age {age} had colonoscopy in last 10 years as mentioned in report here:\n{}",
                criteria.prior_colonoscopy.evidence
            )));
        }

        if !cancer_history {
            tracker.consult(&[&criteria.cancer_history, &criteria.prior_colonoscopy, &criteria.polyposis]);
            return Ok(tracker.decline(format!(
                "Patient of age {age} with no family history of colorectal cancer and had colonoscopy in last 10 years as mentioned in report here:\n{}",
                criteria.prior_colonoscopy.evidence
            )));
        }

        if symptomatic {
            tracker.consult(&[&criteria.cancer_history, &criteria.symptomatic]);
            return Ok(tracker.approve(format!(
                "Patient of age {age} with symptoms and family history of colorectal cancer as mentioned in report here:\n{}\n{}",
                criteria.cancer_history.evidence, criteria.symptomatic.evidence
            )));
        }

        tracker.consult(&[
            &criteria.cancer_history,
            &criteria.symptomatic,
            &criteria.prior_colonoscopy,
            &criteria.polyposis,
        ]);
        return Ok(tracker.decline(format!(
            "Patient of age {age} with family history of colorectal cancer, colonoscopy in last 10 years but no relevant symptoms"
        )));
    }

    tracker.consult(&[&criteria.polyposis]);
    Ok(tracker.decline(format!(
        "Patient of age {age} with no family history of colonic adenomatous polyposis of unknown etiology"
    )))
}
