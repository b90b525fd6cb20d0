//! Basal Metabolic Rate via the Harris-Benedict equation.

use crate::{Gender, Result};

/// Round to two decimal places
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// BMR in kcal/day for a parsed gender, rounded to 2 decimals
pub fn bmr_for(gender: Gender, weight_kg: f64, height_cm: f64, age_years: u32) -> f64 {
    let age = f64::from(age_years);
    let bmr = match gender {
        Gender::Male => 88.362 + 13.397 * weight_kg + 4.799 * height_cm - 5.677 * age,
        Gender::Female => 447.593 + 9.247 * weight_kg + 3.098 * height_cm - 4.330 * age,
    };
    round2(bmr)
}

/// BMR from raw gender text (`male`/`female`, any case)
///
/// Any other gender value is a validation error: the formula has no neutral branch.
pub fn compute_bmr(weight_kg: f64, height_cm: f64, age_years: u32, gender: &str) -> Result<f64> {
    let gender: Gender = gender.parse()?;
    Ok(bmr_for(gender, weight_kg, height_cm, age_years))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_male_formula() {
        let bmr = compute_bmr(75.5, 175.0, 30, "male").unwrap();
        // 88.362 + 13.397*75.5 + 4.799*175 - 5.677*30
        assert!((bmr - 1769.35).abs() < 0.01, "got {}", bmr);
    }

    #[test]
    fn test_female_formula() {
        let bmr = compute_bmr(65.0, 165.0, 28, "female").unwrap();
        let expected = 447.593 + 9.247 * 65.0 + 3.098 * 165.0 - 4.330 * 28.0;
        assert!((bmr - expected).abs() < 0.01);
        assert_eq!(bmr, 1438.58);
    }

    #[test]
    fn test_gender_case_insensitive() {
        assert_eq!(
            compute_bmr(70.0, 170.0, 25, "MALE").unwrap(),
            compute_bmr(70.0, 170.0, 25, "male").unwrap()
        );
    }

    #[test]
    fn test_unsupported_gender() {
        assert!(matches!(
            compute_bmr(70.0, 170.0, 25, "unknown"),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_result_has_two_decimals() {
        let bmr = bmr_for(Gender::Female, 58.3, 161.7, 41);
        assert_eq!(bmr, round2(bmr));
    }
}
