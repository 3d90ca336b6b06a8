//! Document schema rules shared by every store backend.
//!
//! Violations are reported per field path, using the same wording for every
//! backend so that API clients see identical error bodies.

use std::collections::BTreeMap;

use locator_location_models::{OpeningPeriod, Review};

use crate::StoreError;

/// Field path → message.
pub type FieldErrors = BTreeMap<String, String>;

/// Lowest accepted review rating.
pub const MIN_RATING: i32 = 0;

/// Highest accepted review rating.
pub const MAX_RATING: i32 = 5;

/// Checks the detail fields of a location.
///
/// # Errors
///
/// Returns [`StoreError::Validation`] listing every violated field.
pub fn validate_details(name: &str, opening_times: &[OpeningPeriod]) -> Result<(), StoreError> {
    let mut errors = FieldErrors::new();

    if name.trim().is_empty() {
        errors.insert("name".to_string(), required("name"));
    }

    for (i, period) in opening_times.iter().enumerate() {
        if period.days.trim().is_empty() {
            let path = format!("openingTimes.{i}.days");
            errors.insert(path.clone(), required(&path));
        }
    }

    into_result(errors)
}

/// Checks every embedded review.
///
/// # Errors
///
/// Returns [`StoreError::Validation`] listing every violated field.
pub fn validate_reviews(reviews: &[Review]) -> Result<(), StoreError> {
    let mut errors = FieldErrors::new();

    for (i, review) in reviews.iter().enumerate() {
        if review.author.trim().is_empty() {
            let path = format!("reviews.{i}.author");
            errors.insert(path.clone(), required(&path));
        }
        if review.review_text.trim().is_empty() {
            let path = format!("reviews.{i}.reviewText");
            errors.insert(path.clone(), required(&path));
        }
        if review.rating < MIN_RATING {
            errors.insert(
                format!("reviews.{i}.rating"),
                format!(
                    "Path `rating` ({}) is less than minimum allowed value ({MIN_RATING}).",
                    review.rating
                ),
            );
        } else if review.rating > MAX_RATING {
            errors.insert(
                format!("reviews.{i}.rating"),
                format!(
                    "Path `rating` ({}) is more than maximum allowed value ({MAX_RATING}).",
                    review.rating
                ),
            );
        }
    }

    into_result(errors)
}

fn required(path: &str) -> String {
    format!("Path `{path}` is required.")
}

fn into_result(errors: FieldErrors) -> Result<(), StoreError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(StoreError::Validation(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn review(author: &str, rating: i32, text: &str) -> Review {
        Review {
            id: None,
            author: author.to_string(),
            rating,
            review_text: text.to_string(),
            created_on: Utc::now(),
        }
    }

    fn period(days: &str) -> OpeningPeriod {
        OpeningPeriod {
            days: days.to_string(),
            opening: "7:00am".to_string(),
            closing: "7:00pm".to_string(),
            closed: false,
        }
    }

    #[test]
    fn valid_details_pass() {
        assert!(validate_details("Starcups", &[period("Monday - Friday")]).is_ok());
    }

    #[test]
    fn blank_name_and_days_are_reported_per_field() {
        let Err(StoreError::Validation(errors)) =
            validate_details("  ", &[period("Saturday"), period("")])
        else {
            panic!("expected validation error");
        };

        assert_eq!(errors.len(), 2);
        assert_eq!(errors["name"], "Path `name` is required.");
        assert_eq!(
            errors["openingTimes.1.days"],
            "Path `openingTimes.1.days` is required."
        );
    }

    #[test]
    fn review_rating_bounds_are_enforced() {
        let reviews = [
            review("a", 0, "ok"),
            review("b", 5, "ok"),
            review("c", -1, "ok"),
            review("d", 6, "ok"),
        ];
        let Err(StoreError::Validation(errors)) = validate_reviews(&reviews) else {
            panic!("expected validation error");
        };

        assert_eq!(errors.len(), 2);
        assert!(errors["reviews.2.rating"].contains("less than minimum"));
        assert!(errors["reviews.3.rating"].contains("more than maximum"));
    }

    #[test]
    fn review_author_and_text_are_required() {
        let Err(StoreError::Validation(errors)) = validate_reviews(&[review("", 3, " ")]) else {
            panic!("expected validation error");
        };

        assert!(errors.contains_key("reviews.0.author"));
        assert!(errors.contains_key("reviews.0.reviewText"));
    }
}
