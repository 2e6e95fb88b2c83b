//! API models for daily scores.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use crate::{
    db::models::scores::ScoreDBResponse,
    errors::Error,
    types::{MAX_SCORE, MIN_SCORE},
};

/// A score submission as it arrives, from JSON or from a form.
///
/// `score` is kept loose: browsers send form and `<input type="number">` values as strings, API
/// clients send numbers. [`ScoreSubmission::validate`] turns it into a [`ValidScore`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ScoreSubmission {
    /// Calendar date, `YYYY-MM-DD`
    #[schema(example = "2024-01-15")]
    pub date: Option<String>,
    /// Integer from 1 to 10, as a number or numeric string
    #[schema(value_type = Option<i64>, example = 7)]
    pub score: Option<Value>,
}

/// A submission that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidScore {
    pub date: NaiveDate,
    pub score: i64,
}

impl ScoreSubmission {
    pub fn validate(self) -> Result<ValidScore, Error> {
        let date = self.date.as_deref().map(str::trim).filter(|d| !d.is_empty());
        let score = self.score.filter(|s| match s {
            Value::Null => false,
            Value::String(s) => !s.trim().is_empty(),
            _ => true,
        });

        let (Some(date), Some(score)) = (date, score) else {
            return Err(Error::validation("Date and score are required"));
        };

        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|_| Error::validation("Invalid date format, expected YYYY-MM-DD"))?;

        let score = match &score {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        }
        .ok_or_else(|| Error::validation("Score must be an integer"))?;

        if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
            return Err(Error::validation(format!("Score must be between {MIN_SCORE} and {MAX_SCORE}")));
        }

        Ok(ValidScore { date, score })
    }
}

/// One day's score in a window listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ScoreEntry {
    #[schema(value_type = String, format = Date, example = "2024-01-15")]
    pub date: NaiveDate,
    pub score: i64,
}

impl From<ScoreDBResponse> for ScoreEntry {
    fn from(score: ScoreDBResponse) -> Self {
        Self {
            date: score.date,
            score: score.score,
        }
    }
}

/// Query parameters for score listings
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct ScoreWindowQuery {
    /// Look-back window in days ending today (UTC). Defaults to the deployment's configured window.
    pub days: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn submission(value: Value) -> ScoreSubmission {
        serde_json::from_value(value).unwrap()
    }

    fn message(result: Result<ValidScore, Error>) -> String {
        result.unwrap_err().user_message()
    }

    #[test]
    fn test_valid_number_and_string_scores() {
        let expected = ValidScore {
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            score: 7,
        };

        assert_eq!(submission(json!({"date": "2024-01-15", "score": 7})).validate().unwrap(), expected);
        assert_eq!(submission(json!({"date": "2024-01-15", "score": "7"})).validate().unwrap(), expected);
        assert_eq!(submission(json!({"date": " 2024-01-15 ", "score": " 7 "})).validate().unwrap(), expected);
    }

    #[test]
    fn test_missing_fields() {
        for value in [
            json!({}),
            json!({"date": "2024-01-15"}),
            json!({"score": 5}),
            json!({"date": "", "score": 5}),
            json!({"date": "2024-01-15", "score": ""}),
            json!({"date": "2024-01-15", "score": null}),
        ] {
            assert_eq!(message(submission(value).validate()), "Date and score are required");
        }
    }

    #[test]
    fn test_bad_date() {
        for date in ["15/01/2024", "2024-13-01", "2024-02-30", "yesterday"] {
            assert_eq!(
                message(submission(json!({"date": date, "score": 5})).validate()),
                "Invalid date format, expected YYYY-MM-DD"
            );
        }
    }

    #[test]
    fn test_non_integer_scores() {
        for score in [json!("abc"), json!(7.5), json!(true), json!([7]), json!("7.0")] {
            assert_eq!(
                message(submission(json!({"date": "2024-01-15", "score": score})).validate()),
                "Score must be an integer"
            );
        }
    }

    #[test]
    fn test_out_of_range_scores() {
        for score in [json!(0), json!(11), json!("-3"), json!(100)] {
            assert_eq!(
                message(submission(json!({"date": "2024-01-15", "score": score})).validate()),
                "Score must be between 1 and 10"
            );
        }
        for score in [1, 10] {
            assert!(submission(json!({"date": "2024-01-15", "score": score})).validate().is_ok());
        }
    }

    #[test]
    fn test_entry_serializes_iso_date() {
        let entry = ScoreEntry {
            date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            score: 9,
        };
        assert_eq!(serde_json::to_value(&entry).unwrap(), json!({"date": "2024-01-05", "score": 9}));
    }
}
