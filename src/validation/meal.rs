use serde::Deserialize;
use crate::error::{AppError, Result};
use crate::models::meal::{AltMeasureFields, MealFields, MealType, ServingFields};

/// The raw meal payload as received at the API edge. Required fields are
/// `Option` here so a missing field yields a 400 with a useful message
/// instead of a framework rejection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealPayload {
    pub date: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub original_name: Option<String>,
    pub calories: Option<i32>,
    #[serde(default)]
    pub protein: Option<f64>,
    #[serde(default)]
    pub carbs: Option<f64>,
    #[serde(default)]
    pub fat: Option<f64>,
    pub meal_type: Option<String>,
    #[serde(default)]
    pub food_id: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub serving: Option<ServingFields>,
    #[serde(default)]
    pub alt_measures: Vec<AltMeasureFields>,
}

/// Checks the payload for the required fields and produces the validated
/// internal representation.
pub fn validate_meal(payload: MealPayload) -> Result<MealFields> {
    let date = payload
        .date
        .filter(|d| !d.is_empty())
        .ok_or_else(|| missing("date"))?;
    let name = payload
        .name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| missing("name"))?;
    let calories = payload.calories.ok_or_else(|| missing("calories"))?;
    let meal_type = payload.meal_type.ok_or_else(|| missing("mealType"))?;
    let meal_type = MealType::parse(&meal_type).ok_or_else(|| {
        AppError::Validation(format!(
            "Invalid mealType '{}', expected one of Breakfast, Lunch, Dinner, Snack",
            meal_type
        ))
    })?;

    if calories < 0 {
        return Err(AppError::Validation("Calories cannot be negative".to_string()));
    }

    Ok(MealFields {
        date,
        name,
        original_name: payload.original_name,
        calories,
        protein: payload.protein.unwrap_or(0.0),
        carbs: payload.carbs.unwrap_or(0.0),
        fat: payload.fat.unwrap_or(0.0),
        meal_type,
        food_id: payload.food_id,
        image_url: payload.image_url,
        serving: payload.serving,
        alt_measures: payload.alt_measures,
    })
}

fn missing(field: &str) -> AppError {
    AppError::Validation(format!(
        "Missing required fields, required: date, name, calories, mealType (missing: {})",
        field
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(json: &str) -> MealPayload {
        sonic_rs::from_str(json).unwrap()
    }

    #[test]
    fn full_payload_validates() {
        let fields = validate_meal(payload(
            r#"{"date":"2024-01-05","name":"Eggs","calories":200,"mealType":"Breakfast"}"#,
        ))
        .unwrap();
        assert_eq!(fields.date, "2024-01-05");
        assert_eq!(fields.meal_type, MealType::Breakfast);
        assert_eq!(fields.protein, 0.0);
        assert!(fields.serving.is_none());
    }

    #[test]
    fn missing_required_fields_fail() {
        for json in [
            r#"{"name":"Eggs","calories":200,"mealType":"Breakfast"}"#,
            r#"{"date":"2024-01-05","calories":200,"mealType":"Breakfast"}"#,
            r#"{"date":"2024-01-05","name":"Eggs","mealType":"Breakfast"}"#,
            r#"{"date":"2024-01-05","name":"Eggs","calories":200}"#,
        ] {
            assert!(validate_meal(payload(json)).is_err(), "accepted: {}", json);
        }
    }

    #[test]
    fn unknown_meal_type_fails() {
        let result = validate_meal(payload(
            r#"{"date":"2024-01-05","name":"Eggs","calories":200,"mealType":"Brunch"}"#,
        ));
        assert!(result.is_err());
    }

    #[test]
    fn serving_and_measures_pass_through() {
        let fields = validate_meal(payload(
            r#"{
                "date":"2024-01-05","name":"Banana","calories":105,"mealType":"Snack",
                "serving":{"quantity":1.0,"unit":"medium","weight":118.0},
                "altMeasures":[
                    {"servingWeight":118.0,"measure":"medium","qty":1.0},
                    {"servingWeight":225.0,"measure":"cup, sliced","seq":2,"qty":1.5}
                ]
            }"#,
        ))
        .unwrap();
        assert!(fields.serving.is_some());
        assert_eq!(fields.alt_measures.len(), 2);
        assert_eq!(fields.alt_measures[1].seq, Some(2));
    }
}
