use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The fixed set of meal categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    /// The database text representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "Breakfast",
            MealType::Lunch => "Lunch",
            MealType::Dinner => "Dinner",
            MealType::Snack => "Snack",
        }
    }

    /// Parses the database text representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Breakfast" => Some(MealType::Breakfast),
            "Lunch" => Some(MealType::Lunch),
            "Dinner" => Some(MealType::Dinner),
            "Snack" => Some(MealType::Snack),
            _ => None,
        }
    }
}

/// A portion-size descriptor attached to a meal.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Serving {
    pub id: i64,
    pub quantity: f64,
    pub unit: String,
    pub original_unit: Option<String>,
    pub weight: f64,
}

/// An alternative unit/quantity conversion sourced from the nutrition catalog.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AltMeasure {
    pub id: i64,
    pub serving_weight: f64,
    pub measure: String,
    pub original_measure: Option<String>,
    pub seq: Option<i32>,
    pub qty: f64,
}

/// One logged food entry with its nutrition values and attachments.
///
/// This is the single internal representation; the camelCase serde attributes
/// are the one serialization boundary at the API edge.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Meal {
    pub id: i64,
    pub user_id: i64,
    /// Calendar date, `YYYY-MM-DD`, no time component.
    pub date: String,
    pub name: String,
    pub original_name: Option<String>,
    pub calories: i32,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub meal_type: MealType,
    pub food_id: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serving: Option<Serving>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub alt_measures: Vec<AltMeasure>,
}

/// Validated input for creating or replacing a serving row.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServingFields {
    pub quantity: f64,
    pub unit: String,
    #[serde(default)]
    pub original_unit: Option<String>,
    pub weight: f64,
}

/// Validated input for creating or replacing an alt-measure row.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AltMeasureFields {
    pub serving_weight: f64,
    pub measure: String,
    #[serde(default)]
    pub original_measure: Option<String>,
    #[serde(default)]
    pub seq: Option<i32>,
    pub qty: f64,
}

/// Validated input for creating or updating a meal.
#[derive(Clone, Debug)]
pub struct MealFields {
    pub date: String,
    pub name: String,
    pub original_name: Option<String>,
    pub calories: i32,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub meal_type: MealType,
    pub food_id: Option<String>,
    pub image_url: Option<String>,
    pub serving: Option<ServingFields>,
    pub alt_measures: Vec<AltMeasureFields>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meal_type_round_trips_through_db_text() {
        for mt in [
            MealType::Breakfast,
            MealType::Lunch,
            MealType::Dinner,
            MealType::Snack,
        ] {
            assert_eq!(MealType::parse(mt.as_str()), Some(mt));
        }
        assert_eq!(MealType::parse("Brunch"), None);
    }

    #[test]
    fn meal_serializes_camel_case_at_the_edge() {
        let meal = Meal {
            id: 1,
            user_id: 2,
            date: "2024-01-05".to_string(),
            name: "Eggs".to_string(),
            original_name: None,
            calories: 200,
            protein: 12.0,
            carbs: 1.0,
            fat: 14.0,
            meal_type: MealType::Breakfast,
            food_id: None,
            image_url: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
            serving: None,
            alt_measures: Vec::new(),
        };
        let json = sonic_rs::to_string(&meal).unwrap();
        assert!(json.contains(r#""mealType":"Breakfast""#));
        assert!(json.contains(r#""userId":2"#));
        assert!(!json.contains("meal_type"));
        assert!(!json.contains("altMeasures"));
    }
}
