use deadpool_postgres::Pool;
use tokio_postgres::types::ToSql;
use tokio_postgres::{GenericClient, Row};
use crate::{
    error::{AppError, Result},
    models::meal::{AltMeasure, Meal, MealFields, Serving},
    models::meal::MealType,
};

fn row_to_meal(row: &Row) -> Result<Meal> {
    let meal_type: String = row.try_get("meal_type")?;
    let meal_type = MealType::parse(&meal_type)
        .ok_or_else(|| AppError::Internal(format!("Unknown meal_type in storage: {}", meal_type)))?;
    Ok(Meal {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        date: row.try_get("date")?,
        name: row.try_get("name")?,
        original_name: row.try_get("original_name")?,
        calories: row.try_get("calories")?,
        protein: row.try_get("protein")?,
        carbs: row.try_get("carbs")?,
        fat: row.try_get("fat")?,
        meal_type,
        food_id: row.try_get("food_id")?,
        image_url: row.try_get("image_url")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        serving: None,
        alt_measures: Vec::new(),
    })
}

fn row_to_serving(row: &Row) -> Result<Serving> {
    Ok(Serving {
        id: row.try_get("id")?,
        quantity: row.try_get("quantity")?,
        unit: row.try_get("unit")?,
        original_unit: row.try_get("original_unit")?,
        weight: row.try_get("weight")?,
    })
}

fn row_to_alt_measure(row: &Row) -> Result<AltMeasure> {
    Ok(AltMeasure {
        id: row.try_get("id")?,
        serving_weight: row.try_get("serving_weight")?,
        measure: row.try_get("measure")?,
        original_measure: row.try_get("original_measure")?,
        seq: row.try_get("seq")?,
        qty: row.try_get("qty")?,
    })
}

/// Loads the serving and alt-measure rows for a meal, scoped by owner.
async fn load_attachments<C: GenericClient>(
    client: &C,
    user_id: i64,
    meal: &mut Meal,
) -> Result<()> {
    let serving = client
        .query_opt(
            r#"
            SELECT id, quantity, unit, original_unit, weight
            FROM servings
            WHERE meal_id = $1 AND user_id = $2
            "#,
            &[&meal.id, &user_id],
        )
        .await?;
    meal.serving = serving.map(|r| row_to_serving(&r)).transpose()?;

    let rows = client
        .query(
            r#"
            SELECT id, serving_weight, measure, original_measure, seq, qty
            FROM alt_measures
            WHERE meal_id = $1 AND user_id = $2
            ORDER BY id
            "#,
            &[&meal.id, &user_id],
        )
        .await?;
    meal.alt_measures = rows.iter().map(row_to_alt_measure).collect::<Result<_>>()?;
    Ok(())
}

async fn insert_attachments<C: GenericClient>(
    client: &C,
    user_id: i64,
    meal: &mut Meal,
    fields: &MealFields,
) -> Result<()> {
    if let Some(serving) = &fields.serving {
        let row = client
            .query_one(
                r#"
                INSERT INTO servings (meal_id, user_id, quantity, unit, original_unit, weight)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING id, quantity, unit, original_unit, weight
                "#,
                &[
                    &meal.id,
                    &user_id,
                    &serving.quantity,
                    &serving.unit,
                    &serving.original_unit,
                    &serving.weight,
                ],
            )
            .await?;
        meal.serving = Some(row_to_serving(&row)?);
    }

    for measure in &fields.alt_measures {
        let row = client
            .query_one(
                r#"
                INSERT INTO alt_measures
                    (meal_id, user_id, serving_weight, measure, original_measure, seq, qty)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING id, serving_weight, measure, original_measure, seq, qty
                "#,
                &[
                    &meal.id,
                    &user_id,
                    &measure.serving_weight,
                    &measure.measure,
                    &measure.original_measure,
                    &measure.seq,
                    &measure.qty,
                ],
            )
            .await?;
        meal.alt_measures.push(row_to_alt_measure(&row)?);
    }
    Ok(())
}

/// Lists a user's meals, optionally filtered to an exact date or a `YYYY-MM`
/// month prefix, most recent first.
pub async fn list(
    pool: &Pool,
    user_id: i64,
    date: Option<&str>,
    month: Option<&str>,
) -> Result<Vec<Meal>> {
    let client = pool.get().await?;

    let mut query = String::from(
        "SELECT id, user_id, date, name, original_name, calories, protein, carbs, fat, \
         meal_type, food_id, image_url, created_at, updated_at \
         FROM meals WHERE user_id = $1",
    );
    let month_pattern = month.map(|m| format!("{}%", m));
    let mut params: Vec<&(dyn ToSql + Sync)> = vec![&user_id];

    if let Some(date) = &date {
        query.push_str(" AND date = $2");
        params.push(date);
    } else if let Some(pattern) = &month_pattern {
        query.push_str(" AND date LIKE $2");
        params.push(pattern);
    }
    query.push_str(" ORDER BY date DESC, created_at DESC");

    let rows = client.query(query.as_str(), &params).await?;
    let mut meals = rows.iter().map(row_to_meal).collect::<Result<Vec<_>>>()?;

    for meal in &mut meals {
        load_attachments(&**client, user_id, meal).await?;
    }
    Ok(meals)
}

/// Fetches one meal, only if it belongs to `user_id`. A meal owned by another
/// user is indistinguishable from a nonexistent one.
pub async fn get(pool: &Pool, user_id: i64, meal_id: i64) -> Result<Option<Meal>> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            SELECT id, user_id, date, name, original_name, calories, protein, carbs, fat,
                   meal_type, food_id, image_url, created_at, updated_at
            FROM meals
            WHERE id = $1 AND user_id = $2
            "#,
            &[&meal_id, &user_id],
        )
        .await?;
    match row {
        Some(row) => {
            let mut meal = row_to_meal(&row)?;
            load_attachments(&**client, user_id, &mut meal).await?;
            Ok(Some(meal))
        }
        None => Ok(None),
    }
}

/// Creates a meal plus its optional serving and alt-measure rows in a single
/// transaction.
pub async fn create(pool: &Pool, user_id: i64, fields: &MealFields) -> Result<Meal> {
    let mut client = pool.get().await?;
    let tx = client.transaction().await?;

    let row = tx
        .query_one(
            r#"
            INSERT INTO meals
                (user_id, date, name, original_name, calories, protein, carbs, fat,
                 meal_type, food_id, image_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id, user_id, date, name, original_name, calories, protein, carbs, fat,
                      meal_type, food_id, image_url, created_at, updated_at
            "#,
            &[
                &user_id,
                &fields.date,
                &fields.name,
                &fields.original_name,
                &fields.calories,
                &fields.protein,
                &fields.carbs,
                &fields.fat,
                &fields.meal_type.as_str(),
                &fields.food_id,
                &fields.image_url,
            ],
        )
        .await?;
    let mut meal = row_to_meal(&row)?;

    insert_attachments(&*tx, user_id, &mut meal, fields).await?;

    tx.commit().await?;
    Ok(meal)
}

/// Updates a meal, replacing its serving and alt-measure rows wholesale, in a
/// single transaction. Returns `None` when the meal does not exist or belongs
/// to another user.
pub async fn update(
    pool: &Pool,
    user_id: i64,
    meal_id: i64,
    fields: &MealFields,
) -> Result<Option<Meal>> {
    let mut client = pool.get().await?;
    let tx = client.transaction().await?;

    let row = tx
        .query_opt(
            r#"
            UPDATE meals SET
                date = $1, name = $2, original_name = $3, calories = $4,
                protein = $5, carbs = $6, fat = $7, meal_type = $8,
                food_id = $9, image_url = $10, updated_at = NOW()
            WHERE id = $11 AND user_id = $12
            RETURNING id, user_id, date, name, original_name, calories, protein, carbs, fat,
                      meal_type, food_id, image_url, created_at, updated_at
            "#,
            &[
                &fields.date,
                &fields.name,
                &fields.original_name,
                &fields.calories,
                &fields.protein,
                &fields.carbs,
                &fields.fat,
                &fields.meal_type.as_str(),
                &fields.food_id,
                &fields.image_url,
                &meal_id,
                &user_id,
            ],
        )
        .await?;

    let Some(row) = row else {
        return Ok(None);
    };
    let mut meal = row_to_meal(&row)?;

    tx.execute(
        "DELETE FROM servings WHERE meal_id = $1 AND user_id = $2",
        &[&meal_id, &user_id],
    )
    .await?;
    tx.execute(
        "DELETE FROM alt_measures WHERE meal_id = $1 AND user_id = $2",
        &[&meal_id, &user_id],
    )
    .await?;

    insert_attachments(&*tx, user_id, &mut meal, fields).await?;

    tx.commit().await?;
    Ok(Some(meal))
}

/// Deletes a meal if it belongs to `user_id`; dependent serving and
/// alt-measure rows go with it via `ON DELETE CASCADE`. Returns whether a
/// row was removed.
pub async fn delete(pool: &Pool, user_id: i64, meal_id: i64) -> Result<bool> {
    let client = pool.get().await?;
    let deleted = client
        .execute(
            "DELETE FROM meals WHERE id = $1 AND user_id = $2",
            &[&meal_id, &user_id],
        )
        .await?;
    Ok(deleted > 0)
}
