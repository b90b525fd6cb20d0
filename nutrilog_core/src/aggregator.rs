//! Nutrient resolution for meals and summaries over meal history.

use crate::food_db::FoodDatabase;
use crate::{Meal, NutrientTotals};
use chrono::NaiveDate;

/// Total nutrients for a list of logged items.
///
/// Items missing from the database contribute nothing; they are still part
/// of the meal as logged.
pub fn resolve<S: AsRef<str>>(db: &FoodDatabase, food_items: &[S]) -> NutrientTotals {
    food_items
        .iter()
        .map(|item| {
            let item = item.as_ref();
            db.lookup(item).unwrap_or_else(|| {
                tracing::trace!("Unrecognized food '{}' contributes zero nutrients", item);
                NutrientTotals::zero()
            })
        })
        .sum()
}

/// Items that the database does not recognize, in logged order
pub fn unrecognized_items<'a, S: AsRef<str>>(
    db: &FoodDatabase,
    food_items: &'a [S],
) -> Vec<&'a str> {
    food_items
        .iter()
        .map(|item| item.as_ref())
        .filter(|item| db.lookup(item).is_none())
        .collect()
}

/// Meals logged on `date` (local calendar date), or every meal when `None`
pub fn filter_by_date<'a>(
    meals: impl IntoIterator<Item = &'a Meal>,
    date: Option<NaiveDate>,
) -> impl Iterator<Item = &'a Meal> {
    meals
        .into_iter()
        .filter(move |meal| date.map_or(true, |d| meal.logged_on() == d))
}

/// Sum the stored totals of the selected meals. An empty selection is zero.
pub fn summarize(meals: &[Meal], date: Option<NaiveDate>) -> NutrientTotals {
    filter_by_date(meals, date).map(|meal| meal.nutrients).sum()
}
