//! Column names of the vehicle listing file.

pub const PRICE: &str = "price";
pub const MODEL_YEAR: &str = "model_year";
pub const ODOMETER: &str = "odometer";
pub const MANUFACTURER: &str = "manufacturer";
pub const TYPE: &str = "type";
pub const CONDITION: &str = "condition";
pub const FUEL: &str = "fuel";
pub const TRANSMISSION: &str = "transmission";
pub const PAINT_COLOR: &str = "paint_color";
pub const CYLINDERS: &str = "cylinders";
pub const IS_4WD: &str = "is_4wd";
pub const DAYS_LISTED: &str = "days_listed";

/// Literal that replaces nulls in categorical columns.
pub const UNKNOWN: &str = "unknown";

/// Every column a listing file is expected to carry.  Not enforced: a source
/// only fails to load when it has none of them.
pub const EXPECTED_COLUMNS: [&str; 12] = [
    PRICE,
    MODEL_YEAR,
    ODOMETER,
    MANUFACTURER,
    TYPE,
    CONDITION,
    FUEL,
    TRANSMISSION,
    PAINT_COLOR,
    CYLINDERS,
    IS_4WD,
    DAYS_LISTED,
];

pub const NUMERIC_COLUMNS: [&str; 6] = [
    PRICE,
    MODEL_YEAR,
    ODOMETER,
    CYLINDERS,
    IS_4WD,
    DAYS_LISTED,
];

pub const CATEGORICAL_COLUMNS: [&str; 6] = [
    MANUFACTURER,
    TYPE,
    CONDITION,
    FUEL,
    TRANSMISSION,
    PAINT_COLOR,
];

pub fn is_expected(column: &str) -> bool {
    EXPECTED_COLUMNS.contains(&column)
}
