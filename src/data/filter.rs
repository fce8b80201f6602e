use std::collections::{BTreeMap, BTreeSet};

use super::model::{Dataset, Value};

// ---------------------------------------------------------------------------
// Group-size filter
// ---------------------------------------------------------------------------

/// Keep only rows whose `group_column` value occurs at least `min_count`
/// times in `dataset`.
///
/// Counts are taken over the input, so the result never depends on row
/// order.  A missing column or a zero threshold returns the input unchanged.
/// `Null` counts as a group of its own.
pub fn filter_by_group_minimum(dataset: &Dataset, group_column: &str, min_count: usize) -> Dataset {
    if min_count == 0 {
        return dataset.clone();
    }
    let (Some(idx), Some(counts)) = (
        dataset.column_index(group_column),
        dataset.value_counts(group_column),
    ) else {
        return dataset.clone();
    };

    let kept: BTreeSet<Value> = counts
        .into_iter()
        .filter(|(_, n)| *n >= min_count)
        .map(|(v, _)| v)
        .collect();

    dataset.filter_records(|rec| kept.contains(&rec[idx]))
}

// ---------------------------------------------------------------------------
// Value selection: which unique values are selected per column
// ---------------------------------------------------------------------------

/// Per-column selection state: maps column_name → set of selected values.
/// A column absent from the map is unconstrained.
pub type Selection = BTreeMap<String, BTreeSet<Value>>;

/// Initialise a [`Selection`] with every value of `columns` selected.
/// Columns the dataset lacks are left out.
pub fn select_all(dataset: &Dataset, columns: &[&str]) -> Selection {
    columns
        .iter()
        .filter(|col| dataset.has_column(col))
        .map(|col| (col.to_string(), dataset.unique_values(col)))
        .collect()
}

/// Keep only rows whose value in `column` is in `allowed`.  Missing column →
/// input unchanged.
pub fn select_values(dataset: &Dataset, column: &str, allowed: &BTreeSet<Value>) -> Dataset {
    match dataset.column_index(column) {
        Some(idx) => dataset.filter_records(|rec| allowed.contains(&rec[idx])),
        None => dataset.clone(),
    }
}

/// Apply every column constraint in `selection`.
///
/// A row passes a column constraint when:
/// * the column is not in the dataset → passes (no constraint)
/// * every value of the column is selected → passes
/// * the row's value is in the selected set → passes
///
/// An empty set for a present column therefore hides everything.
pub fn apply_selection(dataset: &Dataset, selection: &Selection) -> Dataset {
    let active: Vec<(usize, &BTreeSet<Value>)> = selection
        .iter()
        .filter_map(|(col, selected)| {
            let idx = dataset.column_index(col)?;
            (!dataset.unique_values(col).is_subset(selected)).then_some((idx, selected))
        })
        .collect();

    if active.is_empty() {
        return dataset.clone();
    }
    dataset.filter_records(|rec| active.iter().all(|(idx, sel)| sel.contains(&rec[*idx])))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn makes(values: &[&str]) -> Dataset {
        Dataset::new(
            vec!["manufacturer".into(), "price".into()],
            values
                .iter()
                .enumerate()
                .map(|(i, m)| vec![Value::from(*m), Value::Integer(i as i64)])
                .collect(),
        )
    }

    #[test]
    fn keeps_only_groups_meeting_threshold() {
        let ds = makes(&["ford", "audi", "ford", "ford"]);
        let out = filter_by_group_minimum(&ds, "manufacturer", 2);
        assert_eq!(out.len(), 3);
        assert!(out
            .column("manufacturer")
            .unwrap()
            .all(|v| v == &Value::from("ford")));
    }

    #[test]
    fn zero_threshold_is_identity() {
        let ds = makes(&["ford", "audi"]);
        assert_eq!(filter_by_group_minimum(&ds, "manufacturer", 0), ds);
    }

    #[test]
    fn absent_group_column_is_identity() {
        let ds = makes(&["ford", "audi"]);
        assert_eq!(filter_by_group_minimum(&ds, "type", 5), ds);
    }

    #[test]
    fn threshold_above_every_group_empties_the_view() {
        let ds = makes(&["ford", "audi", "ford"]);
        assert!(filter_by_group_minimum(&ds, "manufacturer", 3).is_empty());
    }

    #[test]
    fn signed_zeros_count_as_one_group() {
        let ds = Dataset::new(
            vec!["cylinders".into()],
            vec![vec![Value::Float(0.0)], vec![Value::Float(-0.0)]],
        );
        assert_eq!(filter_by_group_minimum(&ds, "cylinders", 2).len(), 2);
    }

    #[test]
    fn select_values_restricts_rows() {
        let ds = makes(&["ford", "audi", "bmw"]);
        let allowed: BTreeSet<Value> = [Value::from("audi"), Value::from("bmw")].into();
        let out = select_values(&ds, "manufacturer", &allowed);
        assert_eq!(out.len(), 2);
        assert_eq!(select_values(&ds, "fuel", &allowed), ds);
    }

    #[test]
    fn full_selection_is_no_filter_and_empty_hides_all() {
        let ds = makes(&["ford", "audi"]);
        let mut selection = select_all(&ds, &["manufacturer", "fuel"]);
        assert!(!selection.contains_key("fuel"));
        assert_eq!(apply_selection(&ds, &selection), ds);

        selection.insert("manufacturer".into(), BTreeSet::new());
        assert!(apply_selection(&ds, &selection).is_empty());
    }
}
