use crate::domain::query::{AttributeQuery, CountResult};
use crate::store::RecordTable;

const SAMPLE_LIMIT: usize = 5;

/// Exact count of records matching one attribute/value pair. Comparison is
/// case-insensitive string equality with missing fields folded to "none";
/// percentage is relative to the full table and rounded to one decimal.
pub fn count(query: &AttributeQuery, table: &RecordTable) -> CountResult {
    let wanted = query.attribute_value.trim().to_lowercase();

    let mut count = 0usize;
    let mut sample = Vec::new();
    for record in table.scan() {
        if record.field_folded(&query.attribute_name) == wanted {
            count += 1;
            if sample.len() < SAMPLE_LIMIT {
                sample.push(record.clone());
            }
        }
    }

    let total = table.len();
    let percentage = if total == 0 {
        0.0
    } else {
        round1(100.0 * count as f64 / total as f64)
    };

    let message = format!(
        "Found {} vehicles ({:.1}%) with {} '{}' out of {} total vehicles.",
        count, percentage, query.attribute_name, query.attribute_value, total
    );

    CountResult {
        count,
        total,
        percentage,
        attribute_name: query.attribute_name.clone(),
        attribute_value: query.attribute_value.clone(),
        sample,
        message,
    }
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::query::AttributeQuery;

    fn q(attr: &str, value: &str) -> AttributeQuery {
        AttributeQuery {
            attribute_name: attr.to_string(),
            attribute_value: value.to_string(),
        }
    }

    fn table_of_colors(colors: &[&str]) -> RecordTable {
        let mut raw = String::from("id,color\n");
        for (i, c) in colors.iter().enumerate() {
            raw.push_str(&format!("{},{}\n", i, c));
        }
        RecordTable::parse(&raw).unwrap()
    }

    #[test]
    fn counts_case_insensitively() {
        let table = table_of_colors(&["Green", "GREEN", "green", "blue"]);
        let result = count(&q("color", "green"), &table);
        assert_eq!(result.count, 3);
        assert_eq!(result.total, 4);
        assert_eq!(result.percentage, 75.0);
    }

    #[test]
    fn percentage_is_zero_for_empty_table() {
        let table = RecordTable::parse("id,color\n").unwrap();
        let result = count(&q("color", "green"), &table);
        assert_eq!(result.count, 0);
        assert_eq!(result.total, 0);
        assert_eq!(result.percentage, 0.0);
    }

    #[test]
    fn seventeen_of_two_hundred_green_is_8_5_percent() {
        let mut colors = vec!["blue"; 183];
        colors.extend(["Green", "GREEN"]);
        colors.extend(vec!["green"; 15]);
        let table = table_of_colors(&colors);
        assert_eq!(table.len(), 200);

        let result = count(&q("color", "green"), &table);
        assert_eq!(result.count, 17);
        assert_eq!(result.total, 200);
        assert_eq!(result.percentage, 8.5);
        assert!(result.message.contains("Found 17 vehicles (8.5%)"));
    }

    #[test]
    fn sample_is_capped_at_five_in_table_order() {
        let table = table_of_colors(&["green"; 9]);
        let result = count(&q("color", "green"), &table);
        assert_eq!(result.sample.len(), 5);
        assert_eq!(
            result.sample[0].0.get("id"),
            Some(&serde_json::Value::from(0))
        );
    }

    #[test]
    fn missing_field_matches_the_none_value() {
        let table = RecordTable::parse("id,color\n1,\n2,blue\n").unwrap();
        let result = count(&q("color", "none"), &table);
        assert_eq!(result.count, 1);

        // Counting an attribute no record carries matches everything as
        // "none" rather than panicking.
        let absent = count(&q("trim_level", "none"), &table);
        assert_eq!(absent.count, 2);
    }

    #[test]
    fn partition_sum_equals_total() {
        let table = RecordTable::synthetic();
        let sum: usize = table
            .distribution("make")
            .into_iter()
            .map(|(value, _)| count(&q("make", &value), &table).count)
            .sum();
        assert_eq!(sum, table.len());
    }
}
