//! Tests for month column dialects and cell parsing.

#[cfg(test)]
mod tests {
    use crate::columns::{
        extract_month_amounts, parse_amount_str, parse_cell_value, parse_month_column,
        ColumnDialect,
    };
    use crate::periods::MonthKey;
    use rust_decimal_macros::dec;
    use serde_json::{json, Map, Value};

    fn key(s: &str) -> MonthKey {
        s.parse().unwrap()
    }

    fn fields(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    // ==================== Dialect recognition ====================

    #[test]
    fn test_prefixed_dialect() {
        let column = parse_month_column("amount_2025_06", &ColumnDialect::ALL).unwrap();
        assert_eq!(column.month, key("2025_06"));
        assert_eq!(column.dialect, ColumnDialect::Prefixed);
        assert_eq!(column.prefix.as_deref(), Some("amount"));

        let column = parse_month_column("monto_comision_2026_1", &ColumnDialect::ALL).unwrap();
        assert_eq!(column.month, key("2026_01"));
        assert_eq!(column.prefix.as_deref(), Some("monto_comision"));
    }

    #[test]
    fn test_canonical_and_iso_dialects() {
        let column = parse_month_column("2025_06", &ColumnDialect::ALL).unwrap();
        assert_eq!(column.dialect, ColumnDialect::Canonical);
        assert_eq!(column.month, key("2025_06"));

        let column = parse_month_column("2025-11", &ColumnDialect::ALL).unwrap();
        assert_eq!(column.dialect, ColumnDialect::IsoDashed);
        assert_eq!(column.month, key("2025_11"));
    }

    #[test]
    fn test_month_name_dialect_variants() {
        let cases = [
            ("enero_2025", "2025_01"),
            ("Ene 2025", "2025_01"),
            ("sep-25", "2025_09"),
            ("Setiembre_2024", "2024_09"),
            ("March2026", "2026_03"),
            ("DIC 2027", "2027_12"),
        ];
        for (name, expected) in cases {
            let column = parse_month_column(name, &ColumnDialect::ALL)
                .unwrap_or_else(|| panic!("{} should be recognized", name));
            assert_eq!(column.dialect, ColumnDialect::MonthName, "{}", name);
            assert_eq!(column.month, key(expected), "{}", name);
        }
    }

    #[test]
    fn test_unrecognized_columns() {
        for name in ["id", "concepto", "grupo", "total", "2025", "monto_2025", "2025_13", "foo_2025"] {
            assert!(
                parse_month_column(name, &ColumnDialect::ALL).is_none(),
                "{} should not be a month column",
                name
            );
        }
    }

    #[test]
    fn test_accepted_dialects_restrict_recognition() {
        assert!(parse_month_column("enero_2025", &[ColumnDialect::Canonical]).is_none());
        assert!(parse_month_column("2025_01", &[ColumnDialect::MonthName]).is_none());
        assert!(parse_month_column("2025_01", &[ColumnDialect::Canonical]).is_some());
    }

    #[test]
    fn test_format_round_trips_through_parse() {
        let month = key("2025_09");
        for dialect in ColumnDialect::ALL {
            let name = dialect.format(&month, Some("monto"));
            let parsed = dialect.parse(&name).unwrap();
            assert_eq!(parsed.month, month, "{:?} -> {}", dialect, name);
        }
        assert_eq!(ColumnDialect::Prefixed.format(&month, None), "amount_2025_09");
        assert_eq!(ColumnDialect::MonthName.format(&month, None), "septiembre_2025");
    }

    // ==================== Cell values ====================

    #[test]
    fn test_parse_cell_value() {
        assert_eq!(parse_cell_value(&json!(500)).unwrap(), Some(dec!(500)));
        assert_eq!(parse_cell_value(&json!(12.5)).unwrap(), Some(dec!(12.5)));
        assert_eq!(parse_cell_value(&json!("1,250.75")).unwrap(), Some(dec!(1250.75)));
        assert_eq!(parse_cell_value(&json!(" $ 300 ")).unwrap(), Some(dec!(300)));
        assert_eq!(parse_cell_value(&json!(null)).unwrap(), None);
        assert_eq!(parse_cell_value(&json!("  ")).unwrap(), None);
        assert!(parse_cell_value(&json!("n/a")).is_err());
        assert!(parse_cell_value(&json!(true)).is_err());
    }

    #[test]
    fn test_parse_amount_str_thousands_separators() {
        assert_eq!(parse_amount_str("12,500").unwrap(), Some(dec!(12500)));
        assert_eq!(parse_amount_str("1,234,567.8").unwrap(), Some(dec!(1234567.8)));
        assert_eq!(parse_amount_str("$ 2,000.50").unwrap(), Some(dec!(2000.50)));
        assert!(parse_amount_str("1,5").is_err());
        assert!(parse_amount_str("1,2,3").is_err());
        assert!(parse_amount_str("12,50").is_err());
        assert!(parse_amount_str("1234,567").is_err());
        assert!(parse_amount_str(",500").is_err());
    }

    #[test]
    fn test_parse_amount_str_scientific() {
        assert_eq!(parse_amount_str("1e3").unwrap(), Some(dec!(1000)));
    }

    // ==================== Row extraction ====================

    #[test]
    fn test_extract_skips_unknown_and_blank_columns() {
        let row = fields(json!({
            "id": "7",
            "concepto": "Nomina obra",
            "2025_01": 100,
            "2025_02": null,
            "2025_03": "",
            "2025_04": "abc",
            "observaciones": "x"
        }));
        let out = extract_month_amounts("7", &row, &ColumnDialect::ALL);
        assert_eq!(out.amounts.len(), 1);
        assert_eq!(out.amounts[&key("2025_01")], dec!(100));
        assert_eq!(out.columns[&key("2025_01")].name, "2025_01");
        assert!(out.conflicts.is_empty());
    }

    #[test]
    fn test_extract_conflict_keeps_higher_precedence() {
        let row = fields(json!({
            "amount_2025_06": 500,
            "junio_2025": 900,
            "2025-07": 10,
            "julio_2025": 20
        }));
        let out = extract_month_amounts("r1", &row, &ColumnDialect::ALL);

        assert_eq!(out.amounts[&key("2025_06")], dec!(500));
        assert_eq!(out.columns[&key("2025_06")].name, "amount_2025_06");
        assert_eq!(out.amounts[&key("2025_07")], dec!(10));

        assert_eq!(out.conflicts.len(), 2);
        let june = out
            .conflicts
            .iter()
            .find(|c| c.month == key("2025_06"))
            .unwrap();
        assert_eq!(june.row_id, "r1");
        assert_eq!(june.kept_column, "amount_2025_06");
        assert_eq!(june.ignored_column, "junio_2025");
    }

    #[test]
    fn test_extract_tie_keeps_first_column_in_source_order() {
        let row = fields(json!({
            "monto_2025_06": 100,
            "amount_2025_06": 200
        }));
        let out = extract_month_amounts("r2", &row, &ColumnDialect::ALL);

        assert_eq!(out.amounts[&key("2025_06")], dec!(100));
        assert_eq!(out.columns[&key("2025_06")].name, "monto_2025_06");
        assert_eq!(out.conflicts.len(), 1);
        assert_eq!(out.conflicts[0].kept_column, "monto_2025_06");
        assert_eq!(out.conflicts[0].ignored_column, "amount_2025_06");
    }
}
