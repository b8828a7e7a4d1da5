/// # Integration Tests Module
///
/// End-to-end sessions through the menu controller against the sample shop,
/// checking both what the operator sees and what ends up in the tables.

#[cfg(test)]
mod tests {
    use crate::core::db::SqlValue;
    use crate::menu::MenuController;
    use crate::reports::Report;
    use crate::test_utils::{assert_error_mentions, ShopFixture};

    /// A full session: add a customer and a car, then run every report.
    #[test]
    fn test_operator_session() {
        let mut fixture = ShopFixture::with_sample_data().unwrap();
        let customers_before = fixture.count("Customer");
        let cars_before = fixture.count("Car");

        let input = "\
1\n40\nNina\nPark\n(909)555-0140\n77 Orange Grove\n\
3\nJT2EL43T0S0000003\nToyota\nTercel\n1994\n\
6\n7\n8\n10\n\
11\n";
        let mut out = Vec::new();
        let mut err = Vec::new();
        MenuController::new(&mut fixture.db, input.as_bytes(), &mut out, &mut err)
            .run()
            .unwrap();

        let out = String::from_utf8(out).unwrap();
        let err = String::from_utf8(err).unwrap();
        assert!(err.is_empty(), "unexpected error output: {}", err);

        assert_eq!(fixture.count("Customer"), customers_before + 1);
        assert_eq!(fixture.count("Car"), cars_before + 1);

        // Each report printed its header exactly once
        assert_eq!(out.matches("date\tcomment\tbill\t").count(), 1);
        assert_eq!(out.matches("fname\tlname\t\n").count(), 1);
        assert_eq!(out.matches("make\tmodel\tyear\t").count(), 1);
        assert_eq!(out.matches("fname\tlname\tcbal\t").count(), 1);
    }

    /// The new car has no service request yet, so the pre-1995 report is unchanged.
    #[test]
    fn test_reports_only_see_joined_rows() {
        let mut fixture = ShopFixture::with_sample_data().unwrap();
        fixture
            .db
            .execute_update(
                "INSERT INTO Car(vin, make, model, year) VALUES ($1, $2, $3, $4)",
                &["JT2EL43T0S0000003".into(), "Toyota".into(), "Tercel".into(), SqlValue::Integer(1994)],
            )
            .unwrap();

        let rows = fixture
            .db
            .execute_query_and_return(Report::CarsBefore1995Under50000Miles.sql(), &[])
            .unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_sequence_values_follow_inserts() {
        let mut fixture = ShopFixture::with_sample_data().unwrap();
        assert_eq!(fixture.db.current_sequence_value("Service_Request").unwrap(), Some(3));
        assert_eq!(fixture.db.current_sequence_value("Closed_Request").unwrap(), Some(3));
        assert_eq!(fixture.db.current_sequence_value("Customer").unwrap(), None);
    }

    #[test]
    fn test_referential_integrity_is_left_to_the_database() {
        let mut fixture = ShopFixture::with_sample_data().unwrap();
        let result = fixture.db.execute_update(
            "INSERT INTO Owns (customer_id, car_vin) VALUES ($1, $2)",
            &[SqlValue::Integer(999), "NOSUCHVIN".into()],
        );
        assert_error_mentions(result, "FOREIGN KEY constraint failed");
    }

    #[test]
    fn test_syntax_errors_surface_driver_message() {
        let mut fixture = ShopFixture::new().unwrap();
        let result = fixture.db.execute_query_and_return("SELEC * FROM Customer", &[]);
        assert_error_mentions(result, "syntax error");
    }
}
