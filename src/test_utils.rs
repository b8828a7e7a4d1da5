/// # Test Utilities Module
///
/// Fixtures for exercising the shop against an isolated in-memory SQLite
/// database that carries the same tables the PostgreSQL deployment uses.

use crate::core::db::sqlite::SqliteBackend;
use crate::core::db::Database;
use crate::core::{Result, ShopError};

/// Shop tables, in dependency order
pub const SHOP_SCHEMA: &str = "
    CREATE TABLE Customer (
        id INTEGER PRIMARY KEY,
        fname TEXT NOT NULL,
        lname TEXT NOT NULL,
        phone TEXT NOT NULL,
        address TEXT NOT NULL
    );

    CREATE TABLE Mechanic (
        id INTEGER PRIMARY KEY,
        fname TEXT NOT NULL,
        lname TEXT NOT NULL,
        experience INTEGER NOT NULL CHECK (experience >= 0 AND experience < 100)
    );

    CREATE TABLE Car (
        vin TEXT PRIMARY KEY,
        make TEXT NOT NULL,
        model TEXT NOT NULL,
        year INTEGER NOT NULL CHECK (year >= 1970)
    );

    CREATE TABLE Owns (
        ownership_id INTEGER PRIMARY KEY AUTOINCREMENT,
        customer_id INTEGER NOT NULL REFERENCES Customer(id),
        car_vin TEXT NOT NULL REFERENCES Car(vin)
    );

    CREATE TABLE Service_Request (
        rid INTEGER PRIMARY KEY AUTOINCREMENT,
        customer_id INTEGER NOT NULL REFERENCES Customer(id),
        car_vin TEXT NOT NULL REFERENCES Car(vin),
        date TEXT NOT NULL,
        odometer INTEGER NOT NULL CHECK (odometer > 0),
        complain TEXT
    );

    CREATE TABLE Closed_Request (
        wid INTEGER PRIMARY KEY AUTOINCREMENT,
        rid INTEGER NOT NULL REFERENCES Service_Request(rid),
        mid INTEGER NOT NULL REFERENCES Mechanic(id),
        date TEXT NOT NULL,
        comment TEXT,
        bill INTEGER NOT NULL CHECK (bill > 0)
    );
";

/// Sample rows: three customers, one of them owning 21 cars, and closed
/// requests billed 50, 150 and 99.
const SAMPLE_DATA: &str = "
    INSERT INTO Customer VALUES (1, 'Ann', 'Lee', '(951)555-0101', '1 Main St');
    INSERT INTO Customer VALUES (2, 'Fleet', 'Owner', '(951)555-0102', '2 Depot Rd');
    INSERT INTO Customer VALUES (3, 'Bob', 'Jones', '(951)555-0103', '3 Elm Ave');

    INSERT INTO Mechanic VALUES (1, 'Gus', 'Grease', 20);

    INSERT INTO Car VALUES ('JT2AE09W4P0038539', 'Toyota', 'Corolla', 1993);
    INSERT INTO Car VALUES ('1HGED3651LA000001', 'Honda', 'Civic', 1990);

    INSERT INTO Owns (customer_id, car_vin) VALUES (1, 'JT2AE09W4P0038539');
    INSERT INTO Owns (customer_id, car_vin) VALUES (3, '1HGED3651LA000001');
";

/// Isolated shop database fixture
pub struct ShopFixture {
    pub db: Database,
}

impl ShopFixture {
    /// Empty shop schema
    pub fn new() -> Result<Self> {
        let backend = SqliteBackend::open_in_memory()?;
        backend.connection().execute_batch(SHOP_SCHEMA)?;
        Ok(ShopFixture {
            db: Database::from_backend(Box::new(backend)),
        })
    }

    /// Shop schema populated with the sample rows
    pub fn with_sample_data() -> Result<Self> {
        let backend = SqliteBackend::open_in_memory()?;
        let conn = backend.connection();
        conn.execute_batch(SHOP_SCHEMA)?;
        conn.execute_batch(SAMPLE_DATA)?;

        for n in 0..21 {
            let vin = format!("1FTBW3XM5HKA{:05}", n);
            conn.execute(
                "INSERT INTO Car VALUES (?1, 'Ford', 'Transit', 2017)",
                [&vin],
            )?;
            conn.execute(
                "INSERT INTO Owns (customer_id, car_vin) VALUES (2, ?1)",
                [&vin],
            )?;
        }

        conn.execute_batch(
            "
            INSERT INTO Service_Request (customer_id, car_vin, date, odometer, complain)
                VALUES (1, 'JT2AE09W4P0038539', '2019-03-02', 42000, 'brakes squeal');
            INSERT INTO Service_Request (customer_id, car_vin, date, odometer, complain)
                VALUES (1, '1HGED3651LA000001', '2019-04-11', 80000, 'timing belt');
            INSERT INTO Service_Request (customer_id, car_vin, date, odometer, complain)
                VALUES (2, '1FTBW3XM5HKA00000', '2019-05-20', 30000, 'oil change');

            INSERT INTO Closed_Request (rid, mid, date, comment, bill)
                VALUES (1, 1, '2019-03-03', 'replaced pads', 50);
            INSERT INTO Closed_Request (rid, mid, date, comment, bill)
                VALUES (2, 1, '2019-04-15', 'replaced belt', 150);
            INSERT INTO Closed_Request (rid, mid, date, comment, bill)
                VALUES (3, 1, '2019-05-20', 'synthetic oil', 99);
        ",
        )?;

        Ok(ShopFixture {
            db: Database::from_backend(Box::new(backend)),
        })
    }

    /// Row count of `table`
    pub fn count(&mut self, table: &str) -> usize {
        let rows = self
            .db
            .execute_query_and_return(&format!("SELECT COUNT(*) FROM {}", table), &[])
            .unwrap();
        rows[0][0].parse().unwrap()
    }
}

/// Asserts that an operation failed with a message mentioning `needle`.
pub fn assert_error_mentions<T: std::fmt::Debug>(result: Result<T>, needle: &str) {
    match result {
        Ok(value) => panic!("Expected an error mentioning '{}', got Ok({:?})", needle, value),
        Err(e) => {
            let message = e.to_string();
            assert!(
                message.contains(needle),
                "Error '{}' should mention '{}'",
                message,
                needle
            );
            if let ShopError::Io(_) = e {
                panic!("Console I/O error where a statement error was expected: {}", message);
            }
        }
    }
}
