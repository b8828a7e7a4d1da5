//! Customer, mechanic and car records entered from the menu.
//!
//! Each record inserts exactly one row through a parameterised statement.

use crate::core::db::{Database, SqlValue};
use crate::core::Result;
use tracing::info;

/// Shared behaviour of the three insertable records.
pub trait Record {
    /// Table name, used in log lines
    const TABLE: &'static str;
    /// Parameterised INSERT for the record's columns
    const INSERT_SQL: &'static str;

    /// Values bound to `INSERT_SQL`, in column order.
    fn params(&self) -> Vec<SqlValue>;

    /// Inserts the record as one new row.
    fn insert(&self, db: &mut Database) -> Result<u64> {
        let affected = db.execute_update(Self::INSERT_SQL, &self.params())?;
        info!(table = Self::TABLE, affected, "record inserted");
        Ok(affected)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Customer {
    pub id: i64,
    pub fname: String,
    pub lname: String,
    pub phone: String,
    pub address: String,
}

impl Record for Customer {
    const TABLE: &'static str = "Customer";
    const INSERT_SQL: &'static str =
        "INSERT INTO Customer(id, fname, lname, phone, address) VALUES ($1, $2, $3, $4, $5)";

    fn params(&self) -> Vec<SqlValue> {
        vec![
            self.id.into(),
            self.fname.as_str().into(),
            self.lname.as_str().into(),
            self.phone.as_str().into(),
            self.address.as_str().into(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mechanic {
    pub id: i64,
    pub fname: String,
    pub lname: String,
    /// Years of experience
    pub experience: i64,
}

impl Record for Mechanic {
    const TABLE: &'static str = "Mechanic";
    const INSERT_SQL: &'static str =
        "INSERT INTO Mechanic(id, fname, lname, experience) VALUES ($1, $2, $3, $4)";

    fn params(&self) -> Vec<SqlValue> {
        vec![
            self.id.into(),
            self.fname.as_str().into(),
            self.lname.as_str().into(),
            self.experience.into(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Car {
    pub vin: String,
    pub make: String,
    pub model: String,
    pub year: i64,
}

impl Record for Car {
    const TABLE: &'static str = "Car";
    const INSERT_SQL: &'static str =
        "INSERT INTO Car(vin, make, model, year) VALUES ($1, $2, $3, $4)";

    fn params(&self) -> Vec<SqlValue> {
        vec![
            self.vin.as_str().into(),
            self.make.as_str().into(),
            self.model.as_str().into(),
            self.year.into(),
        ]
    }
}
