//! Fixed report queries offered by the menu.

use crate::core::db::Database;
use crate::core::Result;
use std::io::Write;

/// A parameterless report printed as a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Report {
    /// Closed requests billed under 100
    BillsUnder100,
    /// Customers owning more than 20 cars
    CustomersWithMoreThan20Cars,
    /// Pre-1995 cars serviced with fewer than 50000 miles on the odometer
    CarsBefore1995Under50000Miles,
    /// Customers ordered by their summed bills, highest first
    CustomersByTotalBill,
}

impl Report {
    pub fn sql(&self) -> &'static str {
        match self {
            Report::BillsUnder100 => {
                "SELECT Closed_Request.date, Closed_Request.comment, Closed_Request.bill \
                 FROM Closed_Request \
                 WHERE Closed_Request.bill < 100"
            }
            Report::CustomersWithMoreThan20Cars => {
                "SELECT c.fname, c.lname \
                 FROM (SELECT Owns.customer_id, COUNT(Owns.customer_id) AS num \
                       FROM Customer, Owns, Car \
                       WHERE Owns.customer_id = Customer.id AND Owns.car_vin = Car.vin \
                       GROUP BY Owns.customer_id) gt20, Customer c \
                 WHERE c.id = gt20.customer_id AND gt20.num > 20"
            }
            Report::CarsBefore1995Under50000Miles => {
                "SELECT c.make, c.model, c.year \
                 FROM Car c, Service_Request s \
                 WHERE c.year < 1995 AND c.vin = s.car_vin AND s.odometer < 50000"
            }
            Report::CustomersByTotalBill => {
                "SELECT c.fname, c.lname, SUM(closed.bill) AS cbal \
                 FROM Customer c, Closed_Request closed, Service_Request s \
                 WHERE c.id = s.customer_id AND s.rid = closed.rid \
                 GROUP BY c.fname, c.lname \
                 ORDER BY cbal DESC"
            }
        }
    }

    /// Runs the report and prints its table, returning the row count.
    pub fn run<W: Write>(&self, db: &mut Database, out: &mut W) -> Result<usize> {
        db.execute_query_and_print(self.sql(), &[], out)
    }
}
