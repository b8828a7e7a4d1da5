use crate::core::db::Database;
use crate::core::{Result, ShopError};
use crate::records::{Car, Customer, Mechanic, Record};
use crate::reports::Report;
use std::io::{BufRead, Write};
use std::ops::ControlFlow;
use tracing::{debug, warn};

/// Entries of the main menu, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    AddCustomer,
    AddMechanic,
    AddCar,
    InsertServiceRequest,
    CloseServiceRequest,
    ListCustomersWithBillLessThan100,
    ListCustomersWithMoreThan20Cars,
    ListCarsBefore1995With50000Miles,
    ListKCarsWithTheMostServices,
    ListCustomersInDescendingOrderOfTheirTotalBill,
    Exit,
}

impl MenuAction {
    pub const ALL: [MenuAction; 11] = [
        MenuAction::AddCustomer,
        MenuAction::AddMechanic,
        MenuAction::AddCar,
        MenuAction::InsertServiceRequest,
        MenuAction::CloseServiceRequest,
        MenuAction::ListCustomersWithBillLessThan100,
        MenuAction::ListCustomersWithMoreThan20Cars,
        MenuAction::ListCarsBefore1995With50000Miles,
        MenuAction::ListKCarsWithTheMostServices,
        MenuAction::ListCustomersInDescendingOrderOfTheirTotalBill,
        MenuAction::Exit,
    ];

    /// Maps a 1-based menu number to its action.
    pub fn from_choice(choice: i64) -> Option<Self> {
        let index = usize::try_from(choice).ok()?.checked_sub(1)?;
        Self::ALL.get(index).copied()
    }

    pub fn label(&self) -> &'static str {
        match self {
            MenuAction::AddCustomer => "AddCustomer",
            MenuAction::AddMechanic => "AddMechanic",
            MenuAction::AddCar => "AddCar",
            MenuAction::InsertServiceRequest => "InsertServiceRequest",
            MenuAction::CloseServiceRequest => "CloseServiceRequest",
            MenuAction::ListCustomersWithBillLessThan100 => "ListCustomersWithBillLessThan100",
            MenuAction::ListCustomersWithMoreThan20Cars => "ListCustomersWithMoreThan20Cars",
            MenuAction::ListCarsBefore1995With50000Miles => "ListCarsBefore1995With50000Miles",
            MenuAction::ListKCarsWithTheMostServices => "ListKCarsWithTheMostServices",
            MenuAction::ListCustomersInDescendingOrderOfTheirTotalBill => {
                "ListCustomersInDescendingOrderOfTheirTotalBill"
            }
            MenuAction::Exit => "< EXIT",
        }
    }
}

/// Renders the main menu block.
pub fn render_menu() -> String {
    let mut menu = String::from("MAIN MENU\n---------\n");
    for (i, action) in MenuAction::ALL.iter().enumerate() {
        menu.push_str(&format!("{}. {}\n", i + 1, action.label()));
    }
    menu
}

/// Parses a menu choice; `None` for anything that is not an integer.
pub fn parse_choice(input: &str) -> Option<i64> {
    input.trim().parse::<i64>().ok()
}

/// Outcome of reading one menu choice
#[derive(Debug, PartialEq)]
enum Choice {
    Number(i64),
    EndOfInput,
}

/// The interactive menu loop.
///
/// Reads choices from `input`, writes the menu, prompts and tables to `out`
/// and per-action failures to `err`.
pub struct MenuController<'db, R, W, E> {
    db: &'db mut Database,
    input: R,
    out: W,
    err: E,
}

impl<'db, R: BufRead, W: Write, E: Write> MenuController<'db, R, W, E> {
    pub fn new(db: &'db mut Database, input: R, out: W, err: E) -> Self {
        MenuController { db, input, out, err }
    }

    /// Runs until the operator picks EXIT or input ends.
    ///
    /// # Errors
    ///
    /// Only console I/O failures end the loop with an error; statement
    /// failures are reported on the error stream and the loop continues.
    pub fn run(&mut self) -> Result<()> {
        loop {
            write!(self.out, "{}", render_menu())?;

            let choice = match self.read_choice()? {
                Choice::Number(n) => n,
                Choice::EndOfInput => {
                    debug!("input closed, leaving menu");
                    return Ok(());
                }
            };

            let Some(action) = MenuAction::from_choice(choice) else {
                writeln!(self.out, "{} is not a menu option!", choice)?;
                continue;
            };

            debug!(action = action.label(), "dispatching");
            match self.dispatch(action) {
                Ok(ControlFlow::Continue(())) => {}
                Ok(ControlFlow::Break(())) => return Ok(()),
                Err(ShopError::Io(e)) => return Err(ShopError::Io(e)),
                Err(e) => {
                    warn!(action = action.label(), error = %e, "action failed");
                    writeln!(self.err, "{}", e)?;
                    self.err.flush()?;
                }
            }
        }
    }

    /// Prompts until an integer is entered.
    fn read_choice(&mut self) -> Result<Choice> {
        loop {
            write!(self.out, "Please make your choice: ")?;
            self.out.flush()?;

            let Some(line) = self.read_line()? else {
                return Ok(Choice::EndOfInput);
            };
            match parse_choice(&line) {
                Some(n) => return Ok(Choice::Number(n)),
                None => writeln!(self.out, "Your input is invalid!")?,
            }
        }
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    /// Runs one action; `Break` once the operator chose EXIT.
    fn dispatch(&mut self, action: MenuAction) -> Result<ControlFlow<()>> {
        match action {
            MenuAction::AddCustomer => {
                let customer = Customer {
                    id: self.read_integer("id")?,
                    fname: self.read_text("fname")?,
                    lname: self.read_text("lname")?,
                    phone: self.read_text("phone")?,
                    address: self.read_text("address")?,
                };
                customer.insert(self.db)?;
            }
            MenuAction::AddMechanic => {
                let mechanic = Mechanic {
                    id: self.read_integer("id")?,
                    fname: self.read_text("fname")?,
                    lname: self.read_text("lname")?,
                    experience: self.read_integer("experience")?,
                };
                mechanic.insert(self.db)?;
            }
            MenuAction::AddCar => {
                let car = Car {
                    vin: self.read_text("vin")?,
                    make: self.read_text("make")?,
                    model: self.read_text("model")?,
                    year: self.read_integer("year")?,
                };
                car.insert(self.db)?;
            }
            // No query is defined for these
            MenuAction::InsertServiceRequest
            | MenuAction::CloseServiceRequest
            | MenuAction::ListKCarsWithTheMostServices => {
                return Err(ShopError::NotImplemented(action.label()));
            }
            MenuAction::ListCustomersWithBillLessThan100 => {
                Report::BillsUnder100.run(self.db, &mut self.out)?;
            }
            MenuAction::ListCustomersWithMoreThan20Cars => {
                Report::CustomersWithMoreThan20Cars.run(self.db, &mut self.out)?;
            }
            MenuAction::ListCarsBefore1995With50000Miles => {
                Report::CarsBefore1995Under50000Miles.run(self.db, &mut self.out)?;
            }
            MenuAction::ListCustomersInDescendingOrderOfTheirTotalBill => {
                Report::CustomersByTotalBill.run(self.db, &mut self.out)?;
            }
            MenuAction::Exit => return Ok(ControlFlow::Break(())),
        }
        Ok(ControlFlow::Continue(()))
    }

    fn read_text(&mut self, field: &str) -> Result<String> {
        write!(self.out, "\tEnter {}: ", field)?;
        self.out.flush()?;
        self.read_line()?
            .ok_or_else(|| ShopError::Input(format!("no value entered for {}", field)))
    }

    fn read_integer(&mut self, field: &str) -> Result<i64> {
        let raw = self.read_text(field)?;
        raw.trim()
            .parse::<i64>()
            .map_err(|_| ShopError::Input(format!("{} must be an integer, got '{}'", field, raw)))
    }
}
