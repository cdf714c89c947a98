use crate::domain::customer::Customer;
use crate::domain::email::Email;
use crate::domain::purchase::PurchaseResponse;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct PlacementRecord<'a> {
    email: &'a str,
    tracking_number: &'a str,
}

#[derive(Serialize)]
struct CustomerRecord<'a> {
    email: &'a str,
    first_name: &'a str,
    last_name: &'a str,
    orders: usize,
}

/// Writes checkout results as CSV.
pub struct OrderWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> OrderWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    /// Writes one `email,tracking_number` row. The header is emitted with the
    /// first row.
    pub fn write_placement(&mut self, email: &Email, response: &PurchaseResponse) -> Result<()> {
        self.writer.serialize(PlacementRecord {
            email: email.as_str(),
            tracking_number: &response.order_tracking_number,
        })?;
        Ok(())
    }

    /// Writes an `email,first_name,last_name,orders` summary of every customer.
    pub fn write_customers(&mut self, customers: &[Customer]) -> Result<()> {
        if customers.is_empty() {
            self.writer
                .write_record(["email", "first_name", "last_name", "orders"])?;
        }
        for customer in customers {
            self.writer.serialize(CustomerRecord {
                email: customer.email.as_str(),
                first_name: &customer.first_name,
                last_name: &customer.last_name,
                orders: customer.orders.len(),
            })?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
