//! Domain models for the billing back-office.

mod customer;
mod invoice;
mod money;
mod payment;
mod property;

pub use customer::{CreateCustomer, Customer};
pub use invoice::{
    status_after_payment, CreateInvoice, Invoice, InvoiceStatus, ListInvoicesQuery,
};
pub use money::check_amount;
pub use payment::{CreatePayment, ListPaymentsQuery, Payment};
pub use property::{CreateProperty, Property};
