//! Accounting entities, mirroring Xero's PascalCase JSON.
//!
//! Identity and server-computed fields are optional so one type serves both to
//! create an entity and to read it back.

pub mod contact;
pub mod invoice;
pub mod item;
pub mod line_item;
pub mod manual_journal;
pub mod organisation;
pub mod payment;
pub mod repeating_invoice;

pub use contact::Contact;
pub use invoice::Invoice;
pub use item::Item;
pub use line_item::LineItem;
pub use manual_journal::{JournalLine, ManualJournal};
pub use organisation::Organisation;
pub use payment::Payment;
pub use repeating_invoice::{RepeatingInvoice, Schedule};
