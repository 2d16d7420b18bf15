pub mod book;
pub mod commands;
pub mod loan;
pub mod page;
pub mod value_objects;

pub use book::{Book, BookFilter};
pub use loan::{Loan, LoanFilter};
pub use page::{Page, PageRequest};
pub use value_objects::*;
