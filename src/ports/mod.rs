pub mod book_repository;
pub mod email_service;
pub mod loan_repository;

pub use book_repository::{BookReferencedByLoans, BookRepository, DuplicateIsbn};
pub use email_service::EmailService;
pub use loan_repository::{LoanRepository, OutstandingLoanExists};
