mod errors;
mod loan_service;
mod overdue_detection;

pub use errors::{LoanApplicationError, Result};
pub use loan_service::{
    borrow_by_isbn, find_loans, get_loan, loan_book, loans_by_book, return_book, set_returned,
    update_loan,
};
pub use overdue_detection::find_overdue_loans;
