use crate::domain::{BookId, Loan, LoanFilter, LoanId, Page, PageRequest};
use crate::ports::loan_repository::{
    LoanRepository as LoanRepositoryTrait, OutstandingLoanExists, Result,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::Mutex;

#[derive(Default)]
struct State {
    next_id: i64,
    loans: BTreeMap<LoanId, Loan>,
}

impl State {
    /// Whether storing `loan` would leave a second outstanding loan for the book
    fn collides(&self, loan: &Loan, book_id: BookId, own_id: Option<LoanId>) -> bool {
        loan.is_outstanding()
            && self.loans.iter().any(|(id, l)| {
                Some(*id) != own_id && l.book.id == Some(book_id) && l.is_outstanding()
            })
    }
}

/// In-memory implementation of LoanRepository
///
/// Enforces at most one outstanding loan per book on insert and update,
/// mirroring the partial unique index of the database schema.
#[derive(Default)]
pub struct LoanRepository {
    state: Mutex<State>,
    save_calls: Mutex<usize>,
}

impl LoanRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times `save` was invoked
    pub fn save_calls(&self) -> usize {
        *self.save_calls.lock().unwrap()
    }
}

#[async_trait]
impl LoanRepositoryTrait for LoanRepository {
    async fn save(&self, loan: Loan) -> Result<Loan> {
        *self.save_calls.lock().unwrap() += 1;
        let mut state = self.state.lock().unwrap();

        let book_id = loan
            .book
            .id
            .ok_or("loan references a book without id")?;

        match loan.id {
            None => {
                if state.collides(&loan, book_id, None) {
                    return Err(Box::new(OutstandingLoanExists(book_id)));
                }

                state.next_id += 1;
                let id = LoanId::from_i64(state.next_id);
                let saved = Loan {
                    id: Some(id),
                    ..loan
                };
                state.loans.insert(id, saved.clone());
                Ok(saved)
            }
            Some(id) => {
                if !state.loans.contains_key(&id) {
                    return Err(format!("loan {} does not exist", id).into());
                }
                if state.collides(&loan, book_id, Some(id)) {
                    return Err(Box::new(OutstandingLoanExists(book_id)));
                }
                state.loans.insert(id, loan.clone());
                Ok(loan)
            }
        }
    }

    async fn exists_by_book_and_not_returned(&self, book_id: BookId) -> Result<bool> {
        let state = self.state.lock().unwrap();
        Ok(state
            .loans
            .values()
            .any(|l| l.book.id == Some(book_id) && l.is_outstanding()))
    }

    async fn find_by_id(&self, id: LoanId) -> Result<Option<Loan>> {
        Ok(self.state.lock().unwrap().loans.get(&id).cloned())
    }

    async fn find_by_book_isbn_or_customer(
        &self,
        filter: &LoanFilter,
        page: PageRequest,
    ) -> Result<Page<Loan>> {
        let state = self.state.lock().unwrap();
        let matching = state
            .loans
            .values()
            .filter(|l| filter.matches(l))
            .cloned()
            .collect();

        Ok(Page::slice(matching, page))
    }

    async fn find_by_book(&self, book_id: BookId, page: PageRequest) -> Result<Page<Loan>> {
        let state = self.state.lock().unwrap();
        let matching = state
            .loans
            .values()
            .filter(|l| l.book.id == Some(book_id))
            .cloned()
            .collect();

        Ok(Page::slice(matching, page))
    }

    async fn find_all_late_loans(&self, cutoff: NaiveDate) -> Result<Vec<Loan>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .loans
            .values()
            .filter(|l| l.is_outstanding() && l.date <= cutoff)
            .cloned()
            .collect())
    }
}
