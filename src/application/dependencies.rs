use crate::ports::*;
use std::sync::Arc;

/// サービスの依存関係
///
/// データ構造として定義し、振る舞いは持たない。
/// 各サービス関数はこれを明示的な引数として受け取る。
#[derive(Clone)]
pub struct ServiceDependencies {
    pub book_repository: Arc<dyn BookRepository>,
    pub loan_repository: Arc<dyn LoanRepository>,
    pub email_service: Arc<dyn EmailService>,
}
