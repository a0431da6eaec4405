pub mod categories;
pub mod checkout;
pub mod core;
pub mod courses;
pub mod demandes;
pub mod feedback;
pub mod plans;
pub mod quizzes;
pub mod session;
pub mod store;
pub mod subscriptions;
pub mod users;
