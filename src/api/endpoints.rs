//! REST paths consumed by the client.

pub const LOGIN: &str = "/login";
pub const REGISTER: &str = "/register";
pub const LOGOUT: &str = "/logout";
pub const ADMIN_LOGIN: &str = "/admin/login";
pub const ADMIN_LOGOUT: &str = "/admin/logout";
pub const PROF_LOGIN: &str = "/professeur/login";
pub const PROF_LOGOUT: &str = "/professeur/logout";

pub const COURSES: &str = "/course";
pub const CATEGORIES: &str = "/categorie";
pub const QUIZZES: &str = "/quiz";
pub const PROFESSORS: &str = "/professeur";
pub const LEARNERS: &str = "/apprenant";
pub const SUBSCRIPTIONS: &str = "/admin/subscriptions";
pub const PAYMENTS: &str = "/admin/payments";
pub const PLANS: &str = "/planabonnement";
pub const DEMANDES: &str = "/demandes";
pub const QUESTIONS: &str = "/question";
pub const REVIEWS: &str = "/feedback";
pub const CHECKOUT_SESSION: &str = "/checkoutsession";

pub fn item(collection: &str, id: &str) -> String {
    format!("{}/{}", collection, id)
}

pub fn action(collection: &str, id: &str, action: &str) -> String {
    format!("{}/{}/{}", collection, id, action)
}

pub fn quiz_for_course(course_id: &str) -> String {
    format!("{}/course/{}", QUIZZES, course_id)
}

pub const ACCEPT: &str = "accepter";
pub const REFUSE: &str = "refuser";
pub const RESPOND: &str = "reponse";
