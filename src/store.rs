use crate::models::{
    Category, Course, Demande, Learner, Payment, Plan, Professor, Question, Quiz, Review,
    Subscription,
};
use serde::Serialize;
use std::collections::HashMap;

pub trait Entity: Clone + Serialize {
    fn id(&self) -> &str;
}

macro_rules! entity_by_id {
    ($($t:ty),* $(,)?) => {
        $(impl Entity for $t {
            fn id(&self) -> &str {
                &self.id
            }
        })*
    };
}

entity_by_id!(
    Category,
    Course,
    Demande,
    Learner,
    Payment,
    Plan,
    Professor,
    Question,
    Quiz,
    Review,
    Subscription,
);

/// Id-keyed mirror of one server collection, in server order.
#[derive(Debug, Clone)]
pub struct Collection<T> {
    by_id: HashMap<String, T>,
    order: Vec<String>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            by_id: HashMap::new(),
            order: Vec::new(),
        }
    }
}

impl<T: Entity> Collection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces everything. A repeated id keeps its first position and its
    /// last value.
    pub fn set_all(&mut self, items: Vec<T>) {
        self.by_id.clear();
        self.order.clear();
        for item in items {
            let id = item.id().to_string();
            if self.by_id.insert(id.clone(), item).is_none() {
                self.order.push(id);
            }
        }
    }

    /// Push-if-absent.
    pub fn add(&mut self, item: T) -> bool {
        let id = item.id().to_string();
        if self.by_id.contains_key(&id) {
            return false;
        }
        self.by_id.insert(id.clone(), item);
        self.order.push(id);
        true
    }

    pub fn update(&mut self, item: T) -> bool {
        match self.by_id.get_mut(item.id()) {
            Some(slot) => {
                *slot = item;
                true
            }
            None => false,
        }
    }

    pub fn update_with<F: FnOnce(&mut T)>(&mut self, id: &str, f: F) -> bool {
        match self.by_id.get_mut(id) {
            Some(slot) => {
                f(slot);
                true
            }
            None => false,
        }
    }

    /// Add when absent, replace when present.
    pub fn upsert(&mut self, item: T) {
        if !self.update(item.clone()) {
            self.add(item);
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<T> {
        let removed = self.by_id.remove(id)?;
        if let Some(pos) = self.order.iter().position(|x| x == id) {
            self.order.remove(pos);
        }
        Some(removed)
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.by_id.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.order.iter().filter_map(|id| self.by_id.get(id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }

    pub fn snapshot(&self) -> serde_json::Value {
        serde_json::to_value(self.to_vec()).unwrap_or(serde_json::Value::Array(Vec::new()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Courses,
    Categories,
    Quizzes,
    Plans,
    Subscriptions,
    Payments,
    Learners,
    Professors,
    Demandes,
    Questions,
    Reviews,
}

impl Resource {
    pub const ALL: [Resource; 11] = [
        Resource::Courses,
        Resource::Categories,
        Resource::Quizzes,
        Resource::Plans,
        Resource::Subscriptions,
        Resource::Payments,
        Resource::Learners,
        Resource::Professors,
        Resource::Demandes,
        Resource::Questions,
        Resource::Reviews,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        Resource::ALL.into_iter().find(|r| r.key() == s)
    }

    pub fn key(self) -> &'static str {
        match self {
            Resource::Courses => "courses",
            Resource::Categories => "categories",
            Resource::Quizzes => "quizzes",
            Resource::Plans => "plans",
            Resource::Subscriptions => "subscriptions",
            Resource::Payments => "payments",
            Resource::Learners => "learners",
            Resource::Professors => "professors",
            Resource::Demandes => "demandes",
            Resource::Questions => "questions",
            Resource::Reviews => "reviews",
        }
    }
}

#[derive(Debug, Default)]
pub struct Store {
    pub courses: Collection<Course>,
    pub categories: Collection<Category>,
    pub quizzes: Collection<Quiz>,
    pub plans: Collection<Plan>,
    pub subscriptions: Collection<Subscription>,
    pub payments: Collection<Payment>,
    pub learners: Collection<Learner>,
    pub professors: Collection<Professor>,
    pub demandes: Collection<Demande>,
    pub questions: Collection<Question>,
    pub reviews: Collection<Review>,
    /// Demande currently opened in the admin detail view.
    pub selected_demande: Option<String>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self, resource: Resource) -> serde_json::Value {
        match resource {
            Resource::Courses => self.courses.snapshot(),
            Resource::Categories => self.categories.snapshot(),
            Resource::Quizzes => self.quizzes.snapshot(),
            Resource::Plans => self.plans.snapshot(),
            Resource::Subscriptions => self.subscriptions.snapshot(),
            Resource::Payments => self.payments.snapshot(),
            Resource::Learners => self.learners.snapshot(),
            Resource::Professors => self.professors.snapshot(),
            Resource::Demandes => self.demandes.snapshot(),
            Resource::Questions => self.questions.snapshot(),
            Resource::Reviews => self.reviews.snapshot(),
        }
    }
}
