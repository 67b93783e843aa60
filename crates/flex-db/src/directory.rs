//! Directory ports
//!
//! The application services depend on these two traits only. Every mutation
//! of a membership set is a set operation: adds never introduce duplicates and
//! removals of absent members are no-ops, so each step of a multi-directory
//! operation can be retried safely.

use async_trait::async_trait;
use flex_core::traits::Id;
use flex_models::{Class, ListingFields, NewClass, NewUser, User};

use crate::repository::RepositoryResult;

/// Outcome of an atomic add-to-set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetAdd {
    /// The member was not present and has been added
    Added,
    /// The member was already present; nothing changed
    AlreadyPresent,
    /// The target record does not exist
    Missing,
}

/// Which classes a query selects
#[derive(Debug, Clone, PartialEq)]
pub enum ClassFilter {
    /// Classes the user has not applied to, optionally narrowed by type and
    /// by any of the given (lowercase) weekdays
    NotAppliedBy {
        user_id: Id,
        class_type: Option<String>,
        days: Vec<String>,
    },
    /// Classes whose applicant set contains the user
    AppliedBy(Id),
    /// Classes posted by the owner
    PostedBy(Id),
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Most recently posted first
    #[default]
    DatePostedDesc,
    DatePostedAsc,
}

/// A filter plus an ordering
#[derive(Debug, Clone, PartialEq)]
pub struct ClassQuery {
    pub filter: ClassFilter,
    pub sort: SortOrder,
}

impl ClassQuery {
    pub fn new(filter: ClassFilter) -> Self {
        Self {
            filter,
            sort: SortOrder::default(),
        }
    }

    pub fn available_to(user_id: Id, class_type: Option<String>, days: Vec<String>) -> Self {
        Self::new(ClassFilter::NotAppliedBy {
            user_id,
            class_type,
            days,
        })
    }

    pub fn applied_by(user_id: Id) -> Self {
        Self::new(ClassFilter::AppliedBy(user_id))
    }

    pub fn posted_by(owner_id: Id) -> Self {
        Self::new(ClassFilter::PostedBy(owner_id))
    }

    pub fn all() -> Self {
        Self::new(ClassFilter::All)
    }

    pub fn with_sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    /// Whether a class is selected by the filter
    pub fn matches(&self, class: &Class) -> bool {
        match &self.filter {
            ClassFilter::NotAppliedBy {
                user_id,
                class_type,
                days,
            } => {
                !class.has_applicant(*user_id)
                    && class_type.as_ref().map_or(true, |t| &class.class_type == t)
                    && (days.is_empty() || days.iter().any(|d| d == &class.class_date_day))
            }
            ClassFilter::AppliedBy(user_id) => class.has_applicant(*user_id),
            ClassFilter::PostedBy(owner_id) => class.is_owned_by(*owner_id),
            ClassFilter::All => true,
        }
    }
}

/// Account storage
#[cfg_attr(feature = "mocks", mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>>;

    /// Insert a new account; a taken email is a `Conflict`
    async fn create(&self, user: NewUser) -> RepositoryResult<User>;

    /// Add `class_id` to the user's applied set unless already present
    async fn add_to_applied_set(&self, user_id: Id, class_id: Id) -> RepositoryResult<SetAdd>;

    /// Remove `class_id` from the user's applied set; absent user or member is a no-op
    async fn remove_from_applied_set(&self, user_id: Id, class_id: Id) -> RepositoryResult<()>;

    /// Remove `class_id` from every user's applied set, returning how many users changed
    async fn remove_reference_from_all(&self, class_id: Id) -> RepositoryResult<u64>;

    /// Users with a non-empty applied set
    async fn find_with_applications(&self) -> RepositoryResult<Vec<User>>;
}

/// Class listing storage
#[cfg_attr(feature = "mocks", mockall::automock)]
#[async_trait]
pub trait ClassDirectory: Send + Sync {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<Class>>;

    async fn query(&self, query: &ClassQuery) -> RepositoryResult<Vec<Class>>;

    /// Add `user_id` to the class's applicant set unless already present
    async fn add_to_applicant_set(&self, class_id: Id, user_id: Id) -> RepositoryResult<SetAdd>;

    /// Remove `user_id` from the class's applicant set; absent class or member is a no-op
    async fn remove_from_applicant_set(&self, class_id: Id, user_id: Id) -> RepositoryResult<()>;

    /// Overwrite all seven listing fields of a class owned by `owner_id`; returns matched count
    async fn update_fields(
        &self,
        class_id: Id,
        owner_id: Id,
        fields: &ListingFields,
    ) -> RepositoryResult<u64>;

    /// Delete a class owned by `owner_id`; returns matched count
    async fn delete_one(&self, class_id: Id, owner_id: Id) -> RepositoryResult<u64>;

    async fn create(&self, class: NewClass) -> RepositoryResult<Class>;
}
