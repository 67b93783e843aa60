//! In-memory directories
//!
//! Same port semantics as the PostgreSQL repositories, backed by
//! `parking_lot::RwLock` maps. Used by tests and `STORAGE=memory`.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use flex_core::traits::Id;
use flex_models::{Class, ListingFields, NewClass, NewUser, User};
use parking_lot::RwLock;

use crate::directory::{ClassDirectory, ClassQuery, SetAdd, SortOrder, UserDirectory};
use crate::repository::{RepositoryError, RepositoryResult};

fn set_add(set: &mut Vec<Id>, member: Id) -> SetAdd {
    if set.contains(&member) {
        SetAdd::AlreadyPresent
    } else {
        set.push(member);
        SetAdd::Added
    }
}

fn set_remove(set: &mut Vec<Id>, member: Id) -> bool {
    let before = set.len();
    set.retain(|m| *m != member);
    set.len() != before
}

/// In-memory user directory
#[derive(Debug)]
pub struct MemoryUserDirectory {
    users: RwLock<BTreeMap<Id, User>>,
    next_id: AtomicI64,
}

impl Default for MemoryUserDirectory {
    fn default() -> Self {
        Self {
            users: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl MemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a user as-is, e.g. to seed a half-applied state in tests
    pub fn insert(&self, user: User) {
        self.next_id.fetch_max(user.id + 1, Ordering::SeqCst);
        self.users.write().insert(user.id, user);
    }

    pub fn len(&self) -> usize {
        self.users.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.read().is_empty()
    }
}

#[async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<User>> {
        Ok(self.users.read().get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        Ok(self.users.read().values().find(|u| u.email == email).cloned())
    }

    async fn create(&self, user: NewUser) -> RepositoryResult<User> {
        let mut users = self.users.write();
        if users.values().any(|u| u.email == user.email) {
            return Err(RepositoryError::Conflict(format!(
                "email {} already registered",
                user.email
            )));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let created = User {
            id,
            email: user.email,
            hashed_password: user.hashed_password,
            first_name: user.first_name,
            last_name: user.last_name,
            studio: user.studio,
            role: user.role,
            class_applied: Vec::new(),
            created_at: Utc::now(),
        };
        users.insert(id, created.clone());
        Ok(created)
    }

    async fn add_to_applied_set(&self, user_id: Id, class_id: Id) -> RepositoryResult<SetAdd> {
        Ok(match self.users.write().get_mut(&user_id) {
            Some(user) => set_add(&mut user.class_applied, class_id),
            None => SetAdd::Missing,
        })
    }

    async fn remove_from_applied_set(&self, user_id: Id, class_id: Id) -> RepositoryResult<()> {
        if let Some(user) = self.users.write().get_mut(&user_id) {
            set_remove(&mut user.class_applied, class_id);
        }
        Ok(())
    }

    async fn remove_reference_from_all(&self, class_id: Id) -> RepositoryResult<u64> {
        let mut users = self.users.write();
        let changed = users
            .values_mut()
            .map(|u| set_remove(&mut u.class_applied, class_id))
            .filter(|removed| *removed)
            .count();
        Ok(changed as u64)
    }

    async fn find_with_applications(&self) -> RepositoryResult<Vec<User>> {
        Ok(self
            .users
            .read()
            .values()
            .filter(|u| !u.class_applied.is_empty())
            .cloned()
            .collect())
    }
}

/// In-memory class directory
#[derive(Debug)]
pub struct MemoryClassDirectory {
    classes: RwLock<BTreeMap<Id, Class>>,
    next_id: AtomicI64,
}

impl Default for MemoryClassDirectory {
    fn default() -> Self {
        Self {
            classes: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl MemoryClassDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a class as-is, e.g. to seed a half-applied state in tests
    pub fn insert(&self, class: Class) {
        self.next_id.fetch_max(class.id + 1, Ordering::SeqCst);
        self.classes.write().insert(class.id, class);
    }

    pub fn len(&self) -> usize {
        self.classes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.read().is_empty()
    }
}

#[async_trait]
impl ClassDirectory for MemoryClassDirectory {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<Class>> {
        Ok(self.classes.read().get(&id).cloned())
    }

    async fn query(&self, query: &ClassQuery) -> RepositoryResult<Vec<Class>> {
        let mut found: Vec<Class> = self
            .classes
            .read()
            .values()
            .filter(|c| query.matches(c))
            .cloned()
            .collect();

        found.sort_by(|a, b| {
            let key = (a.date_posted, a.id).cmp(&(b.date_posted, b.id));
            match query.sort {
                SortOrder::DatePostedDesc => key.reverse(),
                SortOrder::DatePostedAsc => key,
            }
        });
        Ok(found)
    }

    async fn add_to_applicant_set(&self, class_id: Id, user_id: Id) -> RepositoryResult<SetAdd> {
        Ok(match self.classes.write().get_mut(&class_id) {
            Some(class) => set_add(&mut class.user_applied, user_id),
            None => SetAdd::Missing,
        })
    }

    async fn remove_from_applicant_set(&self, class_id: Id, user_id: Id) -> RepositoryResult<()> {
        if let Some(class) = self.classes.write().get_mut(&class_id) {
            set_remove(&mut class.user_applied, user_id);
        }
        Ok(())
    }

    async fn update_fields(
        &self,
        class_id: Id,
        owner_id: Id,
        fields: &ListingFields,
    ) -> RepositoryResult<u64> {
        match self.classes.write().get_mut(&class_id) {
            Some(class) if class.is_owned_by(owner_id) => {
                class.apply_fields(fields);
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    async fn delete_one(&self, class_id: Id, owner_id: Id) -> RepositoryResult<u64> {
        let mut classes = self.classes.write();
        if classes.get(&class_id).is_some_and(|c| c.is_owned_by(owner_id)) {
            classes.remove(&class_id);
            Ok(1)
        } else {
            Ok(0)
        }
    }

    async fn create(&self, class: NewClass) -> RepositoryResult<Class> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let created = class.into_class(id);
        self.classes.write().insert(id, created.clone());
        Ok(created)
    }
}
