//! Apply and withdraw

use flex_core::error::{FlexError, FlexResult};
use flex_core::traits::Id;
use flex_db::SetAdd;
use flex_models::Class;
use tracing::{debug, error, info, warn};

use super::ApplicationCoordinator;

impl ApplicationCoordinator {
    /// Link `user_id` and `class_id` in both directories.
    ///
    /// The class-side add is a conditional set-add, so of two racing calls
    /// only one sees `Added`; the other gets `AlreadyApplied`.
    pub async fn apply(&self, user_id: Id, class_id: Id) -> FlexResult<Class> {
        debug!(user_id, class_id, "apply: adding applicant to class");
        match self.classes.add_to_applicant_set(class_id, user_id).await? {
            SetAdd::Added => {}
            SetAdd::Missing => return Err(FlexError::not_found("Class", class_id)),
            SetAdd::AlreadyPresent => {
                // A previous attempt may have stopped after the class side.
                match self.users.add_to_applied_set(user_id, class_id).await? {
                    SetAdd::Added => {
                        warn!(user_id, class_id, "apply: restored missing user-side link");
                    }
                    SetAdd::AlreadyPresent => {}
                    SetAdd::Missing => {
                        warn!(user_id, class_id, "apply: dropping applicant with no user record");
                        self.classes.remove_from_applicant_set(class_id, user_id).await?;
                        return Err(FlexError::not_found("User", user_id));
                    }
                }
                return Err(FlexError::AlreadyApplied { user_id, class_id });
            }
        }

        debug!(user_id, class_id, "apply: adding class to user");
        match self.users.add_to_applied_set(user_id, class_id).await {
            Ok(SetAdd::Added) | Ok(SetAdd::AlreadyPresent) => {}
            Ok(SetAdd::Missing) => {
                warn!(user_id, class_id, "apply: user does not exist, undoing class-side add");
                self.classes.remove_from_applicant_set(class_id, user_id).await?;
                return Err(FlexError::not_found("User", user_id));
            }
            Err(e) => {
                error!(user_id, class_id, error = %e, "apply: user-side add failed");
                if let Err(undo) = self.classes.remove_from_applicant_set(class_id, user_id).await {
                    warn!(
                        user_id,
                        class_id,
                        error = %undo,
                        "apply: could not undo class-side add, left for repair"
                    );
                }
                return Err(e.into());
            }
        }

        info!(user_id, class_id, "Applied to class");
        self.current(class_id).await
    }

    /// Unlink `user_id` and `class_id`. Removing an absent link is a no-op.
    pub async fn withdraw(&self, user_id: Id, class_id: Id) -> FlexResult<Class> {
        debug!(user_id, class_id, "withdraw: removing applicant from class");
        self.classes.remove_from_applicant_set(class_id, user_id).await?;

        debug!(user_id, class_id, "withdraw: removing class from user");
        self.users.remove_from_applied_set(user_id, class_id).await?;

        info!(user_id, class_id, "Withdrew from class");
        self.current(class_id).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use flex_core::types::UserRole;
    use flex_db::{ClassDirectory, MemoryClassDirectory, MockUserDirectory, RepositoryError};
    use mockall::predicate::eq;

    use super::*;
    use crate::classes::testing::Fixture;

    #[tokio::test]
    async fn test_apply_links_both_sides() {
        let fx = Fixture::new();
        let studio = fx.user("studio@user.com", UserRole::Studio).await;
        let instructor = fx.user("instructor@user.com", UserRole::Instructor).await;
        let class = fx.class(studio.id, 0).await;

        let updated = fx.coordinator.apply(instructor.id, class.id).await.unwrap();

        assert_eq!(updated.user_applied, vec![instructor.id]);
        assert_eq!(fx.stored_user(instructor.id).await.class_applied, vec![class.id]);
    }

    #[tokio::test]
    async fn test_second_apply_is_rejected_without_change() {
        let fx = Fixture::new();
        let studio = fx.user("studio@user.com", UserRole::Studio).await;
        let instructor = fx.user("instructor@user.com", UserRole::Instructor).await;
        let class = fx.class(studio.id, 0).await;

        fx.coordinator.apply(instructor.id, class.id).await.unwrap();
        let err = fx.coordinator.apply(instructor.id, class.id).await.unwrap_err();

        assert!(matches!(err, FlexError::AlreadyApplied { .. }));
        assert_eq!(err.status_code(), 422);
        assert_eq!(fx.stored_class(class.id).await.unwrap().user_applied, vec![instructor.id]);
        assert_eq!(fx.stored_user(instructor.id).await.class_applied, vec![class.id]);
    }

    #[tokio::test]
    async fn test_apply_to_missing_class() {
        let fx = Fixture::new();
        let instructor = fx.user("instructor@user.com", UserRole::Instructor).await;

        let err = fx.coordinator.apply(instructor.id, 404).await.unwrap_err();

        assert_eq!(err.status_code(), 404);
        assert!(fx.stored_user(instructor.id).await.class_applied.is_empty());
    }

    #[tokio::test]
    async fn test_apply_for_missing_user_is_undone() {
        let fx = Fixture::new();
        let studio = fx.user("studio@user.com", UserRole::Studio).await;
        let class = fx.class(studio.id, 0).await;

        let err = fx.coordinator.apply(999, class.id).await.unwrap_err();

        assert!(matches!(err, FlexError::NotFound { entity: "User", .. }));
        assert!(fx.stored_class(class.id).await.unwrap().user_applied.is_empty());
    }

    #[tokio::test]
    async fn test_retry_after_half_apply_restores_user_side() {
        let fx = Fixture::new();
        let studio = fx.user("studio@user.com", UserRole::Studio).await;
        let instructor = fx.user("instructor@user.com", UserRole::Instructor).await;
        let mut class = fx.class(studio.id, 0).await;

        // Class side written, user side lost
        class.user_applied.push(instructor.id);
        fx.classes.insert(class.clone());

        let err = fx.coordinator.apply(instructor.id, class.id).await.unwrap_err();

        assert!(matches!(err, FlexError::AlreadyApplied { .. }));
        assert_eq!(fx.stored_user(instructor.id).await.class_applied, vec![class.id]);
    }

    #[tokio::test]
    async fn test_retry_for_deleted_user_drops_orphan_applicant() {
        let fx = Fixture::new();
        let studio = fx.user("studio@user.com", UserRole::Studio).await;
        let mut class = fx.class(studio.id, 0).await;

        // Class lists an applicant whose account no longer exists
        class.user_applied.push(999);
        fx.classes.insert(class.clone());

        let err = fx.coordinator.apply(999, class.id).await.unwrap_err();

        assert!(matches!(err, FlexError::NotFound { entity: "User", .. }));
        assert!(fx.stored_class(class.id).await.unwrap().user_applied.is_empty());
    }

    #[tokio::test]
    async fn test_user_side_failure_undoes_class_side() {
        let classes = Arc::new(MemoryClassDirectory::new());
        let class = classes
            .create(flex_models::NewClass {
                fields: crate::classes::testing::fields(),
                posted_by: 1,
                studio: None,
                date_posted: chrono::Utc::now(),
            })
            .await
            .unwrap();

        let mut users = MockUserDirectory::new();
        users
            .expect_add_to_applied_set()
            .with(eq(7), eq(class.id))
            .times(1)
            .returning(|_, _| Err(RepositoryError::Database(sqlx::Error::PoolTimedOut)));

        let coordinator = ApplicationCoordinator::new(Arc::new(users), classes.clone());
        let err = coordinator.apply(7, class.id).await.unwrap_err();

        assert!(err.is_server_error());
        let stored = classes.find_by_id(class.id).await.unwrap().unwrap();
        assert!(stored.user_applied.is_empty());
    }

    #[tokio::test]
    async fn test_withdraw_is_idempotent() {
        let fx = Fixture::new();
        let studio = fx.user("studio@user.com", UserRole::Studio).await;
        let instructor = fx.user("instructor@user.com", UserRole::Instructor).await;
        let class = fx.class(studio.id, 0).await;

        fx.coordinator.apply(instructor.id, class.id).await.unwrap();

        let first = fx.coordinator.withdraw(instructor.id, class.id).await.unwrap();
        let second = fx.coordinator.withdraw(instructor.id, class.id).await.unwrap();

        assert!(first.user_applied.is_empty());
        assert!(second.user_applied.is_empty());
        assert!(fx.stored_user(instructor.id).await.class_applied.is_empty());
    }

    #[tokio::test]
    async fn test_apply_then_withdraw_restores_prior_state() {
        let fx = Fixture::new();
        let studio = fx.user("studio@user.com", UserRole::Studio).await;
        let a = fx.user("a@user.com", UserRole::Instructor).await;
        let b = fx.user("b@user.com", UserRole::Instructor).await;
        let class = fx.class(studio.id, 0).await;
        let other = fx.class(studio.id, 1).await;

        fx.coordinator.apply(a.id, class.id).await.unwrap();
        fx.coordinator.apply(b.id, other.id).await.unwrap();
        let class_before = fx.stored_class(class.id).await.unwrap();
        let b_before = fx.stored_user(b.id).await;

        fx.coordinator.apply(b.id, class.id).await.unwrap();
        fx.coordinator.withdraw(b.id, class.id).await.unwrap();

        assert_eq!(fx.stored_class(class.id).await.unwrap(), class_before);
        assert_eq!(fx.stored_user(b.id).await, b_before);
    }

    #[tokio::test]
    async fn test_withdraw_from_missing_class() {
        let fx = Fixture::new();
        let instructor = fx.user("instructor@user.com", UserRole::Instructor).await;

        let err = fx.coordinator.withdraw(instructor.id, 404).await.unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn test_concurrent_applies_link_once() {
        let fx = Fixture::new();
        let studio = fx.user("studio@user.com", UserRole::Studio).await;
        let instructor = fx.user("instructor@user.com", UserRole::Instructor).await;
        let class = fx.class(studio.id, 0).await;

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let coordinator = fx.coordinator.clone();
                let (user_id, class_id) = (instructor.id, class.id);
                tokio::spawn(async move { coordinator.apply(user_id, class_id).await })
            })
            .collect();

        let mut successes = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(e) => assert!(matches!(e, FlexError::AlreadyApplied { .. })),
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(fx.stored_class(class.id).await.unwrap().user_applied, vec![instructor.id]);
        assert_eq!(fx.stored_user(instructor.id).await.class_applied, vec![class.id]);
    }
}
