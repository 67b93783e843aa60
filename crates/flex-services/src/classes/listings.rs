//! Listing management and listing queries

use std::collections::HashMap;

use chrono::Utc;
use flex_auth::CurrentUser;
use flex_contracts::ListingContract;
use flex_core::error::{FlexError, FlexResult};
use flex_core::traits::Id;
use flex_db::ClassQuery;
use flex_models::{Applicant, Class, NewClass, OwnedClass};
use serde_json::Value;
use tracing::{info, warn};

use super::{ApplicationCoordinator, ListingFilters};

impl ApplicationCoordinator {
    /// Post a new listing owned by `owner`, who must be a studio
    pub async fn create_listing(&self, owner: &CurrentUser, body: &Value) -> FlexResult<Class> {
        owner.require_studio()?;
        let fields = ListingContract::new().parse(body)?;

        let owner_record = self
            .users
            .find_by_id(owner.id)
            .await?
            .ok_or_else(|| FlexError::not_found("User", owner.id))?;

        let class = self
            .classes
            .create(NewClass {
                fields,
                posted_by: owner.id,
                studio: owner_record.studio,
                date_posted: Utc::now(),
            })
            .await?;

        info!(class_id = class.id, owner_id = owner.id, "Class posted");
        Ok(class)
    }

    /// Overwrite all seven listing fields. A class the caller does not own is
    /// reported as not found.
    pub async fn edit_listing(&self, owner_id: Id, class_id: Id, body: &Value) -> FlexResult<Class> {
        let fields = ListingContract::new().parse(body)?;

        let matched = self.classes.update_fields(class_id, owner_id, &fields).await?;
        if matched == 0 {
            return Err(FlexError::not_found("Class", class_id));
        }

        info!(class_id, owner_id, "Class edited");
        self.current(class_id).await
    }

    /// Delete an owned class and purge it from every user's applied set
    pub async fn delete_listing(&self, owner_id: Id, class_id: Id) -> FlexResult<()> {
        let matched = self.classes.delete_one(class_id, owner_id).await?;
        if matched == 0 {
            return Err(FlexError::not_found("Class", class_id));
        }

        let purged = self
            .users
            .remove_reference_from_all(class_id)
            .await
            .inspect_err(|e| {
                warn!(class_id, error = %e, "Class deleted but references remain, left for repair")
            })?;

        info!(class_id, owner_id, purged, "Class deleted");
        Ok(())
    }

    /// Classes the user has not applied to, newest first
    pub async fn list_available(&self, user_id: Id, filters: ListingFilters) -> FlexResult<Vec<Class>> {
        let query = ClassQuery::available_to(user_id, filters.class_type, filters.days);
        Ok(self.classes.query(&query).await?)
    }

    /// Classes the user has applied to, newest first
    pub async fn list_applied(&self, user_id: Id) -> FlexResult<Vec<Class>> {
        Ok(self.classes.query(&ClassQuery::applied_by(user_id)).await?)
    }

    /// Classes posted by the owner, newest first, with applicants resolved.
    ///
    /// An applicant without a user record is skipped; `reconcile` removes it.
    pub async fn list_by_owner(&self, owner_id: Id) -> FlexResult<Vec<OwnedClass>> {
        let classes = self.classes.query(&ClassQuery::posted_by(owner_id)).await?;

        let mut known: HashMap<Id, Applicant> = HashMap::new();
        let mut owned = Vec::with_capacity(classes.len());
        for class in classes {
            let mut applicants = Vec::with_capacity(class.user_applied.len());
            for &user_id in &class.user_applied {
                if let Some(applicant) = known.get(&user_id) {
                    applicants.push(applicant.clone());
                    continue;
                }
                match self.users.find_by_id(user_id).await? {
                    Some(user) => {
                        let applicant = user.applicant();
                        known.insert(user_id, applicant.clone());
                        applicants.push(applicant);
                    }
                    None => warn!(class_id = class.id, user_id, "Applicant has no user record"),
                }
            }
            owned.push(OwnedClass { class, applicants });
        }

        Ok(owned)
    }
}
