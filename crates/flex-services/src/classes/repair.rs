//! Repair pass for the user/class link invariant
//!
//! `Class.userApplied` is the source of truth. A class applicant whose user
//! record lacks the class gets the link restored; an applicant whose user no
//! longer exists is dropped. A `classApplied` entry whose class is gone or does
//! not list the user is dropped. Running the pass twice changes nothing the
//! second time.

use std::collections::HashMap;

use flex_core::error::FlexResult;
use flex_core::traits::Id;
use flex_db::{ClassQuery, SetAdd};
use serde::Serialize;
use tracing::{info, warn};

use super::ApplicationCoordinator;

/// What a repair pass changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepairReport {
    /// User-side links added to match a class applicant set
    pub links_restored: u64,
    /// Class applicants removed because the user does not exist
    pub applicants_removed: u64,
    /// User-side entries removed because the class does not list the user
    pub references_removed: u64,
}

impl RepairReport {
    pub fn is_clean(&self) -> bool {
        *self == Self::default()
    }
}

impl ApplicationCoordinator {
    /// Scan both directories and restore the bidirectional link invariant
    pub async fn reconcile(&self) -> FlexResult<RepairReport> {
        let mut report = RepairReport::default();

        let classes = self.classes.query(&ClassQuery::all()).await?;
        for class in &classes {
            for &user_id in &class.user_applied {
                match self.users.add_to_applied_set(user_id, class.id).await? {
                    SetAdd::AlreadyPresent => {}
                    SetAdd::Added => {
                        warn!(user_id, class_id = class.id, "repair: restored user-side link");
                        report.links_restored += 1;
                    }
                    SetAdd::Missing => {
                        warn!(user_id, class_id = class.id, "repair: dropped applicant without account");
                        self.classes.remove_from_applicant_set(class.id, user_id).await?;
                        report.applicants_removed += 1;
                    }
                }
            }
        }

        let snapshot: HashMap<Id, &[Id]> = classes
            .iter()
            .map(|c| (c.id, c.user_applied.as_slice()))
            .collect();

        for user in self.users.find_with_applications().await? {
            for &class_id in &user.class_applied {
                if snapshot.get(&class_id).is_some_and(|a| a.contains(&user.id)) {
                    continue;
                }
                // The snapshot may predate an apply that is in flight
                let live = self.classes.find_by_id(class_id).await?;
                if live.is_some_and(|c| c.has_applicant(user.id)) {
                    continue;
                }
                warn!(user_id = user.id, class_id, "repair: dropped dangling user-side link");
                self.users.remove_from_applied_set(user.id, class_id).await?;
                report.references_removed += 1;
            }
        }

        info!(
            links_restored = report.links_restored,
            applicants_removed = report.applicants_removed,
            references_removed = report.references_removed,
            "Repair pass finished"
        );
        Ok(report)
    }
}
