//! Domain services (business logic)

pub mod menu_structure_service;
pub mod item_service;
pub mod menu_service;

pub use menu_structure_service::{MenuStructureService, ReconcileOutcome};
pub use item_service::ItemService;
pub use menu_service::MenuService;

use tracing::error;

use crate::error::DomainError;
use crate::repositories::MenuTransaction;

/// Commit on success, roll back on failure. The operation error wins over a
/// failed rollback, which is only logged.
pub(crate) async fn finish<T>(
    tx: Box<dyn MenuTransaction>,
    result: Result<T, DomainError>,
) -> Result<T, DomainError> {
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(e) => {
            let menu_id = tx.menu_id();
            if let Err(rollback_err) = tx.rollback().await {
                error!("Rollback failed for menu {}: {}", menu_id, rollback_err);
            }
            Err(e)
        }
    }
}
