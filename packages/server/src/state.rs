use sea_orm::DatabaseConnection;

use crate::audit::Auditor;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub auditor: Auditor,
}
