use std::sync::Arc;

use sqlx::PgPool;

use crate::dialogue::DialogueService;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub dialogue: Arc<DialogueService>,
}
