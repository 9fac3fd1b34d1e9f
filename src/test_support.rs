use std::io;
use std::sync::{Arc, Mutex};

use actix_web::web::Data;
use tracing::subscriber::DefaultGuard;

use crate::auth::jwt::TokenIssuer;
use crate::storage::{Storage, memory::MemoryStorage};

pub const TEST_SECRET: &str = "test-secret";

pub fn memory_storage() -> Data<dyn Storage> {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    Data::from(storage)
}

pub fn token_issuer() -> Data<TokenIssuer> {
    Data::new(TokenIssuer::new(TEST_SECRET, 3600))
}

/// Full route table over a fresh in-memory store.
macro_rules! init_app {
    () => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($crate::test_support::memory_storage())
                .app_data($crate::test_support::token_issuer())
                .configure($crate::routes::configure),
        )
    };
}
pub(crate) use init_app;

/// Formatted log output written while a `capture_logs` guard is held.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn contents(&self) -> String {
        let bytes = self.0.lock().unwrap();
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Routes this thread's tracing events into a buffer until the guard drops.
pub fn capture_logs() -> (CapturedLogs, DefaultGuard) {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .finish();

    (logs, tracing::subscriber::set_default(subscriber))
}
