mod common;

use common::TestError;
use mule::{retry, RetryConfig, TrackingSleeper};
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::fmt::MakeWriter;

#[derive(Clone)]
struct SharedWriter(Arc<Mutex<Vec<u8>>>);

impl<'a> MakeWriter<'a> for SharedWriter {
    type Writer = SharedGuard;
    fn make_writer(&'a self) -> Self::Writer {
        SharedGuard(self.0.clone())
    }
}

struct SharedGuard(Arc<Mutex<Vec<u8>>>);

impl std::io::Write for SharedGuard {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }
    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn exhaustion_is_logged_as_a_warning() {
    let buffer = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::fmt()
        .with_writer(BoxMakeWriter::new(SharedWriter(buffer.clone())))
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .without_time()
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let config = RetryConfig::<(), TestError>::builder()
        .max_attempts(2)
        .with_blocking_sleeper(TrackingSleeper::new())
        .build()
        .unwrap();
    let _ = retry(config, || Err(TestError::Fatal(0)));

    let logs = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
    assert!(logs.contains("attempt starting"), "attempt starts are logged at debug: {}", logs);
    assert!(logs.contains("attempt failed"), "{}", logs);
    assert!(logs.contains("error=\"captured\""), "failures carry the error field: {}", logs);
    assert!(logs.contains("WARN"), "exhaustion should warn: {}", logs);
    assert!(logs.contains("retries exhausted"), "{}", logs);
}
