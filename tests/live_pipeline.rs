use jump_tempo::catalog::{AssetKey, DirectoryCatalog};
use jump_tempo::metadata::MetadataResolver;
use jump_tempo::model::{RawSample, Selection};
use jump_tempo::motion::WindowMode;
use jump_tempo::service::{Reply, Request, ResponseStatus, SelectionResponse};
use jump_tempo::{LiveService, RequestHandler, ServiceConfig};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// Catalog with tracks at 104 and 130 bpm and an empty 120 folder
fn create_catalog(root: &Path) {
    fs::create_dir_all(root.join("104")).unwrap();
    fs::create_dir_all(root.join("120")).unwrap();
    fs::create_dir_all(root.join("130")).unwrap();
    fs::write(root.join("104/Warm Up.mp3"), b"dummy audio data 1").unwrap();
    fs::write(root.join("130/sprint.mp3"), b"dummy audio data 2").unwrap();
    fs::write(root.join("130/finish.mp3"), b"dummy audio data 3").unwrap();
}

fn handler(root: &Path, config: ServiceConfig) -> RequestHandler<DirectoryCatalog> {
    let catalog = DirectoryCatalog::new(root.to_path_buf());
    let metadata = MetadataResolver::new(root.to_path_buf(), config.cover_dir());
    let service = LiveService::new(config, catalog).expect("valid config");
    RequestHandler::new(service, metadata)
}

/// Alternating z values giving `jumps` crossings of threshold 0
fn jump_batch(jumps: usize) -> Vec<RawSample> {
    let mut batch = vec![RawSample::new(0.0, 0.0, -1.0)];
    for _ in 0..jumps {
        batch.push(RawSample::new(0.1, 0.2, 1.0));
        batch.push(RawSample::new(0.1, 0.2, -1.0));
    }
    batch
}

fn selection(reply: Reply) -> SelectionResponse {
    match reply {
        Reply::Selection(body) => body,
        Reply::Failure(status) => panic!("request failed with {:?}", status),
    }
}

#[test]
fn test_twelve_second_batch_with_three_jumps() {
    let temp = TempDir::new().unwrap();
    create_catalog(temp.path());

    let config = ServiceConfig::new(temp.path().to_path_buf())
        .with_packet_span(12.0)
        .with_seed(11);
    let handler = handler(temp.path(), config);

    let outcome = handler.service().ingest(&jump_batch(3)).unwrap();
    assert_eq!(outcome.rate.count, 3);
    assert_eq!(outcome.rate.rate_per_minute, 15.0);

    // 15/min is nearest to 104, which has one track
    assert_eq!(outcome.bucket, Some(104));
    let track = outcome.selection.track().expect("track at 104");
    assert_eq!(track.id, "104/Warm Up.mp3");

    let body = selection(handler.handle(Request::Query));
    assert_eq!(body.jumps_per_minute, 15.0);
    assert_eq!(body.song_path.as_deref(), Some("104/Warm%20Up.mp3"));
    assert_eq!(body.song_name.as_deref(), Some("Warm Up"));

    // The reported path resolves back under the catalog root
    let resolved = AssetKey::parse(body.song_path.as_deref().unwrap())
        .unwrap()
        .resolve(temp.path());
    assert_eq!(resolved, temp.path().join("104/Warm Up.mp3"));
}

#[test]
fn test_empty_batch_reports_zero_and_no_match() {
    let temp = TempDir::new().unwrap();
    create_catalog(temp.path());

    let handler = handler(temp.path(), ServiceConfig::new(temp.path().to_path_buf()).with_seed(11));

    let reply = handler.handle_text("[]");
    assert_eq!(reply.status(), ResponseStatus::Ok);
    assert_eq!(reply.to_json(), r#"{"jumps_per_minute":0.0}"#);

    let outcome = handler.service().ingest(&[]).unwrap();
    assert_eq!(outcome.selection, Selection::NoMatch);
    assert_eq!(outcome.rate.rate_per_minute, 0.0);
}

#[test]
fn test_exact_bucket_rate_selects_from_that_bucket() {
    let temp = TempDir::new().unwrap();
    create_catalog(temp.path());

    // 13 jumps over a fixed 6s span = 130/min
    let config = ServiceConfig::new(temp.path().to_path_buf())
        .with_packet_span(6.0)
        .with_seed(5);
    let handler = handler(temp.path(), config);

    for _ in 0..10 {
        let outcome = handler.service().ingest(&jump_batch(13)).unwrap();
        assert_eq!(outcome.rate.rate_per_minute, 130.0);
        assert_eq!(outcome.bucket, Some(130));

        let track = outcome.selection.into_track().expect("track at 130");
        assert_eq!(track.bucket, 130);
        assert!(track.id == "130/sprint.mp3" || track.id == "130/finish.mp3");
    }
}

#[test]
fn test_empty_bucket_folder_is_no_match() {
    let temp = TempDir::new().unwrap();
    create_catalog(temp.path());

    // 2 jumps in a 1s packet = 120/min, whose folder is empty
    let config = ServiceConfig::new(temp.path().to_path_buf()).with_packet_span(1.0);
    let handler = handler(temp.path(), config);

    let body = selection(handler.handle_text(
        r#"{"ingest": [{"x":0,"y":0,"z":-1},{"x":0,"y":0,"z":1},{"x":0,"y":0,"z":-1},{"x":0,"y":0,"z":1}]}"#,
    ));
    assert_eq!(body.jumps_per_minute, 120.0);
    assert!(body.song_path.is_none());
}

#[test]
fn test_malformed_request_gets_generic_error() {
    let temp = TempDir::new().unwrap();
    create_catalog(temp.path());

    let config = ServiceConfig::new(temp.path().to_path_buf())
        .with_packet_span(12.0)
        .with_seed(1);
    let handler = handler(temp.path(), config);
    handler.service().ingest(&jump_batch(3)).unwrap();
    let before = handler.service().query();

    for text in [r#"[{"x": 1, "y": 2}]"#, "not json", r#"[{"z": "up"}]"#] {
        let reply = handler.handle_text(text);
        assert_eq!(reply.status(), ResponseStatus::BadRequest);
        assert_eq!(reply.to_json(), r#"{"error":"Error processing data"}"#);
    }

    assert_eq!(handler.service().query(), before);
}

#[test]
fn test_debounced_operating_point() {
    let temp = TempDir::new().unwrap();

    // threshold 1.2, min interval 10: crossings at 1, 3 and 12 count as 1 and 12
    let mut batch = vec![RawSample::new(0.0, 0.0, 0.0); 20];
    for i in [1, 3, 12] {
        batch[i].z = Some(1.5);
    }

    let config = ServiceConfig::new(temp.path().to_path_buf())
        .with_jump_detection(1.2, 10)
        .with_packet_span(1.0)
        .with_seed(2);
    let service = LiveService::new(config, DirectoryCatalog::new(temp.path().to_path_buf())).unwrap();

    let outcome = service.ingest(&batch).unwrap();
    assert_eq!(outcome.rate.count, 2);
    assert_eq!(outcome.rate.rate_per_minute, 120.0);
}

#[test]
fn test_concurrent_batches_keep_state_consistent() {
    let temp = TempDir::new().unwrap();
    create_catalog(temp.path());

    let config = ServiceConfig::new(temp.path().to_path_buf())
        .with_window_mode(WindowMode::Stateful)
        .with_window_duration(3600.0)
        .with_packet_span(6.0)
        .with_seed(9);
    let handler = Arc::new(handler(temp.path(), config));

    let writers: Vec<_> = (0..4)
        .map(|_| {
            let handler = Arc::clone(&handler);
            std::thread::spawn(move || {
                for _ in 0..25 {
                    handler.service().ingest(&jump_batch(1)).unwrap();
                }
            })
        })
        .collect();

    let reader = {
        let handler = Arc::clone(&handler);
        std::thread::spawn(move || {
            for _ in 0..100 {
                let state = handler.service().query();
                // Track and bucket are always published together
                if let Some(track) = state.last_track {
                    assert_eq!(Some(track.bucket), state.last_bucket);
                }
            }
        })
    };

    for writer in writers {
        writer.join().unwrap();
    }
    reader.join().unwrap();

    // Every sample of every batch made it into the window
    assert_eq!(handler.service().window_len(), 4 * 25 * 3);
}

#[test]
fn test_each_ingest_reply_reports_its_own_batch() {
    let temp = TempDir::new().unwrap();
    create_catalog(temp.path());

    // Stateless window over a fixed 5s span: 10 jumps = 120/min, a flat batch = 0
    let config = ServiceConfig::new(temp.path().to_path_buf())
        .with_packet_span(5.0)
        .with_seed(21);
    let handler = Arc::new(handler(temp.path(), config));

    let clients: Vec<_> = (0..4)
        .map(|n| {
            let handler = Arc::clone(&handler);
            std::thread::spawn(move || {
                let (batch, expected) = if n % 2 == 0 {
                    (jump_batch(0), 0.0)
                } else {
                    (jump_batch(10), 120.0)
                };
                for _ in 0..2000 {
                    let body = selection(handler.handle(Request::Ingest(batch.clone())));
                    assert_eq!(body.jumps_per_minute, expected);
                    if expected == 0.0 {
                        assert_eq!(body.song_path.as_deref(), Some("104/Warm%20Up.mp3"));
                    } else {
                        assert!(body.song_path.is_none());
                    }
                }
            })
        })
        .collect();

    for client in clients {
        client.join().unwrap();
    }
}
