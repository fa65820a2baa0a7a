//! Concurrent access tests for the HTML capture renderer.

use htmlsnap::engine::mock::MockEngineFactory;
use htmlsnap::prelude::*;
use std::thread;

/// Route `log` output through env_logger so failures can be diagnosed with
/// `RUST_LOG=debug cargo test`.
fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn shared_renderer(factory: MockEngineFactory) -> SharedRenderer {
    init_logging();
    let renderer = HtmlRenderer::builder()
        .factory(Box::new(factory))
        .enable_warmup(false)
        .build()
        .unwrap()
        .into_shared();
    renderer.initialize().unwrap();
    renderer
}

/// Test that concurrent initialize calls start exactly one engine.
#[test]
fn test_concurrent_initialize_single_engine() {
    init_logging();
    let factory = MockEngineFactory::new();
    let counters = factory.counters();
    let renderer = HtmlRenderer::builder()
        .factory(Box::new(factory))
        .build()
        .unwrap()
        .into_shared();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let renderer = Arc::clone(&renderer);
        handles.push(thread::spawn(move || renderer.initialize()));
    }
    for handle in handles {
        assert!(handle.join().unwrap().is_ok(), "initialize should succeed");
    }

    use std::sync::atomic::Ordering;
    assert_eq!(counters.engines_created.load(Ordering::SeqCst), 1);
    // Exactly one warm-up ran despite eight initializers.
    assert_eq!(renderer.stats().completed, 1);
}

/// Test that concurrent captures never interleave: every caller gets the
/// complete, correct result for its own document.
#[test]
fn test_concurrent_captures_are_isolated() {
    let renderer = shared_renderer(MockEngineFactory::new());

    // Reference pass: capture each document alone and record the output.
    let sources: Vec<String> = (0..8).map(|i| format!("<h1>document {}</h1>", i)).collect();
    let mut expected = Vec::new();
    for source in &sources {
        let request = CaptureRequest::plain_text(source.clone(), 288.0).with_height(144.0);
        expected.push(renderer.capture(&request).unwrap());
    }

    // Concurrent pass: all documents in flight at once, several times each.
    let mut handles = Vec::new();
    for (source, reference) in sources.iter().cloned().zip(expected) {
        let renderer = Arc::clone(&renderer);
        handles.push(thread::spawn(move || {
            let request = CaptureRequest::plain_text(source, 288.0).with_height(144.0);
            for _ in 0..5 {
                let image = renderer.capture(&request).unwrap();
                assert_eq!(
                    image, reference,
                    "A concurrent capture must match its solo result"
                );
            }
        }));
    }
    for handle in handles {
        handle.join().expect("capture thread should not panic");
    }

    // 8 reference + 40 concurrent captures, all complete.
    assert_eq!(renderer.stats().completed, 48);
    assert_eq!(renderer.stats().failed, 0);
}

/// Test that two distinct documents do not bleed into each other's pixels.
#[test]
fn test_distinct_documents_distinct_pixels() {
    let renderer = shared_renderer(MockEngineFactory::new());

    let a = renderer
        .capture(&CaptureRequest::plain_text("<p>alpha</p>", 144.0).with_height(72.0))
        .unwrap();
    let b = renderer
        .capture(&CaptureRequest::plain_text("<p>bravo</p>", 144.0).with_height(72.0))
        .unwrap();

    assert_eq!((a.width(), a.height()), (b.width(), b.height()));
    assert_ne!(a.get_pixel(0, 0), b.get_pixel(0, 0));
}

/// Test mixed success and failure under concurrency: slow loads from some
/// threads must not corrupt results for the others.
#[test]
fn test_concurrent_captures_with_slow_loads() {
    // Extra idle pulses stretch each load out across more worker turns.
    let renderer = shared_renderer(MockEngineFactory::new().load_pulses(10));

    let mut handles = Vec::new();
    for i in 0..6 {
        let renderer = Arc::clone(&renderer);
        handles.push(thread::spawn(move || {
            let request =
                CaptureRequest::plain_text(format!("<p>slow {}</p>", i), 144.0).with_height(72.0);
            renderer.capture(&request).unwrap()
        }));
    }

    let mut images = Vec::new();
    for handle in handles {
        images.push(handle.join().expect("capture thread should not panic"));
    }

    for image in &images {
        assert_eq!(image.width(), 192);
        assert_eq!(image.height(), 96);
    }
    assert_eq!(renderer.stats().completed, 6);
}

/// Test concurrent stats access while captures are in flight.
#[test]
fn test_concurrent_stats_access() {
    let renderer = shared_renderer(MockEngineFactory::new());

    let mut handles = Vec::new();
    for _ in 0..4 {
        let renderer = Arc::clone(&renderer);
        handles.push(thread::spawn(move || {
            for _ in 0..100 {
                let stats = renderer.stats();
                assert!(stats.failed == 0);
            }
        }));
    }
    {
        let renderer = Arc::clone(&renderer);
        handles.push(thread::spawn(move || {
            for i in 0..10 {
                let request = CaptureRequest::plain_text(format!("<p>{}</p>", i), 144.0);
                renderer.capture(&request).unwrap();
            }
        }));
    }

    for handle in handles {
        handle.join().expect("Task should complete without panic");
    }
    assert_eq!(renderer.stats().completed, 10);
}

/// Test that shutdown from one thread while another holds the renderer
/// leaves the other thread with clean ShuttingDown errors, not hangs.
#[test]
fn test_shutdown_races_with_captures() {
    let renderer = shared_renderer(MockEngineFactory::new());

    let worker = {
        let renderer = Arc::clone(&renderer);
        thread::spawn(move || {
            let request = CaptureRequest::plain_text("<p>racer</p>", 144.0);
            let mut outcomes = Vec::new();
            for _ in 0..50 {
                outcomes.push(renderer.capture(&request));
            }
            outcomes
        })
    };

    renderer.shutdown();

    for outcome in worker.join().expect("capture thread should not panic") {
        match outcome {
            Ok(_) => {}
            Err(CaptureError::ShuttingDown) => {}
            Err(other) => panic!("Unexpected error during shutdown race: {}", other),
        }
    }
}
