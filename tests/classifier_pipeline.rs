//! Pipeline-level tests.
//!
//! The preprocessing properties run everywhere. The end-to-end checks need a
//! real model artifact and are skipped unless `TAGLENS_TEST_MODEL` and
//! `TAGLENS_TEST_LABELS` point at a MobileNetV2 ONNX export and its label
//! table; `TAGLENS_TEST_IMAGE` optionally points at a golden retriever
//! photo for the reference scenario.

use image::{Rgb, RgbImage};
use std::sync::Arc;
use taglens::prelude::*;
use taglens::predictor::ImageClassifierBuilder;
use taglens::processors::{NormalizeImage, ResizeToFixed};

#[test]
fn preprocess_yields_fixed_shape_in_unit_range() {
    let resize = ResizeToFixed::new(224, 224).unwrap();
    let normalize = NormalizeImage::for_mobilenet().unwrap();

    for (w, h) in [(1, 1), (17, 311), (224, 224), (1280, 720)] {
        let img = RgbImage::from_fn(w, h, |x, y| {
            Rgb([(x * 7 % 256) as u8, (y * 13 % 256) as u8, ((x + y) % 256) as u8])
        });

        let tensor = normalize.normalize_to(&resize.apply(&img)).unwrap();

        assert_eq!(tensor.shape(), &[1, 224, 224, 3], "input {w}x{h}");
        assert!(
            tensor.iter().all(|&v| (-1.0..=1.0).contains(&v)),
            "values out of range for input {w}x{h}"
        );
    }
}

fn reference_config() -> Option<ImageClassifierConfig> {
    let model = std::env::var("TAGLENS_TEST_MODEL").ok()?;
    let labels = std::env::var("TAGLENS_TEST_LABELS").ok()?;

    let mut config = ImageClassifierConfig::new();
    config.common = config.common.model_path(model).labels_path(labels);
    Some(config)
}

fn reference_classifier() -> Option<ImageClassifier> {
    let model = std::env::var("TAGLENS_TEST_MODEL").ok()?;
    let labels = std::env::var("TAGLENS_TEST_LABELS").ok()?;

    Some(
        ImageClassifierBuilder::new()
            .model_path(model)
            .labels_path(labels)
            .topk(3)
            .build()
            .expect("reference model should load"),
    )
}

#[test]
fn end_to_end_against_reference_model() {
    let Some(classifier) = reference_classifier() else {
        eprintln!("skipping: TAGLENS_TEST_MODEL / TAGLENS_TEST_LABELS not set");
        return;
    };

    let img = RgbImage::from_fn(300, 200, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x * y) % 256) as u8])
    });

    // At most 3 predictions, sorted by non-increasing confidence, in [0, 1].
    let result = classifier.classify_image(img.clone()).unwrap();
    assert!(result.len() <= 3);
    for pair in result.scores.windows(2) {
        assert!(pair[0] >= pair[1]);
    }
    assert!(result.scores.iter().all(|&s| (0.0..=1.0).contains(&s)));

    // Repeated calls on the same input are deterministic.
    let again = classifier.classify_image(img).unwrap();
    assert_eq!(result.class_ids, again.class_ids);
    for (a, b) in result.scores.iter().zip(&again.scores) {
        assert!((a - b).abs() < 1e-5);
    }

    // Malformed bytes fail with a typed error, not a crash.
    assert!(classifier.classify_bytes(b"not an image at all").is_err());
}

#[test]
fn provider_returns_the_same_instance() {
    let Some(config) = reference_config().map(|mut config| {
        config.topk = Some(3);
        config
    }) else {
        eprintln!("skipping: TAGLENS_TEST_MODEL / TAGLENS_TEST_LABELS not set");
        return;
    };

    let provider = ModelProvider::new(config);
    let first = provider.get().unwrap();
    let second = provider.get().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn golden_retriever_reference_scenario() {
    let Some(classifier) = reference_classifier() else {
        eprintln!("skipping: TAGLENS_TEST_MODEL / TAGLENS_TEST_LABELS not set");
        return;
    };
    let Ok(image_path) = std::env::var("TAGLENS_TEST_IMAGE") else {
        eprintln!("skipping: TAGLENS_TEST_IMAGE not set");
        return;
    };

    let bytes = std::fs::read(image_path).unwrap();
    let result = classifier.classify_bytes(&bytes).unwrap();

    let top = result.predictions().next().expect("top prediction");
    assert!(
        top.label.to_lowercase().contains("retriever"),
        "top label was {}",
        top.label
    );
    assert!(top.confidence > 0.5);
}
