//! End-to-end tests: batch -> options -> translator -> batch

use std::sync::Arc;
use std::thread;

use crate::{
    BatchData, BatchType, Error, MockEngine, MockLoader, MockMode, TranslationOptions, Translator,
};

fn tokens(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

#[test]
fn test_hello_world_reversed() {
    let translator = Translator::with_engine(MockEngine::new(MockMode::Reverse));

    let mut data = BatchData::new();
    data.append(tokens(&["Hello", "world"]));

    let options = TranslationOptions::builder().build();
    let result = translator
        .translate_batch(&data, &options, 0, BatchType::Examples)
        .unwrap();

    assert_eq!(result.len(), 1);
    assert_eq!(result.get(0).unwrap(), tokens(&["world", "Hello"]));
}

#[test]
fn test_empty_batch_round_trip() {
    let translator = Translator::with_engine(MockEngine::new(MockMode::Reverse));
    let result = translator
        .translate_batch(
            &BatchData::new(),
            &TranslationOptions::default(),
            0,
            BatchType::Examples,
        )
        .unwrap();
    assert_eq!(result.len(), 0);
    assert!(matches!(result.get(0), Err(Error::OutOfRange { index: 0, length: 0 })));
}

#[test]
fn test_order_is_preserved_for_many_sentences() {
    let engine = MockEngine::new(MockMode::Suffix("<t>".to_string()));
    let translator = Translator::with_engine(engine);

    let k = 250;
    let data: BatchData = (0..k).map(|i| tokens(&["s", i.to_string().as_str()])).collect();

    for batch_type in [BatchType::Examples, BatchType::Tokens] {
        let result = translator
            .translate_batch(&data, &TranslationOptions::default(), 16, batch_type)
            .unwrap();

        assert_eq!(result.len(), k);
        for i in 0..k {
            assert_eq!(
                result.get(i).unwrap(),
                tokens(&["s", i.to_string().as_str(), "<t>"])
            );
        }
    }
}

#[test]
fn test_target_markers_follow_their_sentence() {
    let translator = Translator::with_engine(MockEngine::new(MockMode::Reverse));

    let data = BatchData::from(vec![
        tokens(&["good", "morning"]),
        tokens(&["thank", "you"]),
        tokens(&["bye"]),
    ]);
    let target = tokens(&["__ja__", "__fr__", "__de__"]);

    let result = translator
        .translate_batch_target(
            &data,
            &target,
            &TranslationOptions::default(),
            0,
            BatchType::Examples,
        )
        .unwrap();

    assert_eq!(result.len(), 3);
    for (i, marker) in target.iter().enumerate() {
        let sentence = result.get(i).unwrap();
        assert_eq!(&sentence[0], marker);
    }
    assert_eq!(result.get(0).unwrap(), tokens(&["__ja__", "morning", "good"]));
    assert_eq!(result.get(2).unwrap(), tokens(&["__de__", "bye"]));
}

#[test]
fn test_failed_call_returns_no_batch() {
    let translator =
        Translator::with_engine(MockEngine::new(MockMode::Error("bad input".to_string())));
    let data = BatchData::from(vec![tokens(&["a"]), tokens(&["b"])]);

    let result = translator.translate_batch(
        &data,
        &TranslationOptions::default(),
        0,
        BatchType::Examples,
    );
    assert!(matches!(result, Err(Error::Engine(_))));

    let result = translator.translate_batch_target(
        &data,
        &tokens(&["x", "y"]),
        &TranslationOptions::default(),
        0,
        BatchType::Examples,
    );
    assert!(matches!(result, Err(Error::Engine(_))));
}

#[test]
fn test_invalid_model_path_leaves_no_handle() {
    let loader = MockLoader::new(MockMode::Reverse);
    let result = Translator::from_loader(&loader, "/definitely/not/a/model", true, true);
    assert!(matches!(result, Err(Error::ModelLoad { .. })));
}

#[test]
fn test_options_file_drives_translation() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/options.json");
    let options = TranslationOptions::from_json_file(&path).unwrap();
    assert_eq!(options.beam_size(), 4);
    assert_eq!(options.max_decoding_length(), 200);
    assert_eq!(options.patience(), 1.0);

    let engine = Arc::new(MockEngine::new(MockMode::Echo));
    let translator = Translator::with_engine(engine.clone());
    let data = BatchData::from(vec![tokens(&["a"])]);
    translator
        .translate_batch(&data, &options, 0, BatchType::Examples)
        .unwrap();
    assert_eq!(engine.last_call().unwrap().options, options);
}

#[test]
fn test_shared_translator_across_threads() {
    let engine = Arc::new(MockEngine::new(MockMode::Reverse));
    let translator = Arc::new(Translator::with_engine(engine.clone()));
    let options = TranslationOptions::default();

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let translator = Arc::clone(&translator);
            thread::spawn(move || {
                let data: BatchData = (0..10)
                    .map(|i| tokens(&[t.to_string().as_str(), i.to_string().as_str()]))
                    .collect();
                let result = translator
                    .translate_batch(&data, &options, 0, BatchType::Examples)
                    .unwrap();
                for i in 0..10 {
                    assert_eq!(
                        result.get(i).unwrap(),
                        tokens(&[i.to_string().as_str(), t.to_string().as_str()])
                    );
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(engine.calls(), 4);
}
