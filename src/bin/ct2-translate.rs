use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

use clap::{Arg, ArgAction, Command, value_parser};
use rusty_ctranslate2::{
    BatchData, BatchType, EngineLoader, MockLoader, MockMode, TranslationOptions, Translator,
};
use tracing::info;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = Command::new("ct2-translate")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Translate whitespace-tokenized sentences with a CTranslate2 model")
        .arg(
            Arg::new("model")
                .help("Path to the converted model directory")
                .required(true)
                .value_parser(value_parser!(PathBuf))
                .index(1),
        )
        .arg(
            Arg::new("input")
                .help("File with one tokenized sentence per line (default: stdin)")
                .value_parser(value_parser!(PathBuf))
                .index(2),
        )
        .arg(
            Arg::new("gpu")
                .long("gpu")
                .help("Place the model on GPU 0")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("fast")
                .long("fast")
                .help("Use reduced precision (float16 on GPU, int8 on CPU)")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("options")
                .long("options")
                .short('o')
                .help("JSON file with decoding options")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("max-batch-size")
                .long("max-batch-size")
                .short('b')
                .help("Maximum sub-batch size (0 lets the engine decide)")
                .value_parser(value_parser!(usize))
                .default_value("0"),
        )
        .arg(
            Arg::new("batch-type")
                .long("batch-type")
                .help("Unit of --max-batch-size: examples or tokens")
                .value_parser(value_parser!(BatchType))
                .default_value("examples"),
        )
        .arg(
            Arg::new("target")
                .long("target")
                .short('t')
                .help("Target prefix token applied to every sentence (e.g. __fr__)"),
        )
        .arg(
            Arg::new("mock")
                .long("mock")
                .short('m')
                .help("Use the mock engine (reverses tokens) instead of CTranslate2")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Show debug logs")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let verbose = matches.get_flag("verbose");
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    let model = matches
        .get_one::<PathBuf>("model")
        .ok_or("missing model path")?;
    let use_gpu = matches.get_flag("gpu");
    let fast = matches.get_flag("fast");
    let max_batch_size = matches
        .get_one::<usize>("max-batch-size")
        .copied()
        .unwrap_or(0);
    let batch_type = matches
        .get_one::<BatchType>("batch-type")
        .copied()
        .unwrap_or_default();

    let options = match matches.get_one::<PathBuf>("options") {
        Some(path) => TranslationOptions::from_json_file(path)?,
        None => TranslationOptions::default(),
    };

    let loader = select_loader(matches.get_flag("mock"))?;
    let translator = Translator::from_loader(&*loader, model, use_gpu, fast)?;

    // 1. Read tokenized input
    let reader: Box<dyn BufRead> = match matches.get_one::<PathBuf>("input") {
        Some(path) => Box::new(BufReader::new(std::fs::File::open(path)?)),
        None => Box::new(BufReader::new(io::stdin())),
    };
    let mut data = BatchData::new();
    for line in reader.lines() {
        let line = line?;
        data.append(line.split_whitespace().map(str::to_string).collect());
    }
    info!("Read {} sentences", data.len());

    // 2. Translate
    let result = match matches.get_one::<String>("target") {
        Some(token) => {
            let target = vec![token.clone(); data.len()];
            translator.translate_batch_target(&data, &target, &options, max_batch_size, batch_type)?
        }
        None => translator.translate_batch(&data, &options, max_batch_size, batch_type)?,
    };

    // 3. Print one translated sentence per line
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for sentence in result {
        writeln!(out, "{}", sentence.join(" "))?;
    }

    Ok(())
}

#[cfg(feature = "ctranslate2")]
fn select_loader(mock: bool) -> Result<Box<dyn EngineLoader>, Box<dyn std::error::Error>> {
    if mock {
        Ok(Box::new(MockLoader::new(MockMode::Reverse)))
    } else {
        Ok(Box::new(rusty_ctranslate2::Ct2Loader))
    }
}

#[cfg(not(feature = "ctranslate2"))]
fn select_loader(mock: bool) -> Result<Box<dyn EngineLoader>, Box<dyn std::error::Error>> {
    if mock {
        Ok(Box::new(MockLoader::new(MockMode::Reverse)))
    } else {
        Err("built without the `ctranslate2` feature; rebuild with it or pass --mock".into())
    }
}
