use crate::{ExtractorConfig, Pipeline};
use std::borrow::Cow;
use std::io::{self, Read, Write};
use std::path::PathBuf;

#[derive(Debug, Default, PartialEq, Eq)]
struct CliOptions {
    config_path: Option<PathBuf>,
    /// Stdin holds a JSON array of metadata strings instead of a single blob.
    batch: bool,
    pretty: bool,
}

fn usage() {
    println!("Extracts prompts, tags and artists from AI image metadata.");
    println!();
    println!("Usage:");
    println!("  prompt-tagger [--config <file.json>] [--pretty] < metadata.txt");
    println!("  prompt-tagger --batch [--config <file.json>] < blobs.json");
    println!();
    println!("Environment:");
    println!("  PROMPT_TAGGER_MAX_TRACE_DEPTH  maximum workflow trace depth (default 64)");
    println!("  PROMPT_TAGGER_MIN_JSON_SPAN    minimum embedded JSON length (default 50)");
    println!("  RUST_LOG                       log filter, e.g. debug");
}

fn parse_options<I>(args: I) -> Result<Option<CliOptions>, String>
where
    I: IntoIterator<Item = String>,
{
    let mut options = CliOptions::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--help" | "-h" => return Ok(None),
            "--config" => {
                let Some(path) = args.next() else {
                    return Err("Missing path after --config".to_string());
                };
                options.config_path = Some(PathBuf::from(path));
            }
            "--batch" => options.batch = true,
            "--pretty" => options.pretty = true,
            unknown => {
                return Err(format!("Unknown argument: {}", unknown));
            }
        }
    }
    Ok(Some(options))
}

fn resolve_config(options: &CliOptions) -> Result<ExtractorConfig, String> {
    match &options.config_path {
        Some(path) => ExtractorConfig::load(path),
        None => Ok(ExtractorConfig::from_env()),
    }
}

pub(crate) fn run<I>(args: I) -> Result<(), String>
where
    I: IntoIterator<Item = String>,
{
    let Some(options) = parse_options(args)? else {
        usage();
        return Ok(());
    };

    let pipeline = Pipeline::new(resolve_config(&options)?);

    let mut input = Vec::new();
    io::stdin()
        .read_to_end(&mut input)
        .map_err(|error| format!("Failed to read metadata from stdin: {}", error))?;

    let output = render(&pipeline, &decode_input(&input), &options)?;

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", output).map_err(|error| format!("Failed to write output: {}", error))
}

/// Invalid UTF-8 sequences become U+FFFD instead of failing the whole run.
fn decode_input(bytes: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(bytes)
}

fn render(pipeline: &Pipeline, input: &str, options: &CliOptions) -> Result<String, String> {
    let analysis = if options.batch {
        let blobs: Vec<String> = serde_json::from_str(input)
            .map_err(|error| format!("Batch input must be a JSON array of strings: {}", error))?;
        serde_json::to_value(pipeline.analyze_batch(&blobs))
    } else {
        serde_json::to_value(pipeline.analyze(input))
    };
    let value = analysis.map_err(|error| format!("Failed to serialize analysis: {}", error))?;

    let rendered = if options.pretty {
        serde_json::to_string_pretty(&value)
    } else {
        serde_json::to_string(&value)
    };
    rendered.map_err(|error| format!("Failed to serialize analysis: {}", error))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|item| item.to_string()).collect()
    }

    #[test]
    fn test_parse_options() {
        let options = parse_options(args(&["--batch", "--config", "cfg.json"]))
            .unwrap()
            .unwrap();
        assert!(options.batch);
        assert!(!options.pretty);
        assert_eq!(options.config_path, Some(PathBuf::from("cfg.json")));

        assert_eq!(parse_options(args(&["-h"])).unwrap(), None);
        assert!(parse_options(args(&["--config"])).is_err());
        assert!(parse_options(args(&["--frobnicate"])).is_err());
    }

    #[test]
    fn test_render_single_blob() {
        let output = render(
            &Pipeline::default(),
            "cat, artist:bob\nNegative prompt: blurry",
            &CliOptions::default(),
        )
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["prompt"], "cat, artist:bob");
        assert_eq!(value["artists"], serde_json::json!(["bob"]));
    }

    #[test]
    fn test_render_batch() {
        let options = CliOptions {
            batch: true,
            ..CliOptions::default()
        };
        let input = r#"["a\nNegative prompt: b", ""]"#;
        let output = render(&Pipeline::default(), input, &options).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value[0]["negative_prompt"], "b");
        assert_eq!(value[1]["format"], "empty");

        assert!(render(&Pipeline::default(), "not json", &options).is_err());
    }

    #[test]
    fn test_render_non_utf8_input() {
        let input = decode_input(b"cat\xff, dog\nNegative prompt: blurry");
        let output = render(&Pipeline::default(), &input, &CliOptions::default()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["prompt"], "cat\u{fffd}, dog");
        assert_eq!(value["negative_prompt"], "blurry");
        assert_eq!(value["format"], "plain_text");
    }
}
