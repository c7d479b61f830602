pub mod config;
pub mod error;
pub mod extract;
pub mod filename;
pub mod prompt;
pub mod tags;

mod cli;

pub use config::ExtractorConfig;
pub use error::{ExtractError, ExtractResult};
pub use extract::{extract_prompts, Extraction, Pipeline};
pub use prompt::{MetadataFormat, PromptPair};
pub use tags::{clean_tag, extract_artists, extract_tags, partition_artists, ArtistSet, TagSet};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Everything the gallery stores for one image's metadata blob.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMetadata {
    pub prompt: String,
    pub negative_prompt: String,
    pub tags: TagSet,
    pub artists: ArtistSet,
    pub format: MetadataFormat,
    /// The raw, unparsed metadata string (as backup)
    pub raw_metadata: String,
}

impl Pipeline {
    /// Extracts prompts, then splits the positive prompt into tags and artists.
    pub fn analyze(&self, raw: &str) -> ImageMetadata {
        let Extraction { prompts, format } = self.extract(raw);
        let (tags, artists) = partition_artists(extract_tags(&prompts.positive));

        ImageMetadata {
            prompt: prompts.positive,
            negative_prompt: prompts.negative,
            tags,
            artists,
            format,
            raw_metadata: raw.to_string(),
        }
    }

    /// Analyzes many blobs on the rayon pool; output order matches input order.
    pub fn analyze_batch<S>(&self, blobs: &[S]) -> Vec<ImageMetadata>
    where
        S: AsRef<str> + Sync,
    {
        let timer = std::time::Instant::now();
        let results: Vec<ImageMetadata> = blobs
            .par_iter()
            .map(|raw| self.analyze(raw.as_ref()))
            .collect();

        let with_prompts = results
            .iter()
            .filter(|metadata| !metadata.prompt.is_empty() || !metadata.negative_prompt.is_empty())
            .count();
        log::info!(
            "Analyzed {} metadata blobs ({} with prompts) in {:.1} ms",
            results.len(),
            with_prompts,
            timer.elapsed().as_secs_f64() * 1000.0
        );

        results
    }
}

/// Analyzes one blob with the default configuration.
pub fn analyze_metadata(raw: &str) -> ImageMetadata {
    Pipeline::default().analyze(raw)
}

/// Analyzes many blobs in parallel with the default configuration.
pub fn analyze_batch<S>(blobs: &[S]) -> Vec<ImageMetadata>
where
    S: AsRef<str> + Sync,
{
    Pipeline::default().analyze_batch(blobs)
}

/// Entry point for the `prompt-tagger` binary.
pub fn run() {
    env_logger::init();

    if let Err(error) = cli::run(std::env::args().skip(1)) {
        log::error!("{}", error);
        eprintln!("Error: {}", error);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOVELAI_TEXT: &str = "masterpiece, (1girl), [artist:greg], Artist:Mika, smile:1.2\nNegative prompt: lowres, bad anatomy";

    #[test]
    fn test_analyze_partitions_tags_and_artists() {
        let metadata = analyze_metadata(NOVELAI_TEXT);

        assert_eq!(metadata.format, MetadataFormat::PlainText);
        assert_eq!(
            metadata.prompt,
            "masterpiece, (1girl), [artist:greg], Artist:Mika, smile:1.2"
        );
        assert_eq!(metadata.negative_prompt, "lowres, bad anatomy");
        assert_eq!(
            metadata.tags.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["1girl", "masterpiece", "smile"]
        );
        assert_eq!(
            metadata.artists.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["Mika", "greg"]
        );
        assert!(metadata.tags.is_disjoint(&metadata.artists));
        assert_eq!(metadata.raw_metadata, NOVELAI_TEXT);
    }

    #[test]
    fn test_analyze_empty_blob() {
        let metadata = analyze_metadata("");
        assert_eq!(metadata, ImageMetadata::default());
    }

    #[test]
    fn test_analyze_batch_preserves_order() {
        let blobs: Vec<String> = (0..64)
            .map(|index| format!("tag{}, shared\nNegative prompt: neg{}", index, index))
            .collect();

        let results = analyze_batch(&blobs);

        assert_eq!(results.len(), blobs.len());
        for (index, metadata) in results.iter().enumerate() {
            assert_eq!(metadata.negative_prompt, format!("neg{}", index));
            assert!(metadata.tags.contains(&format!("tag{}", index)));
            assert!(metadata.tags.contains("shared"));
        }
    }

    #[test]
    fn test_image_metadata_serializes_for_storage() {
        let metadata = analyze_metadata("cat, artist:bob\nNegative prompt: blurry");
        let json = serde_json::to_value(&metadata).unwrap();

        assert_eq!(json["prompt"], "cat, artist:bob");
        assert_eq!(json["negative_prompt"], "blurry");
        assert_eq!(json["tags"], serde_json::json!(["cat"]));
        assert_eq!(json["artists"], serde_json::json!(["bob"]));
        assert_eq!(json["format"], "plain_text");
    }
}
