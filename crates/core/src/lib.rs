pub mod api;
pub mod collector;
pub mod config;
pub mod crawl;
pub mod extract;
pub mod normalize;
pub mod pipeline;
pub mod region;
pub mod sink;
pub mod testing;

pub use api::{
    ApiError, DetailEnvelope, GazelleClient, Group, SearchPage, TorrentDetail, TorrentSummary,
    TrackerApi,
};
pub use collector::{collect, CollectError, CollectSummary};
pub use config::{
    load_config, load_config_from_str, resolve_api_key, validate_config, Config, ConfigError,
    SanitizedConfig, SinkKind,
};
pub use crawl::{collect_candidate_ids, CrawlError, CrawlOptions};
pub use extract::{decode_entities, extract_disc_id};
pub use normalize::{normalize, NormalizedRecord, CSV_HEADER};
pub use pipeline::{run, RunError, RunSummary};
pub use region::RegionFilter;
pub use sink::{CsvSink, RecordSink, SinkError, SqliteSink};
