pub mod observation_fetcher;

pub use observation_fetcher::{
    FetchRequest, HttpObservationSource, ObservationFetcher, ObservationSource,
};
