// Domain layer - Pure series models and aggregation algorithms
pub mod combine;
pub mod emotes;
pub mod figure;
pub mod rolling;
pub mod series;
pub mod spikes;
pub mod time_axis;
