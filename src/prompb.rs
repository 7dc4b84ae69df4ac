//! Protobuf message definitions for the Prometheus remote-write protocol.
//!
//! Hand-written subset of the upstream `prompb` proto — only the fields the
//! relay reads. Field tags match `prometheus/prompb/remote.proto` and
//! `types.proto`, so bodies produced by any remote-write client decode
//! correctly and unknown fields (exemplars, histograms, metadata) are
//! skipped by prost.

use prost::Message;

/// Top-level remote-write payload: one batch of time series.
#[derive(Clone, PartialEq, Message)]
pub struct WriteRequest {
    #[prost(message, repeated, tag = "1")]
    pub timeseries: Vec<TimeSeries>,
}

/// One labeled series with its ordered samples.
#[derive(Clone, PartialEq, Message)]
pub struct TimeSeries {
    #[prost(message, repeated, tag = "1")]
    pub labels: Vec<Label>,
    #[prost(message, repeated, tag = "2")]
    pub samples: Vec<Sample>,
}

#[derive(Clone, PartialEq, Message)]
pub struct Label {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, tag = "2")]
    pub value: String,
}

/// A single observation: value at millisecond timestamp.
#[derive(Clone, PartialEq, Message)]
pub struct Sample {
    #[prost(double, tag = "1")]
    pub value: f64,
    #[prost(int64, tag = "2")]
    pub timestamp: i64,
}
