//! Metrics definitions for the status proxy.

use shared::metrics_defs::{MetricDef, MetricType};

pub const UPSTREAM_PAGE_FETCHED: MetricDef = MetricDef {
    name: "upstream.page.fetched",
    metric_type: MetricType::Counter,
    description: "Number of project pages fetched from the upstream GraphQL API",
};

pub const UPSTREAM_FETCH_FAILED: MetricDef = MetricDef {
    name: "upstream.fetch.failed",
    metric_type: MetricType::Counter,
    description: "Number of traversals aborted by an upstream error",
};

pub const UPSTREAM_FETCH_DURATION: MetricDef = MetricDef {
    name: "upstream.fetch.duration",
    metric_type: MetricType::Histogram,
    description: "Time to complete a full upstream traversal in seconds",
};

pub const UPSTREAM_FETCH_RECORDS: MetricDef = MetricDef {
    name: "upstream.fetch.records",
    metric_type: MetricType::Histogram,
    description: "Number of service status records produced by a traversal",
};

pub const ALL_METRICS: &[MetricDef] = &[
    UPSTREAM_PAGE_FETCHED,
    UPSTREAM_FETCH_FAILED,
    UPSTREAM_FETCH_DURATION,
    UPSTREAM_FETCH_RECORDS,
];
