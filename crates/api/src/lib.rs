//! HTTP API: routing and request/response mapping over `WarehouseEngine`.

pub mod app;
