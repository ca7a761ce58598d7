// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use std::env;

use log::LevelFilter;

const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Warn;

fn parse_log_level(level: &str) -> LevelFilter {
    match level.trim().to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" | "warning" => LevelFilter::Warn,
        "error" | "critical" => LevelFilter::Error,
        "off" => LevelFilter::Off,
        _ => DEFAULT_LOG_LEVEL,
    }
}

/// Gets the log level from the environment.
/// Priority: DD_RUNAS_LOG_LEVEL > LOG_LEVEL > default Warn
pub fn get_log_level() -> LevelFilter {
    if let Ok(level) = env::var("DD_RUNAS_LOG_LEVEL") {
        return parse_log_level(&level);
    }

    if let Ok(level) = env::var("LOG_LEVEL") {
        return parse_log_level(&level);
    }

    DEFAULT_LOG_LEVEL
}
