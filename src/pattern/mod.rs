// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! URL patterns used by intercepts
//!
//! Two forms are accepted: a structured pattern (protocol, hostname, port,
//! pathname, search; absent parts match anything) and a string pattern that
//! is either a literal URL or a glob with `*` wildcards.

mod url_pattern;

pub use url_pattern::{CompiledParts, CompiledUrlPattern, PatternParts, UrlPattern};
