// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP wire codec
//!
//! Encodes and decodes header and cookie values between the binary-safe
//! `BytesValue` wire form and native strings, and validates token and
//! header-value syntax before anything reaches the transport.

mod auth;
mod bytes_value;
mod cookie;
mod header;
mod token;

pub use auth::{auth_challenges, parse_challenges, AuthChallenge};
pub use bytes_value::BytesValue;
pub use cookie::{
    encode_cookie_header, encode_cookie_list, encode_set_cookie_header, parse_cookie_header,
    Cookie, CookieHeader, SameSite, SetCookieHeader,
};
pub use header::{
    deserialize_headers, find_header, is_immutable_response_header, serialize_headers, Header,
    IMMUTABLE_RESPONSE_HEADERS,
};
pub use token::{is_valid_header_value, is_valid_http_token};

/// Common HTTP headers
pub mod headers {
    pub const CONTENT_TYPE: &str = "content-type";
    pub const COOKIE: &str = "cookie";
    pub const SET_COOKIE: &str = "set-cookie";
    pub const WWW_AUTHENTICATE: &str = "www-authenticate";
    pub const PROXY_AUTHENTICATE: &str = "proxy-authenticate";
}
