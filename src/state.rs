//! Authentication state stored in browser cookies
//!
//! The backend issues a bearer token at login but its profile endpoint does
//! not echo the user's id or role back, so those travel alongside the token
//! in their own cookies. The access token cookie is HttpOnly; the id, role
//! and avatar cookies are readable so templates stay consistent with what
//! the middleware resolved.
//!
//! Reads and writes both go through this module so a login, logout or
//! avatar change always replaces the full credential set at once.

use crate::models::Role;
use axum::http::header::COOKIE;
use axum::http::HeaderMap;

pub const ACCESS_COOKIE: &str = "tc_access";
pub const USER_ID_COOKIE: &str = "tc_uid";
pub const ROLE_COOKIE: &str = "tc_role";
pub const AVATAR_COOKIE: &str = "tc_avatar";

/// Credentials parsed from a request's cookies.
#[derive(Debug, Clone)]
pub struct StoredCredentials {
    pub token: String,
    pub user_id: String,
    pub role: Role,
    pub avatar: Option<String>,
}

/// Extract the credential set from request headers. Returns `None` unless
/// the token, user id and role cookies are all present and the role parses.
pub fn read_credentials(headers: &HeaderMap) -> Option<StoredCredentials> {
    let token = read_cookie(headers, ACCESS_COOKIE)?;
    let user_id = read_cookie(headers, USER_ID_COOKIE)?;
    let role: Role = read_cookie(headers, ROLE_COOKIE)?.parse().ok()?;
    let avatar = read_cookie(headers, AVATAR_COOKIE).filter(|v| !v.is_empty());
    Some(StoredCredentials {
        token,
        user_id,
        role,
        avatar,
    })
}

fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let cookie_header = headers.get(COOKIE)?.to_str().ok()?;
    for pair in cookie_header.split(';') {
        let pair = pair.trim();
        if let Some((key, value)) = pair.split_once('=') {
            if key == name {
                return Some(value.to_string());
            }
        }
    }
    None
}

/// Set-Cookie values establishing a logged-in credential set, expiring after
/// `ttl_days`.
pub fn login_cookies(
    token: &str,
    user_id: &str,
    role: Role,
    avatar: Option<&str>,
    ttl_days: i64,
) -> Vec<String> {
    let max_age = ttl_days * 24 * 60 * 60;
    vec![
        format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            ACCESS_COOKIE, token, max_age
        ),
        format!(
            "{}={}; Path=/; SameSite=Lax; Max-Age={}",
            USER_ID_COOKIE, user_id, max_age
        ),
        format!(
            "{}={}; Path=/; SameSite=Lax; Max-Age={}",
            ROLE_COOKIE, role, max_age
        ),
        format!(
            "{}={}; Path=/; SameSite=Lax; Max-Age={}",
            AVATAR_COOKIE,
            avatar.unwrap_or(""),
            max_age
        ),
    ]
}

/// Set-Cookie values clearing the full credential set.
pub fn logout_cookies() -> Vec<String> {
    [ACCESS_COOKIE, USER_ID_COOKIE, ROLE_COOKIE, AVATAR_COOKIE]
        .iter()
        .map(|name| format!("{}=; Path=/; Max-Age=0", name))
        .collect()
}

/// Set-Cookie value replacing the stored avatar URL after an upload.
pub fn avatar_cookie(avatar_url: &str, ttl_days: i64) -> String {
    format!(
        "{}={}; Path=/; SameSite=Lax; Max-Age={}",
        AVATAR_COOKIE,
        avatar_url,
        ttl_days * 24 * 60 * 60
    )
}
