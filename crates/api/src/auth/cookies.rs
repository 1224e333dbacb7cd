//! Session cookie policy

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

use super::jwt::TokenPair;
use crate::config::Config;

pub const ACCESS_COOKIE: &str = "accessToken";
pub const REFRESH_COOKIE: &str = "refreshToken";

/// Attributes shared by both session cookies. Setting and clearing use the
/// same attributes so browsers match the cookie being removed.
#[derive(Debug, Clone)]
pub struct CookiePolicy {
    secure: bool,
    same_site: SameSite,
    access_max_age: Duration,
    refresh_max_age: Duration,
}

impl CookiePolicy {
    pub fn new(
        secure: bool,
        same_site: SameSite,
        access_max_age: Duration,
        refresh_max_age: Duration,
    ) -> Self {
        Self {
            secure,
            same_site,
            access_max_age,
            refresh_max_age,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.cookie_secure,
            config.cookie_same_site,
            config.access_token_expiry,
            config.refresh_token_expiry,
        )
    }

    fn build(&self, name: &'static str, value: String, max_age: Duration) -> Cookie<'static> {
        Cookie::build((name, value))
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(self.same_site)
            .max_age(max_age)
            .build()
    }

    pub fn set_tokens(&self, jar: CookieJar, tokens: &TokenPair) -> CookieJar {
        jar.add(self.build(
            ACCESS_COOKIE,
            tokens.access_token.clone(),
            self.access_max_age,
        ))
        .add(self.build(
            REFRESH_COOKIE,
            tokens.refresh_token.clone(),
            self.refresh_max_age,
        ))
    }

    fn removal(&self, name: &'static str) -> Cookie<'static> {
        let mut cookie = self.build(name, String::new(), Duration::ZERO);
        cookie.make_removal();
        cookie
    }

    /// Expire both session cookies. Removal cookies are always emitted,
    /// whether or not the request carried the cookies.
    pub fn clear(&self, jar: CookieJar) -> CookieJar {
        jar.add(self.removal(ACCESS_COOKIE))
            .add(self.removal(REFRESH_COOKIE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> TokenPair {
        TokenPair {
            access_token: "access.jwt.value".to_string(),
            refresh_token: "refresh.jwt.value".to_string(),
        }
    }

    #[test]
    fn test_set_tokens_applies_policy() {
        let policy = CookiePolicy::new(true, SameSite::None, Duration::days(1), Duration::days(7));
        let jar = policy.set_tokens(CookieJar::new(), &pair());

        let access = jar.get(ACCESS_COOKIE).unwrap();
        assert_eq!(access.value(), "access.jwt.value");
        assert_eq!(access.http_only(), Some(true));
        assert_eq!(access.secure(), Some(true));
        assert_eq!(access.same_site(), Some(SameSite::None));
        assert_eq!(access.path(), Some("/"));
        assert_eq!(access.max_age(), Some(Duration::days(1)));

        let refresh = jar.get(REFRESH_COOKIE).unwrap();
        assert_eq!(refresh.value(), "refresh.jwt.value");
        assert_eq!(refresh.max_age(), Some(Duration::days(7)));
    }

    #[test]
    fn test_clear_emits_removals_without_request_cookies() {
        let policy = CookiePolicy::new(false, SameSite::Lax, Duration::hours(1), Duration::days(1));
        let jar = policy.clear(CookieJar::new());

        let mut names = Vec::new();
        for cookie in jar.iter() {
            assert_eq!(cookie.value(), "");
            assert_eq!(cookie.max_age(), Some(Duration::ZERO));
            assert_eq!(cookie.path(), Some("/"));
            assert_eq!(cookie.http_only(), Some(true));
            assert_eq!(cookie.same_site(), Some(SameSite::Lax));
            names.push(cookie.name().to_string());
        }
        names.sort();
        assert_eq!(names, vec![ACCESS_COOKIE, REFRESH_COOKIE]);
    }

    #[test]
    fn test_clear_overrides_cookies_set_earlier() {
        let policy = CookiePolicy::new(true, SameSite::None, Duration::hours(1), Duration::days(1));
        let jar = policy.clear(policy.set_tokens(CookieJar::new(), &pair()));

        let access = jar.get(ACCESS_COOKIE).unwrap();
        assert_eq!(access.value(), "");
        assert_eq!(access.max_age(), Some(Duration::ZERO));
        assert_eq!(access.secure(), Some(true));
        assert_eq!(jar.get(REFRESH_COOKIE).unwrap().value(), "");
    }
}
