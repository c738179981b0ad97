//! Persisted session cookie storage.
//!
//! DESIGN
//! ======
//! `CookieStore` mirrors a browser's per-origin cookie jar: a getter that
//! returns the `name=value; ...` header of live cookies and a setter that
//! accepts one serialized cookie record. `read`, `write` and `delete` are
//! built on those two, so any jar (in-memory, file-backed, a real browser)
//! only implements the raw pair.
//!
//! Jar rules: a record replaces the record with the same name and path; a
//! record that is already expired evicts its match and is not stored. That
//! is how `delete` works (tombstone-by-expiry).

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use cookie::{Cookie, SameSite};
use time::{Duration, OffsetDateTime};

/// Name of the cookie that carries the session token.
pub const SESSION_COOKIE: &str = "auth_token";

/// Session cookie lifetime.
pub const SESSION_TTL_DAYS: i64 = 7;

pub trait CookieStore: Send + Sync {
    /// Serialized `name=value` pairs of every live cookie, joined by `"; "`.
    fn header(&self) -> String;

    /// Store one cookie record, applying jar replacement and expiry rules.
    fn set(&self, cookie: Cookie<'static>);

    /// Value of the first live cookie named `name`.
    fn read(&self, name: &str) -> Option<String> {
        find_cookie(&self.header(), name)
    }

    /// Write `name=value` site-wide, expiring `ttl_days` from now, `SameSite=Lax`.
    fn write(&self, name: &str, value: &str, ttl_days: i64) {
        let expires = OffsetDateTime::now_utc() + Duration::days(ttl_days);
        self.set(build_cookie(name, value, expires));
    }

    /// The session token, if a live non-empty `auth_token` cookie exists.
    fn session_token(&self) -> Option<String> {
        self.read(SESSION_COOKIE).filter(|token| !token.is_empty())
    }

    /// Overwrite `name` with an already-expired record. Deleting an absent
    /// cookie is a no-op.
    fn delete(&self, name: &str) {
        self.set(build_cookie(name, "", OffsetDateTime::UNIX_EPOCH));
    }
}

/// Build a site-wide, lax cross-site cookie with an absolute expiry.
#[must_use]
pub fn build_cookie(name: &str, value: &str, expires: OffsetDateTime) -> Cookie<'static> {
    Cookie::build((name.to_owned(), value.to_owned()))
        .path("/")
        .same_site(SameSite::Lax)
        .expires(expires)
        .build()
}

/// Find the first entry named `name` in a `Cookie` header string.
#[must_use]
pub fn find_cookie(header: &str, name: &str) -> Option<String> {
    Cookie::split_parse(header)
        .flatten()
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.value().to_owned())
}

fn is_expired(cookie: &Cookie<'_>, now: OffsetDateTime) -> bool {
    cookie.expires_datetime().is_some_and(|at| at <= now)
        || cookie.max_age().is_some_and(|age| age <= Duration::ZERO)
}

// =============================================================================
// JAR
// =============================================================================

#[derive(Debug, Default)]
struct Jar {
    cookies: Vec<Cookie<'static>>,
}

impl Jar {
    fn store(&mut self, cookie: Cookie<'static>, now: OffsetDateTime) {
        self.cookies
            .retain(|existing| !(existing.name() == cookie.name() && existing.path() == cookie.path()));
        if !is_expired(&cookie, now) {
            self.cookies.push(cookie);
        }
    }

    fn live(&self, now: OffsetDateTime) -> impl Iterator<Item = &Cookie<'static>> {
        self.cookies.iter().filter(move |cookie| !is_expired(cookie, now))
    }

    fn header(&self, now: OffsetDateTime) -> String {
        self.live(now)
            .map(|cookie| cookie.stripped().to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn record(&self, name: &str, now: OffsetDateTime) -> Option<Cookie<'static>> {
        self.live(now).find(|cookie| cookie.name() == name).cloned()
    }
}

// =============================================================================
// MEMORY STORE
// =============================================================================

/// In-process cookie jar. Used by tests and by embedders that manage their
/// own persistence.
#[derive(Debug, Default)]
pub struct MemoryCookieStore {
    jar: Mutex<Jar>,
}

impl MemoryCookieStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Full live record for `name`, including attributes.
    #[must_use]
    pub fn record(&self, name: &str) -> Option<Cookie<'static>> {
        self.jar
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .record(name, OffsetDateTime::now_utc())
    }
}

impl CookieStore for MemoryCookieStore {
    fn header(&self) -> String {
        self.jar
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .header(OffsetDateTime::now_utc())
    }

    fn set(&self, cookie: Cookie<'static>) {
        self.jar
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .store(cookie, OffsetDateTime::now_utc());
    }
}

// =============================================================================
// FILE STORE
// =============================================================================

/// Cookie jar persisted to disk, one serialized cookie per line.
///
/// The file is rewritten after every `set`. Persist failures are logged and
/// the in-memory jar stays authoritative for the rest of the process.
#[derive(Debug)]
pub struct FileCookieStore {
    path: PathBuf,
    jar: Mutex<Jar>,
}

impl FileCookieStore {
    /// Open the jar at `path`, loading live records. A missing file is an
    /// empty jar; unparsable and expired lines are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let now = OffsetDateTime::now_utc();
        let mut jar = Jar::default();

        match std::fs::read_to_string(&path) {
            Ok(contents) => {
                for line in contents.lines().map(str::trim).filter(|line| !line.is_empty()) {
                    match Cookie::parse(line.to_owned()) {
                        Ok(cookie) => jar.store(cookie, now),
                        Err(e) => tracing::warn!(path = %path.display(), error = %e, "skipping unparsable cookie line"),
                    }
                }
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }

        tracing::debug!(path = %path.display(), cookies = jar.cookies.len(), "cookie jar loaded");
        Ok(Self { path, jar: Mutex::new(jar) })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, jar: &Jar) -> io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut contents = String::new();
        for cookie in jar.live(OffsetDateTime::now_utc()) {
            contents.push_str(&cookie.to_string());
            contents.push('\n');
        }
        std::fs::write(&self.path, contents)
    }
}

impl CookieStore for FileCookieStore {
    fn header(&self) -> String {
        self.jar
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .header(OffsetDateTime::now_utc())
    }

    fn set(&self, cookie: Cookie<'static>) {
        let mut jar = self.jar.lock().unwrap_or_else(PoisonError::into_inner);
        jar.store(cookie, OffsetDateTime::now_utc());
        if let Err(e) = self.persist(&jar) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to persist cookie jar");
        }
    }
}

#[cfg(test)]
#[path = "cookie_store_test.rs"]
mod tests;
