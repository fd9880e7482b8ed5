//! Synthetic signup credentials and post defaults.
//!
//! Nothing here is meant to be secure or unique: usernames are derived from
//! the current second, so two generated within the same second collide.
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::{SystemTime, UNIX_EPOCH};

use bot_api::Credentials;
use rand::seq::SliceRandom;
use rand::Rng;

pub const USERNAME_PREFIX: &str = "bot_";
pub const DEFAULT_POST_BODY: &str = "Post body :) Here was a bot!";
/// Random letters following the leading uppercase letter of a password.
pub const PASSWORD_LETTERS: usize = 10;

const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const ASCII_LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

pub trait Clock {
    fn unix_secs(&self) -> u64;
}

#[derive(Debug, Copy, Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn unix_secs(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_secs())
    }
}

/// A clock stuck at one instant.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FixedClock(pub u64);

impl Clock for FixedClock {
    fn unix_secs(&self) -> u64 {
        self.0
    }
}

#[must_use]
pub fn generate_username<C: Clock>(clock: &C) -> String {
    format!("{USERNAME_PREFIX}{}", clock.unix_secs())
}

/// `<A-Z><10 letters><hash of the unix second>`.
pub fn generate_password<R: Rng + ?Sized, C: Clock>(rng: &mut R, clock: &C) -> String {
    let mut password = String::with_capacity(1 + PASSWORD_LETTERS + 20);
    password.push(pick_letter(rng, UPPERCASE));
    for _ in 0..PASSWORD_LETTERS {
        password.push(pick_letter(rng, ASCII_LETTERS));
    }
    password.push_str(&timestamp_hash(clock.unix_secs()).to_string());
    password
}

/// Fills in whatever the caller left out.
pub fn credentials<R: Rng + ?Sized, C: Clock>(
    rng: &mut R,
    clock: &C,
    username: Option<&str>,
    password: Option<&str>,
) -> Credentials {
    Credentials {
        username: username.map_or_else(|| generate_username(clock), str::to_owned),
        password: password.map_or_else(|| generate_password(rng, clock), str::to_owned),
    }
}

#[must_use]
pub fn post_title<C: Clock>(clock: &C) -> String {
    format!("Post {}", clock.unix_secs())
}

fn pick_letter<R: Rng + ?Sized>(rng: &mut R, alphabet: &[u8]) -> char {
    alphabet.choose(rng).map_or('A', |b| char::from(*b))
}

fn timestamp_hash(secs: u64) -> u64 {
    let mut hasher = DefaultHasher::new();
    secs.hash(&mut hasher);
    hasher.finish()
}
