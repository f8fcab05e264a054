use bytes::Bytes;
use chrono::{DateTime, Local, SecondsFormat, TimeDelta};
use rand::Rng;
use rand::seq::SliceRandom;
use uuid::Uuid;

use crate::error::WorkloadError;

use super::corpus::{ALPHABET, WEEKDAYS};

/// Number of distinct payloads rendered before a run.
pub const POOL_SIZE: usize = 1024;
/// Default size in bytes of one rendered record.
pub const DEFAULT_MESSAGE_LENGTH: usize = 1024;
/// Upper bound for the sampled `about` text.
const TOKEN_BUDGET: usize = 500;
const RECORD_CLOSING: &str = "\"}";

pub(super) struct RecordShape<'words> {
    pub(super) message_length: usize,
    pub(super) token_budget: usize,
    pub(super) words: &'words [&'static str],
    pub(super) base_time: DateTime<Local>,
}

impl<'words> RecordShape<'words> {
    pub(super) fn new(
        message_length: usize,
        words: &'words [&'static str],
        base_time: DateTime<Local>,
    ) -> Self {
        Self {
            message_length,
            token_budget: TOKEN_BUDGET.min(message_length / 2),
            words,
            base_time,
        }
    }
}

/// Renders the full pool; slot `i` holds `messages` newline-joined records.
pub(super) fn render_payloads<R: Rng>(
    rng: &mut R,
    shape: &RecordShape<'_>,
    messages: usize,
) -> Result<Vec<Bytes>, WorkloadError> {
    let payload_capacity = messages.saturating_mul(shape.message_length.saturating_add(1));
    let mut buffer = String::with_capacity(payload_capacity);
    let mut payloads = Vec::with_capacity(POOL_SIZE);
    for slot in 0..POOL_SIZE {
        buffer.clear();
        for message in 0..messages {
            if message > 0 {
                buffer.push('\n');
            }
            render_record(rng, shape, slot, &mut buffer)?;
        }
        payloads.push(Bytes::copy_from_slice(buffer.as_bytes()));
    }
    Ok(payloads)
}

pub(super) fn render_record<R: Rng>(
    rng: &mut R,
    shape: &RecordShape<'_>,
    slot: usize,
    out: &mut String,
) -> Result<(), WorkloadError> {
    let offset = TimeDelta::try_seconds(i64::try_from(slot).unwrap_or(i64::MAX))
        .unwrap_or_else(TimeDelta::zero);
    let date = shape
        .base_time
        .checked_add_signed(offset)
        .unwrap_or(shape.base_time);
    let weekday = slot
        .checked_rem(WEEKDAYS.len())
        .and_then(|day| WEEKDAYS.get(day))
        .copied()
        .unwrap_or("Sunday");

    let head = format!(
        "{{\"id\": {slot}, \"sub_id\": \"{sub_id}\", \"date\": \"{date}\", \"category\": \"category-{slot}\", \"wd\": \"{weekday}\", \"arr\": [-1, {low}, {high}], \"ref\": \"{reference}\", \"sample_bool\": {flag}, \"about\": \"{about}\", \"rnd_text\": \"",
        sub_id = Uuid::now_v7(),
        date = date.to_rfc3339_opts(SecondsFormat::Secs, true),
        low = slot.saturating_add(1000),
        high = slot.saturating_add(5) % 32,
        reference = Uuid::new_v4(),
        flag = slot % 4,
        about = token_string(rng, shape.words, shape.token_budget),
    );

    let fixed_len = head.len().saturating_add(RECORD_CLOSING.len());
    let filler_len = shape
        .message_length
        .checked_sub(fixed_len)
        .ok_or(WorkloadError::RecordOverflow {
            length: fixed_len,
            target: shape.message_length,
        })?;

    out.reserve(shape.message_length);
    out.push_str(&head);
    push_random_letters(rng, filler_len, out);
    out.push_str(RECORD_CLOSING);
    Ok(())
}

fn push_random_letters<R: Rng>(rng: &mut R, count: usize, out: &mut String) {
    for _ in 0..count {
        let letter = ALPHABET.choose(rng).copied().unwrap_or(b'a');
        out.push(char::from(letter));
    }
}

/// Space-prefixed words sampled until the next one would exceed `budget` bytes.
pub(super) fn token_string<R: Rng>(rng: &mut R, words: &[&str], budget: usize) -> String {
    let mut out = String::with_capacity(budget);
    while let Some(word) = words.choose(rng) {
        if out.len().saturating_add(word.len()).saturating_add(1) > budget {
            break;
        }
        out.push(' ');
        out.push_str(word);
    }
    out
}
