use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::Value;

use super::pattern::token_string;
use super::*;

fn pattern_workload(messages: usize, message_length: usize) -> Result<Workload, String> {
    WorkloadPlan::new(WorkloadKind::Pattern, messages, message_length)
        .init()
        .map_err(|err| err.to_string())
}

#[test]
fn payloads_repeat_every_pool_size() -> Result<(), String> {
    let workload = pattern_workload(2, DEFAULT_MESSAGE_LENGTH)?;
    let pool = u64::try_from(POOL_SIZE).map_err(|err| err.to_string())?;
    for index in [0_u64, 1, 17, 1023] {
        let first = workload.body(index);
        let wrapped = workload.body(index + pool * 3);
        if first.is_none() || first != wrapped {
            return Err(format!("Payload {} did not repeat", index));
        }
    }
    if workload.body(0) == workload.body(1) {
        return Err("Adjacent slots should differ".to_owned());
    }
    Ok(())
}

#[test]
fn pattern_records_are_fixed_length_json() -> Result<(), String> {
    let workload = pattern_workload(3, DEFAULT_MESSAGE_LENGTH)?;
    if workload.messages_per_payload() != 3 || workload.pool_size() != POOL_SIZE {
        return Err("Unexpected workload shape".to_owned());
    }
    let body = workload.body(5).ok_or("Missing body")?;
    if body.len() != 3 * DEFAULT_MESSAGE_LENGTH + 2 {
        return Err(format!("Unexpected body length {}", body.len()));
    }
    let text = std::str::from_utf8(&body).map_err(|err| err.to_string())?;
    let records: Vec<&str> = text.split('\n').collect();
    if records.len() != 3 {
        return Err(format!("Expected 3 records, got {}", records.len()));
    }
    for record in records {
        if record.len() != DEFAULT_MESSAGE_LENGTH {
            return Err(format!("Record length {}", record.len()));
        }
        let value: Value = serde_json::from_str(record).map_err(|err| err.to_string())?;
        if value.get("id").and_then(Value::as_u64) != Some(5) {
            return Err("Record id should match the slot".to_owned());
        }
        if value.get("wd").and_then(Value::as_str) != Some("Friday") {
            return Err("Slot 5 should be Friday".to_owned());
        }
        let about = value.get("about").and_then(Value::as_str).ok_or("Missing about")?;
        if about.len() > 500 {
            return Err("About text exceeds the token budget".to_owned());
        }
    }
    Ok(())
}

#[test]
fn probe_has_no_body() -> Result<(), String> {
    let workload = WorkloadPlan::new(WorkloadKind::Probe, 16, DEFAULT_MESSAGE_LENGTH)
        .init()
        .map_err(|err| err.to_string())?;
    if workload.body(0).is_some() || workload.body(u64::MAX).is_some() {
        return Err("Probe should not carry a body".to_owned());
    }
    if workload.messages_per_payload() != 1 {
        return Err("Probe counts one message per request".to_owned());
    }
    Ok(())
}

#[test]
fn binary_payloads_hold_one_record() -> Result<(), String> {
    let workload = WorkloadPlan::new(WorkloadKind::Binary, 16, DEFAULT_MESSAGE_LENGTH)
        .init()
        .map_err(|err| err.to_string())?;
    if workload.messages_per_payload() != 1 || workload.kind() != WorkloadKind::Binary {
        return Err("Binary payloads carry a single message".to_owned());
    }
    let body = workload.body(42).ok_or("Missing body")?;
    if body.len() != DEFAULT_MESSAGE_LENGTH || body.contains(&b'\n') {
        return Err(format!("Unexpected binary payload of {} bytes", body.len()));
    }
    Ok(())
}

#[test]
fn tiny_message_size_is_an_error() -> Result<(), String> {
    match pattern_workload(1, 64) {
        Err(message) if message.contains("does not fit") => Ok(()),
        Err(other) => Err(format!("Unexpected error: {}", other)),
        Ok(_) => Err("Expected record overflow".to_owned()),
    }
}

#[test]
fn token_string_stays_within_budget() -> Result<(), String> {
    let words = super::corpus::lorem_words();
    let mut rng = StdRng::seed_from_u64(7);
    for budget in [0_usize, 1, 12, 500] {
        let tokens = token_string(&mut rng, &words, budget);
        if tokens.len() > budget {
            return Err(format!("{} bytes for budget {}", tokens.len(), budget));
        }
        if !tokens.is_empty() && !tokens.starts_with(' ') {
            return Err("Tokens should be space-prefixed".to_owned());
        }
    }
    Ok(())
}
