// Default value functions for the settings structs.

pub fn default_max_attempts() -> u32 {
    5
}

pub fn default_window_seconds() -> u64 {
    3600 // 1 hour rolling failure window
}

pub fn default_block_seconds() -> u64 {
    900 // 15 minute lockout
}

pub fn default_key_prefix() -> String {
    "login".to_string()
}

pub fn default_replay_timeout_seconds() -> u64 {
    300 // webhooks older than 5 minutes are rejected
}

pub fn default_clock_skew_seconds() -> u64 {
    60 // tolerated forward clock skew
}

pub fn default_ledger_retention_days() -> u32 {
    7
}

pub fn default_request_timeout_seconds() -> u64 {
    2 // durable backend calls share the request's I/O budget
}

pub fn default_attempt_retention_seconds() -> u64 {
    7200 // 2 hour ceiling for attempt records in the fallback map
}

pub fn default_ledger_retention_seconds() -> u64 {
    604800 // 7 day ceiling for ledger entries in the fallback map
}

pub fn default_sweep_interval_seconds() -> u64 {
    600 // 10 minutes between retention sweeps
}
