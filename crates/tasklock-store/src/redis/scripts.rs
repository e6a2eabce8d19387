//! Lua scripts executed server-side by Redis.
//!
//! Each script runs with no interleaving from other clients, which is what
//! makes check-count-write a single atomic unit. Results are small integers
//! decoded by [`ScriptReply`].

use std::sync::LazyLock;

use redis::Script;

use tasklock_core::error::AppError;
use tasklock_core::types::AcquireOutcome;

/// Admission by scanning the task class namespace.
///
/// KEYS[1] = holder key (`prefix:postfix`)
/// ARGV[1] = namespace pattern (`prefix:*`, glob-escaped)
/// ARGV[2] = allowed concurrent tasks
/// ARGV[3] = ttl in milliseconds
///
/// Returns:
///   1 = acquired
///   0 = denied (at capacity)
///  -1 = already held
const ENUMERATION_ACQUIRE: &str = r#"
    local holder_key = KEYS[1]
    local pattern = ARGV[1]
    local limit = tonumber(ARGV[2])

    if redis.call('EXISTS', holder_key) == 1 then
        return -1
    end

    local active = #redis.call('KEYS', pattern)
    if active >= limit then
        return 0
    end

    redis.call('SET', holder_key, '1', 'PX', ARGV[3])
    return 1
"#;

/// Admission against a per-class deadline index.
///
/// The index is a sorted set of postfixes scored by their expiry deadline in
/// server milliseconds. Members whose deadline is already behind the server
/// clock are pruned before counting, so a holder that crashed without
/// releasing stops counting once its deadline passes. A member whose deadline
/// equals the current millisecond is kept, as Redis keeps its holder key.
///
/// KEYS[1] = holder key (`prefix:postfix`)
/// KEYS[2] = class index key (`prefix#holders`)
/// ARGV[1] = postfix
/// ARGV[2] = allowed concurrent tasks
/// ARGV[3] = ttl in milliseconds
///
/// Returns the same codes as the enumeration script.
const COUNTER_ACQUIRE: &str = r#"
    local holder_key = KEYS[1]
    local index_key = KEYS[2]
    local postfix = ARGV[1]
    local limit = tonumber(ARGV[2])
    local ttl_ms = tonumber(ARGV[3])

    redis.replicate_commands()
    local t = redis.call('TIME')
    local now_ms = tonumber(t[1]) * 1000 + math.floor(tonumber(t[2]) / 1000)

    redis.call('ZREMRANGEBYSCORE', index_key, '-inf', '(' .. now_ms)

    if redis.call('EXISTS', holder_key) == 1 then
        return -1
    end

    local active = redis.call('ZCARD', index_key)
    if active >= limit then
        return 0
    end

    local deadline = now_ms + ttl_ms
    redis.call('ZADD', index_key, deadline, postfix)
    redis.call('SET', holder_key, '1', 'PX', ARGV[3])

    local last = redis.call('ZRANGE', index_key, -1, -1, 'WITHSCORES')
    redis.call('PEXPIREAT', index_key, last[2])
    return 1
"#;

/// Release for the counter strategy.
///
/// KEYS[1] = holder key
/// KEYS[2] = class index key
/// ARGV[1] = postfix
///
/// Returns the number of holder keys deleted (0 or 1).
const COUNTER_RELEASE: &str = r#"
    local removed = redis.call('DEL', KEYS[1])
    redis.call('ZREM', KEYS[2], ARGV[1])
    return removed
"#;

/// Live holders for the counter strategy, after pruning.
///
/// KEYS[1] = class index key
///
/// Returns the list of live postfixes.
const COUNTER_HOLDERS: &str = r#"
    redis.replicate_commands()
    local t = redis.call('TIME')
    local now_ms = tonumber(t[1]) * 1000 + math.floor(tonumber(t[2]) / 1000)
    redis.call('ZREMRANGEBYSCORE', KEYS[1], '-inf', '(' .. now_ms)
    return redis.call('ZRANGE', KEYS[1], 0, -1)
"#;

/// Compiled enumeration admission script (SHA computed once).
pub static ENUMERATION_ACQUIRE_SCRIPT: LazyLock<Script> =
    LazyLock::new(|| Script::new(ENUMERATION_ACQUIRE));

/// Compiled counter admission script.
pub static COUNTER_ACQUIRE_SCRIPT: LazyLock<Script> =
    LazyLock::new(|| Script::new(COUNTER_ACQUIRE));

/// Compiled counter release script.
pub static COUNTER_RELEASE_SCRIPT: LazyLock<Script> =
    LazyLock::new(|| Script::new(COUNTER_RELEASE));

/// Compiled counter holder listing script.
pub static COUNTER_HOLDERS_SCRIPT: LazyLock<Script> =
    LazyLock::new(|| Script::new(COUNTER_HOLDERS));

/// Integer reply of an admission script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptReply(pub i64);

impl ScriptReply {
    /// Decode into an outcome; any unknown code is an internal error.
    pub fn into_outcome(self) -> Result<AcquireOutcome, AppError> {
        match self.0 {
            1 => Ok(AcquireOutcome::Acquired),
            0 => Ok(AcquireOutcome::Denied),
            -1 => Ok(AcquireOutcome::AlreadyHeld),
            other => Err(AppError::internal(format!(
                "Unexpected admission script result: {other}"
            ))),
        }
    }
}
