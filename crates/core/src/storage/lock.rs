use anyhow::Context;

// Session-scoped advisory lock guarding concurrent deep scans for one user.
const LOCK_NAMESPACE: i64 = 0x5345_4E54_494E; // "SENTIN"

/// FNV-1a; stable across processes, unlike `DefaultHasher`.
fn lock_key_for_user(user_id: &str) -> i64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for b in user_id.as_bytes() {
        hash ^= u64::from(*b);
        hash = hash.wrapping_mul(0x0100_0000_01b3);
    }
    LOCK_NAMESPACE ^ (hash as i64)
}

pub async fn try_acquire_scan_lock(pool: &sqlx::PgPool, user_id: &str) -> anyhow::Result<bool> {
    let key = lock_key_for_user(user_id);
    let acquired: (bool,) = sqlx::query_as("SELECT pg_try_advisory_lock($1)")
        .persistent(false)
        .bind(key)
        .fetch_one(pool)
        .await
        .with_context(|| format!("failed to acquire scan lock (user_id={user_id}, key={key})"))?;
    Ok(acquired.0)
}

pub async fn release_scan_lock(pool: &sqlx::PgPool, user_id: &str) -> anyhow::Result<()> {
    let key = lock_key_for_user(user_id);
    sqlx::query("SELECT pg_advisory_unlock($1)")
        .persistent(false)
        .bind(key)
        .execute(pool)
        .await
        .with_context(|| format!("failed to release scan lock (user_id={user_id}, key={key})"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_stable_and_distinct() {
        assert_eq!(lock_key_for_user("demo_user"), lock_key_for_user("demo_user"));
        assert_ne!(lock_key_for_user("demo_user"), lock_key_for_user("other"));
    }
}
